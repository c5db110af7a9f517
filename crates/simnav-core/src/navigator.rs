//! Navigator - main entry point for simulator automation

use crate::config::NavigatorConfig;
use crate::coords::{self, Size};
use crate::element::{Element, ElementInfo, Point};
use crate::error::{Error, Result};
use crate::idb::{IdbDriver, UiDriver};
use crate::locator;
use crate::screen::ScreenSummary;
use crate::selector::MatchCriteria;
use crate::tree::{self, TreeSnapshot};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Finds accessibility elements on one simulator and acts on them.
///
/// The most recent tree is cached until the caller asks for a refresh;
/// taps and text entry do not invalidate it.
pub struct Navigator<D: UiDriver = IdbDriver> {
    driver: D,
    udid: Option<String>,
    config: NavigatorConfig,
    tree_cache: Option<TreeSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub action: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<ElementInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<Point>,
    pub timing_ms: u64,
}

impl ActionResult {
    fn new(action: &str, success: bool, message: String, start: Instant) -> Self {
        Self {
            success,
            action: action.to_string(),
            message,
            element: None,
            point: None,
            timing_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn with_element(mut self, element: &Element) -> Self {
        self.point = Some(element.center());
        self.element = Some(element.info());
        self
    }

    fn with_point(mut self, point: Point) -> Self {
        self.point = Some(point);
        self
    }
}

impl Navigator<IdbDriver> {
    pub fn new(udid: Option<String>) -> Self {
        Self::with_config(udid, NavigatorConfig::default())
    }

    pub fn with_config(udid: Option<String>, config: NavigatorConfig) -> Self {
        let driver = IdbDriver::from_config(&config);
        Self::with_driver(driver, udid, config)
    }
}

impl<D: UiDriver> Navigator<D> {
    pub fn with_driver(driver: D, udid: Option<String>, config: NavigatorConfig) -> Self {
        Self {
            driver,
            udid,
            config,
            tree_cache: None,
        }
    }

    pub fn udid(&self) -> Option<&str> {
        self.udid.as_deref()
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    // Tree

    /// Cached tree, fetching a new one on first use or when forced.
    /// Fetch failures propagate; the previous snapshot is kept untouched.
    pub fn get_tree(&mut self, force_refresh: bool) -> Result<&TreeSnapshot> {
        if force_refresh || self.tree_cache.is_none() {
            let json = self.driver.describe_all(self.udid.as_deref(), true)?;
            let root = tree::parse_tree(&json)?;
            let snapshot = TreeSnapshot::new(root);
            tracing::debug!(
                nodes = tree::count_nodes(&snapshot.root),
                forced = force_refresh,
                "fetched accessibility tree"
            );
            self.tree_cache = Some(snapshot);
        } else {
            tracing::debug!("using cached accessibility tree");
        }

        self.tree_cache
            .as_ref()
            .ok_or_else(|| Error::malformed_output("idb ui describe-all", "no tree cached"))
    }

    pub fn invalidate(&mut self) {
        self.tree_cache = None;
    }

    pub fn elements(&mut self, force_refresh: bool) -> Result<Vec<Element>> {
        Ok(self.get_tree(force_refresh)?.elements())
    }

    // Element finding

    pub fn find(&mut self, criteria: &MatchCriteria) -> Result<Option<Element>> {
        let elements = self.elements(false)?;
        Ok(locator::find(&elements, criteria).cloned())
    }

    pub fn find_all(&mut self, criteria: &MatchCriteria) -> Result<Vec<Element>> {
        let elements = self.elements(false)?;
        Ok(locator::find_all(&elements, criteria)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn list_tappable(&mut self, force_refresh: bool) -> Result<Vec<Element>> {
        let elements = self.elements(force_refresh)?;
        Ok(locator::tappable(&elements).into_iter().cloned().collect())
    }

    pub fn screen_summary(&mut self, force_refresh: bool) -> Result<ScreenSummary> {
        Ok(ScreenSummary::analyze(&self.get_tree(force_refresh)?.root))
    }

    /// Device size from the root frame of the current tree.
    pub fn screen_size(&mut self) -> Result<Size> {
        let snapshot = self.get_tree(false)?;
        let frame = snapshot.root.frame.ok_or_else(|| {
            Error::malformed_output("idb ui describe-all", "root element has no frame")
        })?;
        if frame.width <= 0.0 || frame.height <= 0.0 {
            return Err(Error::malformed_output(
                "idb ui describe-all",
                "root frame has no area",
            ));
        }
        // fractional frames round to the nearest whole unit
        Ok(Size::new(
            frame.width.round() as u32,
            frame.height.round() as u32,
        ))
    }

    // Actions

    pub fn tap(&self, element: &Element) -> bool {
        self.tap_at(element.center())
    }

    /// Tap in device pixels. Collaborator failures are logged and reported as `false`.
    pub fn tap_at(&self, point: Point) -> bool {
        match self.driver.tap(self.udid.as_deref(), point) {
            Ok(()) => {
                tracing::info!(x = point.x, y = point.y, "tapped");
                true
            }
            Err(e) => {
                tracing::warn!(x = point.x, y = point.y, error = %e, "tap failed");
                false
            }
        }
    }

    /// Type `text`, first tapping `element` to focus it when given.
    pub fn enter_text(&self, text: &str, element: Option<&Element>) -> bool {
        if let Some(element) = element {
            if !self.tap(element) {
                return false;
            }
            std::thread::sleep(self.config.settle_delay);
        }

        match self.driver.text(self.udid.as_deref(), text) {
            Ok(()) => {
                tracing::info!(chars = text.chars().count(), "entered text");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "text entry failed");
                false
            }
        }
    }

    pub fn find_and_tap(&mut self, criteria: &MatchCriteria) -> Result<ActionResult> {
        let start = Instant::now();
        let Some(element) = self.find(criteria)? else {
            return Ok(ActionResult::new(
                "tap",
                false,
                Error::element_not_found(criteria).message,
                start,
            ));
        };

        let result = if self.tap(&element) {
            ActionResult::new(
                "tap",
                true,
                format!("Tapped: {} at {}", element.description(), element.center()),
                start,
            )
        } else {
            ActionResult::new(
                "tap",
                false,
                format!("Failed to tap: {}", element.description()),
                start,
            )
        };
        Ok(result.with_element(&element))
    }

    /// Like [`find_and_tap`](Self::find_and_tap) but enters text; the
    /// element type defaults to `TextField`.
    pub fn find_and_enter_text(
        &mut self,
        text: &str,
        criteria: &MatchCriteria,
    ) -> Result<ActionResult> {
        let start = Instant::now();
        let criteria = criteria.clone().or_type("TextField");
        let Some(element) = self.find(&criteria)? else {
            let kind = criteria.element_type.as_deref().unwrap_or("TextField");
            return Ok(ActionResult::new(
                "enter_text",
                false,
                format!("{} not found", kind),
                start,
            ));
        };

        let result = if self.enter_text(text, Some(&element)) {
            ActionResult::new(
                "enter_text",
                true,
                format!("Entered text in: {}", element.description()),
                start,
            )
        } else {
            ActionResult::new(
                "enter_text",
                false,
                "Failed to enter text".to_string(),
                start,
            )
        };
        Ok(result.with_element(&element))
    }

    pub fn tap_point(&self, point: Point) -> ActionResult {
        let start = Instant::now();
        let (success, message) = if self.tap_at(point) {
            (true, format!("Tapped at {}", point))
        } else {
            (false, format!("Failed to tap at {}", point))
        };
        ActionResult::new("tap_at", success, message, start).with_point(point)
    }

    /// Tap a point measured on a screenshot of size `screenshot`.
    pub fn tap_screenshot_point(&mut self, x: f64, y: f64, screenshot: Size) -> Result<ActionResult> {
        let device = self.screen_size()?;
        let point = coords::to_device_coords(x, y, screenshot, device)?;
        tracing::debug!(
            x,
            y,
            %screenshot,
            %device,
            device_x = point.x,
            device_y = point.y,
            "transformed screenshot coordinates"
        );
        Ok(self.tap_point(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::cell::{Cell, RefCell};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Describe,
        Tap(Point),
        Text(String),
    }

    #[derive(Default)]
    struct FakeDriver {
        tree: RefCell<String>,
        calls: RefCell<Vec<Call>>,
        fail_describe: Cell<bool>,
        fail_tap: Cell<bool>,
        fail_text: Cell<bool>,
    }

    impl FakeDriver {
        fn with_tree(json: &str) -> Self {
            let fake = Self::default();
            fake.tree.replace(json.to_string());
            fake
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        fn describes(&self) -> usize {
            self.calls().iter().filter(|c| **c == Call::Describe).count()
        }
    }

    impl UiDriver for FakeDriver {
        fn describe_all(&self, _udid: Option<&str>, nested: bool) -> Result<String> {
            assert!(nested);
            self.calls.borrow_mut().push(Call::Describe);
            if self.fail_describe.get() {
                return Err(Error::collaborator_failed("idb ui describe-all", "companion gone"));
            }
            Ok(self.tree.borrow().clone())
        }

        fn tap(&self, _udid: Option<&str>, point: Point) -> Result<()> {
            self.calls.borrow_mut().push(Call::Tap(point));
            if self.fail_tap.get() {
                return Err(Error::collaborator_failed("idb ui tap", "exit 1"));
            }
            Ok(())
        }

        fn text(&self, _udid: Option<&str>, text: &str) -> Result<()> {
            self.calls.borrow_mut().push(Call::Text(text.to_string()));
            if self.fail_text.get() {
                return Err(Error::collaborator_failed("idb ui text", "exit 1"));
            }
            Ok(())
        }
    }

    const SCREEN: &str = r#"[{
        "type": "Window", "AXLabel": "Demo",
        "frame": {"x": 0, "y": 0, "width": 390, "height": 844},
        "children": [
            {"type": "TextField", "AXLabel": "Username",
             "frame": {"x": 20, "y": 100, "width": 350, "height": 40}},
            {"type": "SecureTextField", "AXLabel": "Password",
             "frame": {"x": 20, "y": 160, "width": 350, "height": 40}},
            {"type": "Button", "AXLabel": "Log In", "AXUniqueId": "login",
             "frame": {"x": 100, "y": 200, "width": 50, "height": 40}},
            {"type": "Button", "AXLabel": "Help", "enabled": false,
             "frame": {"x": 0, "y": 0, "width": 10, "height": 10}}
        ]
    }]"#;

    fn navigator(fake: FakeDriver) -> Navigator<FakeDriver> {
        let config = NavigatorConfig::default().with_settle_delay(Duration::ZERO);
        Navigator::with_driver(fake, Some("SIM-1".to_string()), config)
    }

    #[test]
    fn cache_is_reused_until_forced() {
        let mut nav = navigator(FakeDriver::with_tree(SCREEN));
        nav.get_tree(false).unwrap();
        nav.get_tree(false).unwrap();
        assert_eq!(nav.driver().describes(), 1);

        nav.get_tree(true).unwrap();
        assert_eq!(nav.driver().describes(), 2);

        nav.invalidate();
        nav.find(&MatchCriteria::text("log")).unwrap();
        nav.find(&MatchCriteria::text("help")).unwrap();
        assert_eq!(nav.driver().describes(), 3);
    }

    #[test]
    fn taps_do_not_invalidate_cache() {
        let mut nav = navigator(FakeDriver::with_tree(SCREEN));
        nav.find_and_tap(&MatchCriteria::text("log")).unwrap();
        nav.find_and_tap(&MatchCriteria::text("log")).unwrap();
        assert_eq!(nav.driver().describes(), 1);
    }

    #[test]
    fn fetch_failure_is_a_hard_error() {
        let fake = FakeDriver::with_tree(SCREEN);
        fake.fail_describe.set(true);
        let mut nav = navigator(fake);
        let err = nav.find_and_tap(&MatchCriteria::text("log")).unwrap_err();
        assert_eq!(err.code, ErrorCode::CollaboratorFailed);
        assert!(!nav.driver().calls().iter().any(|c| matches!(c, Call::Tap(_))));
    }

    #[test]
    fn malformed_tree_is_a_hard_error() {
        let mut nav = navigator(FakeDriver::with_tree("<html>"));
        assert_eq!(
            nav.get_tree(false).unwrap_err().code,
            ErrorCode::MalformedOutput
        );
    }

    #[test]
    fn failed_refresh_keeps_previous_snapshot() {
        let mut nav = navigator(FakeDriver::with_tree(SCREEN));
        nav.get_tree(false).unwrap();
        nav.driver().fail_describe.set(true);
        assert!(nav.get_tree(true).is_err());
        nav.driver().fail_describe.set(false);
        nav.driver().tree.replace("[]".to_string());
        assert_eq!(nav.elements(false).unwrap().len(), 5);
    }

    #[test]
    fn find_and_tap_reports_element_and_center() {
        let mut nav = navigator(FakeDriver::with_tree(SCREEN));
        let result = nav.find_and_tap(&MatchCriteria::identifier("login")).unwrap();
        assert!(result.success);
        assert_eq!(result.message, "Tapped: Button \"Log In\" at (125, 220)");
        assert_eq!(result.point, Some(Point::new(125, 220)));
        assert_eq!(
            nav.driver().calls(),
            vec![Call::Describe, Call::Tap(Point::new(125, 220))]
        );
    }

    #[test]
    fn find_and_tap_not_found_echoes_criteria() {
        let mut nav = navigator(FakeDriver::with_tree(SCREEN));
        let criteria = MatchCriteria::text("Submit").with_type("Button");
        let result = nav.find_and_tap(&criteria).unwrap();
        assert!(!result.success);
        assert_eq!(result.message, "Not found: text='Submit', type=Button");
        assert_eq!(result.message, Error::element_not_found(&criteria).message);
        assert!(result.element.is_none());

        // disabled elements are invisible to matching
        let help = nav.find_and_tap(&MatchCriteria::exact("Help")).unwrap();
        assert!(!help.success);
    }

    #[test]
    fn failed_tap_is_reported_not_raised() {
        let fake = FakeDriver::with_tree(SCREEN);
        fake.fail_tap.set(true);
        let mut nav = navigator(fake);
        let result = nav.find_and_tap(&MatchCriteria::text("log")).unwrap();
        assert!(!result.success);
        assert_eq!(result.message, "Failed to tap: Button \"Log In\"");
        assert!(!nav.tap_at(Point::new(1, 1)));
    }

    #[test]
    fn enter_text_skips_typing_when_focus_tap_fails() {
        let fake = FakeDriver::with_tree(SCREEN);
        fake.fail_tap.set(true);
        let mut nav = navigator(fake);
        let field = nav
            .find(&MatchCriteria::element_type("TextField"))
            .unwrap()
            .unwrap();
        assert!(!nav.enter_text("bob", Some(&field)));
        assert!(!nav
            .driver()
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Text(_))));
    }

    #[test]
    fn enter_text_without_element_types_into_focus() {
        let nav = navigator(FakeDriver::with_tree(SCREEN));
        assert!(nav.enter_text("hello", None));
        assert_eq!(nav.driver().calls(), vec![Call::Text("hello".to_string())]);
    }

    #[test]
    fn find_and_enter_text_defaults_to_text_field() {
        let mut nav = navigator(FakeDriver::with_tree(SCREEN));
        let result = nav.find_and_enter_text("bob", &MatchCriteria::new()).unwrap();
        assert!(result.success);
        assert_eq!(result.message, "Entered text in: TextField \"Username\"");
        assert_eq!(
            nav.driver().calls(),
            vec![
                Call::Describe,
                Call::Tap(Point::new(195, 120)),
                Call::Text("bob".to_string())
            ]
        );

        let secure = nav
            .find_and_enter_text("hunter2", &MatchCriteria::element_type("SecureTextField"))
            .unwrap();
        assert_eq!(secure.message, "Entered text in: SecureTextField \"Password\"");

        let missing = nav
            .find_and_enter_text("x", &MatchCriteria::new().at(3))
            .unwrap();
        assert!(!missing.success);
        assert_eq!(missing.message, "TextField not found");
    }

    #[test]
    fn failed_text_entry_is_reported() {
        let fake = FakeDriver::with_tree(SCREEN);
        fake.fail_text.set(true);
        let mut nav = navigator(fake);
        let result = nav.find_and_enter_text("bob", &MatchCriteria::new()).unwrap();
        assert!(!result.success);
        assert_eq!(result.message, "Failed to enter text");
    }

    #[test]
    fn lists_enabled_tappable_elements() {
        let mut nav = navigator(FakeDriver::with_tree(SCREEN));
        let labels: Vec<_> = nav
            .list_tappable(false)
            .unwrap()
            .into_iter()
            .filter_map(|e| e.label)
            .collect();
        assert_eq!(labels, vec!["Username", "Password", "Log In"]);
    }

    #[test]
    fn screenshot_points_are_scaled_to_device() {
        let mut nav = navigator(FakeDriver::with_tree(SCREEN));
        assert_eq!(nav.screen_size().unwrap(), Size::new(390, 844));

        let result = nav
            .tap_screenshot_point(100.0, 200.0, Size::new(195, 422))
            .unwrap();
        assert!(result.success);
        assert_eq!(result.message, "Tapped at (200, 400)");
        assert_eq!(
            nav.driver().calls().last(),
            Some(&Call::Tap(Point::new(200, 400)))
        );

        let err = nav
            .tap_screenshot_point(1.0, 1.0, Size::new(0, 422))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn fractional_root_frame_rounds() {
        let mut nav = navigator(FakeDriver::with_tree(
            r#"[{"type": "Window", "frame": {"x": 0, "y": 0, "width": 390.5, "height": 843.6}}]"#,
        ));
        assert_eq!(nav.screen_size().unwrap(), Size::new(391, 844));
    }

    #[test]
    fn screen_size_requires_root_frame() {
        let mut nav = navigator(FakeDriver::with_tree(r#"[{"type": "Window"}]"#));
        assert_eq!(nav.screen_size().unwrap_err().code, ErrorCode::MalformedOutput);
    }

    #[test]
    fn caches_are_per_navigator() {
        let mut a = navigator(FakeDriver::with_tree(SCREEN));
        let mut b = navigator(FakeDriver::with_tree(SCREEN));
        a.get_tree(false).unwrap();
        b.get_tree(false).unwrap();
        a.get_tree(false).unwrap();
        assert_eq!(a.driver().describes(), 1);
        assert_eq!(b.driver().describes(), 1);
    }
}
