//! UI element representation with structured output

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of accessibility control as reported by idb's `type` field.
///
/// Unknown tags are kept verbatim in [`ElementKind::Other`] so newer
/// simulator runtimes never fail to parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementKind {
    Button,
    Link,
    Cell,
    TextField,
    SecureTextField,
    StaticText,
    Image,
    Switch,
    Slider,
    Stepper,
    SegmentedControl,
    TabBar,
    NavigationBar,
    Toolbar,
    Window,
    Application,
    Group,
    ScrollView,
    Table,
    Other(String),
}

impl ElementKind {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "Button" => Self::Button,
            "Link" => Self::Link,
            "Cell" => Self::Cell,
            "TextField" => Self::TextField,
            "SecureTextField" => Self::SecureTextField,
            "StaticText" => Self::StaticText,
            "Image" => Self::Image,
            "Switch" => Self::Switch,
            "Slider" => Self::Slider,
            "Stepper" => Self::Stepper,
            "SegmentedControl" => Self::SegmentedControl,
            "TabBar" => Self::TabBar,
            "NavigationBar" => Self::NavigationBar,
            "Toolbar" => Self::Toolbar,
            "Window" => Self::Window,
            "Application" => Self::Application,
            "Group" => Self::Group,
            "ScrollView" => Self::ScrollView,
            "Table" => Self::Table,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Button => "Button",
            Self::Link => "Link",
            Self::Cell => "Cell",
            Self::TextField => "TextField",
            Self::SecureTextField => "SecureTextField",
            Self::StaticText => "StaticText",
            Self::Image => "Image",
            Self::Switch => "Switch",
            Self::Slider => "Slider",
            Self::Stepper => "Stepper",
            Self::SegmentedControl => "SegmentedControl",
            Self::TabBar => "TabBar",
            Self::NavigationBar => "NavigationBar",
            Self::Toolbar => "Toolbar",
            Self::Window => "Window",
            Self::Application => "Application",
            Self::Group => "Group",
            Self::ScrollView => "ScrollView",
            Self::Table => "Table",
            Self::Other(tag) => tag,
        }
    }

    /// Kinds listed by `sn list`.
    pub fn is_tappable(&self) -> bool {
        matches!(
            self,
            Self::Button | Self::Link | Self::Cell | Self::TextField | Self::SecureTextField
        )
    }

    /// Kinds counted as interaction points in the screen summary.
    pub fn is_interactive(&self) -> bool {
        self.is_tappable()
            || matches!(
                self,
                Self::Switch
                    | Self::Slider
                    | Self::Stepper
                    | Self::SegmentedControl
                    | Self::TabBar
                    | Self::NavigationBar
                    | Self::Toolbar
            )
    }

    pub fn is_text_input(&self) -> bool {
        matches!(self, Self::TextField | Self::SecureTextField)
    }
}

impl From<String> for ElementKind {
    fn from(tag: String) -> Self {
        Self::parse(&tag)
    }
}

impl From<ElementKind> for String {
    fn from(kind: ElementKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rectangle in device-pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl Frame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Center point, truncated toward zero.
    pub fn center(&self) -> Point {
        Point {
            x: (self.x + self.width / 2.0) as i32,
            y: (self.y + self.height / 2.0) as i32,
        }
    }
}

/// Integer point in device-pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One node of a flattened accessibility tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub kind: ElementKind,
    pub label: Option<String>,
    pub value: Option<String>,
    pub identifier: Option<String>,
    pub frame: Frame,
    pub traits: Vec<String>,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementInfo {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    pub frame: Frame,
    pub center: Point,
    pub enabled: bool,
}

impl Element {
    pub fn new(kind: ElementKind, frame: Frame) -> Self {
        Self {
            kind,
            label: None,
            value: None,
            identifier: None,
            frame,
            traits: Vec::new(),
            enabled: true,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn center(&self) -> Point {
        self.frame.center()
    }

    /// First non-empty of label, value, identifier.
    pub fn name(&self) -> Option<&str> {
        [&self.label, &self.value, &self.identifier]
            .into_iter()
            .filter_map(|s| s.as_deref())
            .find(|s| !s.is_empty())
    }

    /// `Button "Login"`, falling back to `"Unnamed"`.
    pub fn description(&self) -> String {
        format!("{} \"{}\"", self.kind, self.name().unwrap_or("Unnamed"))
    }

    /// Text searched by fuzzy matching: label and value joined by one space.
    pub fn haystack(&self) -> String {
        format!(
            "{} {}",
            self.label.as_deref().unwrap_or(""),
            self.value.as_deref().unwrap_or("")
        )
    }

    pub fn info(&self) -> ElementInfo {
        ElementInfo {
            kind: self.kind.clone(),
            label: self.label.clone(),
            value: self.value.clone(),
            identifier: self.identifier.clone(),
            frame: self.frame,
            center: self.center(),
            enabled: self.enabled,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}
