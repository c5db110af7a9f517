//! Simulator device resolution via `xcrun simctl`

use crate::config::NavigatorConfig;
use crate::error::{Error, Result};
use crate::process;
use regex::Regex;
use std::sync::OnceLock;

fn udid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\(([A-F0-9\-]{36})\)").expect("valid UDID regex"))
}

/// First UDID in `simctl list devices booted` output.
///
/// Lines look like `    iPhone 16 Pro (ABC123...-...) (Booted)`.
pub fn parse_booted_udid(listing: &str) -> Option<String> {
    listing
        .lines()
        .find_map(|line| udid_pattern().captures(line))
        .map(|caps| caps[1].to_string())
}

/// UDID of the first booted simulator, if any.
pub fn booted_udid(config: &NavigatorConfig) -> Result<Option<String>> {
    let args = vec![
        "simctl".to_string(),
        "list".to_string(),
        "devices".to_string(),
        "booted".to_string(),
    ];
    let output = process::run(
        &config.xcrun_path.to_string_lossy(),
        &args,
        config.command_timeout,
    )?;
    Ok(parse_booted_udid(&output.stdout))
}

/// An explicit UDID wins; otherwise fall back to the booted simulator.
pub fn resolve_udid(explicit: Option<&str>, config: &NavigatorConfig) -> Result<String> {
    if let Some(udid) = explicit.filter(|u| !u.is_empty()) {
        return Ok(udid.to_string());
    }

    match booted_udid(config)? {
        Some(udid) => {
            tracing::debug!(%udid, "using booted simulator");
            Ok(udid)
        }
        None => Err(Error::device_not_found()),
    }
}
