//! Structured errors for AI parsing

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ElementNotFound,
    CollaboratorFailed,
    MalformedOutput,
    Timeout,
    InvalidInput,
    DeviceNotFound,
    SelectorInvalid,
    Unknown,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            suggestions: Vec::new(),
            context: None,
        }
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }

    /// Nothing matched; `criteria` is echoed as given.
    pub fn element_not_found(criteria: impl fmt::Display) -> Self {
        Self::new(ErrorCode::ElementNotFound, format!("Not found: {}", criteria))
    }

    pub fn collaborator_failed(command: &str, reason: &str) -> Self {
        Self::new(
            ErrorCode::CollaboratorFailed,
            format!("{} failed: {}", command, reason),
        )
    }

    pub fn malformed_output(command: &str, reason: &str) -> Self {
        Self::new(
            ErrorCode::MalformedOutput,
            format!("Unexpected output from {}: {}", command, reason),
        )
    }

    pub fn timeout(command: &str, timeout: Duration) -> Self {
        Self::new(
            ErrorCode::Timeout,
            format!("Timeout after {}ms running: {}", timeout.as_millis(), command),
        )
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn device_not_found() -> Self {
        Self::new(
            ErrorCode::DeviceNotFound,
            "No device UDID provided and no simulator is currently booted",
        )
        .with_suggestions(vec![
            "Boot a simulator: xcrun simctl boot <device-name>".to_string(),
            "Or pass --udid <device-udid> explicitly".to_string(),
        ])
    }

    pub fn selector_invalid(selector: &str, reason: &str) -> Self {
        Self::new(
            ErrorCode::SelectorInvalid,
            format!("Invalid selector '{}': {}", selector, reason),
        )
    }

    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Timeout
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Self::new(ErrorCode::Unknown, e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorCode::Unknown, e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::new(ErrorCode::MalformedOutput, format!("Invalid JSON: {}", e))
    }
}
