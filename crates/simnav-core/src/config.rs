//! Navigator configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigatorConfig {
    /// idb executable
    pub idb_path: PathBuf,
    /// xcrun executable, used for `simctl` device lookup
    pub xcrun_path: PathBuf,
    /// Upper bound on every external command
    pub command_timeout: Duration,
    /// Pause between a focusing tap and the text entry that follows it
    pub settle_delay: Duration,
}

impl NavigatorConfig {
    pub fn with_idb_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.idb_path = path.into();
        self
    }

    pub fn with_xcrun_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.xcrun_path = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            idb_path: PathBuf::from("idb"),
            xcrun_path: PathBuf::from("xcrun"),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}
