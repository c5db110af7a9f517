//! idb collaborator: tree description, taps and text entry

use crate::config::NavigatorConfig;
use crate::element::Point;
use crate::error::Result;
use crate::process;
use std::path::PathBuf;
use std::time::Duration;

/// The simulator UI-control surface the navigator drives.
pub trait UiDriver {
    /// Raw `describe-all` JSON for the current screen.
    fn describe_all(&self, udid: Option<&str>, nested: bool) -> Result<String>;

    /// Tap at device-pixel coordinates.
    fn tap(&self, udid: Option<&str>, point: Point) -> Result<()>;

    /// Type into whatever currently has focus.
    fn text(&self, udid: Option<&str>, text: &str) -> Result<()>;
}

/// [`UiDriver`] backed by the `idb` command-line client.
#[derive(Debug, Clone)]
pub struct IdbDriver {
    program: PathBuf,
    timeout: Duration,
}

impl IdbDriver {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn from_config(config: &NavigatorConfig) -> Self {
        Self::new(config.idb_path.clone(), config.command_timeout)
    }

    fn run(&self, mut args: Vec<String>, udid: Option<&str>) -> Result<String> {
        if let Some(udid) = udid {
            args.push("--udid".to_string());
            args.push(udid.to_string());
        }
        let output = process::run(&self.program.to_string_lossy(), &args, self.timeout)?;
        Ok(output.stdout)
    }
}

impl Default for IdbDriver {
    fn default() -> Self {
        Self::from_config(&NavigatorConfig::default())
    }
}

impl UiDriver for IdbDriver {
    fn describe_all(&self, udid: Option<&str>, nested: bool) -> Result<String> {
        let mut args = vec!["ui".into(), "describe-all".into(), "--json".into()];
        if nested {
            args.push("--nested".into());
        }
        self.run(args, udid)
    }

    fn tap(&self, udid: Option<&str>, point: Point) -> Result<()> {
        let args = vec![
            "ui".into(),
            "tap".into(),
            point.x.to_string(),
            point.y.to_string(),
        ];
        self.run(args, udid).map(|_| ())
    }

    fn text(&self, udid: Option<&str>, text: &str) -> Result<()> {
        let args = vec!["ui".into(), "text".into(), text.to_string()];
        self.run(args, udid).map(|_| ())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    /// Write a stand-in `idb` that echoes its arguments, or fails when the
    /// first argument after `ui` is `tap`.
    fn fake_idb(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("idb");
        fs::write(
            &path,
            "#!/bin/sh\nif [ \"$2\" = tap ]; then echo 'no companion' >&2; exit 1; fi\necho \"$@\"\n",
        )
        .unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("simnav-idb-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn builds_describe_all_arguments() {
        let dir = scratch_dir("describe");
        let driver = IdbDriver::new(fake_idb(&dir), Duration::from_secs(10));
        let out = driver.describe_all(Some("ABC"), true).unwrap();
        assert_eq!(out.trim(), "ui describe-all --json --nested --udid ABC");
        let flat = driver.describe_all(None, false).unwrap();
        assert_eq!(flat.trim(), "ui describe-all --json");
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn text_is_passed_as_one_argument() {
        let dir = scratch_dir("text");
        let driver = IdbDriver::new(fake_idb(&dir), Duration::from_secs(10));
        assert!(driver.text(None, "hello world").is_ok());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn failing_tap_is_collaborator_failure() {
        let dir = scratch_dir("tap");
        let driver = IdbDriver::new(fake_idb(&dir), Duration::from_secs(10));
        let err = driver.tap(Some("ABC"), Point::new(1, 2)).unwrap_err();
        assert_eq!(err.code, ErrorCode::CollaboratorFailed);
        assert!(err.message.contains("no companion"));
        let _ = fs::remove_dir_all(dir);
    }
}
