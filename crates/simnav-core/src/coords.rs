//! Screenshot space to device space conversion

use crate::element::Point;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Parses `WIDTHxHEIGHT`, e.g. `195x422`.
impl FromStr for Size {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (w, h) = s
            .trim()
            .split_once(|c: char| c == 'x' || c == 'X')
            .ok_or_else(|| Error::invalid_input(format!("expected WIDTHxHEIGHT, got '{}'", s)))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| Error::invalid_input(format!("invalid dimension '{}' in '{}'", part, s)))
        };
        Ok(Self::new(parse(w)?, parse(h)?))
    }
}

/// Scale a point taken from a (possibly downscaled) screenshot into device
/// pixels. Each axis is scaled linearly and truncated toward zero.
pub fn to_device_coords(x: f64, y: f64, screenshot: Size, device: Size) -> Result<Point> {
    if screenshot.width == 0 || screenshot.height == 0 {
        return Err(Error::invalid_input(format!(
            "screenshot dimensions must be positive, got {}",
            screenshot
        )));
    }

    let device_x = x / f64::from(screenshot.width) * f64::from(device.width);
    let device_y = y / f64::from(screenshot.height) * f64::from(device.height);
    Ok(Point::new(device_x as i32, device_y as i32))
}
