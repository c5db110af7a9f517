//! simnav-core - iOS Simulator navigation for AI agents
//!
//! Finds UI elements in the simulator's accessibility tree (via `idb`) and
//! taps them or types into them. Semantic lookup first, raw coordinates last.
//!
//! ## Pieces
//!
//! - **tree**: fetch-once snapshots and pre-order flattening
//! - **locator** / **selector**: criteria matching with fuzzy or exact text
//! - **navigator**: cached tree plus tap and text-entry actions
//! - **coords**: screenshot pixels to device pixels

pub mod config;
pub mod coords;
pub mod device;
pub mod element;
pub mod error;
pub mod idb;
pub mod locator;
pub mod navigator;
pub mod process;
pub mod screen;
pub mod selector;
pub mod tree;

pub use config::NavigatorConfig;
pub use coords::{to_device_coords, Size};
pub use element::{Element, ElementInfo, ElementKind, Frame, Point};
pub use error::{Error, ErrorCode, Result};
pub use idb::{IdbDriver, UiDriver};
pub use navigator::{ActionResult, Navigator};
pub use screen::ScreenSummary;
pub use selector::MatchCriteria;
pub use tree::{flatten, RawNode, TreeSnapshot};

pub mod prelude {
    pub use crate::config::NavigatorConfig;
    pub use crate::coords::Size;
    pub use crate::element::{Element, ElementKind, Point};
    pub use crate::error::{Error, ErrorCode, Result};
    pub use crate::navigator::{ActionResult, Navigator};
    pub use crate::selector::MatchCriteria;
}
