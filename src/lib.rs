//! # simnav
//!
//! iOS Simulator navigation for AI agents. Finds elements in the
//! accessibility tree through `idb` and taps them, types into them, or taps
//! raw screenshot coordinates after scaling them to the device.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use simnav::prelude::*;
//!
//! let mut nav = Navigator::new(None);
//! let result = nav.find_and_tap(&MatchCriteria::text("Log In"))?;
//! println!("{}", result.message);
//!
//! // The tree is cached; refresh after the UI changes.
//! nav.get_tree(true)?;
//! nav.find_and_enter_text("bob", &MatchCriteria::identifier("username"))?;
//! # Ok::<(), simnav::Error>(())
//! ```

pub use simnav_core::*;

/// Prelude - import everything you need
pub mod prelude {
    pub use simnav_core::prelude::*;
}
