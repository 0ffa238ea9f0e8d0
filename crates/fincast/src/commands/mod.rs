//! Command handlers for the `fincast` CLI.

pub mod check;
pub mod completion;
pub mod eval;
pub mod key;
pub mod params;
