//! Data models for the gym attendance backend.
//!
//! Field names serialize as camelCase to match the web client.

mod attendance;
mod member;

pub use attendance::*;
pub use member::*;
