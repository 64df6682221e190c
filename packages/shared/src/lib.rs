//! Utilities shared by the Huddle crates.

pub mod logger;
pub mod time;
