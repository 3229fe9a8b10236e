//! Splitting a parsed message into ordered, described parts.

pub mod classify;
pub mod metadata;

pub use classify::classify;
