//! Output channel: framed JSON, blob, progress and terminal blocks.

pub mod writer;

pub use writer::PartStream;
