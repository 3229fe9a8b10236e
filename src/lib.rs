//! `mailsplit`: split one email into an ordered stream of parts.
//!
//! A raw RFC 5322 message is staged, parsed into a MIME tree, and reduced to
//! one body plus zero or more attachments. Each part is written to a single
//! framed output stream as a JSON description, its decoded content, and a
//! progress notice; the stream ends with a `done` or `error` block.

pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod split;
pub mod staging;
pub mod stream;
