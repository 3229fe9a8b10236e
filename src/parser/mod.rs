//! Email parsing: header decoding, structural inspection and MIME tree construction.

pub mod header;
pub mod inspect;
pub mod mime;
pub mod warning;
