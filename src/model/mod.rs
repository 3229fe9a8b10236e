//! Core data model: the caller's request, message envelope, MIME tree and
//! classified parts.

pub mod address;
pub mod envelope;
pub mod part;
pub mod request;
pub mod tree;
