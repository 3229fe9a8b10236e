//! Centralized error types for mailsplit.
//!
//! The `Display` text of every variant is the exact message written into the
//! `error` block of the output stream, so downstream consumers can match on it.

use thiserror::Error;

use crate::parser::warning::WarningKind;

/// All errors that abort a split run.
#[derive(Error, Debug)]
pub enum SplitError {
    /// The caller's request JSON is not a JSON object (or not JSON at all).
    #[error("Input JSON was not an Object")]
    RequestNotObject,

    /// A required string or object member is missing from the request JSON.
    #[error("Input JSON is missing {kind} '{field}'")]
    RequestMissingField {
        field: &'static str,
        kind: &'static str,
    },

    /// The staging buffer could not be created.
    #[error("Could not open staging buffer for write")]
    StagingCreate(#[source] std::io::Error),

    /// Copying the input stream into the staging buffer failed part-way.
    #[error("Could not stream input to staging buffer")]
    StagingCopy(#[source] std::io::Error),

    /// The staging buffer could not be reopened or read back.
    #[error("Could not open staging buffer for reading")]
    StagingRead(#[source] std::io::Error),

    /// A fatal structural warning raised while parsing the message.
    #[error("{}", .0.message())]
    Parse(WarningKind),

    /// The parser could not build any message at all.
    #[error("invalid email file")]
    InvalidMessage,

    /// Writing a part's binary content to the output channel failed.
    #[error("Failed to write blob")]
    BlobWrite(#[source] std::io::Error),

    /// Writing a frame header, JSON or progress block failed.
    #[error("Failed to write output")]
    Output(#[source] std::io::Error),
}

/// Convenience alias for `Result<T, SplitError>`.
pub type Result<T> = std::result::Result<T, SplitError>;

impl SplitError {
    /// Shorthand for a missing string member of the request JSON.
    pub fn missing_string(field: &'static str) -> Self {
        Self::RequestMissingField {
            field,
            kind: "string",
        }
    }

    /// Shorthand for a missing object member of the request JSON.
    pub fn missing_object(field: &'static str) -> Self {
        Self::RequestMissingField {
            field,
            kind: "object",
        }
    }
}
