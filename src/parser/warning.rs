//! Parser warnings and the capability that decides whether they abort a run.

use tracing::{debug, warn};

/// Structural anomalies the parser can report while building the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    DuplicatedHeader,
    DuplicatedParameter,
    UnencodedEightBitHeader,
    InvalidContentType,
    InvalidRfc2047HeaderValue,
    MalformedMultipart,
    TruncatedMessage,
    MalformedMessage,
    InvalidParameter,
    InvalidHeaderName,
    ConflictingHeader,
    ConflictingParameter,
    MultipartWithoutBoundary,
}

impl WarningKind {
    /// Fixed message written to the `error` block when this warning aborts a run.
    ///
    /// These strings are part of the output contract and must not change.
    pub fn message(self) -> &'static str {
        match self {
            Self::DuplicatedHeader => "GMIME_WARN_DUPLICATED_HEADER",
            Self::DuplicatedParameter => "GMIME_WARN_DUPLICATED_PARAMETER",
            Self::UnencodedEightBitHeader => "GMIME_WARN_UNENCODED_8BIT_HEADER",
            Self::InvalidContentType => "GMIME_WARN_INVALID_CONTENT_TYPE",
            Self::InvalidRfc2047HeaderValue => "GMIME_WARN_INVALID_RFC2047_HEADER_VALUE",
            Self::MalformedMultipart => "GMIME_WARN_MALFORMED_MULTIPART",
            Self::TruncatedMessage => "GMIME_WARN_TRUNCATED_MESSAGE",
            Self::MalformedMessage => "GMIME_WARN_MALFORMED_MESSAGE",
            Self::InvalidParameter => "GMIME_WARN_INVALID_PARAMETER",
            Self::InvalidHeaderName => "GMIME_CRIT_INVALID_HEADER_NAME",
            Self::ConflictingHeader => "GMIME_CRIT_CONFLICTING_HEADER",
            Self::ConflictingParameter => "GMIME_CRIT_CONFLICTING_PARAMETER",
            Self::MultipartWithoutBoundary => "GMIME_CRIT_MULTIPART_WITHOUT_BOUNDARY",
        }
    }

    /// Whether this warning kind aborts the run under the default policy.
    ///
    /// Duplicated parameters show up routinely in messages exported from
    /// `.pst` archives and are harmless.
    pub fn is_fatal(self) -> bool {
        !matches!(self, Self::DuplicatedParameter)
    }
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// One warning occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserWarning {
    pub kind: WarningKind,
    /// Byte offset in the (staged) input where the anomaly was found.
    pub offset: usize,
    /// The header name, parameter or line the warning is about, if any.
    pub item: Option<String>,
}

impl ParserWarning {
    pub fn new(kind: WarningKind, offset: usize, item: Option<String>) -> Self {
        Self { kind, offset, item }
    }
}

/// What the parser must do after reporting a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Abort,
}

/// Capability passed into the parser; invoked synchronously for every warning.
///
/// Returning [`Verdict::Abort`] stops tree construction immediately.
pub trait WarningHandler {
    fn on_warning(&mut self, warning: &ParserWarning) -> Verdict;
}

/// Default policy: only duplicated parameters are tolerated.
#[derive(Debug, Default)]
pub struct StrictPolicy {
    tolerated: usize,
}

impl StrictPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of informational warnings seen so far.
    pub fn tolerated(&self) -> usize {
        self.tolerated
    }
}

impl WarningHandler for StrictPolicy {
    fn on_warning(&mut self, warning: &ParserWarning) -> Verdict {
        if warning.kind.is_fatal() {
            debug!(
                kind = %warning.kind,
                offset = warning.offset,
                item = warning.item.as_deref().unwrap_or(""),
                "Fatal parser warning"
            );
            Verdict::Abort
        } else {
            warn!(
                kind = %warning.kind,
                offset = warning.offset,
                item = warning.item.as_deref().unwrap_or(""),
                "Ignoring parser warning"
            );
            self.tolerated += 1;
            Verdict::Continue
        }
    }
}
