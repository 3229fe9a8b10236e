//! Classified parts: what gets emitted, in which order, with which role.

use super::tree::LeafPart;

/// Role of an emitted part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Body,
    Attachment,
}

/// One part scheduled for emission.
#[derive(Debug, Clone)]
pub struct ClassifiedPart<'t, 'm> {
    pub source: &'t LeafPart<'m>,
    pub role: Role,
    /// Emission index, 0-based; also the `nProcessed - 1` of its progress block.
    pub position: usize,
    /// Content type reported in the part's JSON.
    pub content_type: String,
    pub filename: Option<String>,
}

impl<'t> ClassifiedPart<'t, '_> {
    /// The part's transfer-decoded content.
    pub fn content(&self) -> &'t [u8] {
        &self.source.content
    }
}
