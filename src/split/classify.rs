//! Decide which leaf is the body and which are attachments, and in what order
//! they are emitted.

use tracing::debug;

use crate::model::part::{ClassifiedPart, Role};
use crate::model::tree::{LeafPart, MessageTree, MimeNode};

/// Content type reported for attachments that declare none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Types that make a non-attachment leaf a body candidate.
const BODY_TYPES: &[&str] = &["text/plain", "text/html", "application/rtf"];

/// Walk the tree and produce the emission list.
///
/// Attachments keep depth-first pre-order. Among non-attachment textual
/// leaves the last one visited becomes the body and is emitted last; a
/// single-part message's root is its body. Zero parts is a valid result.
pub fn classify<'t, 'm>(tree: &'t MessageTree<'m>) -> Vec<ClassifiedPart<'t, 'm>> {
    let mut ordered: Vec<(&'t LeafPart<'m>, Role)> = Vec::new();
    let mut body: Option<&'t LeafPart<'m>> = None;

    for node in tree.descendants() {
        let MimeNode::Leaf(leaf) = node else {
            continue;
        };
        if !leaf.attachment && BODY_TYPES.contains(&leaf.effective_type()) {
            if let Some(previous) = body.replace(leaf) {
                debug!(
                    replaced = previous.effective_type(),
                    by = leaf.effective_type(),
                    "Later body candidate wins"
                );
            }
        } else {
            ordered.push((leaf, Role::Attachment));
        }
    }

    if body.is_none() {
        if let MimeNode::Leaf(root) = &tree.root {
            body = Some(root);
        }
    }
    if let Some(leaf) = body {
        ordered.push((leaf, Role::Body));
    }

    ordered
        .into_iter()
        .enumerate()
        .map(|(position, (source, role))| ClassifiedPart {
            source,
            role,
            position,
            content_type: reported_type(source, role),
            filename: match role {
                // The body keeps the request filename.
                Role::Body => None,
                Role::Attachment => source.filename.clone(),
            },
        })
        .collect()
}

fn reported_type(leaf: &LeafPart<'_>, role: Role) -> String {
    match role {
        Role::Body => leaf.effective_type().to_string(),
        Role::Attachment => leaf
            .content_type
            .clone()
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
    }
}
