//! MIME message parsing: structural inspection, tree construction and envelope extraction.

use std::borrow::Cow;

use mail_parser::decoders::base64::base64_decode;
use mail_parser::decoders::quoted_printable::quoted_printable_decode;
use mail_parser::{Encoding, Message, MessageParser, MessagePart, MimeHeaders, PartType};
use tracing::debug;

use crate::error::{Result, SplitError};
use crate::model::envelope::Envelope;
use crate::model::tree::{ContainerPart, LeafPart, MessageTree, MimeNode};
use crate::parser::header::{parse_envelope, skip_from_line, split_header_block};
use crate::parser::inspect::{inspect, MAX_DEPTH};
use crate::parser::warning::WarningHandler;

/// A successfully parsed message.
///
/// Borrows the raw bytes it was parsed from; the tree in turn borrows from it.
pub struct ParsedMessage<'x> {
    message: Message<'x>,
    envelope: Envelope,
}

/// Parse a raw message.
///
/// `handler` is invoked synchronously for every structural warning; an
/// abort ends parsing with [`SplitError::Parse`]. A message `mail-parser`
/// cannot make sense of at all yields [`SplitError::InvalidMessage`].
pub fn parse_message<'x>(
    raw: &'x [u8],
    handler: &mut dyn WarningHandler,
) -> Result<ParsedMessage<'x>> {
    let raw = skip_from_line(raw);
    if raw.is_empty() {
        return Err(SplitError::InvalidMessage);
    }

    inspect(raw, handler)?;

    let message = MessageParser::default()
        .parse(raw)
        .ok_or(SplitError::InvalidMessage)?;

    let split = split_header_block(raw);
    let envelope = parse_envelope(&raw[..split.header_end]);
    debug!(parts = message.parts.len(), "Parsed message");

    Ok(ParsedMessage { message, envelope })
}

impl ParsedMessage<'_> {
    /// Message-level header values.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Build the read-only part tree.
    pub fn tree(&self) -> MessageTree<'_> {
        MessageTree::new(build_node(&self.message, 0, "text/plain", 0))
    }
}

fn build_node<'m>(
    message: &'m Message<'_>,
    part_id: usize,
    default_type: &'static str,
    depth: usize,
) -> MimeNode<'m> {
    let Some(part) = message.parts.get(part_id) else {
        return MimeNode::Leaf(LeafPart {
            content_type: None,
            default_type,
            attachment: false,
            filename: None,
            content: Cow::default(),
        });
    };

    let content_type = part.content_type().map(media_type);

    match &part.body {
        PartType::Multipart(children) => {
            let media = content_type.unwrap_or_else(|| "multipart/mixed".to_string());
            let child_default = if media == "multipart/digest" {
                "message/rfc822"
            } else {
                "text/plain"
            };
            let children = if depth >= MAX_DEPTH {
                Vec::new()
            } else {
                children
                    .iter()
                    .map(|&child| build_node(message, child as usize, child_default, depth + 1))
                    .collect()
            };
            MimeNode::Container(ContainerPart {
                content_type: media,
                children,
            })
        }
        PartType::Message(nested) => {
            let children = if depth >= MAX_DEPTH {
                Vec::new()
            } else {
                vec![build_node(nested, 0, "text/plain", depth + 1)]
            };
            MimeNode::Container(ContainerPart {
                content_type: content_type.unwrap_or_else(|| default_type.to_string()),
                children,
            })
        }
        _ => MimeNode::Leaf(LeafPart {
            content_type,
            default_type,
            attachment: part
                .content_disposition()
                .is_some_and(|d| d.ctype().eq_ignore_ascii_case("attachment")),
            filename: part
                .attachment_name()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from),
            content: leaf_content(message, part),
        }),
    }
}

/// A leaf's body with only the transfer encoding undone.
///
/// `mail-parser` converts text parts to UTF-8, so those are decoded again
/// from the raw body to keep their declared charset.
fn leaf_content<'m>(message: &'m Message<'_>, part: &'m MessagePart<'_>) -> Cow<'m, [u8]> {
    if !matches!(part.body, PartType::Text(_) | PartType::Html(_)) {
        return Cow::Borrowed(part.contents());
    }
    // Offsets index the buffer the part was parsed from, not `raw_message()`.
    let Some(raw) = message
        .raw_message
        .get(part.raw_body_offset()..part.raw_end_offset())
    else {
        return Cow::Borrowed(part.contents());
    };
    let decoded = match part.encoding {
        Encoding::None => return Cow::Borrowed(raw),
        Encoding::QuotedPrintable => quoted_printable_decode(raw),
        Encoding::Base64 => base64_decode(raw),
    };
    decoded.map_or(Cow::Borrowed(part.contents()), Cow::Owned)
}

/// Lower-cased `type/subtype`.
fn media_type(ct: &mail_parser::ContentType<'_>) -> String {
    let main = ct.ctype();
    match ct.subtype() {
        Some(sub) => format!("{main}/{sub}").to_ascii_lowercase(),
        None => main.to_ascii_lowercase(),
    }
}
