//! Structural inspection of a raw message.
//!
//! `mail-parser` repairs almost anything silently, so before the tree is built
//! the raw bytes are walked with the same shape the tree will have (header
//! blocks, multipart delimiters, embedded messages) and every anomaly is
//! reported to a [`WarningHandler`]. An [`Verdict::Abort`] from the handler
//! stops the walk at once.

use tracing::trace;

use crate::error::{Result, SplitError};
use crate::parser::header::{has_malformed_encoded_word, raw_fields, split_header_block, HeaderSplit};
use crate::parser::warning::{ParserWarning, Verdict, WarningHandler, WarningKind};

/// Nesting below this depth is not descended.
pub const MAX_DEPTH: usize = 32;

/// Headers that may appear at most once per entity.
const SINGLE_OCCURRENCE: &[&str] = &[
    "date",
    "from",
    "sender",
    "reply-to",
    "to",
    "cc",
    "bcc",
    "message-id",
    "in-reply-to",
    "references",
    "subject",
    "mime-version",
    "content-type",
    "content-transfer-encoding",
    "content-disposition",
    "content-id",
];

/// Headers whose values may carry RFC 2047 encoded-words.
const ENCODED_WORD_HEADERS: &[&str] = &[
    "subject",
    "comments",
    "keywords",
    "content-description",
    "from",
    "sender",
    "reply-to",
    "to",
    "cc",
    "bcc",
];

/// Parameters whose repetition with a different value changes how the part is read.
const STRUCTURAL_PARAMETERS: &[&str] = &["boundary", "charset"];

/// Walk `raw` and report every structural anomaly to `handler`.
///
/// Returns [`SplitError::Parse`] with the first warning the handler aborted on.
pub fn inspect(raw: &[u8], handler: &mut dyn WarningHandler) -> Result<()> {
    let mut inspector = Inspector { handler };
    inspector.message(raw, 0, 0)
}

/// Media type and parameters of one `Content-Type` header.
#[derive(Debug, Default)]
struct ContentType {
    media: String,
    params: Vec<(String, String)>,
}

impl ContentType {
    fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Default)]
struct EntityHeaders {
    content_type: Option<ContentType>,
    transfer_encoding: Option<String>,
}

struct Inspector<'h> {
    handler: &'h mut dyn WarningHandler,
}

impl Inspector<'_> {
    fn report(&mut self, kind: WarningKind, offset: usize, item: Option<String>) -> Result<()> {
        let warning = ParserWarning::new(kind, offset, item);
        match self.handler.on_warning(&warning) {
            Verdict::Continue => Ok(()),
            Verdict::Abort => Err(SplitError::Parse(kind)),
        }
    }

    /// A top-level or embedded message.
    fn message(&mut self, data: &[u8], base: usize, depth: usize) -> Result<()> {
        let split = split_header_block(data);
        if !split.terminated && !data.is_empty() && !data.ends_with(b"\n") {
            self.report(WarningKind::TruncatedMessage, base + data.len(), None)?;
        }
        self.entity(data, base, split, depth, "text/plain")
    }

    fn entity(
        &mut self,
        data: &[u8],
        base: usize,
        split: HeaderSplit,
        depth: usize,
        default_type: &str,
    ) -> Result<()> {
        let headers = self.headers(&data[..split.header_end], base)?;
        if depth >= MAX_DEPTH {
            trace!(offset = base, "Nesting limit reached, not descending");
            return Ok(());
        }

        let content_type = headers.content_type.unwrap_or_else(|| ContentType {
            media: default_type.to_string(),
            params: Vec::new(),
        });
        let body = &data[split.body_start..];
        let body_base = base + split.body_start;

        if let Some(subtype) = content_type.media.strip_prefix("multipart/") {
            let boundary = content_type.param("boundary").filter(|b| !b.is_empty());
            return self.multipart(body, body_base, boundary, subtype == "digest", depth);
        }

        let identity = headers
            .transfer_encoding
            .as_deref()
            .is_none_or(|e| matches!(e, "7bit" | "8bit" | "binary"));
        if content_type.media == "message/rfc822" && identity {
            return self.embedded(body, body_base, depth);
        }
        Ok(())
    }

    fn headers(&mut self, block: &[u8], base: usize) -> Result<EntityHeaders> {
        let mut result = EntityHeaders::default();
        let mut seen: Vec<(String, String)> = Vec::new();

        for field in raw_fields(block) {
            let offset = base + field.offset;
            let Some(name) = field.name else {
                let line = String::from_utf8_lossy(field.value).trim_end().to_string();
                self.report(WarningKind::InvalidHeaderName, offset, Some(line))?;
                continue;
            };

            let name_trimmed = name.trim_ascii_end();
            if name_trimmed.is_empty() || !name_trimmed.iter().all(|&b| (33..=126).contains(&b)) {
                let item = String::from_utf8_lossy(name).into_owned();
                self.report(WarningKind::InvalidHeaderName, offset, Some(item))?;
                continue;
            }

            let lower = field.lower_name();
            if field.value.iter().any(|&b| b >= 0x80) {
                self.report(WarningKind::UnencodedEightBitHeader, offset, Some(lower.clone()))?;
            }

            let value = field.unfolded_value();

            if SINGLE_OCCURRENCE.contains(&lower.as_str()) {
                if let Some((_, previous)) = seen.iter().find(|(n, _)| *n == lower) {
                    let kind = if *previous == value {
                        WarningKind::DuplicatedHeader
                    } else {
                        WarningKind::ConflictingHeader
                    };
                    self.report(kind, offset, Some(lower.clone()))?;
                    continue;
                }
                seen.push((lower.clone(), value.clone()));
            }

            if ENCODED_WORD_HEADERS.contains(&lower.as_str()) && has_malformed_encoded_word(&value) {
                self.report(WarningKind::InvalidRfc2047HeaderValue, offset, Some(lower.clone()))?;
            }

            match lower.as_str() {
                "content-type" => result.content_type = self.content_type(&value, offset)?,
                "content-disposition" => {
                    let pieces = split_parameters(&value);
                    self.parameters(pieces.get(1..).unwrap_or_default(), offset)?;
                }
                "content-transfer-encoding" => {
                    result.transfer_encoding = Some(value.trim().to_ascii_lowercase());
                }
                _ => {}
            }
        }

        Ok(result)
    }

    /// Parse a `Content-Type` value. An unusable media type falls back to the
    /// default after the warning.
    fn content_type(&mut self, value: &str, offset: usize) -> Result<Option<ContentType>> {
        let pieces = split_parameters(value);
        let media = pieces
            .first()
            .map(|m| m.trim().to_ascii_lowercase())
            .unwrap_or_default();

        let valid = media
            .split_once('/')
            .is_some_and(|(t, s)| is_token(t) && is_token(s));
        if !valid {
            self.report(WarningKind::InvalidContentType, offset, Some(value.to_string()))?;
            return Ok(None);
        }

        let params = self.parameters(pieces.get(1..).unwrap_or_default(), offset)?;
        Ok(Some(ContentType { media, params }))
    }

    fn parameters(&mut self, pieces: &[&str], offset: usize) -> Result<Vec<(String, String)>> {
        let mut params: Vec<(String, String)> = Vec::new();

        for piece in pieces.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
            let Some((name, value)) = piece.split_once('=') else {
                self.report(WarningKind::InvalidParameter, offset, Some(piece.to_string()))?;
                continue;
            };
            let name = name.trim().to_ascii_lowercase();
            if !is_token(&name) {
                self.report(WarningKind::InvalidParameter, offset, Some(piece.to_string()))?;
                continue;
            }
            let value = unquote(value.trim());

            if let Some((_, previous)) = params.iter().find(|(n, _)| *n == name) {
                let kind = if STRUCTURAL_PARAMETERS.contains(&name.as_str()) && *previous != value {
                    WarningKind::ConflictingParameter
                } else {
                    WarningKind::DuplicatedParameter
                };
                self.report(kind, offset, Some(name))?;
                continue;
            }
            params.push((name, value));
        }

        Ok(params)
    }

    fn multipart(
        &mut self,
        body: &[u8],
        base: usize,
        boundary: Option<&str>,
        digest: bool,
        depth: usize,
    ) -> Result<()> {
        let Some(boundary) = boundary else {
            return self.report(WarningKind::MultipartWithoutBoundary, base, None);
        };

        let delimiters = find_delimiters(body, boundary.as_bytes());
        if delimiters.is_empty() {
            return self.report(WarningKind::MalformedMultipart, base, Some(boundary.to_string()));
        }
        if !delimiters.iter().any(|d| d.closing) {
            self.report(WarningKind::TruncatedMessage, base + body.len(), Some(boundary.to_string()))?;
        }

        let default_type = if digest { "message/rfc822" } else { "text/plain" };

        for (i, delimiter) in delimiters.iter().enumerate() {
            if delimiter.closing {
                break;
            }
            let start = delimiter.line_end;
            let end = delimiters
                .get(i + 1)
                .map_or(body.len(), |next| next.content_end)
                .max(start);
            let child = &body[start..end];
            let split = split_header_block(child);
            self.entity(child, base + start, split, depth + 1, default_type)?;
        }
        Ok(())
    }

    fn embedded(&mut self, body: &[u8], base: usize, depth: usize) -> Result<()> {
        let split = split_header_block(body);
        let starts_with_field = raw_fields(&body[..split.header_end])
            .first()
            .is_some_and(|f| f.name.is_some());
        if !starts_with_field {
            return self.report(WarningKind::MalformedMessage, base, None);
        }
        self.message(body, base, depth + 1)
    }
}

/// A `--boundary` or `--boundary--` line inside a multipart body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Delimiter {
    /// End of the preceding part's content (the line break before the
    /// delimiter belongs to the delimiter).
    content_end: usize,
    /// First byte after the delimiter line.
    line_end: usize,
    closing: bool,
}

fn find_delimiters(body: &[u8], boundary: &[u8]) -> Vec<Delimiter> {
    let mut result = Vec::new();
    let mut pos = 0;

    while pos < body.len() {
        let line_end = match body[pos..].iter().position(|&b| b == b'\n') {
            Some(i) => pos + i + 1,
            None => body.len(),
        };
        let line = &body[pos..line_end];

        if let Some(rest) = line.strip_prefix(b"--").and_then(|l| l.strip_prefix(boundary)) {
            let (closing, tail) = match rest.strip_prefix(b"--") {
                Some(tail) => (true, tail),
                None => (false, rest),
            };
            if tail.iter().all(u8::is_ascii_whitespace) {
                let content_end = if body[..pos].ends_with(b"\r\n") {
                    pos - 2
                } else if body[..pos].ends_with(b"\n") {
                    pos - 1
                } else {
                    pos
                };
                result.push(Delimiter {
                    content_end,
                    line_end,
                    closing,
                });
            }
        }
        pos = line_end;
    }

    result
}

/// Split a header value on `;` outside of quoted strings.
fn split_parameters(value: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, ch) in value.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                pieces.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&value[start..]);
    pieces
}

/// RFC 2045 token (RFC 2231 `*` allowed).
fn is_token(s: &str) -> bool {
    const TSPECIALS: &[u8] = b"()<>@,;:\\\"/[]?=";
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_graphic() && !TSPECIALS.contains(&b))
}

fn unquote(s: &str) -> String {
    match s.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => s.to_string(),
    }
}
