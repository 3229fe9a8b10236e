//! RFC 5322 header handling: header-block splitting, folding, encoded-words
//! (RFC 2047) and date parsing.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tracing::warn;

use crate::model::address::AddressList;
use crate::model::envelope::Envelope;

/// Location of a header block inside an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSplit {
    /// End of the header bytes (exclusive), before the blank separator line.
    pub header_end: usize,
    /// First byte of the body.
    pub body_start: usize,
    /// `true` when a blank line terminated the header block.
    pub terminated: bool,
}

/// Find the blank line separating headers from body.
///
/// Accepts both `\n\n` and `\r\n\r\n`. Without a blank line the whole entity
/// is treated as headers and the body is empty.
pub fn split_header_block(data: &[u8]) -> HeaderSplit {
    let mut pos = 0;
    while pos < data.len() {
        let line_end = match data[pos..].iter().position(|&b| b == b'\n') {
            Some(i) => pos + i + 1,
            None => data.len(),
        };
        let line = &data[pos..line_end];
        if line == b"\n" || line == b"\r\n" {
            return HeaderSplit {
                header_end: pos,
                body_start: line_end,
                terminated: true,
            };
        }
        pos = line_end;
    }
    HeaderSplit {
        header_end: data.len(),
        body_start: data.len(),
        terminated: false,
    }
}

/// Skip a UTF-8 BOM and the `From ` separator line of mbox-exported messages.
pub fn skip_from_line(data: &[u8]) -> &[u8] {
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);

    if data.starts_with(b"From ") {
        if let Some(pos) = data.iter().position(|&b| b == b'\n') {
            return &data[pos + 1..];
        }
    }
    data
}

/// One header field as it appears in the raw block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField<'a> {
    /// Offset of the first byte of the field within the block.
    pub offset: usize,
    /// Field name as written, or `None` for a line with no colon.
    pub name: Option<&'a [u8]>,
    /// Raw value bytes, continuation lines included, line endings kept.
    pub value: &'a [u8],
}

impl RawField<'_> {
    /// Lower-cased field name (lossy).
    pub fn lower_name(&self) -> String {
        self.name
            .map(|n| String::from_utf8_lossy(n).trim().to_ascii_lowercase())
            .unwrap_or_default()
    }

    /// Unfolded, decoded value.
    pub fn unfolded_value(&self) -> String {
        unfold_value(&decode_header_bytes(self.value))
    }
}

/// Split a raw header block into fields, keeping continuation lines with
/// the field they belong to.
///
/// A leading continuation line (no field to attach to) is reported as a
/// nameless field.
pub fn raw_fields(block: &[u8]) -> Vec<RawField<'_>> {
    let mut fields: Vec<RawField<'_>> = Vec::new();
    let mut pos = 0;

    while pos < block.len() {
        let line_end = match block[pos..].iter().position(|&b| b == b'\n') {
            Some(i) => pos + i + 1,
            None => block.len(),
        };
        let line = &block[pos..line_end];
        let is_continuation = line.first().is_some_and(|&b| b == b' ' || b == b'\t');

        if is_continuation {
            if let Some(last) = fields.last_mut() {
                let start = last.offset + last.name.map_or(0, |n| n.len() + 1);
                last.value = &block[start..line_end];
                pos = line_end;
                continue;
            }
        }

        match line.iter().position(|&b| b == b':') {
            Some(colon) if !is_continuation => fields.push(RawField {
                offset: pos,
                name: Some(&line[..colon]),
                value: &block[pos + colon + 1..line_end],
            }),
            _ => fields.push(RawField {
                offset: pos,
                name: None,
                value: line,
            }),
        }
        pos = line_end;
    }

    fields
}

/// Decode raw header bytes to a string.
///
/// Tries UTF-8 first, then falls back to Windows-1252 (which accepts every byte).
pub fn decode_header_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Join folded lines of one value with single spaces.
fn unfold_value(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Unfold headers: join continuation lines (starting with space or tab) with the previous header.
///
/// Returns a list of `(lowercase_name, value)` pairs in order of appearance.
pub fn unfold_headers(block: &[u8]) -> Vec<(String, String)> {
    raw_fields(block)
        .iter()
        .filter(|f| f.name.is_some())
        .map(|f| (f.lower_name(), f.unfolded_value()))
        .collect()
}

/// Get the first value for a header name (lowercase).
fn get_header(headers: &[(String, String)], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.clone())
}

/// Build the message [`Envelope`] from the top-level header block.
pub fn parse_envelope(header_block: &[u8]) -> Envelope {
    let headers = unfold_headers(header_block);

    let address = |name: &str| -> Option<AddressList> {
        let raw = get_header(&headers, name)?;
        let mut list = AddressList::parse(&raw);
        list.decode_names(decode_encoded_words);
        (!list.is_empty()).then_some(list)
    };

    let date = get_header(&headers, "date").and_then(|raw| parse_date(&raw));

    let subject = get_header(&headers, "subject").map(|s| decode_encoded_words(&s));

    let message_id = get_header(&headers, "message-id")
        .map(|s| strip_angle_brackets(&s))
        .filter(|s| !s.is_empty());

    Envelope {
        to: address("to"),
        reply_to: address("reply-to"),
        from: address("from"),
        cc: address("cc"),
        bcc: address("bcc"),
        date,
        subject,
        message_id,
        in_reply_to: get_header(&headers, "in-reply-to"),
        references: get_header(&headers, "references"),
    }
}

/// Decode RFC 2047 encoded-words in a header value.
///
/// Example: `"=?UTF-8?B?SG9sYQ==?= =?UTF-8?B?IG11bmRv?="` → `"Hola mundo"`
///
/// If decoding fails for any token, the original text is preserved.
pub fn decode_encoded_words(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut remaining = input;
    let mut last_was_encoded = false;

    while let Some(start) = remaining.find("=?") {
        let before = &remaining[..start];
        // Whitespace between two encoded words is dropped (RFC 2047 §6.2)
        if !last_was_encoded || !before.trim().is_empty() {
            result.push_str(before);
        }

        let after_start = &remaining[start + 2..];

        if let Some(decoded) = try_decode_one_word(after_start) {
            result.push_str(&decoded.text);
            remaining = &remaining[start + 2 + decoded.consumed..];
            last_was_encoded = true;
        } else {
            result.push_str("=?");
            remaining = after_start;
            last_was_encoded = false;
        }
    }

    result.push_str(remaining);
    result
}

/// `true` if `input` holds a token shaped like an encoded-word
/// (`=?charset?encoding?text?=`) that is not well formed.
///
/// An `=?` inside a word or without the closing `?=`, as in `x=?y`, is
/// ordinary text.
pub fn has_malformed_encoded_word(input: &str) -> bool {
    let mut from = 0;
    while let Some(found) = input[from..].find("=?") {
        let start = from + found;
        let starts_token = input[..start]
            .chars()
            .next_back()
            .map_or(true, |c| c.is_whitespace() || c == '"' || c == '(');
        match split_encoded_word(&input[start + 2..]) {
            Some(word) if starts_token && word.has_shape() => {
                if !word.is_well_formed() {
                    return true;
                }
                from = start + 2 + word.consumed;
            }
            _ => from = start + 2,
        }
    }
    false
}

struct EncodedWord<'a> {
    charset: &'a str,
    encoding: &'a str,
    text: &'a str,
    consumed: usize, // bytes consumed from the string *after* the initial "=?"
}

impl EncodedWord<'_> {
    fn has_shape(&self) -> bool {
        let atom = |s: &str| !s.is_empty() && !s.contains(char::is_whitespace);
        atom(self.charset) && atom(self.encoding)
    }

    fn is_well_formed(&self) -> bool {
        let token = |s: &str| {
            !s.is_empty() && s.bytes().all(|b| b.is_ascii_graphic() && b != b'?')
        };
        if !token(self.charset) || self.text.bytes().any(|b| b.is_ascii_whitespace()) {
            return false;
        }
        match self.encoding {
            "B" | "b" => self
                .text
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'='),
            "Q" | "q" => true,
            _ => false,
        }
    }
}

fn split_encoded_word(s: &str) -> Option<EncodedWord<'_>> {
    // Format: charset?encoding?encoded_text?=
    let first_q = s.find('?')?;
    let charset = &s[..first_q];

    let rest = &s[first_q + 1..];
    let second_q = rest.find('?')?;
    let encoding = &rest[..second_q];

    let rest2 = &rest[second_q + 1..];
    let end = rest2.find("?=")?;
    let text = &rest2[..end];

    Some(EncodedWord {
        charset,
        encoding,
        text,
        consumed: first_q + 1 + second_q + 1 + end + 2,
    })
}

struct DecodedWord {
    text: String,
    consumed: usize,
}

fn try_decode_one_word(s: &str) -> Option<DecodedWord> {
    let word = split_encoded_word(s)?;

    let bytes = match word.encoding.to_uppercase().as_str() {
        "B" => {
            use std::io::Read;
            let mut decoder = base64_decode_reader(word.text.as_bytes());
            let mut buf = Vec::new();
            decoder.read_to_end(&mut buf).ok()?;
            buf
        }
        "Q" => decode_q_encoding(word.text),
        _ => return None,
    };

    // RFC 2231 language suffix: "utf-8*en"
    let charset = word.charset.split('*').next().unwrap_or(word.charset);

    Some(DecodedWord {
        text: decode_charset(charset, &bytes),
        consumed: word.consumed,
    })
}

/// Minimal base64 decoder (reads from a byte slice).
fn base64_decode_reader(input: &[u8]) -> impl std::io::Read + '_ {
    struct Base64Reader<'a> {
        input: &'a [u8],
        pos: usize,
        buf: [u8; 3],
        buf_len: usize,
        buf_pos: usize,
    }

    impl std::io::Read for Base64Reader<'_> {
        fn read(&mut self, out: &mut [u8]) -> std::io::Result<usize> {
            let mut written = 0;
            while written < out.len() {
                if self.buf_pos < self.buf_len {
                    out[written] = self.buf[self.buf_pos];
                    self.buf_pos += 1;
                    written += 1;
                    continue;
                }
                let mut quad = [0u8; 4];
                let mut qi = 0;
                while qi < 4 {
                    if self.pos >= self.input.len() {
                        if qi == 0 {
                            return Ok(written);
                        }
                        while qi < 4 {
                            quad[qi] = b'=';
                            qi += 1;
                        }
                        break;
                    }
                    let b = self.input[self.pos];
                    self.pos += 1;
                    if b.is_ascii_whitespace() {
                        continue;
                    }
                    quad[qi] = b;
                    qi += 1;
                }
                let vals: [u8; 4] = quad.map(b64val);
                self.buf[0] = (vals[0] << 2) | (vals[1] >> 4);
                self.buf[1] = (vals[1] << 4) | (vals[2] >> 2);
                self.buf[2] = (vals[2] << 6) | vals[3];
                self.buf_len = match (quad[2], quad[3]) {
                    (b'=', b'=') => 1,
                    (_, b'=') => 2,
                    _ => 3,
                };
                self.buf_pos = 0;
            }
            Ok(written)
        }
    }

    fn b64val(c: u8) -> u8 {
        match c {
            b'A'..=b'Z' => c - b'A',
            b'a'..=b'z' => c - b'a' + 26,
            b'0'..=b'9' => c - b'0' + 52,
            b'+' => 62,
            b'/' => 63,
            _ => 0,
        }
    }

    Base64Reader {
        input,
        pos: 0,
        buf: [0; 3],
        buf_len: 0,
        buf_pos: 0,
    }
}

/// Decode Q-encoding (RFC 2047): underscores → spaces, `=XX` → byte.
fn decode_q_encoding(input: &str) -> Vec<u8> {
    let mut result = Vec::with_capacity(input.len());
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'_' => {
                result.push(b' ');
                i += 1;
            }
            b'=' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).unwrap_or("");
                if let Ok(byte) = u8::from_str_radix(hex, 16) {
                    result.push(byte);
                    i += 3;
                } else {
                    result.push(b'=');
                    i += 1;
                }
            }
            b => {
                result.push(b);
                i += 1;
            }
        }
    }
    result
}

/// Decode bytes using a named charset.
fn decode_charset(charset: &str, bytes: &[u8]) -> String {
    let charset_lower = charset.to_lowercase();
    match charset_lower.as_str() {
        "utf-8" | "utf8" => String::from_utf8_lossy(bytes).into_owned(),
        _ => {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(bytes);
                decoded.into_owned()
            } else {
                warn!(charset = charset, "Unknown charset, falling back to UTF-8 lossy");
                String::from_utf8_lossy(bytes).into_owned()
            }
        }
    }
}

/// Content of the first `<…>` token, or the trimmed value when there is none.
fn strip_angle_brackets(s: &str) -> String {
    let trimmed = s.trim();
    if let Some(start) = trimmed.find('<') {
        if let Some(end) = trimmed[start..].find('>') {
            return trimmed[start + 1..start + end].trim().to_string();
        }
    }
    trimmed.to_string()
}

/// Parse an email date string in various common formats.
///
/// Supports RFC 2822, ISO 8601, and many broken real-world variants.
pub fn parse_date(date_str: &str) -> Option<DateTime<Utc>> {
    let trimmed = date_str.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    let no_comment = strip_trailing_comment(trimmed);
    let no_dow = strip_day_of_week(&no_comment);
    let no_dow_normalized = normalize_imap_date(&no_dow);

    let formats = [
        "%d %b %Y %H:%M:%S %z",
        "%d %b %Y %H:%M %z",
        "%d %b %Y %H:%M:%S",
        "%b %d %H:%M:%S %Y",
        "%Y-%m-%dT%H:%M:%S%z",
        "%Y-%m-%dT%H:%M:%SZ",
        "%Y-%m-%d %H:%M:%S %z",
        "%Y-%m-%d %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
    ];

    for candidate in [&no_dow, &no_dow_normalized] {
        for fmt in &formats {
            if let Ok(dt) = DateTime::parse_from_str(candidate, fmt) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(ndt) = NaiveDateTime::parse_from_str(candidate, fmt) {
                return Some(Utc.from_utc_datetime(&ndt));
            }
        }
    }

    for candidate in [&no_dow, &no_dow_normalized] {
        let replaced = replace_named_tz(candidate);
        for fmt in &formats {
            if let Ok(dt) = DateTime::parse_from_str(&replaced, fmt) {
                return Some(dt.with_timezone(&Utc));
            }
        }
    }

    // mail-parser's tolerant parser as last resort
    if let Some(dt) = mail_parser_date(trimmed) {
        return Some(dt);
    }

    warn!(date = trimmed, "Could not parse date");
    None
}

/// Parse with `mail-parser`'s RFC 822 date scanner, which skips comments,
/// `Received`-style prefixes and stray tokens.
fn mail_parser_date(input: &str) -> Option<DateTime<Utc>> {
    let parsed =
        mail_parser::DateTime::parse_rfc822(input).filter(mail_parser::DateTime::is_valid)?;
    DateTime::parse_from_rfc3339(&parsed.to_rfc3339())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Drop a trailing `(comment)` such as `"+0000 (UTC)"`.
fn strip_trailing_comment(s: &str) -> String {
    match (s.rfind('('), s.ends_with(')')) {
        (Some(pos), true) => s[..pos].trim().to_string(),
        _ => s.to_string(),
    }
}

/// Normalize IMAP-style dates: `"16-JUL-2025 03:01:03"` → `"16 Jul 2025 03:01:03"`.
fn normalize_imap_date(s: &str) -> String {
    if !s.contains('-') {
        return s.to_string();
    }

    let title_months = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    for month in &title_months {
        for variant in [month.to_uppercase(), month.to_lowercase(), month.to_string()] {
            let pattern = format!("-{variant}-");
            if s.contains(&pattern) {
                return s.replacen(&pattern, &format!(" {month} "), 1);
            }
        }
    }

    s.to_string()
}

/// Strip leading day-of-week prefix (e.g. "Thu, " or "Thu ").
fn strip_day_of_week(s: &str) -> String {
    let days = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    for day in &days {
        if let Some(rest) = s.strip_prefix(day) {
            if rest.starts_with(',') || rest.starts_with(' ') {
                return rest.trim_start_matches(',').trim().to_string();
            }
        }
    }
    s.to_string()
}

/// Replace well-known timezone abbreviations with numeric offsets.
fn replace_named_tz(s: &str) -> String {
    let tzs = [
        ("EST", "-0500"),
        ("EDT", "-0400"),
        ("CST", "-0600"),
        ("CDT", "-0500"),
        ("MST", "-0700"),
        ("MDT", "-0600"),
        ("PST", "-0800"),
        ("PDT", "-0700"),
        ("GMT", "+0000"),
        ("UTC", "+0000"),
        ("UT", "+0000"),
        ("CEST", "+0200"),
        ("CET", "+0100"),
        ("JST", "+0900"),
    ];
    let mut result = s.to_string();
    for (name, offset) in &tzs {
        if result.ends_with(&format!(" {name}")) {
            let pos = result.len() - name.len();
            result.replace_range(pos.., offset);
            return result;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_header_block_lf() {
        let data = b"From: a@b.com\nSubject: Hi\n\nBody\n";
        let split = split_header_block(data);
        assert_eq!(split.header_end, 26);
        assert_eq!(split.body_start, 27);
        assert!(split.terminated);
        assert_eq!(&data[split.body_start..], b"Body\n");
    }

    #[test]
    fn test_split_header_block_crlf() {
        let data = b"From: a@b.com\r\nSubject: Hi\r\n\r\nBody\r\n";
        let split = split_header_block(data);
        assert_eq!(&data[..split.header_end], b"From: a@b.com\r\nSubject: Hi\r\n");
        assert_eq!(&data[split.body_start..], b"Body\r\n");
    }

    #[test]
    fn test_split_header_block_unterminated() {
        let data = b"Subject: Hi";
        let split = split_header_block(data);
        assert!(!split.terminated);
        assert_eq!(split.header_end, data.len());
        assert_eq!(split.body_start, data.len());
    }

    #[test]
    fn test_skip_from_line() {
        let data = b"From user@example.com Thu Jan 01 00:00:00 2024\nSubject: Test\n\nBody\n";
        assert!(skip_from_line(data).starts_with(b"Subject:"));
        let plain = b"Subject: Test\n\nBody\n";
        assert_eq!(skip_from_line(plain), plain);
    }

    #[test]
    fn test_raw_fields_keep_continuations() {
        let block = b"Subject: This is a long\n\tsubject line\nFrom: user@example.com\n";
        let fields = raw_fields(block);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].lower_name(), "subject");
        assert_eq!(fields[0].unfolded_value(), "This is a long subject line");
        assert_eq!(fields[1].offset, 38);
    }

    #[test]
    fn test_raw_fields_line_without_colon() {
        let fields = raw_fields(b"Subject: x\nnot a header\n");
        assert_eq!(fields.len(), 2);
        assert!(fields[1].name.is_none());
    }

    #[test]
    fn test_unfold_headers() {
        let headers = unfold_headers(b"Subject: This is a long\n\tsubject line\nFrom: user@example.com\n");
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].0, "subject");
        assert_eq!(headers[0].1, "This is a long subject line");
    }

    #[test]
    fn test_parse_envelope() {
        let block = b"From: =?UTF-8?Q?Jos=C3=A9?= <jose@example.com>\n\
To: a@b.com, \"Last, First\" <c@d.com>\n\
Date: Thu, 04 Jan 2024 10:00:00 +0200\n\
Subject: =?UTF-8?B?SG9sYSBtdW5kbw==?=\n\
Message-ID: <msg001@example.com>\n\
In-Reply-To: <parent@example.com>\n\
References: <root@example.com>\n <parent@example.com>\n";
        let env = parse_envelope(block);
        assert_eq!(
            env.from.as_ref().map(AddressList::to_header_string).as_deref(),
            Some("José <jose@example.com>")
        );
        assert_eq!(
            env.to.as_ref().map(AddressList::to_header_string).as_deref(),
            Some("a@b.com, \"Last, First\" <c@d.com>")
        );
        assert!(env.cc.is_none());
        assert_eq!(
            env.date.map(|d| d.format("%FT%TZ").to_string()).as_deref(),
            Some("2024-01-04T08:00:00Z")
        );
        assert_eq!(env.subject.as_deref(), Some("Hola mundo"));
        assert_eq!(env.message_id.as_deref(), Some("msg001@example.com"));
        assert_eq!(env.in_reply_to.as_deref(), Some("<parent@example.com>"));
        assert_eq!(
            env.references.as_deref(),
            Some("<root@example.com> <parent@example.com>")
        );
    }

    #[test]
    fn test_parse_envelope_empty_address_header() {
        let env = parse_envelope(b"To: \nCc: ,\n");
        assert!(env.to.is_none());
        assert!(env.cc.is_none());
    }

    #[test]
    fn test_decode_base64_encoded_word() {
        assert_eq!(decode_encoded_words("=?UTF-8?B?SG9sYSBtdW5kbw==?="), "Hola mundo");
    }

    #[test]
    fn test_decode_q_encoded_word() {
        assert_eq!(decode_encoded_words("=?ISO-8859-1?Q?caf=E9?="), "café");
    }

    #[test]
    fn test_decode_multiple_encoded_words() {
        let input = "=?UTF-8?B?SG9sYQ==?= =?UTF-8?B?IG11bmRv?=";
        assert_eq!(decode_encoded_words(input), "Hola mundo");
    }

    #[test]
    fn test_decode_mixed_plain_and_encoded() {
        let input = "Re: =?UTF-8?B?SG9sYQ==?= there";
        assert_eq!(decode_encoded_words(input), "Re: Hola there");
    }

    #[test]
    fn test_malformed_encoded_word_detection() {
        assert!(!has_malformed_encoded_word("plain subject"));
        assert!(!has_malformed_encoded_word("=?UTF-8?B?SG9sYQ==?= ok"));
        assert!(!has_malformed_encoded_word("=?ISO-8859-1?Q?caf=E9?="));
        assert!(has_malformed_encoded_word("=?UTF-8?X?abc?="));
        assert!(has_malformed_encoded_word("=?UTF-8?B?not base64!?="));
        assert!(has_malformed_encoded_word("re: =?UTF-8?B?not base64!?= again"));
    }

    #[test]
    fn test_stray_encoded_word_marker_is_text() {
        assert!(!has_malformed_encoded_word("Is x=?y the answer"));
        assert!(!has_malformed_encoded_word("Is =?y the answer"));
        assert!(!has_malformed_encoded_word("broken =?UTF-8?Q?never closed"));
        assert!(!has_malformed_encoded_word("a=?b?c?d?=e"));
        assert_eq!(decode_encoded_words("Is x=?y the answer"), "Is x=?y the answer");
    }

    #[test]
    fn test_parse_date_rfc2822() {
        let dt = parse_date("Thu, 04 Jan 2024 10:00:00 +0000").unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2024-01-04");
    }

    #[test]
    fn test_parse_date_with_comment() {
        let dt = parse_date("Thu, 04 Jan 2024 10:00:00 +0000 (UTC)").unwrap();
        assert_eq!(dt.format("%FT%TZ").to_string(), "2024-01-04T10:00:00Z");
    }

    #[test]
    fn test_parse_date_named_tz() {
        let dt = parse_date("Thu, 04 Jan 2024 10:00:00 EST").unwrap();
        assert_eq!(dt.format("%H").to_string(), "15");
    }

    #[test]
    fn test_parse_date_imap_style() {
        let dt = parse_date("16-JUL-2025 03:01:03").unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2025-07-16");
    }

    #[test]
    fn test_parse_date_falls_back_to_mail_parser() {
        let dt = parse_date("mx.example.com with SMTP id 42; Mon, 10 Oct 2022 10:31:15 -0700 (PDT)")
            .unwrap();
        assert_eq!(dt.to_rfc3339(), "2022-10-10T17:31:15+00:00");
    }

    #[test]
    fn test_parse_date_garbage() {
        assert!(parse_date("not a date").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_strip_angle_brackets() {
        assert_eq!(strip_angle_brackets(" <msg001@example.com> "), "msg001@example.com");
        assert_eq!(strip_angle_brackets("bare-id@example.com"), "bare-id@example.com");
    }
}
