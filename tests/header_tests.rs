//! Integration tests for header decoding and envelope extraction.

use std::path::Path;

use chrono::{TimeZone, Utc};

use mailsplit::parser::header::{
    decode_encoded_words, parse_date, parse_envelope, skip_from_line, split_header_block,
};

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn envelope_of(name: &str) -> mailsplit::model::envelope::Envelope {
    let raw = std::fs::read(fixture(name)).unwrap();
    let raw = skip_from_line(&raw);
    let split = split_header_block(raw);
    parse_envelope(&raw[..split.header_end])
}

// ─── Envelope from fixtures ─────────────────────────────────────────

#[test]
fn test_envelope_addresses() {
    let envelope = envelope_of("multipart_attachments.eml");
    let from = envelope.from.expect("From");
    assert_eq!(from.to_header_string(), "Alice Example <alice@example.com>");
    let cc = envelope.cc.expect("Cc");
    assert_eq!(cc.to_header_string(), "\"Doe, John\" <john@example.com>");
    assert!(envelope.reply_to.is_none());
    assert!(envelope.bcc.is_none());
}

#[test]
fn test_envelope_threading_headers() {
    let envelope = envelope_of("multipart_attachments.eml");
    assert_eq!(envelope.message_id.as_deref(), Some("invoice-001@example.com"));
    assert_eq!(envelope.in_reply_to.as_deref(), Some("<request-42@example.com>"));
    assert_eq!(
        envelope.references.as_deref(),
        Some("<request-41@example.com> <request-42@example.com>")
    );
}

#[test]
fn test_envelope_subject_is_decoded() {
    let envelope = envelope_of("multipart_attachments.eml");
    assert_eq!(envelope.subject.as_deref(), Some("Invoice for March"));
}

#[test]
fn test_envelope_date_is_utc() {
    let envelope = envelope_of("single_part.eml");
    assert_eq!(
        envelope.date,
        Some(Utc.with_ymd_and_hms(2024, 4, 10, 16, 30, 0).unwrap())
    );
}

// ─── Date parsing in multiple formats ───────────────────────────────

#[test]
fn test_date_parsing_formats() {
    // RFC 2822 with day-of-week
    assert!(parse_date("Thu, 04 Jan 2024 10:00:00 +0000").is_some());
    // Without day-of-week
    assert!(parse_date("04 Jan 2024 10:00:00 +0000").is_some());
    // Named timezone
    assert_eq!(
        parse_date("Thu, 04 Jan 2024 10:00:00 EST"),
        Some(Utc.with_ymd_and_hms(2024, 1, 4, 15, 0, 0).unwrap())
    );
    // ISO 8601
    assert!(parse_date("2024-01-04T10:00:00Z").is_some());
    // Prefixed like a Received trace line
    assert_eq!(
        parse_date("from relay; Thu, 04 Jan 2024 10:00:00 +0100 (CET)"),
        Some(Utc.with_ymd_and_hms(2024, 1, 4, 9, 0, 0).unwrap())
    );
    assert!(parse_date("not a date").is_none());
}

// ─── Encoded words ──────────────────────────────────────────────────

#[test]
fn test_decode_encoded_words_base64_utf8() {
    assert_eq!(
        decode_encoded_words("=?UTF-8?B?SG9sYSBtdW5kbw==?="),
        "Hola mundo"
    );
}

#[test]
fn test_decode_encoded_words_q_iso8859() {
    assert_eq!(decode_encoded_words("=?ISO-8859-1?Q?caf=E9?="), "café");
}

#[test]
fn test_decode_encoded_words_plain_passthrough() {
    assert_eq!(decode_encoded_words("Normal subject"), "Normal subject");
}
