//! Per-part JSON: a message-level template built once, then one copy per
//! emitted part with its own `filename` and `contentType`.

use serde_json::{Map, Value};

use crate::model::address::AddressList;
use crate::model::envelope::Envelope;
use crate::model::part::ClassifiedPart;
use crate::model::request::InputRequest;

/// Wire format of the `Date` member.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Copy `base` and apply `overrides` on top of it; later keys win.
///
/// Neither input is modified, so a template can be extended any number of
/// times.
pub fn extend_object(base: &Map<String, Value>, overrides: Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    merged.extend(overrides);
    merged
}

/// Build the object shared by every part of one message.
pub fn message_template(request: &InputRequest, envelope: &Envelope) -> Map<String, Value> {
    let mut template = Map::new();
    template.insert("filename".into(), Value::from(request.filename.as_str()));
    template.insert("wantOcr".into(), Value::Bool(request.want_ocr));
    template.insert("wantSplitByPage".into(), Value::Bool(request.want_split_by_page));
    template.insert("languageCode".into(), Value::from(request.language_code.as_str()));
    template.insert(
        "metadata".into(),
        Value::Object(extend_object(&request.metadata, derived_metadata(envelope))),
    );
    template
}

/// Extend the template for one part.
///
/// `filename` becomes `"<request filename>/<part filename>"` only when the
/// part names a file of its own.
pub fn part_envelope(template: &Map<String, Value>, part: &ClassifiedPart<'_, '_>) -> Map<String, Value> {
    let mut overrides = Map::new();
    if let Some(name) = &part.filename {
        let original = template
            .get("filename")
            .and_then(Value::as_str)
            .unwrap_or_default();
        overrides.insert("filename".into(), Value::from(format!("{original}/{name}")));
    }
    overrides.insert("contentType".into(), Value::from(part.content_type.as_str()));
    extend_object(template, overrides)
}

fn derived_metadata(envelope: &Envelope) -> Map<String, Value> {
    let mut derived = Map::new();

    let addresses = [
        ("To", &envelope.to),
        ("Reply-To", &envelope.reply_to),
        ("From", &envelope.from),
        ("Cc", &envelope.cc),
        ("Bcc", &envelope.bcc),
    ];
    for (key, list) in addresses {
        if let Some(text) = list.as_ref().map(AddressList::to_header_string) {
            if !text.is_empty() {
                derived.insert(key.into(), Value::from(text));
            }
        }
    }

    if let Some(date) = envelope.date {
        derived.insert("Date".into(), Value::from(date.format(DATE_FORMAT).to_string()));
    }

    let verbatim = [
        ("Subject", &envelope.subject),
        ("Message-ID", &envelope.message_id),
        ("In-Reply-To", &envelope.in_reply_to),
        ("References", &envelope.references),
    ];
    for (key, value) in verbatim {
        derived.insert(key.into(), value.as_deref().map_or(Value::Null, Value::from));
    }

    derived
}
