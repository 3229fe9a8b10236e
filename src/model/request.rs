//! The caller-supplied request that travels alongside the raw message.

use serde_json::{Map, Value};

use crate::error::{Result, SplitError};

/// Validated caller input.
///
/// Only presence and type are checked: an empty `filename` is accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRequest {
    pub filename: String,
    pub language_code: String,
    pub want_ocr: bool,
    pub want_split_by_page: bool,
    /// Arbitrary caller metadata, copied into every part.
    pub metadata: Map<String, Value>,
}

impl InputRequest {
    /// Parse and validate the request JSON.
    ///
    /// Missing or non-boolean `wantOcr` / `wantSplitByPage` read as `false`.
    pub fn from_json(text: &str) -> Result<Self> {
        let root = match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(root)) => root,
            _ => return Err(SplitError::RequestNotObject),
        };

        let string = |field: &'static str| -> Result<String> {
            root.get(field)
                .and_then(Value::as_str)
                .map(String::from)
                .ok_or(SplitError::missing_string(field))
        };
        let flag = |field: &str| root.get(field).and_then(Value::as_bool).unwrap_or(false);

        let filename = string("filename")?;
        let language_code = string("languageCode")?;
        let want_ocr = flag("wantOcr");
        let want_split_by_page = flag("wantSplitByPage");
        let metadata = root
            .get("metadata")
            .and_then(Value::as_object)
            .cloned()
            .ok_or(SplitError::missing_object("metadata"))?;

        Ok(Self {
            filename,
            language_code,
            want_ocr,
            want_split_by_page,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_request() {
        let req = InputRequest::from_json(
            r#"{"filename":"mail.eml","languageCode":"en","wantOcr":true,"wantSplitByPage":false,"metadata":{"foo":"bar"}}"#,
        )
        .unwrap();
        assert_eq!(req.filename, "mail.eml");
        assert_eq!(req.language_code, "en");
        assert!(req.want_ocr);
        assert!(!req.want_split_by_page);
        assert_eq!(req.metadata.get("foo"), Some(&Value::from("bar")));
    }

    #[test]
    fn test_empty_filename_is_accepted() {
        let req = InputRequest::from_json(
            r#"{"filename":"","languageCode":"en","wantOcr":false,"wantSplitByPage":false,"metadata":{}}"#,
        )
        .unwrap();
        assert_eq!(req.filename, "");
    }

    #[test]
    fn test_missing_flags_default_to_false() {
        let req =
            InputRequest::from_json(r#"{"filename":"a","languageCode":"en","metadata":{}}"#).unwrap();
        assert!(!req.want_ocr);
        assert!(!req.want_split_by_page);
    }

    #[test]
    fn test_not_an_object() {
        for text in ["[]", "\"x\"", "not json", ""] {
            let err = InputRequest::from_json(text).unwrap_err();
            assert_eq!(err.to_string(), "Input JSON was not an Object");
        }
    }

    #[test]
    fn test_missing_filename() {
        let err = InputRequest::from_json(r#"{"languageCode":"en","metadata":{}}"#).unwrap_err();
        assert_eq!(err.to_string(), "Input JSON is missing string 'filename'");
    }

    #[test]
    fn test_non_string_language_code() {
        let err = InputRequest::from_json(r#"{"filename":"a","languageCode":3,"metadata":{}}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "Input JSON is missing string 'languageCode'");
    }

    #[test]
    fn test_metadata_must_be_object() {
        let err = InputRequest::from_json(r#"{"filename":"a","languageCode":"en","metadata":[]}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "Input JSON is missing object 'metadata'");
    }
}
