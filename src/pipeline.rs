//! One split run: request validation, staging, parsing, classification and
//! emission, ending at the stream's single exit point.

use std::io::{Read, Write};

use tracing::{debug, info};

use crate::config::StagingConfig;
use crate::error::Result;
use crate::model::part::Role;
use crate::model::request::InputRequest;
use crate::parser::mime::parse_message;
use crate::parser::warning::StrictPolicy;
use crate::split::classify;
use crate::split::metadata::{message_template, part_envelope};
use crate::staging;
use crate::stream::PartStream;

/// Inputs of a run besides the raw message itself.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Frame boundary token, supplied by the caller.
    pub boundary: String,
    /// The caller's request JSON, unparsed.
    pub request_json: String,
    pub staging: StagingConfig,
}

/// What a run produced.
#[derive(Debug)]
pub struct RunSummary {
    /// Parts fully emitted before the run ended.
    pub parts_emitted: usize,
    /// Whether one of the emitted parts was the body.
    pub body_emitted: bool,
    /// Content of the `error` block, when the stream ended with one.
    pub error: Option<String>,
}

impl RunSummary {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Default)]
struct Progress {
    parts: usize,
    body: bool,
}

/// Split the message read from `input` into framed blocks on `output`.
///
/// Never fails itself: every error ends up as the stream's `error` block.
/// An I/O error while writing the terminal frame is only logged.
pub fn run<R: Read, W: Write>(options: &RunOptions, input: R, output: W) -> RunSummary {
    let mut stream = PartStream::new(output, options.boundary.as_str());
    let mut progress = Progress::default();

    let outcome = split(options, input, &mut stream, &mut progress);
    let error = outcome.as_ref().err().map(ToString::to_string);

    if let Err(err) = stream.close(outcome) {
        tracing::error!(error = %err, "Failed to finish output stream");
    }
    info!(parts = progress.parts, body = progress.body, "Split finished");

    RunSummary {
        parts_emitted: progress.parts,
        body_emitted: progress.body,
        error,
    }
}

fn split<R: Read, W: Write>(
    options: &RunOptions,
    input: R,
    stream: &mut PartStream<W>,
    progress: &mut Progress,
) -> Result<()> {
    let request = InputRequest::from_json(&options.request_json)?;

    let staged = staging::stage(input, &options.staging)?;
    let raw = staged.read_all()?;

    let mut policy = StrictPolicy::new();
    let parsed = parse_message(&raw, &mut policy)?;
    debug!(tolerated = policy.tolerated(), "Parser warnings tolerated");
    let template = message_template(&request, parsed.envelope());
    let tree = parsed.tree();
    let parts = classify(&tree);
    let total = parts.len();
    debug!(total, "Classified parts");

    for part in &parts {
        let envelope = part_envelope(&template, part);
        stream.write_part(part.position, envelope, part.content(), total)?;
        progress.parts += 1;
        progress.body |= part.role == Role::Body;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(request_json: &str) -> RunOptions {
        RunOptions {
            boundary: "BOUNDARY".to_string(),
            request_json: request_json.to_string(),
            staging: StagingConfig::default(),
        }
    }

    const REQUEST: &str =
        r#"{"filename":"mail.eml","languageCode":"en","wantOcr":false,"wantSplitByPage":false,"metadata":{}}"#;

    #[test]
    fn test_request_is_validated_before_staging() {
        let mut opts = options(r#"{"languageCode":"en","metadata":{}}"#);
        opts.staging.dir = Some("/nonexistent/staging".into());
        let mut out = Vec::new();
        let summary = run(&opts, &b"Subject: x\r\n\r\nbody"[..], &mut out);
        assert_eq!(
            summary.error.as_deref(),
            Some("Input JSON is missing string 'filename'")
        );
        assert_eq!(summary.parts_emitted, 0);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Content-Disposition").count(), 1);
    }

    #[test]
    fn test_single_part_run() {
        let mut out = Vec::new();
        let summary = run(
            &options(REQUEST),
            &b"Subject: hi\r\nContent-Type: text/plain\r\n\r\nHello\r\n"[..],
            &mut out,
        );
        assert!(summary.succeeded());
        assert_eq!(summary.parts_emitted, 1);
        assert!(summary.body_emitted);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("name=0.json"));
        assert!(text.contains(r#""contentType":"text/plain""#));
        assert!(text.ends_with("name=done\r\n\r\n\r\n--BOUNDARY--"));
    }

    #[test]
    fn test_empty_input_is_invalid() {
        let mut out = Vec::new();
        let summary = run(&options(REQUEST), std::io::empty(), &mut out);
        assert_eq!(summary.error.as_deref(), Some("invalid email file"));
    }
}
