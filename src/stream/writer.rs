//! Framed block writer for the output channel.
//!
//! Every block starts with
//! `\r\n--<boundary>\r\nContent-Disposition: form-data; name=<name>\r\n\r\n`
//! and the stream ends with `\r\n--<boundary>--`.

use std::io::{self, Write};

use serde_json::{json, Map, Value};
use tracing::{debug, error};

use crate::error::{Result, SplitError};

/// Owner of the output channel for one run.
///
/// Blocks are written strictly in sequence. [`PartStream::close`] is the
/// only way to end a stream normally; a stream dropped without it still
/// attempts an `error` block and the terminator.
pub struct PartStream<W: Write> {
    out: W,
    boundary: String,
    closed: bool,
}

impl<W: Write> PartStream<W> {
    pub fn new(out: W, boundary: impl Into<String>) -> Self {
        Self {
            out,
            boundary: boundary.into(),
            closed: false,
        }
    }

    fn frame(&mut self, name: &str) -> io::Result<()> {
        write!(
            self.out,
            "\r\n--{}\r\nContent-Disposition: form-data; name={}\r\n\r\n",
            self.boundary, name
        )
    }

    fn json_block(&mut self, name: &str, value: &Value) -> io::Result<()> {
        self.frame(name)?;
        serde_json::to_writer(&mut self.out, value)?;
        Ok(())
    }

    /// Write the `<i>.json`, `<i>.blob` and `progress` blocks of one part.
    pub fn write_part(
        &mut self,
        index: usize,
        envelope: Map<String, Value>,
        content: &[u8],
        total: usize,
    ) -> Result<()> {
        self.json_block(&format!("{index}.json"), &Value::Object(envelope))
            .map_err(SplitError::Output)?;

        self.frame(&format!("{index}.blob")).map_err(SplitError::Output)?;
        self.out.write_all(content).map_err(SplitError::BlobWrite)?;

        let progress = json!({ "children": { "nProcessed": index + 1, "nTotal": total } });
        self.json_block("progress", &progress)
            .map_err(SplitError::Output)?;

        debug!(index, total, bytes = content.len(), "Emitted part");
        Ok(())
    }

    /// End the stream: `done` on success, otherwise a single `error` block
    /// carrying the failure's message. Then the terminator, then a flush.
    pub fn close(mut self, outcome: Result<()>) -> io::Result<()> {
        self.closed = true;
        match outcome {
            Ok(()) => self.frame("done")?,
            Err(err) => {
                error!("{err}");
                self.frame("error")?;
                self.out.write_all(err.to_string().as_bytes())?;
            }
        }
        self.terminate()
    }

    fn interrupt(&mut self) -> io::Result<()> {
        self.frame("error")?;
        self.out.write_all(b"Processing was interrupted")?;
        self.terminate()
    }

    fn terminate(&mut self) -> io::Result<()> {
        write!(self.out, "\r\n--{}--", self.boundary)?;
        self.out.flush()
    }
}

impl<W: Write> Drop for PartStream<W> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        error!("Output stream dropped before completion");
        let _ = self.interrupt();
    }
}
