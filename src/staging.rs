//! Input staging: copy the raw message into a seekable temporary file.
//!
//! The input is read exactly once, front to back. Parsing then works from a
//! fresh handle positioned at offset 0.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};

use humansize::{format_size, BINARY};
use tempfile::NamedTempFile;

use crate::config::StagingConfig;
use crate::error::{Result, SplitError};

/// The staged copy of the input. The file is removed on drop.
#[derive(Debug)]
pub struct StagedInput {
    file: NamedTempFile,
    len: u64,
}

/// Copy `input` into a new staging file.
pub fn stage<R: Read>(input: R, config: &StagingConfig) -> Result<StagedInput> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("mailsplit-").suffix(".blob");
    let file = match &config.dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(SplitError::StagingCreate)?;

    let capacity = config.buffer_size.max(1);
    let mut reader = BufReader::with_capacity(capacity, input);
    let mut writer = BufWriter::with_capacity(capacity, file.as_file());
    let len = io::copy(&mut reader, &mut writer).map_err(SplitError::StagingCopy)?;
    writer.flush().map_err(SplitError::StagingCopy)?;
    drop(writer);

    tracing::info!(
        path = %file.path().display(),
        size = %format_size(len, BINARY),
        "Staged input"
    );
    Ok(StagedInput { file, len })
}

impl StagedInput {
    /// Number of bytes staged.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// A new handle on the staged bytes, positioned at offset 0.
    pub fn reader(&self) -> Result<File> {
        let mut handle = self.file.reopen().map_err(SplitError::StagingRead)?;
        handle
            .seek(SeekFrom::Start(0))
            .map_err(SplitError::StagingRead)?;
        Ok(handle)
    }

    /// Read the whole staged input back into memory.
    pub fn read_all(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(usize::try_from(self.len).unwrap_or(0));
        self.reader()?
            .read_to_end(&mut buf)
            .map_err(SplitError::StagingRead)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "gone"))
        }
    }

    #[test]
    fn test_stage_round_trips_bytes() {
        let data: Vec<u8> = (0..=255u8).cycle().take(300_000).collect();
        let staged = stage(&data[..], &StagingConfig::default()).unwrap();
        assert_eq!(staged.len(), data.len() as u64);
        assert_eq!(staged.read_all().unwrap(), data);
    }

    #[test]
    fn test_reader_is_fresh_each_time() {
        let staged = stage(&b"Subject: x\r\n\r\nbody"[..], &StagingConfig::default()).unwrap();
        let mut first = String::new();
        staged.reader().unwrap().read_to_string(&mut first).unwrap();
        let mut second = String::new();
        staged.reader().unwrap().read_to_string(&mut second).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("Subject"));
    }

    #[test]
    fn test_stage_in_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = StagingConfig {
            dir: Some(dir.path().to_path_buf()),
            buffer_size: 16,
        };
        let staged = stage(&b"abc"[..], &config).unwrap();
        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("mailsplit-"));
        assert!(names[0].ends_with(".blob"));

        drop(staged);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_empty_input() {
        let staged = stage(io::empty(), &StagingConfig::default()).unwrap();
        assert!(staged.is_empty());
        assert!(staged.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_missing_dir_is_create_error() {
        let config = StagingConfig {
            dir: Some("/nonexistent/mailsplit/staging".into()),
            ..StagingConfig::default()
        };
        let err = stage(&b"x"[..], &config).unwrap_err();
        assert_eq!(err.to_string(), "Could not open staging buffer for write");
    }

    #[test]
    fn test_failed_read_is_copy_error() {
        let err = stage(BrokenReader, &StagingConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "Could not stream input to staging buffer");
    }
}
