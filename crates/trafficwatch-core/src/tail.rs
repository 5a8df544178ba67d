use crate::error::{IngestError, IngestResult};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// New content pulled from the log source since the last committed cursor.
#[derive(Debug, Default)]
pub struct TailChunk {
    /// Complete lines, newline stripped.
    pub lines: Vec<String>,
    /// The source shrank below the cursor; lines were re-read from offset 0.
    pub truncated: bool,
}

/// Byte-offset cursor over a single append-only log file. The file is
/// reopened on every read so the source may appear, disappear and reappear
/// between periods.
#[derive(Debug)]
pub struct LogTail {
    path: PathBuf,
    position: u64,
    primed: bool,
}

impl LogTail {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            position: 0,
            primed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reads every complete line appended since the committed cursor.
    ///
    /// The very first call seeks to end-of-file and returns nothing: history
    /// written before monitoring started is ignored. A final line without a
    /// trailing newline is held back until the writer completes it. The
    /// cursor commits only after the whole read succeeds; on error the
    /// cursor is exactly what it was before the call.
    pub fn read_new(&mut self) -> IngestResult<TailChunk> {
        let meta = std::fs::metadata(&self.path).map_err(|source| {
            IngestError::SourceUnavailable {
                path: self.path.display().to_string(),
                source,
            }
        })?;
        let file_size = meta.len();

        if !self.primed {
            self.primed = true;
            self.position = file_size;
            debug!(
                "baseline established at offset {} for {}",
                file_size,
                self.path.display()
            );
            return Ok(TailChunk::default());
        }

        let mut start = self.position;
        let mut truncated = false;
        if file_size < start {
            warn!(
                "{} shrank below cursor ({} < {}); re-reading from start",
                self.path.display(),
                file_size,
                start
            );
            start = 0;
            truncated = true;
        }

        if file_size == start && !truncated {
            return Ok(TailChunk::default());
        }

        let file = File::open(&self.path).map_err(|source| IngestError::SourceUnavailable {
            path: self.path.display().to_string(),
            source,
        })?;
        let mut reader = BufReader::new(file);
        reader
            .seek(SeekFrom::Start(start))
            .map_err(|source| IngestError::Read {
                path: self.path.display().to_string(),
                source,
            })?;

        let mut offset = start;
        let mut lines = Vec::<String>::new();
        loop {
            let mut buf = Vec::<u8>::new();
            let bytes_read =
                reader
                    .read_until(b'\n', &mut buf)
                    .map_err(|source| IngestError::Read {
                        path: self.path.display().to_string(),
                        source,
                    })?;
            if bytes_read == 0 {
                break;
            }
            if buf.last() != Some(&b'\n') {
                // Unterminated tail; leave it for the next pass.
                break;
            }

            offset += bytes_read as u64;
            let mut text = String::from_utf8_lossy(&buf).into_owned();
            text.pop();
            if text.ends_with('\r') {
                text.pop();
            }
            lines.push(text);
        }

        self.position = offset;
        Ok(TailChunk { lines, truncated })
    }
}
