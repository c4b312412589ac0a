use std::collections::VecDeque;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncSeekExt, BufReader};

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("log file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("{} is not a file", .path.display())]
    NotAFile { path: PathBuf },

    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReaderError {
    /// True for a missing path or one that is not a regular file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReaderError::NotFound { .. } | ReaderError::NotAFile { .. })
    }

    pub fn path(&self) -> &Path {
        match self {
            ReaderError::NotFound { path }
            | ReaderError::NotAFile { path }
            | ReaderError::Io { path, .. } => path,
        }
    }

    fn from_io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            ReaderError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ReaderError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Lines appended to a file since a given offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadChunk {
    pub lines: Vec<String>,
    /// Offset to resume from next time: the starting offset plus every byte consumed.
    pub new_offset: u64,
}

impl ReadChunk {
    fn unchanged(offset: u64) -> Self {
        Self {
            lines: Vec::new(),
            new_offset: offset,
        }
    }
}

/// Read everything appended to `path` since `from`.
pub async fn read_new(path: &Path, from: u64) -> Result<ReadChunk, ReaderError> {
    read_new_tail(path, from, usize::MAX).await
}

/// Read everything appended to `path` since `from`, keeping only the last
/// `retain` lines in memory. All bytes up to the size observed when the file
/// was opened are consumed and counted regardless of how many lines are kept.
///
/// Lines are split on `\n` with a trailing `\r` removed. Empty lines are
/// skipped. A final fragment without a terminator is returned as a complete
/// line. Invalid UTF-8 is replaced rather than rejected.
pub async fn read_new_tail(
    path: &Path,
    from: u64,
    retain: usize,
) -> Result<ReadChunk, ReaderError> {
    let metadata = fs::metadata(path)
        .await
        .map_err(|e| ReaderError::from_io(path, e))?;

    if !metadata.is_file() {
        return Err(ReaderError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let size = metadata.len();
    if size == from {
        return Ok(ReadChunk::unchanged(from));
    }
    if size < from {
        tracing::warn!(
            path = %path.display(),
            offset = from,
            size,
            "File is shorter than stored offset, waiting for it to grow"
        );
        return Ok(ReadChunk::unchanged(from));
    }

    let mut file = File::open(path)
        .await
        .map_err(|e| ReaderError::from_io(path, e))?;
    file.seek(SeekFrom::Start(from))
        .await
        .map_err(|e| ReaderError::from_io(path, e))?;

    let mut reader = BufReader::new(file.take(size - from));
    let mut lines = VecDeque::new();
    let mut consumed = 0u64;
    let mut total_lines = 0usize;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let bytes_read = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(|e| ReaderError::from_io(path, e))?;
        if bytes_read == 0 {
            break;
        }
        consumed += bytes_read as u64;

        let line = trim_line_ending(&buf);
        if line.is_empty() {
            continue;
        }

        total_lines += 1;
        lines.push_back(String::from_utf8_lossy(line).into_owned());
        if lines.len() > retain {
            lines.pop_front();
        }
    }

    tracing::debug!(
        path = %path.display(),
        from,
        bytes = consumed,
        lines = total_lines,
        kept = lines.len(),
        "Read appended lines"
    );

    Ok(ReadChunk {
        lines: lines.into(),
        new_offset: from + consumed,
    })
}

fn trim_line_ending(buf: &[u8]) -> &[u8] {
    let line = buf.strip_suffix(b"\n").unwrap_or(buf);
    line.strip_suffix(b"\r").unwrap_or(line)
}
