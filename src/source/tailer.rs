use crate::source::offset::OffsetStore;
use crate::source::reader::{self, ReadChunk, ReaderError};
use crate::source::rotation::RotationResolver;
use crate::source::window::LineWindow;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TailError {
    #[error("failed to drain rotated file for source '{key}': {source}")]
    Drain {
        key: String,
        #[source]
        source: ReaderError,
    },

    #[error("failed to read source '{key}': {source}")]
    Read {
        key: String,
        #[source]
        source: ReaderError,
    },
}

impl TailError {
    pub fn key(&self) -> &str {
        match self {
            TailError::Drain { key, .. } | TailError::Read { key, .. } => key,
        }
    }

    pub fn reader_error(&self) -> &ReaderError {
        match self {
            TailError::Drain { source, .. } | TailError::Read { source, .. } => source,
        }
    }
}

/// What a single `tail` call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TailOutcome {
    /// The resolved path changed and the previous file was drained.
    pub rotated: bool,
    pub drained_lines: usize,
    pub read_lines: usize,
}

/// Incremental reader for one log directory.
///
/// Owns everything that belongs to the source: the rotation state (the path the
/// source was last associated with), the byte offsets of every file it has read
/// and its line window. Nothing is shared between tailers, so distinct sources can
/// be tailed concurrently.
#[derive(Debug)]
pub struct SourceTailer {
    key: String,
    dir: PathBuf,
    resolver: RotationResolver,
    current: PathBuf,
    offsets: OffsetStore,
    window: LineWindow,
}

impl SourceTailer {
    /// Create a tailer whose rotation state starts at the file resolved for `today`.
    pub fn new(
        key: impl Into<String>,
        resolver: RotationResolver,
        capacity: usize,
        today: NaiveDate,
    ) -> Self {
        let key = key.into();
        let dir = PathBuf::from(&key);
        let current = resolver.resolve(&dir, today);

        Self {
            key,
            dir,
            resolver,
            current,
            offsets: OffsetStore::new(),
            window: LineWindow::new(capacity),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Path the source is currently associated with.
    pub fn current_path(&self) -> &Path {
        &self.current
    }

    pub fn offsets(&self) -> &OffsetStore {
        &self.offsets
    }

    pub fn window(&self) -> &LineWindow {
        &self.window
    }

    pub fn drain_window(&mut self) -> Vec<String> {
        self.window.drain_all()
    }

    /// Read whatever was appended since the last call into the window.
    ///
    /// When the file resolved for `today` differs from the current one, the
    /// current file is drained first and the rotation state moves only once that
    /// drain succeeded. A previous file that no longer exists has nothing left to
    /// drain: the error is still returned, but the source moves on to the new
    /// file so later calls do not fail on it again. Any other read error keeps
    /// the current file and the drain is retried on the next call. Offsets are
    /// committed only after a read has completed.
    pub async fn tail(&mut self, today: NaiveDate) -> Result<TailOutcome, TailError> {
        let expected = self.resolver.resolve(&self.dir, today);
        let mut outcome = TailOutcome::default();

        if expected != self.current {
            let previous = self.current.clone();
            tracing::info!(
                key = %self.key,
                previous = %previous.display(),
                expected = %expected.display(),
                "Log rotated, draining previous file"
            );

            let chunk = match self.read(&previous).await {
                Ok(chunk) => chunk,
                Err(source) => {
                    if source.is_not_found() {
                        tracing::warn!(
                            key = %self.key,
                            path = %previous.display(),
                            "Previous log file is gone, switching to the new one"
                        );
                        self.current = expected;
                    }
                    return Err(TailError::Drain {
                        key: self.key.clone(),
                        source,
                    });
                }
            };

            outcome.rotated = true;
            outcome.drained_lines = chunk.lines.len();
            self.commit(&previous, chunk);
            self.current = expected;
        }

        let current = self.current.clone();
        let chunk = self.read(&current).await.map_err(|source| TailError::Read {
            key: self.key.clone(),
            source,
        })?;
        outcome.read_lines = chunk.lines.len();
        self.commit(&current, chunk);

        Ok(outcome)
    }

    async fn read(&self, path: &Path) -> Result<ReadChunk, ReaderError> {
        reader::read_new_tail(path, self.offsets.get(path), self.window.capacity()).await
    }

    fn commit(&mut self, path: &Path, chunk: ReadChunk) {
        self.offsets.commit(path, chunk.new_offset);
        self.window.extend(chunk.lines);
    }
}
