use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Last-read byte offset per file path.
///
/// Offsets are keyed by the resolved file path rather than the source, so a
/// file that has rotated away keeps its final offset.
#[derive(Debug, Clone, Default)]
pub struct OffsetStore {
    offsets: HashMap<PathBuf, u64>,
}

impl OffsetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored offset for `path`, or 0 if the file has never been read.
    pub fn get(&self, path: &Path) -> u64 {
        self.offsets.get(path).copied().unwrap_or(0)
    }

    /// Record that `path` has been consumed up to `offset`.
    ///
    /// Offsets never move backwards; a smaller value is ignored.
    pub fn commit(&mut self, path: &Path, offset: u64) {
        let stored = self.offsets.entry(path.to_path_buf()).or_insert(0);
        if offset < *stored {
            tracing::warn!(
                path = %path.display(),
                stored = *stored,
                offset,
                "Ignoring attempt to move offset backwards"
            );
            return;
        }
        *stored = offset;
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.offsets.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}
