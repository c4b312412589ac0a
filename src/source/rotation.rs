use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Maps a log directory and a calendar date to the file that holds that day's log.
///
/// Files are named `<prefix>-<YYYYMMDD>.log`. Resolution is pure: no filesystem
/// access happens here, so a resolved path may not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationResolver {
    prefix: String,
}

impl RotationResolver {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// File name for `date`, without the directory.
    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("{}-{}.log", self.prefix, date.format("%Y%m%d"))
    }

    pub fn resolve(&self, dir: &Path, date: NaiveDate) -> PathBuf {
        dir.join(self.file_name(date))
    }
}
