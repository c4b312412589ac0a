use crate::collector::batch::Batch;
use crate::config::types::LogdirConfig;
use crate::parser::LineParser;
use crate::source::clock::Clock;
use crate::source::rotation::RotationResolver;
use crate::source::tailer::{SourceTailer, TailError};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("no log directories configured for {format}; set `{format}.logdir` to a list of directories")]
    NoSources { format: &'static str },

    #[error("{} of {total} sources failed, last error: {last}", .earlier.len() + 1)]
    Sources {
        total: usize,
        /// Failure that completed last
        #[source]
        last: TailError,
        /// Failures that completed before `last`, in completion order
        earlier: Vec<TailError>,
    },
}

impl CollectError {
    /// Every source failure in completion order.
    pub fn failures(&self) -> Vec<&TailError> {
        match self {
            CollectError::NoSources { .. } => Vec::new(),
            CollectError::Sources { last, earlier, .. } => {
                earlier.iter().chain(std::iter::once(last)).collect()
            }
        }
    }
}

/// Collects new lines from every configured directory of one log format and
/// parses them into a batch.
///
/// Each `run` tails all sources concurrently and waits for every one of them.
/// A batch is produced only when every source succeeded; otherwise the lines
/// gathered during the run are discarded and the error is returned.
pub struct Collector<P: LineParser> {
    parser: P,
    clock: Arc<dyn Clock>,
    tailers: Vec<SourceTailer>,
}

impl<P: LineParser> Collector<P> {
    /// `capacity` overrides the parser's default window size per source.
    pub fn new(
        parser: P,
        logdir: &[String],
        capacity: Option<usize>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let capacity = capacity.unwrap_or_else(|| parser.default_capacity());
        let resolver = RotationResolver::new(parser.file_prefix());
        let today = clock.today();

        let mut seen = HashSet::new();
        let mut tailers = Vec::with_capacity(logdir.len());
        for dir in logdir {
            // `/x`, `/x/` and `/x//` name the same directory
            let normalized: PathBuf = Path::new(dir).components().collect();
            if !seen.insert(normalized) {
                warn!(format = parser.name(), logdir = %dir, "Ignoring duplicate log directory");
                continue;
            }
            tailers.push(SourceTailer::new(dir.clone(), resolver.clone(), capacity, today));
        }

        info!(
            format = parser.name(),
            sources = tailers.len(),
            capacity,
            %today,
            "Collector configured"
        );

        Self {
            parser,
            clock,
            tailers,
        }
    }

    pub fn from_config(parser: P, config: &LogdirConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(parser, &config.logdir, config.capacity, clock)
    }

    pub fn format(&self) -> &'static str {
        self.parser.name()
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.tailers.iter().map(SourceTailer::key)
    }

    pub fn tailers(&self) -> &[SourceTailer] {
        &self.tailers
    }

    /// Run one collection.
    ///
    /// Returns `Ok(None)` when the format reports empty runs as "no data".
    pub async fn run(&mut self) -> Result<Option<Batch<P::Metric>>, CollectError> {
        let format = self.parser.name();
        if self.tailers.is_empty() {
            return Err(CollectError::NoSources { format });
        }

        let today = self.clock.today();
        let total = self.tailers.len();
        let mut failures = Vec::new();

        {
            let mut pending: FuturesUnordered<_> = self
                .tailers
                .iter_mut()
                .map(|tailer| tailer.tail(today))
                .collect();

            while let Some(result) = pending.next().await {
                match result {
                    Ok(outcome) => {
                        debug!(format, ?outcome, "Source tailed");
                    }
                    Err(e) => {
                        warn!(format, key = e.key(), error = %e, "Source tail failed");
                        failures.push(e);
                    }
                }
            }
        }

        if let Some(last) = failures.pop() {
            for tailer in &mut self.tailers {
                tailer.drain_window();
            }
            return Err(CollectError::Sources {
                total,
                last,
                earlier: failures,
            });
        }

        let lines: Vec<String> = self
            .tailers
            .iter_mut()
            .flat_map(|tailer| tailer.drain_window())
            .collect();
        debug!(format, lines = lines.len(), "Collected lines");

        if lines.is_empty() && self.parser.skip_empty() {
            return Ok(None);
        }

        let metrics = self.parser.parse(&lines);
        Ok(Some(Batch {
            kind: format,
            metrics,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{NodeLogParser, SlowHttpParser};
    use crate::source::clock::ManualClock;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::TempDir;

    /// Parser that passes raw lines through, for checking what was collected.
    struct RawLines {
        capacity: usize,
    }

    impl LineParser for RawLines {
        type Metric = String;

        fn name(&self) -> &'static str {
            "raw"
        }

        fn file_prefix(&self) -> &'static str {
            "raw"
        }

        fn default_capacity(&self) -> usize {
            self.capacity
        }

        fn parse_line(&self, line: &str, out: &mut Vec<String>) {
            out.push(line.to_string());
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn append(path: &Path, content: &str) {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    fn dir_key(dir: &TempDir) -> String {
        dir.path().to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn test_no_sources_is_configuration_error() {
        let clock = Arc::new(ManualClock::new(date()));
        let mut collector = Collector::new(NodeLogParser::new(), &[], None, clock);

        let err = collector.run().await.unwrap_err();
        assert!(matches!(err, CollectError::NoSources { format: "node_log" }));
        assert!(err.failures().is_empty());
    }

    #[tokio::test]
    async fn test_window_cleared_between_runs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("raw-20240101.log");
        append(&path, "a\nb\n");

        let clock = Arc::new(ManualClock::new(date()));
        let mut collector =
            Collector::new(RawLines { capacity: 3 }, &[dir_key(&dir)], None, clock);

        let batch = collector.run().await.unwrap().unwrap();
        assert_eq!(batch.metrics, vec!["a", "b"]);

        append(&path, "c\nd\ne\n");
        let batch = collector.run().await.unwrap().unwrap();
        assert_eq!(batch.metrics, vec!["c", "d", "e"]);

        let batch = collector.run().await.unwrap().unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.kind, "raw");
    }

    #[tokio::test]
    async fn test_single_run_overflow_keeps_last_lines() {
        let dir = TempDir::new().unwrap();
        append(&dir.path().join("raw-20240101.log"), "1\n2\n3\n4\n5\n");

        let clock = Arc::new(ManualClock::new(date()));
        let mut collector =
            Collector::new(RawLines { capacity: 3 }, &[dir_key(&dir)], None, clock);

        let batch = collector.run().await.unwrap().unwrap();
        assert_eq!(batch.metrics, vec!["3", "4", "5"]);
    }

    #[tokio::test]
    async fn test_sources_concatenated_in_configured_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        append(&first.path().join("raw-20240101.log"), "first\n");
        append(&second.path().join("raw-20240101.log"), "second\n");

        let clock = Arc::new(ManualClock::new(date()));
        let mut collector = Collector::new(
            RawLines { capacity: 10 },
            &[dir_key(&second), dir_key(&first)],
            None,
            clock,
        );

        let batch = collector.run().await.unwrap().unwrap();
        assert_eq!(batch.metrics, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_duplicate_directories_collapsed() {
        let dir = TempDir::new().unwrap();
        append(&dir.path().join("raw-20240101.log"), "once\n");

        let clock = Arc::new(ManualClock::new(date()));
        let mut collector = Collector::new(
            RawLines { capacity: 10 },
            &[dir_key(&dir), dir_key(&dir)],
            None,
            clock,
        );

        assert_eq!(collector.sources().count(), 1);
        let batch = collector.run().await.unwrap().unwrap();
        assert_eq!(batch.metrics, vec!["once"]);
    }

    #[tokio::test]
    async fn test_trailing_separator_is_same_directory() {
        let dir = TempDir::new().unwrap();
        append(&dir.path().join("access-20240101.log"), "[t] a -> b \"GET / HTTP/1.1 200\" 5\n");

        let key = dir_key(&dir);
        let clock = Arc::new(ManualClock::new(date()));
        let mut collector = Collector::new(
            SlowHttpParser::new(),
            &[key.clone(), format!("{key}/"), format!("{key}//")],
            None,
            clock,
        );

        assert_eq!(collector.sources().collect::<Vec<_>>(), vec![key.as_str()]);
        let batch = collector.run().await.unwrap().unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_discards_whole_run() {
        let good = TempDir::new().unwrap();
        let missing = TempDir::new().unwrap();
        let good_path = good.path().join("raw-20240101.log");
        append(&good_path, "kept offset\n");

        let clock = Arc::new(ManualClock::new(date()));
        let mut collector = Collector::new(
            RawLines { capacity: 10 },
            &[dir_key(&good), dir_key(&missing)],
            None,
            clock,
        );

        let err = collector.run().await.unwrap_err();
        let failures = err.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].key(), dir_key(&missing));
        assert!(failures[0].reader_error().is_not_found());
        assert!(collector.tailers().iter().all(|t| t.window().is_empty()));

        // The healthy source already advanced its offset.
        assert_eq!(collector.tailers()[0].offsets().get(&good_path), 12);

        append(&missing.path().join("raw-20240101.log"), "recovered\n");
        let batch = collector.run().await.unwrap().unwrap();
        assert_eq!(batch.metrics, vec!["recovered"]);
    }

    #[tokio::test]
    async fn test_every_failure_reported() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();

        let clock = Arc::new(ManualClock::new(date()));
        let mut collector = Collector::new(
            RawLines { capacity: 10 },
            &[dir_key(&a), dir_key(&b)],
            None,
            clock,
        );

        let err = collector.run().await.unwrap_err();
        assert!(matches!(err, CollectError::Sources { total: 2, .. }));
        assert!(err.to_string().starts_with("2 of 2 sources failed"));

        let failures = err.failures();
        assert_eq!(failures.len(), 2);
        let mut keys: Vec<&str> = failures.iter().map(|f| f.key()).collect();
        keys.sort();
        let mut expected = vec![dir_key(&a), dir_key(&b)];
        expected.sort();
        assert_eq!(keys, expected);

        // The representative error is the one that completed last.
        let CollectError::Sources { last, earlier, .. } = &err else {
            panic!("expected source failures");
        };
        assert_eq!(failures.last().unwrap().key(), last.key());
        assert_eq!(earlier.len(), 1);
        assert_ne!(earlier[0].key(), last.key());
        assert!(err.to_string().ends_with(&last.to_string()));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), last.to_string());
    }

    #[tokio::test]
    async fn test_empty_access_log_run_is_no_data() {
        let dir = TempDir::new().unwrap();
        append(&dir.path().join("access-20240101.log"), "");

        let clock = Arc::new(ManualClock::new(date()));
        let mut collector = Collector::new(SlowHttpParser::new(), &[dir_key(&dir)], None, clock);

        assert!(collector.run().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rotation_between_runs() {
        let dir = TempDir::new().unwrap();
        let day_one = dir.path().join("raw-20240101.log");
        let day_two = dir.path().join("raw-20240102.log");
        append(&day_one, "mon-1\n");

        let clock = ManualClock::new(date());
        let mut collector = Collector::new(
            RawLines { capacity: 10 },
            &[dir_key(&dir)],
            None,
            Arc::new(clock.clone()),
        );
        assert_eq!(collector.run().await.unwrap().unwrap().metrics, vec!["mon-1"]);

        append(&day_one, "mon-2\n");
        append(&day_two, "tue-1\n");
        clock.advance_days(1);

        let batch = collector.run().await.unwrap().unwrap();
        assert_eq!(batch.metrics, vec!["mon-2", "tue-1"]);
        assert_eq!(collector.tailers()[0].current_path(), day_two.as_path());
    }
}
