pub mod node_log;
pub mod slow_http;

use serde::Serialize;

pub use node_log::{NodeLogParser, NodeMetric};
pub use slow_http::{Direction, HttpMetric, SlowHttpParser};

/// Turns raw log lines of one format into metric records.
///
/// Parsing is per line and keeps no state between calls. Lines that do not
/// match the format are skipped, never reported as errors.
pub trait LineParser: Send + Sync {
    type Metric: Serialize + Send;

    /// Format name, reported as the batch `type`.
    fn name(&self) -> &'static str;

    /// File name prefix of the rotated logs, as in `<prefix>-<YYYYMMDD>.log`.
    fn file_prefix(&self) -> &'static str;

    /// Window capacity used when the configuration does not set one.
    fn default_capacity(&self) -> usize;

    /// Whether a run that collected no lines produces no batch at all.
    fn skip_empty(&self) -> bool {
        false
    }

    fn parse_line(&self, line: &str, out: &mut Vec<Self::Metric>);

    fn parse(&self, lines: &[String]) -> Vec<Self::Metric> {
        let mut metrics = Vec::new();
        for line in lines {
            self.parse_line(line, &mut metrics);
        }
        metrics
    }
}
