use super::LineParser;
use regex::Regex;
use serde::Serialize;

const LINE_PATTERN: &str =
    r"\[\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}.\d{6}\] \[(.+)\] \[(.+)\] \[(\d+)\] (.*)";
const PAIR_PATTERN: &str = r"([^\s]*): (\d+)";

/// One `item: value` pair reported by a process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeMetric {
    pub pid: String,
    pub item: String,
    pub value: f64,
}

/// Parser for structured process logs such as
/// `[2024-01-01 10:00:00.123456] [info] [monitor] [4120] heap_used: 1024 rss: 4096`.
#[derive(Debug, Clone)]
pub struct NodeLogParser {
    line: Regex,
    pair: Regex,
}

impl NodeLogParser {
    pub fn new() -> Self {
        Self {
            line: Regex::new(LINE_PATTERN).expect("node log line pattern is valid"),
            pair: Regex::new(PAIR_PATTERN).expect("node log pair pattern is valid"),
        }
    }
}

impl Default for NodeLogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser for NodeLogParser {
    type Metric = NodeMetric;

    fn name(&self) -> &'static str {
        "node_log"
    }

    fn file_prefix(&self) -> &'static str {
        "node"
    }

    fn default_capacity(&self) -> usize {
        250
    }

    fn parse_line(&self, line: &str, out: &mut Vec<NodeMetric>) {
        let Some(captures) = self.line.captures(line) else {
            return;
        };
        let (Some(pid), Some(detail)) = (captures.get(3), captures.get(4)) else {
            return;
        };

        for pair in self.pair.captures_iter(detail.as_str()) {
            let (Some(item), Some(value)) = (pair.get(1), pair.get(2)) else {
                continue;
            };
            let Ok(value) = value.as_str().parse::<f64>() else {
                continue;
            };
            out.push(NodeMetric {
                pid: pid.as_str().to_string(),
                item: item.as_str().to_string(),
                value,
            });
        }
    }
}
