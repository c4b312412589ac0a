use super::LineParser;
use regex::Regex;
use serde::Serialize;

const LINE_PATTERN: &str =
    r#"^\[([^\]]+)\] (.+) ([-><]{2}) (.+) "(.+) (.+) (.+) (\d+)" (\d+)$"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Receive,
    Send,
}

impl Direction {
    fn from_arrow(arrow: &str) -> Self {
        if arrow == "->" {
            Direction::Receive
        } else {
            Direction::Send
        }
    }
}

/// One request seen in the access log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpMetric {
    pub timestamp: String,
    pub from: String,
    #[serde(rename = "type")]
    pub direction: Direction,
    pub to: String,
    pub method: String,
    pub url: String,
    pub protocol: String,
    pub code: u32,
    pub rt: u64,
}

/// Parser for access/transport logs such as
/// `[2024-01-01T00:00:00] 10.0.0.1 -> 10.0.0.2 "GET /health HTTP/1.1 200" 12`.
#[derive(Debug, Clone)]
pub struct SlowHttpParser {
    line: Regex,
}

impl SlowHttpParser {
    pub fn new() -> Self {
        Self {
            line: Regex::new(LINE_PATTERN).expect("access log pattern is valid"),
        }
    }

    fn parse_record(&self, line: &str) -> Option<HttpMetric> {
        let captures = self.line.captures(line)?;
        let field = |i: usize| captures.get(i).map(|m| m.as_str().to_string());

        Some(HttpMetric {
            timestamp: field(1)?,
            from: field(2)?,
            direction: Direction::from_arrow(captures.get(3)?.as_str()),
            to: field(4)?,
            method: field(5)?,
            url: field(6)?,
            protocol: field(7)?,
            code: captures.get(8)?.as_str().parse().ok()?,
            rt: captures.get(9)?.as_str().parse().ok()?,
        })
    }
}

impl Default for SlowHttpParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser for SlowHttpParser {
    type Metric = HttpMetric;

    fn name(&self) -> &'static str {
        "slow_http"
    }

    fn file_prefix(&self) -> &'static str {
        "access"
    }

    fn default_capacity(&self) -> usize {
        10
    }

    fn skip_empty(&self) -> bool {
        true
    }

    fn parse_line(&self, line: &str, out: &mut Vec<HttpMetric>) {
        if let Some(record) = self.parse_record(line) {
            out.push(record);
        }
    }
}
