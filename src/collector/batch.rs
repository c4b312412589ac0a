use serde::Serialize;

/// Metrics produced by one collection run for one log format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Batch<M> {
    /// Format name, e.g. `node_log` or `slow_http`
    #[serde(rename = "type")]
    pub kind: &'static str,

    /// Records in the order their lines were collected
    pub metrics: Vec<M>,
}

impl<M> Batch<M> {
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
