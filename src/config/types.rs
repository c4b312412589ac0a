use crate::source::clock::SystemClock;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub node_log: Option<LogdirConfig>,
    #[serde(default)]
    pub slow_http: Option<LogdirConfig>,
    /// Calendar used to decide which dated file is today's
    #[serde(default)]
    pub clock: SystemClock,
    /// Time between collection runs in `run` mode
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,
}

fn default_interval() -> Duration {
    Duration::from_secs(60)
}

impl Config {
    pub fn has_formats(&self) -> bool {
        self.node_log.is_some() || self.slow_http.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogdirConfig {
    /// Directories holding the rotated log files. Anything other than a list of
    /// strings is treated as an empty list.
    #[serde(default, deserialize_with = "lenient_logdir")]
    pub logdir: Vec<String>,
    /// Lines kept per directory between runs; defaults per format
    #[serde(default)]
    pub capacity: Option<usize>,
}

fn lenient_logdir<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => {
            let dirs: Option<Vec<String>> = items
                .into_iter()
                .map(|item| match item {
                    Value::String(dir) => Some(dir),
                    _ => None,
                })
                .collect();
            Ok(dirs.unwrap_or_else(|| {
                tracing::warn!("`logdir` must only contain strings, ignoring it");
                Vec::new()
            }))
        }
        other => {
            tracing::warn!(value = ?other, "`logdir` must be a list of directories, ignoring it");
            Ok(Vec::new())
        }
    }
}
