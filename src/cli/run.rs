use crate::collector::{CollectError, Collector};
use crate::config::parse::load_config;
use crate::config::Config;
use crate::parser::{LineParser, NodeLogParser, SlowHttpParser};
use crate::source::clock::Clock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::signal;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] crate::config::parse::ConfigError),

    #[error("no log formats configured; add a `node_log` or `slow_http` section")]
    NothingConfigured,

    #[error("{format} collection failed: {source}")]
    Collect {
        format: &'static str,
        #[source]
        source: CollectError,
    },

    #[error("failed to encode batch: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result of one collection run for one format.
#[derive(Debug)]
pub struct FormatOutcome {
    pub format: &'static str,
    /// The batch as JSON, or `None` when the format had nothing to report
    pub batch: Result<Option<serde_json::Value>, RunError>,
}

/// One collector per configured log format.
pub struct Agent {
    node_log: Option<Collector<NodeLogParser>>,
    slow_http: Option<Collector<SlowHttpParser>>,
}

impl Agent {
    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Result<Self, RunError> {
        if !config.has_formats() {
            return Err(RunError::NothingConfigured);
        }

        let node_log = config
            .node_log
            .as_ref()
            .map(|section| Collector::from_config(NodeLogParser::new(), section, clock.clone()));
        let slow_http = config
            .slow_http
            .as_ref()
            .map(|section| Collector::from_config(SlowHttpParser::new(), section, clock.clone()));

        Ok(Self {
            node_log,
            slow_http,
        })
    }

    /// Run every format's collector once, concurrently.
    pub async fn tick(&mut self) -> Vec<FormatOutcome> {
        let (node_log, slow_http) = tokio::join!(
            collect_format(self.node_log.as_mut()),
            collect_format(self.slow_http.as_mut()),
        );
        node_log.into_iter().chain(slow_http).collect()
    }
}

async fn collect_format<P: LineParser>(collector: Option<&mut Collector<P>>) -> Option<FormatOutcome> {
    let collector = collector?;
    let format = collector.format();

    let batch = match collector.run().await {
        Ok(Some(batch)) => serde_json::to_value(&batch)
            .map(Some)
            .map_err(RunError::from),
        Ok(None) => Ok(None),
        Err(source) => Err(RunError::Collect { format, source }),
    };

    Some(FormatOutcome { format, batch })
}

pub async fn run(config_path: Option<PathBuf>, once: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = match config_path {
        Some(path) => path,
        None => {
            eprintln!("Error: config not found");
            eprintln!("Searched locations:");
            for path in crate::config::default_config_paths() {
                eprintln!("  {}", path.display());
            }
            eprintln!("\nUse --config <path> to specify a config file, or run 'tailpoll config init' to generate one.");
            std::process::exit(1);
        }
    };

    let result = if once {
        run_once(&config_path).await
    } else {
        run_loop(&config_path).await
    };
    result.map_err(|e| e.into())
}

fn build_agent(config_path: &Path) -> Result<(Agent, Config), RunError> {
    info!(config_path = %config_path.display(), "Loading configuration");
    let config = load_config(config_path)?;
    let clock: Arc<dyn Clock> = Arc::new(config.clock);
    let agent = Agent::from_config(&config, clock)?;
    Ok((agent, config))
}

async fn run_once(config_path: &Path) -> Result<(), RunError> {
    let (mut agent, _) = build_agent(config_path)?;

    let mut last_error = None;
    for outcome in agent.tick().await {
        if let Err(e) = report(outcome) {
            last_error = Some(e);
        }
    }

    match last_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

async fn run_loop(config_path: &Path) -> Result<(), RunError> {
    let (mut agent, config) = build_agent(config_path)?;

    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(interval = ?config.interval, "Collector started, press Ctrl+C to shutdown");

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
            _ = ticker.tick() => {
                for outcome in agent.tick().await {
                    if let Err(e) = report(outcome) {
                        error!(error = %e, "Collection failed");
                    }
                }
            }
        }
    }

    Ok(())
}

/// Print a batch as one JSON line on stdout, or hand back the failure.
fn report(outcome: FormatOutcome) -> Result<(), RunError> {
    match outcome.batch? {
        Some(batch) => println!("{}", batch),
        None => debug!(format = outcome.format, "No data this run"),
    }
    Ok(())
}
