use clap::Parser;
use std::path::PathBuf;
use trafficwatch_config::AppConfig;

#[derive(Debug, Parser)]
#[command(
    name = "trafficwatch",
    about = "Live HTTP access-log monitor with threshold alerting"
)]
pub struct Cli {
    /// Config file path; falls back to TRAFFICWATCH_CONFIG, then
    /// ~/.trafficwatch/config.toml, then config/trafficwatch.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file to monitor (overrides the config file).
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<String>,

    /// Stats period length in seconds (overrides the config file).
    #[arg(short = 's', long = "stats-period", value_name = "SECONDS")]
    pub stats_period: Option<u64>,

    /// Alert window length in seconds (overrides the config file).
    #[arg(short = 'a', long = "alert-period", value_name = "SECONDS")]
    pub alert_period: Option<u64>,

    /// Alert threshold in hits/second (overrides the config file).
    #[arg(short = 't', long = "alert-threshold", value_name = "HITS_PER_SEC")]
    pub alert_threshold: Option<f64>,
}

impl Cli {
    /// Flags win over whatever the config file said.
    pub fn apply_overrides(&self, cfg: &mut AppConfig) {
        if let Some(file) = &self.file {
            cfg.monitor.log_file = trafficwatch_config::expand_path(file);
        }
        if let Some(stats_period) = self.stats_period {
            cfg.monitor.stats_period_seconds = stats_period;
        }
        if let Some(alert_period) = self.alert_period {
            cfg.monitor.alert_period_seconds = alert_period;
        }
        if let Some(threshold) = self.alert_threshold {
            cfg.monitor.alert_threshold_hits_per_sec = threshold;
        }
    }
}
