use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    #[serde(default = "default_log_file")]
    pub log_file: String,
    #[serde(default = "default_stats_period_seconds")]
    pub stats_period_seconds: u64,
    #[serde(default = "default_alert_period_seconds")]
    pub alert_period_seconds: u64,
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold_hits_per_sec: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UiConfig {
    /// Dashboard redraw interval. Also bounds how quickly a quit key is
    /// noticed between period ticks.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
            stats_period_seconds: default_stats_period_seconds(),
            alert_period_seconds: default_alert_period_seconds(),
            alert_threshold_hits_per_sec: default_alert_threshold(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
        }
    }
}

impl AppConfig {
    /// Refuses configurations the monitor cannot run with. Called once at
    /// startup; a failure here is fatal.
    pub fn validate(&self) -> Result<()> {
        if self.monitor.stats_period_seconds == 0 {
            bail!("monitor.stats_period_seconds must be positive");
        }
        if self.monitor.alert_period_seconds == 0 {
            bail!("monitor.alert_period_seconds must be positive");
        }
        if self.monitor.alert_threshold_hits_per_sec <= 0.0 {
            bail!("monitor.alert_threshold_hits_per_sec must be positive");
        }
        if self.monitor.log_file.trim().is_empty() {
            bail!("monitor.log_file must not be empty");
        }
        if self.ui.tick_ms == 0 {
            bail!("ui.tick_ms must be positive");
        }
        if self.monitor.alert_period_seconds < self.monitor.stats_period_seconds {
            warn!(
                "alert period ({}s) is shorter than the stats period ({}s); \
                 the alert window degenerates to a single period",
                self.monitor.alert_period_seconds, self.monitor.stats_period_seconds
            );
        }
        Ok(())
    }
}

fn default_log_file() -> String {
    "access.log".to_string()
}

fn default_stats_period_seconds() -> u64 {
    10
}

fn default_alert_period_seconds() -> u64 {
    120
}

fn default_alert_threshold() -> f64 {
    20.0
}

fn default_tick_ms() -> u64 {
    100
}

pub fn expand_path(path: &str) -> String {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{}", home.to_string_lossy(), stripped);
        }
    }
    path.to_string()
}

fn home_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".trafficwatch").join("config.toml"))
}

fn repo_default_config_path() -> PathBuf {
    PathBuf::from("config/trafficwatch.toml")
}

fn resolve_config_path_with_overrides(
    raw_path: Option<PathBuf>,
    env_keys: &[&str],
    home_path: Option<PathBuf>,
    repo_default: PathBuf,
) -> PathBuf {
    if let Some(path) = raw_path {
        return path;
    }

    for key in env_keys {
        if let Ok(value) = std::env::var(key) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }
    }

    if let Some(path) = home_path {
        if path.exists() {
            return path;
        }
    }

    if repo_default.exists() {
        return repo_default;
    }

    home_config_path().unwrap_or(repo_default)
}

pub fn resolve_config_path(raw_path: Option<PathBuf>) -> PathBuf {
    resolve_config_path_with_overrides(
        raw_path,
        &["TRAFFICWATCH_CONFIG"],
        home_config_path(),
        repo_default_config_path(),
    )
}

fn normalize_config(mut cfg: AppConfig) -> AppConfig {
    cfg.monitor.log_file = expand_path(&cfg.monitor.log_file);
    cfg
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("failed to read config {}", path.as_ref().display()))?;
    let cfg: AppConfig = toml::from_str(&content).context("failed to parse TOML config")?;
    Ok(normalize_config(cfg))
}

/// Loads the resolved config if it exists, defaults otherwise. A config
/// file that exists but fails to parse is still an error.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<AppConfig> {
    if path.as_ref().exists() {
        load_config(path)
    } else {
        Ok(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp_config(contents: &str, label: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "trafficwatch-config-{label}-{}-{}.toml",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("system time after unix epoch")
                .as_nanos()
        ));
        std::fs::write(&path, contents).expect("write temp config");
        path
    }

    #[test]
    fn defaults_match_the_documented_surface() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.monitor.log_file, "access.log");
        assert_eq!(cfg.monitor.stats_period_seconds, 10);
        assert_eq!(cfg.monitor.alert_period_seconds, 120);
        assert_eq!(cfg.monitor.alert_threshold_hits_per_sec, 20.0);
        assert_eq!(cfg.ui.tick_ms, 100);
        cfg.validate().expect("defaults should validate");
    }

    #[test]
    fn validate_rejects_non_positive_values() {
        let mut cfg = AppConfig::default();
        cfg.monitor.stats_period_seconds = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.monitor.alert_period_seconds = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.monitor.alert_threshold_hits_per_sec = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.monitor.alert_threshold_hits_per_sec = -3.0;
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.ui.tick_ms = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn alert_period_shorter_than_stats_period_still_validates() {
        let mut cfg = AppConfig::default();
        cfg.monitor.alert_period_seconds = 5;
        cfg.monitor.stats_period_seconds = 10;
        cfg.validate()
            .expect("degenerate window is tolerated with a warning");
    }

    #[test]
    fn resolve_order_prefers_cli_then_env() {
        let raw = Some(PathBuf::from("/tmp/cli.toml"));
        let chosen = resolve_config_path_with_overrides(
            raw,
            &["TRAFFICWATCH_CONFIG"],
            Some(PathBuf::from("/tmp/home.toml")),
            PathBuf::from("/tmp/repo.toml"),
        );
        assert_eq!(chosen, PathBuf::from("/tmp/cli.toml"));

        let env_key = "TRAFFICWATCH_CONFIG_TEST_KEY";
        std::env::set_var(env_key, "/tmp/from-env.toml");
        let chosen = resolve_config_path_with_overrides(
            None,
            &[env_key],
            Some(PathBuf::from("/tmp/from-home.toml")),
            PathBuf::from("/tmp/from-repo.toml"),
        );
        std::env::remove_var(env_key);
        assert_eq!(chosen, PathBuf::from("/tmp/from-env.toml"));
    }

    #[test]
    fn load_config_reads_partial_files_over_defaults() {
        let path = write_temp_config(
            r#"
[monitor]
log_file = "~/logs/site.log"
alert_threshold_hits_per_sec = 35.5
"#,
            "partial",
        );
        let cfg = load_config(&path).expect("partial config should load");
        std::fs::remove_file(&path).ok();

        assert_eq!(cfg.monitor.alert_threshold_hits_per_sec, 35.5);
        assert_eq!(cfg.monitor.stats_period_seconds, 10);
        assert!(
            !cfg.monitor.log_file.starts_with("~/") || std::env::var_os("HOME").is_none(),
            "home prefix should be expanded: {}",
            cfg.monitor.log_file
        );
    }

    #[test]
    fn load_config_errors_on_unknown_field() {
        let path = write_temp_config(
            r#"
[monitor]
stats_period_seconds = 10
unexpected = true
"#,
            "unknown-field",
        );
        let err = load_config(&path).expect_err("unknown field should fail");
        std::fs::remove_file(&path).ok();
        assert!(
            format!("{err:#}").contains("unknown field `unexpected`"),
            "unexpected error: {err:#}"
        );
    }

    #[test]
    fn load_config_errors_when_path_missing() {
        let path = std::env::temp_dir().join("trafficwatch-missing-config.toml");
        let err = load_config(&path).expect_err("missing config path should fail");
        assert!(
            err.to_string().contains("failed to read config"),
            "unexpected error: {err:#}"
        );
    }

    #[test]
    fn load_config_or_default_falls_back_when_missing() {
        let path = std::env::temp_dir().join("trafficwatch-absent-config.toml");
        let cfg = load_config_or_default(&path).expect("fallback to defaults");
        assert_eq!(cfg.monitor.stats_period_seconds, 10);
    }
}
