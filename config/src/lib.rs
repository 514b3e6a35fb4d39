#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod role_config;

use app_config::AppConfig;
pub use app_config::get_config_dir;
pub use args::Args;
use eyre::Context as _;
pub use role_config::RoleConfig;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    path::PathBuf,
    time::Duration,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten, skip_serializing)]
    app_config: AppConfig,
    /// Time between gather cycles, e.g. `10s`.
    pub interval: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,
    #[serde(default)]
    pub master: RoleConfig,
    #[serde(default)]
    pub slave: RoleConfig,
}

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

impl Default for Config {
    fn default() -> Self {
        serde_yml::from_str(DEFAULT_CONFIG).expect("Failed to parse default config")
    }
}

impl Config {
    /// Layers the bundled defaults, the config file and `args`, in that order.
    pub fn new(args: Args) -> Result<Self, config::ConfigError> {
        let config_dir = get_config_dir();
        let mut builder = config::Config::builder()
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml));

        builder = match &args.config {
            Some(path) => builder.add_source(config::File::from(path.clone()).format(config::FileFormat::Yaml)),
            None => builder.add_source(
                config::File::from(config_dir.join("config.yaml"))
                    .format(config::FileFormat::Yaml)
                    .required(false),
            ),
        };

        builder = builder.add_source(args);

        let cfg: Self = builder.build()?.try_deserialize()?;
        debug!(
            master = cfg.master.enabled,
            slave = cfg.slave.enabled,
            interval = %cfg.interval,
            "Configuration loaded"
        );

        Ok(cfg)
    }

    /// Role section by name (`master`, or `slave`/`agent`).
    pub fn role(&self, name: &str) -> Option<&RoleConfig> {
        match name {
            "master" => Some(&self.master),
            "slave" | "agent" => Some(&self.slave),
            _ => None,
        }
    }

    /// Parsed `interval`. Zero is rejected since a ticker needs a period.
    pub fn interval(&self) -> eyre::Result<Duration> {
        let interval = humantime::parse_duration(&self.interval)
            .wrap_err_with(|| format!("Invalid interval '{}'", self.interval))?;
        eyre::ensure!(!interval.is_zero(), "Invalid interval '{}': must be non-zero", self.interval);
        Ok(interval)
    }

    pub fn config_dir(&self) -> &PathBuf {
        &self.app_config.config_dir
    }

    pub fn to_yaml(&self) -> eyre::Result<String> {
        serde_yml::to_string(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use temp_dir::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.child("config.yaml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn bundled_defaults() {
        let config = Config::default();
        assert!(config.master.enabled);
        assert!(!config.slave.enabled);
        assert_eq!(config.master.timeout, 0);
        assert!(config.master.endpoints.is_empty());
        assert!(config.slave.collections.is_empty());
        assert_eq!(config.interval().unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
interval: 1m
slave:
  enabled: true
  timeout: 250
  endpoints: ["10.0.0.2", "10.0.0.3:5051"]
  collections: [resources, tasks]
"#,
        );

        let config = Config::new(Args {
            config: Some(path),
            ..Default::default()
        })
        .unwrap();

        assert!(config.master.enabled);
        assert!(config.slave.enabled);
        assert_eq!(config.slave.timeout, 250);
        assert_eq!(config.slave.endpoints, vec!["10.0.0.2", "10.0.0.3:5051"]);
        assert_eq!(config.slave.collections, vec!["resources", "tasks"]);
        assert_eq!(config.interval().unwrap(), Duration::from_secs(60));
    }

    #[test]
    fn args_override_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "master:\n  endpoints: [\"10.0.0.1\"]\n");

        let config = Config::new(Args {
            config: Some(path),
            slaves: vec!["10.0.0.9".to_string()],
            master_collections: vec!["tasks".to_string()],
            timeout: Some(50),
            interval: Some("5s".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(config.master.endpoints, vec!["10.0.0.1"]);
        assert_eq!(config.master.collections, vec!["tasks"]);
        assert_eq!(config.master.timeout, 50);
        assert!(config.slave.enabled);
        assert_eq!(config.slave.endpoints, vec!["10.0.0.9"]);
        assert_eq!(config.slave.timeout, 50);
        assert_eq!(config.interval().unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = Config::new(Args {
            config: Some(dir.child("nope.yaml")),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn invalid_interval() {
        let config = Config {
            interval: "soon".to_string(),
            ..Config::default()
        };
        assert!(config.interval().is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = Config::new(Args {
            interval: Some("0s".to_string()),
            once: true,
            ..Default::default()
        })
        .unwrap();

        let err = config.interval().unwrap_err();
        assert_eq!(err.to_string(), "Invalid interval '0s': must be non-zero");
    }

    #[test]
    fn role_lookup() {
        let config = Config::default();
        assert_eq!(config.role("agent"), Some(&config.slave));
        assert_eq!(config.role("master"), Some(&config.master));
        assert_eq!(config.role("leader"), None);
    }
}
