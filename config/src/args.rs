use std::path::PathBuf;

/// Options that override the configuration files.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct Args {
    /// Configuration file to use instead of `config.yaml` in the config directory.
    #[clap(long, value_name = "FILE", env = "SNAPSHOT_GATHERER_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Mesos master to poll, as `host` or `host:port`. Enables the master role.
    #[clap(long = "master", value_name = "ADDR")]
    pub masters: Vec<String>,

    /// Mesos slave to poll, as `host` or `host:port`. Enables the slave role.
    #[clap(long = "slave", alias = "agent", value_name = "ADDR")]
    pub slaves: Vec<String>,

    /// Master metric group to keep. All groups are kept when none is given.
    #[clap(long = "master-collection", value_name = "GROUP")]
    pub master_collections: Vec<String>,

    /// Slave metric group to keep. All groups are kept when none is given.
    #[clap(long = "slave-collection", value_name = "GROUP")]
    pub slave_collections: Vec<String>,

    /// Timeout hint sent to every daemon, in milliseconds.
    #[clap(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Time between gather cycles (e.g. "10s", "1m").
    #[clap(long, value_name = "DURATION", env = "SNAPSHOT_GATHERER_INTERVAL")]
    pub interval: Option<String>,

    /// Write the JSON summary of every cycle to this file.
    #[clap(long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Run a single gather cycle and exit.
    #[clap(long, action)]
    pub once: bool,

    /// Enable verbose logging.
    #[clap(short, long, action)]
    pub verbose: bool,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            for (role, endpoints, collections) in [
                ("master", &self.masters, &self.master_collections),
                ("slave", &self.slaves, &self.slave_collections),
            ] {
                if !endpoints.is_empty() {
                    cache.insert(format!("{role}.enabled"), true.into());
                    cache.insert(format!("{role}.endpoints"), endpoints.clone().into());
                }
                if !collections.is_empty() {
                    cache.insert(format!("{role}.collections"), collections.clone().into());
                }
                if let Some(timeout) = self.timeout {
                    cache.insert(format!("{role}.timeout"), timeout.into());
                }
            }
            if let Some(interval) = &self.interval {
                cache.insert("interval".to_string(), interval.clone().into());
            }
            if let Some(output_file) = &self.output_file {
                cache.insert("output_file".to_string(), output_file.display().to_string().into());
            }
            Ok(cache)
        }
    }
}
