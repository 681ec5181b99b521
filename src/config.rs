//! Configuration.
//!
//! This module contains the configuration read from a YAML file.

use java_provisioner::InstallOptions;
use serde::Deserialize;
use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Name of the default configuration file.
pub(crate) const CONFIG_FILENAME: &str = "java-provisioner.yml";

/// The struct that holds the configuration loaded from a YAML file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    /// The installation options (overridden by the command line).
    #[serde(default)]
    pub(crate) install: InstallOptions,
}

impl Config {
    /// Loads the configuration from the given filename.
    #[instrument(err, level = "trace")]
    pub(crate) fn load_from_file<P>(filename: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path> + std::fmt::Debug,
    {
        let config_file = File::open(filename)?;

        let de = serde_yaml::Deserializer::from_reader(config_file);
        let value = serde_yaml::Value::deserialize(de)?;
        // an empty file yields null
        if value.is_null() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml::from_value(value)?;

        Ok(config)
    }
}

/// Returns the path of the default configuration file, which lives next to the executable.
pub(crate) fn default_config_path() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILENAME)))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME))
}
