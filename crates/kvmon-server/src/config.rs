use anyhow::{Context, Result};
use clap::Parser;
use kvmon_common::TargetSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Consul KV modify-index exporter
#[derive(Parser, Debug, Clone)]
#[command(name = "kvmon", version)]
pub struct StartupArgs {
    /// Path to the target configuration file (YAML, or TOML with a .toml extension)
    #[arg(long, env = "CONFIG_FILE")]
    pub config_file: String,

    /// Base URI of the Consul HTTP API, e.g. http://127.0.0.1:8500
    #[arg(long, env = "CONSUL_BASE_URI")]
    pub consul_base_uri: String,

    /// Address for the /metrics endpoint, e.g. 0.0.0.0:9100 or :9100
    #[arg(long, env = "LISTEN_ADDR")]
    pub listen_addr: String,
}

impl StartupArgs {
    /// Listen address usable by `TcpListener::bind`; a bare `:port` binds
    /// every interface.
    pub fn bind_addr(&self) -> String {
        normalize_listen_addr(&self.listen_addr)
    }
}

pub fn normalize_listen_addr(addr: &str) -> String {
    let addr = addr.trim();
    if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvmonConfig {
    /// Directories to poll, keyed by data center name.
    #[serde(default)]
    pub dc: BTreeMap<String, DcConfig>,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DcConfig {
    #[serde(default)]
    pub directories: Vec<String>,
}

fn default_poll_interval_secs() -> u64 {
    5
}

impl Default for KvmonConfig {
    fn default() -> Self {
        Self {
            dc: BTreeMap::new(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl KvmonConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{path}'"))?;

        let is_toml = Path::new(path)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let config = if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
        .with_context(|| format!("Failed to load config file '{path}'"))?;

        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // An empty YAML document deserializes to unit, not a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content).context("Invalid YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Invalid TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs must be greater than 0");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn targets(&self) -> TargetSet {
        let directories: BTreeMap<String, Vec<String>> = self
            .dc
            .iter()
            .map(|(dc, cfg)| (dc.clone(), cfg.directories.clone()))
            .collect();
        TargetSet::from_directories(&directories)
    }
}
