use std::{
    fs,
    path::{Path, PathBuf},
};

use chaingate::Resolver;
use serde::{Deserialize, Serialize};

use crate::forward::Forwarder;

/// Gateway configuration, persisted as TOML under the user config dir.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub socket: String,
    pub rpc_endpoints: Vec<String>,
    pub contract: String,
    pub selector: String,
    pub cache_ttl_secs: u64,
    pub upstream_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket: "0.0.0.0:37280".to_string(),
            rpc_endpoints: Resolver::DEFAULT_ENDPOINTS.map(String::from).to_vec(),
            contract: Resolver::DEFAULT_CONTRACT.to_string(),
            selector: Resolver::DEFAULT_SELECTOR.to_string(),
            cache_ttl_secs: Resolver::DEFAULT_TTL.as_secs(),
            upstream_timeout_secs: Forwarder::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Config {
    pub fn create_or_read_default() -> anyhow::Result<(PathBuf, Self)> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("failed to compute config dir"))?
            .join(env!("CARGO_PKG_NAME"));

        fs::create_dir_all(&config_dir).ok();

        let config = config_dir.join("config.toml");
        if config.exists() && !config.is_file() {
            anyhow::bail!(
                "the provided config path `{}` is not a valid path",
                config.display()
            );
        } else if config.is_file() {
            return Self::from_path(&config);
        }

        let slf = Self::default();

        fs::write(&config, toml::to_string(&slf)?)?;

        Ok((config, slf))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<(PathBuf, Self)> {
        let toml_str = fs::read_to_string(path.as_ref())?;

        Ok((path.as_ref().to_path_buf(), toml::from_str(&toml_str)?))
    }
}
