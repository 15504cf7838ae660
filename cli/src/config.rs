//! Connection settings: TOML file first, then command-line flags.

use std::path::{Path, PathBuf};

use clap::Args;
use sky_core::{ClientConfig, TransportKind};

use crate::error::{Error, Result};

/// Read from the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = "sky.toml";

#[derive(Debug, Default, Args)]
pub struct ConnectionArgs {
    /// Server host
    #[arg(long, global = true, env = "SKY_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, global = true, env = "SKY_PORT")]
    pub port: Option<u16>,

    /// Connect over https
    #[arg(long, global = true)]
    pub ssl: bool,

    /// Transport: blocking or cooperative
    #[arg(long, global = true)]
    pub transport: Option<TransportKind>,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

impl ConnectionArgs {
    /// Resolve the final client configuration.
    pub fn resolve(&self) -> Result<ClientConfig> {
        let base = match &self.config {
            Some(path) => load(path)?,
            None if Path::new(CONFIG_FILE).exists() => load(Path::new(CONFIG_FILE))?,
            None => ClientConfig::default(),
        };
        Ok(self.apply(base))
    }

    /// Flags override whatever the file set.
    pub fn apply(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.ssl {
            config.ssl = true;
        }
        if let Some(transport) = self.transport {
            config.transport = transport;
        }
        config
    }
}

pub fn load(path: &Path) -> Result<ClientConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content)
}

pub fn parse(toml: &str) -> Result<ClientConfig> {
    toml::from_str(toml).map_err(|e| Error::ConfigParse(e.to_string()))
}
