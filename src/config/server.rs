use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_LOG_FILTER: &str = "stash=info";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

/// On-disk form of the config; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,
    data_dir: Option<PathBuf>,
    log_filter: Option<String>,
}

impl ServerConfig {
    /// Loads defaults overlaid with the TOML file at `path`, if given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = path {
            let contents = fs::read_to_string(path)?;
            config.apply_toml(&contents)?;
        }
        Ok(config)
    }

    fn apply_toml(&mut self, contents: &str) -> Result<()> {
        let file: FileConfig =
            toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))?;

        if let Some(host) = file.host {
            self.host = host;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(data_dir) = file.data_dir {
            self.data_dir = data_dir;
        }
        if let Some(log_filter) = file.log_filter {
            self.log_filter = log_filter;
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("stash.db")
    }

    #[must_use]
    pub fn admin_token_path(&self) -> PathBuf {
        self.data_dir.join(".admin_token")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::load(None).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_path(), PathBuf::from("./data/stash.db"));
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert!(config.socket_addr().is_ok());
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stash.toml");
        fs::write(&path, "port = 9090\ndata_dir = \"/var/lib/stash\"\n").unwrap();

        let config = ServerConfig::load(Some(&path)).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9090);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/stash"));
        assert_eq!(
            config.admin_token_path(),
            PathBuf::from("/var/lib/stash/.admin_token")
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut config = ServerConfig::default();
        let err = config.apply_toml("listen = \"0.0.0.0\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = ServerConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
