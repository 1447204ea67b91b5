//! Connection settings for the ruler API
//!
//! Settings come from three layers, highest precedence first:
//!
//! 1. command-line flags (which clap fills from `CORTEX_*` variables)
//! 2. a TOML file given with `--config`, or `~/.config/rulesync/config.toml`
//! 3. built-in defaults (30s request timeout)
//!
//! ```toml
//! address = "https://cortex.example.com"
//! tenant_id = "team-a"
//! api_key = "secret"
//! timeout = "10s"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rulesync_model::PromDuration;
use serde::Deserialize;

use crate::{Error, Result};

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolved settings for [`crate::CortexClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the ruler, e.g. `https://cortex.example.com`
    pub address: String,
    /// Sent as `X-Scope-OrgID` and as the basic-auth user
    pub tenant_id: String,
    /// Basic-auth password; no auth when absent
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

/// One layer of possibly incomplete settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub address: Option<String>,
    pub tenant_id: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Option<PromDuration>,
}

impl ConfigLayer {
    /// Read a layer from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read the file at `path`, or the default location when `path` is
    /// `None`. A missing default file yields an empty layer; a missing
    /// explicit file is an error.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match default_config_path() {
                Some(path) if path.is_file() => {
                    tracing::debug!(path = %path.display(), "using default config file");
                    Self::load(&path)
                }
                _ => Ok(Self::default()),
            },
        }
    }

    /// Overlay `other` on top of `self`; set fields in `other` win.
    pub fn merge(self, other: ConfigLayer) -> Self {
        Self {
            address: other.address.or(self.address),
            tenant_id: other.tenant_id.or(self.tenant_id),
            api_key: other.api_key.or(self.api_key),
            timeout: other.timeout.or(self.timeout),
        }
    }

    /// Finish resolution. Address and tenant id are required.
    pub fn resolve(self) -> Result<ClientConfig> {
        let address = non_empty(self.address).ok_or(Error::MissingSetting {
            setting: "address",
            flag: "--address",
            env: "CORTEX_ADDRESS",
        })?;
        let tenant_id = non_empty(self.tenant_id).ok_or(Error::MissingSetting {
            setting: "tenant id",
            flag: "--id",
            env: "CORTEX_TENANT_ID",
        })?;

        Ok(ClientConfig {
            address,
            tenant_id,
            api_key: non_empty(self.api_key),
            timeout: self
                .timeout
                .filter(|t| !t.is_zero())
                .map(|t| Duration::from_millis(t.as_millis()))
                .unwrap_or(DEFAULT_TIMEOUT),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// `~/.config/rulesync/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("rulesync").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn layer(address: Option<&str>, tenant: Option<&str>) -> ConfigLayer {
        ConfigLayer {
            address: address.map(String::from),
            tenant_id: tenant.map(String::from),
            ..ConfigLayer::default()
        }
    }

    #[test]
    fn test_flags_override_file() {
        let file = ConfigLayer {
            api_key: Some("file-key".into()),
            ..layer(Some("http://file:9009"), Some("file-tenant"))
        };
        let flags = layer(Some("http://flag:9009"), None);

        let config = file.merge(flags).resolve().unwrap();
        assert_eq!(
            config,
            ClientConfig {
                address: "http://flag:9009".into(),
                tenant_id: "file-tenant".into(),
                api_key: Some("file-key".into()),
                timeout: DEFAULT_TIMEOUT,
            }
        );
    }

    #[test]
    fn test_missing_address_is_error() {
        let err = layer(None, Some("t")).resolve().unwrap_err();
        assert!(err.to_string().contains("CORTEX_ADDRESS"));
    }

    #[test]
    fn test_blank_tenant_is_missing() {
        let err = layer(Some("http://x"), Some("  ")).resolve().unwrap_err();
        assert!(matches!(err, Error::MissingSetting { setting: "tenant id", .. }));
    }

    #[test]
    fn test_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "address = \"http://cortex:9009\"\ntenant_id = \"team-a\"\ntimeout = \"5s\"\n",
        )
        .unwrap();

        let config = ConfigLayer::load(&path).unwrap().resolve().unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "adress = \"http://cortex:9009\"\n").unwrap();

        let err = ConfigLayer::load(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let err = ConfigLayer::discover(Some(Path::new("/nonexistent/rulesync.toml"))).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
