//! Configuration types and loading.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use panel_core::Protocol;

mod cli;
mod defaults;
mod loader;
mod validate;

pub use cli::{apply_overrides, CliOverrides};
pub use loader::{load_config, ConfigError};
pub use validate::validate_config;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub keys: KeysConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub reload: ReloadConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address for the management API.
    #[serde(default = "defaults::listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen: defaults::listen(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL for the account catalog.
    #[serde(default = "defaults::database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            url: defaults::database_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysConfig {
    /// JSON registry of API keys.
    #[serde(default = "defaults::keys_file")]
    pub file: PathBuf,
}

impl Default for KeysConfig {
    fn default() -> Self {
        KeysConfig {
            file: defaults::keys_file(),
        }
    }
}

/// Filesystem layout of every store the panel owns or consumes.
///
/// Paths are a stable contract with the daemon and external tooling; the
/// defaults mirror the layout the daemon ships with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// The daemon's configuration file (sentinel-annotated JSON).
    #[serde(default = "defaults::xray_config")]
    pub xray_config: PathBuf,
    /// Root under which each protocol has a home directory
    /// (`<etc_root>/<protocol>` holds the ledger and quota files).
    #[serde(default = "defaults::etc_root")]
    pub etc_root: PathBuf,
    /// Root of the per-protocol IP-limit trees
    /// (`<limit_root>/<protocol>/ip/<username>`).
    #[serde(default = "defaults::limit_root")]
    pub limit_root: PathBuf,
    /// Web root for generated account cards.
    #[serde(default = "defaults::html_dir")]
    pub html_dir: PathBuf,
    #[serde(default = "defaults::domain_file")]
    pub domain_file: PathBuf,
    #[serde(default = "defaults::city_file")]
    pub city_file: PathBuf,
    #[serde(default = "defaults::ns_domain_file")]
    pub ns_domain_file: PathBuf,
    #[serde(default = "defaults::pubkey_file")]
    pub pubkey_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            xray_config: defaults::xray_config(),
            etc_root: defaults::etc_root(),
            limit_root: defaults::limit_root(),
            html_dir: defaults::html_dir(),
            domain_file: defaults::domain_file(),
            city_file: defaults::city_file(),
            ns_domain_file: defaults::ns_domain_file(),
            pubkey_file: defaults::pubkey_file(),
        }
    }
}

impl PathsConfig {
    /// Per-protocol home directory (`/etc/trojan`, `/etc/vless`, ...).
    pub fn service_home(&self, protocol: Protocol) -> PathBuf {
        self.etc_root.join(protocol.as_str())
    }

    /// Flat ledger file for a protocol (`/etc/trojan/.trojan.db`).
    pub fn ledger_file(&self, protocol: Protocol) -> PathBuf {
        self.service_home(protocol)
            .join(format!(".{}.db", protocol.as_str()))
    }

    /// Quota file for an account (ASCII byte count).
    pub fn quota_file(&self, protocol: Protocol, username: &str) -> PathBuf {
        self.service_home(protocol).join(username)
    }

    /// IP-limit file for an account (ASCII integer).
    pub fn ip_limit_file(&self, protocol: Protocol, username: &str) -> PathBuf {
        self.limit_root
            .join(protocol.as_str())
            .join("ip")
            .join(username)
    }

    /// Generated card for an account.
    pub fn card_file(&self, protocol: Protocol, username: &str) -> PathBuf {
        self.html_dir
            .join(format!("{}-{}.txt", protocol.as_str(), username))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadConfig {
    /// Reload mechanism: "systemctl" or "none".
    #[serde(default = "defaults::reload_mode")]
    pub mode: String,
    /// Service unit restarted after config mutations.
    #[serde(default = "defaults::reload_service")]
    pub service: String,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        ReloadConfig {
            mode: defaults::reload_mode(),
            service: defaults::reload_service(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base log level (trace, debug, info, warn, error).
    #[serde(default)]
    pub level: Option<String>,
    /// Output format (json, pretty, compact).
    #[serde(default)]
    pub format: Option<String>,
    /// Output target (stdout, stderr).
    #[serde(default)]
    pub output: Option<String>,
    /// Per-module log level overrides.
    #[serde(default)]
    pub filters: HashMap<String, String>,
}
