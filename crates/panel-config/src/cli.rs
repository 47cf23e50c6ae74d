//! CLI overrides applied on top of the loaded configuration.

use clap::Args;

use crate::Config;

/// Flags that override values from the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct CliOverrides {
    /// Listen address for the management API.
    #[arg(long)]
    pub listen: Option<String>,

    /// SQLite URL for the account catalog.
    #[arg(long, env = "PANEL_DATABASE_URL")]
    pub database: Option<String>,

    /// Path to the daemon configuration file.
    #[arg(long)]
    pub xray_config: Option<std::path::PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) {
    if let Some(listen) = &overrides.listen {
        config.server.listen = listen.clone();
    }
    if let Some(database) = &overrides.database {
        config.database.url = database.clone();
    }
    if let Some(path) = &overrides.xray_config {
        config.paths.xray_config = path.clone();
    }
    if let Some(level) = &overrides.log_level {
        config.logging.level = Some(level.clone());
    }
}
