//! Configuration validation logic.

use crate::loader::ConfigError;
use crate::Config;

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.listen.trim().is_empty() {
        return Err(ConfigError::Validation("server.listen is empty".into()));
    }
    if config.database.url.trim().is_empty() {
        return Err(ConfigError::Validation("database.url is empty".into()));
    }
    if !config.database.url.starts_with("sqlite:") {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite: URL".into(),
        ));
    }
    if config.keys.file.as_os_str().is_empty() {
        return Err(ConfigError::Validation("keys.file is empty".into()));
    }
    if config.paths.xray_config.as_os_str().is_empty() {
        return Err(ConfigError::Validation("paths.xray_config is empty".into()));
    }
    match config.reload.mode.as_str() {
        "systemctl" | "none" => {}
        other => {
            return Err(ConfigError::Validation(format!(
                "reload.mode must be 'systemctl' or 'none', got '{}'",
                other
            )));
        }
    }
    if config.reload.mode == "systemctl" && config.reload.service.trim().is_empty() {
        return Err(ConfigError::Validation("reload.service is empty".into()));
    }
    Ok(())
}
