//! Server identity info consumed by cards and links.

use std::path::Path;

use serde::Serialize;

use panel_config::PathsConfig;

/// Host facts read from well-known files, with fallbacks when absent.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub domain: String,
    pub city: String,
    pub ns_domain: String,
    pub pub_key: String,
}

impl ServerInfo {
    pub async fn load(paths: &PathsConfig) -> ServerInfo {
        let domain = read_trimmed(&paths.domain_file)
            .await
            .unwrap_or_else(|| "your-domain.com".to_string());
        let city = read_trimmed(&paths.city_file)
            .await
            .unwrap_or_else(|| "Unknown".to_string());
        let ns_domain = read_trimmed(&paths.ns_domain_file)
            .await
            .unwrap_or_else(|| domain.clone());
        let pub_key = read_trimmed(&paths.pubkey_file).await.unwrap_or_default();
        ServerInfo {
            domain,
            city,
            ns_domain,
            pub_key,
        }
    }
}

async fn read_trimmed(path: &Path) -> Option<String> {
    tokio::fs::read_to_string(path)
        .await
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn falls_back_when_files_missing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathsConfig {
            domain_file: dir.path().join("domain"),
            city_file: dir.path().join("city"),
            ns_domain_file: dir.path().join("ns"),
            pubkey_file: dir.path().join("pub"),
            ..PathsConfig::default()
        };

        let info = ServerInfo::load(&paths).await;
        assert_eq!(info.domain, "your-domain.com");
        assert_eq!(info.city, "Unknown");
        assert_eq!(info.ns_domain, "your-domain.com");
        assert_eq!(info.pub_key, "");
    }

    #[tokio::test]
    async fn reads_and_trims_files() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("domain"), "vpn.example.net\n")
            .await
            .unwrap();
        let paths = PathsConfig {
            domain_file: dir.path().join("domain"),
            city_file: dir.path().join("city"),
            ns_domain_file: dir.path().join("ns"),
            pubkey_file: dir.path().join("pub"),
            ..PathsConfig::default()
        };

        let info = ServerInfo::load(&paths).await;
        assert_eq!(info.domain, "vpn.example.net");
        // ns falls back to the domain, not the static default.
        assert_eq!(info.ns_domain, "vpn.example.net");
    }
}
