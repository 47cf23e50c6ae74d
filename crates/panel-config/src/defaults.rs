//! Default configuration values.

use std::path::PathBuf;

pub fn listen() -> String {
    "0.0.0.0:7777".to_string()
}

pub fn database_url() -> String {
    "sqlite:/etc/API/vpn_accounts.db".to_string()
}

pub fn keys_file() -> PathBuf {
    PathBuf::from("/etc/API/api_keys.json")
}

pub fn xray_config() -> PathBuf {
    PathBuf::from("/etc/xray/config.json")
}

pub fn etc_root() -> PathBuf {
    PathBuf::from("/etc")
}

pub fn limit_root() -> PathBuf {
    PathBuf::from("/etc/kyt/limit")
}

pub fn html_dir() -> PathBuf {
    PathBuf::from("/var/www/html")
}

pub fn domain_file() -> PathBuf {
    PathBuf::from("/etc/xray/domain")
}

pub fn city_file() -> PathBuf {
    PathBuf::from("/etc/xray/city")
}

pub fn ns_domain_file() -> PathBuf {
    PathBuf::from("/root/nsdomain")
}

pub fn pubkey_file() -> PathBuf {
    PathBuf::from("/etc/slowdns/server.pub")
}

pub fn reload_mode() -> String {
    "systemctl".to_string()
}

pub fn reload_service() -> String {
    "xray".to_string()
}
