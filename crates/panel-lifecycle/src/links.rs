//! Protocol share-link builders.
//!
//! Trojan and vless use URI links; vmess links are the base64-encoded JSON
//! envelope client apps expect. Link shapes are a compatibility contract
//! with the client ecosystem.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;

use panel_core::Protocol;

/// The three links delivered with a daemon-config account. The ws variant
/// comes in TLS and non-TLS (fallback) forms.
#[derive(Debug, Clone, Serialize)]
pub struct AccountLinks {
    pub ws_tls: String,
    pub ws_ntls: String,
    pub grpc: String,
}

/// Build the share links for an account; ssh accounts have none.
pub fn build_links(
    protocol: Protocol,
    username: &str,
    secret: &str,
    domain: &str,
    bug_host: &str,
) -> Option<AccountLinks> {
    match protocol {
        Protocol::Ssh => None,
        Protocol::Trojan => Some(AccountLinks {
            ws_tls: format!(
                "trojan://{secret}@{domain}:443?path=%2Ftrojan-ws&security=tls&host={domain}&type=ws&sni={domain}#{username}"
            ),
            ws_ntls: format!(
                "trojan://{secret}@{domain}:80?path=%2Ftrojan-ws&security=none&host={domain}&type=ws#{username}"
            ),
            grpc: format!(
                "trojan://{secret}@{domain}:443?mode=gun&security=tls&type=grpc&serviceName=trojan-grpc&sni={domain}#{username}"
            ),
        }),
        Protocol::Vless => Some(AccountLinks {
            ws_tls: format!(
                "vless://{secret}@{domain}:443?path=/vless&security=tls&encryption=none&host={domain}&type=ws&serviceName=vless-ws&sni={domain}#{username}"
            ),
            ws_ntls: format!(
                "vless://{secret}@{domain}:80?path=/vless&encryption=none&type=ws#{username}"
            ),
            grpc: format!(
                "vless://{secret}@{domain}:443?mode=gun&security=tls&encryption=none&type=grpc&serviceName=vless-grpc&sni={domain}#{username}"
            ),
        }),
        Protocol::Vmess => Some(AccountLinks {
            ws_tls: vmess_link(username, secret, bug_host, "443", "ws", "/vmess", domain, "tls"),
            ws_ntls: vmess_link(username, secret, bug_host, "80", "ws", "/vmess", domain, "none"),
            grpc: vmess_link(username, secret, domain, "443", "grpc", "vmess-grpc", domain, "tls"),
        }),
    }
}

#[allow(clippy::too_many_arguments)]
fn vmess_link(
    username: &str,
    secret: &str,
    address: &str,
    port: &str,
    net: &str,
    path: &str,
    host: &str,
    tls: &str,
) -> String {
    let envelope = serde_json::json!({
        "v": "2",
        "ps": username,
        "add": address,
        "port": port,
        "id": secret,
        "aid": "0",
        "net": net,
        "path": path,
        "type": "none",
        "host": host,
        "tls": tls,
    });
    format!("vmess://{}", STANDARD.encode(envelope.to_string()))
}
