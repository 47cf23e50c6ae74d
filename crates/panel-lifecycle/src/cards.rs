//! Human-readable account cards.
//!
//! Cards are write-only artifacts served from the web root so a freshly
//! created account is immediately usable; the panel never reads them back.

use std::path::{Path, PathBuf};

use panel_core::{Account, Protocol};

use crate::error::LifecycleError;
use crate::info::ServerInfo;
use crate::links::AccountLinks;

#[derive(Debug, Clone)]
pub struct CardWriter {
    html_dir: PathBuf,
}

impl CardWriter {
    pub fn new(html_dir: impl Into<PathBuf>) -> Self {
        CardWriter {
            html_dir: html_dir.into(),
        }
    }

    pub fn path_for(&self, protocol: Protocol, username: &str) -> PathBuf {
        self.html_dir
            .join(format!("{}-{}.txt", protocol.as_str(), username))
    }

    pub async fn write(
        &self,
        account: &Account,
        info: &ServerInfo,
        links: Option<&AccountLinks>,
    ) -> Result<PathBuf, LifecycleError> {
        tokio::fs::create_dir_all(&self.html_dir).await?;
        let path = self.path_for(account.protocol, &account.username);
        tokio::fs::write(&path, render(account, info, links)).await?;
        Ok(path)
    }

    /// Remove the card; already absent is fine.
    pub async fn remove(&self, protocol: Protocol, username: &str) -> Result<(), LifecycleError> {
        match tokio::fs::remove_file(self.path_for(protocol, username)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn html_dir(&self) -> &Path {
        &self.html_dir
    }
}

fn render(account: &Account, info: &ServerInfo, links: Option<&AccountLinks>) -> String {
    match account.protocol {
        Protocol::Ssh => render_ssh(account, info),
        _ => render_daemon(account, info, links),
    }
}

fn render_ssh(account: &Account, info: &ServerInfo) -> String {
    format!(
        "\
◇━━━━━━━━━━━━━━━━━◇
Format SSH OVPN Account
◇━━━━━━━━━━━━━━━━━◇
Username         : {username}
Password         : {password}
◇━━━━━━━━━━━━━━━━━◇
IP Limit         : {ip_limit}
Host             : {domain}
Port OpenSSH     : 443, 80, 22
Port Dropbear    : 443, 109
Port SSH WS      : 80, 8080, 8081-9999
Port SSH SSL WS  : 443
Port SSL/TLS     : 400-900
Port OVPN TCP    : 1194
Port OVPN UDP    : 2200
BadVPN UDP       : 7100, 7300
Location         : {city}
◇━━━━━━━━━━━━━━━━━◇
Dibuat Pada      : {created}
Berakhir Pada    : {expire}
===============================
Payload WSS: GET wss://{bug_host}/ HTTP/1.1[crlf]Host: {domain}[crlf]Upgrade: websocket[crlf][crlf]
===============================
OVPN Download : https://{domain}:81/
===============================
",
        username = account.username,
        password = account.credential.secret(),
        ip_limit = account.ip_limit,
        domain = info.domain,
        city = info.city,
        created = account.created_at.format("%d %b, %Y"),
        expire = account.expire_date,
        bug_host = account.bug_host,
    )
}

fn render_daemon(account: &Account, info: &ServerInfo, links: Option<&AccountLinks>) -> String {
    let title = match account.protocol {
        Protocol::Trojan => "Trojan Account",
        Protocol::Vless => "Vless Account",
        Protocol::Vmess => "Vmess Account",
        Protocol::Ssh => unreachable!(),
    };
    let service_name = format!("{}-grpc", account.protocol.as_str());
    let (ws_tls, ws_ntls, grpc) = match links {
        Some(l) => (l.ws_tls.as_str(), l.ws_ntls.as_str(), l.grpc.as_str()),
        None => ("", "", ""),
    };
    format!(
        "\
◇━━━━━━━━━━━━━━━━━◇
   {title}
◇━━━━━━━━━━━━━━━━━◇
Remarks          : {username}
Domain           : {domain}
User Quota       : {quota_gb} GB
User Ip          : {ip_limit} IP
Port TLS         : 400-900
Port none TLS    : 80, 8080, 8081-9999
id               : {secret}
Xray Dns         : {ns_domain}
Pubkey           : {pub_key}
alterId          : 0
Security         : auto
Network          : ws
Path             : /Multi-Path
ServiceName      : {service_name}
Location         : {city}
=====================
Link TLS         :
{ws_tls}
=====================
Link none TLS    :
{ws_ntls}
=====================
Link GRPC        :
{grpc}
=====================
Berakhir Pada    : {expire}
=====================
",
        title = title,
        username = account.username,
        domain = info.domain,
        quota_gb = account.quota_gb,
        ip_limit = account.ip_limit,
        secret = account.credential.secret(),
        ns_domain = info.ns_domain,
        pub_key = info.pub_key,
        service_name = service_name,
        city = info.city,
        ws_tls = ws_tls,
        ws_ntls = ws_ntls,
        grpc = grpc,
        expire = account.expire_date,
    )
}
