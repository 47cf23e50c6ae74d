//! Per-protocol flat ledgers.
//!
//! One line per account, appended on create and filtered out on delete.
//! The line layout is a contract with shell tooling that greps these files:
//!
//! ```text
//! ssh:     ### <username> <password> <ip_limit> <expire_date>
//! others:  ### <username> <expire_date> <uuid> <quota_gb> <ip_limit>
//! ```

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use panel_config::PathsConfig;
use panel_core::{Account, Protocol};

use crate::error::StoreError;

const RECORD_PREFIX: &str = "###";

#[derive(Debug)]
pub struct FlatLedger {
    paths: PathsConfig,
    // One lock per ledger file; deletion is read-filter-rewrite.
    locks: [Mutex<()>; 4],
}

impl FlatLedger {
    pub fn new(paths: PathsConfig) -> Self {
        FlatLedger {
            paths,
            locks: [Mutex::new(()), Mutex::new(()), Mutex::new(()), Mutex::new(())],
        }
    }

    fn lock_of(&self, protocol: Protocol) -> &Mutex<()> {
        let idx = match protocol {
            Protocol::Ssh => 0,
            Protocol::Trojan => 1,
            Protocol::Vless => 2,
            Protocol::Vmess => 3,
        };
        &self.locks[idx]
    }

    /// The ledger line for an account.
    pub fn format_line(account: &Account) -> String {
        if account.protocol.is_ssh() {
            format!(
                "{} {} {} {} {}",
                RECORD_PREFIX,
                account.username,
                account.credential.secret(),
                account.ip_limit,
                account.expire_date
            )
        } else {
            format!(
                "{} {} {} {} {} {}",
                RECORD_PREFIX,
                account.username,
                account.expire_date,
                account.credential.secret(),
                account.quota_gb,
                account.ip_limit
            )
        }
    }

    /// Append the account's record line.
    pub async fn append(&self, account: &Account) -> Result<(), StoreError> {
        let _guard = self.lock_of(account.protocol).lock().await;
        let path = self.paths.ledger_file(account.protocol);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        let line = format!("{}\n", Self::format_line(account));
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Remove the account's record line, rewriting the whole file.
    ///
    /// Returns whether a line was removed. A missing ledger file means the
    /// record is already gone.
    pub async fn remove(&self, protocol: Protocol, username: &str) -> Result<bool, StoreError> {
        let _guard = self.lock_of(protocol).lock().await;
        let path = self.paths.ledger_file(protocol);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        let target = format!("{} {} ", RECORD_PREFIX, username);
        let mut removed = false;
        let mut kept = String::with_capacity(text.len());
        for line in text.lines() {
            if line.starts_with(&target) {
                removed = true;
            } else {
                kept.push_str(line);
                kept.push('\n');
            }
        }
        if removed {
            tokio::fs::write(&path, kept).await?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_core::{CreateRequest, Credential};

    fn paths(dir: &std::path::Path) -> PathsConfig {
        PathsConfig {
            etc_root: dir.to_path_buf(),
            ..PathsConfig::default()
        }
    }

    fn account(protocol: Protocol, username: &str, credential: Credential) -> Account {
        Account::resolve(
            protocol,
            &CreateRequest {
                username: username.into(),
                password: None,
                expired_days: 30,
                quota_gb: 10,
                ip_limit: 2,
                bug_host: None,
            },
            credential,
        )
    }

    #[test]
    fn line_layouts_differ_by_protocol() {
        let mut ssh = account(Protocol::Ssh, "bob", Credential::Password("secret".into()));
        ssh.expire_date = "2026-09-06".into();
        ssh.ip_limit = 1;
        assert_eq!(FlatLedger::format_line(&ssh), "### bob secret 1 2026-09-06");

        let mut trojan = account(Protocol::Trojan, "alice", Credential::Uuid("u-u-i-d".into()));
        trojan.expire_date = "2026-09-06".into();
        assert_eq!(
            FlatLedger::format_line(&trojan),
            "### alice 2026-09-06 u-u-i-d 10 2"
        );
    }

    #[tokio::test]
    async fn append_then_remove_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = FlatLedger::new(paths(dir.path()));

        let alice = account(Protocol::Trojan, "alice", Credential::new_uuid());
        let carol = account(Protocol::Trojan, "carol", Credential::new_uuid());
        ledger.append(&alice).await.unwrap();
        ledger.append(&carol).await.unwrap();

        assert!(ledger.remove(Protocol::Trojan, "alice").await.unwrap());
        let text = tokio::fs::read_to_string(dir.path().join("trojan/.trojan.db"))
            .await
            .unwrap();
        assert_eq!(text, format!("{}\n", FlatLedger::format_line(&carol)));
    }

    #[tokio::test]
    async fn remove_matches_record_prefix_only() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = FlatLedger::new(paths(dir.path()));

        // "al" is a prefix of "alice"; its record must survive alice's removal.
        ledger
            .append(&account(Protocol::Vless, "al", Credential::new_uuid()))
            .await
            .unwrap();
        ledger
            .append(&account(Protocol::Vless, "alice", Credential::new_uuid()))
            .await
            .unwrap();

        assert!(ledger.remove(Protocol::Vless, "alice").await.unwrap());
        let text = tokio::fs::read_to_string(dir.path().join("vless/.vless.db"))
            .await
            .unwrap();
        assert!(text.contains("### al "));
        assert!(!text.contains("### alice "));
    }

    #[tokio::test]
    async fn remove_from_missing_ledger_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = FlatLedger::new(paths(dir.path()));
        assert!(!ledger.remove(Protocol::Vmess, "ghost").await.unwrap());
    }
}
