//! Account request and record types.

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::{DEFAULT_BUG_HOST, DEFAULT_EXPIRED_DAYS, DEFAULT_IP_LIMIT, EXPIRE_DATE_FORMAT};
use crate::protocol::Protocol;

/// Caller-supplied parameters for a create operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequest {
    pub username: String,
    /// Required for ssh, ignored otherwise.
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_expired_days")]
    pub expired_days: u32,
    /// Gibibytes; 0 = unlimited. Ignored for ssh.
    #[serde(default)]
    pub quota_gb: u64,
    /// Concurrent-IP ceiling; 0 = unlimited.
    #[serde(default = "default_ip_limit")]
    pub ip_limit: u32,
    #[serde(default)]
    pub bug_host: Option<String>,
}

fn default_expired_days() -> u32 {
    DEFAULT_EXPIRED_DAYS
}

fn default_ip_limit() -> u32 {
    DEFAULT_IP_LIMIT
}

/// Credential attached to an account: a password for ssh, a generated
/// unique identifier for daemon-config protocols. Never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Credential {
    Password(String),
    Uuid(String),
}

impl Credential {
    /// Generate a fresh UUID credential.
    pub fn new_uuid() -> Self {
        Credential::Uuid(Uuid::new_v4().to_string())
    }

    /// The raw secret string, regardless of kind.
    pub fn secret(&self) -> &str {
        match self {
            Credential::Password(s) | Credential::Uuid(s) => s,
        }
    }
}

/// A fully-resolved account, ready for provisioning across the stores.
///
/// `expire_date` is derived once at creation (`created_at + expired_days`)
/// and is immutable afterwards; changing it requires delete + recreate.
#[derive(Debug, Clone)]
pub struct Account {
    pub username: String,
    pub protocol: Protocol,
    pub credential: Credential,
    pub quota_gb: u64,
    pub ip_limit: u32,
    pub created_at: DateTime<Local>,
    /// `%Y-%m-%d`, the form used in markers, ledgers and the catalog.
    pub expire_date: String,
    pub bug_host: String,
}

impl Account {
    /// Resolve a validated request into an account.
    pub fn resolve(protocol: Protocol, req: &CreateRequest, credential: Credential) -> Self {
        let created_at = Local::now();
        let expire_date = (created_at + Duration::days(i64::from(req.expired_days)))
            .format(EXPIRE_DATE_FORMAT)
            .to_string();
        Account {
            username: req.username.clone(),
            protocol,
            credential,
            quota_gb: if protocol.is_ssh() { 0 } else { req.quota_gb },
            ip_limit: req.ip_limit,
            created_at,
            expire_date,
            bug_host: req
                .bug_host
                .clone()
                .unwrap_or_else(|| DEFAULT_BUG_HOST.to_string()),
        }
    }

    /// Quota in bytes as written to the quota file.
    pub fn quota_bytes(&self) -> u64 {
        self.quota_gb * crate::defaults::QUOTA_UNIT_BYTES
    }

    /// ISO-8601 creation timestamp as stored in the catalog.
    pub fn created_date(&self) -> String {
        self.created_at.to_rfc3339()
    }
}
