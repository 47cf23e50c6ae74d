//! Account table operations.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{Duration, Local};
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use panel_core::{Account, Credential, Protocol};

use crate::error::CatalogError;

/// SQLite-backed account catalog.
#[derive(Debug, Clone)]
pub struct AccountCatalog {
    pool: SqlitePool,
}

/// One catalog row.
#[derive(Debug, Clone, Serialize)]
pub struct AccountRow {
    pub username: String,
    pub password: Option<String>,
    pub uuid: Option<String>,
    pub service_type: String,
    pub quota_gb: i64,
    pub ip_limit: i64,
    pub created_date: String,
    pub expire_date: String,
    pub is_active: bool,
    pub bug_host: String,
}

/// Aggregate account statistics.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub service_stats: HashMap<String, i64>,
    pub active: i64,
    pub inactive: i64,
    pub expiring_soon: i64,
}

impl AccountCatalog {
    /// Connect to the catalog, creating the database file when missing.
    pub async fn connect(url: &str) -> Result<Self, CatalogError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // A single connection serializes writers; the panel is the only one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        let catalog = AccountCatalog { pool };
        catalog.init_schema().await?;
        Ok(catalog)
    }

    /// Create tables when absent.
    pub async fn init_schema(&self) -> Result<(), CatalogError> {
        let schema = r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT UNIQUE NOT NULL,
            password TEXT,
            uuid TEXT,
            service_type TEXT NOT NULL,
            quota_gb INTEGER DEFAULT 0,
            ip_limit INTEGER DEFAULT 1,
            created_date TEXT NOT NULL,
            expire_date TEXT NOT NULL,
            is_active BOOLEAN DEFAULT 1,
            bug_host TEXT DEFAULT 'bug.com'
        );
        CREATE TABLE IF NOT EXISTS activity_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT,
            action TEXT NOT NULL,
            service_type TEXT,
            timestamp TEXT NOT NULL,
            ip_address TEXT,
            details TEXT
        );
        "#;
        for stmt in schema.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert a freshly provisioned account.
    pub async fn insert(&self, account: &Account) -> Result<(), CatalogError> {
        let (password, uuid) = match &account.credential {
            Credential::Password(p) => (Some(p.as_str()), None),
            Credential::Uuid(u) => (None, Some(u.as_str())),
        };
        sqlx::query(
            r#"
            INSERT INTO accounts
                (username, password, uuid, service_type, quota_gb, ip_limit,
                 created_date, expire_date, bug_host)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.username)
        .bind(password)
        .bind(uuid)
        .bind(account.protocol.as_str())
        .bind(account.quota_gb as i64)
        .bind(i64::from(account.ip_limit))
        .bind(account.created_date())
        .bind(&account.expire_date)
        .bind(&account.bug_host)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Global uniqueness probe: is the username taken by any protocol?
    pub async fn exists(&self, username: &str) -> Result<bool, CatalogError> {
        let row = sqlx::query("SELECT 1 FROM accounts WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Fetch one account by username and protocol.
    pub async fn lookup(
        &self,
        username: &str,
        protocol: Protocol,
    ) -> Result<Option<AccountRow>, CatalogError> {
        let row = sqlx::query(
            "SELECT * FROM accounts WHERE username = ? AND service_type = ?",
        )
        .bind(username)
        .bind(protocol.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(parse_account_row))
    }

    /// Delete one account row; returns whether a row was removed.
    pub async fn delete(&self, username: &str, protocol: Protocol) -> Result<bool, CatalogError> {
        let result = sqlx::query("DELETE FROM accounts WHERE username = ? AND service_type = ?")
            .bind(username)
            .bind(protocol.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List accounts, optionally filtered by protocol, newest first.
    pub async fn list(&self, protocol: Option<Protocol>) -> Result<Vec<AccountRow>, CatalogError> {
        let rows = match protocol {
            Some(p) => {
                sqlx::query(
                    "SELECT * FROM accounts WHERE service_type = ? ORDER BY created_date DESC",
                )
                .bind(p.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query("SELECT * FROM accounts ORDER BY created_date DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows.into_iter().map(parse_account_row).collect())
    }

    /// Aggregate stats: per-service counts, active split, expiring in 7 days.
    pub async fn stats(&self) -> Result<CatalogStats, CatalogError> {
        let service_rows =
            sqlx::query("SELECT service_type, COUNT(*) AS count FROM accounts GROUP BY service_type")
                .fetch_all(&self.pool)
                .await?;
        let mut service_stats = HashMap::new();
        for row in service_rows {
            let service: String = row.try_get("service_type").unwrap_or_default();
            let count: i64 = row.try_get("count").unwrap_or(0);
            service_stats.insert(service, count);
        }

        let active_rows =
            sqlx::query("SELECT is_active, COUNT(*) AS count FROM accounts GROUP BY is_active")
                .fetch_all(&self.pool)
                .await?;
        let (mut active, mut inactive) = (0, 0);
        for row in active_rows {
            let flag = parse_bool(&row, "is_active");
            let count: i64 = row.try_get("count").unwrap_or(0);
            if flag {
                active = count;
            } else {
                inactive = count;
            }
        }

        let horizon = (Local::now() + Duration::days(7)).format("%Y-%m-%d").to_string();
        let expiring: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM accounts WHERE expire_date <= ? AND is_active = 1",
        )
        .bind(&horizon)
        .fetch_one(&self.pool)
        .await?
        .try_get("count")
        .unwrap_or(0);

        Ok(CatalogStats {
            service_stats,
            active,
            inactive,
            expiring_soon: expiring,
        })
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn parse_account_row(row: SqliteRow) -> AccountRow {
    AccountRow {
        username: row.try_get("username").unwrap_or_default(),
        password: row.try_get("password").ok(),
        uuid: row.try_get("uuid").ok(),
        service_type: row.try_get("service_type").unwrap_or_default(),
        quota_gb: row.try_get("quota_gb").unwrap_or(0),
        ip_limit: row.try_get("ip_limit").unwrap_or(0),
        created_date: row.try_get("created_date").unwrap_or_default(),
        expire_date: row.try_get("expire_date").unwrap_or_default(),
        is_active: parse_bool(&row, "is_active"),
        bug_host: row.try_get("bug_host").unwrap_or_default(),
    }
}

// SQLite stores booleans as integers, so try both types.
fn parse_bool(row: &SqliteRow, column: &str) -> bool {
    row.try_get::<bool, _>(column)
        .or_else(|_| row.try_get::<i32, _>(column).map(|v| v != 0))
        .unwrap_or(true)
}
