//! Activity log operations.

use chrono::Local;
use serde::Serialize;
use sqlx::Row;

use crate::catalog::AccountCatalog;
use crate::error::CatalogError;

/// One activity log row.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityRow {
    pub id: i64,
    pub username: Option<String>,
    pub action: String,
    pub service_type: Option<String>,
    pub timestamp: String,
    pub ip_address: Option<String>,
    pub details: Option<String>,
}

/// Filters for the activity log query.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub username: Option<String>,
    pub action: Option<String>,
    pub service_type: Option<String>,
    pub limit: Option<i64>,
}

impl AccountCatalog {
    /// Record one lifecycle action.
    pub async fn log_activity(
        &self,
        username: &str,
        action: &str,
        service_type: &str,
        ip_address: Option<&str>,
        details: &str,
    ) -> Result<(), CatalogError> {
        sqlx::query(
            r#"
            INSERT INTO activity_logs (username, action, service_type, timestamp, ip_address, details)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(action)
        .bind(service_type)
        .bind(Local::now().to_rfc3339())
        .bind(ip_address)
        .bind(details)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Most recent log rows matching the filter.
    pub async fn recent_logs(&self, filter: &LogFilter) -> Result<Vec<ActivityRow>, CatalogError> {
        let mut query = String::from("SELECT * FROM activity_logs WHERE 1=1");
        if filter.username.is_some() {
            query.push_str(" AND username = ?");
        }
        if filter.action.is_some() {
            query.push_str(" AND action = ?");
        }
        if filter.service_type.is_some() {
            query.push_str(" AND service_type = ?");
        }
        query.push_str(" ORDER BY timestamp DESC LIMIT ?");

        let mut q = sqlx::query(&query);
        if let Some(username) = &filter.username {
            q = q.bind(username);
        }
        if let Some(action) = &filter.action {
            q = q.bind(action);
        }
        if let Some(service) = &filter.service_type {
            q = q.bind(service);
        }
        q = q.bind(filter.limit.unwrap_or(100));

        let rows = q.fetch_all(self.pool()).await?;
        Ok(rows
            .into_iter()
            .map(|row| ActivityRow {
                id: row.try_get("id").unwrap_or(0),
                username: row.try_get("username").ok(),
                action: row.try_get("action").unwrap_or_default(),
                service_type: row.try_get("service_type").ok(),
                timestamp: row.try_get("timestamp").unwrap_or_default(),
                ip_address: row.try_get("ip_address").ok(),
                details: row.try_get("details").ok(),
            })
            .collect())
    }
}
