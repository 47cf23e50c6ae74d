//! Catalog error types.

/// Failure in the relational catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("database: {0}")]
    Sqlx(#[from] sqlx::Error),
}
