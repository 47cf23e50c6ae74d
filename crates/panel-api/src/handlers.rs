//! Request handlers.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Extension, Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use panel_catalog::LogFilter;
use panel_core::{CreateRequest, Protocol};
use panel_lifecycle::{CreatedAccount, ServerInfo};
use panel_store::ApiKeyData;

use crate::auth::require_admin;
use crate::error::ApiError;
use crate::state::AppState;

fn parse_protocol(raw: &str) -> Result<Protocol, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("unknown protocol: {}", raw)))
}

fn peer_ip(peer: Option<&ConnectInfo<SocketAddr>>) -> Option<String> {
    peer.map(|ConnectInfo(addr)| addr.ip().to_string())
}

async fn log_create(
    state: &AppState,
    created: &CreatedAccount,
    ip: Option<String>,
) -> Result<(), ApiError> {
    let action = if created.trial { "CREATE_TRIAL" } else { "CREATE" };
    let details = format!(
        "quota: {}GB, IP limit: {}",
        created.quota_gb, created.ip_limit
    );
    state
        .catalog()
        .log_activity(
            &created.username,
            action,
            created.protocol.as_str(),
            ip.as_deref(),
            &details,
        )
        .await?;
    Ok(())
}

pub async fn server_info(State(state): State<AppState>) -> Json<Value> {
    let info = ServerInfo::load(state.paths()).await;
    Json(json!({ "status": "success", "data": info }))
}

pub async fn create_account(
    State(state): State<AppState>,
    Path(proto): Path<String>,
    peer: Option<ConnectInfo<SocketAddr>>,
    Json(req): Json<CreateRequest>,
) -> Result<Json<Value>, ApiError> {
    let protocol = parse_protocol(&proto)?;
    let created = state.coordinator.create(protocol, req).await?;
    log_create(&state, &created, peer_ip(peer.as_ref())).await?;
    Ok(Json(json!({
        "status": "success",
        "message": format!("{} account created", protocol),
        "data": created,
    })))
}

pub async fn create_trial(
    State(state): State<AppState>,
    Path(proto): Path<String>,
    peer: Option<ConnectInfo<SocketAddr>>,
) -> Result<Json<Value>, ApiError> {
    let protocol = parse_protocol(&proto)?;
    let created = state.coordinator.create_trial(protocol).await?;
    log_create(&state, &created, peer_ip(peer.as_ref())).await?;
    Ok(Json(json!({
        "status": "success",
        "message": format!("{} trial account created", protocol),
        "data": created,
    })))
}

pub async fn delete_account(
    State(state): State<AppState>,
    Path((proto, username)): Path<(String, String)>,
    peer: Option<ConnectInfo<SocketAddr>>,
) -> Result<Json<Value>, ApiError> {
    let protocol = parse_protocol(&proto)?;
    state.coordinator.delete(protocol, &username).await?;
    state
        .catalog()
        .log_activity(
            &username,
            "DELETE",
            protocol.as_str(),
            peer_ip(peer.as_ref()).as_deref(),
            "account removed",
        )
        .await?;
    Ok(Json(json!({
        "status": "success",
        "message": format!("{} account {} deleted", protocol, username),
    })))
}

pub async fn list_protocol(
    State(state): State<AppState>,
    Path(proto): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let protocol = parse_protocol(&proto)?;
    let accounts = state.catalog().list(Some(protocol)).await?;
    Ok(Json(json!({ "status": "success", "data": accounts })))
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    service_type: Option<String>,
}

pub async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let protocol = match query.service_type.as_deref() {
        Some(raw) => Some(parse_protocol(raw)?),
        None => None,
    };
    let accounts = state.catalog().list(protocol).await?;
    Ok(Json(json!({ "status": "success", "data": accounts })))
}

pub async fn account_stats(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let stats = state.catalog().stats().await?;
    Ok(Json(json!({ "status": "success", "data": stats })))
}

#[derive(Deserialize)]
pub struct LogsQuery {
    username: Option<String>,
    action: Option<String>,
    service_type: Option<String>,
    limit: Option<i64>,
}

pub async fn activity_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = LogFilter {
        username: query.username,
        action: query.action,
        service_type: query.service_type,
        limit: query.limit,
    };
    let logs = state.catalog().recent_logs(&filter).await?;
    Ok(Json(json!({ "status": "success", "data": logs })))
}

pub async fn list_keys(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKeyData>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&key)?;
    Ok(Json(json!({ "status": "success", "data": state.keys.list() })))
}

#[derive(Deserialize)]
pub struct MintKeyRequest {
    name: String,
    #[serde(default = "default_permissions")]
    permissions: Vec<String>,
}

fn default_permissions() -> Vec<String> {
    vec!["read".to_string()]
}

pub async fn mint_key(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKeyData>,
    Json(req): Json<MintKeyRequest>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&key)?;
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("key name is required".into()));
    }
    let (key_id, data) = state.keys.mint(&req.name, req.permissions)?;
    Ok(Json(json!({
        "status": "success",
        "message": "API key created",
        "data": {
            "key_id": key_id,
            "api_key": data.key,
            "name": data.name,
            "permissions": data.permissions,
        },
    })))
}
