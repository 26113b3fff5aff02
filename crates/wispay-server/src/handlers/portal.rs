// ── Guest portal handlers ──
//
// Login/status/logout against existing hotspot accounts, package listing,
// and the purchase (submission) endpoint. The guest sees generated
// credentials exactly once, in the purchase response.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::debug;

use wispay_core::{AccountStatus, Package, SubmitInput};

use crate::AppState;
use crate::error::ApiError;
use crate::format::{format_bytes, format_uptime};

// ── Request / Response DTOs ──────────────────────────────────────────

#[derive(Serialize)]
pub struct PackageInfo {
    pub id: &'static str,
    pub label: &'static str,
    pub days: i64,
    pub price_bdt: u32,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub status: StatusResponse,
}

/// The guest's status card: profile, live session counters, and
/// remaining time.
#[derive(Serialize)]
pub struct StatusResponse {
    pub username: String,
    pub profile: Option<String>,
    pub enabled: bool,
    pub connected: bool,
    pub ip: Option<IpAddr>,
    pub mac: Option<String>,
    pub uptime: Option<String>,
    pub upload: String,
    pub download: String,
    pub remaining_time: String,
}

impl From<AccountStatus> for StatusResponse {
    fn from(status: AccountStatus) -> Self {
        let AccountStatus { account, session } = status;
        let (ip, mac, uptime, upload, download) = match &session {
            Some(s) => (
                s.address,
                s.mac_address.clone(),
                s.uptime.map(format_uptime),
                // From the guest's perspective: upload = bytes the router
                // received from them, download = bytes sent to them.
                format_bytes(s.bytes_out),
                format_bytes(s.bytes_in),
            ),
            None => (None, None, None, format_bytes(0), format_bytes(0)),
        };

        Self {
            username: account.username,
            profile: account.profile,
            enabled: account.enabled,
            connected: session.is_some(),
            ip,
            mac,
            uptime,
            upload,
            download,
            remaining_time: account
                .limit_uptime
                .unwrap_or_else(|| "unlimited".into()),
        }
    }
}

#[derive(Deserialize)]
pub struct PurchaseRequest {
    pub package: String,
    pub contact_number: String,
    #[serde(default)]
    pub proof_reference: Option<String>,
}

#[derive(Serialize)]
pub struct PurchaseResponse {
    pub username: String,
    /// Shown exactly once; not retrievable again through this API.
    pub password: String,
    pub package: Package,
    pub price_bdt: u32,
    pub status: String,
    pub valid_for: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub disconnected: bool,
}

// ── Handlers ─────────────────────────────────────────────────────────

/// GET /api/v1/packages — enumerate purchasable tiers
pub async fn list_packages() -> Json<Vec<PackageInfo>> {
    Json(
        Package::iter()
            .map(|p| PackageInfo {
                id: p.profile(),
                label: p.label(),
                days: p.duration_days(),
                price_bdt: p.price_bdt(),
            })
            .collect(),
    )
}

/// POST /api/v1/login — verify credentials, mint a session token
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let access = state.orchestrator.access();
    let account = access
        .verify_login(&payload.username, &payload.password)
        .await?;
    let session = access.active_session(&account.username).await?;

    let token = state.sessions.mint(&account.username)?;
    debug!(username = %account.username, "portal login");

    Ok(Json(LoginResponse {
        token,
        status: AccountStatus {
            account,
            session,
        }
        .into(),
    }))
}

/// GET /api/v1/status — current account + session view
pub async fn status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, ApiError> {
    let username = state.sessions.authenticate(&headers)?;
    let status = state.orchestrator.access().account_status(&username).await?;
    Ok(Json(status.into()))
}

/// POST /api/v1/logout — kick the live hotspot session, if any
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<LogoutResponse>, ApiError> {
    let username = state.sessions.authenticate(&headers)?;
    let disconnected = state
        .orchestrator
        .access()
        .disconnect_session(&username)
        .await?;
    debug!(username = %username, disconnected, "portal logout");
    Ok(Json(LogoutResponse { disconnected }))
}

/// POST /api/v1/purchase — submit a payment for manual approval
pub async fn purchase(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<PurchaseRequest>,
) -> Result<(StatusCode, Json<PurchaseResponse>), ApiError> {
    let request = state
        .orchestrator
        .submit(SubmitInput {
            package: payload.package,
            contact_number: payload.contact_number,
            proof_reference: payload.proof_reference,
            source_address: source_address(&headers, peer),
        })
        .await?;

    let response = PurchaseResponse {
        username: request.username.clone(),
        password: request.password.clone(),
        package: request.package,
        price_bdt: request.package.price_bdt(),
        status: request.status.to_string(),
        valid_for: request.package.label().to_string(),
        message: format!(
            "Submitted! Your account will be activated for {} once the payment is approved.",
            request.package.label()
        ),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Best-effort guest address: first `X-Forwarded-For` hop if present and
/// parseable, otherwise the socket peer. Metadata only -- never used for
/// authorization.
fn source_address(headers: &HeaderMap, peer: SocketAddr) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok())
        .or(Some(peer.ip()))
}
