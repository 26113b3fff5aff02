// ── Telegram webhook handler ──
//
// The inbound half of the approval channel. Inline-button callbacks become
// approval events; text messages in the admin chat are bot commands.
// Responses always acknowledge with 200 -- the channel's delivery is
// at-most-once, and redelivering an event the orchestrator already applied
// is a no-op anyway. Failures are reported in-channel (callback toast +
// edited message), not as HTTP errors.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::{info, warn};

use wispay_api::telegram::types::{CallbackQuery, Message, Update};
use wispay_core::{
    ApprovalEvent, ApprovalOutcome, CallbackToken, CoreError, RequestStatus,
    orchestrator::expiry_display,
};

use crate::AppState;
use crate::error::ApiError;
use crate::format::format_bytes;

/// POST /telegram/webhook/{secret}
pub async fn telegram_webhook(
    State(state): State<Arc<AppState>>,
    Path(secret): Path<String>,
    Json(update): Json<Update>,
) -> Result<StatusCode, ApiError> {
    // Wrong secret looks like any other unknown route.
    if secret != state.webhook_secret {
        return Err(ApiError::NotFound);
    }

    if let Some(callback) = update.callback_query {
        handle_callback(&state, callback).await;
    } else if let Some(message) = update.message {
        handle_command(&state, message).await;
    }
    // Other update kinds are ignored.

    Ok(StatusCode::OK)
}

// ── Approval callbacks ───────────────────────────────────────────────

async fn handle_callback(state: &Arc<AppState>, callback: CallbackQuery) {
    let notifier = state.orchestrator.notifier();

    let token = match callback.data.as_deref().map(CallbackToken::decode) {
        Some(Ok(token)) => token,
        Some(Err(e)) => {
            warn!(error = %e, "dropping malformed callback payload");
            ack(state, &callback.id, "⚠️ Malformed approval data.").await;
            return;
        }
        None => {
            warn!("dropping callback without payload");
            ack(state, &callback.id, "⚠️ Empty approval data.").await;
            return;
        }
    };

    let action = token.a;
    let event: ApprovalEvent = token.into();
    let outcome = state.orchestrator.on_approval_event(&event).await;

    let (toast, edited) = match outcome {
        Ok(ApprovalOutcome::Applied(request)) => match request.status {
            RequestStatus::Approved => {
                let expires = request.decided_at.map_or_else(
                    || "unknown".to_string(),
                    |at| expiry_display(at + chrono::Duration::days(request.package.duration_days())),
                );
                (
                    "Approved ✅".to_string(),
                    Some(format!(
                        "✅ *Approved*\n\n\
                         👤 *Username:* `{}`\n\
                         📦 *Package:* {}\n\
                         📅 *Valid till:* {}\n\
                         📱 *bKash:* `{}`",
                        request.username,
                        request.package.label(),
                        expires,
                        request.contact_number,
                    )),
                )
            }
            _ => (
                "Rejected ❌".to_string(),
                Some(format!(
                    "❌ *Rejected*\n\n\
                     👤 *Username:* `{}`\n\
                     📱 *bKash:* `{}`\n\n\
                     The account stays disabled.",
                    request.username, request.contact_number,
                )),
            ),
        },
        Ok(ApprovalOutcome::AlreadyDecided(request)) => (
            format!("Already {}", request.status),
            None, // keep the earlier outcome message intact
        ),
        Err(
            e @ (CoreError::RequestNotFound { .. } | CoreError::AmbiguousCorrelation { .. }),
        ) => {
            warn!(error = %e, ?action, "dropping unresolvable approval event");
            (format!("⚠️ {e}"), None)
        }
        Err(e) => {
            warn!(error = %e, ?action, "approval event failed; admin may retry");
            (format!("❌ {e}"), None)
        }
    };

    ack(state, &callback.id, &toast).await;

    if let (Some(text), Some(message)) = (edited, callback.message) {
        if let Err(e) = notifier
            .report_outcome(message.chat.id, message.message_id, text)
            .await
        {
            warn!(error = %e, "failed to edit approval message");
        }
    }
}

async fn ack(state: &Arc<AppState>, callback_id: &str, text: &str) {
    if let Err(e) = state
        .orchestrator
        .notifier()
        .acknowledge(callback_id, Some(text.to_owned()))
        .await
    {
        warn!(error = %e, "failed to answer callback query");
    }
}

// ── Admin bot commands ───────────────────────────────────────────────

async fn handle_command(state: &Arc<AppState>, message: Message) {
    let notifier = state.orchestrator.notifier();

    // Only the admin chat gets command handling.
    if message.chat.id != notifier.admin_chat_id() {
        return;
    }
    let Some(text) = message.text.as_deref() else {
        return;
    };

    let mut parts = text.split_whitespace();
    let reply = match parts.next() {
        Some("/activeusers") => active_users_text(state).await,
        Some("/usage") => match parts.next() {
            Some(username) => usage_text(state, username).await,
            None => "Usage: /usage <username>".to_string(),
        },
        Some("/pending") => pending_text(state).await,
        Some("/help") => "⚙️ *Commands:*\n\
             /activeusers - List connected users\n\
             /usage <username> - Show traffic\n\
             /pending - List requests awaiting approval\n\
             /help - Show this message"
            .to_string(),
        _ => return,
    };

    info!(chat = message.chat.id, command = %text, "admin command");
    if let Err(e) = notifier.send_text(message.chat.id, reply).await {
        warn!(error = %e, "failed to send command reply");
    }
}

async fn active_users_text(state: &Arc<AppState>) -> String {
    match state.orchestrator.access().list_active_users().await {
        Ok(users) if users.is_empty() => "No active users.".to_string(),
        Ok(users) => {
            let mut text = String::from("📶 *Active Users:*\n");
            for user in users {
                let ip = user
                    .session
                    .address
                    .map_or_else(|| "?".into(), |ip| ip.to_string());
                let uptime = user
                    .session
                    .uptime
                    .map_or_else(|| "?".into(), crate::format::format_uptime);
                text.push_str(&format!(
                    "• `{}` - IP: {}, Uptime: {}\n",
                    user.username, ip, uptime
                ));
            }
            text
        }
        Err(e) => format!("❌ Error: {e}"),
    }
}

async fn usage_text(state: &Arc<AppState>, username: &str) -> String {
    match state.orchestrator.access().active_session(username).await {
        Ok(Some(session)) => format!(
            "📊 Usage for `{username}`:\n\
             ⬆️ Upload: {}\n\
             ⬇️ Download: {}",
            format_bytes(session.bytes_out),
            format_bytes(session.bytes_in),
        ),
        Ok(None) => format!("User `{username}` is not active."),
        Err(e) => format!("❌ Error: {e}"),
    }
}

async fn pending_text(state: &Arc<AppState>) -> String {
    match state.orchestrator.store().list_pending().await {
        Ok(requests) if requests.is_empty() => "No pending requests.".to_string(),
        Ok(requests) => {
            let mut text = String::from("⏳ *Pending Requests:*\n");
            for request in requests {
                text.push_str(&format!(
                    "• `{}` - {} - bKash {}\n",
                    request.username,
                    request.package.label(),
                    request.contact_number,
                ));
            }
            text
        }
        Err(e) => format!("❌ Error: {e}"),
    }
}
