// ── Approval channel adapter ──
//
// Renders payment requests into human-readable admin messages with inline
// approve/reject controls, and reports decisions back by editing the
// original message. The inbound half (webhook updates) lives in the
// server; this side only ever talks *to* the channel.

use tracing::debug;

use wispay_api::BotClient;
use wispay_api::telegram::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::config::NotifierConfig;
use crate::error::CoreError;
use crate::model::{CallbackToken, PendingRequest};

pub struct ApprovalNotifier {
    bot: BotClient,
    admin_chat_id: i64,
}

impl ApprovalNotifier {
    pub fn new(config: &NotifierConfig) -> Result<Self, CoreError> {
        let bot = BotClient::new(
            config.api_url.clone(),
            config.bot_token.clone(),
            &config.transport(),
        )?;
        Ok(Self {
            bot,
            admin_chat_id: config.admin_chat_id,
        })
    }

    /// The chat that receives approval requests and admin commands.
    pub fn admin_chat_id(&self) -> i64 {
        self.admin_chat_id
    }

    /// Send the approval request for a new submission. Returns the message
    /// id (useful for later edits).
    pub async fn notify_submission(&self, request: &PendingRequest) -> Result<i64, CoreError> {
        let markup = InlineKeyboardMarkup {
            inline_keyboard: vec![vec![
                InlineKeyboardButton {
                    text: "✅ Approve".into(),
                    callback_data: CallbackToken::approve(&request.id).encode(),
                },
                InlineKeyboardButton {
                    text: "❌ Reject".into(),
                    callback_data: CallbackToken::reject(&request.id).encode(),
                },
            ]],
        };

        let message = self
            .bot
            .send_message(self.admin_chat_id, summary_text(request), Some(markup))
            .await
            .map_err(|e| CoreError::NotificationFailed {
                message: e.to_string(),
            })?;

        debug!(id = %request.id, message_id = message.message_id, "approval request sent");
        Ok(message.message_id)
    }

    /// Replace an approval message's text with the decision outcome.
    pub async fn report_outcome(
        &self,
        chat_id: i64,
        message_id: i64,
        text: impl Into<String>,
    ) -> Result<(), CoreError> {
        self.bot.edit_message_text(chat_id, message_id, text).await?;
        Ok(())
    }

    /// Acknowledge a callback query with a short toast.
    pub async fn acknowledge(
        &self,
        callback_query_id: &str,
        text: Option<String>,
    ) -> Result<(), CoreError> {
        self.bot.answer_callback_query(callback_query_id, text).await?;
        Ok(())
    }

    /// Plain message to an arbitrary chat (bot command replies).
    pub async fn send_text(&self, chat_id: i64, text: impl Into<String>) -> Result<(), CoreError> {
        self.bot.send_message(chat_id, text, None).await?;
        Ok(())
    }

    /// Post the startup notice to the admin chat.
    pub async fn announce_startup(&self) -> Result<(), CoreError> {
        self.bot
            .send_message(
                self.admin_chat_id,
                "✅ wispay portal is running and connected to the router.",
                None,
            )
            .await?;
        Ok(())
    }
}

/// Human-readable summary for the approval message.
pub fn summary_text(request: &PendingRequest) -> String {
    format!(
        "🆕 *New Payment Request*\n\n\
         📱 *bKash:* `{contact}`\n\
         📦 *Package:* *{package}* (৳{price})\n\
         👤 *Username:* `{username}`\n\
         🌐 *IP:* `{source}`\n\
         🧾 *Proof:* {proof}",
        contact = request.contact_number,
        package = request.package.label(),
        price = request.package.price_bdt(),
        username = request.username,
        source = request.source_display(),
        proof = request
            .proof_reference
            .as_deref()
            .unwrap_or("not attached"),
    )
}
