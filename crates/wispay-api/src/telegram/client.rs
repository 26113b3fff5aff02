// Telegram Bot API HTTP client
//
// Wraps `reqwest::Client` with bot-token URL construction and `{ok, result}`
// envelope unwrapping. The token never appears in logs — method URLs are
// logged by method name only.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::telegram::types::{
    AnswerCallbackQuery, ApiResponse, EditMessageText, InlineKeyboardMarkup, Message, SendMessage,
};
use crate::transport::TransportConfig;

/// Default Bot API root.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Raw HTTP client for the Telegram Bot API.
pub struct BotClient {
    http: reqwest::Client,
    api_url: Url,
    token: SecretString,
}

impl BotClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `api_url` is the Bot API root (normally [`DEFAULT_API_URL`]; tests
    /// point it at a mock server).
    pub fn new(api_url: Url, token: SecretString, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, api_url, token })
    }

    /// Build the URL for a Bot API method: `{root}/bot{token}/{method}`
    fn method_url(&self, method: &str) -> Url {
        let full = format!(
            "{}/bot{}/{}",
            self.api_url.as_str().trim_end_matches('/'),
            self.token.expose_secret(),
            method
        );
        Url::parse(&full).expect("invalid Bot API URL")
    }

    /// POST a method call and unwrap the `{ok, result}` envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        debug!(method, "calling Bot API");

        let resp = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let body = resp.text().await.map_err(Error::Transport)?;
        let envelope: ApiResponse<T> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        if envelope.ok {
            envelope.result.ok_or_else(|| Error::Deserialization {
                message: "ok response without result".into(),
                body,
            })
        } else {
            Err(Error::Telegram {
                description: envelope
                    .description
                    .unwrap_or_else(|| "unknown Bot API error".into()),
                code: envelope.error_code,
            })
        }
    }

    /// Send a Markdown message, optionally with an inline keyboard.
    ///
    /// `POST /bot{token}/sendMessage`
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: impl Into<String>,
        reply_markup: Option<InlineKeyboardMarkup>,
    ) -> Result<Message, Error> {
        self.call(
            "sendMessage",
            &SendMessage {
                chat_id,
                text: text.into(),
                parse_mode: Some("Markdown".into()),
                reply_markup,
            },
        )
        .await
    }

    /// Replace the text of a previously sent message.
    ///
    /// `POST /bot{token}/editMessageText`
    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: impl Into<String>,
    ) -> Result<Message, Error> {
        self.call(
            "editMessageText",
            &EditMessageText {
                chat_id,
                message_id,
                text: text.into(),
                parse_mode: Some("Markdown".into()),
            },
        )
        .await
    }

    /// Acknowledge a callback query, optionally with a toast shown to the
    /// admin.
    ///
    /// `POST /bot{token}/answerCallbackQuery`
    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<String>,
    ) -> Result<bool, Error> {
        self.call(
            "answerCallbackQuery",
            &AnswerCallbackQuery {
                callback_query_id: callback_query_id.to_owned(),
                text,
            },
        )
        .await
    }
}
