// ── Approval events and callback tokens ──
//
// The callback token is the payload embedded in the approval message's
// inline buttons and echoed back by the channel. It is a structured,
// versioned JSON object (not a delimited string) so field values can never
// be confused with separators, and must stay within Telegram's 64-byte
// `callback_data` limit.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::package::Package;

/// Current callback token version.
pub const CALLBACK_VERSION: u8 = 1;

/// The administrator's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalAction {
    Approve,
    Reject,
}

/// Correlation fields resolving an event to exactly one pending request.
///
/// A v1 token always carries the request id; the remaining fields exist
/// for content-based resolution of tokens minted without one.
#[derive(Debug, Clone, Default)]
pub struct Correlation {
    pub request_id: Option<String>,
    pub contact_number: Option<String>,
    pub package: Option<Package>,
}

impl Correlation {
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            request_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Short description for diagnostics.
    pub fn describe(&self) -> String {
        match (&self.request_id, &self.contact_number) {
            (Some(id), _) => format!("id={id}"),
            (None, Some(contact)) => format!("contact={contact}"),
            (None, None) => "<empty correlation>".into(),
        }
    }
}

/// An asynchronous decision delivered by the approval channel.
#[derive(Debug, Clone)]
pub struct ApprovalEvent {
    pub action: ApprovalAction,
    pub correlation: Correlation,
}

/// Wire form of the inline-button payload: `{"v":1,"a":"approve","id":"user1234"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackToken {
    pub v: u8,
    pub a: ApprovalAction,
    pub id: String,
}

impl CallbackToken {
    pub fn approve(id: impl Into<String>) -> Self {
        Self {
            v: CALLBACK_VERSION,
            a: ApprovalAction::Approve,
            id: id.into(),
        }
    }

    pub fn reject(id: impl Into<String>) -> Self {
        Self {
            v: CALLBACK_VERSION,
            a: ApprovalAction::Reject,
            id: id.into(),
        }
    }

    /// Serialize for `callback_data`.
    pub fn encode(&self) -> String {
        // The token is three plain fields; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse a `callback_data` payload, rejecting unknown versions.
    pub fn decode(data: &str) -> Result<Self, CoreError> {
        let token: Self = serde_json::from_str(data).map_err(|e| CoreError::InvalidToken {
            reason: e.to_string(),
        })?;
        if token.v != CALLBACK_VERSION {
            return Err(CoreError::InvalidToken {
                reason: format!("unsupported token version {}", token.v),
            });
        }
        Ok(token)
    }
}

impl From<CallbackToken> for ApprovalEvent {
    fn from(token: CallbackToken) -> Self {
        Self {
            action: token.a,
            correlation: Correlation::from_id(token.id),
        }
    }
}
