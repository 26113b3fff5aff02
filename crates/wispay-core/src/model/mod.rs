// ── Domain model ──
//
// Canonical wispay domain types. Wire formats (RouterOS strings, Telegram
// payloads) stay in wispay-api; everything here is strongly typed.

pub mod account;
pub mod event;
pub mod package;
pub mod request;

pub use account::{AccountStatus, ActiveUser, HotspotAccount, SessionInfo};
pub use event::{ApprovalAction, ApprovalEvent, CallbackToken, Correlation};
pub use package::Package;
pub use request::{PendingRequest, RequestStatus};
