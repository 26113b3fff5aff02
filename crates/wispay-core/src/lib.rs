// wispay-core: Domain layer between wispay-api and the portal server.

pub mod config;
pub mod convert;
pub mod credentials;
pub mod error;
pub mod model;
pub mod net;
pub mod notify;
pub mod orchestrator;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{NotifierConfig, RouterConfig, TlsVerification};
pub use credentials::{CredentialGenerator, Credentials};
pub use error::CoreError;
pub use net::AccessController;
pub use notify::ApprovalNotifier;
pub use orchestrator::{ApprovalOutcome, Orchestrator, SubmitInput};
pub use store::PendingStore;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Requests / workflow
    ApprovalAction, ApprovalEvent, CallbackToken, Correlation, Package, PendingRequest,
    RequestStatus,
    // Router-owned views
    AccountStatus, ActiveUser, HotspotAccount, SessionInfo,
};
