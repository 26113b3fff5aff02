//! wispay portal server — library crate.
//!
//! Re-exports the modules needed by the integration tests in `tests/`;
//! the `wispay` binary lives in `main.rs`.

pub mod auth;
pub mod error;
pub mod format;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
