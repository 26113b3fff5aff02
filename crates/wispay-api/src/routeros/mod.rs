// RouterOS v7 REST API surface.
//
// Endpoint groups are implemented as inherent methods on `RouterOsClient`
// via separate files, keeping `client.rs` focused on transport mechanics.

pub mod client;
pub mod hotspot;
pub mod models;
pub mod scheduler;

pub use client::RouterOsClient;
