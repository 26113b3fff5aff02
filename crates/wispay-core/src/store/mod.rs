// ── Durable request storage ──

pub mod pending;

pub use pending::PendingStore;
