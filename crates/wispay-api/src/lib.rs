// wispay-api: Async Rust clients for the wispay external collaborators
// (RouterOS REST API + Telegram Bot API)

pub mod error;
pub mod routeros;
pub mod telegram;
pub mod transport;

pub use error::Error;
pub use routeros::RouterOsClient;
pub use telegram::BotClient;
