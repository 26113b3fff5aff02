// Telegram Bot API surface.

pub mod client;
pub mod types;

pub use client::BotClient;
