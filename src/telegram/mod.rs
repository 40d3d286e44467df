//! Telegram bot integration.

pub mod client;
pub mod session;

pub use client::{inbound_from_message, run_telegram_daemon};
pub use session::{decode_chat_id, encode_chat_id, TelegramSession};
