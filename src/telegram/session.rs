//! Outbound sends through the Telegram Bot API.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::RequestError;

use crate::command::Snowflake;
use crate::reply::RichReply;
use crate::session::{SendError, Session};

/// Telegram caps a message at 4096 characters.
const MESSAGE_LIMIT: usize = 4096;

/// Telegram chat ids are signed; commands carry them as the
/// two's-complement bit pattern.
pub fn encode_chat_id(chat: ChatId) -> Snowflake {
    Snowflake(chat.0 as u64)
}

pub fn decode_chat_id(channel: Snowflake) -> ChatId {
    ChatId(channel.0 as i64)
}

/// [`Session`] backed by a teloxide [`Bot`]. Rich replies are flattened to
/// plain text.
#[derive(Clone)]
pub struct TelegramSession {
    bot: Bot,
}

impl TelegramSession {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn send_error(e: RequestError) -> SendError {
    match e {
        RequestError::Network(e) => SendError::Unavailable(e.to_string()),
        RequestError::Api(e) => SendError::Rejected(e.to_string()),
        other => SendError::Other(other.to_string()),
    }
}

#[async_trait]
impl Session for TelegramSession {
    async fn send_text(&self, channel: Snowflake, text: &str) -> Result<(), SendError> {
        let text: String = text.chars().take(MESSAGE_LIMIT).collect();
        if text.trim().is_empty() {
            return Err(SendError::Rejected("empty message".to_string()));
        }

        self.bot
            .send_message(decode_chat_id(channel), text)
            .await
            .map_err(send_error)?;
        Ok(())
    }

    async fn send_rich(&self, channel: Snowflake, reply: &RichReply) -> Result<(), SendError> {
        self.send_text(channel, &reply.render_text()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_id_round_trip() {
        for raw in [0i64, 42, -1, -1001234567890, i64::MIN, i64::MAX] {
            let chat = ChatId(raw);
            assert_eq!(decode_chat_id(encode_chat_id(chat)), chat);
        }
        assert_eq!(encode_chat_id(ChatId(-1)), Snowflake(u64::MAX));
    }
}
