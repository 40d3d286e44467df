//! Telegram bot client - long polling feeding the command worker.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::User;

use crate::command::{Author, InboundMessage, Parser};
use crate::config::Settings;
use crate::core::{self, CommandSender, Registry};
use crate::error::Error;

use super::session::{encode_chat_id, TelegramSession};

/// Convert a Telegram message into the transport-neutral form. `None` for
/// updates without text (stickers, joins, photos without captions).
pub fn inbound_from_message(msg: &Message) -> Option<InboundMessage> {
    let text = msg.text().or_else(|| msg.caption())?;
    Some(InboundMessage {
        author: msg.from.as_ref().map(author_from_user),
        channel_id: encode_chat_id(msg.chat.id).to_string(),
        content: text.to_string(),
    })
}

fn author_from_user(user: &User) -> Author {
    Author {
        id: user.id.0.to_string(),
        is_bot: user.is_bot,
        display_name: user.full_name(),
    }
}

async fn handle_message(parser: Parser, sender: &CommandSender, msg: &Message) {
    let Some(inbound) = inbound_from_message(msg) else {
        return;
    };

    match parser.parse(&inbound) {
        Ok(cmd) => {
            if let Err(e) = sender.submit(cmd).await {
                tracing::error!("Failed to queue command: {}", e);
            }
        }
        Err(e) => tracing::warn!(chat = msg.chat.id.0, "Dropped message: {}", e),
    }
}

/// Run the telegram bot daemon using simple polling.
pub async fn run_telegram_daemon(settings: Settings) -> Result<(), Error> {
    tracing::info!("Starting Telegram bot...");

    let token = settings.telegram_token()?;
    let registry = Registry::from_settings(&settings)?;
    let parser = registry.parser();

    let bot = Bot::new(token);
    let session = Arc::new(TelegramSession::new(bot.clone()));

    let (sender, receiver) = core::channel(settings.channel_buffer);
    let worker = tokio::spawn(core::run_worker(receiver, registry, session));

    tracing::info!(
        buffer = settings.channel_buffer,
        "Telegram bot listening for {}-prefixed commands",
        parser.prefix()
    );

    let repl_sender = sender.clone();
    teloxide::repl(bot, move |_bot: Bot, msg: Message| {
        let sender = repl_sender.clone();
        async move {
            handle_message(parser, &sender, &msg).await;
            respond(())
        }
    })
    .await;

    // The worker drains what is left, saves state and exits once the last
    // sender is gone.
    drop(sender);
    tracing::info!("Telegram bot stopped, waiting for command worker");
    let registry = worker
        .await
        .map_err(|e| Error::Telegram(format!("command worker panicked: {}", e)))?;
    tracing::info!("Queue holds {} topic(s) at shutdown", registry.state().queue.len());

    Ok(())
}
