//! Built-in replies for `help`, unknown commands and parse failures.

use crate::command::{Command, CommandKind};
use crate::discussion::QueueCommand;
use crate::error::Result;
use crate::meme::MemeCommand;
use crate::reply::RichReply;

use super::registry::Interceptor;
use super::state::BotState;

pub const UNHANDLED_ERROR_TEXT: &str = "The bot ran into an unhandled error.";

pub struct HelpInterceptor {
    prefix: char,
    queue: bool,
    memes: bool,
}

impl HelpInterceptor {
    /// `queue` and `memes` say which optional commands are registered.
    pub fn new(prefix: char, queue: bool, memes: bool) -> Self {
        Self { prefix, queue, memes }
    }

    pub fn not_understood(&self) -> String {
        format!(
            "The command you entered was not understood. Send `{}help` for a list of commands.",
            self.prefix
        )
    }

    fn overview(&self) -> RichReply {
        let p = self.prefix;
        let mut reply = RichReply::new()
            .with_title("Commands")
            .with_field(format!("{}help [command?]", p), "Show this message, or details for one command.", false);
        if self.queue {
            reply = reply.with_field(
                format!("{}dq", p),
                format!("Discussion topic queue. See `{}help dq`.", p),
                false,
            );
        }
        if self.memes {
            reply = reply.with_field(
                format!("{}meme", p),
                format!("Post a random meme. See `{}help meme`.", p),
                false,
            );
        }
        reply
    }

    fn queue_help(&self) -> RichReply {
        let usage: Vec<String> = QueueCommand::ALL
            .iter()
            .map(|sub| format!("`{}`", sub.usage(self.prefix)))
            .collect();
        RichReply::new()
            .with_title("Discussion Queue")
            .with_description(usage.join("\n"))
    }

    fn meme_help(&self) -> RichReply {
        let usage: Vec<String> = [MemeCommand::Random, MemeCommand::Add, MemeCommand::Remove, MemeCommand::List]
            .iter()
            .map(|sub| format!("`{}`", sub.usage(self.prefix)))
            .collect();
        RichReply::new()
            .with_title("Meme Stash")
            .with_description(usage.join("\n"))
    }
}

impl Interceptor for HelpInterceptor {
    fn intercept(&self, _state: &mut BotState, cmd: &mut Command) -> Result<()> {
        match cmd.kind {
            CommandKind::Unrecognized => cmd.reply_text(self.not_understood()),
            CommandKind::Error if cmd.source.is_some() => cmd.reply_text(UNHANDLED_ERROR_TEXT),
            CommandKind::Help => {
                let reply = match cmd.args.first().map(String::as_str) {
                    Some("dq") if self.queue => self.queue_help(),
                    Some("meme") if self.memes => self.meme_help(),
                    _ => self.overview(),
                };
                cmd.reply_rich(reply);
            }
            _ => {}
        }
        Ok(())
    }
}
