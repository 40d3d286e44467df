//! Command model - what one inbound chat message turns into.
//!
//! This module contains:
//! - The tokenizer (quote-aware whitespace splitting)
//! - The classifier (prefix + vocabulary lookup)
//! - The parser that builds a [`Command`] from an [`InboundMessage`]

pub mod classify;
pub mod parse;
pub mod tokenize;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use crate::reply::{Reply, RichReply};

pub use classify::classify;
pub use parse::{ParseError, Parser};
pub use tokenize::{tokenize, TokenizeError};

/// Default character that precedes every command word.
pub const DEFAULT_COMMAND_PREFIX: char = '&';

/// Top-level category of a parsed command.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    /// Not a command at all.
    None,
    /// The message could not be parsed.
    Error,
    /// Prefixed, but the command word is unknown.
    Unrecognized,
    Help,
    Meme,
    Queue,
}

impl CommandKind {
    /// Look up a command word (the first token without its prefix).
    pub fn from_word(word: &str) -> Self {
        match word {
            "help" => CommandKind::Help,
            "meme" => CommandKind::Meme,
            "dq" => CommandKind::Queue,
            _ => CommandKind::Unrecognized,
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::None => write!(f, "none"),
            CommandKind::Error => write!(f, "error"),
            CommandKind::Unrecognized => write!(f, "unrecognized"),
            CommandKind::Help => write!(f, "help"),
            CommandKind::Meme => write!(f, "meme"),
            CommandKind::Queue => write!(f, "queue"),
        }
    }
}

/// Unsigned 64-bit platform identifier, parsed from a decimal string.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Snowflake(pub u64);

impl FromStr for Snowflake {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Snowflake)
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Author of an inbound message, as reported by the transport.
#[derive(Clone, Debug)]
pub struct Author {
    pub id: String,
    pub is_bot: bool,
    pub display_name: String,
}

/// Raw inbound message handed over by the transport.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    pub author: Option<Author>,
    pub channel_id: String,
    pub content: String,
}

impl InboundMessage {
    /// Create a message from a human author.
    pub fn new(author_id: &str, author_name: &str, channel_id: &str, content: &str) -> Self {
        Self {
            author: Some(Author {
                id: author_id.to_string(),
                is_bot: false,
                display_name: author_name.to_string(),
            }),
            channel_id: channel_id.to_string(),
            content: content.to_string(),
        }
    }

    /// Mark the author as a bot account.
    pub fn by_bot(mut self) -> Self {
        if let Some(author) = self.author.as_mut() {
            author.is_bot = true;
        }
        self
    }
}

/// Where a command came from. Immutable once parsed.
#[derive(Clone, Debug, PartialEq)]
pub struct Source {
    pub author_id: Snowflake,
    pub channel_id: Snowflake,
    pub author_name: String,
    pub content: String,
}

/// Parsed result of one inbound message.
#[derive(Clone, Debug)]
pub struct Command {
    pub kind: CommandKind,
    pub source: Option<Source>,
    pub args: Vec<String>,
    reply: Option<Reply>,
}

impl Command {
    pub fn new(kind: CommandKind, source: Option<Source>, args: Vec<String>) -> Self {
        Self {
            kind,
            source,
            args,
            reply: None,
        }
    }

    /// A command that failed to parse.
    pub fn error(source: Option<Source>) -> Self {
        Self::new(CommandKind::Error, source, Vec::new())
    }

    /// Channel the reply goes back to.
    pub fn channel_id(&self) -> Option<Snowflake> {
        self.source.as_ref().map(|s| s.channel_id)
    }

    /// Display name of the author, empty when there is no source.
    pub fn author_name(&self) -> &str {
        self.source
            .as_ref()
            .map(|s| s.author_name.as_str())
            .unwrap_or("")
    }

    pub fn reply(&self) -> Option<&Reply> {
        self.reply.as_ref()
    }

    /// Replace the reply. A command carries at most one reply.
    pub fn set_reply(&mut self, reply: Reply) {
        self.reply = Some(reply);
    }

    pub fn reply_text(&mut self, text: impl Into<String>) {
        self.set_reply(Reply::Text(text.into()));
    }

    pub fn reply_rich(&mut self, rich: RichReply) {
        self.set_reply(Reply::Rich(rich));
    }

    pub fn take_reply(&mut self) -> Option<Reply> {
        self.reply.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_word_lookup() {
        assert_eq!(CommandKind::from_word("help"), CommandKind::Help);
        assert_eq!(CommandKind::from_word("meme"), CommandKind::Meme);
        assert_eq!(CommandKind::from_word("dq"), CommandKind::Queue);
        assert_eq!(CommandKind::from_word("DQ"), CommandKind::Unrecognized);
        assert_eq!(CommandKind::from_word(""), CommandKind::Unrecognized);
    }

    #[test]
    fn test_snowflake_parse() {
        let id: Snowflake = "18446744073709551615".parse().unwrap();
        assert_eq!(id, Snowflake(u64::MAX));
        assert_eq!(id.to_string(), "18446744073709551615");

        assert!("-1".parse::<Snowflake>().is_err());
        assert!("12a".parse::<Snowflake>().is_err());
        assert!("".parse::<Snowflake>().is_err());
    }

    #[test]
    fn test_reply_slot_holds_one_reply() {
        let mut cmd = Command::new(CommandKind::Help, None, vec![]);
        assert!(cmd.reply().is_none());

        cmd.reply_text("first");
        cmd.reply_rich(RichReply::new().with_title("second"));

        match cmd.reply() {
            Some(Reply::Rich(rich)) => assert_eq!(rich.title(), Some("second")),
            other => panic!("unexpected reply: {:?}", other),
        }

        assert!(cmd.take_reply().is_some());
        assert!(cmd.reply().is_none());
    }
}
