//! Parse stage: transport message -> [`Command`].

use std::num::ParseIntError;
use thiserror::Error;

use super::{classify, tokenize, Command, CommandKind, InboundMessage, Snowflake, Source, TokenizeError};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("message has no author")]
    NilAuthor,

    #[error("message has empty content")]
    EmptyContent,

    #[error("invalid {field} id {value:?}: {source}")]
    InvalidId {
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
}

/// Turns inbound messages into commands for one command prefix.
#[derive(Clone, Copy, Debug)]
pub struct Parser {
    prefix: char,
}

impl Parser {
    pub fn new(prefix: char) -> Self {
        Self { prefix }
    }

    pub fn prefix(&self) -> char {
        self.prefix
    }

    /// Parse a message, folding hard failures into an `Error`-kind command.
    ///
    /// Only tokenizer failures are returned to the caller; the message is
    /// then dropped and no command enters the pipeline.
    pub fn parse(&self, msg: &InboundMessage) -> Result<Command, TokenizeError> {
        match self.try_parse(msg) {
            Ok(cmd) => Ok(cmd),
            Err(ParseError::Tokenize(e)) => {
                tracing::warn!("Failed to tokenize message content: {}", e);
                Err(e)
            }
            Err(e) => {
                tracing::warn!("Failed to parse message: {}", e);
                Ok(Command::error(source_of(msg).ok()))
            }
        }
    }

    /// Parse a message, returning every hard failure.
    pub fn try_parse(&self, msg: &InboundMessage) -> Result<Command, ParseError> {
        let source = source_of(msg)?;
        if source.content.is_empty() {
            return Err(ParseError::EmptyContent);
        }

        let tokens = tokenize(&source.content)?;

        // Never execute commands sent by bots.
        let from_bot = msg.author.as_ref().map_or(false, |a| a.is_bot);
        if from_bot {
            return Ok(Command::new(CommandKind::None, Some(source), Vec::new()));
        }

        let (kind, args) = classify(tokens, self.prefix);
        tracing::debug!(kind = %kind, args = args.len(), "Parsed message from {}", source.author_name);

        Ok(Command::new(kind, Some(source), args))
    }
}

fn source_of(msg: &InboundMessage) -> Result<Source, ParseError> {
    let author = msg.author.as_ref().ok_or(ParseError::NilAuthor)?;

    Ok(Source {
        author_id: parse_id("author", &author.id)?,
        channel_id: parse_id("channel", &msg.channel_id)?,
        author_name: author.display_name.clone(),
        content: msg.content.clone(),
    })
}

fn parse_id(field: &'static str, value: &str) -> Result<Snowflake, ParseError> {
    value.parse().map_err(|source| ParseError::InvalidId {
        field,
        value: value.to_string(),
        source,
    })
}
