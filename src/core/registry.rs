//! Command registry: enrichment and dispatch tables plus the
//! parse -> intercept -> execute lifecycle.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::command::{Command, CommandKind, InboundMessage, Parser, TokenizeError, DEFAULT_COMMAND_PREFIX};
use crate::config::Settings;
use crate::discussion::QueueInterceptor;
use crate::error::Result;
use crate::meme::MemeInterceptor;
use crate::reply::Reply;
use crate::session::Session;

use super::help::HelpInterceptor;
use super::state::BotState;

/// Enrichment stage. Called for every command; a no-op for kinds it does
/// not handle.
pub trait Interceptor: Send + Sync {
    fn intercept(&self, state: &mut BotState, cmd: &mut Command) -> Result<()>;
}

impl<F> Interceptor for F
where
    F: Fn(&mut BotState, &mut Command) -> Result<()> + Send + Sync,
{
    fn intercept(&self, state: &mut BotState, cmd: &mut Command) -> Result<()> {
        self(state, cmd)
    }
}

/// Terminal stage. Delivers the reply for one command kind.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, session: &dyn Session, cmd: &Command) -> Result<()>;
}

/// Sends whatever reply the interceptors left on the command, back to the
/// channel the command came from.
pub struct ReplyExecutor;

#[async_trait]
impl Executor for ReplyExecutor {
    async fn execute(&self, session: &dyn Session, cmd: &Command) -> Result<()> {
        let (Some(reply), Some(channel)) = (cmd.reply(), cmd.channel_id()) else {
            tracing::debug!(kind = %cmd.kind, "Nothing to send");
            return Ok(());
        };

        match reply {
            Reply::Text(text) => session.send_text(channel, text).await?,
            Reply::Rich(rich) => session.send_rich(channel, rich).await?,
        }

        tracing::debug!(kind = %cmd.kind, channel = %channel, "Reply sent");
        Ok(())
    }
}

/// Owns the per-instance dispatch tables and the bot state.
pub struct Registry {
    parser: Parser,
    interceptors: BTreeMap<CommandKind, Box<dyn Interceptor>>,
    executors: BTreeMap<CommandKind, Box<dyn Executor>>,
    state: BotState,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Build the registry described by `settings`, restoring snapshots from
    /// the data directory.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let state = BotState::load(&settings.data_dir()?)?;

        let mut builder = Registry::builder()
            .prefix(settings.command_prefix)
            .state(state);
        if settings.features.discussion_queue {
            builder = builder.with_discussion_queue();
        }
        if settings.features.meme_stash {
            builder = builder.with_meme_stash();
        }
        Ok(builder.build())
    }

    pub fn parser(&self) -> Parser {
        self.parser
    }

    pub fn prefix(&self) -> char {
        self.parser.prefix()
    }

    pub fn state(&self) -> &BotState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut BotState {
        &mut self.state
    }

    pub fn interceptor_count(&self) -> usize {
        self.interceptors.len()
    }

    pub fn has_executor(&self, kind: CommandKind) -> bool {
        self.executors.contains_key(&kind)
    }

    /// Stage 1: transport message -> command. See [`Parser::parse`].
    pub fn parse(&self, msg: &InboundMessage) -> std::result::Result<Command, TokenizeError> {
        self.parser.parse(msg)
    }

    /// Stage 2: run every interceptor. The first failure stops the rest.
    pub fn intercept(&mut self, cmd: &mut Command) -> Result<()> {
        for (kind, interceptor) in &self.interceptors {
            if let Err(e) = interceptor.intercept(&mut self.state, cmd) {
                tracing::warn!(interceptor = %kind, command = %cmd.kind, "Intercept failed: {}", e);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Stage 3: hand the command to the executor for its kind, if any.
    pub async fn execute(&self, session: &dyn Session, cmd: &Command) -> Result<()> {
        let Some(executor) = self.executors.get(&cmd.kind) else {
            return Ok(());
        };

        executor.execute(session, cmd).await.map_err(|e| {
            tracing::error!(kind = %cmd.kind, "Execute failed: {}", e);
            e
        })
    }

    /// Intercept then execute. Execution still runs after an intercept
    /// failure so that any reply already rendered is delivered.
    pub async fn process(&mut self, session: &dyn Session, cmd: &mut Command) -> Result<()> {
        let intercepted = self.intercept(cmd);
        let executed = self.execute(session, cmd).await;
        intercepted.and(executed)
    }
}

/// Builds a [`Registry`] with its own copy of the dispatch tables.
pub struct RegistryBuilder {
    prefix: char,
    interceptors: BTreeMap<CommandKind, Box<dyn Interceptor>>,
    executors: BTreeMap<CommandKind, Box<dyn Executor>>,
    state: BotState,
    queue: bool,
    memes: bool,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            prefix: DEFAULT_COMMAND_PREFIX,
            interceptors: BTreeMap::new(),
            executors: BTreeMap::new(),
            state: BotState::default(),
            queue: false,
            memes: false,
        }
    }

    pub fn prefix(mut self, prefix: char) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn state(mut self, state: BotState) -> Self {
        self.state = state;
        self
    }

    /// Register the `dq` command.
    pub fn with_discussion_queue(mut self) -> Self {
        self.queue = true;
        self
    }

    /// Register the `meme` command.
    pub fn with_meme_stash(mut self) -> Self {
        self.memes = true;
        self
    }

    /// Set the interceptor for `kind`, replacing any built-in one.
    pub fn interceptor(mut self, kind: CommandKind, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.insert(kind, Box::new(interceptor));
        self
    }

    /// Set the executor for `kind`, replacing any built-in one.
    pub fn executor(mut self, kind: CommandKind, executor: impl Executor + 'static) -> Self {
        self.executors.insert(kind, Box::new(executor));
        self
    }

    pub fn build(self) -> Registry {
        let mut interceptors: BTreeMap<CommandKind, Box<dyn Interceptor>> = BTreeMap::new();
        let mut executors: BTreeMap<CommandKind, Box<dyn Executor>> = BTreeMap::new();

        interceptors.insert(
            CommandKind::Help,
            Box::new(HelpInterceptor::new(self.prefix, self.queue, self.memes)),
        );
        for kind in [CommandKind::Help, CommandKind::Unrecognized, CommandKind::Error] {
            executors.insert(kind, Box::new(ReplyExecutor));
        }

        if self.queue {
            interceptors.insert(CommandKind::Queue, Box::new(QueueInterceptor::new(self.prefix)));
            executors.insert(CommandKind::Queue, Box::new(ReplyExecutor));
        }
        if self.memes {
            interceptors.insert(CommandKind::Meme, Box::new(MemeInterceptor::new(self.prefix)));
            executors.insert(CommandKind::Meme, Box::new(ReplyExecutor));
        }

        // Custom entries win over built-ins.
        interceptors.extend(self.interceptors);
        executors.extend(self.executors);

        tracing::info!(
            interceptors = interceptors.len(),
            executors = executors.len(),
            "Registry built with prefix {:?}",
            self.prefix
        );

        Registry {
            parser: Parser::new(self.prefix),
            interceptors,
            executors,
            state: self.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::reply::RichReply;
    use crate::session::{RecordingSession, SendError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn msg(content: &str) -> InboundMessage {
        InboundMessage::new("1", "alice", "99", content)
    }

    #[test]
    fn test_builtin_tables() {
        let registry = Registry::builder().build();
        assert_eq!(registry.interceptor_count(), 1);
        assert!(registry.has_executor(CommandKind::Help));
        assert!(!registry.has_executor(CommandKind::Queue));
        assert!(!registry.has_executor(CommandKind::None));

        let registry = Registry::builder().with_discussion_queue().with_meme_stash().build();
        assert_eq!(registry.interceptor_count(), 3);
        assert!(registry.has_executor(CommandKind::Queue));
        assert!(registry.has_executor(CommandKind::Meme));
    }

    #[test]
    fn test_instances_do_not_share_tables() {
        let custom = Registry::builder()
            .interceptor(CommandKind::None, |_: &mut BotState, _: &mut Command| -> Result<()> { Ok(()) })
            .build();
        let plain = Registry::builder().build();

        assert_eq!(custom.interceptor_count(), 2);
        assert_eq!(plain.interceptor_count(), 1);
    }

    #[tokio::test]
    async fn test_unhandled_kind_is_silent() {
        let mut registry = Registry::builder().build();
        let session = RecordingSession::new();

        let mut cmd = registry.parse(&msg("hello there")).unwrap();
        assert_eq!(cmd.kind, CommandKind::None);
        registry.process(&session, &mut cmd).await.unwrap();
        assert!(session.sent().await.is_empty());

        // Queue is not registered, so `dq` goes nowhere.
        let mut cmd = registry.parse(&msg("&dq list")).unwrap();
        registry.process(&session, &mut cmd).await.unwrap();
        assert!(session.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_every_interceptor_sees_every_command() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut registry = Registry::builder()
            .interceptor(CommandKind::Meme, move |_: &mut BotState, _: &mut Command| -> Result<()> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .build();

        for content in ["plain", "&help", "&bogus", "&meme"] {
            let mut cmd = registry.parse(&msg(content)).unwrap();
            registry.intercept(&mut cmd).unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_first_intercept_failure_stops_the_rest() {
        let later = Arc::new(AtomicUsize::new(0));
        let counter = later.clone();
        // BTreeMap order: Help < Meme < Queue.
        let mut registry = Registry::builder()
            .interceptor(CommandKind::Meme, |_: &mut BotState, _: &mut Command| -> Result<()> {
                Err(Error::Other("boom".to_string()))
            })
            .interceptor(CommandKind::Queue, move |_: &mut BotState, _: &mut Command| -> Result<()> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .build();

        let mut cmd = registry.parse(&msg("&help")).unwrap();
        assert!(registry.intercept(&mut cmd).is_err());
        assert_eq!(later.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_custom_executor() {
        struct Shout;

        #[async_trait]
        impl Executor for Shout {
            async fn execute(&self, session: &dyn Session, cmd: &Command) -> Result<()> {
                let channel = cmd.channel_id().ok_or_else(|| Error::Other("no channel".into()))?;
                session.send_text(channel, "LOUD").await?;
                Ok(())
            }
        }

        let mut registry = Registry::builder().executor(CommandKind::Meme, Shout).build();
        let session = RecordingSession::new();
        let mut cmd = registry.parse(&msg("&meme")).unwrap();
        registry.process(&session, &mut cmd).await.unwrap();

        let sent = session.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].reply, Reply::Text("LOUD".to_string()));
    }

    #[tokio::test]
    async fn test_send_failure_is_reported() {
        let mut registry = Registry::builder().build();
        let session = RecordingSession::failing(SendError::Unavailable("down".to_string()));

        let mut cmd = registry.parse(&msg("&help")).unwrap();
        let err = registry.process(&session, &mut cmd).await.unwrap_err();
        assert!(matches!(err, Error::Send(SendError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_reply_executor_needs_a_channel() {
        let session = RecordingSession::new();
        let mut cmd = Command::error(None);
        cmd.reply_rich(RichReply::new().with_title("orphan"));

        ReplyExecutor.execute(&session, &cmd).await.unwrap();
        assert!(session.sent().await.is_empty());
    }
}
