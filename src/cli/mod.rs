//! CLI commands for Parley using clap.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

use crate::command::InboundMessage;
use crate::config::{load_settings_or_default, Settings};
use crate::core::{self, BotState, Registry};
use crate::discussion::Queue;
use crate::logging;
use crate::session::RecordingSession;

/// Parley - a chat bot with a discussion-topic queue.
#[derive(Parser)]
#[command(name = "parley")]
#[command(version = "0.1.0")]
#[command(about = "Parley - chat commands and a discussion-topic queue", long_about = None)]
pub struct Commands {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the Telegram bot
    Run(RunArgs),

    /// Inspect the persisted discussion queue
    Queue {
        #[command(subcommand)]
        action: QueueAction,
    },

    /// Run messages through the command pipeline and print the replies
    Simulate {
        /// Message contents, processed in order
        #[arg(required = true)]
        messages: Vec<String>,

        /// Send the messages as a bot account
        #[arg(long)]
        bot: bool,

        /// Display name of the author
        #[arg(long, default_value = "cli")]
        author: String,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Show the effective settings
    Config {
        #[command(flatten)]
        overrides: Overrides,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Commands that may wait for the worker before the bot stops reading
    #[arg(long = "buf")]
    pub buffer: Option<usize>,

    #[command(flatten)]
    pub overrides: Overrides,
}

/// Flags that override the settings file.
#[derive(Args, Default)]
pub struct Overrides {
    /// Data directory for snapshots and logs
    #[arg(long = "dir")]
    pub data_dir: Option<PathBuf>,

    /// Command prefix character
    #[arg(long)]
    pub prefix: Option<char>,

    /// Disable the discussion queue
    #[arg(long)]
    pub no_queue: bool,

    /// Disable the meme stash
    #[arg(long)]
    pub no_memes: bool,
}

impl Overrides {
    pub fn apply(&self, mut settings: Settings) -> Result<Settings> {
        if let Some(dir) = &self.data_dir {
            settings.data_dir = Some(dir.clone());
        }
        if let Some(prefix) = self.prefix {
            settings.command_prefix = prefix;
        }
        if self.no_queue {
            settings.features.discussion_queue = false;
        }
        if self.no_memes {
            settings.features.meme_stash = false;
        }
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Subcommand)]
pub enum QueueAction {
    /// List topics in order
    List {
        /// Data directory holding queue.json
        #[arg(long = "dir")]
        data_dir: Option<PathBuf>,
    },
}

impl Commands {
    /// Set up logging for the chosen command. The daemon logs to a file in
    /// its data directory; everything else logs to stderr only.
    pub fn init_logging(&self) -> Result<Option<WorkerGuard>> {
        match &self.command {
            Command::Run(args) => {
                let settings = args.overrides.apply(load_settings_or_default())?;
                let (guard, _) = logging::init(&settings.data_dir()?)?;
                Ok(Some(guard))
            }
            _ => {
                logging::init_console(false);
                Ok(None)
            }
        }
    }

    /// Run the command.
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Command::Run(args) => cmd_run(args).await,
            Command::Queue { action } => cmd_queue(action),
            Command::Simulate {
                messages,
                bot,
                author,
                overrides,
            } => cmd_simulate(messages, *bot, author, overrides).await,
            Command::Config { overrides } => cmd_config(overrides),
        }
    }
}

// Command implementations

async fn cmd_run(args: &RunArgs) -> Result<()> {
    use crate::telegram::run_telegram_daemon;

    let mut settings = args.overrides.apply(load_settings_or_default())?;
    if let Some(buffer) = args.buffer {
        settings.channel_buffer = buffer;
        settings.validate()?;
    }

    println!("Starting Parley...");
    run_telegram_daemon(settings).await?;
    Ok(())
}

fn cmd_queue(action: &QueueAction) -> Result<()> {
    match action {
        QueueAction::List { data_dir } => {
            let dir = match data_dir {
                Some(dir) => dir.clone(),
                None => load_settings_or_default().data_dir()?,
            };
            let queue = Queue::load_or_default(&dir)
                .with_context(|| format!("Failed to read queue from {}", dir.display()))?;

            println!("Topics ({}):", queue.len());
            for (i, topic) in queue.list().iter().enumerate() {
                let description = topic.description.as_deref().unwrap_or("");
                println!("  {}. {} ({}) {}", i, topic.name, topic.created_by, description);
                for (j, source) in topic.sources.iter().enumerate() {
                    println!("       {}: {}", j, source);
                }
            }
            println!("Last modified: {}", queue.modified_at().to_rfc3339());
        }
    }
    Ok(())
}

async fn cmd_simulate(messages: &[String], bot: bool, author: &str, overrides: &Overrides) -> Result<()> {
    let settings = overrides.apply(load_settings_or_default())?;

    // In memory unless --dir was given, so a dry run never touches real data.
    let state = match &overrides.data_dir {
        Some(dir) => BotState::load(dir)?,
        None => BotState::default(),
    };

    let mut builder = Registry::builder()
        .prefix(settings.command_prefix)
        .state(state);
    if settings.features.discussion_queue {
        builder = builder.with_discussion_queue();
    }
    if settings.features.meme_stash {
        builder = builder.with_meme_stash();
    }
    let registry = builder.build();
    let parser = registry.parser();

    let session = Arc::new(RecordingSession::new());
    let (sender, receiver) = core::channel(settings.channel_buffer);
    let worker = tokio::spawn(core::run_worker(receiver, registry, session.clone()));

    for content in messages {
        let mut inbound = InboundMessage::new("1", author, "1", content);
        if bot {
            inbound = inbound.by_bot();
        }
        match parser.parse(&inbound) {
            Ok(cmd) => sender.submit(cmd).await?,
            Err(e) => println!("> {}\n  (dropped: {})", content, e),
        }
    }
    drop(sender);
    worker.await.context("Command worker panicked")?;

    let sent = session.sent().await;
    if sent.is_empty() {
        println!("(no replies)");
    }
    for reply in sent {
        println!("[{}]\n{}\n", reply.channel, reply.reply.to_text());
    }
    Ok(())
}

fn cmd_config(overrides: &Overrides) -> Result<()> {
    let mut settings = overrides.apply(load_settings_or_default())?;
    if settings.telegram.bot_token.is_some() {
        settings.telegram.bot_token = Some("********".to_string());
    }
    println!("{}", serde_json::to_string_pretty(&settings)?);
    println!("Data directory: {}", settings.data_dir()?.display());
    Ok(())
}
