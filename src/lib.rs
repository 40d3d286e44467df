//! Parley library root.

pub mod cli;
pub mod command;
pub mod config;
pub mod core;
pub mod discussion;
pub mod error;
pub mod logging;
pub mod meme;
pub mod reply;
pub mod session;
pub mod telegram;

pub use cli::Commands;
pub use command::{Command, CommandKind, InboundMessage, Parser, Snowflake};
pub use config::{load_settings, Settings};
pub use core::{BotState, Executor, Interceptor, Registry};
pub use discussion::{Queue, QueueError, Topic};
pub use error::{Error, Result};
pub use reply::{Reply, RichReply};
pub use session::{RecordingSession, SendError, Session};
pub use telegram::run_telegram_daemon;
