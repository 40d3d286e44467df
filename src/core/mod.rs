//! Core module - registry, bot state and the command worker.
//!
//! This module contains the heart of Parley's message processing:
//! - The registry that parses, enriches and dispatches commands
//! - The shared bot state handed to interceptors
//! - Built-in help replies
//! - The bounded worker loop

pub mod help;
pub mod pipeline;
pub mod registry;
pub mod state;

pub use help::HelpInterceptor;
pub use pipeline::{channel, run_worker, CommandReceiver, CommandSender, DEFAULT_CHANNEL_BUFFER};
pub use registry::{Executor, Interceptor, Registry, RegistryBuilder, ReplyExecutor};
pub use state::BotState;
