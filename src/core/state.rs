//! Mutable bot state owned by the registry and handed to interceptors.

use std::path::{Path, PathBuf};

use crate::command::Command;
use crate::discussion::Queue;
use crate::error::{Error, Result};
use crate::meme::Stash;
use crate::reply::RichReply;

/// Everything interceptors may read or mutate.
///
/// Only the worker loop touches this, one command at a time.
#[derive(Debug, Default)]
pub struct BotState {
    pub queue: Queue,
    pub stash: Stash,
    /// Where snapshots are written. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
}

impl BotState {
    pub fn new(queue: Queue, stash: Stash) -> Self {
        Self {
            queue,
            stash,
            data_dir: None,
        }
    }

    pub fn with_data_dir(mut self, dir: &Path) -> Self {
        self.data_dir = Some(dir.to_path_buf());
        self
    }

    /// Restore queue and stash snapshots from `dir`, or start from defaults.
    pub fn load(dir: &Path) -> Result<Self> {
        let queue = Queue::load_or_default(dir)?;
        let stash = Stash::load_or_default(dir)?;
        Ok(Self::new(queue, stash).with_data_dir(dir))
    }

    /// Save the queue snapshot if a data directory is configured.
    pub fn persist_queue(&self) -> Result<()> {
        if let Some(dir) = &self.data_dir {
            self.queue.save(dir)?;
        }
        Ok(())
    }

    /// Save the meme stash if a data directory is configured.
    pub fn persist_stash(&self) -> Result<()> {
        if let Some(dir) = &self.data_dir {
            self.stash.save(dir)?;
        }
        Ok(())
    }
}

/// Report a write failure after an in-memory change. The command's reply is
/// replaced with a "Not Saved" error and the failure is handed back.
pub fn report_save_failure(cmd: &mut Command, what: &str, err: Error) -> Result<()> {
    tracing::error!(kind = %cmd.kind, "Failed to save {}: {}", what, err);
    cmd.reply_rich(RichReply::error(
        "Not Saved",
        format!("The change was applied but the {} could not be saved.\n{}", what, err),
    ));
    Err(err)
}
