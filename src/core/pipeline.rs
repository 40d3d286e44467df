//! Bounded hand-off between the transport and the single command worker.
//!
//! The producer side parses inbound messages and submits commands; the
//! worker drains them in arrival order and runs intercept then execute for
//! each one before taking the next. A full buffer makes `submit` wait, so
//! nothing is dropped.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::command::Command;
use crate::error::{Error, Result};
use crate::session::Session;

use super::registry::Registry;

/// Default number of commands that may wait for the worker.
pub const DEFAULT_CHANNEL_BUFFER: usize = 15;

/// Create a command channel holding at most `buffer` pending commands.
pub fn channel(buffer: usize) -> (CommandSender, CommandReceiver) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    (CommandSender { tx }, CommandReceiver { rx })
}

/// Producer handle. Clone freely; the worker stops once every clone is gone.
#[derive(Clone)]
pub struct CommandSender {
    tx: mpsc::Sender<Command>,
}

impl CommandSender {
    /// Queue a command, waiting while the buffer is full.
    pub async fn submit(&self, cmd: Command) -> Result<()> {
        self.tx
            .send(cmd)
            .await
            .map_err(|_| Error::Other("command worker stopped".to_string()))
    }

    /// Queue a command without waiting.
    pub fn try_submit(&self, cmd: Command) -> Result<()> {
        self.tx.try_send(cmd).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => Error::Other("command buffer full".to_string()),
            mpsc::error::TrySendError::Closed(_) => Error::Other("command worker stopped".to_string()),
        })
    }

    /// Free slots left in the buffer.
    pub fn capacity(&self) -> usize {
        self.tx.capacity()
    }
}

pub struct CommandReceiver {
    rx: mpsc::Receiver<Command>,
}

/// Drain `receiver` one command at a time until every sender is dropped.
///
/// Failures are logged and the loop moves on. State is persisted on exit and
/// the registry is handed back.
pub async fn run_worker(
    mut receiver: CommandReceiver,
    mut registry: Registry,
    session: Arc<dyn Session>,
) -> Registry {
    tracing::info!("Command worker started");
    let mut handled = 0usize;

    while let Some(mut cmd) = receiver.rx.recv().await {
        tracing::debug!(kind = %cmd.kind, args = cmd.args.len(), "Processing command");
        if let Err(e) = registry.process(session.as_ref(), &mut cmd).await {
            tracing::warn!(kind = %cmd.kind, "Command failed: {}", e);
        }
        handled += 1;
    }

    let state = registry.state();
    if let Err(e) = state.persist_queue() {
        tracing::error!("Failed to save queue on shutdown: {}", e);
    }
    if let Err(e) = state.persist_stash() {
        tracing::error!("Failed to save meme stash on shutdown: {}", e);
    }

    tracing::info!("Command worker stopped after {} command(s)", handled);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::InboundMessage;
    use crate::reply::Reply;
    use crate::session::RecordingSession;
    use std::time::Duration;

    #[tokio::test]
    async fn test_try_submit_reports_full_buffer() {
        let registry = Registry::builder().build();
        let parser = registry.parser();
        let (tx, _rx) = channel(1);

        let cmd = parser.parse(&InboundMessage::new("1", "a", "2", "&help")).unwrap();
        tx.try_submit(cmd.clone()).unwrap();
        assert_eq!(tx.capacity(), 0);

        let err = tx.try_submit(cmd).unwrap_err();
        assert_eq!(err.to_string(), "command buffer full");
    }

    #[tokio::test]
    async fn test_zero_buffer_is_raised_to_one() {
        let (tx, _rx) = channel(0);
        assert_eq!(tx.capacity(), 1);
    }

    #[tokio::test]
    async fn test_submit_after_worker_exit() {
        let (tx, rx) = channel(2);
        drop(rx);
        let cmd = crate::command::Command::error(None);
        assert!(tx.submit(cmd).await.is_err());
    }

    #[tokio::test]
    async fn test_worker_processes_in_order() {
        let registry = Registry::builder().with_discussion_queue().build();
        let parser = registry.parser();
        let session = Arc::new(RecordingSession::new().with_delay(Duration::from_millis(1)));
        let (tx, rx) = channel(DEFAULT_CHANNEL_BUFFER);

        let worker = tokio::spawn(run_worker(rx, registry, session.clone()));
        for content in ["&dq add first", "&dq add second", "&dq bump second", "&dq next"] {
            let cmd = parser.parse(&InboundMessage::new("1", "dana", "7", content)).unwrap();
            tx.submit(cmd).await.unwrap();
        }
        drop(tx);

        let registry = worker.await.unwrap();
        assert_eq!(registry.state().queue.next().unwrap().name, "second");

        let sent = session.sent().await;
        assert_eq!(sent.len(), 4);
        match &sent[3].reply {
            Reply::Rich(rich) => assert_eq!(rich.title(), Some("second")),
            other => panic!("unexpected reply: {:?}", other),
        }
    }
}
