//! Outbound send capability.
//!
//! The command pipeline never talks to a chat platform directly. It only
//! needs a [`Session`] that can deliver plain text or a [`RichReply`] to a
//! channel. The Telegram adapter lives in [`crate::telegram`];
//! [`RecordingSession`] keeps everything in memory.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::command::Snowflake;
use crate::reply::{Reply, RichReply};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SendError {
    #[error("Transport unavailable: {0}")]
    Unavailable(String),

    #[error("Message rejected: {0}")]
    Rejected(String),

    #[error("{0}")]
    Other(String),
}

/// Deliver replies to a channel.
#[async_trait]
pub trait Session: Send + Sync {
    /// Send plain text.
    async fn send_text(&self, channel: Snowflake, text: &str) -> Result<(), SendError>;

    /// Send a rich reply.
    async fn send_rich(&self, channel: Snowflake, reply: &RichReply) -> Result<(), SendError>;
}

/// A reply that was handed to a [`RecordingSession`].
#[derive(Clone, Debug, PartialEq)]
pub struct SentReply {
    pub channel: Snowflake,
    pub reply: Reply,
}

/// In-memory session that records every send in order.
#[derive(Default)]
pub struct RecordingSession {
    sent: Mutex<Vec<SentReply>>,
    fail_with: Option<SendError>,
    delay: Option<Duration>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send fails with `error` (nothing is recorded).
    pub fn failing(error: SendError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::default()
        }
    }

    /// Sleep before each send, to stand in for a slow transport.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Snapshot of everything sent so far.
    pub async fn sent(&self) -> Vec<SentReply> {
        self.sent.lock().await.clone()
    }

    async fn record(&self, channel: Snowflake, reply: Reply) -> Result<(), SendError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        self.sent.lock().await.push(SentReply { channel, reply });
        Ok(())
    }
}

#[async_trait]
impl Session for RecordingSession {
    async fn send_text(&self, channel: Snowflake, text: &str) -> Result<(), SendError> {
        self.record(channel, Reply::Text(text.to_string())).await
    }

    async fn send_rich(&self, channel: Snowflake, reply: &RichReply) -> Result<(), SendError> {
        self.record(channel, Reply::Rich(reply.clone())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_session_keeps_order() {
        let session = RecordingSession::new();
        session.send_text(Snowflake(1), "hello").await.unwrap();
        session
            .send_rich(Snowflake(2), &RichReply::new().with_title("t"))
            .await
            .unwrap();

        let sent = session.sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].channel, Snowflake(1));
        assert_eq!(sent[0].reply, Reply::Text("hello".to_string()));
        assert_eq!(sent[1].channel, Snowflake(2));
    }

    #[tokio::test]
    async fn test_failing_session() {
        let session = RecordingSession::failing(SendError::Unavailable("offline".to_string()));
        let err = session.send_text(Snowflake(1), "hello").await.unwrap_err();
        assert_eq!(err, SendError::Unavailable("offline".to_string()));
        assert!(session.sent().await.is_empty());
    }
}
