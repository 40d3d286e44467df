//! Discussion-topic queue.
//!
//! An ordered list of topics where position 0 is "next up". Names are unique
//! (exact, case-sensitive match) and every operation below is one atomic
//! step over the list:
//!
//! - `add` appends, rejecting empty and duplicate names
//! - `remove` / `bump` / `skip` / `attach` / `detach` act on the one topic
//!   with a matching name
//! - `next` and `list` are read-only
//!
//! Rules for `modified_at`:
//! - the queue timestamp moves on every successful mutation, and also when a
//!   mutation is rejected because the name was not found
//! - a topic's own timestamp moves only when that topic is changed
//! - rejected adds and out-of-range detaches leave both untouched

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Snapshot file name inside the data directory.
pub const QUEUE_FILE: &str = "queue.json";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("a topic named {0:?} already exists")]
    DuplicateName(String),

    #[error("topic name must not be empty")]
    InvalidTopic,

    #[error("no topic named {0:?}")]
    NotFound(String),

    #[error("the queue is empty")]
    EmptyQueue,

    #[error("source index {index} is out of range for {len} source(s)")]
    IndexOutOfRange { index: i64, len: usize },
}

impl QueueError {
    /// Short heading for a user-facing reply.
    pub fn title(&self) -> &'static str {
        match self {
            QueueError::DuplicateName(_) => "Duplicate Topic",
            QueueError::InvalidTopic => "Empty Topic Name",
            QueueError::NotFound(_) => "Topic Not Found",
            QueueError::EmptyQueue => "Empty Queue",
            QueueError::IndexOutOfRange { .. } => "Index Out of Range",
        }
    }

    /// One-sentence explanation of the violated precondition.
    pub fn explanation(&self) -> String {
        match self {
            QueueError::DuplicateName(name) => {
                format!("A topic named `{}` already exists.", name)
            }
            QueueError::InvalidTopic => "Cannot add a topic with no name.".to_string(),
            QueueError::NotFound(name) => format!("Could not find a topic named `{}`.", name),
            QueueError::EmptyQueue => "There are no topics in the queue.".to_string(),
            QueueError::IndexOutOfRange { index, len } => match len {
                0 => format!("Source {} does not exist; the topic has no sources.", index),
                _ => format!(
                    "Source {} does not exist; valid numbers are 0 to {}.",
                    index,
                    len - 1
                ),
            },
        }
    }
}

/// One entry in the discussion queue.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Topic {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub created_by: String,
}

impl Topic {
    /// Create a topic. Timestamps are reset when it is added to a queue.
    pub fn new(name: &str, description: Option<&str>, created_by: &str) -> Self {
        let now = Utc::now();
        Self {
            name: name.to_string(),
            description: description.map(str::to_string),
            sources: Vec::new(),
            created_at: now,
            modified_at: now,
            created_by: created_by.to_string(),
        }
    }

    fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

/// The ordered topic collection.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Queue {
    topics: Vec<Topic>,
    modified_at: DateTime<Utc>,
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}

impl Queue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            topics: Vec::new(),
            modified_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    /// All topics in order.
    pub fn list(&self) -> &[Topic] {
        &self.topics
    }

    pub fn get(&self, name: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.name == name)
    }

    /// The topic at position 0, without removing it.
    pub fn next(&self) -> Result<&Topic, QueueError> {
        self.topics.first().ok_or(QueueError::EmptyQueue)
    }

    /// Append a topic to the end of the queue.
    pub fn add(&mut self, mut topic: Topic) -> Result<&Topic, QueueError> {
        if topic.name.is_empty() {
            return Err(QueueError::InvalidTopic);
        }
        if self.position(&topic.name).is_some() {
            return Err(QueueError::DuplicateName(topic.name));
        }

        let now = Utc::now();
        topic.created_at = now;
        topic.modified_at = now;
        self.topics.push(topic);
        self.modified_at = now;

        tracing::debug!("Added topic at position {}", self.topics.len() - 1);
        Ok(&self.topics[self.topics.len() - 1])
    }

    /// Remove the topic with the given name.
    pub fn remove(&mut self, name: &str) -> Result<Topic, QueueError> {
        let idx = self.find(name)?;
        let topic = self.topics.remove(idx);
        self.touch();
        Ok(topic)
    }

    /// Move the named topic to the front, keeping everyone else in order.
    pub fn bump(&mut self, name: &str) -> Result<&Topic, QueueError> {
        let idx = self.find(name)?;
        self.topics[..=idx].rotate_right(1);
        self.topics[0].touch();
        self.touch();
        Ok(&self.topics[0])
    }

    /// Move the named topic to the back, keeping everyone else in order.
    pub fn skip(&mut self, name: &str) -> Result<&Topic, QueueError> {
        let idx = self.find(name)?;
        self.topics[idx..].rotate_left(1);
        let last = self.topics.len() - 1;
        self.topics[last].touch();
        self.touch();
        Ok(&self.topics[last])
    }

    /// Append a source link to the named topic.
    pub fn attach(&mut self, name: &str, url: &str) -> Result<&Topic, QueueError> {
        let idx = self.find(name)?;
        let topic = &mut self.topics[idx];
        topic.sources.push(url.to_string());
        topic.touch();
        self.touch();
        Ok(&self.topics[idx])
    }

    /// Remove `sources[index]` from the named topic and return it.
    pub fn detach(&mut self, name: &str, index: i64) -> Result<String, QueueError> {
        let idx = self.find(name)?;
        let topic = &mut self.topics[idx];

        let len = topic.sources.len();
        let source_idx = usize::try_from(index)
            .ok()
            .filter(|i| *i < len)
            .ok_or(QueueError::IndexOutOfRange { index, len })?;

        let removed = topic.sources.remove(source_idx);
        topic.touch();
        self.touch();
        Ok(removed)
    }

    /// Index of the topic with this exact name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.topics.iter().position(|t| t.name == name)
    }

    /// Like `position`, but a miss still counts as a queue modification.
    fn find(&mut self, name: &str) -> Result<usize, QueueError> {
        match self.position(name) {
            Some(idx) => Ok(idx),
            None => {
                self.touch();
                Err(QueueError::NotFound(name.to_string()))
            }
        }
    }

    fn touch(&mut self) {
        self.modified_at = Utc::now();
    }

    /// Check that a restored snapshot still has unique, non-empty names.
    fn validate(&self) -> Result<(), Error> {
        let mut seen = HashSet::new();
        for topic in &self.topics {
            if topic.name.is_empty() {
                return Err(Error::Queue("snapshot contains a topic with no name".to_string()));
            }
            if !seen.insert(topic.name.as_str()) {
                return Err(Error::Queue(format!(
                    "snapshot contains duplicate topic {:?}",
                    topic.name
                )));
            }
        }
        Ok(())
    }

    /// Write the snapshot to `<dir>/queue.json`.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, Error> {
        fs::create_dir_all(dir)?;
        let path = dir.join(QUEUE_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)?;

        tracing::debug!("Saved {} topic(s) to {}", self.topics.len(), path.display());
        Ok(path)
    }

    /// Restore a snapshot from `<dir>/queue.json` verbatim.
    pub fn load(dir: &Path) -> Result<Self, Error> {
        let path = dir.join(QUEUE_FILE);
        let content = fs::read_to_string(&path)?;
        let queue: Queue = serde_json::from_str(&content)?;
        queue.validate()?;

        tracing::info!("Loaded {} topic(s) from {}", queue.topics.len(), path.display());
        Ok(queue)
    }

    /// Restore a snapshot, or start empty when there is none.
    pub fn load_or_default(dir: &Path) -> Result<Self, Error> {
        if !dir.join(QUEUE_FILE).exists() {
            tracing::info!("No queue snapshot in {}, starting empty", dir.display());
            return Ok(Self::new());
        }
        Self::load(dir)
    }
}
