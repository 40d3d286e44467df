//! Meme stash: a persisted list of quotes served at random by `&meme`.

pub mod handler;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub use handler::{MemeCommand, MemeInterceptor};

/// Snapshot file name inside the data directory.
pub const STASH_FILE: &str = "meme.json";

const DEFAULT_MEMES: [&str; 3] = [
    "When did I do dangerous driving?",
    "Stay out. IN! IN! IN! IN! IN! IN! IN!",
    "Is his career over!?",
];

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Meme {
    pub text: String,
    pub added_at: DateTime<Utc>,
    pub added_by: String,
}

impl Meme {
    pub fn new(text: &str, added_by: &str) -> Self {
        Self {
            text: text.to_string(),
            added_at: Utc::now(),
            added_by: added_by.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Stash {
    memes: Vec<Meme>,
}

impl Default for Stash {
    fn default() -> Self {
        Self {
            memes: DEFAULT_MEMES
                .iter()
                .map(|text| Meme::new(text, "Default Meme"))
                .collect(),
        }
    }
}

impl Stash {
    /// A stash with no memes at all.
    pub fn empty() -> Self {
        Self { memes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.memes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memes.is_empty()
    }

    pub fn list(&self) -> &[Meme] {
        &self.memes
    }

    pub fn get(&self, index: usize) -> Option<&Meme> {
        self.memes.get(index)
    }

    pub fn add(&mut self, meme: Meme) -> &Meme {
        self.memes.push(meme);
        &self.memes[self.memes.len() - 1]
    }

    /// Remove by position. `None` when out of bounds.
    pub fn remove(&mut self, index: usize) -> Option<Meme> {
        (index < self.memes.len()).then(|| self.memes.remove(index))
    }

    pub fn random(&self) -> Option<&Meme> {
        use rand::seq::SliceRandom;
        self.memes.choose(&mut rand::thread_rng())
    }

    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(STASH_FILE);
        fs::write(&path, serde_json::to_string_pretty(self)?)?;

        tracing::debug!("Saved {} meme(s) to {}", self.memes.len(), path.display());
        Ok(path)
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(STASH_FILE);
        let stash: Stash = serde_json::from_str(&fs::read_to_string(&path)?)?;

        tracing::info!("Loaded {} meme(s) from {}", stash.memes.len(), path.display());
        Ok(stash)
    }

    /// Restore the stash, or fall back to the default quotes.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        if !dir.join(STASH_FILE).exists() {
            tracing::info!("No meme stash in {}, using defaults", dir.display());
            return Ok(Self::default());
        }
        Self::load(dir)
    }
}
