//! Outbound reply payloads.
//!
//! A [`RichReply`] mirrors the structured "embed" most chat platforms offer.
//! Every element is truncated to the platform cap instead of being rejected,
//! and once the running total would pass [`TOTAL_CHAR_LIMIT`] further
//! additions are dropped. Lengths are counted in characters.

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const TITLE_LIMIT: usize = 256;
pub const DESCRIPTION_LIMIT: usize = 2048;
pub const FIELD_LIMIT: usize = 25;
pub const FIELD_NAME_LIMIT: usize = 256;
pub const FIELD_VALUE_LIMIT: usize = 1024;
pub const FOOTER_LIMIT: usize = 2048;
pub const TOTAL_CHAR_LIMIT: usize = 6000;

/// Colour used for discussion topics.
pub const TOPIC_COLOR: u32 = 0x417505;
/// Colour used for error replies.
pub const ERROR_COLOR: u32 = 0xD0021B;
/// Colour used for memes.
pub const MEME_COLOR: u32 = 0xF5A623;

/// The single reply a command produces.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", content = "body", rename_all = "lowercase")]
pub enum Reply {
    Text(String),
    Rich(RichReply),
}

impl Reply {
    /// Plain-text rendering, for transports without rich messages.
    pub fn to_text(&self) -> String {
        match self {
            Reply::Text(text) => text.clone(),
            Reply::Rich(rich) => rich.render_text(),
        }
    }
}

/// One name/value pair of a rich reply.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Structured reply with platform length caps applied.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct RichReply {
    title: Option<String>,
    description: Option<String>,
    color: Option<u32>,
    footer: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    fields: Vec<Field>,
    #[serde(skip)]
    total_chars: usize,
}

impl RichReply {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard error reply: red, with a title and an explanation.
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new()
            .with_color(ERROR_COLOR)
            .with_title(title)
            .with_description(description)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = truncate_chars(title.into(), TITLE_LIMIT);
        if let Some(total) = self.replace_total(self.title.as_deref(), &title) {
            self.total_chars = total;
            self.title = Some(title);
        }
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = truncate_chars(description.into(), DESCRIPTION_LIMIT);
        if let Some(total) = self.replace_total(self.description.as_deref(), &description) {
            self.total_chars = total;
            self.description = Some(description);
        }
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        let footer = truncate_chars(footer.into(), FOOTER_LIMIT);
        if let Some(total) = self.replace_total(self.footer.as_deref(), &footer) {
            self.total_chars = total;
            self.footer = Some(footer);
        }
        self
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Append a field. Dropped once 25 fields exist or the total cap is hit.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        if self.fields.len() >= FIELD_LIMIT {
            tracing::debug!("Rich reply already has {} fields, dropping field", FIELD_LIMIT);
            return self;
        }

        let name = truncate_chars(name.into(), FIELD_NAME_LIMIT);
        let value = truncate_chars(value.into(), FIELD_VALUE_LIMIT);
        let added = name.chars().count() + value.chars().count();

        if self.total_chars + added > TOTAL_CHAR_LIMIT {
            tracing::debug!("Rich reply at character limit, dropping field");
            return self;
        }

        self.total_chars += added;
        self.fields.push(Field { name, value, inline });
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn footer(&self) -> Option<&str> {
        self.footer.as_deref()
    }

    pub fn color(&self) -> Option<u32> {
        self.color
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Characters counted against [`TOTAL_CHAR_LIMIT`].
    pub fn total_chars(&self) -> usize {
        self.total_chars
    }

    /// Flatten into plain text: title, description, fields, footer.
    pub fn render_text(&self) -> String {
        let mut blocks = Vec::new();

        if let Some(title) = &self.title {
            blocks.push(title.clone());
        }
        if let Some(description) = &self.description {
            blocks.push(description.clone());
        }
        for field in &self.fields {
            if field.value.is_empty() {
                blocks.push(field.name.clone());
            } else {
                blocks.push(format!("{}\n{}", field.name, field.value));
            }
        }

        let mut footer_line = self.footer.clone().unwrap_or_default();
        if let Some(ts) = self.timestamp {
            if !footer_line.is_empty() {
                footer_line.push_str(" • ");
            }
            footer_line.push_str(&ts.format("%Y-%m-%d %H:%M UTC").to_string());
        }
        if !footer_line.is_empty() {
            blocks.push(footer_line);
        }

        blocks.join("\n\n")
    }

    /// New total after swapping `old` for `new`, or `None` if over the cap.
    fn replace_total(&self, old: Option<&str>, new: &str) -> Option<usize> {
        let old_len = old.map_or(0, |s| s.chars().count());
        let total = self.total_chars - old_len + new.chars().count();
        if total > TOTAL_CHAR_LIMIT {
            tracing::debug!("Rich reply at character limit, dropping element");
            return None;
        }
        Some(total)
    }
}

/// Truncate to at most `limit` characters, on a char boundary.
fn truncate_chars(mut s: String, limit: usize) -> String {
    if let Some((idx, _)) = s.char_indices().nth(limit) {
        s.truncate(idx);
    }
    s
}
