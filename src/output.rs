//! Output records and the sink they are pushed to.
//!
//! `OutputRecord` is the only shape that crosses the system boundary:
//! append-only, one record per emission, timestamped at emission time. The
//! sink itself is an external collaborator behind a trait; the production
//! sink writes JSON lines, tests collect records in memory.

use crate::links::{Headline, LinkRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputRecord {
    Headline {
        text: String,
        href: Option<String>,
        scrape_timestamp: DateTime<Utc>,
    },
    Link {
        text: String,
        href: Url,
        scrape_timestamp: DateTime<Utc>,
    },
    GeneratedStory {
        original_link_text: String,
        original_link_href: Url,
        generated_story: String,
        story_generation_timestamp: DateTime<Utc>,
    },
}

impl OutputRecord {
    pub fn headline(headline: &Headline) -> Self {
        Self::Headline {
            text: headline.text.clone(),
            href: headline.href.clone(),
            scrape_timestamp: Utc::now(),
        }
    }

    /// A `link` record. Empty link texts (image-only anchors) get a
    /// placeholder naming the target.
    pub fn link(link: &LinkRecord) -> Self {
        let text = if link.text.is_empty() {
            format!("[Link to {}]", link.href)
        } else {
            link.text.clone()
        };
        Self::Link {
            text,
            href: link.href.clone(),
            scrape_timestamp: Utc::now(),
        }
    }

    pub fn generated_story(link: &LinkRecord, story_body: impl Into<String>) -> Self {
        Self::GeneratedStory {
            original_link_text: link.text.clone(),
            original_link_href: link.href.clone(),
            generated_story: story_body.into(),
            story_generation_timestamp: Utc::now(),
        }
    }
}

/// Append-only destination for output records. Durability and ordering past
/// the push are the collaborator's concern.
#[async_trait]
pub trait RecordSink: Send {
    async fn push(&mut self, record: OutputRecord) -> anyhow::Result<()>;
}

/// Production sink: one JSON object per line.
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl<W: Write + Send> RecordSink for JsonLinesSink<W> {
    async fn push(&mut self, record: OutputRecord) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// In-memory sink for tests and demos.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<OutputRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn push(&mut self, record: OutputRecord) -> anyhow::Result<()> {
        self.records.push(record);
        Ok(())
    }
}
