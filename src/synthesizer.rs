//! Story synthesis via the OpenAI chat completions API.
//!
//! One request per link, one attempt per request. Every failure mode maps to
//! a fixed sentinel body so downstream records keep a uniform shape; the
//! diagnostic detail (including numeric statuses) goes to the log, not the
//! emitted story.

use crate::extractor::ExtractedContent;
use anyhow::Context;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, instrument};

/// Hard cap on how much article text is sent upstream, in characters.
const MAX_PROMPT_CHARS: usize = 8000;
const TEMPERATURE: f32 = 0.7;
/// Enough output budget for a 500-800 word story.
const MAX_TOKENS: usize = 1000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const SYSTEM_MESSAGE: &str = "You are a helpful news reporter.";

pub const NO_CONTENT_SENTINEL: &str = "[No content to summarize/generate story from]";
pub const CONNECTION_ERROR_SENTINEL: &str = "[OpenAI API connection error]";
pub const RATE_LIMIT_SENTINEL: &str = "[OpenAI API rate limit exceeded]";
pub const STATUS_ERROR_SENTINEL: &str = "[OpenAI API error]";
pub const GENERIC_ERROR_SENTINEL: &str = "[Error generating story with OpenAI]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryStatus {
    Ok,
    NoContent,
    UpstreamError,
}

/// The synthesized narrative. On anything but `Ok`, `body` holds a sentinel
/// string rather than being absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedStory {
    pub body: String,
    pub status: StoryStatus,
}

impl SynthesizedStory {
    fn failed(sentinel: &str) -> Self {
        Self {
            body: sentinel.to_string(),
            status: StoryStatus::UpstreamError,
        }
    }
}

pub struct Synthesizer {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl Synthesizer {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let client = ClientBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build synthesis HTTP client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
        })
    }

    /// Generate a story from extracted content. Empty content short-circuits
    /// without touching the network.
    #[instrument(skip_all, fields(content_chars = content.text.chars().count()))]
    pub async fn synthesize(&self, content: &ExtractedContent) -> SynthesizedStory {
        if content.is_empty() {
            return SynthesizedStory {
                body: NO_CONTENT_SENTINEL.to_string(),
                status: StoryStatus::NoContent,
            };
        }

        let prompt = build_prompt(&content.text);
        let request = ChatRequest {
            model: &self.model,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_MESSAGE,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        let response = match self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.trim())
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() || e.is_connect() || e.is_request() => {
                error!(error = %e, "connection error calling chat completions");
                return SynthesizedStory::failed(CONNECTION_ERROR_SENTINEL);
            }
            Err(e) => {
                error!(error = %e, "unexpected error calling chat completions");
                return SynthesizedStory::failed(GENERIC_ERROR_SENTINEL);
            }
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            error!("chat completions rate limit exceeded");
            return SynthesizedStory::failed(RATE_LIMIT_SENTINEL);
        }
        if !status.is_success() {
            error!(status = status.as_u16(), "chat completions returned an error status");
            return SynthesizedStory::failed(STATUS_ERROR_SENTINEL);
        }

        let parsed: ChatResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                error!(error = %e, "failed to parse chat completions response");
                return SynthesizedStory::failed(GENERIC_ERROR_SENTINEL);
            }
        };

        match parsed.choices.into_iter().next() {
            Some(choice) => SynthesizedStory {
                body: choice.message.content.trim().to_string(),
                status: StoryStatus::Ok,
            },
            None => {
                error!("chat completions response contained no choices");
                SynthesizedStory::failed(GENERIC_ERROR_SENTINEL)
            }
        }
    }
}

fn build_prompt(text: &str) -> String {
    format!(
        "Based on the following news article content, write a detailed and comprehensive \
         news story (around 500-800 words) that captures all the main \
         points, context, and implications. Focus on the core facts and provide a narrative. \
         Do not include a title, just the story body.\n\n\
         Article Content:\n{}",
        truncate_chars(text, MAX_PROMPT_CHARS)
    )
}

/// Truncate to at most `max` characters on a char boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: usize,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}
