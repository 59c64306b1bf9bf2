//! services/api/src/adapters/summary.rs
//!
//! This module contains the adapter for the article-summarizing LLM.
//! It implements the `Summarizer` port from the `core` crate.
//!
//! Summaries are a best-effort enhancement: content-insufficiency cases are
//! answered locally with a fixed message, and upstream failures surface as
//! `PortError::Upstream` for the caller to degrade into a fallback string.

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use news_core::ports::{PortError, PortResult, Summarizer};

/// Bodies shorter than this are not worth an upstream call.
const MIN_BODY_CHARS: usize = 30;
/// Cap on the body length sent upstream, to bound cost and latency.
const BODY_CAP_CHARS: usize = 1500;
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Returned when the provider only exposes a teaser of a paid article.
pub const PAYWALLED_MESSAGE: &str =
    "Preview only: the full article requires a subscription. Follow the link to read it.";
/// Returned when the article body is too short to say anything about.
pub const TOO_SHORT_MESSAGE: &str =
    "Article text too short to summarize. Follow the link for details.";

/// Indicator phrases for articles whose visible text is a paywall teaser.
const PAYWALL_INDICATORS: &[&str] = &[
    "subscribe to read",
    "subscribers only",
    "premium content",
    "sign in to continue",
    "only available in paid plans",
    // NewsAPI truncates paid bodies with a "[+N chars]" marker.
    "[+",
];

/// Phrases that mark a model response as a refusal rather than a summary.
const REFUSAL_INDICATORS: &[&str] = &[
    "i'm sorry",
    "i am sorry",
    "i cannot",
    "i can't",
    "as an ai",
];

/// Decides, before any upstream call, whether the body is summarizable.
/// Returns the fixed message to use instead when it is not.
fn content_notice(body: &str) -> Option<&'static str> {
    let trimmed = body.trim();
    if trimmed.chars().count() < MIN_BODY_CHARS {
        return Some(TOO_SHORT_MESSAGE);
    }
    let lowered = trimmed.to_lowercase();
    if PAYWALL_INDICATORS.iter().any(|p| lowered.contains(p)) {
        return Some(PAYWALLED_MESSAGE);
    }
    None
}

fn looks_like_refusal(text: &str) -> bool {
    let lowered = text.to_lowercase();
    REFUSAL_INDICATORS.iter().any(|p| lowered.contains(p))
}

/// Language-keyed system instruction, defaulting to English.
fn system_prompt(language: &str) -> &'static str {
    match language {
        "he" => "אתה מסכם חדשות בעברית בפשטות ובאופן מעניין.",
        "fr" => "Tu résumes les actualités en français de manière claire et intéressante.",
        "es" => "Resumes las noticias en español de forma clara y atractiva.",
        _ => "You summarize news articles in clear and engaging English.",
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `Summarizer` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiSummaryAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiSummaryAdapter {
    /// Creates a new `OpenAiSummaryAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `Summarizer` Trait Implementation
//=========================================================================================

#[async_trait]
impl Summarizer for OpenAiSummaryAdapter {
    /// Summarizes one article in 2-3 sentences in the user's language.
    async fn summarize(&self, title: &str, body: &str, language: &str) -> PortResult<String> {
        if let Some(message) = content_notice(body) {
            return Ok(message.to_string());
        }

        let capped: String = body.chars().take(BODY_CAP_CHARS).collect();
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt(language))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!(
                    "Summarize this article in 2-3 sentences:\n\n{}\n\n{}",
                    title, capped
                ))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(150u32)
            .temperature(0.7)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = tokio::time::timeout(UPSTREAM_TIMEOUT, self.client.chat().create(request))
            .await
            .map_err(|_| PortError::Upstream("summarization timed out".to_string()))?
            .map_err(|e: OpenAIError| PortError::Upstream(e.to_string()))?;

        let summary = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| PortError::Upstream("empty summarization response".to_string()))?;

        let summary = summary.trim().to_string();
        if summary.is_empty() || looks_like_refusal(&summary) {
            return Err(PortError::Upstream("model declined to summarize".to_string()));
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bodies_resolve_locally_without_an_upstream_call() {
        assert_eq!(content_notice("too short"), Some(TOO_SHORT_MESSAGE));
        assert_eq!(content_notice("   "), Some(TOO_SHORT_MESSAGE));
    }

    #[test]
    fn paywall_teasers_resolve_to_the_preview_message() {
        let body = "This exclusive report is premium content. Subscribe to read the rest of it.";
        assert_eq!(content_notice(body), Some(PAYWALLED_MESSAGE));
    }

    #[test]
    fn truncated_provider_bodies_resolve_to_the_preview_message() {
        let body = "President announces a sweeping new infrastructure plan for the coming decade... [+2763 chars]";
        assert_eq!(content_notice(body), Some(PAYWALLED_MESSAGE));
    }

    #[test]
    fn ordinary_bodies_pass_the_prechecks() {
        let body = "NASA confirmed today that the spacecraft completed its flyby and sent back data.";
        assert_eq!(content_notice(body), None);
    }

    #[test]
    fn refusal_phrases_are_detected_case_insensitively() {
        assert!(looks_like_refusal("I'm sorry, but I cannot summarize this."));
        assert!(looks_like_refusal("As an AI language model I must decline."));
        assert!(!looks_like_refusal("The spacecraft sent back its first images."));
    }

    #[test]
    fn unknown_languages_fall_back_to_english_instructions() {
        assert_eq!(system_prompt("de"), system_prompt("en"));
        assert_ne!(system_prompt("fr"), system_prompt("en"));
    }
}
