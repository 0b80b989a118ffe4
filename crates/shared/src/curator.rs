use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::models::Article;

/// Returned verbatim when there is nothing to curate; no model call is made.
pub const NO_NEWS_PLACEHOLDER: &str =
    "No significant U.S. Treasury news found in the last 24 hours.";

const SYSTEM_PROMPT: &str = "You are a professional financial journalist and policy analyst who \
curates news about the U.S. Treasury for senior decision-makers. Your tone is concise, neutral, \
and insight-driven.";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: Vec<ChatMessage<'a>>,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Curates the article list into a Markdown digest via a local Ollama server.
pub struct OllamaCurator {
    client: Client,
    base_url: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl OllamaCurator {
    pub fn new(
        base_url: String,
        model: String,
        temperature: f64,
        max_tokens: u32,
        timeout_seconds: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            temperature,
            max_tokens,
        })
    }

    /// One request, no streaming, no retry. An empty article list short-circuits
    /// to the placeholder without touching the network.
    pub async fn curate(&self, articles: &[Article]) -> Result<String> {
        if articles.is_empty() {
            return Ok(NO_NEWS_PLACEHOLDER.to_string());
        }

        let user_prompt = build_user_prompt(articles);
        self.chat(SYSTEM_PROMPT, &user_prompt).await
    }

    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            stream: false,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            options: ChatOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Ollama")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("Ollama returned error: {} - {}", status, error_text);
        }

        let chat_response = response
            .json::<ChatResponse>()
            .await
            .context("Failed to parse Ollama response")?;

        match chat_response.message.and_then(|m| m.content) {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => anyhow::bail!("Ollama response missing message.content"),
        }
    }
}

/// Compact numbered plain-text rendering of the articles, for the prompt.
fn article_block(articles: &[Article]) -> String {
    articles
        .iter()
        .enumerate()
        .map(|(i, a)| {
            format!(
                "[{}] {}\nSource: {} | Published: {}\nSummary: {}\nURL: {}",
                i + 1,
                a.title.as_deref().unwrap_or("(untitled)"),
                a.source.as_deref().unwrap_or("unknown"),
                a.published_at.as_deref().unwrap_or("unknown"),
                a.description.as_deref().unwrap_or("(no summary)"),
                a.url,
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn build_user_prompt(articles: &[Article]) -> String {
    format!(
        "I will give you a list of recent news articles related to the United States Treasury.\n\
         \n\
         Articles:\n\
         {}\n\
         \n\
         Tasks:\n\
         1. Identify the 3-7 most important themes or stories.\n\
         2. For each, provide:\n   \
            - A short headline in plain English.\n   \
            - 2-4 sentence summary in business / policy terms.\n   \
            - Mention specific Treasury actions, policy changes, or market impacts if applicable.\n\
         3. Add a brief 'Market & Policy Takeaways' section (3-5 bullet points).\n\
         4. Group related articles when they cover the same story; reference their article \
         indices in brackets (e.g., [1, 3, 5]).\n\
         \n\
         Output in **well-structured Markdown** suitable for an email body, with clear headings, \
         bullet points, and embedded URLs where useful.",
        article_block(articles)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, url: &str) -> Article {
        Article {
            title: Some(title.to_string()),
            description: Some("What happened.".to_string()),
            source: Some("Example Wire".to_string()),
            url: url.to_string(),
            published_at: Some("2024-05-01T09:00:00Z".to_string()),
        }
    }

    #[tokio::test]
    async fn test_empty_list_returns_placeholder_without_network() {
        // The base URL is unroutable; the call only succeeds because no
        // request is made for an empty article list.
        let curator =
            OllamaCurator::new("http://127.0.0.1:1".to_string(), "m".to_string(), 0.4, 100, 1)
                .unwrap();
        let digest = curator.curate(&[]).await.unwrap();
        assert_eq!(digest, NO_NEWS_PLACEHOLDER);
    }

    #[test]
    fn test_article_block_numbering_and_fields() {
        let articles = vec![
            article("Treasury issues guidance", "https://a.com/1"),
            article("Yields rise", "https://b.com/2"),
        ];
        let block = article_block(&articles);

        assert!(block.starts_with("[1] Treasury issues guidance"));
        assert!(block.contains("\n\n[2] Yields rise"));
        assert!(block.contains("Source: Example Wire | Published: 2024-05-01T09:00:00Z"));
        assert!(block.contains("URL: https://a.com/1"));
    }

    #[test]
    fn test_article_block_handles_missing_fields() {
        let articles = vec![Article {
            title: None,
            description: None,
            source: None,
            url: "https://a.com/1".to_string(),
            published_at: None,
        }];
        let block = article_block(&articles);

        assert!(block.contains("[1] (untitled)"));
        assert!(block.contains("Source: unknown | Published: unknown"));
        assert!(block.contains("Summary: (no summary)"));
    }

    #[test]
    fn test_user_prompt_embeds_articles_and_instructions() {
        let articles = vec![article("Treasury issues guidance", "https://a.com/1")];
        let prompt = build_user_prompt(&articles);

        assert!(prompt.contains("[1] Treasury issues guidance"));
        assert!(prompt.contains("Market & Policy Takeaways"));
        assert!(prompt.contains("indices in brackets"));
        assert!(prompt.contains("well-structured Markdown"));
    }
}
