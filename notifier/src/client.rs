//! Webhook client for posting the ranking to a Discord channel

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Serialize;

use prformance_api::config::DiscordConfig;

/// Posts messages to one Discord webhook under a fixed identity
#[derive(Clone)]
pub struct DiscordClient {
    client: reqwest::Client,
    webhook_url: String,
    username: String,
    avatar_url: Option<String>,
}

impl DiscordClient {
    pub fn new(webhook_url: &str, identity: &DiscordConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            webhook_url: webhook_url.to_string(),
            username: identity.username.clone(),
            avatar_url: identity.avatar_url.clone(),
        })
    }

    #[cfg(test)]
    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    fn payload<'a>(&'a self, content: &'a str) -> WebhookMessage<'a> {
        WebhookMessage {
            content,
            username: &self.username,
            avatar_url: self.avatar_url.as_deref(),
            allowed_mentions: AllowedMentions { parse: Vec::new() },
        }
    }

    /// Send `content` as a message; mentions inside it never ping anyone
    pub async fn send(&self, content: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&self.payload(content))
            .send()
            .await
            .context("Failed to POST to the Discord webhook")?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .context("Failed to read response body")?;
            tracing::error!(status = %status, body = %body, "Discord rejected the message");
            anyhow::bail!("Discord webhook error ({}): {}", status, body);
        }

        tracing::info!(chars = content.chars().count(), "Message delivered to Discord");
        Ok(())
    }
}

// --- Request Types ---

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
    username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<&'a str>,
    allowed_mentions: AllowedMentions,
}

#[derive(Debug, Serialize)]
struct AllowedMentions {
    parse: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(avatar: Option<&str>) -> DiscordConfig {
        DiscordConfig {
            webhook_url: None,
            username: "PRFormance".to_string(),
            avatar_url: avatar.map(str::to_string),
        }
    }

    #[test]
    fn test_client_new() {
        let client =
            DiscordClient::new("https://discord.com/api/webhooks/1/abc", &identity(None)).unwrap();
        assert_eq!(client.webhook_url(), "https://discord.com/api/webhooks/1/abc");
    }

    #[test]
    fn test_payload_disables_mentions() {
        let client = DiscordClient::new("https://example.com/hook", &identity(None)).unwrap();
        let json = serde_json::to_value(client.payload("@everyone hi")).unwrap();

        assert_eq!(json["content"], "@everyone hi");
        assert_eq!(json["username"], "PRFormance");
        assert_eq!(json["allowed_mentions"]["parse"], serde_json::json!([]));
        assert!(json.get("avatar_url").is_none());
    }

    #[test]
    fn test_payload_carries_avatar() {
        let client = DiscordClient::new(
            "https://example.com/hook",
            &identity(Some("https://example.com/bot.png")),
        )
        .unwrap();
        let json = serde_json::to_value(client.payload("hi")).unwrap();

        assert_eq!(json["avatar_url"], "https://example.com/bot.png");
    }
}
