use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{NotificationEvent, Notifier};

#[derive(Clone)]
pub struct DiscordNotifier {
    webhook: String,
    client: Client,
    timeout: Duration,
}

impl DiscordNotifier {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Startup readiness check: Discord answers GET on a valid webhook URL
    /// with the webhook object.
    pub async fn probe(&self) -> Result<()> {
        self.client
            .get(&self.webhook)
            .timeout(self.timeout)
            .send()
            .await
            .context("webhook probe request failed")?
            .error_for_status()
            .context("webhook probe non-2xx")?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    /// Single attempt per cycle; the next poll is the retry mechanism for
    /// anything that stays undelivered.
    async fn send(&self, ev: &NotificationEvent, mention: Option<u64>) -> Result<()> {
        let payload = WebhookPayload::from_event(ev, mention);
        self.client
            .post(&self.webhook)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .context("Discord webhook request failed")?
            .error_for_status()
            .context("Discord webhook non-2xx")?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
struct Embed {
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    color: u32,
    fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail: Option<EmbedImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<EmbedImage>,
}

#[derive(Debug, Serialize)]
struct EmbedField {
    name: String,
    value: String,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct EmbedImage {
    url: String,
}

impl WebhookPayload {
    fn from_event(ev: &NotificationEvent, mention: Option<u64>) -> Self {
        let fields = vec![
            EmbedField {
                name: "Author".to_string(),
                value: ev.author.clone(),
                inline: false,
            },
            EmbedField {
                name: "Read More".to_string(),
                value: format!("[Visit Blog Post]({})", ev.link),
                inline: false,
            },
        ];

        Self {
            content: mention.map(|role| format!("<@&{role}>")),
            embeds: vec![Embed {
                title: ev.title.clone(),
                description: ev.description.clone(),
                color: 0,
                fields,
                thumbnail: ev.thumbnail.clone().map(|url| EmbedImage { url }),
                image: ev.feature_image.clone().map(|url| EmbedImage { url }),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> NotificationEvent {
        NotificationEvent {
            title: "New Post".into(),
            description: None,
            author: "Unknown".into(),
            thumbnail: Some("https://cdn/t-576x576.png".into()),
            feature_image: None,
            link: "https://www.fortnite.com/blog/p".into(),
            category: "Competitive".into(),
        }
    }

    #[test]
    fn mention_renders_as_role_tag() {
        let p = WebhookPayload::from_event(&event(), Some(42));
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["content"], "<@&42>");
    }

    #[test]
    fn no_mention_omits_content_and_empty_description() {
        let p = WebhookPayload::from_event(&event(), None);
        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("content").is_none());
        assert!(json["embeds"][0].get("description").is_none());
        assert_eq!(json["embeds"][0]["thumbnail"]["url"], "https://cdn/t-576x576.png");
        assert_eq!(
            json["embeds"][0]["fields"][1]["value"],
            "[Visit Blog Post](https://www.fortnite.com/blog/p)"
        );
    }
}
