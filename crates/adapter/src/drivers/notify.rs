use anyhow::{Context, Result};
use async_trait::async_trait;
use domain::Comment;
use std::time::Duration;

use crate::traits::Notifier;

/// Posts every new comment, with its parent, to a configured webhook.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build webhook client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn push(&self, comment: &Comment, parent: Option<&Comment>) -> Result<()> {
        let body = serde_json::json!({
            "event": "comment_created",
            "comment": comment,
            "parent_comment": parent,
        });

        self.client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("webhook {} unreachable", self.url))?
            .error_for_status()
            .with_context(|| format!("webhook {} rejected notification", self.url))?;
        Ok(())
    }
}
