use anyhow::Result;
use async_trait::async_trait;
use domain::AntiSpamCheckPayload;

use crate::traits::{AntiSpam, SpamVerdict};

/// Flags a comment whose content contains any configured keyword.
pub struct KeywordsAntiSpam {
    keywords: Vec<String>,
}

impl KeywordsAntiSpam {
    pub fn new(keywords: impl IntoIterator<Item = String>) -> Self {
        let keywords = keywords
            .into_iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

#[async_trait]
impl AntiSpam for KeywordsAntiSpam {
    async fn check(&self, payload: &AntiSpamCheckPayload<'_>) -> Result<SpamVerdict> {
        let content = payload.comment.content.to_lowercase();
        Ok(match self.keywords.iter().find(|k| content.contains(k.as_str())) {
            Some(k) => SpamVerdict::Spam {
                reason: format!("keyword '{}'", k),
            },
            None => SpamVerdict::Clean,
        })
    }
}
