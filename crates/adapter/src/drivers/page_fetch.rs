use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

use crate::traits::PageFetcher;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("title pattern compiles"));

pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("parley/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build page fetch client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_title(&self, url: &str) -> Result<Option<String>> {
        let html = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()?
            .text()
            .await?;
        Ok(extract_title(&html))
    }
}

pub fn extract_title(html: &str) -> Option<String> {
    let raw = TITLE_RE.captures(html)?.get(1)?.as_str();
    let title = decode_entities(raw.split_whitespace().collect::<Vec<_>>().join(" ").as_str());
    (!title.is_empty()).then_some(title)
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
