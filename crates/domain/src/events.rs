use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpamOutcome {
    /// Admin comments are never checked.
    Skipped,
    Unconfigured,
    Clean,
    Blocked,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyOutcome {
    Unconfigured,
    Sent,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EnrichmentEvent {
    Processed {
        comment_id: i64,
        /// Title written back to the page, if the backfill ran and succeeded.
        page_title: Option<String>,
        spam: SpamOutcome,
        notify: NotifyOutcome,
    },
}
