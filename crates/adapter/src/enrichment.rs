use anyhow::Result;
use domain::{EnrichmentEvent, EnrichmentJob, NotifyOutcome, SpamOutcome};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::traits::{AntiSpam, CommentStore, Notifier, PageFetcher, SpamVerdict};

/// Optional collaborators of the background workflow. `None` means the
/// deployment did not configure one.
#[derive(Clone, Default)]
pub struct Collaborators {
    pub anti_spam: Option<Arc<dyn AntiSpam>>,
    pub notifier: Option<Arc<dyn Notifier>>,
    pub page_fetcher: Option<Arc<dyn PageFetcher>>,
}

/// Request-side handle: hands jobs to the worker without waiting on it.
#[derive(Clone)]
pub struct EnrichmentDispatcher {
    tx: mpsc::Sender<EnrichmentJob>,
}

impl EnrichmentDispatcher {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<EnrichmentJob>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    pub fn dispatch(&self, job: EnrichmentJob) {
        match self.tx.try_send(job) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(job)) => {
                warn!(
                    "Enrichment queue full, deferring comment {}",
                    job.comment.id
                );
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let id = job.comment.id;
                    if tx.send(job).await.is_err() {
                        error!("Enrichment worker closed, dropped comment {}", id);
                    }
                });
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                error!(
                    "Enrichment worker closed, dropped comment {}",
                    job.comment.id
                );
            }
        }
    }
}

/// Runs the three post-commit steps for one job.
#[derive(Clone)]
pub struct Enricher {
    store: Arc<dyn CommentStore>,
    collaborators: Collaborators,
    tx_events: broadcast::Sender<EnrichmentEvent>,
}

impl Enricher {
    pub fn new(
        store: Arc<dyn CommentStore>,
        collaborators: Collaborators,
        tx_events: broadcast::Sender<EnrichmentEvent>,
    ) -> Self {
        Self {
            store,
            collaborators,
            tx_events,
        }
    }

    /// Page backfill, spam check and notification, in that order. A failure or
    /// panic in one step is logged and the next step still runs.
    pub async fn process(&self, mut job: EnrichmentJob) -> EnrichmentEvent {
        let comment_id = job.comment.id;

        let page_title = isolated("page backfill", comment_id, self.backfill_page(&job), None).await;
        let spam = isolated(
            "spam check",
            comment_id,
            self.check_spam(&mut job),
            SpamOutcome::Failed,
        )
        .await;
        let notify = isolated("notify", comment_id, self.notify(&job), NotifyOutcome::Failed).await;

        debug!(
            "Enrichment done for comment {}: title={:?} spam={:?} notify={:?}",
            comment_id, page_title, spam, notify
        );

        let event = EnrichmentEvent::Processed {
            comment_id,
            page_title,
            spam,
            notify,
        };
        // no subscribers is fine
        let _ = self.tx_events.send(event.clone());
        event
    }

    async fn backfill_page(&self, job: &EnrichmentJob) -> Option<String> {
        if job.page_url.is_empty() || !job.page.title.is_empty() {
            return None;
        }
        let Some(fetcher) = &self.collaborators.page_fetcher else {
            debug!("[PageFetch] not configured, page {} keeps empty title", job.page.id);
            return None;
        };

        let title = match fetcher.fetch_title(&job.page_url).await {
            Ok(Some(title)) => title,
            Ok(None) => return None,
            Err(e) => {
                error!("[PageFetch] fetch {} failed: {:?}", job.page_url, e);
                return None;
            }
        };

        match self.store.update_page_title(job.page.id, &title).await {
            Ok(()) => Some(title),
            Err(e) => {
                error!("[PageFetch] save title for page {} failed: {:?}", job.page.id, e);
                None
            }
        }
    }

    async fn check_spam(&self, job: &mut EnrichmentJob) -> SpamOutcome {
        if job.is_admin {
            return SpamOutcome::Skipped;
        }
        let Some(anti_spam) = &self.collaborators.anti_spam else {
            debug!("[AntiSpam] not configured, comment {} unchecked", job.comment.id);
            return SpamOutcome::Unconfigured;
        };

        let verdict = match anti_spam.check(&job.spam_payload()).await {
            Ok(v) => v,
            Err(e) => {
                error!("[AntiSpam] check comment {} failed: {:?}", job.comment.id, e);
                return SpamOutcome::Failed;
            }
        };

        match verdict {
            SpamVerdict::Clean => SpamOutcome::Clean,
            SpamVerdict::Spam { reason } => {
                if let Err(e) = self.store.block_comment(job.comment.id).await {
                    error!("[AntiSpam] block comment {} failed: {:?}", job.comment.id, e);
                    return SpamOutcome::Failed;
                }
                info!("[AntiSpam] comment {} blocked: {}", job.comment.id, reason);
                job.comment.is_pending = true;
                SpamOutcome::Blocked
            }
        }
    }

    async fn notify(&self, job: &EnrichmentJob) -> NotifyOutcome {
        let Some(notifier) = &self.collaborators.notifier else {
            debug!("[Notify] not configured, comment {} not pushed", job.comment.id);
            return NotifyOutcome::Unconfigured;
        };

        match notifier.push(&job.comment, job.parent.as_ref()).await {
            Ok(()) => NotifyOutcome::Sent,
            Err(e) => {
                error!("[Notify] push comment {} failed: {:?}", job.comment.id, e);
                NotifyOutcome::Failed
            }
        }
    }
}

async fn isolated<T>(
    step: &'static str,
    comment_id: i64,
    fut: impl Future<Output = T>,
    on_panic: T,
) -> T {
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(v) => v,
        Err(_) => {
            error!("[Enrichment] {} panicked for comment {}", step, comment_id);
            on_panic
        }
    }
}

/// Worker loop: takes jobs off the queue and runs up to `workers` of them at
/// once. On cancellation it stops accepting, finishes what is queued and waits
/// for in-flight jobs.
pub async fn start_with_cancel_token(
    enricher: Enricher,
    mut rx: mpsc::Receiver<EnrichmentJob>,
    workers: usize,
    cancel_token: CancellationToken,
) -> Result<()> {
    let workers = workers.max(1);
    let permits = Arc::new(Semaphore::new(workers));
    info!("Enrichment worker started ({} concurrent jobs)", workers);

    loop {
        tokio::select! {
            job = rx.recv() => {
                let Some(job) = job else { break };
                spawn_job(&enricher, &permits, job).await?;
            },
            _ = cancel_token.cancelled() => break,
        }
    }

    rx.close();
    let mut drained = 0usize;
    while let Some(job) = rx.recv().await {
        spawn_job(&enricher, &permits, job).await?;
        drained += 1;
    }

    // every permit back means every job has finished
    let _all = permits.acquire_many(workers as u32).await?;
    info!("Enrichment worker stopped ({} queued jobs drained)", drained);
    Ok(())
}

async fn spawn_job(
    enricher: &Enricher,
    permits: &Arc<Semaphore>,
    job: EnrichmentJob,
) -> Result<()> {
    let permit = permits.clone().acquire_owned().await?;
    let enricher = enricher.clone();
    tokio::spawn(async move {
        enricher.process(job).await;
        drop(permit);
    });
    Ok(())
}
