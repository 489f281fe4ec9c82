use adapter::{
    CidrRegionTable, Collaborators, CommentStore, EnrichmentDispatcher, Enricher, HttpPageFetcher,
    IpRegionLookup, KeywordsAntiSpam, RegionPrecision, WebhookNotifier,
};
use anyhow::Context;
use domain::{EnrichmentEvent, EnrichmentJob};
use std::sync::Arc;
use std::time::Duration;
use storage::Db;
use tokio::sync::{broadcast, mpsc};
use tracing::info;

use crate::auth::TokenAuthority;
use crate::config::Settings;
use crate::limiter::RateLimiter;
use crate::pipeline::{CommentPipeline, PipelineConfig, ResponseEnricher};
use crate::state::AppState;

/// Everything `main` needs to serve requests and run the background worker.
pub struct Runtime {
    pub state: AppState,
    pub enricher: Enricher,
    pub jobs: mpsc::Receiver<EnrichmentJob>,
    pub events: broadcast::Sender<EnrichmentEvent>,
}

/// Upserts the configured sites and admin accounts.
pub async fn seed(db: &Db, settings: &Settings) -> anyhow::Result<()> {
    for site in &settings.sites {
        db.seed_site(&site.name, &site.urls)
            .await
            .with_context(|| format!("Failed to seed site '{}'", site.name))?;
    }
    for admin in &settings.admins {
        db.seed_admin(&admin.name, &admin.email)
            .await
            .with_context(|| format!("Failed to seed admin '{}'", admin.name))?;
    }
    info!(
        "Seeded {} site(s) and {} admin(s)",
        settings.sites.len(),
        settings.admins.len()
    );
    Ok(())
}

pub fn collaborators(settings: &Settings) -> anyhow::Result<Collaborators> {
    let mut c = Collaborators::default();

    let keywords = KeywordsAntiSpam::new(settings.moderator.keywords.iter().cloned());
    if !keywords.is_empty() {
        c.anti_spam = Some(Arc::new(keywords));
    }

    if let Some(url) = settings.notify.webhook_url.as_deref().filter(|u| !u.is_empty()) {
        let notifier =
            WebhookNotifier::new(url, Duration::from_secs(settings.notify.timeout_secs))?;
        c.notifier = Some(Arc::new(notifier));
    }

    if settings.page_fetch.enabled {
        let fetcher = HttpPageFetcher::new(Duration::from_secs(settings.page_fetch.timeout_secs))?;
        c.page_fetcher = Some(Arc::new(fetcher));
    }

    Ok(c)
}

pub fn ip_region(settings: &Settings) -> anyhow::Result<Option<Arc<dyn IpRegionLookup>>> {
    if !settings.ip_region.enabled {
        return Ok(None);
    }
    let precision: RegionPrecision = settings.ip_region.precision.parse()?;
    let table = CidrRegionTable::new(
        settings
            .ip_region
            .rules
            .iter()
            .map(|(cidr, region)| (cidr.as_str(), region.as_str())),
        precision,
    )
    .context("Invalid ip_region rules")?;
    Ok(Some(Arc::new(table)))
}

/// Wires store, pipeline and worker together. The caller decides which
/// collaborators the worker gets so tests can swap in fakes.
pub fn build(settings: &Settings, db: Db, collaborators: Collaborators) -> anyhow::Result<Runtime> {
    let store: Arc<dyn CommentStore> = Arc::new(db);

    let (dispatcher, jobs) = EnrichmentDispatcher::channel(settings.enrichment.queue_capacity);
    let (events, _) = broadcast::channel(100);
    let enricher = Enricher::new(store.clone(), collaborators, events.clone());

    let tokens = TokenAuthority::new(
        &settings.security.app_key,
        Duration::from_secs(settings.security.token_ttl_secs),
    );
    let responder = ResponseEnricher::new(settings.ip_region.enabled, ip_region(settings)?);
    let pipeline = CommentPipeline::new(
        store,
        tokens,
        dispatcher,
        responder,
        PipelineConfig {
            pending_default: settings.moderator.pending_default,
        },
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
        limiter: RateLimiter::new(
            settings.limiter.max_requests,
            Duration::from_secs(settings.limiter.window_secs),
        ),
        trust_proxy: settings.server.trust_proxy,
    };

    Ok(Runtime {
        state,
        enricher,
        jobs,
        events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn settings(toml: &str) -> Settings {
        Settings::defaults()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn collaborators_follow_config() {
        let c = collaborators(&settings("[page_fetch]\nenabled = false")).unwrap();
        assert!(c.anti_spam.is_none());
        assert!(c.notifier.is_none());
        assert!(c.page_fetcher.is_none());

        let c = collaborators(&settings(
            r#"
            [moderator]
            keywords = ["casino"]
            [notify]
            webhook_url = "http://127.0.0.1:9/hook"
            "#,
        ))
        .unwrap();
        assert!(c.anti_spam.is_some());
        assert!(c.notifier.is_some());
        assert!(c.page_fetcher.is_some());
    }

    #[test]
    fn ip_region_requires_valid_rules() {
        assert!(ip_region(&settings("")).unwrap().is_none());

        let bad = settings(
            r#"
            [ip_region]
            enabled = true
            [ip_region.rules]
            "not-a-cidr" = "X"
            "#,
        );
        assert!(ip_region(&bad).is_err());

        let good = settings(
            r#"
            [ip_region]
            enabled = true
            precision = "country"
            [ip_region.rules]
            "203.0.113.0/24" = "Australia,Victoria,Melbourne"
            "#,
        );
        let lookup = ip_region(&good).unwrap().unwrap();
        assert_eq!(lookup.query("203.0.113.9").unwrap(), "Australia");
    }

    #[tokio::test]
    async fn seed_is_idempotent() {
        let db = Db::new("sqlite::memory:").await.unwrap();
        let s = settings(
            r#"
            [[admins]]
            name = "Admin"
            email = "admin@example.com"
            [[sites]]
            name = "demo"
            urls = ["https://blog.example"]
            "#,
        );
        seed(&db, &s).await.unwrap();
        seed(&db, &s).await.unwrap();

        assert_eq!(db.count_users().await.unwrap(), 1);
        assert!(db.is_admin_by_name_email("admin", "ADMIN@example.com").await.unwrap());
        assert!(db.find_site("demo").await.unwrap().is_some());
    }
}
