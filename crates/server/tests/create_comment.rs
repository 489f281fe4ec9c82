use adapter::{AntiSpam, Collaborators, Notifier, SpamVerdict};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use config::{File, FileFormat};
use domain::{AntiSpamCheckPayload, Comment, EnrichmentEvent, NotifyOutcome, SpamOutcome};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storage::Db;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use parley::app;
use parley::auth::TokenAuthority;
use parley::config::Settings;
use parley::http::router::build_router;

const SETTINGS: &str = r#"
[security]
app_key = "integration-key"

[page_fetch]
enabled = false

[[admins]]
name = "Admin"
email = "admin@example.com"

[[sites]]
name = "demo"
urls = ["https://blog.example"]
"#;

#[derive(Default)]
struct Recorder {
    spam_checked: Mutex<Vec<i64>>,
    notified: Mutex<Vec<(i64, Option<i64>)>>,
}

#[async_trait]
impl AntiSpam for Recorder {
    async fn check(&self, payload: &AntiSpamCheckPayload<'_>) -> anyhow::Result<SpamVerdict> {
        self.spam_checked.lock().unwrap().push(payload.comment.id);
        if payload.comment.content.contains("casino") {
            return Ok(SpamVerdict::Spam {
                reason: "keyword".into(),
            });
        }
        Ok(SpamVerdict::Clean)
    }
}

#[async_trait]
impl Notifier for Recorder {
    async fn push(&self, comment: &Comment, parent: Option<&Comment>) -> anyhow::Result<()> {
        self.notified
            .lock()
            .unwrap()
            .push((comment.id, parent.map(|p| p.id)));
        Ok(())
    }
}

struct TestApp {
    router: Router,
    db: Db,
    recorder: Arc<Recorder>,
    events: broadcast::Receiver<EnrichmentEvent>,
    tokens: TokenAuthority,
    cancel: CancellationToken,
}

impl TestApp {
    async fn new(extra: &str) -> Self {
        let settings: Settings = Settings::defaults()
            .unwrap()
            .add_source(File::from_str(SETTINGS, FileFormat::Toml))
            .add_source(File::from_str(extra, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        let db = Db::new("sqlite::memory:").await.unwrap();
        app::seed(&db, &settings).await.unwrap();

        let recorder = Arc::new(Recorder::default());
        let collaborators = Collaborators {
            anti_spam: Some(recorder.clone() as Arc<dyn AntiSpam>),
            notifier: Some(recorder.clone() as Arc<dyn Notifier>),
            page_fetcher: None,
        };
        let runtime = app::build(&settings, db.clone(), collaborators).unwrap();
        let events = runtime.events.subscribe();

        let cancel = CancellationToken::new();
        tokio::spawn(adapter::start_with_cancel_token(
            runtime.enricher,
            runtime.jobs,
            2,
            cancel.clone(),
        ));

        Self {
            router: build_router(runtime.state, "*"),
            db,
            recorder,
            events,
            tokens: TokenAuthority::new(
                &settings.security.app_key,
                Duration::from_secs(settings.security.token_ttl_secs),
            ),
            cancel,
        }
    }

    async fn post(&self, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.post_raw(body.to_string(), token).await
    }

    async fn post_raw(&self, body: String, token: Option<&str>) -> (StatusCode, Value) {
        let mut req = Request::builder()
            .method("POST")
            .uri("/comments")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, "integration-test");
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let resp = self
            .router
            .clone()
            .oneshot(req.body(Body::from(body)).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn next_event(&mut self) -> EnrichmentEvent {
        tokio::time::timeout(Duration::from_secs(5), self.events.recv())
            .await
            .expect("enrichment event")
            .unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn comment(name: &str, email: &str, content: &str) -> Value {
    json!({
        "name": name,
        "email": email,
        "content": content,
        "page_key": "/post/1",
        "site_name": "demo",
    })
}

#[tokio::test]
async fn anonymous_comment_is_created_and_cooked() {
    let mut app = TestApp::new("").await;

    let (status, body) = app.post(comment("Bob", "bob@example.com", "hi"), None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["content"], "hi");
    assert_eq!(body["rid"], 0);
    assert_eq!(body["root_id"], 0);
    assert_eq!(body["nick"], "Bob");
    assert_eq!(body["ua"], "integration-test");
    assert_eq!(body["page_url"], "https://blog.example/post/1");
    assert!(body.get("ip").is_none());

    let id = body["id"].as_i64().unwrap();
    let stored = app.db.find_comment(id).await.unwrap().unwrap();
    assert_eq!(stored.content, "hi");

    match app.next_event().await {
        EnrichmentEvent::Processed {
            comment_id,
            spam,
            notify,
            ..
        } => {
            assert_eq!(comment_id, id);
            assert_eq!(spam, SpamOutcome::Clean);
            assert_eq!(notify, NotifyOutcome::Sent);
        }
    }
}

#[tokio::test]
async fn reply_to_missing_parent_is_not_found() {
    let app = TestApp::new("").await;

    let mut body = comment("Bob", "bob@example.com", "hi");
    body["rid"] = json!(999_999);
    let (status, resp) = app.post(body, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(resp["msg"].as_str().unwrap().contains("not found"));
    assert_eq!(app.db.count_comments().await.unwrap(), 0);
}

#[tokio::test]
async fn admin_only_page_rejects_anonymous_poster() {
    let app = TestApp::new("").await;
    let page = app.db.find_create_page("/post/1", "", "demo").await.unwrap();
    app.db.set_page_admin_only(page.id, true).await.unwrap();

    let (status, body) = app.post(comment("Bob", "bob@example.com", "hi"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["need_login"], true);
    assert_eq!(app.db.count_comments().await.unwrap(), 0);

    let admin = app
        .db
        .seed_admin("Admin", "admin@example.com")
        .await
        .unwrap();
    let token = app.tokens.issue(admin.id);
    let (status, _) = app
        .post(comment("Admin", "admin@example.com", "hi"), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn repeat_poster_reuses_user() {
    let app = TestApp::new("").await;

    let (s1, first) = app.post(comment("Bob", "bob@example.com", "one"), None).await;
    let (s2, second) = app.post(comment("bob", "BOB@example.com", "two"), None).await;
    assert_eq!(s1, StatusCode::OK);
    assert_eq!(s2, StatusCode::OK);
    assert_eq!(first["user_id"], second["user_id"]);

    // the seeded admin plus Bob
    assert_eq!(app.db.count_users().await.unwrap(), 2);
}

#[tokio::test]
async fn spam_check_skips_admin_but_notify_does_not() {
    let mut app = TestApp::new("").await;
    let admin = app
        .db
        .seed_admin("Admin", "admin@example.com")
        .await
        .unwrap();
    let token = app.tokens.issue(admin.id);

    let (_, root) = app
        .post(comment("Admin", "admin@example.com", "welcome"), Some(&token))
        .await;
    let root_id = root["id"].as_i64().unwrap();
    app.next_event().await;

    let mut reply = comment("Eve", "eve@example.com", "visit my casino");
    reply["rid"] = json!(root_id);
    let (status, body) = app.post(reply, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["root_id"], root_id);
    let reply_id = body["id"].as_i64().unwrap();

    match app.next_event().await {
        EnrichmentEvent::Processed { spam, .. } => assert_eq!(spam, SpamOutcome::Blocked),
    }

    assert_eq!(*app.recorder.spam_checked.lock().unwrap(), vec![reply_id]);
    assert_eq!(
        *app.recorder.notified.lock().unwrap(),
        vec![(root_id, None), (reply_id, Some(root_id))]
    );
    assert!(app.db.find_comment(reply_id).await.unwrap().unwrap().is_pending);
}

#[tokio::test]
async fn invalid_input_is_bad_request() {
    let app = TestApp::new("").await;

    let (status, body) = app.post(comment("Bob", "not-an-email", "hi"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["msg"].is_string());

    let (status, body) = app.post(comment("Bob", "bób@exämple.com", "hi"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Invalid Email");

    let (status, _) = app.post_raw("{not json".into(), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut other_site = comment("Bob", "bob@example.com", "hi");
    other_site["site_name"] = json!("nowhere");
    let (status, _) = app.post(other_site, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.db.count_comments().await.unwrap(), 0);
}

#[tokio::test]
async fn bad_token_asks_for_login() {
    let app = TestApp::new("").await;
    let forged = TokenAuthority::new("someone-else", Duration::from_secs(60)).issue(1);

    let (status, body) = app
        .post(comment("Bob", "bob@example.com", "hi"), Some(&forged))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["need_auth_login"], true);
    assert_eq!(app.db.count_comments().await.unwrap(), 0);
}

#[tokio::test]
async fn limiter_rejects_burst() {
    let app = TestApp::new("[limiter]\nmax_requests = 1").await;

    let (first, _) = app.post(comment("Bob", "bob@example.com", "one"), None).await;
    let (second, body) = app.post(comment("Bob", "bob@example.com", "two"), None).await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["msg"].is_string());
}
