//! Synchronous comment creation: everything the client waits for.
//!
//! Order: input checks, site, page, session token, permission gate, reply
//! target, poster identity, root id, assembly, persistence. Background
//! enrichment is handed off after the insert and the response is cooked
//! without waiting for it.

mod assemble;
mod identity;
mod permission;
mod reply;
mod response;

use adapter::{CommentStore, EnrichmentDispatcher};
use domain::{protocol, CommentError, CookedComment, CreateCommentParams, EnrichmentJob, RequestMeta};
use std::sync::Arc;

use crate::auth::TokenAuthority;

pub use assemble::CommentDraft;
pub use identity::Credentials;
pub use response::ResponseEnricher;

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineConfig {
    /// Non-admin comments start out pending.
    pub pending_default: bool,
}

pub struct CommentPipeline {
    store: Arc<dyn CommentStore>,
    tokens: TokenAuthority,
    dispatcher: EnrichmentDispatcher,
    responder: ResponseEnricher,
    config: PipelineConfig,
}

impl CommentPipeline {
    pub fn new(
        store: Arc<dyn CommentStore>,
        tokens: TokenAuthority,
        dispatcher: EnrichmentDispatcher,
        responder: ResponseEnricher,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            tokens,
            dispatcher,
            responder,
            config,
        }
    }

    pub async fn create(
        &self,
        p: CreateCommentParams,
        meta: RequestMeta,
    ) -> Result<CookedComment, CommentError> {
        protocol::validate_params(&p)?;

        let store = self.store.as_ref();
        let site = store
            .find_site(&p.site_name)
            .await
            .map_err(|e| CommentError::internal("find site", e))?
            .ok_or_else(|| CommentError::Validation(format!("Site '{}' not found", p.site_name)))?;

        let ip = meta.ip;
        // client-corrected ua replaces the header unchecked, so it is spoofable
        let ua = if p.ua.is_empty() { meta.user_agent } else { p.ua.clone() };

        let page = store
            .find_create_page(&p.page_key, &p.page_title, &p.site_name)
            .await
            .map_err(|e| CommentError::internal("find or create page", e))?;

        let credentials =
            identity::resolve_credentials(store, &self.tokens, meta.token.as_deref()).await?;
        let is_admin = credentials.is_admin();

        permission::check_allow_comment(store, &p.name, &p.email, page.admin_only, &credentials)
            .await?;

        let parent = reply::validate_reply_target(store, p.rid, &p.page_key).await?;
        let rid = parent.as_ref().map_or(0, |c| c.id);

        let (user, is_verified) = identity::resolve_poster(store, credentials, &p, &ip, &ua).await?;

        let root_id = store
            .find_comment_root_id(rid)
            .await
            .map_err(|e| CommentError::internal("find root id", e))?;

        let draft = CommentDraft {
            params: &p,
            page: &page,
            user: &user,
            ip: &ip,
            ua: &ua,
            rid,
            root_id,
            is_verified,
            is_admin,
        }
        .assemble(self.config.pending_default);

        let comment = store
            .create_comment(&draft)
            .await
            .map_err(|e| CommentError::internal("save comment", e))?;

        let cooked_page = page.cook(Some(&site));
        let cooked = comment.cook(&user, &cooked_page.url);

        self.dispatcher.dispatch(EnrichmentJob {
            comment,
            parent,
            page,
            page_url: cooked_page.url,
            is_admin,
            req_ip: ip,
            req_user_agent: ua,
            req_referer: meta.referer,
        });

        Ok(self.responder.enrich(cooked))
    }
}
