use std::sync::Arc;

use crate::limiter::RateLimiter;
use crate::pipeline::CommentPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<CommentPipeline>,
    pub limiter: RateLimiter,
    pub trust_proxy: bool,
}
