mod commands;
mod error;
mod events;
mod models;
pub mod protocol;

pub use commands::{AntiSpamCheckPayload, CreateCommentParams, EnrichmentJob, RequestMeta};
pub use error::CommentError;
pub use events::{EnrichmentEvent, NotifyOutcome, SpamOutcome};
pub use models::{Comment, CookedComment, CookedPage, NewComment, Page, Site, User};
