mod drivers;
mod enrichment;
mod store;
mod traits;

pub use drivers::antispam::KeywordsAntiSpam;
pub use drivers::ip_region::{CidrRegionTable, RegionPrecision};
pub use drivers::notify::WebhookNotifier;
pub use drivers::page_fetch::HttpPageFetcher;
pub use enrichment::{start_with_cancel_token, Collaborators, EnrichmentDispatcher, Enricher};
pub use traits::{AntiSpam, CommentStore, IpRegionLookup, Notifier, PageFetcher, SpamVerdict};
