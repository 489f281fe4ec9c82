use config::{builder::DefaultState, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub security: SecuritySettings,
    pub moderator: ModeratorSettings,
    pub ip_region: IpRegionSettings,
    pub notify: NotifySettings,
    pub page_fetch: PageFetchSettings,
    pub enrichment: EnrichmentSettings,
    pub limiter: LimiterSettings,
    #[serde(default)]
    pub admins: Vec<AdminSettings>,
    #[serde(default)]
    pub sites: Vec<SiteSettings>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
    /// Take the client IP from `X-Forwarded-For` / `X-Real-IP`.
    pub trust_proxy: bool,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SecuritySettings {
    /// HMAC key for session tokens.
    pub app_key: String,
    pub token_ttl_secs: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ModeratorSettings {
    /// New comments from non-admins wait for approval.
    pub pending_default: bool,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct IpRegionSettings {
    pub enabled: bool,
    pub precision: String,
    /// CIDR -> "Country,Province,City"
    #[serde(default)]
    pub rules: HashMap<String, String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct NotifySettings {
    pub webhook_url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PageFetchSettings {
    pub enabled: bool,
    pub timeout_secs: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct EnrichmentSettings {
    pub queue_capacity: usize,
    pub workers: usize,
}

#[derive(Deserialize, Clone, Debug)]
pub struct LimiterSettings {
    /// 0 disables the limiter.
    pub max_requests: u32,
    pub window_secs: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AdminSettings {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SiteSettings {
    pub name: String,
    #[serde(default)]
    pub urls: Vec<String>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let s = Self::defaults()?
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name(&format!("config.{}", run_mode)).required(false))
            .add_source(
                Environment::with_prefix("PARLEY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("moderator.keywords"),
            )
            .build()?;

        s.try_deserialize()
    }

    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.cors_origins", "*")?
            .set_default("server.trust_proxy", false)?
            .set_default("database.url", "sqlite://data/parley.db")?
            .set_default("security.app_key", "change_me_please")?
            .set_default("security.token_ttl_secs", 60 * 60 * 24 * 30)?
            .set_default("moderator.pending_default", false)?
            .set_default("ip_region.enabled", false)?
            .set_default("ip_region.precision", "province")?
            .set_default("notify.timeout_secs", 10)?
            .set_default("page_fetch.enabled", true)?
            .set_default("page_fetch.timeout_secs", 5)?
            .set_default("enrichment.queue_capacity", 256)?
            .set_default("enrichment.workers", 4)?
            .set_default("limiter.max_requests", 30)?
            .set_default("limiter.window_secs", 60)
    }
}
