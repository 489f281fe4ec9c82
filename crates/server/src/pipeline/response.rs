use adapter::IpRegionLookup;
use domain::CookedComment;
use std::sync::Arc;
use tracing::error;

/// Adds presentation-only data to the response. Never fails.
#[derive(Clone)]
pub struct ResponseEnricher {
    ip_region_enabled: bool,
    ip_region: Option<Arc<dyn IpRegionLookup>>,
}

impl ResponseEnricher {
    pub fn new(ip_region_enabled: bool, ip_region: Option<Arc<dyn IpRegionLookup>>) -> Self {
        Self {
            ip_region_enabled,
            ip_region,
        }
    }

    pub fn enrich(&self, mut cooked: CookedComment) -> CookedComment {
        if !self.ip_region_enabled {
            return cooked;
        }
        match &self.ip_region {
            Some(lookup) => match lookup.query(&cooked.ip) {
                Ok(region) => cooked.ip_region = region,
                Err(e) => error!("[IPRegion] query {} failed: {:?}", cooked.ip, e),
            },
            None => error!("[IPRegion] enabled but no region table is configured"),
        }
        cooked
    }
}
