//! Process configuration read from the environment.

use std::net::SocketAddr;

use storefront_catalog::{CatalogSettings, SegmentLength, SeoSettings, SkuPolicy};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub catalog: CatalogSettings,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            catalog: CatalogSettings {
                seo: SeoSettings::new(DEFAULT_BASE_URL),
                sku_policy: SkuPolicy::default(),
            },
        }
    }
}

impl ApiConfig {
    /// Read `STOREFRONT_BASE_URL`, `BIND_ADDR` and `SKU_SEGMENT_LENGTH`.
    ///
    /// Invalid values are logged and replaced by their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(base_url) = lookup("STOREFRONT_BASE_URL").filter(|v| !v.trim().is_empty()) {
            config.catalog.seo = SeoSettings::new(base_url);
        }

        if let Some(raw) = lookup("BIND_ADDR") {
            match raw.trim().parse::<SocketAddr>() {
                Ok(addr) => config.bind_addr = addr,
                Err(e) => tracing::warn!(
                    value = %raw,
                    error = %e,
                    "invalid BIND_ADDR; using {DEFAULT_BIND_ADDR}"
                ),
            }
        }

        if let Some(raw) = lookup("SKU_SEGMENT_LENGTH") {
            match raw.parse::<SegmentLength>() {
                Ok(segment) => config.catalog.sku_policy.segment = segment,
                Err(e) => tracing::warn!(
                    value = %raw,
                    error = %e,
                    "invalid SKU_SEGMENT_LENGTH; keeping default"
                ),
            }
        }

        config
    }
}
