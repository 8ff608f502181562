//! # Lookup Configuration
//!
//! The `[lookup]` section of `scanner.toml`.
//!
//! ```toml
//! [lookup]
//! url_template = "https://products.example.com/api/v1/{sku}.json"
//! timeout_secs = 10
//! user_agent = "stockscan/0.1"
//! ```
//!
//! Without a `url_template` enrichment still runs, but against
//! [`NoLookup`], which never adds metadata.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EnrichError, EnrichResult};
use crate::http::{expand, HttpLookup};
use crate::lookup::{NoLookup, ProductLookup};

/// Placeholder replaced by the scanned SKU.
pub const SKU_PLACEHOLDER: &str = "{sku}";

/// Lookup service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Endpoint URL with a `{sku}` placeholder. `None` disables lookups.
    #[serde(default)]
    pub url_template: Option<String>,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("stockscan/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for LookupConfig {
    fn default() -> Self {
        LookupConfig {
            url_template: None,
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl LookupConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Checks the settings without building a client.
    pub fn validate(&self) -> EnrichResult<()> {
        if self.timeout_secs == 0 {
            return Err(EnrichError::InvalidConfig(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        if let Some(template) = &self.url_template {
            if !template.contains(SKU_PLACEHOLDER) {
                return Err(EnrichError::InvalidConfig(format!(
                    "url_template must contain {SKU_PLACEHOLDER}"
                )));
            }
            let url = expand(template, "sku")?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(EnrichError::InvalidConfig(
                    "url_template must be an http(s) URL".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Builds the configured lookup: HTTP when a template is set, otherwise
    /// [`NoLookup`].
    pub fn build_lookup(&self) -> EnrichResult<Arc<dyn ProductLookup>> {
        self.validate()?;
        match &self.url_template {
            Some(_) => Ok(Arc::new(HttpLookup::new(self)?)),
            None => Ok(Arc::new(NoLookup)),
        }
    }
}
