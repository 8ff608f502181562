//! HTTP adapter for [`ProductLookup`].
//!
//! GETs the configured URL template with the SKU substituted and decodes the
//! body as a JSON [`ProductInfo`]. Unknown fields are ignored and missing
//! ones stay `None`.
//!
//! The SKU is percent-encoded before substitution, so `/`, `?`, `#` and the
//! GS separator of GS1 codes stay inside the path segment or query value
//! that holds the placeholder.

use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use stockscan_core::ProductInfo;
use tracing::debug;
use url::{form_urlencoded, Url};

use crate::config::{LookupConfig, SKU_PLACEHOLDER};
use crate::error::{EnrichError, EnrichResult};
use crate::lookup::ProductLookup;

/// Product lookup over HTTP.
#[derive(Debug, Clone)]
pub struct HttpLookup {
    client: reqwest::Client,
    url_template: String,
}

impl HttpLookup {
    /// Builds a client from the `[lookup]` settings.
    ///
    /// ## Errors
    /// [`EnrichError::InvalidConfig`] when no URL template is set or it does
    /// not parse as a URL.
    pub fn new(config: &LookupConfig) -> EnrichResult<Self> {
        let url_template = config
            .url_template
            .clone()
            .ok_or_else(|| EnrichError::InvalidConfig("url_template is not set".to_string()))?;
        expand(&url_template, "sku")?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(HttpLookup {
            client,
            url_template,
        })
    }

    fn url_for(&self, sku: &str) -> EnrichResult<Url> {
        expand(&self.url_template, sku)
    }
}

/// Substitutes every placeholder in `template` with the encoded SKU.
pub(crate) fn expand(template: &str, sku: &str) -> EnrichResult<Url> {
    // form encoding writes spaces as '+'; a literal '+' is already %2B
    let encoded = form_urlencoded::byte_serialize(sku.as_bytes())
        .collect::<String>()
        .replace('+', "%20");

    Url::parse(&template.replace(SKU_PLACEHOLDER, &encoded))
        .map_err(|e| EnrichError::InvalidConfig(format!("invalid lookup URL: {e}")))
}

#[async_trait]
impl ProductLookup for HttpLookup {
    async fn lookup(&self, sku: &str, force_refresh: bool) -> EnrichResult<ProductInfo> {
        let url = self.url_for(sku)?;
        debug!(sku = %sku, url = %url, force_refresh, "Looking up product");

        let mut request = self.client.get(url);
        if force_refresh {
            request = request.header(CACHE_CONTROL, "no-cache");
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::HttpStatus(status.as_u16()));
        }

        response
            .json::<ProductInfo>()
            .await
            .map_err(|e| EnrichError::InvalidResponse(e.to_string()))
    }
}
