//! Kubernetes-style HTTP list source
//!
//! Issues `GET <url>?limit=N&continue=T` and reads `items` and
//! `metadata.continue` from the response, the shape used by Kubernetes list
//! endpoints.

use super::types::{ListPage, ListQuery, ListSource};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default timeout for a single upstream list call
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ListBody {
    #[serde(default)]
    items: Vec<Value>,
    #[serde(default)]
    metadata: ListMeta,
}

#[derive(Debug, Default, Deserialize)]
struct ListMeta {
    #[serde(default, rename = "continue")]
    continue_token: Option<String>,
}

/// List source backed by an HTTP list endpoint
#[derive(Debug, Clone)]
pub struct KubeListSource {
    url: Url,
    client: Client,
}

impl KubeListSource {
    /// Create a source for a list endpoint URL
    pub fn new(url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_UPSTREAM_TIMEOUT)
            .user_agent(format!("pagegate/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(url, client)
    }

    /// Create a source with a custom HTTP client
    pub fn with_client(url: &str, client: Client) -> Result<Self> {
        Ok(Self {
            url: Url::parse(url)?,
            client,
        })
    }

    /// The list endpoint
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn request_url(&self, query: &ListQuery) -> Url {
        let mut url = self.url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("limit", &query.limit.to_string());
            if let Some(token) = &query.continue_token {
                pairs.append_pair("continue", token.as_str());
            }
        }
        url
    }
}

#[async_trait]
impl ListSource for KubeListSource {
    async fn list(&self, query: ListQuery) -> Result<ListPage> {
        let url = self.request_url(&query);
        debug!(url = %url, "listing upstream page");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        let body: ListBody = response.json().await?;
        Ok(ListPage {
            items: body.items,
            continue_token: body.metadata.continue_token,
        })
    }
}
