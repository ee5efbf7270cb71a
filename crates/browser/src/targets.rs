//! Target discovery over Chrome's DevTools HTTP endpoint (`/json`).

use reqwest::Client;
use serde::Deserialize;
use sessionbridge_core::{BrowserConfig, Error, Result};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub target_type: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub web_socket_debugger_url: Option<String>,
}

impl TargetInfo {
    pub fn is_page(&self) -> bool {
        self.target_type == "page"
    }
}

/// Handle on a running Chrome's remote-debugging endpoint.
#[derive(Clone)]
pub struct DevtoolsEndpoint {
    base_url: String,
    client: Client,
}

impl DevtoolsEndpoint {
    pub fn new(config: &BrowserConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            base_url: format!("http://{}:{}", config.debug_host, config.debug_port),
            client,
        }
    }

    /// List all debuggable targets.
    pub async fn targets(&self) -> Result<Vec<TargetInfo>> {
        let response = self
            .client
            .get(format!("{}/json", self.base_url))
            .send()
            .await
            .map_err(|e| Error::Cdp(format!("Target list request failed: {}", e)))?;
        response
            .json::<Vec<TargetInfo>>()
            .await
            .map_err(|e| Error::Cdp(format!("Failed to parse target list: {}", e)))
    }

    /// Find a page target by id.
    pub async fn page_by_id(&self, tab_id: &str) -> Result<Option<TargetInfo>> {
        Ok(self
            .targets()
            .await?
            .into_iter()
            .find(|t| t.is_page() && t.id == tab_id))
    }

    /// Find any page target whose URL starts with `url_prefix`, falling back
    /// to any page at all. Cookie reads only need some page session to issue
    /// `Network.getCookies` from; a same-site page keeps the scope honest.
    pub async fn page_for_scope(&self, url_prefix: &str) -> Result<Option<TargetInfo>> {
        let pages: Vec<TargetInfo> = self
            .targets()
            .await?
            .into_iter()
            .filter(TargetInfo::is_page)
            .collect();
        let scoped = pages.iter().find(|t| t.url.starts_with(url_prefix)).cloned();
        Ok(scoped.or_else(|| pages.into_iter().next()))
    }
}
