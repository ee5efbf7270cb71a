//! Cookie-access and in-page extraction capabilities backed by CDP.

use async_trait::async_trait;
use sessionbridge_core::{CookieSpec, Error, RawCookie, Result};
use sessionbridge_engine::{CookieSource, IdentifierSource};
use tracing::debug;

use crate::cdp::CdpClient;
use crate::targets::DevtoolsEndpoint;

/// JavaScript mirror of the in-page scrape: linkedin embeds profile data as
/// JSON inside `<code>` elements; the last `publicIdentifier` match wins,
/// empty string when absent.
const PUBLIC_IDENTIFIER_SCRAPE: &str = r#"
(() => {
  const re = /"publicIdentifier":"([\w.\-]+)"/;
  let result = "";
  document.querySelectorAll("code").forEach((node) => {
    const m = node.textContent.match(re);
    if (m) { result = m[1]; }
  });
  return result;
})()
"#;

/// CDP-backed implementation of the capability seams the engine consumes.
/// Connections are per-call: the daemon reads a handful of cookies every few
/// seconds at most.
pub struct CdpCapabilities {
    endpoint: DevtoolsEndpoint,
}

impl CdpCapabilities {
    pub fn new(endpoint: DevtoolsEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl CookieSource for CdpCapabilities {
    async fn get(&self, spec: &CookieSpec) -> Result<Option<RawCookie>> {
        let Some(target) = self.endpoint.page_for_scope(&spec.url).await? else {
            return Err(Error::Cdp("No debuggable page target available".to_string()));
        };
        let Some(ws_url) = target.web_socket_debugger_url.as_deref() else {
            return Err(Error::Cdp(format!(
                "Target {} has no debugger URL (another client attached?)",
                target.id
            )));
        };

        let client = CdpClient::connect(ws_url).await?;
        let cookies = client.get_cookies(&[spec.url.as_str()]).await?;
        let cookie = cookies
            .into_iter()
            .find(|c| c.get("name").and_then(|n| n.as_str()) == Some(spec.name.as_str()));

        match cookie {
            Some(value) => {
                let raw: RawCookie = serde_json::from_value(value)
                    .map_err(|e| Error::Cdp(format!("Unexpected cookie shape: {}", e)))?;
                Ok(Some(raw))
            }
            None => {
                debug!(cookie = %spec.name, url = %spec.url, "Cookie absent from browser jar");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl IdentifierSource for CdpCapabilities {
    async fn public_identifier(&self, tab_id: &str) -> Result<String> {
        let Some(target) = self.endpoint.page_by_id(tab_id).await? else {
            // Tab closed between the event and the scrape.
            return Ok(String::new());
        };
        let Some(ws_url) = target.web_socket_debugger_url.as_deref() else {
            return Err(Error::Cdp(format!(
                "Target {} has no debugger URL (another client attached?)",
                target.id
            )));
        };

        let client = CdpClient::connect(ws_url).await?;
        let value = client.evaluate(PUBLIC_IDENTIFIER_SCRAPE).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }
}
