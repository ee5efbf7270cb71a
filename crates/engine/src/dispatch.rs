//! Notification dispatcher.
//!
//! Joins the bullhorn CRM identity, the linkedin profile identifier and the
//! changed cookie into one payload and POSTs it to the configured webhook.
//! The join is intentional: dispatch reads both platform records from
//! storage, and is withheld (a logged no-op, never an error) until the
//! bullhorn identity — and, under the strict flag, the linkedin public
//! identifier — is present. Transport is fire-and-forget: a failed POST is
//! logged and dropped, the next detected change rebuilds the payload from
//! current state anyway.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use sessionbridge_core::types::{BULLHORN_IDENTITY_COOKIE, PUBLIC_IDENTIFIER_FIELD};
use sessionbridge_core::{CookieEntry, Platform, Result, WebhookConfig};
use sessionbridge_storage::StateStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::codec::{extract_identity_username, extract_locale_code};
use crate::sync::NotificationSink;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CookiePayload {
    pub name: String,
    pub value: String,
    pub expires_at: Option<i64>,
    pub stored_at: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NotificationPayload {
    pub username: String,
    pub linkedin_public_identifier: String,
    pub cookie: CookiePayload,
}

pub struct WebhookNotifier {
    config: WebhookConfig,
    store: Arc<StateStore>,
    client: Client,
}

impl WebhookNotifier {
    pub fn new(config: WebhookConfig, store: Arc<StateStore>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            config,
            store,
            client,
        }
    }

    /// Build the payload for a changed cookie, or `None` when a precondition
    /// fails: no bullhorn identity yet, no public identifier under the strict
    /// flag, or an unparsable identity cookie. All three are logged no-ops.
    pub async fn build_payload(
        &self,
        cookie_name: &str,
        entry: &CookieEntry,
    ) -> Result<Option<NotificationPayload>> {
        let bullhorn = self.store.read_platform(Platform::Bullhorn).await?;
        let identity = bullhorn
            .as_ref()
            .and_then(|record| record.get(BULLHORN_IDENTITY_COOKIE))
            .filter(|e| !e.value.is_empty());
        let Some(identity) = identity else {
            info!(cookie = %cookie_name, "CRM identity not yet available, withholding notification");
            return Ok(None);
        };

        let linkedin = self.store.read_platform(Platform::Linkedin).await?;
        let public_identifier = linkedin
            .as_ref()
            .and_then(|record| record.get(PUBLIC_IDENTIFIER_FIELD))
            .map(|e| e.value.clone())
            .filter(|v| !v.is_empty());
        let linkedin_public_identifier = match public_identifier {
            Some(value) => value,
            None if self.config.require_public_identifier => {
                info!(cookie = %cookie_name, "Public identifier not yet available, withholding notification");
                return Ok(None);
            }
            None => String::new(),
        };

        let username = match extract_identity_username(&identity.value) {
            Ok(username) => username,
            Err(e) => {
                warn!(error = %e, "Identity cookie unparsable, withholding notification");
                return Ok(None);
            }
        };

        // The lang cookie is the one value normalized at dispatch time.
        let value = if cookie_name == "lang" {
            extract_locale_code(&entry.value)
        } else {
            entry.value.clone()
        };

        Ok(Some(NotificationPayload {
            username,
            linkedin_public_identifier,
            cookie: CookiePayload {
                name: cookie_name.to_string(),
                value,
                expires_at: entry.expires_at,
                stored_at: entry.stored_at,
            },
        }))
    }

    /// Dispatch a changed cookie to the webhook. Precondition failures and
    /// transport failures are logged, never surfaced to the caller.
    pub async fn dispatch(&self, cookie_name: &str, entry: &CookieEntry) -> Result<()> {
        let Some(payload) = self.build_payload(cookie_name, entry).await? else {
            return Ok(());
        };

        let Some(endpoint) = self.config.endpoint.as_deref() else {
            debug!(cookie = %cookie_name, "No webhook endpoint configured, dropping notification");
            return Ok(());
        };

        match self.client.post(endpoint).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                info!(cookie = %cookie_name, status = %response.status(), "Notification delivered");
            }
            Ok(response) => {
                warn!(cookie = %cookie_name, status = %response.status(), "Webhook rejected notification, not retrying");
            }
            Err(e) => {
                warn!(cookie = %cookie_name, error = %e, "Webhook request failed, not retrying");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for WebhookNotifier {
    async fn notify(&self, cookie_name: &str, entry: &CookieEntry) {
        // Storage read failures during dispatch are terminal for this
        // notification attempt only.
        if let Err(e) = self.dispatch(cookie_name, entry).await {
            warn!(cookie = %cookie_name, error = %e, "Notification dispatch failed");
        }
    }
}
