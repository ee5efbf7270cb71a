use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Reserved field name for the linkedin profile identifier. Lives alongside
/// cookie fields inside the linkedin platform record.
pub const PUBLIC_IDENTIFIER_FIELD: &str = "publicIdentifier";

/// Cookies tracked per platform, with the URL scope used to retrieve them.
pub const LINKEDIN_COOKIE_URL: &str = "https://www.linkedin.com/";
pub const BULLHORN_COOKIE_URL: &str = "https://app.bullhornstaffing.com/";
pub const LINKEDIN_SESSION_COOKIE: &str = "li_at";
pub const LINKEDIN_LANG_COOKIE: &str = "lang";
pub const BULLHORN_IDENTITY_COOKIE: &str = "UlEncodedIdentity";

/// One of the two external services tracked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linkedin,
    Bullhorn,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Linkedin, Platform::Bullhorn];

    /// Storage key for this platform's record.
    pub fn key(&self) -> &'static str {
        match self {
            Platform::Linkedin => "linkedin",
            Platform::Bullhorn => "bullhorn",
        }
    }

    /// Cookie specs synced when a page of this platform finishes loading.
    pub fn tracked_cookies(&self) -> Vec<CookieSpec> {
        match self {
            Platform::Linkedin => vec![
                CookieSpec::new(LINKEDIN_SESSION_COOKIE, LINKEDIN_COOKIE_URL),
                CookieSpec::new(LINKEDIN_LANG_COOKIE, LINKEDIN_COOKIE_URL),
            ],
            Platform::Bullhorn => vec![CookieSpec::new(
                BULLHORN_IDENTITY_COOKIE,
                BULLHORN_COOKIE_URL,
            )],
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Name + URL scope handed to the cookie-access capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSpec {
    pub name: String,
    pub url: String,
}

impl CookieSpec {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// Cookie as returned by the cookie-access capability. `expiration_date` is
/// Chrome's float seconds since epoch; session cookies report `-1`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCookie {
    pub value: String,
    #[serde(default, rename = "expires")]
    pub expiration_date: Option<f64>,
}

impl RawCookie {
    /// Expiry as epoch milliseconds, the representation used in storage.
    /// Session cookies (no expiry, or Chrome's `-1` sentinel) yield `None`.
    pub fn expires_at_millis(&self) -> Option<i64> {
        self.expiration_date
            .filter(|secs| *secs > 0.0)
            .map(|secs| (secs * 1000.0) as i64)
    }
}

/// A stored cookie or identifier value. `value` is the raw string exactly as
/// retrieved; normalization happens only at dispatch time. Timestamps are
/// epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CookieEntry {
    pub value: String,
    pub expires_at: Option<i64>,
    pub stored_at: i64,
}

impl CookieEntry {
    pub fn new(value: String, expires_at: Option<i64>) -> Self {
        Self {
            value,
            expires_at,
            stored_at: now_millis(),
        }
    }

    /// Entry for the profile identifier. Identifiers don't expire.
    pub fn identifier(value: String) -> Self {
        Self::new(value, None)
    }
}

/// Persisted record for one platform: field name -> entry. An absent platform
/// key in storage is treated as an empty record, never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PlatformRecord {
    pub fields: HashMap<String, CookieEntry>,
}

impl PlatformRecord {
    /// Membership predicate over the record's field names.
    pub fn has_field(&self, field_name: &str) -> bool {
        self.fields.contains_key(field_name)
    }

    pub fn get(&self, field_name: &str) -> Option<&CookieEntry> {
        self.fields.get(field_name)
    }

    pub fn insert(&mut self, field_name: &str, entry: CookieEntry) {
        self.fields.insert(field_name.to_string(), entry);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Page-load signal consumed from the browser: emitted when a tab reaches
/// `status == "complete"` on some URL.
#[derive(Debug, Clone)]
pub struct TabEvent {
    pub tab_id: String,
    pub status: TabStatus,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabStatus {
    Loading,
    Complete,
}

/// Current time as epoch milliseconds, the canonical timestamp representation
/// for stored entries.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
