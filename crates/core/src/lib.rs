pub mod config;
pub mod error;
pub mod paths;
pub mod types;

pub use config::{BrowserConfig, Config, WebhookConfig};
pub use error::{Error, Result};
pub use paths::Paths;
pub use types::{
    CookieEntry, CookieSpec, Platform, PlatformRecord, RawCookie, TabEvent, TabStatus,
};
