use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The cookie capability returned nothing for a platform/URL scope,
    /// typically because the user is not logged in on that platform.
    #[error("Cookie '{name}' not found for {url}")]
    CookieNotFound { name: String, url: String },

    /// The bullhorn identity cookie was present but could not be parsed.
    #[error("Malformed identity cookie: {0}")]
    MalformedIdentityCookie(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("CDP error: {0}")]
    Cdp(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
