//! Cookie codec: pure parsers for the platform-specific cookie encodings.
//!
//! Raw values are stored exactly as retrieved; these functions run only at
//! dispatch time to normalize values for the webhook payload.

use once_cell::sync::Lazy;
use regex::Regex;
use sessionbridge_core::{Error, Result};

/// `%22`-delimited tokens inside the percent-encoded identity cookie. The
/// cookie is a URL-encoded JSON-ish structure, so quoted keys and values
/// alternate through the match stream.
static IDENTITY_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%22([A-Za-z0-9_.\-]+)%22").expect("identity token regex is valid"));

/// Extract the CRM username from the bullhorn identity cookie.
///
/// Scans the quoted-token stream for the literal token `username` and returns
/// the token immediately following it. The scan is bounded by the token
/// stream; exhaustion is an explicit error, never an index panic.
pub fn extract_identity_username(raw_encoded_identity: &str) -> Result<String> {
    let mut tokens = IDENTITY_TOKEN
        .captures_iter(raw_encoded_identity)
        .map(|c| c[1].to_string());

    while let Some(token) = tokens.next() {
        if token == "username" {
            return tokens.next().ok_or_else(|| {
                Error::MalformedIdentityCookie(
                    "no token follows the username marker".to_string(),
                )
            });
        }
    }
    Err(Error::MalformedIdentityCookie(
        "username token not present".to_string(),
    ))
}

/// Extract the locale code from the linkedin `lang` cookie
/// (format `v=<n>&lang=<ll>-<CC>`): substring after the last `-`, lowercased.
/// A value with no `-` yields an empty string; degraded, not an error.
pub fn extract_locale_code(raw_lang_cookie_value: &str) -> String {
    match raw_lang_cookie_value.rfind('-') {
        Some(idx) => raw_lang_cookie_value[idx + 1..].to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_token_is_followed_by_value() {
        let raw = "%7B%22identity%22%3A%7B%22username%22%3A%22alice.smith%22%2C%22masterUserId%22%3A%2242%22%7D%7D";
        assert_eq!(extract_identity_username(raw).unwrap(), "alice.smith");
    }

    #[test]
    fn username_anywhere_in_token_stream() {
        let raw = "%22name%22%3A%22Alice%22%2C%22username%22%3A%22a.smith%22";
        assert_eq!(extract_identity_username(raw).unwrap(), "a.smith");
    }

    #[test]
    fn missing_username_is_malformed_not_a_panic() {
        let raw = "%7B%22identity%22%3A%7B%22userId%22%3A%2242%22%7D%7D";
        assert!(matches!(
            extract_identity_username(raw),
            Err(Error::MalformedIdentityCookie(_))
        ));
    }

    #[test]
    fn username_as_final_token_is_malformed() {
        let raw = "%22username%22";
        assert!(matches!(
            extract_identity_username(raw),
            Err(Error::MalformedIdentityCookie(_))
        ));
    }

    #[test]
    fn empty_input_is_malformed() {
        assert!(extract_identity_username("").is_err());
    }

    #[test]
    fn locale_is_lowercased_country_part() {
        assert_eq!(extract_locale_code("v=2&lang=fr-FR"), "fr");
        assert_eq!(extract_locale_code("v=2&lang=en-US"), "us");
    }

    #[test]
    fn locale_without_dash_degrades_to_empty() {
        assert_eq!(extract_locale_code("no dash here"), "");
        assert_eq!(extract_locale_code(""), "");
    }
}
