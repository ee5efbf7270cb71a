use anyhow::{bail, Result};
use sessionbridge_core::{Config, Paths};

pub fn show() -> Result<()> {
    let paths = Paths::new();
    let config = Config::load(&paths)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let paths = Paths::new();
    let mut config = Config::load(&paths)?;

    match key {
        "webhook.endpoint" => {
            config.webhook.endpoint = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            };
        }
        "webhook.requirePublicIdentifier" => {
            config.webhook.require_public_identifier = value.parse()?;
        }
        "webhook.timeoutSeconds" => {
            config.webhook.timeout_seconds = value.parse()?;
        }
        "browser.debugHost" => {
            config.browser.debug_host = value.to_string();
        }
        "browser.debugPort" => {
            config.browser.debug_port = value.parse()?;
        }
        "browser.pollIntervalMs" => {
            config.browser.poll_interval_ms = value.parse()?;
        }
        "stateFile" => {
            config.state_file = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            };
        }
        _ => bail!("Unknown config key: {}", key),
    }

    config.save(&paths)?;
    println!("Set {} = {}", key, value);
    Ok(())
}
