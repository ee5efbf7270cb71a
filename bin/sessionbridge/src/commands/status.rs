use anyhow::Result;
use chrono::{TimeZone, Utc};
use sessionbridge_core::{Config, Paths, Platform};

/// Print a per-platform summary of the stored records. Values are never
/// printed, only their lengths.
pub async fn execute() -> Result<()> {
    let paths = Paths::new();
    let config = Config::load(&paths)?;
    let store = super::open_state_store(&config, &paths);

    for platform in Platform::ALL {
        match store.read_platform(platform).await? {
            Some(record) if !record.is_empty() => {
                println!("{}:", platform);
                let mut names: Vec<&String> = record.fields.keys().collect();
                names.sort();
                for name in names {
                    let entry = record.get(name).expect("key from iteration");
                    println!(
                        "  {:<20} {} chars, stored {}",
                        name,
                        entry.value.len(),
                        format_millis(entry.stored_at)
                    );
                }
            }
            _ => println!("{}: (no record)", platform),
        }
    }
    Ok(())
}

fn format_millis(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| millis.to_string())
}
