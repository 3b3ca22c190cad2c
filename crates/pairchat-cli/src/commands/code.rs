//! `pairchat code`: print the secret code to share with your partner.
//!
//! A code is reused for the rest of the day and rotates at 07:00 local time.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use pairchat_core::{random_code, CODE_LEN};

/// Hour of the day (local time) after which a new code is issued.
const ROTATE_HOUR: i64 = 7;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Serialize, Deserialize)]
struct StoredCode {
    code: String,
    /// Local wall-clock creation time.
    created_at: String,
}

/// The most recent rotation instant at or before `now`.
fn rotation_boundary(now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date().and_time(NaiveTime::MIN) + Duration::hours(ROTATE_HOUR);
    if today <= now {
        today
    } else {
        today - Duration::days(1)
    }
}

fn load(store: &Path) -> Option<StoredCode> {
    let content = std::fs::read_to_string(store).ok()?;
    match toml::from_str(&content) {
        Ok(stored) => Some(stored),
        Err(e) => {
            debug!(path = %store.display(), "ignoring unreadable code store: {}", e);
            None
        }
    }
}

fn save(store: &Path, stored: &StoredCode) -> Result<()> {
    let content = toml::to_string_pretty(stored).context("failed to serialize secret code")?;
    if let Some(parent) = store.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(store, content)
        .with_context(|| format!("failed to write secret code to {}", store.display()))
}

/// Return the stored code if it is still current at `now`, otherwise a new one.
pub fn daily_code(store: &Path, force_new: bool, now: NaiveDateTime) -> Result<String> {
    if !force_new {
        if let Some(stored) = load(store) {
            let created = NaiveDateTime::parse_from_str(&stored.created_at, TIMESTAMP_FORMAT).ok();
            if created.is_some_and(|at| at >= rotation_boundary(now)) && !stored.code.is_empty() {
                return Ok(stored.code);
            }
        }
    }

    let stored = StoredCode {
        code: random_code(CODE_LEN),
        created_at: now.format(TIMESTAMP_FORMAT).to_string(),
    };
    save(store, &stored)?;
    debug!(path = %store.display(), "issued new secret code");
    Ok(stored.code)
}

pub fn run(store: &Path, force_new: bool) -> Result<()> {
    let code = daily_code(store, force_new, Local::now().naive_local())?;
    println!("{code}");
    Ok(())
}
