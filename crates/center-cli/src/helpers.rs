//! Helper functions for CLI operations

use anyhow::Result;
use center_core::PackageRecord;
use center_db::PackageDb;
use chrono::{NaiveDate, Utc};
use std::collections::BTreeSet;
use std::time::Duration;

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Package names close to `name`, best match first
pub fn suggest_names(name: &str, candidates: &[String], limit: usize) -> Vec<String> {
    let needle = name.to_lowercase();
    let mut scored: Vec<(f64, &String)> = candidates
        .iter()
        .map(|c| (strsim::jaro_winkler(&needle, &c.to_lowercase()), c))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .collect();
    scored.sort_by(|(a, na), (b, nb)| b.total_cmp(a).then_with(|| na.cmp(nb)));
    scored.into_iter().take(limit).map(|(_, c)| c.clone()).collect()
}

/// Every package name either database knows about
pub fn known_names(db: &PackageDb) -> Result<Vec<String>> {
    let mut names: BTreeSet<String> = db.list_available()?.into_iter().collect();
    names.extend(db.list_installed()?);
    Ok(names.into_iter().collect())
}

/// Sorts records by the date of their newest release, newest first
pub fn sort_by_release_date(records: &mut [&PackageRecord]) {
    records.sort_by(|a, b| {
        let da = a.display().latest().and_then(|h| h.date.as_deref());
        let db = b.display().latest().and_then(|h| h.date.as_deref());
        db.cmp(&da).then_with(|| a.id().cmp(b.id()))
    });
}

/// Formats a `YYYY-MM-DD` date as relative time (e.g., "2 days ago")
pub fn format_relative_date(date: &str) -> String {
    let Ok(day) = NaiveDate::parse_from_str(date, "%Y-%m-%d") else {
        return date.to_string();
    };
    let days = Utc::now().date_naive().signed_duration_since(day).num_days();

    if days < 0 {
        date.to_string()
    } else if days == 0 {
        "today".to_string()
    } else if days < 30 {
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else if days < 365 {
        let months = days / 30;
        format!("{} month{} ago", months, if months == 1 { "" } else { "s" })
    } else {
        let years = days / 365;
        format!("{} year{} ago", years, if years == 1 { "" } else { "s" })
    }
}

/// Formats a duration in human-readable format
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();

    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
