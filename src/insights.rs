//! Data-quality statistics over a fetched message snapshot.
//!
//! Offline tooling for the `analyze_data` binary; nothing here is on the
//! question-answering path.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::message::Message;

const TOP_USERS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserCount {
    pub user_name: String,
    pub messages: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetInsights {
    pub total_messages: usize,
    pub missing_user_name: usize,
    pub missing_message_text: usize,
    pub missing_id: usize,
    pub duplicate_ids: usize,
    /// At most 5 characters, including empty.
    pub very_short_messages: usize,
    /// Between 1 and 20 characters.
    pub ultra_short_messages: usize,
    /// At least 500 characters.
    pub very_long_messages: usize,
    pub top_users: Vec<UserCount>,
    pub bad_timestamps: usize,
    pub min_timestamp: Option<DateTime<Utc>>,
    pub max_timestamp: Option<DateTime<Utc>>,
}

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses an ISO 8601 timestamp: RFC 3339 (including `Z`), a space instead of
/// `T`, minute precision, or a bare date. Values without an offset are
/// read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let normalized = match raw.as_bytes().get(10) {
        Some(b' ') => format!("{}T{}", &raw[..10], &raw[11..]),
        _ => raw.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }
    let with_offset = normalized.replace('Z', "+00:00");
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(&with_offset, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
    {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Falsy ids (null, `0`, `false`, empty string/array/object) count as missing.
fn id_is_missing(id: Option<&serde_json::Value>) -> bool {
    use serde_json::Value;
    match id {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
    }
}

pub fn compute_insights(messages: &[Message]) -> DatasetInsights {
    let mut insights = DatasetInsights {
        total_messages: messages.len(),
        missing_user_name: 0,
        missing_message_text: 0,
        missing_id: 0,
        duplicate_ids: 0,
        very_short_messages: 0,
        ultra_short_messages: 0,
        very_long_messages: 0,
        top_users: Vec::new(),
        bad_timestamps: 0,
        min_timestamp: None,
        max_timestamp: None,
    };

    let mut present_ids = 0;
    let mut distinct_ids = HashSet::new();
    let mut user_order: Vec<&str> = Vec::new();
    let mut user_counts: HashMap<&str, usize> = HashMap::new();

    for message in messages {
        if message.user_name().trim().is_empty() {
            insights.missing_user_name += 1;
        } else {
            let count = user_counts.entry(message.user_name()).or_insert_with(|| {
                user_order.push(message.user_name());
                0
            });
            *count += 1;
        }

        if message.text().trim().is_empty() {
            insights.missing_message_text += 1;
        }

        if id_is_missing(message.id.as_ref()) {
            insights.missing_id += 1;
        }
        // duplicates are counted over every non-null id, falsy ones included
        if let Some(id) = message.id.as_ref().filter(|id| !id.is_null()) {
            present_ids += 1;
            distinct_ids.insert(id.to_string());
        }

        let length = message.text().chars().count();
        if length <= 5 {
            insights.very_short_messages += 1;
        }
        if (1..=20).contains(&length) {
            insights.ultra_short_messages += 1;
        }
        if length >= 500 {
            insights.very_long_messages += 1;
        }

        let Some(raw) = message.timestamp.as_deref().filter(|ts| !ts.is_empty()) else {
            continue;
        };
        match parse_timestamp(raw) {
            Some(ts) => {
                insights.min_timestamp = Some(insights.min_timestamp.map_or(ts, |min| min.min(ts)));
                insights.max_timestamp = Some(insights.max_timestamp.map_or(ts, |max| max.max(ts)));
            }
            None => insights.bad_timestamps += 1,
        }
    }

    insights.duplicate_ids = present_ids - distinct_ids.len();

    // stable sort keeps first-seen order among equal counts
    let mut ranked: Vec<UserCount> = user_order
        .into_iter()
        .map(|name| UserCount {
            user_name: name.to_string(),
            messages: user_counts[name],
        })
        .collect();
    ranked.sort_by(|a, b| b.messages.cmp(&a.messages));
    ranked.truncate(TOP_USERS);
    insights.top_users = ranked;

    insights
}

fn pct(part: usize, total: usize) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", part as f64 / total as f64 * 100.0)
}

/// Markdown summary of the insights, ready to paste into a README.
pub fn format_for_readme(insights: &DatasetInsights) -> String {
    let total = insights.total_messages;
    if total == 0 {
        return "No messages were retrieved from the upstream API.".to_string();
    }

    let mut lines = vec![
        "**Data quality & anomalies**".to_string(),
        format!("- Total messages fetched: **{}**", total),
        format!(
            "- Missing `user_name`: **{}** ({})",
            insights.missing_user_name,
            pct(insights.missing_user_name, total)
        ),
        format!(
            "- Missing/empty `message` text: **{}** ({})",
            insights.missing_message_text,
            pct(insights.missing_message_text, total)
        ),
        format!("- Missing `id`: **{}** ({})", insights.missing_id, pct(insights.missing_id, total)),
        format!("- Duplicate IDs: **{}**", insights.duplicate_ids),
        format!(
            "- Very short messages (≤ 5 chars): **{}** ({})",
            insights.very_short_messages,
            pct(insights.very_short_messages, total)
        ),
        format!(
            "- Ultra-short messages (1–20 chars): **{}** ({})",
            insights.ultra_short_messages,
            pct(insights.ultra_short_messages, total)
        ),
        format!(
            "- Very long messages (≥ 500 chars): **{}** ({})",
            insights.very_long_messages,
            pct(insights.very_long_messages, total)
        ),
    ];

    match (insights.min_timestamp, insights.max_timestamp) {
        (Some(min), Some(max)) => lines.push(format!(
            "- Timestamp range (valid ISO): **{}** → **{}**, with **{}** malformed timestamps",
            min.to_rfc3339(),
            max.to_rfc3339(),
            insights.bad_timestamps
        )),
        _ => lines.push(format!(
            "- Timestamps: could not parse any valid timestamps, {} entries failed parsing.",
            insights.bad_timestamps
        )),
    }

    if !insights.top_users.is_empty() {
        let top = insights
            .top_users
            .iter()
            .map(|u| format!("{} ({})", u.user_name, u.messages))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("- Top active users by message count: {}", top));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn msg(id: serde_json::Value, user: Option<&str>, text: &str, ts: Option<&str>) -> Message {
        Message {
            id: Some(id),
            user_name: user.map(str::to_string),
            message: Some(text.to_string()),
            timestamp: ts.map(str::to_string),
        }
    }

    fn sample() -> Vec<Message> {
        vec![
            msg(json!("a"), Some("Ana"), "hi", Some("2024-05-01T10:00:00Z")),
            msg(json!("a"), Some("Ben"), "Please book a table for four at Nobu", Some("2024-03-01T08:30:00")),
            msg(json!(null), Some("Ana"), "", Some("yesterday")),
            msg(json!(3), None, &"x".repeat(600), None),
            msg(json!(3), Some("Ben"), "ok thanks", Some("2024-06-01T00:00:00+02:00")),
            msg(json!("c"), Some("Cleo"), "   ", None),
        ]
    }

    #[test]
    fn counts_quality_issues() {
        let insights = compute_insights(&sample());
        assert_eq!(insights.total_messages, 6);
        assert_eq!(insights.missing_user_name, 1);
        assert_eq!(insights.missing_message_text, 2);
        assert_eq!(insights.missing_id, 1);
        assert_eq!(insights.duplicate_ids, 2);
        assert_eq!(insights.very_short_messages, 3);
        assert_eq!(insights.ultra_short_messages, 3);
        assert_eq!(insights.very_long_messages, 1);
        assert_eq!(insights.bad_timestamps, 1);
    }

    #[test]
    fn timestamp_range_spans_valid_entries() {
        let insights = compute_insights(&sample());
        assert_eq!(insights.min_timestamp, parse_timestamp("2024-03-01T08:30:00Z"));
        assert_eq!(insights.max_timestamp, parse_timestamp("2024-05-31T22:00:00Z"));
    }

    #[test]
    fn accepts_common_iso_shapes() {
        let midnight = parse_timestamp("2024-05-01T00:00:00Z");
        assert!(midnight.is_some());
        assert_eq!(parse_timestamp("2024-05-01"), midnight);
        assert_eq!(parse_timestamp("2024-05-01 00:00:00"), midnight);
        assert_eq!(parse_timestamp("2024-05-01 02:00:00+02:00"), midnight);
        assert_eq!(parse_timestamp("2024-05-01T00:00"), midnight);
        assert_eq!(parse_timestamp("2024-05-01 00:00:00.000Z"), midnight);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2024-13-01"), None);
    }

    #[test]
    fn date_only_and_space_separated_are_not_malformed() {
        let messages = vec![
            msg(json!(1), Some("Ana"), "hello", Some("2024-05-01")),
            msg(json!(2), Some("Ana"), "hello", Some("2024-05-02 09:30:00")),
        ];
        let insights = compute_insights(&messages);
        assert_eq!(insights.bad_timestamps, 0);
        assert_eq!(insights.max_timestamp, parse_timestamp("2024-05-02T09:30:00Z"));
    }

    #[test]
    fn falsy_ids_are_missing_but_still_count_for_duplicates() {
        let messages = vec![
            msg(json!(0), Some("Ana"), "hello", None),
            msg(json!(0), Some("Ben"), "hello", None),
            msg(json!(""), Some("Ben"), "hello", None),
            msg(json!(false), Some("Ben"), "hello", None),
            msg(json!(7), Some("Ben"), "hello", None),
            msg(json!("7"), Some("Ben"), "hello", None),
        ];
        let insights = compute_insights(&messages);
        assert_eq!(insights.missing_id, 4);
        assert_eq!(insights.duplicate_ids, 1);
    }

    #[test]
    fn top_users_keep_first_seen_order_on_ties() {
        let insights = compute_insights(&sample());
        let names: Vec<_> = insights.top_users.iter().map(|u| (u.user_name.as_str(), u.messages)).collect();
        assert_eq!(names, vec![("Ana", 2), ("Ben", 2), ("Cleo", 1)]);
    }

    #[test]
    fn readme_summary() {
        let text = format_for_readme(&compute_insights(&sample()));
        assert!(text.starts_with("**Data quality & anomalies**"));
        assert!(text.contains("- Missing `id`: **1** (16.7%)"));
        assert!(text.contains("- Duplicate IDs: **2**"));
        assert!(text.contains("with **1** malformed timestamps"));
        assert!(text.contains("- Top active users by message count: Ana (2), Ben (2), Cleo (1)"));
    }

    #[test]
    fn readme_summary_for_empty_snapshot() {
        assert_eq!(
            format_for_readme(&compute_insights(&[])),
            "No messages were retrieved from the upstream API."
        );
    }
}
