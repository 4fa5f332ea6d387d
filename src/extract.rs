//! Answer extractors: pattern scans over one person's message texts.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::message::normalize;

const DATE_WORDS: &str = r"(?:on|around|in|by|this|next|coming|on the)";
const CITY: &str = r"(?P<city>[A-Z][a-zA-Z]+(?:\s+[A-Z][a-zA-Z]+)*)";
const WHEN: &str = r"(?P<when>[A-Za-z0-9 ,./-]+)";

static TRIP_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        format!(r"(?i)\b(trip|travel|fly|flight|going)\b.*\bto\b\s*{CITY}[^\n]*\b{DATE_WORDS}\b\s*{WHEN}"),
        format!(r"(?i)\bto\s+{CITY}\b[^\n]*\b(on|around|in|by)\b\s*{WHEN}"),
        // casual phrasing, e.g. "headed to London next Friday"
        format!(r"(?i)\b(?:to|headed to|off to)\s+{CITY}\b.*?\b{DATE_WORDS}\b\s*{WHEN}"),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("trip pattern must compile"))
    .collect()
});

static CAR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)\b(?P<count>\d+)\s+cars?\b").expect("car count pattern must compile"),
        Regex::new(r"(?i)\b(has|own(?:s)?)\b[^\n]*\b(?P<count>\d+)\s+cars?\b")
            .expect("car ownership pattern must compile"),
    ]
});

static FAVORITE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)favorite\s+restaurants?\s*:?\s*(?P<list>.+)$")
            .expect("favorite restaurants pattern must compile"),
        Regex::new(
            r"(?i)\b(love|loves|like|likes)\s+(?P<list>(?:[A-Z][\w'&]+(?:\s+[A-Z][\w'&]+)*)(?:\s*,\s*(?:and\s+)?[A-Z][\w'&]+(?:\s+[A-Z][\w'&]+)*)*)",
        )
        .expect("loves/likes pattern must compile"),
    ]
});

static LIST_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*,\s*(?:and\s+)?|\s+and\s+").expect("list separator must compile"));

/// The first "when" phrase describing a trip to `city`, in message order.
///
/// A match naming a different city is rejected and scanning continues with
/// the next pattern, then the next message.
pub fn trip_date(texts: &[&str], city: &str) -> Option<String> {
    let target = normalize(city);
    texts.iter().find_map(|text| {
        TRIP_PATTERNS.iter().find_map(|pattern| {
            let caps = pattern.captures(text)?;
            let found_city = caps.name("city").map_or("", |m| m.as_str().trim());
            if !found_city.is_empty() && normalize(found_city) != target {
                return None;
            }
            let when = caps.name("when").map_or("", |m| m.as_str().trim());
            (!when.is_empty()).then(|| when.to_string())
        })
    })
}

/// Largest car count mentioned in any message, as a decimal string.
///
/// Counts are compared as digit strings so no mention is too large to rank.
pub fn car_count(texts: &[&str]) -> Option<String> {
    let mut best: Option<&str> = None;
    for text in texts {
        for pattern in CAR_PATTERNS.iter() {
            for caps in pattern.captures_iter(text) {
                let Some(count) = caps.name("count").and_then(|m| canonical_count(m.as_str())) else {
                    continue;
                };
                if best.is_none_or(|b| (count.len(), count) > (b.len(), b)) {
                    best = Some(count);
                }
            }
        }
    }
    best.map(str::to_string)
}

/// Strips leading zeros; `None` for digits outside ASCII.
fn canonical_count(digits: &str) -> Option<&str> {
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let trimmed = digits.trim_start_matches('0');
    Some(if trimmed.is_empty() { "0" } else { trimmed })
}

/// Restaurant list from the first message that names one, de-duplicated
/// case-insensitively in first-seen order and joined with ", ".
pub fn favorite_restaurants(texts: &[&str]) -> Option<String> {
    let raw = texts.iter().find_map(|text| {
        FAVORITE_PATTERNS
            .iter()
            .find_map(|pattern| pattern.captures(text))
            .and_then(|caps| caps.name("list").map(|m| m.as_str()))
    })?;

    let mut seen = HashSet::new();
    let items: Vec<&str> = LIST_SEPARATOR
        .split(raw)
        .map(clean_item)
        .filter(|item| !item.is_empty())
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect();

    (!items.is_empty()).then(|| items.join(", "))
}

fn clean_item(item: &str) -> &str {
    item.trim_matches(|c: char| c.is_whitespace() || c == '.')
        .trim_end_matches(['!', '?', ';'])
        .trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trip_date_from_casual_flight_message() {
        let texts = ["Maria: flying to Boston on March 10"];
        assert_eq!(trip_date(&texts, "Boston").as_deref(), Some("March 10"));
    }

    #[test]
    fn trip_date_rejects_other_cities() {
        let texts = ["Booked my trip to Paris on June 3"];
        assert_eq!(trip_date(&texts, "London"), None);
        assert_eq!(trip_date(&texts, "paris").as_deref(), Some("June 3"));
    }

    #[test]
    fn trip_date_first_matching_message_wins() {
        let texts = [
            "Need a table for two tonight",
            "Planning a trip to Paris on June 3",
            "Going to London around July 4",
            "Another trip to London in December",
        ];
        assert_eq!(trip_date(&texts, "London").as_deref(), Some("July 4"));
    }

    #[test]
    fn trip_date_handles_multi_word_city_with_lenient_phrasing() {
        let texts = ["headed to New York next Friday"];
        assert_eq!(trip_date(&texts, "new   york").as_deref(), Some("Friday"));
    }

    #[test]
    fn trip_date_none_without_temporal_word() {
        let texts = ["I love Boston"];
        assert_eq!(trip_date(&texts, "Boston"), None);
    }

    #[test]
    fn car_count_takes_the_maximum() {
        let texts = ["He has 2 cars now", "Actually he owns 5 cars"];
        assert_eq!(car_count(&texts).as_deref(), Some("5"));
    }

    #[test]
    fn car_count_considers_every_mention() {
        let texts = ["Swapped 1 car for 3 cars last week"];
        assert_eq!(car_count(&texts).as_deref(), Some("3"));
    }

    #[test]
    fn car_count_keeps_counts_beyond_u64() {
        let texts = ["has 3 cars", "owns 99999999999999999999 cars", "has 18446744073709551615 cars"];
        assert_eq!(car_count(&texts).as_deref(), Some("99999999999999999999"));
    }

    #[test]
    fn car_count_ignores_leading_zeros() {
        let texts = ["has 007 cars", "owns 12 cars", "00 cars"];
        assert_eq!(car_count(&texts).as_deref(), Some("12"));
        assert_eq!(car_count(&["000 cars"]).as_deref(), Some("0"));
    }

    #[test]
    fn car_count_none_without_numbers() {
        let texts = ["I have a car", "cars are great"];
        assert_eq!(car_count(&texts), None);
    }

    #[test]
    fn favorites_dedupe_preserving_order() {
        let texts = ["My favorite restaurants: Luigi's, Pancho's, and Luigi's."];
        assert_eq!(favorite_restaurants(&texts).as_deref(), Some("Luigi's, Pancho's"));
    }

    #[test]
    fn favorites_dedupe_ignores_case() {
        let texts = ["favorite restaurants Nobu and nobu and Le Bernardin"];
        assert_eq!(favorite_restaurants(&texts).as_deref(), Some("Nobu, Le Bernardin"));
    }

    #[test]
    fn favorites_from_loves_phrase() {
        let texts = ["Please book a car", "She loves Luigi's, Pancho's, and Luigi's"];
        assert_eq!(favorite_restaurants(&texts).as_deref(), Some("Luigi's, Pancho's"));
    }

    #[test]
    fn favorites_only_first_matching_message_counts() {
        let texts = ["favorite restaurants: Nobu", "favorite restaurants: Per Se"];
        assert_eq!(favorite_restaurants(&texts).as_deref(), Some("Nobu"));
    }

    #[test]
    fn favorites_none_without_list() {
        assert_eq!(favorite_restaurants(&["Book me a flight"]), None);
    }
}
