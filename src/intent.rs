//! Intent Classifier.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    TripQuery { name: String, city: String },
    CarsQuery { name: String },
    FavoritesQuery { name: String },
    Unknown,
}

impl Intent {
    /// The person the question is about, if it was understood.
    pub fn name(&self) -> Option<&str> {
        match self {
            Intent::TripQuery { name, .. } | Intent::CarsQuery { name } | Intent::FavoritesQuery { name } => Some(name.as_str()),
            Intent::Unknown => None,
        }
    }
}

type Build = fn(&Captures) -> Intent;

// Tried in order; the first pattern that matches decides the intent.
static MATCHERS: Lazy<Vec<(Regex, Build)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(
                r"(?i)when\s+is\s+(.+?)\s+planning\s+(?:her|his|their)?\s*trip\s+to\s+([A-Z][a-zA-Z]+(?:\s+[A-Z][a-zA-Z]+)*)\s*\??\s*$",
            )
            .expect("trip question regex must compile"),
            trip as Build,
        ),
        (
            Regex::new(r"(?i)how\s+many\s+cars\s+does\s+(.+?)\s+have\??")
                .expect("cars question regex must compile"),
            cars as Build,
        ),
        (
            Regex::new(r"(?i)what\s+are\s+(.+?)['’]s\s+favorite\s+restaurants\??")
                .expect("favorites question regex must compile"),
            favorites as Build,
        ),
    ]
});

fn trip(caps: &Captures) -> Intent {
    Intent::TripQuery {
        name: group(caps, 1),
        city: group(caps, 2),
    }
}

fn cars(caps: &Captures) -> Intent {
    Intent::CarsQuery { name: group(caps, 1) }
}

fn favorites(caps: &Captures) -> Intent {
    Intent::FavoritesQuery { name: group(caps, 1) }
}

fn group(caps: &Captures, index: usize) -> String {
    caps.get(index)
        .map(|m| clean_capture(m.as_str()))
        .unwrap_or_default()
}

/// Trims whitespace, then trailing `?.!,`.
fn clean_capture(raw: &str) -> String {
    raw.trim().trim_end_matches(['?', '.', '!', ',']).to_string()
}

pub fn classify(question: &str) -> Intent {
    MATCHERS
        .iter()
        .find_map(|(pattern, build)| pattern.captures(question).map(|caps| build(&caps)))
        .unwrap_or(Intent::Unknown)
}
