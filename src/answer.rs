//! The question-answering pipeline behind `POST /ask`.

use std::time::Duration;

use tracing::{error, info};

use crate::client::PageSource;
use crate::error::{AppError, Result};
use crate::extract::{car_count, favorite_restaurants, trip_date};
use crate::fetcher::Fetcher;
use crate::intent::{classify, Intent};
use crate::message::{messages_for, Message};

pub const FALLBACK_ANSWER: &str =
    "I couldn't understand the question. Ask about trips to a city, car counts, or favorite restaurants.";
pub const RETRY_ANSWER: &str = "Unexpected error fetching messages. Please try again.";

pub struct Answerer<S> {
    fetcher: Fetcher<S>,
    max_pages: usize,
    deadline: Duration,
}

impl<S: PageSource + Sync> Answerer<S> {
    pub fn new(fetcher: Fetcher<S>, max_pages: usize, deadline: Duration) -> Self {
        Answerer {
            fetcher,
            max_pages,
            deadline,
        }
    }

    /// Answers one question from a fresh snapshot of the message collection.
    ///
    /// Only an empty question is an error; every upstream failure comes back
    /// as an explanatory answer.
    pub async fn answer(&self, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::ValidationError("Question must not be empty".to_string()));
        }

        let fetched = tokio::time::timeout(self.deadline, self.fetcher.fetch_all(self.max_pages))
            .await
            .unwrap_or_else(|_| {
                Err(AppError::FetchError(format!(
                    "gave up after {:?} waiting for messages",
                    self.deadline
                )))
            });

        let messages = match fetched {
            Ok(messages) => messages,
            Err(err) => return Ok(describe_fetch_error(&err)),
        };

        Ok(respond(&classify(question), &messages))
    }
}

/// Turns a retrieval failure into the answer shown to the caller.
pub fn describe_fetch_error(err: &AppError) -> String {
    match err {
        AppError::UpstreamStatus { status, body } => {
            let details = if body.is_empty() { "no details" } else { body.as_str() };
            format!("Upstream API error ({}): {}", status, details)
        }
        AppError::FetchError(detail) => {
            format!("Upstream API request failed (network/timeout): {}", detail)
        }
        other => {
            error!(error = %other, "Unexpected error fetching messages");
            RETRY_ANSWER.to_string()
        }
    }
}

/// Answers an already classified question from a message snapshot.
pub fn respond(intent: &Intent, messages: &[Message]) -> String {
    let Some(name) = intent.name() else {
        return FALLBACK_ANSWER.to_string();
    };
    info!(?intent, "Parsed question");

    let texts = messages_for(messages, name);
    if texts.is_empty() {
        return format!("I couldn't find any messages for {}.", name);
    }

    match intent {
        Intent::TripQuery { city, .. } => trip_date(&texts, city)
            .unwrap_or_else(|| format!("No trip to {} found for {}.", city, name)),
        Intent::CarsQuery { .. } => car_count(&texts)
            .unwrap_or_else(|| format!("I couldn't infer car ownership for {}.", name)),
        Intent::FavoritesQuery { .. } => favorite_restaurants(&texts)
            .unwrap_or_else(|| format!("No favorite restaurants found for {}.", name)),
        Intent::Unknown => FALLBACK_ANSWER.to_string(),
    }
}
