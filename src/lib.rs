pub mod answer;
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod insights;
pub mod intent;
pub mod message;

use std::sync::Arc;
use answer::Answerer;
use client::MessagesClient;
use config::Config;
use fetcher::Fetcher;

pub const SERVICE_NAME: &str = "member-qa";

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub answerer: Arc<Answerer<MessagesClient>>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let client = MessagesClient::new(config.messages_api_base.clone(), config.request_timeout);
        let answerer = Answerer::new(
            Fetcher::new(client, config.page_limit),
            config.max_pages,
            config.ask_timeout,
        );
        AppState {
            answerer: Arc::new(answerer),
        }
    }
}

/// Installs the fmt subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
