//! Prints data-quality statistics for the upstream message collection.
//!
//! Uses the same configuration and retrieval client as the server, but keeps
//! whatever pages it managed to fetch when the upstream refuses a later page.

use member_qa::{
    client::MessagesClient,
    config::Config,
    fetcher::Fetcher,
    init_tracing,
    insights::{compute_insights, format_for_readme},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = Config::load()?;
    let client = MessagesClient::new(config.messages_api_base.clone(), config.request_timeout);
    let fetcher = Fetcher::new(client, config.page_limit);

    let messages = fetcher.fetch_all_lenient(config.max_pages).await?;
    if messages.is_empty() {
        println!("No messages fetched; cannot compute insights.");
        return Ok(());
    }

    let insights = compute_insights(&messages);

    println!("========== RAW INSIGHTS ==========");
    println!("{}", serde_json::to_string_pretty(&insights)?);

    println!("\n========== README SNIPPET ==========\n");
    println!("{}", format_for_readme(&insights));

    Ok(())
}
