use tokio::net::TcpListener;
use tracing::info;
use member_qa::{
    config::Config,
    api::routes::create_router,
    init_tracing,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = Config::load()?;
    let server_addr = config.server_addr;
    info!(
        upstream = %config.messages_api_base,
        page_limit = config.page_limit,
        max_pages = config.max_pages,
        "Starting server on {}",
        server_addr
    );

    let app = create_router(AppState::new(&config));

    let listener = TcpListener::bind(server_addr).await?;

    info!("Listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
