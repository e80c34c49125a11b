use anyhow::anyhow;
use std::str::FromStr;
use std::sync::Arc;
use tracing::Level;
use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::SubscriberBuilder;

use tc2_hub_toolkit::config::{ Config, Credentials };
use tc2_hub_toolkit::fetcher::{ build_client, CertificationEndpoint, Fetcher };
use tc2_hub_toolkit::web::{ router, AppState };
use tc2_hub_toolkit::Toolkit;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match Config::load_default() {
        Ok(config) => config,
        Err(e) => {
            println!("Error: {:#}", e);
            return Err(e);
        }
    };

    let level = match Level::from_str(config.log_level()) {
        Ok(level) => level,
        Err(e) => {
            return Err(anyhow!("invalid log_level {}: {}", config.log_level(), e));
        }
    };
    let subscriber: SubscriberBuilder = tracing_subscriber::fmt();
    let non_blocking: NonBlocking;
    let _guard: WorkerGuard;
    (non_blocking, _guard) = tracing_appender::non_blocking(std::io::stdout());

    subscriber
        .with_writer(non_blocking)
        .with_max_level(level)
        .with_level(true)
        .with_line_number(level == tracing::Level::TRACE)
        .with_file(level == tracing::Level::TRACE)
        .compact()
        .init();

    let credentials = Credentials::from_env()?;
    let feeds = config.resolve_feeds(|key| std::env::var(key).ok())?;

    let client = match build_client(config.timeout()) {
        Ok(client) => client,
        Err(e) => {
            return Err(anyhow!(e.to_string()));
        }
    };

    let endpoint = CertificationEndpoint::new(&config.api.base_url, &credentials)?;
    let fetcher = Fetcher::new(client, config.cache_ttl());
    let curated = config.curated_catalog()?;
    tracing::info!("{} curated certifications loaded", curated.len());
    let toolkit = Toolkit::new(fetcher, endpoint, feeds).with_curated(curated);
    tracing::info!("{} feeds configured: {}", toolkit.catalog().len(), toolkit.catalog().join(", "));

    let state = Arc::new(AppState::new(toolkit)?);
    let listener = tokio::net::TcpListener::bind(config.listen()).await?;
    tracing::info!("listening on http://{}", config.listen());
    axum::serve(listener, router(state)).await?;

    return Ok(());
}
