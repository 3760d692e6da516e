//! Oracle reporter
//!
//! Dry-run entry point: exports the query catalog and prepares submissions
//! for the configured feed until shut down.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use oracle_core::queries::NumericApiResponse;
use oracle_core::{query_catalog, Catalog, CatalogFormat, Query};
use oracle_price_feed::{DataFeed, NumericApiResponseSource};
use oracle_reporter::{IntervalReporter, ReporterConfig};

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .init();
    }
}

fn export_catalog(catalog: &Catalog, format: CatalogFormat) -> anyhow::Result<()> {
    let rendered = match format {
        CatalogFormat::Markdown => catalog.to_markdown()?,
        CatalogFormat::Yaml => catalog.to_yaml()?,
        CatalogFormat::Json => catalog.to_json()?,
        CatalogFormat::None => return Ok(()),
    };
    println!("{}", rendered);
    Ok(())
}

/// Build the feed named by configuration, if any
fn configured_feed(config: &ReporterConfig, catalog: &Catalog) -> anyhow::Result<Option<DataFeed<f64>>> {
    let settings = &config.feed;

    let query = match (&settings.url, &settings.parse_str, &settings.tag) {
        (Some(url), Some(parse_str), _) => NumericApiResponse::new(url.as_str(), parse_str.as_str()),
        (_, _, Some(tag)) => {
            let entry = catalog
                .get(tag)
                .ok_or_else(|| anyhow!("No catalog entry tagged {}", tag))?;
            match entry.query()? {
                Query::NumericApiResponse(query) => query,
                other => return Err(anyhow!("No data source available for {} ({})", tag, other.type_name())),
            }
        }
        (Some(_), None, None) => return Err(anyhow!("feed.url requires feed.parse_str")),
        _ => return Ok(None),
    };

    let source = NumericApiResponseSource::from_query(&query, &config.source_config())
        .context("Failed to create data source")?;
    Ok(Some(DataFeed::new(query, Arc::new(source))))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ReporterConfig::load()?;
    init_logging(config.log_json);

    info!("Starting oracle reporter v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {}", config.digest());

    let catalog = query_catalog()?;
    info!("Query catalog loaded with {} entries", catalog.len());
    export_catalog(&catalog, config.catalog_format)?;

    let feed = match configured_feed(&config, &catalog)? {
        Some(feed) => feed,
        None => {
            info!("No feed configured, nothing to report");
            return Ok(());
        }
    };
    info!("Reporting {} (query id {})", feed.query(), feed.query().query_id()?);

    let reporter = IntervalReporter::new(vec![feed], config.interval());

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    error!("Failed to install signal handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C");
            }
            _ = terminate => {
                info!("Received termination signal");
            }
        }

        let _ = shutdown_tx.send(());
    });

    info!("Press Ctrl+C to shutdown");
    reporter.run(shutdown_rx).await;

    info!("Reporter shutdown complete");
    Ok(())
}
