// Console driver: run one search against the configured listing source and
// page through it until the source runs dry.
//
// usage: browse [location] [category label] [max pages]

use anyhow::{Context, Result};
use staywise_listings::{
    category, ClientConfig, FetchCoordinator, HttpListingSource, Outcome, SearchInput,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("staywise_listings=info,browse=info")),
        )
        .with_target(true)
        .init();

    let mut args = std::env::args().skip(1);
    let location = args.next().unwrap_or_default();
    let category_label = args.next().unwrap_or_else(|| category::ALL_LABEL.to_string());
    let max_pages: u32 = match args.next() {
        Some(raw) => raw.parse().context("max pages must be a positive number")?,
        None => 5,
    };

    let config = ClientConfig::from_env().context("loading client configuration")?;
    tracing::info!(base_url = %config.base_url, "using listing source");
    let source = Arc::new(HttpListingSource::new(config)?);
    let coordinator = FetchCoordinator::new(source);

    let mut outcome = coordinator
        .search(&SearchInput::new(location, category_label))
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", e.user_message(), e))?;

    while let Outcome::Loaded { page, has_more, .. } = outcome {
        if !has_more || page >= max_pages {
            break;
        }
        outcome = coordinator
            .load_next()
            .await
            .map_err(|e| anyhow::anyhow!("{}: {}", e.user_message(), e))?;
    }

    let state = coordinator.snapshot();
    for record in &state.results {
        let price = record
            .nightly_price()
            .map(|p| format!("₩{:.0}", p))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>8}  {:<30}  {:<10}  {:>10}  {}",
            record.id,
            record.name,
            record.category_label().unwrap_or("-"),
            price,
            record.address.as_deref().unwrap_or("")
        );
    }
    println!(
        "{} stays over {} page(s){}",
        state.results.len(),
        state.paging.current_page,
        if state.paging.has_more { ", more available" } else { "" }
    );

    coordinator.shutdown();
    Ok(())
}
