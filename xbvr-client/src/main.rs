use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::{Builder, Target};
use log::LevelFilter;
use xbvr_client::{
    ApiClient, ApiService, ClientConfig, CollectionStore, LoadOutcome, Resource,
    StoreError,
};
use xbvr_model::{Actor, FileRecord, Scene};

#[derive(Parser)]
#[command(name = "xbvr-browse", about = "Browse an xbvr library from the terminal")]
struct Cli {
    /// Server base URL (overrides config and XBVR_SERVER_URL)
    #[arg(long)]
    server: Option<String>,
    #[arg(long, value_enum, default_value = "scenes")]
    resource: ResourceArg,
    /// Filter token from a shared link
    #[arg(long)]
    filters: Option<String>,
    /// Number of pages to load
    #[arg(long, default_value_t = 1)]
    pages: u32,
    /// Page size (defaults to the configured limit)
    #[arg(long)]
    limit: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ResourceArg {
    Scenes,
    Actors,
    Files,
}

trait Summary {
    fn summary(&self) -> String;
}

impl Summary for Scene {
    fn summary(&self) -> String {
        let cast: Vec<&str> = self.cast.iter().map(|c| c.name.as_str()).collect();
        format!(
            "{:>6}  {:<24} {} [{}]",
            self.id.to_string(),
            self.scene_id.as_str(),
            self.title,
            cast.join(", ")
        )
    }
}

impl Summary for Actor {
    fn summary(&self) -> String {
        format!("{:>6}  {} ({} scenes)", self.id.to_string(), self.name, self.count)
    }
}

impl Summary for FileRecord {
    fn summary(&self) -> String {
        let matched = if self.is_matched() { "matched" } else { "unmatched" };
        format!(
            "{:>6}  {} ({}, {} bytes)",
            self.id.to_string(),
            self.filename,
            matched,
            self.size
        )
    }
}

fn init_logger() {
    Builder::new()
        .target(Target::Stderr)
        .filter_level(LevelFilter::Warn)
        .filter_module("xbvr_client", LevelFilter::Debug)
        .init();
}

async fn browse<T: Resource + Summary>(
    api: Arc<dyn ApiService>,
    config: &ClientConfig,
    cli: &Cli,
) -> Result<()> {
    let store = CollectionStore::<T>::from_config(api, config);

    if let Some(token) = &cli.filters {
        store
            .set_filters_from_token(token)
            .context("Filter token could not be decoded")?;
    }

    match store.load_filter_options().await {
        Ok(options) => log::info!(
            "[xbvr-browse] {} sites, {} cast, {} tags available",
            options.sites.len(),
            options.cast.len(),
            options.tags.len()
        ),
        Err(StoreError::Unsupported { .. }) => {}
        Err(err) => log::warn!("[xbvr-browse] Filter options unavailable: {}", err),
    }

    for _ in 0..cli.pages {
        match store.load_next_page().await? {
            LoadOutcome::Complete => break,
            LoadOutcome::Applied { .. }
            | LoadOutcome::Superseded
            | LoadOutcome::Skipped => {}
        }
    }

    let snapshot = store.snapshot();
    for item in &snapshot.items {
        println!("{}", item.summary());
    }
    for (name, count) in &snapshot.counts.0 {
        println!("{name}: {count}");
    }
    println!(
        "{} of {} {} loaded{}",
        snapshot.items.len(),
        snapshot.total,
        store.descriptor().name,
        if snapshot.has_more() { ", more available" } else { "" }
    );
    println!("filters: {}", store.filter_token());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        init_logger();
    } else {
        env_logger::init();
    }

    let cli = Cli::parse();

    let mut config = ClientConfig::load();
    if let Some(server) = &cli.server {
        config.server_url = server.clone();
    }
    if let Some(limit) = cli.limit {
        config.page_limit = limit;
    }

    let client = ApiClient::new(&config.server_url, config.request_timeout())
        .with_context(|| format!("Invalid server url {}", config.server_url))?;
    let api: Arc<dyn ApiService> = Arc::new(client);

    match cli.resource {
        ResourceArg::Scenes => browse::<Scene>(api, &config, &cli).await,
        ResourceArg::Actors => browse::<Actor>(api, &config, &cli).await,
        ResourceArg::Files => browse::<FileRecord>(api, &config, &cli).await,
    }
}
