//! services/api/src/bin/catalog_sync.rs
//!
//! Command line client that keeps a local copy of the catalog. It only
//! downloads the catalog when the server checksum changed, checks at most once
//! per cooldown period and can fetch the section PDFs of a cached resource.

use api_lib::{
    adapters::{HttpCatalogRemote, JsonFileStore, ReqwestFetcher},
    error::ApiError,
};
use bytes::{Bytes, BytesMut};
use clap::{Parser, Subcommand};
use futures::{future::try_join_all, TryStreamExt};
use std::{path::PathBuf, sync::Arc, time::Duration};
use study_catalog_core::{
    catalog::slugify,
    freshness::{cooldown, CatalogEvent, CatalogFreshness, KeyValueStore, SyncOutcome, LAST_CHECK_KEY},
    pdf_cache::PdfBytesCache,
    ports::{DocumentFetcher, PortResult},
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;
use uuid::Uuid;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Where the catalog API is served.
    #[arg(long, default_value = "http://localhost:3000")]
    base_url: Url,
    /// JSON file holding the cached catalog between runs.
    #[arg(long, default_value = "catalog-cache.json")]
    store: PathBuf,
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare checksums and download the catalog if it changed.
    Sync {
        /// Ignore the cooldown.
        #[arg(long)]
        force: bool,
        /// Keep checking once per cooldown period until interrupted.
        #[arg(long)]
        watch: bool,
    },
    /// Print the cached catalog, or one subject of it.
    Show { subject: Option<String> },
    /// Download the section PDFs of a cached resource.
    FetchPdf {
        subject: String,
        resource: Uuid,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let timeout = Duration::from_secs(cli.timeout_secs);

    let mut store = JsonFileStore::open(&cli.store)?;
    if let Command::Sync { force: true, .. } = cli.command {
        store.set(LAST_CHECK_KEY, "0")?;
    }
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let remote = HttpCatalogRemote::new(client, cli.base_url.clone());
    let mut freshness = CatalogFreshness::new(store, remote);

    match cli.command {
        Command::Sync { watch: false, .. } => match freshness.check_and_fetch(chrono::Utc::now()).await {
            SyncOutcome::CoolingDown => info!("Checked recently; use --force to check again."),
            SyncOutcome::UpToDate => info!("Catalog is up to date."),
            SyncOutcome::Updated { checksum } => info!("Catalog updated to {}.", checksum),
            SyncOutcome::Failed(message) => return Err(ApiError::Internal(message)),
        },
        Command::Sync { watch: true, .. } => watch(&mut freshness).await?,
        Command::Show { subject } => show(&freshness, subject.as_deref()),
        Command::FetchPdf {
            subject,
            resource,
            out,
        } => {
            let sections = freshness.resource_sections(&subject, resource);
            if sections.is_empty() {
                return Err(ApiError::Internal(format!(
                    "No cached sections for resource {resource} of {subject}; run `sync` first"
                )));
            }
            tokio::fs::create_dir_all(&out).await?;

            let fetcher = ReqwestFetcher::new(timeout)?;
            let cache = Arc::new(PdfBytesCache::new());
            let downloads = sections.iter().map(|section| {
                let fetcher = fetcher.clone();
                let url = section.url.clone();
                let path = out.join(format!("{}.pdf", slugify(&section.title)));
                let cache = cache.clone();
                async move {
                    let bytes = cache
                        .get_or_fetch(&section.id.to_string(), move || download(fetcher, url))
                        .await?;
                    tokio::fs::write(&path, &bytes).await?;
                    info!("Saved {} ({} bytes)", path.display(), bytes.len());
                    Ok::<_, ApiError>(())
                }
            });
            try_join_all(downloads).await?;
        }
    }
    Ok(())
}

async fn download(fetcher: ReqwestFetcher, url: String) -> PortResult<Bytes> {
    let document = fetcher.fetch(&url).await?;
    let buffer = document
        .body
        .try_fold(BytesMut::new(), |mut acc, chunk| async move {
            acc.extend_from_slice(&chunk);
            Ok(acc)
        })
        .await?;
    Ok(buffer.freeze())
}

async fn watch(
    freshness: &mut CatalogFreshness<JsonFileStore, HttpCatalogRemote>,
) -> Result<(), ApiError> {
    let mut events = freshness.subscribe();
    let period = cooldown()
        .to_std()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    loop {
        if let SyncOutcome::Failed(message) = freshness.check_and_fetch(chrono::Utc::now()).await {
            warn!("Check failed, retrying after the cooldown: {}", message);
        }
        while let Ok(CatalogEvent::Updated { checksum }) = events.try_recv() {
            info!("Catalog changed; now at {}", checksum);
        }
        tokio::select! {
            _ = tokio::time::sleep(period) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping.");
                return Ok(());
            }
        }
    }
}

fn show(freshness: &CatalogFreshness<JsonFileStore, HttpCatalogRemote>, subject: Option<&str>) {
    let catalog = freshness.cached_catalog();
    if catalog.is_empty() {
        println!("No cached catalog in {}; run `sync` first.", freshness.store().path().display());
        return;
    }
    match subject {
        None => {
            for subject in &catalog {
                println!("{:<12} {} resources", subject.code, subject.resources.len());
            }
        }
        Some(code) => {
            for resource in freshness.subject_resources(code) {
                println!("{}  {}", resource.id, resource.title);
                for section in &resource.sections {
                    println!("    {}  {}", section.title, section.url);
                }
            }
        }
    }
}
