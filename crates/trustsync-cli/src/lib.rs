//! trustsyncd - trust bundle synchronization daemon.
//!
//! The composition root: loads configuration, seeds the store, builds the
//! transport and verifier once, and wires them into the refresh pipeline.

mod args;

pub use args::{Cli, Commands};

use anyhow::{bail, Context};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use trustsync::{
    BundleRefresher, BundleStore, BundleTransport, BundleVerifier, CacheUpdater, EngineConfig,
    MemoryStore, TrustBundle,
};

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = EngineConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let store = MemoryStore::new();
    seed_bundles(&store, &config).await?;

    let transport = BundleTransport::new(&config.transport)?;
    let refresher = BundleRefresher::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        transport,
        BundleVerifier::new(),
    );
    let updater = CacheUpdater::new(Arc::new(store.clone()), refresher.clone());

    match cli.command {
        Commands::Run { once: true } => {
            updater.update_bundle_cache().await;
        }
        Commands::Run { once: false } => {
            tokio::select! {
                () = trustsync::scheduler::run(updater, config.update_period()) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown signal received");
                }
            }
        }
        Commands::Refresh { name } => {
            let Some(bundle) = store.find_by_name(&name).await? else {
                bail!("no bundle named {name}");
            };
            let outcome = refresher.refresh(&bundle).await;
            println!("{name}: {outcome}");
        }
        Commands::Status => {
            print_status(&store).await?;
        }
    }

    Ok(())
}

/// Install the tracing subscriber. `RUST_LOG` wins over the verbosity flag.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Insert the configured bundles into the store.
async fn seed_bundles(store: &MemoryStore, config: &EngineConfig) -> anyhow::Result<()> {
    for seed in &config.bundles {
        let mut bundle =
            TrustBundle::new(seed.name.clone(), seed.url.clone(), seed.refresh_interval_secs);
        if let Some(path) = &seed.signing_cert {
            let der = load_signing_cert(path)
                .with_context(|| format!("loading signing cert {}", path.display()))?;
            bundle = bundle.with_signing_cert(der);
        }
        store.insert(bundle).await?;
    }
    info!(bundles = config.bundles.len(), "seeded bundle store");
    Ok(())
}

/// Read a signer certificate as PEM or raw DER.
fn load_signing_cert(path: &Path) -> anyhow::Result<Vec<u8>> {
    let raw = std::fs::read(path)?;
    if let Ok(pems) = pem::parse_many(&raw) {
        if let Some(block) = pems.iter().find(|p| p.tag() == "CERTIFICATE") {
            return Ok(block.contents().to_vec());
        }
    }
    Ok(raw)
}

/// Print one line per bundle with its refresh state.
async fn print_status(store: &MemoryStore) -> anyhow::Result<()> {
    let mut bundles = store.list().await?;
    bundles.sort_by(|a, b| a.bundle_name.cmp(&b.bundle_name));

    for bundle in bundles {
        let last_attempt = bundle
            .last_refresh_attempt
            .map_or_else(|| "never".to_string(), |t| t.to_rfc3339());
        let last_success = bundle
            .last_successful_refresh
            .map_or_else(|| "never".to_string(), |t| t.to_rfc3339());
        println!(
            "{}  {}  interval={}s  outcome={}  attempted={}  succeeded={}",
            bundle.bundle_name,
            bundle.bundle_url,
            bundle.refresh_interval_secs,
            bundle.last_refresh_error,
            last_attempt,
            last_success,
        );
    }
    Ok(())
}
