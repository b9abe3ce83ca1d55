//! Viewport Router CLI
//!
//! Drives a router built from a TOML description through a list of steps
//! and prints the resulting history.
//!
//! ```text
//! viewport-router --config app.toml shell@main/detail(3)@right back forward
//! ```
//!
//! Steps: `back`, `forward`, `refresh`, `replace:<path>`, anything else is
//! navigated to as a path.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;

use viewport_router::config::load_config;
use viewport_router::navigation::{HistoryStore, MemoryHistoryStore, NavigationEntry, StoredEntry};
use viewport_router::observability::{logging, metrics};
use viewport_router::{Router, RouterOptions};

#[derive(Parser)]
#[command(name = "viewport-router")]
#[command(about = "Run navigation steps against a viewport router", long_about = None)]
struct Cli {
    /// Router configuration (TOML)
    #[arg(short, long)]
    config: PathBuf,

    /// History file to load before and save after the run
    #[arg(short, long)]
    state: Option<PathBuf>,

    /// Navigation steps
    steps: Vec<String>,
}

#[derive(Serialize)]
struct HistoryReport {
    current: Option<StoredEntry>,
    entries: Vec<StoredEntry>,
    active_components: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    logging::init(&config.observability);
    metrics::set_enabled(config.observability.metrics_enabled);

    tracing::info!(
        config = %cli.config.display(),
        viewports = config.viewports.len(),
        components = config.components.len(),
        guard_limit = config.navigation.guard_limit,
        "Configuration loaded"
    );

    let state_path = cli
        .state
        .or_else(|| config.history.persist_path.clone().map(PathBuf::from));
    let store = Arc::new(match &state_path {
        Some(path) => MemoryHistoryStore::load_from_file(path)?,
        None => MemoryHistoryStore::new(),
    });
    let restored = !store.is_empty();

    let router = Router::from_config(&config, store.clone())?;
    router.activate(RouterOptions::default())?;

    if restored {
        if let Some(saved) = store.state().await? {
            let mut entry: NavigationEntry = saved.entry.into();
            entry.replacing = true;
            entry.refreshing = true;
            router.navigator().navigate(entry).await?;
            tracing::info!(path = ?saved_path(&router), "History restored");
        }
    }

    let mut steps = cli.steps;
    if steps.is_empty() && !restored {
        // Load the default viewports.
        steps.push(String::new());
    }

    for step in &steps {
        let completion = match step.as_str() {
            "back" => router.back(),
            "forward" => router.forward(),
            "refresh" => router.refresh(),
            other => match other.strip_prefix("replace:") {
                Some(path) => router.replace(path, None, None),
                None => router.goto(other, None, None),
            },
        };
        match completion.await {
            Ok(()) => tracing::info!(step = %step, path = ?saved_path(&router), "Step done"),
            Err(e) => tracing::error!(step = %step, error = %e, "Step failed"),
        }
    }

    let report = HistoryReport {
        current: router.navigator().current_entry().map(|e| e.to_storable()),
        entries: router.navigator().entries(),
        active_components: router.active_components(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    store.save_to_file()?;
    router.deactivate()?;
    Ok(())
}

fn saved_path(router: &Router) -> Option<String> {
    router.navigator().current_entry().and_then(|e| e.path)
}
