//  ██████╗ ██████╗ ███╗   ██╗████████╗███████╗███████╗████████╗
// ██╔════╝██╔═══██╗████╗  ██║╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
// ██║     ██║   ██║██╔██╗ ██║   ██║   █████╗  ███████╗   ██║
// ██║     ██║   ██║██║╚██╗██║   ██║   ██╔══╝  ╚════██║   ██║
// ╚██████╗╚██████╔╝██║ ╚████║   ██║   ███████╗███████║   ██║
//  ╚═════╝ ╚═════╝ ╚═╝  ╚═══╝   ╚═╝   ╚══════╝╚══════╝   ╚═╝
//
// R A D A R
//
// One pass over every judge we know about, every fallback tried, every
// batched aggregator call made exactly once. Then a table of what's next.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use contest_radar_engine::config::Config;
use contest_radar_engine::loaders::LoaderRegistry;
use contest_radar_engine::metrics::{InstrumentedReceiver, LoadingMetrics};
use contest_radar_engine::models::sort_contests;
use contest_radar_engine::receiver::StorageReceiver;
use contest_radar_engine::storage::InMemoryContestsStorage;
use contest_radar_engine::ContestsLoadingEngine;

fn print_banner() {
    let banner = r#"

    ╔══════════════════════════════════════════════════════════════╗
    ║                                                              ║
    ║        📡  C O N T E S T   R A D A R  📡                     ║
    ║                                                              ║
    ║   Sources:   Codeforces | DMOJ | CodeChef | CLIST            ║
    ║   Fallback:  per-platform loader chains                      ║
    ║   Batching:  one aggregator call per pass, shared by all     ║
    ║                                                              ║
    ║   "Never miss a round again."                                ║
    ║                                                              ║
    ╚══════════════════════════════════════════════════════════════╝

    "#;
    println!("{}", banner);
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(false)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_names(true)
            .with_ansi(true)
            .init();
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(config.log_json);

    if !config.log_json {
        print_banner();
    }

    info!("📡 CONTEST RADAR initializing...");

    let registry = Arc::new(LoaderRegistry::from_config(&config).context("building loaders")?);
    let setup = config.setup();
    info!(
        platforms = setup.len(),
        clist = config.clist_credentials().is_some(),
        "✅ Configuration loaded"
    );

    let now = Utc::now();
    let constraints = config.date_constraints(now);

    let storage = Arc::new(InMemoryContestsStorage::new());
    let metrics = Arc::new(LoadingMetrics::new());
    let receiver = Arc::new(InstrumentedReceiver::new(
        StorageReceiver::new(Arc::clone(&storage)),
        Arc::clone(&metrics),
    ));

    let engine = ContestsLoadingEngine::new(registry);

    tokio::select! {
        _ = engine.run(&setup, constraints, receiver) => {}
        _ = signal::ctrl_c() => {
            // dropping the pass aborts every platform task
            warn!("🛑 Interrupted, abandoning the pass");
        }
    }

    let mut contests = storage.contests();
    sort_contests(&mut contests, now);
    for contest in &contests {
        println!("[{}] {}", contest.phase_at(now), contest);
    }

    let snapshot = serde_json::to_string(&metrics.snapshot()).context("serializing metrics")?;
    info!(metrics = snapshot.as_str(), contests = contests.len(), "📊 Pass summary");

    Ok(())
}
