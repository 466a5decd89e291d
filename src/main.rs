//! kg-walker - Random Walk Corpus Generator for Knowledge Graphs
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use kg_walker::config::{CliArgs, GenerationConfig};
use kg_walker::generation::WalkGenerationManager;
use kg_walker::ingest::{load_path, LoaderOptions};
use kg_walker::progress::{print_header, print_summary, ProgressReporter};
use kg_walker::selector::{
    ContinuationEntitySelector, EntitySelector, LightEntitySelector, StoreEntitySelector,
};
use kg_walker::store::TripleStore;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = GenerationConfig::from_args(args).context("Invalid configuration")?;

    info!(
        start_time = %Utc::now().to_rfc3339(),
        graph = %config.graph_path.display(),
        mode = %config.mode,
        threads = config.thread_count,
        "Starting walk generation"
    );

    if config.show_progress {
        print_header(
            &config.graph_path.display().to_string(),
            config.mode.name(),
            config.thread_count,
            &config.walk_dir.display().to_string(),
        );
    }

    // Populate the store completely before any sampling starts
    let options = LoaderOptions {
        parse_datatype: config.text_walks,
    };
    let (store, load_stats) = load_path(&config.graph_path, options)
        .with_context(|| format!("Failed to load graph '{}'", config.graph_path.display()))?;
    info!(
        triples = load_stats.triples,
        datatype_facts = load_stats.datatype_facts,
        malformed = load_stats.malformed,
        "Graph loaded"
    );
    let store = Arc::new(store);

    let selector = build_selector(&config, &store);
    let mut manager = WalkGenerationManager::new(Arc::clone(&store), selector);
    if config.show_progress {
        manager = manager.with_progress(ProgressReporter::new());
    }

    let report = manager
        .generate_walks(&config)
        .context("Walk generation failed")?;

    if config.show_progress {
        print_summary(&report, &config.walk_dir.display().to_string());
    }

    if report.errors > 0 {
        info!(errors = report.errors, "Walk generation completed with errors");
    }

    Ok(())
}

/// Full scan or allow-list, optionally wrapped for continuation
fn build_selector(config: &GenerationConfig, store: &Arc<TripleStore>) -> Box<dyn EntitySelector> {
    let base: Box<dyn EntitySelector> = match config.light_entity_file {
        Some(ref file) => Box::new(LightEntitySelector::new(file)),
        None => Box::new(StoreEntitySelector::new(Arc::clone(store))),
    };

    match config.existing_walk_dir {
        Some(ref existing) => Box::new(ContinuationEntitySelector::new(
            existing,
            &config.walk_dir,
            base,
        )),
        None => base,
    }
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("kg_walker=debug,warn")
    } else {
        EnvFilter::new("kg_walker=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
