use anyhow::{Context, Result};
use clap::Parser;
use dump2dot::{
    attribution, cli::Cli, critical_path, export, graph::MemoryGraph, kinds, selector,
    summary::DumpSummary,
};
use tracing_subscriber::EnvFilter;

/// Initialize tracing: warnings by default, everything with --debug
fn init_tracing(debug: bool) {
    let level = if debug {
        tracing::Level::TRACE
    } else {
        tracing::Level::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    // Configuration problems are rejected before the dump is touched
    let config = args
        .export_config()
        .context("Failed to load export configuration")?;
    config.validate()?;

    let (mut graph, report) = MemoryGraph::import(&args.input)
        .with_context(|| format!("Failed to import {}", args.input.display()))?;

    attribution::attribute(&mut graph);
    critical_path::mark_critical(&mut graph);

    let selection = selector::select(&graph, &config.node_paths, &config.labels);
    let stats = export::export_to_file(&graph, &selection.roots, &config, kinds::kind_name)
        .context("Failed to export graph")?;

    if args.summary {
        let summary = DumpSummary::new(&graph, &report, &selection, stats);
        println!("{}", summary.to_json()?);
    }

    Ok(())
}
