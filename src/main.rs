// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::Context;
use std::env;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use blockflow::blocks::LocalBlockFactory;
use blockflow::config::{load_and_validate_config, load_schema_file, RuntimeBuilder};
use blockflow::engine::RunReport;
use blockflow::observability::init_tracing;
use blockflow::traits::MemoryResultSink;

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 3 {
        eprintln!("Usage: {} <engine.yaml|toml|json> <schema.json|yaml>", args[0]);
        eprintln!(
            "Example: {} configs/engine-concurrent.toml configs/parallel-delays.yaml",
            args[0]
        );
        std::process::exit(1);
    }

    match run(&args[1], &args[2]).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Load, run once and print. Returns whether every block finished.
async fn run(config_path: &str, schema_path: &str) -> anyhow::Result<bool> {
    let config = load_and_validate_config(config_path)
        .with_context(|| format!("loading engine config '{}'", config_path))?;
    if let Err(e) = init_tracing(config.log_filter()) {
        eprintln!("warning: {}", e);
    }

    let schema = load_schema_file(schema_path)
        .with_context(|| format!("loading schema '{}'", schema_path))?;

    let results = Arc::new(MemoryResultSink::new());
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut builder = RuntimeBuilder::new(config);
    LocalBlockFactory::register_all(builder.registry_mut(), results.clone())?;
    let engine = builder.with_sink(Arc::new(events_tx)).build()?;

    println!("🧱 blockflow");
    println!("Config: {} ({} mode)", config_path, engine.config().mode);
    println!("Schema: {}", schema_path);
    println!();

    engine.load_schema(Some(&schema))?;
    println!("Execution order: {}", engine.execution_order()?.join(" -> "));
    println!();

    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            println!("  {}", event);
        }
    });

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let report = engine.execute(cancel).await?;
    // Dropping the engine closes the event channel so the printer can drain and exit.
    drop(engine);
    printer.await.context("event printer task failed")?;

    print_results(&results);
    print_report(&report);
    Ok(report.success())
}

fn print_results(results: &MemoryResultSink) {
    let published = results.results();
    if published.is_empty() {
        return;
    }
    println!();
    println!("📦 Results:");
    for result in published {
        println!("  {} [{}] = {}", result.instance_id, result.label, result.value);
    }
}

fn print_report(report: &RunReport) {
    println!();
    for failure in report.failures() {
        println!("❌ {}", failure);
    }
    let marker = if report.success() { "✅" } else { "⚠️" };
    println!("{} {}", marker, report.summary);
}
