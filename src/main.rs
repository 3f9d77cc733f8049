//! BasketForge: market basket analysis CLI
//!
//! This is the main entrypoint that orchestrates transaction loading,
//! frequent itemset mining, rule generation and rule ranking.

use anyhow::Result;
use basketforge::{analyze_with, load_transactions, top_rules, AnalysisConfig, Apriori, Args};
use clap::Parser;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    init_logging(args.verbose)?;

    let config = args.resolve_config()?;
    // Reject bad thresholds before touching the input file
    config.mining.validate()?;

    if args.verbose {
        println!("BasketForge - Market Basket Analysis");
        println!("====================================\n");
    }

    run_pipeline(&args, &config)
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(format!("basketforge={}", level).parse()?),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Run the full analysis pipeline
fn run_pipeline(args: &Args, config: &AnalysisConfig) -> Result<()> {
    println!("=== Market Basket Analysis ===\n");

    let start_time = Instant::now();

    // Step 1: Load transactions
    if args.verbose {
        println!("Step 1: Loading transactions");
        println!("  Input file: {}", args.input.display());
        println!("  Layout: {:?}", args.layout);
    }

    let data_start = Instant::now();
    let transactions = load_transactions(&args.input, &args.load_options())?;
    let data_time = data_start.elapsed();

    println!(
        "✓ Data loaded: {} transactions, {} distinct items",
        transactions.len(),
        transactions.num_items()
    );
    if args.verbose {
        println!("  Loading time: {:.2}s", data_time.as_secs_f64());
    }

    // Step 2: Mine itemsets and derive rules
    let mining = &config.mining;
    println!("\nMinimum support: {}", mining.min_support);
    println!("Minimum confidence: {}", mining.min_confidence);
    println!("Minimum lift: {}", mining.min_lift);
    if let Some(max_length) = mining.max_length {
        println!("Maximum itemset size: {}", max_length);
    }

    let verbose = args.verbose;
    let miner = Apriori::from_config(mining).with_progress(move |progress| {
        if verbose {
            println!(
                "  Level {}: {} candidates counted, {} frequent",
                progress.level, progress.candidates, progress.frequent
            );
        }
    });

    let model_start = Instant::now();
    let analysis = analyze_with(&miner, &transactions, mining)?;
    let model_time = model_start.elapsed();

    println!("\n✓ Mining complete");
    if args.verbose {
        println!("  Mining time: {:.2}s", model_time.as_secs_f64());
    }

    // Step 3: Print itemset and rule statistics
    println!("\n=== Frequent Itemsets ===");
    if analysis.itemsets.is_empty() {
        println!("No itemsets meet the minimum support");
    }
    for (i, &count) in analysis.itemsets.level_sizes().iter().enumerate() {
        if count > 0 {
            println!("Size {}: {} itemsets", i + 1, count);
        }
    }

    println!("\n=== Association Rules ===");
    println!("Rules meeting confidence: {}", analysis.rules_before_lift);
    println!(
        "Found {} rules that meet the criteria (lift >= {})",
        analysis.rules.len(),
        mining.min_lift
    );

    let total_rules = analysis.rules.len();
    let ranked = top_rules(analysis.rules, config.sort_by, config.top);
    if !ranked.is_empty() {
        println!(
            "\nDisplaying top {} of {} rules sorted by {}:",
            ranked.len(),
            total_rules,
            config.sort_by
        );
        for rule in &ranked {
            println!("  {}", rule);
        }
    }

    let total_time = start_time.elapsed();
    info!(elapsed_ms = total_time.as_millis() as u64, "Pipeline finished");
    println!("\n=== Analysis Complete ===");
    println!("Total processing time: {:.2}s", total_time.as_secs_f64());

    Ok(())
}
