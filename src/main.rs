// Command-line entry point for TraceSift.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use tracesift::api::server;
use tracesift::application::{Config, DistillOptions, DistillUsecase};
use tracesift::domain::distill::DEFAULT_MAX_ITERATIONS;
use tracesift::infrastructure::config_loader::load_file_config;
use tracesift::infrastructure::distill_cache::{file_mtime, DistillCache};
use tracesift::infrastructure::{concurrency, FsRuleStore, FsTraceSource};
use tracesift::ports::graph_exporter::GraphExporter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Proof id to distill (expects <id>.k.log under the data dir)
    #[arg(short, long)]
    proof_id: Option<String>,

    /// Directory holding trace logs and rule blobs
    #[arg(short, long)]
    data_dir: Option<String>,

    /// Output file path (stdout when omitted)
    #[arg(short, long)]
    output: Option<String>,

    /// Output format (dot, json)
    #[arg(short, long, default_value = "dot")]
    format: String,

    /// Keep the full raw graph instead of collapsing non-step transitions
    #[arg(long)]
    no_prune: bool,

    /// Narrate distillation progress
    #[arg(short, long)]
    verbose: bool,

    /// Skip the distillation result cache
    #[arg(long)]
    no_cache: bool,

    /// Frontier iteration bound
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Config file path (default: ./tracesift.toml)
    #[arg(long)]
    config: Option<String>,

    /// Run as a JSON-over-TCP daemon on this port
    #[arg(long)]
    serve: Option<u16>,
}

/// Merge CLI flags, the optional config file and the legacy KLAB_OUT
/// environment fallback into one explicit Config value.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| "tracesift.toml".to_string());
    let file_config = load_file_config(std::path::Path::new(&config_path))?;

    let data_dir = cli
        .data_dir
        .clone()
        .or(file_config.data_dir)
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let out = std::env::var("KLAB_OUT").unwrap_or_else(|_| "out".to_string());
            PathBuf::from(out).join("data")
        });

    let max_iterations = cli
        .max_iterations
        .or(file_config.max_iterations)
        .unwrap_or(DEFAULT_MAX_ITERATIONS);

    Ok(Config {
        data_dir,
        max_iterations,
    })
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    if let Err(e) = concurrency::init_thread_pool() {
        eprintln!("[WARN] Thread pool already initialized: {}", e);
    }

    if let Some(port) = cli.serve {
        return server::start_server(port, config);
    }

    let proof_id = cli
        .proof_id
        .as_deref()
        .context("Please provide --proof-id <id> (or --serve <port>)")?;
    let prune = !cli.no_prune;

    let trace_source = FsTraceSource::new(&config.data_dir);
    let rule_store = FsRuleStore::new(&config.data_dir);

    // Cached result shortcut, validated against the log's mtime.
    let cache = if cli.no_cache {
        None
    } else {
        DistillCache::open(&config.data_dir).ok()
    };
    let log_mtime = file_mtime(&trace_source.trace_path(proof_id)).ok();

    let result = match (&cache, log_mtime) {
        (Some(cache), Some(mtime)) => match cache.get(proof_id, mtime, prune) {
            Some(hit) => {
                if cli.verbose {
                    println!("[Cache] Using cached result for {}", proof_id);
                }
                hit
            }
            None => {
                let usecase = DistillUsecase {
                    trace_source: &trace_source,
                    rule_store: &rule_store,
                    max_iterations: config.max_iterations,
                };
                let fresh = usecase.run(
                    proof_id,
                    DistillOptions {
                        prune,
                        verbose: cli.verbose,
                    },
                )?;
                if let Err(e) = cache.put(proof_id, mtime, prune, &fresh) {
                    eprintln!("[Cache] Warning: failed to store result: {}", e);
                }
                fresh
            }
        },
        _ => {
            let usecase = DistillUsecase {
                trace_source: &trace_source,
                rule_store: &rule_store,
                max_iterations: config.max_iterations,
            };
            usecase.run(
                proof_id,
                DistillOptions {
                    prune,
                    verbose: cli.verbose,
                },
            )?
        }
    };

    let rendered = match cli.format.as_str() {
        "json" => serde_json::to_string_pretty(&result)?,
        "dot" => GraphExporter::to_dot(&result),
        other => anyhow::bail!("Unknown format: {} (expected dot or json)", other),
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write output to {}", path))?;
            println!(
                "Distillation completed! Output written to {} (format: {})",
                path, cli.format
            );
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}
