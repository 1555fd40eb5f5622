//! CLI entry point for the concurrent fuzz driver.
//!
//! Mirrors the teacher's `services/emulator` binary: `clap` derive for
//! arguments, `tracing-subscriber` with an `EnvFilter` driven by
//! `RUST_LOG` for output. Exits non-zero when the run doesn't end clean
//! so it composes with CI the same way the teacher's emulator does.

use clap::Parser;
use fuzz_harness::{run, FuzzConfig};
use tracing_subscriber::EnvFilter;

/// Drive a many-threaded, fully-meshed StorageP2P exchange over shared
/// in-memory storage and report whether every connection drained clean.
#[derive(Parser, Debug)]
#[command(name = "fuzz-harness", version, about)]
struct Args {
    /// Number of simulated endpoints (fully meshed: endpoints*(endpoints-1) connections).
    #[arg(long, default_value_t = 7)]
    endpoints: usize,

    /// Send/drain iterations each endpoint's thread runs.
    #[arg(long, default_value_t = 167)]
    iterations: usize,

    /// Per-storage-call injected transient failure probability.
    #[arg(long, default_value_t = 0.0)]
    error_rate: f64,

    /// Seed for the fault injector and per-endpoint RNGs.
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let report = run(FuzzConfig {
        endpoints: args.endpoints,
        iterations: args.iterations,
        error_rate: args.error_rate,
        seed: args.seed,
    });

    if report.is_clean() {
        println!("clean: every connection's tx == rx, storage empty");
    } else {
        println!(
            "NOT CLEAN: {} blobs remaining, {} mismatched connections",
            report.storage_entries_remaining,
            report.mismatches.len()
        );
        for m in &report.mismatches {
            println!("  {} -> {}: tx={} rx={}", m.from, m.to, m.tx, m.rx);
        }
        std::process::exit(1);
    }
}
