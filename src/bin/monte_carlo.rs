// src/bin/monte_carlo.rs
//
// Monte Carlo harness: many independent seeded runs, aggregated accuracy.
//
// - Run i uses seed + i; every run owns its own coordinator, so runs share
//   no state and the output is a pure function of the flags.
// - Writes <output-dir>/mc_runs.jsonl (one RunSummary per line, tagged with
//   run_index) and <output-dir>/mc_summary.json (aggregates).
//
// Run examples:
//   cargo run --bin monte_carlo -- --runs 50 --days 240 --seed 1
//   ADDF_SECTORS=8 cargo run --bin monte_carlo -- --runs 100 --days 480 --output-dir runs/mc --quiet

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use addf::{run_once, AccuracyStats, AccuracyStatsSnapshot, Config, Preset, RunSummary};

#[derive(Debug, Parser)]
#[command(name = "monte_carlo", about = "ADDF multi-seed evaluation harness", version)]
struct Args {
    /// Number of runs.
    #[arg(long, default_value_t = 50)]
    runs: u64,

    /// Days per run.
    #[arg(long, default_value_t = 240)]
    days: u64,

    /// Base seed. Run i uses seed + i.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Named config preset: standard, wide or fine.
    #[arg(long, value_parser = parse_preset)]
    preset: Option<Preset>,

    /// Number of sectors in the field.
    #[arg(long)]
    sectors: Option<usize>,

    /// Observation granularity.
    #[arg(long)]
    observations: Option<usize>,

    /// Days between fast-agent screenings.
    #[arg(long)]
    fast_wait: Option<i64>,

    /// Days between slow-agent inspections.
    #[arg(long)]
    slow_wait: Option<i64>,

    /// Days per season before the field is reset.
    #[arg(long)]
    season_length: Option<u64>,

    /// Directory for mc_runs.jsonl and mc_summary.json.
    #[arg(long, default_value = "runs/monte_carlo")]
    output_dir: PathBuf,

    /// Suppress per-run lines; only print the final summary.
    #[arg(long)]
    quiet: bool,
}

#[derive(Serialize)]
struct RunRecord<'a> {
    run_index: u64,
    #[serde(flatten)]
    summary: &'a RunSummary,
}

#[derive(Serialize)]
struct McSummary {
    runs: u64,
    days: u64,
    base_seed: u64,
    n_sector: usize,
    n_observation: usize,
    max_wait_fast: i64,
    max_wait_slow: i64,
    season_length: u64,
    stats: AccuracyStatsSnapshot,
}

fn parse_preset(s: &str) -> Result<Preset, String> {
    Preset::parse(s).ok_or_else(|| format!("unknown preset {s:?} (standard, wide, fine)"))
}

fn build_config(args: &Args) -> Config {
    let mut cfg = Config::resolve(args.preset);
    if let Some(v) = args.sectors {
        cfg.n_sector = v;
    }
    if let Some(v) = args.observations {
        cfg.n_observation = v;
    }
    if let Some(v) = args.fast_wait {
        cfg.max_wait_fast = v;
    }
    if let Some(v) = args.slow_wait {
        cfg.max_wait_slow = v;
    }
    if let Some(v) = args.season_length {
        cfg.season_length = v;
    }
    cfg
}

fn main() -> Result<()> {
    let args = Args::parse();
    anyhow::ensure!(args.runs >= 1, "--runs must be >= 1");

    let cfg = build_config(&args);
    cfg.validate().context("invalid configuration")?;

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating {}", args.output_dir.display()))?;
    let runs_path = args.output_dir.join("mc_runs.jsonl");
    let summary_path = args.output_dir.join("mc_summary.json");

    println!(
        "addf-mc v{} | runs={} days={} seed={} sectors={} observations={} waits=({}, {}) output_dir={}",
        env!("CARGO_PKG_VERSION"),
        args.runs,
        args.days,
        args.seed,
        cfg.n_sector,
        cfg.n_observation,
        cfg.max_wait_fast,
        cfg.max_wait_slow,
        args.output_dir.display()
    );

    let mut writer = BufWriter::new(
        File::create(&runs_path).with_context(|| format!("creating {}", runs_path.display()))?,
    );
    let mut stats = AccuracyStats::new();

    for i in 0..args.runs {
        let run_seed = args.seed.wrapping_add(i);
        let summary = run_once(cfg.clone(), run_seed, args.days)
            .with_context(|| format!("run {i} (seed {run_seed}) failed"))?;

        serde_json::to_writer(
            &mut writer,
            &RunRecord {
                run_index: i,
                summary: &summary,
            },
        )?;
        writer.write_all(b"\n")?;
        stats.add_run(&summary);

        if !args.quiet {
            println!(
                "run {:>4}/{:<4} seed={:<10} fast={:>6.2}% slow={:>6.2}% ctas={:>4} queued={}",
                i + 1,
                args.runs,
                run_seed,
                summary.accuracy.fast.accuracy_pct,
                summary.accuracy.slow.accuracy_pct,
                summary.ctas_raised,
                summary.final_queue_len
            );
        }
    }
    writer.flush()?;

    let snapshot = stats.snapshot();
    let mc = McSummary {
        runs: args.runs,
        days: args.days,
        base_seed: args.seed,
        n_sector: cfg.n_sector,
        n_observation: cfg.n_observation,
        max_wait_fast: cfg.max_wait_fast,
        max_wait_slow: cfg.max_wait_slow,
        season_length: cfg.season_length,
        stats: snapshot,
    };
    fs::write(&summary_path, serde_json::to_string_pretty(&mc)?)
        .with_context(|| format!("writing {}", summary_path.display()))?;

    println!(
        "summary | fast mean={:.2}% sd={:.2} | slow mean={:.2}% sd={:.2} | ctas mean={:.2}",
        snapshot.fast_accuracy_pct.mean,
        snapshot.fast_accuracy_pct.stddev,
        snapshot.slow_accuracy_pct.mean,
        snapshot.slow_accuracy_pct.stddev,
        snapshot.ctas_raised.mean
    );

    Ok(())
}
