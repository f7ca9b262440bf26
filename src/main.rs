// src/main.rs
//
// Thin harness around the ADDF library.
// All of the real logic lives in the lib crate (environment, agents,
// coordinator); this binary only parses flags, picks a sink, narrates days
// when asked to, and prints the accuracy report.
//
// Config precedence: CLI flags > ADDF_* environment variables > preset
// (--preset, then ADDF_PRESET, then `standard`).

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};

use addf::{
    Action, AgentRole, Config, CtaRecord, DayReport, EventSink, FileSink, NoopSink, Preset,
    RunSummary, SeasonRunner, SectorState,
};

#[derive(Debug, Parser)]
#[command(
    name = "addf",
    about = "Two-tier fast/slow agent simulator for sector stress detection",
    version
)]
struct Args {
    /// Number of simulated days to run.
    #[arg(long, default_value_t = 24)]
    days: u64,

    /// Deterministic seed for the simulation RNG.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Named config preset: standard, wide or fine.
    #[arg(long, value_parser = parse_preset)]
    preset: Option<Preset>,

    /// Number of sectors in the field.
    #[arg(long)]
    sectors: Option<usize>,

    /// Observation granularity (buckets per layer).
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

    /// Optional JSONL path for per-day telemetry.
    #[arg(long)]
    log_jsonl: Option<String>,

    /// Print the final summary as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Verbosity: -v narrates each day, -vv adds the Q-tables at the end.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
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

/// Build the telemetry sink as a trait object so we can choose between
/// FileSink and NoopSink at runtime.
fn build_sink(log_jsonl: Option<&str>) -> Box<dyn EventSink> {
    match log_jsonl {
        Some(path) => match FileSink::create(path) {
            Ok(s) => Box::new(s),
            Err(err) => {
                eprintln!("Failed to create log file ({path}), falling back to NoopSink: {err}");
                Box::new(NoopSink)
            }
        },
        None => Box::new(NoopSink),
    }
}

/// Wraps another sink and narrates each day to stdout.
struct NarratingSink<S: EventSink> {
    inner: S,
}

impl<S: EventSink> EventSink for NarratingSink<S> {
    fn log_day(&mut self, report: &DayReport) {
        print!("{}", narrate(report));
        self.inner.log_day(report);
    }

    fn log_season_reset(&mut self, season: u64, run_day: u64) {
        println!("--- season {season} starts (run day {run_day}) ---");
        self.inner.log_season_reset(season, run_day);
    }

    fn log_summary(&mut self, summary: &RunSummary) {
        self.inner.log_summary(summary);
    }
}

fn state_glyph(s: SectorState) -> char {
    if s.is_stressed() {
        'S'
    } else {
        '-'
    }
}

fn action_glyph(a: Action) -> char {
    if a.is_act() {
        'F'
    } else {
        '-'
    }
}

fn sector_list(records: &[CtaRecord]) -> String {
    if records.is_empty() {
        return "none".to_string();
    }
    let ids: Vec<String> = records.iter().map(|r| r.sector.to_string()).collect();
    format!("[ {} ]", ids.join(" "))
}

fn narrate(report: &DayReport) -> String {
    let mut out = String::new();
    let states: String = report.sectors.iter().map(|&s| state_glyph(s)).collect();
    out.push_str(&format!(
        "day {:>4} (season {}, day {:>2}) sectors [{}]\n",
        report.run_day + 1,
        report.season,
        report.day + 1,
        states
    ));

    if let Some(fast) = &report.fast {
        let actions: String = fast.actions.iter().map(|&a| action_glyph(a)).collect();
        out.push_str(&format!(
            "    fast: observes {:?} -> [{}], CTAs {} (omitting {})\n",
            fast.observations,
            actions,
            sector_list(&fast.ctas),
            sector_list(&fast.extras)
        ));
    }

    if let Some(slow) = &report.slow {
        out.push_str(&format!(
            "    slow: sector {} observed {} -> {} ({:?})\n",
            slow.cta.sector,
            slow.observation,
            if slow.verdict.is_act() {
                "stress"
            } else {
                "no stress"
            },
            slow.outcome
        ));
    }

    for r in &report.rewards {
        out.push_str(&format!(
            "    {} learns: action {} for observation {} gets reward {}\n",
            r.role.as_str(),
            action_glyph(r.action),
            r.observation,
            r.reward
        ));
    }
    out
}

fn print_summary(summary: &RunSummary) {
    println!(
        "addf | seed={} days={} seasons={} sectors={} observations={} waits=({}, {})",
        summary.seed,
        summary.days,
        summary.seasons,
        summary.n_sector,
        summary.n_observation,
        summary.max_wait_fast,
        summary.max_wait_slow
    );
    println!(
        "  activity: fast={} slow={} ctas={} queued_at_end={}",
        summary.fast_activations,
        summary.slow_activations,
        summary.ctas_raised,
        summary.final_queue_len
    );
    for role in AgentRole::ALL {
        let acc = summary.accuracy.get(role);
        let c = acc.counts;
        println!(
            "  {:<4} accuracy={:>6.2}% decisions={} tp={} tn={} fp={} fn={} positives={} negatives={} flagged={} passed={}",
            role.as_str(),
            acc.accuracy_pct,
            acc.decisions,
            c.true_positive,
            c.true_negative,
            c.false_positive,
            c.false_negative,
            acc.positives,
            acc.negatives,
            acc.flagged,
            acc.passed
        );
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let cfg = build_config(&args);

    let file_sink = build_sink(args.log_jsonl.as_deref());
    let sink: Box<dyn EventSink> = if args.verbose > 0 {
        Box::new(NarratingSink { inner: file_sink })
    } else {
        file_sink
    };

    let mut runner =
        SeasonRunner::new(cfg, args.seed, sink).context("failed to build simulation")?;
    let summary = runner.run(args.days).context("simulation failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    if args.verbose > 1 {
        let c = runner.coordinator();
        println!("  fast q-table: {:?}", c.fast_agent().q_table());
        println!("  slow q-table: {:?}", c.slow_agent().q_table());
    }

    Ok(())
}
