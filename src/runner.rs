// src/runner.rs
//
// Season runner: the outer driver loop around the coordinator.
//
// Runs a fixed number of days, resets the field every `season_length` days
// (agents and accuracy carry across seasons), forwards every day report to
// an EventSink, and returns a serializable summary of the run.

use serde::{Deserialize, Serialize};

use crate::accuracy::AccuracySummary;
use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::error::SimResult;
use crate::logging::EventSink;
use crate::types::Action;

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub days: u64,
    pub seasons: u64,
    pub n_sector: usize,
    pub n_observation: usize,
    pub max_wait_fast: i64,
    pub max_wait_slow: i64,
    pub season_length: u64,
    /// Days on which the fast agent screened the field.
    pub fast_activations: u64,
    /// Days on which the slow agent inspected a sector.
    pub slow_activations: u64,
    /// CTAs queued over the whole run.
    pub ctas_raised: u64,
    /// CTAs still waiting when the run ended.
    pub final_queue_len: usize,
    pub fast_updates: u64,
    pub slow_updates: u64,
    /// Greedy action per observation bucket (`None` = tie).
    pub fast_policy: Vec<Option<Action>>,
    pub slow_policy: Vec<Option<Action>>,
    pub accuracy: AccuracySummary,
}

/// Owns a coordinator and a sink and runs whole simulations.
pub struct SeasonRunner<S: EventSink> {
    coordinator: Coordinator,
    sink: S,
    seed: u64,
    fast_activations: u64,
    slow_activations: u64,
    ctas_raised: u64,
}

impl<S: EventSink> SeasonRunner<S> {
    pub fn new(config: Config, seed: u64, sink: S) -> SimResult<Self> {
        Ok(Self::from_coordinator(Coordinator::new(config, seed)?, seed, sink))
    }

    /// Wrap an existing coordinator (e.g. one with pre-trained agents).
    pub fn from_coordinator(coordinator: Coordinator, seed: u64, sink: S) -> Self {
        Self {
            coordinator,
            sink,
            seed,
            fast_activations: 0,
            slow_activations: 0,
            ctas_raised: 0,
        }
    }

    /// Run `days` more days, resetting the season on schedule.
    pub fn run(&mut self, days: u64) -> SimResult<RunSummary> {
        let season_length = self.coordinator.config().season_length;
        for _ in 0..days {
            let run_day = self.coordinator.run_day();
            if run_day > 0 && run_day % season_length == 0 {
                self.coordinator.reset_season()?;
                self.sink
                    .log_season_reset(self.coordinator.season(), run_day);
            }

            let report = self.coordinator.simulate_day()?;
            if let Some(fast) = &report.fast {
                self.fast_activations += 1;
                self.ctas_raised += fast.ctas.len() as u64;
            }
            if report.slow.is_some() {
                self.slow_activations += 1;
            }
            self.sink.log_day(&report);
        }

        let summary = self.summary();
        self.sink.log_summary(&summary);
        Ok(summary)
    }

    pub fn summary(&self) -> RunSummary {
        let c = &self.coordinator;
        let cfg = c.config();
        RunSummary {
            seed: self.seed,
            days: c.run_day(),
            seasons: c.season() + 1,
            n_sector: cfg.n_sector,
            n_observation: cfg.n_observation,
            max_wait_fast: cfg.max_wait_fast,
            max_wait_slow: cfg.max_wait_slow,
            season_length: cfg.season_length,
            fast_activations: self.fast_activations,
            slow_activations: self.slow_activations,
            ctas_raised: self.ctas_raised,
            final_queue_len: c.slow_queue().len(),
            fast_updates: c.fast_agent().total_updates(),
            slow_updates: c.slow_agent().total_updates(),
            fast_policy: c.fast_agent().greedy_policy(),
            slow_policy: c.slow_agent().greedy_policy(),
            accuracy: c.accuracy().summary(),
        }
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Convenience: run one seeded simulation with no telemetry.
pub fn run_once(config: Config, seed: u64, days: u64) -> SimResult<RunSummary> {
    let mut runner = SeasonRunner::new(config, seed, crate::logging::NoopSink)?;
    runner.run(days)
}
