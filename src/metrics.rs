// src/metrics.rs
//
// Online aggregation helpers for multi-seed evaluation.
// - RunningStat: Welford running mean/stddev + min/max of one quantity.
// - AccuracyStats: per-agent accuracy aggregates over many run summaries.

use serde::{Deserialize, Serialize};

use crate::accuracy::AgentRole;
use crate::runner::RunSummary;

#[derive(Debug, Clone, Copy)]
pub struct RunningStat {
    n: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for RunningStat {
    fn default() -> Self {
        Self {
            n: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl RunningStat {
    /// Non-finite samples are ignored.
    pub fn push(&mut self, x: f64) {
        if !x.is_finite() {
            return;
        }
        self.n += 1;
        self.min = self.min.min(x);
        self.max = self.max.max(x);
        let delta = x - self.mean;
        self.mean += delta / (self.n as f64);
        self.m2 += delta * (x - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.n
    }

    pub fn mean(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample standard deviation (n - 1).
    pub fn stddev(&self) -> f64 {
        if self.n <= 1 {
            0.0
        } else {
            (self.m2 / ((self.n as f64) - 1.0)).sqrt()
        }
    }

    pub fn snapshot(&self) -> StatSnapshot {
        StatSnapshot {
            n: self.n,
            mean: self.mean(),
            stddev: self.stddev(),
            min: if self.n == 0 { 0.0 } else { self.min },
            max: if self.n == 0 { 0.0 } else { self.max },
        }
    }
}

/// Serializable view of a RunningStat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatSnapshot {
    pub n: u64,
    pub mean: f64,
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
}

/// Accuracy aggregates across runs, one set per agent.
#[derive(Debug, Clone, Default)]
pub struct AccuracyStats {
    fast_accuracy: RunningStat,
    slow_accuracy: RunningStat,
    ctas_raised: RunningStat,
    final_queue_len: RunningStat,
    runs: u64,
}

impl AccuracyStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_run(&mut self, summary: &RunSummary) {
        self.runs += 1;
        // Runs where an agent never decided carry no accuracy signal.
        if summary.accuracy.fast.decisions > 0 {
            self.fast_accuracy.push(summary.accuracy.fast.accuracy_pct);
        }
        if summary.accuracy.slow.decisions > 0 {
            self.slow_accuracy.push(summary.accuracy.slow.accuracy_pct);
        }
        self.ctas_raised.push(summary.ctas_raised as f64);
        self.final_queue_len.push(summary.final_queue_len as f64);
    }

    pub fn runs(&self) -> u64 {
        self.runs
    }

    pub fn accuracy(&self, role: AgentRole) -> &RunningStat {
        match role {
            AgentRole::Fast => &self.fast_accuracy,
            AgentRole::Slow => &self.slow_accuracy,
        }
    }

    pub fn snapshot(&self) -> AccuracyStatsSnapshot {
        AccuracyStatsSnapshot {
            runs: self.runs,
            fast_accuracy_pct: self.fast_accuracy.snapshot(),
            slow_accuracy_pct: self.slow_accuracy.snapshot(),
            ctas_raised: self.ctas_raised.snapshot(),
            final_queue_len: self.final_queue_len.snapshot(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyStatsSnapshot {
    pub runs: u64,
    pub fast_accuracy_pct: StatSnapshot,
    pub slow_accuracy_pct: StatSnapshot,
    pub ctas_raised: StatSnapshot,
    pub final_queue_len: StatSnapshot,
}
