//! ADDF core library.
//!
//! A two-tier stress-detection simulator: a fast agent screens every sector
//! of a field at coarse fidelity every few days and flags sectors into a
//! FIFO queue; a slow agent inspects queued sectors one at a time at fine
//! fidelity. Rewards for both agents are derived from the
//! slow agent's verdict and the hidden ground truth.
//!
//! The binaries (`src/main.rs`, `src/bin/monte_carlo.rs`) are thin drivers
//! around these components.
//!
//! # Layout
//!
//! - **environment**: hidden sector states, layered observation model,
//!   day-indexed transition model.
//! - **agent**: tabular delayed-reward learner (one type, two instances).
//! - **coordinator**: the per-day fast/slow protocol and credit assignment.
//! - **accuracy**: confusion-matrix bookkeeping per agent.
//! - **runner**: season-aware driver loop producing a `RunSummary`.
//! - **logging**: telemetry sinks (noop, in-memory, JSONL file).
//! - **metrics**: multi-run aggregates for Monte Carlo evaluation.

pub mod accuracy;
pub mod agent;
pub mod config;
pub mod coordinator;
pub mod environment;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod runner;
pub mod types;

// --- Re-exports for ergonomic external use ---------------------------------

pub use accuracy::{AccuracyMatrix, AccuracySummary, AgentAccuracy, AgentRole, ConfusionCounts, Outcome};

pub use agent::DelayedRewardAgent;

pub use config::{Config, ConfigError, Preset};

pub use coordinator::{
    assign_credit, Coordinator, CreditAssignment, DayReport, FastReport, RewardApplication,
    SlowReport,
};

pub use environment::{CropField, ObservationModel, TransitionModel, TRANSITION_HORIZON};

pub use error::{SimError, SimResult};

pub use logging::{EventSink, FileSink, MemorySink, NoopSink};

pub use metrics::{AccuracyStats, AccuracyStatsSnapshot, RunningStat};

pub use runner::{run_once, RunSummary, SeasonRunner};

pub use types::{Action, CtaRecord, Day, IndexError, Layer, Observation, SectorId, SectorState};
