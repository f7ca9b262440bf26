// src/coordinator.rs
//
// Two-time-scale coordination between the fast (coarse, all sectors) and
// slow (fine, one sector) agents.
//
// Per simulated day:
//   1. Fast track (fast_wait <= 0): observe every sector at the coarse layer,
//      pick an action per sector, queue the flagged sectors (CTAs).
//   2. Slow track (slow_wait <= 0 and queue non-empty): pop the oldest CTA,
//      take a fresh fine-layer observation of that sector, pick a verdict,
//      and route rewards to both agents based on verdict and ground truth.
//   3. Decrement both cooldowns, advance the field one day.
//
// Every read of sector state within a day happens before the field
// advances, so both tracks see the same ground truth.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::accuracy::{AccuracyMatrix, AgentRole, Outcome};
use crate::agent::DelayedRewardAgent;
use crate::config::Config;
use crate::environment::CropField;
use crate::error::SimResult;
use crate::types::{Action, CtaRecord, Day, Layer, Observation, SectorState};

/// Reward applied to one agent for one `(observation, action)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardApplication {
    pub role: AgentRole,
    pub observation: Observation,
    pub action: Action,
    pub reward: f64,
}

/// Rewards owed after a slow-agent verdict. `None` means that agent does
/// not learn from this verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreditAssignment {
    pub slow_reward: Option<f64>,
    pub fast_reward: Option<f64>,
}

/// Cross-agent credit assignment.
///
/// - Verdict no-action: the slow agent overrides the fast flag as a false
///   alarm; only the fast agent learns, with `1 - fast_action`.
/// - Verdict act on a healthy sector: both flags were unwarranted; each agent
///   gets `1 - action`.
/// - Verdict act on a stressed sector: both flags were warranted; each agent
///   gets `action`.
pub fn assign_credit(fast_action: Action, verdict: Action, truth: SectorState) -> CreditAssignment {
    let fast = fast_action.value();
    let slow = verdict.value();
    match (verdict, truth) {
        (Action::NoAction, _) => CreditAssignment {
            slow_reward: None,
            fast_reward: Some(1.0 - fast),
        },
        (Action::Act, SectorState::NoStress) => CreditAssignment {
            slow_reward: Some(1.0 - slow),
            fast_reward: Some(1.0 - fast),
        },
        (Action::Act, SectorState::Stress) => CreditAssignment {
            slow_reward: Some(slow),
            fast_reward: Some(fast),
        },
    }
}

/// What the fast agent did on a screening day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FastReport {
    /// Coarse observation per sector, in sector order.
    pub observations: Vec<Observation>,
    /// Chosen action per sector, in sector order.
    pub actions: Vec<Action>,
    /// Flagged sectors, in the order they were queued.
    pub ctas: Vec<CtaRecord>,
    /// Sectors the fast agent passed on; reported, never queued.
    pub extras: Vec<CtaRecord>,
}

/// What the slow agent did on an inspection day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlowReport {
    /// The queued CTA that was consumed.
    pub cta: CtaRecord,
    /// Fresh fine-layer observation of the CTA's sector.
    pub observation: Observation,
    pub verdict: Action,
    pub truth: SectorState,
    pub outcome: Outcome,
}

/// Everything that happened on one simulated day, for narration and
/// telemetry sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayReport {
    pub season: u64,
    /// Day within the current season (field day counter).
    pub day: Day,
    /// Day counter across all seasons.
    pub run_day: u64,
    /// Ground-truth sector states seen by both tracks this day.
    pub sectors: Vec<SectorState>,
    pub fast: Option<FastReport>,
    pub slow: Option<SlowReport>,
    pub rewards: Vec<RewardApplication>,
    /// Slow queue length at the end of the day.
    pub queue_len: usize,
}

impl DayReport {
    pub fn fast_acted(&self) -> bool {
        self.fast.is_some()
    }

    pub fn slow_acted(&self) -> bool {
        self.slow.is_some()
    }

    /// Whether the fast agent queued at least one CTA this day.
    pub fn fast_flagged(&self) -> bool {
        self.fast.as_ref().map_or(false, |f| !f.ctas.is_empty())
    }
}

/// Drives the field and both agents one day at a time.
#[derive(Debug, Clone)]
pub struct Coordinator {
    config: Config,
    rng: ChaCha8Rng,
    field: CropField,
    fast: DelayedRewardAgent,
    slow: DelayedRewardAgent,
    fast_wait: i64,
    slow_wait: i64,
    slow_queue: VecDeque<CtaRecord>,
    accuracy: AccuracyMatrix,
    season: u64,
    run_day: u64,
}

impl Coordinator {
    /// Validate `config` and build a seeded coordinator with a fresh field.
    pub fn new(config: Config, seed: u64) -> SimResult<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let field = CropField::new(config.n_sector, config.n_observation, &mut rng)?;
        Ok(Self::assemble(config, rng, field))
    }

    /// Build a coordinator around a prepared field (scripted scenarios).
    ///
    /// Sector count and observation granularity are taken from `field`.
    pub fn with_field(mut config: Config, field: CropField, seed: u64) -> SimResult<Self> {
        config.n_sector = field.n_sector();
        config.n_observation = field.n_observation();
        config.validate()?;
        Ok(Self::assemble(config, ChaCha8Rng::seed_from_u64(seed), field))
    }

    fn assemble(config: Config, rng: ChaCha8Rng, field: CropField) -> Self {
        let fast = DelayedRewardAgent::new(config.n_observation, config.max_filler);
        let slow = DelayedRewardAgent::new(config.n_observation, config.max_filler);
        Self {
            config,
            rng,
            field,
            fast,
            slow,
            fast_wait: 0,
            slow_wait: 0,
            slow_queue: VecDeque::new(),
            accuracy: AccuracyMatrix::new(),
            season: 0,
            run_day: 0,
        }
    }

    /// Simulate one day and advance the field.
    pub fn simulate_day(&mut self) -> SimResult<DayReport> {
        let sectors = self.field.sectors().to_vec();
        let day = self.field.day();
        let mut rewards = Vec::new();

        let fast = if self.fast_wait <= 0 {
            Some(self.fast_track()?)
        } else {
            None
        };

        let slow = if self.slow_wait <= 0 && !self.slow_queue.is_empty() {
            self.slow_track(&mut rewards)?
        } else {
            None
        };

        let report = DayReport {
            season: self.season,
            day,
            run_day: self.run_day,
            sectors,
            fast,
            slow,
            rewards,
            queue_len: self.slow_queue.len(),
        };

        self.fast_wait -= 1;
        self.slow_wait -= 1;
        self.field.iterate_states(&mut self.rng);
        self.run_day += 1;

        Ok(report)
    }

    /// Simulate `days` consecutive days.
    pub fn simulate_days(&mut self, days: u64) -> SimResult<Vec<DayReport>> {
        (0..days).map(|_| self.simulate_day()).collect()
    }

    fn fast_track(&mut self) -> SimResult<FastReport> {
        self.fast_wait = self.config.max_wait_fast;

        let observations = self.field.observe_sectors(Layer::COARSE, &mut self.rng)?;
        let mut actions = Vec::with_capacity(observations.len());
        for &o in &observations {
            actions.push(self.fast.act(o, &mut self.rng)?);
        }

        let mut prioritized: Vec<CtaRecord> = observations
            .iter()
            .zip(&actions)
            .enumerate()
            .map(|(sector, (&observation, &action))| CtaRecord {
                observation,
                action,
                sector,
            })
            .collect();
        // Stable: equal actions keep sector order.
        prioritized.sort_by(|a, b| b.action.cmp(&a.action));
        let (ctas, extras): (Vec<CtaRecord>, Vec<CtaRecord>) =
            prioritized.into_iter().partition(|r| r.action.is_act());

        self.slow_queue.extend(ctas.iter().copied());

        for (&action, &truth) in actions.iter().zip(self.field.sectors()) {
            self.accuracy.record(AgentRole::Fast, action, truth);
        }

        Ok(FastReport {
            observations,
            actions,
            ctas,
            extras,
        })
    }

    fn slow_track(&mut self, rewards: &mut Vec<RewardApplication>) -> SimResult<Option<SlowReport>> {
        let Some(cta) = self.slow_queue.pop_front() else {
            return Ok(None);
        };
        self.slow_wait = self.config.max_wait_slow;

        let observation = self
            .field
            .observe_sector(Layer::FINE, cta.sector, &mut self.rng)?;
        let truth = self.field.sector_state(cta.sector)?;
        let verdict = self.slow.act(observation, &mut self.rng)?;
        let outcome = self.accuracy.record(AgentRole::Slow, verdict, truth);

        let credit = assign_credit(cta.action, verdict, truth);
        if let Some(reward) = credit.slow_reward {
            self.slow.update_reward(observation, verdict, reward)?;
            rewards.push(RewardApplication {
                role: AgentRole::Slow,
                observation,
                action: verdict,
                reward,
            });
        }
        if let Some(reward) = credit.fast_reward {
            self.fast.update_reward(cta.observation, cta.action, reward)?;
            rewards.push(RewardApplication {
                role: AgentRole::Fast,
                observation: cta.observation,
                action: cta.action,
                reward,
            });
        }

        Ok(Some(SlowReport {
            cta,
            observation,
            verdict,
            truth,
            outcome,
        }))
    }

    /// Start a new season: fresh field, cooldowns cleared, queue emptied.
    /// Agents and accuracy carry over.
    pub fn reset_season(&mut self) -> SimResult<()> {
        self.field = CropField::new(self.config.n_sector, self.config.n_observation, &mut self.rng)?;
        self.fast_wait = 0;
        self.slow_wait = 0;
        self.slow_queue.clear();
        self.season += 1;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn field(&self) -> &CropField {
        &self.field
    }

    pub fn fast_agent(&self) -> &DelayedRewardAgent {
        &self.fast
    }

    pub fn slow_agent(&self) -> &DelayedRewardAgent {
        &self.slow
    }

    /// Mutable access for seeding pre-trained tables.
    pub fn fast_agent_mut(&mut self) -> &mut DelayedRewardAgent {
        &mut self.fast
    }

    /// Mutable access for seeding pre-trained tables.
    pub fn slow_agent_mut(&mut self) -> &mut DelayedRewardAgent {
        &mut self.slow
    }

    pub fn accuracy(&self) -> &AccuracyMatrix {
        &self.accuracy
    }

    pub fn slow_queue(&self) -> &VecDeque<CtaRecord> {
        &self.slow_queue
    }

    pub fn fast_wait(&self) -> i64 {
        self.fast_wait
    }

    pub fn slow_wait(&self) -> i64 {
        self.slow_wait
    }

    pub fn season(&self) -> u64 {
        self.season
    }

    pub fn run_day(&self) -> u64 {
        self.run_day
    }
}
