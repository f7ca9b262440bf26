// src/config.rs
//
// Central configuration for the ADDF simulator.
//
// This is the single source of truth for the field size, observation
// granularity and the two agent cadences. Values start from a named preset
// (`standard` unless ADDF_PRESET or --preset says otherwise), can be
// overridden through ADDF_* environment variables (research sweeps), and are
// finally overridden by CLI flags in the binaries.

use std::fmt;

/// Named starting points for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// The defaults: 3 sectors, 5 buckets, waits (3, 1), 24-day seasons.
    Standard,
    /// A larger field that keeps the inspection queue under pressure.
    Wide,
    /// Finer observation buckets on the standard field.
    Fine,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Standard, Preset::Wide, Preset::Fine];

    /// Stable lowercase name (used in logs and run headers).
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Standard => "standard",
            Preset::Wide => "wide",
            Preset::Fine => "fine",
        }
    }

    /// Parse a preset name (case-insensitive). Returns None if unrecognized.
    pub fn parse(s: &str) -> Option<Preset> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "std" | "default" => Some(Preset::Standard),
            "wide" | "w" => Some(Preset::Wide),
            "fine" | "f" => Some(Preset::Fine),
            _ => None,
        }
    }
}

/// Simulator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of independently evolving sectors (>= 1).
    pub n_sector: usize,
    /// Observation discretization granularity (>= 2).
    pub n_observation: usize,
    /// Days between fast-agent screenings (>= 1).
    pub max_wait_fast: i64,
    /// Days between slow-agent inspections (>= 1).
    pub max_wait_slow: i64,
    /// Heuristic cap on filler CTAs passed down when no stress is detected.
    ///
    /// Accepted and carried through to both agents, but not consulted by any
    /// decision logic.
    pub max_filler: Option<usize>,
    /// Days per season; the driver resets the environment at this cadence.
    pub season_length: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            n_sector: 3,
            n_observation: 5,
            max_wait_fast: 3,
            max_wait_slow: 1,
            max_filler: None,
            season_length: 24,
        }
    }
}

impl Config {
    pub fn for_preset(preset: Preset) -> Self {
        match preset {
            Preset::Standard => Self::default(),
            Preset::Wide => Self {
                n_sector: 12,
                max_wait_fast: 4,
                ..Self::default()
            },
            Preset::Fine => Self {
                n_observation: 10,
                ..Self::default()
            },
        }
    }

    /// Construct a config with explicit field size and cadences.
    pub fn new(n_sector: usize, n_observation: usize, delays: (i64, i64)) -> Self {
        Self {
            n_sector,
            n_observation,
            max_wait_fast: delays.0,
            max_wait_slow: delays.1,
            ..Self::default()
        }
    }

    pub fn with_max_filler(mut self, max_filler: Option<usize>) -> Self {
        self.max_filler = max_filler;
        self
    }

    pub fn with_season_length(mut self, season_length: u64) -> Self {
        self.season_length = season_length;
        self
    }

    /// ADDF_PRESET (or `standard`) plus ADDF_* environment overrides.
    pub fn from_env() -> Self {
        Self::resolve(None)
    }

    /// Preset precedence: `cli_preset`, then ADDF_PRESET, then `standard`.
    /// ADDF_* field overrides are applied on top.
    pub fn resolve(cli_preset: Option<Preset>) -> Self {
        let preset = cli_preset
            .or_else(env_preset)
            .unwrap_or(Preset::Standard);
        let mut cfg = Self::for_preset(preset);
        cfg.apply_env_overrides();
        cfg
    }

    /// Apply ADDF_* environment overrides in place.
    ///
    /// Unparsable values are reported on stderr and ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = env_parse::<usize>("ADDF_SECTORS") {
            self.n_sector = v;
        }
        if let Some(v) = env_parse::<usize>("ADDF_OBSERVATIONS") {
            self.n_observation = v;
        }
        if let Some(v) = env_parse::<i64>("ADDF_MAX_WAIT_FAST") {
            self.max_wait_fast = v;
        }
        if let Some(v) = env_parse::<i64>("ADDF_MAX_WAIT_SLOW") {
            self.max_wait_slow = v;
        }
        if let Some(v) = env_parse::<usize>("ADDF_MAX_FILLER") {
            self.max_filler = Some(v);
        }
        if let Some(v) = env_parse::<u64>("ADDF_SEASON_LENGTH") {
            self.season_length = v;
        }
    }

    /// Reject configurations the simulator cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_sector < 1 {
            return Err(ConfigError::SectorCount(self.n_sector));
        }
        if self.n_observation < 2 {
            return Err(ConfigError::ObservationGranularity(self.n_observation));
        }
        if self.max_wait_fast < 1 {
            return Err(ConfigError::Cooldown {
                agent: "fast",
                value: self.max_wait_fast,
            });
        }
        if self.max_wait_slow < 1 {
            return Err(ConfigError::Cooldown {
                agent: "slow",
                value: self.max_wait_slow,
            });
        }
        if self.season_length < 1 {
            return Err(ConfigError::SeasonLength(self.season_length));
        }
        Ok(())
    }
}

fn env_preset() -> Option<Preset> {
    let raw = std::env::var("ADDF_PRESET").ok()?;
    let preset = Preset::parse(&raw);
    if preset.is_none() {
        eprintln!("addf: ignoring ADDF_PRESET={raw:?} (unknown preset)");
    }
    preset
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            eprintln!("addf: ignoring {key}={raw:?} (not a valid value)");
            None
        }
    }
}

/// Invalid simulator configuration. Fatal: nothing can be simulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    SectorCount(usize),
    ObservationGranularity(usize),
    Cooldown { agent: &'static str, value: i64 },
    SeasonLength(u64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::SectorCount(n) => {
                write!(f, "sector count must be >= 1 (got {})", n)
            }
            ConfigError::ObservationGranularity(n) => {
                write!(f, "observation granularity must be >= 2 (got {})", n)
            }
            ConfigError::Cooldown { agent, value } => {
                write!(f, "{} agent cooldown must be >= 1 day (got {})", agent, value)
            }
            ConfigError::SeasonLength(n) => {
                write!(f, "season length must be >= 1 day (got {})", n)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
