// src/error.rs
//
// Top-level error for the simulation API. Both variants are programmer or
// configuration errors; nothing here is transient or retried.

use std::fmt;

use crate::config::ConfigError;
use crate::types::IndexError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    Config(ConfigError),
    Index(IndexError),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Config(e) => write!(f, "invalid configuration: {}", e),
            SimError::Index(e) => write!(f, "index out of bounds: {}", e),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Config(e) => Some(e),
            SimError::Index(e) => Some(e),
        }
    }
}

impl From<ConfigError> for SimError {
    fn from(e: ConfigError) -> Self {
        SimError::Config(e)
    }
}

impl From<IndexError> for SimError {
    fn from(e: IndexError) -> Self {
        SimError::Index(e)
    }
}

pub type SimResult<T> = Result<T, SimError>;
