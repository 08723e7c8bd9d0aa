//! Startup configuration read from the environment

use crate::console::OutputFormat;
use crate::state_machine::DiceRollPolicy;
use thiserror::Error;

pub const DEFAULT_EVENT_BUFFER: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Behavior after a die roll in the dice submenu
    pub dice_policy: DiceRollPolicy,
    /// Fixed seed for reproducible sessions; entropy-seeded when absent
    pub rng_seed: Option<u64>,
    /// Per-conversation inbox capacity
    pub event_buffer: usize,
    /// Console transport output format
    pub output: OutputFormat,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            dice_policy: DiceRollPolicy::default(),
            rng_seed: None,
            event_buffer: DEFAULT_EVENT_BUFFER,
            output: OutputFormat::default(),
        }
    }
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup("RANDOMIZER_DICE_POLICY") {
            config.dice_policy = value
                .parse::<DiceRollPolicy>()
                .map_err(|e| invalid("RANDOMIZER_DICE_POLICY", &value, e))?;
        }

        if let Some(value) = lookup("RANDOMIZER_RNG_SEED") {
            let seed = value
                .trim()
                .parse::<u64>()
                .map_err(|e| invalid("RANDOMIZER_RNG_SEED", &value, e))?;
            config.rng_seed = Some(seed);
        }

        if let Some(value) = lookup("RANDOMIZER_EVENT_BUFFER") {
            config.event_buffer = value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    invalid("RANDOMIZER_EVENT_BUFFER", &value, "expected a positive integer")
                })?;
        }

        if let Some(value) = lookup("RANDOMIZER_OUTPUT") {
            config.output = value
                .parse::<OutputFormat>()
                .map_err(|e| invalid("RANDOMIZER_OUTPUT", &value, e))?;
        }

        Ok(config)
    }
}

fn invalid(key: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
