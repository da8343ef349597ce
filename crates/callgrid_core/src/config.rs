//! Simulation configuration

use crate::error::ConfigError;
use crate::grid::SpanMode;
use crate::time::AnimationClock;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Recognized simulation options. Field names follow the camelCase keys of
/// the JSON settings files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SimulationConfig {
    /// Animation clock rate.
    pub ticks_per_second: u32,
    /// Length of one color mix; times `ticks_per_second` must land in [1, 255].
    pub color_mix_duration_seconds: f64,
    pub starting_agents: usize,
    pub max_agents: usize,
    pub joins_per_tick: usize,
    /// Fraction of the population re-rolled each tick.
    pub update_ratio_per_tick: f64,
    pub tiling_span_mode: SpanMode,
    pub tick_interval_ms: u64,
    /// Fraction of a tile left empty around its dot, in [0, 1).
    pub dot_padding: f32,
}

impl SimulationConfig {
    /// A single agent that keeps being joined by more until the wall
    /// reaches a million tiles.
    pub fn growing() -> Self {
        Self {
            ticks_per_second: 20,
            color_mix_duration_seconds: 0.5,
            starting_agents: 1,
            max_agents: 1_000_000,
            joins_per_tick: 1,
            update_ratio_per_tick: 0.6,
            tiling_span_mode: SpanMode::MaxArea,
            tick_interval_ms: 500,
            dot_padding: 0.15,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Check every option, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        AnimationClock::new(self.ticks_per_second, self.color_mix_duration_seconds)?;

        if self.max_agents == 0 || self.starting_agents > self.max_agents {
            return Err(ConfigError::InvalidPopulation {
                starting: self.starting_agents,
                max: self.max_agents,
            });
        }
        if !(0.0..=1.0).contains(&self.update_ratio_per_tick) {
            return Err(ConfigError::InvalidUpdateRatio(self.update_ratio_per_tick));
        }
        if !(0.0..1.0).contains(&self.dot_padding) {
            return Err(ConfigError::InvalidPadding(self.dot_padding));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidTickInterval);
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    /// Fixed wall of ten thousand agents churning half their states per tick.
    fn default() -> Self {
        Self {
            ticks_per_second: 100,
            color_mix_duration_seconds: 0.5,
            starting_agents: 10_000,
            max_agents: 10_000,
            joins_per_tick: 0,
            update_ratio_per_tick: 0.5,
            tiling_span_mode: SpanMode::MaxArea,
            tick_interval_ms: 500,
            dot_padding: 0.15,
        }
    }
}
