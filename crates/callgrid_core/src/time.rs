//! Simulation and animation time
//!
//! The simulation advances on a fixed wall-clock interval. Animations run on
//! a separate control clock measured in "ticks" that wraps every 255 ticks
//! on the render side, so an animation start time fits in one texel byte.

use crate::error::ConfigError;
use std::time::Duration;

/// Length of the cyclic animation clock, in ticks.
pub const CYCLE_TICKS: f64 = 255.0;

/// Frame gaps longer than this are treated as the display being suspended.
pub const PAUSE_THRESHOLD_MS: f64 = 100.0;

/// Fixed-interval simulation tick tracker
pub struct SimulationTime {
    tick_count: u64,
    tick_interval: Duration,
    accumulated_time: Duration,
}

impl SimulationTime {
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            tick_count: 0,
            tick_interval,
            accumulated_time: Duration::ZERO,
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn advance_tick(&mut self) {
        self.tick_count += 1;
        self.accumulated_time += self.tick_interval;
    }

    pub fn total_time(&self) -> Duration {
        self.accumulated_time
    }
}

/// Clock readings for one render frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClockSample {
    /// Animation time in ticks, excluding suspended time.
    pub control_time: f64,
    /// `control_time` wrapped into `[0, 255)`.
    pub cyclic_time: f64,
    /// Ticks per millisecond.
    pub timescale: f64,
}

impl ClockSample {
    /// Integer cyclic tick stamped into texels when an animation starts.
    #[inline]
    pub fn start_tick(&self) -> u8 {
        // cyclic_time < 255, so this never collides with the inactive sentinel
        self.cyclic_time.floor().clamp(0.0, CYCLE_TICKS - 1.0) as u8
    }
}

/// Cyclic animation clock driven by wall-clock frame timestamps.
#[derive(Debug, Clone)]
pub struct AnimationClock {
    ticks_per_second: u32,
    timescale: f64,
    mix_duration: f64,
    pause_offset: f64,
    previous_wall_ms: f64,
    control_time: f64,
    cyclic_time: f64,
}

impl AnimationClock {
    /// Build a clock for `ticks_per_second` with color mixes lasting
    /// `color_mix_seconds`.
    ///
    /// The mix has to last between 1 and 255 ticks: shorter mixes cannot
    /// progress, longer ones cannot be expressed on the cyclic clock.
    pub fn new(ticks_per_second: u32, color_mix_seconds: f64) -> Result<Self, ConfigError> {
        if ticks_per_second == 0 {
            return Err(ConfigError::InvalidTickRate(ticks_per_second));
        }
        let mix_duration = color_mix_seconds * f64::from(ticks_per_second);
        if !(1.0..=CYCLE_TICKS).contains(&mix_duration) {
            return Err(ConfigError::MixDurationOutOfRange { ticks: mix_duration });
        }

        Ok(Self {
            ticks_per_second,
            timescale: f64::from(ticks_per_second) * 0.001,
            mix_duration,
            pause_offset: 0.0,
            previous_wall_ms: 0.0,
            control_time: 0.0,
            cyclic_time: 0.0,
        })
    }

    /// Advance to the frame timestamp `wall_ms`.
    ///
    /// When the gap since the previous frame exceeds [`PAUSE_THRESHOLD_MS`]
    /// the gap is added to the pause offset and the clock holds still, so
    /// time spent suspended never counts toward animation progress.
    pub fn advance(&mut self, wall_ms: f64) -> ClockSample {
        let delta = wall_ms - self.previous_wall_ms;
        if delta > PAUSE_THRESHOLD_MS {
            self.pause_offset += delta;
            tracing::trace!(delta, pause_offset = self.pause_offset, "animation clock paused");
        } else {
            self.control_time = (wall_ms - self.pause_offset) * self.timescale;
            self.cyclic_time = self.control_time.rem_euclid(CYCLE_TICKS);
        }
        self.previous_wall_ms = wall_ms;
        self.sample()
    }

    pub fn sample(&self) -> ClockSample {
        ClockSample {
            control_time: self.control_time,
            cyclic_time: self.cyclic_time,
            timescale: self.timescale,
        }
    }

    pub fn ticks_per_second(&self) -> u32 {
        self.ticks_per_second
    }

    pub fn timescale(&self) -> f64 {
        self.timescale
    }

    /// Color mix duration in ticks.
    pub fn mix_duration(&self) -> f64 {
        self.mix_duration
    }

    /// Total suspended wall time excluded from the clock, in milliseconds.
    pub fn pause_offset(&self) -> f64 {
        self.pause_offset
    }
}
