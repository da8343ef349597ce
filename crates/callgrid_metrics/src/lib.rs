//! Callgrid Metrics - frame timing and simulation counters
//!
//! Instrumentation for the tick loop and the render loop that completely
//! vanishes in production builds via feature flags.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use callgrid_metrics::{CounterKind, FrameTimer, SimCounters};
//!
//! let mut timer = FrameTimer::new(120); // Track last 120 frames
//! timer.begin();
//! // ... drain queue, update color mix, draw ...
//! timer.end();
//! println!("frame work: {:.2} ms", timer.frame_time_ms());
//!
//! let mut counters = SimCounters::new();
//! counters.record(CounterKind::QueueCompactions, 1);
//! ```
//!
//! Without the `metrics` feature every call compiles to nothing and every
//! read returns zero.

#[cfg(feature = "metrics")]
mod counters;
#[cfg(feature = "metrics")]
mod frame_timer;
#[cfg(feature = "metrics")]
mod rolling;

#[cfg(feature = "metrics")]
pub use counters::SimCounters;
#[cfg(feature = "metrics")]
pub use frame_timer::FrameTimer;
#[cfg(feature = "metrics")]
pub use rolling::RollingWindow;

/// Events counted by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterKind {
    /// Fixed-interval simulation ticks executed.
    Ticks,
    /// Agents that joined the population.
    Joins,
    /// State re-rolls applied to existing agents.
    StateUpdates,
    /// Full population resets.
    Resets,
    /// Times the state queue degraded into its overflow snapshot.
    QueueCompactions,
    /// Color-mix animations started from a pending state.
    TransitionsStarted,
    /// Due tiles that had nothing pending and were parked.
    IdleStops,
}

impl CounterKind {
    pub const ALL: [CounterKind; 7] = [
        CounterKind::Ticks,
        CounterKind::Joins,
        CounterKind::StateUpdates,
        CounterKind::Resets,
        CounterKind::QueueCompactions,
        CounterKind::TransitionsStarted,
        CounterKind::IdleStops,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CounterKind::Ticks => "ticks",
            CounterKind::Joins => "joins",
            CounterKind::StateUpdates => "state_updates",
            CounterKind::Resets => "resets",
            CounterKind::QueueCompactions => "queue_compactions",
            CounterKind::TransitionsStarted => "transitions_started",
            CounterKind::IdleStops => "idle_stops",
        }
    }
}

// ============================================================================
// Macros for conditional compilation
// ============================================================================

/// Execute code only when metrics are enabled
#[macro_export]
macro_rules! metrics {
    ($($tt:tt)*) => {
        #[cfg(feature = "metrics")]
        {
            $($tt)*
        }
    };
}

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
pub struct FrameTimer;

#[cfg(not(feature = "metrics"))]
impl FrameTimer {
    pub fn new(_capacity: usize) -> Self { Self }
    pub fn begin(&mut self) {}
    pub fn end(&mut self) {}
    pub fn frames(&self) -> u64 { 0 }
    pub fn fps(&self) -> f64 { 0.0 }
    pub fn frame_time_ms(&self) -> f64 { 0.0 }
    pub fn frame_time_range_ms(&self) -> (f64, f64) { (0.0, 0.0) }
}

#[cfg(not(feature = "metrics"))]
pub struct RollingWindow;

#[cfg(not(feature = "metrics"))]
impl RollingWindow {
    pub fn new(_capacity: usize) -> Self { Self }
    pub fn push(&mut self, _sample_ms: f64) {}
    pub fn mean(&self) -> f64 { 0.0 }
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct SimCounters;

#[cfg(not(feature = "metrics"))]
impl SimCounters {
    pub fn new() -> Self { Self }
    pub fn record(&mut self, _kind: CounterKind, _amount: u64) {}
    pub fn get(&self, _kind: CounterKind) -> u64 { 0 }
    pub fn reset_all(&mut self) {}
    pub fn summary(&self) -> String { String::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiles_with_either_feature_set() {
        let mut timer = FrameTimer::new(60);
        timer.begin();
        timer.end();
        let mut window = RollingWindow::new(10);
        window.push(16.0);
        let mut counters = SimCounters::new();
        counters.record(CounterKind::Joins, 3);
        let _ = counters.get(CounterKind::Joins);
    }

    #[test]
    fn counter_names_are_unique() {
        let mut names: Vec<&str> = CounterKind::ALL.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CounterKind::ALL.len());
    }
}
