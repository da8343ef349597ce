//! Render-loop frame timing

use super::rolling::RollingWindow;
use std::time::Instant;

/// Measures how long each render frame spends in the core (drain, color
/// mix, draw submission), not the interval between frames.
pub struct FrameTimer {
    frame_start: Instant,
    frame_times: RollingWindow,
    frames: u64,
}

impl FrameTimer {
    pub fn new(capacity: usize) -> Self {
        Self {
            frame_start: Instant::now(),
            frame_times: RollingWindow::new(capacity),
            frames: 0,
        }
    }

    pub fn begin(&mut self) {
        self.frame_start = Instant::now();
    }

    pub fn end(&mut self) {
        let elapsed = self.frame_start.elapsed();
        self.frame_times.push(elapsed.as_secs_f64() * 1000.0);
        self.frames += 1;
    }

    /// Total frames measured since construction.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames per second the measured work alone would allow.
    pub fn fps(&self) -> f64 {
        let avg = self.frame_times.mean();
        if avg > 0.0 {
            1000.0 / avg
        } else {
            0.0
        }
    }

    pub fn frame_time_ms(&self) -> f64 {
        self.frame_times.mean()
    }

    pub fn frame_time_range_ms(&self) -> (f64, f64) {
        self.frame_times.min_max()
    }
}
