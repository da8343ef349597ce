//! Color-mix animation state machine
//!
//! The renderer animates each tile from `start_state` to `end_state`,
//! starting at the texel's `start_tick` on the cyclic clock. Because that
//! clock wraps, an animation left alone would replay every 255 ticks; the
//! per-tile `mix_end` timers decide on the CPU side when a tile must either
//! start its next transition or be parked.

use crate::state::{PendingState, PendingStates};
use crate::texture::{Texel, INACTIVE_TICK};
use crate::time::ClockSample;
use rand::Rng;

/// What one `update` pass did.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct MixReport {
    /// Tiles that started a new transition.
    pub started: usize,
    /// Due tiles with nothing pending that were parked.
    pub stopped: usize,
}

/// Per-tile animation timers and pending states, structure-of-arrays.
pub struct ColorMixStateMachine {
    mix_duration: f64,
    mix_end: Vec<f64>,
    pending: PendingStates,
}

impl ColorMixStateMachine {
    /// State for `max_population` tiles with mixes lasting `mix_duration`
    /// ticks. First checks are staggered over one mix duration so tiles do
    /// not all fire on the same frame.
    pub fn new<R: Rng + ?Sized>(mix_duration: f64, max_population: usize, rng: &mut R) -> Self {
        let mut machine = Self {
            mix_duration,
            mix_end: vec![0.0; max_population],
            pending: PendingStates::new(max_population),
        };
        machine.stagger(0.0, rng);
        machine
    }

    fn stagger<R: Rng + ?Sized>(&mut self, control_time: f64, rng: &mut R) {
        let duration = self.mix_duration;
        for end in &mut self.mix_end {
            *end = control_time + rng.random::<f64>() * duration;
        }
    }

    /// Drop every timer and pending state, as after a population reset.
    pub fn reset<R: Rng + ?Sized>(&mut self, control_time: f64, rng: &mut R) {
        self.pending.mark_all_uninitialized();
        self.stagger(control_time, rng);
    }

    pub fn len(&self) -> usize {
        self.mix_end.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mix_end.is_empty()
    }

    pub fn mix_duration(&self) -> f64 {
        self.mix_duration
    }

    pub fn mix_end(&self, index: usize) -> Option<f64> {
        self.mix_end.get(index).copied()
    }

    pub fn pending(&self, index: usize) -> Option<PendingState> {
        self.pending.get(index)
    }

    /// Buffer the state queue drains into.
    pub fn pending_mut(&mut self) -> &mut PendingStates {
        &mut self.pending
    }

    /// Advance every tile in `texels` that is due at `sample`.
    ///
    /// A due tile with a pending state starts mixing from its previous end
    /// color into the pending one. A due tile with nothing pending is parked
    /// and re-checked after a random fraction of a mix, which keeps idle
    /// tiles from re-checking in lockstep.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        sample: &ClockSample,
        texels: &mut [Texel],
        rng: &mut R,
    ) -> MixReport {
        let control = sample.control_time;
        let start_tick = sample.start_tick();
        let duration = self.mix_duration;
        let mut report = MixReport::default();

        let tiles = texels
            .iter_mut()
            .zip(self.mix_end.iter_mut())
            .zip(self.pending.as_mut_slice().iter_mut());

        for ((texel, end), pending) in tiles {
            if control < *end {
                continue;
            }
            match std::mem::take(pending).texture_code() {
                None => {
                    texel.start_tick = INACTIVE_TICK;
                    // (0, 1] so the next check is strictly in the future
                    *end = control + duration * (1.0 - rng.random::<f64>());
                    report.stopped += 1;
                }
                Some(code) => {
                    texel.start_state = texel.end_state;
                    texel.end_state = code;
                    texel.start_tick = start_tick;
                    *end = control + duration;
                    report.started += 1;
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateCode;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn sample(control_time: f64) -> ClockSample {
        ClockSample {
            control_time,
            cyclic_time: control_time.rem_euclid(255.0),
            timescale: 0.1,
        }
    }

    #[test]
    fn initial_timers_are_staggered_within_one_mix() {
        let mut rng = SmallRng::seed_from_u64(1);
        let machine = ColorMixStateMachine::new(50.0, 1_000, &mut rng);
        let ends: Vec<f64> = (0..1_000).map(|i| machine.mix_end(i).unwrap()).collect();
        assert!(ends.iter().all(|&e| (0.0..50.0).contains(&e)));
        let first = ends[0];
        assert!(ends.iter().any(|&e| e != first));
    }

    #[test]
    fn pending_state_starts_a_transition() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut machine = ColorMixStateMachine::new(50.0, 1, &mut rng);
        let mut texels = [Texel {
            start_state: 0,
            end_state: StateCode::Available.code(),
            unused: 0,
            start_tick: 0,
        }];
        machine.pending_mut().set(0, StateCode::OnCall);

        let report = machine.update(&sample(60.0), &mut texels, &mut rng);
        assert_eq!(report, MixReport { started: 1, stopped: 0 });
        assert_eq!(texels[0].start_state, StateCode::Available.code());
        assert_eq!(texels[0].end_state, StateCode::OnCall.code());
        assert_eq!(texels[0].start_tick, 60);
        assert_eq!(machine.mix_end(0), Some(110.0));
        assert_eq!(machine.pending(0), Some(PendingState::Empty));
    }

    #[test]
    fn uninitialized_tiles_animate_from_the_uninit_code() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut machine = ColorMixStateMachine::new(50.0, 1, &mut rng);
        let mut texels = [Texel::default()];
        machine.update(&sample(60.0), &mut texels, &mut rng);
        assert_eq!(texels[0].end_state, StateCode::Uninit.code());
        assert!(texels[0].is_animating());
    }

    #[test]
    fn tiles_not_yet_due_are_untouched() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut machine = ColorMixStateMachine::new(50.0, 1, &mut rng);
        let mut texels = [Texel::default()];
        machine.update(&sample(60.0), &mut texels, &mut rng);
        let snapshot = texels;

        machine.pending_mut().set(0, StateCode::AfterCall);
        let report = machine.update(&sample(80.0), &mut texels, &mut rng);
        assert_eq!(report, MixReport::default());
        assert_eq!(texels, snapshot);
        assert_eq!(machine.pending(0), Some(PendingState::State(StateCode::AfterCall)));
    }

    #[test]
    fn idle_tiles_keep_their_end_color() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut machine = ColorMixStateMachine::new(20.0, 8, &mut rng);
        let mut texels = [Texel::default(); 8];
        for i in 0..8 {
            machine.pending_mut().set(i, StateCode::Previewing);
        }
        machine.update(&sample(25.0), &mut texels, &mut rng);
        let ends: Vec<u8> = texels.iter().map(|t| t.end_state).collect();

        let mut control = 25.0;
        let mut stopped = 0;
        for _ in 0..200 {
            control += 1.7;
            stopped += machine.update(&sample(control), &mut texels, &mut rng).stopped;
            for (i, texel) in texels.iter().enumerate() {
                assert_eq!(texel.end_state, ends[i]);
                assert!(machine.mix_end(i).unwrap() > control - 20.0);
            }
        }
        assert!(stopped > 0);
        assert!(texels.iter().any(|t| !t.is_animating()));
    }

    #[test]
    fn parked_tiles_recheck_strictly_later() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut machine = ColorMixStateMachine::new(10.0, 64, &mut rng);
        let mut texels = [Texel::default(); 64];
        machine.update(&sample(10.0), &mut texels, &mut rng);
        machine.update(&sample(30.0), &mut texels, &mut rng);
        for i in 0..64 {
            let end = machine.mix_end(i).unwrap();
            assert!(end > 30.0 && end <= 40.0, "tile {i} re-check at {end}");
        }
    }

    #[test]
    fn reset_reinitializes_pending_states() {
        let mut rng = SmallRng::seed_from_u64(6);
        let mut machine = ColorMixStateMachine::new(10.0, 4, &mut rng);
        let mut texels = [Texel::default(); 4];
        machine.update(&sample(10.0), &mut texels, &mut rng);

        machine.reset(100.0, &mut rng);
        for i in 0..4 {
            assert_eq!(machine.pending(i), Some(PendingState::Uninitialized));
            let end = machine.mix_end(i).unwrap();
            assert!((100.0..110.0).contains(&end));
        }
    }
}
