//! Bounded hand-off between the simulation tick and the render loop.
//!
//! Under light load the queue is an ordered log: every event survives, in
//! order, including several events for the same agent in one tick. When the
//! log fills up (render loop stalled, window backgrounded) it is folded into
//! an overflow snapshot that keeps only the newest state per agent.

use crate::state::{PendingStates, StateCode};

/// Ordered state-change log with a last-write-wins overflow snapshot.
pub struct StateQueue {
    indices: Vec<u32>,
    states: Vec<StateCode>,
    count: usize,
    overflow: Vec<Option<StateCode>>,
    overflowed: bool,
    /// One past the highest snapshot slot written since the last drain.
    snapshot_end: usize,
    compactions: u64,
}

impl StateQueue {
    /// Queue sized for a population of `capacity` agents.
    pub fn new(capacity: usize) -> Self {
        Self {
            indices: vec![0; capacity],
            states: vec![StateCode::Uninit; capacity],
            count: 0,
            overflow: vec![None; capacity],
            overflowed: false,
            snapshot_end: 0,
            compactions: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.indices.len()
    }

    /// Events currently held in the ordered log.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0 && !self.overflowed
    }

    /// Snapshot slots the next drain has to visit.
    pub fn snapshot_span(&self) -> usize {
        self.snapshot_end
    }

    /// Whether the log has been compacted since the last drain.
    pub fn is_overflowed(&self) -> bool {
        self.overflowed
    }

    /// Compactions since construction.
    pub fn compactions(&self) -> u64 {
        self.compactions
    }

    /// Append a state change for `index`.
    ///
    /// A full log is compacted first; the triggering event then starts the
    /// fresh log, so it is applied after the snapshot on the next drain.
    /// Returns `true` when this call compacted the log.
    pub fn enqueue(&mut self, index: usize, state: StateCode) -> bool {
        if index >= self.capacity() {
            tracing::warn!(
                index,
                capacity = self.capacity(),
                "dropping state change for agent outside queue capacity"
            );
            return false;
        }

        let compacted = self.count == self.capacity();
        if compacted {
            self.compact();
        }

        self.indices[self.count] = index as u32;
        self.states[self.count] = state;
        self.count += 1;
        compacted
    }

    /// Fold the log into the overflow snapshot, oldest to newest.
    pub fn compact(&mut self) {
        for (&index, &state) in self.indices[..self.count]
            .iter()
            .zip(&self.states[..self.count])
        {
            self.overflow[index as usize] = Some(state);
            self.snapshot_end = self.snapshot_end.max(index as usize + 1);
        }
        tracing::debug!(folded = self.count, "state queue compacted");
        self.count = 0;
        self.overflowed = true;
        self.compactions += 1;
    }

    /// Move every pending change into `buffer` and empty the queue.
    ///
    /// The snapshot (if any) is applied first, then the log in order, so the
    /// newest state for each agent is the one left in `buffer`.
    pub fn drain_into(&mut self, buffer: &mut PendingStates) {
        if self.overflowed {
            for (index, slot) in self.overflow[..self.snapshot_end].iter_mut().enumerate() {
                if let Some(state) = slot.take() {
                    buffer.set(index, state);
                }
            }
            self.overflowed = false;
            self.snapshot_end = 0;
        }

        for (&index, &state) in self.indices[..self.count]
            .iter()
            .zip(&self.states[..self.count])
        {
            buffer.set(index as usize, state);
        }
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PendingState;

    #[test]
    fn drains_in_order_with_last_write_winning() {
        let mut queue = StateQueue::new(8);
        queue.enqueue(2, StateCode::OnCall);
        queue.enqueue(2, StateCode::AfterCall);
        queue.enqueue(5, StateCode::Available);
        assert_eq!(queue.len(), 3);

        let mut buffer = PendingStates::new(8);
        queue.drain_into(&mut buffer);

        assert_eq!(buffer.get(2), Some(PendingState::State(StateCode::AfterCall)));
        assert_eq!(buffer.get(5), Some(PendingState::State(StateCode::Available)));
        assert_eq!(buffer.get(0), Some(PendingState::Uninitialized));
        assert!(queue.is_empty());
    }

    #[test]
    fn full_log_compacts_and_keeps_triggering_event() {
        let mut queue = StateQueue::new(3);
        assert!(!queue.enqueue(0, StateCode::OnCall));
        assert!(!queue.enqueue(1, StateCode::OnCall));
        assert!(!queue.enqueue(0, StateCode::Previewing));

        // Log is full: this one compacts and then lands in the fresh log.
        assert!(queue.enqueue(0, StateCode::LoggedOut));
        assert!(queue.is_overflowed());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.compactions(), 1);

        let mut buffer = PendingStates::new(3);
        queue.drain_into(&mut buffer);
        assert_eq!(buffer.get(0), Some(PendingState::State(StateCode::LoggedOut)));
        assert_eq!(buffer.get(1), Some(PendingState::State(StateCode::OnCall)));
        assert!(!queue.is_overflowed());
    }

    #[test]
    fn drain_clears_snapshot_slots() {
        let mut queue = StateQueue::new(2);
        queue.enqueue(1, StateCode::AfterCall);
        queue.compact();

        let mut buffer = PendingStates::new(2);
        queue.drain_into(&mut buffer);
        assert_eq!(buffer.take(1), PendingState::State(StateCode::AfterCall));

        // Second drain has nothing left to apply.
        queue.drain_into(&mut buffer);
        assert_eq!(buffer.get(1), Some(PendingState::Empty));
    }

    #[test]
    fn snapshot_drain_covers_only_touched_slots() {
        let mut queue = StateQueue::new(1_000);
        queue.enqueue(40, StateCode::OnCall);
        queue.enqueue(3, StateCode::Available);
        queue.compact();
        assert_eq!(queue.snapshot_span(), 41);

        let mut buffer = PendingStates::new(1_000);
        queue.drain_into(&mut buffer);
        assert_eq!(queue.snapshot_span(), 0);
        assert_eq!(buffer.take(40), PendingState::State(StateCode::OnCall));
        assert_eq!(buffer.take(3), PendingState::State(StateCode::Available));

        // A later, smaller snapshot starts from a clean span.
        queue.enqueue(2, StateCode::AfterCall);
        queue.compact();
        assert_eq!(queue.snapshot_span(), 3);
        queue.drain_into(&mut buffer);
        assert_eq!(buffer.take(2), PendingState::State(StateCode::AfterCall));
        assert_eq!(buffer.get(40), Some(PendingState::Empty));
    }

    #[test]
    fn rejects_out_of_range_agents() {
        let mut queue = StateQueue::new(2);
        assert!(!queue.enqueue(9, StateCode::OnCall));
        assert_eq!(queue.len(), 0);
    }
}
