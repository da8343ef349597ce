//! Typed counters for simulation events

use crate::CounterKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimCounters {
    values: [u64; CounterKind::ALL.len()],
}

impl SimCounters {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(kind: CounterKind) -> usize {
        kind as usize
    }

    pub fn record(&mut self, kind: CounterKind, amount: u64) {
        let slot = &mut self.values[Self::slot(kind)];
        *slot = slot.saturating_add(amount);
    }

    pub fn get(&self, kind: CounterKind) -> u64 {
        self.values[Self::slot(kind)]
    }

    pub fn reset_all(&mut self) {
        self.values = [0; CounterKind::ALL.len()];
    }

    pub fn iter(&self) -> impl Iterator<Item = (CounterKind, u64)> + '_ {
        CounterKind::ALL.iter().map(move |&kind| (kind, self.get(kind)))
    }

    /// One-line `name=value` rendering for log output.
    pub fn summary(&self) -> String {
        self.iter()
            .map(|(kind, value)| format!("{}={}", kind.name(), value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_per_kind() {
        let mut counters = SimCounters::new();
        counters.record(CounterKind::Joins, 2);
        counters.record(CounterKind::Joins, 3);
        counters.record(CounterKind::Resets, 1);
        assert_eq!(counters.get(CounterKind::Joins), 5);
        assert_eq!(counters.get(CounterKind::Resets), 1);
        assert_eq!(counters.get(CounterKind::Ticks), 0);
        assert!(counters.summary().contains("joins=5"));

        counters.reset_all();
        assert_eq!(counters.get(CounterKind::Joins), 0);
    }
}
