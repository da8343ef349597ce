//! Agent registry
//!
//! Owns the canonical agent list and publishes every state change into the
//! [`StateQueue`] for the render loop to pick up.

use crate::error::RegistryError;
use crate::math::random_fast;
use crate::queue::StateQueue;
use crate::state::{PendingStates, StateCode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionStatus {
    Online,
    Offline,
}

/// A simulated call-center operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub current_state: StateCode,
    pub state_name: String,
    /// Epoch seconds when the agent last came online, 0 while offline.
    pub connection_start_epoch: u64,
    pub connection_status: ConnectionStatus,
}

/// Source of "now" in epoch seconds.
pub type EpochSource = fn() -> u64;

pub fn system_epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 6;

fn random_agent_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ID_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())]))
        .collect()
}

pub struct AgentRegistry {
    agents: Vec<Agent>,
    queue: StateQueue,
    max_agents: usize,
    now: EpochSource,
}

impl AgentRegistry {
    /// Empty registry for at most `max_agents` agents.
    pub fn new(max_agents: usize) -> Self {
        Self {
            agents: Vec::with_capacity(max_agents),
            queue: StateQueue::new(max_agents),
            max_agents,
            now: system_epoch_seconds,
        }
    }

    /// Join up to `count` agents in random joinable states, stopping early
    /// once the population is full. Returns how many joined.
    pub fn populate<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> usize {
        let mut joined = 0;
        while joined < count && self.join(rng).is_ok() {
            joined += 1;
        }
        joined
    }

    /// Replace the clock used for connection timestamps.
    pub fn with_epoch_source(mut self, now: EpochSource) -> Self {
        self.now = now;
        self
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn max_agents(&self) -> usize {
        self.max_agents
    }

    pub fn is_full(&self) -> bool {
        self.agents.len() >= self.max_agents
    }

    pub fn agent(&self, index: usize) -> Option<&Agent> {
        self.agents.get(index)
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn queue(&self) -> &StateQueue {
        &self.queue
    }

    /// Hand every queued state change to the render side.
    pub fn drain_into(&mut self, buffer: &mut PendingStates) {
        self.queue.drain_into(buffer);
    }

    /// Add an agent in a random joinable state. Returns its index.
    pub fn join<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<usize, RegistryError> {
        let state = Self::random_state_for_join(rng);
        self.join_with_state(state, state.name(), rng)
    }

    /// Add an agent in `state`. Returns its index, stable until the
    /// population is reset.
    pub fn join_with_state<R: Rng + ?Sized>(
        &mut self,
        state: StateCode,
        state_name: &str,
        rng: &mut R,
    ) -> Result<usize, RegistryError> {
        if state == StateCode::Uninit {
            return Err(RegistryError::UninitState);
        }
        if self.is_full() {
            return Err(RegistryError::PopulationFull {
                max: self.max_agents,
            });
        }

        let (connection_start_epoch, connection_status) = if state == StateCode::LoggedOut {
            (0, ConnectionStatus::Offline)
        } else {
            ((self.now)(), ConnectionStatus::Online)
        };

        self.agents.push(Agent {
            id: random_agent_id(rng),
            current_state: state,
            state_name: state_name.to_string(),
            connection_start_epoch,
            connection_status,
        });
        let index = self.agents.len() - 1;
        self.queue.enqueue(index, state);
        Ok(index)
    }

    /// Log agent `index` out.
    pub fn leave(&mut self, index: usize) -> Result<(), RegistryError> {
        self.set_state(index, StateCode::LoggedOut, StateCode::LoggedOut.name())
    }

    /// Move agent `index` into `state`, tracking connection changes.
    pub fn set_state(
        &mut self,
        index: usize,
        state: StateCode,
        state_name: &str,
    ) -> Result<(), RegistryError> {
        if state == StateCode::Uninit {
            return Err(RegistryError::UninitState);
        }
        let now = self.now;
        let len = self.agents.len();
        let agent = self
            .agents
            .get_mut(index)
            .ok_or(RegistryError::UnknownAgent { index, len })?;

        if state == StateCode::LoggedOut {
            agent.connection_start_epoch = 0;
            agent.connection_status = ConnectionStatus::Offline;
        } else if agent.connection_status == ConnectionStatus::Offline {
            agent.connection_start_epoch = now();
            agent.connection_status = ConnectionStatus::Online;
        }

        agent.current_state = state;
        agent.state_name.clear();
        agent.state_name.push_str(state_name);
        self.queue.enqueue(index, state);
        Ok(())
    }

    /// Uniform draw over the joinable states; never `LoggedOut`.
    pub fn random_state_for_join<R: Rng + ?Sized>(rng: &mut R) -> StateCode {
        StateCode::JOINABLE[rng.random_range(0..StateCode::JOINABLE.len())]
    }

    /// Uniform draw over every live state, `LoggedOut` included.
    ///
    /// With a seed the draw comes from [`random_fast`] instead of `rng`, so
    /// the same seed always yields the same state.
    pub fn random_state_for_tick<R: Rng + ?Sized>(rng: &mut R, seed: Option<u32>) -> StateCode {
        let states = StateCode::LIVE;
        let slot = match seed {
            Some(seed) => (random_fast(seed) * states.len() as f64) as usize,
            None => rng.random_range(0..states.len()),
        };
        states[slot.min(states.len() - 1)]
    }
}
