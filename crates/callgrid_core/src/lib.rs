//! Callgrid Core
//!
//! Simulation of a call-center wall display:
//! - Agent registry and the state queue feeding the render loop
//! - Grid tiling and hit-testing
//! - Animation clock and color-mix state machine
//! - Texture buffer shared with the renderer
//! - Configuration and the orchestrator tying it together

pub mod animation;
pub mod config;
pub mod error;
pub mod grid;
pub mod math;
pub mod queue;
pub mod registry;
pub mod simulation;
pub mod state;
pub mod texture;
pub mod time;

pub use glam;

pub use config::SimulationConfig;
pub use error::{ConfigError, RegistryError};
pub use grid::{GridParameters, SpanMode, Viewport};
pub use registry::{Agent, ConnectionStatus};
pub use simulation::{FrameReport, FrameUniforms, Renderer, Simulation, TickReport};
pub use state::StateCode;
pub use texture::{Texel, TextureBuffer};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
