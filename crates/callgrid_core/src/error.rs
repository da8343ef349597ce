use thiserror::Error;

/// Invalid configuration. Fatal at construction: setup must abort.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("ticks per second must be a positive integer, got {0}")]
    InvalidTickRate(u32),

    #[error(
        "color mix lasts {ticks} ticks; animations must span between 1 and 255 ticks"
    )]
    MixDurationOutOfRange { ticks: f64 },

    #[error("unknown tiling span mode '{0}' (expected spanWidth, spanHeight, maxTiles or maxArea)")]
    UnknownSpanMode(String),

    #[error("dot padding must lie in [0, 1), got {0}")]
    InvalidPadding(f32),

    #[error("update ratio per tick must lie in [0, 1], got {0}")]
    InvalidUpdateRatio(f64),

    #[error("max agents must be at least 1 and not below starting agents ({starting} > {max})")]
    InvalidPopulation { starting: usize, max: usize },

    #[error("tick interval must be positive")]
    InvalidTickInterval,
}

/// Rejected agent registry operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("agent {index} does not exist (population {len})")]
    UnknownAgent { index: usize, len: usize },

    #[error("agents cannot be assigned the uninit sentinel state")]
    UninitState,

    #[error("population is full ({max} agents)")]
    PopulationFull { max: usize },
}
