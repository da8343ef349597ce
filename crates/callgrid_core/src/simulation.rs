//! Simulation orchestrator
//!
//! Two loops drive the wall. `tick` runs on the fixed simulation interval and
//! mutates agents; `frame` runs once per display frame and turns queued state
//! changes into color-mix animations in the renderer's texture. The state
//! queue inside the registry is the only hand-off between them.

use crate::animation::{ColorMixStateMachine, MixReport};
use crate::config::SimulationConfig;
use crate::error::{ConfigError, RegistryError};
use crate::grid::{GridParameters, GridTiler, Viewport};
use crate::math::{scale_frag_coords, Mat3, ScaleMode, Vec2, Vec3};
use crate::registry::{Agent, AgentRegistry};
use crate::texture::TextureBuffer;
use crate::time::{AnimationClock, ClockSample, SimulationTime};
use callgrid_metrics::{CounterKind, SimCounters};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Below this population tiles are big enough that hovering the gap
/// around a dot should not select it.
pub const CIRCULAR_HIT_THRESHOLD: usize = 1000;

/// Everything the renderer needs to draw one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameUniforms {
    /// Wall time of the frame in milliseconds.
    pub time_ms: f64,
    /// Ticks per millisecond.
    pub timescale: f64,
    pub pause_offset_ms: f64,
    /// Color mix length in ticks.
    pub mix_duration: f64,
    pub resolution: Vec2,
    /// `(columns, rows, padding)`
    pub grid: Vec3,
    pub aa_factor: f32,
    pub frag_scale: Mat3,
}

/// Collaborator that owns the state texture and puts it on screen.
pub trait Renderer {
    fn texture_mut(&mut self) -> &mut TextureBuffer;
    fn draw(&mut self, uniforms: &FrameUniforms);
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub joined: usize,
    pub updated: usize,
    /// The population hit its maximum and was rebuilt from scratch.
    pub reset: bool,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameReport {
    pub sample: ClockSample,
    pub mix: MixReport,
    pub resized: bool,
    /// The grid grew to fit newly joined agents.
    pub grown: bool,
}

pub struct Simulation {
    config: SimulationConfig,
    registry: AgentRegistry,
    grid: GridTiler,
    clock: AnimationClock,
    color_mix: ColorMixStateMachine,
    time: SimulationTime,
    viewport: Viewport,
    rng: SmallRng,
    counters: SimCounters,
    seen_compactions: u64,
}

impl Simulation {
    pub fn new(config: SimulationConfig, viewport: Viewport) -> Result<Self, ConfigError> {
        Self::with_rng(config, viewport, SmallRng::from_os_rng())
    }

    /// Build a simulation drawing all its randomness from `rng`.
    pub fn with_rng(
        config: SimulationConfig,
        viewport: Viewport,
        mut rng: SmallRng,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let clock = AnimationClock::new(config.ticks_per_second, config.color_mix_duration_seconds)?;

        let mut registry = AgentRegistry::new(config.max_agents);
        registry.populate(config.starting_agents, &mut rng);
        let grid = GridTiler::new(
            registry.len(),
            viewport,
            config.dot_padding,
            config.tiling_span_mode,
        );
        let color_mix = ColorMixStateMachine::new(clock.mix_duration(), config.max_agents, &mut rng);

        tracing::info!(
            agents = registry.len(),
            max_agents = config.max_agents,
            ticks_per_second = config.ticks_per_second,
            mix_ticks = clock.mix_duration(),
            span_mode = %config.tiling_span_mode,
            "simulation created"
        );

        Ok(Self {
            time: SimulationTime::new(config.tick_interval()),
            config,
            registry,
            grid,
            clock,
            color_mix,
            viewport,
            rng,
            counters: SimCounters::new(),
            seen_compactions: 0,
        })
    }

    /// One simulation step: join new agents, then re-roll a share of the
    /// population into random states.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        let updates =
            (self.registry.len() as f64 * self.config.update_ratio_per_tick).ceil() as usize;

        for _ in 0..self.config.joins_per_tick {
            let state = AgentRegistry::random_state_for_tick(&mut self.rng, None);
            match self.registry.join_with_state(state, state.name(), &mut self.rng) {
                Ok(_) => report.joined += 1,
                Err(RegistryError::PopulationFull { max }) => {
                    tracing::info!(max, "population full, resetting");
                    self.reset();
                    report.reset = true;
                    break;
                }
                Err(err) => tracing::warn!(%err, "join rejected"),
            }
        }

        if !report.reset {
            for _ in 0..updates {
                let population = self.registry.len();
                if population == 0 {
                    break;
                }
                let index = self.rng.random_range(0..population);
                let state = AgentRegistry::random_state_for_tick(&mut self.rng, None);
                if self.registry.set_state(index, state, state.name()).is_ok() {
                    report.updated += 1;
                }
            }
        }

        self.time.advance_tick();
        self.counters.record(CounterKind::Ticks, 1);
        self.counters.record(CounterKind::Joins, report.joined as u64);
        self.counters.record(CounterKind::StateUpdates, report.updated as u64);
        self.record_compactions();
        callgrid_metrics::metrics! {
            tracing::trace!(counters = %self.counters.summary(), "tick complete");
        }
        report
    }

    /// Render one frame at `wall_ms` on a viewport of the given size.
    pub fn frame<Rd: Renderer + ?Sized>(
        &mut self,
        wall_ms: f64,
        viewport: Viewport,
        renderer: &mut Rd,
    ) -> FrameReport {
        let sample = self.clock.advance(wall_ms);

        let resized = viewport != self.viewport;
        if resized {
            self.viewport = viewport;
            self.grid.resize(viewport);
        }
        self.sync_texture(renderer);
        let uniforms = self.uniforms(wall_ms, renderer.texture_mut().dimensions());

        self.registry.drain_into(self.color_mix.pending_mut());
        let active = self.grid.parameters().active_tiles;
        let texels = renderer.texture_mut().texels_mut();
        let visible = active.min(texels.len());
        let mix = self
            .color_mix
            .update(&sample, &mut texels[..visible], &mut self.rng);
        self.counters.record(CounterKind::TransitionsStarted, mix.started as u64);
        self.counters.record(CounterKind::IdleStops, mix.stopped as u64);

        renderer.draw(&uniforms);

        let population = self.registry.len();
        let grown = population > active
            && self.grid.add_tiles((population - active) as i64, self.viewport);
        if population > active {
            self.sync_texture(renderer);
        }

        FrameReport {
            sample,
            mix,
            resized,
            grown,
        }
    }

    /// Drop every agent and start over with `starting_agents`. Every agent
    /// index handed out before is invalid afterwards.
    pub fn reset(&mut self) {
        let mut registry = AgentRegistry::new(self.config.max_agents);
        registry.populate(self.config.starting_agents, &mut self.rng);
        self.registry = registry;
        self.seen_compactions = 0;

        self.grid = GridTiler::new(
            self.registry.len(),
            self.viewport,
            self.config.dot_padding,
            self.config.tiling_span_mode,
        );
        let control_time = self.clock.sample().control_time;
        self.color_mix.reset(control_time, &mut self.rng);
        self.counters.record(CounterKind::Resets, 1);
    }

    /// Agent under `point` (viewport pixels), with its index.
    pub fn agent_at(&self, point: Vec2) -> Option<(usize, &Agent)> {
        let circular = self.registry.len() < CIRCULAR_HIT_THRESHOLD;
        let index = self.grid.hit_test(point, circular)?;
        self.registry.agent(index).map(|agent| (index, agent))
    }

    pub fn agent(&self, index: usize) -> Option<&Agent> {
        self.registry.agent(index)
    }

    pub fn population(&self) -> usize {
        self.registry.len()
    }

    pub fn grid(&self) -> &GridParameters {
        self.grid.parameters()
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn time(&self) -> &SimulationTime {
        &self.time
    }

    pub fn counters(&self) -> &SimCounters {
        &self.counters
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn record_compactions(&mut self) {
        let total = self.registry.queue().compactions();
        self.counters
            .record(CounterKind::QueueCompactions, total - self.seen_compactions);
        self.seen_compactions = total;
    }

    fn sync_texture<Rd: Renderer + ?Sized>(&self, renderer: &mut Rd) {
        let params = self.grid.parameters();
        let wanted = (params.columns as u32, params.rows as u32);
        let texture = renderer.texture_mut();
        if texture.dimensions() != wanted {
            texture.update_texture_dimensions(wanted.0, wanted.1);
        }
    }

    fn uniforms(&self, wall_ms: f64, (tex_w, tex_h): (u32, u32)) -> FrameUniforms {
        let params = self.grid.parameters();
        let resolution = self.viewport.size().max(Vec2::ONE);
        let texture = Vec2::new(tex_w.max(1) as f32, tex_h.max(1) as f32);
        FrameUniforms {
            time_ms: wall_ms,
            timescale: self.clock.timescale(),
            pause_offset_ms: self.clock.pause_offset(),
            mix_duration: self.clock.mix_duration(),
            resolution,
            grid: Vec3::new(params.columns as f32, params.rows as f32, params.padding),
            aa_factor: texture.y * 1.5 / resolution.y,
            frag_scale: scale_frag_coords(texture, resolution, ScaleMode::Preserve),
        }
    }
}
