//! Callgrid Runtime
//!
//! Headless wall: runs the simulation tick and the frame loop side by side
//! and reports progress through tracing.
//!
//! Usage: `callgrid [preset | settings.json]` (presets: default, growing)

mod headless;

use anyhow::{Context, Result};
use callgrid_core::glam::Vec2;
use callgrid_core::Simulation;
use callgrid_metrics::FrameTimer;
use callgrid_services::{HoverTracker, PointerEvent, Settings};
use headless::HeadlessRenderer;
use std::time::{Duration, Instant};
use tokio::time::{interval, MissedTickBehavior};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    tracing::info!("Callgrid v{}", callgrid_core::VERSION);
    let source = std::env::args().nth(1).unwrap_or_else(|| "default".to_string());
    let settings =
        Settings::resolve(&source).with_context(|| format!("loading settings from '{source}'"))?;

    run(settings).await
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

async fn run(settings: Settings) -> Result<()> {
    let viewport = settings.viewport;
    let report_every = settings.runtime.report_every_frames.max(1);
    let mut sim = Simulation::new(settings.simulation.clone(), viewport)
        .context("creating simulation")?;
    let mut renderer = HeadlessRenderer::new(settings.simulation.max_agents);
    let mut timer = FrameTimer::new(120);

    // Synthetic pointer parked over the middle of the wall.
    let mut hover = HoverTracker::new();
    let probe = PointerEvent::new(viewport.size() * 0.5, Vec2::ZERO);

    let mut ticks = interval(sim.config().tick_interval());
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut frames = interval(Duration::from_millis(settings.runtime.frame_interval_ms.max(1)));
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let run_limit = settings.runtime.run_seconds.map(Duration::from_secs);
    let deadline = async move {
        match run_limit {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    let started = Instant::now();
    tracing::info!(
        agents = sim.population(),
        tick_ms = settings.simulation.tick_interval_ms,
        frame_ms = settings.runtime.frame_interval_ms,
        "wall running"
    );

    loop {
        tokio::select! {
            _ = ticks.tick() => {
                if sim.tick().reset {
                    hover.clear();
                }
            }
            _ = frames.tick() => {
                let wall_ms = started.elapsed().as_secs_f64() * 1000.0;
                timer.begin();
                sim.frame(wall_ms, viewport, &mut renderer);
                timer.end();

                if renderer.draws() % report_every == 0 {
                    report(&sim, &renderer, &timer);
                    hover.pointer_moved(&sim, &probe);
                    if let Some(tooltip) = hover.tooltip(&sim) {
                        tracing::debug!(index = tooltip.index, "agent under pointer:\n{}", tooltip.text);
                    }
                }
            }
            _ = &mut deadline => {
                tracing::info!("run time elapsed");
                break;
            }
            signal = &mut interrupt => {
                signal.context("listening for ctrl-c")?;
                tracing::info!("interrupted");
                break;
            }
        }
    }

    report(&sim, &renderer, &timer);
    tracing::info!(
        ticks = sim.time().tick_count(),
        frames = renderer.draws(),
        "callgrid stopped"
    );
    Ok(())
}

fn report(sim: &Simulation, renderer: &HeadlessRenderer, timer: &FrameTimer) {
    let grid = sim.grid();
    let (min_ms, max_ms) = timer.frame_time_range_ms();
    let aa_factor = renderer.last_uniforms().map_or(0.0, |u| u.aa_factor);
    tracing::info!(
        population = sim.population(),
        columns = grid.columns,
        rows = grid.rows,
        aa_factor,
        animating = renderer.texture().animating_count(),
        frame_ms = timer.frame_time_ms(),
        min_ms,
        max_ms,
        headroom_fps = timer.fps().round(),
        counters = %sim.counters().summary(),
        "status"
    );
}
