//! Pointer input and agent tooltips

use callgrid_core::glam::Vec2;
use callgrid_core::{Simulation, StateCode};

/// Pointer position as reported by the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Pointer position in window coordinates.
    pub client: Vec2,
    /// Top-left corner of the wall inside the window.
    pub target_origin: Vec2,
}

impl PointerEvent {
    pub fn new(client: Vec2, target_origin: Vec2) -> Self {
        Self {
            client,
            target_origin,
        }
    }

    /// Position relative to the wall.
    #[inline]
    pub fn relative(&self) -> Vec2 {
        self.client - self.target_origin
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub index: usize,
    /// Agent rendered as pretty JSON.
    pub text: String,
    /// State the tooltip is highlighted with.
    pub state: StateCode,
    /// Window position the tooltip is drawn at.
    pub anchor: Vec2,
}

/// Tracks which agent the pointer is over.
///
/// The hovered index survives moves that land between tiles; those only hide
/// the tooltip. The text is rebuilt from the live agent on every call to
/// [`HoverTracker::tooltip`] so it follows state changes.
#[derive(Debug, Default, Clone)]
pub struct HoverTracker {
    index: Option<usize>,
    visible: bool,
    anchor: Vec2,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hit-test `event` against the wall. Returns the hovered agent index.
    pub fn pointer_moved(&mut self, sim: &Simulation, event: &PointerEvent) -> Option<usize> {
        match sim.agent_at(event.relative()) {
            Some((index, _)) => {
                self.index = Some(index);
                self.visible = true;
                self.anchor = event.client;
                Some(index)
            }
            None => {
                self.visible = false;
                None
            }
        }
    }

    /// Forget the hovered agent, as after a population reset.
    pub fn clear(&mut self) {
        self.index = None;
        self.visible = false;
    }

    pub fn hovered(&self) -> Option<usize> {
        self.index.filter(|_| self.visible)
    }

    /// Current tooltip, or `None` while hidden.
    pub fn tooltip(&self, sim: &Simulation) -> Option<Tooltip> {
        if !self.visible {
            return None;
        }
        let index = self.index?;
        let agent = sim.agent(index)?;
        let text = match serde_json::to_string_pretty(agent) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(index, %err, "failed to render agent tooltip");
                return None;
            }
        };
        Some(Tooltip {
            index,
            text,
            state: agent.current_state,
            anchor: self.anchor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callgrid_core::{SimulationConfig, Viewport};

    fn simulation() -> Simulation {
        let config = SimulationConfig {
            starting_agents: 12,
            max_agents: 12,
            ..SimulationConfig::default()
        };
        Simulation::new(config, Viewport::new(300.0, 200.0)).unwrap()
    }

    fn center_event(sim: &Simulation, origin: Vec2) -> PointerEvent {
        let grid = sim.grid();
        let center = Vec2::new(
            grid.margin_x + grid.tile_size * 0.5,
            grid.margin_y + grid.tile_size * 0.5,
        );
        PointerEvent::new(center + origin, origin)
    }

    #[test]
    fn relative_subtracts_origin() {
        let event = PointerEvent::new(Vec2::new(50.0, 40.0), Vec2::new(10.0, 15.0));
        assert_eq!(event.relative(), Vec2::new(40.0, 25.0));
    }

    #[test]
    fn hover_shows_agent_json() {
        let sim = simulation();
        let mut hover = HoverTracker::new();
        let event = center_event(&sim, Vec2::new(20.0, 30.0));

        assert_eq!(hover.pointer_moved(&sim, &event), Some(0));
        let tooltip = hover.tooltip(&sim).unwrap();
        assert_eq!(tooltip.index, 0);
        assert_eq!(tooltip.anchor, event.client);

        let agent = sim.agent(0).unwrap();
        assert!(tooltip.text.contains(&format!("\"id\": \"{}\"", agent.id)));
        assert!(tooltip.text.contains("\"connectionStatus\""));
    }

    #[test]
    fn missing_the_wall_hides_but_remembers() {
        let sim = simulation();
        let mut hover = HoverTracker::new();
        hover.pointer_moved(&sim, &center_event(&sim, Vec2::ZERO));

        let outside = PointerEvent::new(Vec2::new(-50.0, -50.0), Vec2::ZERO);
        assert_eq!(hover.pointer_moved(&sim, &outside), None);
        assert!(hover.tooltip(&sim).is_none());
        assert_eq!(hover.hovered(), None);

        hover.clear();
        assert!(hover.tooltip(&sim).is_none());
    }
}
