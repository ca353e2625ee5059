use std::collections::HashMap;

use eframe::egui::{Pos2, Vec2};
use tracing::{debug, trace};

use crate::genealogy::NodeId;
use crate::layout::Simulation;

use super::viewport::ViewportController;

/// Identifies one pointer (mouse button or touch) for concurrent drags.
pub type PointerId = u64;

/// Pins nodes under active pointers and keeps the layout warm while any
/// drag is in progress.
#[derive(Debug)]
pub struct DragController {
    reheat_alpha_target: f32,
    active: HashMap<PointerId, NodeId>,
}

impl DragController {
    pub fn new(reheat_alpha_target: f32) -> Self {
        Self {
            reheat_alpha_target,
            active: HashMap::new(),
        }
    }

    pub fn is_dragging(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn dragged_node(&self, pointer: PointerId) -> Option<NodeId> {
        self.active.get(&pointer).copied()
    }

    pub fn is_node_dragged(&self, id: NodeId) -> bool {
        self.active.values().any(|&node| node == id)
    }

    /// Grabs node `id` with `pointer` and pins it where it currently is.
    pub fn on_drag_start(
        &mut self,
        pointer: PointerId,
        id: NodeId,
        simulation: &mut Simulation,
    ) -> bool {
        if self.active.contains_key(&pointer) {
            return false;
        }
        let Some(position) = simulation.position(id) else {
            trace!(node = id, "drag start on unknown node ignored");
            return false;
        };

        if simulation.state().alpha_target == 0.0 {
            simulation.reheat(self.reheat_alpha_target);
        }
        simulation.pin(id, position);
        self.active.insert(pointer, id);
        debug!(node = id, pointer, "drag started");
        true
    }

    /// Moves the pin to the pointer's screen position.
    pub fn on_drag_move(
        &mut self,
        pointer: PointerId,
        position: Pos2,
        simulation: &mut Simulation,
        viewport: &ViewportController,
    ) -> bool {
        self.on_drag_move_world(pointer, viewport.to_world(position), simulation)
    }

    /// Moves the pin to a simulation-space position.
    pub fn on_drag_move_world(
        &mut self,
        pointer: PointerId,
        world: Vec2,
        simulation: &mut Simulation,
    ) -> bool {
        let Some(&id) = self.active.get(&pointer) else {
            return false;
        };
        if !world.x.is_finite() || !world.y.is_finite() {
            return false;
        }
        simulation.pin(id, world)
    }

    /// Releases the pointer's node. The last release lets the layout cool.
    pub fn on_drag_end(&mut self, pointer: PointerId, simulation: &mut Simulation) -> bool {
        let Some(id) = self.active.remove(&pointer) else {
            return false;
        };
        if !self.is_node_dragged(id) {
            simulation.unpin(id);
        }
        if self.active.is_empty() {
            simulation.cool();
        }
        debug!(node = id, pointer, "drag ended");
        true
    }

    /// Forgets every drag without touching a simulation, for use when the
    /// simulation they referred to has been replaced.
    pub fn reset(&mut self) {
        self.active.clear();
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{Rect, vec2};

    use crate::genealogy::{GenealogyEdge, GenealogyNode, Graph, Notables};
    use crate::layout::SimulationConfig;
    use crate::view::viewport::{ViewportConfig, ViewportTransform};

    use super::*;

    fn chain() -> Simulation {
        let person = |id: NodeId| GenealogyNode {
            id,
            name: format!("P{id}"),
            dissertations: None,
            students: None,
            numberofdescendents: 0,
        };
        let graph = Graph {
            base: 1,
            generations_up: 0,
            generations_down: 2,
            number_of_nodes: 3,
            number_of_edges: 2,
            nodes: vec![person(1), person(2), person(3)],
            edges: vec![
                GenealogyEdge {
                    from_node_id: 1,
                    to_node_id: 2,
                },
                GenealogyEdge {
                    from_node_id: 2,
                    to_node_id: 3,
                },
            ],
        };
        Simulation::new(&graph, &Notables::default(), &SimulationConfig::default())
            .expect("valid graph")
    }

    #[test]
    fn drag_start_pins_and_reheats() {
        let mut sim = chain();
        sim.run_until_settled(10_000);
        let mut drag = DragController::new(0.3);
        let before = sim.position(2).expect("node");

        assert!(drag.on_drag_start(7, 2, &mut sim));
        assert_eq!(sim.state().alpha_target, 0.3);
        assert!(sim.alpha() >= 0.3);
        assert_eq!(sim.node(2).and_then(|n| n.fixed), Some(before));
        assert!(drag.is_dragging());
    }

    #[test]
    fn drag_move_goes_through_inverse_viewport() {
        let mut sim = chain();
        let mut viewport = ViewportController::new(
            ViewportConfig::default(),
            Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(800.0, 600.0)),
        );
        viewport.set_transform(ViewportTransform {
            x: 20.0,
            y: 10.0,
            k: 2.0,
        });
        let mut drag = DragController::new(0.3);
        drag.on_drag_start(1, 3, &mut sim);

        assert!(drag.on_drag_move(1, Pos2::new(520.0, 210.0), &mut sim, &viewport));
        sim.tick();
        assert_eq!(sim.position(3), Some(vec2(50.0, -50.0)));
        assert_eq!(sim.node(3).map(|n| n.velocity), Some(Vec2::ZERO));
    }

    #[test]
    fn last_drag_end_cools() {
        let mut sim = chain();
        let mut drag = DragController::new(0.3);
        drag.on_drag_start(1, 1, &mut sim);
        drag.on_drag_start(2, 3, &mut sim);

        assert!(drag.on_drag_end(1, &mut sim));
        assert_eq!(sim.state().alpha_target, 0.3);
        assert!(sim.node(1).is_some_and(|n| n.fixed.is_none()));
        assert!(sim.node(3).is_some_and(|n| n.fixed.is_some()));

        assert!(drag.on_drag_end(2, &mut sim));
        assert_eq!(sim.state().alpha_target, 0.0);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn stale_events_are_ignored() {
        let mut sim = chain();
        let mut drag = DragController::new(0.3);
        assert!(!drag.on_drag_start(1, 99, &mut sim));
        assert!(!drag.on_drag_move_world(1, vec2(1.0, 1.0), &mut sim));
        assert!(!drag.on_drag_end(1, &mut sim));

        drag.on_drag_start(1, 2, &mut sim);
        sim.dispose();
        assert!(!drag.on_drag_move_world(1, vec2(1.0, 1.0), &mut sim));
        drag.on_drag_end(1, &mut sim);
        assert!(!drag.is_dragging());
    }
}
