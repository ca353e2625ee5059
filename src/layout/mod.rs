//! Force-directed layout engine.
//!
//! A [`Simulation`] owns a working copy of a genealogy graph's nodes and edges
//! and advances it one discrete tick at a time. Each tick runs the force
//! fields in a fixed order (link, charge, center, axis-x, axis-y, collision),
//! integrates velocities into positions, and cools `alpha` toward
//! `alpha_target`. The layout counts as settled once `alpha < alpha_min`.

pub mod forces;
pub mod geometry;
mod quadtree;

use std::collections::HashMap;
use std::fmt;

use eframe::egui::{Rect, Vec2, vec2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::error::GraphIntegrityError;
use crate::genealogy::{Graph, NodeId, Notables};
use crate::util::stable_pair;

use self::forces::{
    Axis, AxisForce, CenterForce, ChargeForce, CollisionForce, Force, ForceContext, LinkEnds,
    LinkForce, RestLength,
};
use self::geometry::{Lcg, bounds_of, is_finite};
pub use self::quadtree::QuadtreeCell;
use self::quadtree::{QuadNode, collect_quadtree_cells};

/// Golden angle, used to spread initial positions on a phyllotaxis spiral.
const INITIAL_ANGLE: f32 = 2.399_963_3;

/// Colour class of a node. Has no effect on the physics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    Base,
    Notable,
    Ordinary,
}

#[derive(Clone, Debug)]
pub struct SimNode {
    pub id: NodeId,
    pub label: String,
    /// Simulation-space position; NaN until placed.
    pub position: Vec2,
    pub velocity: Vec2,
    /// Pinned position. While set the node is held here and never integrates.
    pub fixed: Option<Vec2>,
    pub radius: f32,
    pub category: NodeCategory,
}

impl SimNode {
    pub fn new(id: NodeId, label: String, category: NodeCategory, radius: f32) -> Self {
        Self {
            id,
            label,
            position: vec2(f32::NAN, f32::NAN),
            velocity: Vec2::ZERO,
            fixed: None,
            radius,
            category,
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.fixed.is_some()
    }
}

/// An advisor → student link, stored as indices into the node array.
/// Parallel edges are kept as separate entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimEdge {
    pub source: usize,
    pub target: usize,
    pub source_id: NodeId,
    pub target_id: NodeId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub rest_length: RestLength,
    /// `None` derives the strength from endpoint degrees.
    pub strength: Option<f32>,
    pub iterations: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            rest_length: RestLength::default(),
            strength: None,
            iterations: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeConfig {
    /// Negative values repel.
    pub strength: f32,
    pub theta: f32,
    pub distance_min: f32,
    pub distance_max: f32,
}

impl Default for ChargeConfig {
    fn default() -> Self {
        Self {
            strength: -120.0,
            theta: 0.9,
            distance_min: 1.0,
            distance_max: f32::INFINITY,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    pub radius_multiplier: f32,
    pub strength: f32,
    pub iterations: usize,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            radius_multiplier: 1.6,
            strength: 1.0,
            iterations: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub alpha_min: f32,
    pub alpha_decay: f32,
    /// Fraction of velocity kept after each tick.
    pub velocity_decay: f32,
    /// `alpha_target` used while a node is being dragged.
    pub reheat_alpha_target: f32,
    pub seed: u32,
    pub base_radius: f32,
    pub node_radius: f32,
    pub link: LinkConfig,
    pub charge: ChargeConfig,
    pub center_strength: f32,
    pub axis_x_strength: f32,
    pub axis_y_strength: f32,
    pub collision: CollisionConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            alpha_min: 0.001,
            alpha_decay: 1.0 - 0.001_f32.powf(1.0 / 300.0),
            velocity_decay: 0.6,
            reheat_alpha_target: 0.3,
            seed: 1,
            base_radius: 12.0,
            node_radius: 6.0,
            link: LinkConfig::default(),
            charge: ChargeConfig::default(),
            center_strength: 0.5,
            axis_x_strength: 0.01,
            axis_y_strength: 0.01,
            collision: CollisionConfig::default(),
        }
    }
}

impl SimulationConfig {
    fn radius_for(&self, category: NodeCategory) -> f32 {
        match category {
            NodeCategory::Base => self.base_radius,
            NodeCategory::Notable | NodeCategory::Ordinary => self.node_radius,
        }
    }

    /// The standard force list, in tick order.
    fn build_forces(&self) -> Vec<Box<dyn Force>> {
        vec![
            Box::new(LinkForce::new(
                self.link.rest_length.clone().into_fn(),
                self.link.strength,
                self.link.iterations,
            )),
            Box::new(ChargeForce::new(
                self.charge.strength,
                self.charge.theta,
                self.charge.distance_min,
                self.charge.distance_max,
            )),
            Box::new(CenterForce::new(Vec2::ZERO, self.center_strength)),
            Box::new(AxisForce::new(Axis::X, 0.0, self.axis_x_strength)),
            Box::new(AxisForce::new(Axis::Y, 0.0, self.axis_y_strength)),
            Box::new(CollisionForce::new(
                self.collision.radius_multiplier,
                self.collision.strength,
                self.collision.iterations,
            )),
        ]
    }
}

/// Energy bookkeeping of a running simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationState {
    pub alpha: f32,
    pub alpha_target: f32,
    pub alpha_decay: f32,
    pub alpha_min: f32,
    pub velocity_decay: f32,
}

impl SimulationState {
    fn from_config(config: &SimulationConfig) -> Self {
        Self {
            alpha: 1.0,
            alpha_target: 0.0,
            alpha_decay: config.alpha_decay.clamp(0.0, 1.0),
            alpha_min: config.alpha_min.clamp(0.0, 1.0),
            velocity_decay: config.velocity_decay.clamp(0.0, 1.0),
        }
    }

    pub fn is_settled(&self) -> bool {
        self.alpha < self.alpha_min
    }
}

/// Payload of the per-tick notification.
pub struct TickEvent<'a> {
    pub tick: u64,
    pub alpha: f32,
    pub nodes: &'a [SimNode],
    pub edges: &'a [SimEdge],
}

pub type TickObserver = Box<dyn FnMut(&TickEvent<'_>)>;

pub struct Simulation {
    nodes: Vec<SimNode>,
    edges: Vec<SimEdge>,
    index_by_id: HashMap<NodeId, usize>,
    degree: Vec<usize>,
    base_id: NodeId,
    base_index: Option<usize>,
    config: SimulationConfig,
    state: SimulationState,
    forces: Vec<Box<dyn Force>>,
    rng: Lcg,
    tick_count: u64,
    observer: Option<TickObserver>,
    disposed: bool,
    settle_reported: bool,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("state", &self.state)
            .field("tick_count", &self.tick_count)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl Simulation {
    /// Validates `graph` and builds a fresh simulation for it with
    /// `alpha = 1`. The caller's graph is only read.
    pub fn new(
        graph: &Graph,
        notables: &Notables,
        config: &SimulationConfig,
    ) -> Result<Self, GraphIntegrityError> {
        graph.validate()?;

        let mut index_by_id = HashMap::with_capacity(graph.nodes.len());
        let nodes = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(index, person)| {
                index_by_id.insert(person.id, index);
                let category = if person.id == graph.base {
                    NodeCategory::Base
                } else if notables.contains(person.id) {
                    NodeCategory::Notable
                } else {
                    NodeCategory::Ordinary
                };
                SimNode::new(
                    person.id,
                    person.name.clone(),
                    category,
                    config.radius_for(category),
                )
            })
            .collect::<Vec<_>>();

        let mut degree = vec![0usize; nodes.len()];
        let mut edges = Vec::with_capacity(graph.edges.len());
        for edge in &graph.edges {
            let from = edge.from_node_id;
            let to = edge.to_node_id;
            let (Some(&source), Some(&target)) = (index_by_id.get(&from), index_by_id.get(&to))
            else {
                continue;
            };
            degree[source] += 1;
            degree[target] += 1;
            edges.push(SimEdge {
                source,
                target,
                source_id: from,
                target_id: to,
            });
        }

        let base_index = index_by_id.get(&graph.base).copied();
        let mut simulation = Self {
            nodes,
            edges,
            index_by_id,
            degree,
            base_id: graph.base,
            base_index,
            config: config.clone(),
            state: SimulationState::from_config(config),
            forces: config.build_forces(),
            rng: Lcg::new(config.seed),
            tick_count: 0,
            observer: None,
            disposed: false,
            settle_reported: false,
        };
        simulation.place_unplaced_nodes();
        simulation.initialize_forces();

        debug!(
            base = graph.base,
            nodes = simulation.nodes.len(),
            edges = simulation.edges.len(),
            "layout simulation initialized"
        );
        Ok(simulation)
    }

    /// Puts every node without a finite position on a phyllotaxis spiral
    /// around the origin, rotated and jittered by the seed.
    fn place_unplaced_nodes(&mut self) {
        let rotation = self.rng.next_f32() * std::f32::consts::TAU;
        let seed = u64::from(self.config.seed);
        for (index, node) in self.nodes.iter_mut().enumerate() {
            if is_finite(node.position) {
                continue;
            }
            let radius = 10.0 * (0.5 + index as f32).sqrt();
            let angle = rotation + index as f32 * INITIAL_ANGLE;
            let (jx, jy) = stable_pair(node.id, seed);
            node.position = vec2(angle.cos(), angle.sin()) * radius + vec2(jx, jy);
            node.velocity = Vec2::ZERO;
        }
    }

    fn initialize_forces(&mut self) {
        for force in &mut self.forces {
            force.initialize(&self.nodes, &self.edges);
        }
    }

    /// Advances the layout by one discrete step and notifies the observer.
    pub fn tick(&mut self) {
        if self.disposed {
            return;
        }

        let alpha = self.state.alpha;
        {
            let Self {
                nodes,
                edges,
                forces,
                rng,
                ..
            } = self;
            let mut ctx = ForceContext {
                nodes,
                edges,
                alpha,
                rng,
            };
            for force in forces.iter_mut() {
                force.apply(&mut ctx);
            }
        }

        let velocity_decay = self.state.velocity_decay;
        for node in &mut self.nodes {
            match node.fixed {
                Some(fixed) => {
                    node.position = fixed;
                    node.velocity = Vec2::ZERO;
                }
                None => {
                    node.velocity *= velocity_decay;
                    node.position += node.velocity;
                }
            }
        }

        self.state.alpha += (self.state.alpha_target - self.state.alpha) * self.state.alpha_decay;
        self.tick_count += 1;
        trace!(tick = self.tick_count, alpha = self.state.alpha, "layout tick");

        if let Some(observer) = self.observer.as_mut() {
            observer(&TickEvent {
                tick: self.tick_count,
                alpha: self.state.alpha,
                nodes: &self.nodes,
                edges: &self.edges,
            });
        }

        if self.state.is_settled() {
            if !self.settle_reported {
                self.settle_reported = true;
                info!(ticks = self.tick_count, "layout settled");
            }
        } else {
            self.settle_reported = false;
        }
    }

    /// Whether a frame loop should keep calling [`tick`](Self::tick).
    pub fn is_running(&self) -> bool {
        !self.disposed
            && (!self.state.is_settled() || self.state.alpha_target >= self.state.alpha_min)
    }

    /// Ticks once if the layout is still running. Returns whether it ticked.
    pub fn step(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.tick();
        true
    }

    /// Ticks until settled or `max_ticks` is reached; returns ticks run.
    pub fn run_until_settled(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.step() {
            ticks += 1;
        }
        ticks
    }

    /// Raises `alpha_target` (and `alpha`, if lower) so the layout keeps moving.
    pub fn reheat(&mut self, alpha_target: f32) {
        if self.disposed {
            return;
        }
        let target = alpha_target.clamp(0.0, 1.0);
        self.state.alpha_target = target;
        self.state.alpha = self.state.alpha.max(target);
        debug!(alpha_target = target, "layout reheated");
    }

    /// Lets the layout cool back down to rest.
    pub fn cool(&mut self) {
        self.state.alpha_target = 0.0;
    }

    /// Holds node `id` at `position`. Returns false for unknown ids and
    /// non-finite positions.
    pub fn pin(&mut self, id: NodeId, position: Vec2) -> bool {
        if !is_finite(position) {
            trace!(node = id, "non-finite pin ignored");
            return false;
        }
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        node.fixed = Some(position);
        node.velocity = Vec2::ZERO;
        true
    }

    /// Releases a pin. The node restarts at rest from where it was held.
    pub fn unpin(&mut self, id: NodeId) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        if node.fixed.take().is_none() {
            return false;
        }
        node.velocity = Vec2::ZERO;
        true
    }

    /// Drops all state. Every later call is a no-op.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        debug!(
            nodes = self.nodes.len(),
            ticks = self.tick_count,
            "layout simulation disposed"
        );
        self.nodes.clear();
        self.edges.clear();
        self.index_by_id.clear();
        self.degree.clear();
        self.forces.clear();
        self.observer = None;
        self.base_index = None;
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn set_observer(&mut self, observer: impl FnMut(&TickEvent<'_>) + 'static) {
        if !self.disposed {
            self.observer = Some(Box::new(observer));
        }
    }

    /// Replaces the spring rest-length policy and recomputes link lengths.
    pub fn set_rest_length(&mut self, rest_length: impl Fn(&LinkEnds<'_>) -> f32 + 'static) {
        if self.disposed {
            return;
        }
        let mut link = LinkForce::new(
            Box::new(rest_length),
            self.config.link.strength,
            self.config.link.iterations,
        );
        link.initialize(&self.nodes, &self.edges);
        if let Some(slot) = self.forces.iter_mut().find(|force| force.name() == "link") {
            *slot = Box::new(link);
        }
    }

    /// Applies new force parameters while keeping positions and alpha.
    pub fn reconfigure(&mut self, config: &SimulationConfig) {
        if self.disposed {
            return;
        }
        for node in &mut self.nodes {
            node.radius = config.radius_for(node.category);
        }
        self.state.alpha_decay = config.alpha_decay.clamp(0.0, 1.0);
        self.state.alpha_min = config.alpha_min.clamp(0.0, 1.0);
        self.state.velocity_decay = config.velocity_decay.clamp(0.0, 1.0);
        self.forces = config.build_forces();
        self.config = config.clone();
        self.initialize_forces();
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn alpha(&self) -> f32 {
        self.state.alpha
    }

    pub fn is_settled(&self) -> bool {
        self.state.is_settled()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[SimEdge] {
        &self.edges
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index_by_id.get(&id).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&SimNode> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut SimNode> {
        let index = self.index_of(id)?;
        self.nodes.get_mut(index)
    }

    pub fn position(&self, id: NodeId) -> Option<Vec2> {
        self.node(id).map(|node| node.position)
    }

    pub fn degree(&self, id: NodeId) -> Option<usize> {
        self.index_of(id).map(|index| self.degree[index])
    }

    pub fn base_id(&self) -> NodeId {
        self.base_id
    }

    pub fn base_index(&self) -> Option<usize> {
        self.base_index
    }

    pub fn base_position(&self) -> Option<Vec2> {
        self.base_index.map(|index| self.nodes[index].position)
    }

    /// Simulation-space bounding box of all node circles.
    pub fn bounds(&self) -> Option<Rect> {
        bounds_of(self.nodes.iter().map(|node| (node.position, node.radius)))
    }

    /// Cells of a quadtree over the current positions, for debug overlays.
    pub fn quadtree_cells(&self, cells: &mut Vec<QuadtreeCell>) {
        cells.clear();
        let positions = self.nodes.iter().map(|node| node.position).collect::<Vec<_>>();
        if let Some(tree) = QuadNode::build(&positions) {
            collect_quadtree_cells(&tree, 0, cells);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::genealogy::{GenealogyEdge, GenealogyNode, NotablePerson};

    use super::*;

    fn person(id: NodeId) -> GenealogyNode {
        GenealogyNode {
            id,
            name: format!("Person {id}"),
            dissertations: None,
            students: None,
            numberofdescendents: 0,
        }
    }

    fn graph(base: NodeId, ids: &[NodeId], links: &[(NodeId, NodeId)]) -> Graph {
        Graph {
            base,
            generations_up: 0,
            generations_down: 0,
            number_of_nodes: ids.len(),
            number_of_edges: links.len(),
            nodes: ids.iter().copied().map(person).collect(),
            edges: links
                .iter()
                .map(|&(from, to)| GenealogyEdge {
                    from_node_id: from,
                    to_node_id: to,
                })
                .collect(),
        }
    }

    fn simulation(graph: &Graph) -> Simulation {
        Simulation::new(graph, &Notables::default(), &SimulationConfig::default())
            .expect("valid graph")
    }

    #[test]
    fn builds_working_copy_of_graph() {
        let graph = graph(1, &[1, 2, 3], &[(1, 2), (2, 3), (2, 3)]);
        let sim = simulation(&graph);

        assert_eq!(sim.nodes().len(), 3);
        assert_eq!(sim.edges().len(), 3);
        assert_eq!(sim.alpha(), 1.0);
        assert_eq!(sim.degree(2), Some(3));
        assert_eq!(sim.node(1).map(|n| n.category), Some(NodeCategory::Base));
        assert!(sim.nodes().iter().all(|node| is_finite(node.position)));
        assert!(sim.nodes().iter().all(|node| node.velocity == Vec2::ZERO));
    }

    #[test]
    fn rejects_dangling_edges() {
        let graph = graph(1, &[1], &[(1, 2)]);
        let error = Simulation::new(&graph, &Notables::default(), &SimulationConfig::default())
            .expect_err("dangling edge");
        assert_eq!(
            error,
            GraphIntegrityError::DanglingEdge {
                from: 1,
                to: 2,
                missing: 2
            }
        );
    }

    #[test]
    fn base_node_is_larger_and_notables_are_tagged() {
        let graph = graph(1, &[1, 2, 3], &[(1, 2)]);
        let notables = Notables::new([NotablePerson {
            id: 3,
            fields: true,
            abel: false,
            note: "Fields medal".to_owned(),
        }]);
        let sim = Simulation::new(&graph, &notables, &SimulationConfig::default())
            .expect("valid graph");

        let base = sim.node(1).expect("base");
        let other = sim.node(2).expect("other");
        assert!(base.radius > other.radius);
        assert_eq!(sim.node(3).map(|n| n.category), Some(NodeCategory::Notable));
        assert_eq!(other.category, NodeCategory::Ordinary);
    }

    #[test]
    fn placement_is_deterministic_for_a_seed() {
        let graph = graph(1, &[1, 2, 3, 4], &[(1, 2), (1, 3), (3, 4)]);
        let first = simulation(&graph);
        let second = simulation(&graph);
        for (a, b) in first.nodes().iter().zip(second.nodes()) {
            assert_eq!(a.position, b.position);
        }

        let config = SimulationConfig {
            seed: 99,
            ..SimulationConfig::default()
        };
        let reseeded = Simulation::new(&graph, &Notables::default(), &config).expect("valid");
        assert_ne!(reseeded.nodes()[1].position, first.nodes()[1].position);
    }

    #[test]
    fn trajectories_are_reproducible() {
        let graph = graph(1, &[1, 2, 3, 4, 5], &[(1, 2), (1, 3), (3, 4), (3, 5)]);
        let mut first = simulation(&graph);
        let mut second = simulation(&graph);
        for _ in 0..50 {
            first.tick();
            second.tick();
        }
        for (a, b) in first.nodes().iter().zip(second.nodes()) {
            assert_eq!(a.position, b.position);
        }
    }

    #[test]
    fn alpha_decays_toward_target() {
        let graph = graph(1, &[1, 2], &[(1, 2)]);
        let mut sim = simulation(&graph);
        let before = sim.alpha();
        sim.tick();
        assert!(sim.alpha() < before);

        let ticks = sim.run_until_settled(10_000);
        assert!(ticks > 100);
        assert!(sim.is_settled());
        assert!(!sim.step());
    }

    #[test]
    fn empty_graph_ticks_without_effect() {
        let graph = graph(1, &[], &[]);
        let mut sim = simulation(&graph);
        sim.tick();
        assert!(sim.alpha() < 1.0);
        sim.run_until_settled(10_000);
        assert!(sim.is_settled());
        assert!(sim.base_position().is_none());
        assert!(sim.bounds().is_none());
    }

    #[test]
    fn isolated_node_still_feels_charge() {
        let graph = graph(1, &[1, 2, 3], &[(1, 2)]);
        let mut sim = simulation(&graph);
        let start = sim.position(3).expect("node 3");
        sim.tick();
        assert_ne!(sim.position(3), Some(start));
    }

    #[test]
    fn pinned_node_stays_put_with_zero_velocity() {
        let graph = graph(1, &[1, 2, 3], &[(1, 2), (2, 3)]);
        let mut sim = simulation(&graph);
        assert!(sim.pin(2, vec2(40.0, -25.0)));

        for _ in 0..30 {
            sim.tick();
            let node = sim.node(2).expect("pinned");
            assert_eq!(node.position, vec2(40.0, -25.0));
            assert_eq!(node.velocity, Vec2::ZERO);
        }

        assert!(sim.unpin(2));
        assert_eq!(sim.node(2).map(|n| n.velocity), Some(Vec2::ZERO));
        assert!(!sim.unpin(2));
        assert!(!sim.pin(42, Vec2::ZERO));
    }

    #[test]
    fn non_finite_pin_is_rejected() {
        let graph = graph(1, &[1, 2, 3], &[(1, 2), (2, 3)]);
        let mut sim = simulation(&graph);
        assert!(!sim.pin(2, vec2(f32::NAN, 0.0)));
        assert!(!sim.pin(2, vec2(0.0, f32::INFINITY)));
        assert!(!sim.node(2).expect("node 2").is_pinned());

        for _ in 0..20 {
            sim.tick();
        }
        assert!(sim.nodes().iter().all(|n| is_finite(n.position) && is_finite(n.velocity)));
    }

    #[test]
    fn reheat_keeps_settled_layout_running() {
        let graph = graph(1, &[1, 2], &[(1, 2)]);
        let mut sim = simulation(&graph);
        sim.run_until_settled(10_000);
        assert!(!sim.is_running());

        sim.reheat(0.3);
        assert!(sim.is_running());
        assert!(sim.alpha() >= 0.3);
        for _ in 0..1_000 {
            sim.tick();
        }
        assert!(sim.alpha() > 0.29);

        sim.cool();
        sim.run_until_settled(10_000);
        assert!(sim.is_settled());
    }

    #[test]
    fn observer_sees_every_tick() {
        let graph = graph(1, &[1, 2], &[(1, 2)]);
        let mut sim = simulation(&graph);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        sim.set_observer(move |event| {
            sink.borrow_mut().push((event.tick, event.nodes.len(), event.edges.len()));
        });

        sim.tick();
        sim.tick();
        assert_eq!(*seen.borrow(), vec![(1, 2, 1), (2, 2, 1)]);

        sim.dispose();
        assert_eq!(Rc::strong_count(&seen), 1);
    }

    #[test]
    fn custom_rest_length_changes_spacing() {
        let graph = graph(1, &[1, 2], &[(1, 2)]);
        let mut short = simulation(&graph);
        short.set_rest_length(|_| 20.0);
        let mut long = simulation(&graph);
        long.set_rest_length(|_| 200.0);

        short.run_until_settled(10_000);
        long.run_until_settled(10_000);
        let gap = |sim: &Simulation| {
            geometry::distance(
                sim.position(1).expect("1"),
                sim.position(2).expect("2"),
            )
        };
        assert!(gap(&long) > gap(&short) + 50.0);
    }

    #[test]
    fn dispose_clears_state_and_ignores_later_calls() {
        let graph = graph(1, &[1, 2], &[(1, 2)]);
        let mut sim = simulation(&graph);
        sim.dispose();

        assert!(sim.is_disposed());
        assert!(sim.nodes().is_empty());
        assert!(sim.edges().is_empty());
        assert!(!sim.pin(1, Vec2::ZERO));
        assert!(!sim.step());
        sim.tick();
        assert_eq!(sim.tick_count(), 0);
    }

    #[test]
    fn reconfigure_keeps_positions() {
        let graph = graph(1, &[1, 2, 3], &[(1, 2), (1, 3)]);
        let mut sim = simulation(&graph);
        for _ in 0..10 {
            sim.tick();
        }
        let before = sim.nodes().iter().map(|n| n.position).collect::<Vec<_>>();
        let config = SimulationConfig {
            node_radius: 9.0,
            ..SimulationConfig::default()
        };
        sim.reconfigure(&config);

        let after = sim.nodes().iter().map(|n| n.position).collect::<Vec<_>>();
        assert_eq!(before, after);
        assert_eq!(sim.node(2).map(|n| n.radius), Some(9.0));
    }

    #[test]
    fn partial_config_json_overrides_named_fields() {
        let config: SimulationConfig = serde_json::from_str(
            r#"{"seed": 7, "charge": {"strength": -50.0}, "link": {"rest_length": {"kind": "fixed", "distance": 80.0}}}"#,
        )
        .expect("config parses");
        assert_eq!(config.seed, 7);
        assert_eq!(config.charge.strength, -50.0);
        assert_eq!(config.charge.theta, 0.9);
        assert_eq!(config.link.rest_length, RestLength::Fixed { distance: 80.0 });
        assert_eq!(config.velocity_decay, 0.6);
    }

    #[test]
    fn quadtree_overlay_has_cells() {
        let ids = (1..=40).collect::<Vec<_>>();
        let graph = graph(1, &ids, &[]);
        let sim = simulation(&graph);
        let mut cells = Vec::new();
        sim.quadtree_cells(&mut cells);
        assert!(cells.len() > 1);
    }
}
