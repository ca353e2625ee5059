//! Force fields. Each one reads the current node positions and adds to node
//! velocities; none of them writes positions.

use std::fmt;

use eframe::egui::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Lcg, separate_coincident};
use super::quadtree::{QuadNode, collect_candidate_pairs};
use super::{NodeCategory, SimEdge, SimNode};

/// Mutable view handed to every force during a tick.
pub struct ForceContext<'a> {
    pub nodes: &'a mut [SimNode],
    pub edges: &'a [SimEdge],
    pub alpha: f32,
    pub rng: &'a mut Lcg,
}

pub trait Force {
    fn name(&self) -> &'static str;

    /// Called once the node and edge arrays are final, and again whenever the
    /// force is rebuilt. Precomputation that only depends on topology goes here.
    fn initialize(&mut self, _nodes: &[SimNode], _edges: &[SimEdge]) {}

    fn apply(&mut self, ctx: &mut ForceContext<'_>);
}

/// Endpoints of one link, as seen by a rest-length policy.
pub struct LinkEnds<'a> {
    pub source: &'a SimNode,
    pub target: &'a SimNode,
    pub source_degree: usize,
    pub target_degree: usize,
}

impl LinkEnds<'_> {
    pub fn touches_base(&self) -> bool {
        self.source.category == NodeCategory::Base || self.target.category == NodeCategory::Base
    }
}

pub type RestLengthFn = Box<dyn Fn(&LinkEnds<'_>) -> f32>;

/// Built-in spring rest-length policies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RestLength {
    Fixed {
        distance: f32,
    },
    /// `base + per_edge * (deg(source) + deg(target))`, multiplied by
    /// `base_multiplier` when either end is the base node.
    DegreeWeighted {
        base: f32,
        per_edge: f32,
        base_multiplier: f32,
    },
}

impl Default for RestLength {
    fn default() -> Self {
        Self::DegreeWeighted {
            base: 30.0,
            per_edge: 6.0,
            base_multiplier: 1.5,
        }
    }
}

impl RestLength {
    pub fn distance(&self, ends: &LinkEnds<'_>) -> f32 {
        match *self {
            Self::Fixed { distance } => distance,
            Self::DegreeWeighted {
                base,
                per_edge,
                base_multiplier,
            } => {
                let degree = (ends.source_degree + ends.target_degree) as f32;
                let length = base + per_edge * degree;
                if ends.touches_base() {
                    length * base_multiplier
                } else {
                    length
                }
            }
        }
    }

    pub fn into_fn(self) -> RestLengthFn {
        Box::new(move |ends| self.distance(ends))
    }
}

/// Spring force pulling linked nodes toward a rest length.
pub struct LinkForce {
    rest_length: RestLengthFn,
    strength: Option<f32>,
    iterations: usize,
    distances: Vec<f32>,
    strengths: Vec<f32>,
    bias: Vec<f32>,
}

impl fmt::Debug for LinkForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkForce")
            .field("strength", &self.strength)
            .field("iterations", &self.iterations)
            .field("links", &self.distances.len())
            .finish()
    }
}

impl LinkForce {
    /// `strength` of `None` uses `1 / min(deg(source), deg(target))`, which
    /// keeps hubs from being yanked around by their many links.
    pub fn new(rest_length: RestLengthFn, strength: Option<f32>, iterations: usize) -> Self {
        Self {
            rest_length,
            strength: strength.map(|value| value.clamp(0.0, 1.0)),
            iterations: iterations.max(1),
            distances: Vec::new(),
            strengths: Vec::new(),
            bias: Vec::new(),
        }
    }

    pub fn rest_lengths(&self) -> &[f32] {
        &self.distances
    }
}

fn degrees(node_count: usize, edges: &[SimEdge]) -> Vec<usize> {
    let mut degree = vec![0usize; node_count];
    for edge in edges {
        degree[edge.source] += 1;
        degree[edge.target] += 1;
    }
    degree
}

impl Force for LinkForce {
    fn name(&self) -> &'static str {
        "link"
    }

    fn initialize(&mut self, nodes: &[SimNode], edges: &[SimEdge]) {
        let degree = degrees(nodes.len(), edges);

        self.distances.clear();
        self.strengths.clear();
        self.bias.clear();
        for edge in edges {
            let source_degree = degree[edge.source];
            let target_degree = degree[edge.target];
            let ends = LinkEnds {
                source: &nodes[edge.source],
                target: &nodes[edge.target],
                source_degree,
                target_degree,
            };

            let distance = (self.rest_length)(&ends);
            self.distances
                .push(if distance.is_finite() { distance.max(0.0) } else { 0.0 });
            self.strengths.push(
                self.strength
                    .unwrap_or_else(|| 1.0 / source_degree.min(target_degree).max(1) as f32),
            );
            self.bias
                .push(source_degree as f32 / (source_degree + target_degree).max(1) as f32);
        }
    }

    fn apply(&mut self, ctx: &mut ForceContext<'_>) {
        for _ in 0..self.iterations {
            for (index, edge) in ctx.edges.iter().enumerate() {
                let (source, target) = (edge.source, edge.target);
                if source == target {
                    continue;
                }

                let source_node = &ctx.nodes[source];
                let target_node = &ctx.nodes[target];
                let delta = (target_node.position + target_node.velocity)
                    - (source_node.position + source_node.velocity);
                let delta = separate_coincident(delta, ctx.rng);
                let length = delta.length();

                let scale =
                    (length - self.distances[index]) / length * ctx.alpha * self.strengths[index];
                let correction = delta * scale;
                let bias = self.bias[index];

                ctx.nodes[target].velocity -= correction * bias;
                ctx.nodes[source].velocity += correction * (1.0 - bias);
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct ChargeParams {
    strength: f32,
    theta_sq: f32,
    distance_min_sq: f32,
    distance_max_sq: f32,
    alpha: f32,
}

/// Many-body repulsion with the Barnes–Hut approximation: cells that look
/// small from a node (side / distance < theta) act as one body.
#[derive(Clone, Debug)]
pub struct ChargeForce {
    strength: f32,
    theta: f32,
    distance_min: f32,
    distance_max: f32,
    positions: Vec<Vec2>,
}

impl ChargeForce {
    pub fn new(strength: f32, theta: f32, distance_min: f32, distance_max: f32) -> Self {
        Self {
            strength,
            theta: theta.max(0.0),
            distance_min: distance_min.max(f32::EPSILON),
            distance_max: distance_max.max(distance_min),
            positions: Vec::new(),
        }
    }

    fn params(&self, alpha: f32) -> ChargeParams {
        ChargeParams {
            strength: self.strength,
            theta_sq: self.theta * self.theta,
            distance_min_sq: self.distance_min * self.distance_min,
            distance_max_sq: self.distance_max * self.distance_max,
            alpha,
        }
    }
}

fn charge_contribution(
    delta: Vec2,
    mut distance_sq: f32,
    weight: f32,
    params: ChargeParams,
) -> Vec2 {
    if distance_sq < params.distance_min_sq {
        distance_sq = (params.distance_min_sq * distance_sq).sqrt();
    }
    delta * (weight * params.strength * params.alpha / distance_sq)
}

fn accumulate_charge_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
    rng: &mut Lcg,
    velocity: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }
            let mut delta = positions[other_index] - point;
            let mut distance_sq = delta.length_sq();
            if distance_sq >= params.distance_max_sq {
                continue;
            }
            if distance_sq == 0.0 {
                delta = separate_coincident(delta, rng);
                distance_sq = delta.length_sq();
            }
            *velocity += charge_contribution(delta, distance_sq, 1.0, params);
        }
        return;
    }

    let delta = node.center_of_mass - point;
    let distance_sq = delta.length_sq();
    let side = node.bounds.side_length();
    let can_approximate =
        !node.bounds.contains(point) && (side * side / params.theta_sq) < distance_sq;

    if can_approximate {
        if distance_sq < params.distance_max_sq {
            *velocity += charge_contribution(delta, distance_sq, node.mass, params);
        }
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_charge_for_node(child, index, positions, params, rng, velocity);
    }
}

impl Force for ChargeForce {
    fn name(&self) -> &'static str {
        "charge"
    }

    fn apply(&mut self, ctx: &mut ForceContext<'_>) {
        if ctx.nodes.len() < 2 {
            return;
        }

        self.positions.clear();
        self.positions
            .extend(ctx.nodes.iter().map(|node| node.position));
        let Some(tree) = QuadNode::build(&self.positions) else {
            return;
        };

        let params = self.params(ctx.alpha);
        for (index, node) in ctx.nodes.iter_mut().enumerate() {
            accumulate_charge_for_node(
                &tree,
                index,
                &self.positions,
                params,
                ctx.rng,
                &mut node.velocity,
            );
        }
    }
}

/// Exact O(n²) repulsion with the same distance clamping as [`ChargeForce`].
/// Used to check the approximation.
#[derive(Clone, Debug)]
pub struct PairwiseChargeForce {
    inner: ChargeForce,
}

impl PairwiseChargeForce {
    pub fn new(strength: f32, distance_min: f32, distance_max: f32) -> Self {
        Self {
            inner: ChargeForce::new(strength, 0.0, distance_min, distance_max),
        }
    }
}

impl Force for PairwiseChargeForce {
    fn name(&self) -> &'static str {
        "charge-pairwise"
    }

    fn apply(&mut self, ctx: &mut ForceContext<'_>) {
        let params = self.inner.params(ctx.alpha);
        let positions = ctx.nodes.iter().map(|node| node.position).collect::<Vec<_>>();
        for (index, node) in ctx.nodes.iter_mut().enumerate() {
            for (other_index, other) in positions.iter().enumerate() {
                if other_index == index {
                    continue;
                }
                let mut delta = *other - positions[index];
                let mut distance_sq = delta.length_sq();
                if distance_sq >= params.distance_max_sq {
                    continue;
                }
                if distance_sq == 0.0 {
                    delta = separate_coincident(delta, ctx.rng);
                    distance_sq = delta.length_sq();
                }
                node.velocity += charge_contribution(delta, distance_sq, 1.0, params);
            }
        }
    }
}

/// Shifts all free nodes together so their centroid moves toward `target`.
/// Pinned nodes neither count toward the centroid nor move.
#[derive(Clone, Debug)]
pub struct CenterForce {
    target: Vec2,
    strength: f32,
}

impl CenterForce {
    pub fn new(target: Vec2, strength: f32) -> Self {
        Self { target, strength }
    }
}

impl Force for CenterForce {
    fn name(&self) -> &'static str {
        "center"
    }

    fn apply(&mut self, ctx: &mut ForceContext<'_>) {
        let mut sum = Vec2::ZERO;
        let mut count = 0usize;
        for node in ctx.nodes.iter().filter(|node| node.fixed.is_none()) {
            sum += node.position;
            count += 1;
        }
        if count == 0 {
            return;
        }

        let shift = (sum / count as f32 - self.target) * self.strength;
        for node in ctx.nodes.iter_mut().filter(|node| node.fixed.is_none()) {
            node.velocity -= shift;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Weak per-node pull toward a line `x = target` or `y = target`.
#[derive(Clone, Debug)]
pub struct AxisForce {
    axis: Axis,
    target: f32,
    strength: f32,
}

impl AxisForce {
    pub fn new(axis: Axis, target: f32, strength: f32) -> Self {
        Self {
            axis,
            target,
            strength,
        }
    }
}

impl Force for AxisForce {
    fn name(&self) -> &'static str {
        match self.axis {
            Axis::X => "axis-x",
            Axis::Y => "axis-y",
        }
    }

    fn apply(&mut self, ctx: &mut ForceContext<'_>) {
        let scale = self.strength * ctx.alpha;
        for node in ctx.nodes.iter_mut() {
            match self.axis {
                Axis::X => node.velocity.x += (self.target - node.position.x) * scale,
                Axis::Y => node.velocity.y += (self.target - node.position.y) * scale,
            }
        }
    }
}

/// Pushes apart circles that will overlap after this tick's velocities are
/// applied. Not scaled by alpha, so it still holds once the layout cools.
#[derive(Clone, Debug)]
pub struct CollisionForce {
    radius_multiplier: f32,
    strength: f32,
    iterations: usize,
    predicted: Vec<Vec2>,
    pairs: Vec<(usize, usize)>,
}

impl CollisionForce {
    pub fn new(radius_multiplier: f32, strength: f32, iterations: usize) -> Self {
        Self {
            radius_multiplier: radius_multiplier.max(0.0),
            strength: strength.clamp(0.0, 1.0),
            iterations: iterations.max(1),
            predicted: Vec::new(),
            pairs: Vec::new(),
        }
    }

    fn collision_radius(&self, node: &SimNode) -> f32 {
        node.radius * self.radius_multiplier
    }
}

impl Force for CollisionForce {
    fn name(&self) -> &'static str {
        "collision"
    }

    fn apply(&mut self, ctx: &mut ForceContext<'_>) {
        if ctx.nodes.len() < 2 {
            return;
        }

        let max_radius = ctx
            .nodes
            .iter()
            .map(|node| self.collision_radius(node))
            .fold(0.0_f32, f32::max);
        if max_radius <= 0.0 {
            return;
        }
        let reach = max_radius * 2.0;

        for _ in 0..self.iterations {
            self.predicted.clear();
            self.predicted
                .extend(ctx.nodes.iter().map(|node| node.position + node.velocity));
            let Some(tree) = QuadNode::build(&self.predicted) else {
                return;
            };

            self.pairs.clear();
            collect_candidate_pairs(&tree, &tree, true, reach * reach, &mut self.pairs);
            self.pairs.sort_unstable();

            for &(i, j) in &self.pairs {
                let radius_i = self.collision_radius(&ctx.nodes[i]);
                let radius_j = self.collision_radius(&ctx.nodes[j]);
                let min_distance = radius_i + radius_j;

                let predicted_i = ctx.nodes[i].position + ctx.nodes[i].velocity;
                let predicted_j = ctx.nodes[j].position + ctx.nodes[j].velocity;
                let mut delta = predicted_i - predicted_j;
                let mut distance_sq = delta.length_sq();
                if distance_sq >= min_distance * min_distance {
                    continue;
                }
                if distance_sq == 0.0 {
                    delta = separate_coincident(delta, ctx.rng);
                    distance_sq = delta.length_sq();
                }

                let distance = distance_sq.sqrt();
                let push = delta * ((min_distance - distance) / distance * self.strength);
                // Larger circles move less.
                let weight_i = (radius_j * radius_j)
                    / ((radius_i * radius_i) + (radius_j * radius_j)).max(f32::EPSILON);

                ctx.nodes[i].velocity += push * weight_i;
                ctx.nodes[j].velocity -= push * (1.0 - weight_i);
            }
        }
    }
}
