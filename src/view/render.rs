//! Frame-time projection of the layout onto the screen. Everything here only
//! reads simulation state.

use std::collections::HashSet;

use eframe::egui::{Color32, Pos2, vec2};

use crate::genealogy::NodeId;
use crate::layout::{NodeCategory, SimEdge, SimNode};
use crate::util::short_name;

use super::lineage::Lineage;
use super::viewport::ViewportController;

#[derive(Clone, Debug)]
pub struct RenderStyle {
    pub base_color: Color32,
    pub notable_color: Color32,
    pub ordinary_color: Color32,
    pub edge_color: Color32,
    pub edge_width: f32,
    pub path_color: Color32,
    pub direct_color: Color32,
    pub match_color: Color32,
    pub selected_color: Color32,
    /// Smallest on-screen node radius, so far zoomed-out nodes stay visible.
    pub min_screen_radius: f32,
    /// Ordinary labels appear once the scale reaches this value.
    pub label_scale: f32,
    pub label_chars: usize,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            base_color: Color32::from_rgb(246, 206, 104),
            notable_color: Color32::from_rgb(214, 120, 228),
            ordinary_color: Color32::from_rgb(88, 156, 214),
            edge_color: Color32::from_rgba_unmultiplied(150, 156, 168, 150),
            edge_width: 1.2,
            path_color: Color32::from_rgb(246, 206, 104),
            direct_color: Color32::from_rgb(241, 146, 94),
            match_color: Color32::from_rgb(103, 196, 255),
            selected_color: Color32::from_rgb(255, 164, 101),
            min_screen_radius: 2.0,
            label_scale: 1.2,
            label_chars: 28,
        }
    }
}

impl RenderStyle {
    pub fn category_color(&self, category: NodeCategory) -> Color32 {
        match category {
            NodeCategory::Base => self.base_color,
            NodeCategory::Notable => self.notable_color,
            NodeCategory::Ordinary => self.ordinary_color,
        }
    }
}

/// Per-frame emphasis state owned by the caller.
#[derive(Clone, Debug, Default)]
pub struct Highlight {
    pub selected: Option<NodeId>,
    pub hovered: Option<NodeId>,
    pub lineage: Option<Lineage>,
    pub matches: HashSet<NodeId>,
}

impl Highlight {
    fn is_active(&self) -> bool {
        self.lineage.is_some() || !self.matches.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
    Normal,
    Dimmed,
    Match,
    Direct,
    Path,
    Selected,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeDraw {
    pub id: NodeId,
    pub center: Pos2,
    pub radius: f32,
    pub fill: Color32,
    pub emphasis: Emphasis,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeDraw {
    pub source_id: NodeId,
    pub target_id: NodeId,
    pub from: Pos2,
    pub to: Pos2,
    pub color: Color32,
    pub width: f32,
    pub emphasis: Emphasis,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LabelDraw {
    pub id: NodeId,
    pub text: String,
    pub anchor: Pos2,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    pub nodes: Vec<NodeDraw>,
    pub edges: Vec<EdgeDraw>,
    pub labels: Vec<LabelDraw>,
}

pub fn screen_radius(node: &SimNode, scale: f32, style: &RenderStyle) -> f32 {
    (node.radius * scale).max(style.min_screen_radius)
}

fn node_emphasis(index: usize, node: &SimNode, highlight: &Highlight) -> Emphasis {
    if highlight.selected == Some(node.id) {
        return Emphasis::Selected;
    }
    if let Some(lineage) = &highlight.lineage {
        if lineage.path_nodes.contains(&index) {
            return Emphasis::Path;
        }
        if lineage.direct_nodes.contains(&index) {
            return Emphasis::Direct;
        }
    }
    if highlight.matches.contains(&node.id) {
        return Emphasis::Match;
    }
    if highlight.is_active() {
        Emphasis::Dimmed
    } else {
        Emphasis::Normal
    }
}

fn dimmed(color: Color32) -> Color32 {
    color.gamma_multiply(0.35)
}

/// Projects nodes, edges and labels into screen space. One edge entry per
/// simulation edge, parallel edges included; nodes keep array order.
pub fn build_draw_list(
    nodes: &[SimNode],
    edges: &[SimEdge],
    viewport: &ViewportController,
    style: &RenderStyle,
    highlight: &Highlight,
) -> DrawList {
    let scale = viewport.transform().k;
    let width_scale = scale.sqrt().clamp(0.5, 2.5);
    let mut list = DrawList {
        nodes: Vec::with_capacity(nodes.len()),
        edges: Vec::with_capacity(edges.len()),
        labels: Vec::new(),
    };

    for (index, edge) in edges.iter().enumerate() {
        let (Some(source), Some(target)) = (nodes.get(edge.source), nodes.get(edge.target)) else {
            continue;
        };

        let emphasis = match &highlight.lineage {
            Some(lineage) if lineage.edge_on_path(edge) => Emphasis::Path,
            Some(lineage) if lineage.direct_edges.contains(&index) => Emphasis::Direct,
            Some(_) => Emphasis::Dimmed,
            None if highlight.is_active() => Emphasis::Dimmed,
            None => Emphasis::Normal,
        };
        let (color, width) = match emphasis {
            Emphasis::Path => (style.path_color, style.edge_width * 2.6),
            Emphasis::Direct => (style.direct_color, style.edge_width * 2.0),
            Emphasis::Dimmed => (dimmed(style.edge_color), style.edge_width * 0.8),
            _ => (style.edge_color, style.edge_width),
        };

        list.edges.push(EdgeDraw {
            source_id: source.id,
            target_id: target.id,
            from: viewport.to_screen(source.position),
            to: viewport.to_screen(target.position),
            color,
            width: width * width_scale,
            emphasis,
        });
    }

    for (index, node) in nodes.iter().enumerate() {
        let center = viewport.to_screen(node.position);
        let radius = screen_radius(node, scale, style);
        let emphasis = node_emphasis(index, node, highlight);
        let base = style.category_color(node.category);
        let fill = match emphasis {
            Emphasis::Selected => style.selected_color,
            Emphasis::Match => style.match_color,
            Emphasis::Dimmed => dimmed(base),
            _ => base,
        };

        list.nodes.push(NodeDraw {
            id: node.id,
            center,
            radius,
            fill,
            emphasis,
        });

        let labelled = node.category != NodeCategory::Ordinary
            || highlight.hovered == Some(node.id)
            || !matches!(emphasis, Emphasis::Normal | Emphasis::Dimmed)
            || scale >= style.label_scale;
        if labelled {
            list.labels.push(LabelDraw {
                id: node.id,
                text: short_name(&node.label, style.label_chars),
                anchor: center + vec2(radius + 4.0, 0.0),
            });
        }
    }

    list
}

/// Topmost node whose on-screen circle contains `pointer`.
pub fn pick_node(
    nodes: &[SimNode],
    viewport: &ViewportController,
    style: &RenderStyle,
    pointer: Pos2,
) -> Option<NodeId> {
    let scale = viewport.transform().k;
    nodes
        .iter()
        .rev()
        .filter_map(|node| {
            let distance = viewport.to_screen(node.position).distance(pointer);
            (distance <= screen_radius(node, scale, style)).then_some((node.id, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use eframe::egui::Rect;

    use super::*;
    use crate::view::viewport::{ViewportConfig, ViewportTransform};

    fn node(id: NodeId, x: f32, y: f32, category: NodeCategory) -> SimNode {
        let mut node = SimNode::new(id, format!("Person {id}"), category, 5.0);
        node.position = vec2(x, y);
        node
    }

    fn edge(source: usize, target: usize, nodes: &[SimNode]) -> SimEdge {
        SimEdge {
            source,
            target,
            source_id: nodes[source].id,
            target_id: nodes[target].id,
        }
    }

    fn viewport(k: f32) -> ViewportController {
        let mut viewport = ViewportController::new(
            ViewportConfig::default(),
            Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(400.0, 400.0)),
        );
        viewport.set_transform(ViewportTransform { x: 0.0, y: 0.0, k });
        viewport
    }

    fn sample() -> (Vec<SimNode>, Vec<SimEdge>) {
        let nodes = vec![
            node(10, 0.0, 0.0, NodeCategory::Base),
            node(20, 50.0, 0.0, NodeCategory::Ordinary),
            node(30, 0.0, 50.0, NodeCategory::Notable),
        ];
        let edges = vec![edge(0, 1, &nodes), edge(0, 1, &nodes), edge(1, 2, &nodes)];
        (nodes, edges)
    }

    #[test]
    fn every_edge_is_emitted_with_screen_positions() {
        let (nodes, edges) = sample();
        let list = build_draw_list(
            &nodes,
            &edges,
            &viewport(2.0),
            &RenderStyle::default(),
            &Highlight::default(),
        );

        assert_eq!(list.edges.len(), 3);
        assert_eq!(list.edges[0].from, Pos2::new(200.0, 200.0));
        assert_eq!(list.edges[0].to, Pos2::new(300.0, 200.0));
        assert_eq!(list.edges[0], list.edges[1]);
        assert_eq!(list.nodes.len(), 3);
        assert_eq!(list.nodes[1].radius, 10.0);
    }

    #[test]
    fn category_decides_color() {
        let (nodes, edges) = sample();
        let style = RenderStyle::default();
        let list = build_draw_list(&nodes, &edges, &viewport(1.0), &style, &Highlight::default());
        assert_eq!(list.nodes[0].fill, style.base_color);
        assert_eq!(list.nodes[1].fill, style.ordinary_color);
        assert_eq!(list.nodes[2].fill, style.notable_color);
    }

    #[test]
    fn labels_follow_zoom_and_category() {
        let (nodes, edges) = sample();
        let style = RenderStyle::default();
        let far = build_draw_list(&nodes, &edges, &viewport(0.5), &style, &Highlight::default());
        let ids = far.labels.iter().map(|label| label.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![10, 30]);

        let near = build_draw_list(&nodes, &edges, &viewport(2.0), &style, &Highlight::default());
        assert_eq!(near.labels.len(), 3);
    }

    #[test]
    fn lineage_emphasis_reaches_edges_and_nodes() {
        let (nodes, edges) = sample();
        let highlight = Highlight {
            selected: Some(30),
            lineage: Lineage::build(nodes.len(), &edges, Some(0), 2),
            ..Highlight::default()
        };
        let list = build_draw_list(
            &nodes,
            &edges,
            &viewport(1.0),
            &RenderStyle::default(),
            &highlight,
        );

        assert!(list.edges.iter().all(|e| e.emphasis == Emphasis::Path));
        assert_eq!(list.nodes[2].emphasis, Emphasis::Selected);
        assert_eq!(list.nodes[0].emphasis, Emphasis::Path);
    }

    #[test]
    fn search_matches_dim_the_rest() {
        let (nodes, edges) = sample();
        let highlight = Highlight {
            matches: HashSet::from([20]),
            ..Highlight::default()
        };
        let list = build_draw_list(
            &nodes,
            &edges,
            &viewport(1.0),
            &RenderStyle::default(),
            &highlight,
        );
        assert_eq!(list.nodes[1].emphasis, Emphasis::Match);
        assert_eq!(list.nodes[0].emphasis, Emphasis::Dimmed);
    }

    #[test]
    fn building_does_not_touch_nodes() {
        let (nodes, edges) = sample();
        let snapshot = nodes.clone();
        let _ = build_draw_list(
            &nodes,
            &edges,
            &viewport(3.0),
            &RenderStyle::default(),
            &Highlight::default(),
        );
        for (a, b) in nodes.iter().zip(&snapshot) {
            assert_eq!(a.position, b.position);
            assert_eq!(a.velocity, b.velocity);
        }
    }

    #[test]
    fn pick_prefers_nearest_center() {
        let (nodes, _) = sample();
        let viewport = viewport(1.0);
        let style = RenderStyle::default();
        assert_eq!(pick_node(&nodes, &viewport, &style, Pos2::new(251.0, 201.0)), Some(20));
        assert_eq!(pick_node(&nodes, &viewport, &style, Pos2::new(320.0, 320.0)), None);
    }
}
