use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use eframe::egui::{
    self, Align2, Color32, CursorIcon, FontId, Painter, Sense, Stroke, Ui, vec2,
};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use genealogy_graph::genealogy::NodeId;
use genealogy_graph::util::short_name;
use genealogy_graph::view::{Highlight, build_draw_list};

use super::super::render_utils::{
    circle_visible, cursor_icon, draw_background, edge_visible, node_outline,
};
use super::super::{SearchMatchCache, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

impl ViewModel {
    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<NodeId>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .simulation
            .nodes()
            .iter()
            .filter(|node| fuzzy_match_score(&matcher, &node.label, query).is_some())
            .map(|node| node.id)
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    fn draw_quadtree_overlay(&mut self, painter: &Painter) {
        self.simulation.quadtree_cells(&mut self.quadtree_cells);
        for cell in &self.quadtree_cells {
            let half = vec2(cell.half_extent, cell.half_extent);
            let top_left = self.viewport.to_screen(cell.center - half);
            let bottom_right = self.viewport.to_screen(cell.center + half);
            let top_right = egui::pos2(bottom_right.x, top_left.y);
            let bottom_left = egui::pos2(top_left.x, bottom_right.y);

            let alpha = if cell.is_leaf { 110 } else { 55 };
            let width = (1.4 - cell.depth as f32 * 0.09).clamp(0.45, 1.4);
            let stroke = Stroke::new(width, Color32::from_rgba_unmultiplied(106, 198, 255, alpha));

            painter.line_segment([top_left, top_right], stroke);
            painter.line_segment([top_right, bottom_right], stroke);
            painter.line_segment([bottom_right, bottom_left], stroke);
            painter.line_segment([bottom_left, top_left], stroke);
        }
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.viewport.set_rect(rect);
        self.viewport.set_extent(Some(rect));
        if !self.placed {
            self.placed = true;
            self.viewport.center_on_base(&self.simulation, Duration::ZERO);
        }

        let frame_delta_seconds = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        let mut animating = self
            .viewport
            .advance(Duration::from_secs_f32(frame_delta_seconds));

        self.handle_graph_input(ui, rect, &response);

        if (self.live_physics || self.drag.is_dragging()) && self.simulation.step() {
            animating = true;
        }

        draw_background(&painter, rect, self.viewport.transform());
        if self.show_quadtree_overlay {
            self.draw_quadtree_overlay(&painter);
        }

        let highlight = Highlight {
            selected: self.selected,
            hovered: self.hovered,
            lineage: self.lineage.clone(),
            matches: self
                .cached_search_matches()
                .map(|matches| matches.as_ref().clone())
                .unwrap_or_default(),
        };
        let list = build_draw_list(
            self.simulation.nodes(),
            self.simulation.edges(),
            &self.viewport,
            &self.style,
            &highlight,
        );

        for edge in &list.edges {
            if edge_visible(rect, edge.from, edge.to, 2.5) {
                painter.line_segment([edge.from, edge.to], Stroke::new(edge.width, edge.color));
            }
        }

        for node in &list.nodes {
            if circle_visible(rect, node.center, node.radius) {
                painter.circle(node.center, node.radius, node.fill, node_outline(node.emphasis));
            }
        }

        for label in &list.labels {
            if rect.contains(label.anchor) {
                painter.text(
                    label.anchor,
                    Align2::LEFT_CENTER,
                    label.text.as_str(),
                    FontId::proportional(12.0),
                    Color32::from_gray(238),
                );
            }
        }

        if let Some(hovered) = self.hovered
            && let Some(person) = self.graph.node(hovered)
        {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!(
                    "{}  |  descendants {}",
                    short_name(&person.name, 48),
                    person.numberofdescendents
                ),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if self.pointer_inside {
            let icon = if self.drag.is_dragging() {
                CursorIcon::Grabbing
            } else if self.hovered.is_some() {
                CursorIcon::PointingHand
            } else {
                cursor_icon(self.viewport.cursor())
            };
            ui.output_mut(|output| output.cursor_icon = icon);
        }

        if animating || self.drag.is_dragging() || response.dragged() {
            ui.ctx().request_repaint();
        }
    }
}
