use eframe::egui::{PointerButton, Rect, Response, Ui};
use genealogy_graph::view::{Gesture, PointerId, pick_node};

use super::super::ViewModel;

/// egui reports one mouse pointer; touch input arrives through it as well.
const PRIMARY_POINTER: PointerId = 0;

impl ViewModel {
    /// Turns this frame's egui input into viewport gestures and node drags.
    pub(in crate::app) fn handle_graph_input(&mut self, ui: &Ui, rect: Rect, response: &Response) {
        let (hover_pos, press_origin, latest_pos, scroll) = ui.input(|input| {
            (
                input.pointer.hover_pos(),
                input.pointer.press_origin(),
                input.pointer.latest_pos(),
                input.raw_scroll_delta.y,
            )
        });

        let inside = response.hovered();
        if inside != self.pointer_inside {
            self.pointer_inside = inside;
            self.viewport
                .apply_gesture(if inside { Gesture::Enter } else { Gesture::Leave });
        }

        self.hovered = hover_pos
            .filter(|pointer| rect.contains(*pointer))
            .and_then(|pointer| {
                pick_node(self.simulation.nodes(), &self.viewport, &self.style, pointer)
            });

        if response.drag_started() {
            let origin = press_origin.or(latest_pos);
            let grabbed = if response.drag_started_by(PointerButton::Primary) {
                origin.and_then(|pointer| {
                    pick_node(self.simulation.nodes(), &self.viewport, &self.style, pointer)
                })
            } else {
                None
            };

            match (grabbed, origin) {
                (Some(id), _) => {
                    self.drag
                        .on_drag_start(PRIMARY_POINTER, id, &mut self.simulation);
                }
                (None, Some(position)) => {
                    self.viewport
                        .apply_gesture(Gesture::PointerDown { position });
                }
                (None, None) => {}
            }
        }

        if response.dragged()
            && let Some(position) = latest_pos
        {
            if self.drag.dragged_node(PRIMARY_POINTER).is_some() {
                self.drag.on_drag_move(
                    PRIMARY_POINTER,
                    position,
                    &mut self.simulation,
                    &self.viewport,
                );
            } else {
                self.viewport
                    .apply_gesture(Gesture::PointerMove { position });
            }
        }

        if response.drag_stopped() && !self.drag.on_drag_end(PRIMARY_POINTER, &mut self.simulation) {
            self.viewport.apply_gesture(Gesture::PointerUp);
        }

        if inside
            && scroll.abs() > f32::EPSILON
            && let Some(position) = hover_pos
        {
            self.viewport
                .apply_gesture(Gesture::Wheel { position, delta: scroll });
            self.wheel_active = true;
        } else if self.wheel_active {
            self.wheel_active = false;
            self.viewport.apply_gesture(Gesture::WheelEnd);
        }

        if response.clicked_by(PointerButton::Primary) {
            self.set_selected(self.hovered);
        }
    }
}
