use eframe::egui::{self, Ui};
use genealogy_graph::layout::forces::RestLength;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search by name")
            .on_hover_text("Fuzzy-highlight matching people without changing the layout.");
        ui.text_edit_singleline(&mut self.search);

        ui.separator();
        ui.label("View");
        let duration = self.viewport.config().transition_duration();
        ui.horizontal_wrapped(|ui| {
            if ui
                .button("Center on base")
                .on_hover_text("Move the base person to the middle of the view.")
                .clicked()
            {
                self.viewport.center_on_base(&self.simulation, duration);
            }
            if ui.button("Reset zoom").clicked() {
                self.viewport.zoom_to(1.0, duration);
            }
            if ui.button("Fit graph").clicked()
                && let Some(bounds) = self.simulation.bounds()
            {
                self.viewport.fit_bounds(bounds, duration);
            }
        });
        ui.label(format!("scale: {:.2}", self.viewport.transform().k));
        ui.checkbox(&mut self.show_quadtree_overlay, "Show quadtree overlay")
            .on_hover_text("Draw the cells used to approximate repulsion.");

        ui.separator();
        ui.label("Layout");
        ui.checkbox(&mut self.live_physics, "Live simulation");
        if ui
            .button("Reheat")
            .on_hover_text("Give the layout a burst of energy so it can untangle again.")
            .clicked()
        {
            self.nudge_layout();
        }

        let mut changed = false;
        changed |= ui
            .add(
                egui::Slider::new(&mut self.config.charge.strength, -600.0..=-5.0)
                    .text("repulsion"),
            )
            .changed();
        changed |= ui
            .add(
                egui::Slider::new(&mut self.config.velocity_decay, 0.1..=0.95)
                    .text("velocity retention"),
            )
            .changed();
        changed |= ui
            .add(
                egui::Slider::new(&mut self.config.collision.radius_multiplier, 1.0..=3.0)
                    .text("collision spacing"),
            )
            .changed();
        changed |= ui
            .add(
                egui::Slider::new(&mut self.config.axis_x_strength, 0.0..=0.2)
                    .text("horizontal pull"),
            )
            .changed();
        changed |= ui
            .add(
                egui::Slider::new(&mut self.config.axis_y_strength, 0.0..=0.2)
                    .text("vertical pull"),
            )
            .changed();

        ui.add_space(4.0);
        ui.label("Link length");
        changed |= self.draw_rest_length_controls(ui);

        if changed {
            self.simulation.reconfigure(&self.config);
            self.nudge_layout();
        }

        ui.separator();
        if ui.button("Clear selection").clicked() {
            self.set_selected(None);
            self.search.clear();
        }
    }

    fn draw_rest_length_controls(&mut self, ui: &mut Ui) -> bool {
        let mut changed = false;
        let degree_weighted = matches!(
            self.config.link.rest_length,
            RestLength::DegreeWeighted { .. }
        );

        ui.horizontal(|ui| {
            if ui.selectable_label(degree_weighted, "By degree").clicked() && !degree_weighted {
                self.config.link.rest_length = RestLength::default();
                changed = true;
            }
            if ui.selectable_label(!degree_weighted, "Fixed").clicked() && degree_weighted {
                self.config.link.rest_length = RestLength::Fixed { distance: 60.0 };
                changed = true;
            }
        });

        match &mut self.config.link.rest_length {
            RestLength::Fixed { distance } => {
                changed |= ui
                    .add(egui::Slider::new(distance, 10.0..=300.0).text("distance"))
                    .changed();
            }
            RestLength::DegreeWeighted {
                base,
                per_edge,
                base_multiplier,
            } => {
                changed |= ui
                    .add(egui::Slider::new(base, 5.0..=200.0).text("base length"))
                    .changed();
                changed |= ui
                    .add(egui::Slider::new(per_edge, 0.0..=30.0).text("per link"))
                    .changed();
                changed |= ui
                    .add(egui::Slider::new(base_multiplier, 1.0..=4.0).text("base person factor"))
                    .on_hover_text("Extra length for links touching the base person.")
                    .changed();
            }
        }

        changed
    }

    /// Raises alpha without leaving the layout hot.
    pub(in crate::app) fn nudge_layout(&mut self) {
        self.simulation.reheat(self.config.reheat_alpha_target);
        if !self.drag.is_dragging() {
            self.simulation.cool();
        }
    }
}
