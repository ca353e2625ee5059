use std::sync::Arc;

use eframe::egui::{self, Align, Context, Layout, Pos2, Rect};
use genealogy_graph::GraphIntegrityError;
use genealogy_graph::config::LayoutConfig;
use genealogy_graph::genealogy::{Graph, NodeId, Notables, Preset};
use genealogy_graph::layout::Simulation;
use genealogy_graph::view::{DragController, Lineage, RenderStyle, ViewportController};
use genealogy_graph::util::short_name;

use super::super::{GraphSource, ShellRequest, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(
        graph: Graph,
        notables: Arc<Notables>,
        source: GraphSource,
        layout: &LayoutConfig,
    ) -> Result<Self, GraphIntegrityError> {
        let simulation = Simulation::new(&graph, &notables, &layout.simulation)?;
        let viewport = ViewportController::new(
            layout.viewport.clone(),
            Rect::from_min_max(Pos2::ZERO, Pos2::new(1440.0, 920.0)),
        );

        Ok(Self {
            drag: DragController::new(layout.simulation.reheat_alpha_target),
            config: layout.simulation.clone(),
            graph,
            notables,
            source,
            simulation,
            viewport,
            style: RenderStyle::default(),
            live_physics: true,
            show_quadtree_overlay: false,
            show_about: false,
            search: String::new(),
            search_match_cache: None,
            selected: None,
            hovered: None,
            lineage: None,
            quadtree_cells: Vec::new(),
            pointer_inside: false,
            wheel_active: false,
            placed: false,
        })
    }

    /// Stops the layout and viewport so nothing tied to this graph runs again.
    pub(in crate::app) fn dispose(&mut self) {
        self.drag.reset();
        self.simulation.dispose();
        self.viewport.dispose();
        self.lineage = None;
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context, is_loading: bool) -> Option<ShellRequest> {
        let mut request = None;

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Genealogy graph");
                    ui.separator();

                    let mut preset = match &self.source {
                        GraphSource::Preset(preset) => Some(*preset),
                        GraphSource::File(_) => None,
                    };
                    let selected_text = self.source_label();
                    egui::ComboBox::from_id_salt("preset_selector")
                        .selected_text(selected_text)
                        .show_ui(ui, |ui| {
                            for option in Preset::ALL {
                                ui.selectable_value(&mut preset, Some(option), option.label());
                            }
                        });
                    if let Some(preset) = preset
                        && self.source != GraphSource::Preset(preset)
                    {
                        request = Some(ShellRequest::Load(GraphSource::Preset(preset)));
                    }

                    if let Some(base) = self.graph.base_node() {
                        ui.label(format!("base: {}", short_name(&base.name, 32)));
                    }
                    ui.label(format!("nodes: {}", self.graph.nodes.len()));
                    ui.label(format!("edges: {}", self.graph.edges.len()));

                    let reload_button = ui.add_enabled(!is_loading, egui::Button::new("Reload"));
                    if reload_button.clicked() {
                        request = Some(ShellRequest::Reload);
                    }
                    if is_loading {
                        ui.spinner();
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if ui.button("About").clicked() {
                            self.show_about = !self.show_about;
                        }
                        ui.label(self.layout_status_text());
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));

        self.draw_about(ctx);

        request
    }

    fn source_label(&self) -> String {
        match &self.source {
            GraphSource::Preset(preset) => preset.label().to_owned(),
            GraphSource::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "custom graph".to_owned()),
        }
    }

    fn layout_status_text(&self) -> String {
        let state = if self.simulation.is_settled() {
            "settled"
        } else {
            "running"
        };
        format!(
            "layout {state}  |  alpha {:.3}  |  tick {}",
            self.simulation.alpha(),
            self.simulation.tick_count()
        )
    }

    fn draw_about(&mut self, ctx: &Context) {
        let mut open = self.show_about;
        egui::Window::new("About")
            .open(&mut open)
            .resizable(false)
            .collapsible(false)
            .show(ctx, |ui| {
                ui.label(
                    "Each circle is a mathematician and each line runs from an advisor to a \
                     student. The highlighted circle is the person the graph was built around.",
                );
                ui.add_space(4.0);
                ui.label(
                    "Positions come from a force simulation: linked people pull together, \
                     everyone pushes everyone else away, and circles never overlap.",
                );
                ui.add_space(4.0);
                ui.label("Scroll to zoom, drag the background to pan, drag a person to move them.");
                ui.label("Click a person to see their dissertations and lineage.");
                ui.add_space(4.0);
                ui.small(
                    "Presets are read from <presets-dir>/<preset>.json; open any other \
                     graph with --graph <FILE>.",
                );
            });
        self.show_about = open;
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<NodeId>) {
        if self.selected == selected {
            return;
        }

        self.selected = selected;
        self.lineage = selected.and_then(|id| {
            let index = self.simulation.index_of(id)?;
            Lineage::build(
                self.simulation.nodes().len(),
                self.simulation.edges(),
                self.simulation.base_index(),
                index,
            )
        });
    }

    /// Selects `id` and animates the viewport onto it.
    pub(in crate::app) fn focus_node(&mut self, id: NodeId) {
        self.set_selected(Some(id));
        if let Some(position) = self.simulation.position(id) {
            let duration = self.viewport.config().transition_duration();
            self.viewport.center_on(position, duration);
        }
    }
}
