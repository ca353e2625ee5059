use eframe::egui::{self, RichText, Ui};
use genealogy_graph::genealogy::{GenealogyNodeDissertation, NodeId};
use genealogy_graph::util::short_name;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.selected else {
            ui.label("Select a person in the graph.");
            return;
        };

        let Some(person) = self.graph.node(selected_id) else {
            ui.label("Selected person is not part of this graph.");
            return;
        };

        let name = person.name.clone();
        let descendants = person.numberofdescendents;
        let dissertations = person.dissertations.clone().unwrap_or_default();
        let students = person
            .students
            .iter()
            .flatten()
            .map(|student| (student.id, student.name.clone()))
            .collect::<Vec<_>>();
        let notable = self.notables.get(selected_id).cloned();
        let mut focus = None;

        ui.label(RichText::new(name.as_str()).strong());
        ui.small(format!("id {selected_id}"));
        if selected_id == self.graph.base {
            ui.small("base of this graph");
        }
        ui.label(format!("Descendants: {descendants}"));

        if let Some(notable) = &notable {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                if notable.fields {
                    ui.label(RichText::new("Fields Medal").color(self.style.notable_color));
                }
                if notable.abel {
                    ui.label(RichText::new("Abel Prize").color(self.style.notable_color));
                }
            });
            if !notable.note.is_empty() {
                ui.label(notable.note.as_str());
            }
        }

        ui.separator();
        ui.label(RichText::new("Dissertations").strong());
        if dissertations.is_empty() {
            ui.label("No dissertation on record.");
        }
        for dissertation in &dissertations {
            focus = focus.or(self.draw_dissertation(ui, dissertation));
        }

        ui.separator();
        ui.label(RichText::new(format!("Students ({})", students.len())).strong());
        egui::ScrollArea::vertical()
            .id_salt("students_scroll")
            .max_height(220.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for (id, name) in &students {
                    focus = focus.or(self.person_link(ui, *id, name));
                }
            });

        ui.separator();
        ui.label(RichText::new("Lineage from base").strong());
        match self.lineage_names() {
            Some(names) if !names.is_empty() => {
                ui.horizontal_wrapped(|ui| {
                    for (position, (id, name)) in names.iter().enumerate() {
                        if position > 0 {
                            ui.label("→");
                        }
                        focus = focus.or(self.person_link(ui, *id, name));
                    }
                });
            }
            _ => {
                ui.label("Not connected to the base person.");
            }
        }

        if let Some(id) = focus {
            self.focus_node(id);
        }
    }

    fn draw_dissertation(
        &self,
        ui: &mut Ui,
        dissertation: &GenealogyNodeDissertation,
    ) -> Option<NodeId> {
        let mut focus = None;
        let degree = dissertation.phdprefix.as_deref().unwrap_or("Ph.D.");
        let place = [
            dissertation.university.as_deref(),
            dissertation.yearofcompletion.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");

        ui.group(|ui| {
            if place.is_empty() {
                ui.label(degree);
            } else {
                ui.label(format!("{degree} {place}"));
            }
            if let Some(title) = dissertation.dissertationtitle.as_deref() {
                ui.label(RichText::new(title).italics());
            }
            if let Some(msc) = dissertation.mscnumber.as_deref() {
                ui.small(format!("MSC {msc}"));
            }
            for advisor in dissertation.advisors.iter().flatten() {
                ui.horizontal(|ui| {
                    ui.label(format!("Advisor {}:", advisor.advisor_number));
                    focus = focus.or(self.person_link(ui, advisor.advisor_id, &advisor.advisor_name));
                });
            }
        });

        focus
    }

    /// Clickable name when the person is in the graph, plain text otherwise.
    fn person_link(&self, ui: &mut Ui, id: NodeId, name: &str) -> Option<NodeId> {
        let text = short_name(name, 40);
        if self.simulation.index_of(id).is_none() {
            ui.label(text);
            return None;
        }
        ui.link(text)
            .on_hover_text(name)
            .clicked()
            .then_some(id)
    }

    fn lineage_names(&self) -> Option<Vec<(NodeId, String)>> {
        let lineage = self.lineage.as_ref()?;
        let nodes = self.simulation.nodes();
        Some(
            lineage
                .path
                .iter()
                .filter_map(|&index| nodes.get(index))
                .map(|node| (node.id, node.label.clone()))
                .collect(),
        )
    }
}
