use eframe::egui::{self, Color32, RichText, TextEdit, Ui};

use crate::graph::NodeKind;
use crate::layout::relax_initial;

use super::super::ViewModel;
use super::super::camera::OrbitCamera;
use super::super::render_utils::kind_color;

const REPULSION_RANGE: std::ops::RangeInclusive<f32> = 0.5..=10.0;
const NODE_SIZE_RANGE: std::ops::RangeInclusive<f32> = 0.2..=3.0;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui, analyze_requested: &mut bool) {
        ui.heading("Source");
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("source_editor_scroll")
            .max_height(ui.available_height() * 0.5)
            .show(ui, |ui| {
                ui.add(
                    TextEdit::multiline(&mut self.source)
                        .code_editor()
                        .desired_rows(18)
                        .desired_width(f32::INFINITY),
                );
            });

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            if ui
                .button("Analyze")
                .on_hover_text("Rebuild the graph from the source above.")
                .clicked()
            {
                *analyze_requested = true;
            }
            if ui
                .add_enabled(!self.store.is_empty(), egui::Button::new("Re-run layout"))
                .on_hover_text("Settle the current graph again with the initial relaxation pass.")
                .clicked()
            {
                let report = relax_initial(&mut self.store, &self.layout);
                tracing::debug!(?report, "layout re-run");
            }
        });

        if let Some(error) = &self.last_error {
            ui.add_space(4.0);
            ui.label(RichText::new(error).color(Color32::from_rgb(235, 110, 100)));
        }

        if let Some(analysis) = &self.analysis {
            ui.add_space(4.0);
            egui::Grid::new("summary_grid").num_columns(2).show(ui, |ui| {
                let summary = analysis.summary;
                for (label, value) in [
                    ("Functions", summary.functions),
                    ("Variables", summary.variables),
                    ("Imports", summary.imports),
                    ("Nodes", summary.nodes),
                    ("Edges", summary.edges),
                ] {
                    ui.label(label);
                    ui.label(value.to_string());
                    ui.end_row();
                }
            });
            if !analysis.relaxation.converged {
                ui.small(format!(
                    "Initial layout stopped after {} sweeps.",
                    analysis.relaxation.iterations
                ));
            }
        }

        ui.separator();
        ui.heading("Layout");

        ui.add(
            egui::Slider::new(&mut self.layout.repulsion_radius, REPULSION_RANGE)
                .text("Repulsion radius")
                .clamping(egui::SliderClamping::Always),
        )
        .on_hover_text("Nodes closer than this push each other apart.");

        ui.add(
            egui::Slider::new(&mut self.node_size, NODE_SIZE_RANGE)
                .text("Node size")
                .clamping(egui::SliderClamping::Always),
        )
        .on_hover_text("Display size of every node.");

        ui.checkbox(&mut self.live_layout, "Live relaxation")
            .on_hover_text("Keep separating nodes every frame.");

        if ui.button("Reset camera").clicked() {
            self.camera = OrbitCamera::default();
        }

        ui.collapsing("Legend", |ui| {
            for kind in NodeKind::ALL {
                ui.horizontal(|ui| {
                    let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                    ui.painter().circle_filled(rect.center(), 6.0, kind_color(kind));
                    ui.label(kind.label());
                });
            }
        });

        ui.separator();
        ui.label("Search nodes")
            .on_hover_text("Fuzzy-highlight nodes by name.");
        ui.text_edit_singleline(&mut self.search);
        if let Some(matches) = self.search_matches() {
            ui.small(format!("{} matching", matches.len()));
        }
    }
}
