use eframe::egui::{self, Align, Context, Layout};

use crate::util::plural;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(&mut self, ctx: &Context, analyze_requested: &mut bool) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("codegraph3d");
                    ui.separator();
                    match &self.analysis {
                        Some(analysis) => {
                            let summary = analysis.summary;
                            ui.label(plural(summary.functions, "function"));
                            ui.label(plural(summary.variables, "variable"));
                            ui.label(plural(summary.imports, "import"));
                        }
                        None => {
                            ui.label("no graph");
                        }
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!(
                            "nodes: {}  edges: {}",
                            self.store.node_count(),
                            self.store.edge_count()
                        ));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(380.0)
            .show(ctx, |ui| self.draw_controls(ui, analyze_requested));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }
}
