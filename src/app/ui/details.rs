use eframe::egui::{self, RichText, Ui};

use crate::graph::NodeId;
use crate::util::source_excerpt;

use super::super::ViewModel;
use super::super::highlight::path_from_main;

const EXCERPT_CHARS: usize = 240;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected) = self.selected else {
            ui.label("Click a node in the graph to inspect it.");
            return;
        };

        let Some(node) = self.store.node(selected) else {
            ui.label("Selected node no longer exists in the graph.");
            return;
        };

        ui.label(RichText::new(&node.name).strong());
        ui.small(node.kind.label());
        ui.add_space(6.0);

        if let Some(detail) = &node.detail {
            ui.label(format!("Type: {detail}"));
        }
        if let Some(value) = &node.value {
            ui.label(format!("Value: {value}"));
        }
        ui.label(format!(
            "Position: ({:.2}, {:.2}, {:.2})",
            node.position.x, node.position.y, node.position.z
        ));

        if let Some(excerpt) = node
            .span
            .and_then(|span| source_excerpt(&self.source, span, EXCERPT_CHARS))
        {
            ui.separator();
            ui.label(RichText::new("Source").strong());
            ui.label(RichText::new(excerpt).monospace());
        }

        let mut connections = self
            .store
            .neighbors(selected)
            .filter_map(|id| {
                let neighbor = self.store.node(id)?;
                let arrow = if self.store.has_edge(selected, id) { "->" } else { "<-" };
                Some((id, format!("{arrow} {}", neighbor.name), neighbor.kind))
            })
            .collect::<Vec<_>>();
        connections.sort_by_key(|(id, _, _)| *id);
        connections.dedup_by_key(|(id, _, _)| *id);
        connections.sort_by(|a, b| a.1.cmp(&b.1));

        ui.separator();
        ui.label(RichText::new(format!("Connections ({})", connections.len())).strong());
        let mut clicked: Option<NodeId> = None;
        egui::ScrollArea::vertical()
            .id_salt("connections_scroll")
            .max_height(260.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for (id, name, kind) in &connections {
                    if ui.link(format!("{name}  [{}]", kind.label())).clicked() {
                        clicked = Some(*id);
                    }
                }
            });

        ui.separator();
        ui.label(RichText::new("Path from main").strong());
        match path_from_main(&self.store, selected) {
            Some((path, _)) => {
                let rendered = path
                    .iter()
                    .filter_map(|id| self.store.node(*id).map(|node| node.name.as_str()))
                    .collect::<Vec<_>>()
                    .join(" -> ");
                ui.label(rendered);
            }
            None => {
                ui.label("Not reachable from the main node.");
            }
        }

        if clicked.is_some() {
            self.set_selected(clicked);
        }
    }
}
