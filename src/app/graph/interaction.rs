use eframe::egui::{self, Pos2, Rect, Ui};

use crate::graph::NodeId;

use super::super::{NodeDrag, ViewModel};

impl ViewModel {
    pub(in crate::app) fn handle_camera_zoom(&mut self, ui: &Ui, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        self.camera.zoom(scroll);
    }

    /// Primary drag on a node moves it in the camera plane; any other drag
    /// orbits the camera. A click selects the node under the pointer or
    /// clears the selection.
    pub(in crate::app) fn handle_pointer(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if response.drag_started_by(egui::PointerButton::Primary) {
            self.drag = ui
                .input(|input| input.pointer.press_origin())
                .and_then(|origin| self.pick_node(origin))
                .and_then(|node| {
                    let projected = self.view_scratch.projected.get(node.0).copied().flatten();
                    projected.map(|projected| NodeDrag {
                        node,
                        depth: projected.depth,
                    })
                });
        }

        if response.dragged_by(egui::PointerButton::Primary) {
            match self.drag {
                Some(drag) => {
                    let delta = self
                        .camera
                        .screen_delta_to_world(rect, response.drag_delta(), drag.depth);
                    self.store.translate_node(drag.node, delta);
                }
                None => self.camera.orbit(response.drag_delta()),
            }
        }

        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.camera.orbit(response.drag_delta());
        }

        if response.drag_stopped() {
            self.drag = None;
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            let picked = response
                .interact_pointer_pos()
                .and_then(|pointer| self.pick_node(pointer));
            self.set_selected(picked);
        }
    }

    /// Nearest-to-camera node whose disc contains `pointer`.
    pub(in crate::app) fn pick_node(&self, pointer: Pos2) -> Option<NodeId> {
        self.view_scratch
            .projected
            .iter()
            .enumerate()
            .filter_map(|(index, projected)| {
                let projected = (*projected)?;
                (projected.screen.distance(pointer) <= projected.radius)
                    .then_some((index, projected.depth))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| NodeId(index))
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<NodeId>) {
        if self.selected == selected {
            return;
        }
        self.selected = selected;
        if let Some(node) = selected.and_then(|id| self.store.node(id)) {
            tracing::debug!(node = %node.name, kind = node.kind.label(), "selected node");
        }
    }
}
