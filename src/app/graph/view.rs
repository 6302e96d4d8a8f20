use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::graph::NodeId;

use super::super::highlight::build_highlight_state;
use super::super::render_utils::{
    blend_color, circle_visible, depth_fade, dim_color, draw_background, kind_color,
    node_world_radius,
};
use super::super::{ProjectedNode, SearchMatchCache, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    pub(in crate::app) fn project_nodes(&mut self, rect: Rect) {
        let camera = self.camera;
        let node_size = self.node_size;

        self.view_scratch.projected.clear();
        self.view_scratch
            .projected
            .extend(self.store.nodes().iter().map(|node| {
                camera.project(rect, node.position).map(|projection| ProjectedNode {
                    screen: projection.screen,
                    radius: (node_world_radius(node.kind, node_size) * projection.scale)
                        .clamp(2.0, 48.0),
                    depth: projection.depth,
                })
            }));

        // Far to near, so nearer discs paint over farther ones.
        let projected = &self.view_scratch.projected;
        self.view_scratch.draw_order.clear();
        self.view_scratch
            .draw_order
            .extend((0..projected.len()).filter(|&index| projected[index].is_some()));
        self.view_scratch.draw_order.sort_by(|a, b| {
            let depth = |index: usize| projected[index].map_or(0.0, |node| node.depth);
            depth(*b).total_cmp(&depth(*a))
        });
    }

    pub(in crate::app) fn search_matches(&mut self) -> Option<Arc<HashSet<NodeId>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.graph_revision == self.graph_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .store
            .nodes()
            .iter()
            .filter(|node| fuzzy_match_score(&matcher, &node.name, query).is_some())
            .map(|node| node.id)
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            graph_revision: self.graph_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);

        if self.store.is_empty() {
            let message = if self.last_error.is_some() {
                "Parsing failed; fix the source and analyze again."
            } else {
                "Press Analyze to build the graph."
            };
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                message,
                FontId::proportional(15.0),
                Color32::from_gray(170),
            );
            return;
        }

        self.handle_camera_zoom(ui, &response);
        self.project_nodes(rect);
        self.handle_pointer(ui, rect, &response);

        if self.live_layout {
            let dragging = self.drag.is_some();
            let moved = self
                .live_relaxation
                .tick(&mut self.store, &self.layout, Instant::now(), dragging);
            if moved.is_some_and(|displacement| displacement > 0.0) || dragging {
                ui.ctx().request_repaint();
            }
        }

        self.project_nodes(rect);

        let hovered = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer))
            .and_then(|pointer| self.pick_node(pointer));
        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let matches = self.search_matches();
        let search_active = matches.as_ref().is_some_and(|matches| !matches.is_empty());
        let highlight = build_highlight_state(
            &self.store,
            hovered.or(self.drag.map(|drag| drag.node)),
            self.selected,
        );
        let highlight_active = highlight.is_active();

        let (near, far) = self
            .view_scratch
            .projected
            .iter()
            .flatten()
            .fold((f32::MAX, f32::MIN), |(near, far), node| {
                (near.min(node.depth), far.max(node.depth))
            });

        for edge in self.store.edges() {
            let (Some(start), Some(end)) = (
                self.camera.project(rect, edge.segment[0]),
                self.camera.project(rect, edge.segment[1]),
            ) else {
                continue;
            };

            let on_path = highlight.path_edges.contains(&edge.id);
            let near_hover = highlight.neighbor_edges.contains(&edge.id);
            let fade = depth_fade((start.depth + end.depth) * 0.5, near, far);
            let (width, color) = if on_path {
                (2.6, Color32::from_rgb(246, 206, 104))
            } else if near_hover {
                (2.0, Color32::from_rgb(241, 146, 94))
            } else if highlight_active || search_active {
                (0.8, Color32::from_rgba_unmultiplied(80, 90, 104, 90))
            } else {
                (1.1, dim_color(Color32::from_rgb(150, 150, 150), fade))
            };

            painter.line_segment([start.screen, end.screen], Stroke::new(width, color));
        }

        let selected_color = Color32::from_rgb(245, 206, 93);
        for &index in &self.view_scratch.draw_order {
            let Some(projected) = self.view_scratch.projected[index] else {
                continue;
            };
            if !circle_visible(rect, projected.screen, projected.radius) {
                continue;
            }
            let Some(node) = self.store.node(NodeId(index)) else {
                continue;
            };

            let is_selected = self.selected == Some(node.id);
            let is_hovered = hovered == Some(node.id);
            let is_neighbor = highlight.neighbors.contains(&node.id);
            let on_path = highlight.path_nodes.contains(&node.id);
            let is_match = matches.as_ref().is_some_and(|matches| matches.contains(&node.id));

            let base = dim_color(kind_color(node.kind), depth_fade(projected.depth, near, far));
            let color = if is_selected {
                selected_color
            } else if is_hovered {
                blend_color(base, Color32::WHITE, 0.35)
            } else if is_neighbor {
                blend_color(base, Color32::from_rgb(246, 137, 92), 0.45)
            } else if on_path {
                blend_color(base, selected_color, 0.5)
            } else if is_match {
                blend_color(base, Color32::from_rgb(103, 196, 255), 0.68)
            } else if highlight_active || search_active {
                dim_color(base, 0.45)
            } else {
                base
            };

            painter.circle_filled(projected.screen, projected.radius, color);
            painter.circle_stroke(
                projected.screen,
                projected.radius,
                Stroke::new(
                    if is_selected || is_match { 1.8 } else { 1.0 },
                    Color32::from_rgba_unmultiplied(15, 15, 15, 190),
                ),
            );

            if is_selected || is_hovered || is_match || projected.radius > 16.0 {
                painter.text(
                    projected.screen + vec2(projected.radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    &node.name,
                    FontId::proportional(12.0),
                    Color32::from_gray(238),
                );
            }
        }

        if let Some(hovered) = hovered
            && let Some(node) = self.store.node(hovered)
            && let Some(pointer) = ui.input(|input| input.pointer.hover_pos())
        {
            let mut text = format!("{}\n{}", node.name, node.kind.label());
            if let Some(detail) = &node.detail {
                text.push_str(&format!(" · {detail}"));
            }
            if let Some(value) = &node.value {
                text.push_str(&format!("\n= {value}"));
            }

            let galley = painter.layout_no_wrap(text, FontId::proportional(13.0), Color32::from_gray(240));
            let origin = pointer + vec2(14.0, 14.0);
            let frame = Rect::from_min_size(origin, galley.size()).expand(6.0);
            painter.rect_filled(frame, 4.0, Color32::from_rgba_unmultiplied(12, 14, 18, 225));
            painter.galley(origin, galley, Color32::from_gray(240));
        }
    }
}
