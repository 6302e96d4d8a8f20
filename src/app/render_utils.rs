use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke};

use crate::graph::NodeKind;

pub(super) fn kind_color(kind: NodeKind) -> Color32 {
    match kind {
        NodeKind::Main => Color32::from_rgb(0x1E, 0x90, 0xFF),
        NodeKind::Function => Color32::from_rgb(0x32, 0xCD, 0x32),
        NodeKind::Variable => Color32::from_rgb(0xFF, 0x8C, 0x00),
        NodeKind::Import => Color32::from_rgb(0x4B, 0x00, 0x82),
        NodeKind::Class => Color32::from_rgb(0xDC, 0x14, 0x3C),
        NodeKind::Object => Color32::from_rgb(0x00, 0xA0, 0xA0),
        NodeKind::Array => Color32::from_rgb(0x8A, 0x2B, 0xE2),
        NodeKind::Key => Color32::from_rgb(0xFF, 0xD7, 0x00),
        NodeKind::Element => Color32::from_rgb(0xFF, 0x7F, 0x50),
    }
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

/// Farther nodes fade toward the background.
pub(super) fn depth_fade(depth: f32, near: f32, far: f32) -> f32 {
    if far - near <= f32::EPSILON {
        return 1.0;
    }
    1.0 - ((depth - near) / (far - near)).clamp(0.0, 1.0) * 0.45
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let horizon = rect.center().y;
    painter.line_segment(
        [Pos2::new(rect.left(), horizon), Pos2::new(rect.right(), horizon)],
        Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 40)),
    );
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// World radius of a node sphere at the given size multiplier.
pub(super) fn node_world_radius(kind: NodeKind, node_size: f32) -> f32 {
    let base = match kind {
        NodeKind::Main => 0.8,
        NodeKind::Function | NodeKind::Class | NodeKind::Import => 0.5,
        _ => 0.4,
    };
    base * node_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints_are_the_inputs() {
        let base = Color32::from_rgb(10, 20, 30);
        let overlay = Color32::from_rgb(200, 100, 0);
        assert_eq!(blend_color(base, overlay, 0.0), base);
        assert_eq!(blend_color(base, overlay, 1.0), overlay);
    }

    #[test]
    fn depth_fade_is_bounded() {
        assert_eq!(depth_fade(5.0, 5.0, 30.0), 1.0);
        assert!((depth_fade(30.0, 5.0, 30.0) - 0.55).abs() < 1e-6);
        assert_eq!(depth_fade(10.0, 10.0, 10.0), 1.0);
    }

    #[test]
    fn every_kind_has_a_distinct_color() {
        let colors = NodeKind::ALL.iter().map(|kind| kind_color(*kind)).collect::<Vec<_>>();
        for (index, color) in colors.iter().enumerate() {
            assert!(!colors[index + 1..].contains(color));
        }
    }
}
