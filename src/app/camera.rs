use eframe::egui::{Pos2, Rect, Vec2, vec2};
use glam::Vec3;

const FIELD_OF_VIEW_Y: f32 = 75.0_f32.to_radians();
const NEAR_PLANE: f32 = 0.1;
const MIN_DISTANCE: f32 = 5.0;
const MAX_DISTANCE: f32 = 50.0;
const ORBIT_SPEED: f32 = 0.008;
const PITCH_LIMIT: f32 = 1.5;

/// Perspective camera circling a target point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct OrbitCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub target: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Projection {
    pub screen: Pos2,
    /// Distance along the view direction.
    pub depth: f32,
    /// Screen pixels per world unit at this depth.
    pub scale: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            yaw: 0.6,
            pitch: 0.35,
            distance: 20.0,
            target: Vec3::ZERO,
        }
    }
}

impl OrbitCamera {
    pub(super) fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target + Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }

    /// Right, up and forward unit vectors.
    fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = (self.target - self.eye()).normalize();
        let right = forward.cross(Vec3::Y).normalize();
        let up = right.cross(forward);
        (right, up, forward)
    }

    fn focal_length(rect: Rect) -> f32 {
        (rect.height() * 0.5) / (FIELD_OF_VIEW_Y * 0.5).tan()
    }

    /// Screen position of `point`, or `None` when it is behind the near plane.
    pub(super) fn project(&self, rect: Rect, point: Vec3) -> Option<Projection> {
        let (right, up, forward) = self.basis();
        let relative = point - self.eye();
        let depth = relative.dot(forward);
        if depth <= NEAR_PLANE {
            return None;
        }

        let scale = Self::focal_length(rect) / depth;
        let offset = vec2(relative.dot(right) * scale, -relative.dot(up) * scale);
        Some(Projection {
            screen: rect.center() + offset,
            depth,
            scale,
        })
    }

    /// World-space offset that moves a point at `depth` by `delta` pixels.
    pub(super) fn screen_delta_to_world(&self, rect: Rect, delta: Vec2, depth: f32) -> Vec3 {
        let (right, up, _) = self.basis();
        let units_per_pixel = depth / Self::focal_length(rect);
        (right * delta.x - up * delta.y) * units_per_pixel
    }

    pub(super) fn orbit(&mut self, delta: Vec2) {
        self.yaw -= delta.x * ORBIT_SPEED;
        self.pitch = (self.pitch + delta.y * ORBIT_SPEED).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub(super) fn zoom(&mut self, scroll: f32) {
        let factor = (1.0 - (scroll * 0.0018)).clamp(0.85, 1.15);
        self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    fn viewport() -> Rect {
        Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 600.0))
    }

    #[test]
    fn target_projects_to_the_viewport_center() {
        let camera = OrbitCamera::default();
        let projection = camera.project(viewport(), camera.target).unwrap();

        assert!((projection.screen - viewport().center()).length() < 1e-3);
        assert!((projection.depth - camera.distance).abs() < 1e-3);
    }

    #[test]
    fn points_behind_the_camera_are_culled() {
        let camera = OrbitCamera::default();
        let behind = camera.eye() + (camera.eye() - camera.target);
        assert!(camera.project(viewport(), behind).is_none());
    }

    #[test]
    fn screen_drag_maps_back_onto_the_same_pixels() {
        let camera = OrbitCamera::default();
        let rect = viewport();
        let start = camera.project(rect, camera.target).unwrap();
        let delta = vec2(40.0, -25.0);

        let moved = camera.target + camera.screen_delta_to_world(rect, delta, start.depth);
        let end = camera.project(rect, moved).unwrap();

        assert!((end.screen - (start.screen + delta)).length() < 1e-2);
        assert!((end.depth - start.depth).abs() < 1e-3);
    }

    #[test]
    fn orbit_and_zoom_stay_in_range() {
        let mut camera = OrbitCamera::default();
        camera.orbit(vec2(0.0, 10_000.0));
        assert_eq!(camera.pitch, PITCH_LIMIT);

        for _ in 0..200 {
            camera.zoom(500.0);
        }
        assert_eq!(camera.distance, MIN_DISTANCE);
        for _ in 0..200 {
            camera.zoom(-500.0);
        }
        assert_eq!(camera.distance, MAX_DISTANCE);
    }
}
