mod sampler;

use std::f32::consts::TAU;
use std::time::{Duration, Instant};

use glam::Vec3;

use crate::graph::{GraphStore, NodeId};

pub use sampler::PositionSampler;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Pairs closer than this push each other apart; also scales spawn spacing.
    pub repulsion_radius: f32,
    pub initial_strength: f32,
    pub live_strength: f32,
    pub max_iterations: usize,
    pub convergence_epsilon: f32,
    /// Minimum time between live sweeps while a node is being dragged.
    pub drag_interval: Duration,
    pub sampler_attempts: usize,
    pub shell_radius: f32,
    pub declaration_shell_radius: f32,
    pub value_shell_radius: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            repulsion_radius: 2.5,
            initial_strength: 0.1,
            live_strength: 0.05,
            max_iterations: 100,
            convergence_epsilon: 0.01,
            drag_interval: Duration::from_millis(100),
            sampler_attempts: 100,
            shell_radius: 5.0,
            declaration_shell_radius: 8.0,
            value_shell_radius: 12.0,
        }
    }
}

impl LayoutConfig {
    pub fn min_spacing(&self) -> f32 {
        self.repulsion_radius * 0.8
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RelaxationReport {
    pub iterations: usize,
    pub max_displacement: f32,
    pub converged: bool,
}

/// Direction used when two nodes sit on top of each other.
fn separation_fallback(i: usize, j: usize) -> Vec3 {
    let angle = ((i as f32) * 0.618_034 + (j as f32) * 0.414_214) * TAU;
    let lift = (((i * 7 + j * 13) % 11) as f32 / 5.0) - 1.0;
    Vec3::new(angle.cos(), angle.sin(), lift).normalize()
}

/// One pass of pairwise repulsion over every node. Each pair closer than
/// `radius` is pushed apart by `strength * (1 - distance / radius)`, split
/// evenly between the two nodes. Returns the largest displacement applied.
pub fn relax_sweep(store: &mut GraphStore, radius: f32, strength: f32) -> f32 {
    let node_count = store.node_count();
    if node_count < 2 || radius <= 0.0 {
        return 0.0;
    }

    let positions = store.positions().collect::<Vec<_>>();
    let mut shifts = vec![Vec3::ZERO; node_count];

    for i in 0..node_count {
        for j in (i + 1)..node_count {
            let delta = positions[j] - positions[i];
            let distance = delta.length();
            if distance >= radius {
                continue;
            }

            let direction = if distance > 0.0001 {
                delta / distance
            } else {
                separation_fallback(i, j)
            };
            let half_push = direction * (strength * (1.0 - distance / radius) * 0.5);
            shifts[i] -= half_push;
            shifts[j] += half_push;
        }
    }

    let mut max_displacement = 0.0_f32;
    for (index, shift) in shifts.into_iter().enumerate() {
        let length = shift.length();
        if length > 0.0 {
            store.translate_node(NodeId(index), shift);
            max_displacement = max_displacement.max(length);
        }
    }

    max_displacement
}

/// Settles a freshly built graph: sweeps until nothing moves more than the
/// convergence epsilon or the iteration cap is hit.
pub fn relax_initial(store: &mut GraphStore, config: &LayoutConfig) -> RelaxationReport {
    let mut report = RelaxationReport {
        iterations: 0,
        max_displacement: 0.0,
        converged: true,
    };

    if store.node_count() < 2 {
        return report;
    }

    report.converged = false;
    while report.iterations < config.max_iterations {
        report.max_displacement =
            relax_sweep(store, config.repulsion_radius, config.initial_strength);
        report.iterations += 1;
        if report.max_displacement < config.convergence_epsilon {
            report.converged = true;
            break;
        }
    }

    if !report.converged {
        tracing::debug!(
            iterations = report.iterations,
            max_displacement = report.max_displacement,
            "initial layout stopped at the iteration cap"
        );
    }

    report
}

/// Per-frame relaxation that backs off while the user drags a node.
#[derive(Debug, Default)]
pub struct LiveRelaxation {
    last_sweep: Option<Instant>,
}

impl LiveRelaxation {
    /// Runs one sweep unless throttled. Returns the largest displacement when a
    /// sweep ran.
    pub fn tick(
        &mut self,
        store: &mut GraphStore,
        config: &LayoutConfig,
        now: Instant,
        dragging: bool,
    ) -> Option<f32> {
        if dragging
            && let Some(last) = self.last_sweep
            && now.saturating_duration_since(last) < config.drag_interval
        {
            return None;
        }

        self.last_sweep = Some(now);
        Some(relax_sweep(
            store,
            config.repulsion_radius,
            config.live_strength,
        ))
    }
}
