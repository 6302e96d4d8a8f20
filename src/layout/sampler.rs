use std::f32::consts::TAU;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub position: Vec3,
    pub attempts: usize,
    /// False when the attempt budget ran out and `position` is the last,
    /// possibly crowded, candidate.
    pub spaced: bool,
}

/// Rejection sampler for spawn positions on a sphere shell around the origin.
pub struct PositionSampler {
    rng: StdRng,
    max_attempts: usize,
}

impl PositionSampler {
    pub fn new(seed: u64, max_attempts: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn sample<I>(&mut self, radius: f32, min_distance: f32, existing: I) -> Sample
    where
        I: IntoIterator<Item = Vec3> + Clone,
    {
        let min_distance_sq = min_distance * min_distance;
        let mut position = Vec3::ZERO;

        for attempt in 1..=self.max_attempts {
            position = self.point_on_sphere(radius);
            let crowded = existing
                .clone()
                .into_iter()
                .any(|other| position.distance_squared(other) < min_distance_sq);

            if !crowded {
                return Sample {
                    position,
                    attempts: attempt,
                    spaced: true,
                };
            }
        }

        tracing::warn!(
            attempts = self.max_attempts,
            radius,
            min_distance,
            "no free spawn position found; using last candidate"
        );
        Sample {
            position,
            attempts: self.max_attempts,
            spaced: false,
        }
    }

    /// Uniform on the sphere: azimuth is uniform and the polar angle comes from
    /// `acos(2u - 1)`, which keeps samples from bunching at the poles.
    fn point_on_sphere(&mut self, radius: f32) -> Vec3 {
        let theta = self.rng.r#gen::<f32>() * TAU;
        let phi = (2.0 * self.rng.r#gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
        Vec3::new(
            radius * phi.sin() * theta.cos(),
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
        )
    }
}
