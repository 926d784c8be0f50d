//! Write-once per-particle attributes and the CPU mirror of the shader's
//! position evaluation.

use glam::{Quat, Vec2, Vec3};
use rand::prelude::*;

use crate::config::HeadTransform;
use crate::constants::*;
use crate::mesh::MeshData;
use crate::path::{smoothstep, Path, PathState};

/// Mix a base seed with a particle index so every particle owns an
/// independent, reproducible stream.
#[inline]
pub fn particle_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Struct-of-arrays particle attributes, laid out the way the renderer
/// uploads them as instance buffers.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleAttributes {
    pub spawn_delay: Vec<f32>,
    pub duration: Vec<f32>,
    pub pivot: Vec<Vec3>,
    pub rotation_axis: Vec<Vec3>,
    pub rotation_angle: Vec<f32>,
    pub target: Option<Vec<Vec3>>,
}

impl ParticleAttributes {
    pub fn generate(
        count: usize,
        delay_step: f32,
        duration_range: (f32, f32),
        seed: u64,
        head: Option<(&MeshData, &HeadTransform)>,
    ) -> Self {
        let mut attrs = Self {
            spawn_delay: Vec::with_capacity(count),
            duration: Vec::with_capacity(count),
            pivot: Vec::with_capacity(count),
            rotation_axis: Vec::with_capacity(count),
            rotation_angle: Vec::with_capacity(count),
            target: head.map(|_| Vec::with_capacity(count)),
        };
        let (min_d, max_d) = duration_range;

        for i in 0..count {
            let mut rng = StdRng::seed_from_u64(particle_seed(seed, i));
            attrs.spawn_delay.push(i as f32 * delay_step);
            attrs.duration.push(if max_d > min_d {
                rng.gen_range(min_d..max_d)
            } else {
                min_d
            });
            attrs.pivot.push(Vec3::new(
                rng.gen_range(0.0..PIVOT_MAX),
                rng.gen_range(0.0..PIVOT_MAX),
                rng.gen_range(0.0..PIVOT_MAX),
            ));
            let axis = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            attrs.rotation_axis.push(axis.try_normalize().unwrap_or(Vec3::Y));
            attrs
                .rotation_angle
                .push(std::f32::consts::PI * rng.gen_range(SPIN_TURNS_MIN..SPIN_TURNS_MAX));
            if let (Some(targets), Some((mesh, transform))) = (attrs.target.as_mut(), head) {
                targets.push(mesh.sample_surface(&mut rng, transform));
            }
        }
        log::info!(
            "[particles] generated {} particles (head targets: {})",
            count,
            attrs.target.is_some()
        );
        attrs
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.spawn_delay.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spawn_delay.is_empty()
    }

    /// `clamp(clock - delay, 0, duration) / duration`
    #[inline]
    pub fn progress(&self, index: usize, clock: f32) -> f32 {
        let duration = self.duration[index].max(f32::EPSILON);
        (clock - self.spawn_delay[index]).clamp(0.0, duration) / duration
    }

    /// Largest progress over a strided subset of particles.
    pub fn formation_progress(&self, clock: f32) -> f32 {
        (0..self.len())
            .step_by(FORMATION_SAMPLE_STRIDE)
            .map(|i| self.progress(i, clock))
            .fold(0.0, f32::max)
    }

    /// World position of one particle, as the vertex shader computes it.
    pub fn position(
        &self,
        index: usize,
        clock: f32,
        path: &Path,
        state: &PathState,
        roundness: Vec2,
    ) -> Vec3 {
        let t = self.progress(index, clock);
        let anchor = path.position(t, roundness);
        let spin = Quat::from_axis_angle(self.rotation_axis[index], self.rotation_angle[index] * t)
            * Quat::from_rotation_y(state.rotation_at(t, roundness));
        let offset = spin * (self.pivot[index] * (1.0 + state.radius_at(t, roundness)));
        let shake = state.shake_at(t, roundness);

        match &self.target {
            Some(targets) => head_blend(anchor, offset + shake, targets[index], t),
            None => anchor + offset + shake,
        }
    }
}

/// Track the path for the first part of life, then settle onto the mesh
/// target while the radial offset shrinks.
#[inline]
pub fn head_blend(anchor: Vec3, offset: Vec3, target: Vec3, t: f32) -> Vec3 {
    let influence = smoothstep(HEAD_BLEND_START, HEAD_BLEND_END, t);
    let radius_reduction = 1.0 - influence * HEAD_RADIUS_ATTENUATION;
    (anchor + offset * radius_reduction).lerp(target, influence)
}
