//! The anchor path the swarm flows along, its per-point audio state, and the
//! Catmull-Rom evaluation shared by positions, radii, rotations and shake.

use std::ops::{Add, Mul, Sub};

use glam::{Vec2, Vec3};
use rand::prelude::*;

use crate::constants::{PATH_XZ_SPREAD, PATH_Y_JITTER};

/// Ordered anchors; first and last are fixed, interior points are jittered
/// around the straight line between them. Immutable once generated.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    points: Vec<Vec3>,
}

impl Path {
    pub fn generate(len: usize, origin: Vec3, terminus: Vec3, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let last = len.saturating_sub(1).max(1) as f32;
        let points = (0..len)
            .map(|i| {
                if i == 0 {
                    origin
                } else if i + 1 == len {
                    terminus
                } else {
                    let f = i as f32 / last;
                    Vec3::new(
                        rng.gen_range(-PATH_XZ_SPREAD..PATH_XZ_SPREAD),
                        origin.y + (terminus.y - origin.y) * f
                            + rng.gen_range(-PATH_Y_JITTER..PATH_Y_JITTER),
                        rng.gen_range(-PATH_XZ_SPREAD..PATH_XZ_SPREAD),
                    )
                }
            })
            .collect();
        Self { points }
    }

    pub fn from_points(points: Vec<Vec3>) -> Self {
        Self { points }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Spline position at progress `t` in [0, 1].
    pub fn position(&self, t: f32, roundness: Vec2) -> Vec3 {
        sample_spline(&self.points, t, roundness).unwrap_or(Vec3::ZERO)
    }
}

/// Four parallel per-path-point arrays written by the mapper every frame.
#[derive(Clone, Debug, PartialEq)]
pub struct PathState {
    pub radius: Vec<f32>,
    pub shake: Vec<Vec3>,
    pub rotation: Vec<f32>,
    pub pan: Vec<f32>,
}

impl PathState {
    pub fn new(len: usize) -> Self {
        Self {
            radius: vec![0.0; len],
            shake: vec![Vec3::ZERO; len],
            rotation: vec![0.0; len],
            pan: vec![0.0; len],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.radius.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.radius.is_empty()
    }

    pub fn reset(&mut self) {
        self.radius.fill(0.0);
        self.shake.fill(Vec3::ZERO);
        self.rotation.fill(0.0);
        self.pan.fill(0.0);
    }

    pub fn is_idle(&self) -> bool {
        self.radius.iter().all(|&r| r == 0.0)
            && self.shake.iter().all(|s| *s == Vec3::ZERO)
            && self.rotation.iter().all(|&r| r == 0.0)
            && self.pan.iter().all(|&p| p == 0.0)
    }

    pub fn all_finite(&self) -> bool {
        self.radius.iter().all(|v| v.is_finite())
            && self.shake.iter().all(|v| v.is_finite())
            && self.rotation.iter().all(|v| v.is_finite())
            && self.pan.iter().all(|v| v.is_finite())
    }

    pub fn radius_at(&self, t: f32, roundness: Vec2) -> f32 {
        sample_spline(&self.radius, t, roundness).unwrap_or(0.0)
    }

    pub fn rotation_at(&self, t: f32, roundness: Vec2) -> f32 {
        sample_spline(&self.rotation, t, roundness).unwrap_or(0.0)
    }

    pub fn shake_at(&self, t: f32, roundness: Vec2) -> Vec3 {
        sample_spline(&self.shake, t, roundness).unwrap_or(Vec3::ZERO)
    }
}

/// Cubic Hermite segment with Catmull-Rom tangents. `roundness` scales the
/// outgoing tangent at `p1` (x) and the incoming tangent at `p2` (y);
/// `(1, 1)` is the standard uniform Catmull-Rom curve.
#[inline]
pub fn catmull_rom<T>(p0: T, p1: T, p2: T, p3: T, u: f32, roundness: Vec2) -> T
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f32, Output = T>,
{
    let m1 = (p2 - p0) * (0.5 * roundness.x);
    let m2 = (p3 - p1) * (0.5 * roundness.y);
    let u2 = u * u;
    let u3 = u2 * u;
    let h00 = 2.0 * u3 - 3.0 * u2 + 1.0;
    let h10 = u3 - 2.0 * u2 + u;
    let h01 = -2.0 * u3 + 3.0 * u2;
    let h11 = u3 - u2;
    p1 * h00 + m1 * h10 + p2 * h01 + m2 * h11
}

/// Evaluate a control array at progress `t`, mapped to the virtual index
/// `t * (n - 1)` with neighbour indices clamped at the ends.
pub fn sample_spline<T>(points: &[T], t: f32, roundness: Vec2) -> Option<T>
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f32, Output = T>,
{
    match points.len() {
        0 => None,
        1 => Some(points[0]),
        n => {
            let virtual_index = t.clamp(0.0, 1.0) * (n - 1) as f32;
            let i = (virtual_index.floor() as usize).min(n - 2);
            let u = virtual_index - i as f32;
            let p0 = points[i.saturating_sub(1)];
            let p1 = points[i];
            let p2 = points[i + 1];
            let p3 = points[(i + 2).min(n - 1)];
            Some(catmull_rom(p0, p1, p2, p3, u, roundness))
        }
    }
}

#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
