//! Parsed head-mesh data handed over by the asset loader, and uniform
//! surface sampling for particle convergence targets.

use glam::{Quat, Vec3};
use rand::Rng;
use smallvec::SmallVec;

use crate::config::HeadTransform;
use crate::error::MeshError;

pub type Face = SmallVec<[u32; 4]>;

/// Flat vertex list plus faces of three or more vertex indices.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    vertices: Vec<Vec3>,
    faces: Vec<Face>,
}

impl MeshData {
    pub fn new(vertices: Vec<Vec3>, faces: Vec<Face>) -> Result<Self, MeshError> {
        if vertices.is_empty() {
            return Err(MeshError::NoVertices);
        }
        if faces.is_empty() {
            return Err(MeshError::NoFaces);
        }
        if let Some(i) = vertices.iter().position(|v| !v.is_finite()) {
            return Err(MeshError::NonFiniteVertex(i));
        }
        for (face, indices) in faces.iter().enumerate() {
            if indices.len() < 3 {
                return Err(MeshError::DegenerateFace {
                    face,
                    count: indices.len(),
                });
            }
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
                return Err(MeshError::IndexOutOfRange {
                    face,
                    index,
                    vertex_count: vertices.len(),
                });
            }
        }
        Ok(Self { vertices, faces })
    }

    /// Build from flat `xyz` positions and triangle indices.
    pub fn from_triangles(positions: &[f32], indices: &[u32]) -> Result<Self, MeshError> {
        let vertices = positions
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
            .collect();
        let faces = indices
            .chunks(3)
            .map(|c| c.iter().copied().collect::<Face>())
            .collect();
        Self::new(vertices, faces)
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Random point on a random face, using the face's first three vertices,
    /// then scaled, rotated about X and lifted by the transform.
    pub fn sample_surface<R: Rng + ?Sized>(&self, rng: &mut R, transform: &HeadTransform) -> Vec3 {
        let face = &self.faces[rng.gen_range(0..self.faces.len())];
        let a = self.vertices[face[0] as usize];
        let b = self.vertices[face[1] as usize];
        let c = self.vertices[face[2] as usize];

        let mut u: f32 = rng.gen();
        let mut v: f32 = rng.gen();
        if u + v > 1.0 {
            u = 1.0 - u;
            v = 1.0 - v;
        }
        let local = a + (b - a) * u + (c - a) * v;
        transform.apply(local)
    }
}

impl HeadTransform {
    #[inline]
    pub fn apply(&self, p: Vec3) -> Vec3 {
        Quat::from_rotation_x(self.x_rotation) * (p * self.scale) + Vec3::Y * self.y_offset
    }
}
