//! The seam to the external renderer: named uniforms plus a packed block
//! for single-write GPU upload.

use fnv::FnvHashMap;
use glam::{Vec2, Vec3};

pub const U_TIME: &str = "uTime";
pub const U_PATH: &str = "uPath";
pub const U_RADIUS: &str = "uRadius";
pub const U_SHAKE: &str = "uShake";
pub const U_ROTATION: &str = "uRotation";
pub const U_PAN: &str = "uPan";
pub const U_ROUNDNESS: &str = "uRoundness";
pub const U_PARTICLE_SCALE: &str = "uParticleScale";
pub const U_LIGHT_POSITION: [&str; 3] = ["uLight1Position", "uLight2Position", "uLight3Position"];
pub const U_LIGHT_COLOR: [&str; 3] = ["uLight1Color", "uLight2Color", "uLight3Color"];
pub const U_LIGHT_INTENSITY: [&str; 3] = ["uLight1Intensity", "uLight2Intensity", "uLight3Intensity"];
pub const U_ABERRATION_STRENGTH: &str = "uAberrationStrength";
pub const U_ABERRATION_DIRECTION: &str = "uAberrationDirection";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue<'a> {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    FloatArray(&'a [f32]),
    Vec3Array(&'a [Vec3]),
}

/// Anything that can receive named uniforms. Implemented by the web
/// front-end (JS hand-off) and by [`UniformTable`].
pub trait UniformSink {
    fn set(&mut self, name: &'static str, value: UniformValue<'_>);
    fn mark_dirty(&mut self);
}

#[derive(Clone, Debug, PartialEq)]
pub enum OwnedUniform {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    FloatArray(Vec<f32>),
    Vec3Array(Vec<Vec3>),
}

impl OwnedUniform {
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float_array(&self) -> Option<&[f32]> {
        match self {
            Self::FloatArray(v) => Some(v),
            _ => None,
        }
    }
}

/// In-memory sink keeping the latest value per name.
#[derive(Debug, Default)]
pub struct UniformTable {
    values: FnvHashMap<&'static str, OwnedUniform>,
    dirty: bool,
    generation: u64,
}

impl UniformTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&OwnedUniform> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns and clears the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl UniformSink for UniformTable {
    fn set(&mut self, name: &'static str, value: UniformValue<'_>) {
        // reuse array allocations across frames
        if let Some(existing) = self.values.get_mut(name) {
            match (existing, value) {
                (OwnedUniform::FloatArray(dst), UniformValue::FloatArray(src)) => {
                    dst.clear();
                    dst.extend_from_slice(src);
                    return;
                }
                (OwnedUniform::Vec3Array(dst), UniformValue::Vec3Array(src)) => {
                    dst.clear();
                    dst.extend_from_slice(src);
                    return;
                }
                _ => {}
            }
        }
        let owned = match value {
            UniformValue::Float(v) => OwnedUniform::Float(v),
            UniformValue::Vec2(v) => OwnedUniform::Vec2(v),
            UniformValue::Vec3(v) => OwnedUniform::Vec3(v),
            UniformValue::FloatArray(v) => OwnedUniform::FloatArray(v.to_vec()),
            UniformValue::Vec3Array(v) => OwnedUniform::Vec3Array(v.to_vec()),
        };
        self.values.insert(name, owned);
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        self.generation += 1;
    }
}

/// Scalar uniforms packed for a std140 uniform block.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub time: f32,
    pub particle_scale: f32,
    pub roundness: [f32; 2],
    pub aberration_direction: [f32; 2],
    pub aberration_strength: f32,
    pub camera_distance: f32,
    pub camera_position: [f32; 4],
    pub light_positions: [[f32; 4]; 3],
    /// rgb colour, intensity in w
    pub light_colors: [[f32; 4]; 3],
}
