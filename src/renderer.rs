//! Hand-off to the external JS renderer (`window.swarmRenderer`).
//!
//! Uniforms are collected into one plain object per frame; arrays become
//! `Float32Array`s (vec3 arrays flattened). `mark_dirty` calls
//! `swarmRenderer.update(uniforms)`. Static particle attributes are sent
//! once through `swarmRenderer.setParticles(...)`.

use glam::Vec3;
use js_sys::{Float32Array, Function, Object, Reflect};
use swarm_core::mesh::MeshData;
use swarm_core::particles::ParticleAttributes;
use swarm_core::{MeshError, UniformSink, UniformValue};
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

use crate::constants::{HEAD_MESH_GLOBAL, RENDERER_GLOBAL};

fn global(name: &str) -> Option<JsValue> {
    let window = web::window()?;
    Reflect::get(&window, &JsValue::from_str(name))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn method(target: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

fn vec3_array(values: &[Vec3]) -> Float32Array {
    let flat: Vec<f32> = values.iter().flat_map(|v| v.to_array()).collect();
    Float32Array::from(flat.as_slice())
}

fn set_field(obj: &Object, name: &str, value: &JsValue) {
    _ = Reflect::set(obj, &JsValue::from_str(name), value);
}

pub struct JsUniformSink {
    uniforms: Object,
    missing_logged: bool,
}

impl JsUniformSink {
    pub fn new() -> Self {
        Self {
            uniforms: Object::new(),
            missing_logged: false,
        }
    }

    /// Send write-once particle buffers. Returns false when the renderer
    /// is not on the page yet, so the caller can retry next frame.
    pub fn upload_particles(&self, particles: &ParticleAttributes) -> bool {
        let Some(renderer) = global(RENDERER_GLOBAL) else {
            return false;
        };
        let Some(set_particles) = method(&renderer, "setParticles") else {
            return false;
        };
        let obj = Object::new();
        set_field(&obj, "count", &JsValue::from_f64(particles.len() as f64));
        set_field(&obj, "spawnDelay", &Float32Array::from(particles.spawn_delay.as_slice()));
        set_field(&obj, "duration", &Float32Array::from(particles.duration.as_slice()));
        set_field(&obj, "pivot", &vec3_array(&particles.pivot));
        set_field(&obj, "rotationAxis", &vec3_array(&particles.rotation_axis));
        set_field(&obj, "rotationAngle", &Float32Array::from(particles.rotation_angle.as_slice()));
        if let Some(targets) = &particles.target {
            set_field(&obj, "target", &vec3_array(targets));
        }
        match set_particles.call1(&renderer, &obj) {
            Ok(_) => {
                log::info!("[renderer] uploaded {} particles", particles.len());
                true
            }
            Err(e) => {
                log::error!("[renderer] setParticles failed: {:?}", e);
                false
            }
        }
    }
}

impl Default for JsUniformSink {
    fn default() -> Self {
        Self::new()
    }
}

impl UniformSink for JsUniformSink {
    fn set(&mut self, name: &'static str, value: UniformValue<'_>) {
        let js: JsValue = match value {
            UniformValue::Float(v) => JsValue::from_f64(v as f64),
            UniformValue::Vec2(v) => Float32Array::from(v.to_array().as_slice()).into(),
            UniformValue::Vec3(v) => Float32Array::from(v.to_array().as_slice()).into(),
            UniformValue::FloatArray(v) => Float32Array::from(v).into(),
            UniformValue::Vec3Array(v) => vec3_array(v).into(),
        };
        set_field(&self.uniforms, name, &js);
    }

    fn mark_dirty(&mut self) {
        let update = global(RENDERER_GLOBAL).and_then(|r| method(&r, "update").map(|f| (r, f)));
        match update {
            Some((renderer, update)) => {
                if let Err(e) = update.call1(&renderer, &self.uniforms) {
                    log::warn!("[renderer] update failed: {:?}", e);
                }
            }
            None if !self.missing_logged => {
                log::warn!("[renderer] window.{} not found; uniforms dropped", RENDERER_GLOBAL);
                self.missing_logged = true;
            }
            None => {}
        }
    }
}

/// Read the parsed head mesh the page exposes as
/// `window.swarmHeadMesh = { positions: Float32Array, indices: Uint32Array }`
/// (or a promise of it).
pub async fn load_head_mesh() -> Result<MeshData, MeshError> {
    let mut value = global(HEAD_MESH_GLOBAL)
        .ok_or_else(|| MeshError::Load(format!("window.{} is not defined", HEAD_MESH_GLOBAL)))?;
    if let Some(promise) = value.dyn_ref::<js_sys::Promise>() {
        value = wasm_bindgen_futures::JsFuture::from(promise.clone())
            .await
            .map_err(|e| MeshError::Load(format!("{:?}", e)))?;
    }
    let field = |name: &str| {
        Reflect::get(&value, &JsValue::from_str(name))
            .map_err(|e| MeshError::Load(format!("{}: {:?}", name, e)))
    };
    let positions = Float32Array::new(&field("positions")?).to_vec();
    let indices = js_sys::Uint32Array::new(&field("indices")?).to_vec();
    MeshData::from_triangles(&positions, &indices)
}
