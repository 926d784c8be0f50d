//! Platform-free core of the audio-reactive particle swarm: spectrum banding,
//! envelopes and hit detection, the anchor path and particle attributes, the
//! per-frame signal mapper and its effects, and the engine that ticks them.
//!
//! Nothing here touches browser APIs; the web front-end feeds analyser
//! snapshots in and forwards uniforms to the external renderer.

pub mod aberration;
pub mod camera;
pub mod config;
pub mod constants;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod mapper;
pub mod mesh;
pub mod particles;
pub mod path;
pub mod spectrum;
pub mod stars;
pub mod status;
pub mod uniforms;

pub use aberration::{AberrationMode, ChromaticAberrationState};
pub use camera::{CameraInput, CameraPose, CameraRig};
pub use config::{Preset, SwarmConfig};
pub use engine::{FrameInput, FrameOutput, LifecycleSignal, PlaybackState, SwarmEngine};
pub use error::{ConfigError, FrameError, MeshError, SwarmError};
pub use mesh::MeshData;
pub use spectrum::{Band, BandEnergies, SpectrumSnapshot};
pub use uniforms::{SceneUniforms, UniformSink, UniformTable, UniformValue};
