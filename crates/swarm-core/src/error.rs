use thiserror::Error;

use crate::spectrum::Band;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("path needs at least 4 points, got {0}")]
    PathTooShort(usize),
    #[error("particle count must be non-zero")]
    NoParticles,
    #[error("band layout is empty")]
    NoBands,
    #[error("band layout has {0} bands; supported layouts have 2 to 5")]
    BandCount(usize),
    #[error("band edge {index} ({hz} Hz) does not increase")]
    BandEdgeOrder { index: usize, hz: f32 },
    #[error("band {0:?} appears more than once")]
    DuplicateBand(Band),
    #[error("section weights must be positive")]
    SectionWeightValue,
    #[error("star cap {cap} exceeds pool size {pool}")]
    StarCap { cap: usize, pool: usize },
    #[error("duration range [{min}, {max}] is inverted or non-positive")]
    DurationRange { min: f32, max: f32 },
    #[error("fallback window [{min}, {max}] is degenerate")]
    FallbackWindow { min: f32, max: f32 },
    #[error("star lifetime {base}s x [{lo}, {hi}] is inverted or non-positive")]
    StarLifetime { base: f32, lo: f32, hi: f32 },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    #[error("mesh has no vertices")]
    NoVertices,
    #[error("mesh has no faces")]
    NoFaces,
    #[error("face {face} has {count} indices, need at least 3")]
    DegenerateFace { face: usize, count: usize },
    #[error("face {face} references vertex {index} of {vertex_count}")]
    IndexOutOfRange {
        face: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("vertex {0} is not finite")]
    NonFiniteVertex(usize),
    #[error("{0}")]
    Load(String),
}

/// Conditions that invalidate a single frame. The caller logs, skips
/// publishing and carries on with the next tick.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FrameError {
    #[error("{channel} snapshot has {got} bins, expected {expected}")]
    ChannelLength {
        channel: &'static str,
        got: usize,
        expected: usize,
    },
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
}

#[derive(Debug, Error)]
pub enum SwarmError {
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("mesh load failed: {0}")]
    Mesh(#[from] MeshError),
    #[error("frame skipped: {0}")]
    Frame(#[from] FrameError),
    #[error("audio init failed: {0}")]
    AudioInit(String),
}
