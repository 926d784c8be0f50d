// Shared tuning constants for the swarm core. Presets in `config.rs` start
// from these and override what differs per visual variant.

// Clock
pub const REFERENCE_FPS: f32 = 60.0; // per-frame rates below are tuned at this tick rate
pub const CLOCK_UNITS_PER_SEC: f32 = 60.0; // animation clock units per playback second
pub const MAX_FRAME_DT_SEC: f32 = 0.1; // clamp for stalled tabs

// Spectrum
pub const BYTE_MAX: f32 = 255.0;
pub const PAN_MIN_ENERGY: f32 = 0.01; // below this stereo energy, pan is 0

// Envelope
pub const ONSET_THRESHOLD: f32 = 0.05;
pub const ONSET_GAIN: f32 = 1.8;
pub const ENVELOPE_CEILING: f32 = 1.5;
pub const SUSTAIN_LEVEL: f32 = 0.8; // above this, release is slow
pub const SLOW_RELEASE_RATE: f32 = 0.1;
pub const FAST_RELEASE_RATE: f32 = 0.5;
pub const HIT_HIGH: f32 = 0.6;
pub const HIT_LOW: f32 = 0.5;
pub const HIT_RISE_RATIO: f32 = 1.1;
pub const HIT_REFRACTORY_SEC: f32 = 0.15;
pub const ORGANIC_NOISE_DEPTH: f32 = 0.05;

// Path
pub const PATH_XZ_SPREAD: f32 = 200.0;
pub const PATH_Y_JITTER: f32 = 100.0;
pub const PATH_ORIGIN: [f32; 3] = [0.0, -400.0, 0.0];
pub const PATH_TERMINUS: [f32; 3] = [0.0, 400.0, 0.0];

// Particles
pub const PARTICLE_DELAY_STEP: f32 = 0.01; // clock units between consecutive particle launches
pub const PARTICLE_MIN_DURATION: f32 = 40.0;
pub const PARTICLE_MAX_DURATION: f32 = 600.0;
pub const PIVOT_MAX: f32 = 2.0;
pub const SPIN_TURNS_MIN: f32 = 12.0; // rotation angle = PI * U(min, max)
pub const SPIN_TURNS_MAX: f32 = 24.0;
pub const HEAD_BLEND_START: f32 = 0.6;
pub const HEAD_BLEND_END: f32 = 0.95;
pub const HEAD_RADIUS_ATTENUATION: f32 = 0.7;
pub const FORMATION_SAMPLE_STRIDE: usize = 997; // prime stride over particle indices

// Mapper
pub const SEGMENT_DELAY: f32 = 0.5; // clock units between synthetic path segments
pub const PASS_WEIGHTS: [f32; 4] = [1.0, 1.0, 0.7, 0.7]; // forward, reverse, forward, reverse
pub const BIN_FALLBACK_MULTIPLIER: f32 = 0.8;
pub const BIN_JITTER: f32 = 0.05;
pub const HIT_AMPLIFICATION: f32 = 1.3;
pub const SUB_BASS_RADIUS_BOOST: f32 = 120.0; // additive, times band energy squared
pub const RADIUS_JITTER: f32 = 0.5;
pub const RADIUS_HIT_SPIKE_MIN: f32 = 1.2;
pub const RADIUS_HIT_SPIKE_MAX: f32 = 1.3;
pub const RADIUS_HIT_SPIKE_CHANCE: f64 = 0.5;
pub const SHAKE_PHASE_MULTIPLIERS: [f32; 3] = [17.3, 23.1, 29.7];
pub const SHAKE_HIT_MULTIPLIER: f32 = 1.5;
pub const ROTATION_PHASE_SPEED: f32 = 2.0; // radians per second
pub const ROTATION_INDEX_STEP: f32 = 0.1;
pub const ROTATION_HIT_MULTIPLIER_MIN: f32 = 2.0;
pub const ROTATION_HIT_MULTIPLIER_MAX: f32 = 3.0;
pub const SCALAR_JITTER: f32 = 0.02;
pub const PARTICLE_SCALE_EASE: f32 = 0.25;
pub const SCALE_SUB_BASS_BOOST: f32 = 1.5;
pub const BASE_ROTATION_SPEED: f32 = 2.0;
pub const HIT_KICK_WINDOW_SEC: f32 = 0.5;
pub const HIT_KICK_MIN: f32 = 10.0;
pub const HIT_KICK_MAX: f32 = 20.0;
pub const LIGHT_EXPONENTS: [f32; 3] = [2.0, 3.0, 3.0];
pub const FLICKER_CALM: (f32, f32) = (0.9, 1.1);
pub const FLICKER_HIT: (f32, f32) = (0.6, 1.6);
pub const COLOR_SHIFT_THRESHOLD: f32 = 0.5;
pub const IDLE_EASE: f32 = 0.1; // scale/roundness return to rest while idle

// Chromatic aberration
pub const ABERRATION_TRACER_SHARE: f32 = 0.8;
pub const ABERRATION_TRACER_DECAY: f32 = 0.92; // per 60 Hz frame
pub const ABERRATION_TRACER_FLOOR: f32 = 1e-4;
pub const ABERRATION_IDLE_DECAY: f32 = 0.9; // per 60 Hz frame
pub const ABERRATION_HIT_HOLD_SEC: f32 = 0.2; // slower easing after a hit
pub const ABERRATION_DIRECTION_EASE: f32 = 0.1;

// Camera
pub const DISTANCE_EASE: f32 = 0.05;
pub const AUTO_ROTATE_RAD_PER_SEC_PER_UNIT: f32 = std::f32::consts::TAU / 60.0; // speed 2 = 30 s/orbit

// Status
pub const STATUS_EVERY_FRAMES: u32 = 30;

/// Convert a per-frame easing factor tuned at [`REFERENCE_FPS`] into the
/// factor for an arbitrary `dt_sec`.
#[inline]
pub fn ease_factor(rate_per_frame: f32, dt_sec: f32) -> f32 {
    1.0 - (1.0 - rate_per_frame.clamp(0.0, 1.0)).powf(dt_sec * REFERENCE_FPS)
}

/// Per-frame multiplicative decay (e.g. `0.92`) rescaled to `dt_sec`.
#[inline]
pub fn decay_factor(decay_per_frame: f32, dt_sec: f32) -> f32 {
    decay_per_frame.clamp(0.0, 1.0).powf(dt_sec * REFERENCE_FPS)
}
