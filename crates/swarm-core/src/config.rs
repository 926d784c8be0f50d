//! Preset-driven configuration for the swarm engine.
//!
//! Every visual variant is one [`SwarmConfig`] built from a [`Preset`]; the
//! engine itself carries no per-variant branches. Presets can be tweaked
//! field by field before [`SwarmConfig::validate`] is called.

use glam::Vec3;

use crate::constants::*;
use crate::error::ConfigError;
use crate::spectrum::Band;

/// Named visual variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    /// Three bands, short path, flat orbit camera.
    Ribbon,
    /// Five bands, long path, spherical camera.
    Swarm,
    /// Five bands converging onto a head mesh, with shooting stars.
    Head,
}

/// One analysed frequency band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandSpec {
    pub band: Band,
    /// Inclusive upper edge in Hz; `f32::INFINITY` for the last band.
    pub upper_hz: f32,
    /// Weight applied to the band average.
    pub intensity: f32,
    /// Share of the visible progress window assigned to this band.
    pub section_weight: f32,
}

impl BandSpec {
    pub const fn new(band: Band, upper_hz: f32, intensity: f32, section_weight: f32) -> Self {
        Self {
            band,
            upper_hz,
            intensity,
            section_weight,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapperTuning {
    pub radius_power: f32,
    pub radius_multiplier: f32,
    pub shake_intensity: f32,
    pub rotation_intensity: f32,
    pub roundness_multiplier: f32,
    pub scale_max: f32,
    pub rotation_speed_max: f32,
    pub light_multiplier: f32,
    /// Window used when no synthetic segment is in flight.
    pub fallback_window: (f32, f32),
    /// Average travel time of a synthetic segment, in clock units.
    pub avg_duration: f32,
    pub segment_delay: f32,
    /// Per-band weights for the blended particle-scale target.
    pub scale_weights: [f32; 5],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AberrationTuning {
    /// Maximum strength per mode: subtle, normal, intense, glitch.
    pub mode_max: [f32; 4],
    /// Per-frame easing toward the target per mode.
    pub mode_ease: [f32; 4],
    pub overall_share: f32,
    pub hit_multiplier: f32,
    pub breathing_amplitude: f32,
    pub breathing_speed: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarTuning {
    pub enabled: bool,
    pub pool_size: usize,
    pub max_active: usize,
    pub formation_threshold: f32,
    pub high_mid_threshold: f32,
    pub high_threshold: f32,
    pub combined_threshold: f32,
    pub min_interval_sec: f32,
    pub head_center: Vec3,
    pub spawn_radius: f32,
    pub base_speed: f32,
    pub base_lifetime_sec: f32,
    pub lifetime_jitter: (f32, f32),
    pub base_opacity: f32,
    pub fade_rate: f32,
}

/// How orbit angles become a camera position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrbitMode {
    /// Azimuth only, camera stays on the y = 0 plane.
    Flat,
    /// Azimuth plus clamped polar angle.
    Spherical,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraTuning {
    pub mode: OrbitMode,
    pub initial_distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub zoom_sensitivity: f32,
    pub drag_sensitivity: f32,
    pub initial_polar: f32,
    pub min_polar: f32,
    pub max_polar: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightPalette {
    pub positions: [Vec3; 3],
    /// Colours while the sub-bass is calm.
    pub base: [Vec3; 3],
    /// Red/gold colours blended in above the shift threshold.
    pub shifted: [Vec3; 3],
}

/// Static transform applied to head-mesh vertices before sampling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeadTransform {
    pub scale: f32,
    pub y_offset: f32,
    pub x_rotation: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwarmConfig {
    pub preset: Preset,
    pub seed: u64,
    pub path_len: usize,
    pub particle_count: usize,
    pub bands: Vec<BandSpec>,
    pub particle_delay_step: f32,
    pub duration_range: (f32, f32),
    pub path_origin: Vec3,
    pub path_terminus: Vec3,
    pub mapper: MapperTuning,
    pub aberration: AberrationTuning,
    pub stars: StarTuning,
    pub camera: CameraTuning,
    pub lights: LightPalette,
    pub head: Option<HeadTransform>,
}

const RED: Vec3 = Vec3::new(1.0, 0.0, 0.0);
const GOLD: Vec3 = Vec3::new(1.0, 0.72, 0.2);
const DEEP_RED: Vec3 = Vec3::new(0.8, 0.05, 0.02);
const AMBER: Vec3 = Vec3::new(1.0, 0.45, 0.05);

impl SwarmConfig {
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Ribbon => Self::ribbon(),
            Preset::Swarm => Self::swarm(),
            Preset::Head => Self::head(),
        }
    }

    fn ribbon() -> Self {
        Self {
            preset: Preset::Ribbon,
            seed: 7,
            path_len: 128,
            particle_count: 20_000,
            bands: vec![
                BandSpec::new(Band::SubBass, 250.0, 1.0, 0.4),
                BandSpec::new(Band::LowMid, 500.0, 1.2, 0.3),
                BandSpec::new(Band::High, f32::INFINITY, 1.5, 0.3),
            ],
            particle_delay_step: PARTICLE_DELAY_STEP,
            duration_range: (PARTICLE_MIN_DURATION, PARTICLE_MAX_DURATION),
            path_origin: Vec3::from_array(PATH_ORIGIN),
            path_terminus: Vec3::from_array(PATH_TERMINUS),
            mapper: MapperTuning {
                radius_power: 2.0,
                radius_multiplier: 25.0,
                shake_intensity: 6.0,
                rotation_intensity: 0.6,
                roundness_multiplier: 1.5,
                scale_max: 2.0,
                rotation_speed_max: 8.0,
                light_multiplier: 1.6,
                fallback_window: (0.0, 0.3),
                avg_duration: (PARTICLE_MIN_DURATION + PARTICLE_MAX_DURATION) * 0.5,
                segment_delay: SEGMENT_DELAY,
                scale_weights: [0.5, 0.0, 0.3, 0.0, 0.2],
            },
            aberration: default_aberration(),
            stars: StarTuning {
                enabled: false,
                ..default_stars()
            },
            camera: CameraTuning {
                mode: OrbitMode::Flat,
                initial_distance: 900.0,
                min_distance: 200.0,
                max_distance: 2000.0,
                zoom_sensitivity: 0.5,
                drag_sensitivity: 0.005,
                initial_polar: std::f32::consts::FRAC_PI_2,
                min_polar: std::f32::consts::FRAC_PI_2,
                max_polar: std::f32::consts::FRAC_PI_2,
            },
            lights: LightPalette {
                positions: default_light_positions(),
                // light 3 stays black in the calm branch for this variant
                base: [RED, RED, Vec3::ZERO],
                shifted: [DEEP_RED, GOLD, AMBER],
            },
            head: None,
        }
    }

    fn swarm() -> Self {
        Self {
            preset: Preset::Swarm,
            seed: 77,
            path_len: 256,
            particle_count: 77_777,
            bands: five_bands(),
            particle_delay_step: PARTICLE_DELAY_STEP,
            duration_range: (PARTICLE_MIN_DURATION, PARTICLE_MAX_DURATION),
            path_origin: Vec3::from_array(PATH_ORIGIN),
            path_terminus: Vec3::from_array(PATH_TERMINUS),
            mapper: MapperTuning {
                radius_power: 1.5,
                radius_multiplier: 30.0,
                shake_intensity: 8.0,
                rotation_intensity: 0.8,
                roundness_multiplier: 2.0,
                scale_max: 2.5,
                rotation_speed_max: 10.0,
                light_multiplier: 1.8,
                fallback_window: (0.0, 0.5),
                avg_duration: (PARTICLE_MIN_DURATION + PARTICLE_MAX_DURATION) * 0.5,
                segment_delay: SEGMENT_DELAY,
                scale_weights: [0.4, 0.25, 0.15, 0.1, 0.1],
            },
            aberration: default_aberration(),
            stars: StarTuning {
                enabled: false,
                ..default_stars()
            },
            camera: CameraTuning {
                mode: OrbitMode::Spherical,
                initial_distance: 1100.0,
                min_distance: 250.0,
                max_distance: 2500.0,
                zoom_sensitivity: 0.6,
                drag_sensitivity: 0.005,
                initial_polar: 1.2,
                min_polar: 0.2,
                max_polar: 2.9,
            },
            lights: LightPalette {
                positions: default_light_positions(),
                base: [RED, RED, RED],
                shifted: [DEEP_RED, GOLD, AMBER],
            },
            head: None,
        }
    }

    fn head() -> Self {
        Self {
            preset: Preset::Head,
            seed: 4242,
            particle_count: 100_000,
            stars: default_stars(),
            head: Some(HeadTransform {
                scale: 120.0,
                y_offset: 400.0,
                x_rotation: -std::f32::consts::FRAC_PI_2,
            }),
            ..Self::swarm()
        }
    }

    /// Number of configured bands.
    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path_len < 4 {
            return Err(ConfigError::PathTooShort(self.path_len));
        }
        if self.particle_count == 0 {
            return Err(ConfigError::NoParticles);
        }
        if self.bands.is_empty() {
            return Err(ConfigError::NoBands);
        }
        if !(2..=5).contains(&self.bands.len()) {
            return Err(ConfigError::BandCount(self.bands.len()));
        }
        let mut prev = 0.0_f32;
        for (index, spec) in self.bands.iter().enumerate() {
            if self.bands[..index].iter().any(|b| b.band == spec.band) {
                return Err(ConfigError::DuplicateBand(spec.band));
            }
            if spec.upper_hz <= prev {
                return Err(ConfigError::BandEdgeOrder {
                    index,
                    hz: spec.upper_hz,
                });
            }
            if !(spec.section_weight > 0.0) {
                return Err(ConfigError::SectionWeightValue);
            }
            prev = spec.upper_hz;
        }
        let (min, max) = self.duration_range;
        if !(min > 0.0 && max >= min) {
            return Err(ConfigError::DurationRange { min, max });
        }
        let (lo, hi) = self.mapper.fallback_window;
        if !(lo >= 0.0 && hi <= 1.0 && hi > lo) {
            return Err(ConfigError::FallbackWindow { min: lo, max: hi });
        }
        if self.stars.max_active > self.stars.pool_size {
            return Err(ConfigError::StarCap {
                cap: self.stars.max_active,
                pool: self.stars.pool_size,
            });
        }
        let base = self.stars.base_lifetime_sec;
        let (lo, hi) = self.stars.lifetime_jitter;
        if !(base > 0.0 && base.is_finite() && lo > 0.0 && hi.is_finite() && hi >= lo) {
            return Err(ConfigError::StarLifetime { base, lo, hi });
        }
        Ok(())
    }
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Swarm)
    }
}

fn five_bands() -> Vec<BandSpec> {
    vec![
        BandSpec::new(Band::SubBass, 60.0, 1.0, 0.1),
        BandSpec::new(Band::LowBass, 250.0, 1.0, 0.3),
        BandSpec::new(Band::LowMid, 500.0, 1.1, 0.2),
        BandSpec::new(Band::HighMid, 2000.0, 1.3, 0.2),
        BandSpec::new(Band::High, f32::INFINITY, 1.6, 0.2),
    ]
}

fn default_aberration() -> AberrationTuning {
    AberrationTuning {
        mode_max: [0.002, 0.005, 0.01, 0.02],
        mode_ease: [0.05, 0.1, 0.2, 0.35],
        overall_share: 0.3,
        hit_multiplier: 1.5,
        breathing_amplitude: 0.0005,
        breathing_speed: 1.5,
    }
}

fn default_stars() -> StarTuning {
    StarTuning {
        enabled: true,
        pool_size: 2000,
        max_active: 2000,
        formation_threshold: 0.9,
        high_mid_threshold: 0.3,
        high_threshold: 0.25,
        combined_threshold: 0.2,
        min_interval_sec: 0.05,
        head_center: Vec3::new(0.0, 400.0, 0.0),
        spawn_radius: 160.0,
        base_speed: 300.0,
        base_lifetime_sec: 1.2,
        lifetime_jitter: (0.6, 1.4),
        base_opacity: 0.9,
        fade_rate: 1.5,
    }
}

fn default_light_positions() -> [Vec3; 3] {
    [
        Vec3::new(300.0, 200.0, 300.0),
        Vec3::new(-300.0, 0.0, -200.0),
        Vec3::new(0.0, 500.0, 100.0),
    ]
}
