//! Per-frame mapping from band energies and hits to path-point arrays and
//! scalar uniforms.
//!
//! The mapper owns no per-path state of its own; it writes into a caller-
//! owned [`PathState`] and keeps only the few scalars that are eased frame
//! to frame (particle scale, roundness, rotation phase).

use std::ops::Range;

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::config::{BandSpec, LightPalette, MapperTuning};
use crate::constants::*;
use crate::envelope::EnvelopeFrame;
use crate::path::PathState;
use crate::spectrum::{band_bin_ranges, Band, BandEnergies, SpectrumSnapshot, BAND_COUNT};

/// Inclusive progress range of the swarm segments currently in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibleWindow {
    pub min: f32,
    pub max: f32,
    /// True when no segment was in flight and the fallback was used.
    pub fallback: bool,
}

impl VisibleWindow {
    #[inline]
    pub fn width(&self) -> f32 {
        self.max - self.min
    }

    #[inline]
    pub fn lerp(&self, f: f32) -> f32 {
        self.min + self.width() * f
    }
}

/// Scan `segments` synthetic segments launched `segment_delay` apart and take
/// the progress range of those strictly inside `(0, avg_duration)`.
pub fn visible_window(
    clock: f32,
    segments: usize,
    segment_delay: f32,
    avg_duration: f32,
    fallback: (f32, f32),
) -> VisibleWindow {
    let avg = avg_duration.max(f32::EPSILON);
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for s in 0..segments {
        let time_in_path = clock - s as f32 * segment_delay;
        if time_in_path > 0.0 && time_in_path < avg {
            let p = (time_in_path / avg).clamp(0.0, 1.0);
            min = min.min(p);
            max = max.max(p);
        }
    }
    if max - min > f32::EPSILON {
        VisibleWindow {
            min,
            max,
            fallback: false,
        }
    } else {
        VisibleWindow {
            min: fallback.0,
            max: fallback.1,
            fallback: true,
        }
    }
}

/// Upper progress bound of each band's section of the window, in layout
/// order, from the bands' relative section weights.
pub fn section_thresholds(window: &VisibleWindow, bands: &[BandSpec]) -> Vec<f32> {
    let total: f32 = bands.iter().map(|b| b.section_weight).sum::<f32>().max(f32::EPSILON);
    let mut acc = 0.0;
    bands
        .iter()
        .map(|b| {
            acc += b.section_weight;
            window.lerp(acc / total)
        })
        .collect()
}

/// Layout position of the section containing `progress`.
#[inline]
pub fn classify(progress: f32, thresholds: &[f32]) -> usize {
    thresholds
        .iter()
        .position(|&t| progress <= t)
        .unwrap_or(thresholds.len().saturating_sub(1))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightOutput {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

/// Scalar results of one mapper step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScalarUniforms {
    pub roundness: Vec2,
    pub particle_scale: f32,
    pub rotation_speed: f32,
    pub lights: [LightOutput; 3],
}

/// Inputs to one mapper step.
pub struct MapperFrame<'a, 'b> {
    pub clock: f32,
    pub now_sec: f32,
    pub dt_sec: f32,
    pub spectrum: &'a SpectrumSnapshot<'b>,
    pub energies: &'a BandEnergies,
    pub envelope: &'a EnvelopeFrame,
    pub since_hit_sec: Option<f32>,
}

pub struct FrameSignalMapper {
    tuning: MapperTuning,
    bands: Vec<BandSpec>,
    bin_ranges: Vec<Range<usize>>,
    ranges_shape: Option<(usize, f32)>,
    lights: LightPalette,
    segments: Vec<f32>,
    kick_sign: f32,
    section_sums: [f32; BAND_COUNT],
    section_counts: [u32; BAND_COUNT],
    particle_scale: f32,
    roundness: f32,
    rotation_phase: f32,
    window: VisibleWindow,
}

impl FrameSignalMapper {
    pub fn new(tuning: MapperTuning, bands: Vec<BandSpec>, lights: LightPalette) -> Self {
        let window = VisibleWindow {
            min: tuning.fallback_window.0,
            max: tuning.fallback_window.1,
            fallback: true,
        };
        Self {
            tuning,
            bands,
            bin_ranges: Vec::new(),
            ranges_shape: None,
            lights,
            segments: Vec::new(),
            kick_sign: 1.0,
            section_sums: [0.0; BAND_COUNT],
            section_counts: [0; BAND_COUNT],
            particle_scale: 1.0,
            roundness: 1.0,
            rotation_phase: 0.0,
            window,
        }
    }

    pub fn tuning(&self) -> &MapperTuning {
        &self.tuning
    }

    /// Window used by the most recent step.
    pub fn window(&self) -> VisibleWindow {
        self.window
    }

    /// Band of each path point for the current window.
    pub fn section_of(&self, index: usize, path_len: usize) -> Band {
        let thresholds = section_thresholds(&self.window, &self.bands);
        let p = self.window.lerp(index as f32 / path_len.max(1) as f32);
        self.bands[classify(p, &thresholds)].band
    }

    fn refresh_bin_ranges(&mut self, spectrum: &SpectrumSnapshot<'_>) {
        let shape = (spectrum.bin_count(), spectrum.sample_rate);
        if self.ranges_shape != Some(shape) {
            self.bin_ranges = band_bin_ranges(&self.bands, shape.0, shape.1);
            self.ranges_shape = Some(shape);
        }
    }

    /// Run one playing frame, overwriting every entry of `state`.
    pub fn map<R: Rng + ?Sized>(&mut self, frame: &MapperFrame<'_, '_>, state: &mut PathState, rng: &mut R) -> ScalarUniforms {
        self.refresh_bin_ranges(frame.spectrum);
        let path_len = state.len();
        let cap = (frame.spectrum.bin_count() / 2).max(1);
        let t = &self.tuning;

        self.window = visible_window(frame.clock, cap, t.segment_delay, t.avg_duration, t.fallback_window);
        let thresholds = section_thresholds(&self.window, &self.bands);
        let hit = frame.envelope.hit;

        // synthetic segment values, four passes over `cap` bins
        self.segments.clear();
        self.section_sums = [0.0; BAND_COUNT];
        self.section_counts = [0; BAND_COUNT];
        for (pass, weight) in PASS_WEIGHTS.iter().enumerate() {
            for k in 0..cap {
                let bin = if pass % 2 == 0 { k } else { cap - 1 - k };
                let slot = pass * cap + k;
                let progress = self.window.lerp((slot % path_len.max(1)) as f32 / path_len.max(1) as f32);
                let section = classify(progress, &thresholds);
                let spec = &self.bands[section];
                let in_band = self.bin_ranges.get(section).is_some_and(|r| r.contains(&bin));
                let mut v = if in_band {
                    frame.spectrum.bin(bin) * spec.intensity
                } else {
                    frame.energies.get(spec.band) * BIN_FALLBACK_MULTIPLIER
                };
                v *= 1.0 + rng.gen_range(-BIN_JITTER..BIN_JITTER);
                if hit && spec.band == Band::SubBass {
                    v *= HIT_AMPLIFICATION;
                }
                v *= weight;
                self.segments.push(v);
                let b = spec.band.index();
                self.section_sums[b] += v;
                self.section_counts[b] += 1;
            }
        }

        let sub = frame.envelope.display(Band::SubBass);
        let sub_clean = frame.envelope.smoothed(Band::SubBass);
        let shake_phase = frame.clock;
        self.rotation_phase = (self.rotation_phase + ROTATION_PHASE_SPEED * frame.dt_sec)
            .rem_euclid(std::f32::consts::TAU);

        for i in 0..path_len {
            let progress = self.window.lerp(i as f32 / path_len as f32);
            let section = classify(progress, &thresholds);
            let spec = &self.bands[section];
            let band = spec.band;
            let value = match self.segments.get(i) {
                Some(&v) => v,
                None => {
                    let n = self.section_counts[band.index()].max(1) as f32;
                    self.section_sums[band.index()] / n
                }
            };

            let norm = (value / spec.intensity.max(1.0)).clamp(0.0, 1.0);
            let wobble = (frame.clock * 0.05 + i as f32 * 0.37).sin() * 0.01;
            let mut radius = (norm + wobble).clamp(0.0, 1.0).powf(t.radius_power) * t.radius_multiplier
                + rng.gen_range(0.0..RADIUS_JITTER);
            let energy = frame.envelope.display(band);
            if band == Band::SubBass {
                radius += energy * energy * SUB_BASS_RADIUS_BOOST;
                if hit && rng.gen_bool(RADIUS_HIT_SPIKE_CHANCE) {
                    radius *= rng.gen_range(RADIUS_HIT_SPIKE_MIN..RADIUS_HIT_SPIKE_MAX);
                }

                let fi = i as f32;
                let mut shake = Vec3::new(
                    (shake_phase * SHAKE_PHASE_MULTIPLIERS[0] + fi).sin(),
                    (shake_phase * SHAKE_PHASE_MULTIPLIERS[1] + fi * 1.3).sin(),
                    (shake_phase * SHAKE_PHASE_MULTIPLIERS[2] + fi * 0.7).sin(),
                ) * (sub * t.shake_intensity * rng.gen_range(-0.5..0.5));
                let mut rotation =
                    (self.rotation_phase + fi * ROTATION_INDEX_STEP).sin() * sub * t.rotation_intensity;
                if hit {
                    shake *= SHAKE_HIT_MULTIPLIER;
                    rotation *= rng.gen_range(ROTATION_HIT_MULTIPLIER_MIN..ROTATION_HIT_MULTIPLIER_MAX);
                }
                state.shake[i] = shake;
                state.rotation[i] = rotation;
            } else {
                state.shake[i] = Vec3::ZERO;
                state.rotation[i] = 0.0;
            }
            state.radius[i] = radius.max(0.0);
            state.pan[i] = (frame.energies.pan(band) * energy).clamp(-1.0, 1.0);
        }

        self.scalars(frame, sub, sub_clean, rng)
    }

    fn scalars<R: Rng + ?Sized>(&mut self, frame: &MapperFrame<'_, '_>, sub: f32, sub_clean: f32, rng: &mut R) -> ScalarUniforms {
        let t = &self.tuning;
        let hit = frame.envelope.hit;

        let roundness_target = t.roundness_multiplier * sub * sub + 1.0 + rng.gen_range(-SCALAR_JITTER..SCALAR_JITTER);
        self.roundness = roundness_target;

        let weighted: f32 = Band::ALL
            .iter()
            .map(|b| t.scale_weights[b.index()] * frame.envelope.display(*b))
            .sum();
        let scale_target = (1.0 + weighted * (t.scale_max - 1.0))
            .max(1.0 + sub * (t.scale_max - 1.0) * SCALE_SUB_BASS_BOOST)
            + rng.gen_range(-SCALAR_JITTER..SCALAR_JITTER);
        self.particle_scale += (scale_target - self.particle_scale) * ease_factor(PARTICLE_SCALE_EASE, frame.dt_sec);

        let mut rotation_speed = BASE_ROTATION_SPEED + sub * t.rotation_speed_max
            + rng.gen_range(-SCALAR_JITTER..SCALAR_JITTER);
        // one direction per hit, held for the whole kick window
        if hit {
            self.kick_sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        }
        if frame.since_hit_sec.is_some_and(|s| s < HIT_KICK_WINDOW_SEC) {
            rotation_speed += self.kick_sign * rng.gen_range(HIT_KICK_MIN..HIT_KICK_MAX);
        }

        let (lo, hi) = if hit { FLICKER_HIT } else { FLICKER_CALM };
        let shifted = sub_clean > COLOR_SHIFT_THRESHOLD;
        let shift_amount = ((sub_clean - COLOR_SHIFT_THRESHOLD) * 2.0).clamp(0.0, 1.0);
        let lights = std::array::from_fn(|k| {
            let flicker = rng.gen_range(lo..hi);
            let color = if shifted {
                self.lights.base[k].lerp(self.lights.shifted[k], shift_amount)
            } else {
                self.lights.base[k]
            };
            LightOutput {
                position: self.lights.positions[k],
                color,
                intensity: (sub * t.light_multiplier).max(0.0).powf(LIGHT_EXPONENTS[k]) * flicker,
            }
        });

        ScalarUniforms {
            roundness: Vec2::new(self.roundness, 1.0),
            particle_scale: self.particle_scale,
            rotation_speed,
            lights,
        }
    }

    /// Not playing: arrays to zero, scalars ease back to rest.
    pub fn idle(&mut self, state: &mut PathState, dt_sec: f32) -> ScalarUniforms {
        state.reset();
        let k = ease_factor(IDLE_EASE, dt_sec);
        self.particle_scale += (1.0 - self.particle_scale) * k;
        self.roundness += (1.0 - self.roundness) * k;
        self.window = VisibleWindow {
            min: self.tuning.fallback_window.0,
            max: self.tuning.fallback_window.1,
            fallback: true,
        };
        ScalarUniforms {
            roundness: Vec2::new(self.roundness, 1.0),
            particle_scale: self.particle_scale,
            rotation_speed: BASE_ROTATION_SPEED,
            lights: std::array::from_fn(|k| LightOutput {
                position: self.lights.positions[k],
                color: self.lights.base[k],
                intensity: 0.0,
            }),
        }
    }

    pub fn particle_scale(&self) -> f32 {
        self.particle_scale
    }

    pub fn kick_sign(&self) -> f32 {
        self.kick_sign
    }

    /// Back to rest values at the start of a stream.
    pub fn reset(&mut self) {
        self.kick_sign = 1.0;
        self.particle_scale = 1.0;
        self.roundness = 1.0;
        self.rotation_phase = 0.0;
    }
}
