//! Attack/decay smoothing and onset ("hit") detection per band.

use crate::constants::*;
use crate::spectrum::{Band, BandEnergies, BAND_COUNT};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvelopeParams {
    pub onset_threshold: f32,
    pub onset_gain: f32,
    pub ceiling: f32,
    pub sustain_level: f32,
    pub slow_release: f32,
    pub fast_release: f32,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            onset_threshold: ONSET_THRESHOLD,
            onset_gain: ONSET_GAIN,
            ceiling: ENVELOPE_CEILING,
            sustain_level: SUSTAIN_LEVEL,
            slow_release: SLOW_RELEASE_RATE,
            fast_release: FAST_RELEASE_RATE,
        }
    }
}

/// Per-band envelope state. Reset at stream start, never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnvelopeState {
    pub raw_value: f32,
    pub smoothed_value: f32,
    pub previous_raw_value: f32,
    pub peak_value: f32,
    pub peak_time: f32,
    pub last_hit_time: Option<f32>,
}

impl EnvelopeState {
    /// Advance the envelope by one frame.
    ///
    /// A rise above the previous smoothed value snaps to `raw` exactly. A
    /// sharp rise that stays below the held envelope re-punches it by
    /// `delta * gain` up to the ceiling. Otherwise the envelope releases
    /// toward `raw`, slowly while above the sustain level.
    pub fn update(&mut self, raw: f32, dt_sec: f32, params: &EnvelopeParams) -> f32 {
        let delta = raw - self.previous_raw_value;
        if raw > self.smoothed_value {
            self.smoothed_value = raw;
        } else if delta > params.onset_threshold {
            self.smoothed_value =
                (self.smoothed_value + delta * params.onset_gain).min(params.ceiling);
        } else {
            let rate = if self.smoothed_value > params.sustain_level {
                params.slow_release
            } else {
                params.fast_release
            };
            let k = ease_factor(rate, dt_sec);
            self.smoothed_value = self.smoothed_value * (1.0 - k) + raw * k;
        }
        self.raw_value = raw;
        self.previous_raw_value = raw;
        self.smoothed_value
    }
}

/// Rising-edge detector over a high/low hysteresis pair, optionally gated
/// by a rise ratio against the previous raw value and a refractory period.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitDetector {
    pub high: f32,
    pub low: f32,
    pub rise_ratio: Option<f32>,
    pub refractory_sec: Option<f32>,
    previous_value: f32,
    last_hit: Option<f32>,
}

impl HitDetector {
    /// Hysteresis only.
    pub const fn simple(high: f32, low: f32) -> Self {
        Self {
            high,
            low,
            rise_ratio: None,
            refractory_sec: None,
            previous_value: 0.0,
            last_hit: None,
        }
    }

    /// Hysteresis plus rise-ratio and refractory gating.
    pub const fn gated(high: f32, low: f32, rise_ratio: f32, refractory_sec: f32) -> Self {
        Self {
            high,
            low,
            rise_ratio: Some(rise_ratio),
            refractory_sec: Some(refractory_sec),
            previous_value: 0.0,
            last_hit: None,
        }
    }

    /// Feed one sample; `previous_raw` is the raw value of the prior frame.
    pub fn detect(&mut self, value: f32, previous_raw: f32, now_sec: f32) -> bool {
        let mut hit = value > self.high && self.previous_value < self.low;
        if let Some(ratio) = self.rise_ratio {
            hit &= value > previous_raw * ratio;
        }
        if let (Some(refractory), Some(last)) = (self.refractory_sec, self.last_hit) {
            hit &= now_sec - last >= refractory;
        }
        // a suppressed crossing still re-arms only after dropping below `low`
        self.previous_value = value;
        if hit {
            self.last_hit = Some(now_sec);
        }
        hit
    }

    pub fn last_hit(&self) -> Option<f32> {
        self.last_hit
    }

    pub fn reset(&mut self) {
        self.previous_value = 0.0;
        self.last_hit = None;
    }
}

impl Default for HitDetector {
    fn default() -> Self {
        Self::gated(HIT_HIGH, HIT_LOW, HIT_RISE_RATIO, HIT_REFRACTORY_SEC)
    }
}

/// Self-proportional oscillation layered onto a display value.
#[inline]
pub fn organic_noise(value: f32, phase: f32, k: f32, seed: f32, m: f32) -> f32 {
    value + (phase * k + seed * m).sin() * ORGANIC_NOISE_DEPTH * value
}

// per-band phase and seed multipliers for `organic_noise`
const NOISE_K: [f32; BAND_COUNT] = [0.013, 0.017, 0.023, 0.029, 0.031];
const NOISE_M: [f32; BAND_COUNT] = [1.3, 2.1, 3.7, 5.3, 7.1];

/// What downstream effects see after one tracker step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnvelopeFrame {
    /// Clean smoothed values, used for hit decisions and thresholds.
    pub smoothed: [f32; BAND_COUNT],
    /// Smoothed values with organic noise, used for visual intensity.
    pub display: [f32; BAND_COUNT],
    pub hit: bool,
}

impl EnvelopeFrame {
    #[inline]
    pub fn smoothed(&self, band: Band) -> f32 {
        self.smoothed[band.index()]
    }

    #[inline]
    pub fn display(&self, band: Band) -> f32 {
        self.display[band.index()]
    }
}

/// Envelopes for every band plus the sub-bass hit detector.
#[derive(Clone, Debug)]
pub struct EnvelopeTracker {
    pub params: EnvelopeParams,
    states: [EnvelopeState; BAND_COUNT],
    detector: HitDetector,
    seed: f32,
}

impl EnvelopeTracker {
    pub fn new(params: EnvelopeParams, detector: HitDetector, seed: u64) -> Self {
        Self {
            params,
            states: [EnvelopeState::default(); BAND_COUNT],
            detector,
            seed: (seed % 10_000) as f32,
        }
    }

    pub fn state(&self, band: Band) -> &EnvelopeState {
        &self.states[band.index()]
    }

    pub fn last_hit_time(&self) -> Option<f32> {
        self.detector.last_hit()
    }

    pub fn reset(&mut self) {
        self.states = [EnvelopeState::default(); BAND_COUNT];
        self.detector.reset();
    }

    pub fn update(&mut self, energies: &BandEnergies, clock: f32, now_sec: f32, dt_sec: f32) -> EnvelopeFrame {
        let mut frame = EnvelopeFrame::default();

        let sub = Band::SubBass.index();
        let previous_raw = self.states[sub].previous_raw_value;
        frame.hit = self
            .detector
            .detect(energies.averages[sub], previous_raw, now_sec);

        for band in Band::ALL {
            let i = band.index();
            let raw = energies.averages[i];
            let state = &mut self.states[i];
            frame.smoothed[i] = state.update(raw, dt_sec, &self.params);
            frame.display[i] = organic_noise(frame.smoothed[i], clock, NOISE_K[i], self.seed, NOISE_M[i]);
        }

        if frame.hit {
            let state = &mut self.states[sub];
            state.last_hit_time = Some(now_sec);
            state.peak_value = state.raw_value;
            state.peak_time = now_sec;
        }
        frame
    }
}
