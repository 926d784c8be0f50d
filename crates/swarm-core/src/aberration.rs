//! Audio-driven chromatic aberration: a mode cascade, an eased primary
//! strength and a fast-decaying tracer spike launched on every hit.

use glam::Vec2;
use rand::Rng;

use crate::config::AberrationTuning;
use crate::constants::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AberrationMode {
    Subtle,
    Normal,
    Intense,
    Glitch,
}

impl AberrationMode {
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Threshold cascade, first match wins.
    pub fn select(sub_bass: f32, overall: f32, hit: bool) -> Self {
        if hit || sub_bass > 0.9 {
            Self::Glitch
        } else if sub_bass > 0.5 {
            Self::Intense
        } else if overall > 0.6 {
            Self::Normal
        } else {
            Self::Subtle
        }
    }

    #[inline]
    pub fn breathes(self) -> bool {
        matches!(self, Self::Subtle | Self::Normal)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AberrationInput {
    pub sub_bass: f32,
    pub overall: f32,
    /// Stereo position in [-1, 1].
    pub pan: f32,
    /// High-minus-low band balance in [-1, 1].
    pub balance: f32,
    pub hit: bool,
    pub since_hit_sec: Option<f32>,
    pub time_sec: f32,
    pub dt_sec: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChromaticAberrationState {
    pub strength: f32,
    pub target_strength: f32,
    pub tracer_value: f32,
    pub tracer_active: bool,
    pub direction: Vec2,
    pub mode: AberrationMode,
    tracer_launches: u32,
}

impl Default for ChromaticAberrationState {
    fn default() -> Self {
        Self {
            strength: 0.0,
            target_strength: 0.0,
            tracer_value: 0.0,
            tracer_active: false,
            direction: Vec2::X,
            mode: AberrationMode::Subtle,
            tracer_launches: 0,
        }
    }
}

impl ChromaticAberrationState {
    /// Final uniform strength: primary plus tracer.
    #[inline]
    pub fn output_strength(&self) -> f32 {
        self.strength + self.tracer_value
    }

    /// Number of tracer spikes launched since construction.
    pub fn tracer_launches(&self) -> u32 {
        self.tracer_launches
    }

    pub fn update<R: Rng + ?Sized>(&mut self, input: &AberrationInput, tuning: &AberrationTuning, rng: &mut R) {
        self.mode = AberrationMode::select(input.sub_bass, input.overall, input.hit);
        let m = self.mode.index();
        let mode_max = tuning.mode_max[m];

        let mut target = (mode_max * input.sub_bass + mode_max * tuning.overall_share * input.overall)
            .clamp(0.0, mode_max);
        if input.hit {
            target = mode_max * tuning.hit_multiplier;
        }
        if self.mode.breathes() {
            target += tuning.breathing_amplitude
                * (0.5 + 0.5 * (input.time_sec * tuning.breathing_speed).sin());
        }
        self.target_strength = target;

        let mut rate = tuning.mode_ease[m];
        if input.since_hit_sec.is_some_and(|s| s < ABERRATION_HIT_HOLD_SEC) {
            rate *= 0.5;
        }
        self.strength += (target - self.strength) * ease_factor(rate, input.dt_sec);

        if input.hit {
            self.tracer_value = target * ABERRATION_TRACER_SHARE;
            self.tracer_active = true;
            self.tracer_launches += 1;
        } else {
            self.decay_tracer(input.dt_sec);
        }

        if input.hit {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            self.direction = Vec2::from_angle(angle);
        } else {
            let aim = Vec2::new(input.pan, input.balance)
                .try_normalize()
                .unwrap_or(self.direction);
            let k = ease_factor(ABERRATION_DIRECTION_EASE, input.dt_sec);
            self.direction = self
                .direction
                .lerp(aim, k)
                .try_normalize()
                .unwrap_or(aim);
        }
    }

    /// Not playing: everything relaxes toward zero.
    pub fn idle(&mut self, dt_sec: f32) {
        self.mode = AberrationMode::Subtle;
        self.target_strength = 0.0;
        self.strength *= decay_factor(ABERRATION_IDLE_DECAY, dt_sec);
        self.decay_tracer(dt_sec);
    }

    fn decay_tracer(&mut self, dt_sec: f32) {
        if !self.tracer_active {
            return;
        }
        self.tracer_value *= decay_factor(ABERRATION_TRACER_DECAY, dt_sec);
        if self.tracer_value < ABERRATION_TRACER_FLOOR {
            self.tracer_value = 0.0;
            self.tracer_active = false;
        }
    }
}
