//! Fixed-size pool of transient "shooting star" sprites spawned off the
//! formed head by high-frequency energy.

use glam::Vec3;
use rand::Rng;

use crate::config::StarTuning;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ShootingStar {
    pub active: bool,
    pub age: f32,
    pub lifetime: f32,
    pub position: Vec3,
    pub direction: Vec3,
    pub speed: f32,
    pub intensity: f32,
    pub opacity: f32,
}

/// Audio inputs relevant to spawning.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StarDrive {
    pub high_mid: f32,
    pub high: f32,
    pub combined: f32,
    pub formation: f32,
}

pub struct ShootingStarPool {
    stars: Vec<ShootingStar>,
    max_active: usize,
    active: usize,
    since_spawn: f32,
    spawned_total: u64,
}

impl ShootingStarPool {
    pub fn new(pool_size: usize, max_active: usize) -> Self {
        Self {
            stars: vec![ShootingStar::default(); pool_size],
            max_active: max_active.min(pool_size),
            active: 0,
            since_spawn: f32::INFINITY,
            spawned_total: 0,
        }
    }

    pub fn stars(&self) -> &[ShootingStar] {
        &self.stars
    }

    pub fn capacity(&self) -> usize {
        self.stars.len()
    }

    pub fn max_active(&self) -> usize {
        self.max_active
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    /// Whether the audio and formation state call for a spawn this frame,
    /// ignoring the rate limit.
    pub fn wants_spawn(drive: &StarDrive, tuning: &StarTuning) -> bool {
        tuning.enabled
            && drive.formation >= tuning.formation_threshold
            && (drive.high_mid >= tuning.high_mid_threshold || drive.high >= tuning.high_threshold)
            && drive.combined >= tuning.combined_threshold
    }

    /// Claim the first inactive slot. No-op when the active cap is reached.
    pub fn spawn<R: Rng + ?Sized>(&mut self, drive: &StarDrive, tuning: &StarTuning, rng: &mut R) -> Option<usize> {
        if self.active >= self.max_active {
            return None;
        }
        let slot = self.stars.iter().position(|s| !s.active)?;

        // upper-hemisphere biased direction around the head centre
        let mut dir = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        )
        .try_normalize()
        .unwrap_or(Vec3::Y);
        dir.y = dir.y.abs() * 0.8 + 0.2;
        let dir = dir.normalize();

        let intensity = (drive.high_mid + drive.high).clamp(0.0, 1.0);
        let (lo, hi) = tuning.lifetime_jitter;
        let jitter = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
        let star = &mut self.stars[slot];
        *star = ShootingStar {
            active: true,
            age: 0.0,
            lifetime: tuning.base_lifetime_sec * jitter,
            position: tuning.head_center + dir * tuning.spawn_radius,
            direction: dir,
            speed: tuning.base_speed * (0.5 + intensity),
            intensity,
            opacity: tuning.base_opacity * intensity,
        };
        self.active += 1;
        self.spawned_total += 1;
        self.since_spawn = 0.0;
        Some(slot)
    }

    /// Advance the pool by one frame: maybe spawn, then integrate and fade.
    pub fn update<R: Rng + ?Sized>(&mut self, drive: &StarDrive, tuning: &StarTuning, dt_sec: f32, rng: &mut R) {
        self.since_spawn += dt_sec;
        if Self::wants_spawn(drive, tuning) && self.since_spawn >= tuning.min_interval_sec {
            if let Some(slot) = self.spawn(drive, tuning, rng) {
                log::debug!("[stars] spawned slot {} ({} active)", slot, self.active);
            }
        }

        for star in self.stars.iter_mut().filter(|s| s.active) {
            star.position += star.direction * star.speed * dt_sec;
            star.age += dt_sec;
            let ratio = star.age / star.lifetime.max(f32::EPSILON);
            if ratio >= 1.0 {
                star.active = false;
                star.opacity = 0.0;
                self.active -= 1;
            } else {
                star.opacity =
                    tuning.base_opacity * star.intensity * (1.0 - ratio).powf(tuning.fade_rate);
            }
        }
    }

    /// Playback stopped: drop every star immediately.
    pub fn deactivate_all(&mut self) {
        if self.active == 0 {
            return;
        }
        for star in self.stars.iter_mut() {
            star.active = false;
            star.opacity = 0.0;
        }
        self.active = 0;
    }
}
