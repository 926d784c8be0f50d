//! Orbit camera driven by batched pointer/wheel input plus audio-driven
//! auto-rotation.

use glam::Vec3;
use smallvec::SmallVec;

use crate::config::{CameraTuning, OrbitMode};
use crate::constants::{ease_factor, AUTO_ROTATE_RAD_PER_SEC_PER_UNIT, DISTANCE_EASE};

/// Raw input collected between ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraInput {
    DragStart,
    /// Pointer movement in CSS pixels while dragging.
    DragMove { dx: f32, dy: f32 },
    DragEnd,
    /// Normalised wheel delta; positive zooms out.
    Wheel { delta: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
    pub distance: f32,
    pub azimuth: f32,
    pub polar: f32,
}

pub struct CameraRig {
    tuning: CameraTuning,
    queue: SmallVec<[CameraInput; 8]>,
    dragging: bool,
    distance: f32,
    target_distance: f32,
    azimuth: f32,
    polar: f32,
    target: Vec3,
}

impl CameraRig {
    pub fn new(tuning: CameraTuning, target: Vec3) -> Self {
        let polar = tuning.initial_polar.clamp(tuning.min_polar, tuning.max_polar);
        Self {
            distance: tuning.initial_distance,
            target_distance: tuning.initial_distance,
            azimuth: 0.0,
            polar,
            queue: SmallVec::new(),
            dragging: false,
            target,
            tuning,
        }
    }

    pub fn push_input(&mut self, input: CameraInput) {
        self.queue.push(input);
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn target_distance(&self) -> f32 {
        self.target_distance
    }

    /// Drain queued input, advance auto-rotation and zoom easing, and return
    /// the resulting pose. `auto_rotate_speed` is the mapper's output.
    pub fn update(&mut self, dt_sec: f32, auto_rotate_speed: f32) -> CameraPose {
        let t = &self.tuning;
        for input in self.queue.drain(..) {
            match input {
                CameraInput::DragStart => self.dragging = true,
                CameraInput::DragEnd => self.dragging = false,
                CameraInput::DragMove { dx, dy } => {
                    if self.dragging {
                        self.azimuth -= dx * t.drag_sensitivity;
                        self.polar = (self.polar - dy * t.drag_sensitivity).clamp(t.min_polar, t.max_polar);
                    }
                }
                CameraInput::Wheel { delta } => {
                    self.target_distance = (self.target_distance + delta * t.zoom_sensitivity)
                        .clamp(t.min_distance, t.max_distance);
                }
            }
        }

        if !self.dragging {
            self.azimuth += auto_rotate_speed * AUTO_ROTATE_RAD_PER_SEC_PER_UNIT * dt_sec;
        }
        self.azimuth = self.azimuth.rem_euclid(std::f32::consts::TAU);
        self.distance += (self.target_distance - self.distance) * ease_factor(DISTANCE_EASE, dt_sec);

        self.pose()
    }

    pub fn pose(&self) -> CameraPose {
        let r = self.distance;
        let offset = match self.tuning.mode {
            OrbitMode::Flat => Vec3::new(self.azimuth.sin() * r, 0.0, self.azimuth.cos() * r),
            OrbitMode::Spherical => Vec3::new(
                r * self.polar.sin() * self.azimuth.sin(),
                r * self.polar.cos(),
                r * self.polar.sin() * self.azimuth.cos(),
            ),
        };
        CameraPose {
            position: self.target + offset,
            target: self.target,
            distance: self.distance,
            azimuth: self.azimuth,
            polar: self.polar,
        }
    }
}
