// Pure input helpers. No web-sys here so the host tests can include this file.
use swarm_core::{CameraInput, LifecycleSignal, Preset};

use crate::constants::{
    DRAG_DEADZONE_PX, WHEEL_LINE_PX, WHEEL_MAX_STEP, WHEEL_PAGE_PX, WHEEL_PX_PER_UNIT,
};

/// Convert a raw `WheelEvent` delta to camera zoom units.
#[inline]
pub fn normalize_wheel(delta_y: f64, delta_mode: u32) -> f32 {
    let px = match delta_mode {
        1 => delta_y as f32 * WHEEL_LINE_PX,
        2 => delta_y as f32 * WHEEL_PAGE_PX,
        _ => delta_y as f32,
    };
    if !px.is_finite() {
        return 0.0;
    }
    px.clamp(-WHEEL_MAX_STEP, WHEEL_MAX_STEP) / WHEEL_PX_PER_UNIT
}

/// Turns absolute pointer positions into relative drag input.
#[derive(Default, Clone, Copy, Debug)]
pub struct DragTracker {
    last: Option<(f32, f32)>,
    pointer_id: Option<i32>,
}

impl DragTracker {
    pub fn is_active(&self) -> bool {
        self.last.is_some()
    }

    pub fn begin(&mut self, pointer_id: i32, x: f32, y: f32) -> Option<CameraInput> {
        if self.pointer_id.is_some() {
            // second finger or button: keep following the first
            return None;
        }
        self.pointer_id = Some(pointer_id);
        self.last = Some((x, y));
        Some(CameraInput::DragStart)
    }

    pub fn move_to(&mut self, pointer_id: i32, x: f32, y: f32) -> Option<CameraInput> {
        if self.pointer_id != Some(pointer_id) {
            return None;
        }
        let (lx, ly) = self.last?;
        let (dx, dy) = (x - lx, y - ly);
        if dx.abs() < DRAG_DEADZONE_PX && dy.abs() < DRAG_DEADZONE_PX {
            return None;
        }
        self.last = Some((x, y));
        Some(CameraInput::DragMove { dx, dy })
    }

    pub fn end(&mut self, pointer_id: i32) -> Option<CameraInput> {
        if self.pointer_id != Some(pointer_id) {
            return None;
        }
        self.pointer_id = None;
        self.last = None;
        Some(CameraInput::DragEnd)
    }
}

/// Preset named by the canvas' `data-preset` attribute.
pub fn parse_preset(name: &str) -> Option<Preset> {
    match name.trim().to_ascii_lowercase().as_str() {
        "ribbon" => Some(Preset::Ribbon),
        "swarm" => Some(Preset::Swarm),
        "head" => Some(Preset::Head),
        _ => None,
    }
}

/// Play button label after a lifecycle signal.
#[inline]
pub fn button_label(signal: LifecycleSignal) -> &'static str {
    match signal {
        LifecycleSignal::Ready => "Play",
        LifecycleSignal::Playing => "Pause",
        LifecycleSignal::Ended => "Replay",
    }
}
