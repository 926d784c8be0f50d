// Browser-side tuning: analyser setup, DOM element ids and input scaling.
// Shared animation constants live in `swarm_core::constants`; these only
// concern how the page feeds the core.

// Analyser: 2048-point FFT gives 1024 byte bins per channel
pub const FFT_SIZE: u32 = 2048;
pub const ANALYSER_SMOOTHING: f64 = 0.8; // WebAudio's own per-bin smoothing
pub const ANALYSER_MIN_DB: f64 = -100.0;
pub const ANALYSER_MAX_DB: f64 = -30.0;
pub const STEREO_CHANNELS: u32 = 2;

// DOM ids
pub const AUDIO_ELEMENT_ID: &str = "swarm-audio";
pub const CANVAS_ID: &str = "swarm-canvas";
pub const PLAY_BUTTON_ID: &str = "play-button";
pub const STATUS_ID: &str = "status";
pub const PRESET_ATTRIBUTE: &str = "data-preset";

// Globals shared with the external renderer
pub const RENDERER_GLOBAL: &str = "swarmRenderer";
pub const HEAD_MESH_GLOBAL: &str = "swarmHeadMesh";

// Wheel normalisation (WheelEvent.deltaMode: 0 pixel, 1 line, 2 page)
pub const WHEEL_LINE_PX: f32 = 16.0;
pub const WHEEL_PAGE_PX: f32 = 800.0;
pub const WHEEL_PX_PER_UNIT: f32 = 1.0; // pixels of scroll per camera zoom unit
pub const WHEEL_MAX_STEP: f32 = 400.0; // clamp for a single wheel event

// Drag: ignore jitter below this many CSS pixels
pub const DRAG_DEADZONE_PX: f32 = 0.5;
