//! Per-tick orchestration and the playback lifecycle.
//!
//! One [`SwarmEngine::tick`] per display refresh runs, in order: camera,
//! spectrum analysis, envelopes, the signal mapper, lights, aberration,
//! shooting stars and the status line. Any state other than
//! [`PlaybackState::Playing`] (or a tick without a spectrum snapshot) runs
//! the idle path instead.

use std::collections::VecDeque;

use glam::{Vec2, Vec3};
use rand::prelude::*;
use smallvec::SmallVec;

use crate::aberration::{AberrationInput, ChromaticAberrationState};
use crate::camera::{CameraInput, CameraPose, CameraRig};
use crate::config::SwarmConfig;
use crate::constants::*;
use crate::envelope::{EnvelopeFrame, EnvelopeParams, EnvelopeTracker, HitDetector};
use crate::error::{ConfigError, FrameError, MeshError, SwarmError};
use crate::mapper::{FrameSignalMapper, MapperFrame, ScalarUniforms};
use crate::mesh::MeshData;
use crate::particles::ParticleAttributes;
use crate::path::{Path, PathState};
use crate::spectrum::{Band, BandEnergies, FrequencyBandAnalyzer, SpectrumSnapshot};
use crate::stars::{ShootingStarPool, StarDrive};
use crate::status::{StatusLine, StatusReport};
use crate::uniforms::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    /// Waiting on the audio context to resume.
    Activating,
    Playing,
    Paused,
    Ended,
}

/// Button-state hints for the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleSignal {
    Ready,
    Playing,
    Ended,
}

/// Everything the host supplies for one tick.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput<'a> {
    /// Wall time since the previous tick; clamped to [0, 0.1] s.
    pub dt_sec: f32,
    /// Current position of the audio element.
    pub playback_sec: f32,
    /// Latest analyser snapshot, `None` until audio is connected.
    pub spectrum: Option<SpectrumSnapshot<'a>>,
}

/// Result of the most recent tick.
#[derive(Clone, Debug)]
pub struct FrameOutput {
    /// Animation clock, playback seconds times 60.
    pub clock: f32,
    pub playing: bool,
    pub energies: BandEnergies,
    pub envelope: EnvelopeFrame,
    pub scalars: ScalarUniforms,
    pub camera: CameraPose,
    pub aberration_strength: f32,
    pub aberration_direction: Vec2,
    pub formation: f32,
}

pub struct SwarmEngine {
    config: SwarmConfig,
    state: PlaybackState,
    signals: VecDeque<LifecycleSignal>,
    path: Path,
    path_state: PathState,
    particles: Option<ParticleAttributes>,
    mesh_error: Option<String>,
    audio_error: Option<String>,
    analyzer: FrequencyBandAnalyzer,
    envelope: EnvelopeTracker,
    mapper: FrameSignalMapper,
    aberration: ChromaticAberrationState,
    stars: ShootingStarPool,
    camera: CameraRig,
    status: StatusLine,
    rng: StdRng,
    output: FrameOutput,
    elapsed_sec: f32,
}

impl SwarmEngine {
    /// Build every static buffer for `config`. Particle attributes are
    /// generated here unless the config converges onto a head mesh, in
    /// which case they wait for [`SwarmEngine::install_head_mesh`].
    pub fn new(config: SwarmConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let path = Path::generate(config.path_len, config.path_origin, config.path_terminus, config.seed);
        let mut path_state = PathState::new(config.path_len);
        let particles = if config.head.is_none() {
            Some(ParticleAttributes::generate(
                config.particle_count,
                config.particle_delay_step,
                config.duration_range,
                config.seed,
                None,
            ))
        } else {
            None
        };

        let analyzer = FrequencyBandAnalyzer::new(config.bands.clone());
        let envelope = EnvelopeTracker::new(EnvelopeParams::default(), HitDetector::default(), config.seed);
        let mut mapper = FrameSignalMapper::new(config.mapper, config.bands.clone(), config.lights);
        let scalars = mapper.idle(&mut path_state, 0.0);
        let camera = CameraRig::new(config.camera, (config.path_origin + config.path_terminus) * 0.5);
        let stars = ShootingStarPool::new(config.stars.pool_size, config.stars.max_active);

        let output = FrameOutput {
            clock: 0.0,
            playing: false,
            energies: BandEnergies::default(),
            envelope: EnvelopeFrame::default(),
            scalars,
            camera: camera.pose(),
            aberration_strength: 0.0,
            aberration_direction: Vec2::X,
            formation: 0.0,
        };

        log::info!(
            "[engine] {:?} preset: {} path points, {} particles, {} bands",
            config.preset,
            config.path_len,
            config.particle_count,
            config.band_count()
        );

        let mut engine = Self {
            rng: StdRng::seed_from_u64(!config.seed),
            state: PlaybackState::Idle,
            signals: VecDeque::from([LifecycleSignal::Ready]),
            path,
            path_state,
            particles,
            mesh_error: None,
            audio_error: None,
            analyzer,
            envelope,
            mapper,
            aberration: ChromaticAberrationState::default(),
            stars,
            camera,
            status: StatusLine::new(STATUS_EVERY_FRAMES),
            output,
            elapsed_sec: 0.0,
            config,
        };
        engine.refresh_status();
        Ok(engine)
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn path_state(&self) -> &PathState {
        &self.path_state
    }

    /// `None` until a head mesh is installed, and forever after a failed load.
    pub fn particles(&self) -> Option<&ParticleAttributes> {
        self.particles.as_ref()
    }

    pub fn aberration(&self) -> &ChromaticAberrationState {
        &self.aberration
    }

    pub fn stars(&self) -> &ShootingStarPool {
        &self.stars
    }

    pub fn mapper(&self) -> &FrameSignalMapper {
        &self.mapper
    }

    pub fn envelope(&self) -> &EnvelopeTracker {
        &self.envelope
    }

    pub fn output(&self) -> &FrameOutput {
        &self.output
    }

    pub fn status(&self) -> &str {
        self.status.text()
    }

    pub fn mesh_error(&self) -> Option<&str> {
        self.mesh_error.as_deref()
    }

    /// Queue pointer or wheel input for the next tick.
    pub fn push_camera_input(&mut self, input: CameraInput) {
        self.camera.push_input(input);
    }

    pub fn pop_signal(&mut self) -> Option<LifecycleSignal> {
        self.signals.pop_front()
    }

    // ---- lifecycle ----

    /// User asked to play. Returns false when already playing or activating.
    pub fn request_play(&mut self) -> bool {
        match self.state {
            PlaybackState::Idle | PlaybackState::Paused | PlaybackState::Ended => {
                log::info!("[engine] {:?} -> Activating", self.state);
                self.state = PlaybackState::Activating;
                true
            }
            PlaybackState::Activating | PlaybackState::Playing => false,
        }
    }

    /// The audio context resumed. Envelopes and hit clocks start fresh.
    pub fn activation_succeeded(&mut self) {
        if self.state != PlaybackState::Activating {
            log::warn!("[engine] activation succeeded while {:?}", self.state);
            return;
        }
        self.envelope.reset();
        self.mapper.reset();
        self.audio_error = None;
        self.state = PlaybackState::Playing;
        self.signals.push_back(LifecycleSignal::Playing);
        log::info!("[engine] Activating -> Playing");
        self.refresh_status();
    }

    /// The audio context could not be created or resumed. Playback stays
    /// stopped and the next `request_play` retries.
    pub fn activation_failed(&mut self, reason: impl Into<String>) {
        let err = SwarmError::AudioInit(reason.into());
        log::error!("[engine] {}", err);
        self.audio_error = Some(err.to_string());
        if self.state == PlaybackState::Activating {
            self.state = PlaybackState::Idle;
            self.signals.push_back(LifecycleSignal::Ready);
        }
        self.refresh_status();
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            log::info!("[engine] Playing -> Paused");
            self.state = PlaybackState::Paused;
            self.signals.push_back(LifecycleSignal::Ready);
        }
    }

    pub fn track_ended(&mut self) {
        if matches!(self.state, PlaybackState::Playing | PlaybackState::Paused) {
            log::info!("[engine] {:?} -> Ended", self.state);
            self.state = PlaybackState::Ended;
            self.signals.push_back(LifecycleSignal::Ended);
        }
    }

    /// Hand over the parsed head mesh, or the reason it could not be
    /// loaded. On failure the particle system never initialises.
    pub fn install_head_mesh(&mut self, mesh: Result<MeshData, MeshError>) -> Result<(), SwarmError> {
        let result = match (mesh, self.config.head) {
            (Ok(mesh), Some(transform)) => {
                log::info!(
                    "[mesh] {} vertices, {} faces",
                    mesh.vertices().len(),
                    mesh.faces().len()
                );
                self.particles = Some(ParticleAttributes::generate(
                    self.config.particle_count,
                    self.config.particle_delay_step,
                    self.config.duration_range,
                    self.config.seed,
                    Some((&mesh, &transform)),
                ));
                self.mesh_error = None;
                Ok(())
            }
            (Ok(_), None) => {
                log::warn!("[mesh] {:?} preset has no head; mesh ignored", self.config.preset);
                Ok(())
            }
            (Err(e), _) => {
                let err = SwarmError::from(e);
                log::error!("[mesh] {}", err);
                self.mesh_error = Some(err.to_string());
                Err(err)
            }
        };
        self.refresh_status();
        result
    }

    // ---- per frame ----

    pub fn tick(&mut self, input: FrameInput<'_>) -> Result<&FrameOutput, FrameError> {
        let dt = if input.dt_sec.is_finite() {
            input.dt_sec.clamp(0.0, MAX_FRAME_DT_SEC)
        } else {
            0.0
        };
        self.elapsed_sec += dt;
        let now_sec = input.playback_sec.max(0.0);
        let clock = now_sec * CLOCK_UNITS_PER_SEC;

        // auto-rotation follows the previous frame's mapper output
        self.output.camera = self.camera.update(dt, self.output.scalars.rotation_speed);
        self.output.clock = clock;

        match (self.state, input.spectrum.as_ref()) {
            (PlaybackState::Playing, Some(spectrum)) => {
                if let Err(e) = self.playing_frame(spectrum, clock, now_sec, dt) {
                    self.path_state.reset();
                    return Err(e);
                }
            }
            _ => self.idle_frame(dt),
        }

        if self.status.advance() {
            self.refresh_status();
        }
        Ok(&self.output)
    }

    fn playing_frame(&mut self, spectrum: &SpectrumSnapshot<'_>, clock: f32, now_sec: f32, dt: f32) -> Result<(), FrameError> {
        let energies = self.analyzer.analyze(spectrum)?;
        let envelope = self.envelope.update(&energies, clock, now_sec, dt);
        let since_hit_sec = self.envelope.last_hit_time().map(|t| (now_sec - t).max(0.0));

        let frame = MapperFrame {
            clock,
            now_sec,
            dt_sec: dt,
            spectrum,
            energies: &energies,
            envelope: &envelope,
            since_hit_sec,
        };
        let scalars = self.mapper.map(&frame, &mut self.path_state, &mut self.rng);

        let lows = envelope.smoothed(Band::SubBass).max(envelope.smoothed(Band::LowBass));
        let highs = envelope.smoothed(Band::High).max(envelope.smoothed(Band::HighMid));
        self.aberration.update(
            &AberrationInput {
                sub_bass: envelope.smoothed(Band::SubBass),
                overall: energies.overall(),
                pan: energies.weighted_pan(),
                balance: (highs - lows).clamp(-1.0, 1.0),
                hit: envelope.hit,
                since_hit_sec,
                time_sec: self.elapsed_sec,
                dt_sec: dt,
            },
            &self.config.aberration,
            &mut self.rng,
        );

        let formation = self.formation(clock);
        let drive = StarDrive {
            high_mid: envelope.display(Band::HighMid),
            high: envelope.display(Band::High),
            combined: energies.overall(),
            formation,
        };
        self.stars.update(&drive, &self.config.stars, dt, &mut self.rng);

        if !self.path_state.all_finite() {
            return Err(FrameError::NonFinite("path state"));
        }
        if !(scalars.particle_scale.is_finite()
            && scalars.roundness.is_finite()
            && scalars.lights.iter().all(|l| l.intensity.is_finite()))
        {
            return Err(FrameError::NonFinite("scalar uniforms"));
        }
        if !self.aberration.output_strength().is_finite() {
            return Err(FrameError::NonFinite("aberration"));
        }

        self.output.playing = true;
        self.output.energies = energies;
        self.output.envelope = envelope;
        self.output.scalars = scalars;
        self.output.aberration_strength = self.aberration.output_strength();
        self.output.aberration_direction = self.aberration.direction;
        self.output.formation = formation;
        Ok(())
    }

    fn idle_frame(&mut self, dt: f32) {
        self.output.scalars = self.mapper.idle(&mut self.path_state, dt);
        self.aberration.idle(dt);
        self.stars.deactivate_all();

        self.output.playing = false;
        self.output.energies = BandEnergies::default();
        self.output.envelope = EnvelopeFrame::default();
        self.output.aberration_strength = self.aberration.output_strength();
        self.output.aberration_direction = self.aberration.direction;
        self.output.formation = self.formation(self.output.clock);
    }

    /// Head formation progress; zero without head targets.
    fn formation(&self, clock: f32) -> f32 {
        match &self.particles {
            Some(p) if p.target.is_some() => p.formation_progress(clock),
            _ => 0.0,
        }
    }

    fn refresh_status(&mut self) {
        let mut report = StatusReport::default();
        report.notices.extend(self.mesh_error.as_deref());
        report.notices.extend(self.audio_error.as_deref());
        report.bands = self
            .config
            .bands
            .iter()
            .map(|b| (b.band, self.output.envelope.smoothed(b.band)))
            .collect::<SmallVec<_>>();
        if self.config.stars.enabled {
            report.stars = Some((self.stars.active_count(), self.stars.capacity()));
        }
        if self.config.head.is_some() && self.particles.is_some() {
            report.formation = Some(self.output.formation);
        }
        self.status.render(&report);
    }

    // ---- hand-off to the renderer ----

    /// Write every uniform of the last tick, then mark the set dirty.
    pub fn publish<S: UniformSink + ?Sized>(&self, sink: &mut S) {
        let out = &self.output;
        let s = &out.scalars;
        sink.set(U_TIME, UniformValue::Float(out.clock));
        sink.set(U_PATH, UniformValue::Vec3Array(self.path.points()));
        sink.set(U_RADIUS, UniformValue::FloatArray(&self.path_state.radius));
        sink.set(U_SHAKE, UniformValue::Vec3Array(&self.path_state.shake));
        sink.set(U_ROTATION, UniformValue::FloatArray(&self.path_state.rotation));
        sink.set(U_PAN, UniformValue::FloatArray(&self.path_state.pan));
        sink.set(U_ROUNDNESS, UniformValue::Vec2(s.roundness));
        sink.set(U_PARTICLE_SCALE, UniformValue::Float(s.particle_scale));
        for (k, light) in s.lights.iter().enumerate() {
            sink.set(U_LIGHT_POSITION[k], UniformValue::Vec3(light.position));
            sink.set(U_LIGHT_COLOR[k], UniformValue::Vec3(light.color));
            sink.set(U_LIGHT_INTENSITY[k], UniformValue::Float(light.intensity));
        }
        sink.set(U_ABERRATION_STRENGTH, UniformValue::Float(out.aberration_strength));
        sink.set(U_ABERRATION_DIRECTION, UniformValue::Vec2(out.aberration_direction));
        sink.mark_dirty();
    }

    /// Scalar uniforms packed for a single buffer write.
    pub fn scene_uniforms(&self) -> SceneUniforms {
        let out = &self.output;
        let s = &out.scalars;
        let pad = |v: Vec3, w: f32| v.extend(w).to_array();
        SceneUniforms {
            time: out.clock,
            particle_scale: s.particle_scale,
            roundness: s.roundness.to_array(),
            aberration_direction: out.aberration_direction.to_array(),
            aberration_strength: out.aberration_strength,
            camera_distance: out.camera.distance,
            camera_position: pad(out.camera.position, 1.0),
            light_positions: s.lights.map(|l| pad(l.position, 1.0)),
            light_colors: s.lights.map(|l| pad(l.color, l.intensity)),
        }
    }
}
