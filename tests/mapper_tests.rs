// Host-side tests for the visible window, section layout and the mapper.

use rand::rngs::StdRng;
use rand::SeedableRng;
use swarm_core::constants::{BASE_ROTATION_SPEED, HIT_KICK_MIN, SCALAR_JITTER};
use swarm_core::envelope::{EnvelopeFrame, EnvelopeParams, EnvelopeTracker, HitDetector};
use swarm_core::mapper::{
    classify, section_thresholds, visible_window, FrameSignalMapper, MapperFrame, VisibleWindow,
};
use swarm_core::path::PathState;
use swarm_core::spectrum::FrequencyBandAnalyzer;
use swarm_core::{Band, Preset, SpectrumSnapshot, SwarmConfig};

const RATE: f32 = 44_100.0;
const DT: f32 = 1.0 / 60.0;

fn mapper_for(config: &SwarmConfig) -> FrameSignalMapper {
    FrameSignalMapper::new(config.mapper, config.bands.clone(), config.lights)
}

#[test]
fn window_falls_back_when_nothing_is_in_flight() {
    let w = visible_window(0.0, 512, 0.5, 320.0, (0.0, 0.5));
    assert!(w.fallback);
    assert_eq!((w.min, w.max), (0.0, 0.5));

    // a single segment in flight has zero width
    let single = visible_window(0.1, 512, 0.5, 320.0, (0.0, 0.3));
    assert!(single.fallback);
    assert_eq!(single.max, 0.3);
}

#[test]
fn window_spans_segments_in_flight() {
    let w = visible_window(100.0, 512, 0.5, 320.0, (0.0, 0.5));
    assert!(!w.fallback);
    assert!((w.max - 100.0 / 320.0).abs() < 1e-6);
    assert!((w.min - 0.5 / 320.0).abs() < 1e-6);

    // every segment has arrived
    let done = visible_window(10_000.0, 512, 0.5, 320.0, (0.1, 0.2));
    assert!(done.fallback);
}

#[test]
fn thresholds_follow_section_weights() {
    let bands = SwarmConfig::from_preset(Preset::Swarm).bands;
    let window = VisibleWindow {
        min: 0.0,
        max: 0.5,
        fallback: true,
    };
    let t = section_thresholds(&window, &bands);
    let expected = [0.05, 0.2, 0.3, 0.4, 0.5];
    assert_eq!(t.len(), 5);
    for (got, want) in t.iter().zip(expected) {
        assert!((got - want).abs() < 1e-5, "{} vs {}", got, want);
    }
    assert_eq!(classify(0.0, &t), 0);
    assert_eq!(classify(0.06, &t), 1);
    assert_eq!(classify(0.45, &t), 4);
    assert_eq!(classify(0.9, &t), 4, "past the window clamps to the last band");
}

#[test]
fn swarm_sub_bass_section_is_first_tenth_of_window() {
    let config = SwarmConfig::from_preset(Preset::Swarm);
    let mapper = mapper_for(&config);
    for i in 0..=25 {
        assert_eq!(mapper.section_of(i, 256), Band::SubBass, "point {}", i);
    }
    assert_eq!(mapper.section_of(26, 256), Band::LowBass);
    assert_eq!(mapper.section_of(255, 256), Band::High);
}

#[test]
fn ribbon_sections_use_three_bands() {
    let config = SwarmConfig::from_preset(Preset::Ribbon);
    let mapper = mapper_for(&config);
    // window (0, 0.3) split 0.4 / 0.3 / 0.3
    assert_eq!(mapper.section_of(0, 128), Band::SubBass);
    assert_eq!(mapper.section_of(60, 128), Band::LowMid);
    assert_eq!(mapper.section_of(127, 128), Band::High);
}

#[test]
fn map_writes_every_entry_and_idle_clears_them() {
    let config = SwarmConfig::from_preset(Preset::Swarm);
    let mut mapper = mapper_for(&config);
    let mut analyzer = FrequencyBandAnalyzer::new(config.bands.clone());
    let mut tracker = EnvelopeTracker::new(EnvelopeParams::default(), HitDetector::default(), 3);
    let mut rng = StdRng::seed_from_u64(11);
    let mut state = PathState::new(config.path_len);

    let bins = vec![180u8; 1024];
    let spectrum = SpectrumSnapshot::mono(&bins, RATE);
    let energies = analyzer.analyze(&spectrum).unwrap();
    let envelope = tracker.update(&energies, 0.0, 0.0, DT);
    let scalars = mapper.map(
        &MapperFrame {
            clock: 0.0,
            now_sec: 0.0,
            dt_sec: DT,
            spectrum: &spectrum,
            energies: &energies,
            envelope: &envelope,
            since_hit_sec: Some(0.0),
        },
        &mut state,
        &mut rng,
    );

    assert!(state.all_finite());
    assert!(state.radius.iter().all(|&r| r > 0.0));
    assert!(scalars.roundness.x >= 1.0 - 0.02);
    assert_eq!(scalars.roundness.y, 1.0);
    assert!(scalars.particle_scale > 1.0);
    assert!(scalars.lights.iter().all(|l| l.intensity > 0.0));
    assert!(scalars.rotation_speed.is_finite());

    let rest = mapper.idle(&mut state, DT);
    assert!(state.is_idle());
    assert!(rest.lights.iter().all(|l| l.intensity == 0.0));
    assert!(rest.particle_scale < scalars.particle_scale);
    assert!(mapper.window().fallback);
}

#[test]
fn mapper_reset_restores_rest_scalars() {
    let config = SwarmConfig::from_preset(Preset::Swarm);
    let mut mapper = mapper_for(&config);
    let mut state = PathState::new(config.path_len);
    mapper.reset();
    let rest = mapper.idle(&mut state, DT);
    assert_eq!(rest.particle_scale, 1.0);
    assert_eq!(rest.roundness.x, 1.0);
}

#[test]
fn hit_kick_keeps_one_direction_for_its_window() {
    let config = SwarmConfig::from_preset(Preset::Swarm);
    let mut mapper = mapper_for(&config);
    let mut analyzer = FrequencyBandAnalyzer::new(config.bands.clone());
    let mut rng = StdRng::seed_from_u64(21);
    let mut state = PathState::new(config.path_len);

    let bins = vec![0u8; 1024];
    let spectrum = SpectrumSnapshot::mono(&bins, RATE);
    let energies = analyzer.analyze(&spectrum).unwrap();

    let mut signs = Vec::new();
    for frame in 0..32 {
        let since_hit = frame as f32 * DT;
        let envelope = EnvelopeFrame {
            hit: frame == 0,
            ..EnvelopeFrame::default()
        };
        let scalars = mapper.map(
            &MapperFrame {
                clock: frame as f32,
                now_sec: since_hit,
                dt_sec: DT,
                spectrum: &spectrum,
                energies: &energies,
                envelope: &envelope,
                since_hit_sec: Some(since_hit),
            },
            &mut state,
            &mut rng,
        );
        let kick = scalars.rotation_speed - BASE_ROTATION_SPEED;
        if since_hit < 0.5 {
            assert!(kick.abs() >= HIT_KICK_MIN - SCALAR_JITTER, "frame {}", frame);
            signs.push(kick.signum());
        } else {
            assert!(kick.abs() <= SCALAR_JITTER, "frame {} after the window", frame);
        }
    }
    assert!(signs.len() >= 29);
    assert!(signs.iter().all(|&s| s == mapper.kick_sign()), "{:?}", signs);
}
