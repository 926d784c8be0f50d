// Host-side tests for chromatic aberration, shooting stars and the camera.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use swarm_core::aberration::AberrationInput;
use swarm_core::config::StarTuning;
use swarm_core::stars::{ShootingStarPool, StarDrive};
use swarm_core::{
    AberrationMode, CameraInput, CameraRig, ChromaticAberrationState, Preset, SwarmConfig,
};

const DT: f32 = 1.0 / 60.0;

fn calm(time_sec: f32) -> AberrationInput {
    AberrationInput {
        sub_bass: 0.1,
        overall: 0.1,
        pan: 0.0,
        balance: 0.0,
        hit: false,
        since_hit_sec: None,
        time_sec,
        dt_sec: DT,
    }
}

fn star_tuning() -> StarTuning {
    SwarmConfig::from_preset(Preset::Head).stars
}

fn loud_drive() -> StarDrive {
    StarDrive {
        high_mid: 0.5,
        high: 0.5,
        combined: 0.5,
        formation: 1.0,
    }
}

#[test]
fn aberration_mode_cascade() {
    assert_eq!(AberrationMode::select(0.1, 0.1, true), AberrationMode::Glitch);
    assert_eq!(AberrationMode::select(0.95, 0.0, false), AberrationMode::Glitch);
    assert_eq!(AberrationMode::select(0.6, 0.0, false), AberrationMode::Intense);
    assert_eq!(AberrationMode::select(0.2, 0.7, false), AberrationMode::Normal);
    assert_eq!(AberrationMode::select(0.2, 0.2, false), AberrationMode::Subtle);
}

#[test]
fn hit_launches_a_decaying_tracer() {
    let tuning = SwarmConfig::default().aberration;
    let mut rng = StdRng::seed_from_u64(1);
    let mut ab = ChromaticAberrationState::default();

    ab.update(
        &AberrationInput {
            hit: true,
            sub_bass: 1.0,
            overall: 0.8,
            since_hit_sec: Some(0.0),
            ..calm(0.0)
        },
        &tuning,
        &mut rng,
    );
    assert_eq!(ab.mode, AberrationMode::Glitch);
    assert_eq!(ab.tracer_launches(), 1);
    assert!(ab.tracer_active);
    let launched = ab.tracer_value;
    assert!((launched - 0.02 * 1.5 * 0.8).abs() < 1e-6);
    assert!((ab.direction.length() - 1.0).abs() < 1e-4);

    ab.update(&calm(DT), &tuning, &mut rng);
    assert!((ab.tracer_value - launched * 0.92).abs() < 1e-6);
    assert_eq!(ab.tracer_launches(), 1);
    assert!(ab.output_strength() >= ab.tracer_value);
}

#[test]
fn calm_modes_breathe_above_zero() {
    let tuning = SwarmConfig::default().aberration;
    let mut rng = StdRng::seed_from_u64(2);
    let mut ab = ChromaticAberrationState::default();
    let mut silent = calm(0.0);
    silent.sub_bass = 0.0;
    silent.overall = 0.0;
    ab.update(&silent, &tuning, &mut rng);
    assert_eq!(ab.mode, AberrationMode::Subtle);
    assert!(ab.target_strength > 0.0);
    assert!(ab.target_strength <= tuning.breathing_amplitude + 1e-9);
}

#[test]
fn idle_relaxes_everything_to_zero() {
    let tuning = SwarmConfig::default().aberration;
    let mut rng = StdRng::seed_from_u64(3);
    let mut ab = ChromaticAberrationState::default();
    ab.update(
        &AberrationInput {
            hit: true,
            ..calm(0.0)
        },
        &tuning,
        &mut rng,
    );
    for _ in 0..400 {
        ab.idle(DT);
    }
    assert!(!ab.tracer_active);
    assert_eq!(ab.tracer_value, 0.0);
    assert!(ab.strength < 1e-9);
    assert_eq!(ab.mode, AberrationMode::Subtle);
}

#[test]
fn star_pool_cap_makes_spawn_a_no_op() {
    let tuning = star_tuning();
    let mut rng = StdRng::seed_from_u64(5);
    let mut pool = ShootingStarPool::new(4, 2);
    assert!(pool.spawn(&loud_drive(), &tuning, &mut rng).is_some());
    assert!(pool.spawn(&loud_drive(), &tuning, &mut rng).is_some());
    assert_eq!(pool.spawn(&loud_drive(), &tuning, &mut rng), None);
    assert_eq!(pool.active_count(), 2);
    assert_eq!(pool.capacity(), 4);
    assert_eq!(pool.spawned_total(), 2);
}

#[test]
fn fixed_lifetime_spawns_without_jitter() {
    let tuning = StarTuning {
        lifetime_jitter: (2.0, 2.0),
        ..star_tuning()
    };
    let mut rng = StdRng::seed_from_u64(9);
    let mut pool = ShootingStarPool::new(4, 4);
    for _ in 0..3 {
        pool.update(&loud_drive(), &tuning, 0.1, &mut rng);
    }
    assert_eq!(pool.spawned_total(), 3);
    for star in pool.stars().iter().filter(|s| s.active) {
        assert_eq!(star.lifetime, tuning.base_lifetime_sec * 2.0);
    }
}

#[test]
fn spawn_gate_needs_formation_and_treble() {
    let tuning = star_tuning();
    assert!(ShootingStarPool::wants_spawn(&loud_drive(), &tuning));
    let unformed = StarDrive {
        formation: 0.5,
        ..loud_drive()
    };
    assert!(!ShootingStarPool::wants_spawn(&unformed, &tuning));
    let dull = StarDrive {
        high_mid: 0.1,
        high: 0.1,
        ..loud_drive()
    };
    assert!(!ShootingStarPool::wants_spawn(&dull, &tuning));
    let disabled = StarTuning {
        enabled: false,
        ..tuning
    };
    assert!(!ShootingStarPool::wants_spawn(&loud_drive(), &disabled));
}

#[test]
fn spawned_stars_leave_upward_from_the_head() {
    let tuning = star_tuning();
    let mut rng = StdRng::seed_from_u64(6);
    let mut pool = ShootingStarPool::new(64, 64);
    for _ in 0..32 {
        pool.spawn(&loud_drive(), &tuning, &mut rng);
    }
    for star in pool.stars().iter().filter(|s| s.active) {
        assert!(star.direction.y > 0.0);
        assert!((star.direction.length() - 1.0).abs() < 1e-4);
        let from_centre = star.position - tuning.head_center;
        assert!((from_centre.length() - tuning.spawn_radius).abs() < 1e-2);
    }
}

#[test]
fn stars_respect_spawn_interval_and_expire() {
    let tuning = star_tuning();
    let mut rng = StdRng::seed_from_u64(7);
    let mut pool = ShootingStarPool::new(16, 16);
    pool.update(&loud_drive(), &tuning, 0.01, &mut rng);
    pool.update(&loud_drive(), &tuning, 0.01, &mut rng);
    assert_eq!(pool.spawned_total(), 1, "second frame is inside the spawn interval");

    let quiet = StarDrive::default();
    for _ in 0..30 {
        pool.update(&quiet, &tuning, 0.1, &mut rng);
    }
    assert_eq!(pool.active_count(), 0, "every lifetime is under 3 s");
    assert!(pool.stars().iter().all(|s| !s.active && s.opacity == 0.0));
}

#[test]
fn deactivate_all_clears_the_pool() {
    let tuning = star_tuning();
    let mut rng = StdRng::seed_from_u64(8);
    let mut pool = ShootingStarPool::new(8, 8);
    for _ in 0..5 {
        pool.spawn(&loud_drive(), &tuning, &mut rng);
    }
    assert_eq!(pool.active_count(), 5);
    pool.deactivate_all();
    assert_eq!(pool.active_count(), 0);
    assert!(pool.stars().iter().all(|s| !s.active));
}

#[test]
fn camera_drag_orbits_only_while_held() {
    let tuning = SwarmConfig::default().camera;
    let mut cam = CameraRig::new(tuning, Vec3::ZERO);
    cam.push_input(CameraInput::DragMove { dx: 100.0, dy: 0.0 });
    let pose = cam.update(DT, 0.0);
    assert_eq!(pose.azimuth, 0.0, "movement without a drag is ignored");

    cam.push_input(CameraInput::DragStart);
    cam.push_input(CameraInput::DragMove { dx: 100.0, dy: 0.0 });
    let pose = cam.update(DT, 0.0);
    let expected = (-100.0 * tuning.drag_sensitivity).rem_euclid(std::f32::consts::TAU);
    assert!((pose.azimuth - expected).abs() < 1e-5);
    assert!(cam.is_dragging());

    cam.push_input(CameraInput::DragMove { dx: 0.0, dy: -1e6 });
    let pose = cam.update(DT, 0.0);
    assert_eq!(pose.polar, tuning.max_polar);
}

#[test]
fn camera_auto_rotation_pauses_during_drag() {
    let tuning = SwarmConfig::default().camera;
    let mut cam = CameraRig::new(tuning, Vec3::ZERO);
    let pose = cam.update(1.0, 2.0);
    assert!((pose.azimuth - std::f32::consts::TAU / 30.0).abs() < 1e-5);

    cam.push_input(CameraInput::DragStart);
    let held = cam.update(1.0, 2.0);
    assert_eq!(held.azimuth, pose.azimuth);

    cam.push_input(CameraInput::DragEnd);
    let released = cam.update(1.0, 2.0);
    assert!(released.azimuth > held.azimuth);
}

#[test]
fn camera_wheel_clamps_and_eases_distance() {
    let tuning = SwarmConfig::default().camera;
    let mut cam = CameraRig::new(tuning, Vec3::ZERO);
    cam.push_input(CameraInput::Wheel { delta: 1e6 });
    let pose = cam.update(DT, 0.0);
    assert_eq!(cam.target_distance(), tuning.max_distance);
    assert!(pose.distance > tuning.initial_distance && pose.distance < tuning.max_distance);

    cam.push_input(CameraInput::Wheel { delta: -1e6 });
    cam.update(DT, 0.0);
    assert_eq!(cam.target_distance(), tuning.min_distance);
}

#[test]
fn flat_orbit_stays_on_the_ground_plane() {
    let tuning = SwarmConfig::from_preset(Preset::Ribbon).camera;
    let mut cam = CameraRig::new(tuning, Vec3::ZERO);
    cam.push_input(CameraInput::DragStart);
    cam.push_input(CameraInput::DragMove { dx: 40.0, dy: 300.0 });
    for _ in 0..10 {
        let pose = cam.update(DT, 3.0);
        assert_eq!(pose.position.y, 0.0);
        let planar = (pose.position.x.powi(2) + pose.position.z.powi(2)).sqrt();
        assert!((planar - pose.distance).abs() < 1e-2);
    }
}
