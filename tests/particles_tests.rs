// Host-side tests for particle attributes, head meshes and formation.

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use swarm_core::config::HeadTransform;
use swarm_core::mesh::MeshData;
use swarm_core::particles::{head_blend, particle_seed, ParticleAttributes};
use swarm_core::path::{Path, PathState};
use swarm_core::MeshError;

const IDENTITY: HeadTransform = HeadTransform {
    scale: 1.0,
    y_offset: 0.0,
    x_rotation: 0.0,
};

fn unit_triangle() -> MeshData {
    MeshData::from_triangles(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], &[0, 1, 2]).unwrap()
}

#[test]
fn generation_is_reproducible_per_seed() {
    let a = ParticleAttributes::generate(500, 0.01, (40.0, 600.0), 99, None);
    let b = ParticleAttributes::generate(500, 0.01, (40.0, 600.0), 99, None);
    let c = ParticleAttributes::generate(500, 0.01, (40.0, 600.0), 100, None);
    assert_eq!(a, b);
    assert_ne!(a.duration, c.duration);
    assert_ne!(particle_seed(99, 0), particle_seed(99, 1));
}

#[test]
fn attributes_stay_in_range() {
    let p = ParticleAttributes::generate(300, 0.01, (40.0, 600.0), 5, None);
    assert_eq!(p.len(), 300);
    assert!(p.target.is_none());
    for i in 0..p.len() {
        assert!((p.spawn_delay[i] - i as f32 * 0.01).abs() < 1e-4);
        assert!((40.0..600.0).contains(&p.duration[i]));
        let pivot = p.pivot[i];
        assert!(pivot.min_element() >= 0.0 && pivot.max_element() < 2.0);
        assert!((p.rotation_axis[i].length() - 1.0).abs() < 1e-4);
        let turns = p.rotation_angle[i] / std::f32::consts::PI;
        assert!((12.0..=24.0).contains(&turns));
    }
}

#[test]
fn progress_clamps_to_unit_range() {
    let p = ParticleAttributes::generate(10, 1.0, (50.0, 50.0), 1, None);
    assert_eq!(p.progress(3, 0.0), 0.0, "not yet spawned");
    assert!((p.progress(3, 28.0) - 0.5).abs() < 1e-6);
    assert_eq!(p.progress(3, 1000.0), 1.0);
}

#[test]
fn formation_tracks_furthest_sampled_particle() {
    let p = ParticleAttributes::generate(2000, 1.0, (100.0, 100.0), 1, None);
    assert_eq!(p.formation_progress(0.0), 0.0);
    // particle 0 leads the strided sample
    assert!((p.formation_progress(50.0) - 0.5).abs() < 1e-6);
    assert_eq!(p.formation_progress(10_000.0), 1.0);
}

#[test]
fn head_targets_land_on_the_transformed_surface() {
    let mesh = unit_triangle();
    let transform = HeadTransform {
        scale: 2.0,
        y_offset: 10.0,
        x_rotation: 0.0,
    };
    let p = ParticleAttributes::generate(200, 0.01, (40.0, 600.0), 3, Some((&mesh, &transform)));
    let targets = p.target.as_ref().unwrap();
    assert_eq!(targets.len(), 200);
    for t in targets {
        assert!(t.z.abs() < 1e-5);
        assert!(t.x >= -1e-5 && t.y >= 10.0 - 1e-5);
        assert!(t.x + (t.y - 10.0) <= 2.0 + 1e-4, "inside the scaled triangle");
    }
}

#[test]
fn surface_sampling_respects_rotation() {
    let mesh = unit_triangle();
    let mut rng = StdRng::seed_from_u64(4);
    let rotated = HeadTransform {
        x_rotation: std::f32::consts::FRAC_PI_2,
        ..IDENTITY
    };
    for _ in 0..50 {
        let p = mesh.sample_surface(&mut rng, &rotated);
        assert!(p.y.abs() < 1e-5, "triangle rotated into the xz plane");
    }
}

#[test]
fn head_blend_moves_from_path_to_target() {
    let anchor = Vec3::new(0.0, 0.0, 0.0);
    let offset = Vec3::new(1.0, 0.0, 0.0);
    let target = Vec3::new(0.0, 50.0, 0.0);
    assert_eq!(head_blend(anchor, offset, target, 0.3), anchor + offset);
    assert_eq!(head_blend(anchor, offset, target, 1.0), target);
    let mid = head_blend(anchor, offset, target, 0.775);
    assert!(mid.y > 0.0 && mid.y < 50.0);
}

#[test]
fn position_without_audio_follows_the_path_anchor() {
    let path = Path::from_points(vec![Vec3::ZERO, Vec3::new(0.0, 100.0, 0.0)]);
    let state = PathState::new(2);
    let p = ParticleAttributes::generate(1, 0.0, (10.0, 10.0), 8, None);
    let start = p.position(0, 0.0, &path, &state, Vec2::ONE);
    // at t = 0 there is no spin yet so the offset equals the pivot
    assert!((start - p.pivot[0]).length() < 1e-4);
    let end = p.position(0, 10.0, &path, &state, Vec2::ONE);
    assert!((end.y - 100.0).abs() < 2.0 * 3f32.sqrt() + 1e-3);
}

#[test]
fn mesh_validation_errors() {
    assert_eq!(MeshData::new(Vec::new(), Vec::new()), Err(MeshError::NoVertices));
    assert_eq!(
        MeshData::from_triangles(&[0.0; 9], &[]),
        Err(MeshError::NoFaces)
    );
    assert!(matches!(
        MeshData::from_triangles(&[0.0; 9], &[0, 1, 5]),
        Err(MeshError::IndexOutOfRange { index: 5, .. })
    ));
    assert!(matches!(
        MeshData::from_triangles(&[0.0; 9], &[0, 1, 2, 0]),
        Err(MeshError::DegenerateFace { face: 1, count: 1 })
    ));
    assert_eq!(
        MeshData::from_triangles(&[0.0, f32::NAN, 0.0], &[0, 0, 0]),
        Err(MeshError::NonFiniteVertex(0))
    );
}
