//! Benchmarks for the contact solver.
//!
//! Run with: `cargo bench -p planar-solver`

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use planar_solver::{ContactJoint, Solver};
use planar_types::{BodyId, ContactPoint, Coords, RigidBody, SolveConfig, SolveMode, Vector2};

/// Deterministic xorshift so scenes are identical across runs.
struct XorShift(u32);

impl XorShift {
    fn next_f32(&mut self, min: f32, max: f32) -> f32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        min + (max - min) * (x as f32 / u32::MAX as f32)
    }
}

/// A pile of boxes pressed onto one ground body, each with its own contact.
/// Shared ground keeps the grouping honest: wide modes mix batches with a
/// scalar tail the way real piles do.
fn pile_scene(contacts: u32) -> (Vec<RigidBody>, Vec<ContactPoint>, Solver) {
    let mut rng = XorShift(0x9e37_79b9);

    let mut bodies = vec![RigidBody::fixed(Coords::identity())];
    let mut points = Vec::new();
    let mut solver = Solver::new();

    for index in 0..contacts {
        let x = rng.next_f32(-500.0, 500.0);
        let mut body = RigidBody::new(Coords::from_angle(Vector2::new(x, 4.0), 0.0), 1.0, 1.0);
        body.velocity = Vector2::new(rng.next_f32(-2.0, 2.0), rng.next_f32(-15.0, -5.0));
        bodies.push(body);

        points.push(ContactPoint::new(
            Vector2::new(0.0, -4.0),
            Vector2::new(0.0, rng.next_f32(0.0, 0.5)),
            Vector2::new(0.0, 1.0),
        ));
        solver.add_joint(ContactJoint::new(BodyId::new(index + 1), BodyId::new(0), index));
    }

    (bodies, points, solver)
}

/// Disjoint body pairs, one contact each: the fully batchable case.
fn pairs_scene(contacts: u32) -> (Vec<RigidBody>, Vec<ContactPoint>, Solver) {
    let mut rng = XorShift(0x2545_f491);

    let mut bodies = Vec::new();
    let mut points = Vec::new();
    let mut solver = Solver::new();

    for index in 0..contacts {
        let x = index as f32 * 20.0;
        let mut body = RigidBody::new(Coords::from_angle(Vector2::new(x, 4.0), 0.0), 1.0, 1.0);
        body.velocity = Vector2::new(0.0, rng.next_f32(-15.0, -5.0));
        bodies.push(body);
        bodies.push(RigidBody::fixed(Coords::from_angle(Vector2::new(x, 0.0), 0.0)));

        points.push(ContactPoint::new(
            Vector2::new(0.0, -4.0),
            Vector2::new(0.0, 0.1),
            Vector2::new(0.0, 1.0),
        ));
        solver.add_joint(ContactJoint::new(
            BodyId::new(2 * index),
            BodyId::new(2 * index + 1),
            index,
        ));
    }

    (bodies, points, solver)
}

fn bench_solve_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve_modes");

    for mode in [SolveMode::Scalar, SolveMode::Sse2, SolveMode::Avx2] {
        if !mode.is_supported() {
            continue;
        }

        let config = SolveConfig::default().with_mode(mode);

        group.bench_function(format!("pairs_4096_{mode}"), |b| {
            let (bodies, points, mut solver) = pairs_scene(4096);
            b.iter(|| {
                let mut bodies = bodies.clone();
                solver
                    .solve(black_box(&mut bodies), black_box(&points), &config)
                    .map(|stats| stats.mean_iterations)
            });
        });

        group.bench_function(format!("pile_4096_{mode}"), |b| {
            let (bodies, points, mut solver) = pile_scene(4096);
            b.iter(|| {
                let mut bodies = bodies.clone();
                solver
                    .solve(black_box(&mut bodies), black_box(&points), &config)
                    .map(|stats| stats.mean_iterations)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_solve_modes);
criterion_main!(benches);
