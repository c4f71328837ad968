//! # Obstacle Sweep Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use drive_if::actuator::ActuatorCommand;
use veh_lib::{
    auto::{DriveInput, DriveMgr, DriveMgrParams, ObstacleAvoider},
    sim::{ObstacleParams, RivalParams, SimParams, SimWorld, VehicleParams},
};

fn sim_params() -> SimParams {
    // Ring of obstacles around the start position, with a few rivals on the track
    let obstacles = (0..32)
        .map(|i| {
            let angle = (i as f64 * 360.0 / 32.0).to_radians();
            ObstacleParams {
                x: 250.0 * angle.cos(),
                y: 250.0 * angle.sin(),
                radius: 20.0,
            }
        })
        .collect();

    let rivals = (0..4)
        .map(|i| RivalParams {
            id: 100 + i,
            start_distance: 200.0 * i as f64,
            speed_kmh: 50.0,
            radius: 150.0,
        })
        .collect();

    SimParams {
        cycle_period_s: 0.05,
        duration_s: 60.0,
        track: vec![
            [-5000.0, -5000.0],
            [5000.0, -5000.0],
            [5000.0, 5000.0],
            [-5000.0, 5000.0],
        ],
        perception_radius: 2000.0,
        perception_period_s: 0.2,
        vehicle: VehicleParams {
            start_position: [0.0, 0.0],
            start_heading_deg: 0.0,
            body_radius: 100.0,
            wu_per_m: 100.0,
            max_speed_kmh: 120.0,
            max_reverse_speed_kmh: 20.0,
            max_accel_kmhs: 20.0,
            max_brake_kmhs: 40.0,
            handbrake_kmhs: 60.0,
            drag_per_s: 0.05,
            max_yaw_rate_degs: 90.0,
            full_steer_speed_kmh: 20.0,
        },
        obstacles,
        rivals,
    }
}

fn obstacle_sweep_benchmark(c: &mut Criterion) {
    let world = SimWorld::new(sim_params()).unwrap();
    let vehicle = world.vehicle_state();
    let avoider = ObstacleAvoider::new(Default::default());

    c.bench_function("ObstacleAvoider::sweep", |b| {
        b.iter(|| avoider.sweep(&vehicle, &world))
    });

    let mut world = SimWorld::new(sim_params()).unwrap();
    let mut drive_mgr = DriveMgr::new(DriveMgrParams::default(), 0);
    let mut cmd = ActuatorCommand::default();

    c.bench_function("DriveMgr::step", |b| {
        b.iter(|| {
            let perceived = world.perceive(0.05);
            let input = DriveInput {
                dt: 0.05,
                vehicle: Some(world.vehicle_state()),
                perceived,
                curve: world.curve(),
                scene: &world,
            };
            drive_mgr.step(input, &mut cmd);
            world.step(0.05, &cmd);
        })
    });
}

criterion_group!(benches, obstacle_sweep_benchmark);
criterion_main!(benches);
