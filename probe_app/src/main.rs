//! Probe demo application
//!
//! Drives the cached physics queries from a fixed-step loop: a probe box slides
//! across a floor scattered with crates, casting a ground ray and sweeping
//! itself ahead every frame. Climbs what blocks it, settles when it walks off.
//!
//! Usage: `probe_demo [config.toml|config.ron]`

use physics_query::foundation::logging;
use physics_query::prelude::*;
use serde::{Deserialize, Serialize};

/// Demo settings, loadable from TOML or RON
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct ProbeConfig {
    physics: PhysicsConfig,
    frames: u32,
    /// Fixed timestep in seconds
    dt: f32,
    /// Horizontal and vertical speed in units per second
    speed: f32,
    /// Full size of the probe box
    probe_size: [f32; 3],
    /// Height of the probe centre above whatever it stands on
    rest_height: f32,
    /// Centres of the unit crates
    crates: Vec<[f32; 3]>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            frames: 240,
            dt: 1.0 / 60.0,
            speed: 3.0,
            probe_size: [0.8, 0.8, 0.8],
            rest_height: 1.0,
            crates: vec![[-4.0, 0.5, 0.0], [0.0, 0.5, 0.0], [0.0, 1.5, 0.0], [5.0, 0.5, 0.0]],
        }
    }
}

impl Config for ProbeConfig {}

fn build_world(config: &ProbeConfig) -> (ParryWorld, BodyHandle) {
    let mut world = ParryWorld::new(&config.physics.world);

    // Floor top face at y = 0
    world.add_static_box(Vec3::new(0.0, -0.5, 0.0), Vec3::new(50.0, 0.5, 50.0));
    for [x, y, z] in &config.crates {
        world.add_static_box(Vec3::new(*x, *y, *z), Vec3::new(0.5, 0.5, 0.5));
    }

    let probe = world.add_body(Vec3::new(-10.0, config.rest_height, 0.0), None);
    log::info!("World built with {} bodies", world.body_count());
    (world, probe)
}

fn run(config: &ProbeConfig) -> Result<(), Box<dyn std::error::Error>> {
    let (world, probe) = build_world(config);
    let mut queries = PhysicsQueries::new(config.physics.query.clone());
    queries.initialize(world).map_err(InitError::into_error)?;

    let forward = Vec3::x();
    let down = -Vec3::y();
    let size = Vec3::from(config.probe_size);
    let step = config.speed * config.dt;
    let ground_probe = config.rest_height * 2.0;

    for frame in 0..config.frames {
        let mut position = queries.world()?.body_origin(probe)?;

        let ahead = queries.box_sweep_test(position, size, forward, step)?;
        if ahead.has_hit {
            log::debug!("frame {}: blocked at {:.2} of the step, climbing", frame, ahead.hit_fraction);
            position.y += step;
        } else {
            position.x += step;
        }

        let ground = queries.ray_cast(probe, down, ground_probe)?;
        let height = ground.hit_fraction * ground_probe;
        if !ahead.has_hit && height > config.rest_height {
            position.y -= (height - config.rest_height).min(step);
        }

        queries.world_mut()?.set_body_position(probe, position)?;
        if frame % 60 == 0 {
            log::info!("frame {}: probe at ({:.2}, {:.2}, {:.2})", frame, position.x, position.y, position.z);
        }
    }

    let stats = queries.stats();
    log::info!(
        "{} rays ({} hits), {} sweeps ({} hits)",
        stats.ray_tests,
        stats.ray_hits,
        stats.sweep_tests,
        stats.sweep_hits
    );

    if let Some(world) = queries.teardown() {
        let native = world.native_stats();
        log::info!(
            "Native handles: {} allocated, {} released, {} live",
            native.allocated,
            native.released,
            native.live()
        );
    }
    Ok(())
}

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match ProbeConfig::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => ProbeConfig::default(),
    };

    logging::init_with_filter(&config.physics.logging.filter);
    log::info!("Starting probe demo ({} frames)", config.frames);

    if let Err(e) = run(&config) {
        log::error!("Probe demo failed: {}", e);
        std::process::exit(1);
    }
}
