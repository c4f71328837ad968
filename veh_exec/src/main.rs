//! Vehicle executable entry point.
//!
//! # Architecture
//!
//! The executable drives one AI vehicle around the simulated track:
//!
//!     - Initialise the session, logging, simulation and drive manager
//!     - Main loop:
//!         - Perception update (at the perception rate)
//!         - Drive manager step, writing into the actuator command
//!         - Simulation step applying the actuator command
//!         - Archiving of the command and telemetry

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use serde::Serialize;
use std::{
    thread,
    time::{Duration, Instant},
};
use structopt::StructOpt;

// Internal
use drive_if::{actuator::ActuatorCommand, vehicle::ActorId};
use util::{
    archive::Archiver,
    logger::{logger_init_with_overrides, LevelFilter},
    session::Session,
};
use veh_lib::{
    auto::{DriveInput, DriveMgr, DriveMode},
    sim::{SimParams, SimWorld},
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Actor ID of the controlled vehicle. Rivals must use other IDs.
const EGO_ID: ActorId = 0;

/// Period between telemetry log entries.
const TM_PERIOD_S: f64 = 1.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "veh_exec", about = "Drive an AI vehicle around the simulated track")]
struct Cli {
    /// Drive manager parameter file, relative to the params directory.
    #[structopt(long, default_value = "drive_mgr.toml")]
    drive_params: String,

    /// Simulation parameter file, relative to the params directory.
    #[structopt(long, default_value = "sim.toml")]
    sim_params: String,

    /// Duration of the run in seconds, overriding the simulation parameters.
    #[structopt(long)]
    duration: Option<f64>,

    /// Pace the simulation to wall clock time.
    #[structopt(long)]
    realtime: bool,

    /// Minimum log level, `info` or more verbose.
    #[structopt(long, default_value = "debug")]
    log_level: LevelFilter,
}

/// One row of the command archive.
#[derive(Serialize)]
struct CommandRecord {
    time_s: f64,
    x: f64,
    y: f64,
    heading_deg: f64,
    speed_kmh: f64,
    mode: DriveMode,
    steering: f64,
    throttle: f64,
    brake: f64,
    handbrake: bool,
    steering_mod_value: f64,
    steering_mod_weight: f64,
    braking_mod_value: f64,
    braking_mod_weight: f64,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let cli = Cli::from_args();

    // ---- EARLY INITIALISATION ----

    let session =
        Session::new("veh_exec", "sessions").wrap_err("Failed to create the session")?;

    // The simulation's own per-cycle debug output is rarely needed
    logger_init_with_overrides(
        cli.log_level,
        &session,
        &[("veh_lib::sim", LevelFilter::Info)],
    )
    .wrap_err("Failed to initialise logging")?;

    info!("RC AI Vehicle Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", cli);

    // ---- LOAD PARAMETERS ----

    let sim_params: SimParams =
        util::params::load(&cli.sim_params).wrap_err("Could not load sim params")?;
    let duration_s = cli.duration.unwrap_or(sim_params.duration_s);

    for p in [&cli.sim_params, &cli.drive_params].iter() {
        let path = util::params::path(p).wrap_err("Could not locate the params directory")?;
        session
            .snapshot_params(path)
            .wrap_err("Could not copy the params into the session")?;
    }
    info!("Parameters loaded and copied to {:?}", session.params_root);
    let cycle_period_s = sim_params.cycle_period_s;

    // ---- INITIALISE MODULES ----

    let mut world = SimWorld::new(sim_params).wrap_err("Failed to initialise the simulation")?;
    info!(
        "Simulation initialised, track length {:.0} wu",
        world.curve().length()
    );

    let mut drive_mgr =
        DriveMgr::init(&cli.drive_params, EGO_ID).wrap_err("Failed to initialise DriveMgr")?;
    info!("DriveMgr init complete");

    let mut arch = Archiver::from_path(&session, "veh_exec/commands.csv")
        .wrap_err("Failed to initialise the command archive")?;

    info!("Initialisation complete, running for {:.1} s\n", duration_s);

    // ---- MAIN LOOP ----

    let mut cmd = ActuatorCommand::default();
    let mut since_tm_s = TM_PERIOD_S;

    while world.time_s() < duration_s {
        let cycle_start_instant = Instant::now();

        let perceived = world.perceive(cycle_period_s);
        let vehicle = world.vehicle_state();

        let output = {
            let input = DriveInput {
                dt: cycle_period_s,
                vehicle: Some(vehicle),
                perceived,
                curve: world.curve(),
                scene: &world,
            };
            drive_mgr.step(input, &mut cmd)
        };

        if let Some(out) = output {
            if out.status.is_finished() {
                debug!("{:?} task finished: {:?}", out.mode, out.status);
            }
            if let Some(waypoint) = out.waypoint {
                info!(
                    "Stuck recovery waypoint at ({:.1}, {:.1})",
                    waypoint.x, waypoint.y
                );
            }
        }

        world.step(cycle_period_s, &cmd);

        arch.serialise(CommandRecord {
            time_s: world.time_s(),
            x: vehicle.position().x,
            y: vehicle.position().y,
            heading_deg: vehicle.pose.heading_deg(),
            speed_kmh: vehicle.speed_kmh,
            mode: drive_mgr.mode(),
            steering: cmd.steering,
            throttle: cmd.throttle,
            brake: cmd.brake,
            handbrake: cmd.handbrake,
            steering_mod_value: cmd.steering_modifier.value,
            steering_mod_weight: cmd.steering_modifier.weight,
            braking_mod_value: cmd.braking_modifier.value,
            braking_mod_weight: cmd.braking_modifier.weight,
        })
        .wrap_err("Failed to archive the actuator command")?;

        since_tm_s += cycle_period_s;
        if since_tm_s >= TM_PERIOD_S {
            since_tm_s = 0.0;
            match serde_json::to_string(&drive_mgr.get_tm()) {
                Ok(s) => info!("TM: {}", s),
                Err(e) => warn!("Could not serialise the drive TM: {}", e),
            }
        }

        if cli.realtime {
            let cycle_dur = Instant::now() - cycle_start_instant;
            match Duration::from_secs_f64(cycle_period_s).checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period_s
                ),
            }
        }
    }

    drive_mgr.abort(&mut cmd);
    info!("End of run at {:.2} s", world.time_s());

    Ok(())
}
