//! Main FireBot executable entry point.
//!
//! # Architecture
//!
//! The executable runs the mission against the simulated platform:
//!
//!     - Initialise the session and logging
//!     - Load parameters
//!     - Build the simulated arena and its equipment
//!     - Bring up the robot and wait for the operator to begin
//!     - Main loop:
//!         - Advance the simulated world by one cycle
//!         - Run one FireBot control cycle
//!         - Stop once home, halted, or out of cycles
//!     - Save the mission summary

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::eyre, eyre::WrapErr, Report};
use log::{error, info, warn};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use firebot_lib::{
    firebot::{FireBot, FireBotParams, TickStatus},
    sim::{self, SimWorld},
};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    let session =
        Session::new("firebot_exec", "sessions").wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    info!("FireBot Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params = FireBotParams::load().wrap_err("Could not load FireBot params")?;
    let sim_params: sim::Params =
        util::params::load("sim.toml").wrap_err("Could not load sim params")?;

    let cycle_period = Duration::from_secs_f64(params.firebot.cycle_period_s);
    let max_cycles = params.firebot.max_cycles;
    let realtime = params.firebot.realtime;

    info!("Parameters loaded");

    // ---- INITIALISE PLATFORM ----

    let world = SimWorld::shared(sim_params);
    let platform = sim::platform(&world);

    // The synthetic clock starts at the real one and only advances by whole
    // cycles, so a run is repeatable when not in realtime.
    let mut now = Instant::now();

    let mut firebot = match FireBot::init(platform, params, now) {
        Ok(f) => f,
        Err(e) => {
            error!("FireBot initialisation failed (code {}): {}", e.code(), e);
            session.exit();
            return Err(eyre!("FireBot initialisation failed with code {}", e.code()));
        }
    };

    // ---- MAIN LOOP ----

    info!("Begin mission");

    let mut outcome = TickStatus::Halted;
    let mut num_cycles = 0u64;

    while num_cycles < max_cycles {
        let cycle_start_instant = Instant::now();

        world.borrow_mut().step(cycle_period.as_secs_f64());
        now = if realtime { Instant::now() } else { now + cycle_period };

        outcome = match firebot.step(now) {
            Ok(s) => s,
            Err(e) => {
                error!("Cycle {} failed (code {}): {}", num_cycles, e.code(), e);
                firebot.halt();
                TickStatus::Halted
            }
        };

        num_cycles += 1;

        match outcome {
            TickStatus::Complete => {
                info!("Mission complete after {} cycles", num_cycles);
                break;
            }
            TickStatus::Halted => {
                warn!("Mission halted after {} cycles", num_cycles);
                break;
            }
            TickStatus::Running(_) => (),
        }

        // ---- CYCLE MANAGEMENT ----

        if realtime {
            let cycle_dur = Instant::now() - cycle_start_instant;

            match cycle_period.checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                ),
            }
        }
    }

    if let TickStatus::Running(state) = outcome {
        warn!(
            "Cycle limit of {} reached with the mission in {:?}",
            max_cycles, state
        );
    }

    // ---- SHUTDOWN ----

    {
        let w = world.borrow();
        let (x_m, y_m) = w.position_m();
        info!(
            "Sim: robot at ({:.3}, {:.3}) m after {:.1} s, candle {}",
            x_m,
            y_m,
            w.elapsed_s(),
            if w.candle_lit() { "still lit" } else { "out" }
        );
    }

    session.save("mission_summary.json", firebot.summary());

    info!("End of execution");
    session.exit();

    Ok(())
}
