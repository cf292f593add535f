use serde::Serialize;
use tracing::{info, warn};

use crate::dynamics::forces::Forces;
use crate::dynamics::state::{FlightState, SimConfig};
use crate::error::SimError;
use crate::vehicle::MotorCurve;
use super::event::{Event, EventKind, FlightEvents};
use super::integrator::{self, euler_step, Step};

// ---------------------------------------------------------------------------
// Run output
// ---------------------------------------------------------------------------

/// Peak values over the whole trace (signed).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Maxima {
    pub alt: f64,   // m
    pub vel: f64,   // m/s
    pub accel: f64, // m/s^2
}

impl Default for Maxima {
    fn default() -> Self {
        Self {
            alt: f64::NEG_INFINITY,
            vel: f64::NEG_INFINITY,
            accel: f64::NEG_INFINITY,
        }
    }
}

impl Maxima {
    fn observe(&mut self, state: &FlightState, accel: f64) {
        self.alt = self.alt.max(state.alt);
        self.vel = self.vel.max(state.vel);
        self.accel = self.accel.max(accel);
    }
}

/// Everything one run produces. `trajectory[i]` and `forces[i]` describe the
/// same instant.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub trajectory: Vec<FlightState>,
    pub forces: Vec<Forces>,
    pub events: Vec<Event>,
    pub maxima: Maxima,
}

impl RunResult {
    pub fn event(&self, kind: EventKind) -> Option<&Event> {
        self.events.iter().find(|e| e.kind == kind)
    }

    pub fn final_state(&self) -> &FlightState {
        // a run always holds at least the ignition state
        &self.trajectory[self.trajectory.len() - 1]
    }

    pub fn landed(&self) -> bool {
        self.event(EventKind::Touchdown).is_some()
    }
}

// ---------------------------------------------------------------------------
// Full flight simulation
// ---------------------------------------------------------------------------

/// Run from ignition until touchdown, `max_time`, or the step bound.
pub fn simulate(config: &SimConfig, motor: &MotorCurve) -> Result<RunResult, SimError> {
    config.validate()?;

    let mut state = FlightState::at_ignition(config);

    let step_limit = config.step_limit();
    let cap = step_limit.saturating_add(1).min(200_000);
    let mut trajectory = Vec::with_capacity(cap);
    let mut forces = Vec::with_capacity(cap);
    trajectory.push(state);

    let mut events = FlightEvents::new(config, motor);
    let mut maxima = Maxima::default();
    let mut steps = 0usize;
    let mut landed = false;

    while state.time < config.max_time {
        if steps >= step_limit {
            warn!(steps, t = state.time, max_time = config.max_time, "step bound reached");
            return Err(SimError::NonTerminating { steps, time: state.time });
        }

        let Step { next, forces: f } = euler_step(&state, motor, config);
        maxima.observe(&state, f.accel);
        forces.push(f);

        landed = events.scan(&state, &next);
        state = if landed {
            FlightState { alt: 0.0, ..next }
        } else {
            next
        };
        trajectory.push(state);
        steps += 1;

        if landed {
            break;
        }
    }

    // nothing is integrated past the last sample; after touchdown report the
    // free-fall loads rather than the pad hold
    let last = if landed {
        crate::dynamics::forces(&state, integrator::burn_rate(&state, motor, config), config)
    } else {
        integrator::loads(&state, motor, config)
    };
    maxima.observe(&state, last.accel);
    forces.push(last);

    let events = events.into_events();
    info!(
        steps,
        t_end = state.time,
        h_max = maxima.alt,
        events = events.len(),
        "simulation complete"
    );

    Ok(RunResult {
        trajectory,
        forces,
        events,
        maxima,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
