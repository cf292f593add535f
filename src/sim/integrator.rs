use nalgebra::Vector3;

use crate::dynamics::forces::{forces, Forces};
use crate::dynamics::state::{FlightState, SimConfig};
use crate::vehicle::MotorCurve;

// ---------------------------------------------------------------------------
// Fixed-step forward Euler
// ---------------------------------------------------------------------------

/// Result of one integration step.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    /// State one `dt` later.
    pub next: FlightState,
    /// Loads at the starting state, with the acceleration actually applied.
    pub forces: Forces,
}

/// Propellant flow burned during a step starting at `state`: the curve's
/// value, capped so the step cannot drain more than what is left.
pub fn burn_rate(state: &FlightState, motor: &MotorCurve, config: &SimConfig) -> f64 {
    let remaining = state.mass - config.dry_mass;
    if remaining <= 0.0 {
        return 0.0;
    }
    motor.evaluate(state.time).min(remaining / config.dt)
}

/// Loads at `state`, with the ground hold applied.
pub fn loads(state: &FlightState, motor: &MotorCurve, config: &SimConfig) -> Forces {
    let mut f = forces(state, burn_rate(state, motor, config), config);
    if held_on_pad(state, &f) {
        f.accel = 0.0;
    }
    f
}

/// Sitting on the ground with nothing pushing it up.
pub fn held_on_pad(state: &FlightState, f: &Forces) -> bool {
    state.alt <= 0.0 && state.vel <= 0.0 && f.net() <= 0.0
}

/// Single forward Euler step: advance state by `config.dt`.
///
///   h' = h + V dt,  V' = V + a dt,  m' = max(m - mdot dt, m_dry)
pub fn euler_step(state: &FlightState, motor: &MotorCurve, config: &SimConfig) -> Step {
    let dt = config.dt;
    let f = loads(state, motor, config);
    let held = held_on_pad(state, &f);

    let dy = Vector3::new(state.vel, f.accel, -f.mdot);
    let mut y = state.vector() + dy * dt;

    if held {
        y.x = 0.0;
        y.y = 0.0;
    }
    // the last drop lands exactly on dry mass
    let remaining = state.mass - config.dry_mass;
    y.z = if f.mdot >= remaining / dt {
        config.dry_mass
    } else {
        y.z.max(config.dry_mass)
    };

    Step {
        next: FlightState::from_vector(state.time + dt, &y),
        forces: f,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
