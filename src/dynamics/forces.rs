use serde::Serialize;

use crate::dynamics::state::{thrust_sign, FlightState, SimConfig};
use crate::physics::{aerodynamics, gravity};

// ---------------------------------------------------------------------------
// Force model (1DOF, up positive)
// ---------------------------------------------------------------------------

/// Loads acting on the vehicle at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Forces {
    pub mdot: f64,   // kg/s, propellant flow actually burned
    pub thrust: f64, // N
    pub drag: f64,   // N, signed with velocity
    pub weight: f64, // N
    pub accel: f64,  // m/s^2
}

impl Forces {
    /// Thrust minus drag minus weight.
    pub fn net(&self) -> f64 {
        self.thrust - self.drag - self.weight
    }
}

/// Compute thrust, drag, weight and net acceleration.
///
/// `mdot` is the flow the motor curve offers; it is ignored once the tank is
/// empty (`mass <= dry_mass`).
///
///   a = -g - D/m + sign(V) T/m
pub fn forces(state: &FlightState, mdot: f64, config: &SimConfig) -> Forces {
    let mdot = if state.mass <= config.dry_mass { 0.0 } else { mdot };

    let thrust = mdot * config.exhaust_velocity;
    let drag = aerodynamics::drag_force(state.vel, config.rho, config.cd, config.area);
    let weight = gravity::weight(state.mass, config.g);

    let accel = -config.g - drag / state.mass + thrust_sign(state.vel) * thrust / state.mass;

    Forces {
        mdot,
        thrust,
        drag,
        weight,
        accel,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SimConfig {
        SimConfig {
            g: 9.78,
            rho: 1.0,
            cd: 0.75,
            area: 5.81e-3,
            dry_mass: 2.2,
            prop_mass: 0.625,
            exhaust_velocity: 960.0,
            ..SimConfig::default()
        }
    }

    fn state(vel: f64, mass: f64) -> FlightState {
        FlightState { time: 0.0, alt: 10.0, vel, mass }
    }

    #[test]
    fn stationary_rocket_with_thrust_accelerates_up() {
        let cfg = config();
        let f = forces(&state(0.0, cfg.wet_mass()), 0.3125, &cfg);
        assert_eq!(f.drag, 0.0);
        assert!((f.thrust - 300.0).abs() < 1e-9);
        let expected = -9.78 + 300.0 / 2.825;
        assert!((f.accel - expected).abs() < 1e-12);
    }

    #[test]
    fn no_thrust_with_empty_tank() {
        let cfg = config();
        let f = forces(&state(50.0, cfg.dry_mass), 0.3125, &cfg);
        assert_eq!(f.mdot, 0.0);
        assert_eq!(f.thrust, 0.0);
        assert!(f.accel < -cfg.g, "drag adds to gravity while ascending");
    }

    #[test]
    fn drag_reverses_when_descending() {
        let cfg = config();
        let f = forces(&state(-40.0, cfg.dry_mass), 0.0, &cfg);
        assert!(f.drag < 0.0);
        assert!(f.accel > -cfg.g, "drag brakes the fall");
    }

    #[test]
    fn vacuum_coast_is_pure_gravity() {
        let cfg = SimConfig { rho: 0.0, ..config() };
        for v in [-120.0, -1.0, 0.0, 3.0, 250.0] {
            let f = forces(&state(v, cfg.dry_mass), 0.0, &cfg);
            assert_eq!(f.accel, -cfg.g);
        }
    }

    #[test]
    fn weight_tracks_mass() {
        let cfg = config();
        let f = forces(&state(0.0, 2.5), 0.0, &cfg);
        assert!((f.weight - 2.5 * 9.78).abs() < 1e-12);
        assert!(f.net() < 0.0);
    }
}
