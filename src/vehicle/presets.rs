//! Ready-made vehicles and motors.

use crate::dynamics::state::SimConfig;

use super::motor::MotorCurve;

/// Trapezoidal demo motor: 0.5 s ramp to 3 kg/s, 4 s plateau, 0.5 s tail.
pub fn sample_motor() -> MotorCurve {
    build(&[0.0, 0.5, 4.5, 5.0], &[0.0, 3.0, 3.0, 0.0])
}

/// Small solid motor of the reference flight: 0.3125 kg/s held for 1.5 s,
/// then tailing off to zero at 2 s.
pub fn reference_motor() -> MotorCurve {
    build(&[0.0, 1.5, 2.0], &[0.3125, 0.3125, 0.0])
}

/// Reference sounding rocket (2.2 kg dry, 0.625 kg propellant, 960 m/s
/// exhaust, 86 mm body) in uniform air of 1.0 kg/m^3.
pub fn reference_config() -> SimConfig {
    SimConfig {
        g: 9.78,
        rho: 1.0,
        cd: 0.75,
        area: 5.81e-3,
        dry_mass: 2.2,
        prop_mass: 0.625,
        exhaust_velocity: 960.0,
        dt: 0.01,
        max_time: 60.0,
        ..SimConfig::default()
    }
}

fn build(times: &[f64], flows: &[f64]) -> MotorCurve {
    // static tables, covered by the tests below
    MotorCurve::from_columns(times, flows)
        .unwrap_or_else(|e| panic!("built-in motor table is malformed: {e}"))
}
