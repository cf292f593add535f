use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::vehicle::MotorCurve;

// ---------------------------------------------------------------------------
// Conventions
// ---------------------------------------------------------------------------

/// Sign applied to thrust when the vehicle is exactly at rest (`V = 0`).
/// A stationary rocket with thrust accelerates upward.
pub const SIGN_AT_REST: f64 = 1.0;

/// `sign(V)` with the at-rest tie-break.
pub fn thrust_sign(vel: f64) -> f64 {
    if vel > 0.0 {
        1.0
    } else if vel < 0.0 {
        -1.0
    } else {
        SIGN_AT_REST
    }
}

// ---------------------------------------------------------------------------
// 1-DoF state: altitude, vertical velocity, mass
// ---------------------------------------------------------------------------

/// Vehicle state at a single instant. Up is positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightState {
    pub time: f64, // s
    pub alt: f64,  // m
    pub vel: f64,  // m/s
    pub mass: f64, // kg
}

impl FlightState {
    /// On the pad, fully fuelled.
    pub fn at_ignition(config: &SimConfig) -> Self {
        Self {
            time: 0.0,
            alt: 0.0,
            vel: 0.0,
            mass: config.wet_mass(),
        }
    }

    /// `[alt, vel, mass]` as a column vector.
    pub fn vector(&self) -> Vector3<f64> {
        Vector3::new(self.alt, self.vel, self.mass)
    }

    pub fn from_vector(time: f64, y: &Vector3<f64>) -> Self {
        Self {
            time,
            alt: y.x,
            vel: y.y,
            mass: y.z,
        }
    }

    /// Linear blend toward `next` at fraction `theta` of the step.
    pub fn lerp(&self, next: &FlightState, theta: f64) -> FlightState {
        let y = self.vector() + (next.vector() - self.vector()) * theta;
        FlightState::from_vector(self.time + theta * (next.time - self.time), &y)
    }
}

// ---------------------------------------------------------------------------
// Simulation config
// ---------------------------------------------------------------------------

/// Physical and numerical parameters of one run.
///
/// Field aliases accept the short keys used by older parameter files
/// (`Cd`, `A`, `m_dry`, `m_prop`, `ue`, `tmax`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub g: f64,   // m/s^2
    pub rho: f64, // kg/m^3, 0 = vacuum
    #[serde(alias = "Cd")]
    pub cd: f64,
    #[serde(alias = "A")]
    pub area: f64, // m^2
    #[serde(alias = "m_dry")]
    pub dry_mass: f64, // kg
    #[serde(alias = "m_prop")]
    pub prop_mass: f64, // kg
    #[serde(alias = "ue", alias = "u_e")]
    pub exhaust_velocity: f64, // m/s
    pub dt: f64, // s
    #[serde(alias = "tmax", alias = "t_max")]
    pub max_time: f64, // s
    /// Explicit iteration cap. `None` sizes it from the horizon.
    pub max_steps: Option<usize>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            g: 9.81,
            rho: 1.225,
            cd: 0.5,
            area: 0.01,
            dry_mass: 20.0,
            prop_mass: 30.0,
            exhaust_velocity: 960.0,
            dt: 0.01,          // 100 Hz
            max_time: 60.0,
            max_steps: None,
        }
    }
}

impl SimConfig {
    /// Total mass at ignition.
    pub fn wet_mass(&self) -> f64 {
        self.dry_mass + self.prop_mass
    }

    /// Thrust-to-weight ratio at ignition.
    pub fn liftoff_twr(&self, motor: &MotorCurve) -> f64 {
        let thrust = motor.evaluate(0.0) * self.exhaust_velocity;
        thrust / (self.wet_mass() * self.g)
    }

    /// Iteration bound for one run: `max_steps` if set, otherwise enough
    /// steps to reach `max_time` with room for rounding drift in the
    /// accumulated time.
    pub fn step_limit(&self) -> usize {
        self.max_steps.unwrap_or_else(|| {
            let n = (self.max_time / self.dt).ceil() as usize;
            n.saturating_add(n / 1000).saturating_add(2)
        })
    }

    /// Ideal delta-v (Tsiolkovsky rocket equation).
    pub fn ideal_delta_v(&self) -> f64 {
        self.exhaust_velocity * (self.wet_mass() / self.dry_mass).ln()
    }

    /// Reject configurations the integrator cannot run meaningfully.
    pub fn validate(&self) -> Result<(), SimError> {
        let fields = [
            ("g", self.g),
            ("rho", self.rho),
            ("cd", self.cd),
            ("area", self.area),
            ("dry_mass", self.dry_mass),
            ("prop_mass", self.prop_mass),
            ("exhaust_velocity", self.exhaust_velocity),
            ("dt", self.dt),
            ("max_time", self.max_time),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(degenerate(format!("{name} must be finite, got {value}")));
        }
        if self.wet_mass() <= 0.0 {
            return Err(degenerate(format!(
                "total mass must be positive, got {}",
                self.wet_mass()
            )));
        }
        if self.dry_mass <= 0.0 {
            return Err(degenerate(format!(
                "dry_mass must be positive, got {}",
                self.dry_mass
            )));
        }
        if self.dt <= 0.0 {
            return Err(degenerate(format!("dt must be positive, got {}", self.dt)));
        }
        if self.max_time <= 0.0 {
            return Err(degenerate(format!(
                "max_time must be positive, got {}",
                self.max_time
            )));
        }
        let non_negative = [
            ("prop_mass", self.prop_mass),
            ("rho", self.rho),
            ("cd", self.cd),
            ("area", self.area),
            ("exhaust_velocity", self.exhaust_velocity),
        ];
        if let Some((name, value)) = non_negative.iter().find(|(_, v)| *v < 0.0) {
            return Err(degenerate(format!("{name} must not be negative, got {value}")));
        }
        Ok(())
    }
}

fn degenerate(msg: String) -> SimError {
    SimError::DegenerateConfig(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_at_rest_is_upward() {
        assert_eq!(thrust_sign(0.0), 1.0);
        assert_eq!(thrust_sign(-3.0), -1.0);
        assert_eq!(thrust_sign(1e-300), 1.0);
    }

    #[test]
    fn lerp_midpoint() {
        let a = FlightState { time: 1.0, alt: 10.0, vel: 4.0, mass: 3.0 };
        let b = FlightState { time: 1.1, alt: 12.0, vel: -2.0, mass: 2.0 };
        let m = a.lerp(&b, 0.5);
        assert!((m.time - 1.05).abs() < 1e-12);
        assert!((m.alt - 11.0).abs() < 1e-12);
        assert!((m.vel - 1.0).abs() < 1e-12);
        assert!((m.mass - 2.5).abs() < 1e-12);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn degenerate_configs_rejected() {
        let bad = [
            SimConfig { dt: 0.0, ..SimConfig::default() },
            SimConfig { dt: -0.01, ..SimConfig::default() },
            SimConfig { max_time: 0.0, ..SimConfig::default() },
            SimConfig { dry_mass: 0.0, prop_mass: 0.0, ..SimConfig::default() },
            SimConfig { dry_mass: -5.0, prop_mass: 2.0, ..SimConfig::default() },
            SimConfig { rho: f64::NAN, ..SimConfig::default() },
            SimConfig { area: -1.0, ..SimConfig::default() },
        ];
        for cfg in &bad {
            assert!(
                matches!(cfg.validate(), Err(SimError::DegenerateConfig(_))),
                "{cfg:?} should be rejected"
            );
        }
    }

    #[test]
    fn vacuum_and_zero_gravity_are_valid() {
        let cfg = SimConfig { rho: 0.0, g: 0.0, ..SimConfig::default() };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_accepts_short_keys() {
        let json = r#"{"Cd": 0.75, "A": 0.00581, "m_dry": 2.2, "m_prop": 0.625, "ue": 960, "tmax": 40}"#;
        let cfg: SimConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.cd, 0.75);
        assert_eq!(cfg.area, 0.00581);
        assert_eq!(cfg.dry_mass, 2.2);
        assert_eq!(cfg.prop_mass, 0.625);
        assert_eq!(cfg.exhaust_velocity, 960.0);
        assert_eq!(cfg.max_time, 40.0);
        // untouched fields keep their defaults
        assert_eq!(cfg.dt, 0.01);
    }

    #[test]
    fn step_limit_follows_the_horizon() {
        let long = SimConfig { dt: 1e-4, max_time: 1000.0, ..SimConfig::default() };
        assert!(long.step_limit() >= 10_000_000);
        assert!((6_000..=6_010).contains(&SimConfig::default().step_limit()));

        let capped = SimConfig { max_steps: Some(100), ..long };
        assert_eq!(capped.step_limit(), 100);
    }

    #[test]
    fn delta_v_positive_with_propellant() {
        let cfg = SimConfig::default();
        let expected = 960.0 * (50.0_f64 / 20.0).ln();
        assert!((cfg.ideal_delta_v() - expected).abs() < 1e-9);
    }
}
