use std::collections::BTreeMap;
use std::thread;

use nalgebra::DVector;
use serde::Serialize;
use tracing::info;

use crate::dynamics::state::{FlightState, SimConfig};
use crate::error::SimError;
use crate::vehicle::MotorCurve;
use super::runner::{simulate, RunResult};

/// Relative error a caller would typically accept.
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Keeps the ratio finite when the fine signal is identically zero.
const EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Step-halving convergence check
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Signal {
    #[serde(rename = "h")]
    Altitude,
    #[serde(rename = "V")]
    Velocity,
}

impl Signal {
    pub const ALL: [Signal; 2] = [Signal::Altitude, Signal::Velocity];

    fn of(self, state: &FlightState) -> f64 {
        match self {
            Signal::Altitude => state.alt,
            Signal::Velocity => state.vel,
        }
    }
}

/// Discrepancy between a run at `dt` and the same run at `dt / 2`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceReport {
    pub dt: f64,
    pub relative_error: BTreeMap<Signal, f64>,
}

impl ConvergenceReport {
    pub fn converged(&self, tolerance: f64) -> bool {
        self.relative_error.values().all(|&e| e <= tolerance)
    }

    /// Largest error over all signals.
    pub fn worst(&self) -> f64 {
        self.relative_error.values().copied().fold(0.0, f64::max)
    }
}

/// Run the scenario at `config.dt` and at half of it, then compare.
///
///   E_rel = max|y_dt - y_dt/2| / (max|y_dt/2| + eps)
///
/// The fine trace is resampled onto the coarse time points, limited to the
/// span both runs cover. An explicit step cap is doubled for the fine run.
pub fn check(config: &SimConfig, motor: &MotorCurve) -> Result<ConvergenceReport, SimError> {
    config.validate()?;
    let fine_config = SimConfig {
        dt: config.dt / 2.0,
        max_steps: config.max_steps.map(|n| n.saturating_mul(2)),
        ..*config
    };

    let (coarse, fine) = thread::scope(|s| {
        let fine = s.spawn(|| simulate(&fine_config, motor));
        let coarse = simulate(config, motor);
        let fine = fine.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        (coarse, fine)
    });
    let (coarse, fine) = (coarse?, fine?);

    let relative_error: BTreeMap<Signal, f64> = Signal::ALL
        .into_iter()
        .map(|signal| (signal, relative_error(&coarse, &fine, signal)))
        .collect();

    info!(
        dt = config.dt,
        e_h = relative_error[&Signal::Altitude],
        e_v = relative_error[&Signal::Velocity],
        "convergence check"
    );

    Ok(ConvergenceReport {
        dt: config.dt,
        relative_error,
    })
}

fn relative_error(coarse: &RunResult, fine: &RunResult, signal: Signal) -> f64 {
    let end = coarse.final_state().time.min(fine.final_state().time);
    let points: Vec<&FlightState> = coarse
        .trajectory
        .iter()
        .take_while(|s| s.time <= end)
        .collect();

    let reference = DVector::from_iterator(
        points.len(),
        points.iter().map(|s| resample(&fine.trajectory, s.time, signal)),
    );
    let measured = DVector::from_iterator(points.len(), points.iter().map(|s| signal.of(s)));

    if reference.is_empty() {
        return 0.0;
    }
    (measured - &reference).amax() / (reference.amax() + EPSILON)
}

/// Linear interpolation of `signal` along `trace` at time `t`, held constant
/// past either end.
fn resample(trace: &[FlightState], t: f64, signal: Signal) -> f64 {
    let hi = trace.partition_point(|s| s.time <= t);
    if hi == 0 {
        return signal.of(&trace[0]);
    }
    let a = &trace[hi - 1];
    if hi == trace.len() || a.time == t {
        return signal.of(a);
    }
    let b = &trace[hi];
    let theta = (t - a.time) / (b.time - a.time);
    signal.of(a) + theta * (signal.of(b) - signal.of(a))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::presets;

    #[test]
    fn reference_scenario_is_converged_at_centisecond_step() {
        let report = check(&presets::reference_config(), &presets::reference_motor()).unwrap();
        assert_eq!(report.dt, 0.01);
        assert_eq!(report.relative_error.len(), 2);
        assert!(report.converged(DEFAULT_TOLERANCE), "{:?}", report.relative_error);
        assert!(report.worst() > 0.0, "Euler at two step sizes cannot agree exactly");
    }

    #[test]
    fn halving_dt_shrinks_the_error() {
        let motor = presets::reference_motor();
        let errors: Vec<ConvergenceReport> = [0.02, 0.01, 0.005]
            .into_iter()
            .map(|dt| {
                let cfg = SimConfig { dt, ..presets::reference_config() };
                check(&cfg, &motor).unwrap()
            })
            .collect();

        for w in errors.windows(2) {
            for signal in Signal::ALL {
                let (coarse, fine) = (w[0].relative_error[&signal], w[1].relative_error[&signal]);
                assert!(fine < coarse, "{signal:?}: {fine} at dt = {} vs {coarse}", w[1].dt);
            }
        }
    }

    #[test]
    fn first_order_rate() {
        // forward Euler: error roughly halves with the step
        let motor = presets::reference_motor();
        let at = |dt: f64| {
            let cfg = SimConfig { dt, ..presets::reference_config() };
            check(&cfg, &motor).unwrap().relative_error[&Signal::Altitude]
        };
        let ratio = at(0.01) / at(0.005);
        assert!((1.6..2.4).contains(&ratio), "ratio = {ratio}");
    }

    #[test]
    fn resample_interpolates_and_holds_ends() {
        let trace = [
            FlightState { time: 0.0, alt: 0.0, vel: 10.0, mass: 1.0 },
            FlightState { time: 1.0, alt: 10.0, vel: 0.0, mass: 1.0 },
        ];
        assert!((resample(&trace, 0.25, Signal::Altitude) - 2.5).abs() < 1e-12);
        assert!((resample(&trace, 0.25, Signal::Velocity) - 7.5).abs() < 1e-12);
        assert_eq!(resample(&trace, 1.0, Signal::Altitude), 10.0);
        assert_eq!(resample(&trace, 3.0, Signal::Altitude), 10.0);
        assert_eq!(resample(&trace, -1.0, Signal::Velocity), 10.0);
    }

    #[test]
    fn tolerance_is_inclusive() {
        let report = ConvergenceReport {
            dt: 0.01,
            relative_error: BTreeMap::from([(Signal::Altitude, 0.01), (Signal::Velocity, 0.002)]),
        };
        assert!(report.converged(0.01));
        assert!(!report.converged(0.005));
    }

    #[test]
    fn degenerate_config_is_reported() {
        let cfg = SimConfig { dt: -0.01, ..presets::reference_config() };
        assert!(matches!(
            check(&cfg, &presets::reference_motor()),
            Err(SimError::DegenerateConfig(_))
        ));
    }

    #[test]
    fn report_serializes_with_short_keys() {
        let report = ConvergenceReport {
            dt: 0.01,
            relative_error: BTreeMap::from([(Signal::Altitude, 0.5), (Signal::Velocity, 0.25)]),
        };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"dt":0.01,"relative_error":{"h":0.5,"V":0.25}}"#);
    }
}
