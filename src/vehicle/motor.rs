use crate::error::SimError;

// ---------------------------------------------------------------------------
// Motor mass-flow curve
// ---------------------------------------------------------------------------

/// Tabulated propellant mass flow `(t_k, mdot_k)`, linearly interpolated.
///
/// Times are strictly increasing and flows non-negative. Outside the tabulated
/// span the motor delivers nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct MotorCurve {
    samples: Vec<(f64, f64)>, // (s, kg/s)
}

impl MotorCurve {
    pub fn new(samples: Vec<(f64, f64)>) -> Result<Self, SimError> {
        if samples.is_empty() {
            return Err(SimError::InvalidCurve("curve has no samples".into()));
        }
        for (k, &(t, mdot)) in samples.iter().enumerate() {
            if !t.is_finite() || !mdot.is_finite() {
                return Err(SimError::InvalidCurve(format!(
                    "sample {k} is not finite: ({t}, {mdot})"
                )));
            }
            if mdot < 0.0 {
                return Err(SimError::InvalidCurve(format!(
                    "negative mass flow {mdot} kg/s at t = {t} s"
                )));
            }
        }
        if let Some(w) = samples.windows(2).find(|w| w[1].0 <= w[0].0) {
            return Err(SimError::InvalidCurve(format!(
                "times must be strictly increasing: {} s followed by {} s",
                w[0].0, w[1].0
            )));
        }
        Ok(Self { samples })
    }

    /// Build from parallel time and flow columns.
    pub fn from_columns(times: &[f64], flows: &[f64]) -> Result<Self, SimError> {
        if times.len() != flows.len() {
            return Err(SimError::InvalidCurve(format!(
                "column length mismatch: {} times, {} flows",
                times.len(),
                flows.len()
            )));
        }
        Self::new(times.iter().copied().zip(flows.iter().copied()).collect())
    }

    /// Mass flow at time `t` (kg/s).
    pub fn evaluate(&self, t: f64) -> f64 {
        let (t0, _) = self.samples[0];
        let (tn, _) = self.samples[self.samples.len() - 1];
        if !(t0..=tn).contains(&t) {
            return 0.0;
        }

        // first sample strictly after t
        let hi = self.samples.partition_point(|&(tk, _)| tk <= t);
        if hi == 0 {
            return self.samples[0].1;
        }
        let (ta, ma) = self.samples[hi - 1];
        if ta == t || hi == self.samples.len() {
            return ma;
        }
        let (tb, mb) = self.samples[hi];
        ma + (mb - ma) / (tb - ta) * (t - ta)
    }

    pub fn samples(&self) -> &[(f64, f64)] {
        &self.samples
    }

    pub fn start_time(&self) -> f64 {
        self.samples[0].0
    }

    pub fn end_time(&self) -> f64 {
        self.samples[self.samples.len() - 1].0
    }

    /// Largest tabulated flow.
    pub fn peak_flow(&self) -> f64 {
        self.samples.iter().map(|&(_, m)| m).fold(0.0_f64, f64::max)
    }

    /// Propellant the table delivers if burned to the end (trapezoid rule).
    pub fn total_propellant(&self) -> f64 {
        self.samples
            .windows(2)
            .map(|w| 0.5 * (w[0].1 + w[1].1) * (w[1].0 - w[0].0))
            .sum()
    }

    /// Instant after which the table never delivers flow again.
    ///
    /// `None` if the curve is zero everywhere.
    pub fn burnout_time(&self) -> Option<f64> {
        let last_lit = self.samples.iter().rposition(|&(_, m)| m > 0.0)?;
        let idx = (last_lit + 1).min(self.samples.len() - 1);
        Some(self.samples[idx].0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
