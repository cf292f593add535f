//! Error types for the simulation engine.
//!
//! Every failure is terminal: a run either completes or reports one of these.

/// Errors raised while building a motor curve or running a simulation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// The mass-flow table is malformed or physically inconsistent.
    #[error("invalid motor curve: {0}")]
    InvalidCurve(String),

    /// A mass, step or horizon that makes the run meaningless.
    #[error("degenerate configuration: {0}")]
    DegenerateConfig(String),

    /// The iteration bound was hit before `max_time` or touchdown.
    #[error("simulation did not terminate after {steps} steps (t = {time:.3} s)")]
    NonTerminating {
        /// Steps taken when the bound tripped.
        steps: usize,
        /// Simulation time reached.
        time: f64,
    },
}
