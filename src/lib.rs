//! Vertical (1-DoF) rocket flight: fixed-step Euler integration of altitude,
//! velocity and mass, with MECO, apogee and touchdown detection and a
//! step-halving convergence check.

pub mod dynamics;
pub mod error;
pub mod io;
pub mod physics;
pub mod sim;
pub mod vehicle;

pub use dynamics::{FlightState, Forces, SimConfig};
pub use error::SimError;
pub use sim::{simulate, ConvergenceReport, Event, EventKind, RunResult};
pub use vehicle::MotorCurve;
