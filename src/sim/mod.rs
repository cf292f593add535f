pub mod convergence;
pub mod event;
pub mod integrator;
pub mod runner;

pub use convergence::{ConvergenceReport, Signal};
pub use event::{Event, EventKind};
pub use integrator::euler_step;
pub use runner::{simulate, Maxima, RunResult};
