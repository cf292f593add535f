pub mod forces;
pub mod state;

pub use forces::{forces, Forces};
pub use state::{FlightState, SimConfig, SIGN_AT_REST};
