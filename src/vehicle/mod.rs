pub mod motor;
pub mod presets;

pub use motor::MotorCurve;
