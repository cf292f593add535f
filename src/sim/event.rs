use serde::Serialize;
use tracing::debug;

use crate::dynamics::state::{FlightState, SimConfig};
use crate::vehicle::MotorCurve;

// ---------------------------------------------------------------------------
// Flight events
// ---------------------------------------------------------------------------

/// Kinds of flight events, at most one of each per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EventKind {
    Meco,
    Apogee,
    Touchdown,
}

/// A flight event located inside a step by linear interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Event {
    pub kind: EventKind,
    pub time: f64,
    pub alt: f64,
    pub vel: f64,
}

impl Event {
    /// Event at fraction `theta` of the step `prev -> next`.
    fn between(kind: EventKind, prev: &FlightState, next: &FlightState, theta: f64) -> Self {
        let at = prev.lerp(next, theta);
        Self {
            kind,
            time: at.time,
            alt: at.alt,
            vel: at.vel,
        }
    }
}

/// Trait for passive event detectors.
/// Implementations inspect consecutive states and report each crossing once.
pub trait EventDetector {
    fn check(&mut self, prev: &FlightState, next: &FlightState) -> Option<Event>;
}

// ---------------------------------------------------------------------------
// MECO
// ---------------------------------------------------------------------------

/// Main engine cut-off: the tank runs dry, or the motor table burns out
/// while propellant remains.
pub struct MecoDetector {
    dry_mass: f64,
    burnout_time: Option<f64>,
    fired: bool,
}

impl MecoDetector {
    pub fn new(dry_mass: f64, burnout_time: Option<f64>) -> Self {
        Self { dry_mass, burnout_time, fired: false }
    }
}

impl EventDetector for MecoDetector {
    fn check(&mut self, prev: &FlightState, next: &FlightState) -> Option<Event> {
        if self.fired {
            return None;
        }

        let theta = if prev.mass > self.dry_mass && next.mass <= self.dry_mass {
            // tank empty
            (prev.mass - self.dry_mass) / (prev.mass - next.mass)
        } else {
            // still burning when the step runs past the end of the table
            match self.burnout_time {
                Some(t_bo) if prev.mass > next.mass && next.time >= t_bo => {
                    ((t_bo - prev.time) / (next.time - prev.time)).clamp(0.0, 1.0)
                }
                _ => return None,
            }
        };

        self.fired = true;
        Some(Event::between(EventKind::Meco, prev, next, theta))
    }
}

// ---------------------------------------------------------------------------
// Apogee
// ---------------------------------------------------------------------------

/// Vertical velocity goes from positive to non-positive.
///
/// Fires whether or not the motor is still burning.
#[derive(Default)]
pub struct ApogeeDetector {
    fired: bool,
}

impl EventDetector for ApogeeDetector {
    fn check(&mut self, prev: &FlightState, next: &FlightState) -> Option<Event> {
        if self.fired || !(prev.vel > 0.0 && next.vel <= 0.0) {
            return None;
        }
        self.fired = true;
        let theta = prev.vel / (prev.vel - next.vel);
        Some(Event::between(EventKind::Apogee, prev, next, theta))
    }
}

// ---------------------------------------------------------------------------
// Touchdown
// ---------------------------------------------------------------------------

/// Altitude returns to (or crosses) the ground while descending.
#[derive(Default)]
pub struct TouchdownDetector {
    fired: bool,
}

impl EventDetector for TouchdownDetector {
    fn check(&mut self, prev: &FlightState, next: &FlightState) -> Option<Event> {
        if self.fired || !(prev.alt > 0.0 && next.alt <= 0.0) {
            return None;
        }
        self.fired = true;
        let theta = prev.alt / (prev.alt - next.alt);
        Some(Event::between(EventKind::Touchdown, prev, next, theta))
    }
}

// ---------------------------------------------------------------------------
// Event log for one run
// ---------------------------------------------------------------------------

/// The three flight detectors plus the events they have reported so far.
pub struct FlightEvents {
    meco: MecoDetector,
    apogee: ApogeeDetector,
    touchdown: TouchdownDetector,
    events: Vec<Event>,
}

impl FlightEvents {
    pub fn new(config: &SimConfig, motor: &MotorCurve) -> Self {
        Self {
            meco: MecoDetector::new(config.dry_mass, motor.burnout_time()),
            apogee: ApogeeDetector::default(),
            touchdown: TouchdownDetector::default(),
            events: Vec::with_capacity(3),
        }
    }

    /// Check one step. Returns true when the vehicle touched down in it.
    pub fn scan(&mut self, prev: &FlightState, next: &FlightState) -> bool {
        let found = [
            self.meco.check(prev, next),
            self.apogee.check(prev, next),
            self.touchdown.check(prev, next),
        ];
        let mut landed = false;
        for event in found.into_iter().flatten() {
            debug!(kind = ?event.kind, t = event.time, h = event.alt, v = event.vel, "flight event");
            landed |= event.kind == EventKind::Touchdown;
            self.events.push(event);
        }
        landed
    }

    /// Events in chronological order.
    pub fn into_events(mut self) -> Vec<Event> {
        self.events.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.events
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn state(time: f64, alt: f64, vel: f64, mass: f64) -> FlightState {
        FlightState { time, alt, vel, mass }
    }

    #[test]
    fn apogee_interpolated_at_velocity_zero() {
        let mut det = ApogeeDetector::default();
        let prev = state(10.0, 800.0, 3.0, 2.2);
        let next = state(10.1, 800.3, -1.0, 2.2);
        let ev = det.check(&prev, &next).unwrap();
        assert_eq!(ev.kind, EventKind::Apogee);
        assert!((ev.time - 10.075).abs() < 1e-12);
        assert!((ev.alt - 800.225).abs() < 1e-9);
        assert!(ev.vel.abs() < 1e-12);
        // latched
        assert!(det.check(&prev, &next).is_none());
    }

    #[test]
    fn apogee_needs_strictly_positive_start() {
        let mut det = ApogeeDetector::default();
        assert!(det.check(&state(0.0, 0.0, 0.0, 3.0), &state(0.01, 0.0, 0.0, 3.0)).is_none());
        assert!(det.check(&state(0.0, 0.0, 0.0, 3.0), &state(0.01, 0.0, -0.1, 3.0)).is_none());
    }

    #[test]
    fn velocity_resting_on_zero_fires_once() {
        let mut det = ApogeeDetector::default();
        let a = state(1.0, 5.0, 1.0, 3.0);
        let b = state(1.1, 5.1, 0.0, 3.0);
        let c = state(1.2, 5.1, 0.0, 3.0);
        let ev = det.check(&a, &b).unwrap();
        assert!((ev.time - 1.1).abs() < 1e-12);
        assert!(det.check(&b, &c).is_none());
    }

    #[test]
    fn meco_on_tank_empty() {
        let mut det = MecoDetector::new(2.0, Some(10.0));
        let prev = state(1.0, 100.0, 80.0, 2.03);
        let next = state(1.1, 108.0, 90.0, 2.0);
        let ev = det.check(&prev, &next).unwrap();
        assert_eq!(ev.kind, EventKind::Meco);
        assert!((ev.time - 1.1).abs() < 1e-9);
        assert!(det.check(&prev, &next).is_none());
    }

    #[test]
    fn meco_partial_step_fraction() {
        let mut det = MecoDetector::new(2.0, None);
        // crossing a quarter of the way through the mass drop
        let prev = state(0.0, 0.0, 0.0, 2.1);
        let next = state(0.4, 4.0, 40.0, 1.7);
        let ev = det.check(&prev, &next).unwrap();
        assert!((ev.time - 0.1).abs() < 1e-12);
        assert!((ev.alt - 1.0).abs() < 1e-12);
        assert!((ev.vel - 10.0).abs() < 1e-12);
    }

    #[test]
    fn meco_on_curve_burnout() {
        let mut det = MecoDetector::new(2.2, Some(2.0));
        let prev = state(1.99, 190.0, 165.0, 2.28);
        let next = state(2.01, 193.3, 165.2, 2.279);
        let ev = det.check(&prev, &next).unwrap();
        assert!((ev.time - 2.0).abs() < 1e-12);
        assert!((ev.alt - 191.65).abs() < 1e-9);
    }

    #[test]
    fn no_meco_without_burn() {
        let mut det = MecoDetector::new(2.2, Some(2.0));
        // coasting past the table end with no flow
        let prev = state(3.0, 300.0, 120.0, 2.3);
        let next = state(3.01, 301.2, 119.9, 2.3);
        assert!(det.check(&prev, &next).is_none());
    }

    #[test]
    fn touchdown_interpolated() {
        let mut det = TouchdownDetector::default();
        let prev = state(27.8, 2.0, -40.0, 2.2);
        let next = state(27.9, -2.0, -40.5, 2.2);
        let ev = det.check(&prev, &next).unwrap();
        assert_eq!(ev.kind, EventKind::Touchdown);
        assert!((ev.time - 27.85).abs() < 1e-12);
        assert!(ev.alt.abs() < 1e-12);
    }

    #[test]
    fn liftoff_from_ground_is_not_touchdown() {
        let mut det = TouchdownDetector::default();
        assert!(det.check(&state(0.0, 0.0, 0.0, 3.0), &state(0.01, 0.0, 1.0, 3.0)).is_none());
    }

    #[test]
    fn log_orders_events_chronologically() {
        let cfg = SimConfig { dry_mass: 2.0, ..SimConfig::default() };
        let motor = MotorCurve::new(vec![(0.0, 1.0), (0.5, 1.0)]).unwrap();
        let mut log = FlightEvents::new(&cfg, &motor);

        // one coarse step: apogee a quarter in, tank empty at the end
        let prev = state(0.0, 1.0, 1.0, 2.1);
        let next = state(1.0, 1.5, -3.0, 2.0);
        assert!(!log.scan(&prev, &next));

        let events = log.into_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::Apogee);
        assert_eq!(events[1].kind, EventKind::Meco);
        assert!(events[0].time <= events[1].time);
    }
}
