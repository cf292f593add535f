use std::f64::consts::PI;

/// Dynamic pressure carrying the sign of the velocity: `0.5 rho V |V|`.
pub fn signed_dynamic_pressure(vel: f64, rho: f64) -> f64 {
    0.5 * rho * vel * vel.abs()
}

/// Axial drag force along +up. Positive while ascending, negative while
/// descending, zero at rest.
pub fn drag_force(vel: f64, rho: f64, cd: f64, area: f64) -> f64 {
    signed_dynamic_pressure(vel, rho) * cd * area
}

/// Reference area of a circular body of diameter `d`.
pub fn area_from_diameter(d: f64) -> f64 {
    PI * (d / 2.0).powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_follows_velocity_sign() {
        let up = drag_force(100.0, 1.225, 0.5, 0.01);
        let down = drag_force(-100.0, 1.225, 0.5, 0.01);
        assert!(up > 0.0);
        assert!((up + down).abs() < 1e-12, "drag must be odd in V");
        assert!((up - 0.5 * 1.225 * 100.0 * 100.0 * 0.5 * 0.01).abs() < 1e-9);
    }

    #[test]
    fn no_drag_at_rest_or_in_vacuum() {
        assert_eq!(drag_force(0.0, 1.225, 0.5, 0.01), 0.0);
        assert_eq!(drag_force(250.0, 0.0, 0.5, 0.01), 0.0);
    }

    #[test]
    fn area_of_15cm_body() {
        let a = area_from_diameter(0.15);
        assert!((a - 0.017_671_458_676_442_587).abs() < 1e-12);
    }
}
