/// Standard gravity, m/s^2. Used only to express loads in g.
pub const G0: f64 = 9.80665;

/// Weight of the vehicle under uniform gravity `g` (N, acting down).
pub fn weight(mass: f64, g: f64) -> f64 {
    mass * g
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_scales_with_mass() {
        assert!((weight(2.825, 9.78) - 27.6285).abs() < 1e-9);
        assert_eq!(weight(10.0, 0.0), 0.0);
    }
}
