//! Zero-guarded ratios shared by the dashboards and the queue monitor.

/// `part / whole * 100`, or 0 when `whole` is not positive.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}

/// `numerator / denominator`, or 0 when the denominator is not positive.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 { numerator / denominator } else { 0.0 }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guards_against_zero() {
        assert_eq!(percentage(5.0, 0.0), 0.0);
        assert_eq!(ratio(5.0, 0.0), 0.0);
        assert_eq!(percentage(0.0, 0.0), 0.0);
        assert_eq!(percentage(25.0, 200.0), 12.5);
        assert_eq!(ratio(9.0, 3.0), 3.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(4.25, 1), 4.3);
        assert_eq!(round_to(3.14159, 2), 3.14);
        assert_eq!(round_to(0.0, 1), 0.0);
    }
}
