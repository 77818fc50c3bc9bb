/// Computes the arithmetic mean of a slice of values. Returns `None` for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Rounds to one decimal place, half away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty_is_none() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_mean_is_order_independent() {
        let a = mean(&[12.0, 3.5, 40.0, 0.5]).unwrap();
        let b = mean(&[0.5, 40.0, 12.0, 3.5]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, 14.0);
    }

    #[test]
    fn test_mean_of_zeros_is_zero_not_none() {
        assert_eq!(mean(&[0.0, 0.0]), Some(0.0));
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(120.00000000000001), 120.0);
        assert_eq!(round1(33.333333), 33.3);
        assert_eq!(round1(17.26), 17.3);
        assert_eq!(round1(-4.04), -4.0);
    }
}
