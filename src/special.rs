use statrs::function::gamma::ln_gamma;

/// Natural log of the gamma function.
#[inline]
pub fn gammaln(z: f64) -> f64 {
    ln_gamma(z)
}

/// `ln(k!)`, for any real `k > -1`.
#[inline]
pub fn ln_factorial(k: f64) -> f64 {
    gammaln(k + 1.0)
}

/// `a * ln(b)`, defined as exactly zero whenever `a == 0`, so `xlogy(0, 0)`
/// is 0 rather than `0 * -inf = NaN`.
#[inline]
pub fn xlogy(a: f64, b: f64) -> f64 {
    let nonzero = a != 0.0;
    let safe_a = select(nonzero, a, 1.0);
    let safe_b = select(nonzero, b, 1.0);
    select(nonzero, safe_a * safe_b.ln(), 0.0)
}

/// Elementwise where: picks `on_true` or `on_false` without diverging control
/// flow, so it vectorizes inside array loops.
#[inline]
pub fn select(pred: bool, on_true: f64, on_false: f64) -> f64 {
    if pred { on_true } else { on_false }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gammaln() {
        assert!(gammaln(1.0).abs() < 1e-12);
        assert!(gammaln(2.0).abs() < 1e-12);
        assert!((gammaln(5.0) - 24f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_ln_factorial() {
        assert!(ln_factorial(0.0).abs() < 1e-12);
        assert!((ln_factorial(5.0) - 120f64.ln()).abs() < 1e-12);
        assert!((ln_factorial(20.0) - 2432902008176640000f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn test_xlogy() {
        assert_eq!(xlogy(0.0, 0.0), 0.0);
        assert_eq!(xlogy(0.0, f64::NAN), 0.0);
        assert_eq!(xlogy(0.0, 0.5), 0.0);
        assert!((xlogy(2.0, 0.5) - 2.0 * 0.5f64.ln()).abs() < 1e-15);
        assert_eq!(xlogy(1.0, 0.0), f64::NEG_INFINITY);
        assert!(xlogy(1.0, -1.0).is_nan());
    }

    #[test]
    fn test_select() {
        assert_eq!(select(true, 1.0, f64::NEG_INFINITY), 1.0);
        assert_eq!(select(false, 1.0, f64::NEG_INFINITY), f64::NEG_INFINITY);
    }
}
