//! Statistical utility functions shared by the evaluation crates.
//!
//! Series handled here use `NaN` for undefined observations. Every helper
//! skips non-finite values, matching how return series are summarised.

/// Minimum threshold for a standard deviation or standard error.
/// Values at or below this threshold are treated as zero.
pub const MIN_STD_THRESHOLD: f64 = 1e-10;

/// Copies the finite observations of a series, preserving order.
///
/// # Examples
///
/// ```
/// use ronda_traits::stats::finite_values;
///
/// let compact = finite_values(&[0.1, f64::NAN, -0.2]);
/// assert_eq!(compact, vec![0.1, -0.2]);
/// ```
pub fn finite_values(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|x| x.is_finite()).collect()
}

/// Arithmetic mean of the finite observations, `NaN` if there are none.
pub fn mean(values: &[f64]) -> f64 {
    let (sum, n) = values
        .iter()
        .filter(|x| x.is_finite())
        .fold((0.0, 0usize), |(sum, n), x| (sum + x, n + 1));

    if n == 0 { f64::NAN } else { sum / n as f64 }
}

/// Sample standard deviation (N-1 denominator) of the finite observations.
///
/// Returns `NaN` with fewer than two observations.
pub fn sample_std(values: &[f64]) -> f64 {
    let finite = finite_values(values);
    let n = finite.len();
    if n < 2 {
        return f64::NAN;
    }

    let m = finite.iter().sum::<f64>() / n as f64;
    // Sample variance with N-1 denominator (Bessel's correction)
    let variance = finite.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// Divides an estimate by its standard error.
///
/// A standard error that is not a positive number above
/// [`MIN_STD_THRESHOLD`] yields `NaN` instead of an infinite or spurious ratio.
pub fn ratio_to_std_error(estimate: f64, std_error: f64) -> f64 {
    if std_error.is_finite() && std_error > MIN_STD_THRESHOLD {
        estimate / std_error
    } else {
        f64::NAN
    }
}

/// Element-wise `a - b`; `NaN` wherever either side is undefined.
pub fn difference(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            if x.is_finite() && y.is_finite() {
                x - y
            } else {
                f64::NAN
            }
        })
        .collect()
}
