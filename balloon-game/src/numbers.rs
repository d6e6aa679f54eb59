//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert a counter to f64 in a single location.
#[must_use]
pub fn u32_to_f64(value: u32) -> f64 {
    f64::from(value)
}

/// Convert a usize length to f64, returning 0.0 if the cast is lossy beyond repair.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Divide two counters, returning 0.0 when the denominator is zero.
#[must_use]
pub fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    u32_to_f64(numerator) / u32_to_f64(denominator)
}

/// Percentage of `part` in `whole`, returning 0.0 when `whole` is zero.
#[must_use]
pub fn percent(part: u32, whole: u32) -> f64 {
    ratio(part, whole) * 100.0
}

/// Format a value with one decimal place, mapping non-finite values to 0.0.
#[must_use]
pub fn one_decimal(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{value:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_handles_zero_denominator() {
        assert!(ratio(5, 0).abs() < f64::EPSILON);
        assert!((ratio(3, 4) - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn percent_scales_ratio() {
        assert!((percent(1, 2) - 50.0).abs() < f64::EPSILON);
        assert!(percent(0, 0).abs() < f64::EPSILON);
    }

    #[test]
    fn one_decimal_formats_and_guards_nan() {
        assert_eq!(one_decimal(2.26), "2.3");
        assert_eq!(one_decimal(10.0), "10.0");
        assert_eq!(one_decimal(f64::NAN), "0.0");
    }

    #[test]
    fn usize_conversion_is_exact_for_small_values() {
        assert!((usize_to_f64(42) - 42.0).abs() < f64::EPSILON);
    }
}
