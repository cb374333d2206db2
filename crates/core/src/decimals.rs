//! Decimal precision inference

use fieldkit_types::{number_to_string, DecimalCount, DecimalInfo};

/// Number of significant digits in the decimal rendering of `value`
///
/// The decimal point is dropped and leading/trailing zeros do not count.
pub fn significant_digit_count(value: f64) -> i32 {
    let rendered = number_to_string(value.abs()).replace('.', "");
    let digits: String = rendered.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.trim_start_matches('0').trim_end_matches('0').len() as i32
}

/// Work out how many decimals to show for `value`.
///
/// An explicit override is returned verbatim with no scaled decimals.
/// Otherwise `decimals` suits the value on its own, while `scaled_decimals`
/// is the precision needed when values share an axis.
pub fn get_decimals_for_value(value: f64, decimal_override: DecimalCount) -> DecimalInfo {
    if let Some(decimals) = decimal_override {
        return DecimalInfo {
            decimals,
            scaled_decimals: None,
        };
    }

    if value == 0.0 || !value.is_finite() {
        return DecimalInfo {
            decimals: 0,
            scaled_decimals: Some(0),
        };
    }

    let digits = significant_digit_count(value);
    let log10 = value.abs().log10().floor() as i32;
    let mut dec = -log10 + 1;

    let magnitude = 10f64.powi(-dec);
    let norm = value / magnitude;

    // special case for 2.5
    if norm > 2.25 {
        dec += 1;
    }

    if value % 1.0 == 0.0 {
        dec = 0;
    }

    let decimals = dec.max(0);
    DecimalInfo {
        decimals,
        scaled_decimals: Some(decimals - log10 + digits - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(decimals: i32, scaled: i32) -> DecimalInfo {
        DecimalInfo {
            decimals,
            scaled_decimals: Some(scaled),
        }
    }

    #[test]
    fn test_significant_digits() {
        assert_eq!(significant_digit_count(0.0123), 3);
        assert_eq!(significant_digit_count(1200.0), 2);
        assert_eq!(significant_digit_count(-1.5), 2);
        assert_eq!(significant_digit_count(1.5e-7), 2);
        assert_eq!(significant_digit_count(0.0), 0);
    }

    #[test]
    fn test_override_is_verbatim() {
        assert_eq!(
            get_decimals_for_value(1.23456, Some(3)),
            DecimalInfo {
                decimals: 3,
                scaled_decimals: None
            }
        );
    }

    #[test]
    fn test_zero() {
        assert_eq!(get_decimals_for_value(0.0, None), info(0, 0));
    }

    #[test]
    fn test_inferred_decimals() {
        assert_eq!(get_decimals_for_value(1.2345, None), info(2, 6));
        assert_eq!(get_decimals_for_value(0.0123, None), info(4, 8));
        assert_eq!(get_decimals_for_value(-1.5, None), info(1, 2));
    }

    #[test]
    fn test_integers_have_no_decimals() {
        assert_eq!(get_decimals_for_value(100.0, None), info(0, -2));
        assert_eq!(get_decimals_for_value(5.0, None), info(0, 0));
    }

    #[test]
    fn test_deterministic() {
        for v in [0.37, 12.5, -981.25, 3.0e-4] {
            assert_eq!(get_decimals_for_value(v, None), get_decimals_for_value(v, None));
        }
    }

    #[test]
    fn test_non_finite_values() {
        assert_eq!(get_decimals_for_value(f64::INFINITY, None), info(0, 0));
        assert_eq!(get_decimals_for_value(f64::NAN, None), info(0, 0));
    }
}
