//! Number formatting for the output files.
//!
//! Output files use the default notation of a C++ output stream: `%g` with
//! six significant digits. Consumers of the files parse them with the same
//! conventions, so the notation is reproduced exactly.

use std::fmt;

/// Significant digits of the default stream notation.
pub const SIGNIFICANT_DIGITS: i32 = 6;

/// Round half up to four decimal places.
///
/// ```
/// use skelfit::export::round4;
///
/// assert_eq!(round4(0.12345), 0.1235);
/// assert_eq!(round4(0.12344999), 0.1234);
/// ```
#[inline]
pub fn round4(w: f64) -> f64 {
    (w * 10000.0 + 0.5).floor() / 10000.0
}

/// Displays a float in `%g` notation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct General(pub f64);

impl fmt::Display for General {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0;
        if value.is_nan() {
            return f.write_str(if value.is_sign_negative() { "-nan" } else { "nan" });
        }
        if value.is_infinite() {
            return f.write_str(if value < 0.0 { "-inf" } else { "inf" });
        }
        if value == 0.0 {
            return f.write_str(if value.is_sign_negative() { "-0" } else { "0" });
        }

        // Round to the significant digits first; the exponent of the rounded
        // value picks the notation.
        let precision = (SIGNIFICANT_DIGITS - 1) as usize;
        let scientific = format!("{:.*e}", precision, value);
        let (mantissa, exponent) = scientific
            .split_once('e')
            .ok_or(fmt::Error)?;
        let exponent: i32 = exponent.parse().map_err(|_| fmt::Error)?;

        if exponent < -4 || exponent >= SIGNIFICANT_DIGITS {
            let sign = if exponent < 0 { '-' } else { '+' };
            write!(
                f,
                "{}e{}{:02}",
                trim_fraction(mantissa),
                sign,
                exponent.abs()
            )
        } else {
            let decimals = (SIGNIFICANT_DIGITS - 1 - exponent) as usize;
            let fixed = format!("{:.*}", decimals, value);
            f.write_str(trim_fraction(&fixed))
        }
    }
}

/// Format `value` in `%g` notation.
pub fn format_general(value: f64) -> String {
    General(value).to_string()
}

/// Drop trailing zeros of the fraction, and the point if nothing is left.
fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}
