//! Shortest-round-trip float rendering matching the `Number.prototype.toString`
//! shape spec.md §4.2 pins (`10000000000000000000`, `1e+52`): plain decimal
//! for moderate exponents, explicit-sign scientific notation otherwise.

/// Render `f64`. Returns `None` for `inf`/`-inf`/`nan` (callers render those
/// as `null`/empty per the caller's format).
pub fn format_f64(x: f64) -> Option<String> {
    if x.is_nan() || x.is_infinite() {
        return None;
    }
    Some(render_finite(x, format!("{:e}", x)))
}

/// Render `f32`. The value is formatted through its own shortest-round-trip
/// exponential form (not upcast to `f64` precision first), matching the
/// pinned out-of-range-float32 test.
pub fn format_f32(x: f32) -> Option<String> {
    if x.is_nan() || x.is_infinite() {
        return None;
    }
    Some(render_finite(x as f64, format!("{:e}", x)))
}

fn render_finite(x: f64, sci: String) -> String {
    if x == 0.0 {
        return if x.is_sign_negative() {
            "-0".to_string()
        } else {
            "0".to_string()
        };
    }

    let negative = sci.starts_with('-');
    let unsigned = sci.strip_prefix('-').unwrap_or(&sci);
    let (mantissa, exp_str) = unsigned.split_once('e').expect("LowerExp always emits 'e'");
    let exponent: i32 = exp_str.parse().expect("LowerExp exponent is a plain integer");
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let mut out = String::new();
    if negative {
        out.push('-');
    }

    if exponent >= 0 && exponent <= 20 {
        let int_len = (exponent as usize) + 1;
        if digits.len() <= int_len {
            out.push_str(&digits);
            out.push_str(&"0".repeat(int_len - digits.len()));
        } else {
            out.push_str(&digits[..int_len]);
            out.push('.');
            out.push_str(&digits[int_len..]);
        }
    } else if exponent < 0 && exponent >= -6 {
        out.push_str("0.");
        out.push_str(&"0".repeat((-exponent - 1) as usize));
        out.push_str(&digits);
    } else {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('e');
        if exponent >= 0 {
            out.push('+');
        }
        out.push_str(&exponent.to_string());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_simple_decimal() {
        assert_eq!(format_f64(0.12314).unwrap(), "0.12314");
    }

    #[test]
    fn renders_out_of_range_f64_as_scientific() {
        assert_eq!(format_f64(1e52).unwrap(), "1e+52");
    }

    #[test]
    fn renders_out_of_range_f32_as_plain_decimal() {
        // 1e19 is within f32 range and has exponent 19 < 21.
        assert_eq!(format_f32(1e19_f32).unwrap(), "10000000000000000000");
    }

    #[test]
    fn renders_negative_exponent_scientific() {
        assert_eq!(format_f64(1.5e-10).unwrap(), "1.5e-10");
    }

    #[test]
    fn inf_and_nan_are_none() {
        assert!(format_f64(f64::INFINITY).is_none());
        assert!(format_f64(f64::NEG_INFINITY).is_none());
        assert!(format_f64(f64::NAN).is_none());
    }

    #[test]
    fn negative_whole_number() {
        assert_eq!(format_f64(-5.0).unwrap(), "-5");
    }
}
