//! Numeric scan and print helpers for the protocol's number bodies.
//!
//! Numbers arrive either as plain decimals or in sexagesimal form
//! (colon- or space-separated `deg[:min[:sec]]`). Outbound values are
//! rendered through a member's printf-like format string, where a
//! trailing `m` conversion selects the sexagesimal form. All output
//! uses the decimal point regardless of the process locale; Rust's
//! float formatting guarantees that on its own.

use crate::{types::Error, Result};
use std::fmt::Write as _;

/// Parses a number body. Accepts a plain decimal or up to three
/// colon/space-separated fields; the sign of the whole value is taken
/// from the leading character.
pub fn scan_sexa(s: &str) -> Result<f64> {
    let s = s.trim();

    if s.is_empty() {
        return Err(Error::ParseError(String::from("empty number")));
    }

    let neg = s.starts_with('-');
    let fields: Vec<&str> = s
        .split(|c: char| c == ':' || c.is_whitespace())
        .filter(|v| !v.is_empty())
        .collect();

    if fields.is_empty() || fields.len() > 3 {
        return Err(Error::ParseError(format!("bad number '{}'", s)));
    }

    let mut parsed = Vec::with_capacity(3);

    for field in &fields {
        match field.parse::<f64>() {
            Ok(v) if v.is_finite() => parsed.push(v),
            _ => {
                return Err(Error::ParseError(format!("bad number '{}'", s)))
            }
        }
    }

    let deg = parsed[0];
    let min = parsed.get(1).copied().unwrap_or(0.0);
    let sec = parsed.get(2).copied().unwrap_or(0.0);

    // The minute and second fields carry no sign of their own.

    if min < 0.0 || sec < 0.0 {
        return Err(Error::ParseError(format!("bad number '{}'", s)));
    }

    let magnitude = deg.abs() + min / 60.0 + sec / 3600.0;

    Ok(if neg { -magnitude } else { magnitude })
}

/// Renders `value` in sexagesimal form. `width` is the field width of
/// the leading degrees component, sign included; `fracbase` selects
/// the resolution: 60 (minutes), 600 (tenths of a minute), 3600
/// (seconds), 36000 (tenths of a second) or 360000 (hundredths).
pub fn print_sexa(value: f64, width: usize, fracbase: i64) -> String {
    let n = (value.abs() * fracbase as f64 + 0.5) as i64;
    let d = n / fracbase;
    let f = n % fracbase;
    let head = format!("{}{}", if value < 0.0 { "-" } else { "" }, d);
    let mut out = String::new();

    let _ = write!(out, "{:>1$}", head, width);

    let _ = match fracbase {
        60 => write!(out, ":{:02}", f),
        600 => write!(out, ":{:02}.{}", f / 10, f % 10),
        3600 => write!(out, ":{:02}:{:02}", f / 60, f % 60),
        36000 => {
            write!(out, ":{:02}:{:02}.{}", f / 600, (f / 10) % 60, f % 10)
        }
        _ => {
            write!(out, ":{:02}:{:02}.{:02}", f / 6000, (f / 100) % 60, f % 100)
        }
    };
    out
}

// The pieces of a printf-like specification we honor: an optional
// width, an optional precision and the conversion character.

struct Spec {
    width: usize,
    precision: Option<usize>,
    conversion: char,
}

fn parse_spec(format: &str) -> Option<Spec> {
    let mut chars = format.strip_prefix('%')?.chars().peekable();
    let mut width = 0usize;
    let mut precision = None;

    while let Some(&c) = chars.peek() {
        if c == '-' || c == '+' || c == ' ' || c == '0' {
            chars.next();
        } else {
            break;
        }
    }

    while let Some(&c) = chars.peek() {
        if let Some(d) = c.to_digit(10) {
            width = width * 10 + d as usize;
            chars.next();
        } else {
            break;
        }
    }

    if chars.peek() == Some(&'.') {
        chars.next();

        let mut p = 0usize;

        while let Some(&c) = chars.peek() {
            if let Some(d) = c.to_digit(10) {
                p = p * 10 + d as usize;
                chars.next();
            } else {
                break;
            }
        }
        precision = Some(p);
    }

    let conversion = chars.next()?;

    if chars.next().is_some() {
        return None;
    }

    Some(Spec {
        width,
        precision,
        conversion,
    })
}

/// Renders an outbound number body using the member's format string.
/// Unrecognized formats degrade to the shortest round-trippable
/// decimal form.
pub fn number_format(format: &str, value: f64) -> String {
    let Some(spec) = parse_spec(format) else {
        return value.to_string();
    };

    match spec.conversion {
        'm' => {
            // The precision digit picks the sexagesimal resolution;
            // the remaining width is given to the degrees field.

            let frac = spec.precision.unwrap_or(3);
            let fracbase = match frac {
                9 => 360000,
                8 => 36000,
                6 => 3600,
                5 => 600,
                _ => 60,
            };

            print_sexa(value, spec.width.saturating_sub(frac), fracbase)
        }
        'f' => {
            let body =
                format!("{:.*}", spec.precision.unwrap_or(6), value);

            format!("{:>1$}", body, spec.width)
        }
        'e' | 'E' => {
            let body =
                format!("{:.*e}", spec.precision.unwrap_or(6), value);

            format!("{:>1$}", body, spec.width)
        }
        'g' | 'G' => {
            format!("{:>1$}", format_g(value, spec.precision), spec.width)
        }
        _ => value.to_string(),
    }
}

// A %g look-alike: `precision` significant digits, fixed or
// scientific notation depending on the exponent, trailing zeros
// removed.

fn format_g(value: f64, precision: Option<usize>) -> String {
    let digits = match precision {
        Some(0) | None => 6,
        Some(p) => p,
    };

    if value == 0.0 {
        return String::from("0");
    }

    let exponent = value.abs().log10().floor() as i32;

    if exponent < -4 || exponent >= digits as i32 {
        format!("{:.*e}", digits - 1, value)
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        let body = format!("{:.*}", decimals, value);

        if body.contains('.') {
            String::from(body.trim_end_matches('0').trim_end_matches('.'))
        } else {
            body
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_scan_plain_decimals() {
        assert!(close(scan_sexa("3.14").unwrap(), 3.14));
        assert!(close(scan_sexa("  99 ").unwrap(), 99.0));
        assert!(close(scan_sexa("-0.5").unwrap(), -0.5));
        assert!(close(scan_sexa("+7").unwrap(), 7.0));
    }

    #[test]
    fn test_scan_sexagesimal() {
        assert!(close(scan_sexa("12:30:45").unwrap(), 12.5125));
        assert!(close(scan_sexa("12 30 45").unwrap(), 12.5125));
        assert!(close(scan_sexa("-12:30").unwrap(), -12.5));
        assert!(close(scan_sexa("-0:30").unwrap(), -0.5));
    }

    #[test]
    fn test_scan_rejects_garbage() {
        assert!(scan_sexa("").is_err());
        assert!(scan_sexa("evil").is_err());
        assert!(scan_sexa("1:2:3:4").is_err());
        assert!(scan_sexa("12:xx").is_err());
        assert!(scan_sexa("12:-30").is_err());
    }

    #[test]
    fn test_print_sexa() {
        assert_eq!(print_sexa(12.5125, 2, 3600), "12:30:45");
        assert_eq!(print_sexa(-0.5, 4, 3600), "  -0:30:00");
        assert_eq!(print_sexa(6.25, 1, 60), "6:15");
    }

    #[test]
    fn test_number_format() {
        assert_eq!(number_format("%6.2f", 5.0), "  5.00");
        assert_eq!(number_format("%.0f", 42.6), "43");
        assert_eq!(number_format("%10.6m", -0.5), "  -0:30:00");
        assert_eq!(number_format("%g", 0.0), "0");
        assert_eq!(number_format("%g", 12.5), "12.5");
        assert_eq!(number_format("", 1.25), "1.25");
    }

    #[test]
    fn test_round_trip_through_wire_form() {
        let v = 12.5125;

        assert!(close(scan_sexa(&number_format("%9.6m", v)).unwrap(), v));
        assert!(
            (scan_sexa(&number_format("%8.3f", v)).unwrap() - v).abs() < 1e-3
        );
    }
}
