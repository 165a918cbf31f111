//! Parser of Go-style duration strings (`300ms`, `-1.5h`, `2h45m`).

use std::{fmt, time::Duration};

use derive_more::Display;
use tracerr::Traced;

/// Number of nanoseconds in a single unit of every supported suffix.
const UNITS: &[(&str, u64)] = &[
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000), // U+00B5 micro sign
    ("μs", 1_000), // U+03BC Greek small letter mu
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60 * 1_000_000_000),
    ("h", 60 * 60 * 1_000_000_000),
];

/// Largest representable amount of nanoseconds.
const MAX_NANOS: u64 = i64::MAX as u64;

/// Largest absolute amount of nanoseconds accepted while parsing. Only a
/// negative duration may reach it.
const LIMIT_NANOS: u64 = 1 << 63;

/// Errors of parsing a duration string.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum ParseDurationError {
    /// Input is empty, syntactically malformed or out of range.
    #[display(fmt = "time: invalid duration {}", "Quoted(_0)")]
    Invalid(String),

    /// Number is not followed by a unit.
    #[display(fmt = "time: missing unit in duration {}", "Quoted(_0)")]
    MissingUnit(String),

    /// Number is followed by an unsupported unit.
    #[display(
        fmt = "time: unknown unit {} in duration {}",
        "Quoted(unit)",
        "Quoted(input)"
    )]
    UnknownUnit {
        /// Unsupported unit as it appears in the input.
        unit: String,

        /// Whole input string.
        input: String,
    },
}

type Result<T> = std::result::Result<T, Traced<ParseDurationError>>;

/// Double-quoted string with `"` and `\` escaped, and with control and
/// non-ASCII bytes written as `\xNN`.
struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for b in self.0.bytes() {
            match b {
                b'"' | b'\\' => write!(f, "\\{}", char::from(b))?,
                b' '..=0x7f => write!(f, "{}", char::from(b))?,
                _ => write!(f, "\\x{:02x}", b)?,
            }
        }
        f.write_str("\"")
    }
}

/// Duration parsed from a string, keeping its sign.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SignedDuration {
    /// Whether the duration is below zero.
    pub negative: bool,

    /// Absolute value of the duration.
    pub abs: Duration,
}

impl SignedDuration {
    /// Returns how long to wait for this [`SignedDuration`].
    ///
    /// Negative durations are clamped to zero.
    #[inline]
    #[must_use]
    pub fn delay(self) -> Duration {
        if self.negative {
            Duration::from_secs(0)
        } else {
            self.abs
        }
    }
}

/// Parses the provided duration string.
///
/// A duration string is a possibly signed sequence of decimal numbers, each
/// with an optional fraction and a unit suffix. Valid units are `ns`, `us`
/// (or `µs`), `ms`, `s`, `m` and `h`.
///
/// # Errors
///
/// With [`ParseDurationError`] if the input is malformed, misses a unit, uses
/// an unknown unit or doesn't fit into [`i64`] nanoseconds.
pub fn parse(input: &str) -> Result<SignedDuration> {
    let invalid = || tracerr::new!(ParseDurationError::Invalid(input.into()));

    let (negative, mut rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };

    if rest == "0" {
        return Ok(SignedDuration {
            negative: false,
            abs: Duration::from_secs(0),
        });
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    while !rest.is_empty() {
        let (int, int_digits, tail) = leading_int(rest).ok_or_else(invalid)?;
        rest = tail;

        let mut frac = 0;
        let mut frac_scale = 1_f64;
        let mut frac_digits = 0;
        if let Some(tail) = rest.strip_prefix('.') {
            let (f, scale, digits, tail) = leading_fraction(tail);
            frac = f;
            frac_scale = scale;
            frac_digits = digits;
            rest = tail;
        }
        if int_digits == 0 && frac_digits == 0 {
            return Err(invalid());
        }

        let unit_len = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or_else(|| rest.len());
        if unit_len == 0 {
            return Err(tracerr::new!(ParseDurationError::MissingUnit(
                input.into()
            )));
        }
        let (unit, tail) = rest.split_at(unit_len);
        rest = tail;

        let per_unit = UNITS
            .iter()
            .find_map(|(name, nanos)| (*name == unit).then(|| *nanos))
            .ok_or_else(|| {
                tracerr::new!(ParseDurationError::UnknownUnit {
                    unit: unit.into(),
                    input: input.into(),
                })
            })?;

        let mut value = int.checked_mul(per_unit).ok_or_else(invalid)?;
        if frac > 0 {
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_precision_loss,
                clippy::cast_sign_loss
            )]
            let frac_nanos =
                (frac as f64 * (per_unit as f64 / frac_scale)) as u64;
            value = value.checked_add(frac_nanos).ok_or_else(invalid)?;
        }
        total = total
            .checked_add(value)
            .filter(|t| *t <= LIMIT_NANOS)
            .ok_or_else(invalid)?;
    }
    if !negative && total > MAX_NANOS {
        return Err(invalid());
    }

    Ok(SignedDuration {
        negative: negative && total > 0,
        abs: Duration::from_nanos(total),
    })
}

/// Consumes leading decimal digits of `s`.
///
/// Returns the parsed value, the number of consumed digits and the rest of
/// the input, or [`None`] on overflow.
fn leading_int(s: &str) -> Option<(u64, usize, &str)> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    let mut value: u64 = 0;
    for b in s[..digits].bytes() {
        value = value.checked_mul(10)?.checked_add(u64::from(b - b'0'))?;
        if value > LIMIT_NANOS {
            return None;
        }
    }
    Some((value, digits, &s[digits..]))
}

/// Consumes leading fractional digits of `s`.
///
/// Digits that would overflow are dropped, as they can't affect a
/// nanosecond-precision result anyway.
fn leading_fraction(s: &str) -> (u64, f64, usize, &str) {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    let mut value: u64 = 0;
    let mut scale = 1_f64;
    let mut overflow = false;
    for b in s[..digits].bytes() {
        if overflow {
            continue;
        }
        match value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(b - b'0')))
        {
            Some(v) if v <= MAX_NANOS => {
                value = v;
                scale *= 10.0;
            }
            _ => overflow = true,
        }
    }
    (value, scale, digits, &s[digits..])
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use super::{parse, ParseDurationError};

    fn ok(input: &str) -> Duration {
        let parsed = parse(input).unwrap();
        assert!(!parsed.negative, "{} parsed as negative", input);
        parsed.abs
    }

    fn err(input: &str) -> ParseDurationError {
        parse(input).unwrap_err().as_ref().clone()
    }

    #[test]
    fn parses_single_units() {
        assert_eq!(ok("10ns"), Duration::from_nanos(10));
        assert_eq!(ok("10us"), Duration::from_micros(10));
        assert_eq!(ok("10µs"), Duration::from_micros(10));
        assert_eq!(ok("10μs"), Duration::from_micros(10));
        assert_eq!(ok("300ms"), Duration::from_millis(300));
        assert_eq!(ok("2s"), Duration::from_secs(2));
        assert_eq!(ok("5m"), Duration::from_secs(300));
        assert_eq!(ok("1h"), Duration::from_secs(3600));
    }

    #[test]
    fn parses_compound_and_fractional() {
        assert_eq!(ok("2h45m"), Duration::from_secs(2 * 3600 + 45 * 60));
        assert_eq!(ok("1.5h"), Duration::from_secs(5400));
        assert_eq!(ok(".5s"), Duration::from_millis(500));
        assert_eq!(ok("1.s"), Duration::from_secs(1));
        assert_eq!(ok("1m0.25s"), Duration::from_millis(60_250));
        assert_eq!(ok("+3s"), Duration::from_secs(3));
    }

    #[test]
    fn parses_zero_without_unit() {
        assert_eq!(ok("0"), Duration::from_secs(0));
        assert_eq!(ok("-0"), Duration::from_secs(0));
        assert_eq!(ok("+0"), Duration::from_secs(0));
    }

    #[test]
    fn negative_durations_delay_nothing() {
        let parsed = parse("-1.5s").unwrap();
        assert!(parsed.negative);
        assert_eq!(parsed.abs, Duration::from_millis(1500));
        assert_eq!(parsed.delay(), Duration::from_secs(0));
    }

    #[test]
    fn rejects_malformed() {
        for input in &["", "-", "s", ".s", "abc", "--1s"] {
            assert_eq!(
                err(input),
                ParseDurationError::Invalid((*input).to_owned()),
                "input: {:?}",
                input,
            );
        }
    }

    #[test]
    fn rejects_missing_unit() {
        assert_eq!(err("1"), ParseDurationError::MissingUnit("1".into()));
        assert_eq!(err("1h30"), ParseDurationError::MissingUnit("1h30".into()));
        assert_eq!(
            err("1.2.3s"),
            ParseDurationError::MissingUnit("1.2.3s".into()),
        );
    }

    #[test]
    fn rejects_unknown_unit() {
        assert_eq!(
            err("1x"),
            ParseDurationError::UnknownUnit {
                unit: "x".into(),
                input: "1x".into(),
            },
        );
        assert_eq!(
            err("3sec").to_string(),
            r#"time: unknown unit "sec" in duration "3sec""#,
        );
    }

    #[test]
    fn rejects_overflow() {
        assert_eq!(
            err("9223372036854775808ns"),
            ParseDurationError::Invalid("9223372036854775808ns".into()),
        );
        assert_eq!(
            err("3000000h"),
            ParseDurationError::Invalid("3000000h".into()),
        );
        assert_eq!(
            ok("9223372036854775807ns"),
            Duration::from_nanos(9_223_372_036_854_775_807),
        );
    }

    #[test]
    fn accepts_min_negative() {
        let parsed = parse("-9223372036854775808ns").unwrap();
        assert!(parsed.negative);
        assert_eq!(parsed.abs, Duration::from_nanos(1 << 63));
        assert_eq!(parsed.delay(), Duration::from_secs(0));
    }

    #[test]
    fn displays_input_quoted() {
        assert_eq!(err("abc").to_string(), r#"time: invalid duration "abc""#);
        assert_eq!(
            err("1").to_string(),
            r#"time: missing unit in duration "1""#,
        );
    }

    #[test]
    fn escapes_quoted_input() {
        assert_eq!(
            err("1µx").to_string(),
            r#"time: unknown unit "\xc2\xb5x" in duration "1\xc2\xb5x""#,
        );
        assert_eq!(
            err("a\t\"b\\").to_string(),
            r#"time: invalid duration "a\x09\"b\\""#,
        );
    }
}
