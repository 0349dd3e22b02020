use std::time::Duration;

use crate::EncodeError;

/// Formats a float the way the controller's schema expects: integral values
/// keep one fractional digit (`10.0`), everything else uses the shortest
/// representation that round-trips.
pub fn float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

pub const fn boolean(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// `xs:duration` in seconds, e.g. `PT0S` or `PT1.5S`.
pub fn duration(value: Duration) -> String {
    let secs = value.as_secs();
    let nanos = value.subsec_nanos();
    if nanos == 0 {
        return format!("PT{secs}S");
    }
    let frac = format!("{nanos:09}");
    format!("PT{secs}.{}S", frac.trim_end_matches('0'))
}

/// `xs:boolean` as the controller emits it; anything but `true` is false.
pub fn parse_boolean(text: &str) -> bool {
    text.trim() == "true"
}

pub fn finite(name: &str, value: f64) -> Result<f64, EncodeError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EncodeError::InvalidArgument(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_keep_one_fractional_digit() {
        assert_eq!(float(10.0), "10.0");
        assert_eq!(float(-3.0), "-3.0");
        assert_eq!(float(1234.5), "1234.5");
        assert_eq!(float(0.125), "0.125");
    }

    #[test]
    fn durations_use_seconds() {
        assert_eq!(duration(Duration::ZERO), "PT0S");
        assert_eq!(duration(Duration::from_secs(90)), "PT90S");
        assert_eq!(duration(Duration::from_millis(1500)), "PT1.5S");
        assert_eq!(duration(Duration::from_micros(250)), "PT0.00025S");
    }

    #[test]
    fn booleans() {
        assert_eq!(boolean(true), "true");
        assert!(parse_boolean(" true "));
        assert!(!parse_boolean("True"));
        assert!(!parse_boolean("1"));
    }

    #[test]
    fn rejects_non_finite_arguments() {
        assert!(finite("start", f64::NAN).is_err());
        assert!(finite("start", f64::INFINITY).is_err());
        assert_eq!(finite("start", 1.0), Ok(1.0));
    }
}
