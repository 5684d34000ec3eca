//! Unit-suffixed scalar parsing.
//!
//! Byte sizes and durations follow the HOCON conventions the transport's
//! configuration has always used: `128000b`, `128 kB`, `4MiB`, `15s`,
//! `15 s`, `100ms`. A bare number is bytes for sizes and milliseconds for
//! durations.

use std::time::Duration;

use bytesize::ByteSize;

/// Split `"128 kB"` into `("128", "kB")`.
fn split_magnitude(input: &str) -> (&str, &str) {
    let input = input.trim();
    let end = input
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(input.len());
    (input[..end].trim(), input[end..].trim())
}

/// Single-letter HOCON units are binary: `K` is 1024, unlike `kB`.
fn binary_shorthand(unit: &str) -> Option<&'static str> {
    match unit {
        "K" | "k" => Some("KiB"),
        "M" | "m" => Some("MiB"),
        "G" | "g" => Some("GiB"),
        "T" | "t" => Some("TiB"),
        _ => None,
    }
}

/// Parse a byte size such as `256000b` or `1.5 MiB` into a byte count.
///
/// A bare integer is bytes. Negative magnitudes are accepted; callers decide
/// what a non-positive size means.
pub fn parse_byte_size(input: &str) -> Result<i64, String> {
    let (number, unit) = split_magnitude(input);
    if number.is_empty() {
        return Err("missing numeric magnitude".to_string());
    }
    if unit.is_empty() {
        if let Ok(bytes) = number.parse::<i64>() {
            return Ok(bytes);
        }
    }

    let (negative, magnitude) = match number.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, number.trim_start_matches('+')),
    };
    let unit = binary_shorthand(unit).unwrap_or(if unit.is_empty() { "B" } else { unit });
    let size: ByteSize = format!("{magnitude} {unit}").parse()?;
    let bytes = i64::try_from(size.as_u64())
        .map_err(|_| "byte size overflows a 64-bit integer".to_string())?;
    Ok(if negative { -bytes } else { bytes })
}

/// Parse a duration such as `15s`, `15 s` or `2 minutes`. A bare integer is
/// millis.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let (number, unit) = split_magnitude(input);
    if number.is_empty() {
        return Err("missing numeric magnitude".to_string());
    }
    if number.starts_with('-') {
        return Err("durations must not be negative".to_string());
    }
    if unit.is_empty() {
        return number
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| format!("`{number}` is not a whole number of milliseconds"));
    }
    humantime::parse_duration(&format!("{number}{unit}")).map_err(|e| e.to_string())
}

/// Parse the HOCON boolean spellings.
pub fn parse_boolean(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Some(true),
        "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_sizes_with_suffixes() {
        assert_eq!(parse_byte_size("256000b"), Ok(256_000));
        assert_eq!(parse_byte_size("128000"), Ok(128_000));
        assert_eq!(parse_byte_size("128 kB"), Ok(128_000));
        assert_eq!(parse_byte_size("4KiB"), Ok(4_096));
        assert_eq!(parse_byte_size("4K"), Ok(4_096));
        assert_eq!(parse_byte_size("2 M"), Ok(2_097_152));
        assert_eq!(parse_byte_size("1.5 MiB"), Ok(1_572_864));
        assert_eq!(parse_byte_size("0b"), Ok(0));
        assert_eq!(parse_byte_size("-1"), Ok(-1));
        assert_eq!(parse_byte_size("-2 kB"), Ok(-2_000));
    }

    #[test]
    fn byte_sizes_reject_garbage() {
        assert!(parse_byte_size("lots").is_err());
        assert!(parse_byte_size("12 parsecs").is_err());
        assert!(parse_byte_size("9000000 TiB").is_err());
    }

    #[test]
    fn durations_with_suffixes() {
        assert_eq!(parse_duration("15s"), Ok(Duration::from_secs(15)));
        assert_eq!(parse_duration("15 s"), Ok(Duration::from_secs(15)));
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("250"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("2 minutes"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("1h 30min"), Ok(Duration::from_secs(5_400)));
    }

    #[test]
    fn durations_reject_negative_and_unknown_units() {
        assert!(parse_duration("-1s").is_err());
        assert!(parse_duration("3 fortnights").is_err());
        assert!(parse_duration("-250").is_err());
    }

    #[test]
    fn boolean_spellings() {
        assert_eq!(parse_boolean("on"), Some(true));
        assert_eq!(parse_boolean("OFF"), Some(false));
        assert_eq!(parse_boolean("yes"), Some(true));
        assert_eq!(parse_boolean("maybe"), None);
    }
}
