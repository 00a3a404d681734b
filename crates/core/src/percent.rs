//! Percent values of unknown representation.

use serde_json::Value;

/// Normalize a percent value to an integer in `[0, 100]`.
///
/// Servers have sent `21`, `"21%"`, `21.4`, and plain garbage here. Strings
/// are reduced to their digits and parsed; numbers are rounded; anything
/// else is 0. Never fails, and the result is always clamped.
#[must_use]
pub fn parse_percent(value: &Value) -> u8 {
    match value {
        Value::String(raw) => {
            let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
            if digits.is_empty() {
                return 0;
            }
            match digits.parse::<u64>() {
                Ok(n) => u8::try_from(n.min(100)).unwrap_or(100),
                // an all-digit string only fails to parse on overflow
                Err(_) => 100,
            }
        }
        Value::Number(n) => n
            .as_f64()
            .map_or(0, |f| f.clamp(0.0, 100.0).round() as u8),
        _ => 0,
    }
}
