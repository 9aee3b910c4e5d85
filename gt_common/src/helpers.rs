use std::{fmt::Display, str::FromStr};

/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Parse a numeric setting. Missing values give `Ok(default)`; unparseable values give an error message naming the
/// offending value so that the caller can decide how loudly to complain.
pub fn parse_number_or<T>(value: Option<String>, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    match value {
        None => Ok(default),
        Some(s) => s.trim().parse::<T>().map_err(|e| format!("'{s}' is not a valid value. {e}")),
    }
}
