use std::str::FromStr;

/// Read an environment variable, treating empty values as unset.
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable, falling back to `default` when unset.
pub fn parse_env<T>(name: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_var(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| {
                Box::<dyn std::error::Error>::from(format!(
                    "Invalid value for {name} ('{value}'): {e}"
                ))
            }),
        None => Ok(default),
    }
}

/// Parse a boolean flag ("true"/"1"/"yes"/"on", case-insensitive).
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
