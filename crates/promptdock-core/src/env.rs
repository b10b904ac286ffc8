//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
pub fn get_var_or(name: &str, default: &str) -> String {
    get_var(name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable as a u16 (e.g., for ports).
pub fn get_u16(name: &str) -> Option<u16> {
    get_var(name).and_then(|v| v.parse().ok())
}

/// Load `KEY=value` pairs from a `.env` file in the working directory.
///
/// Variables already set in the process environment win over the file.
/// A missing file is not an error.
pub fn load_dotenv() -> Result<(), std::io::Error> {
    let path = std::path::Path::new(".env");
    if !path.exists() {
        return Ok(());
    }

    for line in std::fs::read_to_string(path)?.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if env::var(key).is_ok() {
            continue;
        }
        env::set_var(key, unquote(value.trim()));
    }

    Ok(())
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_var_empty_is_none() {
        env::set_var("PROMPTDOCK_TEST_EMPTY", "");
        assert_eq!(get_var("PROMPTDOCK_TEST_EMPTY"), None);
    }

    #[test]
    fn test_get_var_or_default() {
        assert_eq!(get_var_or("PROMPTDOCK_TEST_MISSING", "fallback"), "fallback");
    }

    #[test]
    fn test_get_u16() {
        env::set_var("PROMPTDOCK_TEST_PORT", "3001");
        assert_eq!(get_u16("PROMPTDOCK_TEST_PORT"), Some(3001));

        env::set_var("PROMPTDOCK_TEST_PORT_BAD", "not-a-port");
        assert_eq!(get_u16("PROMPTDOCK_TEST_PORT_BAD"), None);
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"quoted\""), "quoted");
        assert_eq!(unquote("'single'"), "single");
        assert_eq!(unquote("bare"), "bare");
        assert_eq!(unquote("\"mismatched'"), "\"mismatched'");
    }
}
