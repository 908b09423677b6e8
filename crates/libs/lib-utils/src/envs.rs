//! # Environment Variables
//!
//! Utilities for reading and parsing environment variables.

use std::env;
use std::str::FromStr;

/// Get an environment variable by name.
pub fn get_env(name: &'static str) -> Result<String, Error> {
    env::var(name).map_err(|_| Error::MissingEnv(name))
}

/// Get and parse an environment variable.
pub fn get_env_parse<T: FromStr>(name: &'static str) -> Result<T, Error> {
    let val = get_env(name)?;
    val.parse::<T>().map_err(|_| Error::WrongFormat(name))
}

/// Read a `1`/`true` style boolean flag, defaulting when unset or unrecognised.
pub fn get_env_flag(name: &'static str, default: bool) -> bool {
    match env::var(name) {
        Ok(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

// region:    --- Error
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    MissingEnv(&'static str),
    WrongFormat(&'static str),
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{self:?}")
    }
}

impl std::error::Error for Error {}
// endregion: --- Error

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_env_reports_name() {
        assert_eq!(
            get_env("LIB_UTILS_TEST_UNSET_VAR"),
            Err(Error::MissingEnv("LIB_UTILS_TEST_UNSET_VAR"))
        );
    }

    #[test]
    fn test_flag_default() {
        assert!(get_env_flag("LIB_UTILS_TEST_UNSET_FLAG", true));
        assert!(!get_env_flag("LIB_UTILS_TEST_UNSET_FLAG", false));
    }
}
