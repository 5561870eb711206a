//! Router configuration
//!
//! Options that shape generated URLs and bound the work done per request.

use super::defaults::RoutingDefaults;
use super::validation::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Routing specific configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterOptions {
    /// Lowercase generated paths
    pub lowercase_urls: bool,
    /// Also lowercase the query string; only applies together with `lowercase_urls`
    pub lowercase_query_strings: bool,
    /// Append a trailing slash to generated paths
    pub append_trailing_slash: bool,
    /// Request paths with more segments than this never match; unlimited when unset
    pub max_path_segments: Option<usize>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            lowercase_urls: RoutingDefaults::LOWERCASE_URLS,
            lowercase_query_strings: RoutingDefaults::LOWERCASE_QUERY_STRINGS,
            append_trailing_slash: RoutingDefaults::APPEND_TRAILING_SLASH,
            max_path_segments: RoutingDefaults::MAX_PATH_SEGMENTS,
        }
    }
}

impl RouterOptions {
    /// Load options from `ROUTING_*` environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let lowercase_urls = parse_env(
            "ROUTING_LOWERCASE_URLS",
            "lowercase_urls",
            RoutingDefaults::LOWERCASE_URLS,
            "true or false",
        )?;

        let lowercase_query_strings = parse_env(
            "ROUTING_LOWERCASE_QUERY_STRINGS",
            "lowercase_query_strings",
            RoutingDefaults::LOWERCASE_QUERY_STRINGS,
            "true or false",
        )?;

        let append_trailing_slash = parse_env(
            "ROUTING_APPEND_TRAILING_SLASH",
            "append_trailing_slash",
            RoutingDefaults::APPEND_TRAILING_SLASH,
            "true or false",
        )?;

        let max_path_segments = match env::var("ROUTING_MAX_PATH_SEGMENTS") {
            Ok(raw) if !raw.trim().is_empty() => Some(parse_env(
                "ROUTING_MAX_PATH_SEGMENTS",
                "max_path_segments",
                0usize,
                "a positive number of segments",
            )?),
            _ => RoutingDefaults::MAX_PATH_SEGMENTS,
        };

        let options = RouterOptions {
            lowercase_urls,
            lowercase_query_strings,
            append_trailing_slash,
            max_path_segments,
        };
        options.validate()?;
        Ok(options)
    }

    /// Parse options from a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let options: RouterOptions =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })?;
        options.validate()?;
        Ok(options)
    }
}

// Helper function for environment variable handling
fn get_env_or_default(key: &str, default: &str) -> Result<String, ConfigError> {
    Ok(env::var(key).unwrap_or_else(|_| default.to_string()))
}

fn parse_env<T>(key: &str, field: &str, default: T, expected: &str) -> Result<T, ConfigError>
where
    T: FromStr + ToString,
{
    let raw = get_env_or_default(key, &default.to_string())?;
    raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        value: raw.clone(),
        expected: expected.to_string(),
    })
}
