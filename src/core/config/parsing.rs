use std::env;
use std::str::FromStr;

use super::types::ConfigError;

const LOCAL_FRONTENDS: [&str; 2] = ["http://localhost:3000", "http://localhost:5173"];

/// Trimmed reads from the process environment; blank values count as unset.
pub(super) struct Env;

impl Env {
    pub(super) fn get(&self, key: &str) -> Option<String> {
        let value = env::var(key).ok()?;
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    pub(super) fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    pub(super) fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| is_truthy(&value))
    }

    pub(super) fn number<T: FromStr>(
        &self,
        key: &'static str,
        default: T,
    ) -> Result<T, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => {
                value.parse().map_err(|_| ConfigError::InvalidValue { field: key, value })
            }
        }
    }
}

pub(super) fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Accepts `["http://a","http://b"]` or `http://a,http://b`. Nothing usable falls back
/// to the local frontend dev servers.
pub(super) fn cors_origins(raw: Option<String>) -> Result<Vec<String>, ConfigError> {
    let origins: Vec<String> = match raw {
        None => Vec::new(),
        Some(raw) if raw.trim_start().starts_with('[') => {
            serde_json::from_str(&raw).map_err(|_| ConfigError::InvalidCors(raw))?
        }
        Some(raw) => raw.split(',').map(str::trim).map(String::from).collect(),
    };

    let origins: Vec<String> = origins.into_iter().filter(|origin| !origin.is_empty()).collect();
    if origins.is_empty() {
        return Ok(LOCAL_FRONTENDS.iter().map(|origin| origin.to_string()).collect());
    }
    Ok(origins)
}

/// `api/`, `/api` and ` /api/ ` all become `/api`; `/` or blank mounts at the root.
pub(super) fn api_prefix(raw: &str) -> String {
    match raw.trim().trim_matches('/') {
        "" => String::new(),
        path => format!("/{path}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_origins_from_json_list() {
        let parsed = cors_origins(Some(r#"["https://portal.school.ng","http://b"]"#.into()));
        assert_eq!(parsed.expect("json"), vec!["https://portal.school.ng", "http://b"]);
    }

    #[test]
    fn cors_origins_from_csv_skips_blanks() {
        let parsed = cors_origins(Some("http://a, ,http://b".into())).expect("csv");
        assert_eq!(parsed, vec!["http://a", "http://b"]);
    }

    #[test]
    fn cors_origins_fall_back_to_local_frontends() {
        for raw in [None, Some(" , ".to_string()), Some("[]".to_string())] {
            assert_eq!(cors_origins(raw).expect("fallback"), LOCAL_FRONTENDS);
        }
    }

    #[test]
    fn cors_origins_reject_broken_json() {
        let result = cors_origins(Some(r#"["http://a""#.into()));
        assert!(matches!(result, Err(ConfigError::InvalidCors(_))));
    }

    #[test]
    fn api_prefix_forms() {
        assert_eq!(api_prefix("/api"), "/api");
        assert_eq!(api_prefix("api/"), "/api");
        assert_eq!(api_prefix(" /v1/portal/ "), "/v1/portal");
        assert_eq!(api_prefix("/"), "");
        assert_eq!(api_prefix("  "), "");
    }

    #[test]
    fn truthy_values() {
        for value in ["1", "true", "Yes", "ON"] {
            assert!(is_truthy(value), "{value}");
        }
        for value in ["0", "false", "off", "enabled"] {
            assert!(!is_truthy(value), "{value}");
        }
    }
}
