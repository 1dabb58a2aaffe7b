//! Application Configuration
//!
//! Read from build-time environment variables:
//! - `SUPABASE_URL`, `SUPABASE_ANON_KEY`: both or neither. Neither means
//!   the in-memory demo backend.
//! - `TODO_AUTH_MODE`: `required` (default) or `anonymous`.

use std::str::FromStr;

use crate::error::ConfigError;
use crate::repository::SupabaseEndpoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Sign-in gate; every row is owned by a principal
    #[default]
    Required,
    /// No sign-in; one shared list
    Anonymous,
}

impl FromStr for AuthMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "required" => Ok(AuthMode::Required),
            "anonymous" | "none" | "off" => Ok(AuthMode::Anonymous),
            other => Err(ConfigError::UnknownAuthMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// `None` selects the in-memory backend
    pub supabase: Option<SupabaseEndpoint>,
    pub auth_mode: AuthMode,
}

impl AppConfig {
    /// Configuration baked in at compile time
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| {
            let value = match key {
                "SUPABASE_URL" => option_env!("SUPABASE_URL"),
                "SUPABASE_ANON_KEY" => option_env!("SUPABASE_ANON_KEY"),
                "TODO_AUTH_MODE" => option_env!("TODO_AUTH_MODE"),
                _ => None,
            };
            value.map(str::to_string)
        })
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let url = non_empty("SUPABASE_URL");
        let anon_key = non_empty("SUPABASE_ANON_KEY");

        let supabase = match (url, anon_key) {
            (Some(url), Some(key)) => {
                let parsed = reqwest::Url::parse(url.trim())
                    .map_err(|e| ConfigError::InvalidUrl(url.clone(), e.to_string()))?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(ConfigError::InvalidUrl(url, "expected http or https".into()));
                }
                Some(SupabaseEndpoint::new(url.trim(), key.trim()))
            }
            (Some(_), None) => return Err(ConfigError::Incomplete("SUPABASE_URL", "SUPABASE_ANON_KEY")),
            (None, Some(_)) => return Err(ConfigError::Incomplete("SUPABASE_ANON_KEY", "SUPABASE_URL")),
            (None, None) => None,
        };

        let auth_mode = match lookup("TODO_AUTH_MODE") {
            Some(mode) => mode.parse()?,
            None => AuthMode::default(),
        };

        Ok(Self { supabase, auth_mode })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_empty_env_selects_memory_backend() {
        let cfg = config(&[]).unwrap();
        assert!(cfg.supabase.is_none());
        assert_eq!(cfg.auth_mode, AuthMode::Required);
    }

    #[test]
    fn test_supabase_endpoint() {
        let cfg = config(&[
            ("SUPABASE_URL", "https://abc.supabase.co/"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("TODO_AUTH_MODE", "Anonymous"),
        ])
        .unwrap();
        let ep = cfg.supabase.unwrap();
        assert_eq!(ep.url(), "https://abc.supabase.co");
        assert_eq!(ep.anon_key(), "anon");
        assert_eq!(cfg.auth_mode, AuthMode::Anonymous);
    }

    #[test]
    fn test_half_configured_backend_is_rejected() {
        assert_eq!(
            config(&[("SUPABASE_URL", "https://abc.supabase.co")]),
            Err(ConfigError::Incomplete("SUPABASE_URL", "SUPABASE_ANON_KEY"))
        );
        assert_eq!(
            config(&[("SUPABASE_ANON_KEY", "anon"), ("SUPABASE_URL", "  ")]),
            Err(ConfigError::Incomplete("SUPABASE_ANON_KEY", "SUPABASE_URL"))
        );
    }

    #[test]
    fn test_bad_values() {
        assert!(matches!(
            config(&[("SUPABASE_URL", "not a url"), ("SUPABASE_ANON_KEY", "k")]),
            Err(ConfigError::InvalidUrl(..))
        ));
        assert!(matches!(
            config(&[("SUPABASE_URL", "ftp://x.y"), ("SUPABASE_ANON_KEY", "k")]),
            Err(ConfigError::InvalidUrl(..))
        ));
        assert_eq!(
            config(&[("TODO_AUTH_MODE", "sometimes")]),
            Err(ConfigError::UnknownAuthMode("sometimes".into()))
        );
    }
}
