//! Configuration from the environment and an optional policy file.
//!
//! Connection settings come only from environment variables. Policy knobs
//! (page size, hop limit, graph view size, connect timeout) may come from a
//! TOML file and are then overridden by `NSC_*` variables.

use serde::Deserialize;
use std::path::Path;

use crate::error::{ConsoleError, ConsoleResult};

pub const ENV_DOCUMENT_URI: &str = "MONGODB_URI";
pub const ENV_GRAPH_URI: &str = "NEO4J_URI";
pub const ENV_GRAPH_USER: &str = "NEO4J_USER";
pub const ENV_GRAPH_PASSWORD: &str = "NEO4J_PASSWORD";
pub const ENV_CONFIG_FILE: &str = "NSC_CONFIG";

/// Lower and upper bounds of the graph view sample size.
pub const GRAPH_VIEW_LIMIT_RANGE: (usize, usize) = (10, 500);

/// Connection strings and credentials for both stores.
#[derive(Clone, PartialEq)]
pub struct ConnectionConfig {
    pub document_uri: String,
    pub graph_uri: String,
    pub graph_user: String,
    pub graph_password: String,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("document_uri", &redact_uri(&self.document_uri))
            .field("graph_uri", &self.graph_uri)
            .field("graph_user", &self.graph_user)
            .field("graph_password", &"***")
            .finish()
    }
}

impl ConnectionConfig {
    pub fn from_env() -> ConsoleResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; fails naming the first missing variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConsoleResult<Self> {
        let required = |key: &str| -> ConsoleResult<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    ConsoleError::config(format!("missing environment variable {}", key))
                })
        };

        let config = Self {
            document_uri: required(ENV_DOCUMENT_URI)?,
            graph_uri: required(ENV_GRAPH_URI)?,
            graph_user: required(ENV_GRAPH_USER)?,
            graph_password: required(ENV_GRAPH_PASSWORD)?,
        };

        for (key, uri) in [
            (ENV_DOCUMENT_URI, &config.document_uri),
            (ENV_GRAPH_URI, &config.graph_uri),
        ] {
            if uri_scheme(uri).is_none() {
                return Err(ConsoleError::config(format!(
                    "{} is not a valid URI (expected scheme://...)",
                    key
                )));
            }
        }

        Ok(config)
    }
}

/// Scheme of a `scheme://rest` URI, lowercased.
pub fn uri_scheme(uri: &str) -> Option<String> {
    let (scheme, rest) = uri.split_once("://")?;
    let valid = !scheme.is_empty()
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    (valid && !rest.is_empty()).then(|| scheme.to_ascii_lowercase())
}

/// Hide the `user:password@` part of a URI for logging.
pub fn redact_uri(uri: &str) -> String {
    match (uri.split_once("://"), uri.rfind('@')) {
        (Some((scheme, rest)), Some(at)) if rest.contains('@') => {
            format!("{}://***{}", scheme, &uri[at..])
        }
        _ => uri.to_string(),
    }
}

/// Tunable limits applied by the adapters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Maximum records returned by a single find.
    pub page_size: usize,
    /// Default and maximum hop count for shortest-path search.
    pub max_path_hops: usize,
    /// Default number of nodes sampled for the graph view.
    pub graph_view_limit: usize,
    /// Bound on each startup connection attempt.
    pub connect_timeout_secs: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_path_hops: 15,
            graph_view_limit: 100,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    policy: PolicyConfig,
}

impl PolicyConfig {
    /// Load from an optional TOML file, then apply `NSC_*` overrides.
    pub fn load(
        path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConsoleResult<Self> {
        let mut policy = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    ConsoleError::config(format!("cannot read {}: {}", path.display(), e))
                })?;
                toml::from_str::<FileConfig>(&text)
                    .map_err(|e| {
                        ConsoleError::config(format!("invalid {}: {}", path.display(), e))
                    })?
                    .policy
            }
            None => Self::default(),
        };

        if let Some(v) = parse_override(&lookup, "NSC_PAGE_SIZE")? {
            policy.page_size = v;
        }
        if let Some(v) = parse_override(&lookup, "NSC_MAX_PATH_HOPS")? {
            policy.max_path_hops = v;
        }
        if let Some(v) = parse_override(&lookup, "NSC_GRAPH_VIEW_LIMIT")? {
            policy.graph_view_limit = v;
        }
        if let Some(v) = parse_override(&lookup, "NSC_CONNECT_TIMEOUT_SECS")? {
            policy.connect_timeout_secs = v;
        }

        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> ConsoleResult<()> {
        let checks = [
            ("page_size", self.page_size as u64),
            ("max_path_hops", self.max_path_hops as u64),
            ("graph_view_limit", self.graph_view_limit as u64),
            ("connect_timeout_secs", self.connect_timeout_secs),
        ];
        for (key, value) in checks {
            if value == 0 {
                return Err(ConsoleError::config(format!("{} must be positive", key)));
            }
        }
        Ok(())
    }

    /// Clamp a requested graph view size to the allowed range.
    pub fn graph_view_limit(&self, requested: Option<usize>) -> usize {
        let (min, max) = GRAPH_VIEW_LIMIT_RANGE;
        requested.unwrap_or(self.graph_view_limit).clamp(min, max)
    }
}

/// Parsed straight into the target width, so out-of-range values fail
/// instead of truncating.
fn parse_override<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> ConsoleResult<Option<T>> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConsoleError::config(format!("{} must be a positive integer, got '{}'", key, raw))),
        None => Ok(None),
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub connections: ConnectionConfig,
    pub policy: PolicyConfig,
}

impl AppConfig {
    /// Load from the process environment. `config_file` wins over
    /// `NSC_CONFIG`.
    pub fn from_env(config_file: Option<&Path>) -> ConsoleResult<Self> {
        let lookup = |key: &str| std::env::var(key).ok();
        let env_file = lookup(ENV_CONFIG_FILE);
        let path = config_file.or(env_file.as_deref().map(Path::new));
        Ok(Self {
            connections: ConnectionConfig::from_lookup(lookup)?,
            policy: PolicyConfig::load(path, lookup)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use crate::error::ErrorKind;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn full_env() -> Vec<(&'static str, &'static str)> {
        vec![
            (ENV_DOCUMENT_URI, "mongodb://localhost:27017"),
            (ENV_GRAPH_URI, "bolt://localhost:7687"),
            (ENV_GRAPH_USER, "neo4j"),
            (ENV_GRAPH_PASSWORD, "secret"),
        ]
    }

    #[test]
    fn test_connection_config_from_lookup() {
        let config = ConnectionConfig::from_lookup(env(&full_env())).unwrap();
        assert_eq!(config.graph_user, "neo4j");
        assert!(!format!("{:?}", config).contains("secret"));
    }

    #[test]
    fn test_missing_variable_is_named() {
        let mut pairs = full_env();
        pairs.retain(|(k, _)| *k != ENV_GRAPH_PASSWORD);
        let err = ConnectionConfig::from_lookup(env(&pairs)).unwrap_err();
        assert!(err.message().contains("NEO4J_PASSWORD"));
    }

    #[test]
    fn test_blank_variable_counts_as_missing() {
        let mut pairs = full_env();
        pairs[0] = (ENV_DOCUMENT_URI, "  ");
        let err = ConnectionConfig::from_lookup(env(&pairs)).unwrap_err();
        assert!(err.message().contains("MONGODB_URI"));
    }

    #[test]
    fn test_malformed_uri_is_named() {
        let mut pairs = full_env();
        pairs[1] = (ENV_GRAPH_URI, "localhost:7687");
        let err = ConnectionConfig::from_lookup(env(&pairs)).unwrap_err();
        assert!(err.message().contains("NEO4J_URI"));
    }

    #[test]
    fn test_uri_scheme() {
        assert_eq!(uri_scheme("mongodb+srv://cluster0.example.net").as_deref(), Some("mongodb+srv"));
        assert_eq!(uri_scheme("memory://local").as_deref(), Some("memory"));
        assert_eq!(uri_scheme("nope"), None);
        assert_eq!(uri_scheme("bolt://"), None);
    }

    #[test]
    fn test_redact_uri() {
        assert_eq!(
            redact_uri("mongodb://admin:pw@db.example.com/test"),
            "mongodb://***@db.example.com/test"
        );
        assert_eq!(redact_uri("redis://localhost:6379"), "redis://localhost:6379");
    }

    #[test]
    fn test_policy_defaults() {
        let policy = PolicyConfig::load(None, env(&[])).unwrap();
        assert_eq!(policy, PolicyConfig::default());
    }

    #[test]
    fn test_policy_file_then_env_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[policy]\npage_size = 25\nmax_path_hops = 4").unwrap();

        let policy =
            PolicyConfig::load(Some(file.path()), env(&[("NSC_MAX_PATH_HOPS", "6")])).unwrap();
        assert_eq!(policy.page_size, 25);
        assert_eq!(policy.max_path_hops, 6);
        assert_eq!(policy.graph_view_limit, 100);
    }

    #[test]
    fn test_policy_rejects_zero_and_garbage() {
        assert!(PolicyConfig::load(None, env(&[("NSC_PAGE_SIZE", "0")])).is_err());
        let err = PolicyConfig::load(None, env(&[("NSC_PAGE_SIZE", "ten")])).unwrap_err();
        assert!(err.message().contains("NSC_PAGE_SIZE"));
    }

    #[test]
    fn test_policy_rejects_out_of_range_sizes() {
        let huge = "340282366920938463463374607431768211456";
        let err = PolicyConfig::load(None, env(&[("NSC_MAX_PATH_HOPS", huge)])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigError);
        assert!(err.message().contains("NSC_MAX_PATH_HOPS"));
    }

    #[test]
    fn test_policy_rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[policy]\npage_sise = 25").unwrap();
        assert!(PolicyConfig::load(Some(file.path()), env(&[])).is_err());
    }

    #[test]
    fn test_graph_view_limit_is_clamped() {
        let policy = PolicyConfig::default();
        assert_eq!(policy.graph_view_limit(None), 100);
        assert_eq!(policy.graph_view_limit(Some(1)), 10);
        assert_eq!(policy.graph_view_limit(Some(10_000)), 500);
    }
}
