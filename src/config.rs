//! Rate rule configuration.
//!
//! Rules are usually kept in a YAML file:
//!
//! ```yaml
//! global:
//!   command: 10-M
//!   limit: 200
//! rates:
//!   - path: /users
//!     method: GET
//!     command: 1-M
//!     limit: 60
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{LimiterError, Result};
use crate::ratelimit::{GlobalRate, RateRegistry, ScopedRate};

/// Prefix for environment variables overriding file settings.
pub const ENV_PREFIX: &str = "LIMITER";

/// Rules as written in configuration, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Limit applied to every client regardless of endpoint
    #[serde(default)]
    pub global: Option<GlobalRateConfig>,

    /// Per path and method limits, in lookup order
    #[serde(default)]
    pub rates: Vec<ScopedRateConfig>,

    /// Skip invalid rules instead of failing the whole load
    #[serde(default)]
    pub skip_invalid: bool,
}

/// Configuration for the global rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalRateConfig {
    /// Period command, e.g. `10-M`
    pub command: String,
    /// Requests allowed per period
    pub limit: i64,
}

/// Configuration for one scoped rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopedRateConfig {
    pub path: String,
    pub method: String,
    /// Period command, e.g. `10-M`
    pub command: String,
    /// Requests allowed per period
    pub limit: i64,
}

/// Validated rules ready for an enforcement layer.
#[derive(Debug, Clone, Default)]
pub struct RateRules {
    pub global: Option<GlobalRate>,
    pub registry: RateRegistry,
}

impl RulesConfig {
    /// Load rules from a file, with `LIMITER_*` environment overrides.
    ///
    /// The format is chosen from the file extension (YAML, TOML or JSON).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading rate rules");

        if !path.exists() {
            return Err(LimiterError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("rules file not found: {}", path.display()),
            )));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Load rules from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| LimiterError::Config(format!("Failed to parse rate rules: {}", e)))
    }

    /// Validate every rule in order.
    ///
    /// Without `skip_invalid` the first invalid rule aborts the build with its
    /// parse error. With it, invalid rules are logged and left out.
    pub fn build(&self) -> Result<RateRules> {
        let mut rules = RateRules::default();

        if let Some(global) = &self.global {
            match GlobalRate::parse(&global.command, global.limit) {
                Ok(rate) => rules.global = Some(rate),
                Err(e) if self.skip_invalid => {
                    warn!(command = %global.command, error = %e, "Skipping invalid global rate");
                }
                Err(e) => return Err(e),
            }
        }

        for (index, rate) in self.rates.iter().enumerate() {
            match ScopedRate::parse(&rate.path, &rate.command, &rate.method, rate.limit) {
                Ok(parsed) => rules.registry.append(parsed),
                Err(e) if self.skip_invalid => {
                    warn!(
                        index = index,
                        path = %rate.path,
                        method = %rate.method,
                        error = %e,
                        "Skipping invalid scoped rate"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            global = rules.global.is_some(),
            scoped = rules.registry.len(),
            "Rate rules built"
        );
        Ok(rules)
    }
}

impl RateRules {
    /// Load and validate rules from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        RulesConfig::from_file(path)?.build()
    }

    /// Load and validate rules from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        RulesConfig::from_yaml(yaml)?.build()
    }

    /// Limit for `path` and `method`, or [`crate::ratelimit::NO_LIMIT`].
    pub fn limit_for(&self, path: &str, method: &str) -> i64 {
        self.registry.get_limit(path, method)
    }

    /// Refresh the global deadline and every scoped deadline.
    pub fn update_deadlines(&mut self) {
        self.update_deadlines_at(Utc::now());
    }

    pub fn update_deadlines_at(&mut self, now: DateTime<Utc>) {
        if let Some(global) = self.global.as_mut() {
            global.update_deadline_at(now);
        }
        self.registry.update_deadline_at(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::NO_LIMIT;
    use chrono::TimeZone;
    use std::io::Write;
    use std::time::Duration;

    const RULES: &str = r#"
global:
  command: 10-M
  limit: 200
rates:
  - path: /users
    method: GET
    command: 1-M
    limit: 60
  - path: /users
    method: post
    command: 1-h
    limit: 10
"#;

    #[test]
    fn test_parse_rules() {
        let config = RulesConfig::from_yaml(RULES).unwrap();
        assert!(config.global.is_some());
        assert_eq!(config.rates.len(), 2);
        assert!(!config.skip_invalid);
    }

    #[test]
    fn test_build_rules() {
        let rules = RateRules::from_yaml(RULES).unwrap();

        let global = rules.global.as_ref().unwrap();
        assert_eq!(global.period(), Duration::from_secs(600));
        assert_eq!(global.limit(), 200);

        assert_eq!(rules.limit_for("/users", "GET"), 60);
        assert_eq!(rules.limit_for("/users", "post"), 10);
        assert_eq!(rules.limit_for("/users", "POST"), NO_LIMIT);
    }

    #[test]
    fn test_empty_rules() {
        let rules = RateRules::from_yaml("{}").unwrap();
        assert!(rules.global.is_none());
        assert!(rules.registry.is_empty());
    }

    #[test]
    fn test_invalid_rule_aborts_build() {
        let yaml = r#"
rates:
  - path: /a
    method: FOO
    command: 1-M
    limit: 5
"#;
        let err = RateRules::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, LimiterError::Method { .. }));
    }

    #[test]
    fn test_invalid_global_aborts_build() {
        let yaml = r#"
global:
  command: 0-M
  limit: 5
"#;
        let err = RateRules::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, LimiterError::Command { .. }));
    }

    #[test]
    fn test_skip_invalid_rules() {
        let yaml = r#"
skip_invalid: true
global:
  command: 5-X
  limit: 5
rates:
  - path: /a
    method: GET
    command: 1-M
    limit: 0
  - path: /b
    method: GET
    command: 1-M
    limit: 3
"#;
        let rules = RateRules::from_yaml(yaml).unwrap();
        assert!(rules.global.is_none());
        assert_eq!(rules.registry.len(), 1);
        assert_eq!(rules.limit_for("/a", "GET"), NO_LIMIT);
        assert_eq!(rules.limit_for("/b", "GET"), 3);
    }

    #[test]
    fn test_malformed_yaml() {
        let err = RulesConfig::from_yaml("rates: [").unwrap_err();
        assert!(matches!(err, LimiterError::Config(_)));
    }

    #[test]
    fn test_update_deadlines() {
        let mut rules = RateRules::from_yaml(RULES).unwrap();
        let now = Utc.timestamp_opt(1_000, 0).unwrap();
        rules.update_deadlines_at(now);

        assert_eq!(rules.global.as_ref().unwrap().deadline(), 1_600);
        assert_eq!(rules.registry.find("/users", "GET").unwrap().deadline(), 1_060);
        assert_eq!(rules.registry.find("/users", "post").unwrap().deadline(), 4_600);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(RULES.as_bytes()).unwrap();

        let rules = RateRules::from_file(file.path()).unwrap();
        assert_eq!(rules.registry.len(), 2);
        assert_eq!(rules.limit_for("/users", "GET"), 60);
    }

    #[test]
    fn test_from_file_missing() {
        let err = RulesConfig::from_file("/nonexistent/rules.yaml").unwrap_err();
        assert!(matches!(err, LimiterError::Io(_)));
    }
}
