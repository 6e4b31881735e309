//! Configuration types for the ACL synchronizer.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Exit node list feed.
    #[serde(default)]
    pub source: SourceConfig,

    /// Managed ACL service credentials and identifiers.
    pub acl: AclConfig,

    /// Batch sizing for ACL updates.
    #[serde(default)]
    pub batch: BatchConfig,

    /// Safety guards.
    #[serde(default)]
    pub safety: SafetyConfig,
}

/// Exit node list feed configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// URL returning one candidate IP per line.
    #[serde(default = "default_source_url")]
    pub url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_source_url() -> String {
    "https://check.torproject.org/torbulkexitlist".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Managed ACL service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AclConfig {
    /// API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// API key (supports ${ENV_VAR} syntax).
    pub api_key: String,

    /// Service identifier owning the ACL.
    pub service_id: String,

    /// ACL identifier within the service.
    pub acl_id: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_api_base() -> String {
    "https://api.fastly.com".to_string()
}

/// Batch sizing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Maximum deltas per PATCH request (remote per-request limit).
    #[serde(default = "default_max_size")]
    pub max_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
        }
    }
}

fn default_max_size() -> usize {
    500
}

/// Safety guard configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SafetyConfig {
    /// Allow a pass whose desired set is empty to delete every ACL entry.
    /// Off by default: an empty feed body served with a 200 would otherwise
    /// wipe the whole ACL.
    #[serde(default)]
    pub allow_empty_desired: bool,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let expanded = expand_env_vars(&content);
        let config: Config = serde_yaml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.acl.api_key.is_empty() {
            anyhow::bail!("acl.api_key is empty");
        }
        if self.acl.service_id.is_empty() {
            anyhow::bail!("acl.service_id is empty");
        }
        if self.acl.acl_id.is_empty() {
            anyhow::bail!("acl.acl_id is empty");
        }
        if self.source.url.is_empty() {
            anyhow::bail!("source.url is empty");
        }
        if self.batch.max_size == 0 {
            anyhow::bail!("batch.max_size must be greater than 0");
        }
        Ok(())
    }

    /// Generate example configuration YAML.
    pub fn example() -> String {
        r#"# Tor ACL synchronizer configuration

# Exit node list feed
source:
  url: "https://check.torproject.org/torbulkexitlist"
  timeout_seconds: 30

# Managed ACL service
acl:
  api_base: "https://api.fastly.com"
  api_key: "${FASTLY_API_KEY}"   # Use environment variable
  service_id: "SU1Z0isxPaozGVKXdv0eY"
  acl_id: "6tUXdegLTf5BCig0zGFrU3"
  timeout_seconds: 30

# ACL update batching
batch:
  max_size: 500                  # Remote per-request entries limit

# Safety guards
safety:
  allow_empty_desired: false     # Refuse to wipe the ACL on an empty feed
"#
        .to_string()
    }
}

/// Expand environment variables in the format ${VAR_NAME}.
fn expand_env_vars(content: &str) -> String {
    let mut result = content.to_string();
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();

    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        let var_value = std::env::var(var_name).unwrap_or_default();
        result = result.replace(&cap[0], &var_value);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> Config {
        Config {
            source: SourceConfig::default(),
            acl: AclConfig {
                api_base: default_api_base(),
                api_key: "test-key".to_string(),
                service_id: "svc1".to_string(),
                acl_id: "acl1".to_string(),
                timeout_seconds: 30,
            },
            batch: BatchConfig::default(),
            safety: SafetyConfig::default(),
        }
    }

    #[test]
    fn test_default_source() {
        let source = SourceConfig::default();
        assert_eq!(source.url, "https://check.torproject.org/torbulkexitlist");
        assert_eq!(source.timeout_seconds, 30);
    }

    #[test]
    fn test_default_batch_size() {
        let batch = BatchConfig::default();
        assert_eq!(batch.max_size, 500);
    }

    #[test]
    fn test_default_safety() {
        let safety = SafetyConfig::default();
        assert!(!safety.allow_empty_desired);
    }

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("TEST_ACL_KEY", "secret123");
        let input = "api_key: \"${TEST_ACL_KEY}\"";
        let result = expand_env_vars(input);
        assert_eq!(result, "api_key: \"secret123\"");
        std::env::remove_var("TEST_ACL_KEY");
    }

    #[test]
    fn test_expand_env_vars_missing() {
        let input = "api_key: \"${NONEXISTENT_VAR}\"";
        let result = expand_env_vars(input);
        assert_eq!(result, "api_key: \"\"");
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
acl:
  api_key: "abc"
  service_id: "svc"
  acl_id: "acl"

batch:
  max_size: 100

safety:
  allow_empty_desired: true
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.acl.api_key, "abc");
        assert_eq!(config.acl.api_base, "https://api.fastly.com");
        assert_eq!(config.batch.max_size, 100);
        assert!(config.safety.allow_empty_desired);
        assert_eq!(config.source.timeout_seconds, 30);
    }

    #[test]
    fn test_validate_empty_api_key() {
        let mut config = create_test_config();
        config.acl.api_key = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_batch_size() {
        let mut config = create_test_config();
        config.batch.max_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ok() {
        assert!(create_test_config().validate().is_ok());
    }

    #[test]
    fn test_load_from_file_expands_env() {
        std::env::set_var("TEST_LOAD_KEY", "from-env");
        let yaml = r#"
acl:
  api_key: "${TEST_LOAD_KEY}"
  service_id: "svc"
  acl_id: "acl"
"#;
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), yaml).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.acl.api_key, "from-env");
        std::env::remove_var("TEST_LOAD_KEY");
    }

    #[test]
    fn test_example_config_parses() {
        std::env::set_var("FASTLY_API_KEY", "example-key");
        let config: Config = serde_yaml::from_str(&expand_env_vars(&Config::example())).unwrap();
        assert!(config.validate().is_ok());
        std::env::remove_var("FASTLY_API_KEY");
    }
}
