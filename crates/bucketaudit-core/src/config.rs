//! Audit service configuration.
//!
//! Provides [`AuditConfig`]. Values are loaded from environment variables so
//! the service can be configured the same way in a container, a function
//! runtime, or a local shell.

use bucketaudit_model::ControlStatus;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::engine::ScoringPolicy;
use crate::weights::Weights;

/// Audit service configuration.
///
/// # Examples
///
/// ```
/// use bucketaudit_core::config::AuditConfig;
///
/// let config = AuditConfig::default();
/// assert_eq!(config.gateway_listen, "0.0.0.0:8080");
/// assert_eq!(config.excluded_name_patterns, vec!["state", "log"]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct AuditConfig {
    /// Bind address for the HTTP listener.
    #[builder(default = String::from("0.0.0.0:8080"))]
    pub gateway_listen: String,

    /// Region used by the storage client.
    #[builder(default = String::from("us-east-1"))]
    pub default_region: String,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Endpoint override for S3-compatible providers.
    #[builder(default)]
    pub s3_endpoint_url: Option<String>,

    /// Use path-style bucket addressing.
    #[builder(default = false)]
    pub s3_force_path_style: bool,

    /// Per-control deductions.
    #[builder(default)]
    pub weights: Weights,

    /// Substrings that exclude a bucket from account-wide scans.
    #[builder(default = default_excluded_patterns())]
    pub excluded_name_patterns: Vec<String>,

    /// Status assigned when no policy statement denies insecure transport.
    #[builder(default = ControlStatus::Warn)]
    pub secure_transport_status: ControlStatus,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            gateway_listen: String::from("0.0.0.0:8080"),
            default_region: String::from("us-east-1"),
            log_level: String::from("info"),
            s3_endpoint_url: None,
            s3_force_path_style: false,
            weights: Weights::default(),
            excluded_name_patterns: default_excluded_patterns(),
            secure_transport_status: ControlStatus::Warn,
        }
    }
}

impl AuditConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables (falling back to defaults):
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `GATEWAY_LISTEN` | `0.0.0.0:8080` |
    /// | `DEFAULT_REGION` | `us-east-1` |
    /// | `LOG_LEVEL` | `info` |
    /// | `S3_ENDPOINT_URL` | *(unset)* |
    /// | `S3_FORCE_PATH_STYLE` | `false` |
    /// | `AUDIT_WEIGHTS` | *(defaults)* |
    /// | `AUDIT_EXCLUDE_PATTERNS` | `state,log` |
    /// | `SECURE_TRANSPORT_STATUS` | `WARN` |
    ///
    /// Malformed `AUDIT_WEIGHTS` or `SECURE_TRANSPORT_STATUS` values are
    /// ignored and returned as messages, so a caller can report them once a
    /// tracing subscriber is installed.
    #[must_use]
    pub fn from_env() -> (Self, Vec<String>) {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from a variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> (Self, Vec<String>) {
        let mut config = Self::default();
        let mut issues = Vec::new();

        if let Some(v) = lookup("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Some(v) = lookup("DEFAULT_REGION").or_else(|| lookup("AWS_REGION")) {
            config.default_region = v;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = lookup("S3_ENDPOINT_URL") {
            if !v.trim().is_empty() {
                config.s3_endpoint_url = Some(v);
            }
        }
        if let Some(v) = lookup("S3_FORCE_PATH_STYLE") {
            config.s3_force_path_style = parse_bool(&v);
        }
        if let Some(v) = lookup("AUDIT_WEIGHTS") {
            match config.weights.clone().apply_overrides(&v) {
                Ok(weights) => config.weights = weights,
                Err(e) => issues.push(format!("AUDIT_WEIGHTS: {e}")),
            }
        }
        if let Some(v) = lookup("AUDIT_EXCLUDE_PATTERNS") {
            config.excluded_name_patterns = parse_list(&v);
        }
        if let Some(v) = lookup("SECURE_TRANSPORT_STATUS") {
            match v.parse::<ControlStatus>() {
                Ok(ControlStatus::Pass) => {
                    issues.push("SECURE_TRANSPORT_STATUS: PASS is not allowed".to_owned());
                }
                Ok(status) => config.secure_transport_status = status,
                Err(e) => issues.push(format!("SECURE_TRANSPORT_STATUS: {e}")),
            }
        }

        (config, issues)
    }

    /// The scoring knobs carried by this configuration.
    #[must_use]
    pub fn scoring_policy(&self) -> ScoringPolicy {
        ScoringPolicy {
            weights: self.weights.clone(),
            secure_transport_status: self.secure_transport_status,
        }
    }
}

fn default_excluded_patterns() -> Vec<String> {
    vec!["state".to_owned(), "log".to_owned()]
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Split a comma-separated list, dropping blanks.
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use bucketaudit_model::ControlId;

    use super::*;

    #[test]
    fn test_should_create_default_config() {
        let config = AuditConfig::default();
        assert_eq!(config.gateway_listen, "0.0.0.0:8080");
        assert_eq!(config.default_region, "us-east-1");
        assert_eq!(config.log_level, "info");
        assert!(config.s3_endpoint_url.is_none());
        assert!(!config.s3_force_path_style);
        assert_eq!(config.weights, Weights::default());
        assert_eq!(config.secure_transport_status, ControlStatus::Warn);
    }

    #[test]
    fn test_should_build_with_typed_builder() {
        let config = AuditConfig::builder()
            .gateway_listen("127.0.0.1:9999".into())
            .s3_endpoint_url(Some("http://localhost:4566".into()))
            .s3_force_path_style(true)
            .weights(Weights::default().with(ControlId::Cors, 25))
            .excluded_name_patterns(vec!["tmp".into()])
            .secure_transport_status(ControlStatus::Fail)
            .build();

        assert_eq!(config.gateway_listen, "127.0.0.1:9999");
        assert_eq!(config.default_region, "us-east-1");
        assert_eq!(
            config.s3_endpoint_url.as_deref(),
            Some("http://localhost:4566")
        );
        assert!(config.s3_force_path_style);
        assert_eq!(config.excluded_name_patterns, vec!["tmp"]);

        let policy = config.scoring_policy();
        assert_eq!(policy.weights.get(ControlId::Cors), 25);
        assert_eq!(policy.secure_transport_status, ControlStatus::Fail);
    }

    #[test]
    fn test_should_load_from_env() {
        let (config, _) = AuditConfig::from_env();
        assert!(!config.gateway_listen.is_empty());
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    #[test]
    fn test_should_read_listen_address_and_log_level_from_lookup() {
        let (config, issues) = AuditConfig::from_lookup(lookup(&[
            ("GATEWAY_LISTEN", "127.0.0.1:9000"),
            ("LOG_LEVEL", "debug"),
            ("AWS_REGION", "eu-west-1"),
            ("AUDIT_WEIGHTS", "cors=3"),
        ]));
        assert!(issues.is_empty());
        assert_eq!(config.gateway_listen, "127.0.0.1:9000");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.default_region, "eu-west-1");
        assert_eq!(config.weights.get(ControlId::Cors), 3);
    }

    #[test]
    fn test_should_return_rejected_values_instead_of_applying_them() {
        let (config, issues) = AuditConfig::from_lookup(lookup(&[
            ("AUDIT_WEIGHTS", "cors=lots"),
            ("SECURE_TRANSPORT_STATUS", "PASS"),
        ]));
        assert_eq!(issues.len(), 2);
        assert!(issues[0].starts_with("AUDIT_WEIGHTS"));
        assert!(issues[1].starts_with("SECURE_TRANSPORT_STATUS"));
        assert_eq!(config.weights, Weights::default());
        assert_eq!(config.secure_transport_status, ControlStatus::Warn);
    }

    #[test]
    fn test_should_serialize_to_camel_case_json() {
        let json = serde_json::to_string(&AuditConfig::default()).expect("test serialization");
        assert!(json.contains("gatewayListen"));
        assert!(json.contains("excludedNamePatterns"));
        assert!(json.contains("\"public_access_block\":40"));
    }

    #[test]
    fn test_should_parse_bool_values() {
        assert!(parse_bool("1"));
        assert!(parse_bool("TRUE"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool(""));
    }

    #[test]
    fn test_should_parse_list_values() {
        assert_eq!(parse_list("state, log ,,tf"), vec!["state", "log", "tf"]);
        assert!(parse_list(" , ").is_empty());
    }
}
