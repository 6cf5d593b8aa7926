//! Authorization gate configuration.

use std::env;

/// Role used when a request carries no roles of its own.
pub const DEFAULT_ROLE: &str = "any";
/// Header read for roles when header resolution is enabled.
pub const DEFAULT_ROLES_HEADER: &str = "x-roles";
pub const DEFAULT_ROLES_DELIMITER: &str = ",";

const DEFAULT_MODEL_PATH: &str = "config/model.conf";

/// Gate configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `CASBIN_MODEL_PATH`: casbin model file (default: `config/model.conf`)
/// - `CASBIN_POLICY_PATH`: casbin policy CSV file (no default)
/// - `ROLES_HEADER_ENABLED`: read roles from a request header (default: `false`)
/// - `ROLES_HEADER_NAME`: header carrying roles (default: `x-roles`)
/// - `ROLES_HEADER_DELIMITER`: separator between roles in the header (default: `,`)
/// - `DEFAULT_ROLE`: fallback role (default: `any`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GateConfig {
    pub model_path: String,
    pub policy_path: Option<String>,
    pub roles_header_enabled: bool,
    pub roles_header_name: String,
    pub roles_header_delimiter: String,
    pub default_role: String,
}

impl GateConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            model_path: non_empty("CASBIN_MODEL_PATH")
                .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string()),
            policy_path: non_empty("CASBIN_POLICY_PATH"),
            roles_header_enabled: non_empty("ROLES_HEADER_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            roles_header_name: non_empty("ROLES_HEADER_NAME")
                .unwrap_or_else(|| DEFAULT_ROLES_HEADER.to_string()),
            // Whitespace is a legal delimiter, so only an unset value falls back.
            roles_header_delimiter: lookup("ROLES_HEADER_DELIMITER")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_ROLES_DELIMITER.to_string()),
            default_role: non_empty("DEFAULT_ROLE").unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GateConfig::default();
        assert_eq!(config.model_path, "config/model.conf");
        assert_eq!(config.policy_path, None);
        assert!(!config.roles_header_enabled);
        assert_eq!(config.roles_header_name, "x-roles");
        assert_eq!(config.roles_header_delimiter, ",");
        assert_eq!(config.default_role, "any");
    }

    #[test]
    fn test_overrides() {
        let config = GateConfig::from_lookup(lookup_from(&[
            ("CASBIN_MODEL_PATH", "/etc/gate/model.conf"),
            ("CASBIN_POLICY_PATH", "/etc/gate/policy.csv"),
            ("ROLES_HEADER_ENABLED", "TRUE"),
            ("ROLES_HEADER_NAME", "X-User-Roles"),
            ("ROLES_HEADER_DELIMITER", ";"),
            ("DEFAULT_ROLE", "guest"),
        ]));

        assert_eq!(config.model_path, "/etc/gate/model.conf");
        assert_eq!(config.policy_path.as_deref(), Some("/etc/gate/policy.csv"));
        assert!(config.roles_header_enabled);
        assert_eq!(config.roles_header_name, "X-User-Roles");
        assert_eq!(config.roles_header_delimiter, ";");
        assert_eq!(config.default_role, "guest");
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config = GateConfig::from_lookup(lookup_from(&[
            ("CASBIN_POLICY_PATH", "  "),
            ("DEFAULT_ROLE", ""),
        ]));
        assert_eq!(config.policy_path, None);
        assert_eq!(config.default_role, "any");
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("yes"));
        assert!(parse_flag(" On "));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("enabled"));
    }
}
