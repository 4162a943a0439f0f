//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// `field` names the configuration key for error reporting.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env(value)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_value_unchanged() {
        assert_eq!(
            expand_env("https://www.rubydoc.info", "url").unwrap(),
            "https://www.rubydoc.info"
        );
    }

    #[test]
    fn test_default_used_when_unset() {
        let value = expand_env("${GEMDOCS_TEST_SURELY_UNSET_VAR:-0.0.0.0}", "server.host").unwrap();
        assert_eq!(value, "0.0.0.0");
    }

    #[test]
    fn test_unset_variable_is_error() {
        let err = expand_env("${GEMDOCS_TEST_SURELY_UNSET_VAR}", "server.host").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { ref field, .. } if field == "server.host"));
        assert!(err.to_string().contains("GEMDOCS_TEST_SURELY_UNSET_VAR"));
    }
}
