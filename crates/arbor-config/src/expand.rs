//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// Bare `$VAR` is left as-is. `field` names the config key in errors.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var)
            .map(Some)
            .map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Name of a variable that had no value and no default.
struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("ARBOR_TEST_BASE", "/repo");
        }
        let result = expand_env("${ARBOR_TEST_BASE}/browse", "render.base_path").unwrap();
        assert_eq!(result, "/repo/browse");
        unsafe {
            std::env::remove_var("ARBOR_TEST_BASE");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("ARBOR_TEST_UNSET");
        }
        let result = expand_env("${ARBOR_TEST_UNSET:-10 minutes}", "cache.assumed_valid").unwrap();
        assert_eq!(result, "10 minutes");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("ARBOR_TEST_MISSING");
        }
        let err = expand_env("${ARBOR_TEST_MISSING}", "store.path").unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("ARBOR_TEST_MISSING"));
        assert!(err.to_string().contains("store.path"));
    }

    #[test]
    fn test_literal_and_bare_dollar_unchanged() {
        assert_eq!(
            expand_env("hierarchy.yaml", "store.path").unwrap(),
            "hierarchy.yaml"
        );
        assert_eq!(expand_env("$HOME/x", "store.path").unwrap(), "$HOME/x");
    }
}
