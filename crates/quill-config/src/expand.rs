//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// An unset variable without a default is an error naming `field`. Values
/// without `${` are returned unchanged, so a bare `$` in a path is kept.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Lookup failure carrying the variable name.
struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_var() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("QUILL_TEST_BLOG_ROOT", "/srv/blog");
        }
        let result = expand_env("${QUILL_TEST_BLOG_ROOT}/posts", "posts.source_dirs").unwrap();
        assert_eq!(result, "/srv/blog/posts");
        unsafe {
            std::env::remove_var("QUILL_TEST_BLOG_ROOT");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("QUILL_TEST_UNSET_DIR");
        }
        let result = expand_env("${QUILL_TEST_UNSET_DIR:-drafts}", "posts.source_dirs").unwrap();
        assert_eq!(result, "drafts");
    }

    #[test]
    fn test_expand_value_wins_over_default() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("QUILL_TEST_SET_DIR", "published");
        }
        let result = expand_env("${QUILL_TEST_SET_DIR:-drafts}", "posts.source_dirs").unwrap();
        assert_eq!(result, "published");
        unsafe {
            std::env::remove_var("QUILL_TEST_SET_DIR");
        }
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("QUILL_TEST_MISSING");
        }
        let err = expand_env("${QUILL_TEST_MISSING}", "posts.source_dirs").unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let message = err.to_string();
        assert!(message.contains("QUILL_TEST_MISSING"));
        assert!(message.contains("posts.source_dirs"));
    }

    #[test]
    fn test_literal_and_bare_dollar_unchanged() {
        assert_eq!(expand_env("posts", "f").unwrap(), "posts");
        assert_eq!(expand_env("costs$2024", "f").unwrap(), "costs$2024");
    }
}
