//! Configuration management for Quill.
//!
//! Parses `quill.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! Entries of `posts.source_dirs` support `${VAR}` (error if unset) and
//! `${VAR:-default}`.
//!
//! ## Example
//!
//! ```toml
//! [posts]
//! source_dirs = ["posts", "${QUILL_DRAFTS:-drafts}"]
//! extension = "txt"
//! list_fields = ["tags"]
//! list_separator = ","
//! cache_enabled = true
//!
//! [listing]
//! page_size = 10
//! ```

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// Only `Some` values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Replace the configured source directories.
    pub source_dirs: Option<Vec<PathBuf>>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "quill.toml";

/// Directory next to the config file holding Quill's own data.
const PROJECT_DIRNAME: &str = ".quill";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Posts configuration (paths are relative strings from TOML).
    posts: PostsConfigRaw,
    /// Listing sizes.
    pub listing: ListingConfig,

    /// Resolved posts configuration (set after loading).
    #[serde(skip)]
    pub posts_resolved: PostsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw posts configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PostsConfigRaw {
    source_dirs: Option<Vec<String>>,
    extension: Option<String>,
    list_fields: Option<Vec<String>>,
    list_separator: Option<String>,
    cache_enabled: Option<bool>,
}

/// Resolved posts configuration with absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostsConfig {
    /// Directories scanned for post files. The first receives new posts.
    pub source_dirs: Vec<PathBuf>,
    /// Project directory for Quill data (`.quill/`).
    pub project_dir: PathBuf,
    /// Post file extension without the leading dot.
    pub extension: String,
    /// Header keys parsed as lists.
    pub list_fields: Vec<String>,
    /// Separator for list-valued header fields.
    pub list_separator: char,
    /// Whether the on-disk index cache is enabled.
    pub cache_enabled: bool,
}

impl PostsConfig {
    fn with_base(base: &Path) -> Self {
        Self {
            source_dirs: vec![base.join("posts")],
            project_dir: base.join(PROJECT_DIRNAME),
            extension: "txt".to_owned(),
            list_fields: vec!["tags".to_owned()],
            list_separator: ',',
            cache_enabled: true,
        }
    }

    /// Cache directory path (`.quill/cache/`).
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.project_dir.join("cache")
    }

    /// Cache directory if caching is enabled.
    #[must_use]
    pub fn effective_cache_dir(&self) -> Option<PathBuf> {
        self.cache_enabled.then(|| self.cache_dir())
    }
}

impl Default for PostsConfig {
    fn default() -> Self {
        Self::with_base(Path::new("."))
    }
}

/// Listing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Posts per page of the main listing.
    pub page_size: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`posts.source_dirs`").
        field: String,
        /// Error message (e.g., "${`BLOG_ROOT`} not set").
        message: String,
    },
}

/// Require a listing size to be positive.
fn require_positive(value: usize, field: &str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `quill.toml` in current directory and parents,
    /// falling back to defaults relative to the current directory.
    ///
    /// CLI settings are applied after loading and path resolution.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the result is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dirs) = &settings.source_dirs {
            self.posts_resolved.source_dirs.clone_from(source_dirs);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.posts_resolved.cache_enabled = cache_enabled;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            posts: PostsConfigRaw::default(),
            listing: ListingConfig::default(),
            posts_resolved: PostsConfig::with_base(base),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Source directories are not checked for existence here; the post
    /// manager does that when it is created.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_posts()?;
        self.validate_listing()?;
        Ok(())
    }

    fn validate_posts(&self) -> Result<(), ConfigError> {
        let posts = &self.posts_resolved;
        if posts.source_dirs.is_empty() {
            return Err(ConfigError::Validation(
                "posts.source_dirs must list at least one directory".to_owned(),
            ));
        }
        if posts.extension.is_empty() {
            return Err(ConfigError::Validation(
                "posts.extension cannot be empty".to_owned(),
            ));
        }
        if posts.extension.starts_with('.') {
            return Err(ConfigError::Validation(format!(
                "posts.extension must not start with a dot (use \"{}\")",
                posts.extension.trim_start_matches('.')
            )));
        }
        Ok(())
    }

    fn validate_listing(&self) -> Result<(), ConfigError> {
        require_positive(self.listing.page_size, "listing.page_size")
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(dirs) = &mut self.posts.source_dirs {
            for dir in dirs {
                *dir = expand::expand_env(dir, "posts.source_dirs")?;
            }
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let defaults = PostsConfig::with_base(config_dir);
        let raw = &self.posts;

        let list_separator = match raw.list_separator.as_deref() {
            None => defaults.list_separator,
            Some(sep) => {
                let mut chars = sep.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => {
                        return Err(ConfigError::Validation(format!(
                            "posts.list_separator must be a single character, got {sep:?}"
                        )));
                    }
                }
            }
        };

        self.posts_resolved = PostsConfig {
            source_dirs: raw.source_dirs.as_ref().map_or(defaults.source_dirs, |dirs| {
                dirs.iter().map(|d| config_dir.join(d)).collect()
            }),
            project_dir: defaults.project_dir,
            extension: raw.extension.clone().unwrap_or(defaults.extension),
            list_fields: raw.list_fields.clone().unwrap_or(defaults.list_fields),
            list_separator,
            cache_enabled: raw.cache_enabled.unwrap_or(defaults.cache_enabled),
        };

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn resolved(toml: &str) -> Result<Config, ConfigError> {
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/blog"))?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        let posts = &config.posts_resolved;

        assert_eq!(posts.source_dirs, vec![PathBuf::from("/test/posts")]);
        assert_eq!(posts.project_dir, PathBuf::from("/test/.quill"));
        assert_eq!(posts.cache_dir(), PathBuf::from("/test/.quill/cache"));
        assert_eq!(posts.extension, "txt");
        assert_eq!(posts.list_fields, vec!["tags".to_owned()]);
        assert_eq!(posts.list_separator, ',');
        assert!(posts.cache_enabled);
        assert_eq!(config.listing, ListingConfig::default());
        assert_eq!(config.listing.page_size, 10);
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = resolved("").unwrap();

        assert_eq!(
            config.posts_resolved.source_dirs,
            vec![PathBuf::from("/blog/posts")]
        );
        assert_eq!(config.posts_resolved.extension, "txt");
    }

    #[test]
    fn test_parse_posts_section() {
        let config = resolved(
            r#"
[posts]
source_dirs = ["articles", "/abs/notes"]
extension = "md"
list_fields = ["tags", "categories"]
list_separator = ";"
cache_enabled = false
"#,
        )
        .unwrap();
        let posts = &config.posts_resolved;

        assert_eq!(
            posts.source_dirs,
            vec![PathBuf::from("/blog/articles"), PathBuf::from("/abs/notes")]
        );
        assert_eq!(posts.extension, "md");
        assert_eq!(
            posts.list_fields,
            vec!["tags".to_owned(), "categories".to_owned()]
        );
        assert_eq!(posts.list_separator, ';');
        assert!(!posts.cache_enabled);
        assert_eq!(posts.effective_cache_dir(), None);
    }

    #[test]
    fn test_parse_listing_section() {
        let config = resolved(
            r"
[listing]
page_size = 3
",
        )
        .unwrap();

        assert_eq!(config.listing.page_size, 3);
    }

    #[test]
    fn test_separator_must_be_single_char() {
        let err = resolved(
            r#"
[posts]
list_separator = ", "
"#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("list_separator"));
    }

    #[test]
    fn test_empty_source_dirs_rejected() {
        let err = resolved(
            r"
[posts]
source_dirs = []
",
        )
        .unwrap_err();
        assert!(err.to_string().contains("posts.source_dirs"));
    }

    #[test]
    fn test_extension_with_dot_rejected() {
        let err = resolved(
            r#"
[posts]
extension = ".txt"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("must not start with a dot"));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = resolved(
            r"
[listing]
page_size = 0
",
        )
        .unwrap_err();
        assert!(err.to_string().contains("listing.page_size"));
    }

    #[test]
    fn test_load_from_file_resolves_relative_to_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("quill.toml");
        std::fs::write(&config_path, "[posts]\nsource_dirs = [\"content\"]\n").unwrap();

        let config = Config::load(Some(&config_path), None).unwrap();

        assert_eq!(
            config.posts_resolved.source_dirs,
            vec![temp_dir.path().join("content")]
        );
        assert_eq!(
            config.posts_resolved.cache_dir(),
            temp_dir.path().join(".quill/cache")
        );
        assert_eq!(config.config_path, Some(config_path));
    }

    #[test]
    fn test_load_expands_env_in_source_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("quill.toml");
        std::fs::write(
            &config_path,
            "[posts]\nsource_dirs = [\"${QUILL_TEST_CFG_UNSET:-fallback}\"]\n",
        )
        .unwrap();

        let config = Config::load(Some(&config_path), None).unwrap();

        assert_eq!(
            config.posts_resolved.source_dirs,
            vec![temp_dir.path().join("fallback")]
        );
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/quill.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("quill.toml");
        std::fs::write(&config_path, "[posts\n").unwrap();

        let err = Config::load(Some(&config_path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            source_dirs: Some(vec![PathBuf::from("/elsewhere")]),
            cache_enabled: Some(false),
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(
            config.posts_resolved.source_dirs,
            vec![PathBuf::from("/elsewhere")]
        );
        assert!(!config.posts_resolved.cache_enabled);
        // Unchanged
        assert_eq!(config.posts_resolved.extension, "txt");
    }

    #[test]
    fn test_apply_cli_settings_none_keeps_config() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(
            config.posts_resolved,
            PostsConfig::with_base(Path::new("/test"))
        );
    }
}
