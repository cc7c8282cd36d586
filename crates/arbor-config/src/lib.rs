//! Configuration management for arbor.
//!
//! Parses `arbor.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `store.path`
//! - `render.base_path`
//! - `cache.assumed_valid`

mod duration;
mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override hierarchy document path.
    pub store_path: Option<PathBuf>,
    /// Override maximum tree depth.
    pub depth: Option<u32>,
    /// Override leaf exclusion.
    pub exclude_leaves: Option<bool>,
    /// Override render mode (`true` = reference sets, `false` = link list).
    pub full: Option<bool>,
    /// Override base path for list links.
    pub base_path: Option<String>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "arbor.toml";

/// Default hierarchy document name.
const DEFAULT_STORE_PATH: &str = "hierarchy.yaml";

/// Default maximum tree depth.
pub const DEFAULT_DEPTH: u32 = 999;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store configuration (paths are relative strings from TOML).
    store: StoreConfigRaw,
    /// Hierarchy traversal configuration.
    pub hierarchy: HierarchyConfig,
    /// Rendering configuration.
    pub render: RenderConfig,
    /// Cache configuration (durations are strings from TOML).
    cache: CacheConfigRaw,

    /// Resolved store configuration (set after loading).
    #[serde(skip)]
    pub store_resolved: StoreConfig,
    /// Resolved cache configuration (set after loading).
    #[serde(skip)]
    pub cache_resolved: CacheConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw store configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StoreConfigRaw {
    path: Option<String>,
}

/// Resolved store configuration with absolute paths.
#[derive(Debug, Default)]
pub struct StoreConfig {
    /// Hierarchy document.
    pub path: PathBuf,
}

/// Hierarchy traversal configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Maximum tree depth (`0` keeps only the roots).
    pub depth: u32,
    /// Omit leaves from the tree.
    pub exclude_leaves: bool,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            exclude_leaves: false,
        }
    }
}

/// Rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Render nested reference sets (`true`) or a link list (`false`).
    pub full: bool,
    /// Base path prepended to list links.
    pub base_path: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            full: true,
            base_path: String::new(),
        }
    }
}

/// Raw cache configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CacheConfigRaw {
    enabled: Option<bool>,
    item_counts: Option<bool>,
    assumed_valid: Option<String>,
}

/// Resolved cache configuration.
#[derive(Debug, Default)]
pub struct CacheConfig {
    /// Project directory for arbor data (`.arbor/`).
    pub project_dir: PathBuf,
    /// Whether rendered views are cached.
    pub enabled: bool,
    /// Add item-count tokens to cache descriptors.
    pub item_counts: bool,
    /// Serve cached views for this long without revalidating.
    pub assumed_valid: Option<Duration>,
}

impl CacheConfig {
    /// Cache directory path (`.arbor/cache/`).
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.project_dir.join("cache")
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
        /// Config field path (e.g., "`store.path`").
        field: String,
        /// Error message (e.g., "${`HIERARCHY_FILE`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `arbor.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
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
        if let Some(path) = &settings.store_path {
            self.store_resolved.path.clone_from(path);
        }
        if let Some(depth) = settings.depth {
            self.hierarchy.depth = depth;
        }
        if let Some(exclude_leaves) = settings.exclude_leaves {
            self.hierarchy.exclude_leaves = exclude_leaves;
        }
        if let Some(full) = settings.full {
            self.render.full = full;
        }
        if let Some(base_path) = &settings.base_path {
            self.render.base_path.clone_from(base_path);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.cache_resolved.enabled = cache_enabled;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(current)
    }

    /// Search for config file in `dir` and its parents.
    fn discover_from(mut dir: PathBuf) -> Option<PathBuf> {
        loop {
            let candidate = dir.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !dir.pop() {
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
            store: StoreConfigRaw::default(),
            hierarchy: HierarchyConfig::default(),
            render: RenderConfig::default(),
            cache: CacheConfigRaw::default(),
            store_resolved: StoreConfig {
                path: base.join(DEFAULT_STORE_PATH),
            },
            cache_resolved: CacheConfig {
                project_dir: base.join(".arbor"),
                enabled: true,
                item_counts: false,
                assumed_valid: None,
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after applying CLI
    /// settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_resolved.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "store.path cannot be empty".to_owned(),
            ));
        }

        let base_path = &self.render.base_path;
        if !base_path.is_empty() && !base_path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "render.base_path must be empty or start with /, got {base_path:?}"
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref path) = self.store.path {
            self.store.path = Some(expand::expand_env(path, "store.path")?);
        }

        self.render.base_path = expand::expand_env(&self.render.base_path, "render.base_path")?;

        if let Some(ref assumed_valid) = self.cache.assumed_valid {
            self.cache.assumed_valid =
                Some(expand::expand_env(assumed_valid, "cache.assumed_valid")?);
        }

        Ok(())
    }

    /// Resolve relative paths and parse durations.
    fn resolve(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        self.store_resolved = StoreConfig {
            path: config_dir.join(self.store.path.as_deref().unwrap_or(DEFAULT_STORE_PATH)),
        };

        let assumed_valid = self
            .cache
            .assumed_valid
            .as_deref()
            .map(|value| duration::parse_duration(value, "cache.assumed_valid"))
            .transpose()?;

        self.cache_resolved = CacheConfig {
            project_dir: config_dir.join(".arbor"),
            enabled: self.cache.enabled.unwrap_or(true),
            item_counts: self.cache.item_counts.unwrap_or(false),
            assumed_valid,
        };

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn parse_and_resolve(toml: &str, base: &Path) -> Result<Config, ConfigError> {
        let mut config: Config = toml::from_str(toml)?;
        config.expand_env_vars()?;
        config.resolve(base)?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(
            config.store_resolved.path,
            PathBuf::from("/test/hierarchy.yaml")
        );
        assert_eq!(config.hierarchy.depth, 999);
        assert!(!config.hierarchy.exclude_leaves);
        assert!(config.render.full);
        assert_eq!(config.render.base_path, "");
        assert_eq!(
            config.cache_resolved.project_dir,
            PathBuf::from("/test/.arbor")
        );
        assert_eq!(
            config.cache_resolved.cache_dir(),
            PathBuf::from("/test/.arbor/cache")
        );
        assert!(config.cache_resolved.enabled);
        assert!(!config.cache_resolved.item_counts);
        assert_eq!(config.cache_resolved.assumed_valid, None);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = parse_and_resolve("", Path::new("/project")).unwrap();
        assert_eq!(config.hierarchy.depth, 999);
        assert_eq!(
            config.store_resolved.path,
            PathBuf::from("/project/hierarchy.yaml")
        );
        assert!(config.cache_resolved.enabled);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[store]
path = "data/units.yaml"

[hierarchy]
depth = 3
exclude_leaves = true

[render]
full = false
base_path = "/repo"

[cache]
enabled = false
item_counts = true
assumed_valid = "10 minutes"
"#;
        let config = parse_and_resolve(toml, Path::new("/project")).unwrap();

        assert_eq!(
            config.store_resolved.path,
            PathBuf::from("/project/data/units.yaml")
        );
        assert_eq!(config.hierarchy.depth, 3);
        assert!(config.hierarchy.exclude_leaves);
        assert!(!config.render.full);
        assert_eq!(config.render.base_path, "/repo");
        assert!(!config.cache_resolved.enabled);
        assert!(config.cache_resolved.item_counts);
        assert_eq!(
            config.cache_resolved.assumed_valid,
            Some(Duration::from_secs(600))
        );
    }

    #[test]
    fn test_negative_depth_is_parse_error() {
        let err = parse_and_resolve("[hierarchy]\ndepth = -1\n", Path::new("/p")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_assumed_valid_is_validation_error() {
        let err = parse_and_resolve("[cache]\nassumed_valid = \"eventually\"\n", Path::new("/p"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_base_path_must_be_absolute() {
        let err = parse_and_resolve("[render]\nbase_path = \"repo\"\n", Path::new("/p"))
            .unwrap_err();
        assert!(err.to_string().contains("render.base_path"));
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("ARBOR_CFG_STORE", "shared/units.yaml");
            std::env::set_var("ARBOR_CFG_TTL", "2h");
        }
        let toml = r#"
[store]
path = "${ARBOR_CFG_STORE}"

[render]
base_path = "${ARBOR_CFG_BASE:-/handle-root}"

[cache]
assumed_valid = "${ARBOR_CFG_TTL}"
"#;
        let config = parse_and_resolve(toml, Path::new("/project")).unwrap();

        assert_eq!(
            config.store_resolved.path,
            PathBuf::from("/project/shared/units.yaml")
        );
        assert_eq!(config.render.base_path, "/handle-root");
        assert_eq!(
            config.cache_resolved.assumed_valid,
            Some(Duration::from_secs(7200))
        );
        unsafe {
            std::env::remove_var("ARBOR_CFG_STORE");
            std::env::remove_var("ARBOR_CFG_TTL");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("ARBOR_CFG_MISSING");
        }
        let err = parse_and_resolve("[store]\npath = \"${ARBOR_CFG_MISSING}\"\n", Path::new("/p"))
            .unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { ref field, .. } if field == "store.path"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let settings = CliSettings {
            store_path: Some(PathBuf::from("/elsewhere/units.yaml")),
            depth: Some(2),
            exclude_leaves: Some(true),
            full: Some(false),
            base_path: Some("/repo".to_owned()),
            cache_enabled: Some(false),
        };

        config.apply_cli_settings(&settings);

        assert_eq!(
            config.store_resolved.path,
            PathBuf::from("/elsewhere/units.yaml")
        );
        assert_eq!(config.hierarchy.depth, 2);
        assert!(config.hierarchy.exclude_leaves);
        assert!(!config.render.full);
        assert_eq!(config.render.base_path, "/repo");
        assert!(!config.cache_resolved.enabled);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.hierarchy.depth, 999);
        assert!(config.render.full);
        assert!(config.cache_resolved.enabled);
    }

    #[test]
    fn test_load_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("arbor.toml");
        fs::write(&path, "[hierarchy]\ndepth = 4\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.hierarchy.depth, 4);
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
        assert_eq!(
            config.store_resolved.path,
            tmp.path().join("hierarchy.yaml")
        );
        assert_eq!(config.cache_resolved.cache_dir(), tmp.path().join(".arbor/cache"));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing.toml");

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(p) if p == path));
    }

    #[test]
    fn test_load_validates_cli_settings() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("arbor.toml");
        fs::write(&path, "").unwrap();
        let settings = CliSettings {
            base_path: Some("relative".to_owned()),
            ..CliSettings::default()
        };

        let err = Config::load(Some(&path), Some(&settings)).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_discover_from_parent_directory() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(tmp.path().join("arbor.toml"), "").unwrap();

        let found = Config::discover_from(nested).unwrap();

        assert_eq!(found, tmp.path().join("arbor.toml"));
    }
}
