//! CLI command implementations.

pub(crate) mod browse;
pub(crate) mod children;
pub(crate) mod validity;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arbor_cache::{Cache, FileCache, NullCache};
use arbor_config::{CliSettings, Config};
use arbor_store_yaml::YamlStore;
use arbor_tree::{BrowseOptions, RenderMode, ValidityOptions};
use clap::Args;

use crate::error::CliError;

pub(crate) use browse::BrowseArgs;
pub(crate) use children::ChildrenArgs;
pub(crate) use validity::ValidityArgs;

/// Arguments shared by every command.
#[derive(Args)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover arbor.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hierarchy document (overrides config).
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Maximum tree depth (overrides config).
    #[arg(short, long)]
    depth: Option<u32>,

    /// Disable caching.
    #[arg(long)]
    no_cache: bool,

    /// Enable verbose output (show traversal and cache logs).
    #[arg(short, long)]
    pub verbose: bool,
}

/// Arguments that shape the whole-hierarchy view.
#[derive(Args)]
pub(crate) struct ViewArgs {
    /// Omit leaves from the hierarchy.
    #[arg(long)]
    exclude_leaves: bool,

    /// Render a nested link list.
    #[arg(long, conflicts_with = "full")]
    list: bool,

    /// Render nested reference sets.
    #[arg(long)]
    full: bool,

    /// Base path prepended to list links (overrides config).
    #[arg(long)]
    base_path: Option<String>,
}

impl ViewArgs {
    /// Resolve `full` from --full/--list flags.
    fn resolve_full(&self) -> Option<bool> {
        if self.list {
            Some(false)
        } else {
            self.full.then_some(true)
        }
    }
}

/// Loaded configuration, store and cache for one command run.
pub(crate) struct Context {
    pub config: Config,
    pub store: Arc<YamlStore>,
}

impl Context {
    /// Load configuration and open the hierarchy document.
    pub(crate) fn load(common: &CommonArgs, view: Option<&ViewArgs>) -> Result<Self, CliError> {
        let cli_settings = CliSettings {
            store_path: common.store.clone(),
            depth: common.depth,
            exclude_leaves: view.and_then(|v| v.exclude_leaves.then_some(true)),
            full: view.and_then(ViewArgs::resolve_full),
            base_path: view.and_then(|v| v.base_path.clone()),
            cache_enabled: common.no_cache.then_some(false),
        };
        let config = Config::load(common.config.as_deref(), Some(&cli_settings))?;

        let store = Arc::new(YamlStore::open(&config.store_resolved.path)?);
        tracing::info!(
            path = %config.store_resolved.path.display(),
            units = store.len(),
            "Opened hierarchy"
        );

        Ok(Self { config, store })
    }

    /// Validity settings from the cache section.
    pub(crate) fn validity_options(&self) -> ValidityOptions {
        ValidityOptions {
            count_items: self.config.cache_resolved.item_counts,
            assumed_valid: self.config.cache_resolved.assumed_valid,
        }
    }

    /// Whole-hierarchy view settings.
    pub(crate) fn browse_options(&self) -> BrowseOptions {
        BrowseOptions {
            depth: self.config.hierarchy.depth,
            exclude_leaves: self.config.hierarchy.exclude_leaves,
            mode: RenderMode::from_full(self.config.render.full),
            base_path: self.config.render.base_path.clone(),
            validity: self.validity_options(),
        }
    }

    /// Open the view cache, or a no-op cache when caching is disabled.
    pub(crate) fn cache(&self, version: &str) -> Result<Box<dyn Cache>, CliError> {
        let cache = &self.config.cache_resolved;
        if !cache.enabled {
            return Ok(Box::new(NullCache));
        }
        ensure_project_dir(&cache.project_dir)?;
        Ok(Box::new(FileCache::new(cache.cache_dir(), version)))
    }
}

/// Ensure the `.arbor/` project directory exists with a `.gitignore`.
fn ensure_project_dir(project_dir: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(project_dir)?;

    let gitignore_path = project_dir.join(".gitignore");
    if !gitignore_path.exists() {
        let _ = std::fs::write(&gitignore_path, "# Automatically created by arbor\n*\n");
    }

    Ok(())
}
