//! `arbor browse` command implementation.

use std::sync::Arc;

use arbor_tree::{HierarchyBrowser, render_cached};
use clap::Args;

use super::{CommonArgs, Context, ViewArgs};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the browse command.
#[derive(Args)]
pub(crate) struct BrowseArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    view: ViewArgs,
}

impl BrowseArgs {
    /// Execute the browse command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, the store or rendering fails.
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();
        let ctx = Context::load(&self.common, Some(&self.view))?;

        let cache = ctx.cache(version)?;
        let bucket = cache.bucket("browse");

        let store = Arc::clone(&ctx.store);
        let counter = Arc::clone(&ctx.store);
        let mut browser = HierarchyBrowser::new(store, ctx.browse_options()).with_counter(counter);

        let rendered = render_cached(&mut browser, bucket.as_ref())?;
        if rendered.from_cache {
            output.info("Served from cache");
        }

        output.data(&serde_json::to_string_pretty(&rendered.body)?)?;
        Ok(())
    }
}
