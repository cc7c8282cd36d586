//! `arbor children` command implementation.

use std::sync::Arc;

use arbor_tree::{GroupChildren, render_cached};
use clap::Args;

use super::{CommonArgs, Context};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the children command.
#[derive(Args)]
pub(crate) struct ChildrenArgs {
    /// Handle of the group.
    handle: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ChildrenArgs {
    /// Execute the children command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the store fails, or if the handle
    /// does not resolve.
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();
        let ctx = Context::load(&self.common, None)?;

        let cache = ctx.cache(version)?;
        let bucket = cache.bucket("children");

        let store = Arc::clone(&ctx.store);
        let counter = Arc::clone(&ctx.store);
        let mut view = GroupChildren::new(
            store,
            self.handle,
            ctx.config.hierarchy.depth,
            ctx.validity_options(),
        )
        .with_counter(counter);

        let rendered = render_cached(&mut view, bucket.as_ref())?;
        if rendered.from_cache {
            output.info("Served from cache");
        }

        match rendered.body {
            Some(references) => output.data(&serde_json::to_string_pretty(&references)?)?,
            None => output.warning(&format!("{} has no children", view.handle())),
        }
        Ok(())
    }
}
