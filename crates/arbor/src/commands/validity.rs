//! `arbor validity` command implementation.

use std::sync::Arc;

use arbor_tree::{GroupChildren, HierarchyBrowser, Validity};
use clap::Args;

use super::{CommonArgs, Context, ViewArgs};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the validity command.
#[derive(Args)]
pub(crate) struct ValidityArgs {
    /// Show the children view of this group instead of the whole hierarchy.
    #[arg(long)]
    children: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    view: ViewArgs,
}

impl ValidityArgs {
    /// Execute the validity command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the store fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let ctx = Context::load(&self.common, Some(&self.view))?;

        let store = Arc::clone(&ctx.store);
        let counter = Arc::clone(&ctx.store);
        let (key, validity) = if let Some(handle) = self.children {
            let mut view = GroupChildren::new(
                store,
                handle,
                ctx.config.hierarchy.depth,
                ctx.validity_options(),
            )
            .with_counter(counter);
            (view.key(), view.validity())
        } else {
            let mut view =
                HierarchyBrowser::new(store, ctx.browse_options()).with_counter(counter);
            (view.key(), view.validity())
        };

        output.highlight(&format!("key: {key}"));
        output.data(&describe(&validity))?;
        Ok(())
    }
}

/// Human-readable summary of a view's validity.
fn describe(validity: &Validity) -> String {
    match validity {
        Validity::Cacheable(descriptor) => {
            let assumed_valid = descriptor
                .assumed_valid()
                .map_or_else(|| "none".to_owned(), |d| format!("{}s", d.as_secs()));
            format!(
                "etag: {}\ntokens: {}\nomitted metrics: {}\nassumed valid: {assumed_valid}",
                descriptor.etag(),
                descriptor.tokens().len(),
                descriptor.omitted_metrics(),
            )
        }
        Validity::Uncacheable { reason } => format!("uncacheable: {reason}"),
    }
}
