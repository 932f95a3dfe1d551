use crate::cli::actions::{server, Action};
use anyhow::Result;

// Single dispatch point for all CLI actions. New `Action::*` variants get a
// corresponding `*::execute` call here.

/// Run the selected action to completion.
/// # Errors
/// Propagates whatever the action returns.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Server(args) => server::execute(args).await,
    }
}
