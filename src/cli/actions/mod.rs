pub mod server;

// Interpreter for `Action`, kept separate so this module stays declarative.
mod run;

#[derive(Debug)]
pub enum Action {
    Server(server::Args),
}

impl Action {
    /// Run this action until it finishes or fails.
    /// # Errors
    /// Propagates the underlying action error.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
