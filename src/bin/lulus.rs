use anyhow::Result;
use lulus::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::start()?.execute().await
}
