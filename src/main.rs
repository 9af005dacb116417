use anyhow::Result;
use pushbridge::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
