use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    viking_roleplay::cli::run_cli().await
}
