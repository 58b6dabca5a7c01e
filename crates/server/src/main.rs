//! drawgate server binary
//!
//! Reads `.env`, then `server.{toml,yaml,json}` and `DRAWGATE__*` variables.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::load()?;

    server::start_server(config).await?;

    Ok(())
}
