//! trustsyncd - trust bundle synchronization daemon.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    trustsync_cli::run().await
}
