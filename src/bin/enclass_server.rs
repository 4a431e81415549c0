use clap::Parser;
use std::path::PathBuf;

use enclass::api::{self, types::DEFAULT_HOST, ServerConfig};
use enclass::logging;

/// Serve the document root and the small editing API used by admin pages.
#[derive(Parser)]
#[command(name = "enclass-server", version, about)]
struct Cli {
    /// Document root served statically and edited through /api.
    #[arg(long, env = "ENCLASS_DOCS", default_value = "docs")]
    docs: PathBuf,

    #[arg(long, env = "ENCLASS_HOST", default_value = DEFAULT_HOST)]
    host: String,

    #[arg(long, env = "ENCLASS_PORT", default_value_t = api::types::DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging("enclass-server", "info,tower_http=debug");

    api::serve(ServerConfig {
        docs: cli.docs,
        host: cli.host,
        port: cli.port,
    })
    .await
}
