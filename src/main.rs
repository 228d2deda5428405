//! plinthd — serves the unified demo application.
//!
//! ```text
//! RUST_LOG=info plinthd --addr 0.0.0.0:8000 --data-dir ./data
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use plinth::app::{self, AppState};
use plinth::config::Config;
use plinth::Server;

#[derive(Parser, Debug)]
#[command(name = "plinthd", about = "A persistence-and-auth substrate demo service")]
struct Args {
    /// host:port to bind
    #[arg(long, default_value = "0.0.0.0:8000")]
    addr: String,

    /// Directory for the file-backed collections
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Bearer-token lifetime in seconds
    #[arg(long, default_value_t = 3600)]
    token_lifetime_secs: u64,

    /// Base URL prefixed to generated short links
    #[arg(long, default_value = "http://localhost:8000")]
    public_base_url: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = Config::from_env();
    config.addr = args.addr;
    config.data_dir = args.data_dir;
    config.token_lifetime = std::time::Duration::from_secs(args.token_lifetime_secs);
    config.public_base_url = args.public_base_url;

    let state = match AppState::new(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("failed to open collections: {e}");
            std::process::exit(1);
        }
    };

    let router = app::router(&state);
    if let Err(e) = Server::bind(&config.addr).serve(router).await {
        eprintln!("server error: {e}");
        std::process::exit(1);
    }
}
