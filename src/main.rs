pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod publish;
pub mod storage;

use clap::Parser;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();
    if let Err(e) = cli::run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
