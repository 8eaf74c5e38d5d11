//! franchise-scout CLI entry point
//!
//! Site intelligence for franchise placement - CLI + web API

use franchise_scout::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
