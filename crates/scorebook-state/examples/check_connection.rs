//! Quick remote connection check
//! Run with: cargo run --package scorebook-state --example check_connection

use scorebook_state::{DbConfig, SurrealHandle};

#[tokio::main]
async fn main() {
    // Load from environment
    dotenvy::dotenv().ok();

    println!("Testing SurrealDB connection...");

    match DbConfig::from_env() {
        Ok(config) => {
            println!("  Endpoint: {}", config.endpoint);
            println!("  Namespace: {}", config.namespace);
            println!("  Database: {}", config.database);
            println!("  User: {}", config.username);
            println!("  Is Root: {}", config.is_root);

            match SurrealHandle::setup_remote(config).await {
                Ok(handle) => {
                    println!("\n✓ Connected, schema initialized");
                    match handle.match_list().await {
                        Ok(blobs) => println!("✓ {} stored match(es)", blobs.len()),
                        Err(e) => eprintln!("✗ Listing matches failed: {}", e),
                    }
                }
                Err(e) => {
                    eprintln!("\n✗ Connection failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("✗ Missing environment variables: {}", e);
            std::process::exit(1);
        }
    }
}
