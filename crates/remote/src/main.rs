// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! gn-remote: WebSocket document store for ganache development.
//!
//! Serves the sync protocol against an in-memory document map: anonymous
//! sign-in, per-document CRUD, and owner-scoped ordered queries. Meant for
//! development and end-to-end testing, not production.

mod server;
#[cfg(test)]
mod server_tests;
mod state;

use clap::Parser;
use std::net::SocketAddr;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// gn-remote: development document-store server
#[derive(Parser, Debug)]
#[command(name = "gn-remote")]
#[command(about = "WebSocket document store for ganache development")]
struct Args {
    /// Address to bind the server to
    #[arg(short, long, default_value = "0.0.0.0:7891")]
    bind: SocketAddr,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting gn-remote server");
    info!("  Bind address: {}", args.bind);

    let state = state::ServerState::new();
    server::run(args.bind, state).await?;

    Ok(())
}
