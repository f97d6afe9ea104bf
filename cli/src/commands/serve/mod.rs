//! # HTTP Transport
//!
//! File: cli/src/commands/serve/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `makan serve` exposes the bot to any chat platform that can forward
//! messages over HTTP, and serves the generated site next to it.
//!
//! - `POST /messages` takes one `Incoming` message as JSON and answers with
//!   the replies to post: `{"replies": [{"channel": "...", "content": "..."}]}`.
//! - `GET /health` reports liveness and a few counters.
//! - Anything else is looked up in the site directory (`index.html`,
//!   `images/...`).
//!
//! A background sweep drops timed-out sessions once per second. Their notices
//! are queued per channel and returned with the next response for that
//! channel.
//!
//! ```bash
//! makan serve --port 9000
//! curl -s localhost:9000/messages -H 'content-type: application/json' \
//!   -d '{"author":{"id":"42","name":"aisyah"},"channel":"food","content":"!help"}'
//! ```
//!
use super::build_bot;
use crate::core::config::Config;
use crate::core::error::Result;
use clap::Args;
use std::net::IpAddr;
use tracing::info;

/// Router, handlers and the server loop.
pub mod server_logic;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Interface to bind (defaults to `server.host`)
    #[arg(long)]
    pub host: Option<IpAddr>,
    /// Port to bind; the next free port is used if taken (defaults to `server.port`)
    #[arg(short, long)]
    pub port: Option<u16>,
}

pub async fn handle_serve(args: ServeArgs, mut config: Config) -> Result<()> {
    info!("Handling serve command with args: {:?}", args);
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    let server = config.server.clone();
    let site_dir = config.site.directory_path(&config.storage);

    let bot = build_bot(config)?;
    server_logic::run_server(bot, server, site_dir).await
}
