//! # Page Command
//!
//! File: cli/src/commands/page.rs
//! Author: Christi Mahu
//!
//! `makan page` regenerates the recommendations page once, exactly like the
//! `viewweb` chat command, for use from cron or CI.
//!
use super::build_bot;
use crate::bot::web::regenerate_page;
use crate::core::config::Config;
use crate::core::error::Result;
use clap::Args;
use tracing::info;

#[derive(Args, Debug)]
pub struct PageArgs {
    /// Commit and push the site directory afterwards, overriding `site.push_to_git`
    #[arg(long)]
    pub push: bool,
}

pub async fn handle_page(args: PageArgs, mut config: Config) -> Result<()> {
    info!("Handling page command with args: {:?}", args);
    if args.push {
        config.site.push_to_git = true;
    }
    let bot = build_bot(config)?;
    let index = regenerate_page(bot.context()).await?;
    println!("✅ Page written to {}", index.display());
    Ok(())
}
