use anyhow::Result;
use clap::Parser;

mod api;
mod cli;
mod deliver;
mod logging;
mod model;
mod months;
mod normalize;
mod report;
mod session;
mod util;

use crate::cli::{Cli, normalize};


fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  logging::init();

  // Phase 1: normalize CLI
  let cfg = normalize(cli)?;
  tracing::debug!(config = %serde_json::to_string(&cfg)?, "effective config");

  // Phase 2: search, render, deliver
  session::run(&cfg)
}
