//! hostfilter CLI — trim inventory exports down to hosts that still need the
//! monitoring agent, and concatenate folders into one Markdown file.

mod commands;
mod prompt;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
