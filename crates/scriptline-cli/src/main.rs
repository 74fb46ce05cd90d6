// this_file: crates/scriptline-cli/src/main.rs

//! scriptline CLI: itemize, measure, elide and justify text from the
//! command line.

mod cli;
mod commands;
mod font;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let font = font::load(&cli.font)?;
    let direction = cli.font.direction;
    let json = cli.json;

    match cli.command {
        Commands::Itemize { text } => {
            let engine = font::session(&text, font, direction);
            commands::emit(&commands::itemize::run(engine), json)
        },
        Commands::Measure { text, from, len } => {
            let engine = font::session(&text, font, direction);
            commands::emit(&commands::measure::run(engine, from, len)?, json)
        },
        Commands::Elide {
            text,
            width,
            mode,
            mnemonic,
        } => {
            let engine = font::session(&text, font, direction);
            commands::emit(&commands::elide::run(engine, width, mode, mnemonic)?, json)
        },
        Commands::Justify {
            text,
            width,
            align,
            force,
        } => {
            let engine = font::session(&text, font, direction);
            commands::emit(&commands::justify::run(engine, width, align, force)?, json)
        },
        Commands::Cursor { text, pos } => {
            let engine = font::session(&text, font, direction);
            commands::emit(&commands::cursor::run(engine, pos)?, json)
        },
    }
}

/// Initialize logging based on verbosity flag.
fn init_logger(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env().filter_level(level).init();
}
