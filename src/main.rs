//! mtdparts - parse and display MTD partition layouts
//!
//! Reads a Linux kernel / U-Boot compliant mtdparts specification from
//! standard input, validates it into an in-memory partition table, and
//! prints the resulting partitions, either all of them or the single one
//! named on the command line. The first malformed definition aborts the
//! run with a one-line diagnostic and a non-zero exit code.

mod cli;

use std::io::{self, BufRead};

use clap::Parser;
use mtdparts_core::{MtdPartsParser, ParseError, PartitionRenderer, PartitionTable};

use cli::Cli;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    if let Err(e) = run(&cli) {
        eprintln!("mtdparts: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let table = read_table(io::stdin().lock())?;

    let renderer = PartitionRenderer::new(&table);
    let output = match &cli.part_name {
        Some(name) => renderer.render_one(name)?,
        None => renderer.render_all(),
    };
    print!("{}", output);
    Ok(())
}

/// Parse every non-blank input line into one accumulated table
fn read_table(input: impl BufRead) -> Result<PartitionTable, Box<dyn std::error::Error>> {
    let mut table = PartitionTable::new();
    let mut parser = MtdPartsParser::new(&mut table);
    let mut seen = false;

    for line in input.lines() {
        let line = line?;
        let spec = line.trim();
        if spec.is_empty() {
            continue;
        }
        parser.parse(spec)?;
        seen = true;
    }
    if !seen {
        return Err(ParseError::EmptyInput.into());
    }

    log::debug!("parsed {} device(s)", table.devices().len());
    Ok(table)
}
