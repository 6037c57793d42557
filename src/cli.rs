//! CLI argument parsing

use clap::Parser;

#[derive(Parser)]
#[command(name = "mtdparts")]
#[command(
    author,
    version,
    about = "Parse and display a Linux kernel / U-Boot compliant mtdparts \
             specification given on standard input",
    long_about = None
)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Display only the MTD partition carrying this name
    #[arg(value_name = "PART_NAME")]
    pub part_name: Option<String>,
}
