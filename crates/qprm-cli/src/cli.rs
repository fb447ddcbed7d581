use clap::{Args, Parser, Subcommand};
use qprm::core::forcefield::ForceFieldType;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu, William A. Goddard III, Victor Wai Tak Kam",
    version,
    about = "qprm CLI - Converts Amber, FFLD and Q parameter files into a single Q parameter (.prm) file.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read parameter files in order and write them as one Q parameter file.
    Convert(ConvertArgs),
    /// Read parameter files in order and print how many records each table holds.
    Show(ShowArgs),
}

/// Inputs and merge settings shared by every subcommand.
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Path to a job file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Force-field flavour of the parameter set (amber, oplsaa).
    #[arg(short = 't', long, value_name = "TYPE")]
    pub ff_type: Option<ForceFieldType>,

    /// Input file as FORMAT:PATH, or ffld:PATH@STRUCTURE.csv for FFLD files.
    /// Formats: prm, amber-parm, amber-frcmod, ffld. Repeat to read several files in order;
    /// when given, replaces the inputs of the job file.
    #[arg(short, long = "input", value_name = "FORMAT:PATH")]
    pub inputs: Vec<String>,

    /// Let conflicting values from later files win instead of aborting.
    #[arg(long)]
    pub relaxed: bool,

    /// Set an option of the written parameter set, overriding the job file.
    /// Can be used multiple times. Example: -S name=amber14sb
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

/// Arguments for the `convert` subcommand.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Path for the output Q parameter file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `show` subcommand.
#[derive(Args, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Also print the merged parameter set in the Q layout.
    #[arg(long)]
    pub print: bool,
}
