use clap::{Args, Parser, Subcommand};
use kekule::engine::config::SaturationStrategy;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "The kekule developers",
    version,
    about = "kekule CLI - assign concrete bond orders to molecular graphs and check atom valences against reference atom types.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decide the orders of ambiguous bonds and write the resulting molecule.
    Assign(AssignArgs),
    /// Report atoms whose valence does not match any reference atom type.
    Check(CheckArgs),
}

/// Arguments for the `assign` subcommand.
#[derive(Args, Debug)]
pub struct AssignArgs {
    /// Path to the input molecule file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output molecule file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Atom-type library (TOML, or CSV by extension). Defaults to the built-in table.
    #[arg(long, value_name = "PATH")]
    pub atom_types: Option<PathBuf>,

    /// Algorithm used to assign bond orders.
    #[arg(
        short,
        long,
        default_value = "decide",
        value_name = "decide|greedy|ring-systems|exhaustive"
    )]
    pub strategy: SaturationStrategy,

    /// Accept a single sweep instead of searching every start index.
    #[arg(long)]
    pub best_effort: bool,

    /// Fail when an element has no atom type while counting implicit hydrogens.
    #[arg(long)]
    pub strict_hydrogens: bool,

    /// Override the maximum number of bonds the exhaustive strategy accepts.
    #[arg(long, value_name = "INT")]
    pub max_backtrack_bonds: Option<usize>,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the molecule file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Atom-type library (TOML, or CSV by extension). Defaults to the built-in table.
    #[arg(long, value_name = "PATH")]
    pub atom_types: Option<PathBuf>,

    /// Fail when an element has no atom type while counting implicit hydrogens.
    #[arg(long)]
    pub strict_hydrogens: bool,
}
