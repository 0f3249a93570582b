mod cli;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use cli::convert::{cmd_convert, ConvertArgs};
use cli::phases::{cmd_phases, PhasesArgs};
use cli::tree::{cmd_tree, TreeArgs};

#[derive(Parser)]
#[command(
    name = "automi",
    version,
    about = "Convert single-instance GAS vertex programs into multi-instance programs"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert vertex program files
    Convert(ConvertArgs),
    /// Print the converted phase bodies of a program
    Phases(PhasesArgs),
    /// Print the annotated tree of one phase as JSON
    Tree(TreeArgs),
}

/// Log to stderr; `RUST_LOG` overrides the default `warn` filter.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Convert(args) => cmd_convert(args),
        Command::Phases(args) => cmd_phases(args),
        Command::Tree(args) => cmd_tree(args),
    }
}
