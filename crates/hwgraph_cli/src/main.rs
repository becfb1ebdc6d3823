//! hwgraph CLI, turning synthesized netlists into layout-ready graphs.
//!
//! Provides `hwgraph build` to write the graph JSON of a netlist,
//! `hwgraph expand` to build one more level below a depth-limited instance,
//! and `hwgraph check` to validate a build and print its statistics.

#![warn(missing_docs)]

mod build;
mod check;
mod expand;
mod pipeline;

use std::io::IsTerminal;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use hwgraph_common::SuffixPolicy;
use tracing_subscriber::EnvFilter;

/// hwgraph: hierarchical schematic graphs from netlists.
#[derive(Parser, Debug)]
#[command(name = "hwgraph", version, about = "Netlist to hierarchical schematic graph compiler")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `hwgraph.toml` configuration file or its directory.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the graph of a netlist and write it as JSON.
    Build(BuildArgs),
    /// Build a depth-limited graph, then load the internals of one instance.
    Expand(ExpandArgs),
    /// Build a netlist, validate the graph and print statistics.
    Check(CheckArgs),
}

/// Graph construction flags shared by every subcommand.
///
/// Each flag overrides the matching `[build]` key of `hwgraph.toml`.
#[derive(Args, Debug, Clone, Default)]
pub struct GraphArgs {
    /// Path to the netlist JSON file.
    pub netlist: String,

    /// Deepest hierarchy level to build (the top module is level 1).
    #[arg(short, long)]
    pub depth: Option<u32>,

    /// Suffix comparison used when merging bundled edges.
    #[arg(long, value_name = "POLICY")]
    pub suffix: Option<SuffixPolicy>,

    /// Top module, overriding the one marked in the netlist.
    #[arg(long)]
    pub top: Option<String>,
}

/// Flags controlling where and how the JSON is written.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output file; stdout if omitted.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Write JSON on a single line.
    #[arg(long)]
    pub compact: bool,

    /// Skip the graph invariant checks.
    #[arg(long)]
    pub no_validate: bool,
}

/// Arguments for the `hwgraph build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub graph: GraphArgs,

    #[command(flatten)]
    #[allow(missing_docs)]
    pub output: OutputArgs,
}

/// Arguments for the `hwgraph expand` subcommand.
#[derive(Parser, Debug)]
pub struct ExpandArgs {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub graph: GraphArgs,

    /// Dot-separated instance path starting at the top module (e.g. `soc.u_core`).
    #[arg(short, long)]
    pub path: String,

    #[command(flatten)]
    #[allow(missing_docs)]
    pub output: OutputArgs,
}

/// Arguments for the `hwgraph check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub graph: GraphArgs,

    /// Output format for the statistics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Statistics output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global),
        Command::Expand(ref args) => expand::run(args, &global),
        Command::Check(ref args) => check::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Returns the log filter used when `RUST_LOG` is not set.
fn default_filter(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` takes precedence over the flags.
fn init_logging(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(global)));
    // Fails only if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(global.color)
        .with_target(false)
        .try_init();
}
