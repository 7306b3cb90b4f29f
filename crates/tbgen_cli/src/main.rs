//! The tbgen command line: generates UVM testbench scaffolding from a configuration document.
//!
//! Provides `tbgen init` to write a starter configuration for a protocol and
//! `tbgen generate` to validate a configuration and render the testbench.

#![warn(missing_docs)]

mod generate;
mod init;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// tbgen, a UVM testbench generator.
#[derive(Parser, Debug)]
#[command(name = "tbgen", version, about = "UVM Testbench Generator")]
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

    /// Output format for diagnostics.
    #[arg(long, global = true, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Directory holding the installed template set.
    #[arg(long, global = true, default_value = "templates")]
    pub templates: PathBuf,

    /// Protocol signal catalog (defaults to `<templates>/protocol_signals.yaml`).
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a starter configuration document for a protocol.
    Init(InitArgs),
    /// Validate a configuration and generate the testbench.
    Generate(GenerateArgs),
}

/// Arguments for the `tbgen init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Protocol of the starter interface (`apb`, `axi`, `ahb`).
    pub protocol: String,

    /// Where to write the configuration document.
    #[arg(short, long, default_value = "config.yaml")]
    pub output: PathBuf,

    /// Overwrite the output file if it already exists.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `tbgen generate` subcommand.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Configuration document (`.yaml`, `.yml`, or `.toml`).
    #[arg(short, long, default_value = "config.yaml")]
    pub config: PathBuf,
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

/// Diagnostic output format.
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
    /// Diagnostic output format.
    pub format: ReportFormat,
    /// Template set root.
    pub templates: PathBuf,
    /// Protocol signal catalog path.
    pub catalog: PathBuf,
}

impl GlobalArgs {
    fn from_cli(cli: &Cli) -> Self {
        let color = match cli.color {
            ColorChoice::Auto => std::io::stderr().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };
        let catalog = cli
            .catalog
            .clone()
            .unwrap_or_else(|| cli.templates.join("protocol_signals.yaml"));

        GlobalArgs {
            quiet: cli.quiet,
            verbose: cli.verbose,
            color,
            format: cli.format,
            templates: cli.templates.clone(),
            catalog,
        }
    }

    fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else if self.quiet {
            log::LevelFilter::Error
        } else {
            log::LevelFilter::Info
        }
    }
}

fn init_logging(global: &GlobalArgs) {
    let style = if global.color {
        env_logger::WriteStyle::Always
    } else {
        env_logger::WriteStyle::Never
    };
    env_logger::Builder::new()
        .format_timestamp(None)
        .filter_level(global.log_level())
        .write_style(style)
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let global = GlobalArgs::from_cli(&cli);
    init_logging(&global);

    let result = match cli.command {
        Command::Init(ref args) => init::run(args, &global),
        Command::Generate(ref args) => generate::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
