use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use iconforge::{Config, FontMode};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::console::{init_logger, print_error, print_report, print_versions};
mod console;

#[derive(Parser)]
#[command(
    name = "iconforge",
    version,
    about = "Build icon fonts and Dart IconData constants from SVG folders"
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Build the font and the Dart source file
    Generate(GenerateArgs),
    /// Check that the external tools for a mode are installed
    Check {
        /// Check the color (nanoemoji) toolchain instead of fantasticon
        #[arg(long)]
        color: bool,
        /// Load tool settings from a JSON config file
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Directory scanned recursively for SVG icons
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Name of the generated Dart class and font family
    #[arg(short, long)]
    class_name: Option<String>,
    /// Flutter package that bundles the font
    #[arg(short, long)]
    package: Option<String>,
    #[arg(long)]
    font_out: Option<PathBuf>,
    #[arg(long)]
    source_out: Option<PathBuf>,
    /// Build a color font with nanoemoji
    #[arg(long)]
    color: bool,
    /// Skip the name to IconData map
    #[arg(long)]
    no_aggregate: bool,
    /// Keep the scratch directory for inspection
    #[arg(long)]
    keep_workspace: bool,
    /// Create the scratch directory here instead of the system temp directory
    #[arg(long)]
    workspace_dir: Option<PathBuf>,
    /// Seconds each external tool may run, 0 for no limit
    #[arg(long)]
    timeout: Option<u64>,
    /// JSON config file; flags given here override its values
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
}

impl GenerateArgs {
    fn into_config(self) -> Result<Config> {
        let mut config = load_config(self.config.as_ref())?;
        if let Some(input) = self.input {
            config.input_dir = input;
        }
        if let Some(class_name) = self.class_name {
            config.class_name = class_name;
        }
        if self.package.is_some() {
            config.package = self.package;
        }
        if let Some(dir) = self.font_out {
            config.font_out_dir = dir;
        }
        if let Some(dir) = self.source_out {
            config.source_out_dir = dir;
        }
        if self.color {
            config.mode = FontMode::Color;
        }
        if self.no_aggregate {
            config.aggregate = false;
        }
        if let Some(secs) = self.timeout {
            config.timeout_secs = secs;
        }
        if self.workspace_dir.is_some() {
            config.workspace_root = self.workspace_dir;
        }
        config.keep_workspace |= self.keep_workspace;
        config.verbose |= self.verbose;
        Ok(config)
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// `verbose` starts as the command line flag and follows the loaded config.
fn run(command: Cmd, verbose: &mut bool) -> Result<()> {
    match command {
        Cmd::Generate(args) => {
            let config = args.into_config()?;
            *verbose = config.verbose;
            init_logger(config.verbose);
            let report = iconforge::generate(&config)?;
            print_report(&report);
        }
        Cmd::Check {
            color,
            config,
            verbose: flag,
        } => {
            let mut config = load_config(config.as_ref())?;
            if color {
                config.mode = FontMode::Color;
            }
            config.verbose |= flag;
            *verbose = config.verbose;
            init_logger(config.verbose);
            let versions = iconforge::check(&config)?;
            print_versions(&versions);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut verbose = match &cli.command {
        Cmd::Generate(args) => args.verbose,
        Cmd::Check { verbose, .. } => *verbose,
    };
    match run(cli.command, &mut verbose) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            print_error(&err, verbose);
            let usage = err
                .downcast_ref::<iconforge::Error>()
                .is_some_and(iconforge::Error::is_usage);
            ExitCode::from(if usage { 2 } else { 1 })
        }
    }
}
