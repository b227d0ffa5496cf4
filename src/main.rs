//! podlane CLI
//!
//! Entry point for the `podlane` command-line tool.

use clap::{Parser, Subcommand};
use podlane_lane::config::{RepoConfig, CONFIG_FILE};
use podlane_lane::{run_lane, LaneOptions};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "podlane")]
#[command(about = "Parallel podspec lint lane", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint the requested specs against the release catalog
    Lint {
        /// Root working directory for all lint jobs
        #[arg(long)]
        root: PathBuf,

        /// File listing one spec identifier per line
        #[arg(long)]
        specs: PathBuf,

        /// Directory for per-job logs and the run summary
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Worker bound (default: from config, then CPU count)
        #[arg(long)]
        jobs: Option<usize>,

        /// Linter program override (default: from config, then "pod")
        #[arg(long)]
        tool: Option<String>,

        /// Linter argument placed before the spec file (repeatable)
        #[arg(long = "tool-arg")]
        tool_args: Option<Vec<String>>,
    },

    /// Verify the lane configuration
    Verify {
        /// Root directory containing .podlane.toml
        #[arg(long)]
        root: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Lint {
            root,
            specs,
            log_dir,
            jobs,
            tool,
            tool_args,
        } => {
            let opts = LaneOptions {
                root,
                specs_file: specs,
                log_dir,
                jobs,
                tool,
                tool_args,
            };
            match run_lane(&opts) {
                Ok(code) => process::exit(code),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(2);
                }
            }
        }
        Commands::Verify { root } => run_verify(&root),
    }
}

fn run_verify(root: &std::path::Path) {
    match RepoConfig::from_root(root) {
        Ok(config) => {
            println!("Configuration valid: {}", root.join(CONFIG_FILE).display());
            println!();
            println!("  Packages: {}", config.packages.join(", "));
            if let Some(jobs) = config.jobs {
                println!("  Jobs: {}", jobs);
            }
            let tool = config.lint_tool();
            println!("  Lint tool: {} {}", tool.program(), tool.args().join(" "));
        }
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(2);
        }
    }
}
