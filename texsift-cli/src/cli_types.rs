//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "texsift")]
#[command(about = "Extract GameCube/Wii textures from game archives", long_about = None)]
pub(crate) struct Cli {
    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write console output to a file (ANSI codes stripped)
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments for the extract command.
#[derive(Args, Clone)]
pub(crate) struct ExtractArgs {
    /// File or directory to scan
    pub input: PathBuf,

    /// Output directory (default: the saved setting, else the input path with '~' appended)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Worker threads for top-level files (default: the saved setting, else the CPU count)
    #[arg(long)]
    pub tasks: Option<usize>,

    /// Maximum container recursion depth, 0 scans all the way down
    #[arg(long, default_value = "0")]
    pub depth: u32,

    /// Probe unidentified payloads hard: decompression attempts, signature
    /// cutting and texture-header sweeps. May produce garbage output
    #[arg(long)]
    pub force: bool,

    /// Run the whole pipeline without writing any file
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Also save the undecoded payload of every recognized texture under ~Raw
    #[arg(long)]
    pub raw: bool,

    /// Dump downscaled mip levels alongside the base image
    #[arg(long)]
    pub mips: bool,

    /// Disable hand-authored mip chain detection
    #[arg(long)]
    pub no_arb_detect: bool,

    /// Directory for the run log (default: the output directory)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Scan a file or directory and extract textures
    Extract {
        #[command(flatten)]
        args: ExtractArgs,
    },

    /// List every format the scanner recognizes
    Formats,

    /// Manage saved scan defaults
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the saved defaults and the settings file path
    Show,

    /// Set the default output directory
    SetOutput {
        /// Directory future scans save into
        dir: PathBuf,
    },

    /// Set the default worker count
    SetTasks {
        /// Worker threads for top-level files
        tasks: usize,
    },

    /// Clear all saved defaults
    Clear,

    /// Print the settings file path
    Path,
}
