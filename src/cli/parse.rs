//! CLI parse: clap types for tagtree. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tagtree CLI - tag images through their file names
#[derive(Parser, Debug)]
#[command(name = "tagtree")]
#[command(about = "Tag images through their file names, with a revertible history for every file and folder")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Folder to track (repeatable). Defaults to `library.roots`, then the current directory.
    #[arg(long = "root", global = true)]
    pub roots: Vec<PathBuf>,

    /// Workspace directory holding `config/`
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log every change at info level
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    pub verbose: bool,

    /// Disable logging
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Scan the roots and summarize what is tracked
    Scan {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Add tags to an image
    Tag {
        /// Image path
        path: PathBuf,
        /// Tags to add
        #[arg(required = true)]
        tags: Vec<String>,
    },
    /// Remove tags from an image
    Untag {
        /// Image path
        path: PathBuf,
        /// Tags to remove
        #[arg(required = true)]
        tags: Vec<String>,
    },
    /// Rename an image (`base - @tag @tag`, no extension) or a folder
    Rename {
        path: PathBuf,
        name: String,
    },
    /// Move an image or folder into another tracked folder
    Move {
        path: PathBuf,
        /// Destination folder
        dir: PathBuf,
    },
    /// Create a folder inside a tracked folder
    Mkdir {
        parent: PathBuf,
        name: String,
    },
    /// List every tag seen
    Tags {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show the history of an image or folder, latest first
    History {
        path: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Revert an image or folder to an earlier snapshot
    Revert {
        path: PathBuf,
        /// 0 is the state before the latest change
        #[arg(long)]
        rank: usize,
    },
    /// Show every image change made in this session
    Log,
    /// Run commands from a file (or stdin), one per line, in one session
    Batch {
        /// Command file; stdin when omitted
        file: Option<PathBuf>,
    },
}

/// One line of a batch file.
#[derive(Parser, Debug)]
#[command(name = "tagtree", no_binary_name = true)]
pub struct BatchLine {
    #[command(subcommand)]
    pub command: Commands,
}
