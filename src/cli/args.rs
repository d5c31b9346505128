//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

use crate::application::Binding;

/// Turn plain JSON data into typed shapes at dotted path locations
#[derive(Parser, Debug)]
#[command(name = "jsonmix")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (default: ./.jsonmix.toml if present)
    #[arg(short, long, global = true, env = "JSONMIX_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply shapes to a JSON document
    Apply {
        /// JSON document ('-' reads stdin)
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,

        /// Shape binding, applied in the given order
        #[arg(short = 's', long = "shape", value_name = "NAME=PATH", required = true)]
        bindings: Vec<Binding>,

        /// Write result to file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Do not inject the shape tag into JSON output
        #[arg(long)]
        no_tag: bool,

        /// Single-line JSON output
        #[arg(long)]
        compact: bool,

        /// Fail if a node cannot be mixed or a binding matches nothing
        #[arg(long)]
        strict: bool,
    },

    /// List the locations a path addresses (dry run)
    Locate {
        /// JSON document ('-' reads stdin)
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,

        /// Path expression, e.g. employees.*.address
        path: String,
    },

    /// List configured shapes
    Shapes,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON document
    Json,
    /// Tree view with shape names
    Tree,
}
