use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "plugin-catalog")]
#[command(about = "Keeps the IDE plugin catalog in sync with the marketplace and nixpkgs")]
#[command(version)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Repository root containing data/ and flake.lock (default: current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

const UPDATE_PLUGINS_HELP: &str = "\
To update all plugins, run with no args.
The id of a plugin is the number before the name in the address of its
marketplace page.";

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve download URLs and hashes for every plugin in data/plugins.json
    #[command(after_help = UPDATE_PLUGINS_HELP)]
    UpdatePlugins {
        /// Don't use previously collected hashes, redownload all
        #[arg(short, long)]
        refetch_all: bool,

        /// Also resolve plugin versions for this build (repeatable)
        #[arg(short, long = "with-build", value_name = "BUILD")]
        with_build: Vec<String>,
    },

    /// Merge IDE build numbers from the pinned nixpkgs revisions into data/ide-version.json
    UpdateIdes,

    /// Add plugins to data/plugins.json by marketplace id
    Add {
        /// Marketplace plugin ids
        #[arg(required = true)]
        ids: Vec<u64>,

        /// Release channel to track (default: stable)
        #[arg(long)]
        channel: Option<String>,
    },

    /// Print the newer of two version strings
    Newest {
        /// First version
        a: String,

        /// Second version
        b: String,
    },

    /// Check whether a build lies inside a compatibility window
    Compat {
        /// IDE build number (e.g., 241.14494.240)
        build: String,

        /// Lower bound, exclusive (e.g., 233.0)
        #[arg(long)]
        since: Option<String>,

        /// Upper bound, exclusive (e.g., 241.*)
        #[arg(long)]
        until: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g., update.concurrency)
        key: String,
    },

    /// Set a config value
    Set {
        /// Config key (e.g., nixpkgs.inputs)
        key: String,

        /// Value to set (e.g., "nixpkgs,nixos-master" or "[nixpkgs, nixos-master]")
        value: String,
    },

    /// List all config values
    List,

    /// Show config file path
    Path,

    /// Initialize config file with defaults
    Init,
}
