use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "allure-steps",
    version,
    about = "Group business steps in Allure results",
    long_about = "Groups the steps of every Allure result file under their '* business step' markers, derives each group's status and timing, attaches a Mermaid flow of the groups, and writes a summary of the results directory."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Only print totals
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Group steps under business step markers and rewrite each result file
    Prepare {
        /// Path to the allure-results directory
        results_dir: PathBuf,

        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Attach a Mermaid HTML flow of the business steps to each result file
    Attach {
        /// Path to the allure-results directory
        results_dir: PathBuf,

        /// Report what would be attached without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Summarize all result files into a single JSON file
    Summarize {
        /// Path to the allure-results directory
        results_dir: PathBuf,

        /// Output filename (placed in the results directory)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Prepare, attach and summarize in one pass
    Run {
        /// Path to the allure-results directory
        results_dir: PathBuf,

        /// Summary filename (placed in the results directory)
        #[arg(short, long)]
        output: Option<String>,

        /// Skip the diagram attachment
        #[arg(long)]
        no_diagram: bool,
    },

    /// Show or create the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
