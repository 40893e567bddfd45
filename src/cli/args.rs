//! Command line argument parsing for the papersift CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::PaperSiftConfig;

/// papersift - keyword search over a directory of academic papers
#[derive(Parser, Debug, Clone)]
#[command(name = "papersift")]
#[command(about = "Index plain-text papers and search their titles and abstracts")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct PaperSiftArgs {
    /// Verbosity level (repeat for more: -v warnings, -vv info, -vvv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl PaperSiftArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build the index from a directory of .txt papers
    Index(IndexArgs),

    /// Search the index, interactively when no query is given
    Search(SearchArgs),

    /// Show index statistics
    Stats(StatsArgs),
}

/// Arguments for building an index
#[derive(Parser, Debug, Clone)]
pub struct IndexArgs {
    /// Directory containing the .txt papers
    #[arg(short, long, value_name = "DIR", env = "PAPERSIFT_SOURCE")]
    pub source: Option<PathBuf>,

    /// Directory to write the index to
    #[arg(short, long, value_name = "DIR", env = "PAPERSIFT_INDEX")]
    pub index: Option<PathBuf>,
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Index directory
    #[arg(short, long, value_name = "DIR", env = "PAPERSIFT_INDEX")]
    pub index: Option<PathBuf>,

    /// Maximum number of results per query
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Queries such as 'title:neural,abstract:"graph networks"'
    #[arg(value_name = "QUERY")]
    pub queries: Vec<String>,
}

/// Arguments for index statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Index directory
    #[arg(short, long, value_name = "DIR", env = "PAPERSIFT_INDEX")]
    pub index: Option<PathBuf>,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

impl Command {
    /// Apply this command's flags on top of `config`.
    pub fn apply_overrides(&self, config: &mut PaperSiftConfig) {
        let index = match self {
            Command::Index(args) => {
                if let Some(source) = &args.source {
                    config.source_dir = source.clone();
                }
                &args.index
            }
            Command::Search(args) => {
                if let Some(limit) = args.limit {
                    config.top_k = limit;
                }
                &args.index
            }
            Command::Stats(args) => &args.index,
        };
        if let Some(index) = index {
            config.index_path = index.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_search_command() {
        let args = PaperSiftArgs::try_parse_from([
            "papersift",
            "search",
            "--index",
            "/tmp/idx",
            "--limit",
            "3",
            "title:neural",
            "abstract:\"graph networks\"",
        ])
        .unwrap();

        if let Command::Search(search_args) = args.command {
            assert_eq!(search_args.index, Some(PathBuf::from("/tmp/idx")));
            assert_eq!(search_args.limit, Some(3));
            assert_eq!(
                search_args.queries,
                vec!["title:neural", "abstract:\"graph networks\""]
            );
        } else {
            panic!("Expected Search command");
        }
    }

    #[test]
    fn test_flags_override_config() {
        let file_config = PaperSiftConfig {
            top_k: 7,
            ..PaperSiftConfig::default()
        };

        let args = PaperSiftArgs::try_parse_from(["papersift", "search"]).unwrap();
        let mut config = file_config.clone();
        args.command.apply_overrides(&mut config);
        assert_eq!(config.top_k, 7);

        let args =
            PaperSiftArgs::try_parse_from(["papersift", "search", "-l", "2", "-i", "idx"]).unwrap();
        let mut config = file_config.clone();
        args.command.apply_overrides(&mut config);
        assert_eq!(config.top_k, 2);
        assert_eq!(config.index_path, PathBuf::from("idx"));

        let args =
            PaperSiftArgs::try_parse_from(["papersift", "index", "--source", "papers"]).unwrap();
        let mut config = file_config;
        args.command.apply_overrides(&mut config);
        assert_eq!(config.source_dir, PathBuf::from("papers"));
        assert_eq!(config.top_k, 7);
    }

    #[test]
    fn test_zero_limit_fails_validation() {
        let args = PaperSiftArgs::try_parse_from(["papersift", "search", "--limit", "0"]).unwrap();
        let mut config = PaperSiftConfig::default();
        args.command.apply_overrides(&mut config);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_global_flags() {
        let args =
            PaperSiftArgs::try_parse_from(["papersift", "stats", "-vv", "--format", "json"])
                .unwrap();
        assert_eq!(args.verbosity(), 2);
        assert_eq!(args.output_format, OutputFormat::Json);

        let args = PaperSiftArgs::try_parse_from(["papersift", "-q", "-vvv", "stats"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }
}
