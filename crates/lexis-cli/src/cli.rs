//! # CLI Structure and Argument Parsing
//!
//! ```bash
//! # Look a word up, populating the local store on first use
//! lexis lookup run --user alice
//!
//! # Machine-readable output
//! lexis lookup run --format json | jq '.entries[0].definition'
//!
//! # Bookmark an entry for a user
//! lexis favorite 42 --user alice
//! ```
//!
//! Global options (`--verbose`, `--db`, `--base-url`) apply to every command
//! and take precedence over the config file and `LEXIS_*` variables.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

/// Main CLI structure for the `lexis` command
#[derive(Parser, Clone, Debug)]
#[command(name = "lexis")]
#[command(version)]
#[command(about = "Cached dictionary lookups with per-user favorites", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Path to the SQLite entry store
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Dictionary site to fetch pages from
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Look up a word, fetching it from the dictionary if not yet stored
    Lookup {
        /// Word to look up
        word: String,

        /// User whose favorites are marked in the output
        #[arg(short, long, default_value = "")]
        user: String,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "pretty")]
        format: OutputFormat,
    },

    /// Bookmark a stored entry for a user
    Favorite {
        /// Id of the stored entry
        entry_id: i64,

        /// User the favorite belongs to
        #[arg(short, long)]
        user: String,
    },
}

impl Cli {
    /// Output format of the selected command, when it has one.
    pub const fn output_format(&self) -> Option<OutputFormat> {
        match &self.command {
            Commands::Lookup { format, .. } => Some(*format),
            Commands::Favorite { .. } => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_lookup_defaults() {
        let cli = Cli::try_parse_from(["lexis", "lookup", "run"]).unwrap();
        match cli.command {
            Commands::Lookup { word, user, format } => {
                assert_eq!(word, "run");
                assert_eq!(user, "");
                assert!(matches!(format, OutputFormat::Pretty));
            },
            Commands::Favorite { .. } => unreachable!("parsed lookup"),
        }
        assert!(!cli.verbose);
        assert!(cli.db.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "lexis",
            "lookup",
            "run",
            "--format",
            "json",
            "--db",
            "/tmp/x.db",
            "--base-url",
            "http://localhost:1234",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:1234"));
        assert!(matches!(cli.output_format(), Some(OutputFormat::Json)));
    }

    #[test]
    fn test_favorite_requires_user() {
        assert!(Cli::try_parse_from(["lexis", "favorite", "3"]).is_err());
        let cli = Cli::try_parse_from(["lexis", "favorite", "3", "--user", "alice"]).unwrap();
        assert!(cli.output_format().is_none());
    }
}
