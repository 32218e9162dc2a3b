//! CLI command definitions for the `ragit` binary.
//!
//! Uses clap derive macros for argument parsing. Every command maps onto one
//! `VectorDbManager` operation.

pub mod collection;
pub mod record;
pub mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use ragit_types::metric::DistanceMetric;

/// Manage text collections in a local vector database.
#[derive(Parser)]
#[command(name = "ragit", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Data directory holding ragit.toml and the vector database.
    #[arg(long, global = true, env = "RAGIT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Export tracing spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a collection from a CSV file with `id` and `text` columns.
    Create {
        /// Path to the CSV file.
        csv: PathBuf,

        /// Name of the new collection.
        collection: String,

        /// Distance metric (l2, cosine, ip). Defaults to the configured metric.
        #[arg(long, short)]
        metric: Option<DistanceMetric>,

        /// Free-form description stored in the collection metadata.
        #[arg(long)]
        description: Option<String>,

        /// Extra metadata entries as KEY=VALUE. Values that parse as JSON are
        /// stored as JSON, anything else as a string.
        #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        meta: Vec<(String, String)>,
    },

    /// Add rows from a CSV file, skipping IDs already in the collection.
    #[command(name = "add-csv")]
    AddCsv {
        /// Path to the CSV file.
        csv: PathBuf,

        /// Target collection.
        collection: String,
    },

    /// Add a single record.
    Add {
        /// Target collection.
        collection: String,

        /// Record ID (must not already exist).
        id: String,

        /// Record text.
        text: String,
    },

    /// Delete a record by ID.
    #[command(alias = "rm")]
    Delete {
        /// Target collection.
        collection: String,

        /// Record ID to delete.
        id: String,
    },

    /// Delete a whole collection.
    Drop {
        /// Collection to delete.
        collection: String,

        /// Confirmation word; only "yes" deletes. Prompts when omitted.
        #[arg(long)]
        confirm: Option<String>,
    },

    /// Show a collection's record count and metadata.
    Info {
        /// Collection to inspect.
        collection: String,
    },

    /// Fetch records by ID.
    #[command(name = "get-ids")]
    GetIds {
        /// Collection to read.
        collection: String,

        /// IDs to fetch.
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Fetch records by exact text.
    #[command(name = "get-texts")]
    GetTexts {
        /// Collection to read.
        collection: String,

        /// Texts to fetch.
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// Find the records nearest to a query text.
    Search {
        /// Collection to search.
        collection: String,

        /// Query text.
        query: String,

        /// Number of results. Defaults to the configured value.
        #[arg(short, long)]
        k: Option<usize>,

        /// Only return records whose text contains this substring.
        #[arg(long)]
        contains: Option<String>,
    },

    /// List all collections.
    #[command(alias = "ls")]
    List,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Parse a `KEY=VALUE` pair.
fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("owner=docs team").unwrap(),
            ("owner".to_string(), "docs team".to_string())
        );
        assert_eq!(
            parse_key_value("expr=a=b").unwrap(),
            ("expr".to_string(), "a=b".to_string())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_parse_create_command() {
        let cli = Cli::try_parse_from([
            "ragit", "create", "faq.csv", "faq", "--metric", "Cosine", "--meta", "version=2",
        ])
        .unwrap();
        match cli.command {
            Commands::Create {
                csv,
                collection,
                metric,
                meta,
                ..
            } => {
                assert_eq!(csv, PathBuf::from("faq.csv"));
                assert_eq!(collection, "faq");
                assert_eq!(metric, Some(DistanceMetric::Cosine));
                assert_eq!(meta, vec![("version".to_string(), "2".to_string())]);
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ragit", "list", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::List));
    }

    #[test]
    fn test_parse_search_defaults() {
        let cli = Cli::try_parse_from(["ragit", "search", "faq", "reset password"]).unwrap();
        match cli.command {
            Commands::Search { k, contains, .. } => {
                assert!(k.is_none());
                assert!(contains.is_none());
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_get_ids_requires_at_least_one_id() {
        assert!(Cli::try_parse_from(["ragit", "get-ids", "faq"]).is_err());
    }
}
