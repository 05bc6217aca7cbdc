//! Command line argument parsing for the Agora CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::search::request::EntityScope;

/// Agora - query understanding and multi-entity relevance for marketplace search
#[derive(Parser, Debug, Clone)]
#[command(name = "agora")]
#[command(about = "Query understanding and multi-entity relevance for marketplace search")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Agora Contributors")]
#[command(long_about = None)]
pub struct AgoraArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl AgoraArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run query understanding on a query and show the analysis
    Analyze(AnalyzeArgs),

    /// Search a document catalog
    Search(SearchArgs),

    /// Run the built-in demo queries end to end
    Demo(DemoArgs),
}

/// Arguments for query analysis
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Query string
    #[arg(value_name = "QUERY")]
    pub query: String,
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Path to the catalog file (JSON array of documents)
    #[arg(value_name = "CATALOG_FILE")]
    pub catalog_file: PathBuf,

    /// Query string
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Entity scope to search
    #[arg(short, long, default_value = "product")]
    pub scope: ScopeArg,

    /// Page number (1-based)
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Maximum number of results per page
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Disable query understanding
    #[arg(long)]
    pub no_nlp: bool,

    /// Disable the default boost on value tags
    #[arg(long)]
    pub no_value_boost: bool,

    /// Include highlighted description fragments
    #[arg(long)]
    pub highlight: bool,

    /// Sort clauses as field:asc or field:desc (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub sort: Vec<String>,

    /// Profile file (JSON array of user profiles) for personalization
    #[arg(long, value_name = "PROFILES_FILE")]
    pub profiles: Option<PathBuf>,

    /// Personalize for this user
    #[arg(long, requires = "profiles")]
    pub user_id: Option<String>,

    /// Personalization strength (0.0 disables, 2.0 doubles the effect)
    #[arg(long, default_value = "1.0")]
    pub personalization_strength: f32,
}

/// Arguments for the demo run
#[derive(Parser, Debug, Clone)]
pub struct DemoArgs {
    /// Catalog file to search (defaults to a built-in sample catalog)
    #[arg(short, long, value_name = "CATALOG_FILE")]
    pub catalog_file: Option<PathBuf>,
}

/// Entity scopes selectable from the command line
#[derive(ValueEnum, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeArg {
    /// Search every entity type
    All,
    /// Products only
    Product,
    /// Brands only
    Brand,
    /// Merchants only
    Merchant,
}

impl From<ScopeArg> for EntityScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::All => EntityScope::All,
            ScopeArg::Product => EntityScope::Product,
            ScopeArg::Brand => EntityScope::Brand,
            ScopeArg::Merchant => EntityScope::Merchant,
        }
    }
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
