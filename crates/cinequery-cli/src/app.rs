//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cinequery")]
#[command(
    author,
    version,
    about = "Ask questions about a movie catalog in plain language"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to <config dir>/cinequery/config.yml)
    #[arg(long, global = true, env = "CINEQUERY_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate a question and run the generated query
    Ask(QuestionArgs),

    /// Translate a question and print the generated query only
    Translate(QuestionArgs),

    /// Run a structured query given as JSON (`-` reads stdin)
    Query(QueryArgs),

    /// Keyword search over title, plot, directors and cast
    Search(SearchArgs),

    /// Show one movie by id
    Get(GetArgs),

    /// Import movies from a JSON array or NDJSON file
    Import(ImportArgs),

    /// Show catalog status
    Status,

    /// Start the HTTP server
    Serve(ServeArgs),

    /// Start MCP server
    Mcp,
}

#[derive(Args)]
pub struct QuestionArgs {
    /// Question in natural language
    #[arg(required = true)]
    pub question: Vec<String>,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Query object, e.g. '{"filter": {"year": 1999}, "limit": 5}'
    pub json: String,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Search term
    #[arg(required = true)]
    pub term: Vec<String>,
}

#[derive(Args)]
pub struct GetArgs {
    /// Movie id (plain or ObjectId hex)
    pub id: String,
}

#[derive(Args)]
pub struct ImportArgs {
    /// File to import
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind (overrides config and CINEQUERY_ADDR)
    #[arg(long)]
    pub addr: Option<String>,
}

#[derive(Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Cli,
    Json,
    Csv,
    Md,
}
