//! Cinequery CLI
//!
//! Ask questions about your movie catalog in plain language.

use anyhow::Result;
use cinequery_core::error::exit_codes;
use cinequery_core::{
    CineQueryError, Config, MoviePipeline, QueryExecutor, QueryTranslator, SqliteStore,
};
use clap::Parser;
use std::sync::Arc;

mod app;
mod commands;
mod output;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // serve logs requests at info; everything else stays quiet
    let level = match cli.command {
        Commands::Serve(_) => tracing::Level::INFO,
        _ if cli.verbose => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {:#}", err);
        let code = err
            .downcast_ref::<CineQueryError>()
            .map(CineQueryError::exit_code)
            .unwrap_or(exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Only commands that read the catalog open it
    let open_store = || -> Result<Arc<SqliteStore>> {
        Ok(Arc::new(SqliteStore::open(&config.database.path)?))
    };
    let executor = || -> Result<QueryExecutor> { Ok(QueryExecutor::new(open_store()?)) };

    match cli.command {
        Commands::Ask(args) => {
            let pipeline = MoviePipeline::from_config(&config)?;
            commands::ask::run(args, &pipeline, cli.format, cli.verbose).await
        }
        Commands::Translate(args) => {
            let translator = QueryTranslator::from_config(config.llm_service.clone())?;
            commands::translate::run(args, &translator).await
        }
        Commands::Query(args) => commands::query::run(args, &executor()?, cli.format, cli.verbose).await,
        Commands::Search(args) => commands::search::run(args, &executor()?, cli.format, cli.verbose).await,
        Commands::Get(args) => commands::get::run(args, &executor()?, cli.format).await,
        Commands::Import(args) => commands::import::run(args, &*open_store()?, cli.format).await,
        Commands::Status => commands::status::run(&*open_store()?, &config, cli.format).await,
        Commands::Serve(args) => {
            commands::serve::run(args, MoviePipeline::from_config(&config)?, &config).await
        }
        Commands::Mcp => cinequery_mcp::start_server(&MoviePipeline::from_config(&config)?).await,
    }
}
