//! Serve command: HTTP boundary

use crate::app::ServeArgs;
use anyhow::{Context, Result};
use cinequery_core::{Config, MoviePipeline};
use std::net::SocketAddr;
use std::sync::Arc;

pub async fn run(args: ServeArgs, pipeline: MoviePipeline, config: &Config) -> Result<()> {
    let addr = args.addr.unwrap_or_else(|| config.server.addr.clone());
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("invalid listen address: {}", addr))?;

    cinequery_http::serve(Arc::new(pipeline), addr).await
}
