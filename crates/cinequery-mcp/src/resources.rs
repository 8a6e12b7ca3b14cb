//! MCP resource handlers

use crate::protocol::ResourceContent;
use anyhow::Result;
use cinequery_core::MoviePipeline;

/// URI scheme prefix for movie resources
pub const MOVIE_URI_PREFIX: &str = "cinequery://movie/";

pub fn movie_uri(id: &str) -> String {
    format!("{}{}", MOVIE_URI_PREFIX, id)
}

/// Read a movie resource by URI
pub async fn read_resource(pipeline: &MoviePipeline, uri: &str) -> Result<ResourceContent> {
    let id = uri
        .strip_prefix(MOVIE_URI_PREFIX)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Invalid URI: {}", uri))?;

    let movie = pipeline.get_movie(id).await?;

    Ok(ResourceContent {
        uri: uri.to_string(),
        name: movie.display_title().to_string(),
        title: movie.year.map(|y| format!("{} ({})", movie.display_title(), y)),
        mime_type: "application/json".to_string(),
        text: serde_json::to_string_pretty(&movie)?,
    })
}
