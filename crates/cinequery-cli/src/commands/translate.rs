//! Translate command: show the generated query without running it

use super::joined;
use crate::app::QuestionArgs;
use anyhow::Result;
use cinequery_core::{CineQueryError, QueryTranslator, TranslationRequest};

/// Needs only the completion service; the catalog is never opened
pub async fn run(args: QuestionArgs, translator: &QueryTranslator) -> Result<()> {
    let request = TranslationRequest::new(joined(&args.question))?;
    let query = translator
        .translate(request.as_str())
        .await
        .map_err(CineQueryError::from)?;
    println!("{}", serde_json::to_string_pretty(&query)?);
    Ok(())
}
