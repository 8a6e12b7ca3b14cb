//! Ask command: translate a question and run the generated query

use super::joined;
use crate::app::{OutputFormat, QuestionArgs};
use crate::output::{format_answer, FormatOptions};
use anyhow::Result;
use cinequery_core::{MoviePipeline, TranslationRequest};

pub async fn run(
    args: QuestionArgs,
    pipeline: &MoviePipeline,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let request = TranslationRequest::new(joined(&args.question))?;
    let answer = pipeline.translate_and_execute(&request).await?;

    let options = FormatOptions { full: verbose };
    print!(
        "{}",
        format_answer(&answer.query, &answer.result, format, &options)?
    );
    Ok(())
}
