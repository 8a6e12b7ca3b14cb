//! Natural language to structured query translation

use super::{ChatMessage, CompletionClient, CompletionOptions, HttpCompletionClient};
use crate::config::LLMServiceConfig;
use crate::error::{Result, TranslationError};
use crate::query::value::type_name;
use crate::query::StructuredQuery;
use serde_json::Value;
use std::sync::Arc;

/// System instruction sent with every translation
pub const SYSTEM_PROMPT: &str = r#"You are a MongoDB query generator.
Convert natural language questions about movies into MongoDB queries.
The movie collection has the following schema:
{
  _id: ObjectId,
  plot: string,
  genres: string[],     // array field, match with $in
  runtime: number,
  cast: string[],       // array field, match with $in
  title: string,
  fullplot: string,
  countries: string[],  // array field, match with $in
  released: Date,
  directors: string[],  // array field, match with $in
  rated: string,
  awards: { wins: number, nominations: number, text: string },
  year: number,
  imdb: { rating: number, votes: number, id: number },
  type: string,
  tomatoes: { viewer: { rating: number, numReviews: number, meter: number } }
}

Important: for array fields (genres, cast, countries, directors) always use the $in operator.
Example: to find horror movies use { "genres": { "$in": ["Horror"] } }

Return only a JSON object with the keys filter, projection, sort, limit and skip.
filter is required and must be an object. Do not wrap the JSON in markdown.
Example response:
{
  "filter": { "genres": { "$in": ["Horror"] } },
  "projection": { "title": 1, "genres": 1, "imdb.rating": 1 },
  "sort": { "imdb.rating": -1 },
  "limit": 10
}"#;

/// Turns user text into a [`StructuredQuery`] with one completion call
pub struct QueryTranslator {
    client: Arc<dyn CompletionClient>,
    options: CompletionOptions,
}

impl QueryTranslator {
    /// Create from a completion client with default sampling options
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            options: CompletionOptions::default(),
        }
    }

    pub fn with_options(client: Arc<dyn CompletionClient>, options: CompletionOptions) -> Self {
        Self { client, options }
    }

    /// Create from configuration
    pub fn from_config(config: LLMServiceConfig) -> Result<Self> {
        let options = CompletionOptions::from(&config);
        let client = HttpCompletionClient::new(config)?;
        Ok(Self::with_options(Arc::new(client), options))
    }

    pub fn client(&self) -> &Arc<dyn CompletionClient> {
        &self.client
    }

    /// Translate one user message.
    ///
    /// The completion must be a bare JSON object; its fields are checked
    /// later by the executor.
    pub async fn translate(&self, text: &str) -> std::result::Result<StructuredQuery, TranslationError> {
        let messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(text)];

        tracing::info!("Translating message with {}", self.client.model_name());
        let completion = self
            .client
            .chat_completion(messages, &self.options)
            .await?
            .filter(|content| !content.trim().is_empty())
            .ok_or(TranslationError::EmptyCompletion)?;

        let query = parse_completion(&completion)?;
        tracing::debug!("Generated query: {}", query);
        Ok(query)
    }
}

/// Parse completion text as a query object, without any recovery
pub fn parse_completion(text: &str) -> std::result::Result<StructuredQuery, TranslationError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => Ok(StructuredQuery::from_object(object)),
        Ok(other) => Err(TranslationError::NotAnObject(type_name(&other))),
        Err(e) => {
            tracing::warn!("Completion is not valid JSON: {}", text);
            Err(TranslationError::MalformedJson(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct CannedClient {
        reply: Option<String>,
        seen: Mutex<Vec<ChatMessage>>,
    }

    #[async_trait]
    impl CompletionClient for CannedClient {
        async fn chat_completion(
            &self,
            messages: Vec<ChatMessage>,
            _options: &CompletionOptions,
        ) -> std::result::Result<Option<String>, TranslationError> {
            self.seen.lock().extend(messages);
            Ok(self.reply.clone())
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    fn translator(reply: Option<&str>) -> (QueryTranslator, Arc<CannedClient>) {
        let client = Arc::new(CannedClient {
            reply: reply.map(str::to_string),
            seen: Mutex::new(Vec::new()),
        });
        (QueryTranslator::new(client.clone()), client)
    }

    #[tokio::test]
    async fn test_translate_returns_object_unvalidated() {
        let (translator, client) = translator(Some(r#"{"limit": 3}"#));
        let query = translator.translate("three movies").await.unwrap();
        assert_eq!(query.to_json_string(), r#"{"limit":3}"#);

        let seen = client.seen.lock();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].content.contains("$in"));
        assert_eq!(seen[1], ChatMessage::user("three movies"));
    }

    #[tokio::test]
    async fn test_missing_or_blank_completion() {
        for reply in [None, Some("   ")] {
            let (translator, _) = translator(reply);
            assert!(matches!(
                translator.translate("x").await,
                Err(TranslationError::EmptyCompletion)
            ));
        }
    }

    #[tokio::test]
    async fn test_fenced_json_is_not_recovered() {
        let (translator, _) = translator(Some("```json\n{\"filter\": {}}\n```"));
        assert!(matches!(
            translator.translate("x").await,
            Err(TranslationError::MalformedJson(_))
        ));
    }

    #[test]
    fn test_parse_completion_requires_object() {
        assert!(matches!(
            parse_completion("[1, 2]"),
            Err(TranslationError::NotAnObject("array"))
        ));
        assert!(parse_completion(r#"{"filter": {"year": 1999}}"#).is_ok());
    }
}
