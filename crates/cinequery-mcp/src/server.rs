//! MCP server implementation

use crate::protocol::*;
use crate::resources;
use crate::tools;
use anyhow::Result;
use cinequery_core::MoviePipeline;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

const ASK_PROMPT: &str = "ask";

pub struct McpServer<'a> {
    pipeline: &'a MoviePipeline,
}

impl<'a> McpServer<'a> {
    pub fn new(pipeline: &'a MoviePipeline) -> Self {
        Self { pipeline }
    }

    /// Serve newline-delimited JSON-RPC on stdin/stdout
    pub async fn run(&self) -> Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve until the reader hits EOF
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut reader = BufReader::new(reader);
        let mut writer = BufWriter::new(writer);
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
                Ok(r) => r,
                Err(e) => {
                    let response = JsonRpcResponse::error(
                        None,
                        error_codes::PARSE_ERROR,
                        &format!("Parse error: {}", e),
                    );
                    self.write_response(&mut writer, &response).await?;
                    continue;
                }
            };

            if request.is_notification() {
                tracing::debug!("Notification: {}", request.method);
                continue;
            }

            let response = self.handle_request(&request).await;
            self.write_response(&mut writer, &response).await?;
        }

        Ok(())
    }

    async fn write_response<W: AsyncWrite + Unpin>(
        &self,
        writer: &mut W,
        response: &JsonRpcResponse,
    ) -> Result<()> {
        let json = serde_json::to_string(response)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }

    pub async fn handle_request(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "ping" => JsonRpcResponse::success(request.id.clone(), json!({})),
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,
            "resources/list" => self.handle_resources_list(request),
            "resources/read" => self.handle_resources_read(request).await,
            "prompts/list" => self.handle_prompts_list(request),
            "prompts/get" => self.handle_prompts_get(request),
            _ => JsonRpcResponse::error(
                request.id.clone(),
                error_codes::METHOD_NOT_FOUND,
                &format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {
                "tools": {},
                "resources": { "subscribe": false },
                "prompts": {}
            },
            "serverInfo": {
                "name": "cinequery",
                "version": env!("CARGO_PKG_VERSION")
            }
        });
        JsonRpcResponse::success(request.id.clone(), result)
    }

    fn handle_tools_list(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(
            request.id.clone(),
            json!({ "tools": tools::definitions() }),
        )
    }

    async fn handle_tools_call(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let name = request
            .params
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("");

        let arguments = request
            .params
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| json!({}));

        let pipeline = self.pipeline;
        let result = match name {
            "ask_movies" => tools::handle_ask(pipeline, arguments).await,
            "translate_question" => tools::handle_translate(pipeline, arguments).await,
            "run_query" => tools::handle_query(pipeline, arguments).await,
            "search_movies" => tools::handle_search(pipeline, arguments).await,
            "get_movie" => tools::handle_get(pipeline, arguments).await,
            "status" => tools::handle_status(pipeline).await,
            _ => Err(anyhow::anyhow!("Unknown tool: {}", name)),
        };

        let tool_result = result.unwrap_or_else(|e| {
            tracing::warn!("Tool {} failed: {:#}", name, e);
            ToolResult::error(format!("Error: {:#}", e))
        });
        JsonRpcResponse::success(request.id.clone(), to_value(&tool_result))
    }

    fn handle_resources_list(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(request.id.clone(), json!({ "resources": [] }))
    }

    async fn handle_resources_read(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let Some(uri) = request.params.get("uri").and_then(|v| v.as_str()) else {
            return JsonRpcResponse::error(
                request.id.clone(),
                error_codes::INVALID_PARAMS,
                "Missing uri",
            );
        };

        match resources::read_resource(self.pipeline, uri).await {
            Ok(content) => JsonRpcResponse::success(
                request.id.clone(),
                json!({ "contents": [to_value(&content)] }),
            ),
            Err(e) => JsonRpcResponse::error(
                request.id.clone(),
                error_codes::INVALID_PARAMS,
                &format!("{:#}", e),
            ),
        }
    }

    fn handle_prompts_list(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let prompts = vec![json!({
            "name": ASK_PROMPT,
            "title": "Movie Catalog Questions",
            "description": "Ask about movies by genre, year, rating, cast or director",
            "arguments": [{
                "name": "question",
                "description": "Question about the catalog in plain language",
                "required": true
            }]
        })];
        JsonRpcResponse::success(request.id.clone(), json!({ "prompts": prompts }))
    }

    fn handle_prompts_get(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let name = request.params.get("name").and_then(|v| v.as_str());
        if name != Some(ASK_PROMPT) {
            return JsonRpcResponse::error(
                request.id.clone(),
                error_codes::INVALID_PARAMS,
                &format!("Unknown prompt: {}", name.unwrap_or("")),
            );
        }

        let question = request
            .params
            .get("arguments")
            .and_then(|args| args.get("question"))
            .and_then(|v| v.as_str())
            .map(str::trim)
            .unwrap_or("");
        if question.is_empty() {
            return JsonRpcResponse::error(
                request.id.clone(),
                error_codes::INVALID_PARAMS,
                "Missing argument: question",
            );
        }

        let text = format!(
            "Use the ask_movies tool to answer this question about the movie catalog, \
             then summarize the matching movies: {}",
            question
        );
        JsonRpcResponse::success(
            request.id.clone(),
            json!({
                "description": "Answer a question from the movie catalog",
                "messages": [{
                    "role": "user",
                    "content": { "type": "text", "text": text }
                }]
            }),
        )
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

pub async fn start_server(pipeline: &MoviePipeline) -> Result<()> {
    tracing::info!("Starting MCP server on stdio");
    let server = McpServer::new(pipeline);
    server.run().await
}
