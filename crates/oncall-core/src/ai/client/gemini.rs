//! Gemini `generateContent` transport
//!
//! Converts the neutral conversation into Gemini `contents`, declares either
//! function tools or a JSON response schema, and maps the first candidate
//! back into an [`OracleReply`].

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::config::{AiClientConfig, CallOptions, OutputContract};
use crate::ai::oracle::{Oracle, OracleError, OracleReply};
use crate::ai::types::{AiToolCall, Content, ModelMessage, Role};

/// HTTP client for the Gemini REST API
pub struct GeminiClient {
    http: reqwest::Client,
    config: AiClientConfig,
}

impl GeminiClient {
    pub fn new(config: AiClientConfig) -> Result<Self, OracleError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    /// Build a client from an API key held in an environment variable
    pub fn from_env(api_key_env: &str, base_url: &str) -> Result<Self, OracleError> {
        let api_key = std::env::var(api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| OracleError::MissingApiKey(api_key_env.to_string()))?;
        Self::new(AiClientConfig::new(api_key).with_base_url(base_url))
    }
}

#[async_trait]
impl Oracle for GeminiClient {
    async fn generate(
        &self,
        conversation: &[ModelMessage],
        options: &CallOptions,
    ) -> Result<OracleReply, OracleError> {
        let url = self.config.generate_url(&options.profile.model);
        let body = build_request_body(conversation, options);
        debug!(
            model = %options.profile.model,
            turns = conversation.len(),
            "Gemini generateContent"
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let json: Value = response.json().await?;
        parse_response(&json)
    }
}

/// Convert messages into Gemini `contents`
fn convert_messages(messages: &[ModelMessage]) -> Vec<Value> {
    messages
        .iter()
        .map(|msg| {
            let role = match msg.role {
                Role::User => "user",
                Role::Assistant => "model",
            };
            let parts: Vec<Value> = msg.content.iter().map(convert_content).collect();
            json!({ "role": role, "parts": parts })
        })
        .collect()
}

fn convert_content(content: &Content) -> Value {
    match content {
        Content::Text { text } => json!({ "text": text }),
        Content::ToolUse {
            name,
            input,
            signature,
            ..
        } => {
            let mut part = json!({ "functionCall": { "name": name, "args": input } });
            if let Some(sig) = signature {
                part["thoughtSignature"] = Value::String(sig.clone());
            }
            part
        }
        Content::ToolResult { name, output, .. } => {
            // functionResponse.response must be an object
            let response = match output {
                Value::Object(_) => output.clone(),
                other => json!({ "result": other }),
            };
            json!({ "functionResponse": { "name": name, "response": response } })
        }
    }
}

fn build_request_body(conversation: &[ModelMessage], options: &CallOptions) -> Value {
    let profile = &options.profile;
    let mut generation = Map::new();
    generation.insert("temperature".into(), json!(profile.temperature));
    generation.insert("topP".into(), json!(profile.top_p));
    if profile.thinking_budget > 0 {
        generation.insert(
            "thinkingConfig".into(),
            json!({ "thinkingBudget": profile.thinking_budget }),
        );
    }

    let mut body = json!({ "contents": convert_messages(conversation) });

    match &options.contract {
        OutputContract::Tools(tools) => {
            let declarations: Vec<Value> = tools
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.input_schema,
                    })
                })
                .collect();
            body["tools"] = json!([{ "functionDeclarations": declarations }]);
        }
        OutputContract::Schema(schema) => {
            generation.insert("responseMimeType".into(), json!("application/json"));
            generation.insert("responseSchema".into(), schema.clone());
        }
    }

    body["generationConfig"] = Value::Object(generation);

    if let Some(system) = &options.system_prompt {
        body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
    }

    body
}

/// Map a generateContent response to a reply.
///
/// The first `functionCall` part wins; otherwise non-thought text parts are
/// concatenated. A blocked or empty candidate yields `Text(None)`.
fn parse_response(json: &Value) -> Result<OracleReply, OracleError> {
    if let Some(error) = json.get("error") {
        return Err(OracleError::MalformedReply(error.to_string()));
    }

    let Some(candidates) = json.get("candidates").and_then(|c| c.as_array()) else {
        if let Some(reason) = json
            .get("promptFeedback")
            .and_then(|f| f.get("blockReason"))
            .and_then(|r| r.as_str())
        {
            tracing::warn!(block_reason = reason, "Prompt blocked by oracle");
        }
        return Ok(OracleReply::Text(None));
    };

    let parts = candidates
        .first()
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .cloned()
        .unwrap_or_default();

    let mut text = String::new();
    for part in &parts {
        if let Some(call) = part.get("functionCall") {
            let name = call
                .get("name")
                .and_then(|n| n.as_str())
                .ok_or_else(|| OracleError::MalformedReply("functionCall without name".into()))?;
            return Ok(OracleReply::ToolRequest(AiToolCall {
                id: call
                    .get("id")
                    .and_then(|i| i.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4().simple())),
                name: name.to_string(),
                arguments: call.get("args").cloned().unwrap_or_else(|| json!({})),
                signature: part
                    .get("thoughtSignature")
                    .and_then(|s| s.as_str())
                    .map(str::to_string),
            }));
        }

        if part.get("thought").and_then(|t| t.as_bool()) == Some(true) {
            continue;
        }
        if let Some(chunk) = part.get("text").and_then(|t| t.as_str()) {
            text.push_str(chunk);
        }
    }

    let text = text.trim();
    Ok(OracleReply::Text(if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }))
}
