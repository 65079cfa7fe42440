use futures_util::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::time::Duration;

use super::prompt::{build_system_prompt, build_user_message};
use super::provider::{ChunkRequest, KeyedTranslation, TranslationProvider};
use super::ProviderError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

// Use Cow to avoid cloning strings that are only borrowed for serialization
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    response_format: serde_json::Value,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Cow<'a, str>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslationPayload {
    translations: Vec<KeyedTranslation>,
}

/// Structured-output schema: `{"translations": [{"key", "translatedText"}]}`.
fn response_format() -> serde_json::Value {
    serde_json::json!({
        "type": "json_schema",
        "json_schema": {
            "name": "translations",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "translations": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "key": { "type": "string" },
                                "translatedText": { "type": "string" }
                            },
                            "required": ["key", "translatedText"],
                            "additionalProperties": false
                        }
                    }
                },
                "required": ["translations"],
                "additionalProperties": false
            }
        }
    })
}

/// [`TranslationProvider`] for OpenAI-compatible chat completion endpoints.
pub struct TranslationClient {
    client: Client,
    endpoint: String,
}

impl TranslationClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
        }
    }

    async fn complete(&self, request: &ChunkRequest) -> Result<Vec<KeyedTranslation>, ProviderError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.endpoint.trim_end_matches('/')
        );

        let system_prompt = build_system_prompt(
            &request.source_language,
            &request.target_language,
            request.app_context.as_deref(),
        );
        let user_message = build_user_message(&request.items)
            .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;

        let chat_request = ChatCompletionRequest {
            model: &request.model,
            messages: vec![
                Message {
                    role: "system",
                    content: Cow::Owned(system_prompt),
                },
                Message {
                    role: "user",
                    content: Cow::Owned(user_message),
                },
            ],
            temperature: request.temperature,
            response_format: response_format(),
            stream: false,
        };

        let mut http_request = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(&chat_request);

        // Add Authorization header if API key is present
        if let Some(api_key) = &request.api_key {
            http_request = http_request.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| ProviderError::Transport(format!("{url}: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(classify_status(status, body));
        }

        parse_completion(&body)
    }
}

impl TranslationProvider for TranslationClient {
    fn translate_chunk<'a>(
        &'a self,
        request: &'a ChunkRequest,
    ) -> BoxFuture<'a, Result<Vec<KeyedTranslation>, ProviderError>> {
        Box::pin(self.complete(request))
    }
}

fn classify_status(status: StatusCode, body: String) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Unauthorized {
            status: status.as_u16(),
            body,
        },
        _ => ProviderError::Status {
            status: status.as_u16(),
            body,
        },
    }
}

fn parse_completion(body: &str) -> Result<Vec<KeyedTranslation>, ProviderError> {
    let response: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(format!("Invalid completion JSON: {e}")))?;

    let content = response
        .choices
        .into_iter()
        .find_map(|choice| choice.message.content)
        .ok_or_else(|| ProviderError::MalformedResponse("Response has no content".to_string()))?;

    parse_translations(&content)
}

/// Parses the model's structured output, tolerating a surrounding code fence.
fn parse_translations(content: &str) -> Result<Vec<KeyedTranslation>, ProviderError> {
    let trimmed = content.trim();
    let json = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|inner| inner.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str::<TranslationPayload>(json.trim())
        .map(|payload| payload.translations)
        .map_err(|e| ProviderError::MalformedResponse(format!("Invalid translations JSON: {e}")))
}
