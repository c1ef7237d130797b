use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use autoinspect_core::{PhotoAnalysis, PhotoAnalysisRequest, VisionAnalyzer};
use autoinspect_logging::redact_sensitive_data;

use crate::mime::detect_image_mime;
use crate::parse::parse_analysis;
use crate::prompt::{system_prompt, USER_PROMPT};

/// Vision provider speaking the OpenAI chat-completions protocol.
///
/// Works against any compatible endpoint via [`with_base_url`](Self::with_base_url).
pub struct OpenAiVisionProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiVisionProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            max_tokens: 1024,
            temperature: 0.1,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Per-request timeout for the HTTP client.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build vision HTTP client")?;
        Ok(self)
    }

    fn build_request(&self, request: &PhotoAnalysisRequest) -> ChatRequest {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&request.image);
        let data_url = format!("data:{};base64,{}", detect_image_mime(&request.image), encoded);

        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: MessageContent::Text(system_prompt(
                        request.zone,
                        &request.vehicle_description,
                    )),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: MessageContent::Parts(vec![
                        ContentPart::ImageUrl {
                            image_url: ImageUrl {
                                url: data_url,
                                detail: "auto".to_string(),
                            },
                        },
                        ContentPart::Text {
                            text: USER_PROMPT.to_string(),
                        },
                    ]),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            response_format: ResponseFormat {
                kind: "json_object".to_string(),
            },
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: MessageContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
    detail: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl VisionAnalyzer for OpenAiVisionProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn analyze(&self, request: &PhotoAnalysisRequest) -> Result<PhotoAnalysis> {
        let start = Instant::now();
        let body = self.build_request(request);

        debug!(
            model = %self.model,
            zone = %request.zone,
            image_bytes = request.image.len(),
            "Sending photo to vision provider"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .context("Vision HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Vision provider returned {}: {}",
                status,
                redact_sensitive_data(&error_body)
            );
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("Failed to parse vision provider response")?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .context("No response from vision provider")?;

        let analysis = parse_analysis(&content)?;
        debug!(
            zone = %request.zone,
            score = analysis.score,
            findings = analysis.findings.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Vision analysis complete"
        );
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use bytes::Bytes;
    use serde_json::{json, Value};

    use super::*;
    use autoinspect_core::{FindingType, FindingZone};

    fn request() -> PhotoAnalysisRequest {
        PhotoAnalysisRequest {
            image: Bytes::from_static(b"\x89PNG\r\n\x1a\nfake"),
            zone: FindingZone::Rear,
            vehicle_description: "Kia Sportage 2019".to_string(),
        }
    }

    type Captured = Arc<Mutex<Vec<Value>>>;

    /// Spawn a chat-completions endpoint that records bodies and replies
    /// with the given status and JSON.
    async fn serve(status: StatusCode, reply: Value) -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route(
                "/chat/completions",
                post(
                    move |State(seen): State<Captured>, Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            seen.lock().unwrap().push(body);
                            (status, Json(reply))
                        }
                    },
                ),
            )
            .with_state(captured.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), captured)
    }

    #[test]
    fn request_carries_image_as_data_url_and_json_mode() {
        let provider = OpenAiVisionProvider::new("sk-test").with_model("gpt-4o-mini");
        let body = serde_json::to_value(provider.build_request(&request())).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "system");
        assert!(body["messages"][0]["content"]
            .as_str()
            .unwrap()
            .contains("rear (rear) of a Kia Sportage 2019"));

        let parts = &body["messages"][1]["content"];
        assert_eq!(parts[0]["type"], "image_url");
        let url = parts[0]["image_url"]["url"].as_str().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(parts[1]["type"], "text");
    }

    #[tokio::test]
    async fn analyze_parses_completion() {
        let content = json!({
            "score": 7,
            "findings": [{"type": "scratch", "severity": "minor", "location": "tailgate",
                          "description": "light scratch", "confidence": 0.6}]
        })
        .to_string();
        let (url, captured) = serve(
            StatusCode::OK,
            json!({"choices": [{"message": {"role": "assistant", "content": content}}]}),
        )
        .await;

        let provider = OpenAiVisionProvider::new("sk-test").with_base_url(format!("{url}/"));
        let analysis = provider.analyze(&request()).await.unwrap();
        assert_eq!(analysis.score, 7);
        assert_eq!(analysis.findings[0].finding_type, FindingType::Scratch);
        assert_eq!(captured.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn error_status_is_reported_without_secrets() {
        let (url, _) = serve(
            StatusCode::UNAUTHORIZED,
            json!({"error": "invalid key Bearer abcdefghijklmnop"}),
        )
        .await;
        let provider = OpenAiVisionProvider::new("sk-test").with_base_url(url);
        let err = provider.analyze(&request()).await.unwrap_err().to_string();
        assert!(err.contains("401"));
        assert!(!err.contains("abcdefghijklmnop"));
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let (url, _) = serve(StatusCode::OK, json!({"choices": []})).await;
        let provider = OpenAiVisionProvider::new("sk-test").with_base_url(url);
        assert!(provider.analyze(&request()).await.is_err());
    }
}
