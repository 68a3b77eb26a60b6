use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse_or};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::EmbeddingProvider;
use crate::error::{RecommenderError, RecommenderResult};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for any OpenAI-compatible `/embeddings` endpoint
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub base_url: String,
    /// Sent as a bearer token when set; local gateways often need none
    pub api_key: Option<String>,
    /// Requested output size for models that support shortening
    pub dimensions: Option<u32>,
    pub timeout: Duration,
}

impl OpenAIConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            dimensions: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_dimensions(mut self, dimensions: u32) -> Self {
        self.dimensions = Some(dimensions);
        self
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl FromEnv for OpenAIConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let dimensions = match env_optional("EMBEDDING_DIMENSIONS") {
            Some(raw) => Some(raw.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::ParseError {
                    key: "EMBEDDING_DIMENSIONS".to_string(),
                    details: e.to_string(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            base_url: env_or_default("EMBEDDING_BASE_URL", DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: env_optional("EMBEDDING_API_KEY"),
            dimensions,
            timeout: Duration::from_secs(env_parse_or("EMBEDDING_TIMEOUT_SECS", 10u64)?),
        })
    }
}

/// Embeddings over the OpenAI HTTP API shape
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> RecommenderResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn provider_name(&self) -> &'static str {
        "openai"
    }

    async fn embed(&self, model: &str, text: &str) -> RecommenderResult<Vec<f32>> {
        let results = self.embed_batch(model, &[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| RecommenderError::Embedding("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, model: &str, texts: &[String]) -> RecommenderResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let request = EmbeddingRequest {
            model,
            input: texts,
            dimensions: self.config.dimensions,
        };

        let mut builder = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .json(&request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RecommenderError::Embedding(format!(
                "Embedding API error ({}): {}",
                status, error_text
            )));
        }

        let embedding_response: EmbeddingResponse = response.json().await?;
        if embedding_response.data.len() != texts.len() {
            return Err(RecommenderError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embedding_response.data.len()
            )));
        }

        // Sort by index to maintain order
        let mut data = embedding_response.data;
        data.sort_by_key(|d| d.index);

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};
    use serde_json::{Value, json};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", address)
    }

    #[tokio::test]
    async fn test_embed_batch_restores_input_order() {
        let router = Router::new().route(
            "/embeddings",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(body["model"], json!("mini-lm"));
                assert_eq!(headers["authorization"], "Bearer sk-test");
                Json(json!({
                    "data": [
                        { "embedding": [0.0, 1.0], "index": 1 },
                        { "embedding": [1.0, 0.0], "index": 0 }
                    ]
                }))
            }),
        );
        let base_url = serve(router).await;

        let provider = OpenAIProvider::new(OpenAIConfig::new(base_url).with_api_key("sk-test")).unwrap();
        let embeddings = provider
            .embed_batch("mini-lm", &["first".to_string(), "second".to_string()])
            .await
            .unwrap();

        assert_eq!(embeddings, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_error_status_becomes_embedding_error() {
        let router = Router::new().route(
            "/embeddings",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base_url = serve(router).await;

        let provider = OpenAIProvider::new(OpenAIConfig::new(base_url)).unwrap();
        let err = provider.embed("mini-lm", "rust").await.unwrap_err();

        match err {
            RecommenderError::Embedding(msg) => {
                assert!(msg.contains("429"), "{}", msg);
                assert!(msg.contains("slow down"), "{}", msg);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_batch_skips_request() {
        let provider = OpenAIProvider::new(OpenAIConfig::new("http://127.0.0.1:9")).unwrap();
        assert!(provider.embed_batch("m", &[]).await.unwrap().is_empty());
    }

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars(
            [
                ("EMBEDDING_BASE_URL", Some("http://embedder:8000/v1/")),
                ("EMBEDDING_API_KEY", None),
                ("EMBEDDING_DIMENSIONS", Some("384")),
                ("EMBEDDING_TIMEOUT_SECS", None),
            ],
            || {
                let config = OpenAIConfig::from_env().unwrap();
                assert_eq!(config.base_url, "http://embedder:8000/v1");
                assert_eq!(config.api_key, None);
                assert_eq!(config.dimensions, Some(384));
                assert_eq!(config.timeout, Duration::from_secs(10));
            },
        );
    }

    #[test]
    fn test_config_rejects_bad_dimensions() {
        temp_env::with_var("EMBEDDING_DIMENSIONS", Some("many"), || {
            assert!(OpenAIConfig::from_env().is_err());
        });
    }
}
