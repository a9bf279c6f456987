use std::env;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{ClassifierError, IntentClassifier};

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
const CLASSIFY_INSTRUCTIONS: &str =
    "Classify the place the user is looking for. Answer with exactly one intent from:";

#[derive(Debug, Clone)]
pub struct OpenAiClassifierConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl OpenAiClassifierConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }

    /// `None` when `OPENAI_API_KEY` is unset or blank.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty())?;
        let model = env::var("VIBES_OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let base_url =
            env::var("VIBES_OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout = Duration::from_secs(
            env::var("VIBES_OPENAI_TIMEOUT_SECONDS")
                .ok()
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        );

        Some(Self {
            api_key,
            model,
            base_url,
            timeout,
        })
    }
}

#[derive(Debug, Deserialize)]
struct IntentChoice {
    intent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenAiIntentClassifier {
    client: Client,
    config: OpenAiClassifierConfig,
}

impl OpenAiIntentClassifier {
    pub fn new(config: OpenAiClassifierConfig) -> Result<Self, ClassifierError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

impl IntentClassifier for OpenAiIntentClassifier {
    async fn classify(
        &self,
        query: &str,
        known_intents: &[&str],
    ) -> Result<Option<String>, ClassifierError> {
        let payload = json!({
            "model": self.config.model,
            "temperature": 0.1,
            "input": [
                {
                    "role": "system",
                    "content": [
                        {
                            "type": "input_text",
                            "text": format!(
                                "{CLASSIFY_INSTRUCTIONS} {}",
                                known_intents.join(", ")
                            )
                        }
                    ]
                },
                {
                    "role": "user",
                    "content": [
                        { "type": "input_text", "text": format!("Query: '{query}'") }
                    ]
                }
            ],
            "text": {
                "format": {
                    "type": "json_schema",
                    "name": "intent_choice",
                    "strict": true,
                    "schema": {
                        "type": "object",
                        "properties": {
                            "intent": { "type": "string", "enum": known_intents }
                        },
                        "required": ["intent"],
                        "additionalProperties": false
                    }
                }
            }
        });

        let url = format!("{}/v1/responses", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .bearer_auth(self.config.api_key.as_str())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        let Some(text) = extract_output_text(&body).filter(|value| !value.trim().is_empty())
        else {
            return Ok(None);
        };

        let choice: IntentChoice = serde_json::from_str(text.trim())?;
        Ok(choice.intent)
    }
}

fn extract_output_text(payload: &Value) -> Option<String> {
    if let Some(value) = payload.get("output_text").and_then(|value| value.as_str()) {
        return Some(value.to_string());
    }
    let output = payload.get("output")?.as_array()?;
    let mut chunks = Vec::new();
    for item in output {
        if let Some(content) = item.get("content").and_then(|value| value.as_array()) {
            for content_item in content {
                if content_item.get("type").and_then(|value| value.as_str())
                    == Some("output_text")
                {
                    if let Some(text) = content_item.get("text").and_then(|value| value.as_str()) {
                        chunks.push(text.to_string());
                    }
                }
            }
        }
    }
    if chunks.is_empty() {
        None
    } else {
        Some(chunks.concat())
    }
}
