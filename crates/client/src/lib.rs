//! Wire types and HTTP client for the symptom validation / insight service.

mod http;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use http::HttpBackend;

pub const VALIDATE_PATH: &str = "validate";
pub const CHAT_PATH: &str = "chat";

/// Body of `POST /validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub main_symptom: String,
}

/// Reply of `POST /validate`.
///
/// `ok` is optional: older backends only send `reply` and signal a
/// scope rejection through its wording.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub reply: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub ok: Option<bool>,
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub age: String,
    pub sex: String,
    pub main_symptom: String,
    pub refine_answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub reply: Option<String>,
}

// A field of the wrong type reads as absent; callers fall back on `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_bool))
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("server error: {status} from {endpoint}")]
    Status { endpoint: String, status: u16 },
    #[error("invalid response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

/// The two calls the wizard makes.  Implemented over HTTP by
/// [`HttpBackend`]; tests substitute scripted fakes.
#[async_trait]
pub trait SymptomBackend: Send + Sync {
    async fn validate(&self, request: &ValidateRequest) -> Result<ValidateResponse, BackendError>;

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError>;
}
