use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    BackendError, CHAT_PATH, ChatRequest, ChatResponse, SymptomBackend, VALIDATE_PATH,
    ValidateRequest, ValidateResponse,
};

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// `timeout` of zero leaves requests unbounded.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder();
        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(BackendError::Client)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, BackendError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let endpoint = self.endpoint(path);
        debug!(%endpoint, "posting to backend");

        let response = self
            .client
            .post(&endpoint)
            .json(body)
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%endpoint, status = status.as_u16(), "backend returned error status");
            return Err(BackendError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let raw = response
            .text()
            .await
            .map_err(|source| BackendError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        serde_json::from_str(&raw).map_err(|source| BackendError::Decode { endpoint, source })
    }
}

#[async_trait]
impl SymptomBackend for HttpBackend {
    async fn validate(&self, request: &ValidateRequest) -> Result<ValidateResponse, BackendError> {
        self.post_json(VALIDATE_PATH, request).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        self.post_json(CHAT_PATH, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer) -> HttpBackend {
        HttpBackend::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn validate_posts_main_symptom_and_parses_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/validate"))
            .and(body_json(json!({ "mainSymptom": "stomach ache" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "reply": "Symptom accepted."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = backend_for(&server)
            .validate(&ValidateRequest {
                main_symptom: "stomach ache".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.ok, Some(true));
        assert_eq!(response.reply.as_deref(), Some("Symptom accepted."));
    }

    #[tokio::test]
    async fn chat_posts_all_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_json(json!({
                "age": "41",
                "sex": "Male",
                "mainSymptom": "upper abdomen pain",
                "refineAnswer": "burning after meals",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "X" })))
            .mount(&server)
            .await;

        let response = backend_for(&server)
            .chat(&ChatRequest {
                age: "41".to_string(),
                sex: "Male".to_string(),
                main_symptom: "upper abdomen pain".to_string(),
                refine_answer: "burning after meals".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.reply.as_deref(), Some("X"));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/validate"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = backend_for(&server)
            .validate(&ValidateRequest {
                main_symptom: "pain".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn non_json_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = backend_for(&server)
            .chat(&ChatRequest {
                age: "30".to_string(),
                sex: "Female".to_string(),
                main_symptom: "belly pain".to_string(),
                refine_answer: "dull".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::Decode { .. }));
    }

    #[tokio::test]
    async fn non_string_reply_decodes_as_missing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": 42 })))
            .mount(&server)
            .await;

        let response = backend_for(&server)
            .chat(&ChatRequest {
                age: "30".to_string(),
                sex: "Female".to_string(),
                main_symptom: "belly pain".to_string(),
                refine_answer: "dull".to_string(),
            })
            .await
            .unwrap();

        assert!(response.reply.is_none());
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        // Port 9 (discard) is almost never listening locally.
        let backend = HttpBackend::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = backend
            .validate(&ValidateRequest {
                main_symptom: "pain".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::Transport { .. }));
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:8000/", Duration::ZERO).unwrap();
        assert_eq!(backend.endpoint(VALIDATE_PATH), "http://localhost:8000/validate");
    }
}
