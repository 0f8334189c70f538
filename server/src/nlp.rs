//! Remote annotation service client.
//!
//! POSTs `{"text": ...}` and expects `{"tokens": [...], "entities": [...]}`
//! back, where tokens and entities carry at least `text` (and `label` for
//! entities). Offsets are optional.

use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::runtime::Handle;

use intake_core::{AnnotatedText, Annotator, CoreError, EntitySpan, Result, Token};

#[derive(Debug, Deserialize)]
pub struct AnnotationResponse {
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub entities: Vec<EntitySpan>,
}

impl AnnotationResponse {
    pub fn into_annotated(self, text: &str) -> AnnotatedText {
        AnnotatedText {
            text: text.to_string(),
            tokens: self.tokens,
            entities: self.entities,
        }
    }
}

/// [`Annotator`] delegating to an HTTP service.
///
/// Annotation runs on blocking worker threads, so requests are driven to
/// completion on the server runtime through its [`Handle`].
pub struct RemoteAnnotator {
    client: reqwest::Client,
    endpoint: String,
    handle: Handle,
}

impl RemoteAnnotator {
    pub fn new(endpoint: &str, timeout: Duration, handle: Handle) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::InvalidConfig(format!("annotator client: {}", e)))?;

        log::info!("[Annotator] using remote endpoint {}", endpoint);

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            handle,
        })
    }

    async fn request(&self, text: &str) -> reqwest::Result<AnnotationResponse> {
        self.client
            .post(&self.endpoint)
            .json(&json!({ "text": text }))
            .send()
            .await?
            .error_for_status()?
            .json::<AnnotationResponse>()
            .await
    }
}

impl Annotator for RemoteAnnotator {
    fn name(&self) -> &str {
        "remote"
    }

    fn annotate(&self, text: &str) -> Result<AnnotatedText> {
        let response = self
            .handle
            .block_on(self.request(text))
            .map_err(|e| CoreError::Annotation(format!("remote annotator: {}", e)))?;

        log::debug!(
            "[Annotator] remote returned {} tokens, {} entities",
            response.tokens.len(),
            response.entities.len()
        );

        Ok(response.into_annotated(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};

    #[test]
    fn test_response_without_offsets() {
        let raw = r#"{
            "tokens": [{"text": "Acme"}, {"text": "Corp"}],
            "entities": [{"text": "Acme Corp", "label": "ORG"}]
        }"#;
        let response: AnnotationResponse = serde_json::from_str(raw).unwrap();
        let doc = response.into_annotated("Acme Corp");
        assert_eq!(doc.word_count(), 2);
        assert_eq!(doc.entities[0].label, "ORG");
        assert_eq!(doc.entities[0].start, 0);
        assert_eq!(doc.text, "Acme Corp");
    }

    #[test]
    fn test_empty_response() {
        let response: AnnotationResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_annotated("").tokens.is_empty());
    }

    async fn spawn_service(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/annotate", addr)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_remote_round_trip() {
        let app = Router::new().route(
            "/annotate",
            post(|Json(body): Json<serde_json::Value>| async move {
                let text = body["text"].as_str().unwrap_or_default().to_string();
                let tokens: Vec<_> = text
                    .split_whitespace()
                    .map(|w| json!({ "text": w }))
                    .collect();
                Json(json!({
                    "tokens": tokens,
                    "entities": [{ "text": "Globex", "label": "ORG" }]
                }))
            }),
        );
        let endpoint = spawn_service(app).await;

        let annotator =
            RemoteAnnotator::new(&endpoint, Duration::from_secs(5), Handle::current()).unwrap();
        let doc = tokio::task::spawn_blocking(move || annotator.annotate("worked at Globex"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(doc.word_count(), 3);
        assert_eq!(doc.entities[0].text, "Globex");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_remote_error_status_is_annotation_error() {
        let app = Router::new().route(
            "/annotate",
            post(|| async { axum::http::StatusCode::SERVICE_UNAVAILABLE }),
        );
        let endpoint = spawn_service(app).await;

        let annotator =
            RemoteAnnotator::new(&endpoint, Duration::from_secs(5), Handle::current()).unwrap();
        let err = tokio::task::spawn_blocking(move || annotator.annotate("text"))
            .await
            .unwrap()
            .unwrap_err();

        assert!(matches!(err, CoreError::Annotation(_)));
    }
}
