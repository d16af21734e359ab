use crate::config::AdvisorConfig;
use crate::error::{Result, SprayError};
use crate::models::{Advice, AdvisoryOutcome, AdvisoryRequest};
use serde_json::Value;
use std::time::Duration;

/// Client for the remote agronomist advisory service.
///
/// [`AdvisorClient::advise`] never fails: any transport, status or parse
/// problem yields the local advice with a soft note.
pub struct AdvisorClient {
    client: reqwest::Client,
    config: AdvisorConfig,
}

impl AdvisorClient {
    pub fn new(config: AdvisorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub async fn advise(&self, request: &AdvisoryRequest, local: &Advice) -> AdvisoryOutcome {
        match self.fetch_raw(request).await {
            Ok(raw) => outcome_from_body(&raw, local),
            Err(e) => {
                tracing::warn!("Remote advisory unavailable: {}", e);
                AdvisoryOutcome::local_fallback(local.clone())
            }
        }
    }

    async fn fetch_raw(&self, request: &AdvisoryRequest) -> Result<String> {
        let mut builder = self.client.post(&self.config.url).json(request);
        if !self.config.api_key.is_empty() {
            builder = builder.bearer_auth(&self.config.api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SprayError::DataSourceUnavailable(format!("Advisor: {}", e)))?;

        if !response.status().is_success() {
            return Err(SprayError::DataSourceUnavailable(format!(
                "Advisor returned {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| SprayError::DataSourceUnavailable(format!("Advisor body: {}", e)))
    }
}

/// Field-wise reconciliation of a response body with the local advice.
/// A body that is not JSON falls back entirely.
pub fn outcome_from_body(body: &str, local: &Advice) -> AdvisoryOutcome {
    match serde_json::from_str::<Value>(body) {
        Ok(raw) => AdvisoryOutcome::remote(Advice::reconcile(&raw, local)),
        Err(e) => {
            tracing::warn!("Failed to parse advisory response: {}", e);
            AdvisoryOutcome::local_fallback(local.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdviceSource, REMOTE_UNAVAILABLE_NOTE};
    use axum::{http::StatusCode, routing::post, Router};

    fn local() -> Advice {
        Advice {
            headline: "Locale".into(),
            summary: "Sintesi".into(),
            product_suggestion: None,
            recommended_actions: vec!["a".into()],
            cautions: vec!["c".into()],
        }
    }

    #[test]
    fn partial_body_is_merged() {
        let outcome = outcome_from_body(r#"{"headline": "Remoto", "cautions": [1]}"#, &local());
        assert_eq!(outcome.source, AdviceSource::Remote);
        assert_eq!(outcome.advice.headline, "Remoto");
        assert_eq!(outcome.advice.cautions, vec!["c"]);
        assert!(outcome.note.is_none());
    }

    #[test]
    fn unparseable_body_falls_back_with_note() {
        let outcome = outcome_from_body("<html>502</html>", &local());
        assert_eq!(outcome.source, AdviceSource::Local);
        assert_eq!(outcome.advice, local());
        assert_eq!(outcome.note.as_deref(), Some(REMOTE_UNAVAILABLE_NOTE));
    }

    /// Local advisory endpoint answering every POST with `status` and `body`.
    async fn advisor_stub(status: StatusCode, body: &'static str) -> String {
        let app = Router::new().route(
            "/api/ai/agronomist-advice",
            post(move || async move { (status, body) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api/ai/agronomist-advice", addr)
    }

    fn request() -> AdvisoryRequest {
        serde_json::from_value(serde_json::json!({
            "timestamp": "2024-05-01T08:00:00Z",
            "location": {"lat": 44.5, "lon": 11.3, "name": "Bologna"},
            "crop": {"key": "standard", "label": "Standard"},
            "product": {"key": "fungicida", "label": "Fungicida"},
            "windSensitivity": {"key": "balanced", "label": "Media"},
            "thresholds": crate::models::DEFAULT_THRESHOLDS,
            "minWindowHours": 2.0,
            "current": null,
            "factors": [],
            "windows": [],
            "hourly": []
        }))
        .unwrap()
    }

    async fn client_for(status: StatusCode, body: &'static str) -> AdvisorClient {
        AdvisorClient::new(AdvisorConfig {
            url: advisor_stub(status, body).await,
            timeout_secs: 5,
            ..AdvisorConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn server_error_falls_back() {
        let client = client_for(StatusCode::INTERNAL_SERVER_ERROR, r#"{"headline": "x"}"#).await;

        let outcome = client.advise(&request(), &local()).await;
        assert_eq!(outcome.source, AdviceSource::Local);
        assert_eq!(outcome.advice, local());
        assert_eq!(outcome.note.as_deref(), Some(REMOTE_UNAVAILABLE_NOTE));
    }

    #[tokio::test]
    async fn remote_advice_is_reconciled() {
        let client = client_for(StatusCode::OK, r#"{"summary": "Remoto", "cautions": "no"}"#).await;

        let outcome = client.advise(&request(), &local()).await;
        assert_eq!(outcome.source, AdviceSource::Remote);
        assert_eq!(outcome.advice.summary, "Remoto");
        assert_eq!(outcome.advice.headline, "Locale");
        assert_eq!(outcome.advice.cautions, vec!["c"]);
    }
}
