//! Mock agronomist advisory service.
//!
//! Answers the same contract as the remote advisor with canned Italian text
//! built from whatever fields of the request are present.

use axum::{
    body::Bytes,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
};

use crate::config::ServerConfig;
use crate::error::Result;
use crate::logic::advisory::engine::STABLE_CONDITIONS;
use crate::logic::advisory::product::COMPATIBILITY_CHECK;
use crate::models::Advice;

pub const ADVICE_ROUTE: &str = "/api/ai/agronomist-advice";

const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            ADVICE_ROUTE,
            post(advice).options(preflight).fallback(method_not_allowed),
        )
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
}

pub async fn serve(config: &ServerConfig) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Mock advisor listening on http://{}{}", addr, ADVICE_ROUTE);

    axum::serve(listener, router()).await?;
    Ok(())
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn advice(body: Bytes) -> Response {
    let payload = if body.iter().all(u8::is_ascii_whitespace) {
        json!({})
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Rejecting advisory request: {}", e);
                return error_body(StatusCode::BAD_REQUEST, "Invalid JSON body");
            }
        }
    };

    if !payload.is_object() {
        return error_body(StatusCode::BAD_REQUEST, "Invalid JSON body");
    }

    Json(build_advice(&payload)).into_response()
}

async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn method_not_allowed() -> Response {
    error_body(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

async fn not_found() -> Response {
    error_body(StatusCode::NOT_FOUND, "Not found")
}

fn text_at<'a>(payload: &'a Value, pointer: &str) -> Option<&'a str> {
    payload.pointer(pointer).and_then(Value::as_str)
}

/// Canned advice for a request payload. Every field is optional.
pub fn build_advice(payload: &Value) -> Advice {
    let crop = text_at(payload, "/crop/label").unwrap_or("coltura selezionata");
    let product = text_at(payload, "/product/label").unwrap_or("prodotto scelto");
    let status = text_at(payload, "/current/status").unwrap_or("n/d");
    let score = payload
        .pointer("/current/score")
        .filter(|v| !v.is_null())
        .map(|v| format!(" (indice {}%)", plain(Some(v))))
        .unwrap_or_default();

    let summary = format!(
        "Mock server: per {} con intervento {} le condizioni sono {}{}.",
        crop.to_lowercase(),
        product.to_lowercase(),
        status.to_lowercase(),
        score
    );

    let first_window = payload.pointer("/windows/0").filter(|w| !w.is_null());
    let schedule = match first_window {
        Some(window) => format!(
            "Programma il trattamento tra {} ({}, conf. {}%).",
            plain(window.get("time")),
            plain(window.get("status")),
            plain(window.get("confidence"))
        ),
        None => "Nessuna finestra rilevata: considera di ricalibrare le soglie o rimandare."
            .to_string(),
    };

    let factor_notes: Vec<String> = payload
        .get("factors")
        .and_then(Value::as_array)
        .map(|factors| {
            factors
                .iter()
                .filter(|f| matches!(f.get("status").and_then(Value::as_str), Some(s) if s != "good"))
                .map(|f| {
                    format!(
                        "{}: {} — {}.",
                        plain(f.get("name")),
                        plain(f.get("value")),
                        plain(f.get("threshold"))
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    let cautions = if factor_notes.is_empty() {
        vec![STABLE_CONDITIONS.to_string()]
    } else {
        factor_notes
    };

    Advice {
        headline: "Parere agronomico AI (mock)".to_string(),
        summary,
        product_suggestion: Some(format!(
            "Suggerimento mock: {} con protocollo standard.",
            product
        )),
        recommended_actions: vec![schedule, COMPATIBILITY_CHECK.to_string()],
        cautions,
    }
}

/// A JSON value as display text; strings unquoted, missing values empty
fn plain(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn call(method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = router()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[test]
    fn advice_uses_payload_fields() {
        let advice = build_advice(&json!({
            "crop": {"key": "vite", "label": "Vite"},
            "product": {"key": "fungicida", "label": "Fungicida"},
            "current": {"status": "Buona", "score": 92},
            "windows": [{"time": "06:00-10:00", "status": "Buona", "confidence": 91, "reason": ""}],
            "factors": [
                {"name": "Velocità Vento", "status": "mid", "value": "5.0 m/s", "threshold": "≤ 4 m/s", "weight": 30},
                {"name": "Temperatura", "status": "good", "value": "20.0°C", "threshold": "8-30°C", "weight": 20}
            ]
        }));

        assert_eq!(
            advice.summary,
            "Mock server: per vite con intervento fungicida le condizioni sono buona (indice 92%)."
        );
        assert_eq!(
            advice.recommended_actions[0],
            "Programma il trattamento tra 06:00-10:00 (Buona, conf. 91%)."
        );
        assert_eq!(advice.cautions, vec!["Velocità Vento: 5.0 m/s — ≤ 4 m/s."]);
        assert_eq!(
            advice.product_suggestion.as_deref(),
            Some("Suggerimento mock: Fungicida con protocollo standard.")
        );
    }

    #[test]
    fn empty_payload_gets_defaults() {
        let advice = build_advice(&json!({}));
        assert!(advice.summary.contains("coltura selezionata"));
        assert!(advice.summary.ends_with("sono n/d."));
        assert!(advice.recommended_actions[0].starts_with("Nessuna finestra rilevata"));
        assert_eq!(advice.cautions, vec![STABLE_CONDITIONS.to_string()]);
    }

    #[tokio::test]
    async fn post_returns_advice() {
        let (status, body) = call(Method::POST, ADVICE_ROUTE, r#"{"crop":{"label":"Grano"}}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["headline"], "Parere agronomico AI (mock)");
        assert!(body["recommendedActions"].is_array());
    }

    #[tokio::test]
    async fn empty_body_is_an_empty_payload() {
        let (status, _) = call(Method::POST, ADVICE_ROUTE, "").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn bad_bodies_are_rejected() {
        let (status, body) = call(Method::POST, ADVICE_ROUTE, "{oops").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid JSON body"}));

        let (status, _) = call(Method::POST, ADVICE_ROUTE, "[1, 2]").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn options_and_other_methods() {
        let (status, _) = call(Method::OPTIONS, ADVICE_ROUTE, "").await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = call(Method::GET, ADVICE_ROUTE, "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method not allowed");

        let (status, _) = call(Method::POST, "/altro", "{}").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
