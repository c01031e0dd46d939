//! JSON HTTP front door: `POST /api/saju` and `GET /api/health`.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use saju_core::CivilDate;
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::{AppState, ChartRequest};

#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("request failed: {}", self.message);
        } else {
            tracing::debug!("rejected request: {}", self.message);
        }
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/saju", post(saju_chart))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    tracing::info!("saju API listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn saju_chart(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError {
        status: e.status(),
        message: e.body_text(),
    })?;
    let request = ChartRequest::from_json(&body).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let report = state
        .chart(&request, CivilDate::today_utc())
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let data = serde_json::to_value(&report)
        .map_err(|e| ApiError::internal(format!("failed to render report: {e}")))?;
    Ok(Json(ApiResponse {
        success: true,
        data,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrator::Narrator;
    use serde_json::json;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(
            saju_tables::load_default().unwrap(),
            Narrator::offline().unwrap(),
        ))
    }

    async fn call(body: Value) -> (StatusCode, Value) {
        let response = saju_chart(State(state()), Ok(Json(body))).await.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_success_payload_shape() {
        let (status, json) = call(json!({
            "year": "1990", "month": "5", "day": "15", "hour": 6, "gender": "male"
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        let data = &json["data"];
        assert_eq!(data["saju"]["year"]["cheongan"], "경");
        assert_eq!(data["saju"]["year"]["jiji"], "오");
        assert_eq!(data["saju"]["day"]["jiji"], "술");
        assert_eq!(data["saju"]["hour"]["cheongan"], "기");
        assert_eq!(data["saju"]["hour"]["jiji"], "묘");
        assert_eq!(data["oheng"]["balance"]["metal"], 3);
        assert_eq!(data["oheng"]["dominant"]["type"], "metal");
        assert_eq!(data["oheng"]["weak"]["type"], "water");
        assert!(data["oheng"]["balanceDescription"].is_string());
        assert!(data["interpretation"].is_string());
        assert_eq!(data["food"]["recommended"].as_array().unwrap().len(), 3);
        assert!(data["food"]["recommended"][0]["aiReason"].is_string());
        assert!(data["food"]["fortuneMessage"].is_string());
        assert!(data["pizzaCard"]["pizzaName"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_hour_omits_hour_pillar() {
        let (status, json) = call(json!({
            "year": 1990, "month": 5, "day": 15, "hour": -1, "gender": "female"
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["data"]["saju"].get("hour").is_none());
    }

    #[tokio::test]
    async fn test_siji_slot() {
        let (_, json) = call(json!({
            "year": 1990, "month": 5, "day": 15, "siji": 3, "gender": "female"
        }))
        .await;
        // slot 3 → hour 6 → 기묘
        assert_eq!(json["data"]["saju"]["hour"]["cheongan"], "기");
        assert_eq!(json["data"]["saju"]["hour"]["jiji"], "묘");
    }

    #[tokio::test]
    async fn test_missing_field_is_400() {
        let (status, json) = call(json!({ "year": 1990, "month": 5, "day": 15 })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("gender"));
    }

    #[tokio::test]
    async fn test_invalid_date_is_400() {
        let (status, json) = call(json!({
            "year": 2023, "month": 2, "day": 29, "gender": "male"
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("2023-02-29"));
    }

    #[tokio::test]
    async fn test_lunar_flag_accepted() {
        let (status, json) = call(json!({
            "year": 1990, "month": 5, "day": 15, "gender": "male", "isLunar": true
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["saju"]["day"]["jiji"], "술");
    }

    #[tokio::test]
    async fn test_internal_error_is_500_with_error_body() {
        let response = ApiError::internal("failed to render report").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "failed to render report");
    }

    #[tokio::test]
    async fn test_routes_over_the_wire() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state())).await.unwrap();
        });
        let client = reqwest::Client::new();

        let health: Value = client
            .get(format!("http://{addr}/api/health"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");

        let response = client
            .post(format!("http://{addr}/api/saju"))
            .header("content-type", "application/json")
            .body("{ not json")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].is_string());

        let response = client
            .post(format!("http://{addr}/api/saju"))
            .body(r#"{"year": 1990}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let response = client
            .post(format!("http://{addr}/api/saju"))
            .json(&json!({"year": 1984, "month": 3, "day": 1, "gender": "male"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["data"]["saju"]["year"]["cheonganHanja"], "甲");
        assert_eq!(body["data"]["saju"]["year"]["jijiHanja"], "子");
    }
}
