//! HTTP client for the prediction service
//!
//! One method per endpoint. No retries, no caching; transport defaults for
//! timeouts. Failures come back as `ApiError` for the calling view to show.

use crate::types::*;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {}", .detail.as_deref().unwrap_or("request failed"))]
    Status { status: u16, detail: Option<String> },
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Text shown inline in a view: the server's `detail` when it sent one,
    /// otherwise the view's fallback hint.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => fallback.to_string(),
        }
    }
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Pull the FastAPI-style `detail` out of an error body
fn parse_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        self.get_json("/health").await
    }

    pub async fn get_lotteries(&self) -> Result<Vec<LotteryInfo>, ApiError> {
        self.get_json("/lotteries").await
    }

    pub async fn get_statistics(&self) -> Result<ModelStats, ApiError> {
        self.get_json("/statistics").await
    }

    pub async fn api_info(&self) -> Result<ApiInfo, ApiError> {
        self.get_json("/").await
    }

    /// Range and count limits on `numbers` are the caller's job.
    pub async fn predict(
        &self,
        lottery: &str,
        numbers: &[u32],
        draw_id: Option<u32>,
    ) -> Result<PredictionResponse, ApiError> {
        let body = PredictRequest {
            lottery: lottery.to_string(),
            numbers: numbers.to_vec(),
            draw_id,
        };
        debug!(lottery, count = numbers.len(), ?draw_id, "POST /predict");
        let response = self.http.post(self.url("/predict")).json(&body).send().await?;
        let resp: PredictionResponse = Self::decode(response).await?;
        for problem in resp.violations() {
            warn!(problem = %problem, "Prediction response inconsistent");
        }
        Ok(resp)
    }

    pub async fn explain_number(
        &self,
        number: u32,
        lottery: &str,
    ) -> Result<ExplanationResponse, ApiError> {
        debug!(number, lottery, "GET /explain");
        let response = self
            .http
            .get(self.url(&format!("/explain/{number}")))
            .query(&[("lottery", lottery)])
            .send()
            .await?;
        let resp: ExplanationResponse = Self::decode(response).await?;
        for problem in resp.violations() {
            warn!(problem = %problem, "Explanation response inconsistent");
        }
        Ok(resp)
    }

    /// Raw project file content from `/api/files/{path}`
    pub async fn fetch_file(&self, path: &str) -> Result<String, ApiError> {
        let url = self.url(&format!("/api/files/{}", path.trim_start_matches('/')));
        debug!(url = %url, "Fetching file");
        let response = Self::check(self.http.get(url).send().await?).await?;
        Ok(response.text().await?)
    }

    /// Opaque static asset bytes, e.g. report images
    pub async fn fetch_asset(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let response = Self::check(self.http.get(self.url(path)).send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let response = self.http.get(url).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let response = Self::check(response).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Turn non-2xx responses into `ApiError::Status`
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = parse_detail(&body);
        warn!(status = status.as_u16(), detail = ?detail, "Request failed");
        Err(ApiError::Status {
            status: status.as_u16(),
            detail,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::stub::serve_once;
    use super::*;

    const PREDICTION: &str = r#"{
        "lottery": "MAHAJANA_SAMPATHA",
        "draw_id": 1201,
        "predictions": [
            {"number": 7, "probability": 0.62, "prediction": "Appear", "confidence": "Medium (Likely)"},
            {"number": 23, "probability": 0.10, "prediction": "Not Appear", "confidence": "Very High (Unlikely)"},
            {"number": 42, "probability": 0.05, "prediction": "Not Appear", "confidence": "Very High (Unlikely)"}
        ],
        "top_5_numbers": [7, 23, 42],
        "timestamp": "2026-01-10T12:00:00"
    }"#;

    #[test]
    fn base_url_is_normalized() {
        let client = ApiClient::new(" http://localhost:8000/ ");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/health"), "http://localhost:8000/health");
        assert_eq!(client.url("health"), "http://localhost:8000/health");
    }

    #[test]
    fn detail_extraction() {
        assert_eq!(
            parse_detail(r#"{"detail": "Model not loaded"}"#),
            Some("Model not loaded".to_string())
        );
        assert_eq!(parse_detail("Internal Server Error"), None);
        assert_eq!(parse_detail(r#"{"detail": null}"#), None);
        assert_eq!(
            parse_detail(r#"{"detail": [{"msg": "bad"}]}"#),
            Some(r#"[{"msg":"bad"}]"#.to_string())
        );
    }

    #[test]
    fn user_message_prefers_detail() {
        let with_detail = ApiError::Status {
            status: 400,
            detail: Some("Numbers must be between 0 and 80".to_string()),
        };
        assert_eq!(with_detail.user_message("fallback"), "Numbers must be between 0 and 80");
        let without = ApiError::Status { status: 500, detail: None };
        assert_eq!(without.user_message("fallback"), "fallback");
    }

    #[tokio::test]
    async fn predict_posts_selection_and_decodes() {
        let (base, rx) = serve_once(200, "application/json", PREDICTION);
        let client = ApiClient::new(&base);
        let resp = client
            .predict("MAHAJANA_SAMPATHA", &[7, 23, 42], None)
            .await
            .unwrap();

        let captured = rx.recv().unwrap();
        assert!(captured.request_line.starts_with("POST /predict "));
        let sent: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
        assert_eq!(
            sent,
            serde_json::json!({"lottery": "MAHAJANA_SAMPATHA", "numbers": [7, 23, 42], "draw_id": null})
        );

        let picks: Vec<u32> = resp.top_picks().iter().map(|p| p.number).collect();
        assert_eq!(picks[0], 7);
        assert_eq!(resp.ranked()[0].number, 7);
        assert!(resp.violations().is_empty());
    }

    #[tokio::test]
    async fn explain_sends_lottery_query() {
        let body = r#"{"number": 12, "prediction": "Not Appear", "probability": 0.2,
            "feature_contributions": {"trend": 0.1},
            "top_5_features": [{"feature": "trend", "contribution": 0.1}]}"#;
        let (base, rx) = serve_once(200, "application/json", body);
        let resp = ApiClient::new(&base)
            .explain_number(12, "dlb_lagna_wasana")
            .await
            .unwrap();
        assert_eq!(resp.number, 12);
        let captured = rx.recv().unwrap();
        assert!(captured
            .request_line
            .starts_with("GET /explain/12?lottery=dlb_lagna_wasana "));
    }

    #[tokio::test]
    async fn error_status_carries_detail() {
        let (base, _rx) = serve_once(503, "application/json", r#"{"detail": "Model not loaded"}"#);
        let err = ApiClient::new(&base).get_statistics().await.unwrap_err();
        match err {
            ApiError::Status { status, detail } => {
                assert_eq!(status, 503);
                assert_eq!(detail.as_deref(), Some("Model not loaded"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let (base, _rx) = serve_once(200, "application/json", "{not json");
        let err = ApiClient::new(&base).health_check().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        // Bind then drop to get a port nobody listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let err = ApiClient::new(&format!("http://127.0.0.1:{port}"))
            .get_lotteries()
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(
            err.user_message("Make sure the backend is running."),
            "Make sure the backend is running."
        );
    }

    #[tokio::test]
    async fn fetch_file_returns_raw_text() {
        let (base, rx) = serve_once(200, "text/plain", "print('hi')\n");
        let text = ApiClient::new(&base).fetch_file("backend/main.py").await.unwrap();
        assert_eq!(text, "print('hi')\n");
        assert!(rx
            .recv()
            .unwrap()
            .request_line
            .starts_with("GET /api/files/backend/main.py "));
    }

    #[tokio::test]
    async fn health_decodes_model_flags() {
        let (base, _rx) = serve_once(
            200,
            "application/json",
            r#"{"status": "healthy", "model_loaded": true, "shap_loaded": false, "timestamp": "2026-01-10T12:00:00"}"#,
        );
        let health = ApiClient::new(&base).health_check().await.unwrap();
        assert!(health.model_loaded);
        assert!(!health.shap_loaded);
    }
}
