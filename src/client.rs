use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info};

use crate::api_types::{
    ApiCompareResponse, ApiErrorBody, ApiHealthResponse, ApiProcessResponse, ApiScrapeResponse,
    ApiSummaryResponse,
};
use crate::error::AnalysisError;
use crate::models::{ComparisonResult, Platform, ProcessPayload, ScrapeResult};

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000/api";

/// The remote collaborators the controllers drive. One implementation talks
/// to the Flask backend over HTTP; tests substitute scripted fakes.
#[async_trait]
pub trait ReviewApi {
    async fn scrape(&self, platform: Platform, url: &str) -> Result<ScrapeResult, AnalysisError>;

    async fn process(&self, product_id: &str) -> Result<ProcessPayload, AnalysisError>;

    async fn summarize(&self, product_id: &str) -> Result<String, AnalysisError>;

    async fn compare(
        &self,
        pid1: &str,
        pid2: &str,
        title1: &str,
        title2: &str,
    ) -> Result<ComparisonResult, AnalysisError>;
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    api_base: String,
}

impl BackendClient {
    /// `timeout` covers each individual call; expiry surfaces as a pipeline
    /// failure like any other transport error.
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self, AnalysisError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::pipeline("client", e))?;
        Ok(BackendClient {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub async fn health(&self) -> Result<ApiHealthResponse, AnalysisError> {
        self.get("health", format!("{}/health", self.api_base)).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        step: &'static str,
        url: String,
    ) -> Result<T, AnalysisError> {
        let start = Instant::now();
        debug!("API GET starting - step={}, url={}", step, url);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AnalysisError::pipeline(step, e))?;
        let out = interpret_response(step, resp).await;

        info!(
            "API GET completed - step={}, duration={:.2}s, ok={}",
            step,
            start.elapsed().as_secs_f32(),
            out.is_ok()
        );
        out
    }

    async fn post<T: DeserializeOwned>(
        &self,
        step: &'static str,
        url: String,
        body: serde_json::Value,
    ) -> Result<T, AnalysisError> {
        let start = Instant::now();
        debug!("API POST starting - step={}, url={}", step, url);

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalysisError::pipeline(step, e))?;
        let out = interpret_response(step, resp).await;

        info!(
            "API POST completed - step={}, duration={:.2}s, ok={}",
            step,
            start.elapsed().as_secs_f32(),
            out.is_ok()
        );
        out
    }
}

async fn interpret_response<T: DeserializeOwned>(
    step: &'static str,
    resp: reqwest::Response,
) -> Result<T, AnalysisError> {
    let status = resp.status();
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| AnalysisError::pipeline(step, e))?;
    decode_body(step, status.as_u16(), &bytes)
}

/// An error-carrying payload is surfaced as a pipeline failure regardless of
/// HTTP status; a non-2xx status without one is reported as-is.
pub(crate) fn decode_body<T: DeserializeOwned>(
    step: &'static str,
    status: u16,
    bytes: &[u8],
) -> Result<T, AnalysisError> {
    if let Ok(body) = serde_json::from_slice::<ApiErrorBody>(bytes) {
        return Err(AnalysisError::Pipeline {
            step,
            message: body.error,
        });
    }
    if !(200..300).contains(&status) {
        return Err(AnalysisError::Pipeline {
            step,
            message: format!("HTTP {status}"),
        });
    }
    serde_json::from_slice::<T>(bytes)
        .map_err(|e| AnalysisError::pipeline(step, format!("decoding response: {e}")))
}

#[async_trait]
impl ReviewApi for BackendClient {
    async fn scrape(&self, platform: Platform, url: &str) -> Result<ScrapeResult, AnalysisError> {
        let endpoint = format!("{}/{}", self.api_base, platform.scrape_endpoint());
        let api: ApiScrapeResponse = self.post("scrape", endpoint, json!({ "url": url })).await?;
        Ok(ScrapeResult::from_api(api))
    }

    async fn process(&self, product_id: &str) -> Result<ProcessPayload, AnalysisError> {
        let url = format!("{}/process/{}", self.api_base, product_id);
        let api: ApiProcessResponse = self.get("process", url).await?;
        Ok(ProcessPayload::from_api(api))
    }

    async fn summarize(&self, product_id: &str) -> Result<String, AnalysisError> {
        let url = format!("{}/summary/{}", self.api_base, product_id);
        let api: ApiSummaryResponse = self.get("summary", url).await?;
        Ok(api.summary)
    }

    async fn compare(
        &self,
        pid1: &str,
        pid2: &str,
        title1: &str,
        title2: &str,
    ) -> Result<ComparisonResult, AnalysisError> {
        let url = format!("{}/compare", self.api_base);
        let body = json!({ "pid1": pid1, "pid2": pid2, "title1": title1, "title2": title2 });
        let api: ApiCompareResponse = self.post("compare", url, body).await?;
        Ok(ComparisonResult::from_api(api))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_body_surfaces_error_payloads() {
        let err = decode_body::<ApiSummaryResponse>("summary", 500, br#"{"error": "boom"}"#)
            .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::Pipeline {
                step: "summary",
                message: "boom".to_string()
            }
        );
    }

    #[test]
    fn decode_body_surfaces_error_payloads_even_on_200() {
        let err = decode_body::<ApiSummaryResponse>("summary", 200, br#"{"error": "no docs"}"#)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Pipeline { step: "summary", .. }));
    }

    #[test]
    fn decode_body_reports_plain_http_failures() {
        let err = decode_body::<ApiSummaryResponse>("summary", 502, b"bad gateway").unwrap_err();
        assert_eq!(
            err,
            AnalysisError::Pipeline {
                step: "summary",
                message: "HTTP 502".to_string()
            }
        );
    }

    #[test]
    fn decode_body_parses_success() {
        let out: ApiSummaryResponse =
            decode_body("summary", 200, br#"{"summary": "Great"}"#).unwrap();
        assert_eq!(out.summary, "Great");
    }
}
