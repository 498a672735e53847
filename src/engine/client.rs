use serde::de::DeserializeOwned;
use serde::Serialize;

use super::types::{
    AnalysisRequest, AnalysisResult, AnalyzeEnvelope, DosingRequest, DosingResponse,
    DrugValidateRequest, DrugValidation, EngineErrorBody, PairCheck, PairCheckRequest,
};
use super::EngineError;
use crate::config;
use crate::orchestrator::AnalysisBackend;

/// Typed HTTP client for the analysis engine.
///
/// Pure transport: every failure surfaces as an `EngineError` for the
/// caller to react to. The client itself holds no state beyond the
/// connection pool.
pub struct EngineClient {
    base_url: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl EngineClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    /// Client with the standard 30s request timeout.
    pub fn with_defaults(base_url: &str) -> Self {
        Self::new(base_url, config::REQUEST_TIMEOUT_SECS)
    }

    pub fn from_endpoints(endpoints: &config::Endpoints) -> Self {
        Self::with_defaults(&endpoints.engine_base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, EngineError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<EngineErrorBody>(&body)
                .ok()
                .map(|b| b.detail);
            return Err(EngineError::Engine {
                status: status.as_u16(),
                detail,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| EngineError::ResponseParsing(e.to_string()))
    }

    fn map_transport_error(&self, error: reqwest::Error) -> EngineError {
        if error.is_timeout() {
            EngineError::Timeout(self.timeout_secs)
        } else if error.is_connect() {
            EngineError::Connection(self.base_url.clone())
        } else {
            EngineError::Http(error.to_string())
        }
    }
}

impl AnalysisBackend for EngineClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, EngineError> {
        let envelope: AnalyzeEnvelope = self.post_json("/agent/analyze", request).await?;
        Ok(envelope.analysis)
    }

    async fn check_drug_pair(&self, drug1: &str, drug2: &str) -> Result<PairCheck, EngineError> {
        self.post_json("/check/drug-pair", &PairCheckRequest { drug1, drug2 })
            .await
    }

    async fn validate_drug(&self, drug_name: &str) -> Result<DrugValidation, EngineError> {
        self.post_json("/validate/drug", &DrugValidateRequest { drug_name })
            .await
    }

    async fn dosing(&self, request: &DosingRequest) -> Result<DosingResponse, EngineError> {
        self.post_json("/dosing", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let client = EngineClient::with_defaults("http://localhost:8000/agent/");
        assert_eq!(client.base_url(), "http://localhost:8000/agent");
    }

    #[test]
    fn error_body_detail_extracted() {
        let body: EngineErrorBody =
            serde_json::from_str(r#"{"detail": "At least one medication required"}"#).unwrap();
        assert_eq!(body.detail, "At least one medication required");
    }
}
