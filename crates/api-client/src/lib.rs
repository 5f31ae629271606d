use crate::error::ApiError;
use async_trait::async_trait;
use chrono::Utc;
use configuration::Provider;
use core_types::{Recommendation, RecommendationSnapshot, TelemetrySnapshot, normalize_symbol};
use reqwest::{Response, Url};

pub mod error;
pub mod responses;
// --- Public API ---
pub use responses::{parse_recommendation, parse_recommendations, parse_telemetry};

/// The generic, abstract interface for the recommendation provider.
/// This trait is the contract that the dashboard service will use, allowing the
/// underlying implementation (live or mock) to be swapped out.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Fetches every current recommendation, in the provider's order.
    async fn fetch_recommendations(&self) -> Result<RecommendationSnapshot, ApiError>;

    /// Fetches the recommendation of a single symbol.
    async fn fetch_recommendation(&self, symbol: &str) -> Result<Recommendation, ApiError>;

    /// Fetches one complete telemetry snapshot.
    async fn fetch_telemetry(&self) -> Result<TelemetrySnapshot, ApiError>;

    /// Asks the provider to run a fresh analysis. Returns once the request is accepted.
    async fn trigger_analysis(&self) -> Result<(), ApiError>;
}

/// A concrete implementation of the `ApiClient` over HTTP/JSON.
#[derive(Clone)]
pub struct HttpProviderClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpProviderClient {
    pub fn new(provider: &Provider) -> Result<Self, ApiError> {
        let base_url = Url::parse(provider.base_url.trim()).map_err(|e| ApiError::InvalidBaseUrl {
            url: provider.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                url: provider.base_url.clone(),
                reason: "not a hierarchical URL".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(provider.timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Appends `segments` to the base path. Each segment is percent-encoded
    /// on its own, so `/`, `?` and `#` inside a segment stay part of it.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "not a hierarchical URL".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_text(&self, segments: &[&str]) -> Result<String, ApiError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%url, "Fetching from provider.");

        let response = self.client.get(url).send().await?;
        Self::success_body(response).await
    }

    async fn success_body(response: Response) -> Result<String, ApiError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            Ok(text)
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            })
        }
    }
}

#[async_trait]
impl ApiClient for HttpProviderClient {
    async fn fetch_recommendations(&self) -> Result<RecommendationSnapshot, ApiError> {
        let body = self.get_text(&["recommendations"]).await?;
        let snapshot = parse_recommendations(&body, Utc::now())?;
        tracing::info!(count = snapshot.records.len(), "Fetched recommendations.");
        Ok(snapshot)
    }

    async fn fetch_recommendation(&self, symbol: &str) -> Result<Recommendation, ApiError> {
        let symbol = normalize_symbol(symbol)?;
        let body = self.get_text(&["recommendations", symbol.as_str()]).await?;
        parse_recommendation(&body)
    }

    async fn fetch_telemetry(&self) -> Result<TelemetrySnapshot, ApiError> {
        let body = self.get_text(&["telemetry"]).await?;
        let snapshot = parse_telemetry(&body, Utc::now())?;
        tracing::info!(total_calls = snapshot.api_calls.total, "Fetched telemetry.");
        Ok(snapshot)
    }

    async fn trigger_analysis(&self) -> Result<(), ApiError> {
        let url = self.endpoint(&["run-analysis"])?;
        let response = self.client.post(url).send().await?;
        Self::success_body(response).await?;
        tracing::info!("Analysis run requested.");
        Ok(())
    }
}
