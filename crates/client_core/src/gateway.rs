//! Remote data gateway: the filter vocabulary endpoint and the paged records endpoint.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::FilterVocabulary,
    error::{ErrorBody, GENERIC_FETCH_ERROR},
    protocol::{QueryParams, RecordsResponse, ResultPage},
};
use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::config::GatewaySettings;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Transport(String),
    #[error("gateway responded with status {status}")]
    Status { status: u16, detail: Option<String> },
    #[error("malformed gateway payload: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Message suitable for showing to the user as is.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => GENERIC_FETCH_ERROR.to_string(),
        }
    }
}

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn fetch_filters(&self) -> Result<FilterVocabulary, GatewayError>;
    async fn fetch_records(&self, params: &QueryParams) -> Result<ResultPage, GatewayError>;
}

pub struct HttpGateway {
    http: Client,
    records_url: Url,
    filters_url: Url,
    api_key: String,
}

impl HttpGateway {
    pub fn new(settings: &GatewaySettings) -> anyhow::Result<Self> {
        let base_url = settings.base_url()?;
        let records_url = base_url
            .join(&settings.records_path)
            .with_context(|| format!("invalid records path '{}'", settings.records_path))?;
        let filters_url = base_url
            .join(&settings.filters_path)
            .with_context(|| format!("invalid filters path '{}'", settings.filters_path))?;

        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to build http client")?;

        Ok(Self {
            http,
            records_url,
            filters_url,
            api_key: settings.api_key.clone(),
        })
    }

    pub fn records_url(&self) -> &Url {
        &self.records_url
    }

    pub fn filters_url(&self) -> &Url {
        &self.filters_url
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn fetch_filters(&self) -> Result<FilterVocabulary, GatewayError> {
        let res = self
            .http
            .get(self.filters_url.clone())
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        decode_body(res).await
    }

    async fn fetch_records(&self, params: &QueryParams) -> Result<ResultPage, GatewayError> {
        let res = self
            .http
            .get(self.records_url.clone())
            .query(&[("api-key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        let body: RecordsResponse = decode_body(res).await?;

        let mut page = ResultPage::from(body);
        let limit = usize::try_from(params.limit()).unwrap_or(usize::MAX);
        if page.records.len() > limit {
            warn!(
                received = page.records.len(),
                limit, "gateway returned more records than requested; truncating page"
            );
            page.records.truncate(limit);
        }
        Ok(page)
    }
}

async fn decode_body<T: DeserializeOwned>(res: Response) -> Result<T, GatewayError> {
    let status = res.status();
    let bytes = res
        .bytes()
        .await
        .map_err(|err| GatewayError::Transport(err.to_string()))?;

    if !status.is_success() {
        let detail = serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(|body| body.detail_message());
        return Err(GatewayError::Status {
            status: status.as_u16(),
            detail,
        });
    }

    serde_json::from_slice(&bytes).map_err(|err| GatewayError::Decode(err.to_string()))
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
