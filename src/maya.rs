use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

use crate::domain::{InstrumentId, InstrumentKind};
use crate::error::CatalogError;

/// Source of raw per-instrument detail payloads.
pub trait DetailsApi {
    /// `Ok(None)` when the endpoint answers 404 for this id.
    fn details(&self, kind: InstrumentKind, id: &InstrumentId)
    -> Result<Option<Value>, CatalogError>;
}

#[derive(Clone)]
pub struct MayaHttpClient {
    client: Client,
    base_url: String,
}

impl MayaHttpClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("fund-catalog/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| CatalogError::EndpointHttp(err.to_string()))?,
        );
        // Rejected without it.
        headers.insert("X-Maya-With", HeaderValue::from_static("true"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|err| CatalogError::EndpointHttp(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn details_url(&self, kind: InstrumentKind) -> String {
        format!("{}/api/{}/details", self.base_url, kind)
    }
}

impl DetailsApi for MayaHttpClient {
    fn details(
        &self,
        kind: InstrumentKind,
        id: &InstrumentId,
    ) -> Result<Option<Value>, CatalogError> {
        let response = self
            .client
            .get(self.details_url(kind))
            .query(&[("fundId", id.as_str())])
            .send()
            .map_err(|err| CatalogError::EndpointHttp(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| format!("{kind} details request failed"));
            return Err(CatalogError::EndpointStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response
            .json()
            .map_err(|err| CatalogError::EndpointHttp(err.to_string()))?;
        Ok(Some(body))
    }
}
