//! HTTP catalog client.

use std::time::Duration;

use async_trait::async_trait;
use cart_core::{Product, ProductId, Stock};
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::{Catalog, FetchError};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Catalog backed by a REST service.
///
/// A 404 is reported as [`FetchError::NotFound`]; any other non-2xx status
/// or transport failure is a [`FetchError`] too. There are no retries.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = base_url.into();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(FetchError::InvalidUrl(base_url));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::RequestError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        path: &str,
        id: ProductId,
    ) -> Result<T, FetchError> {
        let url = self.url(&format!("{path}/{id}"));

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        tracing::debug!(%url, status = status.as_u16(), "catalog response");
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                resource,
                id: id.get(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::HttpError {
                status: status.as_u16(),
                url,
            });
        }

        let bytes = response.bytes().await?;
        let value = serde_json::from_slice(&bytes)?;
        Ok(value)
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    #[instrument(skip(self, id), fields(product_id = %id))]
    async fn stock(&self, id: ProductId) -> Result<Stock, FetchError> {
        self.get_json("stock", "stock", id).await
    }

    #[instrument(skip(self, id), fields(product_id = %id))]
    async fn product(&self, id: ProductId) -> Result<Product, FetchError> {
        self.get_json("product", "products", id).await
    }
}
