use std::time::Duration;

use crate::{
    config::Credentials,
    error::{AppError, AppResult},
    models::{ApiContainer, ApiEnvelope},
};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport abstraction over the catalog server's HTTP interface
///
/// One GET against the configured base URL with query parameters and the
/// authentication token. Kept behind a trait so the fetch layer is testable
/// without a live server.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogTransport: Send + Sync {
    async fn get(
        &self,
        credentials: &Credentials,
        path: &str,
        params: &[(String, String)],
    ) -> AppResult<ApiContainer>;
}

/// Production transport over reqwest
///
/// The client carries a default timeout; the core's own logic imposes none
/// and relies on this bound for every upstream call.
pub struct HttpTransport {
    http_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(AppError::HttpClient)?;

        Ok(Self { http_client })
    }
}

#[async_trait::async_trait]
impl CatalogTransport for HttpTransport {
    async fn get(
        &self,
        credentials: &Credentials,
        path: &str,
        params: &[(String, String)],
    ) -> AppResult<ApiContainer> {
        let url = format!(
            "{}/{}",
            credentials.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        let response = self
            .http_client
            .get(&url)
            .query(params)
            .query(&[("X-Plex-Token", credentials.token.as_str())])
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Catalog server returned status {} for {}: {}",
                status, path, body
            )));
        }

        let envelope: ApiEnvelope = response.json().await?;
        Ok(envelope.container)
    }
}
