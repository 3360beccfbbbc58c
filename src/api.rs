//! HTTP/JSON client for the WBIDS backend.

use std::future::Future;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::error::{DashboardError, Endpoint};
use crate::models::domain::{MonitoringAck, SystemStatus, ThreatAlert};
use crate::models::dto::{AlertDto, MonitoringAckDto, StatusDto};

/// The four operations the dashboard needs from a backend.
///
/// Implemented by [`ApiClient`] for the real service and by
/// [`crate::mock::MockBackend`] for self-contained mode.
pub trait Backend: Send + Sync + 'static {
    fn get_status(&self) -> impl Future<Output = Result<SystemStatus, DashboardError>> + Send;

    fn get_alerts(&self) -> impl Future<Output = Result<Vec<ThreatAlert>, DashboardError>> + Send;

    fn start_monitoring(
        &self,
    ) -> impl Future<Output = Result<MonitoringAck, DashboardError>> + Send;

    fn stop_monitoring(&self)
        -> impl Future<Output = Result<MonitoringAck, DashboardError>> + Send;
}

/// Thin reqwest wrapper. No retries, no timeouts, no auth headers.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base: Url) -> Self {
        Self {
            http: Client::new(),
            base,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url, DashboardError> {
        self.base
            .join(endpoint.path())
            .map_err(|e| DashboardError::Config(format!("cannot build {endpoint} url: {e}")))
    }

    async fn get<D: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<D, DashboardError> {
        let url = self.endpoint_url(endpoint)?;
        tracing::debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| DashboardError::request_failed(endpoint, e))?;
        decode(endpoint, response).await
    }

    async fn post<D: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<D, DashboardError> {
        let url = self.endpoint_url(endpoint)?;
        tracing::debug!(%url, "POST");
        let response = self
            .http
            .post(url)
            .send()
            .await
            .map_err(|e| DashboardError::request_failed(endpoint, e))?;
        decode(endpoint, response).await
    }
}

async fn decode<D: DeserializeOwned>(
    endpoint: Endpoint,
    response: Response,
) -> Result<D, DashboardError> {
    let response = response
        .error_for_status()
        .map_err(|e| DashboardError::request_failed(endpoint, e))?;
    response
        .json::<D>()
        .await
        .map_err(|e| DashboardError::request_failed(endpoint, e))
}

impl Backend for ApiClient {
    async fn get_status(&self) -> Result<SystemStatus, DashboardError> {
        let dto: StatusDto = self.get(Endpoint::Status).await?;
        Ok(dto.into())
    }

    async fn get_alerts(&self) -> Result<Vec<ThreatAlert>, DashboardError> {
        let dtos: Vec<AlertDto> = self.get(Endpoint::Alerts).await?;
        Ok(dtos.into_iter().map(ThreatAlert::from).collect())
    }

    async fn start_monitoring(&self) -> Result<MonitoringAck, DashboardError> {
        let dto: MonitoringAckDto = self.post(Endpoint::StartMonitoring).await?;
        Ok(dto.into())
    }

    async fn stop_monitoring(&self) -> Result<MonitoringAck, DashboardError> {
        let dto: MonitoringAckDto = self.post(Endpoint::StopMonitoring).await?;
        Ok(dto.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_api_url;

    #[test]
    fn test_endpoint_urls_join_onto_base() {
        let client = ApiClient::new(parse_api_url("http://localhost:5000").unwrap());
        assert_eq!(
            client.endpoint_url(Endpoint::Status).unwrap().as_str(),
            "http://localhost:5000/api/status"
        );
        assert_eq!(
            client
                .endpoint_url(Endpoint::StopMonitoring)
                .unwrap()
                .as_str(),
            "http://localhost:5000/api/stop_monitoring"
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_request_failure() {
        // Port 9 (discard) on loopback is closed on test hosts.
        let client = ApiClient::new(parse_api_url("http://127.0.0.1:9").unwrap());
        let err = client.get_status().await.unwrap_err();
        assert_eq!(err.kind(), "RequestFailed");
        assert_eq!(err.endpoint(), Some(Endpoint::Status));
    }
}
