//! Catalog backed by the marketplace REST API.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use excursio_catalog::{Catalog, CatalogError, ServiceDescriptor};
use excursio_core::ServiceId;

/// Reads services from `GET <api_url>/services[/<id>]`.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    api_url: String,
}

impl HttpCatalog {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    pub fn service_url(&self, id: &ServiceId) -> String {
        format!("{}/services/{}", self.api_url, id)
    }

    async fn get_json<T>(&self, url: &str) -> Result<Option<T>, CatalogError>
    where
        T: serde::de::DeserializeOwned,
    {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(CatalogError::Unavailable(format!("{status}: {body}")));
        }

        let value = resp
            .json()
            .await
            .map_err(|e| CatalogError::Malformed(e.to_string()))?;
        Ok(Some(value))
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn fetch(&self, id: &ServiceId) -> Result<ServiceDescriptor, CatalogError> {
        let url = self.service_url(id);
        debug!(%url, "fetching service");
        let service: ServiceDescriptor = self
            .get_json(&url)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;
        if &service.id != id {
            return Err(CatalogError::Malformed(format!(
                "asked for service {id}, got {}",
                service.id
            )));
        }
        Ok(service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_from_the_base() {
        let catalog = HttpCatalog::new("http://localhost:8080/");
        let id = ServiceId::new("kayak-01").unwrap();
        assert_eq!(catalog.service_url(&id), "http://localhost:8080/services/kayak-01");
    }

    fn local(url: impl Into<String>) -> HttpCatalog {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        HttpCatalog::with_client(client, url)
    }

    /// Serve one canned HTTP response on a loopback port.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status}\r\n\
                 content-type: application/json\r\n\
                 content-length: {}\r\n\
                 connection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn fetch_parses_service() {
        let url = serve_once(
            "200 OK",
            r#"{"id":"kayak-01","title":"Sunrise kayak tour",
                "unitPrice":120,"agencyName":"Blue Bay Adventures"}"#,
        )
        .await;
        let service = local(url)
            .fetch(&ServiceId::new("kayak-01").unwrap())
            .await
            .unwrap();
        assert_eq!(service.title, "Sunrise kayak tour");
        assert_eq!(service.unit_price.amount(), 120);
        assert_eq!(service.location, "");
    }

    #[tokio::test]
    async fn http_404_is_not_found() {
        let url = serve_once("404 Not Found", "{}").await;
        let id = ServiceId::new("missing").unwrap();
        let err = local(url).fetch(&id).await.unwrap_err();
        assert_eq!(err, CatalogError::NotFound(id));
    }

    #[tokio::test]
    async fn server_error_is_unavailable() {
        let url = serve_once("503 Service Unavailable", "{}").await;
        let err = local(url)
            .fetch(&ServiceId::new("kayak-01").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Unavailable(_)));
    }

    #[tokio::test]
    async fn unreachable_api_is_unavailable() {
        // Port 9 (discard) on loopback is not expected to serve HTTP.
        let catalog = local("http://127.0.0.1:9");
        let err = catalog
            .fetch(&ServiceId::new("kayak-01").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Unavailable(_)));
    }
}
