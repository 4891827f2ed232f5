//! HTTP client wrapper for the object store.

use crate::blobstore::types::{AccessHandle, BlobStoreError};
use crate::config::Config;
use reqwest::{Client, Method, StatusCode, header::CONTENT_TYPE};
use sha2::{Digest, Sha256};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

/// Lightweight HTTP client for object store operations.
pub struct BlobStoreService {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) container: String,
    pub(crate) account_key: String,
}

impl BlobStoreService {
    /// Construct a new client from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self, BlobStoreError> {
        let client = Client::builder().user_agent("docsum/0.1").build()?;
        let base_url =
            normalize_base_url(&config.blob_endpoint).map_err(BlobStoreError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            container = %config.blob_container,
            "Initialized object store HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            container: config.blob_container.clone(),
            account_key: config.blob_account_key.clone(),
        })
    }

    /// Create the container when it is missing; an existing container is success.
    pub async fn ensure_container(&self) -> Result<(), BlobStoreError> {
        let response = self
            .request(Method::PUT, &format!("{}?restype=container", self.container))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                tracing::debug!(container = %self.container, "Container created");
                Ok(())
            }
            StatusCode::CONFLICT => {
                tracing::debug!(container = %self.container, "Container already exists");
                Ok(())
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                let error = BlobStoreError::UnexpectedStatus { status, body };
                tracing::error!(container = %self.container, error = %error, "Failed to ensure container");
                Err(error)
            }
        }
    }

    /// Upload document bytes under the given name, overwriting any prior object.
    pub async fn upload_document(&self, name: &str, bytes: Vec<u8>) -> Result<(), BlobStoreError> {
        let size = bytes.len();
        let response = self
            .request(Method::PUT, &format!("{}/{}", self.container, name))
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await?;

        self.ensure_success(response, || {
            tracing::debug!(container = %self.container, object = name, bytes = size, "Object uploaded");
        })
        .await
    }

    /// Derive a read-only URL for the object, valid for `ttl_minutes` from now.
    ///
    /// This is a local computation; nothing is sent to the store. The signature
    /// binds the container, object name, expiry, and the `r` (read) permission
    /// to the account key, so the store can verify the grant without a lookup.
    pub fn generate_read_handle(
        &self,
        name: &str,
        ttl_minutes: i64,
    ) -> Result<AccessHandle, BlobStoreError> {
        let expires_at = OffsetDateTime::now_utc() + Duration::minutes(ttl_minutes);
        let expiry = expires_at.format(&Rfc3339)?;
        let signature = sign_read_grant(&self.account_key, &self.container, name, &expiry);
        let url = format!(
            "{}/{}/{}?se={}&sig={}",
            self.base_url.trim_end_matches('/'),
            self.container,
            name,
            expiry,
            signature
        );

        Ok(AccessHandle { url, expires_at })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        self.client
            .request(method, url)
            .header("api-key", &self.account_key)
    }

    async fn ensure_success<F>(
        &self,
        response: reqwest::Response,
        on_success: F,
    ) -> Result<(), BlobStoreError>
    where
        F: FnOnce(),
    {
        if response.status().is_success() {
            on_success();
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = BlobStoreError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Object store request failed");
            Err(error)
        }
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

fn sign_read_grant(account_key: &str, container: &str, object: &str, expiry: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(account_key.as_bytes());
    hasher.update(b"\n");
    hasher.update(container.as_bytes());
    hasher.update(b"\n");
    hasher.update(object.as_bytes());
    hasher.update(b"\n");
    hasher.update(expiry.as_bytes());
    hasher.update(b"\nr");
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::PUT, MockServer};

    fn service(base_url: String) -> BlobStoreService {
        BlobStoreService {
            client: Client::builder()
                .user_agent("docsum-test")
                .build()
                .expect("client"),
            base_url,
            container: "documents".into(),
            account_key: "secret-key".into(),
        }
    }

    #[tokio::test]
    async fn ensure_container_creates_when_missing() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/documents")
                    .query_param("restype", "container");
                then.status(201);
            })
            .await;

        let service = service(server.base_url());
        service.ensure_container().await.expect("container ensured");
        mock.assert();
    }

    #[tokio::test]
    async fn ensure_container_tolerates_existing_container() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/documents")
                    .query_param("restype", "container");
                then.status(409).body("ContainerAlreadyExists");
            })
            .await;

        let service = service(server.base_url());
        service.ensure_container().await.expect("conflict is success");
        mock.assert();
    }

    #[tokio::test]
    async fn upload_overwrites_object_under_its_name() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/documents/report.pdf")
                    .header("api-key", "secret-key")
                    .body("raw bytes");
                then.status(201);
            })
            .await;

        let service = service(server.base_url());
        service
            .upload_document("report.pdf", b"raw bytes".to_vec())
            .await
            .expect("upload");
        mock.assert();
    }

    #[tokio::test]
    async fn upload_surfaces_backend_status_and_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/documents/report.pdf");
                then.status(507).body("OutOfCapacity");
            })
            .await;

        let service = service(server.base_url());
        let error = service
            .upload_document("report.pdf", b"raw bytes".to_vec())
            .await
            .expect_err("507 must fail");
        match error {
            BlobStoreError::UnexpectedStatus { status, body } => {
                assert_eq!(status.as_u16(), 507);
                assert_eq!(body, "OutOfCapacity");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn read_handle_expires_ten_minutes_out() {
        let service = service("http://127.0.0.1:10000".into());
        let handle = service
            .generate_read_handle("report.pdf", 10)
            .expect("handle");

        let remaining = handle.expires_at - OffsetDateTime::now_utc();
        assert!(remaining <= Duration::minutes(10));
        assert!(remaining > Duration::minutes(9));
        assert!(handle.url.starts_with("http://127.0.0.1:10000/documents/report.pdf?se="));
        assert!(handle.url.contains("&sig="));
    }

    #[test]
    fn read_handle_signature_is_stable_for_same_inputs() {
        let first = sign_read_grant("secret-key", "documents", "report.pdf", "2026-01-01T00:00:00Z");
        let second = sign_read_grant("secret-key", "documents", "report.pdf", "2026-01-01T00:00:00Z");
        let other_key = sign_read_grant("other-key", "documents", "report.pdf", "2026-01-01T00:00:00Z");

        assert_eq!(first, second);
        assert_ne!(first, other_key);
        assert_eq!(first.len(), 64);
    }
}
