//! HTTP client wrapper for the search backend.

use crate::config::Config;
use crate::search::types::{ListIndexesResponse, QueryResponse, SearchError, SearchRecord};
use reqwest::{Client, Method};
use serde_json::{Map, Value, json};

/// Lightweight HTTP client for search index operations.
///
/// The endpoint, index name, and API key are kept optional and validated on
/// every call in that order, so a missing setting fails fast with an error
/// naming it, before any request leaves the process.
pub struct SearchIndexService {
    pub(crate) client: Client,
    pub(crate) endpoint: Option<String>,
    pub(crate) api_key: Option<String>,
    pub(crate) index_name: Option<String>,
}

/// Validated connection settings for one search call.
struct Target<'a> {
    endpoint: &'a str,
    index_name: &'a str,
    api_key: &'a str,
}

impl SearchIndexService {
    /// Construct a new client from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self, SearchError> {
        let client = Client::builder().user_agent("docsum/0.1").build()?;
        Ok(Self {
            client,
            endpoint: config.search_endpoint.clone(),
            api_key: config.search_api_key.clone(),
            index_name: config.search_index_name.clone(),
        })
    }

    /// Retrieve the names of all indexes present at the endpoint.
    pub async fn list_index_names(&self) -> Result<Vec<String>, SearchError> {
        let target = self.target()?;
        let response = self
            .request(&target, Method::GET, "indexes")
            .send()
            .await?;

        if response.status().is_success() {
            let payload: ListIndexesResponse = response.json().await?;
            Ok(payload.value.into_iter().map(|index| index.name).collect())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = SearchError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Failed to list indexes");
            Err(error)
        }
    }

    /// Ensure the configured index exists with the summary schema.
    ///
    /// Enumerate-then-create is not atomic: two concurrent callers can both
    /// observe the index absent and both issue the PUT. Creation is a
    /// create-or-update with an identical definition, so the race converges
    /// on the same schema.
    pub async fn ensure_index(&self) -> Result<(), SearchError> {
        let target = self.target()?;
        let names = self.list_index_names().await?;
        if names.iter().any(|name| name == target.index_name) {
            tracing::debug!(index = target.index_name, "Index already provisioned");
            return Ok(());
        }

        let definition = index_definition(target.index_name);
        let response = self
            .request(
                &target,
                Method::PUT,
                &format!("indexes/{}", target.index_name),
            )
            .json(&definition)
            .send()
            .await?;

        self.ensure_success(response, || {
            tracing::info!(index = target.index_name, "Index created");
        })
        .await
    }

    /// Upload one summary record as a new document in the index.
    pub async fn upload_record(&self, record: &SearchRecord) -> Result<(), SearchError> {
        let target = self.target()?;
        let response = self
            .request(
                &target,
                Method::POST,
                &format!("indexes/{}/docs/index", target.index_name),
            )
            .json(&json!({ "value": [record] }))
            .send()
            .await?;

        self.ensure_success(response, || {
            tracing::debug!(index = target.index_name, record = %record.id, "Record uploaded");
        })
        .await
    }

    /// Execute a free-text query, returning raw records in backend ranking order.
    pub async fn query(&self, text: &str) -> Result<Vec<Map<String, Value>>, SearchError> {
        let target = self.target()?;
        let response = self
            .request(
                &target,
                Method::POST,
                &format!("indexes/{}/docs/search", target.index_name),
            )
            .json(&json!({ "search": text }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = SearchError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Search query failed");
            return Err(error);
        }

        let payload: QueryResponse = response.json().await.map_err(SearchError::Decode)?;
        Ok(payload.value)
    }

    fn target(&self) -> Result<Target<'_>, SearchError> {
        let endpoint = present(&self.endpoint).ok_or(SearchError::MissingEndpoint)?;
        let index_name = present(&self.index_name).ok_or(SearchError::MissingIndexName)?;
        let api_key = present(&self.api_key).ok_or(SearchError::MissingApiKey)?;
        Ok(Target {
            endpoint,
            index_name,
            api_key,
        })
    }

    fn request(&self, target: &Target<'_>, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", target.endpoint.trim_end_matches('/'), path);
        self.client
            .request(method, url)
            .header("api-key", target.api_key)
    }

    async fn ensure_success<F>(
        &self,
        response: reqwest::Response,
        on_success: F,
    ) -> Result<(), SearchError>
    where
        F: FnOnce(),
    {
        if response.status().is_success() {
            on_success();
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = SearchError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Search backend request failed");
            Err(error)
        }
    }
}

/// Schema definition uploaded on the creation path: an `id` key field and a
/// searchable, filterable, sortable `content` field with the English analyzer.
fn index_definition(name: &str) -> Value {
    json!({
        "name": name,
        "fields": [
            {
                "name": "id",
                "type": "string",
                "key": true
            },
            {
                "name": "content",
                "type": "string",
                "searchable": true,
                "filterable": true,
                "sortable": true,
                "analyzer": "en.lucene"
            }
        ]
    })
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, Method::POST, Method::PUT, MockServer};

    fn service(endpoint: Option<String>) -> SearchIndexService {
        SearchIndexService {
            client: Client::builder()
                .user_agent("docsum-test")
                .build()
                .expect("client"),
            endpoint,
            api_key: Some("search-key".into()),
            index_name: Some("summaries".into()),
        }
    }

    #[tokio::test]
    async fn ensure_index_is_a_noop_when_name_is_listed() {
        let server = MockServer::start_async().await;
        let list = server
            .mock_async(|when, then| {
                when.method(GET).path("/indexes").header("api-key", "search-key");
                then.status(200).json_body(json!({
                    "value": [ { "name": "summaries" }, { "name": "other" } ]
                }));
            })
            .await;
        let create = server
            .mock_async(|when, then| {
                when.method(PUT).path("/indexes/summaries");
                then.status(200);
            })
            .await;

        let service = service(Some(server.base_url()));
        service.ensure_index().await.expect("ensure");

        list.assert();
        create.assert_hits(0);
    }

    #[tokio::test]
    async fn ensure_index_creates_the_two_field_schema_when_absent() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/indexes");
                then.status(200).json_body(json!({ "value": [] }));
            })
            .await;
        let create = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/indexes/summaries")
                    .json_body(json!({
                        "name": "summaries",
                        "fields": [
                            { "name": "id", "type": "string", "key": true },
                            {
                                "name": "content",
                                "type": "string",
                                "searchable": true,
                                "filterable": true,
                                "sortable": true,
                                "analyzer": "en.lucene"
                            }
                        ]
                    }));
                then.status(201);
            })
            .await;

        let service = service(Some(server.base_url()));
        service.ensure_index().await.expect("ensure");
        create.assert();
    }

    #[tokio::test]
    async fn upload_wraps_the_record_in_a_value_envelope() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/indexes/summaries/docs/index")
                    .json_body(json!({
                        "value": [
                            { "id": "0e3e8f0a-6f32-4d4e-9c53-0d6ad8e2f101", "content": "Revenue grew 10% in Q3." }
                        ]
                    }));
                then.status(200);
            })
            .await;

        let service = service(Some(server.base_url()));
        let record = SearchRecord {
            id: "0e3e8f0a-6f32-4d4e-9c53-0d6ad8e2f101".into(),
            content: "Revenue grew 10% in Q3.".into(),
        };
        service.upload_record(&record).await.expect("upload");
        mock.assert();
    }

    #[tokio::test]
    async fn query_returns_records_in_backend_order() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/indexes/summaries/docs/search")
                    .json_body(json!({ "search": "revenue" }));
                then.status(200).json_body(json!({
                    "value": [
                        { "id": "a", "content": "Revenue grew 10% in Q3." },
                        { "id": "b", "content": "Costs were flat." }
                    ]
                }));
            })
            .await;

        let service = service(Some(server.base_url()));
        let records = service.query("revenue").await.expect("query");

        mock.assert();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["content"], Value::String("Revenue grew 10% in Q3.".into()));
        assert_eq!(records[1]["id"], Value::String("b".into()));
    }

    #[tokio::test]
    async fn query_failure_carries_the_status_code() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/indexes/summaries/docs/search");
                then.status(503).body("backend down");
            })
            .await;

        let service = service(Some(server.base_url()));
        let error = service.query("revenue").await.expect_err("503 must fail");
        match error {
            SearchError::UnexpectedStatus { status, .. } => assert_eq!(status.as_u16(), 503),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_settings_fail_before_any_request() {
        let no_endpoint = SearchIndexService {
            client: Client::new(),
            endpoint: None,
            api_key: Some("search-key".into()),
            index_name: Some("summaries".into()),
        };
        assert!(matches!(
            no_endpoint.query("q").await,
            Err(SearchError::MissingEndpoint)
        ));

        let no_index = SearchIndexService {
            client: Client::new(),
            endpoint: Some("http://127.0.0.1:1".into()),
            api_key: Some("search-key".into()),
            index_name: Some("  ".into()),
        };
        assert!(matches!(
            no_index.query("q").await,
            Err(SearchError::MissingIndexName)
        ));

        let no_key = SearchIndexService {
            client: Client::new(),
            endpoint: Some("http://127.0.0.1:1".into()),
            api_key: None,
            index_name: Some("summaries".into()),
        };
        assert!(matches!(
            no_key.query("q").await,
            Err(SearchError::MissingApiKey)
        ));
    }
}
