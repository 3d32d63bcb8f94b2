use crate::domain::model::RecordPage;
use crate::domain::ports::SearchSource;
use crate::domain::query::SearchRequest;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

pub const DEFAULT_SEARCH_URL: &str = "https://api.crunchbase.com/v4/data/searches/organizations";

/// 以 HTTP POST 呼叫搜尋 API；任何非 2xx 回應都直接視為失敗
pub struct HttpSearchSource {
    client: Client,
    endpoint: Url,
}

impl HttpSearchSource {
    /// API key 以 `user_key` query 參數附加在端點上
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let endpoint = Url::parse_with_params(base_url, &[("user_key", api_key)]).map_err(|e| {
            EtlError::InvalidConfigValueError {
                field: "endpoint".to_string(),
                value: base_url.to_string(),
                reason: format!("Invalid URL format: {}", e),
            }
        })?;

        Ok(Self {
            client: Client::new(),
            endpoint,
        })
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SearchSource for HttpSearchSource {
    async fn fetch_page(&self, request: &SearchRequest) -> Result<RecordPage> {
        tracing::debug!(
            "📡 POST {} (after_id: {:?})",
            self.endpoint.path(),
            request.after_id
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("📡 API response status: {}", status);

        if !status.is_success() {
            let request_body = serde_json::to_string_pretty(request)?;
            let response_body = response.text().await.unwrap_or_default();

            eprintln!(
                "\n--- HTTP {} ---\nRequest body:\n{}\nResponse text:\n{}\n",
                status.as_u16(),
                request_body,
                response_body
            );
            tracing::error!("❌ Search request failed with status: {}", status);

            return Err(EtlError::HttpStatus {
                status: status.as_u16(),
                request_body,
                response_body,
            });
        }

        let page: RecordPage = response.json().await?;
        tracing::debug!("📡 Received {} entities", page.entities.len());
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::SearchQuery;
    use httpmock::prelude::*;

    fn query() -> SearchQuery {
        SearchQuery::founded_between(
            &["identifier"],
            "2024-01-01",
            "2024-12-31",
            &["company".to_string()],
            2,
        )
    }

    #[test]
    fn test_endpoint_carries_api_key() {
        let source = HttpSearchSource::new(DEFAULT_SEARCH_URL, "secret").unwrap();
        assert_eq!(source.endpoint().query(), Some("user_key=secret"));
    }

    #[test]
    fn test_invalid_endpoint_is_config_error() {
        assert!(matches!(
            HttpSearchSource::new("not a url", "k"),
            Err(EtlError::InvalidConfigValueError { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_page_posts_body() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/search")
                .query_param("user_key", "k")
                .json_body_partial(r#"{"limit": 2, "after_id": "x"}"#);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"count": 1, "entities": [{"uuid": "1"}]}));
        });

        let source = HttpSearchSource::new(&server.url("/search"), "k").unwrap();
        let page = source
            .fetch_page(&query().page(Some("x".to_string())))
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(page.entities.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_page_surfaces_http_failure() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/search");
            then.status(400).body("bad field_ids");
        });

        let source = HttpSearchSource::new(&server.url("/search"), "k").unwrap();
        let err = source.fetch_page(&query().page(None)).await.unwrap_err();

        api_mock.assert();
        match err {
            EtlError::HttpStatus {
                status,
                request_body,
                response_body,
            } => {
                assert_eq!(status, 400);
                assert!(request_body.contains("\"limit\": 2"));
                assert_eq!(response_body, "bad field_ids");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
