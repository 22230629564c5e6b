//! Portfolio resource API.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::errors::SdkResult;
use crate::transport::HttpMethod;
use crate::types::RequestOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub scope: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: ResourceId,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub base_currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedPortfolios {
    pub values: Vec<Portfolio>,
    #[serde(default)]
    pub next_page: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedEntityResponse {
    #[serde(default)]
    pub as_at: Option<String>,
}

pub struct PortfoliosApi {
    client: Arc<ApiClient>,
}

impl PortfoliosApi {
    pub(crate) fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn get_portfolio(&self, scope: &str, code: &str) -> SdkResult<Portfolio> {
        let options = RequestOptions::new()
            .with_operation("GetPortfolio")
            .with_path_param("scope", scope)
            .with_path_param("code", code);
        self.client
            .execute_json(HttpMethod::Get, "/api/portfolios/{scope}/{code}", options)
            .await
    }

    pub async fn list_portfolios(
        &self,
        scope: &str,
        limit: Option<u32>,
    ) -> SdkResult<PagedPortfolios> {
        let mut options = RequestOptions::new()
            .with_operation("ListPortfolios")
            .with_path_param("scope", scope);
        if let Some(limit) = limit {
            options = options.with_query_param("limit", limit.to_string());
        }
        self.client
            .execute_json(HttpMethod::Get, "/api/portfolios/{scope}", options)
            .await
    }

    pub async fn delete_portfolio(
        &self,
        scope: &str,
        code: &str,
    ) -> SdkResult<DeletedEntityResponse> {
        let options = RequestOptions::new()
            .with_operation("DeletePortfolio")
            .with_path_param("scope", scope)
            .with_path_param("code", code);
        self.client
            .execute_json(HttpMethod::Delete, "/api/portfolios/{scope}/{code}", options)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenProvider;
    use crate::retry::RetryPolicyRegistry;
    use crate::transport::{HttpResponse, MockHttpTransport};
    use std::collections::HashMap;
    use std::time::Duration;
    use url::Url;

    fn api_with(transport: Arc<MockHttpTransport>) -> PortfoliosApi {
        PortfoliosApi::new(Arc::new(ApiClient::new(
            Url::parse("https://example.com").unwrap(),
            Duration::from_secs(10),
            None,
            HashMap::new(),
            None,
            transport,
            Arc::new(StaticTokenProvider::new("pat")),
            Arc::new(RetryPolicyRegistry::new()),
        )))
    }

    #[tokio::test]
    async fn get_portfolio_builds_the_expected_request() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_response(HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: serde_json::json!({
                "id": {"scope": "Main", "code": "uk-equity"},
                "displayName": "UK Equity"
            })
            .to_string(),
        });
        let api = api_with(Arc::clone(&transport));

        let portfolio = api.get_portfolio("Main", "uk-equity").await.unwrap();

        assert_eq!(portfolio.id.code, "uk-equity");
        assert_eq!(portfolio.display_name, "UK Equity");
        let request = transport.last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(
            request.url,
            "https://example.com/api/portfolios/Main/uk-equity"
        );
    }

    #[tokio::test]
    async fn list_portfolios_passes_limit_as_query() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_response(HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: serde_json::json!({ "values": [] }).to_string(),
        });
        let api = api_with(Arc::clone(&transport));

        let page = api.list_portfolios("Main", Some(10)).await.unwrap();

        assert!(page.values.is_empty());
        assert!(transport.last_request().unwrap().url.ends_with("?limit=10"));
    }
}
