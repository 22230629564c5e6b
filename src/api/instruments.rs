//! Instrument resource API.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::errors::SdkResult;
use crate::transport::HttpMethod;
use crate::types::RequestOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub name: String,
    #[serde(default)]
    pub identifiers: HashMap<String, String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentDefinition {
    pub name: String,
    pub identifiers: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertInstrumentsResponse {
    #[serde(default)]
    pub values: HashMap<String, Instrument>,
    #[serde(default)]
    pub failed: HashMap<String, serde_json::Value>,
}

pub struct InstrumentsApi {
    client: Arc<ApiClient>,
}

impl InstrumentsApi {
    pub(crate) fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Identifier values may themselves contain percent-encoded characters;
    /// the dispatcher sends them as one opaque path segment.
    pub async fn get_instrument(
        &self,
        identifier_type: &str,
        identifier: &str,
    ) -> SdkResult<Instrument> {
        let options = RequestOptions::new()
            .with_operation("GetInstrument")
            .with_path_param("identifierType", identifier_type)
            .with_path_param("identifier", identifier);
        self.client
            .execute_json(
                HttpMethod::Get,
                "/api/instruments/{identifierType}/{identifier}",
                options,
            )
            .await
    }

    pub async fn upsert_instruments(
        &self,
        requests: &HashMap<String, InstrumentDefinition>,
    ) -> SdkResult<UpsertInstrumentsResponse> {
        let options = RequestOptions::new().with_operation("UpsertInstruments");
        self.client
            .execute_json_with_body(HttpMethod::Post, "/api/instruments", options, requests)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenProvider;
    use crate::retry::RetryPolicyRegistry;
    use crate::transport::{HttpResponse, MockHttpTransport};
    use std::time::Duration;
    use url::Url;

    fn api_with(transport: Arc<MockHttpTransport>) -> InstrumentsApi {
        InstrumentsApi::new(Arc::new(ApiClient::new(
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
    async fn pre_encoded_identifier_is_sent_opaquely() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_response(HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: serde_json::json!({ "name": "Some Bond" }).to_string(),
        });
        let api = api_with(Arc::clone(&transport));

        api.get_instrument("ClientInternal", "id-%2F-1").await.unwrap();

        assert_eq!(
            transport.last_request().unwrap().url,
            "https://example.com/api/instruments/ClientInternal/id-%252F-1"
        );
    }

    #[tokio::test]
    async fn upsert_serializes_the_request_map_as_body() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_response(HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: serde_json::json!({ "values": {}, "failed": {} }).to_string(),
        });
        let api = api_with(Arc::clone(&transport));

        let mut requests = HashMap::new();
        requests.insert(
            "upsert-1".to_string(),
            InstrumentDefinition {
                name: "Some Bond".to_string(),
                identifiers: [("ClientInternal".to_string(), "id-1".to_string())]
                    .into_iter()
                    .collect(),
            },
        );
        api.upsert_instruments(&requests).await.unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.headers["Content-Type"], "application/json");
        assert!(request.body.unwrap().contains("Some Bond"));
    }
}
