//! GraphQL client implementation

use crate::error::GraphQLError;
use crate::types::{GraphQLRequest, GraphQLResponse};
use crate::ws::{self, SubscriptionStream};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Header carrying the API key on HTTP requests and in `connection_init`
pub const API_KEY_HEADER: &str = "x-api-key";

/// GraphQL client
///
/// Queries and mutations are sent as HTTP POST requests; subscriptions
/// open one WebSocket connection each.
#[derive(Clone, Debug)]
pub struct GraphQLClient {
    client: Client,
    endpoint: String,
    ws_endpoint: String,
    api_key: Option<String>,
}

impl GraphQLClient {
    /// Create a client for `endpoint`
    ///
    /// The subscription endpoint defaults to the same URL with the scheme
    /// swapped (`http` → `ws`, `https` → `wss`).
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let ws_endpoint = websocket_url(&endpoint);
        Self {
            client: Client::new(),
            endpoint,
            ws_endpoint,
            api_key: None,
        }
    }

    /// Use a different URL for subscriptions
    #[must_use]
    pub fn with_ws_endpoint(mut self, ws_endpoint: impl Into<String>) -> Self {
        self.ws_endpoint = ws_endpoint.into();
        self
    }

    /// Authenticate with an API key
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// HTTP endpoint
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Subscription endpoint
    #[must_use]
    pub fn ws_endpoint(&self) -> &str {
        &self.ws_endpoint
    }

    /// Execute a query or mutation and decode its `data`
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, non-success statuses, GraphQL
    /// `errors` in the response, or undecodable payloads.
    #[tracing::instrument(skip(self, query, variables), fields(endpoint = %self.endpoint))]
    pub async fn execute<V, T>(&self, query: &str, variables: Option<V>) -> Result<T, GraphQLError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(&GraphQLRequest { query, variables });
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GraphQLError::RequestFailed(e.to_string()))?;

        match response.status() {
            StatusCode::OK => response
                .json::<GraphQLResponse<T>>()
                .await
                .map_err(|e| GraphQLError::ResponseParseFailed(e.to_string()))?
                .into_result(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(GraphQLError::Unauthorized),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(GraphQLError::Http {
                    status: status.as_u16(),
                    message: body,
                })
            },
        }
    }

    /// Start a subscription
    ///
    /// Resolves once the server acknowledged the connection and the
    /// subscription was sent. Each item of the stream is the decoded `data`
    /// of one event. Dropping the stream closes the connection.
    ///
    /// # Errors
    ///
    /// Returns errors if the connection cannot be opened or the server
    /// does not acknowledge it.
    #[tracing::instrument(skip(self, query, variables), fields(endpoint = %self.ws_endpoint))]
    pub async fn subscribe<V, T>(
        &self,
        query: &str,
        variables: Option<V>,
    ) -> Result<SubscriptionStream<T>, GraphQLError>
    where
        V: Serialize,
        T: DeserializeOwned + Send + 'static,
    {
        let variables = variables
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| GraphQLError::Protocol(e.to_string()))?;
        let connection_params = self
            .api_key
            .as_ref()
            .map(|key| serde_json::json!({ API_KEY_HEADER: key }));

        ws::subscribe(&self.ws_endpoint, connection_params, query, variables).await
    }
}

fn websocket_url(endpoint: &str) -> String {
    if let Some(rest) = endpoint.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = endpoint.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        endpoint.to_string()
    }
}
