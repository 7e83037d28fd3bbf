//! Configuration management for the todo client.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::reducer::SyncOptions;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tasksync_graphql::GraphQLClient;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoConfig {
    /// Remote service configuration
    pub graphql: GraphQLConfig,
    /// Store behavior
    pub sync: SyncOptions,
    /// How long facade calls wait for the service's answer, in seconds
    pub response_timeout_secs: u64,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
}

/// Remote service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQLConfig {
    /// HTTP endpoint for queries and mutations
    pub url: String,
    /// WebSocket endpoint for subscriptions (derived from `url` when unset)
    pub ws_url: Option<String>,
    /// API key sent as `x-api-key`
    pub api_key: Option<String>,
}

impl TodoConfig {
    /// Load configuration from environment variables.
    ///
    /// Falls back to defaults for anything unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str, default: bool| {
            var(key)
                .and_then(|v| v.trim().to_ascii_lowercase().parse().ok())
                .unwrap_or(default)
        };

        Self {
            graphql: GraphQLConfig {
                url: var("TODO_GRAPHQL_URL")
                    .unwrap_or_else(|| "http://localhost:4000/graphql".to_string()),
                ws_url: var("TODO_GRAPHQL_WS_URL"),
                api_key: var("TODO_API_KEY").filter(|key| !key.is_empty()),
            },
            sync: SyncOptions {
                include_update_channel: flag("TODO_INCLUDE_UPDATE_CHANNEL", true),
                confirm_deletion: flag("TODO_CONFIRM_DELETION", false),
            },
            response_timeout_secs: var("TODO_RESPONSE_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            log_level: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        }
    }

    /// Response timeout as a [`Duration`]
    #[must_use]
    pub const fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_secs)
    }

    /// Build a client for the configured service
    #[must_use]
    pub fn graphql_client(&self) -> GraphQLClient {
        let mut client = GraphQLClient::new(&self.graphql.url);
        if let Some(ws_url) = &self.graphql.ws_url {
            client = client.with_ws_endpoint(ws_url);
        }
        if let Some(api_key) = &self.graphql.api_key {
            client = client.with_api_key(api_key);
        }
        client
    }
}
