//! Error types for the GraphQL client

use crate::types::GraphQLErrorEntry;
use thiserror::Error;

/// Errors that can occur when talking to a GraphQL service
#[derive(Debug, Error)]
pub enum GraphQLError {
    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response parsing failed
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// Unauthorized - missing or invalid API key
    #[error("Unauthorized - missing or invalid API key")]
    Unauthorized,

    /// Service answered with a non-success HTTP status
    #[error("HTTP error (status {status}): {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Service answered with a GraphQL `errors` array
    #[error("GraphQL error: {}", join_messages(.0))]
    Response(Vec<GraphQLErrorEntry>),

    /// Response carried neither data nor errors
    #[error("GraphQL response contained no data")]
    MissingData,

    /// WebSocket transport failed
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Server broke the `graphql-transport-ws` protocol
    #[error("Subscription protocol error: {0}")]
    Protocol(String),
}

fn join_messages(errors: &[GraphQLErrorEntry]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<tokio_tungstenite::tungstenite::Error> for GraphQLError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_error_joins_messages() {
        let error = GraphQLError::Response(vec![
            GraphQLErrorEntry::new("Not Authorized"),
            GraphQLErrorEntry::new("Field 'x' missing"),
        ]);
        assert_eq!(
            error.to_string(),
            "GraphQL error: Not Authorized; Field 'x' missing"
        );
    }
}
