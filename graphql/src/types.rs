//! Wire types for GraphQL over HTTP

use serde::{Deserialize, Serialize};

/// A GraphQL request body
#[derive(Debug, Clone, Serialize)]
pub struct GraphQLRequest<'a, V> {
    /// Operation document
    pub query: &'a str,
    /// Operation variables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<V>,
}

/// A GraphQL response body
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLResponse<T> {
    /// Operation result
    pub data: Option<T>,
    /// Errors reported by the service
    #[serde(default)]
    pub errors: Vec<GraphQLErrorEntry>,
}

impl<T> GraphQLResponse<T> {
    /// Turn the response into its data, or the reported errors
    ///
    /// # Errors
    ///
    /// Returns [`crate::GraphQLError::Response`] when the service reported
    /// errors and [`crate::GraphQLError::MissingData`] when it reported nothing.
    pub fn into_result(self) -> Result<T, crate::GraphQLError> {
        if !self.errors.is_empty() {
            return Err(crate::GraphQLError::Response(self.errors));
        }
        self.data.ok_or(crate::GraphQLError::MissingData)
    }
}

/// One entry of a GraphQL `errors` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQLErrorEntry {
    /// Human readable message
    pub message: String,
    /// Service specific classification (e.g. `Unauthorized`)
    #[serde(default, rename = "errorType", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl GraphQLErrorEntry {
    /// Entry with only a message
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_type: None,
        }
    }
}
