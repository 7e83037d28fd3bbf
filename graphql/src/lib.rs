//! # Tasksync GraphQL Client
//!
//! Small GraphQL client used by tasksync stores to reach their remote data
//! service.
//!
//! ## Example
//!
//! ```no_run
//! use tasksync_graphql::GraphQLClient;
//!
//! #[derive(serde::Deserialize)]
//! struct Ping {
//!     ping: String,
//! }
//!
//! # async fn example() -> Result<(), tasksync_graphql::GraphQLError> {
//! let client = GraphQLClient::new("http://localhost:4000/graphql");
//! let data: Ping = client.execute::<(), _>("query { ping }", None).await?;
//! println!("{}", data.ping);
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - Queries and mutations over HTTP POST
//! - Subscriptions over WebSocket (`graphql-transport-ws`)
//! - Optional `x-api-key` authentication

pub mod client;
pub mod error;
pub mod types;
pub mod ws;

// Re-export main types for convenience
pub use client::{API_KEY_HEADER, GraphQLClient};
pub use error::GraphQLError;
pub use types::{GraphQLErrorEntry, GraphQLRequest, GraphQLResponse};
pub use ws::{SUBPROTOCOL, SubscriptionStream};
