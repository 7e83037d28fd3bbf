//! Subscriptions over WebSocket using the `graphql-transport-ws` subprotocol.
//!
//! One connection carries exactly one subscription. The returned stream owns
//! the socket, so dropping the stream closes the connection.

use crate::error::GraphQLError;
use crate::types::{GraphQLErrorEntry, GraphQLResponse};
use async_stream::stream;
use futures::{SinkExt, Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// WebSocket subprotocol spoken by the client
pub const SUBPROTOCOL: &str = "graphql-transport-ws";

/// Stream of subscription events
pub type SubscriptionStream<T> = Pin<Box<dyn Stream<Item = Result<T, GraphQLError>> + Send>>;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Messages sent by the client
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage<'a> {
    /// First message on every connection
    ConnectionInit {
        /// Connection parameters (authentication headers)
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<serde_json::Value>,
    },
    /// Start an operation
    Subscribe {
        /// Client chosen operation id
        id: &'a str,
        /// Operation
        payload: SubscribePayload<'a>,
    },
    /// Answer to a server ping
    Pong,
}

/// Operation carried by [`ClientMessage::Subscribe`]
#[derive(Debug, Serialize)]
pub struct SubscribePayload<'a> {
    /// Operation document
    pub query: &'a str,
    /// Operation variables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

/// Messages sent by the server
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection accepted
    ConnectionAck {
        /// Optional server parameters
        #[serde(default)]
        payload: Option<serde_json::Value>,
    },
    /// One operation result
    Next {
        /// Operation id
        id: String,
        /// A GraphQL response body
        payload: serde_json::Value,
    },
    /// Operation failed before producing results
    Error {
        /// Operation id
        id: String,
        /// Errors reported by the service
        payload: Vec<GraphQLErrorEntry>,
    },
    /// Operation finished
    Complete {
        /// Operation id
        id: String,
    },
    /// Keep-alive from the server
    Ping {
        /// Optional payload
        #[serde(default)]
        payload: Option<serde_json::Value>,
    },
    /// Answer to a client ping
    Pong {
        /// Optional payload
        #[serde(default)]
        payload: Option<serde_json::Value>,
    },
}

/// Open a connection and start one subscription on it.
pub(crate) async fn subscribe<T>(
    ws_url: &str,
    connection_params: Option<serde_json::Value>,
    query: &str,
    variables: Option<serde_json::Value>,
) -> Result<SubscriptionStream<T>, GraphQLError>
where
    T: DeserializeOwned + Send + 'static,
{
    let mut request = ws_url.into_client_request()?;
    request
        .headers_mut()
        .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(SUBPROTOCOL));

    let (mut socket, _) = connect_async(request).await?;

    send(
        &mut socket,
        &ClientMessage::ConnectionInit {
            payload: connection_params,
        },
    )
    .await?;
    wait_for_ack(&mut socket).await?;

    let id = uuid::Uuid::new_v4().to_string();
    send(
        &mut socket,
        &ClientMessage::Subscribe {
            id: &id,
            payload: SubscribePayload { query, variables },
        },
    )
    .await?;
    tracing::debug!(subscription_id = %id, "Subscription started");

    Ok(Box::pin(stream! {
        while let Some(frame) = socket.next().await {
            let text = match frame {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(error) => {
                    yield Err(GraphQLError::from(error));
                    break;
                }
            };

            match serde_json::from_str::<ServerMessage>(&text) {
                Ok(ServerMessage::Next { id: message_id, payload }) if message_id == id => {
                    yield serde_json::from_value::<GraphQLResponse<T>>(payload)
                        .map_err(|e| GraphQLError::ResponseParseFailed(e.to_string()))
                        .and_then(GraphQLResponse::into_result);
                }
                Ok(ServerMessage::Error { id: message_id, payload }) if message_id == id => {
                    yield Err(GraphQLError::Response(payload));
                    break;
                }
                Ok(ServerMessage::Complete { id: message_id }) if message_id == id => break,
                Ok(ServerMessage::Ping { .. }) => {
                    if let Err(error) = send(&mut socket, &ClientMessage::Pong).await {
                        yield Err(error);
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    tracing::trace!(error = %error, "Ignoring unrecognised subscription frame");
                }
            }
        }
        tracing::debug!(subscription_id = %id, "Subscription closed");
    }))
}

async fn send(socket: &mut Socket, message: &ClientMessage<'_>) -> Result<(), GraphQLError> {
    let text =
        serde_json::to_string(message).map_err(|e| GraphQLError::Protocol(e.to_string()))?;
    socket.send(Message::Text(text)).await?;
    Ok(())
}

async fn wait_for_ack(socket: &mut Socket) -> Result<(), GraphQLError> {
    while let Some(frame) = socket.next().await {
        let Message::Text(text) = frame? else {
            continue;
        };
        match serde_json::from_str::<ServerMessage>(&text) {
            Ok(ServerMessage::ConnectionAck { .. }) => return Ok(()),
            Ok(ServerMessage::Ping { .. }) => send(socket, &ClientMessage::Pong).await?,
            Ok(other) => {
                return Err(GraphQLError::Protocol(format!(
                    "expected connection_ack, got {other:?}"
                )));
            },
            Err(error) => return Err(GraphQLError::Protocol(error.to_string())),
        }
    }
    Err(GraphQLError::Protocol(
        "connection closed before connection_ack".to_string(),
    ))
}
