//! Subscription tests against an in-process `graphql-transport-ws` server

use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use tasksync_graphql::{GraphQLClient, GraphQLError, SUBPROTOCOL};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::HeaderValue;

#[derive(Debug, Deserialize, PartialEq)]
struct OnPing {
    #[serde(rename = "onPing")]
    on_ping: String,
}

/// Accepts one connection, records the `connection_init` payload, acks,
/// then answers the subscription with `events` followed by `complete`.
async fn serve_once(events: Vec<Value>) -> (String, oneshot::Receiver<Value>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (init_tx, init_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let callback = |_request: &Request, mut response: Response| {
            response
                .headers_mut()
                .insert("Sec-WebSocket-Protocol", HeaderValue::from_static(SUBPROTOCOL));
            Ok::<_, ErrorResponse>(response)
        };
        let mut ws = tokio_tungstenite::accept_hdr_async(stream, callback).await.unwrap();

        let init: Value = next_json(&mut ws).await;
        assert_eq!(init["type"], "connection_init");
        let _ = init_tx.send(init["payload"].clone());
        send_json(&mut ws, json!({ "type": "connection_ack" })).await;

        let subscribe: Value = next_json(&mut ws).await;
        assert_eq!(subscribe["type"], "subscribe");
        let id = subscribe["id"].as_str().unwrap().to_string();

        send_json(&mut ws, json!({ "type": "ping" })).await;
        let pong: Value = next_json(&mut ws).await;
        assert_eq!(pong["type"], "pong");

        for event in events {
            send_json(&mut ws, json!({ "type": "next", "id": id, "payload": event })).await;
        }
        send_json(&mut ws, json!({ "type": "complete", "id": id })).await;
    });

    (format!("ws://{addr}/graphql"), init_rx)
}

async fn next_json<S>(ws: &mut S) -> Value
where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        if let Message::Text(text) = ws.next().await.unwrap().unwrap() {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn send_json<S>(ws: &mut S, value: Value)
where
    S: futures::Sink<Message> + Unpin,
    S::Error: std::fmt::Debug,
{
    ws.send(Message::Text(value.to_string())).await.unwrap();
}

#[tokio::test]
async fn subscription_yields_events_until_complete() {
    let (url, init) = serve_once(vec![
        json!({ "data": { "onPing": "one" } }),
        json!({ "data": { "onPing": "two" } }),
    ])
    .await;

    let client = GraphQLClient::new("http://unused.invalid/graphql")
        .with_ws_endpoint(url)
        .with_api_key("da2-secret");
    let stream = client
        .subscribe::<(), OnPing>("subscription { onPing }", None)
        .await
        .unwrap();

    let events: Vec<OnPing> = stream.map(Result::unwrap).collect().await;
    assert_eq!(
        events,
        vec![
            OnPing { on_ping: "one".to_string() },
            OnPing { on_ping: "two".to_string() },
        ]
    );
    assert_eq!(init.await.unwrap(), json!({ "x-api-key": "da2-secret" }));
}

#[tokio::test]
async fn subscription_surfaces_graphql_errors_per_event() {
    let (url, _init) = serve_once(vec![json!({
        "data": null,
        "errors": [{ "message": "Not Authorized to access onPing" }]
    })])
    .await;

    let client = GraphQLClient::new("http://unused.invalid/graphql").with_ws_endpoint(url);
    let mut stream = client
        .subscribe::<(), OnPing>("subscription { onPing }", None)
        .await
        .unwrap();

    assert!(matches!(stream.next().await, Some(Err(GraphQLError::Response(_)))));
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn subscribe_fails_when_nothing_listens() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = GraphQLClient::new(format!("http://{addr}/graphql"));
    let result = client.subscribe::<(), OnPing>("subscription { onPing }", None).await;

    assert!(matches!(result, Err(GraphQLError::WebSocket(_))));
}
