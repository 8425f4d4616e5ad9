//! End-to-end tests against an in-process WebSocket server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chat_core::{ChatHistory, ChatModel, ChatParams, Credentials, Role};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use spark_llm::{ChatSession, ChatTransport, LLMError, SparkClient};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

/// What the fake service observed during one connection.
#[derive(Debug, Default)]
struct Observed {
    uri: String,
    request: Option<Value>,
}

enum Behavior {
    /// Send these frames after the request arrives.
    Reply(Vec<String>),
    /// Read the request and then never answer.
    Stall,
    /// Close the socket right after the request.
    CloseEarly,
}

fn chunk(status: u8, content: &str) -> String {
    json!({
        "header": {"code": 0, "message": "Success", "sid": "cht-test"},
        "payload": {"choices": {"status": status, "seq": 0, "text": [{"content": content, "role": "assistant"}]}}
    })
    .to_string()
}

fn error_frame(code: i64) -> String {
    json!({"header": {"code": code, "message": "rejected", "sid": "cht-test"}}).to_string()
}

fn credentials() -> Credentials {
    Credentials {
        app_id: "test-app".to_string(),
        api_key: "test-key".to_string(),
        api_secret: "test-secret".to_string(),
    }
}

async fn spawn_server(behavior: Behavior) -> (ChatModel, JoinHandle<Observed>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let model = ChatModel::new(
        "Local",
        format!("ws://{addr}/v1.1/chat"),
        "lite",
        4096,
    );

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let uri = Arc::new(Mutex::new(String::new()));
        let uri_slot = Arc::clone(&uri);
        let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
            *uri_slot.lock().unwrap() = req.uri().to_string();
            Ok(resp)
        };
        let mut ws = accept_hdr_async(stream, callback).await.unwrap();

        let mut observed = Observed {
            uri: uri.lock().unwrap().clone(),
            request: None,
        };

        if let Some(Ok(Message::Text(text))) = ws.next().await {
            observed.request = serde_json::from_str(text.as_str()).ok();
        }

        match behavior {
            Behavior::Reply(frames) => {
                for frame in frames {
                    if ws.send(Message::text(frame)).await.is_err() {
                        break;
                    }
                }
            }
            Behavior::Stall => {}
            Behavior::CloseEarly => {
                let _ = ws.close(None).await;
                return observed;
            }
        }

        // Returns once the client closes or drops the socket.
        while let Some(Ok(message)) = ws.next().await {
            if message.is_close() {
                break;
            }
        }
        observed
    });

    (model, handle)
}

/// Wait for the server task, failing if the client never closed the socket.
async fn closed_by_client(server: JoinHandle<Observed>) -> Observed {
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("client closes the connection")
        .unwrap()
}

fn query(uri: &str) -> HashMap<String, String> {
    url::Url::parse(&format!("ws://localhost{uri}"))
        .unwrap()
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[tokio::test]
async fn streams_answer_and_sends_signed_request() {
    let (model, server) = spawn_server(Behavior::Reply(vec![
        chunk(0, "Hel"),
        chunk(1, "lo "),
        chunk(1, "wor"),
        chunk(2, "ld"),
    ]))
    .await;

    let client = SparkClient::new(credentials()).with_uid("uid-1");
    let mut history = ChatHistory::new();
    history.append("user", "say hello").unwrap();

    let answer = client
        .send(&model, &history, &ChatParams::default(), "say hello")
        .await
        .unwrap();
    assert_eq!(answer, "Hello world");

    let observed = closed_by_client(server).await;

    assert!(observed.uri.starts_with("/v1.1/chat?"));
    let params = query(&observed.uri);
    assert!(params.contains_key("authorization"));
    assert!(params["date"].ends_with(" GMT"));
    assert_eq!(params["host"], model.url.trim_start_matches("ws://").split('/').next().unwrap());

    let request = observed.request.expect("request frame");
    assert_eq!(request["header"]["app_id"], "test-app");
    assert_eq!(request["header"]["uid"], "uid-1");
    assert_eq!(request["parameter"]["chat"]["domain"], "lite");
    assert_eq!(request["parameter"]["chat"]["max_tokens"], 4096);
    assert_eq!(request["parameter"]["chat"]["top_k"], 4);
    assert_eq!(
        request["payload"]["message"]["text"],
        json!([{"role": "user", "content": "say hello"}])
    );
}

#[tokio::test]
async fn protocol_error_closes_connection_and_keeps_code() {
    let (model, server) = spawn_server(Behavior::Reply(vec![
        chunk(0, "partial "),
        error_frame(10007),
    ]))
    .await;

    let session = ChatSession::new(Arc::new(SparkClient::new(credentials())));
    let err = session
        .ask(&model, &ChatParams::default(), "are you there?")
        .await
        .unwrap_err();

    match err {
        LLMError::Protocol { code, .. } => assert_eq!(code, 10007),
        other => panic!("expected protocol error, got {other:?}"),
    }

    let observed = closed_by_client(server).await;
    assert!(observed.request.is_some());

    let history = session.history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history.last().unwrap().role, Role::User);
    assert_eq!(history.last().unwrap().content, "are you there?");
}

#[tokio::test]
async fn session_round_trip_over_websocket() {
    let (model, server) = spawn_server(Behavior::Reply(vec![chunk(0, "pong"), chunk(2, "!")])).await;

    let session = ChatSession::new(Arc::new(SparkClient::new(credentials())));
    let answer = session
        .ask(&model, &ChatParams::default(), "ping")
        .await
        .unwrap();
    assert_eq!(answer, "pong!");
    closed_by_client(server).await;

    let history = session.history().await;
    let turns: Vec<_> = history.iter().map(|m| (m.role, m.content.clone())).collect();
    assert_eq!(
        turns,
        vec![
            (Role::User, "ping".to_string()),
            (Role::Assistant, "pong!".to_string())
        ]
    );
}

#[tokio::test]
async fn early_close_is_a_connection_error() {
    let (model, server) = spawn_server(Behavior::CloseEarly).await;

    let client = SparkClient::new(credentials());
    let mut history = ChatHistory::new();
    history.append("user", "hello").unwrap();

    let err = client
        .send(&model, &history, &ChatParams::default(), "hello")
        .await
        .unwrap_err();
    assert!(matches!(err, LLMError::Connection(_)), "{err:?}");
    server.await.unwrap();
}

#[tokio::test]
async fn refused_connection_is_a_connection_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let model = ChatModel::new("Gone", format!("ws://{addr}/v1.1/chat"), "lite", 4096);
    let client = SparkClient::new(credentials());
    let mut history = ChatHistory::new();
    history.append("user", "hello").unwrap();

    let err = client
        .send(&model, &history, &ChatParams::default(), "hello")
        .await
        .unwrap_err();
    assert!(matches!(err, LLMError::Connection(_)), "{err:?}");
}

#[tokio::test]
async fn failed_tls_handshake_is_a_connection_error() {
    // Plain TCP peer that answers the ClientHello with non-TLS bytes.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let _ = stream.write_all(b"HTTP/1.1 400 Bad Request\r\n\r\n").await;
        let _ = stream.shutdown().await;
    });

    let model = ChatModel::new("Secure", format!("wss://{addr}/v1.1/chat"), "lite", 4096);
    let session = ChatSession::new(Arc::new(SparkClient::new(credentials())))
        .with_timeout(Duration::from_secs(5));
    let err = session
        .ask(&model, &ChatParams::default(), "hello over tls")
        .await
        .unwrap_err();

    assert!(matches!(err, LLMError::Connection(_)), "{err:?}");
    assert!(!session.is_busy());
    server.await.unwrap();
}

#[tokio::test]
async fn stalled_service_times_out() {
    let (model, server) = spawn_server(Behavior::Stall).await;

    let session = ChatSession::new(Arc::new(SparkClient::new(credentials())))
        .with_timeout(Duration::from_millis(200));
    let err = session
        .ask(&model, &ChatParams::default(), "anyone?")
        .await
        .unwrap_err();
    assert!(err.is_timeout(), "{err:?}");
    assert!(!session.is_busy());

    // Dropping the timed-out request closes the socket.
    let observed = closed_by_client(server).await;
    assert!(observed.request.is_some());
    assert_eq!(session.history().await.len(), 1);
}
