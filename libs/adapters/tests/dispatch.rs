use std::sync::Arc;
use std::time::Duration;

use amb_adapters::{Ambassador, Credentials, create};
use amb_core::testkit::RecordingTransport;
use amb_core::{AdapterError, Answer, HttpTransport, TransportRequest, TransportResponse};
use async_trait::async_trait;
use http::StatusCode;
use serde_json::json;
use tokio::sync::Notify;

fn ambassador(tag: &str, transport: &Arc<RecordingTransport>) -> Arc<dyn Ambassador> {
    create(tag, Credentials::new("SECRET_TOKEN_123"), transport.clone()).expect("known platform")
}

#[tokio::test]
async fn text_then_question_dispatch_in_order_on_facebook() {
    let transport = Arc::new(RecordingTransport::new());
    let fb = ambassador("facebook", &transport);

    fb.send_text("a").await;
    fb.ask_question("b", &[Answer::new("Yes", "YES"), Answer::new("No", "NO")])
        .await;
    fb.send("456").await.expect("dispatch");

    let texts: Vec<_> = transport
        .requests()
        .await
        .iter()
        .map(|r| r.body["message"]["text"].clone())
        .collect();
    assert_eq!(texts, vec![json!("a"), json!("b")]);
}

#[tokio::test]
async fn text_then_question_dispatch_in_order_on_line() {
    let transport = Arc::new(RecordingTransport::new());
    let line = ambassador("line", &transport);

    line.send_text("a").await;
    line.ask_question("b", &[Answer::new("Yes", "YES")]).await;
    line.send("reply-token").await.expect("dispatch");

    let requests = transport.requests().await;
    assert_eq!(requests.len(), 1);
    let messages = requests[0].body["messages"].as_array().expect("messages");
    assert_eq!(messages[0]["text"], "a");
    assert_eq!(messages[1]["template"]["text"], "b");
}

#[tokio::test]
async fn buffer_is_cleared_and_history_kept_on_success_and_failure() {
    for tag in ["facebook", "line"] {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond_with(TransportResponse::ok()).await;
        transport.fail_with("connection refused").await;
        let ambassador = ambassador(tag, &transport);

        ambassador.send_text("first").await;
        ambassador.send("r1").await.expect("first flush succeeds");
        assert_eq!(ambassador.pending_len().await, 0);
        let first = ambassador.last_sent().await;
        assert_eq!(first.len(), 1);

        ambassador.send_text("second").await;
        ambassador.send_text("third").await;
        let err = ambassador.send("r2").await.expect_err("second flush fails");
        assert!(err.pending().is_some_and(|p| p.contains("third")));
        assert_eq!(ambassador.pending_len().await, 0, "{tag}");

        let history = ambassador.last_sent().await;
        assert_eq!(history.len(), 2, "{tag}");
        assert!(history[0].to_string().contains("second"));
        assert!(history[1].to_string().contains("third"));
    }
}

#[tokio::test]
async fn non_success_status_is_a_dispatch_error() {
    let transport = Arc::new(RecordingTransport::new());
    transport
        .respond_with(TransportResponse::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "upstream exploded",
        ))
        .await;
    let fb = ambassador("facebook", &transport);
    fb.send_text("hi").await;

    let err = fb.send("456").await.expect_err("500 is a failure");
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert!(err.to_string().contains("upstream exploded"));
}

#[tokio::test]
async fn malformed_template_leaves_buffer_unchanged() {
    for tag in ["facebook", "line"] {
        let transport = Arc::new(RecordingTransport::new());
        let ambassador = ambassador(tag, &transport);
        ambassador.send_text("kept").await;

        let err = ambassador
            .send_template(json!({"title": "not a list"}))
            .await
            .expect_err("object is not a card list");
        assert!(matches!(err, AdapterError::TypeMismatch { .. }));

        let err = ambassador
            .send_template(json!([{"title": 7}]))
            .await
            .expect_err("title must be a string");
        assert!(matches!(err, AdapterError::TypeMismatch { .. }));

        assert_eq!(ambassador.pending_len().await, 1, "{tag}");
    }
}

#[tokio::test]
async fn unknown_platform_tag_is_rejected() {
    let transport = Arc::new(RecordingTransport::new());
    for tag in ["telegram", "", "faceb00k"] {
        match create(tag, Credentials::new("t"), transport.clone()) {
            Err(AdapterError::UnsupportedPlatform(got)) => assert_eq!(got, tag),
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("{tag} should not build an ambassador"),
        }
    }
    assert_eq!(
        ambassador(" LINE ", &transport).platform(),
        amb_core::Platform::Line
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_staging_keeps_every_fragment() {
    let transport = Arc::new(RecordingTransport::new());
    let line = ambassador("line", &transport);

    let mut handles = Vec::new();
    for worker in 0..4 {
        let line = Arc::clone(&line);
        handles.push(tokio::spawn(async move {
            for i in 0..25 {
                line.send_text(&format!("{worker}-{i}")).await;
            }
        }));
    }
    for handle in handles {
        handle.await.expect("stager");
    }
    assert_eq!(line.pending_len().await, 100);

    line.send("reply").await.expect("dispatch");
    let requests = transport.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].body["messages"].as_array().map(Vec::len), Some(100));
    assert_eq!(line.pending_len().await, 0);
}

#[tokio::test]
async fn translate_routes_to_platform_decoder() {
    let transport = Arc::new(RecordingTransport::new());
    let fb = ambassador("facebook", &transport);
    let messages = fb
        .translate(
            br#"{"entry":[{"messaging":[{"sender":{"id":"123"},"recipient":{"id":"456"},"timestamp":1000,"message":{"text":"hi"}}]}]}"#,
        )
        .expect("decode");
    assert_eq!(messages[0].text(), Some("hi"));

    let err = fb.translate(b"{").expect_err("truncated body");
    assert!(matches!(err, AdapterError::Decode(_)));
}

#[tokio::test]
#[tracing_test::traced_test]
async fn dispatch_logs_do_not_leak_tokens() {
    let transport = Arc::new(RecordingTransport::new());
    transport.fail_with("connection reset by peer").await;
    let fb = ambassador("facebook", &transport);
    fb.send_text("hello").await;

    let _ = fb.send("456").await;

    assert!(logs_contain("batch dispatch failed"));
    assert!(logs_contain("graph.facebook.com/v2.6/me/messages"));
    assert!(!logs_contain("SECRET_TOKEN_123"));
}

/// Holds every request until released, so a flush can be observed mid-flight.
#[derive(Default)]
struct GatedTransport {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl HttpTransport for GatedTransport {
    async fn post_json(&self, _request: TransportRequest) -> anyhow::Result<TransportResponse> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(TransportResponse::ok())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn staging_is_not_blocked_by_an_in_flight_send() {
    for tag in ["facebook", "line"] {
        let transport = Arc::new(GatedTransport::default());
        let ambassador = create(tag, Credentials::new("t"), transport.clone()).expect("known");
        ambassador.send_text("in flight").await;

        let flushing = {
            let ambassador = Arc::clone(&ambassador);
            tokio::spawn(async move { ambassador.send("r").await })
        };
        transport.entered.notified().await;

        tokio::time::timeout(Duration::from_secs(5), ambassador.send_text("next batch"))
            .await
            .unwrap_or_else(|_| panic!("{tag}: staging blocked while a send was in flight"));
        assert_eq!(ambassador.pending_len().await, 1, "{tag}");
        assert_eq!(ambassador.last_sent().await.len(), 1, "{tag}");

        transport.release.notify_one();
        flushing.await.expect("send task").expect("dispatch");
        assert_eq!(ambassador.pending_len().await, 1, "{tag}");
        assert!(ambassador.last_sent().await[0].to_string().contains("in flight"));
    }
}
