#[path = "../common/mod.rs"]
mod common;

use common::test_client::a_values;
use common::{MockUpstream, TestDomains, TestServer, TestServerBuilder};
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::RecordType;
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_silent_primary_falls_back_to_secondary() {
    let primary = MockUpstream::silent().await;
    let secondary = MockUpstream::answering(TestDomains::upstream_address(), 60).await;
    let server = TestServerBuilder::new()
        .with_upstream(primary.addr())
        .with_upstream(secondary.addr())
        .start()
        .await;

    let response = server
        .client()
        .query(TestDomains::external(), RecordType::A)
        .await;

    assert_eq!(response.response_code(), ResponseCode::NoError);
    assert_eq!(a_values(&response), vec![TestDomains::upstream_address()]);
    assert_eq!(primary.queries(), 1);
    assert_eq!(secondary.queries(), 1);
}

#[tokio::test]
async fn test_all_upstreams_silent_gives_servfail_within_budget() {
    let first = MockUpstream::silent().await;
    let second = MockUpstream::silent().await;
    let server = TestServerBuilder::new()
        .with_upstream(first.addr())
        .with_upstream(second.addr())
        .with_timeouts(vec![Duration::from_millis(100), Duration::from_millis(200)])
        .start()
        .await;

    let started = Instant::now();
    let response = server
        .client()
        .query(TestDomains::external(), RecordType::A)
        .await;
    let elapsed = started.elapsed();

    assert_eq!(response.response_code(), ResponseCode::ServFail);
    // every server once per ladder step
    assert_eq!(first.queries(), 2);
    assert_eq!(second.queries(), 2);
    assert!(elapsed >= Duration::from_millis(600));
    assert!(elapsed < Duration::from_secs(3));

    assert_eq!(server.engine.stats().forward_failures, 1);
}

#[tokio::test]
async fn test_local_records_survive_upstream_outage() {
    let dead = MockUpstream::silent().await;
    let server = TestServerBuilder::new()
        .with_upstream(dead.addr())
        .with_timeouts(vec![Duration::from_millis(50)])
        .start()
        .await;
    let (_, token) = server.issue_token().await;

    server
        .api(
            axum::http::Method::POST,
            "/api/records/A",
            &token,
            Some(serde_json::json!({"name": TestDomains::nas(), "value": "10.0.0.8"})),
        )
        .await;

    let response = server.client().query(TestDomains::nas(), RecordType::A).await;
    assert_eq!(response.response_code(), ResponseCode::NoError);
    assert_eq!(dead.queries(), 0);
}

#[tokio::test]
async fn test_no_forwarder_refuses_foreign_names() {
    let server = TestServer::start().await;

    let response = server
        .client()
        .query(TestDomains::external(), RecordType::A)
        .await;

    assert_eq!(response.response_code(), ResponseCode::Refused);
    assert!(!response.recursion_available());
}

#[tokio::test]
async fn test_slow_forward_does_not_block_local_answers() {
    let dead = MockUpstream::silent().await;
    let server = TestServerBuilder::new()
        .with_upstream(dead.addr())
        .with_timeouts(vec![Duration::from_secs(2)])
        .start()
        .await;
    let (_, token) = server.issue_token().await;
    server
        .api(
            axum::http::Method::POST,
            "/api/records/A",
            &token,
            Some(serde_json::json!({"name": TestDomains::nas(), "value": "10.0.0.8"})),
        )
        .await;

    let client = server.client();
    let slow = tokio::spawn({
        let client = server.client();
        async move { client.query(TestDomains::external(), RecordType::A).await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let started = Instant::now();
    let local = client.query(TestDomains::nas(), RecordType::A).await;
    assert_eq!(local.response_code(), ResponseCode::NoError);
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(!slow.is_finished());

    let slow = slow.await.unwrap();
    assert_eq!(slow.response_code(), ResponseCode::ServFail);
}
