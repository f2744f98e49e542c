#[path = "../common/mod.rs"]
mod common;

use axum::http::{Method, StatusCode};
use common::test_client::a_values;
use common::{MockUpstream, TestDomains, TestServer, TestServerBuilder};
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::{RData, RecordType};
use serde_json::json;
use std::net::Ipv4Addr;

#[tokio::test]
async fn test_record_created_through_api_resolves() {
    let server = TestServer::start().await;
    let (_, token) = server.issue_token().await;

    let (status, _) = server
        .api(
            Method::POST,
            "/api/records/A",
            &token,
            Some(json!({"hostname": TestDomains::nas(), "address": "10.0.0.8", "ttl": 300})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let client = server.client();
    for response in [
        client.query(TestDomains::nas(), RecordType::A).await,
        client.query_tcp(TestDomains::nas(), RecordType::A).await,
    ] {
        assert_eq!(response.response_code(), ResponseCode::NoError);
        assert!(response.authoritative());
        assert_eq!(a_values(&response), vec![Ipv4Addr::new(10, 0, 0, 8)]);
        assert_eq!(response.answers()[0].ttl(), 300);
    }
}

#[tokio::test]
async fn test_zone_answers_nxdomain_and_nodata() {
    let server = TestServer::start().await;
    let (_, token) = server.issue_token().await;

    server
        .api(
            Method::POST,
            "/api/records/A",
            &token,
            Some(json!({"name": TestDomains::nas(), "value": "10.0.0.8"})),
        )
        .await;

    let client = server.client();

    let missing = client.query(TestDomains::printer(), RecordType::A).await;
    assert_eq!(missing.response_code(), ResponseCode::NXDomain);
    assert!(missing.answers().is_empty());

    let nodata = client.query(TestDomains::nas(), RecordType::AAAA).await;
    assert_eq!(nodata.response_code(), ResponseCode::NoError);
    assert!(nodata.answers().is_empty());
}

#[tokio::test]
async fn test_deleted_record_stops_resolving() {
    let server = TestServer::start().await;
    let (_, token) = server.issue_token().await;

    server
        .api(
            Method::POST,
            "/api/records/A",
            &token,
            Some(json!({"name": TestDomains::nas(), "value": "10.0.0.8"})),
        )
        .await;
    let client = server.client();
    assert_eq!(
        client.query(TestDomains::nas(), RecordType::A).await.response_code(),
        ResponseCode::NoError
    );

    let (status, body) = server
        .api(
            Method::DELETE,
            &format!("/api/records/A/{}", TestDomains::nas()),
            &token,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 1);

    let response = client.query(TestDomains::nas(), RecordType::A).await;
    assert_eq!(response.response_code(), ResponseCode::NXDomain);
}

#[tokio::test]
async fn test_cname_and_mx_records_resolve() {
    let server = TestServer::start().await;
    let (_, token) = server.issue_token().await;

    for (record_type, name, value) in [
        ("A", TestDomains::nas(), "10.0.0.8"),
        ("CNAME", "files.home.test", TestDomains::nas()),
        ("MX", TestDomains::zone(), "10 nas.home.test"),
    ] {
        let (status, _) = server
            .api(
                Method::POST,
                &format!("/api/records/{}", record_type),
                &token,
                Some(json!({"name": name, "value": value})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let client = server.client();

    let chased = client.query("files.home.test", RecordType::A).await;
    assert_eq!(chased.answers().len(), 2);
    assert!(matches!(chased.answers()[0].data(), RData::CNAME(_)));
    assert_eq!(a_values(&chased), vec![Ipv4Addr::new(10, 0, 0, 8)]);

    let mx = client.query(TestDomains::zone(), RecordType::MX).await;
    match mx.answers()[0].data() {
        RData::MX(mx) => {
            assert_eq!(mx.preference(), 10);
            assert_eq!(mx.exchange().to_ascii(), "nas.home.test.");
        }
        other => panic!("expected MX, got {:?}", other),
    }
}

#[tokio::test]
async fn test_forwarded_answer_is_cached() {
    let upstream = MockUpstream::answering(TestDomains::upstream_address(), 120).await;
    let server = TestServerBuilder::new()
        .with_upstream(upstream.addr())
        .start()
        .await;
    let client = server.client();

    let first = client.query(TestDomains::external(), RecordType::A).await;
    assert_eq!(first.response_code(), ResponseCode::NoError);
    assert!(!first.authoritative());
    assert_eq!(a_values(&first), vec![TestDomains::upstream_address()]);

    let second = client.query(TestDomains::external(), RecordType::A).await;
    assert_eq!(a_values(&second), vec![TestDomains::upstream_address()]);
    assert!(second.answers()[0].ttl() <= 120);

    assert_eq!(upstream.queries(), 1);
    let stats = server.engine.stats();
    assert_eq!(stats.forwarded, 1);
    assert_eq!(stats.cache_hits, 1);
}

#[tokio::test]
async fn test_upstream_nxdomain_relayed_but_not_cached() {
    let upstream = MockUpstream::answering(TestDomains::upstream_address(), 120).await;
    let server = TestServerBuilder::new()
        .with_upstream(upstream.addr())
        .start()
        .await;
    let client = server.client();

    for _ in 0..2 {
        let response = client.query("missing.example.org", RecordType::A).await;
        assert_eq!(response.response_code(), ResponseCode::NXDomain);
    }
    assert_eq!(upstream.queries(), 2);
    assert_eq!(server.cache.stats().entries, 0);
}

#[tokio::test]
async fn test_api_record_overrides_cached_forward() {
    let upstream = MockUpstream::answering(TestDomains::upstream_address(), 600).await;
    let server = TestServerBuilder::new()
        .with_upstream(upstream.addr())
        .start()
        .await;
    let (_, token) = server.issue_token().await;
    let client = server.client();

    client.query(TestDomains::external(), RecordType::A).await;
    assert_eq!(server.cache.stats().entries, 1);

    let (status, _) = server
        .api(
            Method::POST,
            "/api/records/A",
            &token,
            Some(json!({"name": TestDomains::external(), "value": "10.0.0.77"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(server.cache.stats().entries, 0);

    let response = client.query(TestDomains::external(), RecordType::A).await;
    assert!(response.authoritative());
    assert_eq!(a_values(&response), vec![Ipv4Addr::new(10, 0, 0, 77)]);
    assert_eq!(upstream.queries(), 1);
}

#[tokio::test]
async fn test_stats_endpoint_reflects_traffic() {
    let upstream = MockUpstream::answering(TestDomains::upstream_address(), 120).await;
    let server = TestServerBuilder::new()
        .with_upstream(upstream.addr())
        .start()
        .await;
    let (_, token) = server.issue_token().await;
    let client = server.client();

    client.query(TestDomains::external(), RecordType::A).await;
    client.query(TestDomains::external(), RecordType::A).await;

    let (status, stats) = server
        .api(Method::GET, "/api/cache/stats", &token, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["cache"]["entries"], 1);
    assert_eq!(stats["cache"]["hits"], 1);
    assert_eq!(stats["engine"]["queries"], 2);
    assert_eq!(stats["engine"]["forwarded"], 1);
}
