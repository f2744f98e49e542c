#[path = "../common/mod.rs"]
mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::TestServer;
use homedns_application::services::TokenSigner;
use homedns_application::use_cases::{AddCredentialUseCase, RemoveCredentialUseCase};
use homedns_domain::{InvocationContext, SigningAlgorithm};
use homedns_infrastructure::registry::JsonCredentialRegistry;
use std::sync::Arc;

#[tokio::test]
async fn test_removed_subject_is_locked_out() {
    let server = TestServer::start().await;
    let (subject, token) = server.issue_token().await;
    let (_, admin) = server.issue_token().await;

    let (status, _) = server.api(Method::GET, "/api/records", &token, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server
        .api(
            Method::DELETE,
            &format!("/api/credentials/{}", subject),
            &admin,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], true);

    let (status, body) = server.api(Method::GET, "/api/records", &token, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["reason"], "unknown_subject");
}

#[tokio::test]
async fn test_remote_add_is_forbidden() {
    let server = TestServer::start().await;
    let (_, token) = server.issue_token().await;

    let (status, _) = server
        .api(Method::POST, "/api/credentials", &token, None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, listed) = server.api(Method::GET, "/api/credentials", &token, None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_eddsa_subject_can_call_api() {
    let server = TestServer::start().await;
    let issued = AddCredentialUseCase::new(server.registry.clone())
        .execute(InvocationContext::Local, SigningAlgorithm::EdDsa)
        .await
        .unwrap();
    let token = TokenSigner::from_pem(&issued.private_key_pem)
        .unwrap()
        .issue(
            issued.subject_id,
            &server.jwt.issuer,
            &server.jwt.audience,
            Utc::now(),
            Duration::minutes(5),
        )
        .unwrap();

    // EdDSA is not in the default accepted algorithm list
    let (status, body) = server.api(Method::GET, "/api/records", &token, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["reason"], "malformed_token");
}

#[tokio::test]
async fn test_cli_changes_reach_running_server_on_next_request() {
    let server = TestServer::start().await;
    let (_, admin) = server.issue_token().await;

    // A second process (the jwt CLI) working on the same registry file.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let cli_registry = Arc::new(
        JsonCredentialRegistry::open(server.registry_path())
            .await
            .unwrap(),
    );
    let issued = AddCredentialUseCase::new(cli_registry.clone())
        .execute(InvocationContext::Local, SigningAlgorithm::Es256)
        .await
        .unwrap();
    let token = TokenSigner::from_pem(&issued.private_key_pem)
        .unwrap()
        .issue(
            issued.subject_id,
            &server.jwt.issuer,
            &server.jwt.audience,
            Utc::now(),
            Duration::minutes(5),
        )
        .unwrap();

    let (status, _) = server.api(Method::GET, "/api/records", &token, None).await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(RemoveCredentialUseCase::new(cli_registry)
        .execute(&issued.subject_id)
        .await
        .unwrap());

    let (status, body) = server.api(Method::GET, "/api/records", &token, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["reason"], "unknown_subject");

    let (status, _) = server.api(Method::GET, "/api/records", &admin, None).await;
    assert_eq!(status, StatusCode::OK);
}
