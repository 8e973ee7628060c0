//! Custom claims synchronization tests

mod common;

use axum::http::{Method, StatusCode};
use common::{object, TestApp};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::atomic::Ordering;
use tenantgate_core::domain::ClaimSet;

const MIRROR: &str = "user_claims";

async fn app_with_admin() -> TestApp {
    let app = TestApp::new();
    app.identity.add_session("s-admin", "root", ClaimSet::admin()).await;
    app.identity
        .add_user("u1", "u1@example.com", ClaimSet::default())
        .await;
    app
}

fn claims_path(uid: &str) -> String {
    format!("/api/v1/users/{}/claims", uid)
}

#[tokio::test]
async fn test_replace_writes_provider_and_mirror() {
    let app = app_with_admin().await;

    let (status, body) = app
        .request(Method::POST, &claims_path("u1"))
        .session("s-admin", "acme")
        .json(json!({"role": "user", "subdomain": ["acme"], "plan": "gold"}))
        .send()
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["uid"], "u1");
    assert_eq!(body["data"]["mirror_synced"], true);

    let provider = app.identity.claims_of("u1").await.unwrap();
    assert_eq!(provider.subdomain.len(), 1);
    assert_eq!(provider.extra["plan"], json!("gold"));

    let mirror = app.store.fields(MIRROR, "u1").await.unwrap();
    assert_eq!(mirror["claims"], json!(provider.to_map()));
}

#[tokio::test]
async fn test_successive_patches_accumulate() {
    let app = app_with_admin().await;

    for patch in [json!({"a": 1}), json!({"b": 2})] {
        let (status, _) = app
            .request(Method::PATCH, &claims_path("u1"))
            .session("s-admin", "acme")
            .json(patch)
            .send()
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let expected = object(json!({"a": 1, "b": 2}));
    let provider = app.identity.claims_of("u1").await.unwrap();
    assert_eq!(provider.to_map(), expected);

    let mirror = app.store.fields(MIRROR, "u1").await.unwrap();
    assert_eq!(mirror["claims"], json!(expected));
}

#[tokio::test]
async fn test_patch_overrides_only_given_keys() {
    let app = app_with_admin().await;
    app.identity
        .add_user("u2", "u2@example.com", ClaimSet::tenant_user(["acme"]))
        .await;

    let (status, body) = app
        .request(Method::PATCH, &claims_path("u2"))
        .session("s-admin", "acme")
        .json(json!({"subdomain": ["acme", "beta"]}))
        .send()
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["claims"],
        json!({"role": "user", "subdomain": ["acme", "beta"]})
    );
}

#[tokio::test]
async fn test_replace_drops_absent_keys() {
    let app = app_with_admin().await;
    app.identity
        .add_user("u2", "u2@example.com", ClaimSet::tenant_user(["acme"]))
        .await;

    let (status, body) = app
        .request(Method::POST, &claims_path("u2"))
        .session("s-admin", "acme")
        .json(json!({"plan": "free"}))
        .send()
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["claims"], json!({"plan": "free"}));
    assert_eq!(
        app.identity.claims_of("u2").await.unwrap().to_map(),
        object(json!({"plan": "free"}))
    );
}

#[tokio::test]
async fn test_patch_repairs_irregular_stored_claims() {
    let app = app_with_admin().await;
    let stored: ClaimSet =
        serde_json::from_value(json!({"role": "user", "subdomain": "acme", "plan": "gold"}))
            .unwrap();
    app.identity.add_user("u3", "u3@example.com", stored).await;

    let (status, body) = app
        .request(Method::PATCH, &claims_path("u3"))
        .session("s-admin", "acme")
        .json(json!({"subdomain": ["acme"]}))
        .send()
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["claims"],
        json!({"role": "user", "subdomain": ["acme"], "plan": "gold"})
    );
    assert!(app.identity.claims_of("u3").await.unwrap().has_tenant("acme"));
}

#[tokio::test]
async fn test_replace_keeps_tenant_order() {
    let app = app_with_admin().await;

    let (status, body) = app
        .request(Method::POST, &claims_path("u1"))
        .session("s-admin", "acme")
        .json(json!({"subdomain": ["b", "a", "a"]}))
        .send()
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["claims"], json!({"subdomain": ["b", "a", "a"]}));

    let mirror = app.store.fields(MIRROR, "u1").await.unwrap();
    assert_eq!(mirror["claims"], json!({"subdomain": ["b", "a", "a"]}));
}

#[tokio::test]
async fn test_mirror_failure_is_reported_but_not_fatal() {
    let app = app_with_admin().await;
    app.store.fail_writes_to(MIRROR).await;

    let (status, body) = app
        .request(Method::POST, &claims_path("u1"))
        .session("s-admin", "acme")
        .json(json!({"role": "admin"}))
        .send()
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["mirror_synced"], false);

    assert!(app.identity.claims_of("u1").await.unwrap().is_admin());
    assert!(app.store.fields(MIRROR, "u1").await.is_none());
}

#[tokio::test]
async fn test_provider_failure_skips_mirror() {
    let app = app_with_admin().await;
    app.identity.fail_set_claims.store(true, Ordering::SeqCst);

    let (status, _) = app
        .request(Method::POST, &claims_path("u1"))
        .session("s-admin", "acme")
        .json(json!({"role": "admin"}))
        .send()
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.store.fields(MIRROR, "u1").await.is_none());
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let app = app_with_admin().await;

    let (status, _) = app
        .request(Method::PATCH, &claims_path("ghost"))
        .session("s-admin", "acme")
        .json(json!({"a": 1}))
        .send()
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_claims_are_rejected() {
    let app = app_with_admin().await;

    let (status, _) = app
        .request(Method::POST, &claims_path("u1"))
        .session("s-admin", "acme")
        .json(json!({"subdomain": "acme"}))
        .send()
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(Method::PATCH, &claims_path("u1"))
        .session("s-admin", "acme")
        .json(json!({"role": 7}))
        .send()
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(Method::PATCH, &claims_path("u1"))
        .session("s-admin", "acme")
        .json(json!("role=admin"))
        .send()
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.identity.claims_of("u1").await, Some(ClaimSet::default()));
}
