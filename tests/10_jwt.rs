mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(format!("{}/health", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn create_refresh_and_verify() -> Result<()> {
    let server = common::spawn_server().await?;
    server.user("alice").await?;

    let res = server
        .client
        .post(server.url("/jwt/create/"))
        .json(&json!({ "username": "alice", "password": "pass1234" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let pair: Value = res.json().await?;
    let refresh = pair["refresh"].as_str().unwrap().to_string();
    let access = pair["access"].as_str().unwrap().to_string();

    let res = server
        .client
        .post(server.url("/jwt/refresh/"))
        .json(&json!({ "refresh": refresh }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert!(body["access"].is_string());
    assert!(body.get("refresh").is_none());

    for token in [&access, &refresh] {
        let res = server
            .client
            .post(server.url("/jwt/verify/"))
            .json(&json!({ "token": token }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.json::<Value>().await?, json!({}));
    }
    Ok(())
}

#[tokio::test]
async fn missing_fields_are_400() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.post(server.url("/jwt/create/")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert!(body.get("username").is_some());
    assert!(body.get("password").is_some());

    for path in ["/jwt/refresh/", "/jwt/verify/"] {
        let res = server.client.post(server.url(path)).json(&json!({})).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", path);
    }
    Ok(())
}

#[tokio::test]
async fn bad_credentials_and_tokens_are_401() -> Result<()> {
    let server = common::spawn_server().await?;
    server.user("alice").await?;

    let res = server
        .client
        .post(server.url("/jwt/create/"))
        .json(&json!({ "username": "alice", "password": "wrong" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["detail"], "No active account found with the given credentials");

    let res = server
        .client
        .post(server.url("/jwt/refresh/"))
        .json(&json!({ "refresh": "not-a-token" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "token_not_valid");
    assert!(body["detail"].is_string());

    let res = server
        .client
        .post(server.url("/jwt/verify/"))
        .json(&json!({ "token": "not-a-token" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn access_token_cannot_refresh() -> Result<()> {
    let server = common::spawn_server().await?;
    let access = server.login("alice").await?;

    let res = server
        .client
        .post(server.url("/jwt/refresh/"))
        .json(&json!({ "refresh": access }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn invalid_bearer_is_rejected_even_on_public_endpoints() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/posts/")).bearer_auth("garbage").send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "token_not_valid");

    // Other schemes are ignored
    let res = server
        .client
        .get(server.url("/posts/"))
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
