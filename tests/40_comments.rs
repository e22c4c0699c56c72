mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn comments_are_scoped_to_post() -> Result<()> {
    let server = common::spawn_server().await?;
    let alice = server.login("alice").await?;
    let first = server.post_as(&alice, "first").await?;
    let second = server.post_as(&alice, "second").await?;

    let res = server
        .client
        .post(server.url(&format!("/posts/{}/comments/", first["id"])))
        .bearer_auth(&alice)
        .json(&json!({ "text": "hi", "post": second["id"], "author": "nobody" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let comment: Value = res.json().await?;
    assert_eq!(comment["post"], first["id"]);
    assert_eq!(comment["author"], "alice");
    assert!(comment["created"].is_string());

    let listed: Value = server
        .client
        .get(server.url(&format!("/posts/{}/comments/", first["id"])))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let listed: Value = server
        .client
        .get(server.url(&format!("/posts/{}/comments/", second["id"])))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(listed, json!([]));
    Ok(())
}

#[tokio::test]
async fn missing_parent_post_is_404() -> Result<()> {
    let server = common::spawn_server().await?;
    let alice = server.login("alice").await?;

    let res = server.client.get(server.url("/posts/999/comments/")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server
        .client
        .post(server.url("/posts/999/comments/"))
        .bearer_auth(&alice)
        .json(&json!({ "text": "hi" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn create_requires_auth_and_text() -> Result<()> {
    let server = common::spawn_server().await?;
    let alice = server.login("alice").await?;
    let post = server.post_as(&alice, "first").await?;
    let path = format!("/posts/{}/comments/", post["id"]);

    let res = server.client.post(server.url(&path)).json(&json!({ "text": "hi" })).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.client.post(server.url(&path)).bearer_auth(&alice).json(&json!({})).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert!(body.get("text").is_some());
    Ok(())
}

#[tokio::test]
async fn only_author_mutates_comment() -> Result<()> {
    let server = common::spawn_server().await?;
    let alice = server.login("alice").await?;
    let bob = server.login("bob").await?;
    let post = server.post_as(&alice, "first").await?;

    let comment: Value = server
        .client
        .post(server.url(&format!("/posts/{}/comments/", post["id"])))
        .bearer_auth(&alice)
        .json(&json!({ "text": "mine" }))
        .send()
        .await?
        .json()
        .await?;
    let path = format!("/posts/{}/comments/{}/", post["id"], comment["id"]);

    let res = server.client.patch(server.url(&path)).bearer_auth(&bob).json(&json!({ "text": "x" })).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let res = server.client.delete(server.url(&path)).bearer_auth(&bob).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let stored: Value = server.client.get(server.url(&path)).send().await?.json().await?;
    assert_eq!(stored["text"], "mine");

    let res = server.client.patch(server.url(&path)).bearer_auth(&alice).json(&json!({ "text": "edited" })).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let res = server.client.delete(server.url(&path)).bearer_auth(&alice).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let missing = format!("/posts/{}/comments/999/", post["id"]);
    let res = server.client.delete(server.url(&missing)).bearer_auth(&bob).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
