mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn anonymous_follow_is_401() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/follow/")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let res = server.client.post(server.url("/follow/")).json(&json!({ "following": "x" })).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn follow_duplicate_and_self() -> Result<()> {
    let server = common::spawn_server().await?;
    let u1 = server.login("u1").await?;
    server.user("u2").await?;

    let res = server
        .client
        .post(server.url("/follow/"))
        .bearer_auth(&u1)
        .json(&json!({ "following": "u2" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.json::<Value>().await?, json!({ "user": "u1", "following": "u2" }));

    let res = server
        .client
        .post(server.url("/follow/"))
        .bearer_auth(&u1)
        .json(&json!({ "following": "u2" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .client
        .post(server.url("/follow/"))
        .bearer_auth(&u1)
        .json(&json!({ "following": "u1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server.client.post(server.url("/follow/")).bearer_auth(&u1).json(&json!({})).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let listed: Value = server.client.get(server.url("/follow/")).bearer_auth(&u1).send().await?.json().await?;
    assert_eq!(listed, json!([{ "user": "u1", "following": "u2" }]));
    Ok(())
}

#[tokio::test]
async fn list_shows_own_follows_and_filters_by_search() -> Result<()> {
    let server = common::spawn_server().await?;
    let u1 = server.login("u1").await?;
    let u2 = server.login("u2").await?;
    server.user("catlover").await?;
    server.user("doglover").await?;

    for (token, target) in [(&u1, "catlover"), (&u1, "doglover"), (&u2, "catlover")] {
        let res = server
            .client
            .post(server.url("/follow/"))
            .bearer_auth(token)
            .json(&json!({ "following": target }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let mine: Value = server.client.get(server.url("/follow/")).bearer_auth(&u1).send().await?.json().await?;
    assert_eq!(mine.as_array().map(Vec::len), Some(2));
    assert!(mine.as_array().unwrap().iter().all(|f| f["user"] == "u1"));

    let found: Value = server
        .client
        .get(server.url("/follow/?search=dog"))
        .bearer_auth(&u1)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(found, json!([{ "user": "u1", "following": "doglover" }]));
    Ok(())
}
