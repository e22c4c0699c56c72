#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use yatube_api::auth::hash_password;
use yatube_api::config::{AppConfig, MIN_HASH_COST};
use yatube_api::database::models::Group;
use yatube_api::database::{groups, users, DatabaseManager};
use yatube_api::{app, AppState};

/// One server per test, each over its own in-memory store
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub db: DatabaseManager,
    pub client: reqwest::Client,
}

impl TestServer {
    async fn spawn(config: AppConfig) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let db = DatabaseManager::connect_and_migrate(&config.database).await?;
        let state = AppState::new(db.clone(), config)?;

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app(state)).await {
                eprintln!("test server stopped: {}", e);
            }
        });

        Ok(Self { port, base_url, db, client: reqwest::Client::new() })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    /// Insert a user directly; the password is always "pass1234"
    pub async fn user(&self, username: &str) -> Result<i64> {
        let hash = hash_password("pass1234", MIN_HASH_COST)?;
        Ok(users::create(self.db.pool(), username, &hash).await?.id)
    }

    /// Create a user and log in through the API, returning an access token
    pub async fn login(&self, username: &str) -> Result<String> {
        self.user(username).await?;
        let body: Value = self
            .client
            .post(self.url("/jwt/create/"))
            .json(&json!({ "username": username, "password": "pass1234" }))
            .send()
            .await?
            .json()
            .await?;
        body["access"].as_str().map(str::to_string).context("no access token in response")
    }

    pub async fn group(&self, title: &str, slug: &str) -> Result<Group> {
        Ok(groups::create(self.db.pool(), title, slug, "").await?)
    }

    pub async fn post_as(&self, token: &str, text: &str) -> Result<Value> {
        let resp = self
            .client
            .post(self.url("/posts/"))
            .bearer_auth(token)
            .json(&json!({ "text": text }))
            .send()
            .await?;
        anyhow::ensure!(resp.status() == StatusCode::CREATED, "post create failed: {}", resp.status());
        Ok(resp.json().await?)
    }
}

pub async fn spawn_server() -> Result<TestServer> {
    spawn_server_with(AppConfig::testing()).await
}

pub async fn spawn_server_with(config: AppConfig) -> Result<TestServer> {
    let server = TestServer::spawn(config).await?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}
