#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};

use petcare_api::auth::{CredentialError, CredentialVerifier, SessionTokenCodec, SigningKey, VerifiedIdentity};
use petcare_api::config::{AppConfig, StoreBackend};
use petcare_api::database::MemoryDocumentStore;
use petcare_api::{app, AppState};

/// 32 byte secret, base64 encoded
pub const TEST_SECRET: &str = "cGV0Y2FyZS1pbnRlZ3JhdGlvbi10ZXN0LXNlY3JldCE=";

/// Accepts identity tokens of the form `id:<subject>[:<email>[:<name>]]`.
pub struct FakeVerifier;

#[async_trait]
impl CredentialVerifier for FakeVerifier {
    async fn verify(&self, identity_token: &str) -> Result<VerifiedIdentity, CredentialError> {
        let mut parts = identity_token.split(':');
        match (parts.next(), parts.next()) {
            (Some("id"), Some(subject)) if !subject.is_empty() => Ok(VerifiedIdentity {
                subject_id: subject.to_string(),
                email: parts.next().map(str::to_string),
                display_name: parts.next().map(str::to_string),
            }),
            _ => Err(CredentialError::InvalidCredential(
                "token signature rejected".to_string(),
            )),
        }
    }
}

pub fn codec() -> SessionTokenCodec {
    SessionTokenCodec::new(SigningKey::from_base64(TEST_SECRET).expect("test secret"))
}

/// One in-process server per test. Each `#[tokio::test]` owns its runtime, so the
/// server cannot be shared between tests.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.store.backend = StoreBackend::Memory;
        config.security.jwt_secret = TEST_SECRET.to_string();
        config.identity.firebase_project_id = "petcare-test".to_string();
        config.api.port = port;

        let state = AppState::new(
            config,
            codec(),
            Arc::new(FakeVerifier),
            Arc::new(MemoryDocumentStore::new()),
        );

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            port,
            base_url,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register `user_id` through the public endpoint and return its session token.
    pub async fn register(&self, user_id: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({
                "idToken": format!("id:{}:{}@example.com:{}", user_id, user_id, user_id),
                "name": user_id,
                "phone": "555-0100"
            }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "register failed: {}", res.status());

        let body: Value = res.json().await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("register response has no token")
    }

    pub async fn get(&self, token: &str, path: &str) -> Result<reqwest::Response> {
        Ok(self.client.get(self.url(path)).bearer_auth(token).send().await?)
    }

    pub async fn post(&self, token: &str, path: &str, body: Value) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?)
    }

    pub async fn patch(&self, token: &str, path: &str, body: Option<Value>) -> Result<reqwest::Response> {
        let request = self.client.patch(self.url(path)).bearer_auth(token);
        let request = match body {
            Some(body) => request.json(&body),
            None => request,
        };
        Ok(request.send().await?)
    }

    /// Create a pet for `user_id` and return its id.
    pub async fn create_pet(&self, token: &str, user_id: &str, name: &str) -> Result<String> {
        let res = self
            .post(
                token,
                &format!("/api/users/{}/pets", user_id),
                json!({ "name": name, "species": "Dog", "breed": "Beagle", "age": 3, "gender": "F", "weight": 11.5 }),
            )
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create pet failed: {}", res.status());

        let body: Value = res.json().await?;
        body["data"]["petID"]
            .as_str()
            .map(str::to_string)
            .context("pet response has no petID")
    }
}

/// Pull `data` out of a success envelope.
pub async fn data(res: reqwest::Response) -> Result<Value> {
    let body: Value = res.json().await?;
    anyhow::ensure!(body["success"] == json!(true), "not a success envelope: {}", body);
    Ok(body["data"].clone())
}
