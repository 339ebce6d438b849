#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{multipart, Response, StatusCode};
use serde_json::Value;

use journey_api::config::{AppConfig, Environment};
use journey_api::database::DatabaseManager;
use journey_api::AppState;

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

/// A registered account: its token and the user summary returned at registration
pub struct Account {
    pub token: String,
    pub id: String,
    pub user: Value,
}

impl TestServer {
    /// Serve the app in-process against a fresh in-memory database
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::for_environment(Environment::Development);
        config.api.enable_request_logging = false;
        config.upload.max_file_bytes = 64 * 1024;

        let pool = DatabaseManager::in_memory().await?;
        let app = journey_api::app(AppState::new(pool, config));

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self {
            port,
            base_url,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/api/health")).send().await {
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

    pub async fn register(&self, name: &str, email: &str, user_type: &str) -> Result<Account> {
        let form = multipart::Form::new()
            .text("name", name.to_string())
            .text("email", email.to_string())
            .text("password", "secret123")
            .text("userType", user_type.to_string())
            .text("gender", "other");

        let res = self
            .client
            .post(self.url("/api/auth/register"))
            .multipart(form)
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

        let body = res.json::<Value>().await?;
        let data = &body["data"];
        Ok(Account {
            token: data["token"].as_str().context("missing token")?.to_string(),
            id: data["user"]["id"].as_str().context("missing user id")?.to_string(),
            user: data["user"].clone(),
        })
    }

    pub async fn traveler(&self, email: &str) -> Result<Account> {
        self.register("Traveler", email, "traveler").await
    }

    pub async fn seeker(&self, email: &str) -> Result<Account> {
        self.register("Seeker", email, "seeker").await
    }

    /// Minimal valid journey form; `extra` fields are appended
    pub fn journey_form(&self, title: &str, extra: &[(&str, &str)]) -> multipart::Form {
        let mut form = multipart::Form::new()
            .text("title", title.to_string())
            .text("description", "A trip worth writing about")
            .text("startLocation", "Lisbon")
            .text("endLocation", "Porto")
            .text("startDate", "2024-01-01")
            .text("endDate", "2024-01-05");
        for (key, value) in extra {
            form = form.text(key.to_string(), value.to_string());
        }
        form
    }

    pub async fn create_journey(&self, token: &str, form: multipart::Form) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/api/journeys"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?)
    }

    /// Create and return the journey's JSON, failing unless the server answers 201
    pub async fn journey(&self, token: &str, title: &str) -> Result<Value> {
        let res = self.create_journey(token, self.journey_form(title, &[])).await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create failed: {}", res.status());
        let body = res.json::<Value>().await?;
        Ok(body["data"]["journey"].clone())
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<Response> {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Ok(req.send().await?)
    }

    pub async fn post_json(&self, path: &str, token: &str, body: &Value) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }
}

/// Status plus parsed body, for asserting on both
pub async fn read(res: Response) -> Result<(StatusCode, Value)> {
    let status = res.status();
    let body = res.json::<Value>().await?;
    Ok((status, body))
}
