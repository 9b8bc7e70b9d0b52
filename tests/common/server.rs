//! Test server management.
//!
//! Spawns and manages message-service instances for integration testing.

use reqwest::StatusCode;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::time::Duration;
use tokio::time::sleep;

/// Connection string for a SQLite file inside `dir`.
#[allow(dead_code)]
pub fn sqlite_url(dir: &Path) -> String {
    format!("sqlite://{}", dir.join("messages.db").display())
}

/// A running service instance.
pub struct TestServer {
    child: Child,
    port: u16,
    http: reqwest::Client,
}

#[allow(dead_code)]
impl TestServer {
    /// Spawn the service with its config written into `dir`.
    ///
    /// `database_url` is passed through `DATABASE_URL`; `None` removes the
    /// variable so the service starts degraded.
    pub async fn spawn(dir: &Path, database_url: Option<&str>) -> anyhow::Result<Self> {
        let port = free_port()?;
        let config_path = write_config(dir, port)?;

        let mut command = Command::new(env!("CARGO_BIN_EXE_message-service"));
        command
            .arg(&config_path)
            .env("RUST_LOG", "warn")
            .env_remove("DATABASE_URL");
        if let Some(url) = database_url {
            command.env("DATABASE_URL", url);
        }

        let child = command.spawn()?;
        let mut server = Self {
            child,
            port,
            http: reqwest::Client::new(),
        };

        // Wait for server to start listening
        server.wait_until_ready().await?;

        Ok(server)
    }

    /// Wait until the server is accepting connections.
    async fn wait_until_ready(&mut self) -> anyhow::Result<()> {
        for _ in 0..100 {
            if let Some(status) = self.child.try_wait()? {
                anyhow::bail!("Server exited during startup: {status}");
            }
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 10 seconds")
    }

    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    /// GET `path` and decode the JSON body.
    pub async fn get(&self, path: &str) -> anyhow::Result<(StatusCode, Value)> {
        let response = self.http.get(self.url(path)).send().await?;
        let status = response.status();
        Ok((status, response.json().await?))
    }

    /// POST a raw body to `/save`.
    pub async fn save_raw(&self, body: &str) -> anyhow::Result<(StatusCode, Value)> {
        let response = self
            .http
            .post(self.url("/save"))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await?;
        let status = response.status();
        Ok((status, response.json().await?))
    }

    /// Save `text` as a message.
    pub async fn save(&self, text: &str) -> anyhow::Result<(StatusCode, Value)> {
        let body = serde_json::json!({ "message": text }).to_string();
        self.save_raw(&body).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Kill the server process
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

fn write_config(dir: &Path, port: u16) -> anyhow::Result<PathBuf> {
    let config_path = dir.join("config.toml");
    let config_content = format!(
        r#"
[server]
listen = "127.0.0.1:{port}"
metrics_port = 0

[database]
max_connections = 4
acquire_timeout_secs = 1
"#
    );
    std::fs::write(&config_path, config_content)?;
    Ok(config_path)
}
