use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub upload_dir: PathBuf,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Each test binary gets its own upload directory so blob assertions
        // cannot see files from other runs.
        let upload_dir = std::env::temp_dir().join(format!("ecom-api-test-{}-{}", port, nanos()));

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/ecom-admin-api");
        cmd.env("ECOM_API_PORT", port.to_string())
            .env("UPLOAD_DIR", &upload_dir)
            // Force the in-memory store so tests need no external services
            .env_remove("DATABASE_URL")
            .env_remove("PORT")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, upload_dir, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

fn nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos()
}

/// Unique value for fields with a uniqueness constraint; tests in one binary
/// run concurrently against a shared server.
#[allow(dead_code)]
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, nanos())
}

/// Register a fresh user and log in, returning `(token, email)`.
#[allow(dead_code)]
pub async fn register_and_login(server: &TestServer) -> Result<(String, String)> {
    let client = reqwest::Client::new();
    let email = format!("{}@example.com", unique("admin"));

    let res = client
        .post(server.url("/api/users/RegisterApi"))
        .json(&json!({
            "name": "Test Admin",
            "email": email,
            "mobile": 9876543210i64,
            "password": "hunter2",
        }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "registration failed: {}",
        res.status()
    );

    let res = client
        .post(server.url("/api/users/LoginApi"))
        .json(&json!({ "email": email, "password": "hunter2" }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

    let body = res.json::<Value>().await?;
    let token = body["token"]
        .as_str()
        .context("login response had no token")?
        .to_string();
    Ok((token, email))
}
