use anyhow::{Context, Result};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::webdriver::BrowserType;

/// Manages WebDriver processes (geckodriver, chromedriver).
///
/// Owned by the caller; children started here are killed when the manager
/// drops, so a CLI run leaves no stray drivers behind.
pub struct DriverManager {
    processes: Mutex<Vec<DriverProcess>>,
}

struct DriverProcess {
    child: Child,
    port: u16,
}

impl Default for DriverManager {
    fn default() -> Self {
        Self {
            processes: Mutex::new(Vec::new()),
        }
    }
}

impl DriverManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a WebDriver is reachable for the given browser type and return
    /// its URL. Prefers an externally managed driver on the standard port;
    /// otherwise starts one.
    pub async fn ensure_driver(&self, browser_type: BrowserType) -> Result<String> {
        let standard_url = match browser_type {
            BrowserType::Firefox => "http://localhost:4444",
            BrowserType::Chrome => "http://localhost:9515",
        };
        if Self::is_driver_ready(standard_url).await {
            debug!("Found external WebDriver at {}", standard_url);
            return Ok(standard_url.to_string());
        }

        info!("WebDriver not detected, attempting to start automatically...");
        self.start_driver(browser_type).await
    }

    async fn start_driver(&self, browser_type: BrowserType) -> Result<String> {
        let port = Self::find_free_port(browser_type)?;
        let (command, args) = match browser_type {
            BrowserType::Firefox => {
                info!("Starting geckodriver on port {}", port);
                ("geckodriver", vec!["--port".to_string(), port.to_string()])
            }
            BrowserType::Chrome => {
                info!("Starting chromedriver on port {}", port);
                ("chromedriver", vec![format!("--port={}", port)])
            }
        };

        if !Self::command_exists(command) {
            anyhow::bail!(
                "{} not found in PATH. Please install it:\n\
                  macOS: brew install {}\n\
                  Linux: Download from official releases\n\
                  Or see: https://www.selenium.dev/documentation/webdriver/getting_started/install_drivers/",
                command,
                command
            );
        }

        let child = Command::new(command)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context(format!("Failed to start {}", command))?;

        let url = format!("http://localhost:{}", port);
        self.processes
            .lock()
            .unwrap()
            .push(DriverProcess { child, port });

        // Wait for driver to be ready (with timeout)
        let max_attempts = 30; // 3 seconds total
        for attempt in 1..=max_attempts {
            if Self::is_driver_ready(&url).await {
                info!("WebDriver started successfully on port {}", port);
                return Ok(url);
            }
            if attempt < max_attempts {
                sleep(Duration::from_millis(100)).await;
            }
        }

        self.stop_port(port);
        anyhow::bail!("WebDriver failed to start within timeout")
    }

    /// Check if a command exists in PATH
    fn command_exists(command: &str) -> bool {
        #[cfg(unix)]
        {
            Command::new("which")
                .arg(command)
                .output()
                .map(|output| output.status.success())
                .unwrap_or(false)
        }

        #[cfg(windows)]
        {
            Command::new("where")
                .arg(command)
                .output()
                .map(|output| output.status.success())
                .unwrap_or(false)
        }
    }

    /// Find a free port, preferring the conventional ones per driver.
    fn find_free_port(browser_type: BrowserType) -> Result<u16> {
        let preferred_ports = match browser_type {
            BrowserType::Firefox => [4444, 4445, 4446],
            BrowserType::Chrome => [9515, 9516, 9517],
        };

        for port in preferred_ports {
            if std::net::TcpListener::bind(("127.0.0.1", port)).is_ok() {
                debug!("Found free port {} for {:?}", port, browser_type);
                return Ok(port);
            }
        }

        // Fall back to letting the OS assign a port
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        drop(listener);
        Ok(port)
    }

    /// A ready driver answers its status endpoint with `ready: true`.
    async fn is_driver_ready(url: &str) -> bool {
        let status_url = format!("{}/status", url);
        match reqwest::Client::new()
            .get(&status_url)
            .timeout(Duration::from_secs(1))
            .send()
            .await
        {
            Ok(response) => match response.json::<serde_json::Value>().await {
                Ok(body) => body
                    .get("value")
                    .and_then(|v| v.get("ready"))
                    .and_then(|r| r.as_bool())
                    .unwrap_or(false),
                Err(_) => false,
            },
            Err(_) => false,
        }
    }

    fn stop_port(&self, port: u16) {
        let mut processes = self.processes.lock().unwrap();
        if let Some(index) = processes.iter().position(|p| p.port == port) {
            let mut process = processes.remove(index);
            let _ = process.child.kill();
        }
    }

    /// Stop all managed WebDriver processes
    pub fn stop_all(&self) {
        let mut processes = self.processes.lock().unwrap();
        for process in processes.iter_mut() {
            debug!("Stopping WebDriver on port {}", process.port);
            let _ = process.child.kill();
        }
        processes.clear();
    }
}

impl Drop for DriverManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}
