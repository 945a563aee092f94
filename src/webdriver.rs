use anyhow::{Context, Result};
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::context::{FrameTarget, IframeStep};
use crate::errors::EngineError;
use crate::snapshot::{self, PageInspection, RawCollection};
use crate::target::{LocatorSpec, Target};
use crate::types::ViewportSize;

/// Browser session for WebDriver automation.
///
/// One `Browser` owns one page. Callers issue engine operations strictly one
/// at a time; the engine holds no cross-call state about the page (no cached
/// frame handles, no cached snapshots), so detached frames and re-rendered
/// elements cannot leak between calls.
pub struct Browser {
    pub(crate) client: Client,
    browser_type: BrowserType,
    pub(crate) config: EngineConfig,
}

/// Supported browser types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BrowserType {
    /// Mozilla Firefox
    Firefox,
    /// Google Chrome/Chromium
    Chrome,
}

impl std::str::FromStr for BrowserType {
    type Err = anyhow::Error;

    /// Parse browser type from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "firefox" => Ok(BrowserType::Firefox),
            "chrome" | "chromium" => Ok(BrowserType::Chrome),
            _ => anyhow::bail!("Unsupported browser: {}", s),
        }
    }
}

/// Basic facts about the current page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInfo {
    pub url: String,
    pub title: String,
    pub viewport: Option<ViewportSize>,
}

/// Result of a non-waiting element existence probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistsReport {
    pub exists: bool,
    pub visible: bool,
}

impl Browser {
    /// Connect to a running WebDriver at `webdriver_url`.
    ///
    /// # Arguments
    /// * `webdriver_url` - geckodriver/chromedriver endpoint
    /// * `browser_type` - Firefox or Chrome
    /// * `viewport` - Optional viewport dimensions
    /// * `headless` - Whether to run in headless mode
    /// * `config` - Engine tuning knobs
    pub async fn connect(
        webdriver_url: &str,
        browser_type: BrowserType,
        viewport: Option<ViewportSize>,
        headless: bool,
        config: EngineConfig,
    ) -> Result<Self> {
        info!("Connecting to {:?} WebDriver at {}", browser_type, webdriver_url);

        let mut caps = serde_json::Map::new();

        match &browser_type {
            BrowserType::Firefox => {
                let mut firefox_opts = serde_json::Map::new();
                let mut args = Vec::new();

                if headless {
                    args.push("--headless".to_string());
                }

                if let Some(vp) = &viewport {
                    args.push(format!("--width={}", vp.width));
                    args.push(format!("--height={}", vp.height));
                }

                firefox_opts.insert("args".to_string(), json!(args));
                caps.insert("moz:firefoxOptions".to_string(), json!(firefox_opts));
            }
            BrowserType::Chrome => {
                let mut chrome_opts = serde_json::Map::new();
                let mut args = vec!["--no-sandbox".to_string()];

                if headless {
                    args.push("--headless=new".to_string());
                    args.push("--disable-gpu".to_string());
                    args.push("--disable-dev-shm-usage".to_string());
                }

                if let Some(vp) = &viewport {
                    args.push(format!("--window-size={},{}", vp.width, vp.height));
                }

                // Chrome is strict about concurrent profile use; every
                // session gets its own scratch profile directory.
                let profile_dir = tempfile::Builder::new()
                    .prefix("webgrip-chrome-")
                    .tempdir()?;
                #[allow(deprecated)]
                let profile_path = profile_dir.into_path();
                args.push(format!("--user-data-dir={}", profile_path.display()));

                chrome_opts.insert("args".to_string(), json!(args));
                caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));
            }
        }

        debug!("Connecting to WebDriver at {}", webdriver_url);

        let client = match ClientBuilder::rustls()
            .capabilities(caps.clone())
            .connect(webdriver_url)
            .await
        {
            Ok(client) => client,
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("Session is already started")
                    || error_str.contains("session not created")
                {
                    // Stale session on the driver side; give it a moment and
                    // retry once before giving up.
                    info!("WebDriver reports a stale session, retrying once...");
                    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
                    ClientBuilder::rustls()
                        .capabilities(caps)
                        .connect(webdriver_url)
                        .await
                        .context("Failed to connect to WebDriver after retry")?
                } else {
                    return Err(e).context("Failed to connect to WebDriver");
                }
            }
        };

        if let Some(vp) = viewport {
            debug!("Setting viewport to {}x{}", vp.width, vp.height);
            if let Err(e) = client.set_window_size(vp.width, vp.height).await {
                debug!("Note: Could not set window size: {}", e);
            }
        }

        Ok(Browser {
            client,
            browser_type,
            config,
        })
    }

    pub fn browser_type(&self) -> BrowserType {
        self.browser_type
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Navigate and wait for the document to finish loading.
    pub async fn goto(&self, url: &str) -> Result<()> {
        info!("Navigating to {}", url);
        self.client.goto(url).await?;

        // Wait for the page to be ready before the first interaction
        let wait_script = "return document.readyState === 'complete';";
        for _ in 0..20 {
            // Max 2 seconds
            match self.client.execute(wait_script, vec![]).await {
                Ok(val) if val.as_bool().unwrap_or(false) => break,
                _ => tokio::time::sleep(std::time::Duration::from_millis(100)).await,
            }
        }

        Ok(())
    }

    /// Get the current URL - useful for health checks
    pub async fn current_url(&self) -> Result<String> {
        Ok(self.client.current_url().await?.to_string())
    }

    /// URL, title and viewport of the current page.
    pub async fn page_info(&self) -> Result<PageInfo> {
        let url = self.client.current_url().await?.to_string();
        let title = self
            .client
            .execute("return document.title;", vec![])
            .await?
            .as_str()
            .unwrap_or_default()
            .to_string();
        let viewport = self
            .client
            .execute(
                "return { width: window.innerWidth, height: window.innerHeight };",
                vec![],
            )
            .await
            .ok()
            .and_then(|v| serde_json::from_value(v).ok());
        Ok(PageInfo { url, title, viewport })
    }

    /// Capture a PNG screenshot of the current page.
    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        let bytes = self.client.screenshot().await?;
        info!("Captured screenshot ({} bytes)", bytes.len());
        Ok(bytes)
    }

    /// Press a key (by human name, e.g. "Enter") on the focused element.
    pub async fn press_key(&self, key: &str) -> Result<()> {
        use fantoccini::key::Key;
        let mapped: Option<Key> = match key.to_lowercase().as_str() {
            "enter" => Some(Key::Enter),
            "return" => Some(Key::Return),
            "tab" => Some(Key::Tab),
            "escape" | "esc" => Some(Key::Escape),
            "backspace" => Some(Key::Backspace),
            "delete" => Some(Key::Delete),
            "space" => Some(Key::Space),
            "arrowup" | "up" => Some(Key::Up),
            "arrowdown" | "down" => Some(Key::Down),
            "arrowleft" | "left" => Some(Key::Left),
            "arrowright" | "right" => Some(Key::Right),
            "home" => Some(Key::Home),
            "end" => Some(Key::End),
            "pageup" => Some(Key::PageUp),
            "pagedown" => Some(Key::PageDown),
            _ => None,
        };
        let sequence = match mapped {
            Some(k) => char::from(k).to_string(),
            // Unrecognized names are sent as literal keystrokes
            None => key.to_string(),
        };
        let active = self.client.active_element().await?;
        active.send_keys(&sequence).await?;
        info!("Pressed key: {}", key);
        Ok(())
    }

    /// Execute JavaScript in the current context.
    pub async fn execute(
        &self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        self.client
            .execute(script, args)
            .await
            .context("Failed to execute script")
    }

    /// Visible text of the first element a descriptor matches, bounded by
    /// the per-attempt timeout.
    pub async fn get_text(
        &self,
        target: &Target,
        frame: &FrameTarget,
    ) -> Result<String, EngineError> {
        self.resolve_context(frame).await?;
        let spec = target.materialize(&self.config)?;
        let element = self
            .find_with_timeout(&spec, &target.label(), self.config.per_attempt_timeout())
            .await?;
        Ok(element.text().await?)
    }

    /// Non-waiting existence probe for a descriptor.
    pub async fn check_element_exists(
        &self,
        target: &Target,
        frame: &FrameTarget,
    ) -> Result<ExistsReport, EngineError> {
        self.resolve_context(frame).await?;
        let spec = target.materialize(&self.config)?;
        match self.client.find(spec.as_locator()).await {
            Ok(element) => Ok(ExistsReport {
                exists: true,
                visible: element.is_displayed().await.unwrap_or(false),
            }),
            Err(_) => Ok(ExistsReport {
                exists: false,
                visible: false,
            }),
        }
    }

    // ==================== context resolution ====================

    async fn switch_to_top(&self) -> Result<(), EngineError> {
        self.client.clone().enter_frame(None).await?;
        Ok(())
    }

    /// Wait for one iframe step's `<iframe>` element to appear.
    async fn find_iframe_step(
        &self,
        step: &IframeStep,
        index: usize,
    ) -> Result<Element, EngineError> {
        let timeout = self.config.frame_timeout();
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(sel) = &step.selector {
                if let Ok(el) = self.client.find(Locator::Css(sel)).await {
                    return Ok(el);
                }
            } else if let Some(pattern) = &step.url_pattern
                && let Ok(frames) = self.client.find_all(Locator::Css("iframe")).await
            {
                for frame in frames {
                    if let Ok(Some(src)) = frame.attr("src").await
                        && src.contains(pattern.as_str())
                    {
                        return Ok(frame);
                    }
                }
            }
            if Instant::now() >= deadline {
                return Err(EngineError::FrameNotFound {
                    step: index,
                    timeout_ms: timeout.as_millis() as u64,
                    detail: step.describe(),
                });
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        }
    }

    /// Switch the session into the requested document scope.
    ///
    /// Always re-resolves from the top document; a path of length k costs k
    /// sequential iframe lookups, each bounded by the frame timeout. The one
    /// allowed degradation: a single url-pattern-only step that misses falls
    /// back to the first iframe on the page (pages often set iframe `src`
    /// asynchronously after navigation); logged, never silent. With zero
    /// iframes present the miss stays a `FrameNotFound`.
    pub async fn resolve_context(&self, frame: &FrameTarget) -> Result<(), EngineError> {
        self.switch_to_top().await?;
        let steps = match frame {
            FrameTarget::Top => return Ok(()),
            FrameTarget::Frames(steps) => steps,
        };
        let degradable = frame.degrades_to_first_iframe();
        for (index, step) in steps.iter().enumerate() {
            let element = match self.find_iframe_step(step, index).await {
                Ok(el) => el,
                Err(err) if degradable => {
                    match self.client.find(Locator::Css("iframe")).await {
                        Ok(first) => {
                            warn!(
                                "{} matched no iframe; degrading to the first iframe on the page",
                                step.describe()
                            );
                            first
                        }
                        // No iframes at all: the miss is real
                        Err(_) => return Err(err),
                    }
                }
                Err(err) => return Err(err),
            };
            element
                .clone()
                .enter_frame()
                .await
                .map_err(|_| EngineError::FrameDetached { step: index })?;
            debug!("Entered iframe at step {}", index);
        }
        Ok(())
    }

    // ==================== element lookup helpers ====================

    /// Poll for the first element matching a locator until the deadline.
    pub(crate) async fn find_with_timeout(
        &self,
        spec: &LocatorSpec,
        label: &str,
        timeout: std::time::Duration,
    ) -> Result<Element, EngineError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.client.find(spec.as_locator()).await {
                Ok(element) => return Ok(element),
                Err(_) if Instant::now() < deadline => {
                    tokio::time::sleep(self.config.poll_interval().min(
                        std::time::Duration::from_millis(100),
                    ))
                    .await;
                }
                Err(_) => {
                    return Err(EngineError::Timeout {
                        operation: format!("locating '{label}'"),
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
            }
        }
    }

    /// Best-effort scroll; animated containers may reject it and the click
    /// tiers proceed regardless.
    pub(crate) async fn scroll_into_view(&self, element: &Element) {
        let arg = match serde_json::to_value(element) {
            Ok(v) => v,
            Err(_) => return,
        };
        if let Err(e) = self
            .client
            .execute(
                "arguments[0].scrollIntoView({block: 'center', inline: 'nearest'});",
                vec![arg],
            )
            .await
        {
            debug!("scrollIntoView failed (ignored): {}", e);
        }
    }

    // ==================== inspection ====================

    /// Read-only scan of the resolved context for interactive elements.
    ///
    /// `root_selector` bounds the scan to a sub-region (a card or modal that
    /// just changed) so callers can rediscover without a full-page pass.
    /// Running this twice with no intervening DOM change yields structurally
    /// identical output; nothing is cached or mutated.
    pub async fn inspect(
        &self,
        frame: &FrameTarget,
        root_selector: Option<&str>,
    ) -> Result<PageInspection, EngineError> {
        self.resolve_context(frame).await?;
        let args = vec![
            json!(root_selector),
            json!(self.config.clickable_classes),
            json!(self.config.text_truncate),
            json!(self.config.test_id_attribute),
        ];
        let value = self.client.execute(snapshot::COLLECT_SCRIPT, args).await?;
        let raw: RawCollection = serde_json::from_value(value).map_err(|e| {
            EngineError::WebDriverFailed(format!("collector returned malformed data: {e}"))
        })?;
        if let Some(err) = &raw.error {
            warn!("inspect: {}", err);
        }
        let inspection = snapshot::build_inspection(raw);
        info!(
            "Inspected {}: {} clickable, {} fields, {} controls, {} iframes",
            inspection.url,
            inspection.clickable_elements.len(),
            inspection.form_fields.len(),
            inspection.interactive_controls.len(),
            inspection.iframes.len()
        );
        Ok(inspection)
    }

    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}
