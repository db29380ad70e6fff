use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotParams;
use chromiumoxide::page::Page;

use crate::error::StepError;
use crate::interaction::{click, fill, keyboard, probe::Probe, query, transport, wait};
use crate::selectors::Selector;

/// The operations a scenario step needs from a browsing context.
///
/// `CdpPage` is the real implementation; the runner's tests drive a
/// scripted fake through the same trait.
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), StepError>;
    async fn wait_for_navigation(&self, timeout: Duration) -> Result<(), StepError>;
    async fn fill(&self, selector: &Selector, text: &str) -> Result<(), StepError>;
    async fn press(&self, selector: &Selector, key: &str) -> Result<(), StepError>;
    async fn click(&self, selector: &Selector) -> Result<(), StepError>;
    async fn wait_for_visible(&self, selector: &Selector, timeout: Duration)
        -> Result<(), StepError>;
    async fn text_content(&self, selector: &Selector) -> Result<String, StepError>;
    async fn current_url(&self) -> Result<String, StepError>;
    async fn title(&self) -> Result<String, StepError>;
    async fn screenshot(&self, path: &Path) -> Result<(), StepError>;

    /// Visibility probe for guarded steps. Never fails: every error is
    /// folded into `NotVisible`.
    async fn probe_visible(&self, selector: &Selector, timeout: Duration) -> Probe {
        Probe::from_result(self.wait_for_visible(selector, timeout).await)
    }
}

/// A browsing context on the remote pool, driven over CDP.
pub struct CdpPage {
    page: Page,
}

impl CdpPage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn into_page(self) -> Page {
        self.page
    }
}

#[async_trait]
impl PageDriver for CdpPage {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), StepError> {
        tracing::info!("navigating to {}", url);
        tokio::time::timeout(timeout, self.page.goto(url))
            .await
            .map_err(|_| StepError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })?
            .map_err(|e| transport("navigation failed", e))?;

        // goto() waits for the load event; a short settle covers
        // post-load JS rendering.
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(())
    }

    async fn wait_for_navigation(&self, timeout: Duration) -> Result<(), StepError> {
        tokio::time::timeout(timeout, self.page.wait_for_navigation())
            .await
            .map_err(|_| StepError::NavigationTimeout {
                url: "(pending navigation)".to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })?
            .map_err(|e| transport("navigation wait failed", e))?;
        Ok(())
    }

    async fn fill(&self, selector: &Selector, text: &str) -> Result<(), StepError> {
        fill::fill(&self.page, selector, text).await
    }

    async fn press(&self, selector: &Selector, key: &str) -> Result<(), StepError> {
        keyboard::press(&self.page, selector, key).await
    }

    async fn click(&self, selector: &Selector) -> Result<(), StepError> {
        click::click(&self.page, selector).await
    }

    async fn wait_for_visible(
        &self,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<(), StepError> {
        wait::wait_for_visible(&self.page, selector, timeout).await
    }

    async fn text_content(&self, selector: &Selector) -> Result<String, StepError> {
        query::text_content(&self.page, selector).await
    }

    async fn current_url(&self) -> Result<String, StepError> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| transport("failed to read url", e))?;
        Ok(url.unwrap_or_default())
    }

    async fn title(&self) -> Result<String, StepError> {
        let title = self
            .page
            .get_title()
            .await
            .map_err(|e| transport("failed to read title", e))?;
        Ok(title.unwrap_or_default())
    }

    async fn screenshot(&self, path: &Path) -> Result<(), StepError> {
        let artifact_err = |message: String| StepError::Artifact {
            path: path.to_path_buf(),
            message,
        };

        let bytes = self
            .page
            .screenshot(CaptureScreenshotParams::builder().build())
            .await
            .map_err(|e| artifact_err(format!("capture failed: {e}")))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| artifact_err(e.to_string()))?;
            }
        }
        tokio::fs::write(path, &bytes)
            .await
            .map_err(|e| artifact_err(e.to_string()))?;

        tracing::info!("wrote screenshot to {}", path.display());
        Ok(())
    }
}
