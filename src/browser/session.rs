use std::time::Duration;

use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::pool::PagePool;
use crate::error::StepError;

/// A live connection to the remote browser pool.
///
/// The session owns every page it hands out; pages are closed before the
/// transport goes away, and closing the session twice is a no-op.
pub struct RemoteSession {
    inner: Mutex<Option<Inner>>,
}

struct Inner {
    browser: Browser,
    handler_task: JoinHandle<()>,
    pool: PagePool,
}

impl RemoteSession {
    /// Connect to the pool's WebSocket endpoint. Fails fast: a dead
    /// endpoint is surfaced to the caller immediately, no retry.
    pub async fn connect(endpoint: &str, timeout: Duration) -> Result<Self, StepError> {
        tracing::info!("connecting to {}", endpoint);

        let (browser, mut handler) = tokio::time::timeout(timeout, Browser::connect(endpoint))
            .await
            .map_err(|_| StepError::Connection {
                endpoint: endpoint.to_string(),
                message: format!("handshake timed out after {}ms", timeout.as_millis()),
            })?
            .map_err(|e| StepError::Connection {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {
                // Drain CDP events for the lifetime of the connection
            }
        });

        tracing::info!("connected to {}", endpoint);

        Ok(Self {
            inner: Mutex::new(Some(Inner {
                browser,
                handler_task,
                pool: PagePool::new(),
            })),
        })
    }

    /// Allocate a fresh browsing context on the open session.
    pub async fn new_page(&self) -> Result<Page, StepError> {
        let mut inner = self.inner.lock().await;
        let inner = inner.as_mut().ok_or(StepError::SessionClosed)?;
        let page = inner
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| StepError::Transport(format!("failed to open page: {e}")))?;
        inner.pool.add(page.clone());
        tracing::debug!("opened page ({} now open)", inner.pool.len());
        Ok(page)
    }

    /// Close one page explicitly and forget it from the pool.
    pub async fn close_page(&self, page: Page) -> Result<(), StepError> {
        {
            let mut inner = self.inner.lock().await;
            let inner = inner.as_mut().ok_or(StepError::SessionClosed)?;
            inner.pool.remove(&page);
        }
        page.close()
            .await
            .map_err(|e| StepError::Transport(format!("failed to close page: {e}")))?;
        Ok(())
    }

    /// Disconnect from the pool. Any pages still open are closed first;
    /// the remote browser itself stays up, only the transport drops.
    /// Idempotent.
    pub async fn close(&self) {
        let inner = { self.inner.lock().await.take() };
        let Some(inner) = inner else {
            return;
        };

        for page in inner.pool.into_pages() {
            if let Err(err) = page.close().await {
                tracing::debug!("page close during teardown failed: {}", err);
            }
        }

        drop(inner.browser);
        inner.handler_task.abort();
        tracing::info!("session closed");
    }
}
