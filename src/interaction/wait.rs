use std::time::Duration;

use chromiumoxide::page::Page;

use crate::error::StepError;
use crate::selectors::{selector_to_js, Selector};

/// Poll until the selector resolves to a visible element or the timeout
/// elapses. Evaluation errors during a poll count as "not visible yet";
/// expiry raises `WaitTimeout`.
pub async fn wait_for_visible(
    page: &Page,
    selector: &Selector,
    timeout: Duration,
) -> Result<(), StepError> {
    let selector_js = selector_to_js(selector)?;
    let check_js = format!(
        r#"(() => {{
            const el = {selector_js};
            if (!el) return false;
            const style = getComputedStyle(el);
            const rect = el.getBoundingClientRect();
            return style.display !== 'none'
                && style.visibility !== 'hidden'
                && parseFloat(style.opacity) > 0
                && rect.width > 0
                && rect.height > 0;
        }})()"#,
    );

    let interval = Duration::from_millis(100);
    let start = std::time::Instant::now();
    loop {
        let visible: bool = page
            .evaluate(check_js.as_str())
            .await
            .ok()
            .and_then(|r| r.into_value().ok())
            .unwrap_or(false);

        if visible {
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(StepError::WaitTimeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        tokio::time::sleep(interval).await;
    }
}
