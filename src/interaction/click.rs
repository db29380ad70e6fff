use chromiumoxide::page::Page;

use crate::error::StepError;
use crate::selectors::{selector_to_js, Selector};

use super::eval_element_op;

/// Hybrid click strategy:
/// 1. Resolve selector to element
/// 2. Scroll into view
/// 3. Check visibility and obstruction
/// 4. Dispatch mouse events if the element is clickable, fall back to a
///    plain JS click otherwise
pub async fn click(page: &Page, selector: &Selector) -> Result<(), StepError> {
    let selector_js = selector_to_js(selector)?;

    let check_js = format!(
        r#"(() => {{
            const el = {selector_js};
            if (!el) return {{ error: 'not-found' }};

            el.scrollIntoView({{ block: 'center', inline: 'center', behavior: 'instant' }});

            const rect = el.getBoundingClientRect();
            if (rect.width === 0 && rect.height === 0) {{
                return {{ visible: false }};
            }}

            const style = getComputedStyle(el);
            if (style.display === 'none' || style.visibility === 'hidden' || parseFloat(style.opacity) === 0) {{
                return {{ visible: false }};
            }}

            const centerX = rect.left + rect.width / 2;
            const centerY = rect.top + rect.height / 2;
            const topEl = document.elementFromPoint(centerX, centerY);
            const unobscured = topEl && (el === topEl || el.contains(topEl) || topEl.contains(el));

            return {{ visible: true, unobscured: unobscured }};
        }})()"#,
    );

    let check = eval_element_op(page, check_js, selector, "failed to inspect click target").await?;
    let visible = check["visible"].as_bool().unwrap_or(false);
    let unobscured = check["unobscured"].as_bool().unwrap_or(false);

    // Let scroll/layout settle before dispatching events.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let click_js = if visible && unobscured {
        format!(
            r#"(() => {{
                const el = {selector_js};
                if (!el) return {{ error: 'not-found' }};
                const rect = el.getBoundingClientRect();
                const opts = {{
                    bubbles: true,
                    cancelable: true,
                    clientX: rect.left + rect.width / 2,
                    clientY: rect.top + rect.height / 2,
                    button: 0
                }};
                el.dispatchEvent(new MouseEvent('mousemove', opts));
                el.dispatchEvent(new MouseEvent('mousedown', opts));
                el.dispatchEvent(new MouseEvent('mouseup', opts));
                el.dispatchEvent(new MouseEvent('click', opts));
                return {{ ok: true }};
            }})()"#,
        )
    } else {
        format!(
            r#"(() => {{
                const el = {selector_js};
                if (!el) return {{ error: 'not-found' }};
                el.click();
                return {{ ok: true }};
            }})()"#,
        )
    };

    eval_element_op(page, click_js, selector, "failed to click element").await?;
    Ok(())
}
