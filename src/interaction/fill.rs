use chromiumoxide::page::Page;

use crate::error::StepError;
use crate::selectors::{selector_to_js, Selector};

use super::eval_element_op;

/// Replace the value of an input or textarea with `text`, firing the
/// input/change events frameworks listen for. Acts on the first match.
pub async fn fill(page: &Page, selector: &Selector, text: &str) -> Result<(), StepError> {
    let selector_js = selector_to_js(selector)?;
    let text_str = serde_json::to_string(text)
        .map_err(|e| StepError::Transport(format!("failed to quote text: {e}")))?;

    let js = format!(
        r#"(() => {{
            const el = {selector_js};
            if (!el) return {{ error: 'not-found' }};
            el.scrollIntoView({{ block: 'center', behavior: 'instant' }});
            el.focus();
            const setter = Object.getOwnPropertyDescriptor(
                window.HTMLInputElement.prototype, 'value'
            )?.set || Object.getOwnPropertyDescriptor(
                window.HTMLTextAreaElement.prototype, 'value'
            )?.set;
            if (setter && (el.tagName === 'INPUT' || el.tagName === 'TEXTAREA')) {{
                setter.call(el, {text_str});
            }} else {{
                el.value = {text_str};
            }}
            el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            return {{ ok: true }};
        }})()"#,
    );

    eval_element_op(page, js, selector, "failed to fill element").await?;
    Ok(())
}
