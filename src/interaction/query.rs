use chromiumoxide::page::Page;

use crate::error::StepError;
use crate::selectors::{selector_to_js, Selector};

use super::eval_element_op;

/// Trimmed text content of the first element the selector resolves to.
pub async fn text_content(page: &Page, selector: &Selector) -> Result<String, StepError> {
    let selector_js = selector_to_js(selector)?;
    let js = format!(
        r#"(() => {{
            const el = {selector_js};
            if (!el) return {{ error: 'not-found' }};
            return {{ text: (el.textContent || '').trim() }};
        }})()"#,
    );

    let result = eval_element_op(page, js, selector, "failed to get text").await?;
    Ok(result["text"].as_str().unwrap_or_default().to_string())
}
