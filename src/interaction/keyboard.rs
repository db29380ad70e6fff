use chromiumoxide::page::Page;

use crate::error::StepError;
use crate::selectors::{selector_to_js, Selector};

use super::eval_element_op;

/// Send a key event to the element the selector resolves to.
///
/// Synthetic keyboard events never trigger default actions, so pressing
/// Enter inside a form additionally requests a form submit; the
/// search-box scenarios rely on that.
pub async fn press(page: &Page, selector: &Selector, key: &str) -> Result<(), StepError> {
    let selector_js = selector_to_js(selector)?;
    let (code, key_code) = key_to_code(key);
    let key_str = serde_json::to_string(key)
        .map_err(|e| StepError::Transport(format!("failed to quote key: {e}")))?;
    let code_str = serde_json::to_string(&code)
        .map_err(|e| StepError::Transport(format!("failed to quote key code: {e}")))?;

    let js = format!(
        r#"(() => {{
            const el = {selector_js};
            if (!el) return {{ error: 'not-found' }};
            el.focus();
            const opts = {{
                key: {key_str},
                code: {code_str},
                keyCode: {key_code},
                which: {key_code},
                bubbles: true,
                cancelable: true
            }};
            const down = el.dispatchEvent(new KeyboardEvent('keydown', opts));
            el.dispatchEvent(new KeyboardEvent('keypress', opts));
            el.dispatchEvent(new KeyboardEvent('keyup', opts));
            if (down && {key_str} === 'Enter' && el.form) {{
                el.form.requestSubmit();
            }}
            return {{ ok: true }};
        }})()"#,
    );

    eval_element_op(page, js, selector, "failed to press key").await?;
    Ok(())
}

fn key_to_code(key: &str) -> (String, u32) {
    match key {
        "Enter" => ("Enter".into(), 13),
        "Tab" => ("Tab".into(), 9),
        "Escape" => ("Escape".into(), 27),
        "Backspace" => ("Backspace".into(), 8),
        "Delete" => ("Delete".into(), 46),
        "ArrowUp" => ("ArrowUp".into(), 38),
        "ArrowDown" => ("ArrowDown".into(), 40),
        "ArrowLeft" => ("ArrowLeft".into(), 37),
        "ArrowRight" => ("ArrowRight".into(), 39),
        "Home" => ("Home".into(), 36),
        "End" => ("End".into(), 35),
        "PageUp" => ("PageUp".into(), 33),
        "PageDown" => ("PageDown".into(), 34),
        "Space" | " " => ("Space".into(), 32),
        _ => (
            format!("Key{}", key.to_uppercase()),
            key.chars().next().map(|c| c as u32).unwrap_or(0),
        ),
    }
}
