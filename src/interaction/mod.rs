pub mod click;
pub mod fill;
pub mod keyboard;
pub mod probe;
pub mod query;
pub mod wait;

use chromiumoxide::page::Page;

use crate::error::StepError;
use crate::selectors::Selector;

pub(crate) fn transport(context: &str, err: impl std::fmt::Display) -> StepError {
    StepError::Transport(format!("{context}: {err}"))
}

/// Run an element-targeted JS snippet. The snippet must return
/// `{ error: 'not-found' }` when the selector resolves to nothing; that
/// marker is mapped to `ElementNotFound` here so every interaction
/// reports missing elements the same way.
pub(crate) async fn eval_element_op(
    page: &Page,
    js: String,
    selector: &Selector,
    context: &str,
) -> Result<serde_json::Value, StepError> {
    let result: serde_json::Value = page
        .evaluate(js)
        .await
        .map_err(|e| transport(context, e))?
        .into_value()
        .map_err(|e| transport(context, e))?;

    if result.get("error").and_then(|e| e.as_str()) == Some("not-found") {
        return Err(StepError::ElementNotFound(selector.to_string()));
    }
    Ok(result)
}
