//! The connectivity check: connect to the pool, run a short interaction
//! sequence on one page, open a second page while the first is still
//! open, then close everything in order: pages first, session last.

use std::time::Duration;

use regex::Regex;

use crate::browser::{CdpPage, RemoteSession};
use crate::config::Config;
use crate::error::StepError;
use crate::report::{DiagnosticsReporter, RunReport, RunStatus};
use crate::scenario::runner::ScenarioRunner;
use crate::scenario::{Action, Scenario, Step};
use crate::selectors::Selector;

const CHECK_QUERY: &str = "Kubernetes";

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("check patterns are hardcoded and valid")
}

fn primary_flow() -> Scenario {
    let search_box = Selector::css("input#searchInput");
    Scenario {
        name: "connectivity".into(),
        description: "navigate, search, and capture an artifact".into(),
        steps: vec![
            Step::new(
                "open wikipedia.org",
                Action::Navigate {
                    url: "https://www.wikipedia.org/".into(),
                },
            ),
            Step::new(
                "fill the search box",
                Action::Fill {
                    selector: search_box.clone(),
                    text: CHECK_QUERY.into(),
                },
            ),
            Step::new(
                "submit the search",
                Action::Press {
                    selector: search_box,
                    key: "Enter".into(),
                },
            ),
            Step::new(
                "wait for the result heading",
                Action::WaitForVisible {
                    selector: Selector::css("#firstHeading"),
                    timeout: Duration::from_secs(10),
                },
            ),
            Step::new(
                "heading text is non-empty",
                Action::AssertTextMatches {
                    selector: Selector::css("#firstHeading"),
                    pattern: pattern(r"\S"),
                },
            ),
            Step::new(
                "save a screenshot",
                Action::Screenshot {
                    file_name: "connectivity-check.png".into(),
                },
            ),
        ],
    }
}

fn second_tab() -> Scenario {
    Scenario {
        name: "second-tab".into(),
        description: "a second browsing context on the same session".into(),
        steps: vec![
            Step::new(
                "open github.com",
                Action::Navigate {
                    url: "https://github.com".into(),
                },
            ),
            Step::new(
                "title is non-empty",
                Action::AssertTitleMatches {
                    pattern: pattern(r"\S"),
                },
            )
            .soft(),
        ],
    }
}

/// Run the connectivity check. Returns the per-page reports, or the
/// error that stopped the run before any scenario could finish.
pub async fn run_check(config: &Config) -> Result<Vec<RunReport>, StepError> {
    println!("smoke check against the remote browser pool");
    println!("endpoint: {}", config.endpoint);

    let session = RemoteSession::connect(&config.endpoint, config.connect_timeout).await?;
    println!("connected");

    let first = CdpPage::new(session.new_page().await?);
    let primary = ScenarioRunner::new(&first, config).run(&primary_flow()).await;
    DiagnosticsReporter::print_summary(&primary);

    if primary.status == RunStatus::Failed {
        if let Err(err) = session.close_page(first.into_page()).await {
            tracing::warn!("failed to close page during teardown: {}", err);
        }
        session.close().await;
        return Ok(vec![primary]);
    }

    // Second context while the first is still open.
    let second = CdpPage::new(session.new_page().await?);
    let secondary = ScenarioRunner::new(&second, config).run(&second_tab()).await;
    DiagnosticsReporter::print_summary(&secondary);

    session.close_page(second.into_page()).await?;
    session.close_page(first.into_page()).await?;
    session.close().await;

    Ok(vec![primary, secondary])
}
