use std::path::PathBuf;

use crate::browser::{CdpPage, PageDriver, RemoteSession};
use crate::config::Config;
use crate::error::StepError;
use crate::report::{DiagnosticsReporter, RunReport};

use super::{Action, Scenario, Severity, Step};

enum Outcome {
    Done {
        captured: Option<String>,
        artifact: Option<PathBuf>,
    },
    /// Terminal short-circuit hit: the rest of the scenario is skipped.
    Bail {
        reason: String,
    },
}

impl Outcome {
    fn done() -> Self {
        Outcome::Done {
            captured: None,
            artifact: None,
        }
    }

    fn captured(text: String) -> Self {
        Outcome::Done {
            captured: Some(text),
            artifact: None,
        }
    }
}

/// Executes a scenario's steps against one page, strictly in declared
/// order. Severity policy: a fatal step failure aborts the remaining
/// steps; soft failures and artifact errors are recorded and execution
/// continues.
pub struct ScenarioRunner<'a> {
    driver: &'a dyn PageDriver,
    navigation_timeout: std::time::Duration,
    wait_timeout: std::time::Duration,
    artifacts_dir: PathBuf,
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(driver: &'a dyn PageDriver, config: &Config) -> Self {
        Self {
            driver,
            navigation_timeout: config.navigation_timeout,
            wait_timeout: config.wait_timeout,
            artifacts_dir: config.artifacts_dir.clone(),
        }
    }

    pub async fn run(&self, scenario: &Scenario) -> RunReport {
        let mut report = RunReport::new(&scenario.name);

        for (index, step) in scenario.steps.iter().enumerate() {
            tracing::info!("step: {}", step.name);

            if let Some(guard) = &step.guard {
                let probe = self.driver.probe_visible(&guard.probe, guard.timeout).await;
                if !probe.is_visible() {
                    report.record_skipped(
                        &step.name,
                        &format!("guard never became visible: {}", guard.probe),
                    );
                    continue;
                }
            }

            match self.execute(step).await {
                Ok(Outcome::Done { captured, artifact }) => {
                    report.record_passed(&step.name, captured, artifact);
                }
                Ok(Outcome::Bail { reason }) => {
                    for remaining in &scenario.steps[index..] {
                        report.record_skipped(&remaining.name, &reason);
                    }
                    report.mark_environmental_skip();
                    tracing::warn!("scenario {} skipped: {}", scenario.name, reason);
                    break;
                }
                Err(err) => {
                    if step.severity == Severity::Soft || err.is_always_soft() {
                        tracing::warn!("soft failure in {}: {}", step.name, err);
                        report.record_soft_failure(&step.name, &err);
                    } else {
                        tracing::error!("fatal failure in {}: {}", step.name, err);
                        report.record_fatal(&step.name, &err);
                        break;
                    }
                }
            }
        }

        report
    }

    async fn execute(&self, step: &Step) -> Result<Outcome, StepError> {
        match &step.action {
            Action::Navigate { url } => {
                self.driver.navigate(url, self.navigation_timeout).await?;
                Ok(Outcome::done())
            }
            Action::WaitForNavigation => {
                self.driver
                    .wait_for_navigation(self.navigation_timeout)
                    .await?;
                Ok(Outcome::done())
            }
            Action::Fill { selector, text } => {
                self.driver.fill(selector, text).await?;
                Ok(Outcome::done())
            }
            Action::Press { selector, key } => {
                self.driver.press(selector, key).await?;
                Ok(Outcome::done())
            }
            Action::Click { selector } => {
                self.driver.click(selector).await?;
                Ok(Outcome::done())
            }
            Action::WaitForVisible { selector, timeout } => {
                self.driver.wait_for_visible(selector, *timeout).await?;
                Ok(Outcome::done())
            }
            Action::AssertVisible { selector } => {
                match self
                    .driver
                    .wait_for_visible(selector, self.wait_timeout)
                    .await
                {
                    Ok(()) => Ok(Outcome::done()),
                    Err(StepError::WaitTimeout { timeout_ms, .. }) => {
                        Err(StepError::AssertionFailed {
                            expected: format!("{selector} visible"),
                            actual: format!("not visible within {timeout_ms}ms"),
                        })
                    }
                    Err(err) => Err(err),
                }
            }
            Action::AssertTextMatches { selector, pattern } => {
                let actual = self.driver.text_content(selector).await?;
                if pattern.is_match(&actual) {
                    Ok(Outcome::captured(actual))
                } else {
                    Err(StepError::AssertionFailed {
                        expected: format!("text of {selector} matching /{pattern}/"),
                        actual,
                    })
                }
            }
            Action::AssertTitleMatches { pattern } => {
                let actual = self.driver.title().await?;
                if pattern.is_match(&actual) {
                    Ok(Outcome::captured(actual))
                } else {
                    Err(StepError::AssertionFailed {
                        expected: format!("title matching /{pattern}/"),
                        actual,
                    })
                }
            }
            Action::AssertUrlMatches { pattern } => {
                let actual = self.driver.current_url().await?;
                if pattern.is_match(&actual) {
                    Ok(Outcome::captured(actual))
                } else {
                    Err(StepError::AssertionFailed {
                        expected: format!("url matching /{pattern}/"),
                        actual,
                    })
                }
            }
            Action::CaptureText { selector } => {
                let text = self.driver.text_content(selector).await?;
                Ok(Outcome::captured(text))
            }
            Action::Screenshot { file_name } => {
                let path = self.artifacts_dir.join(file_name);
                self.driver.screenshot(&path).await?;
                Ok(Outcome::Done {
                    captured: None,
                    artifact: Some(path),
                })
            }
            Action::SkipIfUrlMatches { pattern, reason } => {
                let url = self.driver.current_url().await?;
                if pattern.is_match(&url) {
                    Ok(Outcome::Bail {
                        reason: format!("{reason} ({url})"),
                    })
                } else {
                    Ok(Outcome::done())
                }
            }
        }
    }
}

/// Connect once and run each scenario on its own page. Pages are closed
/// as scenarios finish; the session is closed last.
pub async fn run_scenarios(
    config: &Config,
    scenarios: &[Scenario],
) -> Result<Vec<RunReport>, StepError> {
    let session = RemoteSession::connect(&config.endpoint, config.connect_timeout).await?;
    let mut reports = Vec::with_capacity(scenarios.len());

    for scenario in scenarios {
        println!("\nrunning scenario: {}", scenario.name);
        let page = match session.new_page().await {
            Ok(page) => page,
            Err(err) => {
                session.close().await;
                return Err(err);
            }
        };
        let driver = CdpPage::new(page);
        let report = ScenarioRunner::new(&driver, config).run(scenario).await;
        DiagnosticsReporter::print_summary(&report);
        if let Err(err) = session.close_page(driver.into_page()).await {
            tracing::warn!("failed to close scenario page: {}", err);
        }
        reports.push(report);
    }

    session.close().await;
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use regex::Regex;

    use crate::report::{RunStatus, StepStatus};
    use crate::selectors::Selector;

    use super::*;

    /// Scripted page: selectors listed in `visible` resolve, everything
    /// else times out; `texts` backs text_content; every driver call is
    /// recorded so tests can assert what ran.
    #[derive(Default)]
    struct FakeDriver {
        visible: Vec<String>,
        texts: HashMap<String, String>,
        url: String,
        title: String,
        broken_selectors: Vec<String>,
        fail_screenshots: bool,
        calls: Mutex<Vec<String>>,
    }

    impl FakeDriver {
        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn check_selector(&self, selector: &Selector) -> Result<(), StepError> {
            if self.broken_selectors.contains(&selector.raw) {
                return Err(StepError::Transport("ws connection dropped".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PageDriver for FakeDriver {
        async fn navigate(&self, url: &str, _timeout: Duration) -> Result<(), StepError> {
            self.record(format!("navigate:{url}"));
            Ok(())
        }

        async fn wait_for_navigation(&self, _timeout: Duration) -> Result<(), StepError> {
            self.record("wait_for_navigation");
            Ok(())
        }

        async fn fill(&self, selector: &Selector, _text: &str) -> Result<(), StepError> {
            self.record(format!("fill:{selector}"));
            self.check_selector(selector)?;
            if self.texts.contains_key(&selector.raw) || self.visible.contains(&selector.raw) {
                Ok(())
            } else {
                Err(StepError::ElementNotFound(selector.to_string()))
            }
        }

        async fn press(&self, selector: &Selector, key: &str) -> Result<(), StepError> {
            self.record(format!("press:{selector}:{key}"));
            Ok(())
        }

        async fn click(&self, selector: &Selector) -> Result<(), StepError> {
            self.record(format!("click:{selector}"));
            self.check_selector(selector)?;
            Ok(())
        }

        async fn wait_for_visible(
            &self,
            selector: &Selector,
            timeout: Duration,
        ) -> Result<(), StepError> {
            self.record(format!("wait:{selector}"));
            self.check_selector(selector)?;
            if self.visible.contains(&selector.raw) {
                Ok(())
            } else {
                Err(StepError::WaitTimeout {
                    selector: selector.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        }

        async fn text_content(&self, selector: &Selector) -> Result<String, StepError> {
            self.record(format!("text:{selector}"));
            self.texts
                .get(&selector.raw)
                .cloned()
                .ok_or_else(|| StepError::ElementNotFound(selector.to_string()))
        }

        async fn current_url(&self) -> Result<String, StepError> {
            Ok(self.url.clone())
        }

        async fn title(&self) -> Result<String, StepError> {
            Ok(self.title.clone())
        }

        async fn screenshot(&self, path: &Path) -> Result<(), StepError> {
            self.record(format!("screenshot:{}", path.display()));
            if self.fail_screenshots {
                Err(StepError::Artifact {
                    path: path.to_path_buf(),
                    message: "read-only file system".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn test_config() -> Config {
        let mut config = Config::from_env();
        config.artifacts_dir = PathBuf::from("test-artifacts");
        config
    }

    fn navigate(name: &str) -> Step {
        Step::new(
            name,
            Action::Navigate {
                url: "https://example.com/".into(),
            },
        )
    }

    #[tokio::test]
    async fn test_all_steps_pass_in_order() {
        let driver = FakeDriver {
            visible: vec!["#heading".into()],
            texts: HashMap::from([("#heading".into(), "Kubernetes".into())]),
            ..Default::default()
        };
        let scenario = Scenario {
            name: "smoke".into(),
            description: String::new(),
            steps: vec![
                navigate("open page"),
                Step::new(
                    "wait for heading",
                    Action::WaitForVisible {
                        selector: Selector::css("#heading"),
                        timeout: Duration::from_secs(1),
                    },
                ),
                Step::new(
                    "heading matches",
                    Action::AssertTextMatches {
                        selector: Selector::css("#heading"),
                        pattern: Regex::new("(?i)kubernetes").unwrap(),
                    },
                ),
            ],
        };

        let report = ScenarioRunner::new(&driver, &test_config())
            .run(&scenario)
            .await;

        assert_eq!(report.status, RunStatus::Passed);
        assert_eq!(report.records.len(), 3);
        assert!(report
            .records
            .iter()
            .all(|r| r.status == StepStatus::Passed));
        assert_eq!(report.records[2].captured.as_deref(), Some("Kubernetes"));
    }

    #[tokio::test]
    async fn test_fatal_step_aborts_remaining_steps() {
        let driver = FakeDriver::default();
        let scenario = Scenario {
            name: "smoke".into(),
            description: String::new(),
            steps: vec![
                navigate("open page"),
                Step::new(
                    "fill missing input",
                    Action::Fill {
                        selector: Selector::css("#gone"),
                        text: "query".into(),
                    },
                ),
                navigate("never runs"),
                navigate("never runs either"),
            ],
        };

        let report = ScenarioRunner::new(&driver, &test_config())
            .run(&scenario)
            .await;

        assert_eq!(report.status, RunStatus::Failed);
        // one passed entry plus the fatal one, nothing for the rest
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[1].status, StepStatus::Failed);
        let navigations = driver
            .calls()
            .iter()
            .filter(|c| c.starts_with("navigate:"))
            .count();
        assert_eq!(navigations, 1);
    }

    #[tokio::test]
    async fn test_soft_failure_continues() {
        let driver = FakeDriver {
            title: "Unrelated page".into(),
            ..Default::default()
        };
        let scenario = Scenario {
            name: "smoke".into(),
            description: String::new(),
            steps: vec![
                Step::new(
                    "title mentions query",
                    Action::AssertTitleMatches {
                        pattern: Regex::new("(?i)kubernetes").unwrap(),
                    },
                )
                .soft(),
                navigate("still runs"),
            ],
        };

        let report = ScenarioRunner::new(&driver, &test_config())
            .run(&scenario)
            .await;

        assert_eq!(report.status, RunStatus::Passed);
        assert_eq!(report.records[0].status, StepStatus::SoftFailed);
        assert_eq!(report.records[1].status, StepStatus::Passed);
    }

    #[tokio::test]
    async fn test_guarded_step_skipped_when_probe_not_visible() {
        let driver = FakeDriver::default();
        let scenario = Scenario {
            name: "smoke".into(),
            description: String::new(),
            steps: vec![
                Step::new(
                    "dismiss consent dialog",
                    Action::Click {
                        selector: Selector::text("Accept all"),
                    },
                )
                .soft()
                .guarded(Selector::text("Accept all"), Duration::from_millis(10)),
                navigate("continues"),
            ],
        };

        let report = ScenarioRunner::new(&driver, &test_config())
            .run(&scenario)
            .await;

        assert_eq!(report.status, RunStatus::Passed);
        assert_eq!(report.records[0].status, StepStatus::Skipped);
        assert!(!driver.calls().iter().any(|c| c.starts_with("click:")));
    }

    #[tokio::test]
    async fn test_probe_errors_never_escape_the_guard() {
        let driver = FakeDriver {
            broken_selectors: vec!["Accept all".into()],
            ..Default::default()
        };
        let scenario = Scenario {
            name: "smoke".into(),
            description: String::new(),
            steps: vec![
                Step::new(
                    "dismiss consent dialog",
                    Action::Click {
                        selector: Selector::text("Accept all"),
                    },
                )
                .guarded(Selector::text("Accept all"), Duration::from_millis(10)),
                navigate("continues"),
            ],
        };

        let report = ScenarioRunner::new(&driver, &test_config())
            .run(&scenario)
            .await;

        // The probe hit a transport error; the step is skipped, not failed.
        assert_eq!(report.status, RunStatus::Passed);
        assert_eq!(report.records[0].status, StepStatus::Skipped);
        assert_eq!(report.records[1].status, StepStatus::Passed);
    }

    #[tokio::test]
    async fn test_environmental_skip_marks_remaining_steps() {
        let driver = FakeDriver {
            url: "https://www.google.com/sorry/index".into(),
            ..Default::default()
        };
        let scenario = Scenario {
            name: "smoke".into(),
            description: String::new(),
            steps: vec![
                navigate("open search page"),
                Step::new(
                    "bail if rate limited",
                    Action::SkipIfUrlMatches {
                        pattern: Regex::new("/sorry/").unwrap(),
                        reason: "rate limited".into(),
                    },
                ),
                Step::new(
                    "results visible",
                    Action::AssertVisible {
                        selector: Selector::css("#search a h3"),
                    },
                ),
            ],
        };

        let report = ScenarioRunner::new(&driver, &test_config())
            .run(&scenario)
            .await;

        assert_eq!(report.status, RunStatus::Skipped);
        assert!(!report.status.is_failure());
        assert_eq!(report.records[0].status, StepStatus::Passed);
        assert_eq!(report.records[1].status, StepStatus::Skipped);
        assert_eq!(report.records[2].status, StepStatus::Skipped);
        assert!(!driver.calls().iter().any(|c| c.starts_with("wait:")));
    }

    #[tokio::test]
    async fn test_artifact_errors_are_soft_even_on_fatal_steps() {
        let driver = FakeDriver {
            fail_screenshots: true,
            ..Default::default()
        };
        let scenario = Scenario {
            name: "smoke".into(),
            description: String::new(),
            steps: vec![
                Step::new(
                    "screenshot",
                    Action::Screenshot {
                        file_name: "page.png".into(),
                    },
                ),
                navigate("still runs"),
            ],
        };

        let report = ScenarioRunner::new(&driver, &test_config())
            .run(&scenario)
            .await;

        assert_eq!(report.status, RunStatus::Passed);
        assert_eq!(report.records[0].status, StepStatus::SoftFailed);
        assert_eq!(report.records[1].status, StepStatus::Passed);
    }

    #[tokio::test]
    async fn test_assert_visible_reports_an_assertion_not_a_timeout() {
        let driver = FakeDriver::default();
        let scenario = Scenario {
            name: "smoke".into(),
            description: String::new(),
            steps: vec![Step::new(
                "results visible",
                Action::AssertVisible {
                    selector: Selector::css("#results"),
                },
            )],
        };

        let report = ScenarioRunner::new(&driver, &test_config())
            .run(&scenario)
            .await;

        assert_eq!(report.status, RunStatus::Failed);
        assert_eq!(
            report.fatal_category,
            Some(crate::error::ErrorCategory::Assertion)
        );
    }

    #[tokio::test]
    async fn test_screenshots_land_in_the_artifacts_dir() {
        let driver = FakeDriver::default();
        let scenario = Scenario {
            name: "smoke".into(),
            description: String::new(),
            steps: vec![Step::new(
                "screenshot",
                Action::Screenshot {
                    file_name: "page.png".into(),
                },
            )],
        };

        let report = ScenarioRunner::new(&driver, &test_config())
            .run(&scenario)
            .await;

        let artifact = report.records[0].artifact.as_ref().unwrap();
        assert_eq!(artifact, &PathBuf::from("test-artifacts").join("page.png"));
    }
}
