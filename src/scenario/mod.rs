pub mod catalog;
pub mod runner;

use std::time::Duration;

use regex::Regex;

use crate::selectors::Selector;

/// How a step's failure affects the rest of its scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    /// Failure aborts the remaining steps.
    #[default]
    Fatal,
    /// Failure is recorded and the scenario continues.
    Soft,
}

/// One scripted interaction or check against a page.
#[derive(Debug, Clone)]
pub enum Action {
    Navigate {
        url: String,
    },
    WaitForNavigation,
    Fill {
        selector: Selector,
        text: String,
    },
    Press {
        selector: Selector,
        key: String,
    },
    Click {
        selector: Selector,
    },
    WaitForVisible {
        selector: Selector,
        timeout: Duration,
    },
    AssertVisible {
        selector: Selector,
    },
    AssertTextMatches {
        selector: Selector,
        pattern: Regex,
    },
    AssertTitleMatches {
        pattern: Regex,
    },
    AssertUrlMatches {
        pattern: Regex,
    },
    CaptureText {
        selector: Selector,
    },
    Screenshot {
        file_name: String,
    },
    /// Terminal short-circuit: when the current URL matches, the rest of
    /// the scenario is environmental noise (e.g. rate limiting), not a
    /// defect. Remaining steps are marked skipped.
    SkipIfUrlMatches {
        pattern: Regex,
        reason: String,
    },
}

/// Probe-then-act: the action runs only if the probe selector becomes
/// visible within the probe window; otherwise the step is skipped. The
/// probe itself can never fail the scenario.
#[derive(Debug, Clone)]
pub struct Guard {
    pub probe: Selector,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Step {
    pub name: String,
    pub action: Action,
    pub severity: Severity,
    pub guard: Option<Guard>,
}

impl Step {
    pub fn new(name: impl Into<String>, action: Action) -> Self {
        Self {
            name: name.into(),
            action,
            severity: Severity::Fatal,
            guard: None,
        }
    }

    pub fn soft(mut self) -> Self {
        self.severity = Severity::Soft;
        self
    }

    pub fn guarded(mut self, probe: Selector, timeout: Duration) -> Self {
        self.guard = Some(Guard { probe, timeout });
        self
    }
}

/// An ordered list of steps forming one smoke check. Selectors, URLs and
/// expected patterns are literal data; nothing is discovered at runtime.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub steps: Vec<Step>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_default_to_fatal_without_guard() {
        let step = Step::new(
            "open page",
            Action::Navigate {
                url: "https://example.com".into(),
            },
        );
        assert_eq!(step.severity, Severity::Fatal);
        assert!(step.guard.is_none());
    }

    #[test]
    fn test_builders_set_severity_and_guard() {
        let step = Step::new(
            "dismiss dialog",
            Action::Click {
                selector: Selector::text("Accept all"),
            },
        )
        .soft()
        .guarded(Selector::text("Accept all"), Duration::from_secs(2));
        assert_eq!(step.severity, Severity::Soft);
        assert!(step.guard.is_some());
    }
}
