use std::time::Duration;

use regex::Regex;

use crate::selectors::Selector;

use super::{Action, Scenario, Step};

const WIKIPEDIA_QUERY: &str = "Kubernetes";
const SEARCH_QUERY: &str = "OpenShift Kubernetes";
const ARTICLE_URL: &str =
    "https://medium.com/@begunova/fine-tune-browser-context-automation-with-webdriver-bidi-7c38b49b2588";

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("catalog patterns are hardcoded and valid")
}

/// All built-in smoke scenarios, in the order they run by default.
pub fn all() -> Vec<Scenario> {
    vec![
        wikipedia_search(),
        duckduckgo_search(),
        google_search(),
        article_read(),
    ]
}

pub fn by_name(name: &str) -> Option<Scenario> {
    all().into_iter().find(|s| s.name == name)
}

/// Search wikipedia.org and land on an article whose heading mentions
/// the query.
pub fn wikipedia_search() -> Scenario {
    let search_box = Selector::css("input#searchInput");
    Scenario {
        name: "wikipedia-search".into(),
        description: "search wikipedia.org and land on a matching article".into(),
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
                    text: WIKIPEDIA_QUERY.into(),
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
                "wait for the article heading",
                Action::WaitForVisible {
                    selector: Selector::css("#firstHeading"),
                    timeout: Duration::from_secs(10),
                },
            ),
            Step::new(
                "heading mentions the query",
                Action::AssertTextMatches {
                    selector: Selector::css("#firstHeading"),
                    pattern: pattern("(?i)kubernetes"),
                },
            ),
        ],
    }
}

/// The DuckDuckGo HTML-lite endpoint has stable markup; a search must
/// produce at least one result link.
pub fn duckduckgo_search() -> Scenario {
    let search_box = Selector::css(r#"input[name="q"]"#);
    Scenario {
        name: "duckduckgo-search".into(),
        description: "search duckduckgo's html endpoint and expect results".into(),
        steps: vec![
            Step::new(
                "open the html endpoint",
                Action::Navigate {
                    url: "https://duckduckgo.com/html/".into(),
                },
            ),
            Step::new(
                "fill the search box",
                Action::Fill {
                    selector: search_box.clone(),
                    text: SEARCH_QUERY.into(),
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
                "first result is visible",
                Action::WaitForVisible {
                    selector: Selector::css("#links .result__a"),
                    timeout: Duration::from_secs(10),
                },
            ),
            Step::new(
                "url carries the query",
                Action::AssertUrlMatches {
                    pattern: pattern(r"duckduckgo\.com/html/\?q="),
                },
            ),
        ],
    }
}

/// Google rate-limits shared cluster IPs; landing on the "sorry" page is
/// an environmental skip, not a failure. The consent dialog only shows
/// up in some regions, so dismissing it is guarded.
pub fn google_search() -> Scenario {
    let consent_button = Selector::parse(r#"button:has-text("Accept all")"#);
    let search_box = Selector::css(r#"textarea[name="q"], input[name="q"]"#);
    Scenario {
        name: "google-search".into(),
        description: "search google and expect results unless rate-limited".into(),
        steps: vec![
            Step::new(
                "open google (no country redirect)",
                Action::Navigate {
                    url: "https://www.google.com/ncr".into(),
                },
            ),
            Step::new(
                "dismiss the consent dialog",
                Action::Click {
                    selector: consent_button.clone(),
                },
            )
            .soft()
            .guarded(consent_button, Duration::from_secs(2)),
            Step::new(
                "fill the search box",
                Action::Fill {
                    selector: search_box.clone(),
                    text: SEARCH_QUERY.into(),
                },
            ),
            Step::new(
                "submit the search",
                Action::Press {
                    selector: search_box,
                    key: "Enter".into(),
                },
            ),
            Step::new("wait for the results page", Action::WaitForNavigation),
            Step::new(
                "bail out if rate-limited",
                Action::SkipIfUrlMatches {
                    pattern: pattern("/sorry/"),
                    reason: "google rate-limited this address".into(),
                },
            ),
            Step::new(
                "a result heading is visible",
                Action::WaitForVisible {
                    selector: Selector::css("#search a h3"),
                    timeout: Duration::from_secs(10),
                },
            ),
            Step::new(
                "title mentions the query",
                Action::AssertTitleMatches {
                    pattern: pattern("(?i)openshift kubernetes"),
                },
            )
            .soft(),
        ],
    }
}

/// Open a fixed article and read its title and body.
pub fn article_read() -> Scenario {
    Scenario {
        name: "article-read".into(),
        description: "open a known article page and capture its content".into(),
        steps: vec![
            Step::new(
                "open the article",
                Action::Navigate {
                    url: ARTICLE_URL.into(),
                },
            ),
            Step::new(
                "wait for the title",
                Action::WaitForVisible {
                    selector: Selector::css("h1"),
                    timeout: Duration::from_secs(10),
                },
            ),
            Step::new(
                "title names the subject",
                Action::AssertTextMatches {
                    selector: Selector::css("h1"),
                    pattern: pattern("(?i)webdriver bidi"),
                },
            ),
            Step::new(
                "capture the article body",
                Action::CaptureText {
                    selector: Selector::css(
                        r#"article, .postArticle-content, [data-testid="storyContent"]"#,
                    ),
                },
            )
            .soft(),
        ],
    }
}
