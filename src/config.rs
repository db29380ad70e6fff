use std::path::PathBuf;
use std::time::Duration;

/// Environment variables consulted for the pool endpoint, highest
/// precedence first.
pub const ENDPOINT_ENV_VARS: &[&str] = &["BROWSER_SMOKE_WS_ENDPOINT", "BROWSER_WS_ENDPOINT"];

/// Fallback when no endpoint variable is set: the usual local
/// port-forward target of the pool service.
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:3000/";

/// Runtime configuration, built once at startup. Nothing reads the
/// process environment after this is constructed.
#[derive(Debug, Clone)]
pub struct Config {
    /// WebSocket endpoint of the remote browser pool.
    pub endpoint: String,
    /// Upper bound on the CDP handshake.
    pub connect_timeout: Duration,
    /// Upper bound on a single page navigation.
    pub navigation_timeout: Duration,
    /// Upper bound on waits declared without their own timeout.
    pub wait_timeout: Duration,
    /// Where screenshots and other run artifacts land.
    pub artifacts_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            endpoint: resolve_endpoint(),
            connect_timeout: Duration::from_secs(30),
            navigation_timeout: Duration::from_secs(30),
            wait_timeout: Duration::from_secs(10),
            artifacts_dir: PathBuf::from("artifacts"),
        }
    }
}

/// Resolve the pool endpoint from the environment. Absence of any
/// configuration is not an error, only the fallback.
pub fn resolve_endpoint() -> String {
    resolve_endpoint_from(|name| std::env::var(name).ok())
}

fn resolve_endpoint_from(get: impl Fn(&str) -> Option<String>) -> String {
    for name in ENDPOINT_ENV_VARS {
        if let Some(value) = get(name) {
            let value = value.trim();
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }
    DEFAULT_ENDPOINT.to_string()
}
