//! Derivation of environment variable assignments from a proxy configuration.

use proxysync_settings::ProxyConfiguration;

/// Variables holding the canonical proxy URL.
pub const PROXY_URL_VARS: [&str; 5] = [
    "ALL_PROXY",
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "FTP_PROXY",
    "PROXY_URL",
];

/// Variables holding the bypass list.
pub const NO_PROXY_VARS: [&str; 2] = ["NO_PROXY", "PROXY_NOC"];

/// Every variable managed by ProxySync, in publish order.
pub const ALL_VARS: [&str; 7] = [
    "ALL_PROXY",
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "FTP_PROXY",
    "PROXY_URL",
    "NO_PROXY",
    "PROXY_NOC",
];

/// Returns the URL form of a proxy endpoint.
///
/// A value that already names a scheme is kept as-is; a bare `host:port`
/// gets `http://` prepended. Blank input yields `None`.
pub fn canonical_proxy_url(server: &str) -> Option<String> {
    let server = server.trim();
    if server.is_empty() {
        return None;
    }
    if server.contains("://") {
        Some(server.to_string())
    } else {
        Some(format!("http://{server}"))
    }
}

/// The full set of variable assignments for one configuration.
///
/// `None` means the variable is cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentProjection {
    assignments: Vec<(&'static str, Option<String>)>,
}

impl EnvironmentProjection {
    pub fn from_config(config: &ProxyConfiguration) -> Self {
        if !config.is_enabled() {
            return Self::cleared();
        }

        let url = config.server().and_then(canonical_proxy_url);
        let bypass = config.bypass_list().map(str::to_string);

        let assignments = PROXY_URL_VARS
            .iter()
            .map(|name| (*name, url.clone()))
            .chain(NO_PROXY_VARS.iter().map(|name| (*name, bypass.clone())))
            .collect();
        Self { assignments }
    }

    /// Clears every managed variable.
    pub fn cleared() -> Self {
        Self {
            assignments: ALL_VARS.iter().map(|name| (*name, None)).collect(),
        }
    }

    pub fn assignments(&self) -> &[(&'static str, Option<String>)] {
        &self.assignments
    }

    /// Value assigned to `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Whether every variable is cleared.
    pub fn is_cleared(&self) -> bool {
        self.assignments.iter().all(|(_, v)| v.is_none())
    }
}
