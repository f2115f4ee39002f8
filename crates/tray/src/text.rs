//! Texts shown by the tray: tooltip, status balloon, about box.

use proxysync_settings::ProxyConfiguration;

/// Longest tooltip the tray accepts, in characters.
pub const TOOLTIP_MAX_CHARS: usize = 63;

const ELLIPSIS: &str = "...";

/// Tooltip reflecting the current server, e.g. `"ProxySync\nProxy: 10.0.0.1:8080"`.
///
/// Longer texts are cut to fit [`TOOLTIP_MAX_CHARS`], ending in `...`.
pub fn tooltip_text(app_name: &str, server: Option<&str>) -> String {
    let text = format!("{app_name}\nProxy: {}", server.unwrap_or("N/A"));
    truncate(&text, TOOLTIP_MAX_CHARS)
}

/// Status block for the "Show Status" action.
pub fn status_text(config: &ProxyConfiguration) -> String {
    format!(
        "Proxy Status:\nEnabled: {}\nServer: {}\nOverride: {}",
        if config.is_enabled() { "Yes" } else { "No" },
        config.server().unwrap_or("None"),
        config.bypass_list().unwrap_or("None"),
    )
}

pub fn about_text(app_name: &str, version: &str) -> String {
    format!("{app_name} v{version}\nSync system proxy settings to environment variables")
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars - ELLIPSIS.len();
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}
