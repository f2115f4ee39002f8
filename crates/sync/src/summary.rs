//! Field-level change detection between two configurations.

use std::fmt;

use proxysync_settings::ProxyConfiguration;

/// One of the three compared configuration fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Enabled,
    Server,
    BypassList,
}

impl Field {
    /// Label used in change notifications.
    pub fn label(self) -> &'static str {
        match self {
            Self::Enabled => "Proxy Enabled",
            Self::Server => "Proxy Server",
            Self::BypassList => "Proxy Override",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which fields differ between the last published and the current snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    pub enabled: bool,
    pub server: bool,
    pub bypass_list: bool,
}

impl ChangeSummary {
    /// Every field flagged, as for the first snapshot ever seen.
    pub fn all() -> Self {
        Self {
            enabled: true,
            server: true,
            bypass_list: true,
        }
    }

    /// Compares `current` against `previous`; no previous snapshot means
    /// every field counts as changed.
    pub fn between(previous: Option<&ProxyConfiguration>, current: &ProxyConfiguration) -> Self {
        let Some(previous) = previous else {
            return Self::all();
        };
        Self {
            enabled: previous.is_enabled() != current.is_enabled(),
            server: previous.server() != current.server(),
            bypass_list: previous.bypass_list() != current.bypass_list(),
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.enabled || self.server || self.bypass_list)
    }

    pub fn changed_fields(&self) -> Vec<Field> {
        [
            (self.enabled, Field::Enabled),
            (self.server, Field::Server),
            (self.bypass_list, Field::BypassList),
        ]
        .into_iter()
        .filter_map(|(changed, field)| changed.then_some(field))
        .collect()
    }

    /// Renders one `Label: current value` line per changed field.
    ///
    /// Only the new value is shown; absent values render as `None`.
    pub fn describe(&self, current: &ProxyConfiguration) -> String {
        self.changed_fields()
            .into_iter()
            .map(|field| {
                let value = match field {
                    Field::Enabled => current.is_enabled().to_string(),
                    Field::Server => current.server().unwrap_or("None").to_string(),
                    Field::BypassList => current.bypass_list().unwrap_or("None").to_string(),
                };
                format!("{field}: {value}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
