//! Dynamic context menu for the system tray.

/// Actions that can be triggered from the tray context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Show the current proxy settings.
    ShowStatus,
    ShowAbout,
    /// Register for per-user auto-start.
    Install,
    /// Remove the auto-start registration.
    Uninstall,
    /// User requested to quit the application.
    Quit,
}

/// A single menu item.
#[derive(Debug, Clone)]
pub struct MenuItem {
    /// Display text.
    pub label: String,
    /// Whether the item is enabled (clickable).
    pub enabled: bool,
    /// Optional action triggered on click.
    pub action: Option<MenuAction>,
}

impl MenuItem {
    fn action(label: &str, action: MenuAction) -> Self {
        Self {
            label: label.into(),
            enabled: true,
            action: Some(action),
        }
    }

    fn separator() -> Self {
        Self {
            label: String::new(),
            enabled: false,
            action: None,
        }
    }
}

/// Current state used to build the context menu.
#[derive(Debug, Clone)]
pub struct MenuState {
    /// Application display name.
    pub app_name: String,
    /// Whether auto-start is registered.
    pub installed: bool,
    /// Current proxy server, if a proxy is enabled.
    pub server: Option<String>,
}

impl Default for MenuState {
    fn default() -> Self {
        Self {
            app_name: "ProxySync".into(),
            installed: false,
            server: None,
        }
    }
}

impl MenuState {
    /// Builds the menu items from the current state.
    pub fn build_menu(&self) -> Vec<MenuItem> {
        let mut items = Vec::new();

        // Header: app name + current server.
        items.push(MenuItem {
            label: format!(
                "{} - {}",
                self.app_name,
                self.server.as_deref().unwrap_or("no proxy")
            ),
            enabled: false,
            action: None,
        });
        items.push(MenuItem::separator());

        items.push(MenuItem::action("Show Status", MenuAction::ShowStatus));
        items.push(MenuItem::action("About", MenuAction::ShowAbout));
        items.push(MenuItem::separator());

        if self.installed {
            items.push(MenuItem::action("Uninstall", MenuAction::Uninstall));
        } else {
            items.push(MenuItem::action("Install", MenuAction::Install));
        }

        items.push(MenuItem::action("Exit", MenuAction::Quit));

        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actions(state: &MenuState) -> Vec<MenuAction> {
        state.build_menu().iter().filter_map(|i| i.action).collect()
    }

    #[test]
    fn default_menu_state() {
        let state = MenuState::default();
        assert_eq!(state.app_name, "ProxySync");
        assert!(!state.installed);
        assert!(state.server.is_none());
    }

    #[test]
    fn not_installed_offers_install() {
        let acts = actions(&MenuState::default());
        assert!(acts.contains(&MenuAction::Install));
        assert!(!acts.contains(&MenuAction::Uninstall));
    }

    #[test]
    fn installed_offers_uninstall() {
        let state = MenuState {
            installed: true,
            ..MenuState::default()
        };
        let acts = actions(&state);
        assert!(acts.contains(&MenuAction::Uninstall));
        assert!(!acts.contains(&MenuAction::Install));
    }

    #[test]
    fn header_shows_server() {
        let state = MenuState {
            server: Some("10.0.0.1:8080".into()),
            ..MenuState::default()
        };
        let items = state.build_menu();
        assert!(items[0].label.contains("10.0.0.1:8080"));
        assert!(!items[0].enabled);

        let items = MenuState::default().build_menu();
        assert!(items[0].label.contains("no proxy"));
    }

    #[test]
    fn status_comes_first_and_exit_last() {
        let acts = actions(&MenuState::default());
        assert_eq!(acts.first(), Some(&MenuAction::ShowStatus));
        assert_eq!(acts.last(), Some(&MenuAction::Quit));
    }

    #[test]
    fn separators_are_disabled() {
        let items = MenuState::default().build_menu();
        assert!(
            items
                .iter()
                .filter(|i| i.label.is_empty())
                .all(|i| !i.enabled && i.action.is_none())
        );
    }
}
