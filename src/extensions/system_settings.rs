use rootcause::Report;

use crate::{
    apps::url::Url,
    search::{Icon, Provider, ProviderKind, ResultAction, SearchResult},
};

const MAX_RESULTS: usize = 5;

/// A settings pane and how to reach it on each desktop.
#[derive(Debug, Clone, Copy)]
pub struct SettingsPane {
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub keywords: &'static [&'static str],
    /// `x-apple.systempreferences:` anchor
    pub macos: &'static str,
    /// `ms-settings:` page
    pub windows: &'static str,
    /// `gnome-control-center` panel
    pub gnome: &'static str,
}

impl SettingsPane {
    fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query)
            || self.keywords.iter().any(|keyword| keyword.contains(query))
    }

    #[must_use]
    pub fn target(&self) -> String {
        if cfg!(target_os = "macos") {
            format!("x-apple.systempreferences:{}", self.macos)
        } else if cfg!(target_os = "windows") {
            format!("ms-settings:{}", self.windows)
        } else {
            format!("gnome-control-center {}", self.gnome)
        }
    }

    #[must_use]
    pub fn action(&self) -> ResultAction {
        if cfg!(any(target_os = "macos", target_os = "windows")) {
            ResultAction::Open(Url::Scheme(self.target()))
        } else {
            ResultAction::Shell(self.target())
        }
    }
}

macro_rules! pane {
    ($name:literal, $description:literal, $category:literal, [$($keyword:literal),*], $macos:literal, $windows:literal, $gnome:literal) => {
        SettingsPane {
            name: $name,
            description: $description,
            category: $category,
            keywords: &[$($keyword),*],
            macos: $macos,
            windows: $windows,
            gnome: $gnome,
        }
    };
}

/// Most commonly searched first.
pub static PANES: &[SettingsPane] = &[
    pane!("Wi-Fi", "Wireless network settings", "Network", ["wifi", "wireless", "network", "internet"], "com.apple.preference.network?Wi-Fi", "network-wifi", "wifi"),
    pane!("Bluetooth", "Bluetooth device connections", "Network", ["bluetooth", "wireless", "devices", "pairing"], "com.apple.preference.bluetooth", "bluetooth", "bluetooth"),
    pane!("Sound", "Audio input and output settings", "Hardware", ["audio", "volume", "input", "output", "speakers", "headphones"], "com.apple.preference.sound", "sound", "sound"),
    pane!("Displays", "Display resolution and arrangement", "Hardware", ["display", "monitor", "resolution", "arrangement", "brightness"], "com.apple.preference.displays", "display", "display"),
    pane!("Keyboard", "Keyboard settings and shortcuts", "Input", ["shortcuts", "text replacement", "input sources"], "com.apple.preference.keyboard", "typing", "keyboard"),
    pane!("Trackpad", "Trackpad gestures and settings", "Input", ["gestures", "tap", "scroll", "touchpad"], "com.apple.preference.trackpad", "devices-touchpad", "mouse"),
    pane!("Mouse", "Mouse settings and gestures", "Input", ["pointer", "scrolling", "clicking"], "com.apple.preference.mouse", "mousetouchpad", "mouse"),
    pane!("Privacy & Security", "Privacy and security settings", "Privacy & Security", ["privacy", "security", "firewall", "filevault"], "com.apple.preference.security", "privacy", "privacy"),
    pane!("Desktop & Dock", "Desktop background and Dock settings", "Appearance", ["desktop", "wallpaper", "background", "dock"], "com.apple.preference.dock", "personalization-background", "background"),
    pane!("General", "General system settings and appearance", "General", ["appearance", "accent", "dark mode"], "com.apple.preference.general", "colors", "appearance"),
    pane!("Network", "Network and internet settings", "Network", ["ethernet", "vpn", "proxy"], "com.apple.preference.network", "network", "network"),
    pane!("Notifications", "Notifications and Focus modes", "Focus", ["focus", "do not disturb", "dnd", "alerts"], "com.apple.preference.notifications", "notifications", "notifications"),
    pane!("Battery", "Power and battery settings", "Hardware", ["power", "energy", "sleep"], "com.apple.preference.battery", "batterysaver", "power"),
    pane!("Users & Groups", "User accounts and login settings", "Users & Groups", ["users", "accounts", "login", "password"], "com.apple.preferences.users", "otherusers", "users"),
    pane!("Accessibility", "Accessibility features and settings", "Accessibility", ["voiceover", "zoom", "contrast", "assistive"], "com.apple.preference.universalaccess", "easeofaccess", "universal-access"),
    pane!("Language & Region", "Language, region, and date formats", "Language & Region", ["language", "region", "locale", "currency"], "com.apple.Localization", "regionlanguage", "region"),
    pane!("Date & Time", "Date, time, and time zone settings", "Date & Time", ["date", "time", "timezone", "clock"], "com.apple.preference.datetime", "dateandtime", "datetime"),
    pane!("Sharing", "File sharing and network services", "Sharing", ["file sharing", "screen sharing", "remote", "airdrop"], "com.apple.preferences.sharing", "crossdevice", "sharing"),
    pane!("Printers", "Printers and scanners", "Hardware", ["printer", "scanner", "print"], "com.apple.preference.printfax", "printers", "printers"),
    pane!("Software Update", "System and app updates", "Software Update", ["updates", "upgrade", "patch"], "com.apple.preferences.softwareupdate", "windowsupdate", "info-overview"),
];

/// Settings panes matched by name or keyword.
pub struct SystemSettingsProvider {
    priority: i32,
    panes: &'static [SettingsPane],
}

impl SystemSettingsProvider {
    #[must_use]
    pub fn new(priority: i32) -> Self {
        Self {
            priority,
            panes: PANES,
        }
    }
}

impl Provider for SystemSettingsProvider {
    fn name(&self) -> &str {
        "System Settings"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::System
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn can_handle(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.chars().count() >= 2 && self.panes.iter().any(|pane| pane.matches(&query))
    }

    fn search(&self, query: &str) -> Result<Vec<SearchResult>, Report> {
        let query = query.trim().to_lowercase();

        Ok(self
            .panes
            .iter()
            .filter(|pane| pane.matches(&query))
            .take(MAX_RESULTS)
            .map(|pane| {
                SearchResult::new(ProviderKind::System, pane.name)
                    .description(format!("{} • {}", pane.category, pane.description))
                    .path(pane.target())
                    .icon(Icon::Symbol("⚙"))
                    .action(pane.action())
            })
            .collect())
    }
}
