use std::str::FromStr;

use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::HotKey,
};

#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("invalid hotkey {hotkey:?}: {reason}")]
    Parse { hotkey: String, reason: String },
    #[error("hotkey manager unavailable")]
    Manager(#[source] global_hotkey::Error),
    #[error("could not register {hotkey:?}")]
    Register {
        hotkey: String,
        #[source]
        source: global_hotkey::Error,
    },
}

/// Parses the "[Modifiers]-Key" format used in the configuration.
///
/// # Errors
///
/// [`HotkeyError::Parse`] for unknown modifiers or key codes.
pub fn parse_hotkey(hotkey: &str) -> Result<HotKey, HotkeyError> {
    let normalized = hotkey
        .split('-')
        .map(|part| match part.trim().to_ascii_lowercase().as_str() {
            "win" | "meta" => "super".to_string(),
            "opt" | "option" => "alt".to_string(),
            _ => part.trim().to_string(),
        })
        .collect::<Vec<_>>()
        .join("+");

    HotKey::from_str(&normalized).map_err(|err| HotkeyError::Parse {
        hotkey: hotkey.to_string(),
        reason: err.to_string(),
    })
}

/// Owns the global shortcut that summons the launcher.
///
/// The manager must be created on the main thread on macOS.
pub struct HotkeyService {
    manager: GlobalHotKeyManager,
    hotkey: HotKey,
    label: String,
    registered: bool,
}

impl HotkeyService {
    /// # Errors
    ///
    /// Fails on an unparsable hotkey or when the platform hotkey manager
    /// cannot be created.
    pub fn new(hotkey: &str) -> Result<Self, HotkeyError> {
        let parsed = parse_hotkey(hotkey)?;
        let manager = GlobalHotKeyManager::new().map_err(HotkeyError::Manager)?;

        Ok(Self {
            manager,
            hotkey: parsed,
            label: hotkey.to_string(),
            registered: false,
        })
    }

    /// # Errors
    ///
    /// Fails when another application already owns the shortcut.
    pub fn start(&mut self) -> Result<(), HotkeyError> {
        if self.registered {
            return Ok(());
        }

        self.manager
            .register(self.hotkey)
            .map_err(|source| HotkeyError::Register {
                hotkey: self.label.clone(),
                source,
            })?;
        self.registered = true;
        tracing::info!(hotkey = %self.label, "listening for hotkey");

        Ok(())
    }

    pub fn stop(&mut self) {
        if !self.registered {
            return;
        }

        if let Err(err) = self.manager.unregister(self.hotkey) {
            tracing::warn!(hotkey = %self.label, error = %err, "failed to unregister hotkey");
        }
        self.registered = false;
    }

    /// Whether `event` is a press of this service's hotkey.
    #[must_use]
    pub fn is_activation(&self, event: &GlobalHotKeyEvent) -> bool {
        event.id == self.hotkey.id() && event.state == HotKeyState::Pressed
    }

    /// Blocks until the next hotkey event. `None` once the event channel
    /// is gone.
    #[must_use]
    pub fn wait_for_event() -> Option<GlobalHotKeyEvent> {
        GlobalHotKeyEvent::receiver().recv().ok()
    }
}

impl Drop for HotkeyService {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use global_hotkey::hotkey::{Code, Modifiers};

    use super::*;

    #[test]
    fn parses_dash_separated_hotkeys() {
        assert_eq!(
            parse_hotkey("alt-space").expect("valid hotkey"),
            HotKey::new(Some(Modifiers::ALT), Code::Space)
        );
        assert_eq!(
            parse_hotkey("ctrl-shift-KeyK").expect("valid hotkey"),
            HotKey::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::KeyK)
        );
        assert_eq!(
            parse_hotkey("win-KeyC").expect("valid hotkey"),
            HotKey::new(Some(Modifiers::SUPER), Code::KeyC)
        );
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            parse_hotkey("alt-notakey"),
            Err(HotkeyError::Parse { .. })
        ));
    }
}
