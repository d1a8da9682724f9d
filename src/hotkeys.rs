//! Global shortcut bindings
//!
//! Every bound [`ShortcutAction`] is parsed into a [`HotKey`] and registered
//! with the system through [`GlobalHotKeyManager`]; delivered events are
//! mapped back to actions by hotkey id. Invalid sequences and registration
//! failures are logged and skipped so one bad binding never disables the
//! rest.

use global_hotkey::hotkey::HotKey;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use meetclock_core::types::{ShortcutAction, ShortcutSettings};
use tracing::{debug, info, warn};

/// Anything global hotkeys can be registered with
pub trait HotkeyTarget {
    fn register(&mut self, hotkey: HotKey) -> Result<(), global_hotkey::Error>;
    fn unregister(&mut self, hotkey: HotKey);
}

impl HotkeyTarget for GlobalHotKeyManager {
    fn register(&mut self, hotkey: HotKey) -> Result<(), global_hotkey::Error> {
        GlobalHotKeyManager::register(self, hotkey)
    }

    fn unregister(&mut self, hotkey: HotKey) {
        if let Err(e) = GlobalHotKeyManager::unregister(self, hotkey) {
            debug!(hotkey = %hotkey.into_string(), error = %e, "Failed to unregister shortcut");
        }
    }
}

/// Currently registered bindings
#[derive(Debug, Default)]
pub struct HotkeyBindings {
    registered: Vec<(ShortcutAction, HotKey)>,
}

impl HotkeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all registrations with the bindings in `shortcuts`
    pub fn register_all(&mut self, target: &mut impl HotkeyTarget, shortcuts: &ShortcutSettings) {
        self.unregister_all(target);

        for (action, keys) in shortcuts.bindings() {
            let hotkey = match keys.parse::<HotKey>() {
                Ok(hotkey) => hotkey,
                Err(e) => {
                    warn!(action = %action, keys, error = %e, "Invalid shortcut, skipping");
                    continue;
                }
            };
            if let Some((other, _)) = self.registered.iter().find(|(_, h)| *h == hotkey) {
                warn!(action = %action, other = %other, keys, "Shortcut already bound, skipping");
                continue;
            }

            match target.register(hotkey) {
                Ok(()) => {
                    info!(action = %action, hotkey = %hotkey.into_string(), "Registered shortcut");
                    self.registered.push((action, hotkey));
                }
                Err(e) => {
                    warn!(action = %action, keys, error = %e, "Failed to register shortcut");
                }
            }
        }
    }

    pub fn unregister_all(&mut self, target: &mut impl HotkeyTarget) {
        for (_, hotkey) in self.registered.drain(..) {
            target.unregister(hotkey);
        }
    }

    /// Action for a delivered hotkey id
    pub fn action_for(&self, id: u32) -> Option<ShortcutAction> {
        self.registered
            .iter()
            .find(|(_, hotkey)| hotkey.id() == id)
            .map(|(action, _)| *action)
    }

    /// Action to run for an event; releases are ignored
    pub fn action_for_event(&self, event: &GlobalHotKeyEvent) -> Option<ShortcutAction> {
        match event.state {
            HotKeyState::Pressed => self.action_for(event.id),
            HotKeyState::Released => None,
        }
    }

    /// Actions for every hotkey pressed since the last call
    pub fn pending_actions(&self) -> Vec<ShortcutAction> {
        let receiver = GlobalHotKeyEvent::receiver();
        std::iter::from_fn(|| receiver.try_recv().ok())
            .filter_map(|event| self.action_for_event(&event))
            .collect()
    }

    pub fn is_bound(&self, action: ShortcutAction) -> bool {
        self.registered.iter().any(|(a, _)| *a == action)
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }
}
