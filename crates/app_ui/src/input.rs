//! Key event to command mapping

use app_core::{Command, Keymap};
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{Key, ModifiersState, NamedKey};

/// Maps key presses to commands through the configured keymap
pub struct InputHandler {
    keymap: Keymap,

    /// Current modifier state
    modifiers: ModifiersState,
}

impl InputHandler {
    pub fn new(keymap: Keymap) -> Self {
        Self {
            keymap,
            modifiers: ModifiersState::empty(),
        }
    }

    /// Update modifier state
    pub fn update_modifiers(&mut self, modifiers: ModifiersState) {
        self.modifiers = modifiers;
    }

    /// Handle a key event and return the corresponding command
    pub fn handle_key(&self, event: &KeyEvent) -> Option<Command> {
        if event.state != ElementState::Pressed {
            return None;
        }
        self.resolve(&event.logical_key)
    }

    /// Command bound to `key` under the current modifiers
    ///
    /// Chords with Ctrl, Alt or Super are left to the toolkit (zoom and
    /// the like). Shift is already reflected in the key's character.
    pub fn resolve(&self, key: &Key) -> Option<Command> {
        if self.modifiers.control_key() || self.modifiers.alt_key() || self.modifiers.super_key() {
            return None;
        }

        let name = key_name(key)?;
        let command = self.keymap.resolve(&name);
        tracing::debug!("Key pressed: {} -> {:?}", name, command);
        command
    }
}

/// Name of a logical key as used in the `[keybindings]` table
pub fn key_name(key: &Key) -> Option<String> {
    let name = match key {
        Key::Named(named) => match named {
            NamedKey::Space => "Space",
            NamedKey::Enter => "Enter",
            NamedKey::Tab => "Tab",
            NamedKey::Escape => "Escape",
            NamedKey::Backspace => "Backspace",
            NamedKey::Delete => "Delete",
            NamedKey::Home => "Home",
            NamedKey::End => "End",
            NamedKey::PageUp => "PageUp",
            NamedKey::PageDown => "PageDown",
            NamedKey::ArrowUp => "ArrowUp",
            NamedKey::ArrowDown => "ArrowDown",
            NamedKey::ArrowLeft => "ArrowLeft",
            NamedKey::ArrowRight => "ArrowRight",
            NamedKey::F1 => "F1",
            NamedKey::F2 => "F2",
            NamedKey::F3 => "F3",
            NamedKey::F4 => "F4",
            NamedKey::F5 => "F5",
            NamedKey::F6 => "F6",
            NamedKey::F7 => "F7",
            NamedKey::F8 => "F8",
            NamedKey::F9 => "F9",
            NamedKey::F10 => "F10",
            NamedKey::F11 => "F11",
            NamedKey::F12 => "F12",
            _ => return None,
        },
        Key::Character(c) if c.as_str() == " " => "Space",
        Key::Character(c) => return Some(c.to_string()),
        _ => return None,
    };
    Some(name.to_string())
}
