//! Usage screen text

use crate::command::Command;
use crate::config::default_keybindings;
use crate::picker::PickerMode;
use std::collections::BTreeMap;

const KEY_COLUMN: usize = 43;

/// Platform identifier as reported by the OS (`linux`, `macos`, `windows`)
pub fn platform_identifier() -> &'static str {
    std::env::consts::OS
}

fn describe(command: Command) -> &'static str {
    match command {
        Command::Open => "Open image files or directories.",
        Command::Reload => "Reload directories.",
        Command::ToggleHelp => "Toggle this help.",
        Command::ToggleTooltip => "Toggle showing metadata as a tooltip.",
        Command::Quit => "Quit.",
        Command::Advance => "Move forward one page.",
        Command::Retreat => "Move backward one page.",
        Command::GoFirst => "Go to first page.",
        Command::GoLast => "Go to last page.",
        Command::IncreaseSteps => "Increase the number of images per page.",
        Command::DecreaseSteps => "Reduce the number of images per page.",
        Command::ToggleDevTools => "Toggle the inspector.",
    }
}

fn row(keys: &str, description: &str) -> String {
    format!("{:<width$}{}", keys, description, width = KEY_COLUMN)
}

/// Usage screen for the default key bindings and picker mode
pub fn help_text(platform: &str) -> String {
    help_text_for(platform, &default_keybindings(), PickerMode::default())
}

/// Usage screen for the given bindings (command id -> keys)
pub fn help_text_for(
    platform: &str,
    bindings: &BTreeMap<String, Vec<String>>,
    picker_mode: PickerMode,
) -> String {
    let mut lines = vec![
        "Minimal Image Viewer".to_string(),
        String::new(),
        picker_mode.describe().to_string(),
        String::new(),
        "Key bindings (similar as 'less' command)".to_string(),
        String::new(),
    ];

    let zoom_rows = if platform == "macos" {
        [("⌘+", "Zoom in."), ("⌘-", "Zoom out."), ("⌘0", "Actual size.")]
    } else {
        [("Ctrl and +", "Zoom in."), ("Ctrl and -", "Zoom out."), ("Ctrl and 0", "Actual size.")]
    };

    for command in Command::ALL {
        // Listed after the zoom rows
        if command == Command::ToggleDevTools {
            continue;
        }
        if let Some(keys) = bindings.get(command.id()).filter(|k| !k.is_empty()) {
            lines.push(row(&keys.join(", "), describe(command)));
        }
    }
    lines.extend(zoom_rows.iter().map(|(keys, description)| row(keys, description)));
    if let Some(keys) = bindings.get(Command::ToggleDevTools.id()).filter(|k| !k.is_empty()) {
        lines.push(row(&keys.join(", "), describe(Command::ToggleDevTools)));
    }

    lines.join("\n")
}
