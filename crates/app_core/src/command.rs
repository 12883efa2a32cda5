//! Commands triggered from the keyboard and their key bindings

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Command identifier, as used in the `[keybindings]` config table
pub struct CommandId;

impl CommandId {
    // App commands
    pub const APP_OPEN: &'static str = "app.open";
    pub const APP_RELOAD: &'static str = "app.reload";
    pub const APP_QUIT: &'static str = "app.quit";
    pub const APP_TOGGLE_DEVTOOLS: &'static str = "app.toggle_devtools";

    // View commands
    pub const VIEW_TOGGLE_HELP: &'static str = "view.toggle_help";
    pub const VIEW_TOGGLE_TOOLTIP: &'static str = "view.toggle_tooltip";
    pub const VIEW_MORE_PER_PAGE: &'static str = "view.more_per_page";
    pub const VIEW_FEWER_PER_PAGE: &'static str = "view.fewer_per_page";

    // Navigation commands
    pub const NAV_NEXT_PAGE: &'static str = "nav.next_page";
    pub const NAV_PREV_PAGE: &'static str = "nav.prev_page";
    pub const NAV_FIRST_PAGE: &'static str = "nav.first_page";
    pub const NAV_LAST_PAGE: &'static str = "nav.last_page";
}

/// A user command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Show the picker and load what was chosen
    Open,
    /// Re-expand the last picked paths
    Reload,
    ToggleHelp,
    ToggleTooltip,
    Quit,
    ToggleDevTools,
    /// Next page
    Advance,
    /// Previous page
    Retreat,
    GoFirst,
    GoLast,
    IncreaseSteps,
    DecreaseSteps,
}

impl Command {
    pub const ALL: [Command; 12] = [
        Command::Open,
        Command::Reload,
        Command::ToggleHelp,
        Command::ToggleTooltip,
        Command::Quit,
        Command::ToggleDevTools,
        Command::Advance,
        Command::Retreat,
        Command::GoFirst,
        Command::GoLast,
        Command::IncreaseSteps,
        Command::DecreaseSteps,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Command::Open => CommandId::APP_OPEN,
            Command::Reload => CommandId::APP_RELOAD,
            Command::ToggleHelp => CommandId::VIEW_TOGGLE_HELP,
            Command::ToggleTooltip => CommandId::VIEW_TOGGLE_TOOLTIP,
            Command::Quit => CommandId::APP_QUIT,
            Command::ToggleDevTools => CommandId::APP_TOGGLE_DEVTOOLS,
            Command::Advance => CommandId::NAV_NEXT_PAGE,
            Command::Retreat => CommandId::NAV_PREV_PAGE,
            Command::GoFirst => CommandId::NAV_FIRST_PAGE,
            Command::GoLast => CommandId::NAV_LAST_PAGE,
            Command::IncreaseSteps => CommandId::VIEW_MORE_PER_PAGE,
            Command::DecreaseSteps => CommandId::VIEW_FEWER_PER_PAGE,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Key name -> command lookup
///
/// Key names are case-sensitive (`g` and `G` are different keys) and use
/// the names produced by the input layer: single characters for printable
/// keys, `Space`, `Enter`, `PageDown`, `ArrowLeft`, `F12`, ...
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    bindings: HashMap<String, Command>,
}

impl Keymap {
    /// Build from the config table (command id -> keys)
    ///
    /// Unknown command ids are skipped with a warning. A key bound to two
    /// commands keeps the one whose id sorts first.
    pub fn from_bindings(bindings: &BTreeMap<String, Vec<String>>) -> Self {
        let mut key_to_command = HashMap::new();

        for (id, keys) in bindings {
            let Some(command) = Command::from_id(id) else {
                tracing::warn!("Ignoring keybinding for unknown command: {}", id);
                continue;
            };
            for key in keys {
                if let Some(existing) = key_to_command.get(key) {
                    tracing::warn!("Key {:?} already bound to {}, ignoring for {}", key, existing, command);
                    continue;
                }
                key_to_command.insert(key.clone(), command);
            }
        }

        Self { bindings: key_to_command }
    }

    pub fn resolve(&self, key: &str) -> Option<Command> {
        self.bindings.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
