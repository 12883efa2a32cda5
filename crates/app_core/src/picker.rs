//! File/directory picker contract

use app_fs::IMAGE_TYPES;
use serde::{Deserialize, Serialize};

/// What the picker lets the user select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PickerMode {
    #[serde(rename = "files")]
    Files,
    #[serde(rename = "directories")]
    Directories,
    /// A files dialog, followed by a directories dialog if it is cancelled
    #[default]
    #[serde(rename = "multi")]
    Multi,
}

/// One native dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Files,
    Directories,
}

impl PickerMode {
    /// Dialogs shown in turn until one returns a selection
    pub fn dialogs(self) -> &'static [DialogKind] {
        match self {
            PickerMode::Files => &[DialogKind::Files],
            PickerMode::Directories => &[DialogKind::Directories],
            PickerMode::Multi => &[DialogKind::Files, DialogKind::Directories],
        }
    }

    /// One-line description for the usage screen
    pub fn describe(self) -> &'static str {
        match self {
            PickerMode::Files => "The open dialog selects image files.",
            PickerMode::Directories => "The open dialog selects directories.",
            PickerMode::Multi => {
                "The open dialog selects image files; cancel it to select directories instead."
            }
        }
    }
}

/// A named group of extensions offered by the dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    pub name: String,
    /// Extensions without the dot; `*` matches everything
    pub extensions: Vec<String>,
}

/// Dialog configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerConfig {
    pub title: String,
    pub filters: Vec<FileFilter>,
    pub mode: PickerMode,
}

impl PickerConfig {
    /// The dialog used to open images
    pub fn images(mode: PickerMode) -> Self {
        Self {
            title: "Select image directories".to_string(),
            filters: vec![
                FileFilter {
                    name: "Images".to_string(),
                    extensions: IMAGE_TYPES.iter().map(|e| e.to_string()).collect(),
                },
                FileFilter {
                    name: "All Files".to_string(),
                    extensions: vec!["*".to_string()],
                },
            ],
            mode,
        }
    }
}

/// Native file/directory picker
///
/// Returns the chosen paths, or an empty list when the user cancels.
/// Runs on the UI thread; it may block until the dialog closes.
pub trait Picker {
    fn pick(&self, config: &PickerConfig) -> Vec<String>;
}
