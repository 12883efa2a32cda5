//! Native dialogs

use app_core::{DialogKind, Picker, PickerConfig};

/// File/directory picker backed by the platform dialog
pub struct RfdPicker;

impl Picker for RfdPicker {
    fn pick(&self, config: &PickerConfig) -> Vec<String> {
        for kind in config.mode.dialogs() {
            let picked = match kind {
                DialogKind::Files => {
                    let mut dialog = rfd::FileDialog::new().set_title(&config.title);
                    for filter in &config.filters {
                        dialog = dialog.add_filter(&filter.name, filter.extensions.as_slice());
                    }
                    dialog.pick_files()
                }
                DialogKind::Directories => rfd::FileDialog::new().set_title(&config.title).pick_folders(),
            };

            match picked {
                Some(paths) if !paths.is_empty() => {
                    return paths
                        .into_iter()
                        .map(|p| p.to_string_lossy().into_owned())
                        .collect();
                }
                _ => tracing::debug!(?kind, "Dialog closed without a selection"),
            }
        }

        Vec::new()
    }
}
