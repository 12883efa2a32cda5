//! Runs the effects requested by the reducer
//!
//! The picker runs on the calling (UI) thread. Directory expansion and
//! metadata reads go to the tokio runtime; their results come back as
//! [`Action`]s on a crossbeam channel, followed by a call to `notify` so the
//! event loop wakes up and feeds them to the reducer.

use crate::config::SettingsStore;
use crate::metadata::{fetch_metadata, MetadataReader, PngMetadataReader};
use crate::picker::{Picker, PickerConfig, PickerMode};
use crate::state::{reduce, Action, Effect, ViewerState};
use app_fs::{resolve_image_files, DirectoryExpander, WalkDirExpander};
use crossbeam_channel::Sender;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Effects only the windowing layer can carry out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformRequest {
    Quit,
    ToggleDevTools,
}

/// Executes [`Effect`]s against the real (or fake) collaborators
pub struct EffectRunner {
    runtime: Handle,
    picker: Box<dyn Picker>,
    picker_mode: PickerMode,
    expander: Arc<dyn DirectoryExpander>,
    reader: Arc<dyn MetadataReader>,
    settings: Arc<dyn SettingsStore>,
    actions: Sender<Action>,
    notify: Arc<dyn Fn() + Send + Sync>,
}

impl EffectRunner {
    pub fn new(
        runtime: Handle,
        picker: Box<dyn Picker>,
        settings: Arc<dyn SettingsStore>,
        actions: Sender<Action>,
        notify: Arc<dyn Fn() + Send + Sync>,
    ) -> Self {
        Self {
            runtime,
            picker,
            picker_mode: PickerMode::default(),
            expander: Arc::new(WalkDirExpander::new()),
            reader: Arc::new(PngMetadataReader),
            settings,
            actions,
            notify,
        }
    }

    pub fn with_picker_mode(mut self, mode: PickerMode) -> Self {
        self.picker_mode = mode;
        self
    }

    pub fn with_expander(mut self, expander: Arc<dyn DirectoryExpander>) -> Self {
        self.expander = expander;
        self
    }

    pub fn with_metadata_reader(mut self, reader: Arc<dyn MetadataReader>) -> Self {
        self.reader = reader;
        self
    }

    /// Reduce `action` and run the resulting effects
    pub fn dispatch(&self, state: &ViewerState, action: Action) -> (ViewerState, Vec<PlatformRequest>) {
        let (next, effects) = reduce(state, action);
        let requests = effects.into_iter().filter_map(|e| self.run(e)).collect();
        (next, requests)
    }

    /// Run one effect
    pub fn run(&self, effect: Effect) -> Option<PlatformRequest> {
        match effect {
            Effect::ShowPicker { generation } => {
                let paths = self.picker.pick(&PickerConfig::images(self.picker_mode));
                tracing::info!(count = paths.len(), "Picker closed");
                self.send(Action::PickerClosed { generation, paths });
                None
            }

            Effect::Resolve { generation, origin, paths } => {
                let expander = Arc::clone(&self.expander);
                let actions = self.actions.clone();
                let notify = Arc::clone(&self.notify);
                self.runtime.spawn_blocking(move || {
                    let files = resolve_image_files(&paths, &*expander);
                    if actions.send(Action::FilesResolved { generation, origin, files }).is_ok() {
                        notify();
                    }
                });
                None
            }

            Effect::FetchMetadata { generation, paths } => {
                let reader = Arc::clone(&self.reader);
                let actions = self.actions.clone();
                let notify = Arc::clone(&self.notify);
                self.runtime.spawn(async move {
                    let entries = fetch_metadata(reader, paths).await;
                    if actions.send(Action::MetadataFetched { generation, entries }).is_ok() {
                        notify();
                    }
                });
                None
            }

            Effect::PersistSettings(viewer) => {
                if let Err(e) = self.settings.update(&|config| config.viewer = viewer) {
                    tracing::warn!("Failed to persist settings: {}", e);
                }
                None
            }

            Effect::Quit => Some(PlatformRequest::Quit),
            Effect::ToggleDevTools => Some(PlatformRequest::ToggleDevTools),
        }
    }

    fn send(&self, action: Action) {
        if self.actions.send(action).is_ok() {
            (self.notify)();
        } else {
            tracing::debug!("Action channel closed");
        }
    }
}
