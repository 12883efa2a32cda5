//! Minimal Image Viewer core logic
//!
//! This crate contains:
//! - Viewer state and the reducer driving it
//! - Pagination over the image list
//! - Commands and key bindings
//! - Configuration and settings persistence
//! - Metadata cache
//! - Effect runner for the asynchronous collaborators
//! - Background image loading

pub mod command;
pub mod config;
pub mod effects;
pub mod error;
pub mod help;
pub mod image_loader;
pub mod metadata;
pub mod navigation;
pub mod picker;
pub mod state;

pub use command::{Command, CommandId, Keymap};
pub use config::{
    default_keybindings, AppConfig, FileSettingsStore, MemorySettingsStore, PickerSettings,
    SettingsStore, ViewerSettings, WindowBounds,
};
pub use effects::{EffectRunner, PlatformRequest};
pub use error::AppError;
pub use help::{help_text, help_text_for, platform_identifier};
pub use image_loader::{decode_image, ImageLoader, LoadResult, LoadedImage, MAX_TEXTURE_SIDE};
pub use metadata::{
    fetch_metadata, update_metadata, MetadataCache, MetadataEntry, MetadataReader, PngMetadataReader,
};
pub use navigation::{page_windows, safe_slice, PageWindows, MAX_STEPS};
pub use picker::{DialogKind, FileFilter, Picker, PickerConfig, PickerMode};
pub use state::{reduce, Action, Effect, ResolveOrigin, ViewMode, ViewerState};
