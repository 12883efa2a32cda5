//! Minimal Image Viewer UI layer
//!
//! Provides:
//! - wgpu rendering of the egui output
//! - Key event to command mapping
//! - Gallery and help views

pub mod components;
pub mod input;
pub mod renderer;

pub use components::{Gallery, GalleryAction, HelpView};
pub use input::{key_name, InputHandler};
pub use renderer::Renderer;
