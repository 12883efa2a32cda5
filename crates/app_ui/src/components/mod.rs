//! UI Components

pub mod gallery;
pub mod help;

pub use gallery::{column_rects, fit_rect, tooltip_lines, Gallery, GalleryAction};
pub use help::HelpView;
