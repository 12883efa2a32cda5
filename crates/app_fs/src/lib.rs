//! File system layer of the viewer
//!
//! Provides:
//! - The image file-type allow-list
//! - Recursive directory expansion into image files
//! - Resolution of picked paths into a flat image list
//! - The PNG size and text lookup backing the metadata tooltips

mod image_types;
mod expand;
mod resolver;
mod png_text;

pub use image_types::{IMAGE_TYPES, is_image_file, has_image_extension};
pub use expand::{DirectoryExpander, WalkDirExpander, natural_cmp};
pub use resolver::resolve_image_files;
pub use png_text::{PngMetadata, read_png_metadata, parse_png_metadata};

use thiserror::Error;

/// File system errors
#[derive(Error, Debug)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("PNG decoding error: {0}")]
    Png(#[from] png::DecodingError),
}

pub type Result<T> = std::result::Result<T, FsError>;
