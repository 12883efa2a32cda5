//! Image file-type allow-list

use std::path::Path;

/// Extensions treated as images, matched case-insensitively
pub const IMAGE_TYPES: &[&str] = &[
    "apng",
    "avif",
    "gif",
    "jpg", "jpeg", "jfif", "pjpeg", "pjp",
    "png",
    "svg",
    "webp",
    "bmp",
    "ico", "cur",
    "tif", "tiff",
];

/// Whether `path` names an image file by extension.
///
/// At least one character must precede the dot, so `.png` alone is not an
/// image. Works on any path string, including ones that do not exist.
pub fn is_image_file(path: &str) -> bool {
    let file_name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);

    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => has_image_extension(ext),
        _ => false,
    }
}

/// Whether a bare extension (no dot) is in the allow-list
pub fn has_image_extension(ext: &str) -> bool {
    IMAGE_TYPES.iter().any(|t| t.eq_ignore_ascii_case(ext))
}
