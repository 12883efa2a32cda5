//! Resolution of picked paths into a flat list of image files

use crate::expand::DirectoryExpander;
use crate::image_types::{is_image_file, IMAGE_TYPES};

/// Turn the paths returned by the picker into the list of images to show.
///
/// Paths that already look like images are kept in picker order; every
/// other path is treated as a directory and expanded. The result is the
/// known images followed by each directory's expansion, in input order.
/// Duplicates (overlapping directories, an image also found by expansion)
/// are kept.
pub fn resolve_image_files<E>(paths: &[String], expander: &E) -> Vec<String>
where
    E: DirectoryExpander + ?Sized,
{
    if paths.first().map_or(true, |p| p.is_empty()) {
        return Vec::new();
    }

    let (images, dirs): (Vec<&String>, Vec<&String>) =
        paths.iter().partition(|p| is_image_file(p));

    tracing::debug!(images = images.len(), dirs = dirs.len(), "Resolving picked paths");

    let mut files: Vec<String> = images.into_iter().cloned().collect();
    for dir in dirs {
        files.extend(expander.expand(dir, IMAGE_TYPES));
    }

    tracing::debug!(count = files.len(), "Resolved image files");
    files
}
