//! Recursive directory expansion into image files

use std::cmp::Ordering;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Expands a directory into the image files it contains
pub trait DirectoryExpander: Send + Sync {
    /// Every file below `dir` (recursively) whose extension is in
    /// `extensions`, compared case-insensitively.
    ///
    /// Unreadable directories yield fewer results, never an error.
    fn expand(&self, dir: &str, extensions: &[&str]) -> Vec<String>;
}

/// Expander backed by a `walkdir` traversal
///
/// Mirrors a `dir/**/*.@(ext|...)` glob: hidden entries are skipped and
/// symbolic links are not followed. Siblings are visited in natural
/// file-name order.
#[derive(Debug, Clone, Default)]
pub struct WalkDirExpander {
    /// Also descend into and match entries whose name starts with '.'
    pub include_hidden: bool,
}

impl WalkDirExpander {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DirectoryExpander for WalkDirExpander {
    fn expand(&self, dir: &str, extensions: &[&str]) -> Vec<String> {
        let root = Path::new(dir);
        if !root.is_dir() {
            tracing::debug!("Not a directory, nothing to expand: {}", dir);
            return Vec::new();
        }

        let include_hidden = self.include_hidden;
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by(|a, b| natural_cmp(&a.file_name().to_string_lossy(), &b.file_name().to_string_lossy()))
            .into_iter()
            .filter_entry(move |e| e.depth() == 0 || include_hidden || !is_hidden(e));

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry under {}: {}", dir, e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let matches = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| extensions.iter().any(|t| t.eq_ignore_ascii_case(ext)));
            if matches {
                files.push(entry.path().to_string_lossy().into_owned());
            }
        }

        tracing::debug!(dir, count = files.len(), "Expanded directory");
        files
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|s| s.starts_with('.'))
}

/// Natural ordering: "image2.jpg" < "image10.jpg", case-insensitive
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_sort_key(a).cmp(&natural_sort_key(b))
}

fn natural_sort_key(s: &str) -> Vec<NaturalSortPart> {
    let mut parts = Vec::new();
    let mut current_num = String::new();
    let mut current_str = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            if !current_str.is_empty() {
                parts.push(NaturalSortPart::Str(current_str.to_lowercase()));
                current_str.clear();
            }
            current_num.push(c);
        } else {
            if !current_num.is_empty() {
                parts.push(NaturalSortPart::from_digits(&current_num));
                current_num.clear();
            }
            current_str.push(c);
        }
    }

    if !current_num.is_empty() {
        parts.push(NaturalSortPart::from_digits(&current_num));
    }
    if !current_str.is_empty() {
        parts.push(NaturalSortPart::Str(current_str.to_lowercase()));
    }

    parts
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum NaturalSortPart {
    Num(u64),
    Str(String),
}

impl NaturalSortPart {
    // Digit runs too long for u64 fall back to string order
    fn from_digits(digits: &str) -> Self {
        digits
            .parse::<u64>()
            .map(NaturalSortPart::Num)
            .unwrap_or_else(|_| NaturalSortPart::Str(digits.to_string()))
    }
}
