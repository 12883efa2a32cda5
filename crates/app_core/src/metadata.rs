//! Per-image metadata for tooltips
//!
//! Entries are fetched lazily, only for the images around the current page,
//! and merged into a new cache value rather than mutating the old one.

use crate::navigation::needed_window;
use futures::future::join_all;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;

/// Metadata of one file; all zero/empty when nothing could be read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataEntry {
    pub width: u32,
    pub height: u32,
    pub keyword: String,
    pub text: String,
}

impl MetadataEntry {
    /// Fetched, but nothing was found
    pub fn is_empty(&self) -> bool {
        self.width == 0 && self.height == 0 && self.keyword.is_empty() && self.text.is_empty()
    }

    /// Tooltip lines: size, keyword, then the text line by line
    pub fn tooltip_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("width: {}, height: {}", self.width, self.height),
            format!("{}:", self.keyword),
        ];
        lines.extend(self.text.lines().map(str::to_string));
        lines
    }

    /// Text offered for copying: the embedded text, or the path and size
    pub fn describe(&self, path: &str) -> String {
        if !self.text.is_empty() {
            return self.text.clone();
        }
        let mut text = format!("File: {}", path);
        if self.width != 0 {
            text.push_str(&format!("\nSize: {}x{}", self.width, self.height));
        }
        text
    }
}

impl From<app_fs::PngMetadata> for MetadataEntry {
    fn from(m: app_fs::PngMetadata) -> Self {
        Self {
            width: m.width,
            height: m.height,
            keyword: m.keyword,
            text: m.text,
        }
    }
}

/// Reads metadata from a file
///
/// Never fails: unsupported formats and read errors give an empty entry.
pub trait MetadataReader: Send + Sync {
    fn read(&self, path: &str) -> MetadataEntry;
}

/// Reader for PNG size and `tEXt` data
#[derive(Debug, Clone, Copy, Default)]
pub struct PngMetadataReader;

impl MetadataReader for PngMetadataReader {
    fn read(&self, path: &str) -> MetadataEntry {
        match app_fs::read_png_metadata(path) {
            Ok(meta) => meta.into(),
            Err(e) => {
                tracing::debug!("No metadata for {}: {}", path, e);
                MetadataEntry::default()
            }
        }
    }
}

/// Insertion-ordered path -> metadata map
///
/// A missing key means "not fetched yet"; an empty entry means "fetched,
/// nothing found".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataCache {
    entries: IndexMap<String, MetadataEntry>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&MetadataEntry> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataEntry)> {
        self.entries.iter()
    }

    /// Paths around the current page that are not cached yet, in list order
    /// and without repeats
    pub fn missing(&self, list: &[String], index: i64, steps: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        needed_window(list, index, steps)
            .iter()
            .filter(|p| !self.contains(p) && seen.insert(p.as_str()))
            .cloned()
            .collect()
    }

    /// A copy of this cache with `fetched` added; existing keys keep their
    /// position and take the new value
    pub fn merged<I>(&self, fetched: I) -> Self
    where
        I: IntoIterator<Item = (String, MetadataEntry)>,
    {
        let mut entries = self.entries.clone();
        entries.extend(fetched);
        Self { entries }
    }
}

/// Read metadata for every path concurrently, one blocking task per file
///
/// Results come back in input order. A task that panics or is cancelled
/// yields an empty entry for its path.
pub async fn fetch_metadata(reader: Arc<dyn MetadataReader>, paths: Vec<String>) -> Vec<(String, MetadataEntry)> {
    let tasks = paths.iter().cloned().map(|path| {
        let reader = Arc::clone(&reader);
        tokio::task::spawn_blocking(move || reader.read(&path))
    });

    let results = join_all(tasks).await;

    paths
        .into_iter()
        .zip(results)
        .map(|(path, result)| {
            let entry = result.unwrap_or_else(|e| {
                tracing::warn!("Metadata task for {} failed: {}", path, e);
                MetadataEntry::default()
            });
            (path, entry)
        })
        .collect()
}

/// Bring `cache` up to date for the pages around `index`
///
/// Returns `cache` unchanged (by value) when everything needed is cached.
pub async fn update_metadata(
    reader: Arc<dyn MetadataReader>,
    list: &[String],
    cache: &MetadataCache,
    index: i64,
    steps: usize,
) -> MetadataCache {
    let missing = cache.missing(list, index, steps);
    if missing.is_empty() {
        tracing::debug!("Metadata cache hit for page at {}", index);
        return cache.clone();
    }

    tracing::debug!(count = missing.len(), "Fetching metadata");
    let fetched = fetch_metadata(reader, missing).await;
    cache.merged(fetched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingReader {
        calls: AtomicUsize,
    }

    impl MetadataReader for CountingReader {
        fn read(&self, path: &str) -> MetadataEntry {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if path.ends_with(".png") {
                MetadataEntry {
                    width: 64,
                    height: 32,
                    keyword: "parameters".into(),
                    text: format!("from {}", path),
                }
            } else {
                MetadataEntry::default()
            }
        }
    }

    fn list(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("/img/{:02}.png", i)).collect()
    }

    #[tokio::test]
    async fn test_update_fetches_needed_window_only() {
        let reader = Arc::new(CountingReader::default());
        let files = list(10);

        let cache = update_metadata(reader.clone(), &files, &MetadataCache::new(), 3, 2).await;

        assert_eq!(reader.calls.load(Ordering::SeqCst), 6);
        let keys: Vec<&String> = cache.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, files[1..7].iter().collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_second_update_is_a_full_hit() {
        let reader = Arc::new(CountingReader::default());
        let files = list(10);

        let first = update_metadata(reader.clone(), &files, &MetadataCache::new(), 0, 3).await;
        let calls = reader.calls.load(Ordering::SeqCst);
        let second = update_metadata(reader.clone(), &files, &first, 0, 3).await;

        assert_eq!(reader.calls.load(Ordering::SeqCst), calls);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_update_does_not_touch_the_input() {
        let reader = Arc::new(CountingReader::default());
        let files = list(4);
        let before = MetadataCache::new().merged(vec![(files[0].clone(), MetadataEntry::default())]);

        let after = update_metadata(reader, &files, &before, 0, 1).await;

        assert_eq!(before.len(), 1);
        assert_eq!(after.len(), 2);
        assert_eq!(after.get(&files[0]), Some(&MetadataEntry::default()));
    }

    #[tokio::test]
    async fn test_unsupported_files_get_empty_entries() {
        let reader: Arc<dyn MetadataReader> = Arc::new(CountingReader::default());
        let fetched = fetch_metadata(reader, vec!["/a.gif".into(), "/b.png".into()]).await;

        assert_eq!(fetched[0].0, "/a.gif");
        assert!(fetched[0].1.is_empty());
        assert_eq!(fetched[1].1.width, 64);
    }

    #[test]
    fn test_missing_skips_duplicates() {
        let files: Vec<String> = vec!["/a.png".into(), "/a.png".into(), "/b.png".into()];
        assert_eq!(MetadataCache::new().missing(&files, 0, 3), vec!["/a.png", "/b.png"]);
    }

    #[test]
    fn test_merge_keeps_insertion_order() {
        let cache = MetadataCache::new()
            .merged(vec![("/b".to_string(), MetadataEntry::default())])
            .merged(vec![("/a".to_string(), MetadataEntry::default())]);
        let keys: Vec<&str> = cache.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["/b", "/a"]);
    }

    #[test]
    fn test_describe() {
        let with_text = MetadataEntry {
            width: 1,
            height: 2,
            keyword: "parameters".into(),
            text: "prompt".into(),
        };
        assert_eq!(with_text.describe("/x.png"), "prompt");

        let sized = MetadataEntry { width: 640, height: 480, ..Default::default() };
        assert_eq!(sized.describe("/x.png"), "File: /x.png\nSize: 640x480");

        assert_eq!(MetadataEntry::default().describe("/x.gif"), "File: /x.gif");
    }

    #[test]
    fn test_tooltip_lines() {
        let entry = MetadataEntry {
            width: 3,
            height: 4,
            keyword: "Comment".into(),
            text: "one\ntwo".into(),
        };
        assert_eq!(entry.tooltip_lines(), vec!["width: 3, height: 4", "Comment:", "one", "two"]);
    }

    #[test]
    fn test_png_reader_swallows_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.png");
        std::fs::write(&path, b"not really a png").unwrap();

        let entry = PngMetadataReader.read(path.to_str().unwrap());
        assert!(entry.is_empty());
        assert!(PngMetadataReader.read("/definitely/missing.png").is_empty());
    }
}
