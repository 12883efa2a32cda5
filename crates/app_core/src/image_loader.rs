//! Background image decoding
//!
//! Decoding runs on a small pool of worker threads fed by a crossbeam
//! channel. Results come back on a second channel that the UI drains once
//! per frame; `notify` wakes the event loop when one arrives. Requests for
//! paths the UI has released while they were queued are skipped.

use crate::AppError;
use crossbeam_channel::{unbounded, Receiver, Sender};
use image::{GenericImageView, ImageReader};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Images larger than this on either side are downscaled before upload
pub const MAX_TEXTURE_SIDE: u32 = 4096;

const WORKERS: usize = 2;

/// Decoded RGBA8 pixels of one file
#[derive(Clone)]
pub struct LoadedImage {
    pub path: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for LoadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedImage")
            .field("path", &self.path)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Outcome of one request
#[derive(Debug)]
pub struct LoadResult {
    pub path: String,
    pub image: Result<LoadedImage, AppError>,
}

struct LoadRequest {
    path: String,
}

type WantedPaths = Arc<RwLock<HashSet<String>>>;

/// Image loader service
pub struct ImageLoader {
    request_tx: Sender<LoadRequest>,
    result_rx: Receiver<LoadResult>,
    wanted: WantedPaths,
}

impl ImageLoader {
    /// Start the workers; `notify` runs after every finished request
    pub fn new(notify: Arc<dyn Fn() + Send + Sync>) -> Result<Self, AppError> {
        let (request_tx, request_rx) = unbounded::<LoadRequest>();
        let (result_tx, result_rx) = unbounded::<LoadResult>();
        let wanted: WantedPaths = Arc::default();

        for i in 0..WORKERS {
            let request_rx = request_rx.clone();
            let result_tx = result_tx.clone();
            let wanted = Arc::clone(&wanted);
            let notify = Arc::clone(&notify);
            std::thread::Builder::new()
                .name(format!("image-loader-{}", i))
                .spawn(move || run_worker(request_rx, result_tx, wanted, notify))
                .map_err(|e| AppError::Init(format!("Failed to spawn image loader: {}", e)))?;
        }

        Ok(Self { request_tx, result_rx, wanted })
    }

    /// Queue a file for decoding
    pub fn request(&self, path: &str) {
        tracing::trace!("Queue image: {}", path);
        self.wanted.write().insert(path.to_string());
        if self.request_tx.send(LoadRequest { path: path.to_string() }).is_err() {
            tracing::error!("Image loader workers are gone");
        }
    }

    /// Release every path not in `paths`; queued requests for them are skipped
    pub fn retain<'a, I>(&self, paths: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        let keep: HashSet<&String> = paths.into_iter().collect();
        self.wanted.write().retain(|path| keep.contains(path));
    }

    /// Finished requests, without blocking
    pub fn drain(&self) -> Vec<LoadResult> {
        self.result_rx.try_iter().collect()
    }

    pub fn results(&self) -> &Receiver<LoadResult> {
        &self.result_rx
    }
}

fn run_worker(
    requests: Receiver<LoadRequest>,
    results: Sender<LoadResult>,
    wanted: WantedPaths,
    notify: Arc<dyn Fn() + Send + Sync>,
) {
    while let Ok(request) = requests.recv() {
        if !wanted.read().contains(&request.path) {
            tracing::trace!("Skipping released image: {}", request.path);
            continue;
        }

        let image = decode_image(Path::new(&request.path), MAX_TEXTURE_SIDE);
        if let Err(e) = &image {
            tracing::warn!("Failed to load {}: {}", request.path, e);
        }
        if results.send(LoadResult { path: request.path, image }).is_err() {
            break;
        }
        notify();
    }
}

/// Decode a file to RGBA8, shrinking it to fit `max_side`
pub fn decode_image(path: &Path, max_side: u32) -> Result<LoadedImage, AppError> {
    tracing::debug!("Loading image: {}", path.display());

    let img = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?;

    let (w, h) = img.dimensions();
    let img = if w > max_side || h > max_side {
        img.thumbnail(max_side, max_side)
    } else {
        img
    };

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(LoadedImage {
        path: path.to_string_lossy().into_owned(),
        width,
        height,
        rgba: rgba.into_raw(),
    })
}
