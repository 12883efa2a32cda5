//! Current page view with hidden preloading of the neighbouring pages

use app_core::{LoadResult, MetadataEntry, PageWindows, ViewerState};
use egui::{Color32, ColorImage, Pos2, Rect, Sense, TextureHandle, TextureOptions, Ui, Vec2};
use std::collections::{HashMap, HashSet};

/// Action requested from the gallery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryAction {
    /// Put this text on the clipboard
    CopyText(String),
}

enum Slot {
    Loading,
    Ready(TextureHandle),
    Failed(String),
}

/// Decoded textures for the previous, current and next pages
///
/// Only the current page is drawn. Textures for paths that leave all three
/// pages are dropped, which frees them on the GPU.
#[derive(Default)]
pub struct Gallery {
    slots: HashMap<String, Slot>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track the pages around the current position
    ///
    /// Returns the paths that need decoding, current page first.
    pub fn sync(&mut self, windows: &PageWindows<'_, String>) -> Vec<String> {
        let wanted: HashSet<&str> = windows.iter().map(String::as_str).collect();
        let before = self.slots.len();
        self.slots.retain(|path, _| wanted.contains(path.as_str()));
        if self.slots.len() != before {
            tracing::trace!("Released {} textures", before - self.slots.len());
        }

        let mut requests = Vec::new();
        let by_priority = windows
            .current
            .iter()
            .chain(windows.next)
            .chain(windows.prev);
        for path in by_priority {
            if !self.slots.contains_key(path) {
                self.slots.insert(path.clone(), Slot::Loading);
                requests.push(path.clone());
            }
        }
        requests
    }

    /// Store a finished decode; results for released paths are dropped
    pub fn accept(&mut self, ctx: &egui::Context, result: LoadResult) {
        let Some(slot) = self.slots.get_mut(&result.path) else {
            tracing::trace!("Dropping decoded image no longer needed: {}", result.path);
            return;
        };

        *slot = match result.image {
            Ok(image) => {
                let pixels = ColorImage::from_rgba_unmultiplied(
                    [image.width as usize, image.height as usize],
                    &image.rgba,
                );
                Slot::Ready(ctx.load_texture(&result.path, pixels, TextureOptions::LINEAR))
            }
            Err(e) => Slot::Failed(e.user_message()),
        };
    }

    /// Forget every texture, e.g. after the list was reloaded from disk
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_ready(&self, path: &str) -> bool {
        matches!(self.slots.get(path), Some(Slot::Ready(_)))
    }

    pub fn is_loading(&self, path: &str) -> bool {
        matches!(self.slots.get(path), Some(Slot::Loading))
    }

    /// Draw the current page side by side
    pub fn ui(&self, ui: &mut Ui, state: &ViewerState) -> Option<GalleryAction> {
        let current = state.windows().current;
        let area = ui.available_rect_before_wrap();
        let mut action = None;

        for (path, cell) in current.iter().zip(column_rects(area, current.len())) {
            let entry = state.metadata.get(path);

            let response = match self.slots.get(path) {
                Some(Slot::Ready(texture)) => {
                    let rect = fit_rect(cell, texture.size_vec2());
                    let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
                    ui.painter().image(texture.id(), rect, uv, Color32::WHITE);
                    ui.allocate_rect(rect, Sense::click())
                }
                Some(Slot::Failed(message)) => {
                    ui.painter().text(
                        cell.center(),
                        egui::Align2::CENTER_CENTER,
                        format!("{}\n{}", file_name(path), message),
                        egui::FontId::proportional(16.0),
                        Color32::GRAY,
                    );
                    ui.allocate_rect(cell, Sense::click())
                }
                Some(Slot::Loading) | None => {
                    let spinner = Rect::from_center_size(cell.center(), Vec2::splat(24.0));
                    ui.put(spinner, egui::Spinner::new());
                    ui.allocate_rect(cell, Sense::click())
                }
            };

            let response = if state.tooltip_enabled {
                response.on_hover_ui(|ui| {
                    for line in tooltip_lines(path, entry) {
                        ui.label(line);
                    }
                })
            } else {
                response
            };

            response.context_menu(|ui| {
                if ui.button("Copy to Clipboard").clicked() {
                    let text = entry.cloned().unwrap_or_default().describe(path);
                    action = Some(GalleryAction::CopyText(text));
                    ui.close_menu();
                }
            });
        }

        action
    }
}

/// Tooltip for one image; the path until its metadata has been read
pub fn tooltip_lines(path: &str, entry: Option<&MetadataEntry>) -> Vec<String> {
    match entry {
        Some(entry) => entry.tooltip_lines(),
        None => vec![path.to_string()],
    }
}

/// Split `area` into `n` equal columns
pub fn column_rects(area: Rect, n: usize) -> Vec<Rect> {
    if n == 0 {
        return Vec::new();
    }
    let width = area.width() / n as f32;
    (0..n)
        .map(|i| {
            let left = area.left() + width * i as f32;
            Rect::from_min_max(Pos2::new(left, area.top()), Pos2::new(left + width, area.bottom()))
        })
        .collect()
}

/// Largest rect with the image's aspect ratio centered in `cell`, never upscaled
pub fn fit_rect(cell: Rect, image: Vec2) -> Rect {
    if image.x <= 0.0 || image.y <= 0.0 {
        return Rect::from_center_size(cell.center(), Vec2::ZERO);
    }
    let scale = (cell.width() / image.x).min(cell.height() / image.y).min(1.0);
    Rect::from_center_size(cell.center(), image * scale)
}

fn file_name(path: &str) -> &str {
    std::path::Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}
