//! Sky-map texture layers.
//!
//! Each [`LayerId`] owns a fixed texture unit for the whole session. Images
//! decode on background threads; finished decodes are collected on the render
//! thread by [`TextureSet::poll`], so completions never race a draw.
//!
//! # Invariants
//! - The ready count never decreases and counts each layer at most once.
//! - A failed load is logged and leaves the layer pending.

mod image_layer;

pub use image_layer::{LayerImage, PLACEHOLDER_TEXEL, mip_chain};

use aberration_common::{LAYER_COUNT, LayerId, TexturePaths};
use crossbeam_channel::{Receiver, Sender};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Errors from decoding a layer image.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image {path} has zero size")]
    EmptyImage { path: PathBuf },
}

/// Load state of one texture unit as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerState {
    /// No load requested; the placeholder is bound.
    Unrequested,
    /// Requested and not (successfully) completed.
    Pending,
    Loaded,
}

#[derive(Debug, Clone)]
struct LayerSlot {
    state: LayerState,
    source: Option<PathBuf>,
}

struct LoadResult {
    layer: LayerId,
    result: Result<LayerImage, AssetError>,
}

/// The five sky-map layers and their load progress.
pub struct TextureSet {
    slots: [LayerSlot; LAYER_COUNT],
    ready_count: usize,
    in_flight: usize,
    sender: Sender<LoadResult>,
    receiver: Receiver<LoadResult>,
}

impl Default for TextureSet {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TextureSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureSet")
            .field("slots", &self.slots)
            .field("ready_count", &self.ready_count)
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

fn decode(path: &Path) -> Result<image::RgbaImage, AssetError> {
    let img = image::open(path)
        .map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    if img.width() == 0 || img.height() == 0 {
        return Err(AssetError::EmptyImage {
            path: path.to_path_buf(),
        });
    }
    Ok(img)
}

impl TextureSet {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            slots: std::array::from_fn(|_| LayerSlot {
                state: LayerState::Unrequested,
                source: None,
            }),
            ready_count: 0,
            in_flight: 0,
            sender,
            receiver,
        }
    }

    /// Start decoding `source` for `layer` in the background.
    ///
    /// Fire and forget: the result arrives through [`poll`](Self::poll).
    /// Returns `false` if the layer was already requested; loads are never retried.
    pub fn request_load(&mut self, layer: LayerId, source: impl Into<PathBuf>) -> bool {
        let source = source.into();
        let slot = &mut self.slots[layer.index()];
        if slot.state != LayerState::Unrequested {
            tracing::debug!(%layer, path = %source.display(), "layer already requested");
            return false;
        }
        slot.state = LayerState::Pending;
        slot.source = Some(source.clone());
        self.in_flight += 1;

        let tx = self.sender.clone();
        std::thread::spawn(move || {
            let result = decode(&source).map(|img| LayerImage::new(layer, img));
            // The set may have been dropped; nobody is waiting then.
            let _ = tx.send(LoadResult { layer, result });
        });
        true
    }

    /// Request every layer from the configured paths.
    pub fn request_all(&mut self, paths: &TexturePaths) {
        for (layer, path) in paths.iter() {
            self.request_load(layer, path);
        }
    }

    /// Collect finished decodes. Call once per frame on the render thread.
    ///
    /// Returns the images that completed since the last poll, ready to upload.
    pub fn poll(&mut self) -> Vec<LayerImage> {
        let mut loaded = Vec::new();
        while let Ok(done) = self.receiver.try_recv() {
            if let Some(img) = self.finish(done) {
                loaded.push(img);
            }
        }
        loaded
    }

    /// Block until every requested layer has finished or `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> Vec<LayerImage> {
        let deadline = Instant::now() + timeout;
        let mut loaded = Vec::new();
        while self.in_flight > 0 {
            let Some(left) = deadline.checked_duration_since(Instant::now()) else {
                break;
            };
            match self.receiver.recv_timeout(left) {
                Ok(done) => loaded.extend(self.finish(done)),
                Err(_) => break,
            }
        }
        loaded
    }

    fn finish(&mut self, done: LoadResult) -> Option<LayerImage> {
        self.in_flight = self.in_flight.saturating_sub(1);
        let layer = done.layer;
        match done.result {
            Ok(img) => {
                if self.on_load_complete(layer) {
                    tracing::info!(
                        %layer,
                        width = img.width(),
                        height = img.height(),
                        mips = img.mip_count(),
                        ready = self.ready_count,
                        "texture loaded"
                    );
                    Some(img)
                } else {
                    None
                }
            }
            Err(err) => {
                tracing::warn!(%layer, error = %err, "texture load failed; layer stays pending");
                None
            }
        }
    }

    /// Mark `layer` loaded. Returns `true` the first time only.
    pub fn on_load_complete(&mut self, layer: LayerId) -> bool {
        let slot = &mut self.slots[layer.index()];
        if slot.state == LayerState::Loaded {
            return false;
        }
        slot.state = LayerState::Loaded;
        self.ready_count += 1;
        true
    }

    pub fn ready_count(&self) -> usize {
        self.ready_count
    }

    pub fn is_ready(&self, threshold: usize) -> bool {
        self.ready_count >= threshold
    }

    pub fn state(&self, layer: LayerId) -> LayerState {
        self.slots[layer.index()].state
    }

    pub fn source(&self, layer: LayerId) -> Option<&Path> {
        self.slots[layer.index()].source.as_deref()
    }

    /// Requests whose decode has not reported back yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    const WAIT: Duration = Duration::from_secs(10);

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(w, h, Rgba([200, 100, 50, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn loads_in_background() {
        let dir = tempfile::tempdir().unwrap();
        let grid = write_png(dir.path(), "grid.png", 8, 4);
        let galaxy = write_png(dir.path(), "galaxy.png", 16, 16);

        let mut set = TextureSet::new();
        assert!(set.request_load(LayerId::Grid, &grid));
        assert_eq!(set.state(LayerId::Grid), LayerState::Pending);
        assert!(!set.is_ready(2));

        assert!(set.request_load(LayerId::Galaxy, &galaxy));
        let mut loaded = set.wait(WAIT);
        loaded.sort_by_key(|img| img.layer());
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].layer(), LayerId::Grid);
        assert_eq!((loaded[0].width(), loaded[0].height()), (8, 4));
        assert_eq!(loaded[1].mip_count(), 5);

        assert_eq!(set.ready_count(), 2);
        assert!(set.is_ready(2));
        assert_eq!(set.state(LayerId::Galaxy), LayerState::Loaded);
        assert_eq!(set.state(LayerId::Stars), LayerState::Unrequested);
        assert_eq!(set.source(LayerId::Grid), Some(grid.as_path()));
    }

    #[test]
    fn failed_load_stays_pending() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("stars.jpg");
        std::fs::write(&bogus, b"not an image").unwrap();

        let mut set = TextureSet::new();
        set.request_load(LayerId::Stars, dir.path().join("missing.png"));
        set.request_load(LayerId::Overlay, &bogus);
        assert!(set.wait(WAIT).is_empty());
        assert_eq!(set.in_flight(), 0);
        assert_eq!(set.ready_count(), 0);
        assert_eq!(set.state(LayerId::Stars), LayerState::Pending);
        assert_eq!(set.state(LayerId::Overlay), LayerState::Pending);
    }

    #[test]
    fn requests_are_not_repeated() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "c.png", 2, 2);
        let mut set = TextureSet::new();
        assert!(set.request_load(LayerId::Constellations, &path));
        assert!(!set.request_load(LayerId::Constellations, &path));
        set.wait(WAIT);
        assert!(!set.request_load(LayerId::Constellations, &path));
        assert_eq!(set.ready_count(), 1);
    }

    #[test]
    fn completion_counts_once() {
        let mut set = TextureSet::new();
        assert!(set.on_load_complete(LayerId::Grid));
        assert!(!set.on_load_complete(LayerId::Grid));
        assert!(set.on_load_complete(LayerId::Stars));
        assert_eq!(set.ready_count(), 2);
        assert!(set.is_ready(2));
        assert!(!set.is_ready(3));
    }

    #[test]
    fn poll_without_requests_is_empty() {
        let mut set = TextureSet::new();
        assert!(set.poll().is_empty());
        assert!(set.wait(Duration::from_millis(1)).is_empty());
    }

    #[test]
    fn request_all_uses_configured_paths() {
        let dir = tempfile::tempdir().unwrap();
        let textures = dir.path().join("textures");
        std::fs::create_dir_all(&textures).unwrap();
        for name in ["grid.png", "galaxy.jpg"] {
            image::RgbImage::from_pixel(4, 2, image::Rgb([1, 2, 3]))
                .save(textures.join(name))
                .unwrap();
        }
        let paths = TexturePaths::default().rebased(dir.path());
        let mut set = TextureSet::new();
        set.request_all(&paths);
        let loaded = set.wait(WAIT);
        assert_eq!(loaded.len(), 2);
        assert_eq!(set.ready_count(), 2);
        for layer in [LayerId::Constellations, LayerId::Stars, LayerId::Overlay] {
            assert_eq!(set.state(layer), LayerState::Pending);
        }
    }
}
