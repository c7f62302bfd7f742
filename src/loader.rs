//! Image loading collaborators.
//!
//! A loader turns a URL into a [`PendingImage`], a single-shot handle the
//! viewer polls from its event loop. [`ThreadedLoader`] reads and decodes
//! files on a background thread (native only); [`MemoryLoader`] decodes
//! bytes the host registered up front.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use image::DynamicImage;

use crate::error::LoadError;

/// A decoded image and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub image: DynamicImage,
}

impl LoadedImage {
    /// Decode an encoded image (PNG, JPEG, ...) from memory.
    pub fn decode(url: &str, data: &[u8]) -> Result<Self, LoadError> {
        let image = image::load_from_memory(data).map_err(|source| LoadError::Decode {
            url: url.to_string(),
            source,
        })?;
        Ok(Self {
            url: url.to_string(),
            width: image.width(),
            height: image.height(),
            image,
        })
    }
}

pub type LoadResult = Result<LoadedImage, LoadError>;

/// Result of a load that may still be in flight.
///
/// Yields exactly one result; after that it stays empty.
#[derive(Debug)]
pub struct PendingImage {
    url: String,
    rx: Receiver<LoadResult>,
    done: bool,
}

impl PendingImage {
    /// A pending image and the sender that completes it.
    pub fn channel(url: &str) -> (Sender<LoadResult>, Self) {
        let (tx, rx) = mpsc::channel();
        let pending = Self {
            url: url.to_string(),
            rx,
            done: false,
        };
        (tx, pending)
    }

    /// A pending image that is already resolved.
    pub fn ready(url: &str, result: LoadResult) -> Self {
        let (tx, pending) = Self::channel(url);
        // The receiver is alive, so the send cannot fail.
        let _ = tx.send(result);
        pending
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Take the result if it has arrived. Non-blocking.
    pub fn try_take(&mut self) -> Option<LoadResult> {
        if self.done {
            return None;
        }
        let result = match self.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Loader for '{}' stopped without a result", self.url);
                Err(LoadError::Disconnected(self.url.clone()))
            }
        };
        self.done = true;
        Some(result)
    }

    /// Block until the result arrives.
    pub fn wait(self) -> LoadResult {
        if self.done {
            return Err(LoadError::Disconnected(self.url));
        }
        self.rx
            .recv()
            .unwrap_or_else(|_| Err(LoadError::Disconnected(self.url.clone())))
    }
}

/// Starts image loads.
pub trait ImageLoader {
    fn load(&self, url: &str) -> PendingImage;
}

/// Loads local files on a background thread per request.
///
/// Accepts plain paths and `file://` URLs.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadedLoader;

#[cfg(not(target_arch = "wasm32"))]
impl ThreadedLoader {
    fn resolve_path(url: &str) -> Option<std::path::PathBuf> {
        if let Some(path) = url.strip_prefix("file://") {
            return Some(std::path::PathBuf::from(path));
        }
        if url.contains("://") {
            return None;
        }
        Some(std::path::PathBuf::from(url))
    }

    fn read_and_decode(url: &str, path: &std::path::Path) -> LoadResult {
        let data = std::fs::read(path).map_err(|source| LoadError::Io {
            url: url.to_string(),
            source,
        })?;
        log::debug!("Decoding image: {:?} ({} bytes)", path, data.len());
        LoadedImage::decode(url, &data)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ImageLoader for ThreadedLoader {
    fn load(&self, url: &str) -> PendingImage {
        let Some(path) = Self::resolve_path(url) else {
            return PendingImage::ready(url, Err(LoadError::UnsupportedUrl(url.to_string())));
        };

        let (tx, pending) = PendingImage::channel(url);
        let owned_url = url.to_string();
        let spawned = std::thread::Builder::new()
            .name(crate::constants::LOADER_THREAD_NAME.to_string())
            .spawn(move || {
                let result = Self::read_and_decode(&owned_url, &path);
                if tx.send(result).is_err() {
                    log::debug!("Load of '{}' finished after its handle was dropped", owned_url);
                }
            });

        match spawned {
            Ok(_) => pending,
            Err(source) => {
                log::error!("Failed to spawn loader thread: {}", source);
                PendingImage::ready(
                    url,
                    Err(LoadError::Io {
                        url: url.to_string(),
                        source,
                    }),
                )
            }
        }
    }
}

/// Decodes images from bytes registered under a URL.
///
/// Clones share the same registry, so a host can keep a handle and add
/// sources after handing the loader to a viewer.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    sources: Rc<RefCell<HashMap<String, Vec<u8>>>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded image bytes for `url`, replacing earlier ones.
    pub fn register(&self, url: &str, data: Vec<u8>) {
        self.sources.borrow_mut().insert(url.to_string(), data);
    }

    pub fn remove(&self, url: &str) -> bool {
        self.sources.borrow_mut().remove(url).is_some()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.sources.borrow().contains_key(url)
    }
}

impl ImageLoader for MemoryLoader {
    fn load(&self, url: &str) -> PendingImage {
        let result = match self.sources.borrow().get(url) {
            Some(data) => LoadedImage::decode(url, data),
            None => Err(LoadError::NotFound(url.to_string())),
        };
        PendingImage::ready(url, result)
    }
}
