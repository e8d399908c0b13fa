//! Image load coordination.
//!
//! Turns "index N needs a texture" into a cached texture: local sources
//! are decoded inline, remote sources are fetched on the tokio runtime with
//! at most one request per index, and every failure resolves to a
//! placeholder so no slot stays empty.
//!
//! Completions come back over an unbounded channel and are applied by the
//! owning view on its own thread via [`ImageLoadCoordinator::handle_completion`].

pub mod decode;
pub mod fetcher;
pub mod registry;
pub mod source;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use image::DynamicImage;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use url::Url;

use crate::cache::TextureCache;
use crate::content::ContentIndex;
use crate::error::{CarouselError, Result};
use crate::layout::CategoryLayoutModel;
use crate::lifecycle::Lifecycle;
use crate::surface::RenderSurface;
use crate::visibility::VisibleSet;

pub use decode::{decode_image, fit_to_tile, placeholder_image};
pub use fetcher::{HttpImageFetcher, ImageFetcher};
pub use registry::{FetchRegistry, PendingFetch};
pub use source::ImageSource;

/// Result of a finished remote request.
#[derive(Debug)]
pub struct FetchCompletion {
    pub index: usize,
    pub generation: u64,
    pub result: Result<DynamicImage>,
}

/// What a load request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Texture already present.
    Cached,
    /// Nothing done: out of range, not wanted, surface not ready, stale or
    /// tearing down.
    Skipped,
    /// Real artwork stored.
    Loaded,
    /// Fallback artwork stored.
    Placeholder,
    /// Remote request started.
    FetchIssued { generation: u64 },
}

/// View state a load decision depends on.
#[derive(Debug, Clone, Copy)]
pub struct LoadContext<'a> {
    pub content: &'a ContentIndex,
    pub layout: &'a CategoryLayoutModel,
    pub visible: &'a VisibleSet,
    /// Indices requested ahead of visibility by navigation preloading.
    pub prefetch: &'a BTreeSet<usize>,
}

impl LoadContext<'_> {
    /// Whether a decoded image for `index` is still worth a texture.
    pub fn wants(&self, index: usize) -> bool {
        self.visible.contains(index) || self.prefetch.contains(&index)
    }
}

/// Coordinates local decoding, remote fetching and texture creation.
#[derive(Debug)]
pub struct ImageLoadCoordinator {
    cache: Arc<TextureCache>,
    registry: FetchRegistry,
    fetcher: Arc<dyn ImageFetcher>,
    surface: Arc<dyn RenderSurface>,
    runtime: Handle,
    completions: mpsc::UnboundedSender<FetchCompletion>,
    lifecycle: Arc<Lifecycle>,
    timeout: Duration,
    local_memo: DashMap<PathBuf, Arc<DynamicImage>>,
    local_memo_capacity: usize,
}

impl ImageLoadCoordinator {
    /// Create a coordinator and the receiver its completions arrive on.
    pub fn new(
        cache: Arc<TextureCache>,
        fetcher: Arc<dyn ImageFetcher>,
        surface: Arc<dyn RenderSurface>,
        runtime: Handle,
        lifecycle: Arc<Lifecycle>,
        timeout: Duration,
        local_memo_capacity: usize,
    ) -> (Self, mpsc::UnboundedReceiver<FetchCompletion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                cache,
                registry: FetchRegistry::new(),
                fetcher,
                surface,
                runtime,
                completions: tx,
                lifecycle,
                timeout,
                local_memo: DashMap::new(),
                local_memo_capacity,
            },
            rx,
        )
    }

    /// Remote requests in flight.
    pub fn pending_count(&self) -> usize {
        self.registry.len()
    }

    /// Whether `index` is waiting on a remote request.
    pub fn is_pending(&self, index: usize) -> bool {
        self.registry.contains(index)
    }

    /// Generation of the request in flight for `index`.
    pub fn pending_generation(&self, index: usize) -> Option<u64> {
        self.registry.generation_of(index)
    }

    /// Make sure `index` has, or will get, a texture.
    pub fn load_image(&self, index: usize, ctx: &LoadContext<'_>) -> LoadOutcome {
        if !self.lifecycle.is_live() {
            return LoadOutcome::Skipped;
        }
        let Some(item) = ctx.content.item(index) else {
            return LoadOutcome::Skipped;
        };
        if self.cache.has(index) {
            return LoadOutcome::Cached;
        }

        match ImageSource::resolve(&item.image_source) {
            ImageSource::Local(path) => match self.load_local(&path) {
                Ok(image) => self.process_loaded_image(index, &image, ctx),
                Err(err) => {
                    log::warn!(
                        "Local image {} for index {} failed: {}",
                        path.display(),
                        index,
                        err
                    );
                    self.store_placeholder(index, ctx)
                }
            },
            ImageSource::Remote(url) => {
                if !self.surface.is_ready() {
                    return LoadOutcome::Skipped;
                }
                let generation = self.issue_fetch(index, url);
                LoadOutcome::FetchIssued { generation }
            }
            ImageSource::Unsupported(raw) => {
                log::warn!("Unsupported image source {raw:?} for index {index}");
                self.store_placeholder(index, ctx)
            }
        }
    }

    /// Start a fetch for `index`, cancelling whatever was in flight for it.
    fn issue_fetch(&self, index: usize, url: Url) -> u64 {
        let token = self.lifecycle.child_token();
        let (generation, displaced) =
            self.registry.register(index, url.clone(), token.clone());
        if let Some(previous) = displaced {
            log::debug!(
                "Cancelling fetch {} for index {} in favour of {}",
                previous.generation,
                index,
                generation
            );
            previous.cancel();
        }

        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.completions.clone();
        let timeout = self.timeout;
        self.runtime.spawn(async move {
            let fetched = tokio::select! {
                _ = token.cancelled() => return,
                fetched = tokio::time::timeout(timeout, fetcher.fetch(&url)) => fetched,
            };
            let result = match fetched {
                Ok(Ok(bytes)) => {
                    tokio::task::spawn_blocking(move || decode_image(&bytes))
                        .await
                        .unwrap_or_else(|e| Err(CarouselError::Decode(e.to_string())))
                }
                Ok(Err(err)) => Err(err),
                Err(_) => Err(CarouselError::Timeout(timeout)),
            };
            if token.is_cancelled() {
                return;
            }
            let _ = tx.send(FetchCompletion {
                index,
                generation,
                result,
            });
        });
        generation
    }

    /// Apply a finished fetch. Stale completions (superseded or cancelled
    /// requests) are dropped.
    pub fn handle_completion(
        &self,
        completion: FetchCompletion,
        ctx: &LoadContext<'_>,
    ) -> LoadOutcome {
        if !self.lifecycle.is_live() {
            return LoadOutcome::Skipped;
        }
        // Registry lock is released before any cache work below.
        let Some(pending) = self
            .registry
            .complete(completion.index, completion.generation)
        else {
            log::trace!(
                "Dropping stale completion {} for index {}",
                completion.generation,
                completion.index
            );
            return LoadOutcome::Skipped;
        };

        match completion.result {
            Ok(image) => self.process_loaded_image(pending.index, &image, ctx),
            Err(err) => {
                log::warn!(
                    "Fetch {} for index {} failed: {}",
                    pending.url,
                    pending.index,
                    err
                );
                self.store_placeholder(pending.index, ctx)
            }
        }
    }

    /// Fit a decoded image to its tile and cache the texture, unless the
    /// index scrolled out of demand or the window cannot take uploads.
    pub fn process_loaded_image(
        &self,
        index: usize,
        image: &DynamicImage,
        ctx: &LoadContext<'_>,
    ) -> LoadOutcome {
        if !self.lifecycle.is_live() {
            return LoadOutcome::Skipped;
        }
        let Some(item) = ctx.content.item(index) else {
            return LoadOutcome::Skipped;
        };
        if !ctx.wants(index) {
            log::trace!("Index {index} left the visible window before upload");
            return LoadOutcome::Skipped;
        }
        if !self.surface.is_ready() {
            return LoadOutcome::Skipped;
        }

        let layout = ctx.layout.layout_for(&item.category);
        let fitted = fit_to_tile(image, layout.tile_width, layout.tile_height);
        match self.surface.create_texture(&fitted) {
            Ok(texture) => {
                if let Some(node) = self.cache.store(ctx.content, index, texture, false) {
                    self.surface.schedule_release(vec![node]);
                }
                LoadOutcome::Loaded
            }
            Err(err) => {
                log::warn!("Texture upload for index {index} failed: {err}");
                LoadOutcome::Skipped
            }
        }
    }

    /// Cache synthesized fallback artwork for `index`.
    pub fn store_placeholder(&self, index: usize, ctx: &LoadContext<'_>) -> LoadOutcome {
        if !self.lifecycle.is_live() || !self.surface.is_ready() {
            return LoadOutcome::Skipped;
        }
        let Some(item) = ctx.content.item(index) else {
            return LoadOutcome::Skipped;
        };
        let layout = ctx.layout.layout_for(&item.category);
        let image = placeholder_image(layout.tile_width, layout.tile_height);
        match self.surface.create_texture(&image) {
            Ok(texture) => {
                if let Some(node) = self.cache.store(ctx.content, index, texture, true) {
                    self.surface.schedule_release(vec![node]);
                }
                LoadOutcome::Placeholder
            }
            Err(err) => {
                log::warn!("Placeholder upload for index {index} failed: {err}");
                LoadOutcome::Skipped
            }
        }
    }

    /// Abort the request for `index`, if any.
    pub fn cancel(&self, index: usize) -> bool {
        match self.registry.take(index) {
            Some(pending) => {
                pending.cancel();
                true
            }
            None => false,
        }
    }

    /// Abort every in-flight request. Entries are collected under the
    /// registry lock and cancelled after it is released.
    pub fn cancel_all(&self) -> usize {
        let drained = self.registry.drain();
        let count = drained.len();
        for pending in drained {
            pending.cancel();
        }
        if count > 0 {
            log::debug!("Cancelled {count} in-flight image fetches");
        }
        count
    }

    /// Forget memoized local decodes.
    pub fn clear_local_memo(&self) {
        self.local_memo.clear();
    }

    /// Decoded local images currently memoized.
    pub fn local_memo_len(&self) -> usize {
        self.local_memo.len()
    }

    fn load_local(&self, path: &Path) -> Result<Arc<DynamicImage>> {
        if let Some(hit) = self.local_memo.get(path) {
            return Ok(Arc::clone(hit.value()));
        }
        let image = Arc::new(decode::load_local(path)?);
        if self.local_memo_capacity > 0 {
            if self.local_memo.len() >= self.local_memo_capacity {
                let victim = self
                    .local_memo
                    .iter()
                    .next()
                    .map(|entry| entry.key().clone());
                if let Some(victim) = victim {
                    self.local_memo.remove(&victim);
                }
            }
            self.local_memo
                .insert(path.to_path_buf(), Arc::clone(&image));
        }
        Ok(image)
    }
}
