//! In-memory surface used by the player binary and tests.
//!
//! Textures and nodes are just counters. Releases are queued and only
//! applied when [`HeadlessSurface::sync`] runs, mirroring a renderer that
//! deletes nodes before its next scene-graph sync.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use image::RgbaImage;
use parking_lot::Mutex;

use super::{NodeHandle, NodeId, Rect, RenderSurface, TextureId, TextureRef};
use crate::error::{CarouselError, Result};

/// Counters exposed for tests and diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    pub textures_created: usize,
    pub nodes_created: usize,
    pub nodes_live: usize,
    pub releases_pending: usize,
    pub nodes_released: usize,
}

#[derive(Debug, Default)]
struct Inner {
    textures_created: usize,
    live_nodes: HashSet<NodeId>,
    nodes_created: usize,
    pending_release: Vec<NodeHandle>,
    released: Vec<NodeId>,
}

/// Surface that records what the carousel asked of it.
#[derive(Debug)]
pub struct HeadlessSurface {
    ready: AtomicBool,
    fail_textures: AtomicBool,
    next_id: AtomicU64,
    inner: Mutex<Inner>,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self {
            ready: AtomicBool::new(true),
            fail_textures: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Simulate window exposure changes.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }

    /// Make every texture upload fail.
    pub fn set_fail_textures(&self, fail: bool) {
        self.fail_textures.store(fail, Ordering::Release);
    }

    /// Apply queued releases, as a renderer would before syncing.
    pub fn sync(&self) -> usize {
        let mut inner = self.inner.lock();
        let pending = std::mem::take(&mut inner.pending_release);
        let count = pending.len();
        for node in pending {
            inner.live_nodes.remove(&node.id());
            inner.released.push(node.id());
        }
        count
    }

    /// Whether `id` has been deleted by a sync.
    pub fn was_released(&self, id: NodeId) -> bool {
        self.inner.lock().released.contains(&id)
    }

    pub fn stats(&self) -> SurfaceStats {
        let inner = self.inner.lock();
        SurfaceStats {
            textures_created: inner.textures_created,
            nodes_created: inner.nodes_created,
            nodes_live: inner.live_nodes.len(),
            releases_pending: inner.pending_release.len(),
            nodes_released: inner.released.len(),
        }
    }

    fn next(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl RenderSurface for HeadlessSurface {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn create_texture(&self, image: &RgbaImage) -> Result<TextureRef> {
        if self.fail_textures.load(Ordering::Acquire) {
            return Err(CarouselError::Surface(
                "texture upload disabled".to_string(),
            ));
        }
        let id = TextureId(self.next());
        self.inner.lock().textures_created += 1;
        log::trace!(
            "Headless texture {:?} {}x{}",
            id,
            image.width(),
            image.height()
        );
        Ok(TextureRef::new(id, image.width(), image.height()))
    }

    fn create_node(&self, rect: Rect, texture: &TextureRef) -> Result<NodeHandle> {
        let id = NodeId(self.next());
        let mut inner = self.inner.lock();
        inner.nodes_created += 1;
        inner.live_nodes.insert(id);
        Ok(NodeHandle::new(id, texture.id(), rect))
    }

    fn update_node(&self, node: &mut NodeHandle, rect: Rect) {
        node.set_rect(rect);
    }

    fn schedule_release(&self, nodes: Vec<NodeHandle>) {
        if nodes.is_empty() {
            return;
        }
        self.inner.lock().pending_release.extend(nodes);
    }
}
