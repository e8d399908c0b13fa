//! Texture cache keyed by item index.
//!
//! Entries pair a non-owning [`TextureRef`] with the [`NodeHandle`] the
//! frame builder created for it. The cache never releases texture memory;
//! evicting an entry only hands its node back to the caller so the release
//! can be deferred through the rendering surface.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;

use crate::constants::cache::OFFSCREEN_TILE_SLACK;
use crate::content::ContentIndex;
use crate::layout::CategoryLayoutModel;
use crate::scroll::{ScrollState, Viewport};
use crate::surface::{NodeHandle, TextureRef};
use crate::visibility::VisibleSet;

/// One cached texture.
#[derive(Debug)]
pub struct CacheEntry {
    pub texture: TextureRef,
    /// Whether this is synthesized fallback artwork.
    pub placeholder: bool,
    node: Option<NodeHandle>,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<usize, CacheEntry>,
    usage: VecDeque<usize>,
}

impl CacheInner {
    fn touch(&mut self, index: usize) {
        self.usage.retain(|&queued| queued != index);
        self.usage.push_back(index);
    }

    fn remove(&mut self, index: usize) -> Option<CacheEntry> {
        let entry = self.entries.remove(&index)?;
        self.usage.retain(|&queued| queued != index);
        Some(entry)
    }
}

/// Why an entry was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    /// The entry's row left the visible window.
    CategoryHidden,
    /// The cache was over budget and the tile sat well outside the viewport.
    OffscreenOverBudget,
}

/// Everything an eviction pass needs to judge distance from the viewport.
#[derive(Debug, Clone, Copy)]
pub struct EvictionContext<'a> {
    pub content: &'a ContentIndex,
    pub layout: &'a CategoryLayoutModel,
    pub scroll: &'a ScrollState,
    pub viewport: Viewport,
    pub visible: &'a VisibleSet,
    /// Focused index; never dropped by the over-budget pass.
    pub protected: Option<usize>,
}

/// Outcome of an eviction pass.
#[derive(Debug, Default)]
pub struct EvictionReport {
    pub evicted: Vec<(usize, EvictionReason)>,
    /// Nodes of evicted entries, to be released through the surface.
    pub nodes: Vec<NodeHandle>,
    pub size_before: usize,
    pub size_after: usize,
}

impl EvictionReport {
    pub fn removed(&self, reason: EvictionReason) -> usize {
        self.evicted.iter().filter(|(_, r)| *r == reason).count()
    }
}

/// Point-in-time counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub textures: usize,
    pub nodes: usize,
    pub placeholders: usize,
}

/// Bounded index → texture map with a usage queue.
#[derive(Debug)]
pub struct TextureCache {
    inner: Mutex<CacheInner>,
    threshold: usize,
}

impl TextureCache {
    /// `threshold` is the size above which eviction passes should run.
    pub fn new(threshold: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            threshold,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn over_threshold(&self) -> bool {
        self.len() > self.threshold
    }

    pub fn has(&self, index: usize) -> bool {
        self.inner.lock().entries.contains_key(&index)
    }

    pub fn texture(&self, index: usize) -> Option<TextureRef> {
        self.inner
            .lock()
            .entries
            .get(&index)
            .map(|entry| entry.texture.clone())
    }

    pub fn is_placeholder(&self, index: usize) -> bool {
        self.inner
            .lock()
            .entries
            .get(&index)
            .is_some_and(|entry| entry.placeholder)
    }

    /// Insert or replace the texture for `index` and mark it most recently
    /// used.
    ///
    /// Indices with no matching item are ignored. When an existing entry is
    /// replaced its node is returned so the caller can defer its release.
    pub fn store(
        &self,
        content: &ContentIndex,
        index: usize,
        texture: TextureRef,
        placeholder: bool,
    ) -> Option<NodeHandle> {
        if content.item(index).is_none() {
            log::debug!("Ignoring texture for unknown index {index}");
            return None;
        }
        let mut inner = self.inner.lock();
        inner.touch(index);
        inner
            .entries
            .insert(
                index,
                CacheEntry {
                    texture,
                    placeholder,
                    node: None,
                },
            )
            .and_then(|previous| previous.node)
    }

    /// Borrow the node out of an entry for the frame builder.
    pub fn take_node(&self, index: usize) -> Option<NodeHandle> {
        self.inner
            .lock()
            .entries
            .get_mut(&index)
            .and_then(|entry| entry.node.take())
    }

    /// Return a node to its entry. If the entry is gone (evicted or
    /// replaced meanwhile, or its texture changed) the node is handed back
    /// for release.
    pub fn put_node(&self, index: usize, node: NodeHandle) -> Option<NodeHandle> {
        let mut inner = self.inner.lock();
        match inner.entries.get_mut(&index) {
            Some(entry)
                if entry.node.is_none() && entry.texture.id() == node.texture() =>
            {
                entry.node = Some(node);
                None
            }
            _ => Some(node),
        }
    }

    /// Indices oldest-first.
    pub fn usage_order(&self) -> Vec<usize> {
        self.inner.lock().usage.iter().copied().collect()
    }

    pub fn indices(&self) -> Vec<usize> {
        let mut out: Vec<usize> =
            self.inner.lock().entries.keys().copied().collect();
        out.sort_unstable();
        out
    }

    /// Two-pass eviction.
    ///
    /// Pass one drops every entry whose category is not visible. Pass two
    /// runs only while the cache is still above its threshold and drops
    /// entries that are not visible themselves and whose tile sits more
    /// than two tile widths outside the viewport.
    pub fn evict_non_visible(&self, ctx: &EvictionContext<'_>) -> EvictionReport {
        let mut inner = self.inner.lock();
        let mut report = EvictionReport {
            size_before: inner.entries.len(),
            ..EvictionReport::default()
        };

        let order: Vec<usize> = inner.usage.iter().copied().collect();
        for &index in &order {
            let hidden = match ctx.content.category_of(index) {
                Some(category) => !ctx.visible.contains_category(category),
                None => true,
            };
            if hidden {
                report.evicted.push((index, EvictionReason::CategoryHidden));
            }
        }
        for &(index, _) in &report.evicted {
            if let Some(node) = inner.remove(index).and_then(|e| e.node) {
                report.nodes.push(node);
            }
        }

        if inner.entries.len() > self.threshold {
            let mut offscreen = Vec::new();
            for &index in &order {
                if !inner.entries.contains_key(&index)
                    || ctx.visible.contains(index)
                    || ctx.protected == Some(index)
                {
                    continue;
                }
                if is_far_offscreen(ctx, index) {
                    offscreen.push(index);
                }
            }
            for index in offscreen {
                if let Some(entry) = inner.remove(index) {
                    report
                        .evicted
                        .push((index, EvictionReason::OffscreenOverBudget));
                    if let Some(node) = entry.node {
                        report.nodes.push(node);
                    }
                }
            }
        }

        report.size_after = inner.entries.len();
        if !report.evicted.is_empty() {
            log::debug!(
                "Evicted {} textures ({} hidden, {} offscreen), {} -> {}",
                report.evicted.len(),
                report.removed(EvictionReason::CategoryHidden),
                report.removed(EvictionReason::OffscreenOverBudget),
                report.size_before,
                report.size_after
            );
        }
        report
    }

    /// Drop every entry and return all nodes for deferred release.
    pub fn clear(&self) -> Vec<NodeHandle> {
        let mut inner = self.inner.lock();
        inner.usage.clear();
        inner
            .entries
            .drain()
            .filter_map(|(_, entry)| entry.node)
            .collect()
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            textures: inner.entries.len(),
            nodes: inner
                .entries
                .values()
                .filter(|entry| entry.node.is_some())
                .count(),
            placeholders: inner
                .entries
                .values()
                .filter(|entry| entry.placeholder)
                .count(),
        }
    }
}

/// Whether `index`'s tile is more than the slack distance outside the
/// viewport horizontally.
fn is_far_offscreen(ctx: &EvictionContext<'_>, index: usize) -> bool {
    let (Some(category), Some(position)) = (
        ctx.content.category_of(index),
        ctx.content.position_in_category(index),
    ) else {
        return true;
    };
    let tile_w = ctx.layout.layout_for(category).tile_width;
    let x = ctx.layout.tile_x(category, position) - ctx.scroll.horizontal(category);
    let slack = tile_w * OFFSCREEN_TILE_SLACK;
    x < -slack || x > ctx.viewport.width + slack
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{NodeId, Rect, TextureId};
    use rowcast_model::{CategoryLayout, Item};

    fn content(a: usize, b: usize) -> ContentIndex {
        let mut items = Vec::new();
        for n in 0..a {
            items.push(Item::new(0, "A", format!("a{n}"), ""));
        }
        for n in 0..b {
            items.push(Item::new(0, "B", format!("b{n}"), ""));
        }
        ContentIndex::new(items, vec!["A".into(), "B".into()])
    }

    fn layout() -> CategoryLayoutModel {
        let mut layout = CategoryLayoutModel::default().with_left_margin(0.0);
        layout.insert("A", CategoryLayout::new(100.0, 100.0, 110.0, 0.0).unwrap());
        layout.insert("B", CategoryLayout::new(100.0, 100.0, 110.0, 0.0).unwrap());
        layout
    }

    fn tex(id: u64) -> TextureRef {
        TextureRef::new(TextureId(id), 100, 100)
    }

    fn visible(indices: &[usize], categories: &[&str]) -> VisibleSet {
        VisibleSet {
            indices: indices.iter().copied().collect(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn store_requeues_index_at_back() {
        let content = content(3, 0);
        let cache = TextureCache::new(10);
        cache.store(&content, 0, tex(1), false);
        cache.store(&content, 1, tex(2), false);
        cache.store(&content, 0, tex(3), false);

        assert_eq!(cache.usage_order(), vec![1, 0]);
        assert_eq!(cache.texture(0).map(|t| t.id()), Some(TextureId(3)));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn store_for_unknown_index_is_a_noop() {
        let content = content(2, 0);
        let cache = TextureCache::new(10);

        assert!(cache.store(&content, 9, tex(1), false).is_none());
        assert!(!cache.has(9));
        assert!(cache.is_empty());
    }

    #[test]
    fn replacing_an_entry_hands_back_its_node() {
        let content = content(1, 0);
        let cache = TextureCache::new(10);
        cache.store(&content, 0, tex(1), true);
        let node = NodeHandle::new(NodeId(7), TextureId(1), Rect::default());
        assert!(cache.put_node(0, node).is_none());

        let displaced = cache.store(&content, 0, tex(2), false);

        assert_eq!(displaced.map(|n| n.id()), Some(NodeId(7)));
        assert!(!cache.is_placeholder(0));
    }

    #[test]
    fn node_for_stale_texture_is_rejected() {
        let content = content(1, 0);
        let cache = TextureCache::new(10);
        cache.store(&content, 0, tex(2), false);

        let stale = NodeHandle::new(NodeId(3), TextureId(1), Rect::default());
        assert!(cache.put_node(0, stale).is_some());
        assert_eq!(cache.stats().nodes, 0);
    }

    #[test]
    fn first_pass_drops_hidden_categories() {
        let content = content(5, 25);
        let layout = layout();
        let scroll = ScrollState::new();
        let cache = TextureCache::new(30);
        for index in 5..30 {
            cache.store(&content, index, tex(index as u64), false);
        }
        let visible = visible(&[0, 1], &["A"]);

        let report = cache.evict_non_visible(&EvictionContext {
            content: &content,
            layout: &layout,
            scroll: &scroll,
            viewport: Viewport::new(400.0, 300.0),
            visible: &visible,
            protected: None,
        });

        assert_eq!(report.removed(EvictionReason::CategoryHidden), 25);
        assert_eq!(report.size_after, 0);
        assert!(cache.is_empty());
        assert!(cache.usage_order().is_empty());
    }

    #[test]
    fn second_pass_only_runs_over_budget_and_spares_focus() {
        let content = content(40, 0);
        let layout = layout();
        let scroll = ScrollState::new();
        let visible = visible(&[0, 1, 2, 3], &["A"]);
        let ctx = EvictionContext {
            content: &content,
            layout: &layout,
            scroll: &scroll,
            viewport: Viewport::new(400.0, 300.0),
            visible: &visible,
            protected: Some(30),
        };

        let roomy = TextureCache::new(100);
        for index in 0..40 {
            roomy.store(&content, index, tex(index as u64), false);
        }
        assert!(roomy.evict_non_visible(&ctx).evicted.is_empty());

        let tight = TextureCache::new(10);
        for index in 0..40 {
            tight.store(&content, index, tex(index as u64), false);
        }
        let report = tight.evict_non_visible(&ctx);

        // Tiles at x <= 400 + 200 stay: indices 0..=6, plus the focus.
        let mut expected: Vec<usize> = (0..=6).collect();
        expected.push(30);
        assert_eq!(tight.indices(), expected);
        assert_eq!(
            report.removed(EvictionReason::OffscreenOverBudget),
            40 - expected.len()
        );
    }

    #[test]
    fn clear_returns_every_node() {
        let content = content(3, 0);
        let cache = TextureCache::new(10);
        for index in 0..3 {
            cache.store(&content, index, tex(index as u64), false);
            let node = NodeHandle::new(
                NodeId(index as u64 + 100),
                TextureId(index as u64),
                Rect::default(),
            );
            assert!(cache.put_node(index, node).is_none());
        }

        let nodes = cache.clear();

        assert_eq!(nodes.len(), 3);
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
