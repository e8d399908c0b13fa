//! Per-frame node composition.
//!
//! Turns the visible set plus cached textures into positioned nodes and row
//! titles. Nodes are created lazily through the surface and parked back in
//! the cache; nodes that no longer match their entry are released through
//! the surface's deferred path.

use crate::cache::TextureCache;
use crate::constants::layout::FOCUS_SCALE;
use crate::content::ContentIndex;
use crate::layout::CategoryLayoutModel;
use crate::navigation::Selection;
use crate::scroll::{ScrollState, Viewport};
use crate::surface::{NodeHandle, NodeId, Rect, RenderSurface};
use crate::visibility::VisibleSet;

/// A tile to draw this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TileDraw {
    pub index: usize,
    pub node: NodeId,
    pub rect: Rect,
    pub focused: bool,
    pub placeholder: bool,
}

/// A row title band to draw this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RowTitle {
    pub category: String,
    pub rect: Rect,
}

/// Everything drawn in one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub tiles: Vec<TileDraw>,
    pub titles: Vec<RowTitle>,
}

impl Frame {
    pub fn focused(&self) -> Option<&TileDraw> {
        self.tiles.iter().find(|tile| tile.focused)
    }
}

/// Inputs for [`RenderNodeBuilder::build`].
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs<'a> {
    pub content: &'a ContentIndex,
    pub layout: &'a CategoryLayoutModel,
    pub scroll: &'a ScrollState,
    pub viewport: Viewport,
    pub visible: &'a VisibleSet,
    pub selection: &'a Selection,
    pub cache: &'a TextureCache,
    pub surface: &'a dyn RenderSurface,
}

/// Composes frames from cache contents.
#[derive(Debug, Clone, Copy)]
pub struct RenderNodeBuilder {
    focus_scale: f32,
}

impl Default for RenderNodeBuilder {
    fn default() -> Self {
        Self::new(FOCUS_SCALE)
    }
}

impl RenderNodeBuilder {
    pub fn new(focus_scale: f32) -> Self {
        Self { focus_scale }
    }

    pub fn build(&self, inputs: &FrameInputs<'_>) -> Frame {
        let mut frame = Frame::default();
        let mut releases: Vec<NodeHandle> = Vec::new();
        let vertical = inputs.scroll.vertical();

        for row in inputs.layout.rows(inputs.content) {
            if !inputs.visible.contains_category(&row.category) {
                continue;
            }
            frame.titles.push(RowTitle {
                category: row.category.clone(),
                rect: Rect::new(
                    inputs.layout.left_margin(),
                    row.title_top - vertical,
                    (inputs.viewport.width - inputs.layout.left_margin()).max(0.0),
                    inputs.layout.title_height(),
                ),
            });

            let offset = inputs.scroll.horizontal(&row.category);
            for (position, &index) in
                inputs.content.items_in(&row.category).iter().enumerate()
            {
                if !inputs.visible.contains(index) {
                    continue;
                }
                let Some(texture) = inputs.cache.texture(index) else {
                    continue;
                };
                let focused = inputs.selection.current() == Some(index);
                let mut rect = Rect::new(
                    inputs.layout.tile_x(&row.category, position) - offset,
                    row.tile_top - vertical,
                    row.layout.tile_width,
                    row.layout.tile_height,
                );
                if focused {
                    rect = rect.scaled(self.focus_scale);
                }

                let node = match inputs.cache.take_node(index) {
                    Some(mut node) if node.texture() == texture.id() => {
                        inputs.surface.update_node(&mut node, rect);
                        node
                    }
                    stale => {
                        releases.extend(stale);
                        match inputs.surface.create_node(rect, &texture) {
                            Ok(node) => node,
                            Err(err) => {
                                log::warn!("Node creation for index {index} failed: {err}");
                                continue;
                            }
                        }
                    }
                };
                let node_id = node.id();
                if let Some(rejected) = inputs.cache.put_node(index, node) {
                    releases.push(rejected);
                    continue;
                }
                frame.tiles.push(TileDraw {
                    index,
                    node: node_id,
                    rect,
                    focused,
                    placeholder: inputs.cache.is_placeholder(index),
                });
            }
        }

        inputs.surface.schedule_release(releases);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::HeadlessSurface;
    use rowcast_model::{CategoryLayout, Item};

    #[test]
    fn nodes_are_created_once_and_reused() {
        let content = ContentIndex::new(
            vec![Item::new(0, "A", "a0", ""), Item::new(0, "A", "a1", "")],
            vec!["A".into()],
        );
        let mut layout = CategoryLayoutModel::default()
            .with_left_margin(10.0)
            .with_title_height(20.0);
        layout.insert("A", CategoryLayout::new(100.0, 50.0, 60.0, 10.0).unwrap());
        let surface = HeadlessSurface::new();
        let cache = TextureCache::new(10);
        let texture = surface
            .create_texture(&image::RgbaImage::new(100, 50))
            .unwrap();
        cache.store(&content, 1, texture, false);
        let visible = VisibleSet {
            indices: [0, 1].into_iter().collect(),
            categories: ["A".to_string()].into_iter().collect(),
        };
        let scroll = ScrollState::new();
        let selection = Selection::new(Some(1));
        let inputs = FrameInputs {
            content: &content,
            layout: &layout,
            scroll: &scroll,
            viewport: Viewport::new(800.0, 600.0),
            visible: &visible,
            selection: &selection,
            cache: &cache,
            surface: &surface,
        };
        let builder = RenderNodeBuilder::new(1.0);

        let first = builder.build(&inputs);
        let second = builder.build(&inputs);

        assert_eq!(first.tiles.len(), 1);
        assert_eq!(first.tiles[0].rect, Rect::new(120.0, 20.0, 100.0, 50.0));
        assert!(first.tiles[0].focused);
        assert_eq!(first.tiles[0].node, second.tiles[0].node);
        assert_eq!(surface.stats().nodes_created, 1);
        assert_eq!(first.titles.len(), 1);
        assert_eq!(first.titles[0].rect.y, 0.0);
    }
}
