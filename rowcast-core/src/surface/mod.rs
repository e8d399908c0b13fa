//! Rendering surface boundary.
//!
//! The carousel never touches GPU or scene-graph objects directly. It asks a
//! [`RenderSurface`] for textures and nodes and hands nodes back for release.
//! The two handle types encode who owns what:
//!
//! * [`TextureRef`] is a non-owning reference. The surface owns the pixel
//!   memory and decides when it goes away; the cache only remembers which
//!   texture belongs to which index.
//! * [`NodeHandle`] is owned. Exactly one holder exists at a time (it is
//!   neither `Clone` nor `Copy`), and it can only be disposed of by passing
//!   it back through [`RenderSurface::schedule_release`], which defers the
//!   actual deletion to a point where no frame is being rendered.

pub mod headless;

use std::fmt;

use image::RgbaImage;

use crate::error::Result;

pub use headless::HeadlessSurface;

/// Identifier of a texture owned by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// Identifier of a scene-graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Non-owning reference to a surface texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRef {
    id: TextureId,
    width: u32,
    height: u32,
}

impl TextureRef {
    /// Surfaces mint references when they create a texture.
    pub fn new(id: TextureId, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Owned scene-graph node wrapping a texture.
#[derive(Debug, PartialEq)]
#[must_use = "nodes must be handed to RenderSurface::schedule_release"]
pub struct NodeHandle {
    id: NodeId,
    texture: TextureId,
    rect: Rect,
}

impl NodeHandle {
    pub fn new(id: NodeId, texture: TextureId, rect: Rect) -> Self {
        Self { id, texture, rect }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Move the node; only the surface should call this.
    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }
}

/// Axis-aligned rectangle in widget coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Scale around the center.
    pub fn scaled(&self, factor: f32) -> Self {
        let width = self.width * factor;
        let height = self.height * factor;
        Self {
            x: self.x - (width - self.width) / 2.0,
            y: self.y - (height - self.height) / 2.0,
            width,
            height,
        }
    }
}

/// What the carousel needs from the native rendering integration.
///
/// Implementations must be callable from the main thread while the render
/// thread is consuming previously created nodes.
pub trait RenderSurface: Send + Sync + fmt::Debug {
    /// Whether the window is exposed and can accept texture uploads.
    fn is_ready(&self) -> bool;

    /// Upload a decoded image. The returned reference stays valid until the
    /// surface itself drops the texture.
    fn create_texture(&self, image: &RgbaImage) -> Result<TextureRef>;

    /// Wrap a texture in a drawable node.
    fn create_node(&self, rect: Rect, texture: &TextureRef) -> Result<NodeHandle>;

    /// Reposition an existing node for the next frame.
    fn update_node(&self, node: &mut NodeHandle, rect: Rect);

    /// Queue nodes for deletion at the next point where the renderer is not
    /// using them. Must not delete synchronously.
    fn schedule_release(&self, nodes: Vec<NodeHandle>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_rect_grows_around_center() {
        let rect = Rect::new(100.0, 50.0, 200.0, 100.0).scaled(1.1);

        assert!((rect.width - 220.0).abs() < 1e-3);
        assert!((rect.x - 90.0).abs() < 1e-3);
        assert!((rect.y - 45.0).abs() < 1e-3);
    }
}
