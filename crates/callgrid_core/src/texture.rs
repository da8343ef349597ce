//! State texture shared with the renderer
//!
//! One RGBA texel per tile: `[start_state, end_state, unused, start_tick]`.
//! The renderer owns the buffer and uploads it each frame; the core writes
//! texels and dictates the texture dimensions.

use bytemuck::{Pod, Zeroable};

/// `start_tick` value marking a tile with no running animation. Cyclic
/// ticks never reach it.
pub const INACTIVE_TICK: u8 = 255;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Texel {
    pub start_state: u8,
    pub end_state: u8,
    pub unused: u8,
    pub start_tick: u8,
}

impl Texel {
    #[inline]
    pub fn is_animating(&self) -> bool {
        self.start_tick != INACTIVE_TICK
    }
}

/// Texel storage sized to the grid (`columns x rows`).
pub struct TextureBuffer {
    width: u32,
    height: u32,
    texels: Vec<Texel>,
}

impl TextureBuffer {
    /// Empty texture with storage reserved for the worst-case grid holding
    /// `max_tiles` tiles.
    pub fn with_max_tiles(max_tiles: usize) -> Self {
        Self {
            width: 0,
            height: 0,
            texels: Vec::with_capacity(worst_case_texels(max_tiles)),
        }
    }

    /// Resize to `width x height` texels. Existing texels keep their index;
    /// new ones start zeroed, shrinking drops the tail.
    pub fn update_texture_dimensions(&mut self, width: u32, height: u32) {
        let len = width as usize * height as usize;
        self.texels.resize(len, Texel::default());
        self.width = width;
        self.height = height;
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.texels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texels.is_empty()
    }

    pub fn texels(&self) -> &[Texel] {
        &self.texels
    }

    pub fn texels_mut(&mut self) -> &mut [Texel] {
        &mut self.texels
    }

    /// Raw RGBA bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    /// Tiles with an animation currently running.
    pub fn animating_count(&self) -> usize {
        self.texels.iter().filter(|t| t.is_animating()).count()
    }
}

/// Largest texel count a grid for `max_tiles` tiles can need.
pub fn worst_case_texels(max_tiles: usize) -> usize {
    if max_tiles < 100 {
        500
    } else {
        (max_tiles - 1) * 2
    }
}
