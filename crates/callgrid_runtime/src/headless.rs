//! Renderer that keeps the state texture in memory and never presents it.

use callgrid_core::{FrameUniforms, Renderer, TextureBuffer};

pub struct HeadlessRenderer {
    texture: TextureBuffer,
    draws: u64,
    last: Option<FrameUniforms>,
}

impl HeadlessRenderer {
    pub fn new(max_tiles: usize) -> Self {
        Self {
            texture: TextureBuffer::with_max_tiles(max_tiles),
            draws: 0,
            last: None,
        }
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn texture(&self) -> &TextureBuffer {
        &self.texture
    }

    pub fn last_uniforms(&self) -> Option<&FrameUniforms> {
        self.last.as_ref()
    }
}

impl Renderer for HeadlessRenderer {
    fn texture_mut(&mut self) -> &mut TextureBuffer {
        &mut self.texture
    }

    fn draw(&mut self, uniforms: &FrameUniforms) {
        // Stand-in for the texture upload.
        let bytes = self.texture.as_bytes().len();
        tracing::trace!(bytes, time_ms = uniforms.time_ms, "frame submitted");
        self.draws += 1;
        self.last = Some(*uniforms);
    }
}
