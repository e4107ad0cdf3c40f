//! Fragment stage: one texture lookup per covered pixel.

use crate::data_structures::sampling::{SamplerConfig, TextureImage};

/// One fragment stage invocation.
pub trait FragmentStage {
    fn exec(&self, tex_coord: [f32; 2]) -> [f32; 4];
}

/// The texture bound to `tex_color` together with its sampler.
#[derive(Debug, Clone, Copy)]
pub struct TexturedFragment<'a> {
    pub tex_color: &'a TextureImage,
    pub sampler: &'a SamplerConfig,
}

impl<'a> TexturedFragment<'a> {
    pub fn new(tex_color: &'a TextureImage, sampler: &'a SamplerConfig) -> Self {
        Self { tex_color, sampler }
    }
}

impl FragmentStage for TexturedFragment<'_> {
    fn exec(&self, tex_coord: [f32; 2]) -> [f32; 4] {
        self.tex_color.sample(tex_coord, self.sampler)
    }
}
