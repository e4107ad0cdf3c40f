//! Host configuration.
//!
//! Everything a headless [`crate::context::Context`] and its render targets
//! need to know up front. Construct with `Settings::default()` and override
//! the fields you care about.

use crate::data_structures::sampling::SamplerConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Width of offscreen render targets in pixels.
    pub width: u32,
    /// Height of offscreen render targets in pixels.
    pub height: u32,
    pub clear_colour: wgpu::Color,
    /// Colour target format. Keep it linear if rendered pixels are compared
    /// against [`crate::stage::FragmentStage`] output.
    pub colour_format: wgpu::TextureFormat,
    /// `None` disables the depth test.
    pub depth_format: Option<wgpu::TextureFormat>,
    pub power_preference: wgpu::PowerPreference,
    /// Sampler used for textures created without an explicit configuration.
    pub sampler: SamplerConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            clear_colour: wgpu::Color {
                r: 0.2,
                g: 0.3,
                b: 0.3,
                a: 1.0,
            },
            colour_format: wgpu::TextureFormat::Rgba8Unorm,
            depth_format: Some(crate::data_structures::texture::Texture::DEPTH_FORMAT),
            power_preference: wgpu::PowerPreference::default(),
            sampler: SamplerConfig::default(),
        }
    }
}

impl Settings {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_clear_colour(mut self, clear_colour: wgpu::Color) -> Self {
        self.clear_colour = clear_colour;
        self
    }
}
