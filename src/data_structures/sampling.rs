//! Texel storage and sampling on the CPU.
//!
//! [`SamplerConfig`] is the single description of filtering and wrapping for
//! a texture. It produces the `wgpu` sampler for the GPU program and drives
//! [`TextureImage::sample`], the CPU reference of the fragment stage lookup.
//!
//! Only a single mip level is modelled.

use image::{DynamicImage, RgbaImage};

use crate::error::TextureError;

/// Filtering and wrapping of a 2D texture lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerConfig {
    /// Wrap mode along `u` (`GL_TEXTURE_WRAP_S`).
    pub address_mode_u: wgpu::AddressMode,
    /// Wrap mode along `v` (`GL_TEXTURE_WRAP_T`).
    pub address_mode_v: wgpu::AddressMode,
    pub mag_filter: wgpu::FilterMode,
    pub min_filter: wgpu::FilterMode,
    /// Only read for [`wgpu::AddressMode::ClampToBorder`].
    pub border_colour: wgpu::SamplerBorderColor,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Nearest,
            border_colour: wgpu::SamplerBorderColor::TransparentBlack,
        }
    }
}

impl SamplerConfig {
    /// Nearest filtering in both directions, handy when texels must come out
    /// unblended.
    pub fn nearest(address_mode: wgpu::AddressMode) -> Self {
        Self {
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        }
    }

    /// Apply a GL-style named parameter, e.g.
    /// `("GL_TEXTURE_WRAP_S", "GL_CLAMP_TO_EDGE")`.
    pub fn with_param(mut self, name: &str, value: &str) -> Result<Self, TextureError> {
        match name {
            "GL_TEXTURE_MIN_FILTER" => self.min_filter = parse_filter(value)?,
            "GL_TEXTURE_MAG_FILTER" => self.mag_filter = parse_filter(value)?,
            "GL_TEXTURE_WRAP_S" => self.address_mode_u = parse_wrap(value)?,
            "GL_TEXTURE_WRAP_T" => self.address_mode_v = parse_wrap(value)?,
            "GL_TEXTURE_BORDER_COLOR" => self.border_colour = parse_border(value)?,
            _ => {
                return Err(TextureError::UnknownTextureParameter(format!(
                    "{name} not found"
                )));
            }
        }
        Ok(self)
    }

    pub fn from_params<'a>(
        params: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, TextureError> {
        params
            .into_iter()
            .try_fold(Self::default(), |config, (name, value)| {
                config.with_param(name, value)
            })
    }

    /// Whether the GPU sampler needs `Features::ADDRESS_MODE_CLAMP_TO_BORDER`.
    pub fn needs_border_feature(&self) -> bool {
        self.address_mode_u == wgpu::AddressMode::ClampToBorder
            || self.address_mode_v == wgpu::AddressMode::ClampToBorder
    }

    pub fn descriptor<'a>(&self, label: Option<&'a str>) -> wgpu::SamplerDescriptor<'a> {
        wgpu::SamplerDescriptor {
            label,
            address_mode_u: self.address_mode_u,
            address_mode_v: self.address_mode_v,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: self.mag_filter,
            min_filter: self.min_filter,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            border_color: self
                .needs_border_feature()
                .then_some(self.border_colour),
            ..Default::default()
        }
    }
}

fn parse_filter(value: &str) -> Result<wgpu::FilterMode, TextureError> {
    match value {
        "GL_NEAREST" | "GL_NEAREST_MIPMAP_NEAREST" | "GL_NEAREST_MIPMAP_LINEAR" => {
            Ok(wgpu::FilterMode::Nearest)
        }
        "GL_LINEAR" | "GL_LINEAR_MIPMAP_NEAREST" | "GL_LINEAR_MIPMAP_LINEAR" => {
            Ok(wgpu::FilterMode::Linear)
        }
        _ => Err(TextureError::UnknownTextureParameter(format!(
            "{value} is not a filter mode"
        ))),
    }
}

fn parse_wrap(value: &str) -> Result<wgpu::AddressMode, TextureError> {
    match value {
        "GL_REPEAT" => Ok(wgpu::AddressMode::Repeat),
        "GL_MIRRORED_REPEAT" => Ok(wgpu::AddressMode::MirrorRepeat),
        "GL_CLAMP_TO_EDGE" => Ok(wgpu::AddressMode::ClampToEdge),
        "GL_CLAMP_TO_BORDER" => Ok(wgpu::AddressMode::ClampToBorder),
        _ => Err(TextureError::UnknownTextureParameter(format!(
            "{value} is not a wrap mode"
        ))),
    }
}

fn parse_border(value: &str) -> Result<wgpu::SamplerBorderColor, TextureError> {
    let channels: Vec<&str> = value.split(',').map(str::trim).collect();
    match channels.as_slice() {
        ["0", "0", "0", "0"] => Ok(wgpu::SamplerBorderColor::TransparentBlack),
        ["0", "0", "0", "1"] => Ok(wgpu::SamplerBorderColor::OpaqueBlack),
        ["1", "1", "1", "1"] => Ok(wgpu::SamplerBorderColor::OpaqueWhite),
        _ => Err(TextureError::UnknownTextureParameter(format!(
            "{value} is not a supported border colour"
        ))),
    }
}

fn border_rgba(colour: wgpu::SamplerBorderColor) -> [f32; 4] {
    match colour {
        wgpu::SamplerBorderColor::OpaqueBlack => [0.0, 0.0, 0.0, 1.0],
        wgpu::SamplerBorderColor::OpaqueWhite => [1.0, 1.0, 1.0, 1.0],
        _ => [0.0; 4],
    }
}

/// Integer texel index and blend fraction of a texel-space coordinate.
///
/// The cast saturates, infinities land on `i64::MIN`/`i64::MAX` and NaN on
/// texel 0. The fraction is 0 whenever it would not be finite.
fn split_texel(coord: f32) -> (i64, f32) {
    let floor = coord.floor();
    let fraction = coord - floor;
    let fraction = if fraction.is_finite() { fraction } else { 0.0 };
    (floor as i64, fraction)
}

/// Map an integer texel index onto `0..size`, or `None` for the border.
fn wrap_index(index: i64, size: u32, mode: wgpu::AddressMode) -> Option<u32> {
    let size = i64::from(size);
    let wrapped = match mode {
        wgpu::AddressMode::Repeat => index.rem_euclid(size),
        wgpu::AddressMode::MirrorRepeat => {
            let m = index.rem_euclid(2 * size);
            if m < size { m } else { 2 * size - 1 - m }
        }
        wgpu::AddressMode::ClampToBorder => {
            if index < 0 || index >= size {
                return None;
            }
            index
        }
        _ => index.clamp(0, size - 1),
    };
    Some(wrapped as u32)
}

/// RGBA8 texels with row 0 at `v = 0`. Never empty.
///
/// Images are stored bottom row first, so `v = 0` addresses the bottom of
/// the picture the way the texture coordinates of the meshes expect.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    texels: RgbaImage,
}

impl TextureImage {
    pub fn from_image(img: &DynamicImage) -> Result<Self, TextureError> {
        Self::from_texels(img.flipv().to_rgba8())
    }

    /// Wrap texels that are already in bottom-row-first order.
    ///
    /// An image without texels is rejected, every lookup needs at least one.
    pub fn from_texels(texels: RgbaImage) -> Result<Self, TextureError> {
        let (width, height) = texels.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::EmptyImage { width, height });
        }
        Ok(Self { texels })
    }

    /// A 1x1 texture of a single colour.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            texels: RgbaImage::from_pixel(1, 1, image::Rgba(rgba)),
        }
    }

    pub fn width(&self) -> u32 {
        self.texels.width()
    }

    pub fn height(&self) -> u32 {
        self.texels.height()
    }

    /// Raw bytes in upload order.
    pub fn as_bytes(&self) -> &[u8] {
        self.texels.as_raw()
    }

    pub fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        self.texels.get_pixel(x, y).0
    }

    fn fetch(&self, x: i64, y: i64, config: &SamplerConfig) -> [f32; 4] {
        let x = wrap_index(x, self.width(), config.address_mode_u);
        let y = wrap_index(y, self.height(), config.address_mode_v);
        match (x, y) {
            (Some(x), Some(y)) => self.texel(x, y).map(|c| f32::from(c) / 255.0),
            _ => border_rgba(config.border_colour),
        }
    }

    /// Sample at `uv` with the magnification filter.
    pub fn sample(&self, uv: [f32; 2], config: &SamplerConfig) -> [f32; 4] {
        self.sample_lod(uv, 0.0, config)
    }

    /// Sample at `uv`, picking the minification filter for `lod > 0`.
    pub fn sample_lod(&self, uv: [f32; 2], lod: f32, config: &SamplerConfig) -> [f32; 4] {
        let filter = if lod > 0.0 {
            config.min_filter
        } else {
            config.mag_filter
        };
        let u = uv[0] * self.width() as f32;
        let v = uv[1] * self.height() as f32;
        match filter {
            wgpu::FilterMode::Nearest => {
                self.fetch(split_texel(u).0, split_texel(v).0, config)
            }
            _ => {
                let (x0, fx) = split_texel(u - 0.5);
                let (y0, fy) = split_texel(v - 0.5);
                let (x1, y1) = (x0.saturating_add(1), y0.saturating_add(1));
                let t00 = self.fetch(x0, y0, config);
                let t10 = self.fetch(x1, y0, config);
                let t01 = self.fetch(x0, y1, config);
                let t11 = self.fetch(x1, y1, config);
                let mut out = [0.0; 4];
                for (c, value) in out.iter_mut().enumerate() {
                    let bottom = t00[c] + (t10[c] - t00[c]) * fx;
                    let top = t01[c] + (t11[c] - t01[c]) * fx;
                    *value = bottom + (top - bottom) * fy;
                }
                out
            }
        }
    }
}
