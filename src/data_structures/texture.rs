//! GPU textures and texture creation utilities.
//!
//! This module provides [`Texture`], a wrapper around WGPU texture resources
//! together with the sampler configured from a [`SamplerConfig`], and the
//! bind group layout the fragment stage expects for `tex_color`.

use anyhow::*;
use image::{ImageFormat, load_from_memory_with_format};

use crate::data_structures::sampling::{SamplerConfig, TextureImage};

/// A GPU texture with a view and a sampler.
///
/// Textures are uploaded from a [`TextureImage`] so the GPU and the CPU
/// reference see the same texels in the same row order.
#[derive(Clone, Debug)]
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub config: SamplerConfig,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Create a depth texture for depth-testing during rendering.
    ///
    /// # Arguments
    ///
    /// * `size` is [width, height] of the texture in pixels
    /// * `label` is used as a debug label for the GPU resource
    pub fn create_depth_texture(
        device: &wgpu::Device,
        size: [u32; 2],
        label: &str,
    ) -> wgpu::TextureView {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[Self::DEPTH_FORMAT],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Load a texture from raw image file contents.
    ///
    /// # Arguments
    ///
    /// * `bytes` represent raw image file data (PNG, JPEG, etc.)
    /// * `label` is used as a debug name for the GPU resource
    /// * `format`  is an optional file extension hint (e.g., "png"). If None, auto-detect.
    pub fn from_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        label: &str,
        format: Option<&str>,
        config: SamplerConfig,
    ) -> Result<Self> {
        let img = match format {
            None => image::load_from_memory(bytes)?,
            Some(ext) => {
                let fmt = ImageFormat::from_extension(ext)
                    .with_context(|| format!("unknown image format `{ext}` for {label}"))?;
                load_from_memory_with_format(bytes, fmt)?
            }
        };
        Self::from_image(device, queue, &img, Some(label), config)
    }

    /// Upload a decoded image. The bottom row ends up at `v = 0`.
    ///
    /// Fails with [`crate::error::TextureError::EmptyImage`] for images
    /// without texels.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &image::DynamicImage,
        label: Option<&str>,
        config: SamplerConfig,
    ) -> Result<Self> {
        let texels = TextureImage::from_image(img)
            .with_context(|| format!("cannot upload {}", label.unwrap_or("texture")))?;
        Ok(Self::from_texels(device, queue, &texels, label, config))
    }

    /// A 1x1 texture of one colour.
    pub fn solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: [u8; 4],
        config: SamplerConfig,
    ) -> Self {
        Self::from_texels(
            device,
            queue,
            &TextureImage::solid(rgba),
            Some("solid texture"),
            config,
        )
    }

    pub fn from_texels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texels: &TextureImage,
        label: Option<&str>,
        config: SamplerConfig,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: texels.width(),
            height: texels.height(),
            depth_or_array_layers: 1,
        };
        // No sRGB decode, samples return the stored values.
        let format = wgpu::TextureFormat::Rgba8Unorm;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            texels.as_bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * texels.width()),
                rows_per_image: Some(texels.height()),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&config.descriptor(label));

        Self {
            texture,
            view,
            sampler,
            config,
        }
    }

    /// Bind this texture as `tex_color` (binding 0) with its sampler (binding 1).
    pub fn bind_group(&self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&self.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
            label: Some("tex_color_bind_group"),
        })
    }
}

pub fn tex_color_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("tex_color_bind_group_layout"),
    })
}
