//! Explicit draw state and offscreen rendering.
//!
//! A draw never depends on what was bound before it. Everything the two
//! stages read (program, transform uniforms, texture, vertex and index
//! buffers) travels in one immutable [`DrawContext`] that [`draw`] binds in
//! full each time.
//!
//! # Key types
//!
//! - [`DrawContext<'a>`] borrows the state of one draw call
//! - [`RenderTarget`] holds offscreen colour and depth attachments
//! - [`render_to_image`] clears a target, draws and reads the pixels back

use std::{iter, time::Duration};

use anyhow::Context as _;

use crate::{
    context::Context,
    data_structures::{texture::Texture, vertex::GpuMesh},
    pipelines::textured::ShaderProgram,
};

/// Everything one draw call reads.
#[derive(Debug, Clone, Copy)]
pub struct DrawContext<'a> {
    pub program: &'a ShaderProgram,
    pub transform: &'a wgpu::BindGroup,
    pub texture: &'a wgpu::BindGroup,
    pub mesh: &'a GpuMesh,
}

/// Record one draw into `render_pass`.
pub fn draw(ctx: &DrawContext<'_>, render_pass: &mut wgpu::RenderPass<'_>) {
    if ctx.mesh.amount == 0 {
        log::warn!("you attempted to draw a mesh without indices");
        return;
    }
    render_pass.set_pipeline(&ctx.program.pipeline);
    render_pass.set_bind_group(0, ctx.texture, &[]);
    render_pass.set_bind_group(1, ctx.transform, &[]);
    render_pass.set_vertex_buffer(0, ctx.mesh.vertex.slice(..));
    render_pass.set_index_buffer(ctx.mesh.index.slice(..), wgpu::IndexFormat::Uint32);
    render_pass.draw_indexed(0..ctx.mesh.amount, 0, 0..1);
}

/// Offscreen colour (and optional depth) attachment.
#[derive(Debug)]
pub struct RenderTarget {
    pub colour: wgpu::Texture,
    pub depth: Option<wgpu::TextureView>,
    pub width: u32,
    pub height: u32,
}

impl RenderTarget {
    pub fn new(ctx: &Context) -> Self {
        let (width, height) = (ctx.settings.width.max(1), ctx.settings.height.max(1));
        let colour = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Colour Target"),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: ctx.settings.colour_format,
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth = ctx
            .settings
            .depth_format
            .map(|_| Texture::create_depth_texture(&ctx.device, [width, height], "depth_texture"));
        Self {
            colour,
            depth,
            width,
            height,
        }
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

/// Clear `target`, record `draws` in order and read the colour attachment back.
///
/// Rows come back top row first, as the GPU stores them.
pub async fn render_to_image(
    ctx: &Context,
    target: &RenderTarget,
    draws: &[DrawContext<'_>],
) -> anyhow::Result<image::RgbaImage> {
    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
    {
        let view = target
            .colour
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(ctx.settings.clear_colour),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: target.depth.as_ref().map(|depth| {
                wgpu::RenderPassDepthStencilAttachment {
                    view: depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        });
        for d in draws {
            draw(d, &mut render_pass);
        }
    }

    // Buffer rows must be aligned to 256 bytes, the padding is cut off below.
    let bytes_per_pixel = 4;
    let unpadded_row = bytes_per_pixel * target.width;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let padded_row = unpadded_row.div_ceil(align) * align;
    let output_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        size: (padded_row * target.height) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        label: Some("Readback Buffer"),
        mapped_at_creation: false,
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture: &target.colour,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &output_buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_row),
                rows_per_image: Some(target.height),
            },
        },
        extent(target.width, target.height),
    );
    ctx.queue.submit(iter::once(encoder.finish()));

    // NOTE: the mapping has to be requested before polling, otherwise the
    // receive below never resolves.
    let buffer_slice = output_buffer.slice(..);
    let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        // The receiver only goes away if the caller dropped the future.
        let _ = tx.send(result);
    });
    ctx.device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(Duration::from_secs(3)),
        })
        .context("device poll failed while reading back the render target")?;
    rx.receive()
        .await
        .context("readback channel closed")?
        .context("failed to map the readback buffer")?;

    let pixels = {
        let data = buffer_slice.get_mapped_range();
        data.chunks(padded_row as usize)
            .flat_map(|row| &row[..unpadded_row as usize])
            .copied()
            .collect::<Vec<u8>>()
    };
    output_buffer.unmap();

    image::RgbaImage::from_raw(target.width, target.height, pixels)
        .context("readback size does not match the render target")
}

/// Blocking variant of [`render_to_image`].
pub fn render_to_image_blocking(
    ctx: &Context,
    target: &RenderTarget,
    draws: &[DrawContext<'_>],
) -> anyhow::Result<image::RgbaImage> {
    futures::executor::block_on(render_to_image(ctx, target, draws))
}
