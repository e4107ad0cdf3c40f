#![allow(dead_code)]

use flow_shade::{
    data_structures::sampling::TextureImage,
    stage::{VertexInput, VertexOutput},
};

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `n` by `n` texels alternating white and black, white at (0, 0).
pub(crate) fn checkerboard(n: u32) -> TextureImage {
    TextureImage::from_texels(image::RgbaImage::from_fn(n, n, |x, y| {
        if (x + y) % 2 == 0 {
            image::Rgba([255, 255, 255, 255])
        } else {
            image::Rgba([0, 0, 0, 255])
        }
    }))
    .unwrap()
}

/// Texels from rows given bottom row first.
pub(crate) fn texels(rows: &[&[[u8; 4]]]) -> TextureImage {
    let height = rows.len() as u32;
    let width = rows[0].len() as u32;
    TextureImage::from_texels(image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba(rows[y as usize][x as usize])
    }))
    .unwrap()
}

pub(crate) fn unorm(rgba: [u8; 4]) -> [f32; 4] {
    rgba.map(|c| f32::from(c) / 255.0)
}

pub(crate) fn assert_close(actual: [f32; 4], expected: [f32; 4]) {
    for (a, e) in actual.iter().zip(expected) {
        assert!(
            (a - e).abs() < 1e-6,
            "expected {expected:?}, got {actual:?}"
        );
    }
}

pub(crate) fn input(position: [f32; 3], texture_coordinate: [f32; 2]) -> VertexInput {
    VertexInput {
        position,
        texture_coordinate,
    }
}

pub(crate) fn clip_bits(out: &VertexOutput) -> [u32; 4] {
    let c = out.clip_position;
    [c.x, c.y, c.z, c.w].map(f32::to_bits)
}

#[cfg(feature = "integration-tests")]
pub(crate) mod gpu {
    use flow_shade::{context::Context, settings::Settings};

    /// A headless context, or `None` when the machine has no usable adapter.
    pub(crate) async fn headless_context(settings: Settings) -> Option<Context> {
        super::init_logger();
        match Context::new_headless(settings).await {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                log::warn!("skipping GPU test: {e:#}");
                None
            }
        }
    }
}
