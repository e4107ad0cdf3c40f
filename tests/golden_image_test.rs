#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
mod gpu {
    use cgmath::{Matrix4, Vector3};
    use flow_shade::{
        context::Context,
        data_structures::{
            sampling::{SamplerConfig, TextureImage},
            texture::Texture,
            vertex::{GpuMesh, Mesh, TexturedVertex},
        },
        pipelines::textured::{ProgramVariant, ShaderProgram},
        render::{DrawContext, RenderTarget, render_to_image},
        settings::Settings,
        stage::{TransformContract, TransformUniform},
    };
    use wgpu::AddressMode;

    use crate::common::test_utils::{checkerboard, gpu::headless_context, texels};

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn settings() -> Settings {
        Settings::default().with_size(64, 64)
    }

    /// Dyadic entries only, so every product is exact on CPU and GPU.
    fn exact_transform() -> (Matrix4<f32>, Matrix4<f32>, Matrix4<f32>) {
        let model = Matrix4::from_translation(Vector3::new(0.0, 0.0, 0.5));
        #[rustfmt::skip]
        let view = Matrix4::new(
            0.0, 1.0, 0.0, 0.0,
            -1.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.5, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        let proj = Matrix4::from_translation(Vector3::new(0.0, 0.0, 0.5));
        (model, view, proj)
    }

    async fn render(
        ctx: &Context,
        variant: ProgramVariant,
        transform: TransformUniform,
        mesh: &Mesh,
        texels: &TextureImage,
    ) -> image::RgbaImage {
        let program = ShaderProgram::builtin(ctx, variant).unwrap();
        let uniforms = program.transform_resources(&ctx.device);
        uniforms.write(&ctx.queue, &transform);
        let texture = Texture::from_texels(
            &ctx.device,
            &ctx.queue,
            texels,
            Some("golden texture"),
            SamplerConfig::nearest(AddressMode::ClampToEdge),
        );
        let texture_group = program.texture_bind_group(&ctx.device, &texture);
        let mesh = GpuMesh::new(&ctx.device, mesh, "golden");
        let target = RenderTarget::new(ctx);
        let draw = DrawContext {
            program: &program,
            transform: &uniforms.bind_group,
            texture: &texture_group,
            mesh: &mesh,
        };
        render_to_image(ctx, &target, &[draw]).await.unwrap()
    }

    #[tokio::test]
    async fn solid_texture_fills_the_quad() {
        let Some(ctx) = headless_context(settings()).await else {
            return;
        };
        for variant in [ProgramVariant::Combined, ProgramVariant::Decomposed] {
            let image = render(
                &ctx,
                variant,
                TransformUniform::identity(TransformContract::Combined),
                &Mesh::quad(),
                &TextureImage::solid(RED),
            )
            .await;
            assert_eq!(image.dimensions(), (64, 64));
            for (x, y, pixel) in image.enumerate_pixels() {
                assert_eq!(pixel.0, RED, "pixel mismatch at ({x}, {y}) for {variant:?}");
            }
        }
    }

    #[tokio::test]
    async fn combined_and_decomposed_render_the_same_image() {
        let Some(ctx) = headless_context(settings()).await else {
            return;
        };
        let (model, view, proj) = exact_transform();
        let tex = checkerboard(4);
        let combined = render(
            &ctx,
            ProgramVariant::Combined,
            TransformUniform::Combined {
                camera_matrix: proj * view * model,
            },
            &Mesh::pyramid(),
            &tex,
        )
        .await;
        let decomposed = render(
            &ctx,
            ProgramVariant::Decomposed,
            TransformUniform::Decomposed { model, view, proj },
            &Mesh::pyramid(),
            &tex,
        )
        .await;

        assert!(
            combined
                .pixels()
                .any(|p| p.0 == [255, 255, 255, 255] || p.0 == [0, 0, 0, 255]),
            "the pyramid was not drawn"
        );
        for (x, y, pixel) in combined.enumerate_pixels() {
            assert_eq!(pixel, decomposed.get_pixel(x, y), "pixel mismatch at ({x}, {y})");
        }
    }

    #[tokio::test]
    async fn unwritten_transform_draws_nothing() {
        let Some(ctx) = headless_context(settings()).await else {
            return;
        };
        let program = ShaderProgram::builtin(&ctx, ProgramVariant::Decomposed).unwrap();
        let uniforms = program.transform_resources(&ctx.device);
        let texture = Texture::solid(&ctx.device, &ctx.queue, RED, ctx.settings.sampler);
        let texture_group = program.texture_bind_group(&ctx.device, &texture);
        let mesh = GpuMesh::new(&ctx.device, &Mesh::quad(), "quad");
        let target = RenderTarget::new(&ctx);

        let cleared = render_to_image(&ctx, &target, &[]).await.unwrap();
        let draw = DrawContext {
            program: &program,
            transform: &uniforms.bind_group,
            texture: &texture_group,
            mesh: &mesh,
        };
        let drawn = render_to_image(&ctx, &target, &[draw]).await.unwrap();
        assert_eq!(cleared, drawn);
        assert!(drawn.pixels().all(|p| p.0 != RED));
    }

    #[tokio::test]
    async fn top_of_the_texture_lands_at_the_top_of_the_image() {
        let Some(ctx) = headless_context(settings()).await else {
            return;
        };
        // Bottom row blue, top row red.
        let image = render(
            &ctx,
            ProgramVariant::Combined,
            TransformUniform::identity(TransformContract::Combined),
            &Mesh::quad(),
            &texels(&[&[BLUE], &[RED]]),
        )
        .await;
        assert_eq!(image.get_pixel(32, 0).0, RED);
        assert_eq!(image.get_pixel(32, 63).0, BLUE);
    }

    #[tokio::test]
    async fn encoded_images_upload_right_side_up() {
        let Some(ctx) = headless_context(settings()).await else {
            return;
        };
        // Top row red, bottom row blue, as the PNG stores it.
        let img = image::RgbaImage::from_fn(1, 2, |_, y| image::Rgba(if y == 0 { RED } else { BLUE }));
        let mut png = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut png, image::ImageFormat::Png)
            .unwrap();

        let program = ShaderProgram::builtin(&ctx, ProgramVariant::Combined).unwrap();
        let uniforms = program.transform_resources(&ctx.device);
        uniforms.write(&ctx.queue, &TransformUniform::identity(TransformContract::Combined));
        let texture = Texture::from_bytes(
            &ctx.device,
            &ctx.queue,
            png.get_ref(),
            "png",
            Some("png"),
            SamplerConfig::nearest(AddressMode::ClampToEdge),
        )
        .unwrap();
        let texture_group = program.texture_bind_group(&ctx.device, &texture);
        let mesh = GpuMesh::new(&ctx.device, &Mesh::quad(), "quad");
        let target = RenderTarget::new(&ctx);
        let draw = DrawContext {
            program: &program,
            transform: &uniforms.bind_group,
            texture: &texture_group,
            mesh: &mesh,
        };
        let image = render_to_image(&ctx, &target, &[draw]).await.unwrap();
        assert_eq!(image.get_pixel(32, 0).0, RED);
        assert_eq!(image.get_pixel(32, 63).0, BLUE);
    }

    #[tokio::test]
    async fn clamp_to_border_paints_outside_the_texture() {
        let Some(ctx) = headless_context(settings()).await else {
            return;
        };
        if !ctx.supports_border_clamp() {
            log::warn!("adapter lacks border clamping, skipping");
            return;
        }
        let quad = Mesh::new(
            vec![
                TexturedVertex::new([-1.0, -1.0, 0.0], [-0.5, -0.5]),
                TexturedVertex::new([1.0, -1.0, 0.0], [1.5, -0.5]),
                TexturedVertex::new([1.0, 1.0, 0.0], [1.5, 1.5]),
                TexturedVertex::new([-1.0, 1.0, 0.0], [-0.5, 1.5]),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap();
        let sampler = SamplerConfig {
            border_colour: wgpu::SamplerBorderColor::OpaqueWhite,
            ..SamplerConfig::nearest(AddressMode::ClampToBorder)
        };
        assert!(sampler.needs_border_feature());

        let program = ShaderProgram::builtin(&ctx, ProgramVariant::Decomposed).unwrap();
        let uniforms = program.transform_resources(&ctx.device);
        uniforms.write(&ctx.queue, &TransformUniform::identity(TransformContract::Decomposed));
        let texture = Texture::solid(&ctx.device, &ctx.queue, RED, sampler);
        let texture_group = program.texture_bind_group(&ctx.device, &texture);
        let mesh = GpuMesh::new(&ctx.device, &quad, "border quad");
        let target = RenderTarget::new(&ctx);
        let draw = DrawContext {
            program: &program,
            transform: &uniforms.bind_group,
            texture: &texture_group,
            mesh: &mesh,
        };
        let image = render_to_image(&ctx, &target, &[draw]).await.unwrap();
        assert_eq!(image.get_pixel(32, 32).0, RED);
        assert_eq!(image.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(63, 63).0, [255, 255, 255, 255]);
    }
}
