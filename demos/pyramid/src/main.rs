//! Renders the textured pyramid with both built-in vertex stages and writes
//! `pyramid_combined.png` and `pyramid_decomposed.png`.

use flow_shade::{
    cgmath::{Deg, Matrix4, PerspectiveFov, Point3, Rad, Vector3},
    context::Context,
    data_structures::{
        sampling::{SamplerConfig, TextureImage},
        texture::Texture,
        vertex::{GpuMesh, Mesh},
    },
    image,
    pipelines::textured::{ProgramVariant, ShaderProgram},
    render::{DrawContext, RenderTarget, render_to_image},
    settings::Settings,
    stage::TransformUniform,
};

fn checkerboard() -> anyhow::Result<TextureImage> {
    let texels = TextureImage::from_texels(image::RgbaImage::from_fn(8, 8, |x, y| {
        if (x + y) % 2 == 0 {
            image::Rgba([230, 180, 80, 255])
        } else {
            image::Rgba([90, 50, 20, 255])
        }
    }))?;
    Ok(texels)
}

fn transform(settings: &Settings) -> TransformUniform {
    let model = Matrix4::from_angle_y(Deg(30.0));
    let view = Matrix4::look_at_rh(
        Point3::new(0.0, 0.75, 1.5),
        Point3::new(0.0, 0.0, -0.5),
        Vector3::unit_y(),
    );
    let proj = PerspectiveFov {
        fovy: Rad::from(Deg(45.0)),
        aspect: settings.width as f32 / settings.height as f32,
        near: 0.1,
        far: 100.0,
    }
    .into();
    TransformUniform::Decomposed { model, view, proj }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = Settings::default();
    let transform = transform(&settings);
    let ctx = Context::new_headless(settings).await?;

    let texels = checkerboard()?;
    let mesh = GpuMesh::new(&ctx.device, &Mesh::pyramid(), "pyramid");
    let target = RenderTarget::new(&ctx);

    for (variant, file) in [
        (ProgramVariant::Combined, "pyramid_combined.png"),
        (ProgramVariant::Decomposed, "pyramid_decomposed.png"),
    ] {
        let program = ShaderProgram::builtin(&ctx, variant)?;
        log::info!("{variant:?} program uses {:?} transforms", program.contract());

        let uniforms = program.transform_resources(&ctx.device);
        uniforms.write(&ctx.queue, &transform);

        let sampler = SamplerConfig::default()
            .with_param("GL_TEXTURE_WRAP_S", "GL_CLAMP_TO_EDGE")?
            .with_param("GL_TEXTURE_WRAP_T", "GL_CLAMP_TO_EDGE")?;
        let texture = Texture::from_texels(&ctx.device, &ctx.queue, &texels, Some("checkerboard"), sampler);
        let texture_group = program.texture_bind_group(&ctx.device, &texture);

        let draw = DrawContext {
            program: &program,
            transform: &uniforms.bind_group,
            texture: &texture_group,
            mesh: &mesh,
        };
        let image = render_to_image(&ctx, &target, &[draw]).await?;
        image.save(file)?;
        log::info!("wrote {file}");
    }
    Ok(())
}
