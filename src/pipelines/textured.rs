use crate::{
    context::Context,
    data_structures::{
        texture::{Texture, tex_color_layout},
        uniform::{self, TransformResources, UniformState},
        vertex::{TexturedVertex, Vertex},
    },
    error::{StageError, StageKind},
    reflect::{CompiledStage, ProgramInterface, compile_stage},
    stage::TransformContract,
};

pub const COMBINED_VERTEX_SOURCE: &str = include_str!("shaders/combined.vert.wgsl");
pub const DECOMPOSED_VERTEX_SOURCE: &str = include_str!("shaders/decomposed.vert.wgsl");
pub const FRAGMENT_SOURCE: &str = include_str!("shaders/textured.frag.wgsl");

/// The two vertex stages this crate ships. Both pair with the same fragment
/// stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramVariant {
    Combined,
    Decomposed,
}

impl ProgramVariant {
    pub fn vertex_source(&self) -> &'static str {
        match self {
            ProgramVariant::Combined => COMBINED_VERTEX_SOURCE,
            ProgramVariant::Decomposed => DECOMPOSED_VERTEX_SOURCE,
        }
    }
}

/// Compiled stages and their linked interface, before anything touches the GPU.
#[derive(Debug, Clone)]
pub struct LinkedStages {
    pub vertex: CompiledStage,
    pub fragment: CompiledStage,
    pub interface: ProgramInterface,
}

/// Compile both stages and link them.
pub fn link_program(vertex: &str, fragment: &str) -> Result<LinkedStages, StageError> {
    let vertex = compile_stage(StageKind::Vertex, vertex)?;
    let fragment = compile_stage(StageKind::Fragment, fragment)?;
    let interface = ProgramInterface::link(&vertex.interface, &fragment.interface)?;
    log::debug!("linked a {:?} program", interface.contract);
    Ok(LinkedStages {
        vertex,
        fragment,
        interface,
    })
}

/// A linked vertex + fragment program ready to draw with.
///
/// Group 0 holds `tex_color` and its sampler, group 1 the transform
/// uniforms of whichever [`TransformContract`] the program exposes.
#[derive(Debug)]
pub struct ShaderProgram {
    pub interface: ProgramInterface,
    pub pipeline: wgpu::RenderPipeline,
    pub texture_layout: wgpu::BindGroupLayout,
    pub transform_layout: wgpu::BindGroupLayout,
}

impl ShaderProgram {
    pub fn from_sources(ctx: &Context, vertex: &str, fragment: &str) -> anyhow::Result<Self> {
        let linked = link_program(vertex, fragment)?;
        let contract = linked.interface.contract;
        let device = &ctx.device;

        let texture_layout = tex_color_layout(device);
        let transform_layout = uniform::mk_bind_group_layout(device, contract);
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Textured Pipeline Layout"),
            bind_group_layouts: &[Some(&texture_layout), Some(&transform_layout)],
            immediate_size: 0,
        });

        let vertex_module = wgpu::ShaderModuleDescriptor {
            label: Some("Textured Vertex Shader"),
            source: wgpu::ShaderSource::Wgsl(linked.vertex.source.as_str().into()),
        };
        let fragment_module = wgpu::ShaderModuleDescriptor {
            label: Some("Textured Fragment Shader"),
            source: wgpu::ShaderSource::Wgsl(linked.fragment.source.as_str().into()),
        };

        let pipeline = mk_render_pipeline(
            device,
            &layout,
            ctx.settings.colour_format,
            Some(wgpu::BlendState::REPLACE),
            ctx.settings.depth_format,
            &[TexturedVertex::desc()],
            (vertex_module, linked.vertex.interface.entry_point.as_str()),
            (fragment_module, linked.fragment.interface.entry_point.as_str()),
        );

        Ok(Self {
            interface: linked.interface,
            pipeline,
            texture_layout,
            transform_layout,
        })
    }

    pub fn builtin(ctx: &Context, variant: ProgramVariant) -> anyhow::Result<Self> {
        Self::from_sources(ctx, variant.vertex_source(), FRAGMENT_SOURCE)
    }

    pub fn contract(&self) -> TransformContract {
        self.interface.contract
    }

    /// Zeroed uniform buffers matching this program's transform contract.
    pub fn transform_resources(&self, device: &wgpu::Device) -> TransformResources {
        TransformResources::new(device, &self.transform_layout, self.contract())
    }

    pub fn uniform_state(&self) -> UniformState {
        UniformState::for_program(&self.interface)
    }

    pub fn texture_bind_group(&self, device: &wgpu::Device, texture: &Texture) -> wgpu::BindGroup {
        texture.bind_group(device, &self.texture_layout)
    }
}

pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_format: Option<wgpu::TextureFormat>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    (vertex, vertex_entry): (wgpu::ShaderModuleDescriptor, &str),
    (fragment, fragment_entry): (wgpu::ShaderModuleDescriptor, &str),
) -> wgpu::RenderPipeline {
    let vertex = device.create_shader_module(vertex);
    let fragment = device.create_shader_module(fragment);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("Textured Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &vertex,
            entry_point: Some(vertex_entry),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &fragment,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // Meshes come with mixed winding, nothing is culled.
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: Some(true),
            depth_compare: Some(wgpu::CompareFunction::Less),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
    })
}
