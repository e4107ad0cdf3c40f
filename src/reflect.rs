//! Compile-time reflection of shader stages.
//!
//! Each stage is parsed and validated with `naga`, the same front end `wgpu`
//! runs internally, and its interface is pulled out of the IR: what it reads
//! at which location, what it writes, and which uniforms it actually uses.
//! Uniforms a stage declares but never touches are not reported, just like
//! inactive uniforms are invisible to a GL program query.
//!
//! Linking two reflected stages checks that the interfaces line up and
//! resolves the [`TransformContract`] the program exposes.

use naga::{
    Binding, Handle, ImageDimension, ScalarKind, ShaderStage, TypeInner, VectorSize,
    valid::{Capabilities, ValidationFlags, Validator},
};

use crate::{
    error::{StageError, StageKind},
    stage::{
        ATTRIBUTE_POSITION, ATTRIBUTE_TEXTURE_COORDINATE, CAMERA_MATRIX, MODEL, PROJ, TEX_COLOR,
        TransformContract, VIEW,
    },
};

/// Bind group holding `tex_color` and its sampler.
pub const TEXTURE_GROUP: u32 = 0;
/// Bind group holding the transform uniforms.
pub const TRANSFORM_GROUP: u32 = 1;

/// The shader-side type of an interface value, as far as the host cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
    Texture2d,
    Sampler,
    Other,
}

/// A located stage input or output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Varying {
    pub location: u32,
    pub name: Option<String>,
    pub ty: ValueType,
}

/// A resource the stage reads: a uniform buffer, a texture or a sampler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformBinding {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub ty: ValueType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageInterface {
    pub stage: StageKind,
    pub entry_point: String,
    pub inputs: Vec<Varying>,
    pub outputs: Vec<Varying>,
    /// Whether the stage writes `@builtin(position)`.
    pub writes_position: bool,
    /// Only the uniforms the entry point uses.
    pub uniforms: Vec<UniformBinding>,
}

impl StageInterface {
    pub fn input(&self, location: u32) -> Option<&Varying> {
        self.inputs.iter().find(|v| v.location == location)
    }

    pub fn output(&self, location: u32) -> Option<&Varying> {
        self.outputs.iter().find(|v| v.location == location)
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformBinding> {
        self.uniforms.iter().find(|u| u.name == name)
    }
}

/// A stage that parsed and validated, together with its reflected interface.
#[derive(Debug, Clone)]
pub struct CompiledStage {
    pub source: String,
    pub module: naga::Module,
    pub interface: StageInterface,
}

/// Parse, validate and reflect one stage.
pub fn compile_stage(stage: StageKind, source: &str) -> Result<CompiledStage, StageError> {
    let compile_error = |log: String| StageError::Compile { stage, log };

    let module =
        naga::front::wgsl::parse_str(source).map_err(|e| compile_error(e.emit_to_string(source)))?;
    let info = Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| compile_error(e.emit_to_string(source)))?;

    let wanted = match stage {
        StageKind::Vertex => ShaderStage::Vertex,
        StageKind::Fragment => ShaderStage::Fragment,
    };
    let (index, entry_point) = module
        .entry_points
        .iter()
        .enumerate()
        .find(|(_, ep)| ep.stage == wanted)
        .ok_or_else(|| compile_error(format!("no {stage} entry point")))?;

    let mut inputs = Vec::new();
    let mut input_position = false;
    for argument in &entry_point.function.arguments {
        collect_varyings(
            &module,
            argument.binding.as_ref(),
            argument.name.as_deref(),
            argument.ty,
            &mut inputs,
            &mut input_position,
        );
    }

    let mut outputs = Vec::new();
    let mut writes_position = false;
    if let Some(result) = &entry_point.function.result {
        collect_varyings(
            &module,
            result.binding.as_ref(),
            None,
            result.ty,
            &mut outputs,
            &mut writes_position,
        );
    }

    let usage = info.get_entry_point(index);
    let uniforms = module
        .global_variables
        .iter()
        .filter(|(handle, _)| !usage[*handle].is_empty())
        .filter_map(|(_, var)| {
            let binding = var.binding.as_ref()?;
            Some(UniformBinding {
                name: var.name.clone().unwrap_or_default(),
                group: binding.group,
                binding: binding.binding,
                ty: value_type(&module, var.ty),
            })
        })
        .collect::<Vec<_>>();

    log::debug!(
        "{stage} stage `{}`: {} inputs, {} outputs, uniforms {:?}",
        entry_point.name,
        inputs.len(),
        outputs.len(),
        uniforms.iter().map(|u| u.name.as_str()).collect::<Vec<_>>()
    );

    let interface = StageInterface {
        stage,
        entry_point: entry_point.name.clone(),
        inputs,
        outputs,
        writes_position,
        uniforms,
    };
    Ok(CompiledStage {
        source: source.to_string(),
        module,
        interface,
    })
}

/// Walk a binding, or the members of a struct without one.
fn collect_varyings(
    module: &naga::Module,
    binding: Option<&Binding>,
    name: Option<&str>,
    ty: Handle<naga::Type>,
    out: &mut Vec<Varying>,
    position: &mut bool,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(Varying {
            location: *location,
            name: name.map(str::to_string),
            ty: value_type(module, ty),
        }),
        Some(Binding::BuiltIn(naga::BuiltIn::Position { .. })) => *position = true,
        Some(Binding::BuiltIn(_)) => (),
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_varyings(
                        module,
                        member.binding.as_ref(),
                        member.name.as_deref(),
                        member.ty,
                        out,
                        position,
                    );
                }
            }
        }
    }
}

fn value_type(module: &naga::Module, ty: Handle<naga::Type>) -> ValueType {
    match &module.types[ty].inner {
        TypeInner::Scalar(scalar) if scalar.kind == ScalarKind::Float => ValueType::Float,
        TypeInner::Vector { size, scalar } if scalar.kind == ScalarKind::Float => match size {
            VectorSize::Bi => ValueType::Vec2,
            VectorSize::Tri => ValueType::Vec3,
            VectorSize::Quad => ValueType::Vec4,
        },
        TypeInner::Matrix {
            columns: VectorSize::Quad,
            rows: VectorSize::Quad,
            ..
        } => ValueType::Mat4,
        TypeInner::Image {
            dim: ImageDimension::D2,
            arrayed: false,
            ..
        } => ValueType::Texture2d,
        TypeInner::Sampler { .. } => ValueType::Sampler,
        _ => ValueType::Other,
    }
}

impl TransformContract {
    /// Decide the contract from the uniforms a vertex stage uses.
    ///
    /// `camera_matrix` wins if present. Otherwise all of `model`, `view`
    /// and `proj` must be there.
    pub fn resolve(uniforms: &[UniformBinding]) -> Result<TransformContract, StageError> {
        let is_matrix = |name: &str| {
            uniforms
                .iter()
                .any(|u| u.name == name && u.ty == ValueType::Mat4)
        };
        if is_matrix(CAMERA_MATRIX) {
            Ok(TransformContract::Combined)
        } else if [MODEL, VIEW, PROJ].iter().all(|name| is_matrix(name)) {
            Ok(TransformContract::Decomposed)
        } else {
            Err(StageError::Link {
                log: format!(
                    "vertex stage uses neither `{CAMERA_MATRIX}` nor all of `{MODEL}`, `{VIEW}`, `{PROJ}` as mat4 uniforms"
                ),
            })
        }
    }
}

/// The checked interface of a vertex and a fragment stage linked together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInterface {
    pub vertex: StageInterface,
    pub fragment: StageInterface,
    pub contract: TransformContract,
}

impl ProgramInterface {
    pub fn link(
        vertex: &StageInterface,
        fragment: &StageInterface,
    ) -> Result<ProgramInterface, StageError> {
        let link_error = |log: String| StageError::Link { log };

        if vertex.stage != StageKind::Vertex || fragment.stage != StageKind::Fragment {
            return Err(link_error(
                "a program needs one vertex and one fragment stage".into(),
            ));
        }
        if !vertex.writes_position {
            return Err(link_error(
                "vertex stage does not write the clip position".into(),
            ));
        }

        for (location, ty) in [
            (ATTRIBUTE_POSITION, ValueType::Vec3),
            (ATTRIBUTE_TEXTURE_COORDINATE, ValueType::Vec2),
        ] {
            match vertex.input(location) {
                Some(attribute) if attribute.ty == ty => (),
                Some(attribute) => {
                    return Err(link_error(format!(
                        "attribute at location {location} is {:?}, expected {ty:?}",
                        attribute.ty
                    )));
                }
                None => {
                    return Err(link_error(format!(
                        "vertex stage has no attribute at location {location}"
                    )));
                }
            }
        }

        for input in &fragment.inputs {
            let name = input.name.as_deref().unwrap_or("<unnamed>");
            match vertex.output(input.location) {
                Some(output) if output.ty == input.ty => (),
                Some(output) => {
                    return Err(link_error(format!(
                        "fragment input `{name}` at location {} is {:?} but the vertex stage writes {:?}",
                        input.location, input.ty, output.ty
                    )));
                }
                None => {
                    return Err(link_error(format!(
                        "fragment input `{name}` at location {} is not written by the vertex stage",
                        input.location
                    )));
                }
            }
        }

        for v in &vertex.uniforms {
            if let Some(f) = fragment
                .uniforms
                .iter()
                .find(|f| f.group == v.group && f.binding == v.binding)
            {
                if f.name != v.name || f.ty != v.ty {
                    return Err(link_error(format!(
                        "binding {}:{} is `{}` in the vertex stage and `{}` in the fragment stage",
                        v.group, v.binding, v.name, f.name
                    )));
                }
            }
        }

        let contract = TransformContract::resolve(&vertex.uniforms)?;
        for (binding, name) in contract.uniform_names().iter().enumerate() {
            let placed = vertex
                .uniform(name)
                .is_some_and(|u| u.group == TRANSFORM_GROUP && u.binding == binding as u32);
            if !placed {
                return Err(link_error(format!(
                    "`{name}` must be bound at {TRANSFORM_GROUP}:{binding}"
                )));
            }
        }

        let texture = fragment
            .uniform(TEX_COLOR)
            .filter(|u| u.ty == ValueType::Texture2d)
            .ok_or_else(|| link_error(format!("fragment stage does not sample `{TEX_COLOR}`")))?;
        let sampler = fragment
            .uniforms
            .iter()
            .find(|u| u.ty == ValueType::Sampler);
        let texture_placed = texture.group == TEXTURE_GROUP && texture.binding == 0;
        let sampler_placed =
            sampler.is_some_and(|s| s.group == TEXTURE_GROUP && s.binding == 1);
        if !texture_placed || !sampler_placed {
            return Err(link_error(format!(
                "`{TEX_COLOR}` and its sampler must be bound at {TEXTURE_GROUP}:0 and {TEXTURE_GROUP}:1"
            )));
        }

        Ok(ProgramInterface {
            vertex: vertex.clone(),
            fragment: fragment.clone(),
            contract,
        })
    }

    /// Location of a vertex attribute by its shader-side name.
    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.vertex
            .inputs
            .iter()
            .find(|v| v.name.as_deref() == Some(name))
            .map(|v| v.location)
    }

    /// Look a uniform up in either stage.
    pub fn uniform(&self, name: &str) -> Option<&UniformBinding> {
        self.vertex
            .uniform(name)
            .or_else(|| self.fragment.uniform(name))
    }

    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniform(name).is_some()
    }
}
