//! CPU reference of the two shader stages.
//!
//! The GPU programs in [`crate::pipelines`] and the functions in this module
//! implement the same contract. The CPU side exists so that the contract can
//! be checked without an adapter and so that hosts can predict what a draw
//! will produce (for culling, picking or golden images).
//!
//! Both stages are pure: an invocation only sees its own inputs and the
//! uniform values bound for the draw.

pub mod fragment;
pub mod vertex;

pub use fragment::{FragmentStage, TexturedFragment};
pub use vertex::{TransformContract, TransformUniform, VertexStage};

/// Attribute location of the object-space position (`vec3`).
pub const ATTRIBUTE_POSITION: u32 = 0;
/// Attribute location of the texture coordinate (`vec2`).
pub const ATTRIBUTE_TEXTURE_COORDINATE: u32 = 1;

/// Varying location the vertex stage writes `tex_coord` to.
pub const VARYING_TEX_COORD: u32 = 0;

pub const POSITION: &str = "position";
pub const TEXTURE_COORDINATE: &str = "texture_coordinate";
pub const TEX_COORD: &str = "tex_coord";

pub const CAMERA_MATRIX: &str = "camera_matrix";
pub const MODEL: &str = "model";
pub const VIEW: &str = "view";
pub const PROJ: &str = "proj";
pub const TEX_COLOR: &str = "tex_color";

/// Per-vertex inputs as the host supplies them from the vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexInput {
    pub position: [f32; 3],
    pub texture_coordinate: [f32; 2],
}

/// What the vertex stage hands to the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexOutput {
    pub clip_position: cgmath::Vector4<f32>,
    pub tex_coord: [f32; 2],
}

impl VertexOutput {
    /// Normalized device coordinates after the perspective divide.
    ///
    /// Returns `None` when `w` is zero, i.e. for degenerate transforms.
    pub fn ndc(&self) -> Option<cgmath::Vector3<f32>> {
        let w = self.clip_position.w;
        if w == 0.0 {
            return None;
        }
        Some(cgmath::Vector3::new(
            self.clip_position.x / w,
            self.clip_position.y / w,
            self.clip_position.z / w,
        ))
    }
}

/// Blend three vertex outputs with barycentric weights.
///
/// This is the fixed-function step between the stages. It interpolates
/// linearly in screen space, which is what the rasterizer does for
/// `w == 1` geometry. Weights should sum to one.
pub fn interpolate(vertices: &[VertexOutput; 3], weights: [f32; 3]) -> VertexOutput {
    let clip_position = vertices[0].clip_position * weights[0]
        + vertices[1].clip_position * weights[1]
        + vertices[2].clip_position * weights[2];
    let mut tex_coord = [0.0; 2];
    for (axis, out) in tex_coord.iter_mut().enumerate() {
        *out = vertices[0].tex_coord[axis] * weights[0]
            + vertices[1].tex_coord[axis] * weights[1]
            + vertices[2].tex_coord[axis] * weights[2];
    }
    VertexOutput {
        clip_position,
        tex_coord,
    }
}
