//! Vertex stage: object space to clip space, texture coordinate passthrough.

use cgmath::{Matrix4, SquareMatrix, Vector4, Zero};

use crate::stage::{CAMERA_MATRIX, MODEL, PROJ, VIEW, VertexInput, VertexOutput};

/// Which transform uniforms a linked program declares.
///
/// Programs come in two flavours. Hosts find out which one they hold by
/// reflecting the program (see [`crate::reflect`]) instead of assuming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformContract {
    /// A single `camera_matrix`.
    Combined,
    /// Separate `model`, `view` and `proj` matrices.
    Decomposed,
}

impl TransformContract {
    /// Uniform names in binding order.
    pub fn uniform_names(&self) -> &'static [&'static str] {
        match self {
            TransformContract::Combined => &[CAMERA_MATRIX],
            TransformContract::Decomposed => &[MODEL, VIEW, PROJ],
        }
    }
}

/// A transform value for one draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformUniform {
    Combined {
        camera_matrix: Matrix4<f32>,
    },
    Decomposed {
        model: Matrix4<f32>,
        view: Matrix4<f32>,
        proj: Matrix4<f32>,
    },
}

impl TransformUniform {
    pub fn identity(contract: TransformContract) -> Self {
        match contract {
            TransformContract::Combined => TransformUniform::Combined {
                camera_matrix: Matrix4::identity(),
            },
            TransformContract::Decomposed => TransformUniform::Decomposed {
                model: Matrix4::identity(),
                view: Matrix4::identity(),
                proj: Matrix4::identity(),
            },
        }
    }

    /// What a program sees when the host never wrote its uniforms.
    pub fn zeroed(contract: TransformContract) -> Self {
        let zero = Matrix4::zero();
        match contract {
            TransformContract::Combined => TransformUniform::Combined { camera_matrix: zero },
            TransformContract::Decomposed => TransformUniform::Decomposed {
                model: zero,
                view: zero,
                proj: zero,
            },
        }
    }

    pub fn contract(&self) -> TransformContract {
        match self {
            TransformUniform::Combined { .. } => TransformContract::Combined,
            TransformUniform::Decomposed { .. } => TransformContract::Decomposed,
        }
    }

    /// The matrix applied to `vec4(position, 1.0)`.
    ///
    /// For the decomposed form the product is taken left to right,
    /// `(proj * view) * model`, which is how the shader evaluates
    /// `proj * view * model * p`.
    pub fn clip_matrix(&self) -> Matrix4<f32> {
        match *self {
            TransformUniform::Combined { camera_matrix } => camera_matrix,
            TransformUniform::Decomposed { model, view, proj } => proj * view * model,
        }
    }

    /// The combined value that yields the same clip positions.
    pub fn collapse(&self) -> Self {
        TransformUniform::Combined {
            camera_matrix: self.clip_matrix(),
        }
    }

    /// Re-express this value for a program with `contract`.
    ///
    /// Going from combined to decomposed puts the camera matrix in `model`
    /// and leaves `view` and `proj` as identity, so the clip result is
    /// unchanged in both directions.
    pub fn adapt_to(&self, contract: TransformContract) -> Self {
        match (contract, *self) {
            (TransformContract::Combined, TransformUniform::Combined { .. })
            | (TransformContract::Decomposed, TransformUniform::Decomposed { .. }) => *self,
            (TransformContract::Combined, TransformUniform::Decomposed { .. }) => self.collapse(),
            (TransformContract::Decomposed, TransformUniform::Combined { camera_matrix }) => {
                TransformUniform::Decomposed {
                    model: camera_matrix,
                    view: Matrix4::identity(),
                    proj: Matrix4::identity(),
                }
            }
        }
    }

    /// Matrices in the order of [`TransformContract::uniform_names`].
    pub fn matrices(&self) -> Vec<Matrix4<f32>> {
        match *self {
            TransformUniform::Combined { camera_matrix } => vec![camera_matrix],
            TransformUniform::Decomposed { model, view, proj } => vec![model, view, proj],
        }
    }
}

/// One vertex stage invocation.
pub trait VertexStage {
    fn exec(&self, input: &VertexInput) -> VertexOutput;

    fn exec_all(&self, inputs: &[VertexInput]) -> Vec<VertexOutput> {
        inputs.iter().map(|input| self.exec(input)).collect()
    }
}

impl VertexStage for TransformUniform {
    fn exec(&self, input: &VertexInput) -> VertexOutput {
        let [x, y, z] = input.position;
        VertexOutput {
            clip_position: self.clip_matrix() * Vector4::new(x, y, z, 1.0),
            tex_coord: input.texture_coordinate,
        }
    }
}
