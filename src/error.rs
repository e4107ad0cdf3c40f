//! Error types callers may want to match on.
//!
//! Everything else in the crate reports through `anyhow`, these enums travel
//! inside an [`anyhow::Error`] and can be recovered with `downcast_ref`.

use std::fmt;

/// The shader stage a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Vertex => write!(f, "Vertex"),
            StageKind::Fragment => write!(f, "Fragment"),
        }
    }
}

/// Compile and link diagnostics of a shader program.
///
/// These are the only failures a program can have. Once linked, drawing
/// with it never fails inside the stages themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    /// A stage did not parse or did not validate.
    Compile { stage: StageKind, log: String },
    /// Both stages compiled but their interfaces don't fit together.
    Link { log: String },
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageError::Compile { stage, log } => write!(f, "{stage} Compile Error: {log}"),
            StageError::Link { log } => write!(f, "Program Link Error: {log}"),
        }
    }
}

impl std::error::Error for StageError {}

/// Raised when configuring a sampler or building a texel store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureError {
    /// The parameter name or its value is not one the sampler understands.
    UnknownTextureParameter(String),
    /// The image has no texels to sample.
    EmptyImage { width: u32, height: u32 },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::UnknownTextureParameter(msg) => {
                write!(f, "unknown texture parameter: {msg}")
            }
            TextureError::EmptyImage { width, height } => {
                write!(f, "a {width}x{height} image has no texels")
            }
        }
    }
}

impl std::error::Error for TextureError {}

/// The mesh data does not describe drawable geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    Empty,
    IndexOutOfRange { index: u32, vertices: usize },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::Empty => write!(f, "a mesh needs at least one vertex and one triangle"),
            MeshError::IndexOutOfRange { index, vertices } => write!(
                f,
                "index {index} points past the end of {vertices} vertices"
            ),
        }
    }
}

impl std::error::Error for MeshError {}
