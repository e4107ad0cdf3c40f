//! flow-shade
//!
//! A small textured-mesh shader program built on wgpu. A vertex stage turns
//! each vertex position into a clip-space position through either one
//! combined `camera_matrix` or separate `model`, `view` and `proj` matrices,
//! and hands the texture coordinate through unchanged. The fragment stage
//! samples `tex_color` at that coordinate.
//!
//! Every stage also has a CPU reference in [`stage`], so the transform and
//! sampling rules can be checked without a GPU.
//!
//! High-level modules
//! - `context`: headless device and queue
//! - `data_structures`: vertices, meshes, textures, samplers and uniforms
//! - `error`: compile, link, texture and mesh errors
//! - `pipelines`: the built-in shader sources and the render pipeline
//! - `reflect`: stage interfaces and link-time checks via naga
//! - `render`: explicit draw context and offscreen rendering
//! - `settings`: host configuration
//! - `stage`: CPU reference of the vertex and fragment stages
//!

pub mod context;
pub mod data_structures;
pub mod error;
pub mod pipelines;
pub mod reflect;
pub mod render;
pub mod settings;
pub mod stage;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use image;
pub use wgpu;
