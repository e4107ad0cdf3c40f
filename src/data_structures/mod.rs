//! Data the two stages consume.
//!
//! - `vertex` holds the vertex layout and meshes
//! - `sampling` holds sampler parameters and the CPU texel store
//! - `texture` uploads texels and samplers to the GPU
//! - `uniform` holds the transform uniforms of a program

pub mod sampling;
pub mod texture;
pub mod uniform;
pub mod vertex;
