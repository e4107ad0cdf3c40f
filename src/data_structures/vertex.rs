//! Vertex data for the textured program and the meshes built from it.

use wgpu::util::DeviceExt;

use crate::{
    error::MeshError,
    stage::{ATTRIBUTE_POSITION, ATTRIBUTE_TEXTURE_COORDINATE, VertexInput},
};

/// Anything that can describe its own vertex buffer layout.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// One vertex as stored in GPU memory: position then texture coordinate.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub texture_coordinate: [f32; 2],
}

impl TexturedVertex {
    pub const fn new(position: [f32; 3], texture_coordinate: [f32; 2]) -> Self {
        Self {
            position,
            texture_coordinate,
        }
    }
}

impl From<TexturedVertex> for VertexInput {
    fn from(vertex: TexturedVertex) -> Self {
        VertexInput {
            position: vertex.position,
            texture_coordinate: vertex.texture_coordinate,
        }
    }
}

/**
 * The attribute locations are part of the stage contract, the shaders
 * read `position` from 0 and `texture_coordinate` from 1.
 */
impl Vertex for TexturedVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<TexturedVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: ATTRIBUTE_POSITION,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: ATTRIBUTE_TEXTURE_COORDINATE,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Indexed triangle list on the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<TexturedVertex>,
    indices: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn new(vertices: Vec<TexturedVertex>, indices: Vec<[u32; 3]>) -> Result<Self, MeshError> {
        if vertices.is_empty() || indices.is_empty() {
            return Err(MeshError::Empty);
        }
        if let Some(&index) = indices
            .iter()
            .flatten()
            .find(|&&index| index as usize >= vertices.len())
        {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertices: vertices.len(),
            });
        }
        Ok(Self { vertices, indices })
    }

    /// A four-sided pyramid standing on the `y = -0.5` plane.
    pub fn pyramid() -> Self {
        Self {
            vertices: vec![
                TexturedVertex::new([0.5, -0.5, 0.0], [1.0, 0.0]),   // front right
                TexturedVertex::new([-0.5, -0.5, 0.0], [0.0, 0.0]),  // front left
                TexturedVertex::new([-0.5, -0.5, -1.0], [1.0, 0.0]), // back left
                TexturedVertex::new([0.5, -0.5, -1.0], [0.0, 0.0]),  // back right
                TexturedVertex::new([0.0, 0.5, -0.5], [0.5, 1.5]),   // top
            ],
            indices: vec![[0, 1, 4], [1, 2, 4], [2, 3, 4], [0, 3, 4]],
        }
    }

    /// Two triangles covering `[-1, 1]²` with `[0, 1]²` texture coordinates.
    pub fn quad() -> Self {
        Self {
            vertices: vec![
                TexturedVertex::new([-1.0, -1.0, 0.0], [0.0, 0.0]),
                TexturedVertex::new([1.0, -1.0, 0.0], [1.0, 0.0]),
                TexturedVertex::new([1.0, 1.0, 0.0], [1.0, 1.0]),
                TexturedVertex::new([-1.0, 1.0, 0.0], [0.0, 1.0]),
            ],
            indices: vec![[0, 1, 2], [0, 2, 3]],
        }
    }

    pub fn vertices(&self) -> &[TexturedVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    pub fn index_count(&self) -> u32 {
        (self.indices.len() * 3) as u32
    }

    /// The vertices of each triangle, in index order.
    pub fn triangles(&self) -> impl Iterator<Item = [TexturedVertex; 3]> + '_ {
        self.indices
            .iter()
            .map(|tri| tri.map(|index| self.vertices[index as usize]))
    }
}

/// A [`Mesh`] uploaded to vertex and index buffers.
#[derive(Debug)]
pub struct GpuMesh {
    pub vertex: wgpu::Buffer,
    pub index: wgpu::Buffer,
    pub amount: u32,
}

impl GpuMesh {
    pub fn new(device: &wgpu::Device, mesh: &Mesh, label: &str) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex,
            index,
            amount: mesh.index_count(),
        }
    }
}
