//! Transform uniforms: host-side values and their GPU buffers.
//!
//! [`UniformState`] models the name-keyed uniform store of a linked program.
//! Writing a name the program does not use changes nothing, and a uniform
//! that is never written stays all zero. [`TransformResources`] owns the
//! buffers and bind group that carry the transform to the vertex stage.

use std::collections::BTreeMap;

use cgmath::{Matrix4, Zero};
use wgpu::util::DeviceExt;

use crate::{
    reflect::ProgramInterface,
    stage::{TransformContract, TransformUniform},
};

/// Outcome of a uniform write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformWrite {
    Bound,
    /// The program has no such uniform, nothing happened.
    Ignored,
}

/// Matrix uniforms of one program, keyed by name.
#[derive(Debug, Clone)]
pub struct UniformState {
    contract: TransformContract,
    matrices: BTreeMap<&'static str, Matrix4<f32>>,
}

impl UniformState {
    pub fn new(contract: TransformContract) -> Self {
        let matrices = contract
            .uniform_names()
            .iter()
            .map(|name| (*name, Matrix4::zero()))
            .collect();
        Self { contract, matrices }
    }

    pub fn for_program(interface: &ProgramInterface) -> Self {
        Self::new(interface.contract)
    }

    pub fn contract(&self) -> TransformContract {
        self.contract
    }

    pub fn set_matrix(&mut self, name: &str, value: Matrix4<f32>) -> UniformWrite {
        match self.matrices.get_mut(name) {
            Some(slot) => {
                *slot = value;
                UniformWrite::Bound
            }
            None => {
                log::debug!(
                    "ignoring write to `{name}`, a {:?} program has no such uniform",
                    self.contract
                );
                UniformWrite::Ignored
            }
        }
    }

    pub fn matrix(&self, name: &str) -> Option<Matrix4<f32>> {
        self.matrices.get(name).copied()
    }

    /// Write every matrix of `transform` that this program declares.
    pub fn set_transform(&mut self, transform: &TransformUniform) {
        let names = transform.contract().uniform_names();
        for (name, value) in names.iter().zip(transform.matrices()) {
            self.set_matrix(name, value);
        }
    }

    /// The transform the vertex stage will see.
    pub fn transform(&self) -> TransformUniform {
        let get = |name: &str| self.matrices.get(name).copied().unwrap_or_else(Matrix4::zero);
        match self.contract {
            TransformContract::Combined => TransformUniform::Combined {
                camera_matrix: get(crate::stage::CAMERA_MATRIX),
            },
            TransformContract::Decomposed => TransformUniform::Decomposed {
                model: get(crate::stage::MODEL),
                view: get(crate::stage::VIEW),
                proj: get(crate::stage::PROJ),
            },
        }
    }
}

/// A `mat4x4<f32>` as laid out in a uniform buffer (column major).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MatrixUniform {
    pub columns: [[f32; 4]; 4],
}

impl From<Matrix4<f32>> for MatrixUniform {
    fn from(matrix: Matrix4<f32>) -> Self {
        Self {
            columns: matrix.into(),
        }
    }
}

pub fn mk_bind_group_layout(
    device: &wgpu::Device,
    contract: TransformContract,
) -> wgpu::BindGroupLayout {
    let entries = (0..contract.uniform_names().len() as u32)
        .map(|binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(
                    std::mem::size_of::<MatrixUniform>() as wgpu::BufferAddress
                ),
            },
            count: None,
        })
        .collect::<Vec<_>>();
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &entries,
        label: Some("transform_bind_group_layout"),
    })
}

/// Uniform buffers and bind group for one draw's transform.
#[derive(Debug)]
pub struct TransformResources {
    pub contract: TransformContract,
    pub buffers: Vec<wgpu::Buffer>,
    pub bind_group: wgpu::BindGroup,
}

impl TransformResources {
    /// Create the buffers zero-filled, the way an unwritten uniform reads.
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        contract: TransformContract,
    ) -> Self {
        let buffers = contract
            .uniform_names()
            .iter()
            .map(|name| {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(*name),
                    contents: bytemuck::bytes_of(&MatrixUniform::from(Matrix4::zero())),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                })
            })
            .collect::<Vec<_>>();
        let entries = buffers
            .iter()
            .enumerate()
            .map(|(binding, buffer)| wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: buffer.as_entire_binding(),
            })
            .collect::<Vec<_>>();
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &entries,
            label: Some("transform_bind_group"),
        });
        Self {
            contract,
            buffers,
            bind_group,
        }
    }

    /// Upload `transform`, re-expressed for this program's contract.
    ///
    /// Unlike [`UniformState::set_matrix`], a value of the other contract is
    /// not ignored here. A decomposed value is collapsed to
    /// `proj * view * model`, a combined one goes to `model` with identity
    /// `view` and `proj`. The clip positions are the same either way.
    pub fn write(&self, queue: &wgpu::Queue, transform: &TransformUniform) {
        let adapted = transform.adapt_to(self.contract);
        if adapted.contract() != transform.contract() {
            log::debug!(
                "adapting a {:?} transform for a {:?} program",
                transform.contract(),
                self.contract
            );
        }
        for (buffer, matrix) in self.buffers.iter().zip(adapted.matrices()) {
            queue.write_buffer(buffer, 0, bytemuck::bytes_of(&MatrixUniform::from(matrix)));
        }
    }

    pub fn write_state(&self, queue: &wgpu::Queue, state: &UniformState) {
        self.write(queue, &state.transform());
    }
}
