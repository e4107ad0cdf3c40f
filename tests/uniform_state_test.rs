use cgmath::{Matrix4, SquareMatrix, Vector3, Zero};
use flow_shade::{
    data_structures::uniform::{MatrixUniform, UniformState, UniformWrite},
    pipelines::textured::{FRAGMENT_SOURCE, ProgramVariant, link_program},
    stage::{TransformContract, TransformUniform},
};

mod common;

fn state_for(variant: ProgramVariant) -> UniformState {
    let linked = link_program(variant.vertex_source(), FRAGMENT_SOURCE).unwrap();
    UniformState::for_program(&linked.interface)
}

#[test]
fn unwritten_uniforms_read_as_zero() {
    let state = state_for(ProgramVariant::Decomposed);
    assert_eq!(state.contract(), TransformContract::Decomposed);
    for name in ["model", "view", "proj"] {
        assert_eq!(state.matrix(name), Some(Matrix4::zero()));
    }
    assert_eq!(
        state.transform(),
        TransformUniform::zeroed(TransformContract::Decomposed)
    );
}

#[test]
fn writing_an_unknown_name_changes_nothing() {
    common::test_utils::init_logger();
    let mut state = state_for(ProgramVariant::Combined);
    let before = state.transform();

    for name in ["model", "view", "proj", "mvp", ""] {
        assert_eq!(
            state.set_matrix(name, Matrix4::identity()),
            UniformWrite::Ignored
        );
        assert_eq!(state.matrix(name), None);
    }
    assert_eq!(state.transform(), before);
}

#[test]
fn writes_land_in_the_named_slot() {
    let mut state = state_for(ProgramVariant::Decomposed);
    let model = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
    assert_eq!(state.set_matrix("model", model), UniformWrite::Bound);

    assert_eq!(state.matrix("model"), Some(model));
    assert_eq!(state.matrix("view"), Some(Matrix4::zero()));
    assert_eq!(
        state.transform(),
        TransformUniform::Decomposed {
            model,
            view: Matrix4::zero(),
            proj: Matrix4::zero(),
        }
    );
}

#[test]
fn a_decomposed_transform_is_ignored_by_a_combined_program() {
    let mut state = state_for(ProgramVariant::Combined);
    state.set_transform(&TransformUniform::identity(TransformContract::Decomposed));
    assert_eq!(state.matrix("camera_matrix"), Some(Matrix4::zero()));

    state.set_transform(&TransformUniform::identity(TransformContract::Combined));
    assert_eq!(state.matrix("camera_matrix"), Some(Matrix4::identity()));
}

#[test]
fn matrix_uniform_is_column_major() {
    let uniform = MatrixUniform::from(Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0)));
    assert_eq!(uniform.columns[0], [1.0, 0.0, 0.0, 0.0]);
    assert_eq!(uniform.columns[3], [1.0, 2.0, 3.0, 1.0]);
    assert_eq!(bytemuck::bytes_of(&uniform).len(), 64);
}
