use flow_shade::{
    data_structures::vertex::{Mesh, TexturedVertex, Vertex},
    error::MeshError,
    settings::Settings,
};

#[test]
fn pyramid_has_four_faces_over_five_vertices() {
    let pyramid = Mesh::pyramid();
    assert_eq!(pyramid.vertices().len(), 5);
    assert_eq!(pyramid.index_count(), 12);
    assert_eq!(pyramid.triangles().count(), 4);
    // Every face meets at the apex.
    assert!(pyramid.triangles().all(|tri| tri[2].position == [0.0, 0.5, -0.5]));
}

#[test]
fn quad_spans_clip_space() {
    let quad = Mesh::quad();
    let corners = quad
        .vertices()
        .iter()
        .map(|v| (v.position[0], v.position[1]))
        .collect::<Vec<_>>();
    assert_eq!(corners, [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]);
    assert_eq!(quad.index_count(), 6);
}

#[test]
fn empty_meshes_are_rejected() {
    assert_eq!(Mesh::new(vec![], vec![]), Err(MeshError::Empty));
    let vertex = TexturedVertex::new([0.0; 3], [0.0; 2]);
    assert_eq!(Mesh::new(vec![vertex], vec![]), Err(MeshError::Empty));
}

#[test]
fn indices_past_the_vertices_are_rejected() {
    let vertices = vec![TexturedVertex::new([0.0; 3], [0.0; 2]); 3];
    let err = Mesh::new(vertices, vec![[0, 1, 2], [2, 1, 5]]).unwrap_err();
    assert_eq!(
        err,
        MeshError::IndexOutOfRange {
            index: 5,
            vertices: 3
        }
    );
    assert_eq!(err.to_string(), "index 5 points past the end of 3 vertices");
}

#[test]
fn vertex_layout_matches_attribute_locations() {
    let layout = TexturedVertex::desc();
    assert_eq!(layout.array_stride, 20);
    assert_eq!(layout.attributes.len(), 2);
    assert_eq!(layout.attributes[0].shader_location, 0);
    assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Float32x3);
    assert_eq!(layout.attributes[1].shader_location, 1);
    assert_eq!(layout.attributes[1].offset, 12);
    assert_eq!(layout.attributes[1].format, wgpu::VertexFormat::Float32x2);
}

#[test]
fn default_settings() {
    let settings = Settings::default();
    assert_eq!((settings.width, settings.height), (800, 600));
    assert_eq!(settings.colour_format, wgpu::TextureFormat::Rgba8Unorm);
    assert_eq!(settings.depth_format, Some(wgpu::TextureFormat::Depth32Float));
    assert_eq!(settings.clear_colour.g, 0.3);

    let small = Settings::default().with_size(16, 8).with_clear_colour(wgpu::Color::WHITE);
    assert_eq!((small.width, small.height), (16, 8));
    assert_eq!(small.clear_colour, wgpu::Color::WHITE);
}
