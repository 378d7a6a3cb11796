//! Cube geometry: four vertices per face so every face gets its own UVs.

use bytemuck::{Pod, Zeroable};
use egui_wgpu::wgpu;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CubeVertex {
    pub pos: [f32; 3],
    pub uv: [f32; 2],
}

impl CubeVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CubeVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

const fn v(pos: [f32; 3], uv: [f32; 2]) -> CubeVertex {
    CubeVertex { pos, uv }
}

#[rustfmt::skip]
pub const CUBE_VERTICES: [CubeVertex; 24] = [
    v([-1.0, -1.0, -1.0], [0.0, 1.0]),
    v([-1.0,  1.0, -1.0], [0.0, 0.0]),
    v([ 1.0,  1.0, -1.0], [1.0, 0.0]),
    v([ 1.0, -1.0, -1.0], [1.0, 1.0]),

    v([-1.0, -1.0, -1.0], [0.0, 1.0]),
    v([-1.0, -1.0,  1.0], [0.0, 0.0]),
    v([ 1.0, -1.0,  1.0], [1.0, 0.0]),
    v([ 1.0, -1.0, -1.0], [1.0, 1.0]),

    v([ 1.0, -1.0, -1.0], [0.0, 1.0]),
    v([ 1.0, -1.0,  1.0], [1.0, 1.0]),
    v([ 1.0,  1.0,  1.0], [1.0, 0.0]),
    v([ 1.0,  1.0, -1.0], [0.0, 0.0]),

    v([ 1.0,  1.0, -1.0], [0.0, 1.0]),
    v([ 1.0,  1.0,  1.0], [0.0, 0.0]),
    v([-1.0,  1.0,  1.0], [1.0, 0.0]),
    v([-1.0,  1.0, -1.0], [1.0, 1.0]),

    v([-1.0,  1.0, -1.0], [1.0, 0.0]),
    v([-1.0,  1.0,  1.0], [0.0, 0.0]),
    v([-1.0, -1.0,  1.0], [0.0, 1.0]),
    v([-1.0, -1.0, -1.0], [1.0, 1.0]),

    v([-1.0, -1.0,  1.0], [1.0, 1.0]),
    v([ 1.0, -1.0,  1.0], [0.0, 1.0]),
    v([ 1.0,  1.0,  1.0], [0.0, 0.0]),
    v([-1.0,  1.0,  1.0], [1.0, 0.0]),
];

/// Two triangles per face, clockwise when the face is seen from outside.
#[rustfmt::skip]
pub const CUBE_INDICES: [u32; 36] = [
    2, 0, 1,    2, 3, 0,
    4, 6, 5,    4, 7, 6,
    8, 10, 9,   8, 11, 10,
    12, 14, 13, 12, 15, 14,
    16, 18, 17, 16, 19, 18,
    20, 21, 22, 20, 22, 23,
];

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Vector3};

    use super::*;

    fn position(index: u32) -> Vector3<f32> {
        CUBE_VERTICES[index as usize].pos.into()
    }

    #[test]
    fn buffer_sizes() {
        assert_eq!(CUBE_VERTICES.len(), 24);
        assert_eq!(CUBE_INDICES.len(), 36);
        assert_eq!(CUBE_INDICES.chunks(3).count(), 12);
        assert!(CUBE_INDICES.iter().all(|&i| (i as usize) < CUBE_VERTICES.len()));
    }

    #[test]
    fn vertex_layout_is_position_then_uv() {
        let layout = CubeVertex::layout();
        assert_eq!(layout.array_stride, 20);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Float32x3);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[1].format, wgpu::VertexFormat::Float32x2);
        assert_eq!(layout.attributes[1].offset, 12);
    }

    #[test]
    fn every_face_uses_its_own_four_vertices() {
        for (face, indices) in CUBE_INDICES.chunks(6).enumerate() {
            let first = face as u32 * 4;
            assert!(indices.iter().all(|&i| (first..first + 4).contains(&i)));
        }
    }

    #[test]
    fn triangles_wind_outward() {
        // Right-handed cross products of a clockwise-from-outside triangle in the left-handed
        // world point out of the cube, so every normal must face away from the centre.
        for triangle in CUBE_INDICES.chunks(3) {
            let (a, b, c) = (
                position(triangle[0]),
                position(triangle[1]),
                position(triangle[2]),
            );
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(
                normal.dot(centroid) > 0.0,
                "triangle {triangle:?} faces inward"
            );
            assert!((normal.magnitude() - 4.0).abs() < 1e-5);
        }
    }

    #[test]
    fn uvs_stay_in_unit_square() {
        for vertex in CUBE_VERTICES {
            assert!(vertex.uv.iter().all(|c| (0.0..=1.0).contains(c)));
        }
    }
}
