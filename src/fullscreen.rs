//! Full-Screen Triangle Geometry
//!
//! A single oversized triangle whose vertices extend past the viewport,
//! covering clip space exactly once with no diagonal seam — avoiding the
//! double-shaded edge pixels of a naive two-triangle quad. UVs extend to 2.0
//! so the interpolated coordinate spans [0,1] across the visible region.

use wgpu::util::DeviceExt;

/// Vertex format of the full-screen triangle.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    /// Clip-space position
    pub position: [f32; 2],
    /// Texture coordinate
    pub uv: [f32; 2],
}

/// The three vertices of the full-screen triangle.
pub const FULLSCREEN_VERTICES: [QuadVertex; 3] = [
    QuadVertex {
        position: [-1.0, -1.0],
        uv: [0.0, 0.0],
    },
    QuadVertex {
        position: [3.0, -1.0],
        uv: [2.0, 0.0],
    },
    QuadVertex {
        position: [-1.0, 3.0],
        uv: [0.0, 2.0],
    },
];

const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

/// Reusable screen-covering triangle mesh.
///
/// Owns only the vertex buffer. Pipeline and bind-group state (the
/// "material") is bound by the calling pass before
/// [`draw`](FullscreenQuad::draw), so the same geometry serves every
/// full-screen effect without reallocation.
#[derive(Debug)]
pub struct FullscreenQuad {
    vertex_buffer: wgpu::Buffer,
}

impl FullscreenQuad {
    /// Uploads the static triangle geometry.
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Fullscreen Quad Vertices"),
            contents: bytemuck::cast_slice(&FULLSCREEN_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self { vertex_buffer }
    }

    /// Vertex buffer layout matching [`QuadVertex`], for pipeline creation.
    #[must_use]
    pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }

    /// Submits exactly one draw call covering the full viewport.
    ///
    /// The caller must have bound a pipeline (created with
    /// [`vertex_layout`](FullscreenQuad::vertex_layout)) and its bind groups
    /// on `render_pass` beforehand.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..3, 0..1);
    }

    /// Releases the vertex buffer. Drawing afterwards is undefined.
    pub fn dispose(&self) {
        self.vertex_buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2D point-in-triangle via barycentric sign test
    fn covered(p: [f32; 2]) -> bool {
        let [a, b, c] = [
            FULLSCREEN_VERTICES[0].position,
            FULLSCREEN_VERTICES[1].position,
            FULLSCREEN_VERTICES[2].position,
        ];
        let sign = |p1: [f32; 2], p2: [f32; 2], p3: [f32; 2]| {
            (p1[0] - p3[0]) * (p2[1] - p3[1]) - (p2[0] - p3[0]) * (p1[1] - p3[1])
        };
        let d1 = sign(p, a, b);
        let d2 = sign(p, b, c);
        let d3 = sign(p, c, a);
        let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
        let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
        !(has_neg && has_pos)
    }

    #[test]
    fn triangle_covers_entire_clip_space_once() {
        // Sample a grid of NDC points; each must fall inside the single
        // triangle (coverage exactly once follows from it being one
        // primitive).
        for yi in 0..=20 {
            for xi in 0..=20 {
                let p = [
                    -1.0 + 2.0 * (xi as f32) / 20.0,
                    -1.0 + 2.0 * (yi as f32) / 20.0,
                ];
                assert!(covered(p), "NDC point {p:?} not covered");
            }
        }
    }

    #[test]
    fn uv_spans_unit_square_over_viewport() {
        // uv = (position + 1) / 2 must hold at every vertex, so the
        // interpolated uv covers [0,1] exactly across the viewport.
        for v in &FULLSCREEN_VERTICES {
            assert!((v.uv[0] - (v.position[0] + 1.0) / 2.0).abs() < f32::EPSILON);
            assert!((v.uv[1] - (v.position[1] + 1.0) / 2.0).abs() < f32::EPSILON);
        }
    }
}
