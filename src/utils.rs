use std::f32::consts::TAU;

use bytemuck::NoUninit;
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, NoUninit)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
        wgpu::VertexAttribute { offset: 0, shader_location: 0, format: wgpu::VertexFormat::Float32x3 },
        wgpu::VertexAttribute { offset: 12, shader_location: 1, format: wgpu::VertexFormat::Float32x3 },
        wgpu::VertexAttribute { offset: 24, shader_location: 2, format: wgpu::VertexFormat::Float32x4 },
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    /// Drawn after opaque meshes, without depth writes
    pub transparent: bool,
}

/// CPU-side triangle list. Every triangle owns its vertices so normals stay per-face.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_transparent(&self) -> bool {
        self.vertices.iter().any(|v| v.color[3] < 1.0)
    }

    /// Add a triangle; winding is flipped if needed so it is CCW seen from `normal`
    pub fn push_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3, normal: Vec3, color: [f32; 4]) {
        let (b, c) = if (b - a).cross(c - a).dot(normal) < 0.0 { (c, b) } else { (b, c) };
        let base = self.vertices.len() as u32;
        for p in [a, b, c] {
            self.vertices.push(Vertex { pos: p.to_array(), normal: normal.to_array(), color });
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    /// Add a planar quad given as a corner loop
    pub fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3, color: [f32; 4]) {
        let [a, b, c, d] = corners;
        let flip = (b - a).cross(c - a).dot(normal) < 0.0;
        let base = self.vertices.len() as u32;
        for p in [a, b, c, d] {
            self.vertices.push(Vertex { pos: p.to_array(), normal: normal.to_array(), color });
        }
        if flip {
            self.indices.extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
        } else {
            self.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }

    /// Bake a transform into the geometry
    pub fn apply_matrix(&mut self, m: Mat4) {
        for v in self.vertices.iter_mut() {
            v.pos = m.transform_point3(Vec3::from(v.pos)).to_array();
            v.normal = m.transform_vector3(Vec3::from(v.normal)).normalize_or_zero().to_array();
        }
    }

    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {

        let vertices = bytemuck::cast_slice(&self.vertices);
        let indices = bytemuck::cast_slice(&self.indices);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: indices,
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
            transparent: self.is_transparent(),
        }
    }
}

/// Flat-shaded box centered at the origin
pub fn create_box_mesh(width: f32, height: f32, depth: f32, color: [f32; 4]) -> Mesh {
    let half = Vec3::new(width, height, depth) * 0.5;
    let mut mesh = Mesh::empty();

    // (normal, u axis, v axis)
    let faces = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Y, Vec3::Z),
        (Vec3::Y, Vec3::X, Vec3::Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::X, Vec3::Y),
    ];
    for (n, u, v) in faces {
        let center = n * half;
        let du = u * half;
        let dv = v * half;
        mesh.push_quad(
            [center - du - dv, center + du - dv, center + du + dv, center - du + dv],
            n,
            color,
        );
    }
    mesh
}

/// Flat-shaded closed cylinder along Y, centered at the origin
pub fn create_cylinder_mesh(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
    height_segments: u32,
    color: [f32; 4],
) -> Mesh {
    let radial = radial_segments.max(3);
    let rows = height_segments.max(1);
    let half_height = height * 0.5;
    let mut mesh = Mesh::empty();

    let ring_point = |i: u32, j: u32| -> Vec3 {
        let t = j as f32 / rows as f32;
        let radius = radius_bottom + (radius_top - radius_bottom) * t;
        let theta = i as f32 / radial as f32 * TAU;
        Vec3::new(radius * theta.sin(), -half_height + height * t, radius * theta.cos())
    };

    for j in 0..rows {
        for i in 0..radial {
            let corners = [ring_point(i, j), ring_point(i + 1, j), ring_point(i + 1, j + 1), ring_point(i, j + 1)];
            let mut normal = (corners[1] - corners[0]).cross(corners[3] - corners[0]).normalize_or_zero();
            let centroid = (corners[0] + corners[1] + corners[2] + corners[3]) * 0.25;
            if normal.dot(Vec3::new(centroid.x, 0.0, centroid.z)) < 0.0 {
                normal = -normal;
            }
            mesh.push_quad(corners, normal, color);
        }
    }

    let top = Vec3::new(0.0, half_height, 0.0);
    let bottom = Vec3::new(0.0, -half_height, 0.0);
    for i in 0..radial {
        if radius_top > 0.0 {
            mesh.push_triangle(top, ring_point(i, rows), ring_point(i + 1, rows), Vec3::Y, color);
        }
        if radius_bottom > 0.0 {
            mesh.push_triangle(bottom, ring_point(i + 1, 0), ring_point(i, 0), Vec3::NEG_Y, color);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

    fn assert_outward_winding(mesh: &Mesh) {
        for tri in mesh.indices.chunks(3) {
            let a = Vec3::from(mesh.vertices[tri[0] as usize].pos);
            let b = Vec3::from(mesh.vertices[tri[1] as usize].pos);
            let c = Vec3::from(mesh.vertices[tri[2] as usize].pos);
            let n = Vec3::from(mesh.vertices[tri[0] as usize].normal);
            assert!((b - a).cross(c - a).dot(n) > 0.0, "triangle {tri:?} winds against its normal");
        }
    }

    #[test]
    fn test_box_mesh() {
        let mesh = create_box_mesh(60.0, 50.0, 50.0, RED);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert_outward_winding(&mesh);

        for v in &mesh.vertices {
            assert!((v.pos[0].abs() - 30.0).abs() < 1e-4);
            assert!((v.pos[1].abs() - 25.0).abs() < 1e-4);
            assert!((v.pos[2].abs() - 25.0).abs() < 1e-4);
            // Face normals point away from the center
            assert!(Vec3::from(v.pos).dot(Vec3::from(v.normal)) > 0.0);
        }
        assert!(!mesh.is_transparent());
    }

    #[test]
    fn test_cylinder_mesh() {
        let mesh = create_cylinder_mesh(600.0, 600.0, 800.0, 40, 10, [0.0, 0.0, 1.0, 0.6]);
        // Side quads plus two cap fans
        assert_eq!(mesh.triangle_count(), 40 * 10 * 2 + 40 * 2);
        assert_eq!(mesh.vertices.len(), 40 * 10 * 4 + 40 * 2 * 3);
        assert_outward_winding(&mesh);
        assert!(mesh.is_transparent());

        for v in &mesh.vertices {
            let radial = (v.pos[0] * v.pos[0] + v.pos[2] * v.pos[2]).sqrt();
            assert!(radial <= 600.0 + 1e-2);
            assert!(v.pos[1].abs() <= 400.0 + 1e-3);
        }
    }

    #[test]
    fn test_apply_matrix_rotates_normals() {
        let mut mesh = create_cylinder_mesh(1.0, 1.0, 2.0, 8, 1, RED);
        mesh.apply_matrix(Mat4::from_rotation_x(-std::f32::consts::FRAC_PI_2));
        // Cap normals that pointed up now point toward -Z
        let top_caps = mesh
            .vertices
            .iter()
            .filter(|v| (Vec3::from(v.normal) - Vec3::NEG_Z).length() < 1e-5)
            .count();
        assert_eq!(top_caps, 8 * 3);
        assert_outward_winding(&mesh);
    }

    #[test]
    fn test_push_quad_fixes_winding() {
        let mut mesh = Mesh::empty();
        // Clockwise loop when seen from +Z
        mesh.push_quad(
            [Vec3::ZERO, Vec3::Y, Vec3::new(1.0, 1.0, 0.0), Vec3::X],
            Vec3::Z,
            RED,
        );
        assert_outward_winding(&mesh);
    }
}
