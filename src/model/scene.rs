//! Minimal scene graph: transforms, nodes, and a shared mesh library

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::utils::Mesh;

/// Position, Euler rotation (XYZ order, radians) and scale of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Default::default() }
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Local matrix: translate * rotate * scale
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.orientation(), self.position)
    }
}

/// Index into a [`MeshLibrary`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

/// Geometry shared between nodes; uploaded to the GPU once
#[derive(Debug, Default)]
pub struct MeshLibrary {
    meshes: Vec<Mesh>,
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    pub fn get(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshId, &Mesh)> {
        self.meshes.iter().enumerate().map(|(i, m)| (MeshId(i), m))
    }
}

/// One mesh to draw with its world matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub mesh: MeshId,
    pub model: Mat4,
}

/// A scene-graph node: a transform, an optional mesh and child nodes
#[derive(Debug, Clone, Default)]
pub struct Object3D {
    pub name: &'static str,
    pub transform: Transform,
    pub mesh: Option<MeshId>,
    pub children: Vec<Object3D>,
}

impl Object3D {
    /// Empty container node
    pub fn group(name: &'static str) -> Self {
        Self { name, ..Default::default() }
    }

    pub fn mesh(name: &'static str, mesh: MeshId, transform: Transform) -> Self {
        Self { name, transform, mesh: Some(mesh), children: Vec::new() }
    }

    /// Append a child and return its index
    pub fn add(&mut self, child: Object3D) -> usize {
        self.children.push(child);
        self.children.len() - 1
    }

    pub fn child(&self, name: &str) -> Option<&Object3D> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Number of nodes carrying a mesh in this subtree
    pub fn mesh_count(&self) -> usize {
        self.mesh.is_some() as usize + self.children.iter().map(Object3D::mesh_count).sum::<usize>()
    }

    /// Depth-first walk emitting a draw per mesh node with its composed world matrix
    pub fn collect_draws(&self, parent: Mat4, out: &mut Vec<DrawItem>) {
        let world = parent * self.transform.matrix();
        if let Some(mesh) = self.mesh {
            out.push(DrawItem { mesh, model: world });
        }
        for child in &self.children {
            child.collect_draws(world, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn assert_vec_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-4, "expected {b:?}, got {a:?}");
    }

    #[test]
    fn test_transform_matrix_order() {
        let t = Transform::from_position(Vec3::new(10.0, 0.0, 0.0))
            .with_rotation(Vec3::new(0.0, 0.0, FRAC_PI_2))
            .with_uniform_scale(2.0);
        // Scale, then rotate +X onto +Y, then translate
        assert_vec_close(t.matrix().transform_point3(Vec3::X), Vec3::new(10.0, 2.0, 0.0));
    }

    #[test]
    fn test_euler_xyz_matches_axis_product() {
        let rotation = Vec3::new(0.3, -1.1, 2.0);
        let t = Transform::default().with_rotation(rotation);
        let expected = Quat::from_rotation_x(rotation.x)
            * Quat::from_rotation_y(rotation.y)
            * Quat::from_rotation_z(rotation.z);
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_vec_close(t.orientation() * p, expected * p);
    }

    #[test]
    fn test_collect_draws_composes_parent_transforms() {
        let mut library = MeshLibrary::new();
        let cube = library.add(crate::utils::create_box_mesh(1.0, 1.0, 1.0, [1.0; 4]));

        let mut root = Object3D::group("root");
        root.transform = Transform::from_position(Vec3::new(0.0, 100.0, 0.0)).with_uniform_scale(0.25);
        let mut child = Object3D::group("child");
        child.transform.position = Vec3::new(40.0, 0.0, 0.0);
        child.add(Object3D::mesh("leaf", cube, Transform::from_position(Vec3::new(8.0, 0.0, 0.0))));
        root.add(child);
        root.add(Object3D::mesh("body", cube, Transform::default()));

        let mut draws = Vec::new();
        root.collect_draws(Mat4::IDENTITY, &mut draws);
        assert_eq!(draws.len(), 2);
        assert_eq!(root.mesh_count(), 2);
        assert_vec_close(draws[0].model.transform_point3(Vec3::ZERO), Vec3::new(12.0, 100.0, 0.0));
        assert_vec_close(draws[1].model.transform_point3(Vec3::ZERO), Vec3::new(0.0, 100.0, 0.0));
        assert!(root.child("child").is_some());
        assert!(root.child("missing").is_none());
    }

    #[test]
    fn test_mesh_library_ids() {
        let mut library = MeshLibrary::new();
        assert!(library.is_empty());
        let a = library.add(crate::utils::Mesh::empty());
        let b = library.add(crate::utils::create_box_mesh(1.0, 2.0, 3.0, [1.0; 4]));
        assert_eq!((a, b), (MeshId(0), MeshId(1)));
        assert_eq!(library.len(), 2);
        assert!(library.get(b).is_some_and(|m| m.triangle_count() == 12));
        assert!(library.get(MeshId(5)).is_none());
        assert_eq!(library.iter().count(), 2);
    }
}
