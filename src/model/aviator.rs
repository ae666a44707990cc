//! Builders for the sea, the cloudy sky and the airplane

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Mat4, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::{hex_to_rgb, FogConfig, LightConfig, Palette, SceneConfig};
use crate::utils::{create_box_mesh, create_cylinder_mesh};

use super::scene::{DrawItem, MeshId, MeshLibrary, Object3D, Transform};

fn rgba(hex: u32, opacity: f32) -> [f32; 4] {
    let [r, g, b] = hex_to_rgb(hex);
    [r, g, b, opacity]
}

pub struct Sea {
    pub mesh: Object3D,
}

impl Sea {
    pub fn new(library: &mut MeshLibrary, palette: &Palette) -> Self {
        let mut geometry = create_cylinder_mesh(600.0, 600.0, 800.0, 40, 10, rgba(palette.blue, 0.6));
        // Lay the cylinder on its side so rotation.z rolls it like a drum
        geometry.apply_matrix(Mat4::from_rotation_x(-FRAC_PI_2));
        Self {
            mesh: Object3D::mesh("sea", library.add(geometry), Transform::default()),
        }
    }
}

pub struct Cloud {
    pub container: Object3D,
}

impl Cloud {
    /// 3 to 5 randomly placed cubes sharing one white box mesh
    pub fn new<R: Rng>(rng: &mut R, cube: MeshId) -> Self {
        let mut container = Object3D::group("cloud");
        let blocks = rng.gen_range(3..6);
        for i in 0..blocks {
            let y = rng.gen::<f32>() * 10.0;
            let z = rng.gen::<f32>() * 10.0;
            let roll = rng.gen::<f32>() * TAU;
            let yaw = rng.gen::<f32>() * TAU;
            let transform = Transform {
                position: Vec3::new(i as f32 * 15.0, y, z),
                rotation: Vec3::new(0.0, yaw, roll),
                scale: Vec3::splat(0.1 + rng.gen::<f32>() * 0.9),
            };
            container.add(Object3D::mesh("cloud_block", cube, transform));
        }
        Self { container }
    }
}

pub struct Sky {
    pub container: Object3D,
}

impl Sky {
    pub fn new<R: Rng>(rng: &mut R, library: &mut MeshLibrary, palette: &Palette, cloud_count: usize) -> Self {
        let cube = library.add(create_box_mesh(20.0, 20.0, 20.0, rgba(palette.white, 1.0)));
        let mut container = Object3D::group("sky");
        let step_angle = TAU / cloud_count.max(1) as f32;

        for i in 0..cloud_count {
            let mut cloud = Cloud::new(rng, cube);
            let angle = step_angle * i as f32;
            let distance = 750.0 + rng.gen::<f32>() * 200.0;
            let depth = -400.0 - rng.gen::<f32>() * 400.0;
            cloud.container.transform = Transform {
                position: Vec3::new(angle.cos() * distance, angle.sin() * distance, depth),
                rotation: Vec3::new(0.0, 0.0, angle + FRAC_PI_2),
                scale: Vec3::splat(1.0 + rng.gen::<f32>() * 2.0),
            };
            container.add(cloud.container);
        }
        Self { container }
    }

    pub fn cloud_count(&self) -> usize {
        self.container.children.len()
    }
}

pub struct Airplane {
    pub container: Object3D,
    propeller: usize,
}

impl Airplane {
    pub fn new(library: &mut MeshLibrary, palette: &Palette) -> Self {
        let red = rgba(palette.red, 1.0);
        let white = rgba(palette.white, 1.0);

        let mut container = Object3D::group("airplane");
        container.add(Object3D::mesh(
            "cabin",
            library.add(create_box_mesh(60.0, 50.0, 50.0, red)),
            Transform::default(),
        ));
        container.add(Object3D::mesh(
            "engine",
            library.add(create_box_mesh(20.0, 50.0, 50.0, white)),
            Transform::from_position(Vec3::new(40.0, 0.0, 0.0)),
        ));
        container.add(Object3D::mesh(
            "tail",
            library.add(create_box_mesh(15.0, 20.0, 5.0, red)),
            Transform::from_position(Vec3::new(-35.0, 25.0, 0.0)),
        ));
        container.add(Object3D::mesh(
            "wing",
            library.add(create_box_mesh(40.0, 8.0, 150.0, red)),
            Transform::default(),
        ));

        let mut propeller = Object3D::mesh(
            "propeller",
            library.add(create_box_mesh(20.0, 10.0, 10.0, rgba(palette.brown, 1.0))),
            Transform::from_position(Vec3::new(50.0, 0.0, 0.0)),
        );
        propeller.add(Object3D::mesh(
            "blade",
            library.add(create_box_mesh(1.0, 100.0, 20.0, rgba(palette.brown_dark, 1.0))),
            Transform::from_position(Vec3::new(8.0, 0.0, 0.0)),
        ));
        let propeller = container.add(propeller);

        Self { container, propeller }
    }

    pub fn transform(&self) -> &Transform {
        &self.container.transform
    }

    pub fn propeller(&self) -> &Object3D {
        &self.container.children[self.propeller]
    }

    /// Body and propeller transforms, borrowed together for the flight update
    pub fn pose_mut(&mut self) -> (&mut Transform, &mut Transform) {
        let Object3D { transform, children, .. } = &mut self.container;
        (transform, &mut children[self.propeller].transform)
    }
}

/// Everything drawn each frame plus the lighting the renderer needs
pub struct AviatorScene {
    pub meshes: MeshLibrary,
    pub sea: Sea,
    pub sky: Sky,
    pub airplane: Airplane,
    pub fog: FogConfig,
    pub lights: LightConfig,
}

impl AviatorScene {
    pub fn new(config: &SceneConfig, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut meshes = MeshLibrary::new();

        let mut sea = Sea::new(&mut meshes, &config.palette);
        sea.mesh.transform.position.y = config.horizon_y;

        let mut sky = Sky::new(&mut rng, &mut meshes, &config.palette, config.cloud_count);
        sky.container.transform.position.y = config.horizon_y;

        let mut airplane = Airplane::new(&mut meshes, &config.palette);
        airplane.container.transform = Transform::from_position(config.airplane_start)
            .with_uniform_scale(config.airplane_scale);

        let scene = Self {
            meshes,
            sea,
            sky,
            airplane,
            fog: config.fog,
            lights: config.lights,
        };
        tracing::info!(
            seed,
            clouds = scene.sky.cloud_count(),
            meshes = scene.meshes.len(),
            draws = scene.draw_count(),
            "scene assembled"
        );
        scene
    }

    pub fn draw_count(&self) -> usize {
        self.sea.mesh.mesh_count() + self.sky.container.mesh_count() + self.airplane.container.mesh_count()
    }

    pub fn collect_draws(&self) -> Vec<DrawItem> {
        let mut out = Vec::with_capacity(self.draw_count());
        self.sea.mesh.collect_draws(Mat4::IDENTITY, &mut out);
        self.sky.container.collect_draws(Mat4::IDENTITY, &mut out);
        self.airplane.container.collect_draws(Mat4::IDENTITY, &mut out);
        out
    }
}

/// Seed for scene randomness when none is configured
#[cfg(target_arch = "wasm32")]
pub fn default_seed() -> u64 {
    js_sys::Date::now() as u64
}

/// Seed for scene randomness when none is configured
#[cfg(not(target_arch = "wasm32"))]
pub fn default_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5eed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(seed: u64) -> AviatorScene {
        AviatorScene::new(&SceneConfig::default(), seed)
    }

    #[test]
    fn test_same_seed_same_scene() {
        let a = scene(42).collect_draws();
        let b = scene(42).collect_draws();
        assert_eq!(a, b);
        let c = scene(43).collect_draws();
        assert_ne!(a, c);
    }

    #[test]
    fn test_sky_layout() {
        let scene = scene(7);
        assert_eq!(scene.sky.cloud_count(), 20);
        assert_eq!(scene.sky.container.transform.position.y, -600.0);

        let step = TAU / 20.0;
        for (i, cloud) in scene.sky.container.children.iter().enumerate() {
            let t = cloud.transform;
            let distance = (t.position.x * t.position.x + t.position.y * t.position.y).sqrt();
            assert!((750.0 - 1e-2..=950.0 + 1e-2).contains(&distance), "distance {distance}");
            assert!((-800.0..=-400.0).contains(&t.position.z));
            assert!((1.0..=3.0).contains(&t.scale.x));
            assert!((t.rotation.z - (step * i as f32 + FRAC_PI_2)).abs() < 1e-5);

            assert!((3..=5).contains(&cloud.children.len()));
            for (j, block) in cloud.children.iter().enumerate() {
                assert_eq!(block.transform.position.x, j as f32 * 15.0);
                assert!((0.0..=10.0).contains(&block.transform.position.y));
                assert!((0.0..=10.0).contains(&block.transform.position.z));
                assert!((0.1..=1.0).contains(&block.transform.scale.x));
                assert_eq!(block.transform.rotation.x, 0.0);
            }
        }
    }

    #[test]
    fn test_clouds_share_one_mesh() {
        let scene = scene(1);
        let first = scene.sky.container.children[0].children[0].mesh;
        assert!(first.is_some());
        for cloud in &scene.sky.container.children {
            for block in &cloud.children {
                assert_eq!(block.mesh, first);
            }
        }
    }

    #[test]
    fn test_airplane_parts() {
        let scene = scene(0);
        let airplane = &scene.airplane;
        assert_eq!(airplane.transform().position, Vec3::new(0.0, 100.0, 0.0));
        assert_eq!(airplane.transform().scale, Vec3::splat(0.25));
        for name in ["cabin", "engine", "tail", "wing", "propeller"] {
            assert!(airplane.container.child(name).is_some(), "missing {name}");
        }
        assert_eq!(airplane.propeller().name, "propeller");
        assert_eq!(airplane.propeller().transform.position.x, 50.0);
        assert!(airplane.propeller().child("blade").is_some());
        assert_eq!(airplane.container.mesh_count(), 6);
    }

    #[test]
    fn test_pose_mut_reaches_propeller() {
        let mut scene = scene(0);
        {
            let (body, propeller) = scene.airplane.pose_mut();
            body.position.y = 55.0;
            propeller.rotation.x = 3.0;
        }
        assert_eq!(scene.airplane.transform().position.y, 55.0);
        assert_eq!(scene.airplane.propeller().transform.rotation.x, 3.0);
    }

    #[test]
    fn test_sea_is_transparent_drum() {
        let scene = scene(0);
        let id = scene.sea.mesh.mesh.unwrap();
        let mesh = scene.meshes.get(id).unwrap();
        assert!(mesh.is_transparent());
        // After the bake the drum axis runs along Z
        let max_z = mesh.vertices.iter().map(|v| v.pos[2].abs()).fold(0.0, f32::max);
        assert!((max_z - 400.0).abs() < 1e-2);
        assert_eq!(scene.sea.mesh.transform.position.y, -600.0);
    }

    #[test]
    fn test_draw_count_matches_collect() {
        let scene = scene(99);
        let draws = scene.collect_draws();
        assert_eq!(draws.len(), scene.draw_count());
        for draw in &draws {
            assert!(scene.meshes.get(draw.mesh).is_some());
        }
    }
}
