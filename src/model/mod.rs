// MODEL: Scene graph, scene assembly and camera
pub mod scene;
pub mod aviator;
pub mod camera;

pub use scene::{DrawItem, MeshId, MeshLibrary, Object3D, Transform};
pub use aviator::{Airplane, AviatorScene, Cloud, Sea, Sky};
pub use camera::Camera;
