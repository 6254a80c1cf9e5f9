use glam::Vec3;

use crate::pointers::PointerId;

// Shared interaction and scene tuning constants used by the engine and both
// front-ends.

// Pointers
pub const DEFAULT_MAX_POINTERS: usize = 21; // mouse + 20 touch/pen contacts
pub const MOUSE_ID: PointerId = 0; // identifier reserved for the mouse stream

// Projection
pub const UNPROJECT_DEPTH: f32 = 0.5; // NDC depth of the point used to build pick rays
pub const RAY_PARALLEL_EPSILON: f32 = 1e-6; // below this a ray component counts as parallel

// Camera defaults
pub const DEFAULT_FOVY_RADIANS: f32 = std::f32::consts::FRAC_PI_4;
pub const DEFAULT_ZNEAR: f32 = 0.1;
pub const DEFAULT_ZFAR: f32 = 100.0;
pub const DEFAULT_CAMERA_EYE: [f32; 3] = [0.0, 3.0, 8.0];

// Demo layout shared by the native and web front-ends
pub const DEMO_OBJECT_COUNT: usize = 6;
pub const DEMO_SCATTER_RADIUS: f32 = 3.0; // half-width of the square objects are scattered in
pub const DEMO_SPHERE_RADIUS: f32 = 0.5;
pub const DEMO_CUBE_HALF_EXTENT: f32 = 0.45;
pub const DEMO_TABLE_HEIGHT: f32 = -0.5; // world Y of the parent node all objects hang off
pub const DEMO_RIG_ORBIT_RAD_PER_SEC: f32 = 0.15; // slow camera orbit to exercise update()

pub const DEMO_OBJECT_COLORS: [[f32; 3]; 3] = [
    [0.9, 0.3, 0.3], // red-ish
    [0.3, 0.9, 0.4], // green-ish
    [0.3, 0.5, 0.9], // blue-ish
];

#[inline]
pub fn camera_eye_vec3() -> Vec3 {
    Vec3::from(DEFAULT_CAMERA_EYE)
}
