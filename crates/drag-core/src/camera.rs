//! Camera abstraction used for picking and re-projection.
//!
//! [`Projector`] is the minimal surface the drag engine needs from a camera.
//! [`Camera`] implements it with a right-handed look-at perspective camera that
//! can be mounted on a moving parent ("rig").

use glam::{Mat4, Vec2, Vec3};

use crate::constants::{
    camera_eye_vec3, DEFAULT_FOVY_RADIANS, DEFAULT_ZFAR, DEFAULT_ZNEAR, UNPROJECT_DEPTH,
};
use crate::picking::Ray;

pub trait Projector {
    /// Refresh any cached world transform after the camera or its parent moved.
    /// Implementations that derive everything on demand can leave this empty.
    fn update_world_matrix(&mut self);

    /// Camera origin in world space.
    fn world_position(&self) -> Vec3;

    /// Map a normalized device coordinate point back into world space.
    fn unproject(&self, ndc: Vec3) -> Vec3;

    /// World-space ray from the camera origin through `ndc`.
    fn ray_through(&self, ndc: Vec2) -> Ray {
        let origin = self.world_position();
        let through = self.unproject(ndc.extend(UNPROJECT_DEPTH));
        Ray::new(origin, through - origin)
    }
}

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
    /// World transform of whatever the camera is mounted on.
    pub rig: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::looking_at(camera_eye_vec3(), Vec3::ZERO, 1.0)
    }
}

impl Camera {
    pub fn looking_at(eye: Vec3, target: Vec3, aspect: f32) -> Self {
        Self {
            eye,
            target,
            up: Vec3::Y,
            aspect,
            fovy_radians: DEFAULT_FOVY_RADIANS,
            znear: DEFAULT_ZNEAR,
            zfar: DEFAULT_ZFAR,
            rig: Mat4::IDENTITY,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    /// Compute the view matrix that transforms world to view space, rig included.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up) * self.rig.inverse()
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World point to NDC. Points behind the camera come back with z outside
    /// \[0, 1\].
    pub fn project(&self, world: Vec3) -> Vec3 {
        self.view_projection().project_point3(world)
    }
}

impl Projector for Camera {
    // Derived from the public fields on every call, so nothing can go stale.
    fn update_world_matrix(&mut self) {}

    fn world_position(&self) -> Vec3 {
        self.rig.transform_point3(self.eye)
    }

    fn unproject(&self, ndc: Vec3) -> Vec3 {
        self.view_projection().inverse().project_point3(ndc)
    }
}
