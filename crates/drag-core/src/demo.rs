//! Seeded sample scene shared by the native and web front-ends.

use glam::{Mat4, Quat, Vec3};
use rand::prelude::*;

use crate::constants::{
    DEMO_CUBE_HALF_EXTENT, DEMO_OBJECT_COLORS, DEMO_OBJECT_COUNT, DEMO_SCATTER_RADIUS,
    DEMO_SPHERE_RADIUS, DEMO_TABLE_HEIGHT,
};
use crate::scene::{Collider, NodeId, Scene};

pub struct DemoScene {
    pub scene: Scene,
    /// Parent of every draggable object; rotated so parent-local and world
    /// coordinates differ.
    pub table: NodeId,
    pub objects: Vec<NodeId>,
}

pub fn build_demo_scene(seed: u64) -> DemoScene {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut scene = Scene::new();
    let table = scene.spawn(None, Vec3::new(0.0, DEMO_TABLE_HEIGHT, 0.0), None);
    if let Some(node) = scene.node_mut(table) {
        node.rotation = Quat::from_rotation_y(0.3);
    }

    let r = DEMO_SCATTER_RADIUS;
    let objects = (0..DEMO_OBJECT_COUNT)
        .map(|i| {
            let position = Vec3::new(
                rng.gen_range(-r..r),
                rng.gen_range(0.0..1.0),
                rng.gen_range(-r..r),
            );
            // Alternate shapes so both collider kinds get exercised
            let collider = if i % 2 == 0 {
                Collider::Sphere {
                    radius: DEMO_SPHERE_RADIUS,
                }
            } else {
                Collider::Cuboid {
                    half_extents: Vec3::splat(DEMO_CUBE_HALF_EXTENT),
                }
            };
            scene.spawn(Some(table), position, Some(collider))
        })
        .collect::<Vec<_>>();
    scene.update_world_matrices();

    DemoScene {
        scene,
        table,
        objects,
    }
}

/// Camera rig transform for a slow orbit around the world Y axis.
#[inline]
pub fn orbit_rig(angle_radians: f32) -> Mat4 {
    Mat4::from_rotation_y(angle_radians)
}

#[inline]
pub fn demo_color(index: usize) -> [f32; 3] {
    DEMO_OBJECT_COLORS[index % DEMO_OBJECT_COLORS.len()]
}
