//! Object transform hierarchy and hit testing.
//!
//! [`SceneGraph`] is what the drag engine needs from a scene. [`Scene`] is a
//! small arena implementation: nodes with a parent link, a local
//! translation/rotation/scale and an optional collider.

use std::fmt::Debug;
use std::hash::Hash;

use glam::{Mat4, Quat, Vec3};

use crate::picking::{ray_aabb, ray_sphere, Hit, Ray};

pub trait SceneGraph {
    /// Handle the engine stores; compared by identity.
    type Object: Copy + Eq + Hash + Debug;

    /// Recompute the cached world matrix used for hit testing.
    fn update_world_matrix(&mut self, object: Self::Object);

    /// Position relative to the object's parent.
    fn position(&self, object: Self::Object) -> Vec3;

    fn set_position(&mut self, object: Self::Object, position: Vec3);

    /// Convert a world point into the local space of the object's parent.
    fn parent_world_to_local(&self, object: Self::Object, point: Vec3) -> Vec3;

    /// Hits of `ray` against `objects`, in any order.
    fn intersect(&self, ray: &Ray, objects: &[Self::Object]) -> Vec<Hit<Self::Object>>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Pickable shape in the node's local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Collider {
    Sphere { radius: f32 },
    Cuboid { half_extents: Vec3 },
}

impl Collider {
    fn local_hit(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        match *self {
            Collider::Sphere { radius } => ray_sphere(origin, dir, Vec3::ZERO, radius),
            Collider::Cuboid { half_extents } => ray_aabb(origin, dir, -half_extents, half_extents),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub collider: Option<Collider>,
    world: Mat4,
}

impl Node {
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// World matrix as of the last refresh.
    pub fn world_matrix(&self) -> Mat4 {
        self.world
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    nodes: Vec<Node>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Parents always precede their children, so index order is a
    /// valid refresh order.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this scene.
    pub fn spawn(
        &mut self,
        parent: Option<NodeId>,
        position: Vec3,
        collider: Option<Collider>,
    ) -> NodeId {
        if let Some(p) = parent {
            assert!(
                p.index() < self.nodes.len(),
                "parent {:?} is not a node of this scene",
                p
            );
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            parent,
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            collider,
            world: Mat4::IDENTITY,
        });
        self.update_world_matrix(id);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// World matrix composed from the current local transforms up the chain.
    /// Identity for ids this scene does not know.
    pub fn compose_world(&self, id: NodeId) -> Mat4 {
        match self.node(id) {
            Some(node) => self.parent_world(id) * node.local_matrix(),
            None => Mat4::IDENTITY,
        }
    }

    /// Live world matrix of the node's parent; identity for roots.
    pub fn parent_world(&self, id: NodeId) -> Mat4 {
        match self.node(id).and_then(|node| node.parent) {
            Some(parent) => self.compose_world(parent),
            None => Mat4::IDENTITY,
        }
    }

    pub fn update_world_matrices(&mut self) {
        for i in 0..self.nodes.len() {
            let world = match self.nodes[i].parent {
                Some(parent) => self.nodes[parent.index()].world * self.nodes[i].local_matrix(),
                None => self.nodes[i].local_matrix(),
            };
            self.nodes[i].world = world;
        }
    }

    pub fn local_to_world(&self, id: NodeId, point: Vec3) -> Vec3 {
        self.compose_world(id).transform_point3(point)
    }

    pub fn world_to_local(&self, id: NodeId, point: Vec3) -> Vec3 {
        self.compose_world(id).inverse().transform_point3(point)
    }
}

impl SceneGraph for Scene {
    type Object = NodeId;

    // Unknown ids are ignored, matching `intersect`.
    fn update_world_matrix(&mut self, object: NodeId) {
        let world = self.compose_world(object);
        if let Some(node) = self.node_mut(object) {
            node.world = world;
        }
    }

    fn position(&self, object: NodeId) -> Vec3 {
        self.node(object).map_or(Vec3::ZERO, |node| node.position)
    }

    fn set_position(&mut self, object: NodeId, position: Vec3) {
        if let Some(node) = self.node_mut(object) {
            node.position = position;
        }
    }

    fn parent_world_to_local(&self, object: NodeId, point: Vec3) -> Vec3 {
        self.parent_world(object).inverse().transform_point3(point)
    }

    fn intersect(&self, ray: &Ray, objects: &[NodeId]) -> Vec<Hit<NodeId>> {
        let mut hits = Vec::new();
        for &object in objects {
            let Some(node) = self.node(object) else {
                continue;
            };
            let Some(collider) = node.collider else {
                continue;
            };
            let inverse = node.world.inverse();
            let local_origin = inverse.transform_point3(ray.origin);
            let local_dir = inverse.transform_vector3(ray.direction).normalize_or_zero();
            if local_dir == Vec3::ZERO {
                continue;
            }
            if let Some(t) = collider.local_hit(local_origin, local_dir) {
                let point = node.world.transform_point3(local_origin + local_dir * t);
                hits.push(Hit {
                    object,
                    distance: point.distance(ray.origin),
                    point,
                });
            }
        }
        hits
    }
}
