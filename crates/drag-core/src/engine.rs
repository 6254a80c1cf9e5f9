use fnv::FnvHashMap;
use glam::{Vec2, Vec3};
use smallvec::SmallVec;

use crate::camera::Projector;
use crate::constants::{DEFAULT_MAX_POINTERS, MOUSE_ID};
use crate::error::{DragError, Result};
use crate::picking::{sort_hits, Hit, Viewport};
use crate::pointers::{PointerEvent, PointerId, PointerPhase, PointerPositions};
use crate::scene::SceneGraph;
use crate::signal::Signal;

#[derive(Clone, Debug)]
pub struct DragConfig {
    /// Pointer identifiers must be below this.
    pub max_pointers: usize,
    /// A pointer-down acquires only the nearest eligible object.
    pub only_drag_the_top_one: bool,
    /// Pin mouse coordinates to the viewport center (fixed reticle).
    pub pointer_lock: bool,
    pub mouse_id: PointerId,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            max_pointers: DEFAULT_MAX_POINTERS,
            only_drag_the_top_one: true,
            pointer_lock: false,
            mouse_id: MOUSE_ID,
        }
    }
}

impl DragConfig {
    pub fn with_max_pointers(mut self, max_pointers: usize) -> Self {
        self.max_pointers = max_pointers;
        self
    }

    pub fn with_only_drag_the_top_one(mut self, only_top: bool) -> Self {
        self.only_drag_the_top_one = only_top;
        self
    }

    pub fn with_pointer_lock(mut self, locked: bool) -> Self {
        self.pointer_lock = locked;
        self
    }

    pub fn with_mouse_id(mut self, mouse_id: PointerId) -> Self {
        self.mouse_id = mouse_id;
        self
    }
}

/// One object held by one pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragRecord<O> {
    object: O,
    distance: f32,
    drag_offset: Vec3,
}

impl<O: Copy> DragRecord<O> {
    pub fn object(&self) -> O {
        self.object
    }

    /// Camera-to-hit distance at pick time; fixed while the drag lasts.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Hit point minus object position, in the object's parent space.
    pub fn drag_offset(&self) -> Vec3 {
        self.drag_offset
    }
}

type Records<O> = SmallVec<[DragRecord<O>; 1]>;

/// Multi-pointer drag state machine.
///
/// Objects are handles from a [`SceneGraph`]; the scene is passed into every
/// call that reads or moves objects. The camera is held by the engine and may
/// be mutated between calls through [`DragEngine::camera_mut`].
pub struct DragEngine<O, C> {
    pub config: DragConfig,
    pub on_drag_start: Signal<O>,
    pub on_drag_end: Signal<O>,
    camera: C,
    viewport: Viewport,
    draggable_objects: Vec<O>,
    dragged_by_pointer: FnvHashMap<PointerId, Records<O>>,
    objects_being_dragged: Vec<O>,
}

impl<O, C> DragEngine<O, C>
where
    O: Copy + Eq + std::fmt::Debug,
    C: Projector,
{
    pub fn new(width: f32, height: f32, camera: C, config: DragConfig) -> Result<Self> {
        let viewport = Viewport::new(width, height)?;
        log::debug!(
            "[drag] engine {}x{} max_pointers={} only_top={}",
            width,
            height,
            config.max_pointers,
            config.only_drag_the_top_one
        );
        Ok(Self {
            config,
            on_drag_start: Signal::new(),
            on_drag_end: Signal::new(),
            camera,
            viewport,
            draggable_objects: Vec::new(),
            dragged_by_pointer: FnvHashMap::default(),
            objects_being_dragged: Vec::new(),
        })
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut C {
        &mut self.camera
    }

    pub fn set_camera(&mut self, camera: C) {
        self.camera = camera;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Track a new surface size. Existing drags keep their frozen distances.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<()> {
        self.viewport = Viewport::new(width, height)?;
        log::debug!("[viewport] {}x{}", width, height);
        Ok(())
    }

    pub fn add_object(&mut self, object: O) {
        if !self.draggable_objects.contains(&object) {
            self.draggable_objects.push(object);
        }
    }

    /// Stop offering `object` for picking. A drag already in progress continues.
    pub fn remove_object(&mut self, object: O) {
        if let Some(index) = self.draggable_objects.iter().position(|o| *o == object) {
            self.draggable_objects.remove(index);
        }
    }

    pub fn draggable_objects(&self) -> &[O] {
        &self.draggable_objects
    }

    pub fn set_pointer_lock(&mut self, locked: bool) {
        self.config.pointer_lock = locked;
    }

    pub fn pointer_lock(&self) -> bool {
        self.config.pointer_lock
    }

    pub fn dragged_by(&self, id: PointerId) -> &[DragRecord<O>] {
        self.dragged_by_pointer
            .get(&id)
            .map(|records| records.as_slice())
            .unwrap_or(&[])
    }

    pub fn objects_being_dragged(&self) -> &[O] {
        &self.objects_being_dragged
    }

    pub fn is_dragging(&self, object: O) -> bool {
        self.objects_being_dragged.contains(&object)
    }

    /// Hits of a pick ray through pixel `screen` against `objects`, nearest first.
    pub fn intersections<S>(&self, scene: &S, screen: Vec2, objects: &[O]) -> Vec<Hit<O>>
    where
        S: SceneGraph<Object = O>,
    {
        let ray = self.camera.ray_through(self.viewport.to_ndc(screen));
        let mut hits = scene.intersect(&ray, objects);
        sort_hits(&mut hits);
        hits
    }

    /// Acquire draggable objects under the pointer. Returns how many were picked.
    pub fn pointer_down<S>(&mut self, scene: &mut S, screen: Vec2, id: PointerId) -> Result<usize>
    where
        S: SceneGraph<Object = O>,
    {
        self.check_pointer(id)?;
        let screen = self.resolve_screen(screen, id);

        for &object in &self.draggable_objects {
            scene.update_world_matrix(object);
        }
        self.camera.update_world_matrix();

        let hits = self.intersections(scene, screen, &self.draggable_objects);
        let mut acquired = 0;
        for hit in hits {
            if self.objects_being_dragged.contains(&hit.object) {
                continue;
            }
            self.objects_being_dragged.push(hit.object);
            let drag_offset =
                scene.parent_world_to_local(hit.object, hit.point) - scene.position(hit.object);
            self.dragged_by_pointer
                .entry(id)
                .or_default()
                .push(DragRecord {
                    object: hit.object,
                    distance: hit.distance,
                    drag_offset,
                });
            log::info!(
                "[drag] pointer {} begin drag on {:?} at distance {:.3}",
                id,
                hit.object,
                hit.distance
            );
            self.on_drag_start.dispatch(&hit.object);
            acquired += 1;
            if self.config.only_drag_the_top_one {
                break;
            }
        }
        Ok(acquired)
    }

    /// Release everything `id` holds, most recently acquired first.
    pub fn pointer_up(&mut self, screen: Vec2, id: PointerId) -> Result<usize> {
        self.check_held_pointer(id)?;
        let screen = self.resolve_screen(screen, id);
        let Some(records) = self.dragged_by_pointer.remove(&id) else {
            return Ok(0);
        };
        for record in records.iter().rev() {
            if let Some(index) = self
                .objects_being_dragged
                .iter()
                .position(|o| *o == record.object)
            {
                self.objects_being_dragged.remove(index);
            }
            log::info!(
                "[drag] pointer {} end drag on {:?} at ({:.1}, {:.1})",
                id,
                record.object,
                screen.x,
                screen.y
            );
            self.on_drag_end.dispatch(&record.object);
        }
        Ok(records.len())
    }

    /// Move everything `id` holds so it stays under pixel `screen`.
    pub fn pointer_drag<S>(&mut self, scene: &mut S, screen: Vec2, id: PointerId) -> Result<()>
    where
        S: SceneGraph<Object = O>,
    {
        self.check_held_pointer(id)?;
        self.reproject_drag(scene, id, screen);
        Ok(())
    }

    pub fn handle_event<S>(&mut self, scene: &mut S, event: PointerEvent) -> Result<()>
    where
        S: SceneGraph<Object = O>,
    {
        match event.phase {
            PointerPhase::Down => self.pointer_down(scene, event.position, event.id).map(drop),
            PointerPhase::Up => self.pointer_up(event.position, event.id).map(drop),
            PointerPhase::Drag => self.pointer_drag(scene, event.position, event.id),
        }
    }

    /// Per-frame tick: re-project every active drag from the last-known pointer
    /// positions, so held objects follow a moving camera.
    pub fn update<S, P>(&mut self, scene: &mut S, pointers: &P)
    where
        S: SceneGraph<Object = O>,
        P: PointerPositions + ?Sized,
    {
        let mut ids: SmallVec<[PointerId; 4]> = self.dragged_by_pointer.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            let screen = match pointers.position(id) {
                Some(position) => position,
                None if self.is_locked(id) => self.viewport.center(),
                None => continue,
            };
            self.reproject_drag(scene, id, screen);
        }
    }

    /// Drop every drag, notifying drag-end for each held object.
    pub fn release_all(&mut self) {
        let mut ids: SmallVec<[PointerId; 4]> = self.dragged_by_pointer.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            if let Some(records) = self.dragged_by_pointer.remove(&id) {
                for record in records.iter().rev() {
                    self.on_drag_end.dispatch(&record.object);
                }
            }
        }
        self.objects_being_dragged.clear();
    }

    fn reproject_drag<S>(&mut self, scene: &mut S, id: PointerId, screen: Vec2)
    where
        S: SceneGraph<Object = O>,
    {
        let screen = self.resolve_screen(screen, id);
        let Some(records) = self.dragged_by_pointer.get(&id) else {
            return;
        };
        self.camera.update_world_matrix();
        let ray = self.camera.ray_through(self.viewport.to_ndc(screen));
        for record in records {
            let world = ray.at(record.distance);
            let local = scene.parent_world_to_local(record.object, world);
            scene.set_position(record.object, local - record.drag_offset);
            log::trace!("[drag] pointer {} moved {:?} to {:?}", id, record.object, local);
        }
    }

    fn is_locked(&self, id: PointerId) -> bool {
        self.config.pointer_lock && id == self.config.mouse_id
    }

    fn resolve_screen(&self, screen: Vec2, id: PointerId) -> Vec2 {
        if self.is_locked(id) {
            self.viewport.center()
        } else {
            screen
        }
    }

    /// A pointer that already holds records stays valid even if
    /// `config.max_pointers` was lowered after it acquired them.
    fn check_held_pointer(&self, id: PointerId) -> Result<()> {
        if self.dragged_by_pointer.contains_key(&id) {
            return Ok(());
        }
        self.check_pointer(id)
    }

    fn check_pointer(&self, id: PointerId) -> Result<()> {
        if id < self.config.max_pointers {
            Ok(())
        } else {
            Err(DragError::PointerOutOfRange {
                id,
                max_pointers: self.config.max_pointers,
            })
        }
    }
}
