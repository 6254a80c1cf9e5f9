// Integration tests for the drag engine: acquisition, release and re-projection.

use std::cell::RefCell;
use std::rc::Rc;

use drag_core::*;
use fnv::FnvHashMap;
use glam::{Mat4, Quat, Vec2, Vec3};

const W: f32 = 800.0;
const H: f32 = 600.0;
const CENTER: Vec2 = Vec2::new(400.0, 300.0);

fn camera() -> Camera {
    Camera::looking_at(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), W / H)
}

fn make_engine(config: DragConfig) -> DragEngine<NodeId, Camera> {
    DragEngine::new(W, H, camera(), config).expect("valid viewport")
}

fn sphere(scene: &mut Scene, position: Vec3, radius: f32) -> NodeId {
    scene.spawn(None, position, Some(Collider::Sphere { radius }))
}

fn close(a: Vec3, b: Vec3, tol: f32) -> bool {
    (a - b).length() < tol
}

/// Records every start/end notification as ("start"|"end", object).
fn record_events(engine: &mut DragEngine<NodeId, Camera>) -> Rc<RefCell<Vec<(&'static str, NodeId)>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let starts = log.clone();
    engine
        .on_drag_start
        .add(move |o: &NodeId| starts.borrow_mut().push(("start", *o)));
    let ends = log.clone();
    engine
        .on_drag_end
        .add(move |o: &NodeId| ends.borrow_mut().push(("end", *o)));
    log
}

#[test]
fn construction_fails_without_viewport_size() {
    let err = DragEngine::<NodeId, Camera>::new(0.0, H, camera(), DragConfig::default())
        .err()
        .expect("zero width must fail");
    assert_eq!(err, DragError::EmptyViewport { width: 0.0, height: H });
    assert!(DragEngine::<NodeId, Camera>::new(W, f32::NAN, camera(), DragConfig::default()).is_err());
}

#[test]
fn default_config_matches_documented_values() {
    let config = DragConfig::default();
    assert_eq!(config.max_pointers, 21);
    assert!(config.only_drag_the_top_one);
    assert!(!config.pointer_lock);
    assert_eq!(config.mouse_id, MOUSE_ID);
}

#[test]
fn add_object_is_idempotent_and_remove_by_identity() {
    let mut scene = Scene::new();
    let a = sphere(&mut scene, Vec3::new(0.0, 0.0, -5.0), 0.5);
    let b = sphere(&mut scene, Vec3::new(1.0, 0.0, -5.0), 0.5);
    let mut engine = make_engine(DragConfig::default());
    for _ in 0..3 {
        engine.add_object(a);
    }
    engine.add_object(b);
    assert_eq!(engine.draggable_objects(), &[a, b]);

    engine.remove_object(a);
    engine.remove_object(a);
    assert_eq!(engine.draggable_objects(), &[b]);
}

#[test]
fn miss_leaves_state_untouched_and_silent() {
    let mut scene = Scene::new();
    let cube = scene.spawn(
        None,
        Vec3::new(0.0, 0.0, -10.0),
        Some(Collider::Cuboid { half_extents: Vec3::splat(0.05) }),
    );
    let mut engine = make_engine(DragConfig::default());
    engine.add_object(cube);
    let events = record_events(&mut engine);

    let acquired = engine.pointer_down(&mut scene, Vec2::new(5.0, 5.0), 0).unwrap();
    assert_eq!(acquired, 0);
    assert!(engine.objects_being_dragged().is_empty());
    assert!(engine.dragged_by(0).is_empty());
    assert!(events.borrow().is_empty());
}

#[test]
fn center_pick_of_cube_and_drag_shifts_x() {
    let mut scene = Scene::new();
    let half = 0.05;
    let cube = scene.spawn(
        None,
        Vec3::new(0.0, 0.0, -10.0),
        Some(Collider::Cuboid { half_extents: Vec3::splat(half) }),
    );
    let mut engine = make_engine(DragConfig::default());
    engine.add_object(cube);

    assert_eq!(engine.pointer_down(&mut scene, CENTER, 0).unwrap(), 1);
    let record = engine.dragged_by(0)[0];
    assert_eq!(record.object(), cube);
    assert!((record.distance() - 10.0).abs() <= half + 1e-3);
    assert!(record.drag_offset().length() <= half + 1e-3);

    engine.pointer_drag(&mut scene, Vec2::new(440.0, 300.0), 0).unwrap();
    let pos = scene.node(cube).unwrap().position;

    let fovy = engine.camera().fovy_radians;
    let k = (fovy * 0.5).tan() * (W / H) * (40.0 / 400.0);
    let expected_x = record.distance() * k / (1.0 + k * k).sqrt();
    assert!(pos.x > 0.0);
    assert!((pos.x - expected_x).abs() < 1e-3, "x={} expected={}", pos.x, expected_x);
    assert!(pos.y.abs() < 1e-3);
}

#[test]
fn drag_at_pick_coordinates_is_a_no_op() {
    let mut scene = Scene::new();
    let start = Vec3::new(0.3, -0.2, -8.0);
    let ball = sphere(&mut scene, start, 1.0);
    let mut engine = make_engine(DragConfig::default());
    engine.add_object(ball);

    let screen = Vec2::new(420.0, 310.0);
    assert_eq!(engine.pointer_down(&mut scene, screen, 0).unwrap(), 1);
    engine.pointer_drag(&mut scene, screen, 0).unwrap();
    let pos = scene.node(ball).unwrap().position;
    assert!(close(pos, start, 1e-3), "{pos:?}");
}

#[test]
fn only_top_one_takes_nearest_and_next_pointer_takes_the_rest() {
    let mut scene = Scene::new();
    let far = sphere(&mut scene, Vec3::new(0.0, 0.0, -10.0), 0.5);
    let near = sphere(&mut scene, Vec3::new(0.0, 0.0, -5.0), 0.5);
    let mut engine = make_engine(DragConfig::default());
    engine.add_object(far);
    engine.add_object(near);
    let events = record_events(&mut engine);

    assert_eq!(engine.pointer_down(&mut scene, CENTER, 0).unwrap(), 1);
    assert_eq!(engine.dragged_by(0)[0].object(), near);

    // Second pointer on overlapping geometry skips the held object.
    assert_eq!(engine.pointer_down(&mut scene, CENTER, 1).unwrap(), 1);
    assert_eq!(engine.dragged_by(1)[0].object(), far);
    assert_eq!(engine.objects_being_dragged(), &[near, far]);

    // Nothing left for a third.
    assert_eq!(engine.pointer_down(&mut scene, CENTER, 2).unwrap(), 0);
    assert!(engine.dragged_by(2).is_empty());
    assert_eq!(*events.borrow(), vec![("start", near), ("start", far)]);
}

#[test]
fn multi_pick_acquires_every_hit_nearest_first() {
    let mut scene = Scene::new();
    let far = sphere(&mut scene, Vec3::new(0.0, 0.0, -10.0), 0.5);
    let mid = sphere(&mut scene, Vec3::new(0.0, 0.0, -7.0), 0.5);
    let near = sphere(&mut scene, Vec3::new(0.0, 0.0, -5.0), 0.5);
    let mut engine = make_engine(DragConfig::default().with_only_drag_the_top_one(false));
    for o in [far, mid, near] {
        engine.add_object(o);
    }
    let events = record_events(&mut engine);

    // Pointer 3 grabs the middle one first.
    engine.remove_object(near);
    engine.remove_object(far);
    assert_eq!(engine.pointer_down(&mut scene, CENTER, 3).unwrap(), 1);
    engine.add_object(near);
    engine.add_object(far);

    assert_eq!(engine.pointer_down(&mut scene, CENTER, 0).unwrap(), 2);
    let held: Vec<NodeId> = engine.dragged_by(0).iter().map(|r| r.object()).collect();
    assert_eq!(held, vec![near, far]);
    assert_eq!(
        *events.borrow(),
        vec![("start", mid), ("start", near), ("start", far)]
    );
}

#[test]
fn pointer_up_releases_in_reverse_order() {
    let mut scene = Scene::new();
    let far = sphere(&mut scene, Vec3::new(0.0, 0.0, -10.0), 0.5);
    let near = sphere(&mut scene, Vec3::new(0.0, 0.0, -5.0), 0.5);
    let mut engine = make_engine(DragConfig::default().with_only_drag_the_top_one(false));
    engine.add_object(far);
    engine.add_object(near);
    let events = record_events(&mut engine);

    engine.pointer_down(&mut scene, CENTER, 0).unwrap();
    events.borrow_mut().clear();

    assert_eq!(engine.pointer_up(CENTER, 0).unwrap(), 2);
    assert!(engine.dragged_by(0).is_empty());
    assert!(engine.objects_being_dragged().is_empty());
    assert_eq!(*events.borrow(), vec![("end", far), ("end", near)]);

    // Releasing an idle pointer is harmless.
    assert_eq!(engine.pointer_up(CENTER, 0).unwrap(), 0);
    assert_eq!(events.borrow().len(), 2);
}

#[test]
fn releasing_one_pointer_leaves_the_other_alone() {
    let mut scene = Scene::new();
    let left = sphere(&mut scene, Vec3::new(-2.0, 0.0, -10.0), 0.8);
    let right = sphere(&mut scene, Vec3::new(2.0, 0.0, -10.0), 0.8);
    let mut engine = make_engine(DragConfig::default());
    engine.add_object(left);
    engine.add_object(right);
    let events = record_events(&mut engine);

    let left_px = engine.camera().project(Vec3::new(-2.0, 0.0, -10.0));
    let right_px = engine.camera().project(Vec3::new(2.0, 0.0, -10.0));
    let to_px = |ndc: Vec3| Vec2::new((ndc.x + 1.0) * 0.5 * W, (1.0 - ndc.y) * 0.5 * H);

    assert_eq!(engine.pointer_down(&mut scene, to_px(left_px), 0).unwrap(), 1);
    assert_eq!(engine.pointer_down(&mut scene, to_px(right_px), 1).unwrap(), 1);
    assert_eq!(engine.dragged_by(0)[0].object(), left);
    assert_eq!(engine.dragged_by(1)[0].object(), right);

    engine.pointer_up(to_px(left_px), 0).unwrap();
    assert_eq!(engine.dragged_by(1).len(), 1);
    assert_eq!(engine.objects_being_dragged(), &[right]);
    assert!(engine.is_dragging(right));
    assert!(!engine.is_dragging(left));
    let ends: Vec<NodeId> = events
        .borrow()
        .iter()
        .filter(|(kind, _)| *kind == "end")
        .map(|(_, o)| *o)
        .collect();
    assert_eq!(ends, vec![left]);
}

#[test]
fn pointer_lock_pins_mouse_to_center() {
    let mut scene = Scene::new();
    let start = Vec3::new(0.0, 0.0, -10.0);
    let ball = sphere(&mut scene, start, 0.5);
    let mut engine = make_engine(DragConfig::default().with_pointer_lock(true));
    engine.add_object(ball);

    // A touch pointer at the corner is not affected and misses.
    assert_eq!(engine.pointer_down(&mut scene, Vec2::new(10.0, 10.0), 3).unwrap(), 0);

    // The mouse at the same corner picks through the center.
    assert_eq!(engine.pointer_down(&mut scene, Vec2::new(10.0, 10.0), MOUSE_ID).unwrap(), 1);
    engine
        .pointer_drag(&mut scene, Vec2::new(700.0, 550.0), MOUSE_ID)
        .unwrap();
    assert!(close(scene.node(ball).unwrap().position, start, 1e-3));

    engine.set_pointer_lock(false);
    assert!(!engine.pointer_lock());
    engine
        .pointer_drag(&mut scene, Vec2::new(700.0, 550.0), MOUSE_ID)
        .unwrap();
    assert!(scene.node(ball).unwrap().position.x > 1.0);
}

#[test]
fn out_of_range_pointer_is_rejected_without_side_effects() {
    let mut scene = Scene::new();
    let ball = sphere(&mut scene, Vec3::new(0.0, 0.0, -10.0), 0.5);
    let mut engine = make_engine(DragConfig::default());
    engine.add_object(ball);

    let err = engine.pointer_down(&mut scene, CENTER, 21).unwrap_err();
    assert_eq!(err, DragError::PointerOutOfRange { id: 21, max_pointers: 21 });
    assert!(engine.objects_being_dragged().is_empty());
    assert!(engine.pointer_up(CENTER, 99).is_err());
    assert!(engine.pointer_drag(&mut scene, CENTER, 21).is_err());
}

#[test]
fn update_keeps_object_glued_while_camera_moves() {
    let mut scene = Scene::new();
    let ball = sphere(&mut scene, Vec3::new(0.0, 0.0, -10.0), 0.5);
    let mut engine = make_engine(DragConfig::default());
    engine.add_object(ball);
    engine.pointer_down(&mut scene, CENTER, 0).unwrap();

    engine.camera_mut().rig = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
    let mut positions: FnvHashMap<PointerId, Vec2> = FnvHashMap::default();
    positions.insert(0, CENTER);
    engine.update(&mut scene, &positions);
    assert!(close(
        scene.node(ball).unwrap().position,
        Vec3::new(1.0, 0.0, -10.0),
        1e-3
    ));

    // No known position: nothing moves.
    engine.camera_mut().rig = Mat4::IDENTITY;
    engine.update(&mut scene, &FnvHashMap::<PointerId, Vec2>::default());
    assert!(close(
        scene.node(ball).unwrap().position,
        Vec3::new(1.0, 0.0, -10.0),
        1e-3
    ));
}

#[test]
fn locked_mouse_updates_from_center_without_a_position() {
    let mut scene = Scene::new();
    let ball = sphere(&mut scene, Vec3::new(0.0, 0.0, -10.0), 0.5);
    let mut engine = make_engine(DragConfig::default().with_pointer_lock(true));
    engine.add_object(ball);
    engine.pointer_down(&mut scene, Vec2::ZERO, MOUSE_ID).unwrap();

    engine.camera_mut().rig = Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0));
    engine.update(&mut scene, &FnvHashMap::<PointerId, Vec2>::default());
    assert!(close(
        scene.node(ball).unwrap().position,
        Vec3::new(0.0, 2.0, -10.0),
        1e-3
    ));
}

#[test]
fn drag_offset_lives_in_parent_space() {
    let mut scene = Scene::new();
    let table = scene.spawn(None, Vec3::new(0.0, 0.0, -6.0), None);
    {
        let node = scene.node_mut(table).unwrap();
        node.rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        node.scale = Vec3::splat(2.0);
    }
    let ball = scene.spawn(Some(table), Vec3::ZERO, Some(Collider::Sphere { radius: 0.5 }));
    let mut engine = make_engine(DragConfig::default());
    engine.add_object(ball);

    assert_eq!(engine.pointer_down(&mut scene, CENTER, 0).unwrap(), 1);
    let record = engine.dragged_by(0)[0];
    // World radius is 1, so the hit is 5 units out and half a local unit from the center.
    assert!((record.distance() - 5.0).abs() < 1e-3);
    assert!((record.drag_offset().length() - 0.5).abs() < 1e-3);

    engine.pointer_drag(&mut scene, CENTER, 0).unwrap();
    assert!(close(scene.node(ball).unwrap().position, Vec3::ZERO, 1e-3));

    let screen = Vec2::new(480.0, 260.0);
    engine.pointer_drag(&mut scene, screen, 0).unwrap();
    let ray = engine.camera().ray_through(engine.viewport().to_ndc(screen));
    let world_center = scene.local_to_world(ball, Vec3::ZERO);
    let expected = ray.at(record.distance()) - Vec3::new(0.0, 0.0, 1.0);
    assert!(close(world_center, expected, 1e-3), "{world_center:?} vs {expected:?}");
}

#[test]
fn remove_object_does_not_interrupt_active_drag() {
    let mut scene = Scene::new();
    let ball = sphere(&mut scene, Vec3::new(0.0, 0.0, -10.0), 0.5);
    let mut engine = make_engine(DragConfig::default());
    engine.add_object(ball);
    engine.pointer_down(&mut scene, CENTER, 0).unwrap();
    engine.remove_object(ball);

    assert!(engine.is_dragging(ball));
    engine.pointer_drag(&mut scene, Vec2::new(440.0, 300.0), 0).unwrap();
    assert!(scene.node(ball).unwrap().position.x > 0.0);

    // Released and no longer a candidate.
    engine.pointer_up(CENTER, 0).unwrap();
    assert_eq!(engine.pointer_down(&mut scene, Vec2::new(440.0, 300.0), 0).unwrap(), 0);
}

#[test]
fn release_all_ends_every_drag() {
    let mut scene = Scene::new();
    let far = sphere(&mut scene, Vec3::new(0.0, 0.0, -10.0), 0.5);
    let near = sphere(&mut scene, Vec3::new(0.0, 0.0, -5.0), 0.5);
    let mut engine = make_engine(DragConfig::default());
    engine.add_object(far);
    engine.add_object(near);
    engine.pointer_down(&mut scene, CENTER, 0).unwrap();
    engine.pointer_down(&mut scene, CENTER, 4).unwrap();
    let events = record_events(&mut engine);

    engine.release_all();
    assert!(engine.objects_being_dragged().is_empty());
    assert!(engine.dragged_by(0).is_empty() && engine.dragged_by(4).is_empty());
    assert_eq!(*events.borrow(), vec![("end", near), ("end", far)]);
}

#[test]
fn resize_changes_center_and_rejects_zero() {
    let mut engine = make_engine(DragConfig::default());
    engine.resize(1024.0, 768.0).unwrap();
    assert_eq!(engine.viewport().center(), Vec2::new(512.0, 384.0));
    assert!(engine.resize(0.0, 768.0).is_err());
    assert_eq!(engine.viewport().width(), 1024.0);
}

#[test]
fn tracker_events_drive_the_engine() {
    let mut scene = Scene::new();
    let ball = sphere(&mut scene, Vec3::new(0.0, 0.0, -10.0), 0.5);
    let mut engine = make_engine(DragConfig::default());
    engine.add_object(ball);
    let mut tracker = PointerTracker::default();

    let down = tracker.press(PointerKey::Touch(77), CENTER).unwrap();
    engine.handle_event(&mut scene, down).unwrap();
    assert_eq!(engine.dragged_by(down.id).len(), 1);

    let drag = tracker
        .moved(PointerKey::Touch(77), Vec2::new(440.0, 300.0))
        .unwrap();
    engine.handle_event(&mut scene, drag).unwrap();
    let after_drag = scene.node(ball).unwrap().position;
    assert!(after_drag.x > 0.0);

    // Per-frame update from the tracker's last position keeps it in place.
    engine.update(&mut scene, &tracker);
    assert!(close(scene.node(ball).unwrap().position, after_drag, 1e-4));

    let up = tracker.release(PointerKey::Touch(77), Vec2::new(440.0, 300.0)).unwrap();
    engine.handle_event(&mut scene, up).unwrap();
    assert!(engine.objects_being_dragged().is_empty());
}

#[test]
fn intersections_follow_camera_moved_by_host() {
    let mut scene = Scene::new();
    let ball = sphere(&mut scene, Vec3::new(5.0, 0.0, -10.0), 0.5);
    let mut engine = make_engine(DragConfig::default());
    assert!(engine.intersections(&scene, CENTER, &[ball]).is_empty());

    engine.camera_mut().rig = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
    let hits = engine.intersections(&scene, CENTER, &[ball]);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].object, ball);
    assert!((hits[0].distance - 9.5).abs() < 1e-3);
}

#[test]
fn held_pointer_releases_after_max_pointers_lowered() {
    let mut scene = Scene::new();
    let ball = sphere(&mut scene, Vec3::new(0.0, 0.0, -10.0), 0.5);
    let mut engine = make_engine(DragConfig::default());
    engine.add_object(ball);
    let log = record_events(&mut engine);

    assert_eq!(engine.pointer_down(&mut scene, CENTER, 10).unwrap(), 1);
    engine.config.max_pointers = 5;

    engine
        .pointer_drag(&mut scene, Vec2::new(420.0, 300.0), 10)
        .unwrap();
    assert_eq!(engine.pointer_up(CENTER, 10).unwrap(), 1);
    assert!(!engine.is_dragging(ball));
    assert!(engine.dragged_by(10).is_empty());
    assert_eq!(*log.borrow(), vec![("start", ball), ("end", ball)]);

    // Fresh acquisitions still honour the lowered cap.
    assert!(engine.pointer_down(&mut scene, CENTER, 10).is_err());
    assert_eq!(engine.pointer_down(&mut scene, CENTER, 1).unwrap(), 1);
}
