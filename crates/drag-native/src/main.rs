use std::time::Instant;

use drag_core::{
    build_demo_scene, orbit_rig, Camera, DragConfig, DragEngine, NodeId, PointerEvent, PointerKey,
    PointerPositions, PointerTracker, Scene, DEMO_RIG_ORBIT_RAD_PER_SEC,
};
use glam::Vec2;
use winit::dpi::PhysicalPosition;
use winit::event::*;
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

const DEMO_SEED: u64 = 42;
const WINDOW_TITLE: &str = "Drag engine (native)";

struct App {
    engine: DragEngine<NodeId, Camera>,
    scene: Scene,
    tracker: PointerTracker,
    started: Instant,
}

impl App {
    fn new(width: u32, height: u32) -> anyhow::Result<Self> {
        let demo = build_demo_scene(DEMO_SEED);
        let mut camera = Camera::default();
        camera.set_aspect(width as f32 / height as f32);

        let mut engine = DragEngine::new(
            width as f32,
            height as f32,
            camera,
            DragConfig::default(),
        )?;
        for &object in &demo.objects {
            engine.add_object(object);
        }
        engine
            .on_drag_start
            .add(|object: &NodeId| log::info!("[demo] picked up {:?}", object));
        engine
            .on_drag_end
            .add(|object: &NodeId| log::info!("[demo] dropped {:?}", object));
        log::info!(
            "[demo] {} objects, viewport {}x{}",
            demo.objects.len(),
            width,
            height
        );

        Ok(Self {
            engine,
            scene: demo.scene,
            tracker: PointerTracker::new(DragConfig::default().max_pointers),
            started: Instant::now(),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        // Minimized windows report 0x0; keep the last usable size.
        if let Err(e) = self.engine.resize(width as f32, height as f32) {
            log::debug!("[viewport] {}", e);
            return;
        }
        self.engine
            .camera_mut()
            .set_aspect(width as f32 / height as f32);
    }

    fn pointer(&mut self, event: Option<PointerEvent>) {
        let Some(event) = event else {
            return;
        };
        if let Err(e) = self.engine.handle_event(&mut self.scene, event) {
            log::warn!("[pointer] {}", e);
        }
    }

    fn mouse_position(&self) -> Vec2 {
        self.tracker
            .position(self.tracker.mouse_id())
            .unwrap_or(Vec2::ZERO)
    }

    fn toggle_pointer_lock(&mut self) -> bool {
        let locked = !self.engine.pointer_lock();
        self.engine.set_pointer_lock(locked);
        log::info!("[keys] pointer lock={}", locked);
        locked
    }

    fn frame(&mut self) {
        let t = self.started.elapsed().as_secs_f32();
        self.engine.camera_mut().rig = orbit_rig(t * DEMO_RIG_ORBIT_RAD_PER_SEC);
        self.engine.update(&mut self.scene, &self.tracker);
        self.scene.update_world_matrices();
    }
}

fn to_px(position: PhysicalPosition<f64>) -> Vec2 {
    Vec2::new(position.x as f32, position.y as f32)
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(WINDOW_TITLE)
        .build(&event_loop)?;
    let size = window.inner_size();
    let mut app = App::new(size.width.max(1), size.height.max(1))?;

    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(size) => app.resize(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => {
                let ev = app.tracker.moved(PointerKey::Mouse, to_px(position));
                app.pointer(ev);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let pos = app.mouse_position();
                let ev = match state {
                    ElementState::Pressed => app.tracker.press(PointerKey::Mouse, pos),
                    ElementState::Released => app.tracker.release(PointerKey::Mouse, pos),
                };
                app.pointer(ev);
            }
            WindowEvent::Touch(touch) => {
                let key = PointerKey::Touch(touch.id);
                let pos = to_px(touch.location);
                let ev = match touch.phase {
                    TouchPhase::Started => app.tracker.press(key, pos),
                    TouchPhase::Moved => app.tracker.moved(key, pos),
                    TouchPhase::Ended | TouchPhase::Cancelled => app.tracker.release(key, pos),
                };
                app.pointer(ev);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match logical_key {
                Key::Named(NamedKey::Escape) => elwt.exit(),
                Key::Character(c) if c.eq_ignore_ascii_case("l") => {
                    let locked = app.toggle_pointer_lock();
                    let title = if locked {
                        format!("{} [pointer lock]", WINDOW_TITLE)
                    } else {
                        WINDOW_TITLE.to_string()
                    };
                    window.set_title(&title);
                }
                _ => {}
            },
            _ => {}
        },
        Event::AboutToWait => {
            app.frame();
            window.request_redraw();
        }
        _ => {}
    })?;
    Ok(())
}
