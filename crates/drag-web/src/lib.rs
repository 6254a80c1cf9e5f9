#![cfg(target_arch = "wasm32")]
use drag_core::{
    build_demo_scene, Camera, DragConfig, DragEngine, NodeId, PointerEvent, PointerTracker, Scene,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

mod dom;
mod events;
mod frame;
mod input;

const CANVAS_ID: &str = "app-canvas";
const DEMO_SEED: u64 = 42;

/// Everything the browser callbacks share.
pub struct WebState {
    pub engine: DragEngine<NodeId, Camera>,
    pub scene: Scene,
    pub tracker: PointerTracker,
    pub objects: Vec<NodeId>,
}

impl WebState {
    pub fn apply(&mut self, event: Option<PointerEvent>) {
        let Some(event) = event else {
            return;
        };
        if let Err(e) = self.engine.handle_event(&mut self.scene, event) {
            log::warn!("[pointer] {}", e);
        }
    }

    /// Follow a new canvas backing size. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        match self.engine.resize(width as f32, height as f32) {
            Ok(()) => self
                .engine
                .camera_mut()
                .set_aspect(width as f32 / height as f32),
            Err(e) => log::debug!("[viewport] {}", e),
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("drag-web starting");

    if let Err(e) = init() {
        log::error!("init error: {:?}", e);
    }
    Ok(())
}

fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", CANVAS_ID))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    dom::sync_canvas_backing_size(&canvas);
    let ctx = canvas
        .get_context("2d")
        .map_err(|e| anyhow::anyhow!("{:?}", e))?
        .ok_or_else(|| anyhow::anyhow!("no 2d context"))?
        .dyn_into::<web::CanvasRenderingContext2d>()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;

    let demo = build_demo_scene(DEMO_SEED);
    let (width, height) = (canvas.width() as f32, canvas.height() as f32);
    let mut camera = Camera::default();
    camera.set_aspect(width / height);
    let config = DragConfig::default();
    let max_pointers = config.max_pointers;

    let mut engine = DragEngine::new(width, height, camera, config)?;
    for &object in &demo.objects {
        engine.add_object(object);
    }
    engine
        .on_drag_start
        .add(|object: &NodeId| log::info!("[demo] picked up {:?}", object));
    engine
        .on_drag_end
        .add(|object: &NodeId| log::info!("[demo] dropped {:?}", object));

    let state = Rc::new(RefCell::new(WebState {
        engine,
        scene: demo.scene,
        tracker: PointerTracker::new(max_pointers),
        objects: demo.objects,
    }));

    events::wire_canvas_resize(&canvas, &state);
    events::wire_input_handlers(events::InputWiring {
        canvas: canvas.clone(),
        state: state.clone(),
    });
    events::wire_global_keydown(&state);
    frame::start_loop(frame::FrameContext::new(canvas, ctx, state));
    Ok(())
}
