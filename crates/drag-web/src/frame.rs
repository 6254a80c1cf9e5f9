use crate::WebState;
use drag_core::{
    demo_color, orbit_rig, Collider, Projector, DEMO_RIG_ORBIT_RAD_PER_SEC,
};
use glam::Vec3;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

// Color adjustments
const DRAG_BRIGHTEN: f32 = 1.4;
const BACKGROUND: &str = "#101018";

pub struct FrameContext {
    pub canvas: web::HtmlCanvasElement,
    pub ctx: web::CanvasRenderingContext2d,
    pub state: Rc<RefCell<WebState>>,
    pub started_ms: f64,
}

impl FrameContext {
    pub fn new(
        canvas: web::HtmlCanvasElement,
        ctx: web::CanvasRenderingContext2d,
        state: Rc<RefCell<WebState>>,
    ) -> Self {
        Self {
            canvas,
            ctx,
            state,
            started_ms: js_sys::Date::now(),
        }
    }

    pub fn frame(&mut self) {
        let t = ((js_sys::Date::now() - self.started_ms) / 1000.0) as f32;
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        st.engine.camera_mut().rig = orbit_rig(t * DEMO_RIG_ORBIT_RAD_PER_SEC);
        st.engine.update(&mut st.scene, &st.tracker);
        st.scene.update_world_matrices();
        self.draw(st);
    }

    fn draw(&self, st: &WebState) {
        let w = self.canvas.width() as f64;
        let h = self.canvas.height() as f64;
        self.ctx.set_fill_style_str(BACKGROUND);
        self.ctx.fill_rect(0.0, 0.0, w, h);

        let camera = st.engine.camera();
        let eye = camera.world_position();
        let focal_px = (h * 0.5) as f32 / (camera.fovy_radians * 0.5).tan();

        // Painter's order: far objects first
        let mut order: Vec<(usize, f32)> = st
            .objects
            .iter()
            .enumerate()
            .map(|(i, &o)| (i, st.scene.local_to_world(o, Vec3::ZERO).distance(eye)))
            .collect();
        order.sort_by(|a, b| b.1.total_cmp(&a.1));

        for (i, depth) in order {
            let object = st.objects[i];
            let Some(node) = st.scene.node(object) else {
                continue;
            };
            let ndc = camera.project(st.scene.local_to_world(object, Vec3::ZERO));
            if !(0.0..=1.0).contains(&ndc.z) {
                continue;
            }
            let x = ((ndc.x + 1.0) * 0.5) as f64 * w;
            let y = ((1.0 - ndc.y) * 0.5) as f64 * h;
            let scale = node.scale.max_element() * focal_px / depth.max(1e-3);

            let mut rgb = demo_color(i);
            if st.engine.is_dragging(object) {
                for c in rgb.iter_mut() {
                    *c = (*c * DRAG_BRIGHTEN).min(1.0);
                }
            }
            let fill = format!(
                "rgb({}, {}, {})",
                (rgb[0] * 255.0) as u8,
                (rgb[1] * 255.0) as u8,
                (rgb[2] * 255.0) as u8
            );
            self.ctx.set_fill_style_str(&fill);

            match node.collider {
                Some(Collider::Sphere { radius }) => {
                    let r = (radius * scale) as f64;
                    self.ctx.begin_path();
                    _ = self.ctx.arc(x, y, r, 0.0, std::f64::consts::TAU);
                    self.ctx.fill();
                }
                Some(Collider::Cuboid { half_extents }) => {
                    let hw = (half_extents.x * scale) as f64;
                    let hh = (half_extents.y * scale) as f64;
                    self.ctx.fill_rect(x - hw, y - hh, hw * 2.0, hh * 2.0);
                }
                None => {}
            }
        }

        if st.engine.pointer_lock() {
            let c = st.engine.viewport().center();
            self.ctx.set_fill_style_str("white");
            self.ctx
                .fill_rect(c.x as f64 - 2.0, c.y as f64 - 2.0, 4.0, 4.0);
        }
    }
}

pub fn start_loop(frame_ctx: FrameContext) {
    let frame_ctx = Rc::new(RefCell::new(frame_ctx));
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        if let Some(w) = web::window() {
            if let Some(cb) = tick_clone.borrow().as_ref() {
                _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
            }
        }
    }) as Box<dyn FnMut()>));
    if let Some(w) = web::window() {
        if let Some(cb) = tick.borrow().as_ref() {
            _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }
}
