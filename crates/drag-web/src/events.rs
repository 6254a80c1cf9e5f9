use crate::{dom, input, WebState};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[derive(Clone)]
pub struct InputWiring {
    pub canvas: web::HtmlCanvasElement,
    pub state: Rc<RefCell<WebState>>,
}

pub fn wire_input_handlers(w: InputWiring) {
    wire_pointerdown(&w);
    wire_pointermove(&w);
    wire_pointerup(&w, "pointerup");
    wire_pointerup(&w, "pointercancel");
}

fn wire_pointerdown(w: &InputWiring) {
    let w = w.clone();
    let canvas_for_listener = w.canvas.clone();

    let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        if !input::is_drag_button(&ev.pointer_type(), ev.button()) {
            return;
        }
        let pos = input::pointer_canvas_px(&ev, &w.canvas);
        let key = input::pointer_key(&ev);
        {
            let mut st = w.state.borrow_mut();
            let event = st.tracker.press(key, pos);
            st.apply(event);
        }
        _ = w.canvas.set_pointer_capture(ev.pointer_id());
        ev.prevent_default();
    }) as Box<dyn FnMut(_)>);
    _ = canvas_for_listener
        .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_pointermove(w: &InputWiring) {
    let w = w.clone();

    let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let pos = input::pointer_canvas_px(&ev, &w.canvas);
        let key = input::pointer_key(&ev);
        let mut st = w.state.borrow_mut();
        let event = st.tracker.moved(key, pos);
        st.apply(event);
    }) as Box<dyn FnMut(_)>);

    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

fn wire_pointerup(w: &InputWiring, event_name: &str) {
    let w = w.clone();
    // Cancels carry no button; they always end the contact.
    let check_button = event_name == "pointerup";

    let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        if check_button && !input::is_drag_button(&ev.pointer_type(), ev.button()) {
            return;
        }
        let pos = input::pointer_canvas_px(&ev, &w.canvas);
        let key = input::pointer_key(&ev);
        {
            let mut st = w.state.borrow_mut();
            let event = st.tracker.release(key, pos);
            st.apply(event);
        }
        ev.prevent_default();
    }) as Box<dyn FnMut(_)>);

    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

/// `l` toggles pointer lock.
pub fn wire_global_keydown(state: &Rc<RefCell<WebState>>) {
    let state = state.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
        if ev.key().eq_ignore_ascii_case("l") {
            let mut st = state.borrow_mut();
            let locked = !st.engine.pointer_lock();
            st.engine.set_pointer_lock(locked);
            log::info!("[keys] pointer lock={}", locked);
        }
    }) as Box<dyn FnMut(_)>);
    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

pub fn wire_canvas_resize(canvas: &web::HtmlCanvasElement, state: &Rc<RefCell<WebState>>) {
    let canvas = canvas.clone();
    let state = state.clone();
    let resize_closure = Closure::wrap(Box::new(move || {
        dom::sync_canvas_backing_size(&canvas);
        state
            .borrow_mut()
            .resize(canvas.width(), canvas.height());
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window
            .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref());
    }
    resize_closure.forget();
}
