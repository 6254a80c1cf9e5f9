use drag_core::PointerKey;
use glam::Vec2;
use web_sys as web;

/// Pointer position in the canvas backing-store pixel space.
#[inline]
pub fn pointer_canvas_px(ev: &web::PointerEvent, canvas: &web::HtmlCanvasElement) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    let x_css = ev.client_x() as f32 - rect.left() as f32;
    let y_css = ev.client_y() as f32 - rect.top() as f32;
    let w = rect.width() as f32;
    let h = rect.height() as f32;
    if w > 0.0 && h > 0.0 {
        let sx = (x_css / w) * canvas.width() as f32;
        let sy = (y_css / h) * canvas.height() as f32;
        Vec2::new(sx, sy)
    } else {
        Vec2::ZERO
    }
}

#[inline]
pub fn pointer_key(ev: &web::PointerEvent) -> PointerKey {
    let id = ev.pointer_id() as u32 as u64;
    match ev.pointer_type().as_str() {
        "mouse" => PointerKey::Mouse,
        "pen" => PointerKey::Pen(id),
        _ => PointerKey::Touch(id),
    }
}

/// Only the primary mouse button drags; touch and pen contacts always do.
#[inline]
pub fn is_drag_button(pointer_type: &str, button: i16) -> bool {
    pointer_type != "mouse" || button == 0
}
