use eframe::egui::{Color32, CursorIcon, Painter, Pos2, Rect, Stroke};
use genealogy_graph::view::{CursorState, Emphasis, ViewportTransform};

pub(super) fn draw_background(painter: &Painter, rect: Rect, transform: ViewportTransform) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * transform.k.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + transform.translation();
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let bounds = Rect::from_two_pos(start, end).expand(padding);
    if !bounds.intersects(rect) {
        return false;
    }

    if rect.contains(start) || rect.contains(end) {
        return true;
    }

    let corners = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
    ];
    (0..4).any(|side| segments_intersect(start, end, corners[side], corners[(side + 1) % 4]))
}

fn segments_intersect(a1: Pos2, a2: Pos2, b1: Pos2, b2: Pos2) -> bool {
    fn cross(o: Pos2, a: Pos2, b: Pos2) -> f32 {
        let oa = a - o;
        let ob = b - o;
        (oa.x * ob.y) - (oa.y * ob.x)
    }

    let c1 = cross(a1, a2, b1);
    let c2 = cross(a1, a2, b2);
    let c3 = cross(b1, b2, a1);
    let c4 = cross(b1, b2, a2);

    (c1 <= 0.0 && c2 >= 0.0 || c1 >= 0.0 && c2 <= 0.0)
        && (c3 <= 0.0 && c4 >= 0.0 || c3 >= 0.0 && c4 <= 0.0)
}

pub(super) fn node_outline(emphasis: Emphasis) -> Stroke {
    match emphasis {
        Emphasis::Selected => Stroke::new(2.4, Color32::from_rgb(245, 206, 93)),
        Emphasis::Path => Stroke::new(1.8, Color32::from_rgba_unmultiplied(15, 15, 15, 210)),
        Emphasis::Match => Stroke::new(1.55, Color32::from_rgba_unmultiplied(15, 15, 15, 200)),
        Emphasis::Dimmed => Stroke::new(0.8, Color32::from_rgba_unmultiplied(15, 15, 15, 90)),
        Emphasis::Normal | Emphasis::Direct => {
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190))
        }
    }
}

pub(super) fn cursor_icon(cursor: CursorState) -> CursorIcon {
    match cursor {
        CursorState::Idle => CursorIcon::Default,
        CursorState::Grab => CursorIcon::Grab,
        CursorState::Grabbing => CursorIcon::Grabbing,
        CursorState::Zoom => CursorIcon::ZoomIn,
    }
}
