use eframe::egui::{Pos2, Rect, Vec2, vec2};

/// Distances below this are treated as coincident.
pub const MIN_DISTANCE: f32 = 1e-3;

/// Linear congruential generator with the constants of Numerical Recipes.
/// Small, seedable, and identical across platforms, which is all the layout
/// needs for tie-breaking jitter.
#[derive(Clone, Debug)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    const A: u32 = 1_664_525;
    const C: u32 = 1_013_904_223;

    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        self.state = self.state.wrapping_mul(Self::A).wrapping_add(Self::C);
        (self.state as f64 / 4_294_967_296.0) as f32
    }

    /// Tiny non-zero offset used to separate coincident points.
    pub fn jiggle(&mut self) -> f32 {
        let value = (self.next_f32() - 0.5) * 1e-6;
        if value == 0.0 { 1e-7 } else { value }
    }
}

pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Replaces zero components with jitter so a direction can be derived.
pub fn separate_coincident(mut delta: Vec2, rng: &mut Lcg) -> Vec2 {
    if delta.x == 0.0 {
        delta.x = rng.jiggle();
    }
    if delta.y == 0.0 {
        delta.y = rng.jiggle();
    }
    delta
}

/// `value` clamped into `[min, max]`; NaN maps to `min`.
pub fn clamp_finite(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

pub fn lerp_vec(from: Vec2, to: Vec2, t: f32) -> Vec2 {
    from + (to - from) * t
}

pub fn is_finite(point: Vec2) -> bool {
    point.x.is_finite() && point.y.is_finite()
}

/// Bounding box of circles; `None` when there are no finite points.
pub fn bounds_of(circles: impl IntoIterator<Item = (Vec2, f32)>) -> Option<Rect> {
    let mut min = vec2(f32::INFINITY, f32::INFINITY);
    let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);

    for (center, radius) in circles {
        if !is_finite(center) {
            continue;
        }
        min.x = min.x.min(center.x - radius);
        min.y = min.y.min(center.y - radius);
        max.x = max.x.max(center.x + radius);
        max.y = max.y.max(center.y + radius);
    }

    if !min.x.is_finite() || !max.x.is_finite() {
        return None;
    }

    Some(Rect::from_min_max(Pos2::new(min.x, min.y), Pos2::new(max.x, max.y)))
}

/// Perpendicular distance from `point` to the line through `a` and `b`.
pub fn distance_to_line(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let line = b - a;
    let length = line.length();
    if length < MIN_DISTANCE {
        return distance(point, a);
    }
    let offset = point - a;
    ((line.x * offset.y) - (line.y * offset.x)).abs() / length
}
