use std::time::Duration;

use eframe::egui::{Pos2, Rect, Vec2, vec2};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::layout::Simulation;
use crate::layout::geometry::{clamp_finite, is_finite, lerp_vec};

/// Affine map from simulation space to screen space, relative to the centre
/// of the viewport rectangle: `screen = center + (x, y) + world * k`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransform {
    pub x: f32,
    pub y: f32,
    pub k: f32,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewportTransform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub fn translation(self) -> Vec2 {
        vec2(self.x, self.y)
    }

    pub fn apply(self, origin: Pos2, world: Vec2) -> Pos2 {
        origin + self.translation() + world * self.k
    }

    pub fn invert(self, origin: Pos2, screen: Pos2) -> Vec2 {
        (screen - origin - self.translation()) / self.k
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub scale_min: f32,
    pub scale_max: f32,
    /// Exponent per scrolled pixel: one wheel step of `delta` multiplies the
    /// scale by `2^(delta * wheel_sensitivity)`.
    pub wheel_sensitivity: f32,
    pub transition_ms: u64,
    /// Screen pixels kept around the graph by "fit".
    pub fit_padding: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            scale_min: 0.05,
            scale_max: 8.0,
            wheel_sensitivity: 0.002,
            transition_ms: 750,
            fit_padding: 40.0,
        }
    }
}

impl ViewportConfig {
    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    fn scale_range(&self) -> (f32, f32) {
        let min = self.scale_min.max(f32::EPSILON);
        (min, self.scale_max.max(min))
    }
}

/// Raw pointer and wheel input, already in screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    PointerDown { position: Pos2 },
    PointerMove { position: Pos2 },
    PointerUp,
    /// Positive `delta` zooms in.
    Wheel { position: Pos2, delta: f32 },
    WheelEnd,
    Enter,
    Leave,
}

/// Cursor affordance shown over the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorState {
    #[default]
    Idle,
    Grab,
    Grabbing,
    Zoom,
}

impl CursorState {
    fn on_gesture(self, gesture: &Gesture, panning: bool) -> Self {
        match gesture {
            Gesture::Enter => Self::Grab,
            Gesture::Leave if panning => self,
            Gesture::Leave => Self::Idle,
            Gesture::PointerDown { .. } => Self::Grabbing,
            Gesture::PointerMove { .. } if panning => Self::Grabbing,
            Gesture::PointerMove { .. } => match self {
                Self::Idle => Self::Grab,
                other => other,
            },
            Gesture::Wheel { .. } => Self::Zoom,
            Gesture::PointerUp | Gesture::WheelEnd => Self::Grab,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct PanState {
    start: Pos2,
    transform_start: ViewportTransform,
}

#[derive(Clone, Copy, Debug)]
struct Transition {
    from: ViewportTransform,
    to: ViewportTransform,
    elapsed: Duration,
    duration: Duration,
}

impl Transition {
    fn sample(&self) -> ViewportTransform {
        let t = if self.duration.is_zero() {
            1.0
        } else {
            (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
        };
        let eased = ease_cubic_in_out(t);
        let translation = lerp_vec(self.from.translation(), self.to.translation(), eased);
        ViewportTransform {
            x: translation.x,
            y: translation.y,
            k: self.from.k + (self.to.k - self.from.k) * eased,
        }
    }

    fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

fn ease_cubic_in_out(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

/// Owns the pan/zoom transform of one canvas.
#[derive(Debug)]
pub struct ViewportController {
    config: ViewportConfig,
    rect: Rect,
    extent: Option<Rect>,
    transform: ViewportTransform,
    pan: Option<PanState>,
    transition: Option<Transition>,
    cursor: CursorState,
    disposed: bool,
}

impl ViewportController {
    pub fn new(config: ViewportConfig, rect: Rect) -> Self {
        Self {
            config,
            rect,
            extent: None,
            transform: ViewportTransform::IDENTITY,
            pan: None,
            transition: None,
            cursor: CursorState::Idle,
            disposed: false,
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ViewportConfig) {
        self.config = config;
        self.transform.k = self.clamp_scale(self.transform.k);
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    /// Screen region in which gestures may start. `None` accepts all.
    pub fn set_extent(&mut self, extent: Option<Rect>) {
        self.extent = extent;
    }

    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn origin(&self) -> Pos2 {
        self.rect.center()
    }

    pub fn to_screen(&self, world: Vec2) -> Pos2 {
        self.transform.apply(self.origin(), world)
    }

    pub fn to_world(&self, screen: Pos2) -> Vec2 {
        self.transform.invert(self.origin(), screen)
    }

    fn clamp_scale(&self, k: f32) -> f32 {
        let (min, max) = self.config.scale_range();
        clamp_finite(k, min, max)
    }

    fn accepts_origin(&self, position: Pos2) -> bool {
        self.extent.is_none_or(|extent| extent.contains(position))
    }

    /// Replaces the transform immediately, cancelling any transition.
    pub fn set_transform(&mut self, transform: ViewportTransform) {
        if self.disposed {
            return;
        }
        self.transition = None;
        self.transform = self.sanitize(transform);
    }

    fn sanitize(&self, transform: ViewportTransform) -> ViewportTransform {
        let translation = if is_finite(transform.translation()) {
            transform.translation()
        } else {
            self.transform.translation()
        };
        ViewportTransform {
            x: translation.x,
            y: translation.y,
            k: self.clamp_scale(transform.k),
        }
    }

    /// Feeds one user gesture through pan/zoom and returns the new transform.
    pub fn apply_gesture(&mut self, gesture: Gesture) -> ViewportTransform {
        if self.disposed {
            trace!(?gesture, "gesture after viewport teardown ignored");
            return self.transform;
        }

        match gesture {
            Gesture::PointerDown { position } => {
                if !self.accepts_origin(position) {
                    return self.transform;
                }
                self.transition = None;
                self.pan = Some(PanState {
                    start: position,
                    transform_start: self.transform,
                });
            }
            Gesture::PointerMove { position } => {
                if let Some(pan) = self.pan {
                    let offset = position - pan.start;
                    self.transform.x = pan.transform_start.x + offset.x;
                    self.transform.y = pan.transform_start.y + offset.y;
                }
            }
            Gesture::PointerUp => {
                self.pan = None;
            }
            Gesture::Wheel { position, delta } => {
                if !self.accepts_origin(position) || !delta.is_finite() {
                    return self.transform;
                }
                self.transition = None;
                self.zoom_around(position, delta);
                // A pan in progress continues from the zoomed transform.
                if self.pan.is_some() {
                    self.pan = Some(PanState {
                        start: position,
                        transform_start: self.transform,
                    });
                }
            }
            Gesture::WheelEnd | Gesture::Enter | Gesture::Leave => {}
        }

        self.cursor = self.cursor.on_gesture(&gesture, self.pan.is_some());
        self.transform
    }

    /// Scales around `pointer`, keeping the world point under it fixed.
    fn zoom_around(&mut self, pointer: Pos2, delta: f32) {
        let anchor = self.to_world(pointer);
        let factor = 2.0_f32.powf(delta * self.config.wheel_sensitivity);
        let k = self.clamp_scale(self.transform.k * factor);
        let translation = pointer - self.origin() - anchor * k;
        self.transform = ViewportTransform {
            x: translation.x,
            y: translation.y,
            k,
        };
    }

    /// Animates toward `target`. A zero duration applies it at once.
    pub fn transition_to(&mut self, target: ViewportTransform, duration: Duration) {
        if self.disposed {
            return;
        }
        let target = self.sanitize(target);
        if duration.is_zero() {
            self.transition = None;
            self.transform = target;
            return;
        }
        self.transition = Some(Transition {
            from: self.transform,
            to: target,
            elapsed: Duration::ZERO,
            duration,
        });
    }

    /// Moves a running transition forward by `dt`. Returns whether one is
    /// still in progress afterwards.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let Some(transition) = self.transition.as_mut() else {
            return false;
        };
        transition.elapsed += dt;
        self.transform = transition.sample();
        if transition.is_finished() {
            self.transition = None;
            return false;
        }
        true
    }

    pub fn cancel_transition(&mut self) {
        self.transition = None;
    }

    /// Puts simulation point `world` at the viewport centre, keeping scale.
    pub fn center_on(&mut self, world: Vec2, duration: Duration) {
        let k = self.transform.k;
        let translation = -world * k;
        self.transition_to(
            ViewportTransform {
                x: translation.x,
                y: translation.y,
                k,
            },
            duration,
        );
    }

    /// Returns false when the simulation has no base node.
    pub fn center_on_base(&mut self, simulation: &Simulation, duration: Duration) -> bool {
        let Some(base) = simulation.base_position().filter(|p| is_finite(*p)) else {
            return false;
        };
        self.center_on(base, duration);
        true
    }

    /// Resets translation to the origin and animates to `scale`.
    pub fn zoom_to(&mut self, scale: f32, duration: Duration) {
        self.transition_to(
            ViewportTransform {
                x: 0.0,
                y: 0.0,
                k: scale,
            },
            duration,
        );
    }

    /// Frames a simulation-space rectangle inside the viewport.
    pub fn fit_bounds(&mut self, bounds: Rect, duration: Duration) {
        let padding = self.config.fit_padding.max(0.0) * 2.0;
        let available = (self.rect.size() - vec2(padding, padding)).max(vec2(1.0, 1.0));
        let size = bounds.size().max(vec2(1.0, 1.0));
        let k = self.clamp_scale((available.x / size.x).min(available.y / size.y));
        let translation = -bounds.center().to_vec2() * k;
        self.transition_to(
            ViewportTransform {
                x: translation.x,
                y: translation.y,
                k,
            },
            duration,
        );
    }

    /// Drops gesture and animation state; later calls are no-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.pan = None;
        self.transition = None;
        self.cursor = CursorState::Idle;
        self.disposed = true;
        debug!("viewport disposed");
    }
}
