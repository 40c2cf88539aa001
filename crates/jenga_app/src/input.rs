//! Pointer input
//!
//! Turns raw button and cursor events into orbit drags, wheel zoom and
//! clicks. A press and release count as a click only when the pointer stayed
//! within a few pixels, so orbiting the camera never deletes a block.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Pixels of wheel travel treated as one notch
const PIXELS_PER_NOTCH: f32 = 50.0;

/// What a pointer event means for the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    /// Orbit by a drag delta in pixels
    Drag(Vec2),
    /// Click at a position in pixels
    Click(Vec2),
}

/// Primary-button tracker with click-versus-drag detection
#[derive(Debug, Clone)]
pub struct PointerTracker {
    position: Vec2,
    pressed_at: Option<Vec2>,
    dragging: bool,
    slop: f32,
}

impl PointerTracker {
    /// Tracker treating moves shorter than `slop` pixels as jitter
    pub fn new(slop: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            pressed_at: None,
            dragging: false,
            slop: slop.max(0.0),
        }
    }

    /// Last known pointer position
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed_at.is_some()
    }

    /// Pointer moved to `position`
    pub fn moved(&mut self, position: Vec2) -> Option<PointerAction> {
        let delta = position - self.position;
        self.position = position;

        let pressed_at = self.pressed_at?;
        if !self.dragging && pressed_at.distance(position) >= self.slop {
            self.dragging = true;
        }
        (self.dragging && delta != Vec2::ZERO).then_some(PointerAction::Drag(delta))
    }

    /// Button press or release at the current position
    pub fn button(&mut self, button: MouseButton, state: ElementState) -> Option<PointerAction> {
        if button != MouseButton::Left {
            return None;
        }
        match state {
            ElementState::Pressed => {
                self.pressed_at = Some(self.position);
                self.dragging = false;
                None
            }
            ElementState::Released => {
                let pressed_at = self.pressed_at.take()?;
                let was_drag = self.dragging || pressed_at.distance(self.position) >= self.slop;
                self.dragging = false;
                (!was_drag).then_some(PointerAction::Click(self.position))
            }
        }
    }
}

/// Wheel delta in notches; positive zooms in
pub fn wheel_notches(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_NOTCH,
    }
}

/// Device pixel ratio capped at `max`
pub fn pixel_ratio(scale_factor: f64, max: f32) -> f32 {
    (scale_factor as f32).clamp(f32::MIN_POSITIVE, max.max(f32::MIN_POSITIVE))
}

/// Render target size for a window `logical` pixels large at the capped ratio
pub fn render_size(logical: Vec2, ratio: f32) -> (u32, u32) {
    let physical = (logical * ratio).round();
    (physical.x.max(1.0) as u32, physical.y.max(1.0) as u32)
}
