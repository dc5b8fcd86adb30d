use glam::Vec2;
use winit::dpi::{PhysicalPosition, PhysicalSize};

/// Bounding rectangle of the drawable surface, in the same units as pointer events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceRect {
    /// Rectangle anchored at the origin, as seen by window-relative cursor events.
    pub fn from_size(size: PhysicalSize<u32>) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: size.width as f64,
            height: size.height as f64,
        }
    }
}

/// Maps a pointer position into `[-1, 1]` clip space with y pointing up.
///
/// Returns `None` for a degenerate rectangle. Positions outside the rectangle
/// are not clamped.
pub fn pointer_to_clip(rect: &SurfaceRect, position: PhysicalPosition<f64>) -> Option<Vec2> {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return None;
    }
    let x = (position.x - rect.left) / rect.width * 2.0 - 1.0;
    let y = -((position.y - rect.top) / rect.height * 2.0 - 1.0);
    Some(Vec2::new(x as f32, y as f32))
}

/// Latest pointer position, normalised to clip space.
///
/// Only constructed when hover interaction is enabled; the render step is
/// the sole reader.
#[derive(Debug, Clone)]
pub struct InputTracker {
    rect: SurfaceRect,
    clip: Vec2,
}

impl InputTracker {
    pub fn new(size: PhysicalSize<u32>) -> Self {
        Self {
            rect: SurfaceRect::from_size(size),
            clip: Vec2::ZERO,
        }
    }

    pub fn set_rect(&mut self, rect: SurfaceRect) {
        self.rect = rect;
    }

    pub fn rect(&self) -> SurfaceRect {
        self.rect
    }

    pub fn handle_pointer(&mut self, position: PhysicalPosition<f64>) {
        if let Some(clip) = pointer_to_clip(&self.rect, position) {
            self.clip = clip;
        }
    }

    pub fn clip(&self) -> Vec2 {
        self.clip
    }

    /// Clip-space pointer scaled into the particle cube.
    pub fn mouse_uniform(&self, spread: f32) -> Vec2 {
        self.clip * spread * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> SurfaceRect {
        SurfaceRect {
            left: 100.0,
            top: 50.0,
            width: 800.0,
            height: 400.0,
        }
    }

    #[test]
    fn corners_map_to_clip_extremes() {
        let rect = rect();
        let top_left = pointer_to_clip(&rect, PhysicalPosition::new(100.0, 50.0));
        let bottom_right = pointer_to_clip(&rect, PhysicalPosition::new(900.0, 450.0));
        let centre = pointer_to_clip(&rect, PhysicalPosition::new(500.0, 250.0));
        assert_eq!(top_left, Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(bottom_right, Some(Vec2::new(1.0, -1.0)));
        assert_eq!(centre, Some(Vec2::ZERO));
    }

    #[test]
    fn outside_positions_are_not_clamped() {
        let clip = pointer_to_clip(&rect(), PhysicalPosition::new(1300.0, 50.0));
        assert_eq!(clip, Some(Vec2::new(2.0, 1.0)));
    }

    #[test]
    fn degenerate_rect_keeps_previous_value() {
        let mut tracker = InputTracker::new(PhysicalSize::new(200, 100));
        tracker.handle_pointer(PhysicalPosition::new(200.0, 0.0));
        assert_eq!(tracker.clip(), Vec2::new(1.0, 1.0));

        tracker.set_rect(SurfaceRect::from_size(PhysicalSize::new(0, 0)));
        tracker.handle_pointer(PhysicalPosition::new(10.0, 10.0));
        assert_eq!(tracker.clip(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn mouse_uniform_scales_by_half_spread() {
        let mut tracker = InputTracker::new(PhysicalSize::new(100, 100));
        assert_eq!(tracker.mouse_uniform(15.0), Vec2::ZERO);

        tracker.handle_pointer(PhysicalPosition::new(100.0, 100.0));
        assert_eq!(tracker.mouse_uniform(15.0), Vec2::new(7.5, -7.5));
    }
}
