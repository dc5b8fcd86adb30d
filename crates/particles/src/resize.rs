use winit::dpi::PhysicalSize;

use crate::camera::Camera;

/// Keeps the drawable size and the camera aspect in step with the host window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeHandler {
    size: PhysicalSize<u32>,
}

impl ResizeHandler {
    /// Applies the start-up size to `camera`.
    ///
    /// A zero-area start-up size leaves the camera aspect untouched until the
    /// first real resize arrives.
    pub fn new(size: PhysicalSize<u32>, camera: &mut Camera) -> Self {
        if let Some(aspect) = aspect_of(size) {
            camera.set_aspect(aspect);
        }
        Self { size }
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Records a new surface size and updates the camera aspect to exactly
    /// `width / height`.
    ///
    /// Returns the size the surface should be reconfigured to, or `None` when
    /// the event is ignored (zero area, e.g. a minimised window).
    pub fn apply(
        &mut self,
        size: PhysicalSize<u32>,
        camera: &mut Camera,
    ) -> Option<PhysicalSize<u32>> {
        let aspect = aspect_of(size)?;
        camera.set_aspect(aspect);
        self.size = size;
        tracing::debug!(width = size.width, height = size.height, aspect, "surface resized");
        Some(size)
    }
}

fn aspect_of(size: PhysicalSize<u32>) -> Option<f32> {
    if size.width == 0 || size.height == 0 {
        None
    } else {
        Some(size.width as f32 / size.height as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_sets_aspect() {
        let mut camera = Camera::new(20.0);
        let handler = ResizeHandler::new(PhysicalSize::new(1920, 1080), &mut camera);
        assert_eq!(camera.aspect(), 1920.0 / 1080.0);
        assert_eq!(handler.size(), PhysicalSize::new(1920, 1080));
    }

    #[test]
    fn resize_sets_exact_aspect() {
        let mut camera = Camera::new(20.0);
        let mut handler = ResizeHandler::new(PhysicalSize::new(800, 600), &mut camera);
        let applied = handler.apply(PhysicalSize::new(1280, 333), &mut camera);
        assert_eq!(applied, Some(PhysicalSize::new(1280, 333)));
        assert_eq!(camera.aspect(), 1280.0 / 333.0);
    }

    #[test]
    fn zero_area_is_ignored() {
        let mut camera = Camera::new(20.0);
        let mut handler = ResizeHandler::new(PhysicalSize::new(800, 400), &mut camera);
        assert_eq!(handler.apply(PhysicalSize::new(0, 400), &mut camera), None);
        assert_eq!(handler.apply(PhysicalSize::new(800, 0), &mut camera), None);
        assert_eq!(camera.aspect(), 2.0);
        assert_eq!(handler.size(), PhysicalSize::new(800, 400));
    }
}
