//! Scrolling 2D camera.
//!
//! The camera position is the world coordinate of the top-left corner of the
//! visible area. It eases towards an optional target every tick and keeps the
//! previous tick's position so rendering can interpolate between the two.
//! `width`/`height` are in screen pixels, `scaled_*` in world units.

/// Easing divisors towards the target, per axis.
pub const CAMERA_SPEED_X: f32 = 1.75;
pub const CAMERA_SPEED_Y: f32 = 3.25;

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    x: f32,
    y: f32,
    last_x: f32,
    last_y: f32,
    lerp_x: f32,
    lerp_y: f32,
    target: Option<(f32, f32)>,
    width: f32,
    height: f32,
    scaled_width: f32,
    scaled_height: f32,
    scale: f32,
}

impl Camera {
    pub fn new(scale: f32, width: f32, height: f32) -> Self {
        let mut camera = Self {
            x: 0.0,
            y: 0.0,
            last_x: 0.0,
            last_y: 0.0,
            lerp_x: 0.0,
            lerp_y: 0.0,
            target: None,
            width: 0.0,
            height: 0.0,
            scaled_width: 0.0,
            scaled_height: 0.0,
            scale: if scale > 0.0 { scale } else { 1.0 },
        };
        camera.set_size(width, height);
        camera
    }

    /// Remember the current position and ease towards the target.
    pub fn update(&mut self) {
        self.last_x = self.x;
        self.last_y = self.y;

        if let Some((tx, ty)) = self.target {
            self.x += (tx - self.x) / CAMERA_SPEED_X;
            self.y += (ty - self.y) / CAMERA_SPEED_Y;
        }
    }

    /// Interpolate between the previous and current position for rendering.
    pub fn lerp(&mut self, lerp: f32) {
        self.lerp_x = self.last_x + (self.x - self.last_x) * lerp;
        self.lerp_y = self.last_y + (self.y - self.last_y) * lerp;
    }

    /// Aim the camera so that `(x, y)` ends up in the middle of the view.
    pub fn set_target(&mut self, x: f32, y: f32) {
        self.target = Some((x - self.scaled_width / 2.0, y - self.scaled_height / 2.0));
    }

    pub fn clear_target(&mut self) {
        self.target = None;
    }

    /// Jump to `(x, y)` immediately, with no easing and no interpolation.
    pub fn center_on(&mut self, x: f32, y: f32) {
        self.x = x - self.scaled_width / 2.0;
        self.y = y - self.scaled_height / 2.0;
        self.last_x = self.x;
        self.last_y = self.y;
        self.lerp_x = self.x;
        self.lerp_y = self.y;
    }

    /// Resize the view. Sizes are bumped to the next even number to avoid
    /// half-pixel jitter once scaled.
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width + (2.0 - width % 2.0);
        self.height = height + (2.0 - height % 2.0);
        self.scaled_width = self.width / self.scale;
        self.scaled_height = self.height / self.scale;
    }

    pub fn world_to_local(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.lerp_x) * self.scale, (y - self.lerp_y) * self.scale)
    }

    pub fn local_to_world(&self, x: f32, y: f32) -> (f32, f32) {
        (x / self.scale + self.lerp_x, y / self.scale + self.lerp_y)
    }

    /// Whether a screen-space rectangle overlaps the view.
    pub fn contains(&self, x1: f32, y1: f32, x2: f32, y2: f32) -> bool {
        !(x1 > self.width || 0.0 > x2 || y1 > self.height || 0.0 > y2)
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn last_x(&self) -> f32 {
        self.last_x
    }

    pub fn last_y(&self) -> f32 {
        self.last_y
    }

    pub fn lerp_x(&self) -> f32 {
        self.lerp_x
    }

    pub fn lerp_y(&self) -> f32 {
        self.lerp_y
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn scaled_width(&self) -> f32 {
        self.scaled_width
    }

    pub fn scaled_height(&self) -> f32 {
        self.scaled_height
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn size_is_rounded_up_to_next_even_number() {
        let camera = Camera::new(2.0, 639.0, 360.0);
        assert_eq!(camera.width(), 640.0);
        assert_eq!(camera.height(), 362.0);
        assert_eq!(camera.scaled_width(), 320.0);
        assert_eq!(camera.scaled_height(), 181.0);
    }

    #[test]
    fn update_eases_towards_target() {
        let mut camera = Camera::new(1.0, 98.0, 98.0);
        camera.set_target(50.0 + 175.0, 50.0 + 325.0);
        camera.update();
        assert!(approx_eq(camera.x(), 100.0));
        assert!(approx_eq(camera.y(), 100.0));
        assert_eq!(camera.last_x(), 0.0);
    }

    #[test]
    fn update_without_target_stays_put() {
        let mut camera = Camera::new(1.0, 100.0, 100.0);
        camera.center_on(10.0, 10.0);
        camera.update();
        assert!(approx_eq(camera.x(), 10.0 - 51.0));
    }

    #[test]
    fn world_and_local_round_trip() {
        let mut camera = Camera::new(2.0, 640.0, 360.0);
        camera.center_on(500.0, 800.0);
        let (lx, ly) = camera.world_to_local(520.0, 790.0);
        let (wx, wy) = camera.local_to_world(lx, ly);
        assert!(approx_eq(wx, 520.0));
        assert!(approx_eq(wy, 790.0));
    }

    #[test]
    fn lerp_interpolates_between_ticks() {
        let mut camera = Camera::new(1.0, 100.0, 100.0);
        camera.set_target(51.0 + 175.0, 51.0);
        camera.update();
        camera.lerp(0.5);
        assert!(approx_eq(camera.lerp_x(), 50.0));
    }

    #[test]
    fn contains_checks_screen_rectangle() {
        let camera = Camera::new(1.0, 100.0, 100.0);
        assert!(camera.contains(10.0, 10.0, 20.0, 20.0));
        assert!(!camera.contains(200.0, 10.0, 220.0, 20.0));
        assert!(!camera.contains(-30.0, 10.0, -5.0, 20.0));
    }
}
