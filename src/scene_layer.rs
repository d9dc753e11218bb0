/// Camera of a scene layer, used to convert between screen (canvas) and world
/// coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayerCamera {
    /// Rotation in degrees.
    pub rotation: f64,
    pub zoom: f64,
    pub camera_x: f64,
    pub camera_y: f64,
    /// Half of the viewport width and height.
    pub half_width: f64,
    pub half_height: f64,
}

impl Default for LayerCamera {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            zoom: 1.0,
            camera_x: 0.0,
            camera_y: 0.0,
            half_width: 0.0,
            half_height: 0.0,
        }
    }
}

impl LayerCamera {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            camera_x: width / 2.0,
            camera_y: height / 2.0,
            half_width: width / 2.0,
            half_height: height / 2.0,
            ..Self::default()
        }
    }

    /// Screen position to world position. A zero zoom yields non-finite values.
    pub fn screen_to_world(&self, x: f64, y: f64) -> (f64, f64) {
        let x = (x - self.half_width) / self.zoom.abs();
        let y = (y - self.half_height) / self.zoom.abs();
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        (
            cos * x - sin * y + self.camera_x,
            sin * x + cos * y + self.camera_y,
        )
    }

    /// World position to screen position.
    pub fn world_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        let x = x - self.camera_x;
        let y = y - self.camera_y;
        let (sin, cos) = (-self.rotation).to_radians().sin_cos();
        (
            (cos * x - sin * y) * self.zoom.abs() + self.half_width,
            (sin * x + cos * y) * self.zoom.abs() + self.half_height,
        )
    }
}
