use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Z-up camera circling a target at a fixed height
///
/// The eye sits at `target + (distance * sin(angle), distance * cos(angle), height)`
/// and always looks at the target.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    /// Angle around the Z axis in radians
    pub angle: f32,
    /// Horizontal distance from the target
    pub distance: f32,
    /// Eye height above the target
    pub height: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    /// Automatic orbit, radians per second
    pub spin_speed: f32,
    pub spinning: bool,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        let view = Matrix4::look_at_rh(eye, target, self.up);
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(0.0, 15.0, 5.0, Vector3::zero(), 1024.0 / 768.0)
    }
}

impl OrbitCamera {
    pub fn new(angle: f32, distance: f32, height: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            angle,
            distance,
            height,
            eye: Vector3::zero(), // recomputed by `update_eye` below
            target,
            up: Vector3::unit_z(),
            bounds: OrbitCameraBounds::default(),
            spin_speed: 0.3,
            spinning: false,
            aspect,
            fovy: Deg(45.0).into(),
            znear: 0.1,
            zfar: 100.0,
            uniform: CameraUniform::default(),
        };
        camera.set_distance(distance);
        camera
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(self.bounds.min_distance, self.bounds.max_distance);
        self.update_eye();
    }

    pub fn add_distance(&mut self, delta: f32) {
        self.set_distance(self.distance + delta);
    }

    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle.rem_euclid(std::f32::consts::TAU);
        self.update_eye();
    }

    pub fn add_angle(&mut self, delta: f32) {
        self.set_angle(self.angle + delta);
    }

    pub fn set_height(&mut self, height: f32) {
        self.height = height.clamp(self.bounds.min_height, self.bounds.max_height);
        self.update_eye();
    }

    pub fn add_height(&mut self, delta: f32) {
        self.set_height(self.height + delta);
    }

    /// Starts or stops the automatic 360 degree orbit, returning the new state
    pub fn toggle_spin(&mut self) -> bool {
        self.spinning = !self.spinning;
        self.spinning
    }

    /// Advances the automatic orbit by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        if self.spinning {
            self.add_angle(self.spin_speed * dt);
        }
    }

    fn update_eye(&mut self) {
        self.eye = calculate_eye_position(self.angle, self.distance, self.height, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_height: f32,
    pub max_height: f32,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: 1.0,
            max_distance: 60.0,
            min_height: -30.0,
            max_height: 30.0,
        }
    }
}

fn calculate_eye_position(
    angle: f32,
    distance: f32,
    height: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(distance * angle.sin(), distance * angle.cos(), height) + target
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn eye_starts_behind_target_on_y() {
        let camera = OrbitCamera::default();
        assert_relative_eq!(camera.eye.x, 0.0);
        assert_relative_eq!(camera.eye.y, 15.0);
        assert_relative_eq!(camera.eye.z, 5.0);
    }

    #[test]
    fn orbiting_moves_around_z() {
        let mut camera = OrbitCamera::default();
        camera.add_angle(std::f32::consts::FRAC_PI_2);
        assert_relative_eq!(camera.eye.x, 15.0, epsilon = 1e-4);
        assert_relative_eq!(camera.eye.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(camera.eye.z, 5.0);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = OrbitCamera::default();
        for _ in 0..100 {
            camera.add_distance(-0.5);
        }
        assert_relative_eq!(camera.distance, camera.bounds.min_distance);
        camera.add_distance(1000.0);
        assert_relative_eq!(camera.distance, camera.bounds.max_distance);
    }

    #[test]
    fn auto_spin_only_runs_when_enabled() {
        let mut camera = OrbitCamera::default();
        camera.update(1.0);
        assert_relative_eq!(camera.angle, 0.0);

        assert!(camera.toggle_spin());
        camera.update(1.0);
        assert_relative_eq!(camera.angle, camera.spin_speed);

        assert!(!camera.toggle_spin());
    }

    #[test]
    fn target_projects_to_screen_center() {
        let mut camera = OrbitCamera::default();
        camera.add_angle(0.7);
        let clip = camera.build_view_projection_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(clip.x / clip.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(clip.y / clip.w, 0.0, epsilon = 1e-5);
        let depth = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&depth));
    }
}
