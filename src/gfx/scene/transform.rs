//! Local transforms for scene nodes
//!
//! A [`Transform`] stores position, Euler rotation (in degrees) and per-axis
//! scale. The matrix is rebuilt from those components on demand so keyboard
//! nudges never accumulate floating point drift in a stored matrix.

use cgmath::{Deg, Matrix4, Vector3, Zero};
use serde::Deserialize;

/// Smallest value a scale component may shrink to through [`Transform::scale_uniform`]
pub const MIN_SCALE: f32 = 0.01;

/// One of the three coordinate axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Unit vector along this axis, scaled by `amount`
    pub fn vector(self, amount: f32) -> Vector3<f32> {
        match self {
            Axis::X => Vector3::new(amount, 0.0, 0.0),
            Axis::Y => Vector3::new(0.0, amount, 0.0),
            Axis::Z => Vector3::new(0.0, 0.0, amount),
        }
    }
}

/// Order in which the three Euler rotations are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationOrder {
    /// `T * Rx * Ry * Rz * S`
    #[default]
    Xyz,
    /// `T * Rz * Ry * Rx * S`
    Zyx,
}

/// Position, Euler rotation and scale of a node relative to its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    /// Euler angles in degrees
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Vector3::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn new(position: [f32; 3], rotation: [f32; 3], scale: [f32; 3]) -> Self {
        Self {
            position: position.into(),
            rotation: rotation.into(),
            scale: scale.into(),
        }
    }

    /// Builds the local matrix: translation, then rotation, then scale
    pub fn matrix(&self, order: RotationOrder) -> Matrix4<f32> {
        let t = Matrix4::from_translation(self.position);
        let rx = Matrix4::from_angle_x(Deg(self.rotation.x));
        let ry = Matrix4::from_angle_y(Deg(self.rotation.y));
        let rz = Matrix4::from_angle_z(Deg(self.rotation.z));
        let s = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);

        let r = match order {
            RotationOrder::Xyz => rx * ry * rz,
            RotationOrder::Zyx => rz * ry * rx,
        };
        t * r * s
    }

    /// Moves the node along one axis of its parent's space
    pub fn translate(&mut self, axis: Axis, amount: f32) {
        self.position += axis.vector(amount);
    }

    /// Adds `degrees` to the Euler angle of one axis
    pub fn rotate(&mut self, axis: Axis, degrees: f32) {
        self.rotation += axis.vector(degrees);
    }

    /// Grows or shrinks all three scale components by the same amount
    pub fn scale_uniform(&mut self, delta: f32) {
        self.scale.x = (self.scale.x + delta).max(MIN_SCALE);
        self.scale.y = (self.scale.y + delta).max(MIN_SCALE);
        self.scale.z = (self.scale.z + delta).max(MIN_SCALE);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::{SquareMatrix, Vector4};

    pub(crate) fn assert_matrix_eq(a: Matrix4<f32>, b: Matrix4<f32>) {
        let a: &[f32; 16] = a.as_ref();
        let b: &[f32; 16] = b.as_ref();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-4);
        }
    }

    fn apply(m: Matrix4<f32>, p: [f32; 3]) -> [f32; 3] {
        let v = m * Vector4::new(p[0], p[1], p[2], 1.0);
        [v.x, v.y, v.z]
    }

    #[test]
    fn default_transform_is_identity() {
        let t = Transform::default();
        assert_matrix_eq(t.matrix(RotationOrder::Xyz), Matrix4::identity());
        assert_matrix_eq(t.matrix(RotationOrder::Zyx), Matrix4::identity());
    }

    #[test]
    fn scale_is_applied_before_translation() {
        let t = Transform::new([1.0, 2.0, 3.0], [0.0; 3], [2.0, 2.0, 2.0]);
        let p = apply(t.matrix(RotationOrder::Xyz), [1.0, 0.0, 0.0]);
        assert_relative_eq!(p[0], 3.0, epsilon = 1e-5);
        assert_relative_eq!(p[1], 2.0, epsilon = 1e-5);
        assert_relative_eq!(p[2], 3.0, epsilon = 1e-5);
    }

    #[test]
    fn rotation_order_changes_the_result() {
        let t = Transform::new([0.0; 3], [90.0, 0.0, 90.0], [1.0; 3]);

        // Xyz: z rotation first, then x. (1,0,0) -> (0,1,0) -> (0,0,1)
        let p = apply(t.matrix(RotationOrder::Xyz), [1.0, 0.0, 0.0]);
        assert_relative_eq!(p[0], 0.0, epsilon = 1e-5);
        assert_relative_eq!(p[1], 0.0, epsilon = 1e-5);
        assert_relative_eq!(p[2], 1.0, epsilon = 1e-5);

        // Zyx: x rotation first (no effect on +X), then z. (1,0,0) -> (0,1,0)
        let p = apply(t.matrix(RotationOrder::Zyx), [1.0, 0.0, 0.0]);
        assert_relative_eq!(p[0], 0.0, epsilon = 1e-5);
        assert_relative_eq!(p[1], 1.0, epsilon = 1e-5);
        assert_relative_eq!(p[2], 0.0, epsilon = 1e-5);
    }

    #[test]
    fn nudges_accumulate_per_axis() {
        let mut t = Transform::default();
        t.translate(Axis::Y, 0.2);
        t.translate(Axis::Y, 0.2);
        t.translate(Axis::X, -0.2);
        t.rotate(Axis::Z, 5.0);
        t.rotate(Axis::Z, -2.0);

        assert_relative_eq!(t.position.x, -0.2);
        assert_relative_eq!(t.position.y, 0.4);
        assert_relative_eq!(t.position.z, 0.0);
        assert_relative_eq!(t.rotation.z, 3.0);
    }

    #[test]
    fn uniform_scale_never_collapses() {
        let mut t = Transform::default();
        t.scale_uniform(0.05);
        assert_relative_eq!(t.scale.x, 1.05, epsilon = 1e-6);

        for _ in 0..100 {
            t.scale_uniform(-0.05);
        }
        assert_relative_eq!(t.scale.x, MIN_SCALE);
        assert_relative_eq!(t.scale.y, MIN_SCALE);
        assert_relative_eq!(t.scale.z, MIN_SCALE);
    }
}
