use nalgebra::{Matrix3, Quaternion, Vector3};
use navci::{utils::check_batch_len, Error, RootState};

/// Rigid transform taking points of a child frame into its parent frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransform {
    rotation: Matrix3<f64>,
    translation: Vector3<f64>,
}

impl FrameTransform {
    /// `orientation` does not need to be normalized.
    pub fn new(orientation: Quaternion<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation: rotation_matrix_from_quaternion(&orientation),
            translation,
        }
    }

    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Transform from the robot body frame to the world frame.
    pub fn from_root_state(state: &RootState) -> Self {
        Self::new(state.orientation, state.position)
    }

    pub fn rotation(&self) -> &Matrix3<f64> {
        &self.rotation
    }

    pub fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }

    pub fn rotate(&self, points: &[Vector3<f64>]) -> Vec<Vector3<f64>> {
        points.iter().map(|p| self.rotation * p).collect()
    }

    pub fn transform_point(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * point + self.translation
    }

    pub fn transform_points(&self, points: &[Vector3<f64>]) -> Vec<Vector3<f64>> {
        points.iter().map(|p| self.transform_point(p)).collect()
    }

    /// Returns `self ∘ child`: points of the child's frame are mapped by
    /// `child` first, then by `self`.
    pub fn compose(&self, child: &FrameTransform) -> FrameTransform {
        FrameTransform {
            rotation: self.rotation * child.rotation,
            translation: self.rotation * child.translation + self.translation,
        }
    }
}

impl Default for FrameTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Rotation matrix of a (w, x, y, z) quaternion, normalized first.
pub fn rotation_matrix_from_quaternion(q: &Quaternion<f64>) -> Matrix3<f64> {
    let q = q.normalize();
    let (w, x, y, z) = (q.w, q.i, q.j, q.k);
    Matrix3::new(
        1.0 - 2.0 * y * y - 2.0 * z * z,
        2.0 * x * y - 2.0 * w * z,
        2.0 * x * z + 2.0 * w * y,
        2.0 * x * y + 2.0 * w * z,
        1.0 - 2.0 * x * x - 2.0 * z * z,
        2.0 * y * z - 2.0 * w * x,
        2.0 * x * z - 2.0 * w * y,
        2.0 * y * z + 2.0 * w * x,
        1.0 - 2.0 * x * x - 2.0 * y * y,
    )
}

/// Applies `transforms[i]` to `point_sets[i]` for every instance.
pub fn transform_batch(
    transforms: &[FrameTransform],
    point_sets: &[Vec<Vector3<f64>>],
) -> Result<Vec<Vec<Vector3<f64>>>, Error> {
    check_batch_len(transforms.len(), point_sets.len())?;
    Ok(transforms
        .iter()
        .zip(point_sets)
        .map(|(t, points)| t.transform_points(points))
        .collect())
}
