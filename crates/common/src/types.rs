use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Unique identifier for an entity.
///
/// Ids are handed out sequentially by the component store, so ordering by id
/// is ordering by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Slot index, used for display labels.
    pub fn index(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("transform matrix is not invertible (determinant {0})")]
    Singular(f32),
}

/// World-space affine transform of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Mat4", into = "Mat4")]
pub struct Transform {
    matrix: Mat4,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        matrix: Mat4::IDENTITY,
    };

    /// Wrap a matrix, rejecting singular ones.
    pub fn new(matrix: Mat4) -> Result<Self, TransformError> {
        let det = matrix.determinant();
        if det == 0.0 || !det.is_finite() {
            return Err(TransformError::Singular(det));
        }
        Ok(Self { matrix })
    }

    /// Non-finite translation components are replaced by zero.
    pub fn from_translation(translation: Vec3) -> Self {
        Self::checked(Mat4::from_translation(finite_translation(translation)))
    }

    /// Translation and scale, composed as `translate * scale`.
    ///
    /// Scale components are clamped into `[MIN_SCALE, MAX_SCALE]` by magnitude
    /// (NaN becomes 1) so the result stays invertible.
    pub fn from_translation_scale(translation: Vec3, scale: Vec3) -> Self {
        Self::checked(
            Mat4::from_translation(finite_translation(translation))
                * Mat4::from_scale(clamp_scale(scale)),
        )
    }

    /// A non-finite or zero rotation is treated as identity.
    pub fn from_scale_rotation_translation(
        scale: Vec3,
        rotation: Quat,
        translation: Vec3,
    ) -> Self {
        let rotation = if rotation.is_finite() && rotation.length_squared() > 0.0 {
            rotation.normalize()
        } else {
            Quat::IDENTITY
        };
        Self::checked(Mat4::from_scale_rotation_translation(
            clamp_scale(scale),
            rotation,
            finite_translation(translation),
        ))
    }

    fn checked(matrix: Mat4) -> Self {
        debug_assert!(
            Self::new(matrix).is_ok(),
            "sanitized transform is singular: {matrix}"
        );
        Self { matrix }
    }

    /// The world matrix.
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    pub fn set_matrix(&mut self, matrix: Mat4) -> Result<(), TransformError> {
        *self = Self::new(matrix)?;
        Ok(())
    }

    /// Translation part of the world matrix.
    pub fn position(&self) -> Vec3 {
        self.matrix.w_axis.truncate()
    }

    /// Inverse of the world matrix. Used as a view matrix for cameras.
    pub fn inverse(&self) -> Mat4 {
        self.matrix.inverse()
    }

    /// Split into scale, rotation and translation.
    pub fn decompose(&self) -> (Vec3, Quat, Vec3) {
        self.matrix.to_scale_rotation_translation()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TryFrom<Mat4> for Transform {
    type Error = TransformError;

    fn try_from(matrix: Mat4) -> Result<Self, Self::Error> {
        Self::new(matrix)
    }
}

impl From<Transform> for Mat4 {
    fn from(transform: Transform) -> Self {
        transform.matrix
    }
}

/// Smallest scale magnitude a constructed transform accepts.
pub const MIN_SCALE: f32 = 1e-6;
/// Largest scale magnitude; three of these multiply to a finite determinant.
pub const MAX_SCALE: f32 = 1e12;

fn clamp_scale(scale: Vec3) -> Vec3 {
    let clamp = |s: f32| {
        if s.is_nan() {
            1.0
        } else {
            s.signum() * s.abs().clamp(MIN_SCALE, MAX_SCALE)
        }
    };
    Vec3::new(clamp(scale.x), clamp(scale.y), clamp(scale.z))
}

fn finite_translation(translation: Vec3) -> Vec3 {
    let finite = |t: f32| if t.is_finite() { t } else { 0.0 };
    Vec3::new(
        finite(translation.x),
        finite(translation.y),
        finite(translation.z),
    )
}
