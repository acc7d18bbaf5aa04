//! Coordinate axes and ordered Euler angle extraction.

use nalgebra::{Matrix3, Rotation3, Unit, Vector3};
use serde::{Deserialize, Serialize};

/// A coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Parse an axis letter, ignoring case
    #[inline]
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'X' => Some(Axis::X),
            'Y' => Some(Axis::Y),
            'Z' => Some(Axis::Z),
            _ => None,
        }
    }

    #[inline]
    pub fn letter(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
        }
    }

    #[inline]
    pub fn unit(self) -> Unit<Vector3<f64>> {
        match self {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        }
    }
}

/// Decompose `m` into angles (radians) about `seq`, so that
/// `m == R(seq[0], a0) * R(seq[1], a1) * R(seq[2], a2)`.
///
/// `seq` must name three distinct axes. Near gimbal lock the last angle is
/// pinned to zero and the first absorbs the combined rotation.
pub fn euler_from_matrix(m: &Matrix3<f64>, seq: [Axis; 3]) -> [f64; 3] {
    let rotation = Rotation3::from_matrix_unchecked(*m);
    let (angles, _observable) = rotation.euler_angles_ordered(seq.map(Axis::unit), false);
    angles
}
