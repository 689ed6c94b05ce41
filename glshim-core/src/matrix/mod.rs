//! 4x4 matrix primitives for the fixed-function transform pipeline.
//!
//! Matrices are stored column-major as flat `[f32; 16]` arrays, the same
//! layout `glLoadMatrixf` expects, so they can be handed to the driver
//! without conversion. Element `(row, col)` lives at index `col * 4 + row`.

pub mod stack;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::ops::{Mul, MulAssign};

pub use stack::MatrixStack;

/// Identity 4x4 matrix in column-major order.
const IDENTITY_4X4: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// A column-major 4x4 float matrix.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Matrix(pub [f32; 16]);

impl Matrix {
    pub const IDENTITY: Matrix = Matrix(IDENTITY_4X4);

    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    pub const fn from_cols_array(m: [f32; 16]) -> Self {
        Self(m)
    }

    /// Narrow a double-precision matrix (`glLoadMatrixd` / `glMultMatrixd`).
    pub fn from_f64(m: &[f64; 16]) -> Self {
        let mut out = [0.0f32; 16];
        for (dst, src) in out.iter_mut().zip(m.iter()) {
            *dst = *src as f32;
        }
        Self(out)
    }

    /// Build from a row-major array (`glLoadTransposeMatrixf`).
    pub fn from_rows_array(m: [f32; 16]) -> Self {
        Self(m).transpose()
    }

    /// Plain float view handed to the driver.
    pub fn as_array(&self) -> &[f32; 16] {
        bytemuck::cast_ref(self)
    }

    /// Element at `row`, `col`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.0[col * 4 + row]
    }

    /// Exact comparison against identity. No epsilon: a matrix that is
    /// only approximately identity still takes the full upload path.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.0 == IDENTITY_4X4
    }

    pub fn transpose(&self) -> Self {
        let mut out = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[row * 4 + col] = self.0[col * 4 + row];
            }
        }
        Self(out)
    }

    /// Standard product `self × rhs`.
    ///
    /// The result is accumulated in a temporary, so callers may write it
    /// back into either operand.
    pub fn multiply(&self, rhs: &Matrix) -> Matrix {
        let a = &self.0;
        let b = &rhs.0;
        let mut out = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = a[row] * b[col * 4]
                    + a[4 + row] * b[col * 4 + 1]
                    + a[8 + row] * b[col * 4 + 2]
                    + a[12 + row] * b[col * 4 + 3];
            }
        }
        Matrix(out)
    }

    // -- Fixed-function constructors -------------------------------------

    /// `glTranslatef` matrix.
    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        let mut m = IDENTITY_4X4;
        m[12] = x;
        m[13] = y;
        m[14] = z;
        Self(m)
    }

    /// `glScalef` matrix.
    pub fn scale(x: f32, y: f32, z: f32) -> Self {
        let mut m = [0.0f32; 16];
        m[0] = x;
        m[5] = y;
        m[10] = z;
        m[15] = 1.0;
        Self(m)
    }

    /// `glRotatef` matrix for a rotation of `angle` degrees about `(x, y, z)`.
    ///
    /// Returns `None` when the axis has zero length or the angle is zero;
    /// the legacy call leaves the current matrix untouched in that case, so
    /// the caller must skip the multiply rather than apply a degenerate matrix.
    pub fn rotation(angle: f32, x: f32, y: f32, z: f32) -> Option<Self> {
        if (x == 0.0 && y == 0.0 && z == 0.0) || angle == 0.0 {
            return None;
        }

        let inv_len = 1.0 / (x * x + y * y + z * z).sqrt();
        let (x, y, z) = (x * inv_len, y * inv_len, z * inv_len);

        let radians = angle.to_radians();
        let s = radians.sin();
        let c = radians.cos();
        let c1 = 1.0 - c;

        let mut m = [0.0f32; 16];
        // Column 0
        m[0] = x * x * c1 + c;
        m[1] = y * x * c1 + z * s;
        m[2] = x * z * c1 - y * s;
        // Column 1
        m[4] = x * y * c1 - z * s;
        m[5] = y * y * c1 + c;
        m[6] = y * z * c1 + x * s;
        // Column 2
        m[8] = x * z * c1 + y * s;
        m[9] = y * z * c1 - x * s;
        m[10] = z * z * c1 + c;

        m[15] = 1.0;
        Some(Self(m))
    }

    /// `glOrthof` matrix. Inputs are not validated; `left == right` and
    /// friends produce non-finite entries exactly as the legacy call does.
    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let mut m = [0.0f32; 16];
        m[0] = 2.0 / (right - left);
        m[5] = 2.0 / (top - bottom);
        m[10] = -2.0 / (far - near);
        m[12] = -(right + left) / (right - left);
        m[13] = -(top + bottom) / (top - bottom);
        m[14] = -(far + near) / (far - near);
        m[15] = 1.0;
        Self(m)
    }

    /// `glFrustumf` matrix. Inputs are not validated.
    pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let mut m = [0.0f32; 16];
        m[0] = 2.0 * near / (right - left);
        m[5] = 2.0 * near / (top - bottom);
        m[8] = (right + left) / (right - left);
        m[9] = (top + bottom) / (top - bottom);
        m[10] = -(far + near) / (far - near);
        m[11] = -1.0;
        m[14] = -2.0 * far * near / (far - near);
        Self(m)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Matrix) -> Matrix {
        self.multiply(&rhs)
    }
}

impl MulAssign for Matrix {
    fn mul_assign(&mut self, rhs: Matrix) {
        *self = self.multiply(&rhs);
    }
}

impl From<[f32; 16]> for Matrix {
    fn from(m: [f32; 16]) -> Self {
        Self(m)
    }
}

impl AsRef<[f32; 16]> for Matrix {
    fn as_ref(&self) -> &[f32; 16] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn transform_point(m: &Matrix, p: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0f32; 4];
        for (row, slot) in out.iter_mut().enumerate() {
            *slot = (0..4).map(|col| m.get(row, col) * p[col]).sum();
        }
        out
    }

    fn assert_close(a: &[f32], b: &[f32]) {
        for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
            assert!((x - y).abs() < 1e-5, "element {} differs: {} vs {}", i, x, y);
        }
    }

    #[test]
    fn identity_is_identity() {
        assert!(Matrix::identity().is_identity());
        assert!(Matrix::default().is_identity());
        assert!(!Matrix::translation(0.0, 0.0, 1.0).is_identity());
    }

    #[test]
    fn identity_check_has_no_tolerance() {
        let mut m = Matrix::identity();
        m.0[0] = 1.0 + f32::EPSILON;
        assert!(!m.is_identity());
    }

    #[test]
    fn multiply_by_identity_is_noop() {
        let t = Matrix::translation(1.0, 2.0, 3.0);
        assert_eq!(t * Matrix::IDENTITY, t);
        assert_eq!(Matrix::IDENTITY * t, t);
    }

    #[test]
    fn multiply_order_applies_rhs_first() {
        // T × S applied to a point scales first, then translates.
        let m = Matrix::translation(10.0, 0.0, 0.0) * Matrix::scale(2.0, 2.0, 2.0);
        let p = transform_point(&m, [1.0, 1.0, 1.0, 1.0]);
        assert_close(&p, &[12.0, 2.0, 2.0, 1.0]);
    }

    #[test]
    fn in_place_multiply_matches_out_of_place() {
        let a = Matrix::rotation(30.0, 0.0, 1.0, 0.0).unwrap() * Matrix::translation(1.0, 2.0, 3.0);
        let b = Matrix::scale(2.0, 3.0, 4.0) * Matrix::rotation(45.0, 1.0, 0.0, 0.0).unwrap();
        let expected = a.multiply(&b);

        let mut acc = a;
        acc *= b;
        assert_eq!(acc, expected);
    }

    #[test]
    fn translation_layout() {
        let m = Matrix::translation(1.0, 2.0, 3.0);
        assert_eq!(m.0[12], 1.0);
        assert_eq!(m.0[13], 2.0);
        assert_eq!(m.0[14], 3.0);
        assert_eq!(m.0[15], 1.0);
    }

    #[test]
    fn rotation_about_z_maps_x_to_y() {
        let m = Matrix::rotation(90.0, 0.0, 0.0, 1.0).unwrap();
        let p = transform_point(&m, [1.0, 0.0, 0.0, 1.0]);
        assert_close(&p, &[0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn rotation_normalizes_axis() {
        let a = Matrix::rotation(40.0, 0.0, 0.0, 5.0).unwrap();
        let b = Matrix::rotation(40.0, 0.0, 0.0, 1.0).unwrap();
        assert_close(&a.0, &b.0);
    }

    #[test]
    fn degenerate_rotation_is_none() {
        assert!(Matrix::rotation(0.0, 1.0, 0.0, 0.0).is_none());
        assert!(Matrix::rotation(45.0, 0.0, 0.0, 0.0).is_none());
    }

    #[test]
    fn orthographic_maps_box_to_clip_cube() {
        let m = Matrix::orthographic(0.0, 640.0, 480.0, 0.0, -1.0, 1.0);
        let p = transform_point(&m, [640.0, 0.0, 0.0, 1.0]);
        assert_close(&p, &[1.0, 1.0, 0.0, 1.0]);
        let p = transform_point(&m, [0.0, 480.0, 0.0, 1.0]);
        assert_close(&p, &[-1.0, -1.0, 0.0, 1.0]);
    }

    #[test]
    fn frustum_classical_entries() {
        let m = Matrix::frustum(-1.0, 1.0, -1.0, 1.0, 1.0, 10.0);
        assert_eq!(m.0[0], 1.0);
        assert_eq!(m.0[5], 1.0);
        assert_eq!(m.0[8], 0.0);
        assert_eq!(m.0[9], 0.0);
        assert_close(&[m.0[10]], &[-11.0 / 9.0]);
        assert_eq!(m.0[11], -1.0);
        assert_close(&[m.0[14]], &[-20.0 / 9.0]);
        assert_eq!(m.0[15], 0.0);
    }

    #[test]
    fn projection_inputs_are_not_validated() {
        let m = Matrix::orthographic(1.0, 1.0, 0.0, 1.0, 0.0, 1.0);
        assert!(!m.0[0].is_finite());
    }

    #[test]
    fn transpose_and_row_major_constructor() {
        let rows = [
            1.0, 0.0, 0.0, 5.0, //
            0.0, 1.0, 0.0, 6.0, //
            0.0, 0.0, 1.0, 7.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        assert_eq!(Matrix::from_rows_array(rows), Matrix::translation(5.0, 6.0, 7.0));
        let t = Matrix::translation(5.0, 6.0, 7.0);
        assert_eq!(t.transpose().transpose(), t);
    }

    #[test]
    fn from_f64_narrows() {
        let mut m = [0.0f64; 16];
        m[0] = 1.0;
        m[5] = 1.0;
        m[10] = 1.0;
        m[15] = 1.0;
        assert!(Matrix::from_f64(&m).is_identity());
    }

    #[test]
    fn driver_view_is_column_major() {
        let m = Matrix::translation(1.0, 2.0, 3.0);
        let floats = m.as_array();
        assert_eq!(&floats[12..15], &[1.0, 2.0, 3.0]);
        assert_eq!(floats[3], 0.0);
        assert_eq!(Matrix::from_cols_array(*floats), m);
    }
}
