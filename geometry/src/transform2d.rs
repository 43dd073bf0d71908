// vellum/geometry/src/transform2d.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! 2D affine transforms.

use crate::rect::RectF;
use crate::util;
use crate::vector::{vec2f, Vector2F};
use std::ops::Mul;

/// A 2×2 matrix, row major.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix2x2F {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
}

impl Default for Matrix2x2F {
    #[inline]
    fn default() -> Matrix2x2F {
        Matrix2x2F { m11: 1.0, m12: 0.0, m21: 0.0, m22: 1.0 }
    }
}

impl Matrix2x2F {
    #[inline]
    pub fn from_scale(scale: Vector2F) -> Matrix2x2F {
        Matrix2x2F { m11: scale.x, m12: 0.0, m21: 0.0, m22: scale.y }
    }

    #[inline]
    pub fn from_rotation(theta: f32) -> Matrix2x2F {
        let (sin, cos) = theta.sin_cos();
        Matrix2x2F { m11: cos, m12: -sin, m21: sin, m22: cos }
    }

    #[inline]
    pub fn det(&self) -> f32 {
        self.m11 * self.m22 - self.m12 * self.m21
    }

    #[inline]
    pub fn inverse(&self) -> Matrix2x2F {
        let inv_det = 1.0 / self.det();
        Matrix2x2F {
            m11: self.m22 * inv_det,
            m12: -self.m12 * inv_det,
            m21: -self.m21 * inv_det,
            m22: self.m11 * inv_det,
        }
    }
}

impl Mul<Matrix2x2F> for Matrix2x2F {
    type Output = Matrix2x2F;
    #[inline]
    fn mul(self, other: Matrix2x2F) -> Matrix2x2F {
        Matrix2x2F {
            m11: self.m11 * other.m11 + self.m12 * other.m21,
            m12: self.m11 * other.m12 + self.m12 * other.m22,
            m21: self.m21 * other.m11 + self.m22 * other.m21,
            m22: self.m21 * other.m12 + self.m22 * other.m22,
        }
    }
}

impl Mul<Vector2F> for Matrix2x2F {
    type Output = Vector2F;
    #[inline]
    fn mul(self, vector: Vector2F) -> Vector2F {
        vec2f(
            self.m11 * vector.x + self.m12 * vector.y,
            self.m21 * vector.x + self.m22 * vector.y,
        )
    }
}

/// An affine 2D transform: a 2×2 linear part plus a translation.
///
/// Application is `matrix * p + vector`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform2F {
    pub matrix: Matrix2x2F,
    pub vector: Vector2F,
}

impl Transform2F {
    #[inline]
    pub fn from_scale(scale: Vector2F) -> Transform2F {
        Transform2F { matrix: Matrix2x2F::from_scale(scale), vector: Vector2F::zero() }
    }

    #[inline]
    pub fn from_uniform_scale(scale: f32) -> Transform2F {
        Transform2F::from_scale(Vector2F::splat(scale))
    }

    #[inline]
    pub fn from_rotation(theta: f32) -> Transform2F {
        Transform2F { matrix: Matrix2x2F::from_rotation(theta), vector: Vector2F::zero() }
    }

    #[inline]
    pub fn from_translation(vector: Vector2F) -> Transform2F {
        Transform2F { matrix: Matrix2x2F::default(), vector }
    }

    /// `scale`, then `rotation`, then `translation`.
    pub fn from_scale_rotation_translation(scale: Vector2F, theta: f32, translation: Vector2F)
                                           -> Transform2F {
        Transform2F::from_translation(translation) *
            Transform2F::from_rotation(theta) *
            Transform2F::from_scale(scale)
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Transform2F::default()
    }

    #[inline]
    pub fn translate(self, vector: Vector2F) -> Transform2F {
        Transform2F::from_translation(vector) * self
    }

    #[inline]
    pub fn rotate(self, theta: f32) -> Transform2F {
        Transform2F::from_rotation(theta) * self
    }

    #[inline]
    pub fn scale(self, scale: Vector2F) -> Transform2F {
        Transform2F::from_scale(scale) * self
    }

    pub fn inverse(&self) -> Transform2F {
        let matrix_inv = self.matrix.inverse();
        Transform2F { matrix: matrix_inv, vector: -(matrix_inv * self.vector) }
    }

    /// The rotation angle of the linear part, in radians.
    #[inline]
    pub fn rotation(&self) -> f32 {
        self.matrix.m21.atan2(self.matrix.m11)
    }

    /// The scale factors along the transformed x and y axes.
    #[inline]
    pub fn scale_factors(&self) -> Vector2F {
        vec2f(
            vec2f(self.matrix.m11, self.matrix.m21).length(),
            vec2f(self.matrix.m12, self.matrix.m22).length(),
        )
    }

    /// Whether the linear part is a (possibly scaled) axis-aligned transform.
    #[inline]
    pub fn is_axis_aligned(&self) -> bool {
        util::approx_eq(self.matrix.m12, 0.0) && util::approx_eq(self.matrix.m21, 0.0)
    }

    /// Transforms the corners of `rect` and returns their bounding rectangle.
    pub fn transform_rect(&self, rect: RectF) -> RectF {
        let a = *self * rect.min;
        let b = *self * rect.upper_right();
        let c = *self * rect.lower_left();
        let d = *self * rect.max;
        RectF { min: a.min(b).min(c).min(d), max: a.max(b).max(c).max(d) }
    }
}

impl Mul<Transform2F> for Transform2F {
    type Output = Transform2F;
    #[inline]
    fn mul(self, other: Transform2F) -> Transform2F {
        Transform2F {
            matrix: self.matrix * other.matrix,
            vector: self.matrix * other.vector + self.vector,
        }
    }
}

impl Mul<Vector2F> for Transform2F {
    type Output = Vector2F;
    #[inline]
    fn mul(self, point: Vector2F) -> Vector2F {
        self.matrix * point + self.vector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_inverse_round_trip() {
        let transform = Transform2F::from_scale_rotation_translation(
            vec2f(2.0, 3.0), 0.7, vec2f(10.0, -4.0));
        let point = vec2f(5.0, 6.0);
        let round_tripped = transform.inverse() * (transform * point);
        assert!((round_tripped - point).length() < 1e-4);
    }

    #[test]
    fn test_rotation_extraction() {
        let transform = Transform2F::from_rotation(FRAC_PI_2);
        assert!((transform.rotation() - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_composition_order() {
        // Scale then translate: the translation must not be scaled.
        let transform = Transform2F::from_translation(vec2f(1.0, 0.0)) *
            Transform2F::from_uniform_scale(2.0);
        assert_eq!(transform * vec2f(1.0, 1.0), vec2f(3.0, 2.0));
    }
}
