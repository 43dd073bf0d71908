// vellum/geometry/src/line_segment.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Line segments.

use crate::rect::RectF;
use crate::util;
use crate::vector::Vector2F;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineSegment2F {
    pub from: Vector2F,
    pub to: Vector2F,
}

impl LineSegment2F {
    #[inline]
    pub fn new(from: Vector2F, to: Vector2F) -> LineSegment2F {
        LineSegment2F { from, to }
    }

    #[inline]
    pub fn vector(self) -> Vector2F {
        self.to - self.from
    }

    #[inline]
    pub fn midpoint(self) -> Vector2F {
        (self.from + self.to) * 0.5
    }

    #[inline]
    pub fn sample(self, t: f32) -> Vector2F {
        self.from.lerp(self.to, t)
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.vector().length()
    }

    #[inline]
    pub fn reversed(self) -> LineSegment2F {
        LineSegment2F { from: self.to, to: self.from }
    }

    #[inline]
    pub fn bounding_rect(self) -> RectF {
        RectF::from_points(self.from, self.to)
    }

    /// Distance from `point` to the closest point on this segment.
    pub fn distance_to_point(self, point: Vector2F) -> f32 {
        let vector = self.vector();
        let square_length = vector.square_length();
        if square_length == 0.0 {
            return (point - self.from).length();
        }
        let t = ((point - self.from).dot(vector) / square_length).max(0.0).min(1.0);
        (point - self.sample(t)).length()
    }

    /// The `t` along `self` where the infinite lines through both segments
    /// cross, or `None` for (nearly) parallel lines.
    pub fn intersection_t(self, other: LineSegment2F) -> Option<f32> {
        let p = self.vector();
        let q = other.vector();
        let denom = p.cross(q);
        if util::approx_eq(denom, 0.0) {
            return None;
        }
        Some((other.from - self.from).cross(q) / denom)
    }

    /// Whether the two closed segments intersect.
    pub fn intersects_segment(self, other: LineSegment2F) -> bool {
        match self.intersection_t(other) {
            None => false,
            Some(t) => {
                if t < 0.0 || t > 1.0 {
                    return false;
                }
                match other.intersection_t(self) {
                    None => false,
                    Some(u) => u >= 0.0 && u <= 1.0,
                }
            }
        }
    }

    /// Whether this segment crosses any edge of `rect` or lies inside it.
    pub fn intersects_rect(self, rect: RectF) -> bool {
        if rect.contains_point(self.from) || rect.contains_point(self.to) {
            return true;
        }
        let corners = [rect.min, rect.upper_right(), rect.max, rect.lower_left()];
        for index in 0..4 {
            let edge = LineSegment2F::new(corners[index], corners[(index + 1) % 4]);
            if self.intersects_segment(edge) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::vec2f;

    #[test]
    fn test_intersection() {
        let a = LineSegment2F::new(vec2f(0.0, 0.0), vec2f(10.0, 10.0));
        let b = LineSegment2F::new(vec2f(0.0, 10.0), vec2f(10.0, 0.0));
        assert!(a.intersects_segment(b));
        let c = LineSegment2F::new(vec2f(20.0, 0.0), vec2f(20.0, 10.0));
        assert!(!a.intersects_segment(c));
    }

    #[test]
    fn test_distance_to_point() {
        let segment = LineSegment2F::new(vec2f(0.0, 0.0), vec2f(10.0, 0.0));
        assert_eq!(segment.distance_to_point(vec2f(5.0, 3.0)), 3.0);
        assert_eq!(segment.distance_to_point(vec2f(-4.0, 0.0)), 4.0);
    }
}
