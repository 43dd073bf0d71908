// vellum/content/src/segment.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Single Bézier segments: lines, quadratics, and cubics.

use arrayvec::ArrayVec;
use vellum_geometry::line_segment::LineSegment2F;
use vellum_geometry::rect::RectF;
use vellum_geometry::transform2d::Transform2F;
use vellum_geometry::util::{self, EPSILON};
use vellum_geometry::vector::Vector2F;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    Line,
    Quadratic,
    Cubic,
}

/// One drawable piece of a path.
///
/// `ctrl0` is unused for lines; `ctrl1` is unused for lines and quadratics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub from: Vector2F,
    pub ctrl0: Vector2F,
    pub ctrl1: Vector2F,
    pub to: Vector2F,
}

impl Segment {
    #[inline]
    pub fn line(from: Vector2F, to: Vector2F) -> Segment {
        Segment { kind: SegmentKind::Line, from, ctrl0: from, ctrl1: to, to }
    }

    #[inline]
    pub fn quadratic(from: Vector2F, ctrl: Vector2F, to: Vector2F) -> Segment {
        Segment { kind: SegmentKind::Quadratic, from, ctrl0: ctrl, ctrl1: to, to }
    }

    #[inline]
    pub fn cubic(from: Vector2F, ctrl0: Vector2F, ctrl1: Vector2F, to: Vector2F) -> Segment {
        Segment { kind: SegmentKind::Cubic, from, ctrl0, ctrl1, to }
    }

    /// The number of points this segment consumes from a path's point vector.
    #[inline]
    pub fn point_count(&self) -> usize {
        match self.kind {
            SegmentKind::Line => 1,
            SegmentKind::Quadratic => 2,
            SegmentKind::Cubic => 3,
        }
    }

    /// Whether every defining point coincides.
    pub fn is_point(&self) -> bool {
        if self.from != self.to {
            return false;
        }
        match self.kind {
            SegmentKind::Line => true,
            SegmentKind::Quadratic => self.from == self.ctrl0,
            SegmentKind::Cubic => self.from == self.ctrl0 && self.from == self.ctrl1,
        }
    }

    pub fn sample(&self, t: f32) -> Vector2F {
        match self.kind {
            SegmentKind::Line => self.from.lerp(self.to, t),
            SegmentKind::Quadratic => {
                let u = 1.0 - t;
                self.from * (u * u) + self.ctrl0 * (2.0 * u * t) + self.to * (t * t)
            }
            SegmentKind::Cubic => {
                let u = 1.0 - t;
                self.from * (u * u * u) +
                    self.ctrl0 * (3.0 * u * u * t) +
                    self.ctrl1 * (3.0 * u * t * t) +
                    self.to * (t * t * t)
            }
        }
    }

    /// The derivative direction at `t` (unnormalized).
    pub fn derivative(&self, t: f32) -> Vector2F {
        match self.kind {
            SegmentKind::Line => self.to - self.from,
            SegmentKind::Quadratic => {
                (self.ctrl0 - self.from).lerp(self.to - self.ctrl0, t) * 2.0
            }
            SegmentKind::Cubic => {
                let d0 = self.ctrl0 - self.from;
                let d1 = self.ctrl1 - self.ctrl0;
                let d2 = self.to - self.ctrl1;
                (d0.lerp(d1, t)).lerp(d1.lerp(d2, t), t) * 3.0
            }
        }
    }

    /// Raises this segment to an exactly equivalent cubic.
    pub fn to_cubic(&self) -> Segment {
        match self.kind {
            SegmentKind::Cubic => *self,
            SegmentKind::Line => {
                let third = (self.to - self.from) * (1.0 / 3.0);
                Segment::cubic(self.from, self.from + third, self.to - third, self.to)
            }
            SegmentKind::Quadratic => {
                let ctrl0 = self.from + (self.ctrl0 - self.from) * (2.0 / 3.0);
                let ctrl1 = self.to + (self.ctrl0 - self.to) * (2.0 / 3.0);
                Segment::cubic(self.from, ctrl0, ctrl1, self.to)
            }
        }
    }

    /// De Casteljau split at `t`.
    pub fn split(&self, t: f32) -> (Segment, Segment) {
        match self.kind {
            SegmentKind::Line => {
                let mid = self.from.lerp(self.to, t);
                (Segment::line(self.from, mid), Segment::line(mid, self.to))
            }
            SegmentKind::Quadratic => {
                let q0 = self.from.lerp(self.ctrl0, t);
                let q1 = self.ctrl0.lerp(self.to, t);
                let mid = q0.lerp(q1, t);
                (Segment::quadratic(self.from, q0, mid), Segment::quadratic(mid, q1, self.to))
            }
            SegmentKind::Cubic => {
                let q0 = self.from.lerp(self.ctrl0, t);
                let q1 = self.ctrl0.lerp(self.ctrl1, t);
                let q2 = self.ctrl1.lerp(self.to, t);
                let r0 = q0.lerp(q1, t);
                let r1 = q1.lerp(q2, t);
                let mid = r0.lerp(r1, t);
                (Segment::cubic(self.from, q0, r0, mid), Segment::cubic(mid, r1, q2, self.to))
            }
        }
    }

    /// Extracts the sub-curve over `[t0, t1]`.
    pub fn split_range(&self, t0: f32, t1: f32) -> Segment {
        debug_assert!(t0 <= t1);
        let after = if t0 <= 0.0 { *self } else { self.split(t0).1 };
        if t1 >= 1.0 {
            return after;
        }
        let t = (t1 - t0) / (1.0 - t0);
        after.split(t).0
    }

    /// Interior parameters where dx/dt = 0, ascending.
    pub fn x_extrema(&self) -> ArrayVec<[f32; 2]> {
        self.axis_extrema(|p| p.x)
    }

    /// Interior parameters where dy/dt = 0, ascending.
    pub fn y_extrema(&self) -> ArrayVec<[f32; 2]> {
        self.axis_extrema(|p| p.y)
    }

    fn axis_extrema<F>(&self, axis: F) -> ArrayVec<[f32; 2]> where F: Fn(Vector2F) -> f32 {
        let mut extrema = ArrayVec::new();
        match self.kind {
            SegmentKind::Line => {}
            SegmentKind::Quadratic => {
                // p' = 2((c - p0) + t((p2 - c) - (c - p0)))
                let a = axis(self.ctrl0) - axis(self.from);
                let b = axis(self.to) - axis(self.ctrl0) - a;
                if !util::approx_zero(b, EPSILON) {
                    let t = -a / b;
                    if t > EPSILON && t < 1.0 - EPSILON {
                        extrema.push(t);
                    }
                }
            }
            SegmentKind::Cubic => {
                let d0 = axis(self.ctrl0) - axis(self.from);
                let d1 = axis(self.ctrl1) - axis(self.ctrl0);
                let d2 = axis(self.to) - axis(self.ctrl1);
                let a = d0 - 2.0 * d1 + d2;
                let b = 2.0 * (d1 - d0);
                let c = d0;
                for t in &util::solve_quadratic(a, b, c) {
                    if t > EPSILON && t < 1.0 - EPSILON {
                        extrema.push(t);
                    }
                }
            }
        }
        extrema
    }

    /// Whether both axis projections are monotonic over [0, 1].
    pub fn is_monotonic(&self) -> bool {
        self.x_extrema().is_empty() && self.y_extrema().is_empty()
    }

    /// Splits at every interior axis extremum and feeds the monotonic pieces
    /// to `callback` in order.
    pub fn for_each_monotonic<F>(&self, callback: &mut F) where F: FnMut(&Segment) {
        let mut ts: ArrayVec<[f32; 4]> = ArrayVec::new();
        for t in self.x_extrema() {
            ts.push(t);
        }
        for t in self.y_extrema() {
            ts.push(t);
        }
        if ts.is_empty() {
            callback(self);
            return;
        }
        ts.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let mut last_t = 0.0;
        for &t in ts.iter() {
            if t - last_t > EPSILON {
                callback(&self.split_range(last_t, t));
                last_t = t;
            }
        }
        if 1.0 - last_t > EPSILON {
            callback(&self.split_range(last_t, 1.0));
        }
    }

    /// Inflection parameters of a cubic: `(t_cusp, t_loop)` where the
    /// inflections lie at `t_cusp ± sqrt(t_loop)` when `t_loop > 0`; a double
    /// root at `t_cusp` (a cusp) when `t_loop == 0`.
    pub fn inflection_params(&self) -> Option<(f32, f32)> {
        if self.kind != SegmentKind::Cubic {
            return None;
        }

        // Derivative coefficients: B'(t) = a·t² + b·t + c (up to a constant
        // factor, which cancels in the ratios below).
        let a = (self.ctrl0 - self.ctrl1) * 3.0 + self.to - self.from;
        let b = (self.from - self.ctrl0 * 2.0 + self.ctrl1) * 2.0;
        let c = self.ctrl0 - self.from;

        let denom = b.cross(a);
        if util::approx_zero(denom, EPSILON) {
            return None;
        }

        let t_cusp = a.cross(c) / denom;
        let t_loop = t_cusp * t_cusp + b.cross(c) / denom;
        Some((t_cusp, t_loop))
    }

    #[inline]
    pub fn bounding_rect(&self) -> RectF {
        let mut rect = RectF::from_points(self.from, self.to);
        for t in self.x_extrema().iter().chain(self.y_extrema().iter()) {
            rect = rect.union_point(self.sample(*t));
        }
        rect
    }

    /// The hull of the defining points; contains the curve, cheaply.
    pub fn approx_bounding_rect(&self) -> RectF {
        let mut rect = RectF::from_points(self.from, self.to);
        match self.kind {
            SegmentKind::Line => {}
            SegmentKind::Quadratic => rect = rect.union_point(self.ctrl0),
            SegmentKind::Cubic => {
                rect = rect.union_point(self.ctrl0).union_point(self.ctrl1);
            }
        }
        rect
    }

    pub fn transform(&self, transform: &Transform2F) -> Segment {
        Segment {
            kind: self.kind,
            from: *transform * self.from,
            ctrl0: *transform * self.ctrl0,
            ctrl1: *transform * self.ctrl1,
            to: *transform * self.to,
        }
    }

    /// Distance from `point` to this segment, via adaptive flattening.
    pub fn distance_to_point(&self, point: Vector2F) -> f32 {
        if self.kind == SegmentKind::Line {
            return LineSegment2F::new(self.from, self.to).distance_to_point(point);
        }

        const STEPS: usize = 16;
        let mut best = f32::MAX;
        let mut prev = self.from;
        for step in 1..=STEPS {
            let next = self.sample(step as f32 / STEPS as f32);
            best = best.min(LineSegment2F::new(prev, next).distance_to_point(point));
            prev = next;
        }
        best
    }

    /// Whether this segment intersects `rect`, conservatively exact for
    /// lines and by flattening for curves.
    pub fn intersects_rect(&self, rect: RectF) -> bool {
        if !self.approx_bounding_rect().intersects(rect) {
            return false;
        }
        if self.kind == SegmentKind::Line {
            return LineSegment2F::new(self.from, self.to).intersects_rect(rect);
        }

        const STEPS: usize = 16;
        let mut prev = self.from;
        for step in 1..=STEPS {
            let next = self.sample(step as f32 / STEPS as f32);
            if LineSegment2F::new(prev, next).intersects_rect(rect) {
                return true;
            }
            prev = next;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_geometry::vector::vec2f;

    #[test]
    fn test_split_matches_sampling() {
        let segment = Segment::cubic(vec2f(0.0, 0.0),
                                     vec2f(10.0, 20.0),
                                     vec2f(30.0, -20.0),
                                     vec2f(40.0, 0.0));
        let (before, after) = segment.split(0.25);
        assert!((before.to - segment.sample(0.25)).length() < 1e-4);
        assert!((after.from - segment.sample(0.25)).length() < 1e-4);
        assert!((before.sample(1.0) - after.sample(0.0)).length() < 1e-4);
    }

    #[test]
    fn test_quadratic_to_cubic_is_exact() {
        let quadratic = Segment::quadratic(vec2f(0.0, 0.0), vec2f(5.0, 10.0), vec2f(10.0, 0.0));
        let cubic = quadratic.to_cubic();
        for step in 0..=10 {
            let t = step as f32 / 10.0;
            assert!((quadratic.sample(t) - cubic.sample(t)).length() < 1e-4);
        }
    }

    #[test]
    fn test_bounding_rect_covers_extrema() {
        let segment = Segment::quadratic(vec2f(0.0, 0.0), vec2f(5.0, 10.0), vec2f(10.0, 0.0));
        let rect = segment.bounding_rect();
        // The quadratic's apex is at y = 5.
        assert!((rect.max.y - 5.0).abs() < 1e-4);
        assert_eq!(rect.min, vec2f(0.0, 0.0));
    }

    #[test]
    fn test_monotonic_split() {
        let segment = Segment::cubic(vec2f(0.0, 0.0),
                                     vec2f(0.0, 40.0),
                                     vec2f(40.0, -40.0),
                                     vec2f(40.0, 0.0));
        let mut count = 0;
        segment.for_each_monotonic(&mut |piece| {
            assert!(piece.is_monotonic());
            count += 1;
        });
        assert!(count >= 2);
    }
}
