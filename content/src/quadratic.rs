// vellum/content/src/quadratic.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The rasterizer-facing path: lines and quadratic Béziers only.
//!
//! Produced from an editable `Path` by `Path::to_quadratics()` (or by the
//! stroker) and consumed by the tiler. Contours are implicitly closed for
//! filling.

use crate::segment::Segment;
use vellum_geometry::rect::RectF;
use vellum_geometry::transform2d::Transform2F;
use vellum_geometry::util::{self, EPSILON};
use vellum_geometry::vector::Vector2F;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum QuadraticCommand {
    MoveTo,
    LineTo,
    QuadraticTo,
}

#[derive(Clone, Debug, Default)]
pub struct QuadraticPath {
    points: Vec<Vector2F>,
    commands: Vec<QuadraticCommand>,
}

/// One explicit contour of a `QuadraticPath`.
#[derive(Clone, Debug)]
pub struct QuadraticContour {
    pub segments: Vec<Segment>,
    pub closed: bool,
}

impl QuadraticPath {
    #[inline]
    pub fn new() -> QuadraticPath {
        QuadraticPath::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.len() <= 1
    }

    #[inline]
    pub fn points(&self) -> &[Vector2F] {
        &self.points
    }

    pub fn move_to(&mut self, point: Vector2F) {
        // Collapse consecutive moves.
        if self.commands.last() == Some(&QuadraticCommand::MoveTo) {
            *self.points.last_mut().unwrap() = point;
            return;
        }
        self.points.push(point);
        self.commands.push(QuadraticCommand::MoveTo);
    }

    pub fn line_to(&mut self, point: Vector2F) {
        debug_assert!(!self.commands.is_empty());
        self.points.push(point);
        self.commands.push(QuadraticCommand::LineTo);
    }

    pub fn quadratic_to(&mut self, ctrl: Vector2F, point: Vector2F) {
        debug_assert!(!self.commands.is_empty());
        self.points.push(ctrl);
        self.points.push(point);
        self.commands.push(QuadraticCommand::QuadraticTo);
    }

    pub fn transform(&mut self, transform: &Transform2F) {
        for point in &mut self.points {
            *point = *transform * *point;
        }
    }

    pub fn approx_bounding_rect(&self) -> RectF {
        let mut points = self.points.iter();
        let first = match points.next() {
            None => return RectF::default(),
            Some(first) => *first,
        };
        let mut rect = RectF::from_points(first, first);
        for point in points {
            rect = rect.union_point(*point);
        }
        rect
    }

    /// Iterates drawable segments in order, skipping moves. Each contour is
    /// implicitly closed with a line back to its first point.
    pub fn segments(&self) -> QuadraticSegments {
        QuadraticSegments {
            path: self,
            command_index: 0,
            point_index: 0,
            contour_start: Vector2F::zero(),
            current: Vector2F::zero(),
            pending_close: None,
        }
    }

    /// The explicit contours of this path, without the implicit closing
    /// segments. A contour reports `closed` when its endpoints coincide.
    pub fn contours(&self) -> Vec<QuadraticContour> {
        let mut contours = vec![];
        let mut segments: Vec<Segment> = vec![];
        let mut contour_start = Vector2F::zero();
        let mut current = Vector2F::zero();
        let mut point_index = 0;
        let mut started = false;

        let mut finish = |segments: &mut Vec<Segment>, start: Vector2F, end: Vector2F| {
            if !segments.is_empty() {
                contours.push(QuadraticContour {
                    closed: (end - start).length() <= EPSILON,
                    segments: std::mem::replace(segments, vec![]),
                });
            }
        };

        for &command in &self.commands {
            match command {
                QuadraticCommand::MoveTo => {
                    if started {
                        finish(&mut segments, contour_start, current);
                    }
                    contour_start = self.points[point_index];
                    current = contour_start;
                    point_index += 1;
                    started = true;
                }
                QuadraticCommand::LineTo => {
                    let to = self.points[point_index];
                    point_index += 1;
                    let segment = Segment::line(current, to);
                    if !segment.is_point() {
                        segments.push(segment);
                    }
                    current = to;
                }
                QuadraticCommand::QuadraticTo => {
                    let ctrl = self.points[point_index];
                    let to = self.points[point_index + 1];
                    point_index += 2;
                    let segment = Segment::quadratic(current, ctrl, to);
                    if !segment.is_point() {
                        segments.push(segment);
                    }
                    current = to;
                }
            }
        }
        finish(&mut segments, contour_start, current);
        contours
    }

    /// The winding number of `point` with respect to the (implicitly closed)
    /// contours, by counting signed crossings of a +x ray.
    pub fn winding_at(&self, point: Vector2F) -> i32 {
        let mut winding = 0;
        for segment in self.segments() {
            winding += segment_ray_crossings(&segment, point);
        }
        winding
    }
}

/// Signed crossings of the horizontal ray from `point` toward +x.
///
/// Curves are split y-monotonic first so every piece obeys the same
/// half-open endpoint rule as a line, which keeps shared contour endpoints
/// from double counting.
fn segment_ray_crossings(segment: &Segment, point: Vector2F) -> i32 {
    let mut crossings = 0;
    {
        let mut count_piece = |piece: &Segment| {
            let (y0, y1) = (piece.from.y, piece.to.y);
            let downward = y0 <= point.y && point.y < y1;
            let upward = y1 <= point.y && point.y < y0;
            if !downward && !upward {
                return;
            }

            let x_at = match piece.kind {
                crate::segment::SegmentKind::Quadratic => {
                    let a = piece.from.y - 2.0 * piece.ctrl0.y + piece.to.y;
                    let b = 2.0 * (piece.ctrl0.y - piece.from.y);
                    let c = piece.from.y - point.y;
                    let mut x_at = f32::MIN;
                    for t in &util::solve_quadratic(a, b, c) {
                        if t >= -EPSILON && t <= 1.0 + EPSILON {
                            x_at = piece.sample(util::clamp(t, 0.0, 1.0)).x;
                            break;
                        }
                    }
                    x_at
                }
                _ => {
                    let d = piece.to - piece.from;
                    piece.from.x + (point.y - piece.from.y) * d.x / d.y
                }
            };

            if x_at > point.x {
                crossings += if downward { 1 } else { -1 };
            }
        };

        match segment.kind {
            crate::segment::SegmentKind::Quadratic => {
                segment.for_each_monotonic(&mut |piece| count_piece(piece));
            }
            _ => count_piece(segment),
        }
    }
    crossings
}

pub struct QuadraticSegments<'a> {
    path: &'a QuadraticPath,
    command_index: usize,
    point_index: usize,
    contour_start: Vector2F,
    current: Vector2F,
    pending_close: Option<Segment>,
}

impl<'a> Iterator for QuadraticSegments<'a> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        if let Some(close) = self.pending_close.take() {
            return Some(close);
        }

        loop {
            let command = *self.path.commands.get(self.command_index)?;
            self.command_index += 1;

            match command {
                QuadraticCommand::MoveTo => {
                    let next_start = self.path.points[self.point_index];
                    self.point_index += 1;

                    let close = self.close_segment();
                    self.contour_start = next_start;
                    self.current = next_start;
                    if let Some(close) = close {
                        return Some(close);
                    }
                }
                QuadraticCommand::LineTo => {
                    let to = self.path.points[self.point_index];
                    self.point_index += 1;
                    let segment = Segment::line(self.current, to);
                    self.current = to;
                    if !segment.is_point() {
                        return Some(segment);
                    }
                }
                QuadraticCommand::QuadraticTo => {
                    let ctrl = self.path.points[self.point_index];
                    let to = self.path.points[self.point_index + 1];
                    self.point_index += 2;
                    let segment = Segment::quadratic(self.current, ctrl, to);
                    self.current = to;
                    if !segment.is_point() {
                        return Some(segment);
                    }
                }
            }

            if self.command_index == self.path.commands.len() {
                // End of the stream: emit the final implicit close.
                return self.close_segment();
            }
        }
    }
}

impl<'a> QuadraticSegments<'a> {
    fn close_segment(&self) -> Option<Segment> {
        if (self.current - self.contour_start).length() > EPSILON {
            Some(Segment::line(self.current, self.contour_start))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_geometry::vector::vec2f;

    fn unit_square() -> QuadraticPath {
        let mut path = QuadraticPath::new();
        path.move_to(vec2f(0.0, 0.0));
        path.line_to(vec2f(10.0, 0.0));
        path.line_to(vec2f(10.0, 10.0));
        path.line_to(vec2f(0.0, 10.0));
        path
    }

    #[test]
    fn test_implicit_close() {
        let path = unit_square();
        let segments: Vec<_> = path.segments().collect();
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[3].to, vec2f(0.0, 0.0));
    }

    #[test]
    fn test_winding_square() {
        let path = unit_square();
        assert_eq!(path.winding_at(vec2f(5.0, 5.0)), 1);
        assert_eq!(path.winding_at(vec2f(15.0, 5.0)), 0);
        assert_eq!(path.winding_at(vec2f(-5.0, 5.0)), 0);
    }

    #[test]
    fn test_winding_with_curve() {
        let mut path = QuadraticPath::new();
        path.move_to(vec2f(0.0, 0.0));
        path.quadratic_to(vec2f(10.0, 20.0), vec2f(20.0, 0.0));
        // Implicitly closed by the baseline; orientation is irrelevant here.
        assert_ne!(path.winding_at(vec2f(10.0, 5.0)), 0);
        assert_eq!(path.winding_at(vec2f(10.0, 15.0)), 0);
    }
}
