// vellum/content/src/stroke.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Strokes paths into fillable regions.
//!
//! Each contour is offset by ±width/2; open contours become one loop joined
//! by end caps, closed contours become two loops of opposite orientation.
//! Joins between segments follow the stroke style (bevel, round, or miter
//! with a limit).

use crate::quadratic::{QuadraticContour, QuadraticPath};
use crate::segment::{Segment, SegmentKind};
use vellum_geometry::line_segment::LineSegment2F;
use vellum_geometry::util::EPSILON;
use vellum_geometry::vector::Vector2F;

/// Stops offset subdivision once the control legs turn by less than this.
const FLATNESS_COS: f32 = 0.966; // cos 15°
const MAX_OFFSET_DEPTH: u32 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Square,
    Round,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LineJoin {
    Bevel,
    Round,
    Miter(f32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
}

impl Default for StrokeStyle {
    #[inline]
    fn default() -> StrokeStyle {
        StrokeStyle { width: 1.0, cap: LineCap::Butt, join: LineJoin::Miter(10.0) }
    }
}

/// Converts a path into the fill of its stroke.
pub struct StrokeToFill<'a> {
    input: &'a QuadraticPath,
    style: StrokeStyle,
    output: QuadraticPath,
}

impl<'a> StrokeToFill<'a> {
    pub fn new(input: &'a QuadraticPath, style: StrokeStyle) -> StrokeToFill<'a> {
        let mut style = style;
        if style.width <= EPSILON {
            warn!("stroke width {} clamped to hairline", style.width);
            style.width = EPSILON * 2.0;
        }
        StrokeToFill { input, style, output: QuadraticPath::new() }
    }

    pub fn into_path(mut self) -> QuadraticPath {
        let contours = self.input.contours();
        for contour in &contours {
            if contour.segments.is_empty() {
                continue;
            }
            if contour.closed {
                self.stroke_closed(contour);
            } else {
                self.stroke_open(contour);
            }
        }
        self.output
    }

    fn stroke_open(&mut self, contour: &QuadraticContour) {
        let radius = self.style.width * 0.5;

        let forward = offset_segments(&contour.segments, radius, self.style.join);
        let reversed_input: Vec<_> =
            contour.segments.iter().rev().map(reverse_segment).collect();
        let backward = offset_segments(&reversed_input, radius, self.style.join);

        let start = forward.first().unwrap().from;
        self.output.move_to(start);
        for segment in &forward {
            push_segment(&mut self.output, segment);
        }

        // End cap: from the end of the forward side to the start of the
        // backward side.
        let end_tangent = contour.segments.last().unwrap().derivative(1.0).normalize();
        self.emit_cap(forward.last().unwrap().to, backward.first().unwrap().from, end_tangent);

        for segment in &backward {
            push_segment(&mut self.output, segment);
        }

        // Start cap closes the loop back to `start`.
        let start_tangent = -contour.segments.first().unwrap().derivative(0.0).normalize();
        self.emit_cap(backward.last().unwrap().to, start, start_tangent);
    }

    fn stroke_closed(&mut self, contour: &QuadraticContour) {
        let radius = self.style.width * 0.5;

        let forward = offset_closed(&contour.segments, radius, self.style.join);
        self.output.move_to(forward.first().unwrap().from);
        for segment in &forward {
            push_segment(&mut self.output, segment);
        }

        let reversed_input: Vec<_> =
            contour.segments.iter().rev().map(reverse_segment).collect();
        let backward = offset_closed(&reversed_input, radius, self.style.join);
        self.output.move_to(backward.first().unwrap().from);
        for segment in &backward {
            push_segment(&mut self.output, segment);
        }
    }

    /// A cap joining offset end `from` to offset end `to`, where `tangent`
    /// points out of the stroked contour.
    fn emit_cap(&mut self, from: Vector2F, to: Vector2F, tangent: Vector2F) {
        match self.style.cap {
            LineCap::Butt => self.output.line_to(to),
            LineCap::Square => {
                let radius = self.style.width * 0.5;
                let extent = tangent * radius;
                self.output.line_to(from + extent);
                self.output.line_to(to + extent);
                self.output.line_to(to);
            }
            LineCap::Round => {
                let radius = self.style.width * 0.5;
                let mid = (from + to) * 0.5 + tangent * radius;
                // Two quadratic quarter arcs through the cap apex.
                self.output.quadratic_to(from + tangent * radius, mid);
                self.output.quadratic_to(to + tangent * radius, to);
            }
        }
    }
}

fn reverse_segment(segment: &Segment) -> Segment {
    match segment.kind {
        SegmentKind::Line => Segment::line(segment.to, segment.from),
        SegmentKind::Quadratic => Segment::quadratic(segment.to, segment.ctrl0, segment.from),
        SegmentKind::Cubic => {
            Segment::cubic(segment.to, segment.ctrl1, segment.ctrl0, segment.from)
        }
    }
}

/// Offsets an open run of segments to its left by `radius`, inserting joins
/// between them.
fn offset_segments(segments: &[Segment], radius: f32, join: LineJoin) -> Vec<Segment> {
    let mut output = vec![];
    for (index, segment) in segments.iter().enumerate() {
        if index > 0 {
            let prev_end = output.last().map(|s: &Segment| s.to).unwrap();
            emit_join(&mut output, segments[index - 1..=index].as_ref(), prev_end, radius, join);
        }
        offset_segment(segment, radius, 0, &mut output);
    }
    output
}

/// Offsets a closed loop, including the join wrapping from the last segment
/// back to the first.
fn offset_closed(segments: &[Segment], radius: f32, join: LineJoin) -> Vec<Segment> {
    let mut output = offset_segments(segments, radius, join);
    if output.is_empty() {
        return output;
    }

    // Wrap-around join between the last and first segments.
    let prev_end = output.last().unwrap().to;
    let pair = [*segments.last().unwrap(), segments[0]];
    emit_join(&mut output, &pair, prev_end, radius, join);

    // Reconnect exactly.
    let start = output.first().unwrap().from;
    let end = output.last().unwrap().to;
    if (start - end).length() > EPSILON {
        output.push(Segment::line(end, start));
    }
    output
}

/// Join geometry between `pair[0]` and `pair[1]`, bridging from `prev_end`
/// (the offset end of the previous segment) to the offset start of the next.
fn emit_join(output: &mut Vec<Segment>,
             pair: &[Segment],
             prev_end: Vector2F,
             radius: f32,
             join: LineJoin) {
    let pivot = pair[1].from;
    let out_tangent = pair[0].derivative(1.0).normalize();
    let in_tangent = pair[1].derivative(0.0).normalize();
    let next_start = pivot + offset_normal(in_tangent) * radius;

    if (next_start - prev_end).length() <= EPSILON {
        return;
    }

    match join {
        LineJoin::Bevel => output.push(Segment::line(prev_end, next_start)),
        LineJoin::Round => {
            // A quadratic arc about the pivot.
            let mid_tangent = (out_tangent + in_tangent).normalize();
            if mid_tangent.length() <= EPSILON {
                output.push(Segment::line(prev_end, next_start));
            } else {
                let apex = pivot + offset_normal(mid_tangent) * radius;
                let ctrl = apex * 2.0 - (prev_end + next_start) * 0.5;
                output.push(Segment::quadratic(prev_end, ctrl, next_start));
            }
        }
        LineJoin::Miter(limit) => {
            let a = LineSegment2F::new(prev_end, prev_end + out_tangent);
            let b = LineSegment2F::new(next_start, next_start + in_tangent);
            match a.intersection_t(b) {
                Some(t) => {
                    let miter_point = a.sample(t);
                    let miter_length = (miter_point - pivot).length();
                    if miter_length / radius.max(EPSILON) > limit.max(1.0) {
                        output.push(Segment::line(prev_end, next_start));
                    } else {
                        output.push(Segment::line(prev_end, miter_point));
                        output.push(Segment::line(miter_point, next_start));
                    }
                }
                None => output.push(Segment::line(prev_end, next_start)),
            }
        }
    }
}

/// The left normal of a unit tangent, the side all offsets use.
#[inline]
fn offset_normal(tangent: Vector2F) -> Vector2F {
    tangent.perp()
}

/// Offsets one segment to its left, subdividing until flat enough.
fn offset_segment(segment: &Segment, radius: f32, depth: u32, output: &mut Vec<Segment>) {
    match segment.kind {
        SegmentKind::Line => {
            let normal = offset_normal((segment.to - segment.from).normalize()) * radius;
            output.push(Segment::line(segment.from + normal, segment.to + normal));
        }
        SegmentKind::Quadratic => {
            let leg0 = (segment.ctrl0 - segment.from).normalize();
            let leg1 = (segment.to - segment.ctrl0).normalize();

            if leg0.length() <= EPSILON || leg1.length() <= EPSILON {
                let normal = offset_normal((segment.to - segment.from).normalize()) * radius;
                output.push(Segment::line(segment.from + normal, segment.to + normal));
                return;
            }

            if leg0.dot(leg1) < FLATNESS_COS && depth < MAX_OFFSET_DEPTH {
                let (before, after) = segment.split(0.5);
                offset_segment(&before, radius, depth + 1, output);
                offset_segment(&after, radius, depth + 1, output);
                return;
            }

            let from = segment.from + offset_normal(leg0) * radius;
            let to = segment.to + offset_normal(leg1) * radius;
            let a = LineSegment2F::new(from, from + leg0);
            let b = LineSegment2F::new(to, to - leg1);
            let ctrl = match a.intersection_t(b) {
                Some(t) => a.sample(t),
                None => segment.ctrl0 + (offset_normal(leg0) + offset_normal(leg1)) * (radius * 0.5),
            };
            output.push(Segment::quadratic(from, ctrl, to));
        }
        SegmentKind::Cubic => {
            // The stroker operates on quadratic paths; raise-and-split any
            // stray cubic.
            let (before, after) = segment.split(0.5);
            if depth >= MAX_OFFSET_DEPTH {
                let normal = offset_normal((segment.to - segment.from).normalize()) * radius;
                output.push(Segment::line(segment.from + normal, segment.to + normal));
            } else {
                offset_segment(&before, radius, depth + 1, output);
                offset_segment(&after, radius, depth + 1, output);
            }
        }
    }
}

fn push_segment(output: &mut QuadraticPath, segment: &Segment) {
    match segment.kind {
        SegmentKind::Line => output.line_to(segment.to),
        SegmentKind::Quadratic => output.quadratic_to(segment.ctrl0, segment.to),
        SegmentKind::Cubic => {
            // Should not occur; approximate with its endpoints' quadratic.
            output.quadratic_to(segment.ctrl0.lerp(segment.ctrl1, 0.5), segment.to)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_geometry::vector::vec2f;

    fn horizontal_line() -> QuadraticPath {
        let mut path = QuadraticPath::new();
        path.move_to(vec2f(0.0, 0.0));
        path.line_to(vec2f(100.0, 0.0));
        path
    }

    #[test]
    fn test_stroke_line_covers_band() {
        let style = StrokeStyle { width: 10.0, cap: LineCap::Butt, join: LineJoin::Bevel };
        let stroked = StrokeToFill::new(&horizontal_line(), style).into_path();
        assert!(!stroked.is_empty());

        // Points inside the band are covered, points outside are not.
        assert_ne!(stroked.winding_at(vec2f(50.0, 4.0)), 0);
        assert_ne!(stroked.winding_at(vec2f(50.0, -4.0)), 0);
        assert_eq!(stroked.winding_at(vec2f(50.0, 7.0)), 0);
        assert_eq!(stroked.winding_at(vec2f(-6.0, 0.0)), 0);
    }

    #[test]
    fn test_square_cap_extends() {
        let style = StrokeStyle { width: 10.0, cap: LineCap::Square, join: LineJoin::Bevel };
        let stroked = StrokeToFill::new(&horizontal_line(), style).into_path();
        assert_ne!(stroked.winding_at(vec2f(103.0, 0.0)), 0);
        assert_eq!(stroked.winding_at(vec2f(108.0, 0.0)), 0);
    }

    #[test]
    fn test_closed_contour_produces_ring() {
        let mut path = QuadraticPath::new();
        path.move_to(vec2f(0.0, 0.0));
        path.line_to(vec2f(100.0, 0.0));
        path.line_to(vec2f(100.0, 100.0));
        path.line_to(vec2f(0.0, 100.0));
        path.line_to(vec2f(0.0, 0.0));

        let style = StrokeStyle { width: 8.0, cap: LineCap::Butt, join: LineJoin::Miter(10.0) };
        let stroked = StrokeToFill::new(&path, style).into_path();

        // On the edge: covered. In the middle of the square: hole.
        assert_ne!(stroked.winding_at(vec2f(50.0, 1.0)), 0);
        assert_eq!(stroked.winding_at(vec2f(50.0, 50.0)), 0);
    }
}
