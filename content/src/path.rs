// vellum/content/src/path.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The editable path: an ordered point vector plus a packed command stream.
//!
//! Commands are stored two bits each, four to a byte, most significant pair
//! first. Each command consumes points from the point vector (Move 1, Line 1,
//! Quadratic 2, Cubic 3); the previous point implicitly supplies a segment's
//! start. Two optional dangling handles carry authoring state for the open
//! ends of an unclosed path.

use crate::encoding::{DecodeError, Decoder, EncodedData};
use crate::fit;
use crate::quadratic::QuadraticPath;
use crate::segment::{Segment, SegmentKind};
use crate::stroke::StrokeStyle;
use smallvec::SmallVec;
use std::collections::HashSet;
use std::f32::consts::PI;
use vellum_geometry::rect::RectF;
use vellum_geometry::transform2d::Transform2F;
use vellum_geometry::util::{self, EPSILON};
use vellum_geometry::vector::{vec2f, Vector2F};

/// Sentinel point index addressing the dangling in handle.
pub const IN_HANDLE_INDEX: usize = usize::max_value() - 1;
/// Sentinel point index addressing the dangling out handle.
pub const OUT_HANDLE_INDEX: usize = usize::max_value();

/// The magic control-point ratio that makes four cubics a near-circle.
const CIRCLE_RATIO: f32 = 0.552_284_8;

/// Default sampling resolution when refitting removed vertices.
const FIT_SAMPLES: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathCommand {
    Move = 0,
    Line = 1,
    Quadratic = 2,
    Cubic = 3,
}

impl PathCommand {
    #[inline]
    pub fn point_count(self) -> usize {
        match self {
            PathCommand::Move | PathCommand::Line => 1,
            PathCommand::Quadratic => 2,
            PathCommand::Cubic => 3,
        }
    }

    fn from_bits(bits: u8) -> PathCommand {
        match bits & 0b11 {
            0 => PathCommand::Move,
            1 => PathCommand::Line,
            2 => PathCommand::Quadratic,
            _ => PathCommand::Cubic,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathError {
    IndexOutOfRange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillRule {
    NonZero,
    EvenOdd,
}

impl FillRule {
    #[inline]
    pub fn includes(self, winding: i32) -> bool {
        match self {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => winding % 2 != 0,
        }
    }
}

/// A vertex and its incident commands and handles, the addressable unit for
/// direct-selection edits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexNode {
    pub point_index: usize,
    pub position: Vector2F,
    /// The command ending at this vertex, if any.
    pub in_command: Option<usize>,
    /// The command starting at this vertex, if any.
    pub out_command: Option<usize>,
    /// Point index of the incoming control point (sentinel for the dangling
    /// in handle).
    pub in_handle: Option<usize>,
    /// Point index of the outgoing control point (sentinel for the dangling
    /// out handle).
    pub out_handle: Option<usize>,
}

/// A segment plus its position within the path.
#[derive(Clone, Copy, Debug)]
pub struct SegmentRef {
    pub segment: Segment,
    pub command_index: usize,
    pub segment_index: usize,
    /// Index of the first point the command consumes.
    pub first_point_index: usize,
}

#[derive(Clone, Debug, Default)]
pub struct Path {
    points: Vec<Vector2F>,
    commands: Vec<u8>,
    commands_len: usize,
    closed: bool,
    in_handle: Option<Vector2F>,
    out_handle: Option<Vector2F>,
}

impl Path {
    #[inline]
    pub fn new() -> Path {
        Path::default()
    }

    /// Builds a path from raw parts, validating the command/point contract.
    pub fn from_parts(commands: Vec<PathCommand>,
                      points: Vec<Vector2F>,
                      closed: bool,
                      in_handle: Option<Vector2F>,
                      out_handle: Option<Vector2F>)
                      -> Result<Path, PathError> {
        if !commands.is_empty() && commands[0] != PathCommand::Move {
            return Err(PathError::IndexOutOfRange);
        }
        let expected: usize = commands.iter().map(|command| command.point_count()).sum();
        if expected != points.len() ||
                commands.iter().skip(1).any(|&command| command == PathCommand::Move) {
            return Err(PathError::IndexOutOfRange);
        }

        let mut path = Path {
            points,
            commands: vec![],
            commands_len: 0,
            closed,
            in_handle,
            out_handle,
        };
        for command in commands {
            path.push_command(command);
        }
        Ok(path)
    }

    // Accessors

    /// Whether the path holds no points at all.
    #[inline]
    pub fn is_vacant(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the path has no drawable segment. A lone Move is a single
    /// point, which is non-vacant but still empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands_len < 2
    }

    #[inline]
    pub fn closed(&self) -> bool {
        self.closed
    }

    #[inline]
    pub fn points(&self) -> &[Vector2F] {
        &self.points
    }

    #[inline]
    pub fn point_at(&self, point_index: usize) -> Option<Vector2F> {
        match point_index {
            IN_HANDLE_INDEX => self.in_handle,
            OUT_HANDLE_INDEX => self.out_handle,
            _ => self.points.get(point_index).copied(),
        }
    }

    #[inline]
    pub fn in_handle(&self) -> Option<Vector2F> {
        self.in_handle
    }

    #[inline]
    pub fn out_handle(&self) -> Option<Vector2F> {
        self.out_handle
    }

    #[inline]
    pub fn set_in_handle(&mut self, handle: Option<Vector2F>) {
        self.in_handle = handle;
    }

    #[inline]
    pub fn set_out_handle(&mut self, handle: Option<Vector2F>) {
        self.out_handle = handle;
    }

    /// The number of drawable segments.
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.commands_len.saturating_sub(1)
    }

    #[inline]
    pub fn command_len(&self) -> usize {
        self.commands_len
    }

    pub fn command_at(&self, index: usize) -> Option<PathCommand> {
        if index >= self.commands_len {
            return None;
        }
        let shift = 6 - (index % 4) * 2;
        Some(PathCommand::from_bits(self.commands[index / 4] >> shift))
    }

    fn command_unchecked(&self, index: usize) -> PathCommand {
        debug_assert!(index < self.commands_len);
        let shift = 6 - (index % 4) * 2;
        PathCommand::from_bits(self.commands[index / 4] >> shift)
    }

    /// Index of the first point consumed by the command at `command_index`.
    fn first_point_of_command(&self, command_index: usize) -> usize {
        let mut point_index = 0;
        for index in 0..command_index {
            point_index += self.command_unchecked(index).point_count();
        }
        point_index
    }

    // Building

    /// Starts the path. Repeated moves collapse onto the last one.
    pub fn move_to(&mut self, point: Vector2F) {
        debug_assert!(self.is_empty(), "cannot move_to on a path with segments");

        if !self.is_vacant() && self.command_unchecked(self.commands_len - 1) == PathCommand::Move {
            let last = self.points.len() - 1;
            self.points[last] = point;
            return;
        }

        self.points.push(point);
        self.push_command(PathCommand::Move);
    }

    pub fn line_to(&mut self, point: Vector2F) {
        debug_assert!(!self.is_vacant(), "cannot line_to on a vacant path");
        self.points.push(point);
        self.out_handle = None;
        self.push_command(PathCommand::Line);
    }

    pub fn quadratic_to(&mut self, ctrl: Vector2F, point: Vector2F) {
        debug_assert!(!self.is_vacant(), "cannot quadratic_to on a vacant path");
        self.points.push(ctrl);
        self.points.push(point);
        self.out_handle = None;
        self.push_command(PathCommand::Quadratic);
    }

    pub fn cubic_to(&mut self, ctrl0: Vector2F, ctrl1: Vector2F, point: Vector2F) {
        debug_assert!(!self.is_vacant(), "cannot cubic_to on a vacant path");

        // A cubic with both controls on its endpoints is a line.
        if ctrl0 == *self.points.last().unwrap() && ctrl1 == point {
            return self.line_to(point);
        }

        self.points.push(ctrl0);
        self.points.push(ctrl1);
        self.points.push(point);
        self.out_handle = None;
        self.push_command(PathCommand::Cubic);
    }

    /// Extends the path at the front with a line from `point` to the current
    /// first point.
    pub fn prepend_line(&mut self, point: Vector2F) {
        debug_assert!(!self.is_vacant(), "cannot prepend to a vacant path");
        self.points.insert(0, point);
        self.in_handle = None;
        self.insert_command(PathCommand::Line, 1);
    }

    /// Extends the path at the front with a cubic from `point`.
    pub fn prepend_cubic(&mut self, point: Vector2F, ctrl0: Vector2F, ctrl1: Vector2F) {
        debug_assert!(!self.is_vacant(), "cannot prepend to a vacant path");
        self.points.splice(0..0, [point, ctrl0, ctrl1].iter().copied());
        self.in_handle = None;
        self.insert_command(PathCommand::Cubic, 1);
    }

    /// An SVG-style elliptical arc, decomposed into cubics (at most one per
    /// quarter turn).
    pub fn arc_to(&mut self,
                  radius: Vector2F,
                  x_axis_rotation: f32,
                  large_arc: bool,
                  sweep: bool,
                  point: Vector2F) {
        debug_assert!(!self.is_vacant(), "cannot arc_to on a vacant path");

        let from = *self.points.last().unwrap();
        if (point - from).length() <= EPSILON {
            return;
        }

        let mut radius = radius.abs();
        if radius.x <= EPSILON || radius.y <= EPSILON {
            return self.line_to(point);
        }

        let (sin_th, cos_th) = x_axis_rotation.sin_cos();

        // Transform into the unit-circle space of the ellipse.
        let d0 = (from - point) * 0.5;
        let d1 = vec2f(cos_th * d0.x + sin_th * d0.y, -sin_th * d0.x + cos_th * d0.y);

        let check = (d1.x * d1.x) / (radius.x * radius.x) + (d1.y * d1.y) / (radius.y * radius.y);
        if check > 1.0 {
            radius *= check.sqrt();
        }

        let to_unit = |p: Vector2F| {
            vec2f((cos_th * p.x + sin_th * p.y) / radius.x,
                  (-sin_th * p.x + cos_th * p.y) / radius.y)
        };
        let p0 = to_unit(from);
        let p1 = to_unit(point);

        let d = (p1 - p0).square_length();
        let mut sfactor_sq = 1.0 / d - 0.25;
        if sfactor_sq < 0.0 {
            sfactor_sq = 0.0;
        }
        let mut sfactor = sfactor_sq.sqrt();
        if sweep == large_arc {
            sfactor = -sfactor;
        }

        let center = vec2f(
            0.5 * (p0.x + p1.x) - sfactor * (p1.y - p0.y),
            0.5 * (p0.y + p1.y) + sfactor * (p1.x - p0.x),
        );

        let th0 = (p0.y - center.y).atan2(p0.x - center.x);
        let th1 = (p1.y - center.y).atan2(p1.x - center.x);
        let mut th_arc = th1 - th0;
        if th_arc < 0.0 && sweep {
            th_arc += 2.0 * PI;
        } else if th_arc > 0.0 && !sweep {
            th_arc -= 2.0 * PI;
        }

        let from_unit = |p: Vector2F| {
            vec2f(cos_th * radius.x * p.x - sin_th * radius.y * p.y,
                  sin_th * radius.x * p.x + cos_th * radius.y * p.y)
        };

        let segment_count = (th_arc.abs() / (0.5 * PI + EPSILON)).ceil() as usize;
        for index in 0..segment_count {
            let th2 = th0 + index as f32 * th_arc / segment_count as f32;
            let th3 = th0 + (index + 1) as f32 * th_arc / segment_count as f32;

            let th_half = 0.5 * (th3 - th2);
            let sin_half = (th_half * 0.5).sin();
            let t = (8.0 / 3.0) * sin_half * sin_half / th_half.sin();

            let (sin_th2, cos_th2) = th2.sin_cos();
            let (sin_th3, cos_th3) = th3.sin_cos();

            let u1 = center + vec2f(cos_th2 - t * sin_th2, sin_th2 + t * cos_th2);
            let u3 = center + vec2f(cos_th3, sin_th3);
            let u2 = u3 + vec2f(t * sin_th3, -t * cos_th3);

            self.cubic_to(from_unit(u1), from_unit(u2), from_unit(u3));
        }
    }

    /// Closes the path: joins the last point to the first, with a line when
    /// no dangling handle is set, with a cubic through the handles otherwise.
    pub fn close(&mut self) {
        if self.is_vacant() || self.commands_len == 0 {
            return;
        }

        let first = self.points[0];
        let last = *self.points.last().unwrap();

        if (last - first).length() <= EPSILON {
            let index = self.points.len() - 1;
            self.points[index] = first;
        } else if self.in_handle.is_none() && self.out_handle.is_none() {
            self.line_to(first);
        } else {
            let ctrl0 = self.out_handle.unwrap_or(last);
            let ctrl1 = self.in_handle.unwrap_or(first);
            self.cubic_to(ctrl0, ctrl1, first);
        }

        self.in_handle = None;
        self.out_handle = None;
        self.closed = true;
    }

    // Shape constructors

    pub fn rect(rect: RectF) -> Path {
        let mut path = Path::new();
        path.move_to(rect.min);
        path.line_to(rect.upper_right());
        path.line_to(rect.max);
        path.line_to(rect.lower_left());
        path.close();
        path
    }

    pub fn round_rect(rect: RectF, radius: f32) -> Path {
        let radius = radius.min(rect.width() * 0.5).min(rect.height() * 0.5);
        if radius <= EPSILON {
            return Path::rect(rect);
        }

        let (min, max) = (rect.min, rect.max);
        let k = radius * CIRCLE_RATIO;
        let mut path = Path::new();
        path.move_to(vec2f(min.x + radius, min.y));
        path.line_to(vec2f(max.x - radius, min.y));
        path.cubic_to(vec2f(max.x - radius + k, min.y),
                      vec2f(max.x, min.y + radius - k),
                      vec2f(max.x, min.y + radius));
        path.line_to(vec2f(max.x, max.y - radius));
        path.cubic_to(vec2f(max.x, max.y - radius + k),
                      vec2f(max.x - radius + k, max.y),
                      vec2f(max.x - radius, max.y));
        path.line_to(vec2f(min.x + radius, max.y));
        path.cubic_to(vec2f(min.x + radius - k, max.y),
                      vec2f(min.x, max.y - radius + k),
                      vec2f(min.x, max.y - radius));
        path.line_to(vec2f(min.x, min.y + radius));
        path.cubic_to(vec2f(min.x, min.y + radius - k),
                      vec2f(min.x + radius - k, min.y),
                      vec2f(min.x + radius, min.y));
        path.close();
        path
    }

    pub fn ellipse(center: Vector2F, radius: Vector2F) -> Path {
        let top_left = center - radius;
        let bottom_right = center + radius;
        let cp = radius * CIRCLE_RATIO;

        let mut path = Path::new();
        path.move_to(vec2f(center.x, top_left.y));
        path.cubic_to(vec2f(center.x + cp.x, top_left.y),
                      vec2f(bottom_right.x, center.y - cp.y),
                      vec2f(bottom_right.x, center.y));
        path.cubic_to(vec2f(bottom_right.x, center.y + cp.y),
                      vec2f(center.x + cp.x, bottom_right.y),
                      vec2f(center.x, bottom_right.y));
        path.cubic_to(vec2f(center.x - cp.x, bottom_right.y),
                      vec2f(top_left.x, center.y + cp.y),
                      vec2f(top_left.x, center.y));
        path.cubic_to(vec2f(top_left.x, center.y - cp.y),
                      vec2f(center.x - cp.x, top_left.y),
                      vec2f(center.x, top_left.y));
        path.close();
        path
    }

    #[inline]
    pub fn circle(center: Vector2F, radius: f32) -> Path {
        Path::ellipse(center, Vector2F::splat(radius))
    }

    // Iteration

    pub fn segments(&self) -> Segments {
        Segments {
            path: self,
            front_command: 1,
            front_point: 1,
            back_command: self.commands_len,
            back_point: self.points.len(),
        }
    }

    /// Segments in reverse order, each reversed so iteration flows backward
    /// along the path.
    pub fn segments_rev(&self) -> impl Iterator<Item = SegmentRef> + '_ {
        self.segments().rev().map(|segment_ref| {
            let segment = segment_ref.segment;
            let reversed = match segment.kind {
                SegmentKind::Line => Segment::line(segment.to, segment.from),
                SegmentKind::Quadratic => {
                    Segment::quadratic(segment.to, segment.ctrl0, segment.from)
                }
                SegmentKind::Cubic => {
                    Segment::cubic(segment.to, segment.ctrl1, segment.ctrl0, segment.from)
                }
            };
            SegmentRef { segment: reversed, ..segment_ref }
        })
    }

    pub fn segment_at(&self, segment_index: usize) -> Option<SegmentRef> {
        self.segments().nth(segment_index)
    }

    // Vertices

    /// Point indices of the on-curve vertices, excluding the duplicated
    /// closing point of a closed path.
    pub fn vertex_indices(&self) -> Vec<usize> {
        let mut indices = vec![];
        let mut point_index = 0;
        for command_index in 0..self.commands_len {
            let command = self.command_unchecked(command_index);
            point_index += command.point_count();
            indices.push(point_index - 1);
        }
        if self.closed && indices.len() > 1 {
            indices.pop();
        }
        indices
    }

    pub fn is_vertex(&self, point_index: usize) -> bool {
        if point_index >= self.points.len() {
            return false;
        }
        let mut next_point = 0;
        for command_index in 0..self.commands_len {
            next_point += self.command_unchecked(command_index).point_count();
            if point_index == next_point - 1 {
                return true;
            }
            if point_index < next_point {
                return false;
            }
        }
        false
    }

    /// Whether `point_index` is the open end of an unclosed path.
    pub fn is_open_end(&self, point_index: usize) -> bool {
        if self.closed || self.is_vacant() {
            return false;
        }
        point_index == 0 || point_index == self.points.len() - 1
    }

    /// Describes the vertex at `point_index` and its incident commands and
    /// control points.
    pub fn node_at(&self, point_index: usize) -> Option<VertexNode> {
        if !self.is_vertex(point_index) {
            return None;
        }

        let position = self.points[point_index];
        let mut node = VertexNode {
            point_index,
            position,
            in_command: None,
            out_command: None,
            in_handle: None,
            out_handle: None,
        };

        // The command consuming this point as its endpoint, and the next one.
        let mut next_point = 0;
        let mut in_command = None;
        for command_index in 0..self.commands_len {
            next_point += self.command_unchecked(command_index).point_count();
            if point_index == next_point - 1 {
                in_command = Some(command_index);
                break;
            }
        }
        let in_command = in_command?;

        if in_command > 0 {
            node.in_command = Some(in_command);
            if self.command_unchecked(in_command) == PathCommand::Cubic {
                node.in_handle = Some(point_index - 1);
            }
        } else if self.closed {
            // The first vertex's in segment is the closing command.
            let last = self.commands_len - 1;
            node.in_command = Some(last);
            if self.command_unchecked(last) == PathCommand::Cubic {
                node.in_handle = Some(self.points.len() - 2);
            }
        } else if self.in_handle.is_some() {
            node.in_handle = Some(IN_HANDLE_INDEX);
        }

        let is_last_point = point_index == self.points.len() - 1;
        let out_command = if is_last_point {
            if self.closed { Some(1) } else { None }
        } else {
            Some(in_command + 1)
        };

        match out_command {
            Some(out_command) if out_command < self.commands_len => {
                node.out_command = Some(out_command);
                if self.command_unchecked(out_command) == PathCommand::Cubic {
                    let first = self.first_point_of_command(out_command);
                    node.out_handle = Some(first);
                }
            }
            _ => {
                if self.out_handle.is_some() {
                    node.out_handle = Some(OUT_HANDLE_INDEX);
                }
            }
        }

        Some(node)
    }

    // Editing

    /// Translates a point (or a dangling handle, via the sentinel indices).
    pub fn translate_point(&mut self, point_index: usize, delta: Vector2F)
                           -> Result<(), PathError> {
        match point_index {
            IN_HANDLE_INDEX => match self.in_handle {
                Some(ref mut handle) => *handle += delta,
                None => return Err(PathError::IndexOutOfRange),
            },
            OUT_HANDLE_INDEX => match self.out_handle {
                Some(ref mut handle) => *handle += delta,
                None => return Err(PathError::IndexOutOfRange),
            },
            _ => {
                if point_index >= self.points.len() {
                    return Err(PathError::IndexOutOfRange);
                }
                self.points[point_index] += delta;
                // Keep the closing duplicate in sync.
                if self.closed {
                    let last = self.points.len() - 1;
                    if point_index == 0 {
                        self.points[last] = self.points[0];
                    } else if point_index == last {
                        self.points[0] = self.points[last];
                    }
                }
            }
        }
        Ok(())
    }

    /// Converts the command at `command_index` to a line, dropping its
    /// control points. Returns `reference_point` adjusted for the removals.
    pub fn to_line(&mut self, command_index: usize, reference_point: usize)
                   -> Result<usize, PathError> {
        if command_index >= self.commands_len {
            return Err(PathError::IndexOutOfRange);
        }

        let command = self.command_unchecked(command_index);
        if command == PathCommand::Line || command == PathCommand::Move {
            return Ok(reference_point);
        }

        let first = self.first_point_of_command(command_index);
        let removed = command.point_count() - 1;
        self.points.drain(first..first + removed);
        self.replace_command(command_index, PathCommand::Line);

        Ok(if reference_point > first { reference_point - removed } else { reference_point })
    }

    /// Converts the command at `command_index` to a cubic, losslessly.
    /// Returns `reference_point` adjusted for the insertions.
    pub fn to_cubic(&mut self, command_index: usize, reference_point: usize)
                    -> Result<usize, PathError> {
        if command_index >= self.commands_len {
            return Err(PathError::IndexOutOfRange);
        }

        let command = self.command_unchecked(command_index);
        if command == PathCommand::Cubic || command == PathCommand::Move {
            return Ok(reference_point);
        }

        let first = self.first_point_of_command(command_index);

        if command == PathCommand::Line {
            let from = self.points[first - 1];
            let to = self.points[first];
            let third = (to - from) * (1.0 / 3.0);
            self.points.splice(first..first, [from + third, to - third].iter().copied());
            self.replace_command(command_index, PathCommand::Cubic);
            return Ok(if reference_point >= first { reference_point + 2 } else { reference_point });
        }

        // Quadratic: exact cubic equivalent.
        let p0 = self.points[first - 1];
        let p1 = self.points[first];
        let p2 = self.points[first + 1];
        let ctrl0 = p0 + (p1 - p0) * (2.0 / 3.0);
        let ctrl1 = p2 + (p1 - p2) * (2.0 / 3.0);

        self.points[first] = ctrl0;
        self.points.insert(first + 1, ctrl1);
        self.replace_command(command_index, PathCommand::Cubic);

        Ok(if reference_point >= first + 1 { reference_point + 1 } else { reference_point })
    }

    /// Splits the segment at `segment_index` at parameter `t`, inserting a
    /// new vertex. Returns the new vertex's point index.
    pub fn split(&mut self, segment_index: usize, t: f32) -> Result<usize, PathError> {
        let segment_ref = match self.segment_at(segment_index) {
            None => return Err(PathError::IndexOutOfRange),
            Some(segment_ref) => segment_ref,
        };
        let t = util::clamp(t, 0.0, 1.0);
        let first = segment_ref.first_point_index;
        let command_index = segment_ref.command_index;
        let (before, after) = segment_ref.segment.split(t);

        match segment_ref.segment.kind {
            SegmentKind::Line => {
                self.points.insert(first, before.to);
                self.insert_command(PathCommand::Line, command_index + 1);
                Ok(first)
            }
            SegmentKind::Quadratic => {
                // points[first] = ctrl, points[first + 1] = to.
                self.points[first] = before.ctrl0;
                self.points.splice(first + 1..first + 1,
                                   [before.to, after.ctrl0].iter().copied());
                self.insert_command(PathCommand::Quadratic, command_index + 1);
                Ok(first + 1)
            }
            SegmentKind::Cubic => {
                // points[first..first + 3] = ctrl0, ctrl1, to.
                self.points[first] = before.ctrl0;
                self.points[first + 1] = after.ctrl1;
                self.points.splice(first + 1..first + 1,
                                   [before.ctrl1, before.to, after.ctrl0].iter().copied());
                self.insert_command(PathCommand::Cubic, command_index + 1);
                Ok(first + 2)
            }
        }
    }

    /// Removes the vertex at `point_index`, joining its two incident
    /// segments into one cubic. With `keep_shape` the replacement is fitted
    /// through samples of both segments; otherwise control points are
    /// concatenated geometrically.
    pub fn remove(&mut self, point_index: usize, keep_shape: bool) -> Result<(), PathError> {
        if point_index >= self.points.len() {
            return Err(PathError::IndexOutOfRange);
        }
        if self.is_empty() {
            return Ok(());
        }

        // The duplicated closing point aliases the first vertex.
        let target = if self.closed && point_index == self.points.len() - 1 {
            0
        } else {
            point_index
        };

        if target == 0 && !self.closed {
            return self.remove_open_front();
        }
        if !self.is_vertex(target) {
            return Err(PathError::IndexOutOfRange);
        }

        // Locate the incident segments.
        let (in_ref, out_ref) = if target == 0 {
            let last = self.segment_count() - 1;
            (self.segment_at(last).unwrap(), self.segment_at(0).unwrap())
        } else {
            let mut in_ref = None;
            for segment_ref in self.segments() {
                let end = segment_ref.first_point_index + segment_ref.segment.point_count() - 1;
                if end == target {
                    in_ref = Some(segment_ref);
                    break;
                }
            }
            let in_ref = in_ref.ok_or(PathError::IndexOutOfRange)?;
            match self.segment_at(in_ref.segment_index + 1) {
                Some(out_ref) => (in_ref, out_ref),
                None => return self.remove_open_back(in_ref),
            }
        };

        // A two-segment closed path collapses to a single point with
        // dangling handles. The surviving vertex is the one not removed.
        if self.segment_count() == 2 && self.closed {
            let position = in_ref.segment.from;
            let out_handle = match in_ref.segment.kind {
                SegmentKind::Cubic => in_ref.segment.ctrl0,
                _ => position,
            };
            let in_handle = match out_ref.segment.kind {
                SegmentKind::Cubic => out_ref.segment.ctrl1,
                _ => position,
            };

            self.points.clear();
            self.commands.clear();
            self.commands_len = 0;
            self.closed = false;
            self.move_to(position);
            self.in_handle = Some(in_handle);
            self.out_handle = Some(out_handle);
            return Ok(());
        }

        let joined = join_segments(&in_ref.segment, &out_ref.segment, keep_shape);

        if target == 0 {
            // Rebuild: drop the last segment, rewrite the first as the joined
            // cubic starting from the old in-segment's start.
            let in_command = in_ref.command_index;
            let in_first = in_ref.first_point_index;

            // Remove the closing segment's points (its endpoint duplicates
            // point 0) and command.
            self.points.drain(in_first..);
            self.remove_command(in_command);

            // Rewrite the former first segment in place.
            let out_count = out_ref.segment.point_count();
            self.points.splice(0..out_count + 1,
                               [joined.from, joined.ctrl0, joined.ctrl1, joined.to]
                                   .iter()
                                   .copied());
            self.replace_command(1, PathCommand::Cubic);

            // Close the loop again: append the start point duplicate.
            let first = self.points[0];
            let last = *self.points.last().unwrap();
            if (last - first).length() > EPSILON {
                self.line_to(first);
            }
        } else {
            let in_first = in_ref.first_point_index;
            let in_count = in_ref.segment.point_count();
            let out_count = out_ref.segment.point_count();

            // Replace both segments' consumed points with the cubic's
            // interior points.
            self.points.splice(in_first..in_first + in_count + out_count,
                               [joined.ctrl0, joined.ctrl1, joined.to].iter().copied());
            self.replace_command(in_ref.command_index, PathCommand::Cubic);
            self.remove_command(out_ref.command_index);
        }

        Ok(())
    }

    fn remove_open_front(&mut self) -> Result<(), PathError> {
        let front = self.segment_at(0).ok_or(PathError::IndexOutOfRange)?;
        let count = front.segment.point_count();
        self.points.drain(0..count);
        self.remove_command(1);
        self.in_handle = None;
        Ok(())
    }

    fn remove_open_back(&mut self, in_ref: SegmentRef) -> Result<(), PathError> {
        let first = in_ref.first_point_index;
        self.points.drain(first..);
        self.remove_command(in_ref.command_index);
        self.out_handle = None;
        Ok(())
    }

    // Queries

    pub fn bounding_rect(&self) -> RectF {
        if self.is_empty() {
            match self.points.first() {
                None => return RectF::default(),
                Some(&point) => return RectF::from_points(point, point),
            }
        }

        let mut rect: Option<RectF> = None;
        for segment_ref in self.segments() {
            let segment_rect = segment_ref.segment.bounding_rect();
            rect = Some(match rect {
                None => segment_rect,
                Some(rect) => rect.union_rect(segment_rect),
            });
        }
        rect.unwrap_or_default()
    }

    pub fn bounding_rect_transformed(&self, transform: &Transform2F) -> RectF {
        if self.is_empty() {
            match self.points.first() {
                None => return RectF::default(),
                Some(&point) => {
                    let point = *transform * point;
                    return RectF::from_points(point, point);
                }
            }
        }

        let mut rect: Option<RectF> = None;
        for segment_ref in self.segments() {
            let segment_rect = segment_ref.segment.transform(transform).bounding_rect();
            rect = Some(match rect {
                None => segment_rect,
                Some(rect) => rect.union_rect(segment_rect),
            });
        }
        rect.unwrap_or_default()
    }

    /// Hull of all control points and dangling handles. Cheap and
    /// conservative.
    pub fn approx_bounding_rect(&self) -> RectF {
        let mut points = self.points.iter();
        let first = match points.next() {
            None => return RectF::default(),
            Some(&first) => first,
        };
        let mut rect = RectF::from_points(first, first);
        for &point in points {
            rect = rect.union_point(point);
        }
        if let Some(handle) = self.in_handle {
            rect = rect.union_point(handle);
        }
        if let Some(handle) = self.out_handle {
            rect = rect.union_point(handle);
        }
        rect
    }

    /// Whether `point` (scene space) hits the filled and/or stroked path.
    pub fn hit_test(&self,
                    point: Vector2F,
                    fill: Option<FillRule>,
                    stroke: Option<&StrokeStyle>,
                    transform: &Transform2F,
                    threshold: f32,
                    zoom: f32)
                    -> bool {
        if self.is_empty() {
            return false;
        }

        let padding = threshold + stroke.map_or(0.0, |stroke| stroke.width * 0.5);
        let bounds = self.bounding_rect_transformed(transform).dilate(padding);
        if !bounds.contains_point(point) {
            return false;
        }

        if let Some(rule) = fill {
            let mut quadratics = self.to_quadratics(flatten_tolerance(zoom));
            quadratics.transform(transform);
            if rule.includes(quadratics.winding_at(point)) {
                return true;
            }
        }

        if let Some(stroke) = stroke {
            let distance_limit = threshold + stroke.width * 0.5;
            for segment_ref in self.segments() {
                let segment = segment_ref.segment.transform(transform);
                if segment.distance_to_point(point) <= distance_limit {
                    return true;
                }
            }
        }

        false
    }

    /// Whether `point` lies within `threshold` of the given segment
    /// (plus half the stroke width, when stroked).
    pub fn is_point_inside_segment(&self,
                                   segment_index: usize,
                                   point: Vector2F,
                                   stroke: Option<&StrokeStyle>,
                                   transform: &Transform2F,
                                   threshold: f32)
                                   -> bool {
        match self.segment_at(segment_index) {
            None => false,
            Some(segment_ref) => {
                let limit = threshold + stroke.map_or(0.0, |stroke| stroke.width * 0.5);
                segment_ref.segment.transform(transform).distance_to_point(point) <= limit
            }
        }
    }

    /// Whether `point` lies within `threshold` of the path point at
    /// `point_index` (sentinels address the dangling handles).
    pub fn is_point_inside_point(&self,
                                 point_index: usize,
                                 point: Vector2F,
                                 transform: &Transform2F,
                                 threshold: f32)
                                 -> bool {
        match self.point_at(point_index) {
            None => false,
            Some(candidate) => (*transform * candidate - point).length() <= threshold,
        }
    }

    /// Whether the path intersects `rect`. When `out_vertices` is provided,
    /// it collects the vertex indices inside the rectangle.
    pub fn intersects_rect(&self,
                           rect: RectF,
                           transform: &Transform2F,
                           mut out_vertices: Option<&mut HashSet<usize>>)
                           -> bool {
        if self.is_vacant() {
            return false;
        }
        if !self.bounding_rect_transformed(transform).intersects(rect) {
            return false;
        }

        let mut hit = false;

        // Fast path: vertices inside the rectangle.
        for vertex_index in self.vertex_indices() {
            let position = *transform * self.points[vertex_index];
            if rect.contains_point(position) {
                hit = true;
                match out_vertices {
                    Some(ref mut vertices) => {
                        vertices.insert(vertex_index);
                    }
                    None => return true,
                }
            }
        }

        if hit && out_vertices.is_none() {
            return true;
        }
        if !hit {
            for segment_ref in self.segments() {
                if segment_ref.segment.transform(transform).intersects_rect(rect) {
                    return true;
                }
            }
        }
        hit
    }

    // Conversion

    /// Approximates the path with lines and quadratics within `tolerance`.
    ///
    /// Cubics are split at their inflection parameters, then each monotonic
    /// piece is approximated by a single quadratic when the error bound
    /// `sqrt(3)/36 · |(p3 − 3·p2) + (3·p1 − p0)|` permits, bisecting
    /// otherwise.
    pub fn to_quadratics(&self, tolerance: f32) -> QuadraticPath {
        let mut quadratics = QuadraticPath::new();
        if self.is_empty() {
            return quadratics;
        }

        quadratics.move_to(self.points[0]);
        for segment_ref in self.segments() {
            let segment = segment_ref.segment;
            match segment.kind {
                SegmentKind::Line => quadratics.line_to(segment.to),
                SegmentKind::Quadratic => quadratics.quadratic_to(segment.ctrl0, segment.to),
                SegmentKind::Cubic => cubic_to_quadratics(&segment, tolerance, &mut quadratics),
            }
        }
        quadratics
    }

    // Encoding

    pub fn encode(&self, data: &mut EncodedData) {
        if self.is_vacant() {
            data.uint32(0);
            return;
        }

        data.uint32(self.commands_len as u32);
        data.byte_vector(&self.commands);
        data.vec2_vector(&self.points);
        data.boolean(self.closed);
        data.boolean(self.in_handle.is_some());
        if let Some(handle) = self.in_handle {
            data.vec2(handle);
        }
        data.boolean(self.out_handle.is_some());
        if let Some(handle) = self.out_handle {
            data.vec2(handle);
        }
    }

    pub fn decode(decoder: &mut Decoder) -> Result<Path, DecodeError> {
        let commands_len = decoder.uint32()? as usize;
        if commands_len == 0 {
            return Ok(Path::new());
        }

        let commands = decoder.byte_vector()?;
        if commands.len() != (commands_len + 3) / 4 {
            return Err(DecodeError::InvalidValue);
        }
        let points = decoder.vec2_vector()?;
        let closed = decoder.boolean()?;
        let in_handle = if decoder.boolean()? { Some(decoder.vec2()?) } else { None };
        let out_handle = if decoder.boolean()? { Some(decoder.vec2()?) } else { None };

        let path = Path {
            points,
            commands,
            commands_len,
            closed,
            in_handle,
            out_handle,
        };

        // Re-validate the command/point contract before accepting the data.
        let mut expected = 0;
        for index in 0..path.commands_len {
            if index == 0 && path.command_unchecked(0) != PathCommand::Move {
                return Err(DecodeError::InvalidValue);
            }
            if index > 0 && path.command_unchecked(index) == PathCommand::Move {
                return Err(DecodeError::InvalidValue);
            }
            expected += path.command_unchecked(index).point_count();
        }
        if expected != path.points.len() {
            return Err(DecodeError::InvalidValue);
        }
        Ok(path)
    }

    // Packed command stream

    fn push_command(&mut self, command: PathCommand) {
        let rem = self.commands_len % 4;
        if rem == 0 {
            self.commands.push((command as u8) << 6);
        } else {
            self.commands[self.commands_len / 4] |= (command as u8) << (6 - rem * 2);
        }
        self.commands_len += 1;
    }

    fn insert_command(&mut self, command: PathCommand, index: usize) {
        if index >= self.commands_len {
            return self.push_command(command);
        }

        let mut unpacked: Vec<PathCommand> =
            (0..self.commands_len).map(|i| self.command_unchecked(i)).collect();
        unpacked.insert(index, command);

        self.commands.clear();
        self.commands_len = 0;
        for command in unpacked {
            self.push_command(command);
        }
    }

    fn replace_command(&mut self, index: usize, command: PathCommand) {
        debug_assert!(index < self.commands_len);
        let shift = 6 - (index % 4) * 2;
        self.commands[index / 4] &= !(0b11 << shift);
        self.commands[index / 4] |= (command as u8) << shift;
    }

    fn remove_command(&mut self, index: usize) {
        debug_assert!(index < self.commands_len);

        if index == self.commands_len - 1 {
            let rem = index % 4;
            if rem == 0 {
                self.commands.pop();
            } else {
                self.commands[index / 4] &= !(0b11 << (6 - rem * 2));
            }
            self.commands_len -= 1;
            return;
        }

        let mut unpacked: Vec<PathCommand> =
            (0..self.commands_len).map(|i| self.command_unchecked(i)).collect();
        unpacked.remove(index);

        self.commands.clear();
        self.commands_len = 0;
        for command in unpacked {
            self.push_command(command);
        }
    }
}

/// Segment iterator: walks the command stream forward (or backward),
/// yielding drawable segments and their cursor positions.
pub struct Segments<'a> {
    path: &'a Path,
    front_command: usize,
    front_point: usize,
    back_command: usize,
    back_point: usize,
}

impl<'a> Segments<'a> {
    fn segment_for_command(&self, command_index: usize, first_point: usize) -> SegmentRef {
        let path = self.path;
        let command = path.command_unchecked(command_index);
        let points = &path.points;
        let from = points[first_point - 1];

        let segment = match command {
            PathCommand::Move => unreachable!("moves cannot follow the first command"),
            PathCommand::Line => Segment::line(from, points[first_point]),
            PathCommand::Quadratic => {
                Segment::quadratic(from, points[first_point], points[first_point + 1])
            }
            PathCommand::Cubic => {
                Segment::cubic(from,
                               points[first_point],
                               points[first_point + 1],
                               points[first_point + 2])
            }
        };

        SegmentRef {
            segment,
            command_index,
            segment_index: command_index - 1,
            first_point_index: first_point,
        }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = SegmentRef;

    fn next(&mut self) -> Option<SegmentRef> {
        if self.front_command >= self.back_command {
            return None;
        }
        let segment_ref = self.segment_for_command(self.front_command, self.front_point);
        self.front_point += segment_ref.segment.point_count();
        self.front_command += 1;
        Some(segment_ref)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back_command.saturating_sub(self.front_command);
        (len, Some(len))
    }
}

impl<'a> DoubleEndedIterator for Segments<'a> {
    fn next_back(&mut self) -> Option<SegmentRef> {
        if self.back_command <= self.front_command {
            return None;
        }
        let command_index = self.back_command - 1;
        let count = self.path.command_unchecked(command_index).point_count();
        let first_point = self.back_point - count;
        let segment_ref = self.segment_for_command(command_index, first_point);
        self.back_command = command_index;
        self.back_point = first_point;
        Some(segment_ref)
    }
}

impl<'a> ExactSizeIterator for Segments<'a> {}

bitflags! {
    /// Classification of a single path point within its command.
    pub struct PointFlags: u8 {
        const CONTROL_0 = 0x1;
        const CONTROL_1 = 0x2;
    }
}

impl Path {
    /// Whether the point at `point_index` is a control point, and which one.
    pub fn point_flags(&self, point_index: usize) -> PointFlags {
        let mut next_point = 0;
        for command_index in 0..self.commands_len {
            let command = self.command_unchecked(command_index);
            let first = next_point;
            next_point += command.point_count();
            if point_index >= next_point {
                continue;
            }
            return match (command, point_index - first) {
                (PathCommand::Quadratic, 0) | (PathCommand::Cubic, 0) => PointFlags::CONTROL_0,
                (PathCommand::Cubic, 1) => PointFlags::CONTROL_1,
                _ => PointFlags::empty(),
            };
        }
        PointFlags::empty()
    }
}

/// The flattening tolerance at a given zoom, in scene units.
#[inline]
pub fn flatten_tolerance(zoom: f32) -> f32 {
    0.02 / zoom.max(EPSILON)
}

/// Joins two adjacent segments into one cubic, dropping their shared vertex.
fn join_segments(in_segment: &Segment, out_segment: &Segment, keep_shape: bool) -> Segment {
    if keep_shape {
        let mut samples: SmallVec<[Vector2F; 36]> = SmallVec::new();
        for index in 0..=FIT_SAMPLES {
            samples.push(in_segment.sample(index as f32 / FIT_SAMPLES as f32));
        }
        for index in 1..=FIT_SAMPLES {
            samples.push(out_segment.sample(index as f32 / FIT_SAMPLES as f32));
        }
        if let Some(cubic) = fit::fit_single_cubic(&samples) {
            return cubic;
        }
    }

    let in_cubic = in_segment.to_cubic();
    let out_cubic = out_segment.to_cubic();
    Segment::cubic(in_cubic.from, in_cubic.ctrl0, out_cubic.ctrl1, out_cubic.to)
}

/// The upper bound on the distance between a cubic and its single-quadratic
/// approximation. See the classic cubic-to-quadratic error analysis.
#[inline]
fn single_quadratic_error(cubic: &Segment) -> f32 {
    (3.0f32).sqrt() / 36.0 *
        ((cubic.to - cubic.ctrl1 * 3.0) + (cubic.ctrl0 * 3.0 - cubic.from)).length()
}

/// The control point of the single-quadratic approximation: the intersection
/// of the cubic's end tangents, or the midpoint fallback for parallel
/// tangents.
fn single_quadratic_ctrl(cubic: &Segment) -> Vector2F {
    if (cubic.from - cubic.ctrl0).length() <= EPSILON {
        return cubic.ctrl1;
    }
    if (cubic.ctrl1 - cubic.to).length() <= EPSILON {
        return cubic.ctrl0;
    }

    let (p0, p1, p2, p3) = (cubic.from, cubic.ctrl0, cubic.ctrl1, cubic.to);
    let d = (p0.x - p1.x) * (p2.y - p3.y) - (p0.y - p1.y) * (p2.x - p3.x);

    if util::approx_zero(d, EPSILON) {
        let a = (p1 * 3.0 - p0) * 0.5;
        let b = (p2 * 3.0 - p3) * 0.5;
        return (a + b) * 0.5;
    }

    let pre = p0.x * p1.y - p0.y * p1.x;
    let post = p2.x * p3.y - p2.y * p3.x;
    vec2f(
        (pre * (p2.x - p3.x) - (p0.x - p1.x) * post) / d,
        (pre * (p2.y - p3.y) - (p0.y - p1.y) * post) / d,
    )
}

/// Approximates a monotonic cubic with quadratics, advancing a parameter
/// interval and bisecting while the error bound exceeds `tolerance`.
fn monotonic_cubic_to_quadratics(cubic: &Segment, tolerance: f32, sink: &mut QuadraticPath) {
    let mut sub_curve = *cubic;
    let mut t_min = 0.0f32;
    let mut t_max = 1.0f32;

    loop {
        if single_quadratic_error(&sub_curve) <= tolerance {
            sink.quadratic_to(single_quadratic_ctrl(&sub_curve), sub_curve.to);
            if t_max >= 1.0 {
                return;
            }
            t_min = t_max;
            t_max = 1.0;
        } else {
            t_max = (t_min + t_max) * 0.5;
        }

        sub_curve = cubic.split_range(t_min, t_max);
    }
}

/// Splits a cubic at its inflection (or cusp) parameters and approximates
/// each piece.
fn cubic_to_quadratics(cubic: &Segment, tolerance: f32, sink: &mut QuadraticPath) {
    let mut ts: SmallVec<[f32; 2]> = SmallVec::new();
    if let Some((t_cusp, t_loop)) = cubic.inflection_params() {
        if t_loop > EPSILON {
            let delta = t_loop.sqrt();
            for &t in &[t_cusp - delta, t_cusp + delta] {
                if t > EPSILON && t < 1.0 - EPSILON {
                    ts.push(t);
                }
            }
        } else if t_loop > -EPSILON && t_cusp > EPSILON && t_cusp < 1.0 - EPSILON {
            // A cusp: split there and treat each side independently.
            ts.push(t_cusp);
        }
    }

    if ts.is_empty() {
        monotonic_cubic_to_quadratics(cubic, tolerance, sink);
        return;
    }

    let mut last_t = 0.0;
    for &t in ts.iter() {
        monotonic_cubic_to_quadratics(&cubic.split_range(last_t, t), tolerance, sink);
        last_t = t;
    }
    monotonic_cubic_to_quadratics(&cubic.split_range(last_t, 1.0), tolerance, sink);
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen};

    fn square() -> Path {
        Path::rect(RectF::from_points(vec2f(10.0, 10.0), vec2f(110.0, 110.0)))
    }

    #[track_caller]
    fn check_invariants(path: &Path) {
        if path.commands_len > 0 {
            assert_eq!(path.command_at(0), Some(PathCommand::Move));
        }
        let mut expected = 0;
        for index in 0..path.commands_len {
            let command = path.command_at(index).unwrap();
            if index > 0 {
                assert_ne!(command, PathCommand::Move);
            }
            expected += command.point_count();
        }
        assert_eq!(expected, path.points().len());
        if path.closed() && !path.is_empty() {
            assert_eq!(path.points()[0], *path.points().last().unwrap());
        }
    }

    #[test]
    fn test_rect_construction() {
        let path = square();
        check_invariants(&path);
        assert!(path.closed());
        assert_eq!(path.segment_count(), 4);
        let rect = path.bounding_rect();
        assert_eq!(rect.min, vec2f(10.0, 10.0));
        assert_eq!(rect.max, vec2f(110.0, 110.0));
    }

    #[test]
    fn test_packed_commands() {
        let mut path = Path::new();
        path.move_to(vec2f(0.0, 0.0));
        path.line_to(vec2f(1.0, 0.0));
        path.quadratic_to(vec2f(2.0, 1.0), vec2f(3.0, 0.0));
        path.cubic_to(vec2f(4.0, 1.0), vec2f(5.0, -1.0), vec2f(6.0, 0.0));
        path.line_to(vec2f(7.0, 0.0));

        let expected = [
            PathCommand::Move,
            PathCommand::Line,
            PathCommand::Quadratic,
            PathCommand::Cubic,
            PathCommand::Line,
        ];
        for (index, &command) in expected.iter().enumerate() {
            assert_eq!(path.command_at(index), Some(command));
        }
        assert_eq!(path.command_at(5), None);
        check_invariants(&path);
    }

    #[test]
    fn test_command_insert_remove() {
        let mut path = Path::new();
        path.move_to(vec2f(0.0, 0.0));
        for index in 0..9 {
            path.line_to(vec2f(index as f32 + 1.0, 0.0));
        }
        check_invariants(&path);

        let new_vertex = path.split(4, 0.5).unwrap();
        check_invariants(&path);
        assert_eq!(path.points()[new_vertex], vec2f(4.5, 0.0));
        assert_eq!(path.segment_count(), 10);
    }

    #[test]
    fn test_to_cubic_and_back() {
        let mut path = Path::new();
        path.move_to(vec2f(0.0, 0.0));
        path.line_to(vec2f(30.0, 0.0));
        path.line_to(vec2f(30.0, 30.0));

        let reference = path.to_cubic(1, 2).unwrap();
        check_invariants(&path);
        assert_eq!(path.command_at(1), Some(PathCommand::Cubic));
        // Two control points inserted before the old endpoint of segment 2.
        assert_eq!(reference, 4);
        // The raise is lossless: collinear control points.
        assert_eq!(path.points()[1], vec2f(10.0, 0.0));
        assert_eq!(path.points()[2], vec2f(20.0, 0.0));

        let reference = path.to_line(1, reference).unwrap();
        check_invariants(&path);
        assert_eq!(path.command_at(1), Some(PathCommand::Line));
        assert_eq!(reference, 2);
    }

    #[test]
    fn test_translate_closed_keeps_duplicate_in_sync() {
        let mut path = square();
        path.translate_point(0, vec2f(5.0, 5.0)).unwrap();
        check_invariants(&path);
        assert_eq!(path.points()[0], vec2f(15.0, 15.0));
    }

    #[test]
    fn test_translate_out_of_range() {
        let mut path = square();
        assert_eq!(path.translate_point(100, vec2f(1.0, 1.0)),
                   Err(PathError::IndexOutOfRange));
        assert_eq!(path.translate_point(IN_HANDLE_INDEX, vec2f(1.0, 1.0)),
                   Err(PathError::IndexOutOfRange));
    }

    #[test]
    fn test_remove_vertex_concat() {
        let mut path = square();
        let vertices = path.vertex_indices();
        assert_eq!(vertices.len(), 4);

        path.remove(1, false).unwrap();
        check_invariants(&path);
        assert_eq!(path.segment_count(), 3);
        assert!(path.closed());
    }

    #[test]
    fn test_remove_vertex_keep_shape_stays_close() {
        let mut path = Path::new();
        path.move_to(vec2f(0.0, 0.0));
        path.line_to(vec2f(50.0, 0.0));
        path.line_to(vec2f(100.0, 0.0));
        path.line_to(vec2f(100.0, 100.0));

        // Removing the collinear vertex must keep the horizontal edge.
        path.remove(1, true).unwrap();
        check_invariants(&path);
        let segment = path.segment_at(0).unwrap().segment;
        for step in 0..=8 {
            let point = segment.sample(step as f32 / 8.0);
            assert!(point.y.abs() < 0.5, "{:?}", point);
        }
    }

    #[test]
    fn test_remove_two_segment_closed_path_leaves_point() {
        let mut path = Path::new();
        path.move_to(vec2f(0.0, 0.0));
        path.cubic_to(vec2f(10.0, 10.0), vec2f(20.0, 10.0), vec2f(30.0, 0.0));
        path.close();
        assert_eq!(path.segment_count(), 2);

        path.remove(path.points().len() - 1, false).unwrap();
        check_invariants(&path);
        assert!(path.is_empty());
        assert!(!path.is_vacant());
        assert!(path.in_handle().is_some());
        assert!(path.out_handle().is_some());
    }

    #[test]
    fn test_node_at() {
        let mut path = Path::new();
        path.move_to(vec2f(0.0, 0.0));
        path.cubic_to(vec2f(10.0, 10.0), vec2f(20.0, 10.0), vec2f(30.0, 0.0));
        path.line_to(vec2f(60.0, 0.0));

        let node = path.node_at(3).unwrap();
        assert_eq!(node.in_command, Some(1));
        assert_eq!(node.out_command, Some(2));
        assert_eq!(node.in_handle, Some(2));
        assert_eq!(node.out_handle, None);

        let first = path.node_at(0).unwrap();
        assert_eq!(first.in_command, None);
        assert_eq!(first.out_command, Some(1));
        assert_eq!(first.out_handle, Some(1));
    }

    #[test]
    fn test_segments_rev_matches_forward() {
        let path = square();
        let forward: Vec<_> = path.segments().collect();
        let backward: Vec<_> = path.segments_rev().collect();
        assert_eq!(forward.len(), backward.len());
        for (f, b) in forward.iter().zip(backward.iter().rev()) {
            assert_eq!(f.segment.from, b.segment.to);
            assert_eq!(f.segment.to, b.segment.from);
        }
    }

    #[test]
    fn test_hit_test_fill() {
        let path = square();
        let identity = Transform2F::default();
        assert!(path.hit_test(vec2f(60.0, 60.0), Some(FillRule::NonZero), None, &identity,
                              1.0, 1.0));
        assert!(!path.hit_test(vec2f(200.0, 60.0), Some(FillRule::NonZero), None, &identity,
                               1.0, 1.0));
    }

    #[test]
    fn test_intersects_rect_collects_vertices() {
        let path = square();
        let identity = Transform2F::default();
        let mut vertices = HashSet::new();
        let rect = RectF::from_points(vec2f(0.0, 0.0), vec2f(60.0, 60.0));
        assert!(path.intersects_rect(rect, &identity, Some(&mut vertices)));
        assert_eq!(vertices.len(), 1);
        assert!(vertices.contains(&0));
    }

    #[test]
    fn test_intersects_rect_edge_only() {
        // A rect crossing only an edge, containing no vertex.
        let path = square();
        let identity = Transform2F::default();
        let rect = RectF::from_points(vec2f(40.0, 0.0), vec2f(60.0, 20.0));
        assert!(path.intersects_rect(rect, &identity, None));
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let mut path = Path::new();
        path.move_to(vec2f(0.0, 0.0));
        path.cubic_to(vec2f(10.0, 10.0), vec2f(20.0, 10.0), vec2f(30.0, 0.0));
        path.line_to(vec2f(60.0, 0.0));
        path.set_out_handle(Some(vec2f(70.0, 5.0)));

        let mut data = EncodedData::new();
        path.encode(&mut data);
        let decoded = Path::decode(&mut Decoder::new(data.bytes())).unwrap();

        assert_eq!(decoded.points(), path.points());
        assert_eq!(decoded.closed(), path.closed());
        assert_eq!(decoded.out_handle(), path.out_handle());
        assert_eq!(decoded.command_len(), path.command_len());
        check_invariants(&decoded);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let mut data = EncodedData::new();
        data.uint32(3);
        data.byte_vector(&[0b11111111]);
        data.vec2_vector(&[vec2f(0.0, 0.0)]);
        data.boolean(false);
        data.boolean(false);
        data.boolean(false);
        assert!(Path::decode(&mut Decoder::new(data.bytes())).is_err());
    }

    #[derive(Clone, Debug)]
    struct ArbitraryCubic(Segment);

    impl Arbitrary for ArbitraryCubic {
        fn arbitrary<G: Gen>(g: &mut G) -> ArbitraryCubic {
            let mut coord = || f32::arbitrary(g) % 100.0;
            ArbitraryCubic(Segment::cubic(vec2f(coord(), coord()),
                                          vec2f(coord(), coord()),
                                          vec2f(coord(), coord()),
                                          vec2f(coord(), coord())))
        }
    }

    quickcheck::quickcheck! {
        fn quadratic_approximation_within_tolerance(cubic: ArbitraryCubic) -> bool {
            let cubic = cubic.0;
            if !cubic.from.is_finite() || !cubic.ctrl0.is_finite() ||
                    !cubic.ctrl1.is_finite() || !cubic.to.is_finite() {
                return true;
            }
            [0.05f32, 0.5, 5.0].iter().all(|&tolerance| {
                let mut sink = QuadraticPath::new();
                sink.move_to(cubic.from);
                super::cubic_to_quadratics(&cubic, tolerance, &mut sink);

                // Sampled Hausdorff bound: every sampled cubic point is near
                // the polyline of finely sampled quadratic pieces. Contours
                // exclude the implicit closing segment.
                let mut quad_samples = vec![];
                for contour in sink.contours() {
                    for segment in &contour.segments {
                        for step in 0..=64 {
                            quad_samples.push(segment.sample(step as f32 / 64.0));
                        }
                    }
                }
                (0..=64).all(|step| {
                    let point = cubic.sample(step as f32 / 64.0);
                    quad_samples
                        .iter()
                        .map(|sample| (*sample - point).length())
                        .fold(f32::MAX, f32::min) <= tolerance + 0.05
                })
            })
        }

        fn edit_sequences_preserve_invariants(ops: Vec<(u8, u8, f32)>) -> bool {
            let mut path = Path::new();
            path.move_to(vec2f(0.0, 0.0));
            path.line_to(vec2f(50.0, 0.0));
            path.cubic_to(vec2f(60.0, 20.0), vec2f(80.0, 20.0), vec2f(90.0, 0.0));

            for (op, index, value) in ops {
                let value = if value.is_finite() { value % 40.0 } else { 0.0 };
                let index = index as usize;
                match op % 7 {
                    0 => path.line_to(vec2f(value + 100.0, value)),
                    1 => path.cubic_to(vec2f(value, 10.0),
                                       vec2f(value + 5.0, -10.0),
                                       vec2f(value + 10.0, 0.0)),
                    2 => {
                        let _ = path.split(index % path.segment_count().max(1),
                                           (value.abs() % 1.0).max(0.1));
                    }
                    3 => {
                        let _ = path.translate_point(index % path.points().len().max(1),
                                                     vec2f(value, -value));
                    }
                    4 => {
                        let _ = path.to_cubic(1 + index % path.segment_count().max(1), 0);
                    }
                    5 => {
                        let _ = path.to_line(1 + index % path.segment_count().max(1), 0);
                    }
                    _ => {
                        if path.segment_count() > 2 {
                            let _ = path.remove(index % path.points().len().max(1), false);
                        }
                    }
                }

                // Core invariants: the stream starts with exactly one Move
                // and the point total matches the command stream.
                if path.command_at(0) != Some(PathCommand::Move) {
                    return false;
                }
                let mut expected = 0;
                for command_index in 0..path.command_len() {
                    let command = path.command_at(command_index).unwrap();
                    if command_index > 0 && command == PathCommand::Move {
                        return false;
                    }
                    expected += command.point_count();
                }
                if expected != path.points().len() {
                    return false;
                }
            }
            true
        }

        fn split_preserves_invariants(t: f32) -> bool {
            let t = (t.abs() % 1.0).max(0.01).min(0.99);
            let mut path = Path::new();
            path.move_to(vec2f(0.0, 0.0));
            path.cubic_to(vec2f(10.0, 20.0), vec2f(30.0, -20.0), vec2f(40.0, 0.0));
            let index = path.split(0, t).unwrap();
            let expected: usize = path
                .segments()
                .map(|s| s.segment.point_count())
                .sum::<usize>() + 1;
            index < path.points().len() && expected == path.points().len()
        }
    }
}
