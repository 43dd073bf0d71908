// vellum/editor/src/input/tools/pen.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The pen tool: places vertices, authors handles by dragging, closes on
//! the first point, and re-enters open ends.

use super::{Tool, ToolContext, ToolKind};
use crate::input::keys::KeyboardKey;
use crate::scene::entity::Document;
use crate::scene::viewport::Viewport;
use uuid::Uuid;
use vellum_content::gradient::ColorU;
use vellum_content::path::{Path, PathCommand};
use vellum_geometry::vector::Vector2F;
use vellum_gpu::Device;
use vellum_renderer::renderer::Renderer;
use std::f32::consts::FRAC_PI_4;

const PREVIEW_COLOR: ColorU = ColorU { r: 56, g: 128, b: 255, a: 255 };

#[derive(Default)]
pub struct PenTool {
    /// The element being authored.
    element: Option<Uuid>,
    /// Extending from the path's front instead of its back.
    prepend: bool,
    /// Set while the current press drags out handles.
    dragging_from: Option<Vector2F>,
}

impl PenTool {
    fn local_point(ctx: &ToolContext, entity: Uuid, point: Vector2F) -> Vector2F {
        ctx.scene.document.transform_or_identity(entity).inverse() * point
    }

    /// Starts a fresh element at the pointer.
    fn start_element(&mut self, ctx: &mut ToolContext) {
        let point = ctx.input.pointer.scene.position;
        let mut path = Path::new();
        path.move_to(point);
        let id = ctx.scene.create_element(Some(path));
        ctx.scene.selection.clear();
        ctx.scene.selection.select(id);
        self.element = Some(id);
        self.prepend = false;
        self.dragging_from = Some(point);
    }

    /// Places the next vertex on the active element, or closes it when the
    /// first point is clicked.
    fn extend_element(&mut self, ctx: &mut ToolContext, entity: Uuid) {
        let threshold = ctx.input.threshold(ctx.scene.viewport.zoom());
        let position = ctx.input.pointer.scene.position;
        let transform = ctx.scene.document.transform_or_identity(entity);
        let local = Self::local_point(ctx, entity, position);
        let prepend = self.prepend;

        let closes = {
            let path = match ctx.scene.document.path(entity) {
                None => return,
                Some(path) => &path.path,
            };
            // Clicking the opposite end closes the path.
            let close_index = if prepend { path.points().len().saturating_sub(1) } else { 0 };
            !path.is_empty() &&
                path.is_point_inside_point(close_index, position, &transform, threshold)
        };

        if closes {
            ctx.scene.modify_path(entity, |path| path.close());
            self.finish(ctx);
            return;
        }

        ctx.scene.modify_path(entity, |path| {
            if prepend {
                match path.in_handle() {
                    Some(handle) => path.prepend_cubic(local, local, handle),
                    None => path.prepend_line(local),
                }
                path.set_in_handle(None);
            } else {
                match path.out_handle() {
                    Some(handle) => path.cubic_to(handle, local, local),
                    None => path.line_to(local),
                }
                path.set_out_handle(None);
            }
        });
        self.dragging_from = Some(position);
    }

    /// Drags the freshly placed vertex's handles: the dangling handle
    /// follows the pointer, the incoming control mirrors it unless Alt
    /// breaks the symmetry; Shift snaps the direction to 45° steps.
    fn drag_handles(&mut self, ctx: &mut ToolContext, entity: Uuid) {
        let anchor_scene = match self.dragging_from {
            None => return,
            Some(anchor) => anchor,
        };
        let mut position = ctx.input.pointer.scene.position;
        if ctx.input.keys.shift {
            position = snap_angle(anchor_scene, position);
        }

        let anchor = Self::local_point(ctx, entity, anchor_scene);
        let handle = Self::local_point(ctx, entity, position);
        let mirrored = anchor * 2.0 - handle;
        let symmetric = !ctx.input.keys.alt;
        let prepend = self.prepend;

        ctx.scene.modify_path(entity, |path| {
            if prepend {
                path.set_in_handle(Some(handle));
                if symmetric {
                    curve_first_segment(path, mirrored);
                }
            } else {
                path.set_out_handle(Some(handle));
                if symmetric {
                    curve_last_segment(path, mirrored);
                }
            }
        });
    }

    fn finish(&mut self, ctx: &mut ToolContext) {
        if let Some(entity) = self.element.take() {
            // Degenerate elements (a bare point with no drag) are removed.
            let degenerate = ctx
                .scene
                .document
                .path(entity)
                .map_or(false, |data| {
                    data.path.is_empty() &&
                        data.path.in_handle().is_none() &&
                        data.path.out_handle().is_none()
                });
            if degenerate {
                ctx.scene.delete_entity(entity);
            }
        }
        self.dragging_from = None;
        self.prepend = false;
    }

    pub fn render_overlays<D>(&self,
                              document: &Document,
                              viewport: &Viewport,
                              renderer: &mut Renderer<D>)
    where
        D: Device,
    {
        let entity = match self.element {
            None => return,
            Some(entity) => entity,
        };
        let path = match document.path(entity) {
            None => return,
            Some(path) => &path.path,
        };
        let transform = document.transform_or_identity(entity);
        let zoom = viewport.zoom();

        // The dangling handles, as lines off the open ends.
        let ends = [
            (path.in_handle(), path.points().first().copied()),
            (path.out_handle(), path.points().last().copied()),
        ];
        for (handle, end) in ends.iter() {
            if let (Some(handle), Some(end)) = (handle, end) {
                renderer.draw_line(transform * *end,
                                   transform * *handle,
                                   1.0 / zoom,
                                   PREVIEW_COLOR);
                renderer.draw_circle(transform * *handle, 2.0 / zoom, PREVIEW_COLOR);
            }
        }
    }
}

impl Tool for PenTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Pen
    }

    fn on_pointer_down(&mut self, ctx: &mut ToolContext) {
        match self.element {
            Some(entity) if ctx.scene.document.has_entity(entity) => {
                self.extend_element(ctx, entity);
            }
            _ => {
                self.element = None;

                // Clicking an open end of a hovered element re-enters it.
                if let (Some(entity), Some(vertex)) =
                    (ctx.input.hover.entity, ctx.input.hover.vertex)
                {
                    let open_end = ctx
                        .scene
                        .document
                        .path(entity)
                        .map_or(false, |data| data.path.is_open_end(vertex));
                    if open_end {
                        self.element = Some(entity);
                        self.prepend = vertex == 0;
                        self.dragging_from = Some(ctx.input.pointer.scene.position);
                        ctx.scene.selection.clear();
                        ctx.scene.selection.select(entity);
                        return;
                    }
                }

                self.start_element(ctx);
            }
        }
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolContext) {
        if let Some(entity) = self.element {
            if ctx.input.pointer.down {
                self.drag_handles(ctx, entity);
            }
        }
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolContext) {
        let _ = ctx;
        self.dragging_from = None;
    }

    fn on_key(&mut self, ctx: &mut ToolContext, down: bool, key: KeyboardKey) {
        if down && key == KeyboardKey::Escape {
            self.finish(ctx);
        }
    }

    fn reset(&mut self) {
        self.element = None;
        self.prepend = false;
        self.dragging_from = None;
    }
}

/// Snaps `position` so the segment from `anchor` lies on a 45° step.
fn snap_angle(anchor: Vector2F, position: Vector2F) -> Vector2F {
    let offset = position - anchor;
    let length = offset.length();
    if length <= 0.0 {
        return position;
    }
    let angle = (offset.angle() / FRAC_PI_4).round() * FRAC_PI_4;
    anchor + Vector2F::new(angle.cos(), angle.sin()) * length
}

/// Bends the last segment's incoming control toward `ctrl`, raising a line
/// to a cubic when needed.
fn curve_last_segment(path: &mut Path, ctrl: Vector2F) {
    let last_command = match path.command_len() {
        0 | 1 => return,
        len => len - 1,
    };
    if path.command_at(last_command) == Some(PathCommand::Line) {
        let _ = path.to_cubic(last_command, 0);
    }
    if path.command_at(last_command) == Some(PathCommand::Cubic) {
        // ctrl1 is the second-to-last point.
        let index = path.points().len() - 2;
        if let Some(current) = path.point_at(index) {
            let _ = path.translate_point(index, ctrl - current);
        }
    }
}

/// The front-extension mirror of `curve_last_segment`.
fn curve_first_segment(path: &mut Path, ctrl: Vector2F) {
    if path.command_len() < 2 {
        return;
    }
    if path.command_at(1) == Some(PathCommand::Line) {
        let _ = path.to_cubic(1, 0);
    }
    if path.command_at(1) == Some(PathCommand::Cubic) {
        // ctrl0 is the point right after the move point.
        if let Some(current) = path.point_at(1) {
            let _ = path.translate_point(1, ctrl - current);
        }
    }
}
