// vellum/editor/src/input/tools/direct_select.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The direct-selection tool: vertex, handle, and segment editing.
//!
//! Hit priority follows the hover state (vertex > handle > segment >
//! element). Handle drags mirror the opposite handle unless Alt breaks the
//! symmetry; the manipulator is disabled in this category.

use super::{Tool, ToolContext, ToolKind};
use crate::input::hover::HoverTarget;
use crate::scene::viewport::Viewport;
use uuid::Uuid;
use vellum_content::gradient::ColorU;
use vellum_content::path::{IN_HANDLE_INDEX, OUT_HANDLE_INDEX};
use vellum_geometry::rect::RectF;
use vellum_geometry::vector::Vector2F;
use vellum_gpu::Device;
use vellum_renderer::renderer::Renderer;

const RUBBER_BAND_FILL: ColorU = ColorU { r: 56, g: 128, b: 255, a: 32 };

#[derive(Clone, Copy, Debug, PartialEq)]
enum DirectGesture {
    Idle,
    MoveVertex { entity: Uuid, vertex: usize },
    MoveHandle { entity: Uuid, handle: usize },
    MoveSegment { entity: Uuid, segment: usize },
    MoveElement { entity: Uuid },
    RubberBand { rect: RectF },
}

pub struct DirectSelectTool {
    gesture: DirectGesture,
}

impl Default for DirectSelectTool {
    fn default() -> DirectSelectTool {
        DirectSelectTool { gesture: DirectGesture::Idle }
    }
}

impl DirectSelectTool {
    pub fn render_overlays<D>(&self, _viewport: &Viewport, renderer: &mut Renderer<D>)
    where
        D: Device,
    {
        if let DirectGesture::RubberBand { rect } = self.gesture {
            renderer.draw_rect(rect, RUBBER_BAND_FILL);
        }
    }

    /// Moves a vertex together with its incident control points.
    fn translate_vertex(ctx: &mut ToolContext, entity: Uuid, vertex: usize, delta: Vector2F) {
        ctx.scene.modify_path(entity, |path| {
            let node = match path.node_at(vertex) {
                None => return,
                Some(node) => node,
            };
            let _ = path.translate_point(vertex, delta);
            for handle in [node.in_handle, node.out_handle].iter().flatten() {
                let _ = path.translate_point(*handle, delta);
            }
        });
    }

    /// Moves a control point; the opposite handle mirrors its direction
    /// (keeping its own length) unless Alt breaks the pair.
    fn translate_handle(ctx: &mut ToolContext, entity: Uuid, handle: usize, delta: Vector2F) {
        let mirror = !ctx.input.keys.alt;
        ctx.scene.modify_path(entity, |path| {
            if path.translate_point(handle, delta).is_err() {
                return;
            }
            if !mirror {
                return;
            }

            // Find the vertex this handle belongs to, then its opposite.
            let vertex = match handle {
                IN_HANDLE_INDEX => Some(0),
                OUT_HANDLE_INDEX => Some(path.points().len().saturating_sub(1)),
                _ => path
                    .vertex_indices()
                    .into_iter()
                    .find(|&v| {
                        path.node_at(v).map_or(false, |node| {
                            node.in_handle == Some(handle) || node.out_handle == Some(handle)
                        })
                    }),
            };
            let vertex = match vertex {
                None => return,
                Some(vertex) => vertex,
            };
            let node = match path.node_at(vertex) {
                None => return,
                Some(node) => node,
            };

            let opposite = if node.in_handle == Some(handle) {
                node.out_handle
            } else {
                node.in_handle
            };
            let (opposite, moved, anchor) = match (opposite,
                                                   path.point_at(handle),
                                                   path.point_at(vertex)) {
                (Some(opposite), Some(moved), Some(anchor)) if opposite != handle => {
                    (opposite, moved, anchor)
                }
                _ => return,
            };

            let direction = (anchor - moved).normalize();
            if let Some(current) = path.point_at(opposite) {
                let length = (current - anchor).length();
                let target = anchor + direction * length;
                let _ = path.translate_point(opposite, target - current);
            }
        });
    }

    fn translate_segment(ctx: &mut ToolContext, entity: Uuid, segment: usize, delta: Vector2F) {
        let (from_vertex, to_vertex) = {
            let path = match ctx.scene.document.path(entity) {
                None => return,
                Some(path) => &path.path,
            };
            let segment_ref = match path.segment_at(segment) {
                None => return,
                Some(segment_ref) => segment_ref,
            };
            (segment_ref.first_point_index - 1,
             segment_ref.first_point_index + segment_ref.segment.point_count() - 1)
        };
        Self::translate_vertex(ctx, entity, from_vertex, delta);
        Self::translate_vertex(ctx, entity, to_vertex, delta);
    }
}

impl Tool for DirectSelectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::DirectSelect
    }

    fn on_pointer_down(&mut self, ctx: &mut ToolContext) {
        let hover = ctx.input.hover;
        let entity = match hover.entity {
            None => {
                if !ctx.input.keys.shift {
                    ctx.scene.selection.clear();
                }
                let origin = ctx.input.pointer.scene.origin;
                self.gesture =
                    DirectGesture::RubberBand { rect: RectF::from_points(origin, origin) };
                return;
            }
            Some(entity) => entity,
        };

        self.gesture = match hover.target {
            HoverTarget::Vertex => {
                let vertex = hover.vertex.unwrap();
                if !ctx.input.keys.shift && !ctx.scene.selection.is_vertex_selected(entity, vertex)
                {
                    ctx.scene.selection.clear();
                }
                ctx.scene.selection.select_vertex(entity, vertex);
                DirectGesture::MoveVertex { entity, vertex }
            }
            HoverTarget::Handle => {
                DirectGesture::MoveHandle { entity, handle: hover.handle.unwrap() }
            }
            HoverTarget::Segment => {
                if !ctx.scene.selection.is_selected(entity) {
                    if !ctx.input.keys.shift {
                        ctx.scene.selection.clear();
                    }
                    ctx.scene.selection.select(entity);
                }
                DirectGesture::MoveSegment { entity, segment: hover.segment.unwrap() }
            }
            _ => {
                if !ctx.scene.selection.is_selected(entity) {
                    if !ctx.input.keys.shift {
                        ctx.scene.selection.clear();
                    }
                    ctx.scene.selection.select(entity);
                }
                DirectGesture::MoveElement { entity }
            }
        };
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolContext) {
        // Deltas are applied in the entity's local space.
        match self.gesture {
            DirectGesture::Idle => {}
            DirectGesture::MoveVertex { entity, vertex } => {
                let delta = local_movement(ctx, entity);
                Self::translate_vertex(ctx, entity, vertex, delta);
            }
            DirectGesture::MoveHandle { entity, handle } => {
                let delta = local_movement(ctx, entity);
                Self::translate_handle(ctx, entity, handle, delta);
            }
            DirectGesture::MoveSegment { entity, segment } => {
                let delta = local_movement(ctx, entity);
                Self::translate_segment(ctx, entity, segment, delta);
            }
            DirectGesture::MoveElement { entity } => {
                let movement = ctx.input.pointer.scene.movement;
                ctx.scene.translate_entity(entity, movement);
            }
            DirectGesture::RubberBand { .. } => {
                let rect = RectF::from_points(ctx.input.pointer.scene.origin,
                                              ctx.input.pointer.scene.position);
                self.gesture = DirectGesture::RubberBand { rect };
                let entries = ctx.scene.entities_in(rect, true);
                ctx.scene.selection.set_temp(entries);
            }
        }
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolContext) {
        if let DirectGesture::RubberBand { .. } = self.gesture {
            ctx.scene.selection.sync();
        }
        self.gesture = DirectGesture::Idle;
    }

    fn reset(&mut self) {
        self.gesture = DirectGesture::Idle;
    }
}

/// The pointer movement mapped into the entity's local coordinates.
fn local_movement(ctx: &ToolContext, entity: Uuid) -> Vector2F {
    let transform = ctx.scene.document.transform_or_identity(entity);
    let inverse = transform.inverse();
    inverse.matrix * ctx.input.pointer.scene.movement
}
