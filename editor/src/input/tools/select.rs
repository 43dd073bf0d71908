// vellum/editor/src/input/tools/select.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The selection tool: click-select, rubber-band select, drag-move, and
//! alt-drag duplicate. The manipulator takes precedence when one of its
//! handles is grabbed.

use super::{Tool, ToolContext, ToolKind};
use crate::input::hover::HoverTarget;
use crate::scene::viewport::Viewport;
use uuid::Uuid;
use vellum_content::gradient::ColorU;
use vellum_geometry::rect::RectF;
use vellum_gpu::Device;
use vellum_renderer::renderer::Renderer;

const RUBBER_BAND_FILL: ColorU = ColorU { r: 56, g: 128, b: 255, a: 32 };
const RUBBER_BAND_BORDER: ColorU = ColorU { r: 56, g: 128, b: 255, a: 160 };

#[derive(Clone, Copy, Debug, PartialEq)]
enum SelectGesture {
    Idle,
    /// Dragging the selection (possibly an alt duplicate).
    Move { duplicated: bool },
    RubberBand { rect: RectF },
    Manipulating,
}

pub struct SelectTool {
    gesture: SelectGesture,
}

impl Default for SelectTool {
    fn default() -> SelectTool {
        SelectTool { gesture: SelectGesture::Idle }
    }
}

impl SelectTool {
    pub fn render_overlays<D>(&self, viewport: &Viewport, renderer: &mut Renderer<D>)
    where
        D: Device,
    {
        if let SelectGesture::RubberBand { rect } = self.gesture {
            let width = 1.0 / viewport.zoom();
            renderer.draw_rect(rect, RUBBER_BAND_FILL);
            renderer.draw_line(rect.min, rect.upper_right(), width, RUBBER_BAND_BORDER);
            renderer.draw_line(rect.upper_right(), rect.max, width, RUBBER_BAND_BORDER);
            renderer.draw_line(rect.max, rect.lower_left(), width, RUBBER_BAND_BORDER);
            renderer.draw_line(rect.lower_left(), rect.min, width, RUBBER_BAND_BORDER);
        }
    }

    fn begin_on_entity(&mut self, ctx: &mut ToolContext, entity: Uuid) {
        let shift = ctx.input.keys.shift;
        let selected = ctx.scene.selection.is_selected(entity);

        if shift {
            ctx.scene.selection.toggle(entity);
        } else if !selected {
            ctx.scene.selection.clear();
            ctx.scene.selection.select(entity);
        }
        self.gesture = SelectGesture::Move { duplicated: false };
    }
}

impl Tool for SelectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Select
    }

    fn on_pointer_down(&mut self, ctx: &mut ToolContext) {
        // The manipulator owns the gesture when a handle is grabbed.
        if !ctx.scene.selection.is_empty() {
            let threshold = ctx.input.threshold(ctx.scene.viewport.zoom());
            if ctx.manipulator.begin(ctx.scene, ctx.input, threshold) {
                self.gesture = SelectGesture::Manipulating;
                return;
            }
        }

        match ctx.input.hover.entity {
            Some(entity) if ctx.input.hover.target != HoverTarget::None => {
                self.begin_on_entity(ctx, entity);
            }
            _ => {
                if !ctx.input.keys.shift {
                    ctx.scene.selection.clear();
                }
                let origin = ctx.input.pointer.scene.origin;
                self.gesture =
                    SelectGesture::RubberBand { rect: RectF::from_points(origin, origin) };
            }
        }
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolContext) {
        match self.gesture {
            SelectGesture::Idle => {}
            SelectGesture::Manipulating => ctx.manipulator.update(ctx.scene, ctx.input),
            SelectGesture::Move { duplicated } => {
                // Alt on the first movement drags a copy, leaving the
                // original in place.
                if ctx.input.keys.alt && !duplicated {
                    let originals: Vec<Uuid> =
                        ctx.scene.selection.selected().keys().copied().collect();
                    ctx.scene.selection.clear();
                    for id in originals {
                        if let Some(copy) = ctx.scene.duplicate_entity(id) {
                            ctx.scene.selection.select(copy);
                        }
                    }
                    self.gesture = SelectGesture::Move { duplicated: true };
                }

                let movement = ctx.input.pointer.scene.movement;
                let targets: Vec<Uuid> =
                    ctx.scene.selection.selected().keys().copied().collect();
                for id in targets {
                    ctx.scene.translate_entity(id, movement);
                }
            }
            SelectGesture::RubberBand { .. } => {
                let rect = RectF::from_points(ctx.input.pointer.scene.origin,
                                              ctx.input.pointer.scene.position);
                self.gesture = SelectGesture::RubberBand { rect };
                let entries = ctx.scene.entities_in(rect, false);
                ctx.scene.selection.set_temp(entries);
            }
        }
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolContext) {
        match self.gesture {
            SelectGesture::RubberBand { .. } => ctx.scene.selection.sync(),
            SelectGesture::Manipulating => ctx.manipulator.end(),
            _ => {}
        }
        self.gesture = SelectGesture::Idle;
    }

    fn on_pointer_hover(&mut self, ctx: &mut ToolContext) {
        if !ctx.scene.selection.is_empty() {
            let threshold = ctx.input.threshold(ctx.scene.viewport.zoom());
            ctx.manipulator.update_hover(ctx.scene, ctx.input, threshold);
        }
    }

    fn reset(&mut self) {
        self.gesture = SelectGesture::Idle;
    }
}
