// vellum/editor/src/input/tools/zoom.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The zoom tool: dragging zooms about the drag origin.

use super::{Tool, ToolContext, ToolKind};

/// Horizontal drag distance that doubles the zoom, in client pixels.
const PIXELS_PER_DOUBLING: f32 = 160.0;

#[derive(Default)]
pub struct ZoomTool {
    start_zoom: f32,
}

impl Tool for ZoomTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Zoom
    }

    fn on_pointer_down(&mut self, ctx: &mut ToolContext) {
        self.start_zoom = ctx.scene.viewport.zoom();
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolContext) {
        if self.start_zoom <= 0.0 {
            self.start_zoom = ctx.scene.viewport.zoom();
        }
        let delta = ctx.input.pointer.client.delta.x;
        let zoom = self.start_zoom * (2.0f32).powf(delta / PIXELS_PER_DOUBLING);
        let origin = ctx.input.pointer.client.origin;
        ctx.scene.viewport.zoom_about(zoom, origin);
    }

    fn reset(&mut self) {
        self.start_zoom = 0.0;
    }
}
