// vellum/editor/src/input/tools/pencil.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The pencil tool: accumulates freehand samples and fits them with cubics
//! on commit.

use super::{Tool, ToolContext, ToolKind};
use uuid::Uuid;
use vellum_content::fit;
use vellum_content::path::Path;
use vellum_geometry::vector::Vector2F;

/// Scene-space fitting tolerance at zoom 1.
const FIT_TOLERANCE: f32 = 2.0;

/// Wobble suppression: blend factor toward the raw sample. Slow strokes
/// smooth harder than fast ones.
const SMOOTHING_MIN: f32 = 0.35;
const SMOOTHING_MAX: f32 = 0.9;
const SMOOTHING_SPEED: f32 = 8.0;

/// Samples closer than this (client px) are dropped as jitter.
const MIN_SAMPLE_DISTANCE: f32 = 1.5;

#[derive(Default)]
pub struct PencilTool {
    element: Option<Uuid>,
    samples: Vec<Vector2F>,
    smoothed: Vector2F,
}

impl PencilTool {
    /// Wobble-smoothed version of the incoming sample.
    fn smooth(&mut self, sample: Vector2F, zoom: f32) -> Vector2F {
        let speed = (sample - self.smoothed).length() * zoom;
        let factor = (speed / SMOOTHING_SPEED).min(1.0);
        let blend = SMOOTHING_MIN + (SMOOTHING_MAX - SMOOTHING_MIN) * factor;
        self.smoothed = self.smoothed.lerp(sample, blend);
        self.smoothed
    }

    fn commit(&mut self, ctx: &mut ToolContext) {
        let entity = match self.element.take() {
            None => return,
            Some(entity) => entity,
        };
        let samples = std::mem::replace(&mut self.samples, vec![]);
        if samples.len() < 2 {
            ctx.scene.delete_entity(entity);
            return;
        }

        // Replace the raw polyline with its fitted cubics.
        let cubics = fit::fit_cubic(&samples, FIT_TOLERANCE);
        ctx.scene.modify_path(entity, move |path| {
            *path = Path::new();
            match cubics.first() {
                None => {
                    path.move_to(samples[0]);
                    for &sample in &samples[1..] {
                        path.line_to(sample);
                    }
                }
                Some(first) => {
                    path.move_to(first.from);
                    for cubic in &cubics {
                        path.cubic_to(cubic.ctrl0, cubic.ctrl1, cubic.to);
                    }
                }
            }
        });
    }
}

impl Tool for PencilTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Pencil
    }

    fn on_pointer_down(&mut self, ctx: &mut ToolContext) {
        let origin = ctx.input.pointer.scene.position;
        let mut path = Path::new();
        path.move_to(origin);

        let id = ctx.scene.create_element(Some(path));
        ctx.scene.selection.clear();
        ctx.scene.selection.select(id);

        self.element = Some(id);
        self.samples = vec![origin];
        self.smoothed = origin;
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolContext) {
        let entity = match self.element {
            None => return,
            Some(entity) => entity,
        };
        let zoom = ctx.scene.viewport.zoom();
        let sample = self.smooth(ctx.input.pointer.scene.position, zoom);

        if let Some(last) = self.samples.last() {
            if (sample - *last).length() * zoom < MIN_SAMPLE_DISTANCE {
                return;
            }
        }
        self.samples.push(sample);

        // The raw polyline previews the stroke until commit.
        ctx.scene.modify_path(entity, |path| path.line_to(sample));
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolContext) {
        // The stroke ends exactly where the pointer released, unsmoothed.
        if let Some(entity) = self.element {
            let position = ctx.input.pointer.scene.position;
            if self.samples.last() != Some(&position) {
                self.samples.push(position);
                ctx.scene.modify_path(entity, |path| path.line_to(position));
            }
        }
        self.commit(ctx);
    }

    fn reset(&mut self) {
        self.element = None;
        self.samples.clear();
    }
}
