// vellum/editor/src/scene/cache.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The per-scene spatial render cache.
//!
//! A uniform grid over the visible region tracks which cells still hold
//! valid pixels. Edits invalidate the cells their bounding rectangles
//! overlap; the renderer drains the invalid rectangles each frame.

use super::viewport::Viewport;
use vellum_geometry::rect::RectF;
use vellum_geometry::vector::{vec2i, Vector2I};

/// Cache cell edge, in client pixels.
pub const CACHE_CELL_SIZE: f32 = 256.0;

#[derive(Clone, Debug, Default)]
pub struct Cache {
    /// Scene-space region the grid covers.
    region: RectF,
    cell_size: f32,
    grid_size: Vector2I,
    valid: Vec<bool>,
    invalid_rects: Vec<RectF>,
}

impl Cache {
    pub fn new() -> Cache {
        Cache::default()
    }

    /// Rebuilds the grid over the viewport's visible region, marking
    /// everything invalid.
    pub fn reset(&mut self, viewport: &Viewport) {
        self.region = viewport.visible_rect();
        self.cell_size = CACHE_CELL_SIZE / viewport.zoom().max(1.0e-6);
        self.grid_size = vec2i(
            (self.region.width() / self.cell_size).ceil().max(1.0) as i32,
            (self.region.height() / self.cell_size).ceil().max(1.0) as i32,
        );
        self.valid = vec![false; (self.grid_size.x * self.grid_size.y) as usize];
        self.invalid_rects.clear();
        self.invalid_rects.push(self.region);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.valid.is_empty()
    }

    /// Marks the whole grid valid; called after a successful frame.
    pub fn validate_all(&mut self) {
        for cell in &mut self.valid {
            *cell = true;
        }
        self.invalid_rects.clear();
    }

    /// Marks every cell overlapping `rect` (scene space) invalid.
    pub fn invalidate_rect(&mut self, rect: RectF) {
        if self.valid.is_empty() {
            return;
        }
        let rect = match rect.intersection(self.region) {
            None => return,
            Some(rect) => rect,
        };

        let min = ((rect.min - self.region.min) / self.cell_size).floor();
        let max = ((rect.max - self.region.min) / self.cell_size).ceil();
        let mut any = false;
        for row in min.y as i32..(max.y as i32).min(self.grid_size.y) {
            for col in min.x as i32..(max.x as i32).min(self.grid_size.x) {
                if row < 0 || col < 0 {
                    continue;
                }
                let index = (row * self.grid_size.x + col) as usize;
                if self.valid[index] {
                    self.valid[index] = false;
                    any = true;
                }
            }
        }
        if any || self.invalid_rects.is_empty() {
            self.invalid_rects.push(rect);
        }
    }

    /// Whether any cell overlapping `rect` is invalid.
    pub fn is_rect_invalid(&self, rect: RectF) -> bool {
        if self.valid.is_empty() {
            return true;
        }
        let rect = match rect.intersection(self.region) {
            None => return false,
            Some(rect) => rect,
        };
        let min = ((rect.min - self.region.min) / self.cell_size).floor();
        let max = ((rect.max - self.region.min) / self.cell_size).ceil();
        for row in (min.y as i32).max(0)..(max.y as i32).min(self.grid_size.y) {
            for col in (min.x as i32).max(0)..(max.x as i32).min(self.grid_size.x) {
                if !self.valid[(row * self.grid_size.x + col) as usize] {
                    return true;
                }
            }
        }
        false
    }

    /// Takes the accumulated invalid rectangles for this frame.
    pub fn take_invalid_rects(&mut self) -> Vec<RectF> {
        std::mem::replace(&mut self.invalid_rects, vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_geometry::vector::{vec2f, vec2i as ivec};

    fn test_viewport() -> Viewport {
        let mut viewport = Viewport::default();
        viewport.resize(ivec(1024, 1024), ivec(0, 0), 1.0);
        viewport
    }

    #[test]
    fn test_invalidate_and_validate() {
        let mut cache = Cache::new();
        cache.reset(&test_viewport());
        cache.validate_all();

        let rect = RectF::from_points(vec2f(10.0, 10.0), vec2f(100.0, 100.0));
        assert!(!cache.is_rect_invalid(rect));

        cache.invalidate_rect(rect);
        assert!(cache.is_rect_invalid(rect));
        // Far corner is untouched.
        assert!(!cache.is_rect_invalid(RectF::from_points(vec2f(900.0, 900.0),
                                                          vec2f(1000.0, 1000.0))));

        let drained = cache.take_invalid_rects();
        assert!(!drained.is_empty());
        assert!(cache.take_invalid_rects().is_empty());
    }

    #[test]
    fn test_out_of_region_rect_ignored() {
        let mut cache = Cache::new();
        cache.reset(&test_viewport());
        cache.validate_all();
        cache.invalidate_rect(RectF::from_points(vec2f(5000.0, 5000.0), vec2f(6000.0, 6000.0)));
        assert!(!cache.is_rect_invalid(RectF::from_points(vec2f(0.0, 0.0),
                                                          vec2f(1000.0, 1000.0))));
    }
}
