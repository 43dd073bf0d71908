// vellum/editor/src/scene/viewport.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The scene camera: position, zoom, and client/scene conversion.

use vellum_geometry::rect::RectF;
use vellum_geometry::util;
use vellum_geometry::vector::{Vector2F, Vector2I};

pub const ZOOM_MIN: f32 = 0.02;
pub const ZOOM_MAX: f32 = 256.0;

/// Zoom values are rounded to this step to keep them stable across
/// round trips through the UI.
const ZOOM_STEP: f32 = 0.0001;

#[derive(Clone, Debug)]
pub struct Viewport {
    position: Vector2F,
    zoom: f32,
    rotation: f32,
    size: Vector2I,
    offset: Vector2I,
    dpr: f32,
    bounds: Option<RectF>,
    min_zoom: f32,
}

impl Default for Viewport {
    fn default() -> Viewport {
        Viewport {
            position: Vector2F::zero(),
            zoom: 1.0,
            rotation: 0.0,
            size: Vector2I::zero(),
            offset: Vector2I::zero(),
            dpr: 1.0,
            bounds: None,
            min_zoom: ZOOM_MIN,
        }
    }
}

impl Viewport {
    #[inline]
    pub fn position(&self) -> Vector2F {
        self.position
    }

    #[inline]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    #[inline]
    pub fn size(&self) -> Vector2I {
        self.size
    }

    #[inline]
    pub fn offset(&self) -> Vector2I {
        self.offset
    }

    #[inline]
    pub fn dpr(&self) -> f32 {
        self.dpr
    }

    pub fn resize(&mut self, size: Vector2I, offset: Vector2I, dpr: f32) {
        self.size = size;
        self.offset = offset;
        self.dpr = dpr;
    }

    pub fn move_by(&mut self, movement: Vector2F) {
        self.move_to(self.position + movement);
    }

    /// Moves the camera, clamping against the content bounds when set.
    pub fn move_to(&mut self, position: Vector2F) {
        let bounds = match self.bounds {
            None => {
                self.position = position;
                return;
            }
            Some(bounds) => bounds,
        };

        let view_size = self.size.to_f32() / self.zoom;
        let min_position = view_size - bounds.max;
        let mut max_position = -bounds.min;

        // Content smaller than the view centers instead of clamping.
        if bounds.width() * self.zoom < self.size.x as f32 {
            max_position.x = (view_size.x - bounds.width()) * 0.5 - bounds.min.x;
        }
        if bounds.height() * self.zoom < self.size.y as f32 {
            max_position.y = (view_size.y - bounds.height()) * 0.5 - bounds.min.y;
        }

        self.position = position.clamp(min_position.min(max_position), max_position);
    }

    pub fn zoom_to(&mut self, zoom: f32) {
        self.zoom = util::round_to_step(
            util::clamp(zoom, self.min_zoom.max(ZOOM_MIN), ZOOM_MAX), ZOOM_STEP);
    }

    /// Zooms while keeping the scene point under `origin` (client space)
    /// stationary.
    pub fn zoom_about(&mut self, zoom: f32, origin: Vector2F) {
        let new_zoom = util::round_to_step(
            util::clamp(zoom, self.min_zoom.max(ZOOM_MIN), ZOOM_MAX), ZOOM_STEP);

        let delta = self.client_to_scene_at(origin, new_zoom) - self.client_to_scene(origin);
        self.zoom = new_zoom;
        self.move_by(delta);
    }

    /// Restricts panning to `bounds` and derives the minimum zoom that still
    /// fills the view.
    pub fn set_bounds(&mut self, bounds: RectF) {
        if bounds.is_empty() {
            self.bounds = None;
            self.min_zoom = ZOOM_MIN;
            return;
        }

        self.min_zoom = if bounds.width() > bounds.height() {
            self.size.x as f32 / bounds.width()
        } else {
            self.size.y as f32 / bounds.height()
        };
        self.bounds = Some(bounds);
    }

    #[inline]
    pub fn client_to_scene(&self, position: Vector2F) -> Vector2F {
        self.client_to_scene_at(position, self.zoom)
    }

    #[inline]
    pub fn scene_to_client(&self, position: Vector2F) -> Vector2F {
        (position + self.position) * self.zoom + self.offset.to_f32()
    }

    fn client_to_scene_at(&self, position: Vector2F, zoom: f32) -> Vector2F {
        (position - self.offset.to_f32()) / zoom - self.position
    }

    /// The scene-space rectangle currently on screen.
    pub fn visible_rect(&self) -> RectF {
        RectF::from_points(self.client_to_scene(Vector2F::zero()),
                           self.client_to_scene(self.size.to_f32()))
    }

    #[inline]
    pub fn is_visible(&self, rect: RectF) -> bool {
        self.visible_rect().intersects(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_geometry::vector::{vec2f, vec2i};

    #[test]
    fn test_round_trip() {
        let mut viewport = Viewport::default();
        viewport.resize(vec2i(800, 600), vec2i(10, 20), 1.0);
        viewport.move_to(vec2f(33.0, -17.0));
        viewport.zoom_to(2.5);

        for &point in &[vec2f(0.0, 0.0), vec2f(400.0, 300.0), vec2f(799.0, 599.0)] {
            let round_tripped = viewport.scene_to_client(viewport.client_to_scene(point));
            assert!((round_tripped - point).length() < 1e-4, "{:?}", point);
        }
    }

    #[test]
    fn test_zoom_clamped_and_rounded() {
        let mut viewport = Viewport::default();
        viewport.zoom_to(1000.0);
        assert_eq!(viewport.zoom(), ZOOM_MAX);
        viewport.zoom_to(0.0001);
        assert_eq!(viewport.zoom(), ZOOM_MIN);
        viewport.zoom_to(1.23456);
        assert!((viewport.zoom() - 1.2346).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_about_keeps_origin_stationary() {
        let mut viewport = Viewport::default();
        viewport.resize(vec2i(800, 600), vec2i(0, 0), 1.0);

        let origin = vec2f(400.0, 300.0);
        let before = viewport.client_to_scene(origin);
        viewport.zoom_about(5.0, origin);
        let after = viewport.client_to_scene(origin);
        assert!((after - before).length() < 1e-3, "{:?} vs {:?}", before, after);
    }
}
