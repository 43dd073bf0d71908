// vellum/renderer/src/options.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Per-draw and per-frame options.

use vellum_content::gradient::{ColorU, Gradient, GradientGeometry};
use vellum_content::path::FillRule;
use vellum_content::stroke::StrokeStyle;
use vellum_geometry::transform2d::Transform2F;
use vellum_geometry::vector::{Vector2F, Vector2I};
use vellum_gpu::allocator::AllocationId;

/// What a path is filled with. Linear and radial gradients are
/// distinguished by the gradient's geometry.
#[derive(Clone, Debug)]
pub enum Paint {
    SolidColor(ColorU),
    Gradient(Gradient),
    Texture(TexturePaint),
}

#[derive(Clone, Copy, Debug)]
pub struct TexturePaint {
    pub texture: AllocationId,
    pub opacity: f32,
}

impl Paint {
    #[inline]
    pub fn is_fully_transparent(&self) -> bool {
        match *self {
            Paint::SolidColor(color) => color.is_fully_transparent(),
            Paint::Gradient(ref gradient) => gradient.stops().is_empty(),
            Paint::Texture(ref texture) => texture.opacity <= 0.0,
        }
    }

    #[inline]
    pub fn is_radial(&self) -> bool {
        match *self {
            Paint::Gradient(ref gradient) => {
                matches!(gradient.geometry(), GradientGeometry::Radial { .. })
            }
            _ => false,
        }
    }
}

/// The fill half of a draw.
#[derive(Clone, Debug)]
pub struct FillOptions {
    pub paint: Paint,
    pub rule: FillRule,
}

/// The stroke half of a draw.
#[derive(Clone, Debug)]
pub struct StrokeOptions {
    pub color: ColorU,
    pub style: StrokeStyle,
}

/// Everything needed to draw one entity's path.
#[derive(Clone, Debug)]
pub struct DrawOptions {
    pub transform: Transform2F,
    pub fill: Option<FillOptions>,
    pub stroke: Option<StrokeOptions>,
}

impl DrawOptions {
    pub fn filled(color: ColorU) -> DrawOptions {
        DrawOptions {
            transform: Transform2F::default(),
            fill: Some(FillOptions { paint: Paint::SolidColor(color), rule: FillRule::NonZero }),
            stroke: None,
        }
    }
}

/// The camera for one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameViewport {
    /// Client size in physical pixels.
    pub size: Vector2I,
    /// Scene-space translation of the camera.
    pub position: Vector2F,
    pub zoom: f32,
}

impl FrameViewport {
    /// Column-major orthographic view-projection matrix mapping scene
    /// coordinates to clip space (y down in scene, y up in clip).
    pub fn view_projection(&self) -> [f32; 16] {
        let sx = 2.0 * self.zoom / self.size.x.max(1) as f32;
        let sy = -2.0 * self.zoom / self.size.y.max(1) as f32;
        let tx = self.position.x * sx - 1.0;
        let ty = self.position.y * sy + 1.0;
        [
            sx, 0.0, 0.0, 0.0,
            0.0, sy, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            tx, ty, 0.0, 1.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_geometry::vector::{vec2f, vec2i};

    #[test]
    fn test_view_projection_maps_corners() {
        let viewport = FrameViewport { size: vec2i(800, 600), position: vec2f(0.0, 0.0), zoom: 1.0 };
        let m = viewport.view_projection();
        let apply = |p: Vector2F| {
            vec2f(m[0] * p.x + m[12], m[5] * p.y + m[13])
        };
        // Scene origin lands at the top-left clip corner.
        assert_eq!(apply(vec2f(0.0, 0.0)), vec2f(-1.0, 1.0));
        // The scene point at the viewport extent lands at bottom-right.
        assert_eq!(apply(vec2f(800.0, 600.0)), vec2f(1.0, -1.0));
    }
}
