// vellum/editor/src/input/tools/manipulator.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The selection manipulator: scale and rotate handles around the
//! selection's bounding rectangle.
//!
//! Eight scale handles sit on the edges and corners; eight rotate zones sit
//! just outside them (corner zones doubled). Scaling measures the pointer
//! against the grabbed handle relative to the pivot (the opposite handle,
//! or the center with Alt; Shift snaps scaling uniform and rotation to 15°.

use crate::input::InputState;
use crate::scene::entity::Document;
use crate::scene::selection::Selection;
use crate::scene::viewport::Viewport;
use crate::scene::Scene;
use uuid::Uuid;
use vellum_content::gradient::ColorU;
use vellum_geometry::rect::RectF;
use vellum_geometry::transform2d::Transform2F;
use vellum_geometry::util::EPSILON;
use vellum_geometry::vector::{vec2f, Vector2F};
use vellum_gpu::Device;
use vellum_renderer::renderer::Renderer;

const HANDLE_COLOR: ColorU = ColorU { r: 56, g: 128, b: 255, a: 255 };
const ROTATION_SNAP: f32 = 15.0 * std::f32::consts::PI / 180.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleKind {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
    RN,
    RS,
    RE,
    RW,
    RNE,
    RNW,
    RSE,
    RSW,
}

impl HandleKind {
    const SCALE_HANDLES: [HandleKind; 8] = [
        HandleKind::N, HandleKind::S, HandleKind::E, HandleKind::W,
        HandleKind::NE, HandleKind::NW, HandleKind::SE, HandleKind::SW,
    ];
    const ROTATE_HANDLES: [HandleKind; 8] = [
        HandleKind::RN, HandleKind::RS, HandleKind::RE, HandleKind::RW,
        HandleKind::RNE, HandleKind::RNW, HandleKind::RSE, HandleKind::RSW,
    ];

    fn is_rotate(self) -> bool {
        match self {
            HandleKind::RN | HandleKind::RS | HandleKind::RE | HandleKind::RW |
            HandleKind::RNE | HandleKind::RNW | HandleKind::RSE | HandleKind::RSW => true,
            _ => false,
        }
    }

    fn is_corner(self) -> bool {
        match self {
            HandleKind::NE | HandleKind::NW | HandleKind::SE | HandleKind::SW |
            HandleKind::RNE | HandleKind::RNW | HandleKind::RSE | HandleKind::RSW => true,
            _ => false,
        }
    }

    fn axis(self) -> ScaleAxis {
        match self {
            HandleKind::E | HandleKind::W => ScaleAxis::X,
            HandleKind::N | HandleKind::S => ScaleAxis::Y,
            _ => ScaleAxis::Free,
        }
    }

    /// Position on (or outside) the unit rect, in [-1, 1] coordinates.
    fn unit_position(self) -> Vector2F {
        let inner = match self {
            HandleKind::N | HandleKind::RN => vec2f(0.0, -1.0),
            HandleKind::S | HandleKind::RS => vec2f(0.0, 1.0),
            HandleKind::E | HandleKind::RE => vec2f(1.0, 0.0),
            HandleKind::W | HandleKind::RW => vec2f(-1.0, 0.0),
            HandleKind::NE | HandleKind::RNE => vec2f(1.0, -1.0),
            HandleKind::NW | HandleKind::RNW => vec2f(-1.0, -1.0),
            HandleKind::SE | HandleKind::RSE => vec2f(1.0, 1.0),
            HandleKind::SW | HandleKind::RSW => vec2f(-1.0, 1.0),
        };
        if self.is_rotate() {
            inner * 1.3
        } else {
            inner
        }
    }

    fn opposite_unit_position(self) -> Vector2F {
        -self.unit_position().clamp(vec2f(-1.0, -1.0), vec2f(1.0, 1.0))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScaleAxis {
    X,
    Y,
    Free,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ManipulatorState {
    Idle,
    Hovered(HandleKind),
    Scaling(ScaleAxis),
    Rotating,
}

pub struct Manipulator {
    state: ManipulatorState,
    start_rect: RectF,
    start_handle: Vector2F,
    grabbed: Option<HandleKind>,
    cache: Vec<(Uuid, Transform2F)>,
}

impl Default for Manipulator {
    fn default() -> Manipulator {
        Manipulator {
            state: ManipulatorState::Idle,
            start_rect: RectF::default(),
            start_handle: Vector2F::zero(),
            grabbed: None,
            cache: vec![],
        }
    }
}

impl Manipulator {
    #[inline]
    pub fn in_use(&self) -> bool {
        match self.state {
            ManipulatorState::Scaling(_) | ManipulatorState::Rotating => true,
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        *self = Manipulator::default();
    }

    /// Handle positions for the given selection rect.
    fn handle_position(rect: RectF, handle: HandleKind) -> Vector2F {
        let center = rect.center();
        let half = rect.size() * 0.5;
        center + handle.unit_position() * half
    }

    fn hit_test(rect: RectF, position: Vector2F, threshold: f32) -> Option<HandleKind> {
        // Scale handles first so the nearer rotate zones never shadow them.
        for &handle in HandleKind::SCALE_HANDLES.iter() {
            let radius = threshold;
            if (Self::handle_position(rect, handle) - position).length() <= radius {
                return Some(handle);
            }
        }
        for &handle in HandleKind::ROTATE_HANDLES.iter() {
            let radius = if handle.is_corner() { threshold * 2.0 } else { threshold };
            if (Self::handle_position(rect, handle) - position).length() <= radius {
                return Some(handle);
            }
        }
        None
    }

    /// Grabs a handle under the pointer, caching the selection's original
    /// transforms. Returns whether the manipulator took the gesture.
    pub fn begin(&mut self, scene: &mut Scene, input: &InputState, threshold: f32) -> bool {
        let rect = match scene.selection_bounding_rect() {
            None => return false,
            Some(rect) => rect,
        };
        let handle = match Self::hit_test(rect, input.pointer.scene.position, threshold) {
            None => {
                self.state = ManipulatorState::Idle;
                return false;
            }
            Some(handle) => handle,
        };

        self.start_rect = rect;
        self.start_handle = Self::handle_position(rect, handle);
        self.grabbed = Some(handle);
        self.cache = scene
            .selection
            .selected()
            .keys()
            .map(|&id| (id, scene.document.transform_or_identity(id)))
            .collect();

        self.state = if handle.is_rotate() {
            ManipulatorState::Rotating
        } else {
            ManipulatorState::Scaling(handle.axis())
        };
        true
    }

    pub fn update(&mut self, scene: &mut Scene, input: &InputState) {
        match self.state {
            ManipulatorState::Scaling(axis) => self.update_scale(scene, input, axis),
            ManipulatorState::Rotating => self.update_rotate(scene, input),
            _ => {}
        }
    }

    pub fn update_hover(&mut self, scene: &Scene, input: &InputState, threshold: f32) {
        if self.in_use() {
            return;
        }
        let rect = match scene.selection_bounding_rect() {
            None => {
                self.state = ManipulatorState::Idle;
                return;
            }
            Some(rect) => rect,
        };
        self.state = match Self::hit_test(rect, input.pointer.scene.position, threshold) {
            Some(handle) => ManipulatorState::Hovered(handle),
            None => ManipulatorState::Idle,
        };
    }

    pub fn end(&mut self) {
        self.state = ManipulatorState::Idle;
        self.grabbed = None;
        self.cache.clear();
    }

    fn update_scale(&mut self, scene: &mut Scene, input: &InputState, axis: ScaleAxis) {
        let handle = match self.grabbed {
            None => return,
            Some(handle) => handle,
        };

        let center = self.start_rect.center();
        let half = self.start_rect.size() * 0.5;
        let pivot = if input.keys.alt {
            center
        } else {
            center + handle.opposite_unit_position() * half
        };

        let from = self.start_handle - pivot;
        let to = input.pointer.scene.position - pivot;

        let safe = |value: f32| if value.abs() <= EPSILON { EPSILON } else { value };
        let mut scale = match axis {
            ScaleAxis::X => vec2f(to.x / safe(from.x), 1.0),
            ScaleAxis::Y => vec2f(1.0, to.y / safe(from.y)),
            ScaleAxis::Free => vec2f(to.x / safe(from.x), to.y / safe(from.y)),
        };

        if input.keys.shift {
            // Uniform: the dominant magnitude wins, signs survive.
            let magnitude = scale.x.abs().max(scale.y.abs());
            scale = vec2f(magnitude * scale.x.signum(), magnitude * scale.y.signum());
            if axis == ScaleAxis::X {
                scale.y = scale.x.abs();
            } else if axis == ScaleAxis::Y {
                scale.x = scale.y.abs();
            }
        }

        let delta = Transform2F::from_translation(pivot) *
            Transform2F::from_scale(scale) *
            Transform2F::from_translation(-pivot);
        self.apply(scene, delta);
    }

    fn update_rotate(&mut self, scene: &mut Scene, input: &InputState) {
        let center = self.start_rect.center();
        let from = self.start_handle - center;
        let to = input.pointer.scene.position - center;
        if from.length() <= EPSILON || to.length() <= EPSILON {
            return;
        }

        let mut angle = to.angle() - from.angle();
        if input.keys.shift {
            angle = (angle / ROTATION_SNAP).round() * ROTATION_SNAP;
        }

        let delta = Transform2F::from_translation(center) *
            Transform2F::from_rotation(angle) *
            Transform2F::from_translation(-center);
        self.apply(scene, delta);
    }

    fn apply(&self, scene: &mut Scene, delta: Transform2F) {
        for &(id, original) in &self.cache {
            scene.modify_transform(id, delta * original);
        }
    }

    pub fn render_overlays<D>(&self,
                              document: &Document,
                              selection: &Selection,
                              viewport: &Viewport,
                              renderer: &mut Renderer<D>)
    where
        D: Device,
    {
        let mut rect: Option<RectF> = None;
        for id in selection.selected().keys() {
            if let Some(entity_rect) = document.bounding_rect(*id) {
                rect = Some(match rect {
                    None => entity_rect,
                    Some(rect) => rect.union_rect(entity_rect),
                });
            }
        }
        let rect = match rect {
            None => return,
            Some(rect) => rect,
        };

        let zoom = viewport.zoom();
        let width = 1.0 / zoom;
        renderer.draw_line(rect.min, rect.upper_right(), width, HANDLE_COLOR);
        renderer.draw_line(rect.upper_right(), rect.max, width, HANDLE_COLOR);
        renderer.draw_line(rect.max, rect.lower_left(), width, HANDLE_COLOR);
        renderer.draw_line(rect.lower_left(), rect.min, width, HANDLE_COLOR);

        let handle_size = 6.0 / zoom;
        for &handle in HandleKind::SCALE_HANDLES.iter() {
            let position = Self::handle_position(rect, handle);
            renderer.draw_rect(
                RectF::new(position - Vector2F::splat(handle_size * 0.5),
                           Vector2F::splat(handle_size)),
                ColorU::white());
            renderer.draw_rect(
                RectF::new(position - Vector2F::splat(handle_size * 0.5),
                           Vector2F::splat(handle_size))
                    .dilate(-width),
                HANDLE_COLOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_positions() {
        let rect = RectF::from_points(vec2f(0.0, 0.0), vec2f(100.0, 100.0));
        assert_eq!(Manipulator::handle_position(rect, HandleKind::N), vec2f(50.0, 0.0));
        assert_eq!(Manipulator::handle_position(rect, HandleKind::SE), vec2f(100.0, 100.0));
        // Rotate zones sit outside the rect.
        let rne = Manipulator::handle_position(rect, HandleKind::RNE);
        assert!(rne.x > 100.0 && rne.y < 0.0);
    }

    #[test]
    fn test_hit_test_priority() {
        let rect = RectF::from_points(vec2f(0.0, 0.0), vec2f(100.0, 100.0));
        // Exactly on the corner: the scale handle wins over the rotate zone.
        assert_eq!(Manipulator::hit_test(rect, vec2f(100.0, 0.0), 8.0), Some(HandleKind::NE));
        // Outside the corner, in the doubled rotate zone.
        assert_eq!(Manipulator::hit_test(rect, vec2f(116.0, -16.0), 8.0),
                   Some(HandleKind::RNE));
        assert_eq!(Manipulator::hit_test(rect, vec2f(50.0, 50.0), 8.0), None);
    }
}
