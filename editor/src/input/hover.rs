// vellum/editor/src/input/hover.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! What the pointer is currently over.
//!
//! Hit priority for direct tools: vertex > handle > segment > element.

use crate::scene::Scene;
use uuid::Uuid;
use vellum_geometry::vector::Vector2F;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoverTarget {
    None,
    Entity,
    Element,
    Vertex,
    Handle,
    Segment,
}

#[derive(Clone, Copy, Debug)]
pub struct HoverState {
    pub target: HoverTarget,
    pub entity: Option<Uuid>,
    pub vertex: Option<usize>,
    /// A handle is addressed by its point index (sentinels included).
    pub handle: Option<usize>,
    pub segment: Option<usize>,
}

impl Default for HoverState {
    fn default() -> HoverState {
        HoverState {
            target: HoverTarget::None,
            entity: None,
            vertex: None,
            handle: None,
            segment: None,
        }
    }
}

impl HoverState {
    pub fn reset(&mut self) {
        *self = HoverState::default();
    }

    /// Recomputes the hover for `position` against the entity `id`. With
    /// `deep`, vertices, handles, and segments of the hovered element are
    /// resolved in priority order.
    pub fn set_hovered(&mut self,
                       scene: &Scene,
                       id: Option<Uuid>,
                       position: Vector2F,
                       deep: bool,
                       threshold: f32) {
        self.reset();

        let id = match id {
            None => return,
            Some(id) => id,
        };
        self.entity = Some(id);

        let path = match scene.document.path(id) {
            None => {
                self.target = HoverTarget::Entity;
                return;
            }
            Some(path) => &path.path,
        };
        self.target = HoverTarget::Element;

        if !deep {
            return;
        }

        let transform = scene.document.transform_or_identity(id);

        // Vertices first.
        for vertex_index in path.vertex_indices() {
            if path.is_point_inside_point(vertex_index, position, &transform, threshold) {
                self.target = HoverTarget::Vertex;
                self.vertex = Some(vertex_index);
                return;
            }
        }

        // Then handles: control points of segments incident to selected
        // vertices, plus the dangling handles.
        for (point_index, _) in path.points().iter().enumerate() {
            if path.point_flags(point_index).is_empty() {
                continue;
            }
            if path.is_point_inside_point(point_index, position, &transform, threshold) {
                self.target = HoverTarget::Handle;
                self.handle = Some(point_index);
                return;
            }
        }
        for &sentinel in &[vellum_content::path::IN_HANDLE_INDEX,
                           vellum_content::path::OUT_HANDLE_INDEX] {
            if path.is_point_inside_point(sentinel, position, &transform, threshold) {
                self.target = HoverTarget::Handle;
                self.handle = Some(sentinel);
                return;
            }
        }

        // Then segments.
        let stroke = scene.document.stroke(id).map(|stroke| stroke.style());
        for segment_index in 0..path.segment_count() {
            if path.is_point_inside_segment(segment_index,
                                            position,
                                            stroke.as_ref(),
                                            &transform,
                                            threshold) {
                self.target = HoverTarget::Segment;
                self.segment = Some(segment_index);
                return;
            }
        }
    }
}
