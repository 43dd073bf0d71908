// vellum/editor/src/scene/mod.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A scene: entities, selection, viewport, render cache, and history.

pub mod cache;
pub mod components;
pub mod entity;
pub mod selection;
pub mod viewport;

use crate::history::{ActionTarget, History};
use crate::input::tools::ToolState;
use cache::Cache;
use components::*;
use entity::Document;
use fxhash::FxHashMap;
use selection::{Selection, SelectionEntry};
use std::collections::HashSet;
use uuid::Uuid;
use vellum_content::gradient::ColorU;
use vellum_content::path::Path;
use vellum_content::quadratic::QuadraticPath;
use vellum_geometry::rect::RectF;
use vellum_geometry::transform2d::Transform2F;
use vellum_geometry::vector::Vector2F;
use vellum_gpu::Device;
use vellum_renderer::options::{DrawOptions, FillOptions, FrameViewport, Paint, StrokeOptions};
use vellum_renderer::renderer::Renderer;
use viewport::Viewport;

const SELECTION_COLOR: ColorU = ColorU { r: 56, g: 128, b: 255, a: 255 };

pub struct Scene {
    pub id: Uuid,
    pub viewport: Viewport,
    pub selection: Selection,
    pub history: History,
    pub cache: Cache,
    pub document: Document,
    pub tool_state: ToolState,

    background: ColorU,
    tag_counter: usize,
}

impl Default for Scene {
    fn default() -> Scene {
        Scene::new()
    }
}

impl Scene {
    pub fn new() -> Scene {
        Scene {
            id: Uuid::new_v4(),
            viewport: Viewport::default(),
            selection: Selection::new(),
            history: History::new(),
            cache: Cache::new(),
            document: Document::new(),
            tool_state: ToolState::new(),
            background: ColorU::new(240, 240, 240, 255),
            tag_counter: 0,
        }
    }

    #[inline]
    pub fn background(&self) -> ColorU {
        self.background
    }

    pub fn set_background(&mut self, background: ColorU) {
        self.background = background;
        self.cache.invalidate_rect(self.viewport.visible_rect());
    }

    // Entity creation

    /// Creates a bare entity with a tag and category, through history.
    pub fn create_entity(&mut self, tag: Option<&str>) -> Uuid {
        let id = Uuid::new_v4();
        let tag = match tag {
            Some(tag) => tag.to_string(),
            None => {
                self.tag_counter += 1;
                format!("Entity {}", self.tag_counter)
            }
        };

        let mut data = vellum_content::encoding::EncodedData::new();
        ComponentData::Id(id).encode(&mut data);
        ComponentData::Tag(TagData { tag }).encode(&mut data);
        ComponentData::Category(CategoryData::default()).encode(&mut data);

        self.history.add(&mut self.document, id, ActionTarget::Entity, data, true);
        id
    }

    /// Creates a drawable element: path, transform, and default styles.
    pub fn create_element(&mut self, path: Option<Path>) -> Uuid {
        let id = Uuid::new_v4();
        self.tag_counter += 1;
        let tag = format!("Element {}", self.tag_counter);

        let mut data = vellum_content::encoding::EncodedData::new();
        ComponentData::Id(id).encode(&mut data);
        ComponentData::Tag(TagData { tag }).encode(&mut data);
        ComponentData::Category(CategoryData::default()).encode(&mut data);
        ComponentData::Path(PathData { path: path.unwrap_or_default() }).encode(&mut data);
        ComponentData::Transform(TransformData::default()).encode(&mut data);
        ComponentData::Fill(FillData::default()).encode(&mut data);
        ComponentData::Stroke(StrokeData::default()).encode(&mut data);

        self.history.add(&mut self.document, id, ActionTarget::Entity, data, true);
        self.invalidate_entity(id);
        id
    }

    /// Loads a persisted entity directly into the document, bypassing
    /// history; loaded content is the floor the undo stack stands on.
    pub fn load_entity(&mut self, bytes: &[u8])
                       -> Result<Uuid, vellum_content::encoding::DecodeError> {
        let mut decoder = vellum_content::encoding::Decoder::new(bytes);
        let id = match ComponentData::decode(&mut decoder)? {
            ComponentData::Id(id) => id,
            _ => return Err(vellum_content::encoding::DecodeError::InvalidValue),
        };
        self.document.insert_entity(id, bytes)?;
        self.invalidate_entity(id);
        Ok(id)
    }

    /// Re-creates an entity under a fresh id.
    pub fn duplicate_entity(&mut self, id: Uuid) -> Option<Uuid> {
        if !self.document.has_entity(id) {
            return None;
        }

        let encoded = self.document.encode_entity(id);
        let mut decoder = vellum_content::encoding::Decoder::new(encoded.bytes());
        let new_id = Uuid::new_v4();
        let mut data = vellum_content::encoding::EncodedData::new();
        while !decoder.is_at_end() {
            match ComponentData::decode(&mut decoder).ok()? {
                ComponentData::Id(_) => ComponentData::Id(new_id).encode(&mut data),
                other => other.encode(&mut data),
            }
        }

        self.history.add(&mut self.document, new_id, ActionTarget::Entity, data, true);
        self.invalidate_entity(new_id);
        Some(new_id)
    }

    /// Deletes an entity (and, for groups and layers, its subtree) through
    /// history.
    pub fn delete_entity(&mut self, id: Uuid) {
        if !self.document.has_entity(id) {
            return;
        }

        for target in self.document.collect_subtree(id) {
            if !self.document.has_entity(target) {
                continue;
            }
            self.invalidate_entity(target);
            let encoded = self.document.encode_entity(target);
            self.history.remove(&mut self.document, target, ActionTarget::Entity, encoded, true);
            self.selection.deselect(target);
        }
    }

    /// Wraps the committed selection into a new group entity.
    pub fn group_selected(&mut self) -> Option<Uuid> {
        if self.selection.is_empty() {
            return None;
        }

        let children: Vec<Uuid> = self.selection.selected().keys().copied().collect();
        let id = Uuid::new_v4();
        for &child in &children {
            if self.document.would_create_cycle(id, child) {
                return None;
            }
        }

        self.tag_counter += 1;
        let mut data = vellum_content::encoding::EncodedData::new();
        ComponentData::Id(id).encode(&mut data);
        ComponentData::Tag(TagData { tag: format!("Group {}", self.tag_counter) })
            .encode(&mut data);
        ComponentData::Category(CategoryData::default()).encode(&mut data);
        ComponentData::Group(GroupData { children }).encode(&mut data);

        self.history.add(&mut self.document, id, ActionTarget::Entity, data, true);
        self.history.end_batch();

        self.selection.clear();
        self.selection.select(id);
        Some(id)
    }

    // Component mutation, routed through history

    /// Mutates an entity's path through history; merges with earlier path
    /// edits in the same batch.
    pub fn modify_path<F>(&mut self, id: Uuid, edit: F) -> bool
    where
        F: FnOnce(&mut Path),
    {
        let old = match self.document.encode_component(id, PATH_COMPONENT) {
            None => return false,
            Some(old) => old,
        };

        let mut path = self.document.path(id).unwrap().path.clone();
        edit(&mut path);

        let mut new = vellum_content::encoding::EncodedData::new();
        ComponentData::Path(PathData { path }).encode(&mut new);

        self.invalidate_entity(id);
        self.history.modify(&mut self.document, id, new, old, true);
        self.invalidate_entity(id);
        true
    }

    /// Replaces an entity's transform through history.
    pub fn modify_transform(&mut self, id: Uuid, matrix: Transform2F) -> bool {
        let old = match self.document.encode_component(id, TRANSFORM_COMPONENT) {
            None => return false,
            Some(old) => old,
        };

        let mut new = vellum_content::encoding::EncodedData::new();
        ComponentData::Transform(TransformData { matrix }).encode(&mut new);

        self.invalidate_entity(id);
        self.history.modify(&mut self.document, id, new, old, true);
        self.invalidate_entity(id);
        true
    }

    pub fn translate_entity(&mut self, id: Uuid, delta: Vector2F) -> bool {
        let matrix = self.document.transform_or_identity(id);
        self.modify_transform(id, Transform2F::from_translation(delta) * matrix)
    }

    pub fn modify_fill(&mut self, id: Uuid, fill: FillData) -> bool {
        let old = match self.document.encode_component(id, FILL_COMPONENT) {
            None => return false,
            Some(old) => old,
        };
        let mut new = vellum_content::encoding::EncodedData::new();
        ComponentData::Fill(fill).encode(&mut new);
        self.history.modify(&mut self.document, id, new, old, true);
        self.invalidate_entity(id);
        true
    }

    pub fn modify_stroke(&mut self, id: Uuid, stroke: StrokeData) -> bool {
        let old = match self.document.encode_component(id, STROKE_COMPONENT) {
            None => return false,
            Some(old) => old,
        };
        let mut new = vellum_content::encoding::EncodedData::new();
        ComponentData::Stroke(stroke).encode(&mut new);
        self.history.modify(&mut self.document, id, new, old, true);
        self.invalidate_entity(id);
        true
    }

    fn invalidate_entity(&mut self, id: Uuid) {
        if let Some(rect) = self.document.bounding_rect(id) {
            // Pad for stroke width and antialiasing.
            let padding = self.document.stroke(id).map_or(1.0, |stroke| stroke.width + 1.0);
            self.cache.invalidate_rect(rect.dilate(padding));
        }
    }

    // Hit testing

    /// The topmost selectable entity at `point`, or `None`.
    ///
    /// `deep` also hit-tests individual vertices and handles (used by the
    /// direct-selection tools); plain hit tests only consider fills and
    /// strokes.
    pub fn entity_at(&self, point: Vector2F, deep: bool, threshold: f32) -> Option<Uuid> {
        let zoom = self.viewport.zoom();
        for &id in self.document.order().iter().rev() {
            if !self.is_selectable(id) {
                continue;
            }
            let path = match self.document.path(id) {
                None => continue,
                Some(path) => &path.path,
            };
            let transform = self.document.transform_or_identity(id);

            if deep {
                // Vertices and dangling handles count as hits.
                let node_hit = path.points().iter().enumerate().any(|(index, _)| {
                    path.is_vertex(index) &&
                        path.is_point_inside_point(index, point, &transform, threshold)
                });
                if node_hit {
                    return Some(id);
                }
            }

            let fill = self.document.fill(id).map(|fill| fill.rule);
            let stroke = self.document.stroke(id).map(|stroke| stroke.style());
            if path.hit_test(point, fill, stroke.as_ref(), &transform, threshold, zoom) {
                return Some(id);
            }
        }
        None
    }

    /// All selectable entities intersecting `rect`. With `deep`, entities
    /// partially inside produce `Element` entries carrying the contained
    /// vertex indices; entities with every vertex inside collapse to whole
    /// `Entity` entries.
    pub fn entities_in(&self, rect: RectF, deep: bool) -> FxHashMap<Uuid, SelectionEntry> {
        let mut result = FxHashMap::default();
        for &id in self.document.order() {
            if !self.is_selectable(id) {
                continue;
            }
            let path = match self.document.path(id) {
                None => continue,
                Some(path) => &path.path,
            };
            let transform = self.document.transform_or_identity(id);

            if !deep {
                if path.intersects_rect(rect, &transform, None) {
                    result.insert(id, SelectionEntry::entity());
                }
                continue;
            }

            let mut vertices = HashSet::new();
            if !path.intersects_rect(rect, &transform, Some(&mut vertices)) {
                continue;
            }
            let vertex_indices = path.vertex_indices();
            let inside: Vec<usize> = vertex_indices
                .iter()
                .copied()
                .filter(|index| vertices.contains(index))
                .collect();

            if !inside.is_empty() && inside.len() == vertex_indices.len() {
                result.insert(id, SelectionEntry::entity());
            } else if !inside.is_empty() {
                result.insert(id, SelectionEntry::element(inside));
            }
        }
        result
    }

    fn is_selectable(&self, id: Uuid) -> bool {
        self.document.category(id).map_or(true, |category| {
            category.flags.contains(CategoryFlags::SELECTABLE) &&
                !category.flags.contains(CategoryFlags::LOCKED) &&
                !category.flags.contains(CategoryFlags::HIDDEN)
        })
    }

    /// The committed selection's bounding rectangle, in scene space.
    pub fn selection_bounding_rect(&self) -> Option<RectF> {
        let mut rect: Option<RectF> = None;
        for id in self.selection.selected().keys() {
            if let Some(entity_rect) = self.document.bounding_rect(*id) {
                rect = Some(match rect {
                    None => entity_rect,
                    Some(rect) => rect.union_rect(entity_rect),
                });
            }
        }
        rect
    }

    // Rendering

    /// Draws the scene in z order, then the selection and tool overlays.
    pub fn render<D>(&mut self, renderer: &mut Renderer<D>, ignore_cache: bool)
    where
        D: Device,
    {
        if self.cache.is_empty() || ignore_cache {
            self.cache.reset(&self.viewport);
        }
        let _invalid = self.cache.take_invalid_rects();

        let viewport = FrameViewport {
            size: self.viewport.size(),
            position: self.viewport.position(),
            zoom: self.viewport.zoom(),
        };
        renderer.begin_frame(viewport, self.background);

        let visible = self.viewport.visible_rect();
        let zoom = self.viewport.zoom();

        for &id in self.document.order() {
            if let Some(category) = self.document.category(id) {
                if category.flags.contains(CategoryFlags::HIDDEN) {
                    continue;
                }
            }

            if let Some(artboard) = self.document.artboard(id) {
                let origin = self.document.transform_or_identity(id).vector;
                renderer.draw_rect(RectF::new(origin, artboard.size), artboard.color);
                continue;
            }

            let path = match self.document.path(id) {
                None => continue,
                Some(path) => &path.path,
            };
            match self.document.bounding_rect(id) {
                Some(rect) if !rect.dilate(stroke_padding(&self.document, id))
                    .intersects(visible) => continue,
                _ => {}
            }

            let transform = self.document.transform_or_identity(id);
            let fill = self.document.fill(id).map(|fill| FillOptions {
                paint: match fill.paint {
                    FillPaint::Color(color) => Paint::SolidColor(color),
                    FillPaint::Gradient(ref gradient) => Paint::Gradient(gradient.clone()),
                },
                rule: fill.rule,
            });
            let stroke = self.document.stroke(id).map(|stroke| StrokeOptions {
                color: stroke.color,
                style: stroke.style(),
            });

            let quadratics: QuadraticPath =
                path.to_quadratics(vellum_content::path::flatten_tolerance(zoom));
            renderer.draw_path(&quadratics, &DrawOptions { transform, fill, stroke });
        }

        self.render_selection_overlays(renderer);
        self.tool_state
            .render_overlays(&self.document, &self.selection, &self.viewport, renderer);

        self.cache.validate_all();
    }

    fn render_selection_overlays<D>(&self, renderer: &mut Renderer<D>) where D: Device {
        let zoom = self.viewport.zoom();
        let direct = self.tool_state.is_direct();
        for (&id, _) in self.selection.iter_all() {
            let path = match self.document.path(id) {
                None => continue,
                Some(path) => &path.path,
            };
            let transform = self.document.transform_or_identity(id);
            renderer.draw_outline(path, &transform, zoom, SELECTION_COLOR, direct);
        }
    }

}

fn stroke_padding(document: &Document, id: Uuid) -> f32 {
    document.stroke(id).map_or(1.0, |stroke| stroke.width * 0.5 + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_geometry::vector::{vec2f, vec2i};

    fn scene_with_rect(min: Vector2F, max: Vector2F) -> (Scene, Uuid) {
        let mut scene = Scene::new();
        scene.viewport.resize(vec2i(800, 600), vec2i(0, 0), 1.0);
        let path = Path::rect(RectF::from_points(min, max));
        let id = scene.create_element(Some(path));
        scene.history.end_batch();
        (scene, id)
    }

    #[test]
    fn test_create_and_hit_test() {
        let (scene, id) = scene_with_rect(vec2f(10.0, 10.0), vec2f(110.0, 110.0));
        assert_eq!(scene.entity_at(vec2f(50.0, 50.0), false, 2.0), Some(id));
        assert_eq!(scene.entity_at(vec2f(500.0, 500.0), false, 2.0), None);
    }

    #[test]
    fn test_delete_undo_redo() {
        let (mut scene, id) = scene_with_rect(vec2f(0.0, 0.0), vec2f(50.0, 50.0));

        scene.delete_entity(id);
        scene.history.end_batch();
        assert!(!scene.document.has_entity(id));

        let mut document = std::mem::take(&mut scene.document);
        scene.history.undo(&mut document);
        assert!(document.has_entity(id));

        // A second undo removes the creation batch as well.
        scene.history.undo(&mut document);
        assert!(!document.has_entity(id));
        scene.document = document;
    }

    #[test]
    fn test_entities_in_deep_promotes_full_selection() {
        let (scene, id) = scene_with_rect(vec2f(10.0, 10.0), vec2f(110.0, 110.0));

        // A rect containing every vertex selects the whole entity.
        let all = scene.entities_in(RectF::from_points(vec2f(0.0, 0.0), vec2f(200.0, 200.0)),
                                    true);
        assert_eq!(all[&id].kind, selection::SelectionKind::Entity);

        // A rect containing one corner selects that vertex.
        let partial = scene.entities_in(RectF::from_points(vec2f(0.0, 0.0), vec2f(40.0, 40.0)),
                                        true);
        assert_eq!(partial[&id].kind, selection::SelectionKind::Element);
        assert_eq!(partial[&id].indices.len(), 1);
    }

    #[test]
    fn test_duplicate_entity() {
        let (mut scene, id) = scene_with_rect(vec2f(0.0, 0.0), vec2f(20.0, 20.0));
        let copy = scene.duplicate_entity(id).unwrap();
        assert_ne!(copy, id);
        assert!(scene.document.has_entity(copy));
        assert_eq!(scene.document.path(copy).unwrap().path.points().len(),
                   scene.document.path(id).unwrap().path.points().len());
    }

    #[test]
    fn test_group_selected() {
        let (mut scene, id) = scene_with_rect(vec2f(0.0, 0.0), vec2f(20.0, 20.0));
        scene.selection.select(id);
        let group = scene.group_selected().unwrap();
        assert_eq!(scene.document.group(group).unwrap().children, vec![id]);
        assert!(scene.selection.is_fully_selected(group));
    }

    #[test]
    fn test_modify_path_through_history() {
        let (mut scene, id) = scene_with_rect(vec2f(0.0, 0.0), vec2f(20.0, 20.0));

        scene.modify_path(id, |path| {
            path.translate_point(0, vec2f(5.0, 0.0)).unwrap();
        });
        scene.history.end_batch();
        assert_eq!(scene.document.path(id).unwrap().path.points()[0], vec2f(5.0, 0.0));

        let mut document = std::mem::take(&mut scene.document);
        scene.history.undo(&mut document);
        assert_eq!(document.path(id).unwrap().path.points()[0], vec2f(0.0, 0.0));
        scene.document = document;
    }
}
