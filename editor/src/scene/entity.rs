// vellum/editor/src/scene/entity.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The entity registry and per-component stores.
//!
//! Entities are addressed by uuid everywhere; components live in sparse
//! per-component maps, wholly owned by the document. The history mutates
//! the document exclusively through the encoded-payload primitives here, so
//! execute and revert stay exact inverses.

use super::components::*;
use fxhash::FxHashMap;
use uuid::Uuid;
use vellum_content::encoding::{DecodeError, Decoder, EncodedData};
use vellum_geometry::rect::RectF;
use vellum_geometry::transform2d::Transform2F;

/// Defensive depth limit for group/layer traversal.
const MAX_TRAVERSAL_DEPTH: usize = 64;

#[derive(Default)]
pub struct Document {
    pub(crate) order: Vec<Uuid>,

    tags: FxHashMap<Uuid, TagData>,
    categories: FxHashMap<Uuid, CategoryData>,
    paths: FxHashMap<Uuid, PathData>,
    transforms: FxHashMap<Uuid, TransformData>,
    fills: FxHashMap<Uuid, FillData>,
    strokes: FxHashMap<Uuid, StrokeData>,
    groups: FxHashMap<Uuid, GroupData>,
    layers: FxHashMap<Uuid, LayerData>,
    artboards: FxHashMap<Uuid, ArtboardData>,
}

impl Document {
    pub fn new() -> Document {
        Document::default()
    }

    #[inline]
    pub fn has_entity(&self, id: Uuid) -> bool {
        self.order.contains(&id)
    }

    /// Entity ids in z order, bottom first.
    #[inline]
    pub fn order(&self) -> &[Uuid] {
        &self.order
    }

    pub fn entity_count(&self) -> usize {
        self.order.len()
    }

    // Typed component access

    pub fn tag(&self, id: Uuid) -> Option<&TagData> {
        self.tags.get(&id)
    }

    pub fn category(&self, id: Uuid) -> Option<&CategoryData> {
        self.categories.get(&id)
    }

    pub fn path(&self, id: Uuid) -> Option<&PathData> {
        self.paths.get(&id)
    }

    pub fn transform(&self, id: Uuid) -> Option<&TransformData> {
        self.transforms.get(&id)
    }

    pub fn fill(&self, id: Uuid) -> Option<&FillData> {
        self.fills.get(&id)
    }

    pub fn stroke(&self, id: Uuid) -> Option<&StrokeData> {
        self.strokes.get(&id)
    }

    pub fn group(&self, id: Uuid) -> Option<&GroupData> {
        self.groups.get(&id)
    }

    pub fn layer(&self, id: Uuid) -> Option<&LayerData> {
        self.layers.get(&id)
    }

    pub fn artboard(&self, id: Uuid) -> Option<&ArtboardData> {
        self.artboards.get(&id)
    }

    /// The entity's effective transform, identity when absent.
    pub fn transform_or_identity(&self, id: Uuid) -> Transform2F {
        self.transforms.get(&id).map_or(Transform2F::default(), |data| data.matrix)
    }

    /// The transformed bounding rectangle of the entity's path (exact when
    /// unrotated, extrema-accurate otherwise), recursing through children.
    pub fn bounding_rect(&self, id: Uuid) -> Option<RectF> {
        self.bounding_rect_with_depth(id, 0)
    }

    fn bounding_rect_with_depth(&self, id: Uuid, depth: usize) -> Option<RectF> {
        if depth > MAX_TRAVERSAL_DEPTH {
            warn!("entity {} exceeds the traversal depth limit", id);
            return None;
        }

        if let Some(path) = self.paths.get(&id) {
            let transform = self.transform_or_identity(id);
            let rect = if transform.is_axis_aligned() {
                transform.transform_rect(path.path.bounding_rect())
            } else {
                path.path.bounding_rect_transformed(&transform)
            };
            return Some(rect);
        }

        let children = self
            .groups
            .get(&id)
            .map(|group| &group.children)
            .or_else(|| self.layers.get(&id).map(|layer| &layer.children))?;

        let mut rect: Option<RectF> = None;
        for &child in children {
            if let Some(child_rect) = self.bounding_rect_with_depth(child, depth + 1) {
                rect = Some(match rect {
                    None => child_rect,
                    Some(rect) => rect.union_rect(child_rect),
                });
            }
        }
        rect
    }

    /// Ids of an entity and all its descendants, depth-limited.
    pub fn collect_subtree(&self, id: Uuid) -> Vec<Uuid> {
        let mut result = vec![];
        let mut stack = vec![(id, 0)];
        while let Some((current, depth)) = stack.pop() {
            if depth > MAX_TRAVERSAL_DEPTH {
                continue;
            }
            result.push(current);
            let children = self
                .groups
                .get(&current)
                .map(|group| &group.children)
                .or_else(|| self.layers.get(&current).map(|layer| &layer.children));
            if let Some(children) = children {
                for &child in children {
                    stack.push((child, depth + 1));
                }
            }
        }
        result
    }

    /// Whether adding `child` under `parent` would create a cycle.
    pub fn would_create_cycle(&self, parent: Uuid, child: Uuid) -> bool {
        parent == child || self.collect_subtree(child).contains(&parent)
    }

    // Raw mutation, used only by the history's action execution.

    pub(crate) fn set_component(&mut self, id: Uuid, component: ComponentData) {
        match component {
            // The identity component is implicit in the maps' keys.
            ComponentData::Id(decoded) => debug_assert_eq!(decoded, id),
            ComponentData::Tag(data) => {
                self.tags.insert(id, data);
            }
            ComponentData::Category(data) => {
                self.categories.insert(id, data);
            }
            ComponentData::Path(data) => {
                self.paths.insert(id, data);
            }
            ComponentData::Transform(data) => {
                self.transforms.insert(id, data);
            }
            ComponentData::Fill(data) => {
                self.fills.insert(id, data);
            }
            ComponentData::Stroke(data) => {
                self.strokes.insert(id, data);
            }
            ComponentData::Group(data) => {
                self.groups.insert(id, data);
            }
            ComponentData::Layer(data) => {
                self.layers.insert(id, data);
            }
            ComponentData::Artboard(data) => {
                self.artboards.insert(id, data);
            }
        }
    }

    pub(crate) fn remove_component_by_id(&mut self, id: Uuid, component_id: u8) {
        match component_id {
            ID_COMPONENT => {}
            TAG_COMPONENT => {
                self.tags.remove(&id);
            }
            CATEGORY_COMPONENT => {
                self.categories.remove(&id);
            }
            PATH_COMPONENT => {
                self.paths.remove(&id);
            }
            TRANSFORM_COMPONENT => {
                self.transforms.remove(&id);
            }
            FILL_COMPONENT => {
                self.fills.remove(&id);
            }
            STROKE_COMPONENT => {
                self.strokes.remove(&id);
            }
            GROUP_COMPONENT => {
                self.groups.remove(&id);
            }
            LAYER_COMPONENT => {
                self.layers.remove(&id);
            }
            ARTBOARD_COMPONENT => {
                self.artboards.remove(&id);
            }
            _ => debug_assert!(false, "unknown component id {}", component_id),
        }
    }

    /// Materializes an entity from its encoded components. Fails without
    /// mutating on malformed input.
    pub(crate) fn insert_entity(&mut self,
                                id: Uuid,
                                bytes: &[u8])
                                -> Result<(), DecodeError> {
        let mut decoder = Decoder::new(bytes);
        let mut components = vec![];
        while !decoder.is_at_end() {
            components.push(ComponentData::decode(&mut decoder)?);
        }

        debug_assert!(!self.has_entity(id), "inserting a duplicate entity");
        for component in components {
            self.set_component(id, component);
        }
        self.order.push(id);
        Ok(())
    }

    pub(crate) fn remove_entity(&mut self, id: Uuid) {
        self.order.retain(|&other| other != id);
        self.tags.remove(&id);
        self.categories.remove(&id);
        self.paths.remove(&id);
        self.transforms.remove(&id);
        self.fills.remove(&id);
        self.strokes.remove(&id);
        self.groups.remove(&id);
        self.layers.remove(&id);
        self.artboards.remove(&id);
    }

    /// Serializes an entity as the concatenation of its components.
    pub fn encode_entity(&self, id: Uuid) -> EncodedData {
        let mut data = EncodedData::new();
        ComponentData::Id(id).encode(&mut data);
        if let Some(tag) = self.tags.get(&id) {
            ComponentData::Tag(tag.clone()).encode(&mut data);
        }
        if let Some(category) = self.categories.get(&id) {
            ComponentData::Category(*category).encode(&mut data);
        }
        if let Some(path) = self.paths.get(&id) {
            ComponentData::Path(path.clone()).encode(&mut data);
        }
        if let Some(transform) = self.transforms.get(&id) {
            ComponentData::Transform(*transform).encode(&mut data);
        }
        if let Some(fill) = self.fills.get(&id) {
            ComponentData::Fill(fill.clone()).encode(&mut data);
        }
        if let Some(stroke) = self.strokes.get(&id) {
            ComponentData::Stroke(*stroke).encode(&mut data);
        }
        if let Some(group) = self.groups.get(&id) {
            ComponentData::Group(group.clone()).encode(&mut data);
        }
        if let Some(layer) = self.layers.get(&id) {
            ComponentData::Layer(layer.clone()).encode(&mut data);
        }
        if let Some(artboard) = self.artboards.get(&id) {
            ComponentData::Artboard(*artboard).encode(&mut data);
        }
        data
    }

    /// Encodes a single component of an entity, when present.
    pub fn encode_component(&self, id: Uuid, component_id: u8) -> Option<EncodedData> {
        let mut data = EncodedData::new();
        match component_id {
            ID_COMPONENT => ComponentData::Id(id).encode(&mut data),
            TAG_COMPONENT => ComponentData::Tag(self.tags.get(&id)?.clone()).encode(&mut data),
            CATEGORY_COMPONENT => {
                ComponentData::Category(*self.categories.get(&id)?).encode(&mut data)
            }
            PATH_COMPONENT => ComponentData::Path(self.paths.get(&id)?.clone()).encode(&mut data),
            TRANSFORM_COMPONENT => {
                ComponentData::Transform(*self.transforms.get(&id)?).encode(&mut data)
            }
            FILL_COMPONENT => ComponentData::Fill(self.fills.get(&id)?.clone()).encode(&mut data),
            STROKE_COMPONENT => ComponentData::Stroke(*self.strokes.get(&id)?).encode(&mut data),
            GROUP_COMPONENT => {
                ComponentData::Group(self.groups.get(&id)?.clone()).encode(&mut data)
            }
            LAYER_COMPONENT => {
                ComponentData::Layer(self.layers.get(&id)?.clone()).encode(&mut data)
            }
            ARTBOARD_COMPONENT => {
                ComponentData::Artboard(*self.artboards.get(&id)?).encode(&mut data)
            }
            _ => return None,
        }
        Some(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_content::path::Path;
    use vellum_geometry::vector::vec2f;

    fn test_entity(document: &mut Document) -> Uuid {
        let id = Uuid::new_v4();
        let mut data = EncodedData::new();
        ComponentData::Id(id).encode(&mut data);
        ComponentData::Tag(TagData { tag: "element".into() }).encode(&mut data);
        ComponentData::Path(PathData {
            path: Path::rect(RectF::from_points(vec2f(0.0, 0.0), vec2f(10.0, 10.0))),
        })
        .encode(&mut data);
        ComponentData::Transform(TransformData::default()).encode(&mut data);
        document.insert_entity(id, data.bytes()).unwrap();
        id
    }

    #[test]
    fn test_insert_encode_round_trip() {
        let mut document = Document::new();
        let id = test_entity(&mut document);
        assert!(document.has_entity(id));

        let encoded = document.encode_entity(id);
        let mut other = Document::new();
        other.insert_entity(id, encoded.bytes()).unwrap();
        assert_eq!(other.tag(id).unwrap().tag, "element");
        assert_eq!(other.path(id).unwrap().path.points().len(), 5);
    }

    #[test]
    fn test_remove_entity_clears_components() {
        let mut document = Document::new();
        let id = test_entity(&mut document);
        document.remove_entity(id);
        assert!(!document.has_entity(id));
        assert!(document.path(id).is_none());
        assert!(document.tag(id).is_none());
    }

    #[test]
    fn test_cycle_detection() {
        let mut document = Document::new();
        let parent = Uuid::new_v4();
        let child = Uuid::new_v4();
        document.set_component(parent, ComponentData::Group(GroupData {
            children: vec![child],
        }));
        document.order.push(parent);
        document.set_component(child, ComponentData::Group(GroupData { children: vec![] }));
        document.order.push(child);

        // Self-parenting and re-parenting an ancestor under its descendant
        // are both cycles.
        assert!(document.would_create_cycle(parent, parent));
        assert!(document.would_create_cycle(child, parent));
        assert!(!document.would_create_cycle(child, Uuid::new_v4()));
    }

    #[test]
    fn test_malformed_entity_rejected() {
        let mut document = Document::new();
        let id = Uuid::new_v4();
        assert!(document.insert_entity(id, &[255, 0, 1]).is_err());
        assert!(!document.has_entity(id));
    }
}
