// vellum/editor/src/history/mod.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The linear undo model: an append-only action log with batch boundaries.
//!
//! Actions carry binary payloads. `Modify` holds both the new and the old
//! encoding of one component; execute and revert atomically switch the
//! component's binary representation to the stored alternative. Batches are
//! delimited by `end_batch` and undone/redone atomically. Consecutive
//! modifies of the same component within an open batch merge: the stored
//! action keeps its backup and takes the newcomer's data.

use crate::scene::entity::Document;
use uuid::Uuid;
use vellum_content::encoding::{DecodeError, Decoder, EncodedData};

use crate::scene::components::ComponentData;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionTarget {
    Entity,
    Component,
}

#[derive(Clone, Debug)]
pub enum ActionPayload {
    Add { data: EncodedData },
    Remove { data: EncodedData },
    Modify { data: EncodedData, backup: EncodedData },
}

#[derive(Clone, Debug)]
pub struct Action {
    pub entity_id: Uuid,
    pub target: ActionTarget,
    pub payload: ActionPayload,
}

impl Action {
    /// Applies the action to the document. Malformed payloads are rejected
    /// before any mutation.
    fn execute(&self, document: &mut Document) -> Result<(), DecodeError> {
        match self.payload {
            ActionPayload::Add { ref data } => self.apply_add(document, data),
            ActionPayload::Remove { ref data } => self.apply_remove(document, data),
            ActionPayload::Modify { ref data, .. } => self.apply_modify(document, data),
        }
    }

    fn revert(&self, document: &mut Document) -> Result<(), DecodeError> {
        match self.payload {
            ActionPayload::Add { ref data } => self.apply_remove(document, data),
            ActionPayload::Remove { ref data } => self.apply_add(document, data),
            ActionPayload::Modify { ref backup, .. } => self.apply_modify(document, backup),
        }
    }

    fn apply_add(&self, document: &mut Document, data: &EncodedData) -> Result<(), DecodeError> {
        match self.target {
            ActionTarget::Entity => document.insert_entity(self.entity_id, data.bytes()),
            ActionTarget::Component => {
                let component = ComponentData::decode(&mut Decoder::new(data.bytes()))?;
                document.set_component(self.entity_id, component);
                Ok(())
            }
        }
    }

    fn apply_remove(&self, document: &mut Document, data: &EncodedData)
                    -> Result<(), DecodeError> {
        match self.target {
            ActionTarget::Entity => {
                document.remove_entity(self.entity_id);
                Ok(())
            }
            ActionTarget::Component => {
                let mut decoder = Decoder::new(data.bytes());
                let component_id = decoder.component_id()?;
                document.remove_component_by_id(self.entity_id, component_id);
                Ok(())
            }
        }
    }

    fn apply_modify(&self, document: &mut Document, data: &EncodedData)
                    -> Result<(), DecodeError> {
        let component = ComponentData::decode(&mut Decoder::new(data.bytes()))?;
        document.set_component(self.entity_id, component);
        Ok(())
    }

    /// The component id a modify payload addresses, for merge matching.
    fn component_id(&self) -> Option<u8> {
        match self.payload {
            ActionPayload::Modify { ref data, .. } => data.bytes().first().copied(),
            _ => None,
        }
    }

    /// Tries to absorb `other` into this action. Only two modifies of the
    /// same entity and component merge; the newcomer's data replaces ours
    /// while our backup survives.
    fn merge(&mut self, other: &Action) -> bool {
        if self.entity_id != other.entity_id || self.target != other.target {
            return false;
        }
        let (self_component, other_component) = (self.component_id(), other.component_id());
        match (&mut self.payload, &other.payload) {
            (&mut ActionPayload::Modify { ref mut data, .. },
             &ActionPayload::Modify { data: ref new_data, .. })
                if self_component == other_component && self_component.is_some() => {
                *data = new_data.clone();
                true
            }
            _ => false,
        }
    }
}

pub struct History {
    actions: Vec<Action>,
    /// Batch start offsets; the first is always zero.
    batch_indices: Vec<usize>,
    /// The batch boundary the cursor sits at; everything before it is done.
    batch_index: usize,
}

impl Default for History {
    fn default() -> History {
        History { actions: vec![], batch_indices: vec![0], batch_index: 0 }
    }
}

impl History {
    pub fn new() -> History {
        History::default()
    }

    #[inline]
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    #[inline]
    pub fn batch_count(&self) -> usize {
        self.batch_indices.len() - 1
    }

    pub fn can_undo(&self) -> bool {
        self.batch_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.batch_indices[self.batch_index] < self.actions.len()
    }

    pub fn add(&mut self,
               document: &mut Document,
               entity_id: Uuid,
               target: ActionTarget,
               data: EncodedData,
               execute: bool) {
        self.push(document,
                  Action { entity_id, target, payload: ActionPayload::Add { data } },
                  execute);
    }

    pub fn remove(&mut self,
                  document: &mut Document,
                  entity_id: Uuid,
                  target: ActionTarget,
                  data: EncodedData,
                  execute: bool) {
        self.push(document,
                  Action { entity_id, target, payload: ActionPayload::Remove { data } },
                  execute);
    }

    pub fn modify(&mut self,
                  document: &mut Document,
                  entity_id: Uuid,
                  data: EncodedData,
                  backup: EncodedData,
                  execute: bool) {
        self.push(document,
                  Action {
                      entity_id,
                      target: ActionTarget::Component,
                      payload: ActionPayload::Modify { data, backup },
                  },
                  execute);
    }

    /// Appends an action: executes it (unless the caller already applied the
    /// mutation), seals any redo tail, then merges into the open batch when
    /// possible.
    pub fn push(&mut self, document: &mut Document, action: Action, execute: bool) {
        if execute {
            if let Err(error) = action.execute(document) {
                error!("rejecting malformed history action: {}", error);
                return;
            }
        }

        self.seal();

        let batch_start = *self.batch_indices.last().unwrap();
        for existing in &mut self.actions[batch_start..] {
            if existing.merge(&action) {
                return;
            }
        }

        self.actions.push(action);
    }

    /// Reverts the previous batch, last action first. No-op at the start.
    pub fn undo(&mut self, document: &mut Document) {
        if self.batch_index == 0 || self.batch_indices.is_empty() {
            return;
        }

        let batch_start = self.batch_indices[self.batch_index - 1];
        let batch_end = self.batch_indices[self.batch_index];
        for action in self.actions[batch_start..batch_end].iter().rev() {
            if let Err(error) = action.revert(document) {
                error!("undo failed to revert an action: {}", error);
            }
        }
        self.batch_index -= 1;
    }

    /// Re-executes the next batch, first action first. No-op at the end.
    pub fn redo(&mut self, document: &mut Document) {
        let batch_start = self.batch_indices[self.batch_index];
        if batch_start >= self.actions.len() {
            return;
        }

        let batch_end = if self.batch_index + 1 < self.batch_indices.len() {
            self.batch_indices[self.batch_index + 1]
        } else {
            self.actions.len()
        };
        for action in &self.actions[batch_start..batch_end] {
            if let Err(error) = action.execute(document) {
                error!("redo failed to execute an action: {}", error);
            }
        }
        self.batch_index += 1;
    }

    /// Commits a batch boundary; no-op when the tail batch is empty.
    pub fn end_batch(&mut self) {
        if *self.batch_indices.last().unwrap() == self.actions.len() {
            return;
        }
        self.batch_indices.push(self.actions.len());
        self.batch_index += 1;
    }

    /// Discards the open (or most recent) batch without reverting it. Used
    /// by tools that roll their own cancellation.
    pub fn pop(&mut self) {
        if self.actions.is_empty() {
            return;
        }
        if self.batch_indices.len() == 1 {
            self.clear();
            return;
        }

        let previous = self.batch_indices[self.batch_indices.len() - 2];
        if *self.batch_indices.last().unwrap() == self.actions.len() {
            // The tail batch is closed; drop it with its boundary.
            self.actions.truncate(previous);
            self.batch_indices.pop();
        } else {
            // Discard only the open tail.
            let tail = *self.batch_indices.last().unwrap();
            self.actions.truncate(tail);
        }
        self.batch_index = self.batch_index.min(self.batch_indices.len() - 1);
    }

    pub fn clear(&mut self) {
        self.actions.clear();
        self.batch_indices = vec![0];
        self.batch_index = 0;
    }

    /// Drops everything past the cursor so a new action starts a fresh
    /// timeline.
    fn seal(&mut self) {
        if self.batch_index + 1 <= self.batch_indices.len() {
            let keep = self.batch_indices[self.batch_index];
            self.actions.truncate(keep);
            self.batch_indices.truncate(self.batch_index + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::components::{ComponentData, TagData, TransformData};
    use vellum_geometry::transform2d::Transform2F;
    use vellum_geometry::vector::vec2f;

    fn encoded_entity(id: Uuid, tag: &str) -> EncodedData {
        let mut data = EncodedData::new();
        ComponentData::Id(id).encode(&mut data);
        ComponentData::Tag(TagData { tag: tag.to_string() }).encode(&mut data);
        data
    }

    fn encoded_transform(translation: vellum_geometry::vector::Vector2F) -> EncodedData {
        let mut data = EncodedData::new();
        ComponentData::Transform(TransformData {
            matrix: Transform2F::from_translation(translation),
        })
        .encode(&mut data);
        data
    }

    #[test]
    fn test_add_undo_redo() {
        let mut document = Document::new();
        let mut history = History::new();
        let id = Uuid::new_v4();

        history.add(&mut document, id, ActionTarget::Entity, encoded_entity(id, "a"), true);
        history.end_batch();
        assert!(document.has_entity(id));

        history.undo(&mut document);
        assert!(!document.has_entity(id));

        history.redo(&mut document);
        assert!(document.has_entity(id));
        assert_eq!(document.tag(id).unwrap().tag, "a");
    }

    #[test]
    fn test_two_undos_revert_two_batches() {
        let mut document = Document::new();
        let mut history = History::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        history.add(&mut document, a, ActionTarget::Entity, encoded_entity(a, "a"), true);
        history.end_batch();
        history.add(&mut document, b, ActionTarget::Entity, encoded_entity(b, "b"), true);
        history.end_batch();

        history.undo(&mut document);
        assert!(document.has_entity(a) && !document.has_entity(b));
        history.undo(&mut document);
        assert!(!document.has_entity(a));

        // A third undo is a no-op.
        history.undo(&mut document);
        assert_eq!(document.entity_count(), 0);
    }

    #[test]
    fn test_modify_merges_within_batch() {
        let mut document = Document::new();
        let mut history = History::new();
        let id = Uuid::new_v4();

        history.add(&mut document, id, ActionTarget::Entity, encoded_entity(id, "a"), true);
        history.end_batch();

        let backup = encoded_transform(vec2f(0.0, 0.0));
        history.modify(&mut document, id, encoded_transform(vec2f(1.0, 0.0)), backup.clone(),
                       true);
        history.modify(&mut document, id, encoded_transform(vec2f(2.0, 0.0)),
                       encoded_transform(vec2f(1.0, 0.0)), true);
        history.modify(&mut document, id, encoded_transform(vec2f(5.0, 0.0)),
                       encoded_transform(vec2f(2.0, 0.0)), true);
        history.end_batch();

        // The three drags merged into one action.
        assert_eq!(history.action_count(), 2);
        assert_eq!(document.transform(id).unwrap().matrix.vector, vec2f(5.0, 0.0));

        // Undo restores the original backup in one step.
        history.undo(&mut document);
        assert_eq!(document.transform(id).unwrap().matrix.vector, vec2f(0.0, 0.0));
        history.redo(&mut document);
        assert_eq!(document.transform(id).unwrap().matrix.vector, vec2f(5.0, 0.0));
    }

    #[test]
    fn test_new_action_seals_redo_tail() {
        let mut document = Document::new();
        let mut history = History::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        history.add(&mut document, a, ActionTarget::Entity, encoded_entity(a, "a"), true);
        history.end_batch();
        history.add(&mut document, b, ActionTarget::Entity, encoded_entity(b, "b"), true);
        history.end_batch();

        history.undo(&mut document);
        assert!(!document.has_entity(b));

        let c = Uuid::new_v4();
        history.add(&mut document, c, ActionTarget::Entity, encoded_entity(c, "c"), true);
        history.end_batch();

        // Redo has nothing to restore: b's timeline is gone.
        assert!(!history.can_redo());
        history.redo(&mut document);
        assert!(!document.has_entity(b));
        assert!(document.has_entity(c));
    }

    #[test]
    fn test_end_batch_noop_when_empty() {
        let mut history = History::new();
        history.end_batch();
        history.end_batch();
        assert_eq!(history.batch_count(), 0);
    }

    #[test]
    fn test_malformed_action_rejected() {
        let mut document = Document::new();
        let mut history = History::new();
        let id = Uuid::new_v4();

        let mut garbage = EncodedData::new();
        garbage.uint8(250).uint32(9999);
        history.add(&mut document, id, ActionTarget::Entity, garbage, true);

        assert_eq!(history.action_count(), 0);
        assert!(!document.has_entity(id));
    }
}
