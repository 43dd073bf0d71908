// vellum/editor/src/scene/selection.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Entity and vertex selection.
//!
//! Two maps: the committed selection and a temporary rubber-band set that
//! `sync` folds in. A whole entity is `kind == Entity`; a partial selection
//! is `kind == Element` with the selected vertex indices.

use fxhash::FxHashMap;
use std::collections::BTreeSet;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionKind {
    Entity,
    Element,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SelectionEntry {
    pub kind: SelectionKind,
    pub indices: BTreeSet<usize>,
}

impl SelectionEntry {
    #[inline]
    pub fn entity() -> SelectionEntry {
        SelectionEntry { kind: SelectionKind::Entity, indices: BTreeSet::new() }
    }

    pub fn element<I>(indices: I) -> SelectionEntry where I: IntoIterator<Item = usize> {
        SelectionEntry { kind: SelectionKind::Element, indices: indices.into_iter().collect() }
    }

    fn merge(&mut self, other: &SelectionEntry) {
        if self.kind == SelectionKind::Entity || other.kind == SelectionKind::Entity {
            self.kind = SelectionKind::Entity;
            self.indices.clear();
            return;
        }
        self.indices.extend(other.indices.iter().copied());
    }
}

#[derive(Clone, Debug, Default)]
pub struct Selection {
    selected: FxHashMap<Uuid, SelectionEntry>,
    temp: FxHashMap<Uuid, SelectionEntry>,
}

impl Selection {
    pub fn new() -> Selection {
        Selection::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    #[inline]
    pub fn selected(&self) -> &FxHashMap<Uuid, SelectionEntry> {
        &self.selected
    }

    #[inline]
    pub fn temp(&self) -> &FxHashMap<Uuid, SelectionEntry> {
        &self.temp
    }

    #[inline]
    pub fn is_selected(&self, id: Uuid) -> bool {
        self.selected.contains_key(&id)
    }

    /// Whether the entity is selected as a whole.
    pub fn is_fully_selected(&self, id: Uuid) -> bool {
        self.selected
            .get(&id)
            .map_or(false, |entry| entry.kind == SelectionKind::Entity)
    }

    pub fn is_vertex_selected(&self, id: Uuid, vertex: usize) -> bool {
        self.selected.get(&id).map_or(false, |entry| match entry.kind {
            SelectionKind::Entity => true,
            SelectionKind::Element => entry.indices.contains(&vertex),
        })
    }

    pub fn select(&mut self, id: Uuid) {
        self.selected.insert(id, SelectionEntry::entity());
    }

    pub fn select_vertex(&mut self, id: Uuid, vertex: usize) {
        match self.selected.get_mut(&id) {
            Some(entry) if entry.kind == SelectionKind::Element => {
                entry.indices.insert(vertex);
            }
            Some(_) => {}
            None => {
                self.selected.insert(id, SelectionEntry::element(Some(vertex)));
            }
        }
    }

    pub fn deselect(&mut self, id: Uuid) {
        self.selected.remove(&id);
    }

    pub fn deselect_vertex(&mut self, id: Uuid, vertex: usize) {
        let remove = match self.selected.get_mut(&id) {
            Some(entry) if entry.kind == SelectionKind::Element => {
                entry.indices.remove(&vertex);
                entry.indices.is_empty()
            }
            _ => false,
        };
        if remove {
            self.selected.remove(&id);
        }
    }

    pub fn toggle(&mut self, id: Uuid) {
        if self.selected.remove(&id).is_none() {
            self.select(id);
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.temp.clear();
    }

    // The rubber-band set

    pub fn set_temp(&mut self, entries: FxHashMap<Uuid, SelectionEntry>) {
        self.temp = entries;
    }

    pub fn clear_temp(&mut self) {
        self.temp.clear();
    }

    /// Promotes the temporary set into the committed one, merging vertex
    /// index sets.
    pub fn sync(&mut self) {
        let temp = std::mem::replace(&mut self.temp, FxHashMap::default());
        for (id, entry) in temp {
            match self.selected.get_mut(&id) {
                Some(existing) => existing.merge(&entry),
                None => {
                    self.selected.insert(id, entry);
                }
            }
        }
    }

    /// Ids selected either way, committed before temporary.
    pub fn iter_all(&self) -> impl Iterator<Item = (&Uuid, &SelectionEntry)> {
        self.selected.iter().chain(self.temp.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_toggle() {
        let mut selection = Selection::new();
        let id = Uuid::new_v4();
        selection.toggle(id);
        assert!(selection.is_fully_selected(id));
        selection.toggle(id);
        assert!(!selection.is_selected(id));
    }

    #[test]
    fn test_sync_merges_indices() {
        let mut selection = Selection::new();
        let id = Uuid::new_v4();
        selection.select_vertex(id, 1);

        let mut temp = FxHashMap::default();
        temp.insert(id, SelectionEntry::element(vec![2, 3]));
        selection.set_temp(temp);
        selection.sync();

        let entry = &selection.selected()[&id];
        assert_eq!(entry.kind, SelectionKind::Element);
        assert_eq!(entry.indices.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_sync_entity_wins() {
        let mut selection = Selection::new();
        let id = Uuid::new_v4();
        selection.select_vertex(id, 5);

        let mut temp = FxHashMap::default();
        temp.insert(id, SelectionEntry::entity());
        selection.set_temp(temp);
        selection.sync();

        assert!(selection.is_fully_selected(id));
        assert!(selection.is_vertex_selected(id, 123));
    }
}
