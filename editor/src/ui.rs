// vellum/editor/src/ui.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The JSON bridge the host UI pulls from and pushes to.

use crate::input::tools::ToolKind;
use crate::scene::Scene;
use serde::{Deserialize, Serialize};
use vellum_content::gradient::ColorU;

#[derive(Serialize)]
struct UiSelectionEntry {
    id: String,
    tag: String,
    partial: bool,
}

#[derive(Serialize)]
struct UiData {
    tool: i32,
    background: [u8; 4],
    selection: Vec<UiSelectionEntry>,
}

#[derive(Deserialize)]
struct UiPatch {
    tool: Option<i32>,
    background: Option<[u8; 4]>,
}

/// Serializes the scene state the host UI mirrors.
pub fn ui_data(scene: &Scene) -> String {
    let background = scene.background();
    let data = UiData {
        tool: scene.tool_state.current() as i32,
        background: [background.r, background.g, background.b, background.a],
        selection: scene
            .selection
            .selected()
            .iter()
            .map(|(id, entry)| UiSelectionEntry {
                id: id.to_string(),
                tag: scene
                    .document
                    .tag(*id)
                    .map_or_else(String::new, |tag| tag.tag.clone()),
                partial: entry.kind == crate::scene::selection::SelectionKind::Element,
            })
            .collect(),
    };
    serde_json::to_string(&data).unwrap_or_else(|_| "{}".to_string())
}

/// Applies a host UI patch. Returns whether anything changed.
pub fn modify_ui_data(scene: &mut Scene, json: &str) -> bool {
    let patch: UiPatch = match serde_json::from_str(json) {
        Err(error) => {
            warn!("rejecting malformed ui patch: {}", error);
            return false;
        }
        Ok(patch) => patch,
    };

    let mut changed = false;
    if let Some(tool) = patch.tool.and_then(tool_from_index) {
        scene.tool_state.set_current(tool);
        changed = true;
    }
    if let Some([r, g, b, a]) = patch.background {
        scene.set_background(ColorU::new(r, g, b, a));
        changed = true;
    }
    changed
}

pub fn tool_from_index(index: i32) -> Option<ToolKind> {
    match index {
        0 => Some(ToolKind::Select),
        1 => Some(ToolKind::DirectSelect),
        2 => Some(ToolKind::Pen),
        3 => Some(ToolKind::Pencil),
        4 => Some(ToolKind::Pan),
        5 => Some(ToolKind::Zoom),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ui_data_round_trip() {
        let mut scene = Scene::new();
        let json = ui_data(&scene);
        assert!(json.contains("\"tool\":0"));

        assert!(modify_ui_data(&mut scene, "{\"tool\": 2, \"background\": [1, 2, 3, 255]}"));
        assert_eq!(scene.tool_state.current(), ToolKind::Pen);
        assert_eq!(scene.background(), ColorU::new(1, 2, 3, 255));

        assert!(!modify_ui_data(&mut scene, "not json"));
        assert!(!modify_ui_data(&mut scene, "{}"));
    }
}
