// vellum/editor/tests/scenarios.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! End-to-end scenarios driven through the host event API against the null
//! GPU backend.

use uuid::Uuid;
use vellum_content::encoding::EncodedData;
use vellum_content::path::Path;
use vellum_editor::input::keys::*;
use vellum_editor::scene::components::{CategoryData, ComponentData, FillData, PathData};
use vellum_editor::scene::components::{TagData, TransformData};
use vellum_editor::Editor;
use vellum_geometry::rect::RectF;
use vellum_geometry::vector::{vec2f, Vector2F};
use vellum_gpu::null::{EmptyResourceLoader, NullDevice};

fn editor() -> Editor<NullDevice> {
    let mut editor = Editor::new(NullDevice::new(), &EmptyResourceLoader).unwrap();
    editor.resize(vellum_geometry::vector::vec2i(800, 600),
                  vellum_geometry::vector::vec2i(0, 0),
                  1.0);
    editor
}

fn click(editor: &mut Editor<NullDevice>, position: Vector2F) {
    pointer(editor, PointerEvent::Down, position);
    pointer(editor, PointerEvent::Up, position);
}

fn pointer(editor: &mut Editor<NullDevice>, event: PointerEvent, position: Vector2F) {
    editor.on_pointer_event(PointerTarget::Canvas,
                            event,
                            PointerKind::Mouse,
                            PointerButton::Left,
                            position.x,
                            position.y,
                            0.5,
                            0.0,
                            false,
                            false,
                            false);
}

fn drag(editor: &mut Editor<NullDevice>, from: Vector2F, to: Vector2F, steps: usize) {
    pointer(editor, PointerEvent::Down, from);
    for step in 1..=steps {
        pointer(editor, PointerEvent::Move, from.lerp(to, step as f32 / steps as f32));
    }
    pointer(editor, PointerEvent::Up, to);
}

fn key(editor: &mut Editor<NullDevice>, key: KeyboardKey, ctrl: bool, shift: bool) {
    editor.on_keyboard_event(KeyboardEvent::Down, key, false, false, ctrl, shift);
    editor.on_keyboard_event(KeyboardEvent::Up, key, false, false, ctrl, shift);
}

/// A loadable rectangle entity, as persisted content would arrive.
fn encoded_rect(min: Vector2F, max: Vector2F, tag: &str) -> (Uuid, EncodedData) {
    let id = Uuid::new_v4();
    let mut data = EncodedData::new();
    ComponentData::Id(id).encode(&mut data);
    ComponentData::Tag(TagData { tag: tag.to_string() }).encode(&mut data);
    ComponentData::Category(CategoryData::default()).encode(&mut data);
    ComponentData::Path(PathData { path: Path::rect(RectF::from_points(min, max)) })
        .encode(&mut data);
    ComponentData::Transform(TransformData::default()).encode(&mut data);
    ComponentData::Fill(FillData::default()).encode(&mut data);
    (id, data)
}

// S1: pen a square and close it.
#[test]
fn test_pen_square() {
    let mut editor = editor();
    assert!(editor.set_tool(2));

    click(&mut editor, vec2f(10.0, 10.0));
    click(&mut editor, vec2f(110.0, 10.0));
    click(&mut editor, vec2f(110.0, 110.0));
    click(&mut editor, vec2f(10.0, 110.0));
    click(&mut editor, vec2f(10.0, 10.0));

    let scene = editor.scene();
    assert_eq!(scene.document.entity_count(), 1);

    let id = scene.document.order()[0];
    let path = &scene.document.path(id).unwrap().path;
    assert!(path.closed());
    assert_eq!(path.segment_count(), 4);

    let rect = path.bounding_rect();
    assert_eq!(rect.min, vec2f(10.0, 10.0));
    assert_eq!(rect.max, vec2f(110.0, 110.0));
}

// S2: rubber-band select, delete, undo twice.
#[test]
fn test_select_delete_undo() {
    let mut editor = editor();

    // The entity arrives as loaded content, not as an undoable edit.
    let (id, data) = encoded_rect(vec2f(10.0, 10.0), vec2f(110.0, 110.0), "rect");
    editor.scene_mut().load_entity(data.bytes()).unwrap();

    assert!(editor.set_tool(0));
    drag(&mut editor, vec2f(0.0, 0.0), vec2f(200.0, 200.0), 8);
    assert!(editor.scene().selection.is_fully_selected(id));

    key(&mut editor, KeyboardKey::Delete, false, false);
    assert!(!editor.scene().document.has_entity(id));

    // First undo restores the entity.
    key(&mut editor, KeyboardKey::Z, true, false);
    assert!(editor.scene().document.has_entity(id));

    // Second undo has nothing left to revert.
    key(&mut editor, KeyboardKey::Z, true, false);
    assert!(editor.scene().document.has_entity(id));
    assert_eq!(editor.scene().document.entity_count(), 1);
}

// S3: a pencil stroke simplifies into few cubics that stay close.
#[test]
fn test_pencil_stroke_fits() {
    let mut editor = editor();
    assert!(editor.set_tool(3));

    let sample_at = |index: usize| {
        let x = 50.0 + index as f32 * 1.2;
        vec2f(x, 300.0 + ((x - 50.0) * 0.02).sin() * 40.0)
    };

    pointer(&mut editor, PointerEvent::Down, sample_at(0));
    let mut samples = vec![sample_at(0)];
    for index in 1..500 {
        let position = sample_at(index);
        samples.push(position);
        pointer(&mut editor, PointerEvent::Move, position);
    }
    pointer(&mut editor, PointerEvent::Up, *samples.last().unwrap());

    let scene = editor.scene();
    assert_eq!(scene.document.entity_count(), 1);
    let id = scene.document.order()[0];
    let path = &scene.document.path(id).unwrap().path;

    let cubic_count = path.segment_count();
    assert!(cubic_count >= 1 && cubic_count <= 50, "cubics: {}", cubic_count);

    // Every input sample stays within the fit tolerance of the path.
    let mut polyline = vec![];
    for segment_ref in path.segments() {
        for step in 0..=32 {
            polyline.push(segment_ref.segment.sample(step as f32 / 32.0));
        }
    }
    for sample in &samples {
        let best = polyline
            .iter()
            .map(|point| (*point - *sample).length())
            .fold(f32::MAX, f32::min);
        assert!(best <= 2.0, "sample {:?} off by {}", sample, best);
    }
}

// S4: ctrl-wheel zoom keeps the cursor's scene point fixed.
#[test]
fn test_zoom_invariant_point() {
    let mut editor = editor();
    let cursor = vec2f(400.0, 300.0);
    pointer(&mut editor, PointerEvent::Move, cursor);

    let before = editor.scene().viewport.client_to_scene(cursor);
    while editor.scene().viewport.zoom() < 5.0 {
        let previous = editor.scene().viewport.zoom();
        editor.on_wheel_event(PointerTarget::Canvas, 0.0, -1.0, true);
        if editor.scene().viewport.zoom() <= previous {
            break;
        }
    }
    assert!(editor.scene().viewport.zoom() > 1.0);

    let after = editor.scene().viewport.client_to_scene(cursor);
    assert!((after - before).length() < 1e-2, "{:?} vs {:?}", before, after);
}

// S5: overlapping rectangles respect z order.
#[test]
fn test_overlap_z_order() {
    let mut editor = editor();

    let (bottom, bottom_data) = encoded_rect(vec2f(50.0, 50.0), vec2f(150.0, 150.0), "bottom");
    let (top, top_data) = encoded_rect(vec2f(100.0, 100.0), vec2f(200.0, 200.0), "top");
    editor.scene_mut().load_entity(bottom_data.bytes()).unwrap();
    editor.scene_mut().load_entity(top_data.bytes()).unwrap();

    let scene = editor.scene();

    // Both are inside the full-canvas rect.
    let all = scene.entities_in(RectF::from_points(vec2f(0.0, 0.0), vec2f(800.0, 600.0)),
                                false);
    assert_eq!(all.len(), 2);
    assert!(all.contains_key(&bottom) && all.contains_key(&top));

    // The overlap pixel belongs to the top rectangle.
    assert_eq!(scene.entity_at(vec2f(125.0, 125.0), false, 2.0), Some(top));
    // A bottom-only pixel still hits the bottom one.
    assert_eq!(scene.entity_at(vec2f(60.0, 60.0), false, 2.0), Some(bottom));
    // Render order follows document order.
    assert_eq!(scene.document.order(), &[bottom, top]);
}

// Selection drags move entities through history.
#[test]
fn test_select_drag_moves_entity() {
    let mut editor = editor();
    let (id, data) = encoded_rect(vec2f(10.0, 10.0), vec2f(60.0, 60.0), "rect");
    editor.scene_mut().load_entity(data.bytes()).unwrap();

    assert!(editor.set_tool(0));
    drag(&mut editor, vec2f(30.0, 30.0), vec2f(130.0, 80.0), 10);

    let moved = editor.scene().document.bounding_rect(id).unwrap();
    assert!((moved.min - vec2f(110.0, 60.0)).length() < 1.0, "{:?}", moved);

    // One batch: a single undo puts it back.
    key(&mut editor, KeyboardKey::Z, true, false);
    let restored = editor.scene().document.bounding_rect(id).unwrap();
    assert!((restored.min - vec2f(10.0, 10.0)).length() < 1e-3, "{:?}", restored);
}

// Escape aborts a moving gesture.
#[test]
fn test_escape_aborts_drag() {
    let mut editor = editor();
    let (id, data) = encoded_rect(vec2f(10.0, 10.0), vec2f(60.0, 60.0), "rect");
    editor.scene_mut().load_entity(data.bytes()).unwrap();

    assert!(editor.set_tool(0));
    pointer(&mut editor, PointerEvent::Down, vec2f(30.0, 30.0));
    pointer(&mut editor, PointerEvent::Move, vec2f(60.0, 30.0));

    editor.on_keyboard_event(KeyboardEvent::Down, KeyboardKey::Escape, false, false, false,
                             false);

    // Movement after the abort is ignored.
    let before = editor.scene().document.bounding_rect(id).unwrap();
    pointer(&mut editor, PointerEvent::Move, vec2f(200.0, 30.0));
    let after = editor.scene().document.bounding_rect(id).unwrap();
    assert_eq!(before, after);

    pointer(&mut editor, PointerEvent::Up, vec2f(200.0, 30.0));
}

// Frames coalesce: only the animation callback draws.
#[test]
fn test_render_request_coalescing() {
    let mut editor = editor();
    let (_, data) = encoded_rect(vec2f(10.0, 10.0), vec2f(60.0, 60.0), "rect");
    editor.scene_mut().load_entity(data.bytes()).unwrap();

    editor.request_render(vellum_editor::RenderRequest::default());
    editor.request_render(vellum_editor::RenderRequest::default());

    assert!(editor.render_frame(0.0));
    // No pending request left: nothing to draw.
    assert!(!editor.render_frame(100.0));

    // Within the pacing window of the last drawn frame (t = 0), a new
    // request stays pending.
    editor.request_render(vellum_editor::RenderRequest::default());
    assert!(!editor.render_frame(10.0));
    assert!(editor.render_frame(20.0));
}
