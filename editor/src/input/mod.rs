// vellum/editor/src/input/mod.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Translates host events into tool dispatch.
//!
//! The manager tracks the pointer in both client and scene space, the
//! modifier keys with state-changed flags, and the hover target. Moving
//! tools only engage once the pointer travels past a per-pointer-type
//! threshold; Escape aborts the gesture in progress.

pub mod hover;
pub mod keys;
pub mod tools;

use crate::scene::Scene;
use hover::HoverState;
use keys::*;
use tools::{ToolCategories, ToolKind};
use vellum_geometry::util;
use vellum_geometry::vector::{vec2f, Vector2F, Vector2I};

/// Picking radius, client pixels.
const HIT_THRESHOLD: f32 = 6.0;

/// Minimum client-pixel travel before a non-immediate tool starts moving.
const MOVEMENT_THRESHOLD: f32 = 2.0;

/// Per pointer kind: mouse, pen, touch.
const MOVEMENT_THRESHOLD_MULTIPLIER: [f32; 3] = [1.0, 1.0, 2.0];

/// Wheel zoom step per notch.
const ZOOM_STEP: f32 = 0.15;

/// Wheel pan step, client pixels per delta unit.
const PAN_STEP: f32 = 1.0;

#[derive(Clone, Copy, Debug, Default)]
pub struct PointerSpace {
    pub position: Vector2F,
    pub origin: Vector2F,
    pub movement: Vector2F,
    pub delta: Vector2F,
}

#[derive(Clone, Copy, Debug)]
pub struct Pointer {
    pub client: PointerSpace,
    pub scene: PointerSpace,
    pub down: bool,
    pub inside: bool,
    pub target: PointerTarget,
    pub button: PointerButton,
    pub kind: PointerKind,
    pub pressure: f32,
    pub time: f64,
}

impl Default for Pointer {
    fn default() -> Pointer {
        Pointer {
            client: PointerSpace::default(),
            scene: PointerSpace::default(),
            down: false,
            inside: false,
            target: PointerTarget::Other,
            button: PointerButton::Left,
            kind: PointerKind::Mouse,
            pressure: 0.0,
            time: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Keys {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub space: bool,
    pub alt_state_changed: bool,
    pub ctrl_state_changed: bool,
    pub shift_state_changed: bool,
    pub space_state_changed: bool,
}

/// The state every tool reads during dispatch.
#[derive(Default)]
pub struct InputState {
    pub pointer: Pointer,
    pub keys: Keys,
    pub hover: HoverState,
    pub moving: bool,
    pub abort: bool,
}

impl InputState {
    /// The scene-space picking radius at the given zoom.
    pub fn threshold(&self, zoom: f32) -> f32 {
        HIT_THRESHOLD * MOVEMENT_THRESHOLD_MULTIPLIER[self.pointer.kind as usize] /
            zoom.max(1.0e-6)
    }

    fn movement_threshold(&self) -> f32 {
        MOVEMENT_THRESHOLD * MOVEMENT_THRESHOLD_MULTIPLIER[self.pointer.kind as usize]
    }
}

/// What the editor should do after an event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputOutcome {
    pub handled: bool,
    pub request_render: bool,
    /// The whole frame must redraw (camera moved).
    pub redraw_all: bool,
    /// The active tool changed; the host UI should update.
    pub tool_changed: bool,
}

impl InputOutcome {
    fn render() -> InputOutcome {
        InputOutcome { request_render: true, ..InputOutcome::default() }
    }
}

#[derive(Default)]
pub struct InputManager {
    pub state: InputState,
}

impl InputManager {
    pub fn new() -> InputManager {
        InputManager::default()
    }

    // Event ingress

    #[allow(clippy::too_many_arguments)]
    pub fn on_pointer_event(&mut self,
                            scene: &mut Scene,
                            target: PointerTarget,
                            event: PointerEvent,
                            kind: PointerKind,
                            button: PointerButton,
                            position: Vector2F,
                            pressure: f32,
                            time: f64,
                            alt: bool,
                            ctrl: bool,
                            shift: bool)
                            -> InputOutcome {
        self.set_keys_state(alt, ctrl, shift);
        self.state.pointer.kind = kind;
        self.state.pointer.pressure = pressure;
        self.state.pointer.time = time;

        match event {
            PointerEvent::Down => self.on_pointer_down(scene, target, button, position),
            PointerEvent::Move => self.on_pointer_move(scene, target, position),
            PointerEvent::Up => self.on_pointer_up(scene),
            PointerEvent::Enter => {
                self.state.pointer.inside = true;
                InputOutcome::default()
            }
            PointerEvent::Leave => {
                self.state.pointer.inside = false;
                InputOutcome::default()
            }
        }
    }

    pub fn on_keyboard_event(&mut self,
                             scene: &mut Scene,
                             event: KeyboardEvent,
                             key: KeyboardKey,
                             _repeat: bool,
                             alt: bool,
                             ctrl: bool,
                             shift: bool)
                             -> InputOutcome {
        self.set_keys_state(alt, ctrl, shift);

        if key == KeyboardKey::Escape && event == KeyboardEvent::Down {
            self.state.abort = true;
            // The tool unwinds its own gesture (the pen drops its open
            // element, a drag stops following the pointer).
            self.dispatch(scene, |tools, scene, state| tools.on_key(scene, state, true, key));
        } else if key == KeyboardKey::Space {
            let down = event == KeyboardEvent::Down;
            self.state.keys.space_state_changed = self.state.keys.space != down;
            self.state.keys.space = down;
        }
        if key != KeyboardKey::Space {
            self.state.keys.space_state_changed = false;
        }

        let mut outcome = InputOutcome::default();

        // Modifier changes retarget the active tool while hovering.
        if !self.state.pointer.down &&
            (self.state.keys.ctrl_state_changed || self.state.keys.space_state_changed)
        {
            scene.tool_state.recalculate_active(&self.state);
            outcome.request_render = true;
            outcome.tool_changed = true;
        }

        // Forward to the moving tool first.
        if self.state.moving && !self.state.abort {
            self.dispatch(scene, |tools, scene, state| {
                tools.on_key(scene, state, event == KeyboardEvent::Down, key)
            });
            outcome.request_render = true;
        }

        match event {
            KeyboardEvent::Down => {
                let key_outcome = self.on_key_down(scene, key);
                outcome.handled |= key_outcome.handled;
                outcome.request_render |= key_outcome.request_render;
            }
            KeyboardEvent::Up => {}
        }
        outcome
    }

    pub fn on_wheel_event(&mut self,
                          scene: &mut Scene,
                          target: PointerTarget,
                          delta: Vector2F,
                          ctrl: bool)
                          -> InputOutcome {
        if target != PointerTarget::Canvas {
            return InputOutcome::default();
        }
        self.state.keys.ctrl_state_changed = self.state.keys.ctrl != ctrl;
        self.state.keys.ctrl = ctrl;

        if ctrl {
            let factor = util::map(-delta.y.signum(), -1.0, 1.0, 1.0 - ZOOM_STEP, 1.0 + ZOOM_STEP);
            let zoom = scene.viewport.zoom() * factor;
            scene.viewport.zoom_about(zoom, self.state.pointer.client.position);
        } else {
            scene.viewport.move_by((delta * -PAN_STEP).round() / scene.viewport.zoom());
        }

        InputOutcome { handled: true, redraw_all: true, ..InputOutcome::render() }
    }

    pub fn on_touch_pinch(&mut self,
                          scene: &mut Scene,
                          target: PointerTarget,
                          delta: f32,
                          center: Vector2F)
                          -> InputOutcome {
        if target != PointerTarget::Canvas {
            return InputOutcome::default();
        }
        let zoom = scene.viewport.zoom() * delta;
        scene.viewport.zoom_about(zoom, center);
        InputOutcome { handled: true, redraw_all: true, ..InputOutcome::render() }
    }

    pub fn on_touch_drag(&mut self,
                         scene: &mut Scene,
                         target: PointerTarget,
                         delta: Vector2F)
                         -> InputOutcome {
        if target != PointerTarget::Canvas {
            return InputOutcome::default();
        }
        scene.viewport.move_by(delta.round() / scene.viewport.zoom());
        InputOutcome { handled: true, redraw_all: true, ..InputOutcome::render() }
    }

    pub fn on_clipboard_event(&mut self, scene: &mut Scene, event: ClipboardEvent)
                              -> InputOutcome {
        match event {
            ClipboardEvent::Copy => InputOutcome::default(),
            ClipboardEvent::Cut => {
                let targets: Vec<_> = scene.selection.selected().keys().copied().collect();
                for id in targets {
                    scene.delete_entity(id);
                }
                scene.history.end_batch();
                InputOutcome::render()
            }
            ClipboardEvent::Paste => {
                // Paste duplicates the selection slightly offset.
                let targets: Vec<_> = scene.selection.selected().keys().copied().collect();
                scene.selection.clear();
                for id in targets {
                    if let Some(copy) = scene.duplicate_entity(id) {
                        scene.translate_entity(copy, vec2f(10.0, 10.0));
                        scene.selection.select(copy);
                    }
                }
                scene.history.end_batch();
                InputOutcome::render()
            }
        }
    }

    // Pointer internals

    fn on_pointer_down(&mut self,
                       scene: &mut Scene,
                       target: PointerTarget,
                       button: PointerButton,
                       position: Vector2F)
                       -> InputOutcome {
        self.state.pointer.target = target;
        if target != PointerTarget::Canvas {
            return InputOutcome::default();
        }

        let scene_position = scene.viewport.client_to_scene(position);
        self.state.pointer.client = PointerSpace {
            position,
            origin: position,
            movement: Vector2F::zero(),
            delta: Vector2F::zero(),
        };
        self.state.pointer.scene = PointerSpace {
            position: scene_position,
            origin: scene_position,
            movement: Vector2F::zero(),
            delta: Vector2F::zero(),
        };
        self.state.pointer.down = true;
        self.state.pointer.button = button;
        self.state.abort = false;

        self.recalculate_hover(scene);

        if button == PointerButton::Middle {
            let kind = if self.state.keys.ctrl { ToolKind::Zoom } else { ToolKind::Pan };
            scene.tool_state.set_active(kind);
        }

        scene.history.end_batch();
        self.dispatch(scene, |tools, scene, state| tools.on_pointer_down(scene, state));

        InputOutcome::render()
    }

    fn on_pointer_move(&mut self,
                       scene: &mut Scene,
                       target: PointerTarget,
                       position: Vector2F)
                       -> InputOutcome {
        if self.state.pointer.target != PointerTarget::Canvas &&
            target != PointerTarget::Canvas
        {
            return InputOutcome::default();
        }

        let zoom = scene.viewport.zoom();
        let client = &mut self.state.pointer.client;
        client.movement = position - client.position;
        client.position = position;
        client.delta = position - client.origin;

        let scene_position = scene.viewport.client_to_scene(position);
        let scene_space = &mut self.state.pointer.scene;
        scene_space.movement = self.state.pointer.client.movement / zoom;
        scene_space.position = scene_position;
        scene_space.delta = scene_position - scene_space.origin;

        self.recalculate_hover(scene);

        if !self.state.moving && self.state.pointer.down {
            let immediate = scene
                .tool_state
                .active()
                .categories()
                .contains(ToolCategories::IMMEDIATE);
            if immediate ||
                self.state.pointer.client.delta.length() > self.state.movement_threshold()
            {
                self.state.moving = true;
            } else {
                return InputOutcome::default();
            }
        }

        if self.state.moving && !self.state.abort {
            self.dispatch(scene, |tools, scene, state| tools.on_pointer_move(scene, state));
        } else if !self.state.pointer.down {
            self.dispatch(scene, |tools, scene, state| tools.on_pointer_hover(scene, state));
        }

        if self.state.pointer.down {
            InputOutcome::render()
        } else {
            InputOutcome::default()
        }
    }

    fn on_pointer_up(&mut self, scene: &mut Scene) -> InputOutcome {
        if !self.state.pointer.down {
            return InputOutcome::default();
        }

        self.state.pointer.target = PointerTarget::Other;
        self.state.pointer.down = false;
        self.state.moving = false;

        self.dispatch(scene, |tools, scene, state| tools.on_pointer_up(scene, state));
        scene.history.end_batch();

        let redraw_all = scene
            .tool_state
            .active()
            .categories()
            .contains(ToolCategories::VIEW);

        if self.state.pointer.button == PointerButton::Middle {
            let current = scene.tool_state.current();
            scene.tool_state.set_active(current);
        } else {
            scene.tool_state.recalculate_active(&self.state);
        }

        InputOutcome { redraw_all, ..InputOutcome::render() }
    }

    fn on_key_down(&mut self, scene: &mut Scene, key: KeyboardKey) -> InputOutcome {
        match key {
            KeyboardKey::Z if self.state.keys.ctrl => {
                let mut document = std::mem::take(&mut scene.document);
                if self.state.keys.shift {
                    scene.history.redo(&mut document);
                } else {
                    scene.history.undo(&mut document);
                }
                scene.document = document;
                scene.cache.invalidate_rect(scene.viewport.visible_rect());
                InputOutcome { handled: true, ..InputOutcome::render() }
            }
            KeyboardKey::Delete | KeyboardKey::Backspace => {
                let targets: Vec<_> = scene.selection.selected().keys().copied().collect();
                if targets.is_empty() {
                    return InputOutcome::default();
                }
                for id in targets {
                    scene.delete_entity(id);
                }
                scene.history.end_batch();
                InputOutcome { handled: true, ..InputOutcome::render() }
            }
            KeyboardKey::G if self.state.keys.ctrl => {
                scene.group_selected();
                InputOutcome { handled: true, ..InputOutcome::render() }
            }
            _ => InputOutcome::default(),
        }
    }

    fn set_keys_state(&mut self, alt: bool, ctrl: bool, shift: bool) {
        let keys = &mut self.state.keys;
        keys.alt_state_changed = keys.alt != alt;
        keys.alt = alt;
        keys.ctrl_state_changed = keys.ctrl != ctrl;
        keys.ctrl = ctrl;
        keys.shift_state_changed = keys.shift != shift;
        keys.shift = shift;
    }

    /// Recomputes the hover unless an immediate tool (pan/zoom/pencil) is
    /// active; those never pick.
    fn recalculate_hover(&mut self, scene: &Scene) {
        if scene
            .tool_state
            .active()
            .categories()
            .contains(ToolCategories::IMMEDIATE)
        {
            self.state.hover.reset();
            return;
        }

        let threshold = self.state.threshold(scene.viewport.zoom());
        let deep = scene
            .tool_state
            .active()
            .categories()
            .contains(ToolCategories::DIRECT);
        let entity =
            scene.entity_at(self.state.pointer.scene.position, deep, threshold);

        let mut hover = std::mem::take(&mut self.state.hover);
        hover.set_hovered(scene, entity, self.state.pointer.scene.position, deep, threshold);
        self.state.hover = hover;
    }

    /// Runs a tool callback with the scene's tool state temporarily taken
    /// out, so the tool can mutate the scene freely.
    fn dispatch<F>(&mut self, scene: &mut Scene, f: F)
    where
        F: FnOnce(&mut tools::ToolState, &mut Scene, &InputState),
    {
        let mut tool_state = std::mem::take(&mut scene.tool_state);
        f(&mut tool_state, scene, &self.state);
        scene.tool_state = tool_state;
    }

    /// Host resize: propagated by the editor, recorded here for threshold
    /// scaling of coordinates when needed.
    pub fn on_resize(&mut self, _size: Vector2I, _offset: Vector2I, _dpr: f32) {}
}
