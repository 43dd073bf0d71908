// vellum/editor/src/editor.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The editor: owns the scenes, the input manager, and the renderer, and
//! paces frames off the host animation loop.
//!
//! Render requests coalesce: a request arriving within `1000 / frame_rate`
//! milliseconds of the last rendered frame stays pending until
//! `render_frame` runs from the host's animation callback.

use crate::input::keys::*;
use crate::input::{InputManager, InputOutcome};
use crate::scene::Scene;
use crate::ui;
use vellum_geometry::vector::{vec2f, Vector2I};
use vellum_gpu::{Device, ResourceLoader};
use vellum_renderer::renderer::{Renderer, RendererError};

const MAX_FRAME_RATE: u32 = 60;

/// A pending render request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderRequest {
    pub frame_rate: u32,
    pub ignore_cache: bool,
    pub update_ui: bool,
}

impl Default for RenderRequest {
    fn default() -> RenderRequest {
        RenderRequest { frame_rate: MAX_FRAME_RATE, ignore_cache: false, update_ui: false }
    }
}

impl RenderRequest {
    fn merge(&mut self, other: RenderRequest) {
        self.frame_rate = self.frame_rate.max(other.frame_rate).min(MAX_FRAME_RATE);
        self.ignore_cache |= other.ignore_cache;
        self.update_ui |= other.update_ui;
    }
}

pub struct Editor<D> where D: Device {
    scenes: Vec<Scene>,
    current: usize,
    renderer: Option<Renderer<D>>,
    input: InputManager,

    pending_render: Option<RenderRequest>,
    last_render_time: f64,

    /// Called with the tool index whenever the active tool changes.
    tool_ui_listener: Option<Box<dyn FnMut(i32)>>,
    /// Message-bus id emitted after a frame that wants a UI refresh.
    ui_message: Option<i32>,
}

impl<D> Editor<D> where D: Device {
    /// Initializes the editor with one empty scene. The GPU context must be
    /// current; singletons are created here exactly once.
    pub fn new(device: D, resources: &dyn ResourceLoader) -> Result<Editor<D>, RendererError> {
        let renderer = Renderer::new(device, resources)?;
        Ok(Editor {
            scenes: vec![Scene::new()],
            current: 0,
            renderer: Some(renderer),
            input: InputManager::new(),
            pending_render: None,
            last_render_time: f64::MIN,
            tool_ui_listener: None,
            ui_message: None,
        })
    }

    /// Tears the editor down. Scenes are dropped after the renderer so GPU
    /// handles release against a live device.
    pub fn shutdown(mut self) {
        self.renderer = None;
        self.scenes.clear();
    }

    /// Drops the renderer ahead of a context refresh, preserving scenes.
    pub fn prepare_refresh(&mut self) {
        self.renderer = None;
    }

    /// Rebuilds the renderer after `prepare_refresh`.
    pub fn refresh(&mut self,
                   device: D,
                   resources: &dyn ResourceLoader)
                   -> Result<(), RendererError> {
        debug_assert!(self.renderer.is_none(), "refresh without prepare_refresh");
        self.renderer = Some(Renderer::new(device, resources)?);
        self.request_render(RenderRequest { ignore_cache: true, ..RenderRequest::default() });
        Ok(())
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scenes[self.current]
    }

    #[inline]
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scenes[self.current]
    }

    pub fn add_scene(&mut self, scene: Scene) -> usize {
        self.scenes.push(scene);
        self.scenes.len() - 1
    }

    pub fn set_current_scene(&mut self, index: usize) {
        if index < self.scenes.len() {
            self.current = index;
            self.request_render(RenderRequest { ignore_cache: true, ..RenderRequest::default() });
        }
    }

    pub fn set_tool_ui_listener(&mut self, listener: Box<dyn FnMut(i32)>) {
        self.tool_ui_listener = Some(listener);
    }

    pub fn set_ui_message(&mut self, message: i32) {
        self.ui_message = Some(message);
    }

    // Host events

    #[allow(clippy::too_many_arguments)]
    pub fn on_pointer_event(&mut self,
                            target: PointerTarget,
                            event: PointerEvent,
                            kind: PointerKind,
                            button: PointerButton,
                            x: f32,
                            y: f32,
                            pressure: f32,
                            time: f64,
                            alt: bool,
                            ctrl: bool,
                            shift: bool)
                            -> bool {
        let scene = &mut self.scenes[self.current];
        let outcome = self.input.on_pointer_event(scene,
                                                  target,
                                                  event,
                                                  kind,
                                                  button,
                                                  vec2f(x, y),
                                                  pressure,
                                                  time,
                                                  alt,
                                                  ctrl,
                                                  shift);
        self.apply_outcome(outcome)
    }

    pub fn on_keyboard_event(&mut self,
                             event: KeyboardEvent,
                             key: KeyboardKey,
                             repeat: bool,
                             alt: bool,
                             ctrl: bool,
                             shift: bool)
                             -> bool {
        let scene = &mut self.scenes[self.current];
        let outcome =
            self.input.on_keyboard_event(scene, event, key, repeat, alt, ctrl, shift);
        self.apply_outcome(outcome)
    }

    pub fn on_resize_event(&mut self,
                           width: i32,
                           height: i32,
                           dpr: f32,
                           offset_x: i32,
                           offset_y: i32)
                           -> bool {
        let size = Vector2I::new(width, height);
        let offset = Vector2I::new(offset_x, offset_y);
        self.resize(size, offset, dpr);
        self.request_render(RenderRequest { ignore_cache: true, ..RenderRequest::default() });
        true
    }

    pub fn on_wheel_event(&mut self, target: PointerTarget, dx: f32, dy: f32, ctrl: bool)
                          -> bool {
        let scene = &mut self.scenes[self.current];
        let outcome = self.input.on_wheel_event(scene, target, vec2f(dx, dy), ctrl);
        self.apply_outcome(outcome)
    }

    pub fn on_touch_pinch(&mut self, target: PointerTarget, delta: f32, cx: f32, cy: f32)
                          -> bool {
        let scene = &mut self.scenes[self.current];
        let outcome = self.input.on_touch_pinch(scene, target, delta, vec2f(cx, cy));
        self.apply_outcome(outcome)
    }

    pub fn on_touch_drag(&mut self, target: PointerTarget, dx: f32, dy: f32) -> bool {
        let scene = &mut self.scenes[self.current];
        let outcome = self.input.on_touch_drag(scene, target, vec2f(dx, dy));
        self.apply_outcome(outcome)
    }

    pub fn on_clipboard_event(&mut self, event: ClipboardEvent) -> bool {
        let scene = &mut self.scenes[self.current];
        let outcome = self.input.on_clipboard_event(scene, event);
        self.apply_outcome(outcome)
    }

    /// Propagates a resize to every scene's viewport.
    pub fn resize(&mut self, size: Vector2I, offset: Vector2I, dpr: f32) {
        for scene in &mut self.scenes {
            scene.viewport.resize(size, offset, dpr);
        }
        self.input.on_resize(size, offset, dpr);
    }

    // Rendering

    /// Coalesces a render request; the actual draw happens in
    /// `render_frame`.
    pub fn request_render(&mut self, request: RenderRequest) {
        match self.pending_render {
            Some(ref mut pending) => pending.merge(request),
            None => self.pending_render = Some(request),
        }
    }

    /// The host animation-frame callback; `time` is in milliseconds.
    /// Renders the current scene when a request is pending and the pacing
    /// window allows. Returns whether a frame was drawn.
    pub fn render_frame(&mut self, time: f64) -> bool {
        let request = match self.pending_render {
            None => return false,
            Some(request) => request,
        };

        let interval = 1000.0 / request.frame_rate.max(1).min(MAX_FRAME_RATE) as f64;
        if time - self.last_render_time < interval {
            return false;
        }

        let renderer = match self.renderer {
            None => return false,
            Some(ref mut renderer) => renderer,
        };

        self.pending_render = None;
        self.last_render_time = time;

        let scene = &mut self.scenes[self.current];
        scene.render(renderer, request.ignore_cache);
        if let Err(error) = renderer.end_frame() {
            warn!("frame failed: {:?}; retrying next frame", error);
            self.pending_render = Some(RenderRequest {
                ignore_cache: true,
                ..RenderRequest::default()
            });
        }

        if request.update_ui {
            if let Some(message) = self.ui_message {
                debug!("ui refresh requested (message {})", message);
            }
        }
        true
    }

    // UI bridge

    pub fn ui_data(&self) -> String {
        ui::ui_data(self.scene())
    }

    pub fn modify_ui_data(&mut self, json: &str) -> bool {
        let changed = {
            let scene = &mut self.scenes[self.current];
            ui::modify_ui_data(scene, json)
        };
        if changed {
            let tool = self.scene().tool_state.current() as i32;
            if let Some(ref mut listener) = self.tool_ui_listener {
                listener(tool);
            }
            self.request_render(RenderRequest::default());
        }
        changed
    }

    pub fn set_tool(&mut self, tool_index: i32) -> bool {
        match ui::tool_from_index(tool_index) {
            None => false,
            Some(tool) => {
                self.scenes[self.current].tool_state.set_current(tool);
                if let Some(ref mut listener) = self.tool_ui_listener {
                    listener(tool_index);
                }
                self.request_render(RenderRequest::default());
                true
            }
        }
    }

    fn apply_outcome(&mut self, outcome: InputOutcome) -> bool {
        if outcome.request_render {
            self.request_render(RenderRequest {
                ignore_cache: outcome.redraw_all,
                update_ui: outcome.tool_changed,
                ..RenderRequest::default()
            });
        }
        if outcome.tool_changed {
            let tool = self.scene().tool_state.active() as i32;
            if let Some(ref mut listener) = self.tool_ui_listener {
                listener(tool);
            }
        }
        outcome.handled
    }
}
