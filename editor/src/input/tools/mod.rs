// vellum/editor/src/input/tools/mod.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The tool set and its dispatch.
//!
//! Tools are a sum of concrete state structs behind one trait; `ToolState`
//! tracks the user-chosen tool and the momentarily active one (space/ctrl
//! overrides, middle-button pan) and forwards events.

pub mod direct_select;
pub mod manipulator;
pub mod pan;
pub mod pen;
pub mod pencil;
pub mod select;
pub mod zoom;

use crate::input::keys::KeyboardKey;
use crate::input::InputState;
use crate::scene::entity::Document;
use crate::scene::selection::Selection;
use crate::scene::viewport::Viewport;
use crate::scene::Scene;
use manipulator::Manipulator;
use vellum_gpu::Device;
use vellum_renderer::renderer::Renderer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolKind {
    Select = 0,
    DirectSelect = 1,
    Pen = 2,
    Pencil = 3,
    Pan = 4,
    Zoom = 5,
}

bitflags! {
    pub struct ToolCategories: u8 {
        /// Edits individual vertices and handles.
        const DIRECT = 0x1;
        /// Starts acting without a movement threshold.
        const IMMEDIATE = 0x2;
        /// Only changes the camera, never the document.
        const VIEW = 0x4;
    }
}

impl ToolKind {
    pub fn categories(self) -> ToolCategories {
        match self {
            ToolKind::Select => ToolCategories::empty(),
            ToolKind::DirectSelect => ToolCategories::DIRECT,
            ToolKind::Pen => ToolCategories::DIRECT,
            ToolKind::Pencil => ToolCategories::IMMEDIATE,
            ToolKind::Pan | ToolKind::Zoom => {
                ToolCategories::IMMEDIATE | ToolCategories::VIEW
            }
        }
    }
}

/// Everything a tool sees while handling an event.
pub struct ToolContext<'a> {
    pub scene: &'a mut Scene,
    pub input: &'a InputState,
    pub manipulator: &'a mut Manipulator,
}

pub trait Tool {
    fn kind(&self) -> ToolKind;

    fn on_pointer_down(&mut self, _ctx: &mut ToolContext) {}
    fn on_pointer_move(&mut self, _ctx: &mut ToolContext) {}
    fn on_pointer_up(&mut self, _ctx: &mut ToolContext) {}
    fn on_pointer_hover(&mut self, _ctx: &mut ToolContext) {}
    fn on_key(&mut self, _ctx: &mut ToolContext, _down: bool, _key: KeyboardKey) {}

    /// Clears any in-progress gesture state.
    fn reset(&mut self) {}
}

pub struct ToolState {
    current: ToolKind,
    active: ToolKind,

    pub select: select::SelectTool,
    pub direct_select: direct_select::DirectSelectTool,
    pub pen: pen::PenTool,
    pub pencil: pencil::PencilTool,
    pub pan: pan::PanTool,
    pub zoom: zoom::ZoomTool,
    pub manipulator: Manipulator,
}

impl Default for ToolState {
    fn default() -> ToolState {
        ToolState::new()
    }
}

impl ToolState {
    pub fn new() -> ToolState {
        ToolState {
            current: ToolKind::Select,
            active: ToolKind::Select,
            select: select::SelectTool::default(),
            direct_select: direct_select::DirectSelectTool::default(),
            pen: pen::PenTool::default(),
            pencil: pencil::PencilTool::default(),
            pan: pan::PanTool::default(),
            zoom: zoom::ZoomTool::default(),
            manipulator: Manipulator::default(),
        }
    }

    #[inline]
    pub fn current(&self) -> ToolKind {
        self.current
    }

    #[inline]
    pub fn active(&self) -> ToolKind {
        self.active
    }

    #[inline]
    pub fn is_direct(&self) -> bool {
        self.active.categories().contains(ToolCategories::DIRECT)
    }

    #[inline]
    pub fn is_immediate(&self) -> bool {
        self.active.categories().contains(ToolCategories::IMMEDIATE)
    }

    #[inline]
    pub fn is_view(&self) -> bool {
        self.active.categories().contains(ToolCategories::VIEW)
    }

    /// Picks the user's tool; also resets any half-finished gesture.
    pub fn set_current(&mut self, kind: ToolKind) {
        self.reset_tools();
        self.current = kind;
        self.active = kind;
    }

    /// Forces a temporary active tool (middle-button pan/zoom).
    pub fn set_active(&mut self, kind: ToolKind) {
        self.active = kind;
    }

    /// Resolves the active tool from the modifier keys: space pans (zooms
    /// with ctrl); ctrl alone swaps select and direct-select.
    pub fn recalculate_active(&mut self, input: &InputState) {
        self.active = if input.keys.space {
            if input.keys.ctrl {
                ToolKind::Zoom
            } else {
                ToolKind::Pan
            }
        } else if input.keys.ctrl {
            match self.current {
                ToolKind::Select => ToolKind::DirectSelect,
                ToolKind::DirectSelect => ToolKind::Select,
                other => other,
            }
        } else {
            self.current
        };
    }

    fn reset_tools(&mut self) {
        self.select.reset();
        self.direct_select.reset();
        self.pen.reset();
        self.pencil.reset();
        self.pan.reset();
        self.zoom.reset();
        self.manipulator.reset();
    }

    // Event dispatch. The scene's tool state is temporarily taken out by
    // the input manager, so `scene` here never aliases `self`.

    pub fn on_pointer_down(&mut self, scene: &mut Scene, input: &InputState) {
        let active = self.active;
        self.with_tool(active, scene, input, |tool, ctx| tool.on_pointer_down(ctx));
    }

    pub fn on_pointer_move(&mut self, scene: &mut Scene, input: &InputState) {
        let active = self.active;
        self.with_tool(active, scene, input, |tool, ctx| tool.on_pointer_move(ctx));
    }

    pub fn on_pointer_up(&mut self, scene: &mut Scene, input: &InputState) {
        let active = self.active;
        self.with_tool(active, scene, input, |tool, ctx| tool.on_pointer_up(ctx));
    }

    pub fn on_pointer_hover(&mut self, scene: &mut Scene, input: &InputState) {
        let active = self.active;
        self.with_tool(active, scene, input, |tool, ctx| tool.on_pointer_hover(ctx));
    }

    pub fn on_key(&mut self, scene: &mut Scene, input: &InputState, down: bool, key: KeyboardKey) {
        let active = self.active;
        self.with_tool(active, scene, input, |tool, ctx| tool.on_key(ctx, down, key));
    }

    fn with_tool<F>(&mut self, kind: ToolKind, scene: &mut Scene, input: &InputState, f: F)
    where
        F: FnOnce(&mut dyn Tool, &mut ToolContext),
    {
        let manipulator = &mut self.manipulator;
        let tool: &mut dyn Tool = match kind {
            ToolKind::Select => &mut self.select,
            ToolKind::DirectSelect => &mut self.direct_select,
            ToolKind::Pen => &mut self.pen,
            ToolKind::Pencil => &mut self.pencil,
            ToolKind::Pan => &mut self.pan,
            ToolKind::Zoom => &mut self.zoom,
        };
        let mut ctx = ToolContext { scene, input, manipulator };
        f(tool, &mut ctx);
    }

    /// Queues the active tool's overlays (rubber bands, manipulator
    /// handles, pen previews).
    pub fn render_overlays<D>(&self,
                              document: &Document,
                              selection: &Selection,
                              viewport: &Viewport,
                              renderer: &mut Renderer<D>)
    where
        D: Device,
    {
        match self.active {
            ToolKind::Select => {
                self.select.render_overlays(viewport, renderer);
                // The manipulator is disabled for direct-category tools.
                self.manipulator.render_overlays(document, selection, viewport, renderer);
            }
            ToolKind::DirectSelect => {
                self.direct_select.render_overlays(viewport, renderer);
            }
            ToolKind::Pen => self.pen.render_overlays(document, viewport, renderer),
            _ => {}
        }
    }
}
