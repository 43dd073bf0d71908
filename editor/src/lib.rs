// vellum/editor/src/lib.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The Vellum editor core: scenes of transformable path entities, an
//! incremental command history, an input/tool state machine, and the frame
//! loop gluing them to the tile renderer.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;

pub mod editor;
pub mod history;
pub mod input;
pub mod scene;
pub mod ui;

pub use crate::editor::{Editor, RenderRequest};
pub use crate::scene::Scene;
