// vellum/content/src/lib.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Vector path data structures and geometry utilities for the Vellum editor.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;

pub mod encoding;
pub mod fit;
pub mod gradient;
pub mod path;
pub mod quadratic;
pub mod segment;
pub mod stroke;
