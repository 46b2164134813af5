/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! This package contains OpenGL ES bindings generated with the `gl_generator`
//! crate.

#![allow(non_snake_case)]

#[allow(warnings)]
pub mod gles32 {
    include!(concat!(env!("OUT_DIR"), "/gles32.rs"));
}
