/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! es3shim runs desktop OpenGL applications on OpenGL ES 3.x drivers.
//!
//! It is loaded in place of the system GL library and exports the desktop
//! entry points the application uses ([entry]). Each call is either passed
//! through to the host OpenGL ES driver, adjusted on the way, or emulated with
//! the OpenGL ES features the driver does have.
//!
//! In various places, the terms "application" and "driver" are used to
//! distinguish between the two sides of the shim:
//! - "Application" state is what the application believes it set, e.g. the
//!   swizzle it asked for.
//! - "Driver" state is what we actually sent to the host OpenGL ES driver,
//!   e.g. that swizzle composed with a BGRA reorder.
//!
//! State is kept per EGL context ([context::Context]), found through the
//! registry in [egl].

// Allow the exported C functions to have GL names.
#![allow(non_snake_case)]
// Most functions take raw GL arguments and have the same requirements on them
// as the GL functions they implement.
#![allow(clippy::missing_safety_doc)]

#[macro_use]
mod log;
pub mod buffer;
pub mod context;
pub mod draw;
pub mod egl;
pub mod entry;
pub mod error;
pub mod extensions;
pub mod framebuffer;
pub mod gles;
pub mod int_map;
pub mod options;
pub mod pool;
pub mod shader;
pub mod state;
pub mod swizzle;
pub mod texture;

pub use error::ShimError;
pub use options::Options;
