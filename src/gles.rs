/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! OpenGL ES driver abstraction and implementations.
//!
//! The shim never calls the host driver directly from the emulation code.
//! Everything goes through [GraphicsBackend], which has one method per host
//! entry point the shim actually uses:
//!
//! - [backend] provides the abstraction.
//! - [native] implements it by passing through to the host's OpenGL ES 3.x
//!   driver, via bindings generated from the Khronos API registry.
//! - [recording] implements it with a small software model of the driver state
//!   that records every call. It's used by the test suite, and is handy for
//!   seeing exactly what an emulated call turns into.
//! - [gles32_raw] provides raw bindings for OpenGL ES 3.2 generated from the
//!   Khronos API headers. **The function bindings are only for use within
//!   [native].** The constants and types can be used anywhere.
//! - [desktop] has the handful of desktop OpenGL constants that applications
//!   pass to us but that OpenGL ES doesn't define.
//!
//! Useful resources:
//! - [OpenGL ES 3.2 reference pages](https://registry.khronos.org/OpenGL-Refpages/es3/)
//! - [OpenGL ES 3.2 specification](https://registry.khronos.org/OpenGL/specs/es/3.2/es_spec_3.2.pdf)
//! - Extensions:
//!   - [EXT_buffer_storage](https://registry.khronos.org/OpenGL/extensions/EXT/EXT_buffer_storage.txt)
//!   - [EXT_multi_draw_indirect](https://registry.khronos.org/OpenGL/extensions/EXT/EXT_multi_draw_indirect.txt)
//!   - [OES_draw_elements_base_vertex](https://registry.khronos.org/OpenGL/extensions/OES/OES_draw_elements_base_vertex.txt)
//!   - [EXT_draw_elements_base_vertex](https://registry.khronos.org/OpenGL/extensions/EXT/EXT_draw_elements_base_vertex.txt)
//!   - [EXT_texture_buffer](https://registry.khronos.org/OpenGL/extensions/EXT/EXT_texture_buffer.txt)
//!   - [EXT_texture_format_BGRA8888](https://registry.khronos.org/OpenGL/extensions/EXT/EXT_texture_format_BGRA8888.txt)

pub mod backend;
pub mod desktop;
pub mod native;
pub mod recording;

pub use es3shim_gl_bindings::gles32 as gles32_raw;

pub use backend::{GraphicsBackend, OptionalEntry};
pub use native::NativeES3;
pub use recording::{Call, DriverProfile, RecordingBackend};
