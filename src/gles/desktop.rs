/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Desktop OpenGL constants with no OpenGL ES equivalent.
//!
//! Applications written against desktop GL pass these to us, so we need to
//! recognize them, even though the host driver never sees them.

use super::gles32_raw::types::GLenum;

/// Same value as `GL_BGRA_EXT` from EXT_texture_format_BGRA8888.
pub const BGRA: GLenum = 0x80E1;
pub const UNSIGNED_INT_8_8_8_8: GLenum = 0x8035;
pub const UNSIGNED_INT_8_8_8_8_REV: GLenum = 0x8367;

pub const TEXTURE_SWIZZLE_RGBA: GLenum = 0x8E46;
pub const TEXTURE_LOD_BIAS: GLenum = 0x8501;

pub const PROXY_TEXTURE_1D: GLenum = 0x8063;
pub const PROXY_TEXTURE_2D: GLenum = 0x8064;
pub const PROXY_TEXTURE_3D: GLenum = 0x8070;
pub const PROXY_TEXTURE_RECTANGLE: GLenum = 0x84F7;

pub const READ_ONLY: GLenum = 0x88B8;
pub const WRITE_ONLY: GLenum = 0x88B9;
pub const READ_WRITE: GLenum = 0x88BA;

pub const QUERY_BUFFER: GLenum = 0x9192;

pub const DEPTH_COMPONENT32: GLenum = 0x81A7;
