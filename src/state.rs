/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Strings, limits, errors and the other bits of global state applications
//! ask about.
//!
//! Applications are told they're on desktop OpenGL 3.0 with GLSL 4.60, since
//! that is what we translate from.

use crate::context::{Context, MAX_FBTARGETS};
use crate::gles::gles32_raw as gles32;
use crate::gles::gles32_raw::types::*;

const VERSION: &[u8] = b"3.0 es3shim\0";
const SHADING_LANGUAGE_VERSION: &[u8] = b"4.60 es3shim\0";
const VENDOR: &[u8] = b"es3shim\0";

pub unsafe fn get_string(ctx: &mut Context, name: GLenum) -> *const GLubyte {
    match name {
        gles32::VERSION => VERSION.as_ptr(),
        gles32::SHADING_LANGUAGE_VERSION => SHADING_LANGUAGE_VERSION.as_ptr(),
        gles32::VENDOR => VENDOR.as_ptr(),
        gles32::EXTENSIONS => ctx.extensions().as_c_str().as_ptr() as *const GLubyte,
        _ => ctx.gl.GetString(name),
    }
}

/// The extensions we add come first, then the driver's own.
pub unsafe fn get_stringi(ctx: &mut Context, name: GLenum, index: GLuint) -> *const GLubyte {
    if name != gles32::EXTENSIONS {
        return std::ptr::null();
    }
    let extensions = ctx.extensions();
    let extra_count = extensions.extra_count();
    if let Some(extra) = extensions.extra(index as usize) {
        return extra.as_ptr() as *const GLubyte;
    }
    ctx.gl
        .GetStringi(name, index - extra_count as GLuint)
}

pub unsafe fn get_integerv(ctx: &mut Context, pname: GLenum, data: &mut GLint) {
    match pname {
        gles32::NUM_EXTENSIONS => {
            ctx.gl.GetIntegerv(pname, data);
            *data += ctx.extensions().extra_count() as GLint;
            log_dbg!("GL_NUM_EXTENSIONS: {}", *data);
        }
        gles32::MAX_COLOR_ATTACHMENTS => *data = MAX_FBTARGETS as GLint,
        gles32::MAX_DRAW_BUFFERS => *data = ctx.max_draw_buffers,
        _ => ctx.gl.GetIntegerv(pname, data),
    }
}

pub unsafe fn get_error(ctx: &mut Context) -> GLenum {
    if ctx.options.no_error {
        gles32::NO_ERROR
    } else {
        ctx.gl.GetError()
    }
}

pub unsafe fn enable(ctx: &mut Context, cap: GLenum) {
    if cap == gles32::DEBUG_OUTPUT && !ctx.options.debug {
        return;
    }
    ctx.gl.Enable(cap);
}

pub unsafe fn clear_depth(ctx: &mut Context, depth: GLdouble) {
    ctx.gl.ClearDepthf(depth as GLfloat);
}

pub unsafe fn depth_range(ctx: &mut Context, near: GLdouble, far: GLdouble) {
    ctx.gl.DepthRangef(near as GLfloat, far as GLfloat);
}
