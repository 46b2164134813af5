/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! The exported C functions applications call.
//!
//! Each one finds the context current on the calling thread and hands off to
//! the module implementing it. Without a current context, calls do nothing
//! and queries return zero or null. Errors are logged and the call is dropped.
//!
//! All of these have the signatures and semantics of the OpenGL (ES) and EGL
//! functions of the same names, and the same safety requirements on their
//! arguments.

#![allow(clippy::missing_safety_doc)]

use crate::context::Context;
use crate::draw::{base_vertex, multi_draw};
use crate::egl::registry::{self, Registry};
use crate::egl::types::*;
use crate::egl::HostEgl;
use crate::error::ShimError;
use crate::gles::desktop;
use crate::gles::gles32_raw::types::*;
use crate::options::Options;
use crate::shader::ShaderPipeline;
use crate::{buffer, framebuffer, shader, state, swizzle, texture};
use std::ffi::{c_char, CStr};

lazy_static::lazy_static! {
    static ref REGISTRY: Registry<HostEgl> = {
        let options = Options::global();
        crate::log::init(options);
        options.print_summary();
        let host = match HostEgl::open(options) {
            Ok(host) => host,
            Err(e) => panic!("Could not load the host EGL: {}", e),
        };
        Registry::new(host, options.clone(), ShaderPipeline::process_default())
    };
}

/// Run `f` on the current context. [None] if there isn't one.
fn with_context<R>(function: &str, f: impl FnOnce(&mut Context) -> R) -> Option<R> {
    let result = registry::with_current(f);
    if result.is_none() {
        log_dbg!("{} called without a current context", function);
    }
    result
}

/// Log the error of a call that is being dropped.
fn report(function: &str, result: Result<(), ShimError>) {
    if let Err(e) = result {
        if e.is_fatal() {
            panic!("{}: {}", function, e);
        }
        log!("{}: {}", function, e);
    }
}

/// Run a fallible call on the current context, logging what goes wrong.
fn run(function: &str, f: impl FnOnce(&mut Context) -> Result<(), ShimError>) {
    let result = with_context(function, f).unwrap_or(Err(ShimError::NoCurrentContext));
    match result {
        Err(ShimError::NoCurrentContext) => (),
        other => report(function, other),
    }
}

unsafe fn slice<'a, T>(ptr: *const T, len: GLsizei) -> Result<&'a [T], ShimError> {
    if len < 0 {
        return Err(ShimError::InvalidArgument(format!("count {}", len)));
    }
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(ShimError::InvalidArgument("null array".to_string()));
    }
    Ok(std::slice::from_raw_parts(ptr, len as usize))
}

/// Number of values a texture parameter takes or returns.
fn param_count(pname: GLenum) -> GLsizei {
    if pname == desktop::TEXTURE_SWIZZLE_RGBA {
        4
    } else {
        1
    }
}

// State

#[no_mangle]
pub unsafe extern "C" fn glGetString(name: GLenum) -> *const GLubyte {
    with_context("glGetString", |ctx| state::get_string(ctx, name)).unwrap_or(std::ptr::null())
}

#[no_mangle]
pub unsafe extern "C" fn glGetStringi(name: GLenum, index: GLuint) -> *const GLubyte {
    with_context("glGetStringi", |ctx| state::get_stringi(ctx, name, index))
        .unwrap_or(std::ptr::null())
}

#[no_mangle]
pub unsafe extern "C" fn glGetIntegerv(pname: GLenum, data: *mut GLint) {
    let Some(data) = data.as_mut() else {
        return;
    };
    with_context("glGetIntegerv", |ctx| state::get_integerv(ctx, pname, data));
}

#[no_mangle]
pub unsafe extern "C" fn glGetError() -> GLenum {
    with_context("glGetError", |ctx| state::get_error(ctx)).unwrap_or(0)
}

#[no_mangle]
pub unsafe extern "C" fn glEnable(cap: GLenum) {
    with_context("glEnable", |ctx| state::enable(ctx, cap));
}

#[no_mangle]
pub unsafe extern "C" fn glDebugMessageControl(
    _source: GLenum,
    _type: GLenum,
    _severity: GLenum,
    _count: GLsizei,
    _ids: *const GLuint,
    _enabled: GLboolean,
) {
}

#[no_mangle]
pub unsafe extern "C" fn glClearDepth(depth: GLdouble) {
    with_context("glClearDepth", |ctx| state::clear_depth(ctx, depth));
}

#[no_mangle]
pub unsafe extern "C" fn glDepthRange(near: GLdouble, far: GLdouble) {
    with_context("glDepthRange", |ctx| state::depth_range(ctx, near, far));
}

// Buffers

#[no_mangle]
pub unsafe extern "C" fn glBindBuffer(target: GLenum, buffer: GLuint) {
    with_context("glBindBuffer", |ctx| buffer::bind_buffer(ctx, target, buffer));
}

#[no_mangle]
pub unsafe extern "C" fn glBindBufferBase(target: GLenum, index: GLuint, buffer: GLuint) {
    with_context("glBindBufferBase", |ctx| {
        buffer::bind_buffer_base(ctx, target, index, buffer)
    });
}

#[no_mangle]
pub unsafe extern "C" fn glBindBufferRange(
    target: GLenum,
    index: GLuint,
    buffer: GLuint,
    offset: GLintptr,
    size: GLsizeiptr,
) {
    with_context("glBindBufferRange", |ctx| {
        buffer::bind_buffer_range(ctx, target, index, buffer, offset, size)
    });
}

#[no_mangle]
pub unsafe extern "C" fn glBufferStorage(
    target: GLenum,
    size: GLsizeiptr,
    data: *const GLvoid,
    flags: GLbitfield,
) {
    run("glBufferStorage", |ctx| {
        buffer::buffer_storage(ctx, target, size, data, flags)
    });
}

#[no_mangle]
pub unsafe extern "C" fn glMapBufferRange(
    target: GLenum,
    offset: GLintptr,
    length: GLsizeiptr,
    access: GLbitfield,
) -> *mut GLvoid {
    with_context("glMapBufferRange", |ctx| {
        buffer::map_buffer_range(ctx, target, offset, length, access)
    })
    .unwrap_or(std::ptr::null_mut())
}

#[no_mangle]
pub unsafe extern "C" fn glFlushMappedBufferRange(
    target: GLenum,
    offset: GLintptr,
    length: GLsizeiptr,
) {
    with_context("glFlushMappedBufferRange", |ctx| {
        buffer::flush_mapped_buffer_range(ctx, target, offset, length)
    });
}

#[no_mangle]
pub unsafe extern "C" fn glMapBuffer(target: GLenum, access: GLenum) -> *mut GLvoid {
    let result = with_context("glMapBuffer", |ctx| buffer::map_buffer(ctx, target, access));
    match result {
        Some(Ok(ptr)) => ptr,
        Some(Err(e)) => {
            report("glMapBuffer", Err(e));
            std::ptr::null_mut()
        }
        None => std::ptr::null_mut(),
    }
}

// Draws

#[no_mangle]
pub unsafe extern "C" fn glDrawElementsBaseVertex(
    mode: GLenum,
    count: GLsizei,
    type_: GLenum,
    indices: *const GLvoid,
    basevertex: GLint,
) {
    run("glDrawElementsBaseVertex", |ctx| {
        base_vertex::draw_elements_base_vertex(ctx, mode, count, type_, indices, basevertex)
    });
}

#[no_mangle]
pub unsafe extern "C" fn glMultiDrawElementsBaseVertex(
    mode: GLenum,
    count: *const GLsizei,
    type_: GLenum,
    indices: *const *const GLvoid,
    drawcount: GLsizei,
    basevertex: *const GLint,
) {
    run("glMultiDrawElementsBaseVertex", |ctx| {
        base_vertex::multi_draw_elements_base_vertex(
            ctx,
            mode,
            slice(count, drawcount)?,
            type_,
            slice(indices, drawcount)?,
            slice(basevertex, drawcount)?,
        )
    });
}

#[no_mangle]
pub unsafe extern "C" fn glMultiDrawArrays(
    mode: GLenum,
    first: *const GLint,
    count: *const GLsizei,
    drawcount: GLsizei,
) {
    run("glMultiDrawArrays", |ctx| {
        multi_draw::multi_draw_arrays(ctx, mode, slice(first, drawcount)?, slice(count, drawcount)?)
    });
}

#[no_mangle]
pub unsafe extern "C" fn glMultiDrawElements(
    mode: GLenum,
    count: *const GLsizei,
    type_: GLenum,
    indices: *const *const GLvoid,
    drawcount: GLsizei,
) {
    run("glMultiDrawElements", |ctx| {
        multi_draw::multi_draw_elements(
            ctx,
            mode,
            slice(count, drawcount)?,
            type_,
            slice(indices, drawcount)?,
        )
    });
}

// Textures

#[no_mangle]
pub unsafe extern "C" fn glTexBuffer(target: GLenum, internalformat: GLenum, buffer: GLuint) {
    with_context("glTexBuffer", |ctx| {
        texture::tex_buffer(ctx, target, internalformat, buffer, None)
    });
}

#[no_mangle]
pub unsafe extern "C" fn glTexBufferARB(target: GLenum, internalformat: GLenum, buffer: GLuint) {
    glTexBuffer(target, internalformat, buffer)
}

#[no_mangle]
pub unsafe extern "C" fn glTexBufferRange(
    target: GLenum,
    internalformat: GLenum,
    buffer: GLuint,
    offset: GLintptr,
    size: GLsizeiptr,
) {
    with_context("glTexBufferRange", |ctx| {
        texture::tex_buffer(ctx, target, internalformat, buffer, Some((offset, size)))
    });
}

#[no_mangle]
pub unsafe extern "C" fn glTexBufferRangeARB(
    target: GLenum,
    internalformat: GLenum,
    buffer: GLuint,
    offset: GLintptr,
    size: GLsizeiptr,
) {
    glTexBufferRange(target, internalformat, buffer, offset, size)
}

#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn glTexImage2D(
    target: GLenum,
    level: GLint,
    internalformat: GLint,
    width: GLsizei,
    height: GLsizei,
    border: GLint,
    format: GLenum,
    type_: GLenum,
    pixels: *const GLvoid,
) {
    with_context("glTexImage2D", |ctx| {
        texture::tex_image_2d(
            ctx,
            target,
            level,
            internalformat,
            width,
            height,
            border,
            format,
            type_,
            pixels,
        )
    });
}

#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn glTexSubImage2D(
    target: GLenum,
    level: GLint,
    xoffset: GLint,
    yoffset: GLint,
    width: GLsizei,
    height: GLsizei,
    format: GLenum,
    type_: GLenum,
    pixels: *const GLvoid,
) {
    with_context("glTexSubImage2D", |ctx| {
        texture::tex_sub_image_2d(
            ctx, target, level, xoffset, yoffset, width, height, format, type_, pixels,
        )
    });
}

#[no_mangle]
pub unsafe extern "C" fn glTexParameteri(target: GLenum, pname: GLenum, param: GLint) {
    with_context("glTexParameteri", |ctx| {
        texture::tex_parameteri(ctx, target, pname, param)
    });
}

#[no_mangle]
pub unsafe extern "C" fn glTexParameteriv(target: GLenum, pname: GLenum, params: *const GLint) {
    run("glTexParameteriv", |ctx| {
        let params = slice(params, param_count(pname))?;
        texture::tex_parameteriv(ctx, target, pname, params);
        Ok(())
    });
}

#[no_mangle]
pub unsafe extern "C" fn glTexParameterf(target: GLenum, pname: GLenum, param: GLfloat) {
    with_context("glTexParameterf", |ctx| {
        texture::tex_parameterf(ctx, target, pname, param)
    });
}

#[no_mangle]
pub unsafe extern "C" fn glTexParameterfv(target: GLenum, pname: GLenum, params: *const GLfloat) {
    run("glTexParameterfv", |ctx| {
        let params = slice(params, param_count(pname))?;
        texture::tex_parameterfv(ctx, target, pname, params);
        Ok(())
    });
}

#[no_mangle]
pub unsafe extern "C" fn glTexParameterIiv(target: GLenum, pname: GLenum, params: *const GLint) {
    run("glTexParameterIiv", |ctx| {
        let params = slice(params, param_count(pname))?;
        texture::tex_parameter_integer(ctx, target, pname, params);
        Ok(())
    });
}

#[no_mangle]
pub unsafe extern "C" fn glTexParameterIuiv(target: GLenum, pname: GLenum, params: *const GLuint) {
    run("glTexParameterIuiv", |ctx| {
        let params = slice(params as *const GLint, param_count(pname))?;
        texture::tex_parameter_integer(ctx, target, pname, params);
        Ok(())
    });
}

#[no_mangle]
pub unsafe extern "C" fn glGetTexParameteriv(target: GLenum, pname: GLenum, params: *mut GLint) {
    if params.is_null() {
        return;
    }
    let params = std::slice::from_raw_parts_mut(params, param_count(pname) as usize);
    with_context("glGetTexParameteriv", |ctx| {
        texture::get_tex_parameteriv(ctx, target, pname, params)
    });
}

#[no_mangle]
pub unsafe extern "C" fn glGetTexLevelParameteriv(
    target: GLenum,
    level: GLint,
    pname: GLenum,
    params: *mut GLint,
) {
    let Some(params) = params.as_mut() else {
        return;
    };
    with_context("glGetTexLevelParameteriv", |ctx| {
        texture::get_tex_level_parameteriv(ctx, target, level, pname, params)
    });
}

#[no_mangle]
pub unsafe extern "C" fn glGetTexLevelParameterfv(
    target: GLenum,
    level: GLint,
    pname: GLenum,
    params: *mut GLfloat,
) {
    let Some(params) = params.as_mut() else {
        return;
    };
    let mut value = *params as GLint;
    with_context("glGetTexLevelParameterfv", |ctx| {
        texture::get_tex_level_parameteriv(ctx, target, level, pname, &mut value)
    });
    *params = value as GLfloat;
}

#[no_mangle]
pub unsafe extern "C" fn glDeleteTextures(n: GLsizei, textures: *const GLuint) {
    run("glDeleteTextures", |ctx| {
        texture::delete_textures(ctx, slice(textures, n)?);
        Ok(())
    });
}

#[no_mangle]
pub unsafe extern "C" fn glLTWBeginBatchUpdate() {
    with_context("glLTWBeginBatchUpdate", swizzle::begin_batch);
}

#[no_mangle]
pub unsafe extern "C" fn glLTWEndBatchUpdate() {
    with_context("glLTWEndBatchUpdate", |ctx| swizzle::end_batch(ctx));
}

// Shaders and programs

#[no_mangle]
pub unsafe extern "C" fn glCreateShader(type_: GLenum) -> GLuint {
    with_context("glCreateShader", |ctx| shader::create_shader(ctx, type_)).unwrap_or(0)
}

#[no_mangle]
pub unsafe extern "C" fn glDeleteShader(shader: GLuint) {
    with_context("glDeleteShader", |ctx| shader::delete_shader(ctx, shader));
}

#[no_mangle]
pub unsafe extern "C" fn glShaderSource(
    shader: GLuint,
    count: GLsizei,
    string: *const *const GLchar,
    length: *const GLint,
) {
    let source = shader::collect_source(count, string, length);
    with_context("glShaderSource", |ctx| {
        shader::shader_source(ctx, shader, &source)
    });
}

#[no_mangle]
pub unsafe extern "C" fn glGetShaderiv(shader: GLuint, pname: GLenum, params: *mut GLint) {
    let Some(params) = params.as_mut() else {
        return;
    };
    with_context("glGetShaderiv", |ctx| {
        shader::get_shaderiv(ctx, shader, pname, params)
    });
}

#[no_mangle]
pub unsafe extern "C" fn glCreateProgram() -> GLuint {
    with_context("glCreateProgram", |ctx| shader::create_program(ctx)).unwrap_or(0)
}

#[no_mangle]
pub unsafe extern "C" fn glDeleteProgram(program: GLuint) {
    with_context("glDeleteProgram", |ctx| shader::delete_program(ctx, program));
}

#[no_mangle]
pub unsafe extern "C" fn glAttachShader(program: GLuint, shader: GLuint) {
    with_context("glAttachShader", |ctx| {
        shader::attach_shader(ctx, program, shader)
    });
}

#[no_mangle]
pub unsafe extern "C" fn glBindFragDataLocation(program: GLuint, color: GLuint, name: *const c_char) {
    if name.is_null() {
        return;
    }
    let name = CStr::from_ptr(name).to_string_lossy();
    with_context("glBindFragDataLocation", |ctx| {
        shader::bind_frag_data_location(ctx, program, color, &name)
    });
}

#[no_mangle]
pub unsafe extern "C" fn glLinkProgram(program: GLuint) {
    with_context("glLinkProgram", |ctx| shader::link_program(ctx, program));
}

#[no_mangle]
pub unsafe extern "C" fn glUseProgram(program: GLuint) {
    with_context("glUseProgram", |ctx| shader::use_program(ctx, program));
}

// Framebuffers

#[no_mangle]
pub unsafe extern "C" fn glBindFramebuffer(target: GLenum, framebuffer: GLuint) {
    with_context("glBindFramebuffer", |ctx| {
        framebuffer::bind_framebuffer(ctx, target, framebuffer)
    });
}

#[no_mangle]
pub unsafe extern "C" fn glDeleteFramebuffers(n: GLsizei, framebuffers: *const GLuint) {
    run("glDeleteFramebuffers", |ctx| {
        framebuffer::delete_framebuffers(ctx, slice(framebuffers, n)?);
        Ok(())
    });
}

#[no_mangle]
pub unsafe extern "C" fn glFramebufferTexture2D(
    target: GLenum,
    attachment: GLenum,
    textarget: GLenum,
    texture: GLuint,
    level: GLint,
) {
    with_context("glFramebufferTexture2D", |ctx| {
        framebuffer::framebuffer_texture_2d(ctx, target, attachment, textarget, texture, level)
    });
}

#[no_mangle]
pub unsafe extern "C" fn glDrawBuffers(n: GLsizei, bufs: *const GLenum) {
    run("glDrawBuffers", |ctx| {
        framebuffer::draw_buffers(ctx, slice(bufs, n)?)
    });
}

#[no_mangle]
pub unsafe extern "C" fn glRenderbufferStorage(
    target: GLenum,
    internalformat: GLenum,
    width: GLsizei,
    height: GLsizei,
) {
    with_context("glRenderbufferStorage", |ctx| {
        framebuffer::renderbuffer_storage(ctx, target, internalformat, width, height)
    });
}

// EGL

#[no_mangle]
pub unsafe extern "C" fn eglCreateContext(
    display: EGLDisplay,
    config: EGLConfig,
    share_context: EGLContext,
    attrib_list: *const EGLint,
) -> EGLContext {
    REGISTRY.create_context(display, config, share_context, attrib_list)
}

#[no_mangle]
pub unsafe extern "C" fn eglDestroyContext(display: EGLDisplay, context: EGLContext) -> EGLBoolean {
    if REGISTRY.destroy_context(display, context) {
        EGL_TRUE
    } else {
        EGL_FALSE
    }
}

#[no_mangle]
pub unsafe extern "C" fn eglMakeCurrent(
    display: EGLDisplay,
    draw: EGLSurface,
    read: EGLSurface,
    context: EGLContext,
) -> EGLBoolean {
    match REGISTRY.make_current(display, draw, read, context) {
        Ok(true) => EGL_TRUE,
        Ok(false) => EGL_FALSE,
        Err(e) => panic!("eglMakeCurrent: {}", e),
    }
}
