/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Generic OpenGL ES 3.x driver interface.
//!
//! Unfortunately this does not provide the types and constants, so the correct
//! usage is to import `GraphicsBackend` from this module, but get the types
//! and constants from [super::gles32_raw].

use super::gles32_raw::types::*;

/// Entry points that a driver may or may not provide. Everything not listed
/// here is core OpenGL ES 3.0 and assumed to exist.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OptionalEntry {
    DrawElementsBaseVertex,
    DrawElementsBaseVertexOES,
    DrawElementsBaseVertexEXT,
    MultiDrawElementsIndirectEXT,
    BufferStorageEXT,
    TexBuffer,
    TexBufferEXT,
    TexBufferRange,
    TexBufferRangeEXT,
}

/// Trait representing the host OpenGL ES driver.
///
/// # Safety
/// It is the caller's responsibility to make a context current before using
/// any of the `unsafe` methods of this trait, and to pass pointers that are
/// valid for what the corresponding GL function reads or writes.
#[allow(clippy::upper_case_acronyms)]
#[allow(clippy::too_many_arguments)] // not our fault :(
pub trait GraphicsBackend {
    /// Get a human-friendly description of this implementation.
    fn description(&self) -> &'static str;

    /// Whether an optional entry point was resolved.
    fn is_loaded(&self, entry: OptionalEntry) -> bool;

    // Generic state manipulation
    unsafe fn GetError(&mut self) -> GLenum;
    unsafe fn GetIntegerv(&mut self, pname: GLenum, params: *mut GLint);
    unsafe fn GetString(&mut self, name: GLenum) -> *const GLubyte;
    unsafe fn GetStringi(&mut self, name: GLenum, index: GLuint) -> *const GLubyte;
    unsafe fn Enable(&mut self, cap: GLenum);
    unsafe fn ClearDepthf(&mut self, depth: GLfloat);
    unsafe fn DepthRangef(&mut self, near: GLfloat, far: GLfloat);

    // Buffers
    unsafe fn GenBuffers(&mut self, n: GLsizei, buffers: *mut GLuint);
    unsafe fn BindBuffer(&mut self, target: GLenum, buffer: GLuint);
    unsafe fn BindBufferBase(&mut self, target: GLenum, index: GLuint, buffer: GLuint);
    unsafe fn BindBufferRange(
        &mut self,
        target: GLenum,
        index: GLuint,
        buffer: GLuint,
        offset: GLintptr,
        size: GLsizeiptr,
    );
    unsafe fn BufferData(
        &mut self,
        target: GLenum,
        size: GLsizeiptr,
        data: *const GLvoid,
        usage: GLenum,
    );
    unsafe fn BufferSubData(
        &mut self,
        target: GLenum,
        offset: GLintptr,
        size: GLsizeiptr,
        data: *const GLvoid,
    );
    unsafe fn CopyBufferSubData(
        &mut self,
        read_target: GLenum,
        write_target: GLenum,
        read_offset: GLintptr,
        write_offset: GLintptr,
        size: GLsizeiptr,
    );
    unsafe fn BufferStorageEXT(
        &mut self,
        target: GLenum,
        size: GLsizeiptr,
        data: *const GLvoid,
        flags: GLbitfield,
    );
    unsafe fn MapBufferRange(
        &mut self,
        target: GLenum,
        offset: GLintptr,
        length: GLsizeiptr,
        access: GLbitfield,
    ) -> *mut GLvoid;
    unsafe fn FlushMappedBufferRange(&mut self, target: GLenum, offset: GLintptr, length: GLsizeiptr);
    unsafe fn GetBufferParameteriv(&mut self, target: GLenum, pname: GLenum, params: *mut GLint);

    // Drawing
    unsafe fn DrawArrays(&mut self, mode: GLenum, first: GLint, count: GLsizei);
    unsafe fn DrawElements(
        &mut self,
        mode: GLenum,
        count: GLsizei,
        type_: GLenum,
        indices: *const GLvoid,
    );
    unsafe fn DrawElementsBaseVertex(
        &mut self,
        mode: GLenum,
        count: GLsizei,
        type_: GLenum,
        indices: *const GLvoid,
        basevertex: GLint,
    );
    unsafe fn DrawElementsBaseVertexOES(
        &mut self,
        mode: GLenum,
        count: GLsizei,
        type_: GLenum,
        indices: *const GLvoid,
        basevertex: GLint,
    );
    unsafe fn DrawElementsBaseVertexEXT(
        &mut self,
        mode: GLenum,
        count: GLsizei,
        type_: GLenum,
        indices: *const GLvoid,
        basevertex: GLint,
    );
    unsafe fn DrawElementsIndirect(&mut self, mode: GLenum, type_: GLenum, indirect: *const GLvoid);
    unsafe fn MultiDrawElementsIndirectEXT(
        &mut self,
        mode: GLenum,
        type_: GLenum,
        indirect: *const GLvoid,
        drawcount: GLsizei,
        stride: GLsizei,
    );

    // Textures
    unsafe fn BindTexture(&mut self, target: GLenum, texture: GLuint);
    unsafe fn DeleteTextures(&mut self, n: GLsizei, textures: *const GLuint);
    unsafe fn TexParameteri(&mut self, target: GLenum, pname: GLenum, param: GLint);
    unsafe fn TexParameteriv(&mut self, target: GLenum, pname: GLenum, params: *const GLint);
    unsafe fn TexParameterf(&mut self, target: GLenum, pname: GLenum, param: GLfloat);
    unsafe fn TexParameterfv(&mut self, target: GLenum, pname: GLenum, params: *const GLfloat);
    unsafe fn GetTexParameteriv(&mut self, target: GLenum, pname: GLenum, params: *mut GLint);
    unsafe fn GetTexLevelParameteriv(
        &mut self,
        target: GLenum,
        level: GLint,
        pname: GLenum,
        params: *mut GLint,
    );
    unsafe fn TexImage2D(
        &mut self,
        target: GLenum,
        level: GLint,
        internalformat: GLint,
        width: GLsizei,
        height: GLsizei,
        border: GLint,
        format: GLenum,
        type_: GLenum,
        pixels: *const GLvoid,
    );
    unsafe fn TexSubImage2D(
        &mut self,
        target: GLenum,
        level: GLint,
        xoffset: GLint,
        yoffset: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        type_: GLenum,
        pixels: *const GLvoid,
    );
    unsafe fn TexBuffer(&mut self, target: GLenum, internalformat: GLenum, buffer: GLuint);
    unsafe fn TexBufferEXT(&mut self, target: GLenum, internalformat: GLenum, buffer: GLuint);
    unsafe fn TexBufferRange(
        &mut self,
        target: GLenum,
        internalformat: GLenum,
        buffer: GLuint,
        offset: GLintptr,
        size: GLsizeiptr,
    );
    unsafe fn TexBufferRangeEXT(
        &mut self,
        target: GLenum,
        internalformat: GLenum,
        buffer: GLuint,
        offset: GLintptr,
        size: GLsizeiptr,
    );

    // Shaders and programs
    unsafe fn CreateShader(&mut self, type_: GLenum) -> GLuint;
    unsafe fn DeleteShader(&mut self, shader: GLuint);
    unsafe fn ShaderSource(
        &mut self,
        shader: GLuint,
        count: GLsizei,
        string: *const *const GLchar,
        length: *const GLint,
    );
    unsafe fn CompileShader(&mut self, shader: GLuint);
    unsafe fn GetShaderiv(&mut self, shader: GLuint, pname: GLenum, params: *mut GLint);
    unsafe fn GetShaderInfoLog(
        &mut self,
        shader: GLuint,
        buf_size: GLsizei,
        length: *mut GLsizei,
        info_log: *mut GLchar,
    );
    unsafe fn CreateProgram(&mut self) -> GLuint;
    unsafe fn DeleteProgram(&mut self, program: GLuint);
    unsafe fn AttachShader(&mut self, program: GLuint, shader: GLuint);
    unsafe fn DetachShader(&mut self, program: GLuint, shader: GLuint);
    unsafe fn LinkProgram(&mut self, program: GLuint);
    unsafe fn UseProgram(&mut self, program: GLuint);

    // Framebuffers and renderbuffers
    unsafe fn BindFramebuffer(&mut self, target: GLenum, framebuffer: GLuint);
    unsafe fn DeleteFramebuffers(&mut self, n: GLsizei, framebuffers: *const GLuint);
    unsafe fn FramebufferTexture2D(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        textarget: GLenum,
        texture: GLuint,
        level: GLint,
    );
    unsafe fn DrawBuffers(&mut self, n: GLsizei, bufs: *const GLenum);
    unsafe fn RenderbufferStorage(
        &mut self,
        target: GLenum,
        internalformat: GLenum,
        width: GLsizei,
        height: GLsizei,
    );
}
