/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Passthrough for a native OpenGL ES 3.x driver.
//!
//! There's no validation of arguments here: everything that needs emulating
//! was already dealt with before reaching this layer, so whatever arrives is
//! meant for the driver as-is.

use super::backend::{GraphicsBackend, OptionalEntry};
use super::gles32_raw as gles32;
use super::gles32_raw::types::*;
use std::ffi::c_void;
use std::sync::Once;

/// The host driver. The function pointers are process-global, so this type
/// carries no state; it only exists to implement [GraphicsBackend].
pub struct NativeES3 {
    _private: (),
}

impl NativeES3 {
    /// Resolve the bindings with `get_proc_address` the first time a native
    /// backend is requested, then hand out a backend.
    ///
    /// Every context in the process shares the same entry points. EGL allows
    /// `eglGetProcAddress` results to be context-independent, and every
    /// driver we care about makes use of that.
    pub fn load_with<F>(get_proc_address: F) -> NativeES3
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        static LOADED: Once = Once::new();
        let mut get_proc_address = Some(get_proc_address);
        LOADED.call_once(|| {
            if let Some(f) = get_proc_address.take() {
                gles32::load_with(f);
            }
        });
        NativeES3 { _private: () }
    }
}

impl GraphicsBackend for NativeES3 {
    fn description(&self) -> &'static str {
        "Native OpenGL ES 3.x"
    }

    fn is_loaded(&self, entry: OptionalEntry) -> bool {
        match entry {
            OptionalEntry::DrawElementsBaseVertex => gles32::DrawElementsBaseVertex::is_loaded(),
            OptionalEntry::DrawElementsBaseVertexOES => {
                gles32::DrawElementsBaseVertexOES::is_loaded()
            }
            OptionalEntry::DrawElementsBaseVertexEXT => {
                gles32::DrawElementsBaseVertexEXT::is_loaded()
            }
            OptionalEntry::MultiDrawElementsIndirectEXT => {
                gles32::MultiDrawElementsIndirectEXT::is_loaded()
            }
            OptionalEntry::BufferStorageEXT => gles32::BufferStorageEXT::is_loaded(),
            OptionalEntry::TexBuffer => gles32::TexBuffer::is_loaded(),
            OptionalEntry::TexBufferEXT => gles32::TexBufferEXT::is_loaded(),
            OptionalEntry::TexBufferRange => gles32::TexBufferRange::is_loaded(),
            OptionalEntry::TexBufferRangeEXT => gles32::TexBufferRangeEXT::is_loaded(),
        }
    }

    unsafe fn GetError(&mut self) -> GLenum {
        gles32::GetError()
    }
    unsafe fn GetIntegerv(&mut self, pname: GLenum, params: *mut GLint) {
        gles32::GetIntegerv(pname, params)
    }
    unsafe fn GetString(&mut self, name: GLenum) -> *const GLubyte {
        gles32::GetString(name)
    }
    unsafe fn GetStringi(&mut self, name: GLenum, index: GLuint) -> *const GLubyte {
        gles32::GetStringi(name, index)
    }
    unsafe fn Enable(&mut self, cap: GLenum) {
        gles32::Enable(cap)
    }
    unsafe fn ClearDepthf(&mut self, depth: GLfloat) {
        gles32::ClearDepthf(depth)
    }
    unsafe fn DepthRangef(&mut self, near: GLfloat, far: GLfloat) {
        gles32::DepthRangef(near, far)
    }
    unsafe fn GenBuffers(&mut self, n: GLsizei, buffers: *mut GLuint) {
        gles32::GenBuffers(n, buffers)
    }
    unsafe fn BindBuffer(&mut self, target: GLenum, buffer: GLuint) {
        gles32::BindBuffer(target, buffer)
    }
    unsafe fn BindBufferBase(&mut self, target: GLenum, index: GLuint, buffer: GLuint) {
        gles32::BindBufferBase(target, index, buffer)
    }
    unsafe fn BindBufferRange(
        &mut self,
        target: GLenum,
        index: GLuint,
        buffer: GLuint,
        offset: GLintptr,
        size: GLsizeiptr,
    ) {
        gles32::BindBufferRange(target, index, buffer, offset, size)
    }
    unsafe fn BufferData(
        &mut self,
        target: GLenum,
        size: GLsizeiptr,
        data: *const GLvoid,
        usage: GLenum,
    ) {
        gles32::BufferData(target, size, data, usage)
    }
    unsafe fn BufferSubData(
        &mut self,
        target: GLenum,
        offset: GLintptr,
        size: GLsizeiptr,
        data: *const GLvoid,
    ) {
        gles32::BufferSubData(target, offset, size, data)
    }
    unsafe fn CopyBufferSubData(
        &mut self,
        read_target: GLenum,
        write_target: GLenum,
        read_offset: GLintptr,
        write_offset: GLintptr,
        size: GLsizeiptr,
    ) {
        gles32::CopyBufferSubData(read_target, write_target, read_offset, write_offset, size)
    }
    unsafe fn BufferStorageEXT(
        &mut self,
        target: GLenum,
        size: GLsizeiptr,
        data: *const GLvoid,
        flags: GLbitfield,
    ) {
        gles32::BufferStorageEXT(target, size, data, flags)
    }
    unsafe fn MapBufferRange(
        &mut self,
        target: GLenum,
        offset: GLintptr,
        length: GLsizeiptr,
        access: GLbitfield,
    ) -> *mut GLvoid {
        gles32::MapBufferRange(target, offset, length, access)
    }
    unsafe fn FlushMappedBufferRange(
        &mut self,
        target: GLenum,
        offset: GLintptr,
        length: GLsizeiptr,
    ) {
        gles32::FlushMappedBufferRange(target, offset, length)
    }
    unsafe fn GetBufferParameteriv(&mut self, target: GLenum, pname: GLenum, params: *mut GLint) {
        gles32::GetBufferParameteriv(target, pname, params)
    }
    unsafe fn DrawArrays(&mut self, mode: GLenum, first: GLint, count: GLsizei) {
        gles32::DrawArrays(mode, first, count)
    }
    unsafe fn DrawElements(
        &mut self,
        mode: GLenum,
        count: GLsizei,
        type_: GLenum,
        indices: *const GLvoid,
    ) {
        gles32::DrawElements(mode, count, type_, indices)
    }
    unsafe fn DrawElementsBaseVertex(
        &mut self,
        mode: GLenum,
        count: GLsizei,
        type_: GLenum,
        indices: *const GLvoid,
        basevertex: GLint,
    ) {
        gles32::DrawElementsBaseVertex(mode, count, type_, indices, basevertex)
    }
    unsafe fn DrawElementsBaseVertexOES(
        &mut self,
        mode: GLenum,
        count: GLsizei,
        type_: GLenum,
        indices: *const GLvoid,
        basevertex: GLint,
    ) {
        gles32::DrawElementsBaseVertexOES(mode, count, type_, indices, basevertex)
    }
    unsafe fn DrawElementsBaseVertexEXT(
        &mut self,
        mode: GLenum,
        count: GLsizei,
        type_: GLenum,
        indices: *const GLvoid,
        basevertex: GLint,
    ) {
        gles32::DrawElementsBaseVertexEXT(mode, count, type_, indices, basevertex)
    }
    unsafe fn DrawElementsIndirect(
        &mut self,
        mode: GLenum,
        type_: GLenum,
        indirect: *const GLvoid,
    ) {
        gles32::DrawElementsIndirect(mode, type_, indirect)
    }
    unsafe fn MultiDrawElementsIndirectEXT(
        &mut self,
        mode: GLenum,
        type_: GLenum,
        indirect: *const GLvoid,
        drawcount: GLsizei,
        stride: GLsizei,
    ) {
        gles32::MultiDrawElementsIndirectEXT(mode, type_, indirect, drawcount, stride)
    }
    unsafe fn BindTexture(&mut self, target: GLenum, texture: GLuint) {
        gles32::BindTexture(target, texture)
    }
    unsafe fn DeleteTextures(&mut self, n: GLsizei, textures: *const GLuint) {
        gles32::DeleteTextures(n, textures)
    }
    unsafe fn TexParameteri(&mut self, target: GLenum, pname: GLenum, param: GLint) {
        gles32::TexParameteri(target, pname, param)
    }
    unsafe fn TexParameteriv(&mut self, target: GLenum, pname: GLenum, params: *const GLint) {
        gles32::TexParameteriv(target, pname, params)
    }
    unsafe fn TexParameterf(&mut self, target: GLenum, pname: GLenum, param: GLfloat) {
        gles32::TexParameterf(target, pname, param)
    }
    unsafe fn TexParameterfv(&mut self, target: GLenum, pname: GLenum, params: *const GLfloat) {
        gles32::TexParameterfv(target, pname, params)
    }
    unsafe fn GetTexParameteriv(&mut self, target: GLenum, pname: GLenum, params: *mut GLint) {
        gles32::GetTexParameteriv(target, pname, params)
    }
    unsafe fn GetTexLevelParameteriv(
        &mut self,
        target: GLenum,
        level: GLint,
        pname: GLenum,
        params: *mut GLint,
    ) {
        gles32::GetTexLevelParameteriv(target, level, pname, params)
    }
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
    ) {
        gles32::TexImage2D(target, level, internalformat, width, height, border, format, type_, pixels)
    }
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
    ) {
        gles32::TexSubImage2D(target, level, xoffset, yoffset, width, height, format, type_, pixels)
    }
    unsafe fn TexBuffer(&mut self, target: GLenum, internalformat: GLenum, buffer: GLuint) {
        gles32::TexBuffer(target, internalformat, buffer)
    }
    unsafe fn TexBufferEXT(&mut self, target: GLenum, internalformat: GLenum, buffer: GLuint) {
        gles32::TexBufferEXT(target, internalformat, buffer)
    }
    unsafe fn TexBufferRange(
        &mut self,
        target: GLenum,
        internalformat: GLenum,
        buffer: GLuint,
        offset: GLintptr,
        size: GLsizeiptr,
    ) {
        gles32::TexBufferRange(target, internalformat, buffer, offset, size)
    }
    unsafe fn TexBufferRangeEXT(
        &mut self,
        target: GLenum,
        internalformat: GLenum,
        buffer: GLuint,
        offset: GLintptr,
        size: GLsizeiptr,
    ) {
        gles32::TexBufferRangeEXT(target, internalformat, buffer, offset, size)
    }
    unsafe fn CreateShader(&mut self, type_: GLenum) -> GLuint {
        gles32::CreateShader(type_)
    }
    unsafe fn DeleteShader(&mut self, shader: GLuint) {
        gles32::DeleteShader(shader)
    }
    unsafe fn ShaderSource(
        &mut self,
        shader: GLuint,
        count: GLsizei,
        string: *const *const GLchar,
        length: *const GLint,
    ) {
        gles32::ShaderSource(shader, count, string, length)
    }
    unsafe fn CompileShader(&mut self, shader: GLuint) {
        gles32::CompileShader(shader)
    }
    unsafe fn GetShaderiv(&mut self, shader: GLuint, pname: GLenum, params: *mut GLint) {
        gles32::GetShaderiv(shader, pname, params)
    }
    unsafe fn GetShaderInfoLog(
        &mut self,
        shader: GLuint,
        buf_size: GLsizei,
        length: *mut GLsizei,
        info_log: *mut GLchar,
    ) {
        gles32::GetShaderInfoLog(shader, buf_size, length, info_log)
    }
    unsafe fn CreateProgram(&mut self) -> GLuint {
        gles32::CreateProgram()
    }
    unsafe fn DeleteProgram(&mut self, program: GLuint) {
        gles32::DeleteProgram(program)
    }
    unsafe fn AttachShader(&mut self, program: GLuint, shader: GLuint) {
        gles32::AttachShader(program, shader)
    }
    unsafe fn DetachShader(&mut self, program: GLuint, shader: GLuint) {
        gles32::DetachShader(program, shader)
    }
    unsafe fn LinkProgram(&mut self, program: GLuint) {
        gles32::LinkProgram(program)
    }
    unsafe fn UseProgram(&mut self, program: GLuint) {
        gles32::UseProgram(program)
    }
    unsafe fn BindFramebuffer(&mut self, target: GLenum, framebuffer: GLuint) {
        gles32::BindFramebuffer(target, framebuffer)
    }
    unsafe fn DeleteFramebuffers(&mut self, n: GLsizei, framebuffers: *const GLuint) {
        gles32::DeleteFramebuffers(n, framebuffers)
    }
    unsafe fn FramebufferTexture2D(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        textarget: GLenum,
        texture: GLuint,
        level: GLint,
    ) {
        gles32::FramebufferTexture2D(target, attachment, textarget, texture, level)
    }
    unsafe fn DrawBuffers(&mut self, n: GLsizei, bufs: *const GLenum) {
        gles32::DrawBuffers(n, bufs)
    }
    unsafe fn RenderbufferStorage(
        &mut self,
        target: GLenum,
        internalformat: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) {
        gles32::RenderbufferStorage(target, internalformat, width, height)
    }}
