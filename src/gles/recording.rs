/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Recording driver with a small software model of OpenGL ES state.
//!
//! This answers the queries the shim makes (bindings, limits, strings, shader
//! compile status, texture swizzle) from a model that is updated by the calls
//! it receives, and records every state-changing call as a [Call]. Queries are
//! answered but not recorded, so a recording reads like the command stream a
//! real driver would have executed.
//!
//! [RecordingBackend] is cheaply cloneable: one clone goes into the context,
//! another stays with whoever wants to look at the recording.

use super::backend::{GraphicsBackend, OptionalEntry};
use super::gles32_raw as gles32;
use super::gles32_raw::types::*;
use parking_lot::{Mutex, MutexGuard};
use std::collections::{HashMap, HashSet};
use std::ffi::{CStr, CString};
use std::sync::Arc;

/// A state-changing call received by [RecordingBackend]. Pointers that GL
/// treats as buffer offsets are recorded as `usize` offsets; client memory is
/// copied.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Enable(GLenum),
    ClearDepthf(GLfloat),
    DepthRangef(GLfloat, GLfloat),
    GenBuffers(Vec<GLuint>),
    BindBuffer(GLenum, GLuint),
    BindBufferBase(GLenum, GLuint, GLuint),
    BindBufferRange(GLenum, GLuint, GLuint, GLintptr, GLsizeiptr),
    BufferData {
        target: GLenum,
        size: GLsizeiptr,
        data: Option<Vec<u8>>,
        usage: GLenum,
    },
    BufferSubData {
        target: GLenum,
        offset: GLintptr,
        data: Vec<u8>,
    },
    CopyBufferSubData {
        read_target: GLenum,
        write_target: GLenum,
        read_offset: GLintptr,
        write_offset: GLintptr,
        size: GLsizeiptr,
    },
    BufferStorageEXT {
        target: GLenum,
        size: GLsizeiptr,
        flags: GLbitfield,
    },
    MapBufferRange {
        target: GLenum,
        offset: GLintptr,
        length: GLsizeiptr,
        access: GLbitfield,
    },
    FlushMappedBufferRange(GLenum, GLintptr, GLsizeiptr),
    DrawArrays(GLenum, GLint, GLsizei),
    DrawElements {
        mode: GLenum,
        count: GLsizei,
        type_: GLenum,
        offset: usize,
    },
    DrawElementsBaseVertex {
        entry: OptionalEntry,
        mode: GLenum,
        count: GLsizei,
        type_: GLenum,
        offset: usize,
        basevertex: GLint,
    },
    DrawElementsIndirect {
        mode: GLenum,
        type_: GLenum,
        offset: usize,
    },
    MultiDrawElementsIndirectEXT {
        mode: GLenum,
        type_: GLenum,
        offset: usize,
        drawcount: GLsizei,
        stride: GLsizei,
    },
    BindTexture(GLenum, GLuint),
    DeleteTextures(Vec<GLuint>),
    TexParameteri(GLenum, GLenum, GLint),
    TexParameteriv(GLenum, GLenum, GLint),
    TexParameterf(GLenum, GLenum, GLfloat),
    TexParameterfv(GLenum, GLenum, GLfloat),
    TexImage2D {
        target: GLenum,
        level: GLint,
        internalformat: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        type_: GLenum,
        has_pixels: bool,
    },
    TexSubImage2D {
        target: GLenum,
        level: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        type_: GLenum,
    },
    TexBuffer {
        entry: OptionalEntry,
        target: GLenum,
        internalformat: GLenum,
        buffer: GLuint,
        range: Option<(GLintptr, GLsizeiptr)>,
    },
    CreateShader(GLenum, GLuint),
    DeleteShader(GLuint),
    ShaderSource(GLuint, String),
    CompileShader(GLuint),
    CreateProgram(GLuint),
    DeleteProgram(GLuint),
    AttachShader(GLuint, GLuint),
    DetachShader(GLuint, GLuint),
    LinkProgram(GLuint),
    UseProgram(GLuint),
    BindFramebuffer(GLenum, GLuint),
    DeleteFramebuffers(Vec<GLuint>),
    FramebufferTexture2D {
        target: GLenum,
        attachment: GLenum,
        textarget: GLenum,
        texture: GLuint,
        level: GLint,
    },
    DrawBuffers(Vec<GLenum>),
    RenderbufferStorage {
        target: GLenum,
        internalformat: GLenum,
        width: GLsizei,
        height: GLsizei,
    },
}

/// What kind of driver the model pretends to be.
#[derive(Clone, Debug)]
pub struct DriverProfile {
    pub version: &'static str,
    pub shading_language_version: &'static str,
    pub extensions: Vec<&'static str>,
    pub entries: Vec<OptionalEntry>,
    pub max_texture_size: GLint,
    pub max_draw_buffers: GLint,
}

impl DriverProfile {
    /// OpenGL ES 3.2 with every optional entry point.
    pub fn es32() -> DriverProfile {
        DriverProfile {
            version: "OpenGL ES 3.2 Recording",
            shading_language_version: "OpenGL ES GLSL ES 3.20",
            extensions: vec![
                "GL_EXT_buffer_storage",
                "GL_EXT_multi_draw_indirect",
                "GL_EXT_texture_buffer",
            ],
            entries: vec![
                OptionalEntry::DrawElementsBaseVertex,
                OptionalEntry::MultiDrawElementsIndirectEXT,
                OptionalEntry::BufferStorageEXT,
                OptionalEntry::TexBuffer,
                OptionalEntry::TexBufferEXT,
                OptionalEntry::TexBufferRange,
                OptionalEntry::TexBufferRangeEXT,
            ],
            max_texture_size: 4096,
            max_draw_buffers: 8,
        }
    }

    /// OpenGL ES 3.1 without base-vertex draws or any extensions.
    pub fn es31() -> DriverProfile {
        DriverProfile {
            version: "OpenGL ES 3.1 Recording",
            shading_language_version: "OpenGL ES GLSL ES 3.10",
            extensions: Vec::new(),
            entries: Vec::new(),
            max_texture_size: 4096,
            max_draw_buffers: 4,
        }
    }

    /// Plain OpenGL ES 3.0, the minimum the shim runs on.
    pub fn es30() -> DriverProfile {
        DriverProfile {
            version: "OpenGL ES 3.0 Recording",
            shading_language_version: "OpenGL ES GLSL ES 3.00",
            extensions: Vec::new(),
            entries: Vec::new(),
            max_texture_size: 2048,
            max_draw_buffers: 4,
        }
    }
}

/// The model and the recording. Public fields can be adjusted by tests
/// between calls.
pub struct Recorder {
    pub calls: Vec<Call>,
    /// Result of every subsequent `glCompileShader`.
    pub compile_succeeds: bool,
    /// Returned (once) by the next `glGetError`.
    pub pending_error: GLenum,
    pub max_texture_size: GLint,
    pub max_draw_buffers: GLint,
    entries: HashSet<OptionalEntry>,
    version: CString,
    shading_language_version: CString,
    vendor: CString,
    extensions: Vec<CString>,
    extensions_string: CString,
    next_name: GLuint,
    buffer_bindings: HashMap<GLenum, GLuint>,
    buffer_sizes: HashMap<GLuint, GLsizeiptr>,
    texture_bindings: HashMap<GLenum, GLuint>,
    swizzles: HashMap<GLuint, [GLint; 4]>,
    shaders: HashMap<GLuint, (GLenum, String, bool)>,
    framebuffer: GLuint,
    program: GLuint,
}

fn cstring(s: &str) -> CString {
    CString::new(s).unwrap_or_default()
}

const DEFAULT_SWIZZLE: [GLint; 4] = [
    gles32::RED as GLint,
    gles32::GREEN as GLint,
    gles32::BLUE as GLint,
    gles32::ALPHA as GLint,
];

const INFO_LOG: &str = "recording: compilation failed";

fn swizzle_channel(pname: GLenum) -> Option<usize> {
    match pname {
        gles32::TEXTURE_SWIZZLE_R => Some(0),
        gles32::TEXTURE_SWIZZLE_G => Some(1),
        gles32::TEXTURE_SWIZZLE_B => Some(2),
        gles32::TEXTURE_SWIZZLE_A => Some(3),
        _ => None,
    }
}

fn buffer_binding_target(pname: GLenum) -> Option<GLenum> {
    Some(match pname {
        gles32::ARRAY_BUFFER_BINDING => gles32::ARRAY_BUFFER,
        gles32::ELEMENT_ARRAY_BUFFER_BINDING => gles32::ELEMENT_ARRAY_BUFFER,
        gles32::COPY_READ_BUFFER_BINDING => gles32::COPY_READ_BUFFER,
        gles32::COPY_WRITE_BUFFER_BINDING => gles32::COPY_WRITE_BUFFER,
        gles32::DRAW_INDIRECT_BUFFER_BINDING => gles32::DRAW_INDIRECT_BUFFER,
        gles32::PIXEL_PACK_BUFFER_BINDING => gles32::PIXEL_PACK_BUFFER,
        gles32::PIXEL_UNPACK_BUFFER_BINDING => gles32::PIXEL_UNPACK_BUFFER,
        gles32::UNIFORM_BUFFER_BINDING => gles32::UNIFORM_BUFFER,
        gles32::SHADER_STORAGE_BUFFER_BINDING => gles32::SHADER_STORAGE_BUFFER,
        gles32::TRANSFORM_FEEDBACK_BUFFER_BINDING => gles32::TRANSFORM_FEEDBACK_BUFFER,
        _ => return None,
    })
}

fn texture_binding_target(pname: GLenum) -> Option<GLenum> {
    Some(match pname {
        gles32::TEXTURE_BINDING_2D => gles32::TEXTURE_2D,
        gles32::TEXTURE_BINDING_3D => gles32::TEXTURE_3D,
        gles32::TEXTURE_BINDING_2D_ARRAY => gles32::TEXTURE_2D_ARRAY,
        gles32::TEXTURE_BINDING_CUBE_MAP => gles32::TEXTURE_CUBE_MAP,
        gles32::TEXTURE_BINDING_CUBE_MAP_ARRAY => gles32::TEXTURE_CUBE_MAP_ARRAY,
        gles32::TEXTURE_BINDING_2D_MULTISAMPLE => gles32::TEXTURE_2D_MULTISAMPLE,
        gles32::TEXTURE_BINDING_BUFFER => gles32::TEXTURE_BUFFER,
        _ => return None,
    })
}

impl Recorder {
    fn new(profile: DriverProfile) -> Recorder {
        let extensions: Vec<CString> = profile.extensions.iter().map(|e| cstring(e)).collect();
        Recorder {
            calls: Vec::new(),
            compile_succeeds: true,
            pending_error: gles32::NO_ERROR,
            max_texture_size: profile.max_texture_size,
            max_draw_buffers: profile.max_draw_buffers,
            entries: profile.entries.into_iter().collect(),
            version: cstring(profile.version),
            shading_language_version: cstring(profile.shading_language_version),
            vendor: cstring("Recording"),
            extensions_string: cstring(&profile.extensions.join(" ")),
            extensions,
            next_name: 1,
            buffer_bindings: HashMap::new(),
            buffer_sizes: HashMap::new(),
            texture_bindings: HashMap::new(),
            swizzles: HashMap::new(),
            shaders: HashMap::new(),
            framebuffer: 0,
            program: 0,
        }
    }

    fn gen_name(&mut self) -> GLuint {
        let name = self.next_name;
        self.next_name += 1;
        name
    }

    fn bound_texture(&self, target: GLenum) -> GLuint {
        let target = match target {
            gles32::TEXTURE_CUBE_MAP_POSITIVE_X..=gles32::TEXTURE_CUBE_MAP_NEGATIVE_Z => {
                gles32::TEXTURE_CUBE_MAP
            }
            other => other,
        };
        self.texture_bindings.get(&target).copied().unwrap_or(0)
    }

    /// Current buffer bound to a non-indexed target.
    pub fn bound_buffer(&self, target: GLenum) -> GLuint {
        self.buffer_bindings.get(&target).copied().unwrap_or(0)
    }

    /// Swizzle the driver holds for a texture object.
    pub fn swizzle_of(&self, texture: GLuint) -> [GLint; 4] {
        self.swizzles
            .get(&texture)
            .copied()
            .unwrap_or(DEFAULT_SWIZZLE)
    }

    /// Source most recently given to a shader object.
    pub fn shader_source(&self, shader: GLuint) -> Option<&str> {
        self.shaders.get(&shader).map(|(_, source, _)| source.as_str())
    }

    /// Take the recording so far, leaving it empty.
    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }
}

/// [GraphicsBackend] implementation backed by a [Recorder].
#[derive(Clone)]
pub struct RecordingBackend {
    recorder: Arc<Mutex<Recorder>>,
}

impl RecordingBackend {
    pub fn new(profile: DriverProfile) -> RecordingBackend {
        RecordingBackend {
            recorder: Arc::new(Mutex::new(Recorder::new(profile))),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Recorder> {
        self.recorder.lock()
    }

    fn record(&self, call: Call) {
        self.recorder.lock().calls.push(call);
    }
}

unsafe fn copy_bytes(data: *const GLvoid, size: GLsizeiptr) -> Vec<u8> {
    if data.is_null() || size <= 0 {
        return Vec::new();
    }
    std::slice::from_raw_parts(data as *const u8, size as usize).to_vec()
}

unsafe fn copy_names(n: GLsizei, names: *const GLuint) -> Vec<GLuint> {
    if names.is_null() || n <= 0 {
        return Vec::new();
    }
    std::slice::from_raw_parts(names, n as usize).to_vec()
}

impl GraphicsBackend for RecordingBackend {
    fn description(&self) -> &'static str {
        "Recording OpenGL ES 3.x model"
    }

    fn is_loaded(&self, entry: OptionalEntry) -> bool {
        self.recorder.lock().entries.contains(&entry)
    }

    unsafe fn GetError(&mut self) -> GLenum {
        std::mem::replace(&mut self.recorder.lock().pending_error, gles32::NO_ERROR)
    }
    unsafe fn GetIntegerv(&mut self, pname: GLenum, params: *mut GLint) {
        let r = self.recorder.lock();
        let value = if let Some(target) = buffer_binding_target(pname) {
            r.bound_buffer(target) as GLint
        } else if let Some(target) = texture_binding_target(pname) {
            r.bound_texture(target) as GLint
        } else {
            match pname {
                gles32::MAX_TEXTURE_SIZE => r.max_texture_size,
                gles32::MAX_DRAW_BUFFERS => r.max_draw_buffers,
                gles32::NUM_EXTENSIONS => r.extensions.len() as GLint,
                gles32::CURRENT_PROGRAM => r.program as GLint,
                gles32::DRAW_FRAMEBUFFER_BINDING | gles32::READ_FRAMEBUFFER_BINDING => {
                    r.framebuffer as GLint
                }
                _ => 0,
            }
        };
        *params = value;
    }
    unsafe fn GetString(&mut self, name: GLenum) -> *const GLubyte {
        let r = self.recorder.lock();
        let s: &CStr = match name {
            gles32::VERSION => r.version.as_c_str(),
            gles32::SHADING_LANGUAGE_VERSION => r.shading_language_version.as_c_str(),
            gles32::VENDOR | gles32::RENDERER => r.vendor.as_c_str(),
            gles32::EXTENSIONS => r.extensions_string.as_c_str(),
            _ => return std::ptr::null(),
        };
        s.as_ptr() as *const GLubyte
    }
    unsafe fn GetStringi(&mut self, name: GLenum, index: GLuint) -> *const GLubyte {
        let r = self.recorder.lock();
        if name != gles32::EXTENSIONS {
            return std::ptr::null();
        }
        match r.extensions.get(index as usize) {
            Some(s) => s.as_ptr() as *const GLubyte,
            None => std::ptr::null(),
        }
    }
    unsafe fn Enable(&mut self, cap: GLenum) {
        self.record(Call::Enable(cap))
    }
    unsafe fn ClearDepthf(&mut self, depth: GLfloat) {
        self.record(Call::ClearDepthf(depth))
    }
    unsafe fn DepthRangef(&mut self, near: GLfloat, far: GLfloat) {
        self.record(Call::DepthRangef(near, far))
    }

    unsafe fn GenBuffers(&mut self, n: GLsizei, buffers: *mut GLuint) {
        let mut r = self.recorder.lock();
        let mut names = Vec::new();
        for i in 0..n.max(0) as usize {
            let name = r.gen_name();
            *buffers.add(i) = name;
            names.push(name);
        }
        r.calls.push(Call::GenBuffers(names));
    }
    unsafe fn BindBuffer(&mut self, target: GLenum, buffer: GLuint) {
        let mut r = self.recorder.lock();
        r.buffer_bindings.insert(target, buffer);
        r.calls.push(Call::BindBuffer(target, buffer));
    }
    unsafe fn BindBufferBase(&mut self, target: GLenum, index: GLuint, buffer: GLuint) {
        let mut r = self.recorder.lock();
        r.buffer_bindings.insert(target, buffer);
        r.calls.push(Call::BindBufferBase(target, index, buffer));
    }
    unsafe fn BindBufferRange(
        &mut self,
        target: GLenum,
        index: GLuint,
        buffer: GLuint,
        offset: GLintptr,
        size: GLsizeiptr,
    ) {
        let mut r = self.recorder.lock();
        r.buffer_bindings.insert(target, buffer);
        r.calls
            .push(Call::BindBufferRange(target, index, buffer, offset, size));
    }
    unsafe fn BufferData(
        &mut self,
        target: GLenum,
        size: GLsizeiptr,
        data: *const GLvoid,
        usage: GLenum,
    ) {
        let mut r = self.recorder.lock();
        let buffer = r.bound_buffer(target);
        r.buffer_sizes.insert(buffer, size);
        let data = if data.is_null() {
            None
        } else {
            Some(copy_bytes(data, size))
        };
        r.calls.push(Call::BufferData {
            target,
            size,
            data,
            usage,
        });
    }
    unsafe fn BufferSubData(
        &mut self,
        target: GLenum,
        offset: GLintptr,
        size: GLsizeiptr,
        data: *const GLvoid,
    ) {
        self.record(Call::BufferSubData {
            target,
            offset,
            data: copy_bytes(data, size),
        })
    }
    unsafe fn CopyBufferSubData(
        &mut self,
        read_target: GLenum,
        write_target: GLenum,
        read_offset: GLintptr,
        write_offset: GLintptr,
        size: GLsizeiptr,
    ) {
        self.record(Call::CopyBufferSubData {
            read_target,
            write_target,
            read_offset,
            write_offset,
            size,
        })
    }
    unsafe fn BufferStorageEXT(
        &mut self,
        target: GLenum,
        size: GLsizeiptr,
        _data: *const GLvoid,
        flags: GLbitfield,
    ) {
        let mut r = self.recorder.lock();
        let buffer = r.bound_buffer(target);
        r.buffer_sizes.insert(buffer, size);
        r.calls.push(Call::BufferStorageEXT {
            target,
            size,
            flags,
        });
    }
    unsafe fn MapBufferRange(
        &mut self,
        target: GLenum,
        offset: GLintptr,
        length: GLsizeiptr,
        access: GLbitfield,
    ) -> *mut GLvoid {
        self.record(Call::MapBufferRange {
            target,
            offset,
            length,
            access,
        });
        std::ptr::null_mut()
    }
    unsafe fn FlushMappedBufferRange(&mut self, target: GLenum, offset: GLintptr, length: GLsizeiptr) {
        self.record(Call::FlushMappedBufferRange(target, offset, length))
    }
    unsafe fn GetBufferParameteriv(&mut self, target: GLenum, pname: GLenum, params: *mut GLint) {
        let r = self.recorder.lock();
        *params = match pname {
            gles32::BUFFER_SIZE => {
                let buffer = r.bound_buffer(target);
                r.buffer_sizes.get(&buffer).copied().unwrap_or(0) as GLint
            }
            _ => 0,
        };
    }

    unsafe fn DrawArrays(&mut self, mode: GLenum, first: GLint, count: GLsizei) {
        self.record(Call::DrawArrays(mode, first, count))
    }
    unsafe fn DrawElements(
        &mut self,
        mode: GLenum,
        count: GLsizei,
        type_: GLenum,
        indices: *const GLvoid,
    ) {
        self.record(Call::DrawElements {
            mode,
            count,
            type_,
            offset: indices as usize,
        })
    }
    unsafe fn DrawElementsBaseVertex(
        &mut self,
        mode: GLenum,
        count: GLsizei,
        type_: GLenum,
        indices: *const GLvoid,
        basevertex: GLint,
    ) {
        self.record(Call::DrawElementsBaseVertex {
            entry: OptionalEntry::DrawElementsBaseVertex,
            mode,
            count,
            type_,
            offset: indices as usize,
            basevertex,
        })
    }
    unsafe fn DrawElementsBaseVertexOES(
        &mut self,
        mode: GLenum,
        count: GLsizei,
        type_: GLenum,
        indices: *const GLvoid,
        basevertex: GLint,
    ) {
        self.record(Call::DrawElementsBaseVertex {
            entry: OptionalEntry::DrawElementsBaseVertexOES,
            mode,
            count,
            type_,
            offset: indices as usize,
            basevertex,
        })
    }
    unsafe fn DrawElementsBaseVertexEXT(
        &mut self,
        mode: GLenum,
        count: GLsizei,
        type_: GLenum,
        indices: *const GLvoid,
        basevertex: GLint,
    ) {
        self.record(Call::DrawElementsBaseVertex {
            entry: OptionalEntry::DrawElementsBaseVertexEXT,
            mode,
            count,
            type_,
            offset: indices as usize,
            basevertex,
        })
    }
    unsafe fn DrawElementsIndirect(&mut self, mode: GLenum, type_: GLenum, indirect: *const GLvoid) {
        self.record(Call::DrawElementsIndirect {
            mode,
            type_,
            offset: indirect as usize,
        })
    }
    unsafe fn MultiDrawElementsIndirectEXT(
        &mut self,
        mode: GLenum,
        type_: GLenum,
        indirect: *const GLvoid,
        drawcount: GLsizei,
        stride: GLsizei,
    ) {
        self.record(Call::MultiDrawElementsIndirectEXT {
            mode,
            type_,
            offset: indirect as usize,
            drawcount,
            stride,
        })
    }

    unsafe fn BindTexture(&mut self, target: GLenum, texture: GLuint) {
        let mut r = self.recorder.lock();
        r.texture_bindings.insert(target, texture);
        r.calls.push(Call::BindTexture(target, texture));
    }
    unsafe fn DeleteTextures(&mut self, n: GLsizei, textures: *const GLuint) {
        let names = copy_names(n, textures);
        let mut r = self.recorder.lock();
        for name in &names {
            r.swizzles.remove(name);
            r.texture_bindings.retain(|_, bound| bound != name);
        }
        r.calls.push(Call::DeleteTextures(names));
    }
    unsafe fn TexParameteri(&mut self, target: GLenum, pname: GLenum, param: GLint) {
        let mut r = self.recorder.lock();
        let is_face =
            (gles32::TEXTURE_CUBE_MAP_POSITIVE_X..=gles32::TEXTURE_CUBE_MAP_NEGATIVE_Z)
                .contains(&target);
        if is_face {
            // Faces aren't texture objects, so they have no parameters.
            r.pending_error = gles32::INVALID_ENUM;
        } else if let Some(channel) = swizzle_channel(pname) {
            let texture = r.bound_texture(target);
            let mut swizzle = r.swizzle_of(texture);
            swizzle[channel] = param;
            r.swizzles.insert(texture, swizzle);
        }
        r.calls.push(Call::TexParameteri(target, pname, param));
    }
    unsafe fn TexParameteriv(&mut self, target: GLenum, pname: GLenum, params: *const GLint) {
        self.record(Call::TexParameteriv(target, pname, *params))
    }
    unsafe fn TexParameterf(&mut self, target: GLenum, pname: GLenum, param: GLfloat) {
        self.record(Call::TexParameterf(target, pname, param))
    }
    unsafe fn TexParameterfv(&mut self, target: GLenum, pname: GLenum, params: *const GLfloat) {
        self.record(Call::TexParameterfv(target, pname, *params))
    }
    unsafe fn GetTexParameteriv(&mut self, target: GLenum, pname: GLenum, params: *mut GLint) {
        let r = self.recorder.lock();
        *params = match swizzle_channel(pname) {
            Some(channel) => r.swizzle_of(r.bound_texture(target))[channel],
            None => 0,
        };
    }
    unsafe fn GetTexLevelParameteriv(
        &mut self,
        _target: GLenum,
        _level: GLint,
        _pname: GLenum,
        params: *mut GLint,
    ) {
        *params = 0;
    }
    unsafe fn TexImage2D(
        &mut self,
        target: GLenum,
        level: GLint,
        internalformat: GLint,
        width: GLsizei,
        height: GLsizei,
        _border: GLint,
        format: GLenum,
        type_: GLenum,
        pixels: *const GLvoid,
    ) {
        self.record(Call::TexImage2D {
            target,
            level,
            internalformat,
            width,
            height,
            format,
            type_,
            has_pixels: !pixels.is_null(),
        })
    }
    unsafe fn TexSubImage2D(
        &mut self,
        target: GLenum,
        level: GLint,
        _xoffset: GLint,
        _yoffset: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        type_: GLenum,
        _pixels: *const GLvoid,
    ) {
        self.record(Call::TexSubImage2D {
            target,
            level,
            width,
            height,
            format,
            type_,
        })
    }
    unsafe fn TexBuffer(&mut self, target: GLenum, internalformat: GLenum, buffer: GLuint) {
        self.record(Call::TexBuffer {
            entry: OptionalEntry::TexBuffer,
            target,
            internalformat,
            buffer,
            range: None,
        })
    }
    unsafe fn TexBufferEXT(&mut self, target: GLenum, internalformat: GLenum, buffer: GLuint) {
        self.record(Call::TexBuffer {
            entry: OptionalEntry::TexBufferEXT,
            target,
            internalformat,
            buffer,
            range: None,
        })
    }
    unsafe fn TexBufferRange(
        &mut self,
        target: GLenum,
        internalformat: GLenum,
        buffer: GLuint,
        offset: GLintptr,
        size: GLsizeiptr,
    ) {
        self.record(Call::TexBuffer {
            entry: OptionalEntry::TexBufferRange,
            target,
            internalformat,
            buffer,
            range: Some((offset, size)),
        })
    }
    unsafe fn TexBufferRangeEXT(
        &mut self,
        target: GLenum,
        internalformat: GLenum,
        buffer: GLuint,
        offset: GLintptr,
        size: GLsizeiptr,
    ) {
        self.record(Call::TexBuffer {
            entry: OptionalEntry::TexBufferRangeEXT,
            target,
            internalformat,
            buffer,
            range: Some((offset, size)),
        })
    }

    unsafe fn CreateShader(&mut self, type_: GLenum) -> GLuint {
        let mut r = self.recorder.lock();
        let name = r.gen_name();
        r.shaders.insert(name, (type_, String::new(), false));
        r.calls.push(Call::CreateShader(type_, name));
        name
    }
    unsafe fn DeleteShader(&mut self, shader: GLuint) {
        let mut r = self.recorder.lock();
        r.shaders.remove(&shader);
        r.calls.push(Call::DeleteShader(shader));
    }
    unsafe fn ShaderSource(
        &mut self,
        shader: GLuint,
        count: GLsizei,
        string: *const *const GLchar,
        length: *const GLint,
    ) {
        let mut source = String::new();
        for i in 0..count.max(0) as usize {
            let s = *string.add(i);
            let len = if length.is_null() { -1 } else { *length.add(i) };
            if len < 0 {
                source.push_str(&CStr::from_ptr(s).to_string_lossy());
            } else {
                let bytes = std::slice::from_raw_parts(s as *const u8, len as usize);
                source.push_str(&String::from_utf8_lossy(bytes));
            }
        }
        let mut r = self.recorder.lock();
        if let Some(entry) = r.shaders.get_mut(&shader) {
            entry.1 = source.clone();
        }
        r.calls.push(Call::ShaderSource(shader, source));
    }
    unsafe fn CompileShader(&mut self, shader: GLuint) {
        let mut r = self.recorder.lock();
        let ok = r.compile_succeeds;
        if let Some(entry) = r.shaders.get_mut(&shader) {
            entry.2 = ok;
        }
        r.calls.push(Call::CompileShader(shader));
    }
    unsafe fn GetShaderiv(&mut self, shader: GLuint, pname: GLenum, params: *mut GLint) {
        let r = self.recorder.lock();
        let Some(&(type_, _, compiled)) = r.shaders.get(&shader) else {
            *params = 0;
            return;
        };
        *params = match pname {
            gles32::COMPILE_STATUS => GLint::from(compiled),
            gles32::SHADER_TYPE => type_ as GLint,
            gles32::INFO_LOG_LENGTH if !compiled => INFO_LOG.len() as GLint + 1,
            _ => 0,
        };
    }
    unsafe fn GetShaderInfoLog(
        &mut self,
        _shader: GLuint,
        buf_size: GLsizei,
        length: *mut GLsizei,
        info_log: *mut GLchar,
    ) {
        if buf_size <= 0 || info_log.is_null() {
            return;
        }
        let n = INFO_LOG.len().min(buf_size as usize - 1);
        std::ptr::copy_nonoverlapping(INFO_LOG.as_ptr() as *const GLchar, info_log, n);
        *info_log.add(n) = 0;
        if !length.is_null() {
            *length = n as GLsizei;
        }
    }
    unsafe fn CreateProgram(&mut self) -> GLuint {
        let mut r = self.recorder.lock();
        let name = r.gen_name();
        r.calls.push(Call::CreateProgram(name));
        name
    }
    unsafe fn DeleteProgram(&mut self, program: GLuint) {
        self.record(Call::DeleteProgram(program))
    }
    unsafe fn AttachShader(&mut self, program: GLuint, shader: GLuint) {
        self.record(Call::AttachShader(program, shader))
    }
    unsafe fn DetachShader(&mut self, program: GLuint, shader: GLuint) {
        self.record(Call::DetachShader(program, shader))
    }
    unsafe fn LinkProgram(&mut self, program: GLuint) {
        self.record(Call::LinkProgram(program))
    }
    unsafe fn UseProgram(&mut self, program: GLuint) {
        let mut r = self.recorder.lock();
        r.program = program;
        r.calls.push(Call::UseProgram(program));
    }

    unsafe fn BindFramebuffer(&mut self, target: GLenum, framebuffer: GLuint) {
        let mut r = self.recorder.lock();
        r.framebuffer = framebuffer;
        r.calls.push(Call::BindFramebuffer(target, framebuffer));
    }
    unsafe fn DeleteFramebuffers(&mut self, n: GLsizei, framebuffers: *const GLuint) {
        self.record(Call::DeleteFramebuffers(copy_names(n, framebuffers)))
    }
    unsafe fn FramebufferTexture2D(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        textarget: GLenum,
        texture: GLuint,
        level: GLint,
    ) {
        self.record(Call::FramebufferTexture2D {
            target,
            attachment,
            textarget,
            texture,
            level,
        })
    }
    unsafe fn DrawBuffers(&mut self, n: GLsizei, bufs: *const GLenum) {
        self.record(Call::DrawBuffers(copy_names(n, bufs)))
    }
    unsafe fn RenderbufferStorage(
        &mut self,
        target: GLenum,
        internalformat: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) {
        self.record(Call::RenderbufferStorage {
            target,
            internalformat,
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swizzle_follows_binding() {
        let mut gl = RecordingBackend::new(DriverProfile::es30());
        let mut value = 0;
        unsafe {
            gl.BindTexture(gles32::TEXTURE_2D, 5);
            gl.TexParameteri(
                gles32::TEXTURE_2D,
                gles32::TEXTURE_SWIZZLE_R,
                gles32::BLUE as GLint,
            );
            gl.BindTexture(gles32::TEXTURE_2D, 6);
            gl.GetTexParameteriv(gles32::TEXTURE_2D, gles32::TEXTURE_SWIZZLE_R, &mut value);
        }
        assert_eq!(value, gles32::RED as GLint);
        assert_eq!(gl.lock().swizzle_of(5)[0], gles32::BLUE as GLint);
    }

    #[test]
    fn queries_are_not_recorded() {
        let mut gl = RecordingBackend::new(DriverProfile::es32());
        let mut n = 0;
        unsafe {
            gl.GetIntegerv(gles32::NUM_EXTENSIONS, &mut n);
            let ext = CStr::from_ptr(gl.GetStringi(gles32::EXTENSIONS, 0) as *const _);
            assert_eq!(ext.to_str(), Ok("GL_EXT_buffer_storage"));
        }
        assert_eq!(n, 3);
        assert!(gl.lock().calls.is_empty());
    }
}
