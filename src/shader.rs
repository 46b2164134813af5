/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Shaders and programs.
//!
//! Applications hand us desktop GLSL. Every source goes through a
//! [ShaderTransform] to become ESSL the driver accepts, with the results kept
//! in a [cache::ShaderCache] shared by all contexts.
//!
//! Desktop GL lets a program bind fragment outputs to color numbers by name
//! (`glBindFragDataLocation`) at any time before linking. ESSL only has
//! `layout(location = N)` in the source, so the translator leaves a marker
//! comment in front of each output and [link_program] fills them in, compiling
//! a patched copy of the fragment shader if any output was bound.

pub mod cache;
pub mod patch;

use crate::context::{Context, MAX_DRAWBUFFERS};
use crate::gles::gles32_raw as gles32;
use crate::gles::gles32_raw::types::*;
use cache::{hash_source, ShaderCache};
use parking_lot::Mutex;
use std::sync::Arc;

/// The GLSL version applications' sources are translated from.
pub const SOURCE_GLSL_VERSION: GLint = 460;

/// Translates desktop GLSL into ESSL.
pub trait ShaderTransform: Send + Sync {
    /// `essl_version` is the driver's ESSL version times 100.
    fn transform(
        &self,
        source: &str,
        shader_type: GLenum,
        glsl_version: GLint,
        essl_version: GLint,
    ) -> String;
}

lazy_static::lazy_static! {
    static ref GLOBAL_CACHE: Arc<Mutex<ShaderCache>> = Arc::new(Mutex::new(ShaderCache::new()));
}

/// A transform plus the cache in front of it.
#[derive(Clone)]
pub struct ShaderPipeline {
    cache: Arc<Mutex<ShaderCache>>,
    transform: Arc<dyn ShaderTransform>,
}

impl ShaderPipeline {
    /// The process-wide cache in front of the translator linked into the
    /// process, or in front of nothing if there isn't one.
    pub fn process_default() -> ShaderPipeline {
        let transform: Arc<dyn ShaderTransform> = match patch::ExternalTransform::load() {
            Ok(transform) => Arc::new(transform),
            Err(e) => {
                log!("{}. Shaders will be passed through untranslated.", e);
                Arc::new(patch::Passthrough)
            }
        };
        ShaderPipeline {
            cache: GLOBAL_CACHE.clone(),
            transform,
        }
    }

    /// A pipeline with a private cache.
    pub fn new(transform: Arc<dyn ShaderTransform>) -> ShaderPipeline {
        ShaderPipeline {
            cache: Arc::new(Mutex::new(ShaderCache::new())),
            transform,
        }
    }

    pub fn passthrough() -> ShaderPipeline {
        Self::new(Arc::new(patch::Passthrough))
    }

    pub fn cache(&self) -> &Mutex<ShaderCache> {
        &self.cache
    }

    /// Translate a source, reusing an earlier translation of the same text.
    pub fn process(&self, source: &str, shader_type: GLenum, essl_version: GLint) -> String {
        let hash = hash_source(source);
        if let Some(cached) = self.cache.lock().get(hash, shader_type) {
            return cached;
        }
        // The transform can be slow, so don't hold the lock over it.
        let translated =
            self.transform
                .transform(source, shader_type, SOURCE_GLSL_VERSION, essl_version);
        self.cache.lock().insert(hash, shader_type, &translated);
        translated
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShaderInfo {
    pub shader_type: GLenum,
    /// The translated source last given to the driver.
    pub source: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgramInfo {
    /// Output names bound with `glBindFragDataLocation`, by color number.
    pub frag_data_names: [Option<String>; MAX_DRAWBUFFERS],
    /// The fragment shader attached last, or 0.
    pub frag_shader: GLuint,
}

pub unsafe fn create_shader(ctx: &mut Context, shader_type: GLenum) -> GLuint {
    let shader = ctx.gl.CreateShader(shader_type);
    if shader == 0 {
        return 0;
    }
    let info = ShaderInfo {
        shader_type,
        source: None,
    };
    if let Err(e) = ctx.shader_infos.insert(shader as usize, info) {
        panic!("Failed to allocate shader info: {}", e);
    }
    shader
}

pub unsafe fn delete_shader(ctx: &mut Context, shader: GLuint) {
    ctx.gl.DeleteShader(shader);
    ctx.shader_infos.remove(shader as usize);
}

/// Join the strings of a `glShaderSource` call. A null `length`, or a
/// negative entry in it, means the string is NUL-terminated.
pub unsafe fn collect_source(
    count: GLsizei,
    string: *const *const GLchar,
    length: *const GLint,
) -> String {
    let mut source = String::new();
    if string.is_null() {
        return source;
    }
    for i in 0..count.max(0) as usize {
        let part = *string.add(i);
        if part.is_null() {
            continue;
        }
        let len = if length.is_null() { -1 } else { *length.add(i) };
        if len < 0 {
            source.push_str(&std::ffi::CStr::from_ptr(part).to_string_lossy());
        } else {
            let bytes = std::slice::from_raw_parts(part as *const u8, len as usize);
            source.push_str(&String::from_utf8_lossy(bytes));
        }
    }
    source
}

unsafe fn send_source(ctx: &mut Context, shader: GLuint, source: &str) {
    let ptr = source.as_ptr() as *const GLchar;
    let len = source.len() as GLint;
    ctx.gl.ShaderSource(shader, 1, &ptr, &len);
}

/// Translate and upload a shader's source. Shaders we have no record of are
/// passed to the driver as they are.
pub unsafe fn shader_source(ctx: &mut Context, shader: GLuint, source: &str) {
    let Some(shader_type) = ctx
        .shader_infos
        .get(shader as usize)
        .map(|info| info.shader_type)
    else {
        log!("No info for shader {}, passing its source through", shader);
        send_source(ctx, shader, source);
        return;
    };
    let translated = ctx.shaders.process(source, shader_type, ctx.shader_version);
    send_source(ctx, shader, &translated);
    if let Some(info) = ctx.shader_infos.get_mut(shader as usize) {
        info.source = Some(translated);
    }
}

/// Fragment shaders always report that they compiled: some drivers refuse
/// to compile them until their outputs have locations, which only happens at
/// link time.
pub unsafe fn get_shaderiv(ctx: &mut Context, shader: GLuint, pname: GLenum, params: &mut GLint) {
    let is_fragment = ctx
        .shader_infos
        .get(shader as usize)
        .is_some_and(|info| info.shader_type == gles32::FRAGMENT_SHADER);
    if is_fragment && pname == gles32::COMPILE_STATUS {
        *params = gles32::TRUE as GLint;
        return;
    }
    ctx.gl.GetShaderiv(shader, pname, params);
}

pub unsafe fn create_program(ctx: &mut Context) -> GLuint {
    let program = ctx.gl.CreateProgram();
    if program == 0 {
        return 0;
    }
    if let Err(e) = ctx
        .program_infos
        .insert(program as usize, ProgramInfo::default())
    {
        panic!("Failed to allocate program info: {}", e);
    }
    program
}

pub unsafe fn delete_program(ctx: &mut Context, program: GLuint) {
    ctx.gl.DeleteProgram(program);
    ctx.program_infos.remove(program as usize);
}

pub unsafe fn attach_shader(ctx: &mut Context, program: GLuint, shader: GLuint) {
    ctx.gl.AttachShader(program, shader);
    let is_fragment = ctx
        .shader_infos
        .get(shader as usize)
        .is_some_and(|info| info.shader_type == gles32::FRAGMENT_SHADER);
    if !is_fragment {
        return;
    }
    if let Some(info) = ctx.program_infos.get_mut(program as usize) {
        info.frag_shader = shader;
    }
}

pub fn bind_frag_data_location(ctx: &mut Context, program: GLuint, color: GLuint, name: &str) {
    let Some(info) = ctx.program_infos.get_mut(program as usize) else {
        return;
    };
    let Some(slot) = info.frag_data_names.get_mut(color as usize) else {
        log_dbg!("Color number {} out of range for {:?}", color, name);
        return;
    };
    *slot = Some(name.to_string());
}

pub unsafe fn use_program(ctx: &mut Context, program: GLuint) {
    ctx.gl.UseProgram(program);
    ctx.program = program;
}

unsafe fn shader_info_log(ctx: &mut Context, shader: GLuint) -> String {
    let mut length = 0;
    ctx.gl
        .GetShaderiv(shader, gles32::INFO_LOG_LENGTH, &mut length);
    if length <= 0 {
        return String::new();
    }
    let mut buffer = vec![0 as GLchar; length as usize];
    let mut written = 0;
    ctx.gl
        .GetShaderInfoLog(shader, length, &mut written, buffer.as_mut_ptr());
    let bytes: Vec<u8> = buffer[..written.clamp(0, length) as usize]
        .iter()
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// The source of `program`'s fragment shader with output locations filled in,
/// or [None] if there is nothing to patch.
fn patched_frag_source(ctx: &Context, program: GLuint) -> Option<(GLuint, String)> {
    let info = ctx.program_infos.get(program as usize)?;
    if info.frag_shader == 0 {
        return None;
    }
    let Some(source) = ctx
        .shader_infos
        .get(info.frag_shader as usize)
        .and_then(|shader| shader.source.as_deref())
    else {
        log!(
            "Can't place fragment outputs of program {}: no source for shader {}",
            program,
            info.frag_shader
        );
        return None;
    };
    patch::insert_frag_locations(source, &info.frag_data_names)
        .map(|patched| (info.frag_shader, patched))
}

pub unsafe fn link_program(ctx: &mut Context, program: GLuint) {
    let Some((frag_shader, patched)) = patched_frag_source(ctx, program) else {
        ctx.gl.LinkProgram(program);
        return;
    };

    let patched_shader = ctx.gl.CreateShader(gles32::FRAGMENT_SHADER);
    if patched_shader == 0 {
        log!("Failed to create patched fragment shader for program {}", program);
        ctx.gl.LinkProgram(program);
        return;
    }
    send_source(ctx, patched_shader, &patched);
    ctx.gl.CompileShader(patched_shader);
    let mut status = 0;
    ctx.gl
        .GetShaderiv(patched_shader, gles32::COMPILE_STATUS, &mut status);
    if status != gles32::TRUE as GLint {
        let info_log = shader_info_log(ctx, patched_shader);
        log!(
            "Failed to compile patched fragment shader, using the original. Log:\n\n{}\n\nShader content:\n\n{}\n",
            info_log,
            patched
        );
        ctx.gl.DeleteShader(patched_shader);
        ctx.gl.LinkProgram(program);
        return;
    }

    ctx.gl.DetachShader(program, frag_shader);
    ctx.gl.AttachShader(program, patched_shader);
    ctx.gl.LinkProgram(program);
    ctx.gl.DeleteShader(patched_shader);
}
