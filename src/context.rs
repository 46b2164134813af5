/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Per-context emulation state.
//!
//! There is one [Context] per native context created through the shim. It owns
//! the driver the context issues its calls to, the shadows of the bits of GL
//! state we need to know without asking the driver, and the metadata records
//! for shaders, programs, framebuffers and swizzled textures.
//!
//! Some of the state can only be queried with the context current, so setup
//! happens in two steps: [Context::new] when the context is created, and
//! [Context::init_in_context] on its first successful bind.

use crate::draw::base_vertex::BaseVertexRenderer;
use crate::draw::ring::ScratchRing;
use crate::error::ShimError;
use crate::extensions::Extensions;
use crate::framebuffer::FramebufferInfo;
use crate::gles::gles32_raw as gles32;
use crate::gles::gles32_raw::types::*;
use crate::gles::{GraphicsBackend, OptionalEntry};
use crate::int_map::IntMap;
use crate::options::Options;
use crate::pool::PooledMap;
use crate::shader::{ProgramInfo, ShaderInfo, ShaderPipeline};
use crate::swizzle::{SwizzleBatch, SwizzleTrack};
use crate::texture::{FormatCache, ProxyTexture};
use std::ffi::CStr;

/// Number of non-indexed buffer targets that are shadowed.
pub const MAX_BOUND_BUFFERS: usize = 9;
/// Number of indexed buffer targets that are shadowed.
pub const MAX_BOUND_BASEBUFFERS: usize = 4;
/// Ceiling for `GL_MAX_DRAW_BUFFERS`.
pub const MAX_DRAWBUFFERS: usize = 8;
/// Number of color attachments tracked per framebuffer.
pub const MAX_FBTARGETS: usize = 8;

/// What the driver can do beyond OpenGL ES 3.0.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub es31: bool,
    pub es32: bool,
    /// `GL_EXT_buffer_storage`
    pub buffer_storage: bool,
    /// `GL_EXT_texture_buffer`
    pub buffer_texture_ext: bool,
    /// `GL_EXT_multi_draw_indirect`
    pub multidraw_indirect: bool,
}

/// The driver's own `glDrawElementsBaseVertex`, if any.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BaseVertexEntry {
    Core,
    Oes,
    Ext,
}

impl BaseVertexEntry {
    pub fn optional_entry(self) -> OptionalEntry {
        match self {
            BaseVertexEntry::Core => OptionalEntry::DrawElementsBaseVertex,
            BaseVertexEntry::Oes => OptionalEntry::DrawElementsBaseVertexOES,
            BaseVertexEntry::Ext => OptionalEntry::DrawElementsBaseVertexEXT,
        }
    }
}

/// A buffer bound to one binding point of an indexed target.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BaseBufferBinding {
    pub index: GLuint,
    pub buffer: GLuint,
    /// `(offset, size)` if bound with `glBindBufferRange`.
    pub range: Option<(GLintptr, GLsizeiptr)>,
}

/// Slot of a non-indexed buffer target in [Context::bound_buffers].
pub fn buffer_index(target: GLenum) -> Option<usize> {
    Some(match target {
        gles32::ARRAY_BUFFER => 0,
        gles32::COPY_READ_BUFFER => 1,
        gles32::COPY_WRITE_BUFFER => 2,
        gles32::PIXEL_PACK_BUFFER => 3,
        gles32::PIXEL_UNPACK_BUFFER => 4,
        gles32::TRANSFORM_FEEDBACK_BUFFER => 5,
        gles32::UNIFORM_BUFFER => 6,
        gles32::SHADER_STORAGE_BUFFER => 7,
        gles32::DRAW_INDIRECT_BUFFER => 8,
        _ => return None,
    })
}

/// Slot of an indexed buffer target in [Context::base_buffers].
pub fn base_buffer_index(target: GLenum) -> Option<usize> {
    Some(match target {
        gles32::ATOMIC_COUNTER_BUFFER => 0,
        gles32::SHADER_STORAGE_BUFFER => 1,
        gles32::TRANSFORM_FEEDBACK_BUFFER => 2,
        gles32::UNIFORM_BUFFER => 3,
        _ => return None,
    })
}

/// Parse `"<prefix>X.Y"` the way `sscanf(" <prefix>%i.%i")` would, leaving
/// components that can't be parsed at their defaults.
pub fn scan_version(string: &str, prefix: &str, default: (i32, i32)) -> (i32, i32) {
    let Some(rest) = string.trim_start().strip_prefix(prefix) else {
        return default;
    };
    let rest = rest.trim_start();
    let digits = |s: &str| -> Option<(i32, usize)> {
        let end = s
            .char_indices()
            .find(|&(_, c)| !c.is_ascii_digit())
            .map_or(s.len(), |(i, _)| i);
        s[..end].parse().ok().map(|v| (v, end))
    };
    let Some((major, end)) = digits(rest) else {
        return default;
    };
    let minor = rest[end..]
        .strip_prefix('.')
        .and_then(digits)
        .map_or(default.1, |(minor, _)| minor);
    (major, minor)
}

pub struct Context {
    pub(crate) gl: Box<dyn GraphicsBackend + Send>,
    pub options: Options,
    pub(crate) shaders: ShaderPipeline,
    /// Set once [Context::init_in_context] has run.
    pub ready: bool,
    pub caps: Capabilities,
    /// [None] if base-vertex draws must be emulated.
    pub base_vertex_entry: Option<BaseVertexEntry>,
    /// ESSL version times 100, e.g. 320.
    pub shader_version: GLint,
    pub max_texture_size: GLint,
    pub max_draw_buffers: GLint,
    /// `GL_NUM_EXTENSIONS` as reported by the driver.
    pub native_extension_count: GLint,
    pub bound_buffers: [GLuint; MAX_BOUND_BUFFERS],
    pub base_buffers: [IntMap<BaseBufferBinding>; MAX_BOUND_BASEBUFFERS],
    pub program: GLuint,
    pub draw_framebuffer: GLuint,
    pub read_framebuffer: GLuint,
    pub shader_infos: PooledMap<ShaderInfo>,
    pub program_infos: PooledMap<ProgramInfo>,
    pub framebuffer_infos: PooledMap<FramebufferInfo>,
    pub swizzle_tracks: PooledMap<SwizzleTrack>,
    extensions: Option<Extensions>,
    pub basevertex: BaseVertexRenderer,
    pub ring: ScratchRing,
    pub format_cache: FormatCache,
    pub swizzle_batch: SwizzleBatch,
    pub proxy: ProxyTexture,
}

fn pooled<T>(chunk_objects: usize, what: &str) -> Result<PooledMap<T>, ShimError> {
    PooledMap::new(chunk_objects)
        .map_err(|e| ShimError::OutOfMemory(format!("{} pool: {}", what, e)))
}

impl Context {
    /// Build the state for a freshly created native context. Nothing is sent
    /// to the driver here, since the context isn't current yet.
    pub fn new(
        gl: Box<dyn GraphicsBackend + Send>,
        options: Options,
        shaders: ShaderPipeline,
    ) -> Result<Context, ShimError> {
        Ok(Context {
            gl,
            options,
            shaders,
            ready: false,
            caps: Capabilities::default(),
            base_vertex_entry: None,
            shader_version: 0,
            max_texture_size: 0,
            max_draw_buffers: 0,
            native_extension_count: 0,
            bound_buffers: [0; MAX_BOUND_BUFFERS],
            base_buffers: Default::default(),
            program: 0,
            draw_framebuffer: 0,
            read_framebuffer: 0,
            shader_infos: pooled(64, "shader")?,
            program_infos: pooled(32, "program")?,
            framebuffer_infos: pooled(32, "framebuffer")?,
            swizzle_tracks: pooled(128, "swizzle track")?,
            extensions: None,
            basevertex: BaseVertexRenderer::default(),
            ring: ScratchRing::default(),
            format_cache: FormatCache::default(),
            swizzle_batch: SwizzleBatch::default(),
            proxy: ProxyTexture::default(),
        })
    }

    /// Query limits and capabilities and set up the emulation paths that need
    /// driver objects. Must be called with this context current.
    pub fn init_in_context(&mut self) {
        unsafe {
            self.gl
                .GetIntegerv(gles32::MAX_TEXTURE_SIZE, &mut self.max_texture_size);
            self.gl
                .GetIntegerv(gles32::MAX_DRAW_BUFFERS, &mut self.max_draw_buffers);
            self.gl
                .GetIntegerv(gles32::NUM_EXTENSIONS, &mut self.native_extension_count);
        }
        self.max_draw_buffers = self.max_draw_buffers.min(MAX_DRAWBUFFERS as GLint);

        self.detect_version();
        self.basevertex = BaseVertexRenderer::init(self);

        unsafe {
            self.ring = ScratchRing::init(&mut *self.gl, self.bound_buffers[2]);
        }

        self.format_cache.clear();
        self.swizzle_batch = SwizzleBatch::default();
        self.ready = true;
        log_dbg!(
            "Context ready on {}: max texture size {}, {} draw buffers, {} extensions",
            self.gl.description(),
            self.max_texture_size,
            self.max_draw_buffers,
            self.native_extension_count
        );
    }

    unsafe fn get_string(&mut self, name: GLenum) -> String {
        let ptr = self.gl.GetString(name);
        if ptr.is_null() {
            return String::new();
        }
        CStr::from_ptr(ptr as *const _).to_string_lossy().into_owned()
    }

    /// Work out the OpenGL ES and ESSL versions, the extensions we care about
    /// and which native base-vertex entry point to use, if any.
    pub fn detect_version(&mut self) {
        let (version, shading_language_version) = unsafe {
            (
                self.get_string(gles32::VERSION),
                self.get_string(gles32::SHADING_LANGUAGE_VERSION),
            )
        };
        let (major, minor) = scan_version(&version, "OpenGL ES", (0, 0));
        let (sl_major, sl_minor) =
            scan_version(&shading_language_version, "OpenGL ES GLSL ES", (3, 0));
        self.shader_version = sl_major * 100 + sl_minor;
        log!(
            "Running on OpenGL ES {}.{} with ESSL {}",
            major,
            minor,
            self.shader_version
        );
        if (major, minor) == (0, 0) {
            log!("Failed to detect OpenGL ES version from {:?}", version);
            return;
        }
        if major < 3 || self.shader_version < 300 {
            log!("Unsupported OpenGL ES version. This will cause you problems down the line.");
            return;
        }
        if major == 3 {
            self.caps.es31 = minor >= 1;
            self.caps.es32 = minor >= 2;
        } else {
            self.caps.es31 = true;
            self.caps.es32 = true;
        }

        let extensions = unsafe { self.get_string(gles32::EXTENSIONS) };
        self.caps.buffer_storage = extensions.contains("GL_EXT_buffer_storage");
        self.caps.buffer_texture_ext = extensions.contains("GL_EXT_texture_buffer");
        self.caps.multidraw_indirect = extensions.contains("GL_EXT_multi_draw_indirect");
        let basevertex_oes = extensions.contains("GL_OES_draw_elements_base_vertex");
        let basevertex_ext = extensions.contains("GL_EXT_draw_elements_base_vertex");

        let candidate = if self.caps.es32 {
            Some(BaseVertexEntry::Core)
        } else if basevertex_oes {
            Some(BaseVertexEntry::Oes)
        } else if basevertex_ext {
            Some(BaseVertexEntry::Ext)
        } else {
            None
        };
        self.base_vertex_entry =
            candidate.filter(|entry| self.gl.is_loaded(entry.optional_entry()));
        if candidate.is_some() && self.base_vertex_entry.is_none() {
            log!("Driver advertises base-vertex draws but the entry point is missing");
        }
    }

    /// The augmented extension list, built on first use.
    pub fn extensions(&mut self) -> &Extensions {
        let gl = &mut self.gl;
        let caps = &self.caps;
        let hide_buffer_storage = self.options.hide_buffer_storage;
        self.extensions
            .get_or_insert_with(|| unsafe { Extensions::build(&mut **gl, caps, hide_buffer_storage) })
    }

    /// Shadowed binding of a non-indexed buffer target. Targets that aren't
    /// shadowed read as 0.
    pub fn bound_buffer(&self, target: GLenum) -> GLuint {
        buffer_index(target).map_or(0, |i| self.bound_buffers[i])
    }

    /// Ask the driver for an integer state value.
    pub(crate) unsafe fn get_integer(&mut self, pname: GLenum) -> GLint {
        let mut value = 0;
        self.gl.GetIntegerv(pname, &mut value);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gles::{DriverProfile, RecordingBackend};

    fn context(profile: DriverProfile) -> (Context, RecordingBackend) {
        let gl = RecordingBackend::new(profile);
        let ctx = Context::new(
            Box::new(gl.clone()),
            Options::default(),
            ShaderPipeline::passthrough(),
        )
        .unwrap();
        (ctx, gl)
    }

    #[test]
    fn version_scanning() {
        assert_eq!(scan_version("OpenGL ES 3.2 V@0502", "OpenGL ES", (0, 0)), (3, 2));
        assert_eq!(scan_version("  OpenGL ES 3.1", "OpenGL ES", (0, 0)), (3, 1));
        assert_eq!(scan_version("OpenGL ES 3", "OpenGL ES", (0, 0)), (3, 0));
        assert_eq!(scan_version("OpenGL 4.6", "OpenGL ES", (0, 0)), (0, 0));
        assert_eq!(
            scan_version("OpenGL ES GLSL ES 3.20", "OpenGL ES GLSL ES", (3, 0)),
            (3, 20)
        );
        assert_eq!(scan_version("garbage", "OpenGL ES GLSL ES", (3, 0)), (3, 0));
    }

    #[test]
    fn es32_detection() {
        let (mut ctx, _gl) = context(DriverProfile::es32());
        ctx.init_in_context();
        assert!(ctx.ready);
        assert_eq!(
            ctx.caps,
            Capabilities {
                es31: true,
                es32: true,
                buffer_storage: true,
                buffer_texture_ext: true,
                multidraw_indirect: true,
            }
        );
        assert_eq!(ctx.shader_version, 320);
        assert_eq!(ctx.base_vertex_entry, Some(BaseVertexEntry::Core));
        assert_eq!(ctx.max_texture_size, 4096);
        assert_eq!(ctx.native_extension_count, 3);
        // A native entry point means no indirect buffer.
        assert!(!ctx.basevertex.ready);
    }

    #[test]
    fn es31_detection() {
        let (mut ctx, _gl) = context(DriverProfile::es31());
        ctx.init_in_context();
        assert!(ctx.caps.es31 && !ctx.caps.es32);
        assert_eq!(ctx.base_vertex_entry, None);
        assert!(ctx.basevertex.ready);
        assert_eq!(ctx.shader_version, 310);
    }

    #[test]
    fn scratch_ring_allocated_and_binding_restored() {
        let (mut ctx, gl) = context(DriverProfile::es30());
        ctx.init_in_context();
        assert_eq!(ctx.ring.size, 256 * 1024);
        assert_ne!(ctx.ring.buffer, 0);
        assert_eq!(gl.lock().bound_buffer(gles32::COPY_WRITE_BUFFER), 0);
        // No ES 3.1, so no indirect draws.
        assert!(!ctx.basevertex.ready);
    }

    #[test]
    fn draw_buffers_clamped() {
        let (mut ctx, gl) = context(DriverProfile::es32());
        gl.lock().max_draw_buffers = 16;
        ctx.init_in_context();
        assert_eq!(ctx.max_draw_buffers, MAX_DRAWBUFFERS as GLint);
    }

    #[test]
    fn buffer_slots() {
        assert_eq!(buffer_index(gles32::DRAW_INDIRECT_BUFFER), Some(8));
        assert_eq!(buffer_index(gles32::ELEMENT_ARRAY_BUFFER), None);
        assert_eq!(base_buffer_index(gles32::UNIFORM_BUFFER), Some(3));
        assert_eq!(base_buffer_index(gles32::ARRAY_BUFFER), None);
    }
}
