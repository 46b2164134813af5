/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Textures: desktop-only targets, formats and parameters.
//!
//! - Proxy textures don't exist in OpenGL ES. Applications use them to ask
//!   "would this texture fit?", so `glTexImage2D` on a proxy target just
//!   remembers the answer for `glGetTexLevelParameteriv`.
//! - OpenGL ES is strict about which internal format goes with which format
//!   and type, and has no unsized depth formats or legacy component counts.
//!   [pick_internalformat] maps desktop combinations to ES ones.
//! - Upload formats ES doesn't have at all are handled by [crate::swizzle].
//! - Buffer textures are core in ES 3.2 and an extension before.

use crate::context::Context;
use crate::gles::desktop;
use crate::gles::gles32_raw as gles32;
use crate::gles::gles32_raw::types::*;
use crate::gles::OptionalEntry;
use crate::swizzle;

/// Number of entries in [FormatCache].
pub const FORMAT_CACHE_SIZE: usize = 64;

/// What the last `glTexImage2D` on a proxy target asked for.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ProxyTexture {
    /// 0 if the texture wouldn't fit.
    pub width: GLint,
    pub height: GLint,
    pub internalformat: GLint,
}

pub fn is_proxy_texture(target: GLenum) -> bool {
    matches!(
        target,
        desktop::PROXY_TEXTURE_1D
            | desktop::PROXY_TEXTURE_2D
            | desktop::PROXY_TEXTURE_3D
            | desktop::PROXY_TEXTURE_RECTANGLE
    )
}

/// Size of mipmap `level` of a texture whose base level is `size`.
pub fn nlevel(size: GLint, level: GLint) -> GLint {
    if size == 0 {
        return 0;
    }
    let shifted = u32::try_from(level)
        .ok()
        .and_then(|level| size.checked_shr(level))
        .unwrap_or(0);
    shifted.max(1)
}

/// Base level size of a proxy texture of size `size` at `level`, or 0 if it
/// exceeds `max`.
fn proxy_size(size: GLsizei, level: GLint, max: GLint) -> GLint {
    let fits = u32::try_from(level)
        .ok()
        .filter(|&level| level < 32)
        .map_or(false, |level| (i64::from(size) << level) <= i64::from(max));
    if fits {
        size
    } else {
        0
    }
}

/// An `(internalformat, format, type)` triple as given to `glTexImage2D`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TexFormat {
    pub internalformat: GLint,
    pub format: GLenum,
    pub type_: GLenum,
}

/// Adjust a desktop format triple so an OpenGL ES driver accepts it. The type
/// is only changed when there is no data, since the data is in that type.
pub fn pick_internalformat(requested: TexFormat, has_pixels: bool) -> TexFormat {
    let mut picked = requested;
    let set_type = |picked: &mut TexFormat, type_: GLenum| {
        if !has_pixels {
            picked.type_ = type_;
        }
    };
    match requested.internalformat as GLenum {
        gles32::DEPTH_COMPONENT => {
            picked.format = gles32::DEPTH_COMPONENT;
            picked.internalformat = match requested.type_ {
                gles32::UNSIGNED_SHORT => gles32::DEPTH_COMPONENT16,
                gles32::UNSIGNED_INT => gles32::DEPTH_COMPONENT24,
                gles32::FLOAT => gles32::DEPTH_COMPONENT32F,
                _ => {
                    set_type(&mut picked, gles32::UNSIGNED_INT);
                    gles32::DEPTH_COMPONENT24
                }
            } as GLint;
        }
        desktop::DEPTH_COMPONENT32 => {
            picked.format = gles32::DEPTH_COMPONENT;
            picked.internalformat = gles32::DEPTH_COMPONENT32F as GLint;
            set_type(&mut picked, gles32::FLOAT);
        }
        1 => picked.internalformat = gles32::R8 as GLint,
        2 => picked.internalformat = gles32::RG8 as GLint,
        3 => picked.internalformat = gles32::RGB8 as GLint,
        4 => picked.internalformat = gles32::RGBA8 as GLint,
        gles32::R16F | gles32::RG16F | gles32::RGB16F | gles32::RGBA16F => {
            if requested.type_ != gles32::HALF_FLOAT && requested.type_ != gles32::FLOAT {
                set_type(&mut picked, gles32::HALF_FLOAT);
            }
        }
        gles32::R32F | gles32::RG32F | gles32::RGB32F | gles32::RGBA32F => {
            set_type(&mut picked, gles32::FLOAT);
        }
        _ => (),
    }
    picked
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct FormatCacheEntry {
    requested: TexFormat,
    has_pixels: bool,
    picked: TexFormat,
}

/// Small cache of [pick_internalformat] results, replaced round robin.
/// Applications upload many textures with the same few formats.
#[derive(Debug)]
pub struct FormatCache {
    entries: [Option<FormatCacheEntry>; FORMAT_CACHE_SIZE],
    next: usize,
}

impl Default for FormatCache {
    fn default() -> Self {
        FormatCache {
            entries: [None; FORMAT_CACHE_SIZE],
            next: 0,
        }
    }
}

impl FormatCache {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn pick(&mut self, requested: TexFormat, has_pixels: bool) -> TexFormat {
        let hit = self
            .entries
            .iter()
            .flatten()
            .find(|e| e.requested == requested && e.has_pixels == has_pixels);
        if let Some(entry) = hit {
            return entry.picked;
        }
        let picked = pick_internalformat(requested, has_pixels);
        self.entries[self.next] = Some(FormatCacheEntry {
            requested,
            has_pixels,
            picked,
        });
        self.next = (self.next + 1) % FORMAT_CACHE_SIZE;
        picked
    }

    pub fn len(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[allow(clippy::too_many_arguments)]
pub unsafe fn tex_image_2d(
    ctx: &mut Context,
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
    if is_proxy_texture(target) {
        ctx.proxy = ProxyTexture {
            width: proxy_size(width, level, ctx.max_texture_size),
            height: proxy_size(height, level, ctx.max_texture_size),
            internalformat,
        };
        return;
    }
    let mut format = format;
    let mut type_ = type_;
    if !pixels.is_null() {
        swizzle::process_upload(ctx, target, &mut format, &mut type_);
    }
    let picked = ctx.format_cache.pick(
        TexFormat {
            internalformat,
            format,
            type_,
        },
        !pixels.is_null(),
    );
    ctx.gl.TexImage2D(
        target,
        level,
        picked.internalformat,
        width,
        height,
        border,
        picked.format,
        picked.type_,
        pixels,
    );
}

#[allow(clippy::too_many_arguments)]
pub unsafe fn tex_sub_image_2d(
    ctx: &mut Context,
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
    let mut format = format;
    let mut type_ = type_;
    if !pixels.is_null() {
        swizzle::process_upload(ctx, target, &mut format, &mut type_);
    }
    ctx.gl.TexSubImage2D(
        target, level, xoffset, yoffset, width, height, format, type_, pixels,
    );
}

/// `glGetTexLevelParameteriv`, which OpenGL ES only has from 3.1.
pub unsafe fn get_tex_level_parameteriv(
    ctx: &mut Context,
    target: GLenum,
    level: GLint,
    pname: GLenum,
    params: &mut GLint,
) {
    if is_proxy_texture(target) {
        match pname {
            gles32::TEXTURE_WIDTH => *params = nlevel(ctx.proxy.width, level),
            gles32::TEXTURE_HEIGHT => *params = nlevel(ctx.proxy.height, level),
            gles32::TEXTURE_INTERNAL_FORMAT => *params = ctx.proxy.internalformat,
            _ => (),
        }
        return;
    }
    if !ctx.caps.es31 {
        log_once!("glGetTexLevelParameter* functions are not supported below OpenGL ES 3.1");
        return;
    }
    ctx.gl.GetTexLevelParameteriv(target, level, pname, params);
}

/// Parameters ES doesn't have. Returns `false` if the call must be dropped.
fn filter_param(pname: GLenum, value: GLfloat) -> bool {
    if pname == desktop::TEXTURE_LOD_BIAS {
        if value != 0.0 {
            log_once!("setting GL_TEXTURE_LOD_BIAS to nondefault value not supported");
        }
        return false;
    }
    true
}

pub unsafe fn tex_parameteri(ctx: &mut Context, target: GLenum, pname: GLenum, param: GLint) {
    if !filter_param(pname, param as GLfloat) {
        return;
    }
    if swizzle::process_swizzle_param(ctx, target, pname, &[param]) {
        return;
    }
    ctx.gl.TexParameteri(target, pname, param);
}

/// `params` must hold 4 values for `GL_TEXTURE_SWIZZLE_RGBA` and at least one
/// otherwise.
pub unsafe fn tex_parameteriv(ctx: &mut Context, target: GLenum, pname: GLenum, params: &[GLint]) {
    let Some(&first) = params.first() else {
        return;
    };
    if !filter_param(pname, first as GLfloat) {
        return;
    }
    if swizzle::process_swizzle_param(ctx, target, pname, params) {
        return;
    }
    ctx.gl.TexParameteriv(target, pname, params.as_ptr());
}

pub unsafe fn tex_parameterf(ctx: &mut Context, target: GLenum, pname: GLenum, param: GLfloat) {
    if !filter_param(pname, param) {
        return;
    }
    if swizzle::process_swizzle_param(ctx, target, pname, &[param as GLint]) {
        return;
    }
    ctx.gl.TexParameterf(target, pname, param);
}

pub unsafe fn tex_parameterfv(
    ctx: &mut Context,
    target: GLenum,
    pname: GLenum,
    params: &[GLfloat],
) {
    let Some(&first) = params.first() else {
        return;
    };
    if !filter_param(pname, first) {
        return;
    }
    if swizzle::is_swizzle_param(pname) {
        let ints: Vec<GLint> = params.iter().map(|&p| p as GLint).collect();
        if swizzle::process_swizzle_param(ctx, target, pname, &ints) {
            return;
        }
    }
    ctx.gl.TexParameterfv(target, pname, params.as_ptr());
}

/// `glTexParameterIiv` and `glTexParameterIuiv`, which are only supported for
/// `GL_TEXTURE_SWIZZLE_RGBA`.
pub unsafe fn tex_parameter_integer(
    ctx: &mut Context,
    target: GLenum,
    pname: GLenum,
    params: &[GLint],
) {
    if pname != desktop::TEXTURE_SWIZZLE_RGBA {
        log_once!(
            "glTexParameterI* for parameters other than GL_TEXTURE_SWIZZLE_RGBA is not supported"
        );
        return;
    }
    if !swizzle::process_swizzle_param(ctx, target, pname, params) {
        log_dbg!("Can't track swizzle for target {:#x}, dropping it", target);
    }
}

/// `params` must have room for 4 values for `GL_TEXTURE_SWIZZLE_RGBA`.
pub unsafe fn get_tex_parameteriv(
    ctx: &mut Context,
    target: GLenum,
    pname: GLenum,
    params: &mut [GLint],
) {
    if swizzle::get_swizzle_param(ctx, target, pname, params) {
        return;
    }
    if let Some(first) = params.first_mut() {
        ctx.gl.GetTexParameteriv(target, pname, first);
    }
}

pub unsafe fn delete_textures(ctx: &mut Context, textures: &[GLuint]) {
    ctx.gl
        .DeleteTextures(textures.len() as GLsizei, textures.as_ptr());
    swizzle::forget_textures(ctx, textures);
}

/// `glTexBuffer` if `range` is [None], `glTexBufferRange` otherwise.
pub unsafe fn tex_buffer(
    ctx: &mut Context,
    target: GLenum,
    internalformat: GLenum,
    buffer: GLuint,
    range: Option<(GLintptr, GLsizeiptr)>,
) {
    let (core, ext) = match range {
        None => (OptionalEntry::TexBuffer, OptionalEntry::TexBufferEXT),
        Some(_) => (OptionalEntry::TexBufferRange, OptionalEntry::TexBufferRangeEXT),
    };
    let entry = if ctx.caps.es32 && ctx.gl.is_loaded(core) {
        core
    } else if ctx.caps.buffer_texture_ext && ctx.gl.is_loaded(ext) {
        ext
    } else {
        log_once!("Buffer textures aren't supported on your device");
        return;
    };
    match (entry, range) {
        (OptionalEntry::TexBuffer, None) => ctx.gl.TexBuffer(target, internalformat, buffer),
        (_, None) => ctx.gl.TexBufferEXT(target, internalformat, buffer),
        (OptionalEntry::TexBufferRange, Some((offset, size))) => ctx
            .gl
            .TexBufferRange(target, internalformat, buffer, offset, size),
        (_, Some((offset, size))) => ctx
            .gl
            .TexBufferRangeEXT(target, internalformat, buffer, offset, size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(internalformat: GLenum, format: GLenum, type_: GLenum) -> TexFormat {
        TexFormat {
            internalformat: internalformat as GLint,
            format,
            type_,
        }
    }

    #[test]
    fn mip_sizes() {
        assert_eq!(nlevel(256, 0), 256);
        assert_eq!(nlevel(256, 3), 32);
        assert_eq!(nlevel(256, 12), 1);
        assert_eq!(nlevel(0, 2), 0);
        assert_eq!(nlevel(5, 40), 1);
    }

    #[test]
    fn proxy_limits() {
        assert_eq!(proxy_size(1024, 0, 4096), 1024);
        assert_eq!(proxy_size(1024, 2, 4096), 1024);
        assert_eq!(proxy_size(1024, 3, 4096), 0);
        assert_eq!(proxy_size(8192, 0, 4096), 0);
        assert_eq!(proxy_size(i32::MAX, 1, 4096), 0);
    }

    #[test]
    fn unsized_depth() {
        let picked = pick_internalformat(
            fmt(gles32::DEPTH_COMPONENT, gles32::DEPTH_COMPONENT, gles32::FLOAT),
            false,
        );
        assert_eq!(picked.internalformat, gles32::DEPTH_COMPONENT32F as GLint);
        let picked = pick_internalformat(
            fmt(gles32::DEPTH_COMPONENT, gles32::DEPTH_COMPONENT, gles32::UNSIGNED_BYTE),
            false,
        );
        assert_eq!(
            picked,
            fmt(gles32::DEPTH_COMPONENT24, gles32::DEPTH_COMPONENT, gles32::UNSIGNED_INT)
        );
    }

    #[test]
    fn type_kept_with_pixels() {
        let requested = fmt(gles32::RGBA32F, gles32::RGBA, gles32::UNSIGNED_BYTE);
        assert_eq!(pick_internalformat(requested, true), requested);
        assert_eq!(pick_internalformat(requested, false).type_, gles32::FLOAT);
    }

    #[test]
    fn legacy_component_counts() {
        let picked = pick_internalformat(fmt(4, gles32::RGBA, gles32::UNSIGNED_BYTE), true);
        assert_eq!(picked.internalformat, gles32::RGBA8 as GLint);
        let picked = pick_internalformat(fmt(1, gles32::RED, gles32::UNSIGNED_BYTE), true);
        assert_eq!(picked.internalformat, gles32::R8 as GLint);
    }

    #[test]
    fn cache_round_robin() {
        let mut cache = FormatCache::default();
        for i in 0..FORMAT_CACHE_SIZE + 3 {
            cache.pick(fmt(gles32::RGBA8, gles32::RGBA, i as GLenum), true);
        }
        assert_eq!(cache.len(), FORMAT_CACHE_SIZE);
        let picked = cache.pick(fmt(3, gles32::RGB, gles32::UNSIGNED_BYTE), true);
        assert_eq!(picked.internalformat, gles32::RGB8 as GLint);
        cache.clear();
        assert!(cache.is_empty());
    }
}
