/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Framebuffer objects and renderbuffers.
//!
//! We keep a record per application framebuffer of its color attachments and
//! draw buffers, and shadow the draw and read bindings.

use crate::context::{Context, MAX_DRAWBUFFERS, MAX_FBTARGETS};
use crate::error::ShimError;
use crate::gles::gles32_raw as gles32;
use crate::gles::gles32_raw::types::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramebufferInfo {
    /// Texture target of each color attachment, 0 if unattached.
    pub color_targets: [GLenum; MAX_FBTARGETS],
    pub color_objects: [GLuint; MAX_FBTARGETS],
    pub color_levels: [GLint; MAX_FBTARGETS],
    pub draw_buffers: [GLenum; MAX_DRAWBUFFERS],
    pub nbuffers: GLsizei,
}

impl Default for FramebufferInfo {
    fn default() -> Self {
        let mut draw_buffers = [gles32::NONE; MAX_DRAWBUFFERS];
        draw_buffers[0] = gles32::COLOR_ATTACHMENT0;
        FramebufferInfo {
            color_targets: [0; MAX_FBTARGETS],
            color_objects: [0; MAX_FBTARGETS],
            color_levels: [0; MAX_FBTARGETS],
            draw_buffers,
            nbuffers: 1,
        }
    }
}

/// Index of a color attachment point, if it's one we track.
pub fn color_attachment_index(attachment: GLenum) -> Option<usize> {
    let index = attachment.checked_sub(gles32::COLOR_ATTACHMENT0)? as usize;
    (index < MAX_FBTARGETS).then_some(index)
}

/// The framebuffer bound to `target`, as far as the shadow knows.
pub fn bound_framebuffer(ctx: &Context, target: GLenum) -> Option<GLuint> {
    match target {
        gles32::FRAMEBUFFER | gles32::DRAW_FRAMEBUFFER => Some(ctx.draw_framebuffer),
        gles32::READ_FRAMEBUFFER => Some(ctx.read_framebuffer),
        _ => None,
    }
}

pub unsafe fn bind_framebuffer(ctx: &mut Context, target: GLenum, framebuffer: GLuint) {
    ctx.gl.BindFramebuffer(target, framebuffer);
    match target {
        gles32::FRAMEBUFFER => {
            ctx.draw_framebuffer = framebuffer;
            ctx.read_framebuffer = framebuffer;
        }
        gles32::DRAW_FRAMEBUFFER => ctx.draw_framebuffer = framebuffer,
        gles32::READ_FRAMEBUFFER => ctx.read_framebuffer = framebuffer,
        _ => return,
    }
    if framebuffer != 0 && !ctx.framebuffer_infos.contains(framebuffer as usize) {
        if let Err(e) = ctx
            .framebuffer_infos
            .insert(framebuffer as usize, FramebufferInfo::default())
        {
            log!("Failed to allocate framebuffer info for {}: {}", framebuffer, e);
        }
    }
}

pub unsafe fn framebuffer_texture_2d(
    ctx: &mut Context,
    target: GLenum,
    attachment: GLenum,
    textarget: GLenum,
    texture: GLuint,
    level: GLint,
) {
    ctx.gl
        .FramebufferTexture2D(target, attachment, textarget, texture, level);
    let Some(index) = color_attachment_index(attachment) else {
        return;
    };
    let Some(framebuffer) = bound_framebuffer(ctx, target) else {
        return;
    };
    if let Some(info) = ctx.framebuffer_infos.get_mut(framebuffer as usize) {
        if texture == 0 {
            info.color_targets[index] = 0;
            info.color_objects[index] = 0;
            info.color_levels[index] = 0;
        } else {
            info.color_targets[index] = textarget;
            info.color_objects[index] = texture;
            info.color_levels[index] = level;
        }
    }
}

pub unsafe fn draw_buffers(ctx: &mut Context, bufs: &[GLenum]) -> Result<(), ShimError> {
    if bufs.len() > ctx.max_draw_buffers.max(0) as usize {
        return Err(ShimError::InvalidArgument(format!(
            "{} draw buffers, at most {} supported",
            bufs.len(),
            ctx.max_draw_buffers
        )));
    }
    ctx.gl.DrawBuffers(bufs.len() as GLsizei, bufs.as_ptr());
    let framebuffer = ctx.draw_framebuffer;
    if let Some(info) = ctx.framebuffer_infos.get_mut(framebuffer as usize) {
        info.draw_buffers = [gles32::NONE; MAX_DRAWBUFFERS];
        info.draw_buffers[..bufs.len()].copy_from_slice(bufs);
        info.nbuffers = bufs.len() as GLsizei;
    }
    Ok(())
}

pub unsafe fn delete_framebuffers(ctx: &mut Context, framebuffers: &[GLuint]) {
    ctx.gl
        .DeleteFramebuffers(framebuffers.len() as GLsizei, framebuffers.as_ptr());
    for &framebuffer in framebuffers {
        if framebuffer == 0 {
            continue;
        }
        ctx.framebuffer_infos.remove(framebuffer as usize);
        // Deleting a bound framebuffer reverts the binding to 0.
        if ctx.draw_framebuffer == framebuffer {
            ctx.draw_framebuffer = 0;
        }
        if ctx.read_framebuffer == framebuffer {
            ctx.read_framebuffer = 0;
        }
    }
}

pub unsafe fn renderbuffer_storage(
    ctx: &mut Context,
    target: GLenum,
    internalformat: GLenum,
    width: GLsizei,
    height: GLsizei,
) {
    // Unsized depth isn't renderable on ES.
    let internalformat = match internalformat {
        gles32::DEPTH_COMPONENT => gles32::DEPTH_COMPONENT16,
        other => other,
    };
    ctx.gl
        .RenderbufferStorage(target, internalformat, width, height);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gles::{Call, DriverProfile, RecordingBackend};
    use crate::options::Options;
    use crate::shader::ShaderPipeline;

    fn context() -> (Context, RecordingBackend) {
        let gl = RecordingBackend::new(DriverProfile::es32());
        let mut ctx = Context::new(
            Box::new(gl.clone()),
            Options::default(),
            ShaderPipeline::passthrough(),
        )
        .unwrap();
        ctx.init_in_context();
        (ctx, gl)
    }

    #[test]
    fn attachment_indices() {
        assert_eq!(color_attachment_index(gles32::COLOR_ATTACHMENT0), Some(0));
        assert_eq!(color_attachment_index(gles32::COLOR_ATTACHMENT7), Some(7));
        assert_eq!(color_attachment_index(gles32::COLOR_ATTACHMENT8), None);
        assert_eq!(color_attachment_index(gles32::DEPTH_ATTACHMENT), None);
    }

    #[test]
    fn bindings_and_records() {
        let (mut ctx, _gl) = context();
        unsafe {
            bind_framebuffer(&mut ctx, gles32::FRAMEBUFFER, 5);
            assert_eq!((ctx.draw_framebuffer, ctx.read_framebuffer), (5, 5));
            bind_framebuffer(&mut ctx, gles32::READ_FRAMEBUFFER, 6);
            assert_eq!((ctx.draw_framebuffer, ctx.read_framebuffer), (5, 6));
            framebuffer_texture_2d(
                &mut ctx,
                gles32::DRAW_FRAMEBUFFER,
                gles32::COLOR_ATTACHMENT2,
                gles32::TEXTURE_2D,
                9,
                1,
            );
            let info = ctx.framebuffer_infos.get(5).unwrap();
            assert_eq!(info.color_objects[2], 9);
            assert_eq!(info.color_levels[2], 1);
            assert_eq!(info.color_targets[2], gles32::TEXTURE_2D);

            delete_framebuffers(&mut ctx, &[5]);
            assert_eq!((ctx.draw_framebuffer, ctx.read_framebuffer), (0, 6));
            assert!(!ctx.framebuffer_infos.contains(5));
        }
    }

    #[test]
    fn draw_buffer_limit() {
        let (mut ctx, gl) = context();
        unsafe {
            bind_framebuffer(&mut ctx, gles32::FRAMEBUFFER, 1);
            let bufs = [gles32::COLOR_ATTACHMENT0, gles32::COLOR_ATTACHMENT1];
            draw_buffers(&mut ctx, &bufs).unwrap();
            assert_eq!(ctx.framebuffer_infos.get(1).unwrap().nbuffers, 2);
            assert_eq!(
                gl.lock().take_calls().last(),
                Some(&Call::DrawBuffers(bufs.to_vec()))
            );
            let too_many = [gles32::NONE; MAX_DRAWBUFFERS + 1];
            assert!(draw_buffers(&mut ctx, &too_many).is_err());
            assert!(gl.lock().take_calls().is_empty());
        }
    }

    #[test]
    fn unsized_depth_renderbuffer() {
        let (mut ctx, gl) = context();
        unsafe {
            renderbuffer_storage(&mut ctx, gles32::RENDERBUFFER, gles32::DEPTH_COMPONENT, 4, 4);
        }
        assert_eq!(
            gl.lock().take_calls().last(),
            Some(&Call::RenderbufferStorage {
                target: gles32::RENDERBUFFER,
                internalformat: gles32::DEPTH_COMPONENT16,
                width: 4,
                height: 4,
            })
        );
    }
}
