/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! `glDrawElementsBaseVertex` and `glMultiDrawElementsBaseVertex`.
//!
//! OpenGL ES 3.2 has base-vertex draws in core, and some 3.0/3.1 drivers have
//! them as an OES or EXT extension. Where neither is available but OpenGL ES
//! 3.1 is, the indirect draw command structure has a base vertex field, so
//! the draw can be expressed as an indirect draw with a command we upload.
//!
//! The indirect form has no way to take indices from client memory, so draws
//! without an element array buffer are not supported.

use super::type_bytes;
use crate::context::{BaseVertexEntry, Context};
use crate::error::ShimError;
use crate::gles::gles32_raw as gles32;
use crate::gles::gles32_raw::types::*;
use std::mem::size_of;

/// Most draws a single `glMultiDrawElementsBaseVertex` may do.
pub const MAX_MULTI_DRAWS: GLsizei = 10000;

/// The layout `glDrawElementsIndirect` reads from the indirect buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DrawElementsIndirectCommand {
    pub count: GLuint,
    pub instance_count: GLuint,
    pub first_index: GLuint,
    pub base_vertex: GLint,
    pub reserved: GLuint,
}

impl DrawElementsIndirectCommand {
    /// Command for a draw whose indices start `offset` bytes into the element
    /// array buffer. The offset must be a whole number of indices.
    pub fn new(
        count: GLsizei,
        offset: usize,
        index_size: usize,
        base_vertex: GLint,
    ) -> Result<Self, ShimError> {
        if count < 0 {
            return Err(ShimError::InvalidArgument(format!("count {}", count)));
        }
        if offset % index_size != 0 {
            return Err(ShimError::Unsupported(format!(
                "misaligned base vertex draw (offset {:#x}, {}-byte indices)",
                offset, index_size
            )));
        }
        let first_index = GLuint::try_from(offset / index_size)
            .map_err(|_| ShimError::Overflow(format!("index offset {:#x}", offset)))?;
        Ok(DrawElementsIndirectCommand {
            count: count as GLuint,
            instance_count: 1,
            first_index,
            base_vertex,
            reserved: 0,
        })
    }
}

/// The indirect buffer base-vertex emulation draws from.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BaseVertexRenderer {
    /// Emulation is possible and the buffer exists.
    pub ready: bool,
    pub indirect_buffer: GLuint,
}

impl BaseVertexRenderer {
    /// Set up emulation if the context needs and supports it. Must be called
    /// after version detection.
    pub fn init(ctx: &mut Context) -> BaseVertexRenderer {
        if ctx.base_vertex_entry.is_some() {
            log!("BaseVertex render calls will use the host driver implementation");
            return BaseVertexRenderer::default();
        }
        if !ctx.caps.es31 {
            log!("BaseVertex render calls not available: requires OpenGL ES 3.1");
            return BaseVertexRenderer::default();
        }
        let mut indirect_buffer = 0;
        let error = unsafe {
            ctx.gl.GenBuffers(1, &mut indirect_buffer);
            ctx.gl.GetError()
        };
        if error != gles32::NO_ERROR {
            log!("Failed to initialize indirect buffers: {:#x}", error);
            return BaseVertexRenderer::default();
        }
        BaseVertexRenderer {
            ready: true,
            indirect_buffer,
        }
    }
}

unsafe fn draw_native(
    ctx: &mut Context,
    entry: BaseVertexEntry,
    mode: GLenum,
    count: GLsizei,
    type_: GLenum,
    indices: *const GLvoid,
    basevertex: GLint,
) {
    match entry {
        BaseVertexEntry::Core => ctx
            .gl
            .DrawElementsBaseVertex(mode, count, type_, indices, basevertex),
        BaseVertexEntry::Oes => ctx
            .gl
            .DrawElementsBaseVertexOES(mode, count, type_, indices, basevertex),
        BaseVertexEntry::Ext => ctx
            .gl
            .DrawElementsBaseVertexEXT(mode, count, type_, indices, basevertex),
    }
}

/// Checks common to both emulated draws. Returns the index size.
unsafe fn check_emulated(ctx: &mut Context, type_: GLenum) -> Result<Option<usize>, ShimError> {
    if !ctx.basevertex.ready {
        log_once!("BaseVertex render calls are not available on this driver, dropping them");
        return Ok(None);
    }
    if ctx.get_integer(gles32::ELEMENT_ARRAY_BUFFER_BINDING) == 0 {
        return Err(ShimError::Unsupported(
            "base vertex draws without element buffer".to_string(),
        ));
    }
    type_bytes(type_).map(Some)
}

/// Upload commands to the indirect buffer, leaving it bound to
/// `GL_DRAW_INDIRECT_BUFFER`.
unsafe fn upload(ctx: &mut Context, commands: &[DrawElementsIndirectCommand]) {
    ctx.gl
        .BindBuffer(gles32::DRAW_INDIRECT_BUFFER, ctx.basevertex.indirect_buffer);
    ctx.gl.BufferData(
        gles32::DRAW_INDIRECT_BUFFER,
        std::mem::size_of_val(commands) as GLsizeiptr,
        commands.as_ptr() as *const GLvoid,
        gles32::STREAM_DRAW,
    );
}

unsafe fn restore(ctx: &mut Context) {
    let binding = ctx.bound_buffer(gles32::DRAW_INDIRECT_BUFFER);
    ctx.gl.BindBuffer(gles32::DRAW_INDIRECT_BUFFER, binding);
}

pub unsafe fn draw_elements_base_vertex(
    ctx: &mut Context,
    mode: GLenum,
    count: GLsizei,
    type_: GLenum,
    indices: *const GLvoid,
    basevertex: GLint,
) -> Result<(), ShimError> {
    if let Some(entry) = ctx.base_vertex_entry {
        draw_native(ctx, entry, mode, count, type_, indices, basevertex);
        return Ok(());
    }
    let Some(index_size) = check_emulated(ctx, type_)? else {
        return Ok(());
    };
    let command = DrawElementsIndirectCommand::new(count, indices as usize, index_size, basevertex)?;
    upload(ctx, &[command]);
    ctx.gl.DrawElementsIndirect(mode, type_, std::ptr::null());
    restore(ctx);
    Ok(())
}

pub unsafe fn multi_draw_elements_base_vertex(
    ctx: &mut Context,
    mode: GLenum,
    count: &[GLsizei],
    type_: GLenum,
    indices: &[*const GLvoid],
    basevertex: &[GLint],
) -> Result<(), ShimError> {
    if count.len() != indices.len() || count.len() != basevertex.len() {
        return Err(ShimError::InvalidArgument(
            "mismatched multi-draw array lengths".to_string(),
        ));
    }
    if let Some(entry) = ctx.base_vertex_entry {
        for i in 0..count.len() {
            draw_native(ctx, entry, mode, count[i], type_, indices[i], basevertex[i]);
        }
        return Ok(());
    }
    let Some(index_size) = check_emulated(ctx, type_)? else {
        return Ok(());
    };
    let drawcount = count.len();
    if drawcount == 0 || drawcount > MAX_MULTI_DRAWS as usize {
        return Err(ShimError::InvalidArgument(format!(
            "drawcount {}",
            drawcount
        )));
    }
    let upload_size = drawcount
        .checked_mul(size_of::<DrawElementsIndirectCommand>())
        .ok_or_else(|| ShimError::Overflow(format!("drawcount {}", drawcount)))?;

    let mut commands = Vec::new();
    commands
        .try_reserve_exact(drawcount)
        .map_err(|_| ShimError::OutOfMemory(format!("{} indirect commands", drawcount)))?;
    for i in 0..drawcount {
        let command =
            DrawElementsIndirectCommand::new(count[i], indices[i] as usize, index_size, basevertex[i])
                .map_err(|e| match e {
                    ShimError::Unsupported(what) => {
                        ShimError::Unsupported(format!("{} (draw {})", what, i))
                    }
                    other => other,
                })?;
        commands.push(command);
    }
    log_dbg!("Emulating {} base vertex draws in {} bytes", drawcount, upload_size);

    upload(ctx, &commands);
    if ctx.caps.multidraw_indirect {
        ctx.gl.MultiDrawElementsIndirectEXT(
            mode,
            type_,
            std::ptr::null(),
            drawcount as GLsizei,
            0,
        );
    } else {
        for i in 0..drawcount {
            let offset = i * size_of::<DrawElementsIndirectCommand>();
            ctx.gl
                .DrawElementsIndirect(mode, type_, offset as *const GLvoid);
        }
    }
    restore(ctx);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_layout() {
        assert_eq!(size_of::<DrawElementsIndirectCommand>(), 20);
    }

    #[test]
    fn first_index_from_offset() {
        let command = DrawElementsIndirectCommand::new(6, 8, 2, 100).unwrap();
        assert_eq!(
            command,
            DrawElementsIndirectCommand {
                count: 6,
                instance_count: 1,
                first_index: 4,
                base_vertex: 100,
                reserved: 0,
            }
        );
        assert_eq!(DrawElementsIndirectCommand::new(3, 0, 4, -5).unwrap().first_index, 0);
    }

    #[test]
    fn misaligned_offset_rejected() {
        assert!(matches!(
            DrawElementsIndirectCommand::new(6, 7, 2, 0),
            Err(ShimError::Unsupported(_))
        ));
        assert!(DrawElementsIndirectCommand::new(6, 6, 4, 0).is_err());
        assert!(DrawElementsIndirectCommand::new(6, 7, 1, 0).is_ok());
    }

    #[test]
    fn negative_count_rejected() {
        assert!(matches!(
            DrawElementsIndirectCommand::new(-1, 0, 2, 0),
            Err(ShimError::InvalidArgument(_))
        ));
    }
}
