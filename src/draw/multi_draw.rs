/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! `glMultiDrawArrays` and `glMultiDrawElements`.
//!
//! Multi-draw-arrays is just a loop. Multi-draw-elements is worth more effort
//! since applications use it to submit many small chunks of one mesh: the
//! index ranges are gathered into the context's scratch ring so the whole
//! thing becomes one `glDrawElements`.

use super::type_bytes;
use crate::context::Context;
use crate::error::ShimError;
use crate::gles::gles32_raw as gles32;
use crate::gles::gles32_raw::types::*;

pub unsafe fn multi_draw_arrays(
    ctx: &mut Context,
    mode: GLenum,
    first: &[GLint],
    count: &[GLsizei],
) -> Result<(), ShimError> {
    if first.len() != count.len() {
        return Err(ShimError::InvalidArgument(
            "mismatched multi-draw array lengths".to_string(),
        ));
    }
    for (&first, &count) in first.iter().zip(count) {
        if count > 0 {
            ctx.gl.DrawArrays(mode, first, count);
        }
    }
    Ok(())
}

pub unsafe fn multi_draw_elements(
    ctx: &mut Context,
    mode: GLenum,
    count: &[GLsizei],
    type_: GLenum,
    indices: &[*const GLvoid],
) -> Result<(), ShimError> {
    if count.len() != indices.len() {
        return Err(ShimError::InvalidArgument(
            "mismatched multi-draw array lengths".to_string(),
        ));
    }
    let index_size = type_bytes(type_)?;
    if let Some(&negative) = count.iter().find(|&&c| c < 0) {
        return Err(ShimError::InvalidArgument(format!("count {}", negative)));
    }

    let element_buffer = ctx.get_integer(gles32::ELEMENT_ARRAY_BUFFER_BINDING) as GLuint;
    // Without an element buffer the indices are client pointers, and a null
    // one has nothing to read from.
    let draws: Vec<(GLsizei, *const GLvoid)> = count
        .iter()
        .zip(indices)
        .filter(|&(&c, &i)| c > 0 && (element_buffer != 0 || !i.is_null()))
        .map(|(&c, &i)| (c, i))
        .collect();
    let dropped = count.iter().zip(indices).filter(|&(&c, _)| c > 0).count() - draws.len();
    if dropped > 0 {
        log!(
            "glMultiDrawElements: ignoring {} draws with null indices and no element buffer",
            dropped
        );
    }

    match draws[..] {
        [] => return Ok(()),
        [(count, indices)] => {
            ctx.gl.DrawElements(mode, count, type_, indices);
            return Ok(());
        }
        _ => (),
    }

    let total = draws
        .iter()
        .try_fold(0 as GLsizei, |total, &(c, _)| total.checked_add(c))
        .ok_or_else(|| ShimError::Overflow("multidraw index count".to_string()))?;
    let needed = (total as usize)
        .checked_mul(index_size)
        .filter(|&n| n <= GLsizei::MAX as usize)
        .ok_or_else(|| ShimError::Overflow("multidraw size".to_string()))?;

    if ctx.ring.buffer == 0 {
        return Err(ShimError::Unsupported(
            "multidraw before the context was made current".to_string(),
        ));
    }
    let reservation = ctx.ring.reserve(needed)?;

    ctx.gl.BindBuffer(gles32::COPY_WRITE_BUFFER, ctx.ring.buffer);
    if let Some(new_size) = reservation.grow_to {
        ctx.gl.BufferData(
            gles32::COPY_WRITE_BUFFER,
            new_size as GLsizeiptr,
            std::ptr::null(),
            gles32::STREAM_DRAW,
        );
    }

    let mut offset = reservation.offset;
    for &(count, indices) in &draws {
        let size = count as usize * index_size;
        if element_buffer != 0 {
            ctx.gl.CopyBufferSubData(
                gles32::ELEMENT_ARRAY_BUFFER,
                gles32::COPY_WRITE_BUFFER,
                indices as GLintptr,
                offset as GLintptr,
                size as GLsizeiptr,
            );
        } else {
            ctx.gl.BufferSubData(
                gles32::COPY_WRITE_BUFFER,
                offset as GLintptr,
                size as GLsizeiptr,
                indices,
            );
        }
        offset += size;
    }
    ctx.ring.advance(needed);
    let copy_write = ctx.bound_buffer(gles32::COPY_WRITE_BUFFER);
    ctx.gl.BindBuffer(gles32::COPY_WRITE_BUFFER, copy_write);

    ctx.gl
        .BindBuffer(gles32::ELEMENT_ARRAY_BUFFER, ctx.ring.buffer);
    ctx.gl.DrawElements(
        mode,
        total,
        type_,
        reservation.offset as *const GLvoid,
    );
    ctx.gl
        .BindBuffer(gles32::ELEMENT_ARRAY_BUFFER, element_buffer);
    Ok(())
}
