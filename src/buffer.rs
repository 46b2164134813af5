/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Buffer objects: binding shadows, buffer storage and mapping.
//!
//! The emulated draws bind their own buffers and have to put the
//! application's back afterwards, so bindings are shadowed here rather than
//! queried from the driver every time.

use crate::context::{base_buffer_index, buffer_index, BaseBufferBinding, Context};
use crate::error::ShimError;
use crate::gles::desktop;
use crate::gles::gles32_raw as gles32;
use crate::gles::gles32_raw::types::*;

pub unsafe fn bind_buffer(ctx: &mut Context, target: GLenum, buffer: GLuint) {
    ctx.gl.BindBuffer(target, buffer);
    if let Some(index) = buffer_index(target) {
        ctx.bound_buffers[index] = buffer;
    }
}

fn set_base_buffer(
    ctx: &mut Context,
    target: GLenum,
    index: GLuint,
    buffer: GLuint,
    range: Option<(GLintptr, GLsizeiptr)>,
) {
    let Some(map_index) = base_buffer_index(target) else {
        return;
    };
    let bindings = &mut ctx.base_buffers[map_index];
    if buffer == 0 {
        bindings.remove(index as usize);
    } else {
        bindings.put(
            index as usize,
            BaseBufferBinding {
                index,
                buffer,
                range,
            },
        );
    }
}

pub unsafe fn bind_buffer_base(ctx: &mut Context, target: GLenum, index: GLuint, buffer: GLuint) {
    ctx.gl.BindBufferBase(target, index, buffer);
    set_base_buffer(ctx, target, index, buffer, None);
}

pub unsafe fn bind_buffer_range(
    ctx: &mut Context,
    target: GLenum,
    index: GLuint,
    buffer: GLuint,
    offset: GLintptr,
    size: GLsizeiptr,
) {
    ctx.gl.BindBufferRange(target, index, buffer, offset, size);
    set_base_buffer(ctx, target, index, buffer, Some((offset, size)));
}

/// Buffer bound to binding point `index` of an indexed target.
pub fn base_buffer(ctx: &Context, target: GLenum, index: GLuint) -> Option<BaseBufferBinding> {
    let map_index = base_buffer_index(target)?;
    ctx.base_buffers[map_index].get(index as usize).copied()
}

/// Flags for `glBufferStorageEXT` after applying the buffer options.
pub fn storage_flags(
    flags: GLbitfield,
    never_flush_buffers: bool,
    coherent_dynamic_storage: bool,
) -> GLbitfield {
    let mut flags = flags;
    // Coherent mappings don't need flushing.
    if never_flush_buffers && flags & gles32::MAP_PERSISTENT_BIT_EXT != 0 {
        flags |= gles32::MAP_COHERENT_BIT_EXT;
    }
    if coherent_dynamic_storage && flags & gles32::DYNAMIC_STORAGE_BIT_EXT != 0 {
        flags |= gles32::MAP_WRITE_BIT | gles32::MAP_PERSISTENT_BIT_EXT | gles32::MAP_COHERENT_BIT_EXT;
    }
    flags
}

pub unsafe fn buffer_storage(
    ctx: &mut Context,
    target: GLenum,
    size: GLsizeiptr,
    data: *const GLvoid,
    flags: GLbitfield,
) -> Result<(), ShimError> {
    if !ctx.caps.buffer_storage {
        return Err(ShimError::Unsupported(
            "glBufferStorage without GL_EXT_buffer_storage".to_string(),
        ));
    }
    let flags = storage_flags(
        flags,
        ctx.options.never_flush_buffers,
        ctx.options.coherent_dynamic_storage,
    );
    ctx.gl.BufferStorageEXT(target, size, data, flags);
    Ok(())
}

pub unsafe fn map_buffer_range(
    ctx: &mut Context,
    target: GLenum,
    offset: GLintptr,
    length: GLsizeiptr,
    access: GLbitfield,
) -> *mut GLvoid {
    let mut access = access;
    if ctx.options.never_flush_buffers {
        access &= !gles32::MAP_FLUSH_EXPLICIT_BIT;
    }
    ctx.gl.MapBufferRange(target, offset, length, access)
}

pub unsafe fn flush_mapped_buffer_range(
    ctx: &mut Context,
    target: GLenum,
    offset: GLintptr,
    length: GLsizeiptr,
) {
    if !ctx.options.never_flush_buffers {
        ctx.gl.FlushMappedBufferRange(target, offset, length);
    }
}

/// `glMapBuffer` access mode as `glMapBufferRange` access bits.
pub fn map_access_bits(access: GLenum) -> Result<GLbitfield, ShimError> {
    match access {
        desktop::READ_ONLY => Ok(gles32::MAP_READ_BIT),
        desktop::WRITE_ONLY => Ok(gles32::MAP_WRITE_BIT),
        desktop::READ_WRITE => Ok(gles32::MAP_READ_BIT | gles32::MAP_WRITE_BIT),
        _ => Err(ShimError::InvalidArgument(format!(
            "glMapBuffer access {:#x}",
            access
        ))),
    }
}

/// `glMapBuffer`, which maps the whole buffer.
pub unsafe fn map_buffer(
    ctx: &mut Context,
    target: GLenum,
    access: GLenum,
) -> Result<*mut GLvoid, ShimError> {
    match target {
        gles32::ATOMIC_COUNTER_BUFFER
        | gles32::DISPATCH_INDIRECT_BUFFER
        | gles32::SHADER_STORAGE_BUFFER
        | desktop::QUERY_BUFFER => {
            return Err(ShimError::Unsupported(format!(
                "glMapBuffer target {:#x}",
                target
            )));
        }
        gles32::DRAW_INDIRECT_BUFFER | gles32::TEXTURE_BUFFER => {
            log_once!("glMapBuffer on target {:#x} is untested", target);
        }
        _ => (),
    }
    let access = map_access_bits(access)?;
    let mut length = 0;
    ctx.gl
        .GetBufferParameteriv(target, gles32::BUFFER_SIZE, &mut length);
    Ok(ctx
        .gl
        .MapBufferRange(target, 0, length as GLsizeiptr, access))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gles::{Call, DriverProfile, RecordingBackend};
    use crate::options::Options;
    use crate::shader::ShaderPipeline;

    fn context(options: Options) -> (Context, RecordingBackend) {
        let gl = RecordingBackend::new(DriverProfile::es32());
        let mut ctx =
            Context::new(Box::new(gl.clone()), options, ShaderPipeline::passthrough()).unwrap();
        ctx.init_in_context();
        gl.lock().take_calls();
        (ctx, gl)
    }

    #[test]
    fn base_and_range_bindings() {
        let (mut ctx, _gl) = context(Options::default());
        unsafe {
            bind_buffer_base(&mut ctx, gles32::UNIFORM_BUFFER, 2, 11);
            bind_buffer_range(&mut ctx, gles32::SHADER_STORAGE_BUFFER, 0, 12, 64, 128);
        }
        assert_eq!(
            base_buffer(&ctx, gles32::UNIFORM_BUFFER, 2),
            Some(BaseBufferBinding {
                index: 2,
                buffer: 11,
                range: None,
            })
        );
        assert_eq!(
            base_buffer(&ctx, gles32::SHADER_STORAGE_BUFFER, 0).map(|b| b.range),
            Some(Some((64, 128)))
        );
        assert_eq!(base_buffer(&ctx, gles32::ARRAY_BUFFER, 0), None);

        unsafe { bind_buffer_base(&mut ctx, gles32::UNIFORM_BUFFER, 2, 0) };
        assert_eq!(base_buffer(&ctx, gles32::UNIFORM_BUFFER, 2), None);
    }

    #[test]
    fn explicit_flushes_dropped() {
        let (mut ctx, gl) = context(Options::default());
        unsafe {
            map_buffer_range(
                &mut ctx,
                gles32::ARRAY_BUFFER,
                0,
                16,
                gles32::MAP_WRITE_BIT | gles32::MAP_FLUSH_EXPLICIT_BIT,
            );
            flush_mapped_buffer_range(&mut ctx, gles32::ARRAY_BUFFER, 0, 16);
        }
        assert_eq!(
            gl.lock().take_calls(),
            vec![Call::MapBufferRange {
                target: gles32::ARRAY_BUFFER,
                offset: 0,
                length: 16,
                access: gles32::MAP_WRITE_BIT,
            }]
        );
    }

    #[test]
    fn map_whole_buffer() {
        let (mut ctx, gl) = context(Options::default());
        unsafe {
            bind_buffer(&mut ctx, gles32::COPY_READ_BUFFER, 3);
            buffer_storage(
                &mut ctx,
                gles32::COPY_READ_BUFFER,
                256,
                std::ptr::null(),
                gles32::MAP_READ_BIT,
            )
            .unwrap();
            gl.lock().take_calls();
            map_buffer(&mut ctx, gles32::COPY_READ_BUFFER, desktop::READ_ONLY).unwrap();
            assert!(map_buffer(&mut ctx, gles32::SHADER_STORAGE_BUFFER, desktop::READ_ONLY).is_err());
        }
        assert_eq!(
            gl.lock().take_calls(),
            vec![Call::MapBufferRange {
                target: gles32::COPY_READ_BUFFER,
                offset: 0,
                length: 256,
                access: gles32::MAP_READ_BIT,
            }]
        );
    }

    #[test]
    fn persistent_becomes_coherent() {
        let flags = storage_flags(gles32::MAP_PERSISTENT_BIT_EXT, true, false);
        assert_eq!(
            flags,
            gles32::MAP_PERSISTENT_BIT_EXT | gles32::MAP_COHERENT_BIT_EXT
        );
        assert_eq!(
            storage_flags(gles32::MAP_PERSISTENT_BIT_EXT, false, false),
            gles32::MAP_PERSISTENT_BIT_EXT
        );
    }

    #[test]
    fn dynamic_storage_forced_coherent() {
        let flags = storage_flags(gles32::DYNAMIC_STORAGE_BIT_EXT, false, true);
        assert_eq!(
            flags,
            gles32::DYNAMIC_STORAGE_BIT_EXT
                | gles32::MAP_WRITE_BIT
                | gles32::MAP_PERSISTENT_BIT_EXT
                | gles32::MAP_COHERENT_BIT_EXT
        );
        assert_eq!(storage_flags(gles32::MAP_READ_BIT, true, true), gles32::MAP_READ_BIT);
    }

    #[test]
    fn access_modes() {
        assert_eq!(map_access_bits(desktop::READ_ONLY), Ok(gles32::MAP_READ_BIT));
        assert_eq!(
            map_access_bits(desktop::READ_WRITE),
            Ok(gles32::MAP_READ_BIT | gles32::MAP_WRITE_BIT)
        );
        assert!(map_access_bits(gles32::MAP_READ_BIT).is_err());
    }
}
