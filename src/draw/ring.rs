/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Scratch index buffer used as a ring.
//!
//! Each multi-draw writes its gathered indices at the head and advances it.
//! A payload never straddles the end of the buffer: if it doesn't fit in the
//! contiguous space at the head, the head goes back to the start. A payload
//! bigger than the whole buffer grows the buffer, which empties the ring.
//!
//! Buffer updates are ordered with draws, so overwriting a region the driver
//! may still be reading from is correct, only slower.

use crate::error::ShimError;
use crate::gles::gles32_raw as gles32;
use crate::gles::gles32_raw::types::*;
use crate::gles::GraphicsBackend;

/// Size the ring starts at.
pub const INITIAL_RING_SIZE: usize = 256 * 1024;
/// Size the ring can't grow beyond.
pub const MAX_RING_SIZE: usize = 16 * 1024 * 1024;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScratchRing {
    /// Buffer object name, 0 before the context's first bind.
    pub buffer: GLuint,
    pub size: usize,
    pub head: usize,
    pub tail: usize,
    /// The head has gone past the end since the last reset.
    pub wrapped: bool,
}

/// Where a payload goes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Reservation {
    pub offset: usize,
    /// If set, the buffer must be reallocated with this size before writing.
    pub grow_to: Option<usize>,
}

impl ScratchRing {
    /// Create the buffer. `copy_write_binding` is the application's
    /// `GL_COPY_WRITE_BUFFER` binding, which is restored afterwards.
    pub unsafe fn init(gl: &mut dyn GraphicsBackend, copy_write_binding: GLuint) -> ScratchRing {
        let mut buffer = 0;
        gl.GenBuffers(1, &mut buffer);
        gl.BindBuffer(gles32::COPY_WRITE_BUFFER, buffer);
        gl.BufferData(
            gles32::COPY_WRITE_BUFFER,
            INITIAL_RING_SIZE as GLsizeiptr,
            std::ptr::null(),
            gles32::STREAM_DRAW,
        );
        gl.BindBuffer(gles32::COPY_WRITE_BUFFER, copy_write_binding);
        ScratchRing {
            buffer,
            size: INITIAL_RING_SIZE,
            head: 0,
            tail: 0,
            wrapped: false,
        }
    }

    /// Bytes that can be written at the head without wrapping.
    pub fn available(&self) -> usize {
        if self.wrapped {
            self.tail.saturating_sub(self.head)
        } else {
            self.size - self.head
        }
    }

    /// Find room for `needed` contiguous bytes. The caller must write them at
    /// the returned offset and then call [ScratchRing::advance].
    pub fn reserve(&mut self, needed: usize) -> Result<Reservation, ShimError> {
        if needed > self.size {
            let mut new_size = needed.saturating_mul(2);
            if new_size > MAX_RING_SIZE {
                new_size = needed;
                if new_size > MAX_RING_SIZE {
                    return Err(ShimError::Unsupported(format!(
                        "multidraw payload of {} bytes",
                        needed
                    )));
                }
            }
            log_dbg!("Growing multidraw ring from {} to {} bytes", self.size, new_size);
            self.size = new_size;
            self.head = 0;
            self.tail = 0;
            self.wrapped = false;
            return Ok(Reservation {
                offset: 0,
                grow_to: Some(new_size),
            });
        }

        if needed > self.available() {
            self.head = 0;
            self.wrapped = false;
        }
        Ok(Reservation {
            offset: self.head,
            grow_to: None,
        })
    }

    /// Move the head past a payload written at the reserved offset.
    pub fn advance(&mut self, written: usize) {
        self.head += written;
        if self.head >= self.size {
            self.head = 0;
            self.wrapped = true;
        }
        if !self.wrapped {
            self.tail = self.head;
        }
    }
}
