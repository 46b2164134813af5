/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Emulated draws, driven through the exported entry points.

mod common;

use es3shim::entry::*;
use es3shim::gles::gles32_raw as gles32;
use es3shim::gles::gles32_raw::types::*;
use es3shim::gles::{Call, DriverProfile, OptionalEntry};
use std::ffi::c_void;

fn command_bytes(fields: [u32; 5]) -> Vec<u8> {
    fields.iter().flat_map(|f| f.to_le_bytes()).collect()
}

#[test]
fn base_vertex_draw_uses_native_entry() {
    let registry = common::registry(DriverProfile::es32());
    let (_context, gl) = common::current_context(&registry);
    unsafe {
        glDrawElementsBaseVertex(
            gles32::TRIANGLES,
            6,
            gles32::UNSIGNED_SHORT,
            8 as *const c_void,
            100,
        );
    }
    assert_eq!(
        gl.lock().take_calls(),
        vec![Call::DrawElementsBaseVertex {
            entry: OptionalEntry::DrawElementsBaseVertex,
            mode: gles32::TRIANGLES,
            count: 6,
            type_: gles32::UNSIGNED_SHORT,
            offset: 8,
            basevertex: 100,
        }]
    );
}

#[test]
fn base_vertex_draw_emulated_with_indirect_draw() {
    let registry = common::registry(DriverProfile::es31());
    let (_context, gl) = common::current_context(&registry);
    unsafe {
        glBindBuffer(gles32::ELEMENT_ARRAY_BUFFER, 42);
        glBindBuffer(gles32::DRAW_INDIRECT_BUFFER, 7);
        gl.lock().take_calls();
        glDrawElementsBaseVertex(
            gles32::TRIANGLES,
            6,
            gles32::UNSIGNED_SHORT,
            8 as *const c_void,
            100,
        );
    }
    let calls = gl.lock().take_calls();
    let uploads: Vec<_> = calls
        .iter()
        .filter_map(|call| match call {
            Call::BufferData {
                target: gles32::DRAW_INDIRECT_BUFFER,
                size,
                data,
                ..
            } => Some((*size, data.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(uploads, vec![(20, Some(command_bytes([6, 1, 4, 100, 0])))]);
    assert!(calls.contains(&Call::DrawElementsIndirect {
        mode: gles32::TRIANGLES,
        type_: gles32::UNSIGNED_SHORT,
        offset: 0,
    }));
    // The application's indirect buffer is put back.
    assert_eq!(calls.last(), Some(&Call::BindBuffer(gles32::DRAW_INDIRECT_BUFFER, 7)));
    assert_eq!(gl.lock().bound_buffer(gles32::DRAW_INDIRECT_BUFFER), 7);
}

#[test]
fn misaligned_base_vertex_draw_rejected() {
    let registry = common::registry(DriverProfile::es31());
    let (_context, gl) = common::current_context(&registry);
    unsafe {
        glBindBuffer(gles32::ELEMENT_ARRAY_BUFFER, 42);
        gl.lock().take_calls();
        glDrawElementsBaseVertex(
            gles32::TRIANGLES,
            6,
            gles32::UNSIGNED_SHORT,
            7 as *const c_void,
            100,
        );
    }
    assert!(gl.lock().take_calls().is_empty());
}

#[test]
fn base_vertex_draw_without_element_buffer_rejected() {
    let registry = common::registry(DriverProfile::es31());
    let (_context, gl) = common::current_context(&registry);
    unsafe {
        glDrawElementsBaseVertex(
            gles32::TRIANGLES,
            3,
            gles32::UNSIGNED_INT,
            std::ptr::null(),
            1,
        );
    }
    assert!(gl.lock().take_calls().is_empty());
}

#[test]
fn multi_base_vertex_draw_falls_back_to_indirect_loop() {
    let registry = common::registry(DriverProfile::es31());
    let (_context, gl) = common::current_context(&registry);
    let count: [GLsizei; 2] = [3, 6];
    let indices = [0 as *const c_void, 12 as *const c_void];
    let basevertex: [GLint; 2] = [0, 50];
    unsafe {
        glBindBuffer(gles32::ELEMENT_ARRAY_BUFFER, 42);
        gl.lock().take_calls();
        glMultiDrawElementsBaseVertex(
            gles32::TRIANGLES,
            count.as_ptr(),
            gles32::UNSIGNED_INT,
            indices.as_ptr(),
            2,
            basevertex.as_ptr(),
        );
    }
    let calls = gl.lock().take_calls();
    let mut expected = command_bytes([3, 1, 0, 0, 0]);
    expected.extend(command_bytes([6, 1, 3, 50, 0]));
    assert!(calls.iter().any(|call| matches!(
        call,
        Call::BufferData { target: gles32::DRAW_INDIRECT_BUFFER, data: Some(data), .. }
            if *data == expected
    )));
    let offsets: Vec<usize> = calls
        .iter()
        .filter_map(|call| match call {
            Call::DrawElementsIndirect { offset, .. } => Some(*offset),
            _ => None,
        })
        .collect();
    assert_eq!(offsets, vec![0, 20]);
}

#[test]
fn multi_draw_elements_gathers_into_ring() {
    let registry = common::registry(DriverProfile::es30());
    let (_context, gl) = common::current_context(&registry);
    let count: [GLsizei; 3] = [3, 0, 6];
    let indices = [16 as *const c_void, 0 as *const c_void, 40 as *const c_void];
    unsafe {
        glBindBuffer(gles32::ELEMENT_ARRAY_BUFFER, 42);
        gl.lock().take_calls();
        glMultiDrawElements(
            gles32::TRIANGLES,
            count.as_ptr(),
            gles32::UNSIGNED_SHORT,
            indices.as_ptr(),
            3,
        );
    }
    let calls = gl.lock().take_calls();
    let copies: Vec<(GLintptr, GLintptr, GLsizeiptr)> = calls
        .iter()
        .filter_map(|call| match call {
            Call::CopyBufferSubData {
                read_offset,
                write_offset,
                size,
                ..
            } => Some((*read_offset, *write_offset, *size)),
            _ => None,
        })
        .collect();
    assert_eq!(copies, vec![(16, 0, 6), (40, 6, 12)]);
    assert!(calls.contains(&Call::DrawElements {
        mode: gles32::TRIANGLES,
        count: 9,
        type_: gles32::UNSIGNED_SHORT,
        offset: 0,
    }));
    assert_eq!(calls.last(), Some(&Call::BindBuffer(gles32::ELEMENT_ARRAY_BUFFER, 42)));

    // The next draw lands after the first one.
    unsafe {
        glMultiDrawElements(
            gles32::TRIANGLES,
            count.as_ptr(),
            gles32::UNSIGNED_SHORT,
            indices.as_ptr(),
            3,
        );
    }
    assert!(gl.lock().take_calls().contains(&Call::DrawElements {
        mode: gles32::TRIANGLES,
        count: 9,
        type_: gles32::UNSIGNED_SHORT,
        offset: 18,
    }));
}

fn ring_copies(calls: &[Call]) -> Vec<(GLintptr, GLintptr, GLsizeiptr)> {
    calls
        .iter()
        .filter_map(|call| match call {
            Call::CopyBufferSubData {
                write_target: gles32::COPY_WRITE_BUFFER,
                read_offset,
                write_offset,
                size,
                ..
            } => Some((*read_offset, *write_offset, *size)),
            _ => None,
        })
        .collect()
}

fn ring_allocations(calls: &[Call]) -> Vec<GLsizeiptr> {
    calls
        .iter()
        .filter_map(|call| match call {
            Call::BufferData {
                target: gles32::COPY_WRITE_BUFFER,
                size,
                data: None,
                ..
            } => Some(*size),
            _ => None,
        })
        .collect()
}

unsafe fn multi_draw_uints(count: &[GLsizei], indices: &[*const c_void]) {
    glMultiDrawElements(
        gles32::TRIANGLES,
        count.as_ptr(),
        gles32::UNSIGNED_INT,
        indices.as_ptr(),
        count.len() as GLsizei,
    );
}

#[test]
fn multi_draw_elements_grows_ring_for_large_payload() {
    let registry = common::registry(DriverProfile::es30());
    let (_context, gl) = common::current_context(&registry);
    unsafe {
        glBindBuffer(gles32::ELEMENT_ARRAY_BUFFER, 42);
        glBindBuffer(gles32::COPY_WRITE_BUFFER, 9);
        gl.lock().take_calls();
        // 280000 bytes, more than the initial 256 KiB.
        multi_draw_uints(&[40000, 30000], &[0 as *const c_void, 160000 as *const c_void]);
    }
    let calls = gl.lock().take_calls();
    let Some(&Call::BindBuffer(gles32::COPY_WRITE_BUFFER, ring)) = calls.first() else {
        panic!("ring not bound first: {:?}", calls);
    };
    assert_eq!(ring_allocations(&calls), vec![560000]);
    assert_eq!(ring_copies(&calls), vec![(0, 0, 160000), (160000, 160000, 120000)]);
    assert_eq!(
        calls[calls.len() - 4..],
        [
            Call::BindBuffer(gles32::COPY_WRITE_BUFFER, 9),
            Call::BindBuffer(gles32::ELEMENT_ARRAY_BUFFER, ring),
            Call::DrawElements {
                mode: gles32::TRIANGLES,
                count: 70000,
                type_: gles32::UNSIGNED_INT,
                offset: 0,
            },
            Call::BindBuffer(gles32::ELEMENT_ARRAY_BUFFER, 42),
        ]
    );
    assert_eq!(gl.lock().bound_buffer(gles32::COPY_WRITE_BUFFER), 9);
    assert_eq!(gl.lock().bound_buffer(gles32::ELEMENT_ARRAY_BUFFER), 42);

    // The grown ring has room for the next payload after the first.
    unsafe { multi_draw_uints(&[3, 3], &[0 as *const c_void, 12 as *const c_void]) };
    let calls = gl.lock().take_calls();
    assert!(ring_allocations(&calls).is_empty());
    assert_eq!(ring_copies(&calls), vec![(0, 280000, 12), (12, 280012, 12)]);
}

#[test]
fn multi_draw_elements_restarts_ring_when_head_is_full() {
    let registry = common::registry(DriverProfile::es30());
    let (_context, gl) = common::current_context(&registry);
    unsafe {
        glBindBuffer(gles32::ELEMENT_ARRAY_BUFFER, 42);
        glBindBuffer(gles32::COPY_WRITE_BUFFER, 9);
        // 240000 bytes leaves 22144 at the head.
        multi_draw_uints(&[30000, 30000], &[0 as *const c_void, 0 as *const c_void]);
        gl.lock().take_calls();
        // 40000 bytes don't fit there.
        multi_draw_uints(&[5000, 5000], &[64 as *const c_void, 128 as *const c_void]);
    }
    let calls = gl.lock().take_calls();
    assert!(ring_allocations(&calls).is_empty());
    assert_eq!(ring_copies(&calls), vec![(64, 0, 20000), (128, 20000, 20000)]);
    assert!(calls.contains(&Call::DrawElements {
        mode: gles32::TRIANGLES,
        count: 10000,
        type_: gles32::UNSIGNED_INT,
        offset: 0,
    }));
    assert!(calls.contains(&Call::BindBuffer(gles32::COPY_WRITE_BUFFER, 9)));
    assert_eq!(calls.last(), Some(&Call::BindBuffer(gles32::ELEMENT_ARRAY_BUFFER, 42)));
    assert_eq!(gl.lock().bound_buffer(gles32::COPY_WRITE_BUFFER), 9);
}

#[test]
fn multi_draw_elements_ignores_null_client_indices() {
    let registry = common::registry(DriverProfile::es30());
    let (_context, gl) = common::current_context(&registry);
    let first: [u16; 3] = [0, 1, 2];
    let second: [u16; 3] = [2, 3, 0];
    let count: [GLsizei; 3] = [3, 3, 3];
    let indices = [
        first.as_ptr() as *const c_void,
        std::ptr::null(),
        second.as_ptr() as *const c_void,
    ];
    unsafe {
        glMultiDrawElements(
            gles32::TRIANGLES,
            count.as_ptr(),
            gles32::UNSIGNED_SHORT,
            indices.as_ptr(),
            3,
        );
    }
    let calls = gl.lock().take_calls();
    let uploads: Vec<(GLintptr, Vec<u8>)> = calls
        .iter()
        .filter_map(|call| match call {
            Call::BufferSubData {
                target: gles32::COPY_WRITE_BUFFER,
                offset,
                data,
            } => Some((*offset, data.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        uploads,
        vec![(0, vec![0, 0, 1, 0, 2, 0]), (6, vec![2, 0, 3, 0, 0, 0])]
    );
    assert!(calls.contains(&Call::DrawElements {
        mode: gles32::TRIANGLES,
        count: 6,
        type_: gles32::UNSIGNED_SHORT,
        offset: 0,
    }));

    // Nothing left to draw.
    let indices = [std::ptr::null(); 3];
    unsafe {
        glMultiDrawElements(
            gles32::TRIANGLES,
            count.as_ptr(),
            gles32::UNSIGNED_SHORT,
            indices.as_ptr(),
            3,
        );
    }
    assert!(gl.lock().take_calls().is_empty());
}

#[test]
fn multi_draw_with_one_valid_entry_draws_directly() {
    let registry = common::registry(DriverProfile::es30());
    let (_context, gl) = common::current_context(&registry);
    let count: [GLsizei; 2] = [0, 6];
    let indices = [0 as *const c_void, 24 as *const c_void];
    unsafe {
        glMultiDrawElements(
            gles32::TRIANGLES,
            count.as_ptr(),
            gles32::UNSIGNED_INT,
            indices.as_ptr(),
            2,
        );
    }
    assert_eq!(
        gl.lock().take_calls(),
        vec![Call::DrawElements {
            mode: gles32::TRIANGLES,
            count: 6,
            type_: gles32::UNSIGNED_INT,
            offset: 24,
        }]
    );
}

#[test]
fn multi_draw_arrays_skips_empty_entries() {
    let registry = common::registry(DriverProfile::es30());
    let (_context, gl) = common::current_context(&registry);
    let first: [GLint; 3] = [0, 10, 20];
    let count: [GLsizei; 3] = [3, 0, 4];
    unsafe {
        glMultiDrawArrays(gles32::TRIANGLES, first.as_ptr(), count.as_ptr(), 3);
    }
    assert_eq!(
        gl.lock().take_calls(),
        vec![
            Call::DrawArrays(gles32::TRIANGLES, 0, 3),
            Call::DrawArrays(gles32::TRIANGLES, 20, 4),
        ]
    );
}
