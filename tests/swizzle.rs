/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Texture swizzles set by the application, composed with upload format
//! corrections and batched.

mod common;

use es3shim::entry::*;
use es3shim::gles::desktop;
use es3shim::gles::gles32_raw as gles32;
use es3shim::gles::gles32_raw::types::*;
use es3shim::gles::{Call, DriverProfile, GraphicsBackend, RecordingBackend};

const R: GLint = gles32::RED as GLint;
const G: GLint = gles32::GREEN as GLint;
const B: GLint = gles32::BLUE as GLint;
const A: GLint = gles32::ALPHA as GLint;

/// Bind a texture behind the shim's back, like an application calling the
/// driver's glBindTexture directly.
fn bind(gl: &RecordingBackend, target: GLenum, texture: GLuint) {
    unsafe { gl.clone().BindTexture(target, texture) };
    gl.lock().take_calls();
}

fn tex_parameteri_calls(calls: &[Call]) -> Vec<(GLenum, GLint)> {
    calls
        .iter()
        .filter_map(|call| match call {
            Call::TexParameteri(_, pname, param) => Some((*pname, *param)),
            _ => None,
        })
        .collect()
}

fn tex_parameteri_targets(calls: &[Call]) -> Vec<GLenum> {
    calls
        .iter()
        .filter_map(|call| match call {
            Call::TexParameteri(target, _, _) => Some(*target),
            _ => None,
        })
        .collect()
}

fn upload(format: GLenum, type_: GLenum) {
    upload_to(gles32::TEXTURE_2D, format, type_);
}

fn upload_to(target: GLenum, format: GLenum, type_: GLenum) {
    let pixels = [0u8; 16];
    unsafe {
        glTexImage2D(
            target,
            0,
            gles32::RGBA as GLint,
            2,
            2,
            0,
            format,
            type_,
            pixels.as_ptr() as *const GLvoid,
        );
    }
}

#[test]
fn bgra_upload_reorders_channels() {
    let registry = common::registry(DriverProfile::es32());
    let (_context, gl) = common::current_context(&registry);
    bind(&gl, gles32::TEXTURE_2D, 5);

    upload(desktop::BGRA, gles32::UNSIGNED_BYTE);
    let calls = gl.lock().take_calls();
    assert!(calls.iter().any(|call| matches!(
        call,
        Call::TexImage2D {
            format: gles32::RGBA,
            type_: gles32::UNSIGNED_BYTE,
            has_pixels: true,
            ..
        }
    )));
    assert_eq!(gl.lock().swizzle_of(5), [B, G, R, A]);

    // Same format again: nothing more to send.
    upload(desktop::BGRA, gles32::UNSIGNED_BYTE);
    assert!(tex_parameteri_calls(&gl.lock().take_calls()).is_empty());

    // Back to RGBA restores the identity.
    upload(gles32::RGBA, gles32::UNSIGNED_BYTE);
    assert_eq!(gl.lock().swizzle_of(5), [R, G, B, A]);
}

#[test]
fn packed_upload_composes_with_application_swizzle() {
    let registry = common::registry(DriverProfile::es32());
    let (_context, gl) = common::current_context(&registry);
    bind(&gl, gles32::TEXTURE_2D, 3);

    let swizzle = [R, R, R, G];
    unsafe {
        glTexParameteriv(
            gles32::TEXTURE_2D,
            desktop::TEXTURE_SWIZZLE_RGBA,
            swizzle.as_ptr(),
        );
    }
    assert_eq!(gl.lock().swizzle_of(3), swizzle);

    upload(desktop::BGRA, desktop::UNSIGNED_INT_8_8_8_8);
    assert_eq!(gl.lock().swizzle_of(3), [R, R, G, R]);

    // The application still sees what it set.
    let mut value = 0;
    let mut all = [0; 4];
    unsafe {
        glGetTexParameteriv(gles32::TEXTURE_2D, gles32::TEXTURE_SWIZZLE_A, &mut value);
        glGetTexParameteriv(
            gles32::TEXTURE_2D,
            desktop::TEXTURE_SWIZZLE_RGBA,
            all.as_mut_ptr(),
        );
    }
    assert_eq!(value, G);
    assert_eq!(all, swizzle);
}

#[test]
fn batched_swizzles_are_sent_once() {
    let registry = common::registry(DriverProfile::es32());
    let (_context, gl) = common::current_context(&registry);
    bind(&gl, gles32::TEXTURE_2D, 5);

    unsafe {
        glLTWBeginBatchUpdate();
        glTexParameteri(gles32::TEXTURE_2D, gles32::TEXTURE_SWIZZLE_R, G);
        glTexParameteri(gles32::TEXTURE_2D, gles32::TEXTURE_SWIZZLE_R, B);
    }
    assert!(tex_parameteri_calls(&gl.lock().take_calls()).is_empty());
    assert_eq!(gl.lock().swizzle_of(5), [R, G, B, A]);

    // Another texture is bound by the time the batch ends.
    bind(&gl, gles32::TEXTURE_2D, 9);
    unsafe { glLTWEndBatchUpdate() };
    let calls = gl.lock().take_calls();
    assert_eq!(calls.first(), Some(&Call::BindTexture(gles32::TEXTURE_2D, 5)));
    assert_eq!(calls.last(), Some(&Call::BindTexture(gles32::TEXTURE_2D, 9)));
    assert_eq!(tex_parameteri_calls(&calls).len(), 4);
    assert_eq!(gl.lock().swizzle_of(5), [B, G, B, A]);
    assert_eq!(gl.lock().swizzle_of(9), [R, G, B, A]);

    // Outside a batch, changes go straight to the driver.
    unsafe { glTexParameteri(gles32::TEXTURE_2D, gles32::TEXTURE_SWIZZLE_G, R) };
    assert_eq!(gl.lock().swizzle_of(9), [R, R, B, A]);
}

#[test]
fn deleted_texture_starts_over() {
    let registry = common::registry(DriverProfile::es32());
    let (_context, gl) = common::current_context(&registry);
    bind(&gl, gles32::TEXTURE_2D, 4);
    unsafe { glTexParameteri(gles32::TEXTURE_2D, gles32::TEXTURE_SWIZZLE_B, R) };

    let names = [4];
    unsafe { glDeleteTextures(1, names.as_ptr()) };
    assert!(gl
        .lock()
        .take_calls()
        .contains(&Call::DeleteTextures(vec![4])));

    // The name is reused for a fresh texture with the default swizzle.
    bind(&gl, gles32::TEXTURE_2D, 4);
    let mut value = 0;
    unsafe { glGetTexParameteriv(gles32::TEXTURE_2D, gles32::TEXTURE_SWIZZLE_B, &mut value) };
    assert_eq!(value, B);
}

#[test]
fn cube_face_upload_swizzles_the_cube_map() {
    let registry = common::registry(DriverProfile::es32());
    let (_context, gl) = common::current_context(&registry);
    bind(&gl, gles32::TEXTURE_CUBE_MAP, 7);

    upload_to(
        gles32::TEXTURE_CUBE_MAP_POSITIVE_X,
        desktop::BGRA,
        gles32::UNSIGNED_BYTE,
    );
    let calls = gl.lock().take_calls();
    assert_eq!(
        tex_parameteri_targets(&calls),
        vec![gles32::TEXTURE_CUBE_MAP; 4]
    );
    // The upload itself still goes to the face.
    assert!(calls.iter().any(|call| matches!(
        call,
        Call::TexImage2D {
            target: gles32::TEXTURE_CUBE_MAP_POSITIVE_X,
            format: gles32::RGBA,
            ..
        }
    )));
    assert_eq!(gl.lock().swizzle_of(7), [B, G, R, A]);
    assert_eq!(unsafe { glGetError() }, gles32::NO_ERROR);

    // Another face with the same format needs nothing more.
    upload_to(
        gles32::TEXTURE_CUBE_MAP_NEGATIVE_Z,
        desktop::BGRA,
        gles32::UNSIGNED_BYTE,
    );
    assert!(tex_parameteri_targets(&gl.lock().take_calls()).is_empty());
}

#[test]
fn array_texture_swizzle_uses_its_target() {
    let registry = common::registry(DriverProfile::es32());
    let (_context, gl) = common::current_context(&registry);
    bind(&gl, gles32::TEXTURE_2D_ARRAY, 12);

    let swizzle = [A, B, G, R];
    unsafe {
        glTexParameteriv(
            gles32::TEXTURE_2D_ARRAY,
            desktop::TEXTURE_SWIZZLE_RGBA,
            swizzle.as_ptr(),
        );
    }
    assert_eq!(
        tex_parameteri_targets(&gl.lock().take_calls()),
        vec![gles32::TEXTURE_2D_ARRAY; 4]
    );
    assert_eq!(gl.lock().swizzle_of(12), swizzle);
}

#[test]
fn batch_flush_binds_under_the_tracked_target() {
    let registry = common::registry(DriverProfile::es32());
    let (_context, gl) = common::current_context(&registry);
    bind(&gl, gles32::TEXTURE_CUBE_MAP, 7);

    unsafe {
        glLTWBeginBatchUpdate();
        glTexParameteri(gles32::TEXTURE_CUBE_MAP, gles32::TEXTURE_SWIZZLE_G, R);
    }
    upload_to(
        gles32::TEXTURE_CUBE_MAP_POSITIVE_Y,
        desktop::BGRA,
        gles32::UNSIGNED_BYTE,
    );
    assert!(tex_parameteri_targets(&gl.lock().take_calls()).is_empty());

    bind(&gl, gles32::TEXTURE_CUBE_MAP, 8);
    bind(&gl, gles32::TEXTURE_2D, 3);
    unsafe { glLTWEndBatchUpdate() };
    let calls = gl.lock().take_calls();
    assert_eq!(
        calls.first(),
        Some(&Call::BindTexture(gles32::TEXTURE_CUBE_MAP, 7))
    );
    assert_eq!(
        calls.last(),
        Some(&Call::BindTexture(gles32::TEXTURE_CUBE_MAP, 8))
    );
    assert_eq!(
        tex_parameteri_targets(&calls),
        vec![gles32::TEXTURE_CUBE_MAP; 4]
    );
    // Original [R, R, B, A] with red and blue swapped.
    assert_eq!(gl.lock().swizzle_of(7), [B, R, R, A]);
    assert_eq!(gl.lock().swizzle_of(3), [R, G, B, A]);
}
