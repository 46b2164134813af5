/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! EGL types and constants, as in the Khronos `EGL/egl.h`.

#![allow(non_camel_case_types)]

use std::ffi::{c_uint, c_void};
use std::ptr::null_mut;

pub type EGLint = i32;
pub type EGLBoolean = c_uint;
pub type EGLDisplay = *mut c_void;
pub type EGLConfig = *mut c_void;
pub type EGLSurface = *mut c_void;
pub type EGLContext = *mut c_void;

pub const EGL_FALSE: EGLBoolean = 0;
pub const EGL_TRUE: EGLBoolean = 1;
pub const EGL_NO_CONTEXT: EGLContext = null_mut();
pub const EGL_NO_DISPLAY: EGLDisplay = null_mut();
pub const EGL_NO_SURFACE: EGLSurface = null_mut();
