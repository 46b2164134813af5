/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Shader source transforms and the fragment output location patch.

use super::ShaderTransform;
use crate::gles::gles32_raw::types::*;
use libloading::os::unix::Library;
use std::ffi::{c_char, c_int, CStr, CString};

type OptimizeShaderFn = unsafe extern "C" fn(*const c_char, GLenum, c_int, c_int) -> *mut c_char;

/// The desktop GLSL to ESSL translator, if it was linked into the process.
///
/// It is looked up as `optimize_shader` among the symbols already loaded.
/// Results are allocated with `malloc` and freed here once copied.
pub struct ExternalTransform {
    _process: Library,
    optimize_shader: OptimizeShaderFn,
}

impl ExternalTransform {
    pub fn load() -> Result<ExternalTransform, String> {
        unsafe {
            let process = Library::this();
            let optimize_shader = process
                .get::<OptimizeShaderFn>(b"optimize_shader\0")
                .map(|s| *s)
                .map_err(|e| format!("Could not find optimize_shader: {}", e))?;
            Ok(ExternalTransform {
                _process: process,
                optimize_shader,
            })
        }
    }
}

impl ShaderTransform for ExternalTransform {
    fn transform(
        &self,
        source: &str,
        shader_type: GLenum,
        glsl_version: GLint,
        essl_version: GLint,
    ) -> String {
        let Ok(c_source) = CString::new(source) else {
            log!("Shader source contains a NUL byte, not translating it");
            return source.to_string();
        };
        unsafe {
            let result = (self.optimize_shader)(
                c_source.as_ptr(),
                shader_type,
                glsl_version,
                essl_version,
            );
            if result.is_null() {
                log!("Shader translation failed, passing the source through");
                return source.to_string();
            }
            let translated = CStr::from_ptr(result).to_string_lossy().into_owned();
            libc::free(result as *mut libc::c_void);
            translated
        }
    }
}

/// Leaves sources untouched. Used when no translator is available.
#[derive(Copy, Clone, Debug, Default)]
pub struct Passthrough;

impl ShaderTransform for Passthrough {
    fn transform(&self, source: &str, _: GLenum, _: GLint, _: GLint) -> String {
        source.to_string()
    }
}

/// The comment the translator leaves where a fragment output's location
/// qualifier may go.
pub fn location_marker(name: &str) -> String {
    format!("/* LTW INSERT LOCATION {} LTW */", name)
}

/// Give each named fragment output the location of its slot. Returns [None]
/// if there are no names to place.
pub fn insert_frag_locations<S: AsRef<str>>(source: &str, names: &[Option<S>]) -> Option<String> {
    let mut patched = None::<String>;
    for (location, name) in names.iter().enumerate() {
        let Some(name) = name else {
            continue;
        };
        let current = patched.as_deref().unwrap_or(source);
        let replaced = current.replace(
            &location_marker(name.as_ref()),
            &format!("layout(location = {}) ", location),
        );
        patched = Some(replaced);
    }
    patched
}
