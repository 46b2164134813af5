/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! The host EGL implementation.

use super::types::*;
use crate::gles::{GraphicsBackend, NativeES3};
use crate::options::Options;
use libloading::Library;
use std::ffi::{c_char, c_void, CString};

/// The EGL calls we intercept, as provided by whatever is underneath us.
///
/// # Safety
/// The methods are thin wrappers over the EGL entry points and have the same
/// requirements on their arguments.
pub trait EglHost: Send + Sync {
    unsafe fn create_context(
        &self,
        display: EGLDisplay,
        config: EGLConfig,
        share_context: EGLContext,
        attrib_list: *const EGLint,
    ) -> EGLContext;

    unsafe fn destroy_context(&self, display: EGLDisplay, context: EGLContext) -> bool;

    unsafe fn make_current(
        &self,
        display: EGLDisplay,
        draw: EGLSurface,
        read: EGLSurface,
        context: EGLContext,
    ) -> bool;

    /// Produce the driver that a newly created context will issue its GL
    /// calls to.
    fn load_backend(&self) -> Box<dyn GraphicsBackend + Send>;
}

type GetProcAddressFn = unsafe extern "C" fn(*const c_char) -> *const c_void;
type CreateContextFn =
    unsafe extern "C" fn(EGLDisplay, EGLConfig, EGLContext, *const EGLint) -> EGLContext;
type DestroyContextFn = unsafe extern "C" fn(EGLDisplay, EGLContext) -> EGLBoolean;
type MakeCurrentFn =
    unsafe extern "C" fn(EGLDisplay, EGLSurface, EGLSurface, EGLContext) -> EGLBoolean;

/// The real EGL and OpenGL ES libraries of the system, loaded at runtime.
pub struct HostEgl {
    _egl: Library,
    gles: Option<Library>,
    get_proc_address: GetProcAddressFn,
    create_context: CreateContextFn,
    destroy_context: DestroyContextFn,
    make_current: MakeCurrentFn,
}

unsafe fn symbol<T: Copy>(lib: &Library, library_name: &str, name: &str) -> Result<T, String> {
    lib.get::<T>(name.as_bytes())
        .map(|s| *s)
        .map_err(|e| format!("Could not load {} from {}: {}", name, library_name, e))
}

impl HostEgl {
    /// Load the libraries named by `options`. The OpenGL ES library is
    /// optional: it's only used for entry points `eglGetProcAddress` doesn't
    /// know about.
    pub fn open(options: &Options) -> Result<HostEgl, String> {
        unsafe {
            let egl = Library::new(&options.egl_library)
                .map_err(|e| format!("Could not load {}: {}", options.egl_library, e))?;
            let gles = match Library::new(&options.gles_library) {
                Ok(lib) => Some(lib),
                Err(e) => {
                    log!("Could not load {}: {}", options.gles_library, e);
                    None
                }
            };
            let name = options.egl_library.as_str();
            Ok(HostEgl {
                get_proc_address: symbol(&egl, name, "eglGetProcAddress")?,
                create_context: symbol(&egl, name, "eglCreateContext")?,
                destroy_context: symbol(&egl, name, "eglDestroyContext")?,
                make_current: symbol(&egl, name, "eglMakeCurrent")?,
                _egl: egl,
                gles,
            })
        }
    }

    /// Look up a GL entry point in the OpenGL ES library's exports, falling
    /// back to `eglGetProcAddress`. Returns null if neither has it.
    pub fn proc_address(&self, name: &str) -> *const c_void {
        let exported = match &self.gles {
            Some(lib) => unsafe { lib.get::<*const c_void>(name.as_bytes()) }
                .map(|s| *s)
                .unwrap_or(std::ptr::null()),
            None => std::ptr::null(),
        };
        resolve(exported, || {
            let Ok(c_name) = CString::new(name) else {
                return std::ptr::null();
            };
            unsafe { (self.get_proc_address)(c_name.as_ptr()) }
        })
    }
}

/// `exported` if the library had the symbol, otherwise whatever EGL gives.
/// Some EGL implementations hand out non-null stubs for any name, so EGL is
/// only asked when the library came up empty.
fn resolve(exported: *const c_void, from_egl: impl FnOnce() -> *const c_void) -> *const c_void {
    if exported.is_null() {
        from_egl()
    } else {
        exported
    }
}

impl EglHost for HostEgl {
    unsafe fn create_context(
        &self,
        display: EGLDisplay,
        config: EGLConfig,
        share_context: EGLContext,
        attrib_list: *const EGLint,
    ) -> EGLContext {
        (self.create_context)(display, config, share_context, attrib_list)
    }

    unsafe fn destroy_context(&self, display: EGLDisplay, context: EGLContext) -> bool {
        (self.destroy_context)(display, context) != EGL_FALSE
    }

    unsafe fn make_current(
        &self,
        display: EGLDisplay,
        draw: EGLSurface,
        read: EGLSurface,
        context: EGLContext,
    ) -> bool {
        (self.make_current)(display, draw, read, context) != EGL_FALSE
    }

    fn load_backend(&self) -> Box<dyn GraphicsBackend + Send> {
        Box::new(NativeES3::load_with(|name| self.proc_address(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_export_wins() {
        let exported = 0x1000 as *const c_void;
        let mut asked = false;
        let addr = resolve(exported, || {
            asked = true;
            0x2000 as *const c_void
        });
        assert_eq!(addr, exported);
        assert!(!asked);
    }

    #[test]
    fn egl_fills_in_missing_exports() {
        let addr = resolve(std::ptr::null(), || 0x2000 as *const c_void);
        assert_eq!(addr, 0x2000 as *const c_void);
        assert!(resolve(std::ptr::null(), std::ptr::null).is_null());
    }
}
