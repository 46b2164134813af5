/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! A fake host EGL for driving a [Registry] in tests.

#![allow(dead_code)]

use es3shim::egl::types::*;
use es3shim::egl::{EglHost, Registry};
use es3shim::gles::{DriverProfile, GraphicsBackend, RecordingBackend};
use es3shim::options::Options;
use es3shim::shader::ShaderPipeline;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub const DISPLAY: EGLDisplay = 0x10 as EGLDisplay;
pub const SURFACE: EGLSurface = 0x20 as EGLSurface;

/// Hands out contexts numbered from 0x1000 and a [RecordingBackend] per
/// context, all built from the same driver profile.
pub struct FakeEgl {
    profile: DriverProfile,
    next_context: AtomicUsize,
    pub backends: Mutex<Vec<RecordingBackend>>,
    pub make_current_calls: AtomicUsize,
    pub refuse_make_current: AtomicBool,
}

impl FakeEgl {
    pub fn new(profile: DriverProfile) -> FakeEgl {
        FakeEgl {
            profile,
            next_context: AtomicUsize::new(0x1000),
            backends: Mutex::new(Vec::new()),
            make_current_calls: AtomicUsize::new(0),
            refuse_make_current: AtomicBool::new(false),
        }
    }

    pub fn make_current_calls(&self) -> usize {
        self.make_current_calls.load(Ordering::SeqCst)
    }
}

impl EglHost for FakeEgl {
    unsafe fn create_context(
        &self,
        _display: EGLDisplay,
        _config: EGLConfig,
        _share_context: EGLContext,
        _attrib_list: *const EGLint,
    ) -> EGLContext {
        self.next_context.fetch_add(1, Ordering::SeqCst) as EGLContext
    }

    unsafe fn destroy_context(&self, _display: EGLDisplay, context: EGLContext) -> bool {
        !context.is_null()
    }

    unsafe fn make_current(
        &self,
        _display: EGLDisplay,
        _draw: EGLSurface,
        _read: EGLSurface,
        _context: EGLContext,
    ) -> bool {
        self.make_current_calls.fetch_add(1, Ordering::SeqCst);
        !self.refuse_make_current.load(Ordering::SeqCst)
    }

    fn load_backend(&self) -> Box<dyn GraphicsBackend + Send> {
        let backend = RecordingBackend::new(self.profile.clone());
        self.backends.lock().push(backend.clone());
        Box::new(backend)
    }
}

pub fn registry(profile: DriverProfile) -> Registry<FakeEgl> {
    Registry::new(
        FakeEgl::new(profile),
        Options::default(),
        ShaderPipeline::passthrough(),
    )
}

/// Create a context and make it current on this thread. Returns the context
/// and the recording of its driver, cleared.
pub fn current_context(registry: &Registry<FakeEgl>) -> (EGLContext, RecordingBackend) {
    unsafe {
        let context =
            registry.create_context(DISPLAY, std::ptr::null_mut(), EGL_NO_CONTEXT, std::ptr::null());
        assert_ne!(context, EGL_NO_CONTEXT);
        assert_eq!(registry.make_current(DISPLAY, SURFACE, SURFACE, context), Ok(true));
        let gl = registry
            .host()
            .backends
            .lock()
            .last()
            .cloned()
            .expect("no backend was loaded");
        gl.lock().take_calls();
        (context, gl)
    }
}
