/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! The process-wide table of emulation contexts.
//!
//! Locking: the registry's own state (context table, cached binding, current
//! context per thread) is behind one mutex, which is never held while calling
//! into the host EGL or while initializing a context. Each [Context] has its
//! own mutex too, but since EGL only lets a context be current on one thread
//! at a time, that one is never contended in practice.

use super::host::EglHost;
use super::types::*;
use crate::context::Context;
use crate::error::ShimError;
use crate::int_map::IntMap;
use crate::options::Options;
use crate::shader::ShaderPipeline;
use parking_lot::Mutex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::ThreadId;

pub type SharedContext = Arc<Mutex<Context>>;

/// The arguments of an `eglMakeCurrent` call, with the handles as integers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Binding {
    pub display: usize,
    pub draw: usize,
    pub read: usize,
    pub context: usize,
}

impl Binding {
    pub fn new(display: EGLDisplay, draw: EGLSurface, read: EGLSurface, context: EGLContext) -> Self {
        Binding {
            display: display as usize,
            draw: draw as usize,
            read: read as usize,
            context: context as usize,
        }
    }

    /// Nothing bound.
    pub const NONE: Binding = Binding {
        display: 0,
        draw: 0,
        read: 0,
        context: 0,
    };
}

struct RegistryState {
    contexts: IntMap<SharedContext>,
    /// What the last successful `eglMakeCurrent` bound.
    bound: Binding,
    /// Current context of each thread that has one.
    current: HashMap<ThreadId, usize>,
}

thread_local! {
    /// The context current on this thread, and its native handle.
    static CURRENT: RefCell<Option<(usize, SharedContext)>> = const { RefCell::new(None) };
}

/// Run `f` with the context current on this thread, if there is one.
pub fn with_current<R>(f: impl FnOnce(&mut Context) -> R) -> Option<R> {
    CURRENT.with(|cell| {
        let cell = cell.borrow();
        let (_, ctx) = cell.as_ref()?;
        let mut ctx = ctx.lock();
        Some(f(&mut ctx))
    })
}

/// Native handle of the context current on this thread.
pub fn current_handle() -> Option<usize> {
    CURRENT.with(|cell| cell.borrow().as_ref().map(|(handle, _)| *handle))
}

fn set_current(current: Option<(usize, SharedContext)>) {
    CURRENT.with(|cell| *cell.borrow_mut() = current);
}

pub struct Registry<H: EglHost> {
    host: H,
    options: Options,
    shaders: ShaderPipeline,
    state: Mutex<RegistryState>,
}

impl<H: EglHost> Registry<H> {
    pub fn new(host: H, options: Options, shaders: ShaderPipeline) -> Self {
        Registry {
            host,
            options,
            shaders,
            state: Mutex::new(RegistryState {
                contexts: IntMap::new(),
                bound: Binding::NONE,
                current: HashMap::new(),
            }),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// The shader pipeline every context of this registry shares.
    pub fn shaders(&self) -> &ShaderPipeline {
        &self.shaders
    }

    /// Create a native context and its emulation state. If the latter can't
    /// be built, the native context is destroyed again and `EGL_NO_CONTEXT` is
    /// returned.
    pub unsafe fn create_context(
        &self,
        display: EGLDisplay,
        config: EGLConfig,
        share_context: EGLContext,
        attrib_list: *const EGLint,
    ) -> EGLContext {
        let native = self
            .host
            .create_context(display, config, share_context, attrib_list);
        if native == EGL_NO_CONTEXT {
            return native;
        }
        let backend = self.host.load_backend();
        match Context::new(backend, self.options.clone(), self.shaders.clone()) {
            Ok(ctx) => {
                self.state
                    .lock()
                    .contexts
                    .put(native as usize, Arc::new(Mutex::new(ctx)));
                log_dbg!("Created context {:?}", native);
                native
            }
            Err(e) => {
                log!("Failed to set up emulation state for context {:?}: {}", native, e);
                self.host.destroy_context(display, native);
                EGL_NO_CONTEXT
            }
        }
    }

    /// Destroy a native context, and on success its emulation state.
    pub unsafe fn destroy_context(&self, display: EGLDisplay, context: EGLContext) -> bool {
        if !self.host.destroy_context(display, context) {
            return false;
        }
        let handle = context as usize;
        let old = {
            let mut state = self.state.lock();
            let old = state.contexts.remove(handle);
            if state.bound.context == handle {
                state.bound = Binding::NONE;
            }
            state.current.retain(|_, &mut current| current != handle);
            old
        };
        if current_handle() == Some(handle) {
            set_current(None);
        }
        // Other threads may still hold a reference through their current
        // cell; the state is freed when the last one lets go.
        drop(old);
        log_dbg!("Destroyed context {:?}", context);
        true
    }

    /// Bind a context. `Ok(false)` means the host refused. The only error is
    /// [ShimError::RegistryMiss], when the host bound a context that was not
    /// created through us.
    pub unsafe fn make_current(
        &self,
        display: EGLDisplay,
        draw: EGLSurface,
        read: EGLSurface,
        context: EGLContext,
    ) -> Result<bool, ShimError> {
        let binding = Binding::new(display, draw, read, context);
        let thread = std::thread::current().id();

        if context == EGL_NO_CONTEXT {
            {
                let mut state = self.state.lock();
                state.bound = Binding::NONE;
                state.current.remove(&thread);
            }
            set_current(None);
            return Ok(self.host.make_current(display, draw, read, context));
        }

        let saved = {
            let state = self.state.lock();
            if state.bound == binding && current_handle() == Some(binding.context) {
                return Ok(true);
            }
            state.bound
        };

        if !self.host.make_current(display, draw, read, context) {
            return Ok(false);
        }

        let Some(ctx) = self.context(binding.context) else {
            return Err(ShimError::RegistryMiss(binding.context));
        };
        {
            let mut ctx = ctx.lock();
            if !ctx.ready {
                ctx.init_in_context();
            }
        }

        {
            let mut state = self.state.lock();
            if state.bound != saved {
                log_dbg!("Binding changed during eglMakeCurrent, continuing with the new context");
            }
            state.bound = binding;
            state.current.insert(thread, binding.context);
        }
        set_current(Some((binding.context, ctx)));
        Ok(true)
    }

    /// Record `context` as current for `thread`. Zero clears it.
    pub fn bind(&self, thread: ThreadId, context: usize) {
        let mut state = self.state.lock();
        if context == 0 {
            state.current.remove(&thread);
        } else {
            state.current.insert(thread, context);
        }
    }

    /// The context current on `thread`, as far as the registry knows.
    pub fn current_for(&self, thread: ThreadId) -> Option<usize> {
        self.state.lock().current.get(&thread).copied()
    }

    /// What the last successful `eglMakeCurrent` bound.
    pub fn bound(&self) -> Binding {
        self.state.lock().bound
    }

    pub fn context(&self, handle: usize) -> Option<SharedContext> {
        self.state.lock().contexts.get(handle).cloned()
    }

    /// Number of live contexts.
    pub fn len(&self) -> usize {
        self.state.lock().contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
