/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! The extension list we advertise to the application.
//!
//! Desktop GL applications look for `GL_ARB_*` extensions, which an OpenGL ES
//! driver never reports, even when the shim can provide the functionality.
//! The advertised list is the driver's own followed by the ones the shim adds.
//! Both `glGetString(GL_EXTENSIONS)` and the indexed `glGetStringi` form are
//! served, the latter numbering the added extensions first.

use crate::context::Capabilities;
use crate::gles::gles32_raw as gles32;
use crate::gles::GraphicsBackend;
use std::ffi::{CStr, CString};

/// Extra room reserved up front so that appending doesn't reallocate.
const EXTRA_CAPACITY: usize = 512;

pub struct Extensions {
    string: CString,
    extras: Vec<CString>,
}

struct Builder {
    string: String,
    extras: Vec<CString>,
}

impl Builder {
    fn new(native: &str) -> Builder {
        let mut string = String::with_capacity(native.len() + EXTRA_CAPACITY);
        string.push_str(native);
        // Some drivers end the list with a space and some don't.
        if !string.is_empty() && !string.ends_with(' ') {
            string.push(' ');
        }
        Builder {
            string,
            extras: Vec::new(),
        }
    }

    fn add(&mut self, extension: &str) {
        let Ok(name) = CString::new(extension) else {
            log!("Extension name {:?} contains a NUL", extension);
            return;
        };
        self.string.push_str(extension);
        self.string.push(' ');
        self.extras.push(name);
        log_dbg!("Added extension {}", extension);
    }

    fn finish(mut self) -> Extensions {
        if self.string.ends_with(' ') {
            self.string.pop();
        }
        // The driver's string came from a C string and our names were checked
        // by CString::new, so there can't be a NUL.
        let string = CString::new(self.string).unwrap_or_default();
        Extensions {
            string,
            extras: self.extras,
        }
    }
}

impl Extensions {
    /// Build the list for a context whose capabilities have been detected.
    pub unsafe fn build(
        gl: &mut dyn GraphicsBackend,
        caps: &Capabilities,
        hide_buffer_storage: bool,
    ) -> Extensions {
        let native = gl.GetString(gles32::EXTENSIONS);
        let native = if native.is_null() {
            String::new()
        } else {
            CStr::from_ptr(native as *const _)
                .to_string_lossy()
                .into_owned()
        };
        Self::from_native(&native, caps, hide_buffer_storage)
    }

    pub fn from_native(native: &str, caps: &Capabilities, hide_buffer_storage: bool) -> Extensions {
        let mut builder = Builder::new(native);
        if caps.buffer_storage {
            if !hide_buffer_storage {
                builder.add("GL_ARB_buffer_storage");
            } else {
                log!("The buffer storage extension is hidden.");
            }
        }
        if caps.buffer_texture_ext || caps.es32 {
            builder.add("GL_ARB_texture_buffer_object");
        }
        builder.add("GL_ARB_draw_elements_base_vertex");
        builder.finish()
    }

    /// The full space-separated list.
    pub fn as_c_str(&self) -> &CStr {
        &self.string
    }

    /// Number of extensions the shim adds to the driver's.
    pub fn extra_count(&self) -> usize {
        self.extras.len()
    }

    /// Added extension `index`, in the order they appear in the string.
    pub fn extra(&self, index: usize) -> Option<&CStr> {
        self.extras.get(index).map(|e| e.as_c_str())
    }
}
