/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Parsing and management of user-configurable options.
//!
//! There's no command line for a library that is loaded into someone else's
//! process, so options come from environment variables, read once at load.

pub const DOCUMENTATION: &str = "\
Error reporting:
    LIBGL_NOERROR=1
        glGetError() always returns GL_NO_ERROR. Many applications abort on
        the first GL error, and emulated paths may raise errors that a native
        desktop driver wouldn't.

        The default is to report errors.

Debugging:
    LTW_DEBUG=1
        Allow the application to enable GL_DEBUG_OUTPUT, and print verbose
        debug logging from every module. Expect massive logs.

        The default is off.

Buffers:
    LTW_NEVER_FLUSH_BUFFERS=0|1
        Drop all explicit flushes of mapped buffer ranges, and make persistent
        buffer storage coherent instead so that the data still arrives.

        The default is on.

    LTW_COHERENT_DYNAMIC_STORAGE=0|1
        Force dynamic storage buffers to be mapped persistent and coherent.
        This works around driver bugs with dynamic storage.

        The default is on.

    LTW_HIDE_BUFFER_STORAGE=1
        Don't advertise GL_ARB_buffer_storage even if the driver could support
        it.

        The default is to advertise it when available.

Host libraries:
    LTW_EGL_LIBRARY=...
    LTW_GLES_LIBRARY=...
        File names of the host EGL and OpenGL ES libraries.

        The defaults are libEGL.so and libGLESv3.so.

A boolean is true if its value starts with '1' and false otherwise.
";

/// Struct containing all user-configurable options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub no_error: bool,
    pub debug: bool,
    pub never_flush_buffers: bool,
    pub coherent_dynamic_storage: bool,
    pub hide_buffer_storage: bool,
    pub egl_library: String,
    pub gles_library: String,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            no_error: false,
            debug: false,
            never_flush_buffers: true,
            coherent_dynamic_storage: true,
            hide_buffer_storage: false,
            egl_library: "libEGL.so".to_string(),
            gles_library: "libGLESv3.so".to_string(),
        }
    }
}

lazy_static::lazy_static! {
    static ref GLOBAL_OPTIONS: Options = Options::from_vars(std::env::vars());
}

fn is_true(value: &str) -> bool {
    value.starts_with('1')
}

impl Options {
    /// The options of this process, read from the environment on first use.
    pub fn global() -> &'static Options {
        &GLOBAL_OPTIONS
    }

    /// Build options from `(name, value)` pairs. Unrecognized names are
    /// ignored, unset options keep their defaults.
    pub fn from_vars<I, K, V>(vars: I) -> Options
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Options::default();
        for (name, value) in vars {
            options.apply(name.as_ref(), value.as_ref());
        }
        options
    }

    /// Apply a single environment variable. Returns `true` if the name was
    /// recognized.
    pub fn apply(&mut self, name: &str, value: &str) -> bool {
        match name {
            "LIBGL_NOERROR" => self.no_error = is_true(value),
            "LTW_DEBUG" => self.debug = is_true(value),
            "LTW_NEVER_FLUSH_BUFFERS" => self.never_flush_buffers = is_true(value),
            "LTW_COHERENT_DYNAMIC_STORAGE" => self.coherent_dynamic_storage = is_true(value),
            "LTW_HIDE_BUFFER_STORAGE" => self.hide_buffer_storage = is_true(value),
            "LTW_EGL_LIBRARY" => self.egl_library = value.to_string(),
            "LTW_GLES_LIBRARY" => self.gles_library = value.to_string(),
            _ => return false,
        }
        true
    }

    /// Print a summary of the non-default behavior that is active.
    pub fn print_summary(&self) {
        if !self.no_error {
            echo!("GL errors will NOT be ignored. This may break some applications.");
        }
        if self.coherent_dynamic_storage {
            echo!("Dynamic storage buffers will be forced to be coherent.");
        }
        if self.debug {
            echo!("GL_DEBUG_OUTPUT may be enabled. Expect massive logs.");
        }
        if self.never_flush_buffers {
            echo!("All explicit buffer flushes will be dropped.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        let options = Options::from_vars(Vec::<(String, String)>::new());
        assert_eq!(options, Options::default());
        assert!(options.never_flush_buffers);
        assert!(options.coherent_dynamic_storage);
        assert!(!options.no_error);
    }

    #[test]
    fn leading_one_is_true() {
        let options = Options::from_vars([
            ("LIBGL_NOERROR", "1"),
            ("LTW_DEBUG", "1yes"),
            ("LTW_NEVER_FLUSH_BUFFERS", "0"),
            ("LTW_COHERENT_DYNAMIC_STORAGE", "true"),
        ]);
        assert!(options.no_error);
        assert!(options.debug);
        assert!(!options.never_flush_buffers);
        // Malformed values are false, not the default.
        assert!(!options.coherent_dynamic_storage);
    }

    #[test]
    fn unknown_names_ignored() {
        let mut options = Options::default();
        assert!(!options.apply("PATH", "/usr/bin"));
        assert!(options.apply("LTW_EGL_LIBRARY", "libEGL_mali.so"));
        assert_eq!(options.egl_library, "libEGL_mali.so");
    }
}
