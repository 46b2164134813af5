/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
use gl_generator::{Api, Fallbacks, GlobalGenerator, Profile, Registry};
use std::fs::File;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());

    let mut file = File::create(out_dir.join("gles32.rs")).unwrap();
    Registry::new(
        Api::Gles2,
        (3, 2),
        Profile::Core,
        Fallbacks::None,
        [
            "GL_EXT_buffer_storage",
            "GL_EXT_multi_draw_indirect",
            "GL_OES_draw_elements_base_vertex",
            "GL_EXT_draw_elements_base_vertex",
            "GL_EXT_texture_buffer",
            "GL_EXT_texture_format_BGRA8888",
        ],
    )
    .write_bindings(GlobalGenerator, &mut file)
    .unwrap();
}
