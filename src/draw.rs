/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Draw calls that OpenGL ES lacks or only has in newer versions.
//!
//! - [base_vertex]: `glDrawElementsBaseVertex` and its multi-draw variant,
//!   emulated with indirect draws on OpenGL ES 3.1.
//! - [multi_draw]: `glMultiDrawArrays` and `glMultiDrawElements`, the latter
//!   gathering all index ranges into one buffer so it can be a single draw.
//! - [ring]: the scratch buffer `glMultiDrawElements` gathers indices into.

pub mod base_vertex;
pub mod multi_draw;
pub mod ring;

use crate::error::ShimError;
use crate::gles::gles32_raw as gles32;
use crate::gles::gles32_raw::types::*;

/// Size in bytes of one index of type `type_`.
pub fn type_bytes(type_: GLenum) -> Result<usize, ShimError> {
    match type_ {
        gles32::UNSIGNED_BYTE => Ok(1),
        gles32::UNSIGNED_SHORT => Ok(2),
        gles32::UNSIGNED_INT => Ok(4),
        _ => Err(ShimError::InvalidArgument(format!(
            "index type {:#x}",
            type_
        ))),
    }
}
