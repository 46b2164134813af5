/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Texture swizzle emulation.
//!
//! Desktop applications upload textures in formats OpenGL ES doesn't accept:
//! `GL_BGRA` data, and `GL_UNSIGNED_INT_8_8_8_8`, which on a little-endian
//! machine stores the channels in reverse byte order. The data is uploaded as
//! plain RGBA bytes instead, and the channel mix-up is undone with the
//! texture's swizzle parameters.
//!
//! That means the swizzle the driver has is not the one the application set.
//! Each affected texture gets a [SwizzleTrack] remembering the application's
//! swizzle (`original`), what was last sent to the driver (`applied`), and
//! which corrections the last upload needed. The driver swizzle is always
//! `compose(original, byte_order_flip, bgra_reorder)`, and queries report
//! `original`.
//!
//! Applications that touch many textures at once can bracket the changes with
//! `glLTWBeginBatchUpdate`/`glLTWEndBatchUpdate`, in which case nothing is sent
//! until the end, and each texture at most once.

use crate::context::Context;
use crate::gles::desktop;
use crate::gles::gles32_raw as gles32;
use crate::gles::gles32_raw::types::*;

/// Source channels for red, green, blue and alpha, e.g. `GL_RED`.
pub type Swizzle = [GLint; 4];

const SWIZZLE_PARAMS: [GLenum; 4] = [
    gles32::TEXTURE_SWIZZLE_R,
    gles32::TEXTURE_SWIZZLE_G,
    gles32::TEXTURE_SWIZZLE_B,
    gles32::TEXTURE_SWIZZLE_A,
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwizzleTrack {
    /// Target the texture was last seen bound to, with cube map faces folded
    /// into `GL_TEXTURE_CUBE_MAP`.
    pub target: GLenum,
    pub original: Swizzle,
    pub applied: Swizzle,
    /// Composed swizzle waiting for the end of the batch.
    pub pending: Option<Swizzle>,
    pub byte_order_flip: bool,
    pub bgra_reorder: bool,
}

impl SwizzleTrack {
    pub fn new(target: GLenum, original: Swizzle) -> SwizzleTrack {
        SwizzleTrack {
            target,
            original,
            applied: original,
            pending: None,
            byte_order_flip: false,
            bgra_reorder: false,
        }
    }

    /// What the driver should have for this texture.
    pub fn composed(&self) -> Swizzle {
        compose(self.original, self.byte_order_flip, self.bgra_reorder)
    }
}

/// Batch state of a context.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SwizzleBatch {
    pub active: bool,
    /// Textures with a staged swizzle, each listed once.
    pub pending: Vec<GLuint>,
}

/// Apply the corrections for an upload format to a swizzle: first reverse the
/// channel order, then swap red and blue.
pub fn compose(original: Swizzle, byte_order_flip: bool, bgra_reorder: bool) -> Swizzle {
    let mut swizzle = original;
    if byte_order_flip {
        swizzle.reverse();
    }
    if bgra_reorder {
        swizzle.swap(0, 2);
    }
    swizzle
}

/// The `glGetIntegerv` parameter giving the texture bound to `target`.
pub fn binding_query(target: GLenum) -> Option<GLenum> {
    Some(match target {
        gles32::TEXTURE_2D => gles32::TEXTURE_BINDING_2D,
        gles32::TEXTURE_2D_MULTISAMPLE => gles32::TEXTURE_BINDING_2D_MULTISAMPLE,
        gles32::TEXTURE_2D_MULTISAMPLE_ARRAY => gles32::TEXTURE_BINDING_2D_MULTISAMPLE_ARRAY,
        gles32::TEXTURE_3D => gles32::TEXTURE_BINDING_3D,
        gles32::TEXTURE_2D_ARRAY => gles32::TEXTURE_BINDING_2D_ARRAY,
        gles32::TEXTURE_CUBE_MAP
        | gles32::TEXTURE_CUBE_MAP_POSITIVE_X
        | gles32::TEXTURE_CUBE_MAP_NEGATIVE_X
        | gles32::TEXTURE_CUBE_MAP_POSITIVE_Y
        | gles32::TEXTURE_CUBE_MAP_NEGATIVE_Y
        | gles32::TEXTURE_CUBE_MAP_POSITIVE_Z
        | gles32::TEXTURE_CUBE_MAP_NEGATIVE_Z => gles32::TEXTURE_BINDING_CUBE_MAP,
        gles32::TEXTURE_CUBE_MAP_ARRAY => gles32::TEXTURE_BINDING_CUBE_MAP_ARRAY,
        gles32::TEXTURE_BUFFER => gles32::TEXTURE_BINDING_BUFFER,
        _ => return None,
    })
}

/// The bind target for `target`, which may be a cube map face.
pub fn bind_target(target: GLenum) -> GLenum {
    match target {
        gles32::TEXTURE_CUBE_MAP_POSITIVE_X..=gles32::TEXTURE_CUBE_MAP_NEGATIVE_Z => {
            gles32::TEXTURE_CUBE_MAP
        }
        other => other,
    }
}

fn swizzle_channel(pname: GLenum) -> Option<usize> {
    SWIZZLE_PARAMS.iter().position(|&p| p == pname)
}

/// Whether `pname` is one of the swizzle parameters.
pub fn is_swizzle_param(pname: GLenum) -> bool {
    pname == desktop::TEXTURE_SWIZZLE_RGBA || swizzle_channel(pname).is_some()
}

/// Texture bound to `target`, or 0.
unsafe fn bound_texture(ctx: &mut Context, target: GLenum) -> GLuint {
    match binding_query(target) {
        Some(query) => ctx.get_integer(query) as GLuint,
        None => 0,
    }
}

/// Find or create the track of the texture bound to `target`. Returns the
/// texture name, or [None] if nothing can be tracked.
unsafe fn get_track(ctx: &mut Context, target: GLenum) -> Option<GLuint> {
    let texture = bound_texture(ctx, target);
    if texture == 0 {
        return None;
    }
    let target = bind_target(target);
    if let Some(track) = ctx.swizzle_tracks.get_mut(texture as usize) {
        track.target = target;
        return Some(texture);
    }

    let mut original = [0; 4];
    for (param, value) in SWIZZLE_PARAMS.iter().zip(original.iter_mut()) {
        ctx.gl.GetTexParameteriv(target, *param, value);
    }
    if let Err(e) = ctx
        .swizzle_tracks
        .insert(texture as usize, SwizzleTrack::new(target, original))
    {
        log!("Failed to allocate swizzle track for texture {}: {}", texture, e);
        return None;
    }
    Some(texture)
}

unsafe fn send(ctx: &mut Context, target: GLenum, swizzle: Swizzle) {
    for (param, value) in SWIZZLE_PARAMS.iter().zip(swizzle) {
        ctx.gl.TexParameteri(target, *param, value);
    }
}

/// Bring the driver's swizzle for `texture` in line with its track, or stage
/// it if a batch is active. The texture must be bound to the track's target.
unsafe fn apply(ctx: &mut Context, texture: GLuint) {
    let batch = ctx.swizzle_batch.active;
    let Some(track) = ctx.swizzle_tracks.get_mut(texture as usize) else {
        return;
    };
    let swizzle = track.composed();
    if swizzle == track.applied {
        track.pending = None;
        return;
    }
    if batch {
        track.pending = Some(swizzle);
        if !ctx.swizzle_batch.pending.contains(&texture) {
            ctx.swizzle_batch.pending.push(texture);
        }
        return;
    }
    track.applied = swizzle;
    // Swizzles are texture parameters, so never a cube map face.
    let target = track.target;
    send(ctx, target, swizzle);
}

/// Rewrite an upload's format and type to ones OpenGL ES accepts, and update
/// the swizzle of the texture bound to `target` to match.
pub unsafe fn process_upload(
    ctx: &mut Context,
    target: GLenum,
    format: &mut GLenum,
    type_: &mut GLenum,
) {
    let mut bgra_reorder = false;
    let mut byte_order_flip = false;
    if *format == desktop::BGRA {
        bgra_reorder = true;
        *format = gles32::RGBA;
    }
    match *type_ {
        desktop::UNSIGNED_INT_8_8_8_8 => {
            byte_order_flip = true;
            *type_ = gles32::UNSIGNED_BYTE;
        }
        // Already byte order on little-endian machines.
        desktop::UNSIGNED_INT_8_8_8_8_REV => *type_ = gles32::UNSIGNED_BYTE,
        _ => (),
    }

    let Some(texture) = get_track(ctx, target) else {
        return;
    };
    let Some(track) = ctx.swizzle_tracks.get_mut(texture as usize) else {
        return;
    };
    if track.byte_order_flip == byte_order_flip && track.bgra_reorder == bgra_reorder {
        return;
    }
    track.byte_order_flip = byte_order_flip;
    track.bgra_reorder = bgra_reorder;
    apply(ctx, texture);
}

/// Handle the application setting a swizzle parameter. `params` holds one
/// value, or four for `GL_TEXTURE_SWIZZLE_RGBA`.
///
/// Returns `false` if the call wasn't handled and should go to the driver
/// as-is: `pname` isn't a swizzle parameter, or the texture can't be tracked.
pub unsafe fn process_swizzle_param(
    ctx: &mut Context,
    target: GLenum,
    pname: GLenum,
    params: &[GLint],
) -> bool {
    if !is_swizzle_param(pname) {
        return false;
    }
    let Some(texture) = get_track(ctx, target) else {
        return false;
    };
    let Some(track) = ctx.swizzle_tracks.get_mut(texture as usize) else {
        return false;
    };
    match swizzle_channel(pname) {
        Some(channel) => {
            let Some(&value) = params.first() else {
                return false;
            };
            track.original[channel] = value;
        }
        None => {
            let Ok(swizzle) = <Swizzle>::try_from(params) else {
                log!("GL_TEXTURE_SWIZZLE_RGBA needs 4 values, got {}", params.len());
                return true;
            };
            track.original = swizzle;
        }
    }
    apply(ctx, texture);
    true
}

/// The swizzle the application set, for `glGetTexParameteriv`. Writes one
/// value, or four for `GL_TEXTURE_SWIZZLE_RGBA`. Returns `false` if the query
/// should go to the driver.
pub unsafe fn get_swizzle_param(
    ctx: &mut Context,
    target: GLenum,
    pname: GLenum,
    params: &mut [GLint],
) -> bool {
    if !is_swizzle_param(pname) {
        return false;
    }
    let texture = bound_texture(ctx, target);
    let original = match ctx.swizzle_tracks.get(texture as usize) {
        Some(track) => track.original,
        None if pname == desktop::TEXTURE_SWIZZLE_RGBA => {
            // OpenGL ES can only be asked one channel at a time.
            let mut swizzle = [0; 4];
            for (param, value) in SWIZZLE_PARAMS.iter().zip(swizzle.iter_mut()) {
                ctx.gl.GetTexParameteriv(target, *param, value);
            }
            swizzle
        }
        None => return false,
    };
    match swizzle_channel(pname) {
        Some(channel) => {
            if let Some(out) = params.first_mut() {
                *out = original[channel];
            }
        }
        None => {
            for (out, value) in params.iter_mut().zip(original) {
                *out = value;
            }
        }
    }
    true
}

/// Start staging swizzle changes.
pub fn begin_batch(ctx: &mut Context) {
    ctx.swizzle_batch.active = true;
    ctx.swizzle_batch.pending.clear();
}

/// Send every staged swizzle to the driver and leave batch mode.
pub unsafe fn end_batch(ctx: &mut Context) {
    if !ctx.swizzle_batch.active {
        return;
    }
    let pending = std::mem::take(&mut ctx.swizzle_batch.pending);
    log_dbg!("Flushing {} batched swizzle updates", pending.len());
    for texture in pending {
        let Some(track) = ctx.swizzle_tracks.get_mut(texture as usize) else {
            continue;
        };
        let Some(swizzle) = track.pending.take() else {
            continue;
        };
        track.applied = swizzle;
        let target = track.target;
        let previous = bound_texture(ctx, target);
        ctx.gl.BindTexture(target, texture);
        send(ctx, target, swizzle);
        ctx.gl.BindTexture(target, previous);
    }
    ctx.swizzle_batch.active = false;
}

/// Forget the tracks of deleted textures.
pub fn forget_textures(ctx: &mut Context, textures: &[GLuint]) {
    for &texture in textures {
        if ctx.swizzle_tracks.remove(texture as usize).is_some() {
            ctx.swizzle_batch.pending.retain(|&t| t != texture);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const R: GLint = gles32::RED as GLint;
    const G: GLint = gles32::GREEN as GLint;
    const B: GLint = gles32::BLUE as GLint;
    const A: GLint = gles32::ALPHA as GLint;

    #[test]
    fn composition_order() {
        let identity = [R, G, B, A];
        assert_eq!(compose(identity, false, false), identity);
        assert_eq!(compose(identity, true, false), [A, B, G, R]);
        assert_eq!(compose(identity, false, true), [B, G, R, A]);
        // Reversal first, then the red/blue swap.
        assert_eq!(compose(identity, true, true), [G, B, A, R]);
        assert_eq!(compose([R, R, R, G], true, true), [R, R, G, R]);
    }

    #[test]
    fn binding_queries() {
        assert_eq!(
            binding_query(gles32::TEXTURE_CUBE_MAP_NEGATIVE_Y),
            Some(gles32::TEXTURE_BINDING_CUBE_MAP)
        );
        assert_eq!(
            binding_query(gles32::TEXTURE_BUFFER),
            Some(gles32::TEXTURE_BINDING_BUFFER)
        );
        assert_eq!(binding_query(desktop::PROXY_TEXTURE_2D), None);
        assert_eq!(
            bind_target(gles32::TEXTURE_CUBE_MAP_POSITIVE_Z),
            gles32::TEXTURE_CUBE_MAP
        );
    }

    #[test]
    fn new_track_is_in_sync() {
        let track = SwizzleTrack::new(gles32::TEXTURE_2D, [R, G, B, A]);
        assert_eq!(track.composed(), track.applied);
        assert_eq!(track.pending, None);
    }
}
