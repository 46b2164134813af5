/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Error type shared by the emulation paths.
//!
//! Almost every error here ends up being logged by the entry point layer and
//! the offending call turned into a no-op, which is what an application would
//! see from a driver that rejects a call. [ShimError::RegistryMiss] is the
//! exception: it means our own bookkeeping is broken, and the entry point layer
//! aborts on it.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShimError {
    /// A GL call was made on a thread with no current context.
    NoCurrentContext,
    /// Null pointer, out-of-range count, misaligned offset, etc.
    InvalidArgument(String),
    /// A target/type/parameter combination the shim doesn't emulate.
    Unsupported(String),
    /// A size computation overflowed. Nothing was sent to the driver.
    Overflow(String),
    /// An allocation failed.
    OutOfMemory(String),
    /// `eglMakeCurrent` succeeded in the host but the context it bound isn't
    /// one we created. The value is the native context handle.
    RegistryMiss(usize),
}

impl fmt::Display for ShimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShimError::NoCurrentContext => write!(f, "no current context"),
            ShimError::InvalidArgument(what) => write!(f, "invalid argument: {}", what),
            ShimError::Unsupported(what) => write!(f, "unsupported: {}", what),
            ShimError::Overflow(what) => write!(f, "size overflow: {}", what),
            ShimError::OutOfMemory(what) => write!(f, "out of memory: {}", what),
            ShimError::RegistryMiss(ctx) => {
                write!(f, "failed to find emulation state for context {:#x}", ctx)
            }
        }
    }
}

impl std::error::Error for ShimError {}

impl ShimError {
    /// Whether this error means the shim's own state is corrupt and execution
    /// must not continue.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShimError::RegistryMiss(_))
    }
}
