/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! EGL context interception.
//!
//! The host EGL creates, destroys and binds the real contexts. We sit in
//! front of the three calls that matter and keep one [Context](crate::context::Context)
//! per native context, so that every GL call can find the emulation state of
//! whatever is current on its thread.
//!
//! - [types] has the handful of EGL types and constants we need.
//! - [host] abstracts the host EGL ([EglHost]) and implements it by loading
//!   the real library ([HostEgl]).
//! - [registry] owns all contexts and the per-thread "current" cell.

pub mod host;
pub mod registry;
pub mod types;

pub use host::{EglHost, HostEgl};
pub use registry::{with_current, Binding, Registry, SharedContext};
