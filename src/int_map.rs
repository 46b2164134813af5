/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Hash map keyed by opaque integer handles.
//!
//! GL object names and EGL context handles are already unique integers, so
//! there's no need for SipHash. [IntMap] is a thin wrapper over an
//! [FxHashMap].

use rustc_hash::FxHashMap;

/// Map from an integer handle to a value. Keys are compared by identity.
pub struct IntMap<V> {
    inner: FxHashMap<usize, V>,
}

impl<V> IntMap<V> {
    pub fn new() -> Self {
        IntMap {
            inner: FxHashMap::default(),
        }
    }

    /// Insert or overwrite. Returns the previous value for the key, if any.
    pub fn put(&mut self, key: usize, value: V) -> Option<V> {
        self.inner.insert(key, value)
    }

    pub fn get(&self, key: usize) -> Option<&V> {
        self.inner.get(&key)
    }

    pub fn get_mut(&mut self, key: usize) -> Option<&mut V> {
        self.inner.get_mut(&key)
    }

    pub fn remove(&mut self, key: usize) -> Option<V> {
        self.inner.remove(&key)
    }

    pub fn contains(&self, key: usize) -> bool {
        self.inner.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Remove every entry for which `f` returns `false`.
    pub fn retain(&mut self, mut f: impl FnMut(usize, &mut V) -> bool) {
        self.inner.retain(|&k, v| f(k, v))
    }

    /// Take every value out of the map, e.g. to return pooled records.
    pub fn drain(&mut self) -> impl Iterator<Item = (usize, V)> + '_ {
        self.inner.drain()
    }
}

impl<V> Default for IntMap<V> {
    fn default() -> Self {
        Self::new()
    }
}
