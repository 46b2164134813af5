/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Fixed-size object pool for hot per-context records.
//!
//! Shader, program, framebuffer and swizzle-tracking records are created and
//! destroyed constantly by some applications. Rather than going to the system
//! allocator for each one, they live in a [Pool], which hands out slots from
//! chunks of `chunk_objects` records and reuses freed slots through an
//! intrusive free list. Chunks are only released when the pool is dropped.
//!
//! The pool is the sole owner of the records. Everyone else holds a
//! [PoolHandle], which is just a slot index.

use crate::int_map::IntMap;
use std::mem::size_of;

/// Object sizes are rounded up to this, so that the accounting in [PoolStats]
/// matches what a block allocator would use.
pub const POOL_ALIGNMENT: usize = 16;

/// Chunk size used when zero is passed to [Pool::new].
pub const DEFAULT_CHUNK_OBJECTS: usize = 64;

/// Stable reference to a record in a [Pool].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PoolHandle(usize);

impl PoolHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

enum Slot<T> {
    Free { next: Option<usize> },
    Used(T),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PoolStats {
    pub object_size: usize,
    pub total: usize,
    pub used: usize,
    pub free: usize,
    pub chunks: usize,
}

pub struct Pool<T> {
    object_size: usize,
    chunk_objects: usize,
    chunks: Vec<Vec<Slot<T>>>,
    free_head: Option<usize>,
    used_count: usize,
    free_count: usize,
}

fn align_size(size: usize, alignment: usize) -> Option<usize> {
    Some(size.checked_add(alignment - 1)? & !(alignment - 1))
}

impl<T> Pool<T> {
    /// Create an empty pool. No chunk is allocated until the first
    /// [Pool::alloc].
    pub fn new(chunk_objects: usize) -> Result<Self, String> {
        // A free slot has to be able to hold the free list link.
        let raw_size = size_of::<T>().max(size_of::<usize>());
        let object_size = align_size(raw_size, POOL_ALIGNMENT)
            .ok_or_else(|| format!("object size {} overflows", raw_size))?;
        Ok(Pool {
            object_size,
            chunk_objects: if chunk_objects > 0 {
                chunk_objects
            } else {
                DEFAULT_CHUNK_OBJECTS
            },
            chunks: Vec::new(),
            free_head: None,
            used_count: 0,
            free_count: 0,
        })
    }

    fn slot(&self, index: usize) -> Option<&Slot<T>> {
        self.chunks
            .get(index / self.chunk_objects)?
            .get(index % self.chunk_objects)
    }

    fn slot_mut(&mut self, index: usize) -> Option<&mut Slot<T>> {
        self.chunks
            .get_mut(index / self.chunk_objects)?
            .get_mut(index % self.chunk_objects)
    }

    fn expand(&mut self) -> bool {
        // The size check is only for accounting, the Vec does its own, but a
        // pool that can't describe its own chunk size is broken.
        let Some(objects_size) = self.chunk_objects.checked_mul(self.object_size) else {
            log!("Integer overflow in chunk size calculation (multiplication)");
            return false;
        };
        if objects_size.checked_add(size_of::<usize>()).is_none() {
            log!("Integer overflow in chunk size calculation (addition)");
            return false;
        }

        let mut chunk = Vec::new();
        if chunk.try_reserve_exact(self.chunk_objects).is_err() {
            log!("Failed to expand pool by {} objects", self.chunk_objects);
            return false;
        }
        let base = self.chunks.len() * self.chunk_objects;
        // Link the new slots so the lowest index is handed out first.
        for i in 0..self.chunk_objects {
            let next = if i + 1 < self.chunk_objects {
                Some(base + i + 1)
            } else {
                self.free_head
            };
            chunk.push(Slot::Free { next });
        }
        self.chunks.push(chunk);
        self.free_head = Some(base);
        self.free_count += self.chunk_objects;
        true
    }

    /// Store a record, growing the pool by one chunk if there are no free
    /// slots. Returns [None] only if memory is exhausted.
    ///
    /// Slots are reused, so the record must be fully initialized by the
    /// caller; nothing of the previous occupant survives.
    pub fn alloc(&mut self, value: T) -> Option<PoolHandle> {
        if self.free_head.is_none() && !self.expand() {
            return None;
        }
        let index = self.free_head?;
        let slot = self.slot_mut(index)?;
        let next = match slot {
            Slot::Free { next } => *next,
            Slot::Used(_) => unreachable!("free list points at a used slot"),
        };
        *slot = Slot::Used(value);
        self.free_head = next;
        self.used_count += 1;
        self.free_count -= 1;
        Some(PoolHandle(index))
    }

    /// Return a slot to the free list, handing back the record so its owned
    /// data is dropped by the caller (or reused). Freeing a handle that is
    /// already free returns [None] and changes nothing.
    pub fn free(&mut self, handle: PoolHandle) -> Option<T> {
        let free_head = self.free_head;
        let slot = self.slot_mut(handle.0)?;
        if matches!(slot, Slot::Free { .. }) {
            return None;
        }
        let Slot::Used(value) = std::mem::replace(slot, Slot::Free { next: free_head }) else {
            unreachable!()
        };
        self.free_head = Some(handle.0);
        self.used_count -= 1;
        self.free_count += 1;
        Some(value)
    }

    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        match self.slot(handle.0)? {
            Slot::Used(value) => Some(value),
            Slot::Free { .. } => None,
        }
    }

    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        match self.slot_mut(handle.0)? {
            Slot::Used(value) => Some(value),
            Slot::Free { .. } => None,
        }
    }

    /// Drop every record but keep the chunks for reuse.
    pub fn reset(&mut self) {
        let chunk_objects = self.chunk_objects;
        let total = self.chunks.len() * chunk_objects;
        for (chunk_index, chunk) in self.chunks.iter_mut().enumerate() {
            for (i, slot) in chunk.iter_mut().enumerate() {
                let index = chunk_index * chunk_objects + i;
                let next = if index + 1 < total {
                    Some(index + 1)
                } else {
                    None
                };
                *slot = Slot::Free { next };
            }
        }
        self.free_head = if total > 0 { Some(0) } else { None };
        self.used_count = 0;
        self.free_count = total;
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            object_size: self.object_size,
            total: self.chunks.len() * self.chunk_objects,
            used: self.used_count,
            free: self.free_count,
            chunks: self.chunks.len(),
        }
    }
}

/// GL object name to pooled record, the shape every per-context object table
/// has. The map holds handles, the pool holds the records.
pub struct PooledMap<T> {
    map: IntMap<PoolHandle>,
    pool: Pool<T>,
}

impl<T> PooledMap<T> {
    pub fn new(chunk_objects: usize) -> Result<Self, String> {
        Ok(PooledMap {
            map: IntMap::new(),
            pool: Pool::new(chunk_objects)?,
        })
    }

    /// Store a record for `name`, replacing any existing one. Fails only if
    /// the pool couldn't grow, in which case the record is dropped.
    pub fn insert(&mut self, name: usize, value: T) -> Result<(), String> {
        if let Some(slot) = self.get_mut(name) {
            *slot = value;
            return Ok(());
        }
        let handle = self
            .pool
            .alloc(value)
            .ok_or_else(|| format!("no room for a record for object {}", name))?;
        self.map.put(name, handle);
        Ok(())
    }

    pub fn get(&self, name: usize) -> Option<&T> {
        self.pool.get(*self.map.get(name)?)
    }

    pub fn get_mut(&mut self, name: usize) -> Option<&mut T> {
        let handle = *self.map.get(name)?;
        self.pool.get_mut(handle)
    }

    pub fn contains(&self, name: usize) -> bool {
        self.map.contains(name)
    }

    pub fn remove(&mut self, name: usize) -> Option<T> {
        let handle = self.map.remove(name)?;
        self.pool.free(handle)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_by_whole_chunks() {
        let mut pool: Pool<[u8; 3]> = Pool::new(4).unwrap();
        assert_eq!(pool.stats().total, 0);
        let handles: Vec<_> = (0..5).map(|i| pool.alloc([i; 3]).unwrap()).collect();
        let stats = pool.stats();
        assert_eq!(stats.chunks, 2);
        assert_eq!(stats.total, 8);
        assert_eq!(stats.used, 5);
        assert_eq!(stats.free, 3);
        assert_eq!(stats.object_size, POOL_ALIGNMENT);
        assert_eq!(pool.get(handles[4]), Some(&[4; 3]));
    }

    #[test]
    fn freed_slots_are_reused_first() {
        let mut pool = Pool::new(8).unwrap();
        let a = pool.alloc(String::from("a")).unwrap();
        let b = pool.alloc(String::from("b")).unwrap();
        assert_eq!(pool.free(a).as_deref(), Some("a"));
        assert!(pool.get(a).is_none());
        let c = pool.alloc(String::from("c")).unwrap();
        assert_eq!(c, a);
        assert_eq!(pool.get(c).map(String::as_str), Some("c"));
        assert_eq!(pool.get(b).map(String::as_str), Some("b"));
        assert_eq!(pool.stats().chunks, 1);
    }

    #[test]
    fn double_free_is_harmless() {
        let mut pool = Pool::new(2).unwrap();
        let a = pool.alloc(1u32).unwrap();
        assert_eq!(pool.free(a), Some(1));
        assert_eq!(pool.free(a), None);
        assert_eq!(pool.stats().used, 0);
        assert_eq!(pool.stats().free, 2);
    }

    #[test]
    fn zero_chunk_size_uses_default() {
        let mut pool = Pool::new(0).unwrap();
        pool.alloc(0u64).unwrap();
        assert_eq!(pool.stats().total, DEFAULT_CHUNK_OBJECTS);
    }

    #[test]
    fn pooled_map_reuses_slots() {
        let mut map = PooledMap::new(4).unwrap();
        map.insert(100, "a").unwrap();
        map.insert(100, "b").unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(100), Some(&"b"));
        assert_eq!(map.remove(100), Some("b"));
        assert_eq!(map.remove(100), None);
        map.insert(7, "c").unwrap();
        let stats = map.stats();
        assert_eq!((stats.used, stats.chunks), (1, 1));
    }

    #[test]
    fn reset_keeps_chunks() {
        let mut pool = Pool::new(2).unwrap();
        for i in 0..3 {
            pool.alloc(i).unwrap();
        }
        pool.reset();
        let stats = pool.stats();
        assert_eq!((stats.used, stats.free, stats.chunks), (0, 4, 2));
        assert_eq!(pool.alloc(9).map(PoolHandle::index), Some(0));
    }
}
