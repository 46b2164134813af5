/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Cache of transformed shader sources.
//!
//! Applications recompile the same shaders over and over (every world reload,
//! every resource pack change), and the source transform is by far the most
//! expensive thing we do. Transformed sources are kept here, keyed by a hash of
//! the original source and the shader type.
//!
//! Eviction picks the entry with the fewest hits, oldest first among equals.
//! Time is a logical clock that ticks on every lookup and insertion.

use crate::gles::gles32_raw::types::GLenum;

/// Number of entries the cache holds at most.
pub const CACHE_SLOTS: usize = 256;
/// Total bytes of cached source the cache holds at most.
pub const CACHE_MEMORY_BUDGET: usize = 32 * 1024 * 1024;
/// Statistics are logged every this many hits.
const STATS_INTERVAL: u64 = 100;

/// The djb2 string hash.
pub fn hash_source(source: &str) -> u64 {
    source.bytes().fold(5381u64, |hash, c| {
        hash.wrapping_shl(5)
            .wrapping_add(hash)
            .wrapping_add(u64::from(c))
    })
}

struct CacheEntry {
    hash: u64,
    shader_type: GLenum,
    source: String,
    /// Bytes accounted against the budget, including a terminator as the
    /// driver will receive the source as a C string.
    size: usize,
    access_count: u32,
    last_access: u64,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub memory: usize,
}

pub struct ShaderCache {
    entries: Vec<CacheEntry>,
    slots: usize,
    budget: usize,
    clock: u64,
    hits: u64,
    misses: u64,
    memory: usize,
}

impl Default for ShaderCache {
    fn default() -> Self {
        Self::with_limits(CACHE_SLOTS, CACHE_MEMORY_BUDGET)
    }
}

impl ShaderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(slots: usize, budget: usize) -> Self {
        ShaderCache {
            entries: Vec::with_capacity(slots),
            slots,
            budget,
            clock: 0,
            hits: 0,
            misses: 0,
            memory: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Look up a transformed source, counting a hit or a miss.
    pub fn get(&mut self, hash: u64, shader_type: GLenum) -> Option<String> {
        let now = self.tick();
        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.hash == hash && e.shader_type == shader_type)
        else {
            self.misses += 1;
            return None;
        };
        entry.access_count = entry.access_count.saturating_add(1);
        entry.last_access = now;
        let source = entry.source.clone();
        self.hits += 1;
        if self.hits % STATS_INTERVAL == 0 {
            self.log_stats();
        }
        Some(source)
    }

    /// Remember a transformed source. Sources bigger than half the budget are
    /// not kept.
    pub fn insert(&mut self, hash: u64, shader_type: GLenum, source: &str) {
        let size = source.len() + 1;
        if size > self.budget / 2 {
            log_dbg!("Shader source too large for the cache: {} bytes", size);
            return;
        }
        let now = self.tick();

        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|e| e.hash == hash && e.shader_type == shader_type)
        {
            self.memory = self.memory - existing.size + size;
            existing.source = source.to_string();
            existing.size = size;
            existing.last_access = now;
            return;
        }

        while !self.entries.is_empty()
            && (self.entries.len() >= self.slots || self.memory + size > self.budget)
        {
            self.evict_one();
        }

        self.entries.push(CacheEntry {
            hash,
            shader_type,
            source: source.to_string(),
            size,
            access_count: 1,
            last_access: now,
        });
        self.memory += size;
    }

    fn evict_one(&mut self) {
        let Some(victim) = self
            .entries
            .iter()
            .enumerate()
            .min_by_key(|(_, e)| (e.access_count, e.last_access))
            .map(|(i, _)| i)
        else {
            return;
        };
        let entry = self.entries.swap_remove(victim);
        self.memory -= entry.size;
        log_dbg!(
            "Evicted shader {:#x} ({} hits, {} bytes)",
            entry.hash,
            entry.access_count,
            entry.size
        );
    }

    pub fn contains(&self, hash: u64, shader_type: GLenum) -> bool {
        self.entries
            .iter()
            .any(|e| e.hash == hash && e.shader_type == shader_type)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
            memory: self.memory,
        }
    }

    fn log_stats(&self) {
        let lookups = self.hits + self.misses;
        let hit_rate = if lookups > 0 {
            self.hits as f64 / lookups as f64 * 100.0
        } else {
            0.0
        };
        log_dbg!(
            "Shader cache: hits={}, misses={}, hit rate={:.2}%, size={}/{}, memory={:.2}MB/{:.2}MB",
            self.hits,
            self.misses,
            hit_rate,
            self.entries.len(),
            self.slots,
            self.memory as f64 / (1024.0 * 1024.0),
            self.budget as f64 / (1024.0 * 1024.0)
        );
    }
}
