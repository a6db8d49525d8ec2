//! Shader Macro Definitions
//!
//! A small, ordered key/value store for the macro set handed to the shader
//! template engine. Identical define sets always hash identically, which is
//! what makes them usable as pipeline-cache key components.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// A collection of shader macro definitions.
///
/// Internally an ordered `Vec<(String, String)>` kept sorted by key, so the
/// same macro set always produces the same hash regardless of insertion
/// order.
#[derive(Debug, Clone, Default)]
pub struct ShaderDefines {
    defines: Vec<(String, String)>,
}

impl ShaderDefines {
    /// Create an empty define collection.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            defines: Vec::new(),
        }
    }

    /// Set a define (maintains sorted order).
    ///
    /// If the key exists, its value is updated; otherwise a new entry is
    /// inserted.
    pub fn set(&mut self, key: &str, value: &str) {
        match self
            .defines
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
        {
            Ok(idx) => value.clone_into(&mut self.defines[idx].1),
            Err(idx) => self.defines.insert(idx, (key.to_string(), value.to_string())),
        }
    }

    /// Remove a define. Returns whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        if let Ok(idx) = self
            .defines
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
        {
            self.defines.remove(idx);
            true
        } else {
            false
        }
    }

    /// Check whether a define is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.defines
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .is_ok()
    }

    /// Get a define's value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.defines
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .ok()
            .map(|idx| self.defines[idx].1.as_str())
    }

    /// Clear all defines.
    #[inline]
    pub fn clear(&mut self) {
        self.defines.clear();
    }

    /// Number of defines.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.defines.len()
    }

    /// Whether the collection is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
    }

    /// Iterate all defines in key order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.defines.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Convert to a `BTreeMap` (for template rendering).
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.defines.iter().cloned().collect()
    }

    /// Merge defines from another set; `other` wins on conflicts.
    pub fn merge(&mut self, other: &ShaderDefines) {
        for (key, value) in other.iter() {
            self.set(key, value);
        }
    }

    /// Content hash (for pipeline caching).
    #[must_use]
    pub fn compute_hash(&self) -> u64 {
        use std::hash::BuildHasher;

        rustc_hash::FxBuildHasher.hash_one(self)
    }
}

impl Hash for ShaderDefines {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.defines.hash(state);
    }
}

impl PartialEq for ShaderDefines {
    fn eq(&self, other: &Self) -> bool {
        self.defines == other.defines
    }
}

impl Eq for ShaderDefines {}

impl From<&[(&str, &str)]> for ShaderDefines {
    fn from(defines: &[(&str, &str)]) -> Self {
        let mut result = Self::new();
        for (k, v) in defines {
            result.set(k, v);
        }
        result
    }
}
